use crate::core::errors::LedgerViewError;
use crate::core::models::{GroupId, RefreshEntry};
use crate::infrastructure::logging::RefreshJournal;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Entries kept per group unless configured otherwise.
pub const DEFAULT_ENTRIES_PER_GROUP: usize = 256;

/// Keeps the most recent entries of every group; older ones are dropped.
#[derive(Clone)]
pub struct InMemoryJournal {
    entries: Arc<RwLock<HashMap<GroupId, VecDeque<RefreshEntry>>>>,
    per_group: usize,
}

impl Default for InMemoryJournal {
    fn default() -> Self {
        InMemoryJournal::with_capacity(DEFAULT_ENTRIES_PER_GROUP)
    }
}

impl InMemoryJournal {
    pub fn new() -> Self {
        InMemoryJournal::default()
    }

    pub fn with_capacity(per_group: usize) -> Self {
        InMemoryJournal {
            entries: Arc::new(RwLock::new(HashMap::new())),
            per_group: per_group.max(1),
        }
    }
}

#[async_trait]
impl RefreshJournal for InMemoryJournal {
    async fn record(
        &self,
        group_id: GroupId,
        action: &str,
        version: Option<u64>,
        details: serde_json::Value,
    ) -> Result<(), LedgerViewError> {
        let mut entries = self.entries.write().await;
        let group = entries.entry(group_id).or_default();
        if group.len() >= self.per_group {
            group.pop_front();
        }
        group.push_back(RefreshEntry {
            id: Uuid::new_v4().to_string(),
            group_id,
            action: action.to_string(),
            version,
            details,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn entries(&self, group_id: GroupId) -> Result<Vec<RefreshEntry>, LedgerViewError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&group_id)
            .map(|group| group.iter().cloned().collect())
            .unwrap_or_default())
    }
}
