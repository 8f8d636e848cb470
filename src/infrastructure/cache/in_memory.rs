use crate::core::errors::LedgerViewError;
use crate::core::models::{GroupId, RawTransaction};
use crate::infrastructure::cache::{ReplaceOutcome, Snapshot, SnapshotCache};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct GroupSlot {
    snapshot: Option<Snapshot>,
    /// Highest sequence applied or fenced
    high_water: u64,
    version: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    slots: Arc<RwLock<HashMap<GroupId, GroupSlot>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache {
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SnapshotCache for InMemoryCache {
    async fn snapshot(&self, group_id: GroupId) -> Result<Option<Snapshot>, LedgerViewError> {
        let slots = self.slots.read().await;
        Ok(slots.get(&group_id).and_then(|slot| slot.snapshot.clone()))
    }

    async fn replace(
        &self,
        group_id: GroupId,
        sequence: u64,
        transactions: Vec<RawTransaction>,
    ) -> Result<ReplaceOutcome, LedgerViewError> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(group_id).or_default();
        if sequence <= slot.high_water {
            return Ok(ReplaceOutcome::Superseded(slot.snapshot.clone()));
        }

        slot.high_water = sequence;
        slot.version += 1;
        let snapshot = Snapshot {
            group_id,
            version: slot.version,
            sequence,
            fetched_at: chrono::Utc::now(),
            transactions: transactions.into(),
        };
        slot.snapshot = Some(snapshot.clone());
        Ok(ReplaceOutcome::Applied(snapshot))
    }

    async fn is_current(&self, group_id: GroupId, sequence: u64) -> Result<bool, LedgerViewError> {
        let slots = self.slots.read().await;
        Ok(slots.get(&group_id).is_none_or(|slot| sequence > slot.high_water))
    }

    async fn retire(&self, group_id: GroupId, fence: u64) -> Result<(), LedgerViewError> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(group_id).or_default();
        slot.high_water = slot.high_water.max(fence);
        slot.snapshot = None;
        Ok(())
    }
}
