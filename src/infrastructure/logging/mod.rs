pub mod in_memory;

use crate::core::errors::LedgerViewError;
use crate::core::models::{GroupId, RefreshEntry};
use async_trait::async_trait;

#[async_trait]
pub trait RefreshJournal: Send + Sync {
    async fn record(
        &self,
        group_id: GroupId,
        action: &str,
        version: Option<u64>,
        details: serde_json::Value,
    ) -> Result<(), LedgerViewError>;
    async fn entries(&self, group_id: GroupId) -> Result<Vec<RefreshEntry>, LedgerViewError>;
}
