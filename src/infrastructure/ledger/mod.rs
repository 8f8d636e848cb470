pub mod in_memory;

use crate::core::errors::TransportError;
use crate::core::models::{Account, GroupId, RawTransaction};
use async_trait::async_trait;

/// The remote ledger: source of truth for transactions and accounts.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn fetch_transactions(&self, group_id: GroupId) -> Result<Vec<RawTransaction>, TransportError>;
    async fn group_accounts(&self, group_id: GroupId) -> Result<Vec<Account>, TransportError>;
}
