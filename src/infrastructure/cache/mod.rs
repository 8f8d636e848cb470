pub mod in_memory;

use crate::core::errors::LedgerViewError;
use crate::core::models::{GroupId, RawTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// An immutable view of one group's raw transactions.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub group_id: GroupId,
    /// Monotonic per group, never reused
    pub version: u64,
    /// Sequence number of the fetch that produced it
    pub sequence: u64,
    pub fetched_at: DateTime<Utc>,
    pub transactions: Arc<[RawTransaction]>,
}

#[derive(Clone, Debug)]
pub enum ReplaceOutcome {
    Applied(Snapshot),
    /// A newer fetch was applied, or the group was fenced, first
    Superseded(Option<Snapshot>),
}

/// Per-group snapshot cache. Replacement is atomic and ordered by sequence.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn snapshot(&self, group_id: GroupId) -> Result<Option<Snapshot>, LedgerViewError>;

    /// Installs `transactions` unless a fetch with a higher sequence number
    /// already landed or the group was fenced past `sequence`.
    async fn replace(
        &self,
        group_id: GroupId,
        sequence: u64,
        transactions: Vec<RawTransaction>,
    ) -> Result<ReplaceOutcome, LedgerViewError>;

    /// Whether a fetch drawn at `sequence` could still be installed.
    async fn is_current(&self, group_id: GroupId, sequence: u64) -> Result<bool, LedgerViewError>;

    /// Evicts the snapshot and rejects every fetch sequenced before `fence`.
    async fn retire(&self, group_id: GroupId, fence: u64) -> Result<(), LedgerViewError>;
}
