use crate::constants::{REFRESH_FAILED, REFRESH_SUPERSEDED, SNAPSHOT_REPLACED, SNAPSHOT_RETIRED};
use crate::core::errors::{LedgerViewError, Operation, TransportError};
use crate::core::models::{GroupId, RawTransaction};
use crate::infrastructure::cache::{ReplaceOutcome, Snapshot, SnapshotCache};
use crate::infrastructure::ledger::LedgerClient;
use crate::infrastructure::logging::RefreshJournal;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Raw transaction snapshots per group, refreshed wholesale from the ledger.
///
/// Every fetch draws a sequence number before it starts. A result is only
/// installed if no fetch with a higher number has landed and the group has
/// not been retired since, so a slow fetch can never overwrite a newer one.
pub struct TransactionStore<L: LedgerClient, C: SnapshotCache, J: RefreshJournal> {
    ledger: Arc<L>,
    cache: C,
    journal: Arc<J>,
    sequence: AtomicU64,
    fetch_timeout: Option<Duration>,
    failures: RwLock<HashMap<GroupId, TransportError>>,
}

impl<L: LedgerClient, C: SnapshotCache, J: RefreshJournal> TransactionStore<L, C, J> {
    pub fn new(ledger: Arc<L>, cache: C, journal: Arc<J>, fetch_timeout: Option<Duration>) -> Self {
        TransactionStore {
            ledger,
            cache,
            journal,
            sequence: AtomicU64::new(0),
            fetch_timeout,
            failures: RwLock::new(HashMap::new()),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The cached snapshot, fetching it first if the group was never loaded.
    pub async fn get(&self, group_id: GroupId) -> Result<Snapshot, LedgerViewError> {
        if let Some(snapshot) = self.cache.snapshot(group_id).await? {
            return Ok(snapshot);
        }
        debug!("No snapshot cached for group {}, fetching", group_id);
        self.refresh(group_id).await
    }

    /// Re-fetches the group. On failure the cached snapshot stays as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&self, group_id: GroupId) -> Result<Snapshot, LedgerViewError> {
        self.refresh_while(group_id, None).await
    }

    /// Like `refresh`, but the outcome is discarded if `watched` has been
    /// cleared by the time the fetch completes.
    #[instrument(skip(self, watched))]
    pub async fn refresh_watched(&self, group_id: GroupId, watched: &AtomicBool) -> Result<Snapshot, LedgerViewError> {
        self.refresh_while(group_id, Some(watched)).await
    }

    async fn refresh_while(&self, group_id: GroupId, watched: Option<&AtomicBool>) -> Result<Snapshot, LedgerViewError> {
        let sequence = self.next_sequence();
        let fetched = self.fetch(group_id).await;
        if watched.is_some_and(|flag| !flag.load(Ordering::SeqCst)) {
            let current = self.cache.snapshot(group_id).await?;
            return self.discard(group_id, sequence, current).await;
        }
        match fetched {
            Ok(transactions) => self.apply(group_id, sequence, transactions).await,
            Err(e) => self.fail(group_id, sequence, e).await,
        }
    }

    /// Atomically swaps in a complete snapshot for the group.
    pub async fn replace(
        &self,
        group_id: GroupId,
        transactions: Vec<RawTransaction>,
    ) -> Result<Snapshot, LedgerViewError> {
        let sequence = self.next_sequence();
        self.apply(group_id, sequence, transactions).await
    }

    /// Evicts the group and turns every fetch still in flight into a no-op.
    pub async fn retire(&self, group_id: GroupId) -> Result<(), LedgerViewError> {
        let fence = self.next_sequence();
        self.cache.retire(group_id, fence).await?;
        self.failures.write().await.remove(&group_id);
        self.journal
            .record(group_id, SNAPSHOT_RETIRED, None, json!({ "fence": fence }))
            .await?;
        debug!("Retired group {} at sequence {}", group_id, fence);
        Ok(())
    }

    /// Most recent fetch failure not yet followed by a successful refresh.
    pub async fn last_failure(&self, group_id: GroupId) -> Option<TransportError> {
        self.failures.read().await.get(&group_id).cloned()
    }

    async fn fetch(&self, group_id: GroupId) -> Result<Vec<RawTransaction>, TransportError> {
        let fetch = self.ledger.fetch_transactions(group_id);
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
                TransportError::new(
                    Operation::FetchTransactions,
                    group_id,
                    format!("timed out after {:?}", limit),
                )
            })?,
            None => fetch.await,
        }
    }

    async fn apply(
        &self,
        group_id: GroupId,
        sequence: u64,
        transactions: Vec<RawTransaction>,
    ) -> Result<Snapshot, LedgerViewError> {
        match self.cache.replace(group_id, sequence, transactions).await? {
            ReplaceOutcome::Applied(snapshot) => {
                self.failures.write().await.remove(&group_id);
                info!(
                    "Group {} now at version {} with {} transactions",
                    group_id,
                    snapshot.version,
                    snapshot.transactions.len()
                );
                self.journal
                    .record(
                        group_id,
                        SNAPSHOT_REPLACED,
                        Some(snapshot.version),
                        json!({ "sequence": sequence, "transactions": snapshot.transactions.len() }),
                    )
                    .await?;
                Ok(snapshot)
            }
            ReplaceOutcome::Superseded(current) => self.discard(group_id, sequence, current).await,
        }
    }

    /// Records a failed fetch, unless a newer fetch or a fence already
    /// overtook it.
    async fn fail(&self, group_id: GroupId, sequence: u64, e: TransportError) -> Result<Snapshot, LedgerViewError> {
        {
            let mut failures = self.failures.write().await;
            if !self.cache.is_current(group_id, sequence).await? {
                drop(failures);
                debug!("Ignoring failure of superseded fetch {} of group {}: {}", sequence, group_id, e);
                let current = self.cache.snapshot(group_id).await?;
                return self.discard(group_id, sequence, current).await;
            }
            warn!("Fetching transactions of group {} failed: {}", group_id, e);
            failures.insert(group_id, e.clone());
        }
        let version = self.cache.snapshot(group_id).await?.map(|s| s.version);
        self.journal
            .record(
                group_id,
                REFRESH_FAILED,
                version,
                json!({ "sequence": sequence, "operation": e.operation, "message": e.message }),
            )
            .await?;
        Err(e.into())
    }

    async fn discard(
        &self,
        group_id: GroupId,
        sequence: u64,
        current: Option<Snapshot>,
    ) -> Result<Snapshot, LedgerViewError> {
        debug!("Discarding fetch {} of group {}", sequence, group_id);
        self.journal
            .record(
                group_id,
                REFRESH_SUPERSEDED,
                current.as_ref().map(|s| s.version),
                json!({ "sequence": sequence }),
            )
            .await?;
        current.ok_or(LedgerViewError::RefreshSuperseded(group_id))
    }
}
