use crate::core::biller::bill_transaction;
use crate::core::lookup::TransactionView;
use crate::core::models::{GroupId, RawTransaction, UserId};
use crate::core::resolver::resolve;
use crate::infrastructure::cache::Snapshot;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Resolve, bill and sort one snapshot for one viewer.
pub fn derive(raw_transactions: &[RawTransaction], viewer_id: UserId) -> TransactionView {
    let billed = resolve(raw_transactions, viewer_id)
        .into_iter()
        .map(bill_transaction)
        .collect();
    TransactionView::new(billed)
}

/// Default number of (group, viewer) views kept.
pub const DEFAULT_MEMO_CAPACITY: usize = 1024;

struct MemoEntry {
    version: u64,
    view: Arc<TransactionView>,
    last_used: AtomicU64,
}

/// Memoizes derived views per (group, viewer) by snapshot version.
///
/// Holds at most `capacity` views; the least recently used one is dropped
/// first, so groups read once and never again age out.
pub struct DerivationPipeline {
    memo: RwLock<HashMap<(GroupId, UserId), MemoEntry>>,
    capacity: usize,
    clock: AtomicU64,
    derivations: AtomicUsize,
}

impl Default for DerivationPipeline {
    fn default() -> Self {
        DerivationPipeline::with_capacity(DEFAULT_MEMO_CAPACITY)
    }
}

impl DerivationPipeline {
    pub fn new() -> Self {
        DerivationPipeline::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        DerivationPipeline {
            memo: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            clock: AtomicU64::new(0),
            derivations: AtomicUsize::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn view(&self, snapshot: &Snapshot, viewer_id: UserId) -> Arc<TransactionView> {
        let key = (snapshot.group_id, viewer_id);
        if let Some(entry) = self.memo.read().await.get(&key) {
            if entry.version == snapshot.version {
                entry.last_used.store(self.tick(), Ordering::Relaxed);
                return entry.view.clone();
            }
        }

        let view = Arc::new(derive(&snapshot.transactions, viewer_id));
        self.derivations.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Derived view of group {} version {} for user {}",
            snapshot.group_id, snapshot.version, viewer_id
        );

        let mut memo = self.memo.write().await;
        let stale = memo
            .get(&key)
            .is_none_or(|entry| entry.version < snapshot.version);
        if stale {
            memo.insert(
                key,
                MemoEntry {
                    version: snapshot.version,
                    view: view.clone(),
                    last_used: AtomicU64::new(self.tick()),
                },
            );
            while memo.len() > self.capacity {
                let oldest = memo
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                    .map(|(key, _)| *key);
                match oldest {
                    Some(oldest) => {
                        memo.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        view
    }

    pub async fn forget_group(&self, group_id: GroupId) {
        self.memo.write().await.retain(|(group, _), _| *group != group_id);
    }

    /// Number of (group, viewer) views currently memoized.
    pub async fn memoized(&self) -> usize {
        self.memo.read().await.len()
    }

    /// Number of derivations run so far.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }
}
