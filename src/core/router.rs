use crate::constants::{SUBSCRIBE_FAILED, SUBSCRIBED, TRANSACTION_SUBSCRIPTION, UNSUBSCRIBED};
use crate::core::errors::LedgerViewError;
use crate::core::models::{GroupId, InterestHandle, Notification};
use crate::core::store::TransactionStore;
use crate::infrastructure::cache::SnapshotCache;
use crate::infrastructure::ledger::LedgerClient;
use crate::infrastructure::logging::RefreshJournal;
use crate::infrastructure::push::{NotificationHandler, PushChannel};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, info, warn};

struct Interest {
    holders: HashSet<u64>,
    /// Cleared on release, before the retire fence is drawn
    watched: Arc<AtomicBool>,
    stop: oneshot::Sender<()>,
}

/// Keeps one push subscription per watched group and refetches the group's
/// transactions whenever a matching notification arrives.
///
/// Every `acquire` hands out its own `InterestHandle`. The first one
/// subscribes; releasing the last one unsubscribes and retires the group's
/// snapshot.
pub struct SubscriptionRouter<L, C, J, P>
where
    L: LedgerClient + 'static,
    C: SnapshotCache + 'static,
    J: RefreshJournal + 'static,
    P: PushChannel,
{
    store: Arc<TransactionStore<L, C, J>>,
    push: Arc<P>,
    journal: Arc<J>,
    interests: Mutex<HashMap<GroupId, Interest>>,
    next_handle: AtomicU64,
}

impl<L, C, J, P> SubscriptionRouter<L, C, J, P>
where
    L: LedgerClient + 'static,
    C: SnapshotCache + 'static,
    J: RefreshJournal + 'static,
    P: PushChannel,
{
    pub fn new(store: Arc<TransactionStore<L, C, J>>, push: Arc<P>, journal: Arc<J>) -> Self {
        SubscriptionRouter {
            store,
            push,
            journal,
            interests: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Registers interest in a group.
    pub async fn acquire(&self, group_id: GroupId) -> Result<InterestHandle, LedgerViewError> {
        let mut interests = self.interests.lock().await;
        let handle = InterestHandle {
            group_id,
            id: self.next_handle.fetch_add(1, Ordering::SeqCst) + 1,
        };
        if let Some(interest) = interests.get_mut(&group_id) {
            interest.holders.insert(handle.id);
            return Ok(handle);
        }

        // capacity 1: a queued trigger is the pending-refetch flag
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let handler = notification_handler(group_id, trigger_tx);
        if let Err(e) = self.push.subscribe(TRANSACTION_SUBSCRIPTION, group_id, handler).await {
            warn!("Subscribing to group {} failed: {}", group_id, e);
            self.journal
                .record(group_id, SUBSCRIBE_FAILED, None, json!({ "message": e.message }))
                .await?;
            return Err(e.into());
        }

        let watched = Arc::new(AtomicBool::new(true));
        let (stop_tx, stop_rx) = oneshot::channel();
        tokio::spawn(refresh_worker(
            self.store.clone(),
            group_id,
            watched.clone(),
            trigger_rx,
            stop_rx,
        ));
        interests.insert(
            group_id,
            Interest {
                holders: HashSet::from([handle.id]),
                watched,
                stop: stop_tx,
            },
        );

        self.journal
            .record(group_id, SUBSCRIBED, None, json!({ "kind": TRANSACTION_SUBSCRIPTION }))
            .await?;
        info!("Subscribed to transactions of group {}", group_id);
        Ok(handle)
    }

    /// Gives back one handle. Returns the number of holders left.
    ///
    /// If unsubscribing fails the handle stays valid and the group stays
    /// watched.
    pub async fn release(&self, handle: InterestHandle) -> Result<usize, LedgerViewError> {
        let group_id = handle.group_id;
        let mut interests = self.interests.lock().await;
        let unknown = LedgerViewError::UnknownInterest {
            group_id,
            handle_id: handle.id,
        };
        let Some(interest) = interests.get_mut(&group_id) else {
            return Err(unknown);
        };
        if !interest.holders.contains(&handle.id) {
            return Err(unknown);
        }
        if interest.holders.len() > 1 {
            interest.holders.remove(&handle.id);
            return Ok(interest.holders.len());
        }

        self.push.unsubscribe(TRANSACTION_SUBSCRIPTION, group_id).await?;

        if let Some(interest) = interests.remove(&group_id) {
            interest.watched.store(false, Ordering::SeqCst);
            // the worker may already be gone
            let _ = interest.stop.send(());
        }
        self.store.retire(group_id).await?;

        self.journal
            .record(group_id, UNSUBSCRIBED, None, json!({ "kind": TRANSACTION_SUBSCRIPTION }))
            .await?;
        info!("Unsubscribed from transactions of group {}", group_id);
        Ok(0)
    }

    pub async fn holders(&self, group_id: GroupId) -> usize {
        self.interests
            .lock()
            .await
            .get(&group_id)
            .map_or(0, |interest| interest.holders.len())
    }

    pub async fn watched_groups(&self) -> Vec<GroupId> {
        let mut groups: Vec<GroupId> = self.interests.lock().await.keys().copied().collect();
        groups.sort_unstable();
        groups
    }
}

fn notification_handler(group_id: GroupId, trigger: mpsc::Sender<()>) -> NotificationHandler {
    Arc::new(move |notification: Notification| {
        if notification.subscription_type != TRANSACTION_SUBSCRIPTION || notification.element_id != group_id {
            return;
        }
        match trigger.try_send(()) {
            Ok(()) => debug!(
                "Refetch of group {} queued (transaction {:?})",
                group_id, notification.transaction_id
            ),
            Err(TrySendError::Full(())) => debug!("Refetch of group {} already pending", group_id),
            Err(TrySendError::Closed(())) => debug!("Ignoring notification for released group {}", group_id),
        }
    })
}

/// Runs at most one fetch at a time for its group. Results landing after
/// release are discarded through `watched`.
async fn refresh_worker<L, C, J>(
    store: Arc<TransactionStore<L, C, J>>,
    group_id: GroupId,
    watched: Arc<AtomicBool>,
    mut trigger: mpsc::Receiver<()>,
    mut stop: oneshot::Receiver<()>,
) where
    L: LedgerClient,
    C: SnapshotCache,
    J: RefreshJournal,
{
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            received = trigger.recv() => match received {
                Some(()) => {
                    if let Err(e) = store.refresh_watched(group_id, &watched).await {
                        warn!("Refetch of group {} failed: {}", group_id, e);
                    }
                }
                None => break,
            },
        }
    }
    debug!("Refresh worker for group {} stopped", group_id);
}
