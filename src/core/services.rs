use crate::core::aggregator::aggregate;
use crate::core::errors::{LedgerViewError, TransportError};
use crate::core::lookup::TransactionView;
use crate::core::models::{
    Account, AccountBalanceSheet, BilledTransaction, CurrentUser, GroupId, InterestHandle, RefreshEntry,
    TransactionId,
};
use crate::core::pipeline::DerivationPipeline;
use crate::core::router::SubscriptionRouter;
use crate::core::store::TransactionStore;
use crate::infrastructure::cache::SnapshotCache;
use crate::infrastructure::ledger::LedgerClient;
use crate::infrastructure::logging::RefreshJournal;
use crate::infrastructure::push::PushChannel;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct LedgerViewService<L, P, C, J>
where
    L: LedgerClient + 'static,
    P: PushChannel,
    C: SnapshotCache + 'static,
    J: RefreshJournal + 'static,
{
    ledger: Arc<L>,
    store: Arc<TransactionStore<L, C, J>>,
    router: SubscriptionRouter<L, C, J, P>,
    pipeline: DerivationPipeline,
    journal: Arc<J>,
}

impl<L, P, C, J> LedgerViewService<L, P, C, J>
where
    L: LedgerClient + 'static,
    P: PushChannel,
    C: SnapshotCache + 'static,
    J: RefreshJournal + 'static,
{
    pub fn new(ledger: L, push: P, cache: C, journal: J, fetch_timeout: Option<Duration>) -> Self {
        let ledger = Arc::new(ledger);
        let journal = Arc::new(journal);
        let store = Arc::new(TransactionStore::new(
            ledger.clone(),
            cache,
            journal.clone(),
            fetch_timeout,
        ));
        let router = SubscriptionRouter::new(store.clone(), Arc::new(push), journal.clone());
        LedgerViewService {
            ledger,
            store,
            router,
            pipeline: DerivationPipeline::new(),
            journal,
        }
    }

    pub fn store(&self) -> &TransactionStore<L, C, J> {
        &self.store
    }

    pub fn router(&self) -> &SubscriptionRouter<L, C, J, P> {
        &self.router
    }

    pub fn pipeline(&self) -> &DerivationPipeline {
        &self.pipeline
    }

    /// Starts (or joins) live updates for a group. Keep the handle to stop.
    pub async fn watch_group(&self, group_id: GroupId) -> Result<InterestHandle, LedgerViewError> {
        let handle = self.router.acquire(group_id).await?;
        debug!("Group {} watched through handle {}", group_id, handle.id);
        Ok(handle)
    }

    /// Gives back a handle from `watch_group`. Returns the holders left.
    pub async fn unwatch_group(&self, handle: InterestHandle) -> Result<usize, LedgerViewError> {
        let group_id = handle.group_id;
        let holders = self.router.release(handle).await?;
        if holders == 0 {
            self.pipeline.forget_group(group_id).await;
        }
        Ok(holders)
    }

    /// Re-fetches a group on demand. Returns the new snapshot version.
    pub async fn refresh_group(&self, group_id: GroupId) -> Result<u64, LedgerViewError> {
        let snapshot = self.store.refresh(group_id).await?;
        info!("Group {} refreshed to version {}", group_id, snapshot.version);
        Ok(snapshot.version)
    }

    /// Every transaction the user can see, billed and in presentation order.
    pub async fn transactions_seen_by_user(
        &self,
        group_id: GroupId,
        identity: &(impl CurrentUser + Sync),
    ) -> Result<Arc<TransactionView>, LedgerViewError> {
        let user = identity.current_user()?;
        let snapshot = self.store.get(group_id).await?;
        Ok(self.pipeline.view(&snapshot, user.id).await)
    }

    pub async fn transaction_by_id(
        &self,
        group_id: GroupId,
        identity: &(impl CurrentUser + Sync),
        transaction_id: TransactionId,
    ) -> Result<Option<BilledTransaction>, LedgerViewError> {
        let view = self.transactions_seen_by_user(group_id, identity).await?;
        Ok(view.find(transaction_id).cloned())
    }

    pub async fn account_balances(
        &self,
        group_id: GroupId,
        identity: &(impl CurrentUser + Sync),
    ) -> Result<AccountBalanceSheet, LedgerViewError> {
        let (view, accounts) = futures::try_join!(
            self.transactions_seen_by_user(group_id, identity),
            self.group_accounts(group_id)
        )?;
        Ok(aggregate(view.transactions(), &accounts))
    }

    pub async fn group_accounts(&self, group_id: GroupId) -> Result<Vec<Account>, LedgerViewError> {
        Ok(self.ledger.group_accounts(group_id).await?)
    }

    pub async fn refresh_log(&self, group_id: GroupId) -> Result<Vec<RefreshEntry>, LedgerViewError> {
        self.journal.entries(group_id).await
    }

    pub async fn last_failure(&self, group_id: GroupId) -> Option<TransportError> {
        self.store.last_failure(group_id).await
    }
}
