use crate::core::errors::{Operation, TransportError};
use crate::core::models::{Account, GroupId, RawTransaction, TransactionId};
use crate::infrastructure::ledger::LedgerClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GroupRecords {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

/// In-memory ledger for tests and the demo server.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    groups: Arc<RwLock<HashMap<GroupId, GroupRecords>>>,
    unavailable: Arc<AtomicBool>,
    transaction_fetches: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        InMemoryLedger::default()
    }

    /// Builds a ledger from a JSON object keyed by group id.
    pub fn from_seed_json(seed: &str) -> Result<Self, serde_json::Error> {
        let groups: HashMap<GroupId, GroupRecords> = serde_json::from_str(seed)?;
        Ok(InMemoryLedger {
            groups: Arc::new(RwLock::new(groups)),
            ..InMemoryLedger::default()
        })
    }

    pub async fn put_account(&self, group_id: GroupId, account: Account) {
        let mut groups = self.groups.write().await;
        let accounts = &mut groups.entry(group_id).or_default().accounts;
        accounts.retain(|a| a.id != account.id);
        accounts.push(account);
    }

    /// Inserts or replaces a transaction by id.
    pub async fn put_transaction(&self, group_id: GroupId, transaction: RawTransaction) {
        let mut groups = self.groups.write().await;
        let transactions = &mut groups.entry(group_id).or_default().transactions;
        transactions.retain(|t| t.id != transaction.id);
        transactions.push(transaction);
    }

    pub async fn remove_transaction(&self, group_id: GroupId, transaction_id: TransactionId) {
        if let Some(records) = self.groups.write().await.get_mut(&group_id) {
            records.transactions.retain(|t| t.id != transaction_id);
        }
    }

    /// Makes every subsequent call fail with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn transaction_fetches(&self) -> usize {
        self.transaction_fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self, operation: Operation, group_id: GroupId) -> Result<(), TransportError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TransportError::new(operation, group_id, "ledger unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn fetch_transactions(&self, group_id: GroupId) -> Result<Vec<RawTransaction>, TransportError> {
        self.transaction_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available(Operation::FetchTransactions, group_id)?;
        let groups = self.groups.read().await;
        Ok(groups
            .get(&group_id)
            .map(|records| records.transactions.clone())
            .unwrap_or_default())
    }

    async fn group_accounts(&self, group_id: GroupId) -> Result<Vec<Account>, TransportError> {
        self.check_available(Operation::FetchAccounts, group_id)?;
        let groups = self.groups.read().await;
        Ok(groups
            .get(&group_id)
            .map(|records| records.accounts.clone())
            .unwrap_or_default())
    }
}
