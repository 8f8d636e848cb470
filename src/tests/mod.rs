mod aggregator_tests;
mod api_tests;
mod lookup_tests;

use crate::api::handlers::SplitbookService;
use crate::core::errors::{Operation, TransportError};
use crate::core::models::{
    Account, AccountId, AccountType, GroupId, PurchaseItem, RawTransaction, TransactionId, TransactionState,
    TransactionType,
};
use crate::core::services::LedgerViewService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::ledger::LedgerClient;
use crate::infrastructure::ledger::in_memory::InMemoryLedger;
use crate::infrastructure::logging::in_memory::InMemoryJournal;
use crate::infrastructure::push::in_memory::InMemoryPushChannel;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, oneshot};

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CAROL: AccountId = 3;
pub const DAVE: AccountId = 4;

pub fn create_test_service() -> (SplitbookService, InMemoryLedger, InMemoryPushChannel) {
    let ledger = InMemoryLedger::new();
    let push = InMemoryPushChannel::new();
    let service = LedgerViewService::new(
        ledger.clone(),
        push.clone(),
        InMemoryCache::new(),
        InMemoryJournal::new(),
        None,
    );
    (service, ledger, push)
}

pub type GatedService = LedgerViewService<GatedLedger, InMemoryPushChannel, InMemoryCache, InMemoryJournal>;

pub fn create_gated_service() -> (GatedService, GatedLedger, InMemoryPushChannel) {
    let ledger = GatedLedger::default();
    let push = InMemoryPushChannel::new();
    let service = LedgerViewService::new(
        ledger.clone(),
        push.clone(),
        InMemoryCache::new(),
        InMemoryJournal::new(),
        None,
    );
    (service, ledger, push)
}

/// Ledger whose fetches complete only when the test releases them.
///
/// A fetch with no gate queued returns an empty group at once. Dropping a
/// gate's sender fails the fetch.
#[derive(Clone, Default)]
pub struct GatedLedger {
    gates: Arc<Mutex<VecDeque<oneshot::Receiver<Vec<RawTransaction>>>>>,
    started: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl GatedLedger {
    pub async fn gate(&self) -> oneshot::Sender<Vec<RawTransaction>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push_back(rx);
        tx
    }

    pub async fn wait_for_fetches(&self, count: usize) {
        while self.started.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn fetches(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Most fetches of any group that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for GatedLedger {
    async fn fetch_transactions(&self, group_id: GroupId) -> Result<Vec<RawTransaction>, TransportError> {
        let gate = self.gates.lock().await.pop_front();
        self.started.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let fetched = match gate {
            Some(gate) => gate
                .await
                .map_err(|_| TransportError::new(Operation::FetchTransactions, group_id, "gate dropped")),
            None => Ok(Vec::new()),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        fetched
    }

    async fn group_accounts(&self, _group_id: GroupId) -> Result<Vec<Account>, TransportError> {
        Ok(Vec::new())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn shares(pairs: &[(AccountId, Decimal)]) -> BTreeMap<AccountId, Decimal> {
    pairs.iter().copied().collect()
}

pub fn account(id: AccountId, name: &str) -> Account {
    Account {
        id,
        kind: AccountType::Personal,
        name: name.to_string(),
        description: String::new(),
        priority: 0,
        deleted: false,
    }
}

pub fn item(price: Decimal, communist_shares: Decimal, usages: &[(AccountId, Decimal)]) -> PurchaseItem {
    PurchaseItem {
        id: 0,
        name: "item".to_string(),
        price,
        communist_shares,
        usages: shares(usages),
        deleted: false,
    }
}

pub fn state(
    description: &str,
    value: Decimal,
    billed_at: NaiveDate,
    debitors: &[(AccountId, Decimal)],
    creditors: &[(AccountId, Decimal)],
) -> TransactionState {
    TransactionState {
        description: description.to_string(),
        value,
        currency_symbol: "€".to_string(),
        currency_conversion_rate: Decimal::ONE,
        billed_at,
        debitor_shares: shares(debitors),
        creditor_shares: shares(creditors),
        purchase_items: None,
        deleted: false,
    }
}

/// Alice gives `value` to Bob.
pub fn transfer_state(value: Decimal, billed_at: NaiveDate) -> TransactionState {
    state("transfer", value, billed_at, &[(BOB, dec!(1))], &[(ALICE, dec!(1))])
}

/// Carol pays 90 for one item used once by Alice and twice by Bob, with one
/// communal share split evenly between the two of them.
pub fn shopping_state() -> TransactionState {
    let mut shopping = state(
        "shopping",
        dec!(90),
        date(2024, 3, 1),
        &[(ALICE, dec!(1)), (BOB, dec!(1))],
        &[(CAROL, dec!(1))],
    );
    shopping.purchase_items = Some(vec![item(dec!(90), dec!(1), &[(ALICE, dec!(1)), (BOB, dec!(2))])]);
    shopping
}

pub fn committed(id: TransactionId, kind: TransactionType, state: TransactionState) -> RawTransaction {
    RawTransaction {
        id,
        kind,
        committed_state: Some(state),
        pending_changes: HashMap::new(),
    }
}
