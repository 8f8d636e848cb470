use crate::core::models::{BilledTransaction, TransactionId};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Presentation order: billed date ascending, then id ascending.
pub fn presentation_order(a: &BilledTransaction, b: &BilledTransaction) -> Ordering {
    a.transaction
        .state
        .billed_at
        .cmp(&b.transaction.state.billed_at)
        .then_with(|| a.id().cmp(&b.id()))
}

/// Finds a transaction by id. Absence is a normal outcome.
pub fn find(billed_transactions: &[BilledTransaction], transaction_id: TransactionId) -> Option<&BilledTransaction> {
    billed_transactions.iter().find(|t| t.id() == transaction_id)
}

/// The billed transactions one viewer sees, sorted and indexed by id.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct TransactionView {
    transactions: Vec<BilledTransaction>,
    #[serde(skip)]
    index: HashMap<TransactionId, usize>,
}

impl TransactionView {
    pub fn new(mut transactions: Vec<BilledTransaction>) -> Self {
        transactions.sort_by(presentation_order);
        let index = transactions
            .iter()
            .enumerate()
            .map(|(position, transaction)| (transaction.id(), position))
            .collect();
        TransactionView { transactions, index }
    }

    pub fn find(&self, transaction_id: TransactionId) -> Option<&BilledTransaction> {
        self.index
            .get(&transaction_id)
            .and_then(|position| self.transactions.get(*position))
    }

    pub fn transactions(&self) -> &[BilledTransaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
