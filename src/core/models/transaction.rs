use super::{AccountId, TransactionId, UserId};
use crate::core::errors::LedgerViewError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Purchase,
    Transfer,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PurchaseItem {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    /// Weight of the item that is not attributed to any usage
    #[serde(default)]
    #[schema(value_type = String)]
    pub communist_shares: Decimal,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub usages: BTreeMap<AccountId, Decimal>,
    #[serde(default)]
    pub deleted: bool,
}

impl PurchaseItem {
    pub fn total_weight(&self) -> Decimal {
        self.communist_shares + self.usages.values().copied().sum::<Decimal>()
    }
}

/// One version of a transaction: either the committed state or a user's draft.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TransactionState {
    pub description: String,
    #[schema(value_type = String)]
    pub value: Decimal,
    pub currency_symbol: String,
    #[serde(default = "default_conversion_rate")]
    #[schema(value_type = String)]
    pub currency_conversion_rate: Decimal,
    #[schema(value_type = String, format = Date)]
    pub billed_at: NaiveDate,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub debitor_shares: BTreeMap<AccountId, Decimal>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub creditor_shares: BTreeMap<AccountId, Decimal>,
    #[serde(default)]
    pub purchase_items: Option<Vec<PurchaseItem>>,
    #[serde(default)]
    pub deleted: bool,
}

fn default_conversion_rate() -> Decimal {
    Decimal::ONE
}

impl TransactionState {
    /// Purchase items that take part in billing.
    pub fn active_items(&self) -> impl Iterator<Item = &PurchaseItem> {
        self.purchase_items.iter().flatten().filter(|item| !item.deleted)
    }
}

/// A transaction exactly as cached from the remote ledger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(rename = "current_state", default)]
    pub committed_state: Option<TransactionState>,
    #[serde(default)]
    pub pending_changes: HashMap<UserId, TransactionState>,
}

impl RawTransaction {
    /// A record nobody can see is a data-integrity fault.
    pub fn validate(&self) -> Result<(), LedgerViewError> {
        if self.committed_state.is_none() && self.pending_changes.is_empty() {
            return Err(LedgerViewError::MalformedRecord(self.id));
        }
        Ok(())
    }

    pub fn draft_of(&self, user_id: UserId) -> Option<&TransactionState> {
        self.pending_changes.get(&user_id)
    }
}
