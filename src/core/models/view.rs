use super::{AccountBalance, AccountId, TransactionId, TransactionState, TransactionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A transaction as one viewer sees it: the committed state or their own draft.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EffectiveTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(flatten)]
    pub state: TransactionState,
    pub is_wip: bool,
    pub has_committed_changes: bool,
}

/// An effective transaction together with its per-account decomposition.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BilledTransaction {
    #[serde(flatten)]
    pub transaction: EffectiveTransaction,
    #[schema(value_type = Object)]
    pub account_balances: BTreeMap<AccountId, AccountBalance>,
}

impl BilledTransaction {
    pub fn id(&self) -> TransactionId {
        self.transaction.id
    }

    pub fn is_deleted(&self) -> bool {
        self.transaction.state.deleted
    }
}
