use crate::core::models::{GroupId, TransactionId};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The collaborator call that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    FetchTransactions,
    FetchAccounts,
    Subscribe,
    Unsubscribe,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::FetchTransactions => "fetch_transactions",
            Operation::FetchAccounts => "fetch_accounts",
            Operation::Subscribe => "subscribe",
            Operation::Unsubscribe => "unsubscribe",
        };
        write!(f, "{}", s)
    }
}

/// A network or ledger failure reported by one of the remote collaborators.
///
/// Recoverable: the cached snapshot of the group is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{operation} failed for group {group_id}: {message}")]
pub struct TransportError {
    pub operation: Operation,
    pub group_id: GroupId,
    pub message: String,
}

impl TransportError {
    pub fn new(operation: Operation, group_id: GroupId, message: impl Into<String>) -> Self {
        TransportError {
            operation,
            group_id,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerViewError {
    /// Fetch or subscription failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Raw transaction with neither a committed state nor any pending change
    #[error("Transaction {0} has neither a committed state nor pending changes")]
    MalformedRecord(TransactionId),

    #[error("Transaction {transaction_id} not found in group {group_id}")]
    TransactionNotFound {
        group_id: GroupId,
        transaction_id: TransactionId,
    },

    /// Release of a handle the router never issued, or already released
    #[error("No interest {handle_id} held in group {group_id}")]
    UnknownInterest { group_id: GroupId, handle_id: u64 },

    /// A fetch completed after its group was released and nothing is cached
    #[error("Refresh of group {0} was superseded")]
    RefreshSuperseded(GroupId),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}
