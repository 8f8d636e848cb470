use super::UserId;
use crate::core::errors::LedgerViewError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
}

/// Supplies the identity whose drafts are merged into a view.
pub trait CurrentUser {
    fn current_user(&self) -> Result<User, LedgerViewError>;
}

impl CurrentUser for User {
    fn current_user(&self) -> Result<User, LedgerViewError> {
        Ok(self.clone())
    }
}
