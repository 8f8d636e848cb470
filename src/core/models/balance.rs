use super::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// What one transaction bills to one account.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountBalance {
    /// Share of itemized purchase positions used by the account
    #[schema(value_type = String)]
    pub positions: Decimal,
    #[schema(value_type = String)]
    pub common_debitors: Decimal,
    #[schema(value_type = String)]
    pub common_creditors: Decimal,
}

impl AccountBalance {
    /// Positive when the account is owed money by this transaction.
    pub fn net(&self) -> Decimal {
        self.common_creditors - self.positions - self.common_debitors
    }
}

/// Net balance per account. Positive means net creditor.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccountBalanceSheet(BTreeMap<AccountId, Decimal>);

impl AccountBalanceSheet {
    pub fn with_accounts(account_ids: impl IntoIterator<Item = AccountId>) -> Self {
        AccountBalanceSheet(account_ids.into_iter().map(|id| (id, Decimal::ZERO)).collect())
    }

    pub fn credit(&mut self, account_id: AccountId, amount: Decimal) {
        *self.0.entry(account_id).or_insert(Decimal::ZERO) += amount;
    }

    pub fn get(&self, account_id: AccountId) -> Option<Decimal> {
        self.0.get(&account_id).copied()
    }

    pub fn contains(&self, account_id: AccountId) -> bool {
        self.0.contains_key(&account_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AccountId, Decimal)> + '_ {
        self.0.iter().map(|(id, balance)| (*id, *balance))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all accounts; zero for a consistent ledger.
    pub fn total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    pub fn into_inner(self) -> BTreeMap<AccountId, Decimal> {
        self.0
    }
}
