use crate::core::models::{Account, AccountBalanceSheet, BilledTransaction};
use tracing::debug;

/// Folds billed transactions into one net balance per account.
///
/// Every known account starts at zero. Deleted transactions (a viewer's draft
/// may be a deletion) contribute nothing. Accounts billed by a transaction
/// but missing from `accounts` still get an entry.
pub fn aggregate(billed_transactions: &[BilledTransaction], accounts: &[Account]) -> AccountBalanceSheet {
    let mut sheet = AccountBalanceSheet::with_accounts(accounts.iter().map(|account| account.id));

    for transaction in billed_transactions.iter().filter(|t| !t.is_deleted()) {
        for (account_id, balance) in &transaction.account_balances {
            if !sheet.contains(*account_id) {
                debug!(
                    "Transaction {} bills unknown account {}",
                    transaction.id(),
                    account_id
                );
            }
            sheet.credit(*account_id, balance.net());
        }
    }

    sheet
}
