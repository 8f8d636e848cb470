use crate::core::models::{AccountBalance, AccountId, BilledTransaction, EffectiveTransaction, TransactionState};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

/// Attaches the per-account decomposition to an effective transaction.
pub fn bill_transaction(transaction: EffectiveTransaction) -> BilledTransaction {
    let account_balances = bill(&transaction);
    BilledTransaction {
        transaction,
        account_balances,
    }
}

/// Splits the value of a transaction over its accounts.
///
/// Purchase items are billed to their usages first. Whatever is left of the
/// value (including the communal part of every item) is split by debitor
/// shares, while creditors are always credited the full value. Transfers
/// carry no purchase items and only go through the share split.
pub fn bill(transaction: &EffectiveTransaction) -> BTreeMap<AccountId, AccountBalance> {
    let state = &transaction.state;
    let mut balances: BTreeMap<AccountId, AccountBalance> = BTreeMap::new();

    let remaining = bill_purchase_items(state, &mut balances);

    let total_debitor_weight: Decimal = state.debitor_shares.values().copied().sum();
    for (account_id, weight) in &state.debitor_shares {
        balances.entry(*account_id).or_default().common_debitors +=
            weighted_share(remaining, *weight, total_debitor_weight);
    }

    let total_creditor_weight: Decimal = state.creditor_shares.values().copied().sum();
    for (account_id, weight) in &state.creditor_shares {
        balances.entry(*account_id).or_default().common_creditors +=
            weighted_share(state.value, *weight, total_creditor_weight);
    }

    balances
}

/// Bills item usages into `positions` and returns what remains to be split
/// over the debitor shares.
fn bill_purchase_items(state: &TransactionState, balances: &mut BTreeMap<AccountId, AccountBalance>) -> Decimal {
    let mut remaining = state.value;

    for item in state.active_items() {
        let total_weight = item.total_weight();

        for (account_id, usage) in &item.usages {
            balances.entry(*account_id).or_default().positions +=
                weighted_share(item.price, *usage, total_weight);
        }

        let common_remainder = weighted_share(item.price, item.communist_shares, total_weight);
        remaining = remaining - item.price + common_remainder;
    }

    remaining
}

/// `amount * (weight / total)`, or zero when there is no weight to split by.
///
/// The ratio is taken first so the product never exceeds `amount` for
/// non-negative weights.
fn weighted_share(amount: Decimal, weight: Decimal, total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    weight
        .checked_div(total)
        .and_then(|ratio| amount.checked_mul(ratio))
        .unwrap_or_else(|| {
            warn!("Share {} / {} of {} is out of range, billing zero", weight, total, amount);
            Decimal::ZERO
        })
}
