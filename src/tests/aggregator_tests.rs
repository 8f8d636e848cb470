use super::*;
use crate::core::aggregator::aggregate;
use crate::core::biller::bill_transaction;
use crate::core::models::BilledTransaction;
use crate::core::resolver::resolve;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn billed(raw: &[crate::core::models::RawTransaction]) -> Vec<BilledTransaction> {
    resolve(raw, 7).into_iter().map(bill_transaction).collect()
}

fn accounts() -> Vec<crate::core::models::Account> {
    vec![
        account(ALICE, "Alice"),
        account(BOB, "Bob"),
        account(CAROL, "Carol"),
        account(DAVE, "Dave"),
    ]
}

#[tokio::test]
async fn test_balances_sum_over_transactions() {
    let transactions = billed(&[
        committed(1, TransactionType::Purchase, shopping_state()),
        committed(2, TransactionType::Transfer, transfer_state(dec!(10), date(2024, 3, 2))),
    ]);

    let sheet = aggregate(&transactions, &accounts());

    assert_eq!(sheet.get(ALICE), Some(dec!(-23.75)));
    assert_eq!(sheet.get(BOB), Some(dec!(-66.25)));
    assert_eq!(sheet.get(CAROL), Some(dec!(90)));
    assert_eq!(sheet.get(DAVE), Some(Decimal::ZERO));
    assert_eq!(sheet.total(), Decimal::ZERO);
}

#[tokio::test]
async fn test_order_of_transactions_does_not_matter() {
    let mut transactions = billed(&[
        committed(1, TransactionType::Purchase, shopping_state()),
        committed(2, TransactionType::Transfer, transfer_state(dec!(10), date(2024, 3, 2))),
        committed(3, TransactionType::Transfer, transfer_state(dec!(3.5), date(2024, 3, 3))),
    ]);

    let forward = aggregate(&transactions, &accounts());
    transactions.reverse();
    let backward = aggregate(&transactions, &accounts());

    assert_eq!(forward, backward);
}

#[tokio::test]
async fn test_deleted_transactions_contribute_nothing() {
    let mut deletion = transfer_state(dec!(10), date(2024, 3, 2));
    deletion.deleted = true;
    let mut draft_deleted = committed(2, TransactionType::Transfer, transfer_state(dec!(10), date(2024, 3, 2)));
    draft_deleted.pending_changes.insert(7, deletion);

    let transactions = billed(&[draft_deleted]);
    assert_eq!(transactions.len(), 1);

    let sheet = aggregate(&transactions, &accounts());

    assert_eq!(sheet.len(), 4);
    assert!(sheet.iter().all(|(_, balance)| balance == Decimal::ZERO));
}

#[tokio::test]
async fn test_every_account_starts_at_zero() {
    let sheet = aggregate(&[], &accounts());

    assert_eq!(sheet.len(), 4);
    assert_eq!(sheet.total(), Decimal::ZERO);
}

#[tokio::test]
async fn test_unknown_billed_account_is_still_reported() {
    let stranger = state("lunch", dec!(12), date(2024, 3, 4), &[(99, dec!(1))], &[(ALICE, dec!(1))]);
    let transactions = billed(&[committed(1, TransactionType::Purchase, stranger)]);

    let sheet = aggregate(&transactions, &accounts());

    assert_eq!(sheet.get(99), Some(dec!(-12)));
    assert_eq!(sheet.get(ALICE), Some(dec!(12)));
    assert_eq!(sheet.total(), Decimal::ZERO);
}
