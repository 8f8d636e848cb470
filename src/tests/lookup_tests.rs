use super::*;
use crate::core::lookup::{TransactionView, find};
use crate::core::pipeline::derive;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_view_is_sorted_by_date_then_id() {
    let raw = vec![
        committed(5, TransactionType::Transfer, transfer_state(dec!(1), date(2024, 2, 1))),
        committed(3, TransactionType::Transfer, transfer_state(dec!(2), date(2024, 2, 1))),
        committed(9, TransactionType::Transfer, transfer_state(dec!(3), date(2024, 1, 15))),
        committed(1, TransactionType::Transfer, transfer_state(dec!(4), date(2024, 3, 1))),
    ];

    let view = derive(&raw, 7);

    let ids: Vec<i64> = view.transactions().iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![9, 3, 5, 1]);
}

#[tokio::test]
async fn test_draft_date_moves_transaction() {
    let mut moved = committed(1, TransactionType::Transfer, transfer_state(dec!(1), date(2024, 1, 1)));
    moved
        .pending_changes
        .insert(7, transfer_state(dec!(1), date(2024, 6, 1)));
    let raw = vec![
        moved,
        committed(2, TransactionType::Transfer, transfer_state(dec!(2), date(2024, 2, 1))),
    ];

    let ids = |viewer| -> Vec<i64> { derive(&raw, viewer).transactions().iter().map(|t| t.id()).collect() };

    assert_eq!(ids(7), vec![2, 1]);
    assert_eq!(ids(8), vec![1, 2]);
}

#[tokio::test]
async fn test_find_by_id() {
    let raw = vec![
        committed(4, TransactionType::Transfer, transfer_state(dec!(1), date(2024, 2, 1))),
        committed(2, TransactionType::Purchase, shopping_state()),
    ];
    let view = derive(&raw, 7);

    let found = view.find(2).unwrap();
    assert_eq!(found.transaction.kind, TransactionType::Purchase);
    assert_eq!(find(view.transactions(), 4).map(|t| t.id()), Some(4));
    assert!(view.find(42).is_none());
    assert!(find(view.transactions(), 42).is_none());
}

#[tokio::test]
async fn test_empty_view() {
    let view = TransactionView::new(Vec::new());

    assert!(view.is_empty());
    assert_eq!(view.len(), 0);
    assert!(view.find(1).is_none());
}
