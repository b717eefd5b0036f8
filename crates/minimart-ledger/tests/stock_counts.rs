//! Physical stock counts.

mod common;

use minimart_core::{MovementKind, STOCK_COUNT_REASON};
use minimart_ledger::ErrorKind;

#[tokio::test]
async fn test_apply_uses_live_stock() {
    let ledger = common::ledger().await;
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;

    let count = ledger
        .create_stock_count(&tea.id, 8, Some("Shelf B".into()), Some("clerk".into()))
        .await
        .unwrap();
    assert_eq!(count.system_quantity, 10);
    assert_eq!(count.variance, -2);
    assert!(!count.is_adjusted);
    assert_eq!(count.adjusted_at, None);

    // Stock drifts between counting and applying.
    ledger
        .create_sale(common::cash_sale(&[(tea.id.as_str(), 3)], 6_000))
        .await
        .unwrap();

    let applied = ledger.apply_stock_count(&count.id, Some("manager".into())).await.unwrap();
    assert!(applied.is_adjusted);
    assert!(applied.adjusted_at.is_some());
    assert_eq!(common::stock_of(&ledger, &tea.id).await, 8);

    let entries = ledger.entries_by_reference(&count.reference()).await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.kind, MovementKind::Adjustment);
    assert_eq!(entry.quantity, 1);
    assert_eq!((entry.previous_stock, entry.current_stock), (7, 8));
    assert_eq!(entry.reason.as_deref(), Some(STOCK_COUNT_REASON));
    assert_eq!(entry.notes.as_deref(), Some("Shelf B"));
    assert_eq!(entry.created_by.as_deref(), Some("manager"));
    assert!(entry.reference.as_deref().unwrap().starts_with("SC-"));

    let err = ledger.apply_stock_count(&count.id, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(common::stock_of(&ledger, &tea.id).await, 8);
    assert_eq!(ledger.entries_by_reference(&count.reference()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_variance_still_recorded() {
    let ledger = common::ledger().await;
    let milk = common::product(&ledger, "Fresh Milk", 4_500, 6).await;

    let count = ledger.create_stock_count(&milk.id, 6, None, None).await.unwrap();
    assert_eq!(count.variance, 0);
    ledger.apply_stock_count(&count.id, None).await.unwrap();

    let entries = ledger.entries_by_reference(&count.reference()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].quantity, 0);
    assert_eq!(common::stock_of(&ledger, &milk.id).await, 6);
}

#[tokio::test]
async fn test_list_filters() {
    let ledger = common::ledger().await;
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;
    let milk = common::product(&ledger, "Fresh Milk", 4_500, 6).await;

    let first = ledger.create_stock_count(&tea.id, 9, None, None).await.unwrap();
    ledger.create_stock_count(&tea.id, 10, None, None).await.unwrap();
    ledger.create_stock_count(&milk.id, 5, None, None).await.unwrap();
    ledger.apply_stock_count(&first.id, None).await.unwrap();

    assert_eq!(ledger.list_stock_counts(None, None).await.unwrap().len(), 3);
    assert_eq!(ledger.list_stock_counts(Some(&tea.id), None).await.unwrap().len(), 2);

    let pending = ledger.list_stock_counts(None, Some(false)).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|c| !c.is_adjusted));

    let done = ledger.list_stock_counts(Some(&tea.id), Some(true)).await.unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, first.id);

    assert!(ledger.get_stock_count(&first.id).await.unwrap().is_adjusted);
}

#[tokio::test]
async fn test_invalid_counts_rejected() {
    let ledger = common::ledger().await;
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;

    let err = ledger.create_stock_count(&tea.id, -1, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger.create_stock_count("missing", 1, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = ledger.apply_stock_count("missing", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = ledger.get_stock_count("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
