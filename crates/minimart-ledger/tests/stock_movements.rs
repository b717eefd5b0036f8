//! Receiving, issuing, catalog and ledger chain behaviour.

mod common;

use minimart_core::{ChainReport, LedgerQuery, LineRequest, MovementKind, NewProduct};
use minimart_ledger::{ErrorKind, Removal};

#[tokio::test]
async fn test_issue_then_reject_overdraw() {
    let ledger = common::ledger().await;
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;

    let entry = ledger
        .issue_stock(&tea.id, 3, "damaged", None, None, Some("clerk".into()))
        .await
        .unwrap();
    assert_eq!(entry.kind, MovementKind::Issuing);
    assert_eq!(entry.quantity, -3);
    assert_eq!(entry.previous_stock, 10);
    assert_eq!(entry.current_stock, 7);
    assert_eq!(entry.reason.as_deref(), Some("damaged"));
    assert_eq!(common::stock_of(&ledger, &tea.id).await, 7);

    let err = ledger
        .issue_stock(&tea.id, 10, "damaged", None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(common::stock_of(&ledger, &tea.id).await, 7);

    let issued = ledger
        .entries(&LedgerQuery {
            product_id: Some(tea.id.clone()),
            kind: Some(MovementKind::Issuing),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(issued.len(), 1);
}

#[tokio::test]
async fn test_issue_requires_reason() {
    let ledger = common::ledger().await;
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;

    let err = ledger
        .issue_stock(&tea.id, 1, "   ", None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger
        .issue_stock(&tea.id, 0, "expired", None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(common::stock_of(&ledger, &tea.id).await, 10);
}

#[tokio::test]
async fn test_receiving_accumulates_per_line() {
    let ledger = common::ledger().await;
    let rice = common::product(&ledger, "Jasmine Rice 5kg", 18_500, 0).await;
    let milk = common::product(&ledger, "Fresh Milk 1L", 4_500, 4).await;

    let entries = ledger
        .receive_stock(
            vec![
                LineRequest::new(&rice.id, 5),
                LineRequest::new(&milk.id, 6),
                LineRequest::new(&rice.id, 3),
            ],
            Some("PO-2026-0042".into()),
            Some("Morning delivery".into()),
            Some("clerk".into()),
        )
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!((entries[0].previous_stock, entries[0].current_stock), (0, 5));
    assert_eq!((entries[2].previous_stock, entries[2].current_stock), (5, 8));
    assert!(entries.iter().all(|e| e.kind == MovementKind::Receiving));
    assert!(entries.iter().all(|e| e.reference.as_deref() == Some("PO-2026-0042")));

    assert_eq!(common::stock_of(&ledger, &rice.id).await, 8);
    assert_eq!(common::stock_of(&ledger, &milk.id).await, 10);
    assert_eq!(ledger.entries_by_reference("PO-2026-0042").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_receiving_batch_aborts_as_a_whole() {
    let ledger = common::ledger().await;
    let rice = common::product(&ledger, "Jasmine Rice 5kg", 18_500, 2).await;
    let retired = common::product(&ledger, "Old Soap", 1_500, 0).await;
    ledger.deactivate_product(&retired.id).await.unwrap();

    let err = ledger
        .receive_stock(
            vec![LineRequest::new(&rice.id, 5), LineRequest::new(&retired.id, 1)],
            None,
            None,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(common::stock_of(&ledger, &rice.id).await, 2);
    assert_eq!(ledger.entries_for_product(&rice.id, None).await.unwrap().len(), 1);

    let err = ledger.receive_stock(Vec::new(), None, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_chain_explains_stock() {
    let ledger = common::ledger().await;
    let water = common::product(&ledger, "Drinking Water", 1_400, 12).await;

    ledger
        .receive_stock(vec![LineRequest::new(&water.id, 24)], None, None, None)
        .await
        .unwrap();
    ledger
        .issue_stock(&water.id, 5, "leaking", None, None, None)
        .await
        .unwrap();
    let sale = ledger
        .create_sale(common::cash_sale(&[(water.id.as_str(), 7)], 10_000))
        .await
        .unwrap();
    ledger.void_sale(&sale.sale.id, None).await.unwrap();
    ledger
        .create_sale(common::cash_sale(&[(water.id.as_str(), 2)], 10_000))
        .await
        .unwrap();

    let stock = common::stock_of(&ledger, &water.id).await;
    assert_eq!(stock, 12 + 24 - 5 - 7 + 7 - 2);

    let mut entries = ledger.entries_for_product(&water.id, None).await.unwrap();
    entries.reverse();
    assert_eq!(entries.iter().map(|e| e.quantity).sum::<i64>(), stock);
    for pair in entries.windows(2) {
        assert!(pair[0].chains_to(&pair[1]));
        assert!(pair[0].id < pair[1].id);
    }

    assert_eq!(
        ledger.verify_product_chain(&water.id).await.unwrap(),
        ChainReport::Consistent { entries: 6, stock }
    );
}

#[tokio::test]
async fn test_opening_stock_is_a_receiving_entry() {
    let ledger = common::ledger().await;
    let tea = common::product(&ledger, "Green Tea", 2_000, 10).await;
    let empty = common::product(&ledger, "Seasonal Mooncake", 12_000, 0).await;

    let entries = ledger.entries_for_product(&tea.id, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, MovementKind::Receiving);
    assert_eq!(entries[0].created_by.as_deref(), Some("test"));

    assert!(ledger.entries_for_product(&empty.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_barcode_conflicts() {
    let ledger = common::ledger().await;
    let new = NewProduct {
        barcode: Some("8850999320014".into()),
        name: "Green Tea 500ml".into(),
        price_cents: 2_000,
        cost_cents: Some(1_200),
        stock: 0,
        min_stock: None,
    };

    let first = ledger.create_product(new.clone(), None).await.unwrap();
    assert_eq!(first.min_stock, 5);

    let err = ledger.create_product(new, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_remove_product_keeps_history() {
    let ledger = common::ledger().await;
    let fresh = common::product(&ledger, "Unused", 100, 0).await;
    let stocked = common::product(&ledger, "Stocked", 100, 3).await;

    assert_eq!(ledger.remove_product(&fresh.id).await.unwrap(), Removal::Deleted);
    assert_eq!(
        ledger.get_product(&fresh.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );

    assert_eq!(ledger.remove_product(&stocked.id).await.unwrap(), Removal::Deactivated);
    let kept = ledger.get_product(&stocked.id).await.unwrap();
    assert!(!kept.is_active);
    assert_eq!(kept.stock, 3);

    let err = ledger
        .issue_stock(&stocked.id, 1, "expired", None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_stock_overview_and_low_stock() {
    let ledger = common::ledger().await;
    common::product(&ledger, "Plenty", 1_000, 50).await;
    let low = common::product(&ledger, "Low", 2_000, 2).await;
    common::product(&ledger, "Empty", 500, 0).await;

    let overview = ledger.stock_overview().await.unwrap();
    assert_eq!(overview.active_products, 3);
    assert_eq!(overview.low_stock, 1);
    assert_eq!(overview.out_of_stock, 1);
    assert_eq!(overview.retail_value_cents, 50 * 1_000 + 2 * 2_000);
    assert_eq!(overview.cost_value_cents, overview.retail_value_cents);

    let low_stock = ledger.low_stock_products().await.unwrap();
    assert_eq!(low_stock.len(), 1);
    assert_eq!(low_stock[0].id, low.id);
}
