//! Member registration and manual point adjustments.

mod common;

use minimart_core::{NewMember, PointTransactionType};
use minimart_ledger::ErrorKind;

#[tokio::test]
async fn test_bonus_then_adjustment() {
    let ledger = common::ledger().await;
    let member = common::member(&ledger, "081-222-3333").await;
    assert_eq!(member.total_points, 0);

    let bonus = ledger
        .adjust_points(&member.id, 50, Some("Welcome".into()), Some("manager".into()))
        .await
        .unwrap();
    assert_eq!(bonus.kind, PointTransactionType::Bonus);
    assert_eq!((bonus.balance_before, bonus.balance_after), (0, 50));
    assert_eq!(bonus.created_by.as_deref(), Some("manager"));

    let debit = ledger.adjust_points(&member.id, -30, None, None).await.unwrap();
    assert_eq!(debit.kind, PointTransactionType::Adjustment);
    assert_eq!(debit.points, -30);
    assert_eq!((debit.balance_before, debit.balance_after), (50, 20));

    assert_eq!(ledger.get_member(&member.id).await.unwrap().total_points, 20);

    let history = ledger.point_history(&member.id, None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, debit.id);
    assert_eq!(history[1].id, bonus.id);
    assert_eq!(ledger.point_history(&member.id, Some(1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_overdraw_points_rejected() {
    let ledger = common::ledger().await;
    let member = common::member(&ledger, "081-444-5555").await;
    ledger.adjust_points(&member.id, 10, None, None).await.unwrap();

    let err = ledger.adjust_points(&member.id, -11, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(ledger.get_member(&member.id).await.unwrap().total_points, 10);
    assert_eq!(ledger.point_history(&member.id, None).await.unwrap().len(), 1);

    let err = ledger.adjust_points(&member.id, 0, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger.adjust_points("no-such-member", 5, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = ledger.point_history("no-such-member", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_point_overflow_rejected() {
    let ledger = common::ledger().await;
    let member = common::member(&ledger, "081-999-0000").await;
    ledger.adjust_points(&member.id, 10, None, None).await.unwrap();

    let err = ledger.adjust_points(&member.id, i64::MAX, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger.adjust_points(&member.id, i64::MIN, None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert_eq!(ledger.get_member(&member.id).await.unwrap().total_points, 10);
    assert_eq!(ledger.point_history(&member.id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_registration_rules() {
    let ledger = common::ledger().await;
    let member = ledger
        .create_member(NewMember {
            phone: " +66 81 234 5678 ".into(),
            first_name: " Somchai ".into(),
            last_name: Some("  ".into()),
            email: Some("Somchai@Example.COM".into()),
        })
        .await
        .unwrap();
    assert_eq!(member.phone, "+66 81 234 5678");
    assert_eq!(member.first_name, "Somchai");
    assert_eq!(member.last_name, None);
    assert_eq!(member.email.as_deref(), Some("somchai@example.com"));
    assert!(member.is_active);

    let found = ledger.get_member_by_phone("+66 81 234 5678").await.unwrap();
    assert_eq!(found.id, member.id);

    let err = ledger
        .create_member(NewMember {
            phone: "+66 81 234 5678".into(),
            first_name: "Other".into(),
            last_name: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = ledger
        .create_member(NewMember {
            phone: "call me".into(),
            first_name: "Other".into(),
            last_name: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger.get_member_by_phone("000").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
