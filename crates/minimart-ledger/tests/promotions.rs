//! Promotion registration and cart evaluation.

mod common;

use chrono::{Duration, Utc};
use minimart_core::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};
use minimart_core::promotion::{CartLine, NewPromotion, PromotionKind, PromotionRule, ValidityWindow};
use minimart_ledger::ErrorKind;

fn promotion(name: &str, kind: PromotionKind, triggers: Vec<String>) -> NewPromotion {
    NewPromotion {
        name: name.to_string(),
        description: None,
        kind,
        is_active: true,
        window: ValidityWindow::default(),
        buy_qty: None,
        free_qty: None,
        discount_bps: None,
        trigger_product_ids: triggers,
        free_product_ids: Vec::new(),
    }
}

#[tokio::test]
async fn test_buy_two_get_one() {
    let ledger = common::ledger().await;
    let water = common::product(&ledger, "Drinking Water", 1_000, 50).await;

    let mut new = promotion("Water 2+1", PromotionKind::BuyXGetY, vec![water.id.clone()]);
    new.buy_qty = Some(2);
    new.free_qty = Some(1);
    let promo = ledger.create_promotion(new).await.unwrap();
    assert_eq!(promo.rule, PromotionRule::BuyXGetY { buy_qty: 2, free_qty: 1 });

    let result = ledger
        .evaluate_cart(&[CartLine::new(&water.id, 7, 1_000)])
        .await
        .unwrap();
    assert_eq!(result.original_total.cents(), 7_000);
    assert_eq!(result.total_discount.cents(), 2_000);
    assert_eq!(result.final_total.cents(), 5_000);
    assert_eq!(result.applied_promotions.len(), 1);
    assert_eq!(result.applied_promotions[0].promotion_id, promo.id);

    // Evaluation never touches stock.
    assert_eq!(common::stock_of(&ledger, &water.id).await, 50);
}

#[tokio::test]
async fn test_quantity_discount_threshold() {
    let ledger = common::ledger().await;
    let rice = common::product(&ledger, "Jasmine Rice", 2_000, 50).await;

    let mut new = promotion("Rice 10% off 3+", PromotionKind::QuantityDiscount, vec![rice.id.clone()]);
    new.buy_qty = Some(3);
    new.discount_bps = Some(1_000);
    ledger.create_promotion(new).await.unwrap();

    let result = ledger
        .evaluate_cart(&[CartLine::new(&rice.id, 5, 2_000)])
        .await
        .unwrap();
    assert_eq!(result.total_discount.cents(), 1_000);

    let below = ledger
        .evaluate_cart(&[CartLine::new(&rice.id, 2, 2_000)])
        .await
        .unwrap();
    assert_eq!(below.total_discount.cents(), 0);
    assert!(below.applied_promotions.is_empty());
}

#[tokio::test]
async fn test_toggle_and_window() {
    let ledger = common::ledger().await;
    let water = common::product(&ledger, "Drinking Water", 1_000, 50).await;
    let cart = [CartLine::new(&water.id, 3, 1_000)];

    let promo = ledger
        .create_promotion(promotion("Water 2+1", PromotionKind::BuyXGetY, vec![water.id.clone()]))
        .await
        .unwrap();
    assert_eq!(ledger.evaluate_cart(&cart).await.unwrap().total_discount.cents(), 1_000);

    let off = ledger.set_promotion_active(&promo.id, false).await.unwrap();
    assert!(!off.is_active);
    assert_eq!(ledger.evaluate_cart(&cart).await.unwrap().total_discount.cents(), 0);
    assert!(ledger.active_promotions(Utc::now()).await.unwrap().is_empty());
    assert_eq!(ledger.list_promotions().await.unwrap().len(), 1);

    let now = Utc::now();
    let mut later = promotion("Next week", PromotionKind::BuyXGetY, vec![water.id.clone()]);
    later.window = ValidityWindow {
        start: Some(now + Duration::days(1)),
        end: Some(now + Duration::days(8)),
    };
    let later = ledger.create_promotion(later).await.unwrap();

    let today = ledger.evaluate_cart_at(&cart, now).await.unwrap();
    assert!(today.applied_promotions.is_empty());

    let next_week = ledger.evaluate_cart_at(&cart, now + Duration::days(2)).await.unwrap();
    assert_eq!(next_week.applied_promotions.len(), 1);
    assert_eq!(next_week.applied_promotions[0].promotion_id, later.id);

    let err = ledger.set_promotion_active("missing", true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_bundle_free_stores_free_products() {
    let ledger = common::ledger().await;
    let noodles = common::product(&ledger, "Instant Noodles", 700, 50).await;
    let water = common::product(&ledger, "Drinking Water", 1_400, 50).await;
    let wafer = common::product(&ledger, "Chocolate Wafer", 1_000, 50).await;

    let mut new = promotion(
        "Noodles + Water, Wafer Free",
        PromotionKind::BundleFree,
        vec![noodles.id.clone(), water.id.clone(), noodles.id.clone()],
    );
    new.free_product_ids = vec![wafer.id.clone()];
    let promo = ledger.create_promotion(new).await.unwrap();
    assert_eq!(promo.trigger_product_ids.len(), 2);
    assert_eq!(promo.free_products.len(), 1);
    assert_eq!(promo.free_products[0].price_cents, 1_000);

    let stored = ledger.get_promotion(&promo.id).await.unwrap();
    assert_eq!(stored.trigger_product_ids, promo.trigger_product_ids);
    assert_eq!(stored.free_products, promo.free_products);

    let result = ledger
        .evaluate_cart(&[
            CartLine::new(&noodles.id, 2, 700),
            CartLine::new(&water.id, 1, 1_400),
        ])
        .await
        .unwrap();
    assert_eq!(result.total_discount.cents(), 1_000);

    let partial = ledger
        .evaluate_cart(&[CartLine::new(&noodles.id, 2, 700)])
        .await
        .unwrap();
    assert_eq!(partial.total_discount.cents(), 0);
}

#[tokio::test]
async fn test_oversized_cart_lines_rejected() {
    let ledger = common::ledger().await;
    let water = common::product(&ledger, "Drinking Water", 1_000, 50).await;
    let mut new = promotion("Water 2+1", PromotionKind::BuyXGetY, vec![water.id.clone()]);
    new.buy_qty = Some(2);
    new.free_qty = Some(1);
    ledger.create_promotion(new).await.unwrap();

    let err = ledger
        .evaluate_cart(&[CartLine::new(&water.id, i64::MAX / 2, 3)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger
        .evaluate_cart(&[CartLine::new(&water.id, 1, MAX_PRICE_CENTS + 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger
        .evaluate_cart(&[CartLine::new(&water.id, 0, 1_000)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let largest = ledger
        .evaluate_cart(&[CartLine::new(&water.id, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS)])
        .await
        .unwrap();
    assert_eq!(largest.original_total.cents(), MAX_ITEM_QUANTITY * MAX_PRICE_CENTS);
    assert_eq!(largest.total_discount.cents(), (MAX_ITEM_QUANTITY / 3) * MAX_PRICE_CENTS);
}

#[tokio::test]
async fn test_invalid_promotions_rejected() {
    let ledger = common::ledger().await;
    let water = common::product(&ledger, "Drinking Water", 1_000, 50).await;

    let err = ledger
        .create_promotion(promotion("Nothing", PromotionKind::BuyXGetY, Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = ledger
        .create_promotion(promotion("Ghost", PromotionKind::BuyXGetY, vec!["missing".into()]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let mut too_generous = promotion("Free money", PromotionKind::QuantityDiscount, vec![water.id.clone()]);
    too_generous.discount_bps = Some(10_001);
    let err = ledger.create_promotion(too_generous).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let now = Utc::now();
    let mut backwards = promotion("Backwards", PromotionKind::BuyXGetY, vec![water.id.clone()]);
    backwards.window = ValidityWindow {
        start: Some(now),
        end: Some(now - Duration::days(1)),
    };
    let err = ledger.create_promotion(backwards).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert!(ledger.list_promotions().await.unwrap().is_empty());
    assert_eq!(
        ledger.get_promotion("missing").await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
