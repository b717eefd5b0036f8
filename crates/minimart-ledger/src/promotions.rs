//! # Promotion Catalog
//!
//! Registers promotions and previews a cart against the ones running now.
//! Evaluation itself is the pure engine in `minimart_core::promotion`.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use minimart_core::promotion::{
    evaluate, CalculationResult, CartLine, FreeProduct, NewPromotion, Promotion, PromotionRule,
};
use minimart_core::validation::{
    validate_line_count, validate_price_cents, validate_promotion_name, validate_quantity,
    validate_rate_bps, validate_window,
};
use minimart_core::CoreError;
use minimart_db::repository::{product, promotion};
use minimart_db::{with_atomic_unit, Database};

use crate::error::{LedgerError, LedgerResult};

/// Registers a promotion.
///
/// ## Errors
/// - `Validation` for a blank name, no trigger products, a rate above 100%
///   or a window that ends before it starts
/// - `ProductNotFound` when a trigger or free product doesn't exist
pub async fn create_promotion(db: &Database, new: NewPromotion) -> LedgerResult<Promotion> {
    validate_promotion_name(&new.name)?;
    validate_line_count("trigger_product_ids", new.trigger_product_ids.len())?;
    validate_window(new.window.start, new.window.end)?;
    if let Some(bps) = new.discount_bps {
        validate_rate_bps(bps)?;
    }
    for qty in [new.buy_qty, new.free_qty].into_iter().flatten() {
        validate_quantity(qty)?;
    }

    let trigger_ids = dedup(new.trigger_product_ids);
    let free_ids = dedup(new.free_product_ids);

    let created = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            for product_id in &trigger_ids {
                if product::find_by_id(unit.conn(), product_id).await?.is_none() {
                    return Err(CoreError::ProductNotFound(product_id.clone()).into());
                }
            }

            let mut free_products = Vec::with_capacity(free_ids.len());
            for product_id in free_ids {
                let free = product::find_by_id(unit.conn(), &product_id)
                    .await?
                    .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;
                free_products.push(FreeProduct {
                    product_id,
                    price_cents: free.price_cents,
                });
            }

            let record = Promotion {
                id: Uuid::new_v4().to_string(),
                name: new.name.trim().to_string(),
                description: new.description,
                is_active: new.is_active,
                window: new.window,
                rule: PromotionRule::from_parts(new.kind, new.buy_qty, new.free_qty, new.discount_bps),
                trigger_product_ids: trigger_ids,
                free_products,
                created_at: Utc::now(),
            };
            promotion::insert(unit.conn(), &record).await?;

            Ok::<_, LedgerError>(record)
        })
    })
    .await?;

    info!(id = %created.id, kind = %created.rule.kind(), "Promotion created");
    Ok(created)
}

pub async fn get_promotion(db: &Database, id: &str) -> LedgerResult<Promotion> {
    let found = db
        .promotions()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::PromotionNotFound(id.to_string()))?;

    Ok(found)
}

/// Turns a promotion on or off.
pub async fn set_promotion_active(db: &Database, id: &str, active: bool) -> LedgerResult<Promotion> {
    let promotion_id = id.to_string();

    let updated = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            if !promotion::set_active(unit.conn(), &promotion_id, active).await? {
                return Err(CoreError::PromotionNotFound(promotion_id).into());
            }
            let updated = promotion::find_by_id(unit.conn(), &promotion_id)
                .await?
                .ok_or_else(|| CoreError::PromotionNotFound(promotion_id.clone()))?;
            Ok::<_, LedgerError>(updated)
        })
    })
    .await?;

    info!(id = %updated.id, active, "Promotion toggled");
    Ok(updated)
}

/// Every promotion, newest first.
pub async fn list_promotions(db: &Database) -> LedgerResult<Vec<Promotion>> {
    Ok(db.promotions().all().await?)
}

/// Promotions running at `now`, newest first.
pub async fn active_promotions(db: &Database, now: DateTime<Utc>) -> LedgerResult<Vec<Promotion>> {
    Ok(db.promotions().active_at(now).await?)
}

/// Prices a cart against the promotions running at `now`. Nothing is written.
///
/// ## Errors
/// `Validation` for a non-positive or oversized quantity, a price out of
/// range or more lines than a sale may carry.
pub async fn evaluate_cart(
    db: &Database,
    cart: &[CartLine],
    now: DateTime<Utc>,
) -> LedgerResult<CalculationResult> {
    if !cart.is_empty() {
        validate_line_count("cart", cart.len())?;
    }
    for line in cart {
        validate_quantity(line.quantity)?;
        validate_price_cents("unit_price", line.unit_price_cents)?;
    }

    let running = active_promotions(db, now).await?;
    let result = evaluate(cart, &running, now);

    debug!(
        promotions = running.len(),
        applied = result.applied_promotions.len(),
        total_discount = result.total_discount.cents(),
        "Cart evaluated"
    );
    Ok(result)
}

/// Drops repeated ids, keeping first occurrences in order.
fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup(ids), vec!["b".to_string(), "a".to_string()]);
    }
}
