//! # Catalog
//!
//! The stock-bearing subset of product management.
//!
//! A new product starts at zero; opening stock arrives as a RECEIVING entry
//! in the same unit, so the ledger explains the product's stock from its
//! first movement on.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use minimart_core::validation::{validate_price_cents, validate_product_name, validate_stock_level};
use minimart_core::{CoreError, MovementContext, NewProduct, Product, StockMovement};
use minimart_db::repository::product;
use minimart_db::{with_atomic_unit, Database};

use crate::error::{LedgerError, LedgerResult};
use crate::stock_ledger::apply_movement;

/// Reason on the entry that records a new product's opening stock.
pub const OPENING_STOCK_REASON: &str = "Opening stock";

/// What `remove_product` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Removal {
    /// The product had no history and is gone.
    Deleted,
    /// The product has history and was deactivated instead.
    Deactivated,
}

/// Creates a product.
///
/// ## Errors
/// - `Validation` for a blank name or negative amounts
/// - `UniqueViolation` (CONFLICT) for a barcode already in use
pub async fn create_product(
    db: &Database,
    new: NewProduct,
    default_min_stock: i64,
    actor: Option<String>,
) -> LedgerResult<Product> {
    validate_product_name(&new.name)?;
    validate_price_cents("price", new.price_cents)?;
    if let Some(cost) = new.cost_cents {
        validate_price_cents("cost", cost)?;
    }
    validate_stock_level("stock", new.stock)?;
    let min_stock = new.min_stock.unwrap_or(default_min_stock);
    validate_stock_level("min_stock", min_stock)?;

    let now = Utc::now();
    let record = Product {
        id: Uuid::new_v4().to_string(),
        barcode: new
            .barcode
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty()),
        name: new.name.trim().to_string(),
        price_cents: new.price_cents,
        cost_cents: new.cost_cents,
        stock: 0,
        min_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let opening_stock = new.stock;

    let created = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            product::insert(unit.conn(), &record).await?;

            if opening_stock > 0 {
                let context = MovementContext {
                    reason: Some(OPENING_STOCK_REASON.to_string()),
                    actor,
                    ..Default::default()
                };
                apply_movement(
                    unit.conn(),
                    &record.id,
                    StockMovement::receiving(opening_stock),
                    &context,
                )
                .await?;
            }

            let created = product::find_by_id(unit.conn(), &record.id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(record.id.clone()))?;
            Ok::<_, LedgerError>(created)
        })
    })
    .await?;

    info!(id = %created.id, name = %created.name, stock = created.stock, "Product created");
    Ok(created)
}

/// Gets a product, active or not.
pub async fn get_product(db: &Database, id: &str) -> LedgerResult<Product> {
    let product = db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

    Ok(product)
}

/// Hides a product from new sales and stock activity. History is kept.
pub async fn deactivate_product(db: &Database, id: &str) -> LedgerResult<()> {
    let product_id = id.to_string();

    with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            if !product::set_active(unit.conn(), &product_id, false).await? {
                return Err(CoreError::ProductNotFound(product_id).into());
            }
            Ok::<_, LedgerError>(())
        })
    })
    .await?;

    info!(id = %id, "Product deactivated");
    Ok(())
}

/// Deletes a product with no history, otherwise deactivates it.
pub async fn remove_product(db: &Database, id: &str) -> LedgerResult<Removal> {
    let product_id = id.to_string();

    let removal = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            if product::find_by_id(unit.conn(), &product_id).await?.is_none() {
                return Err(CoreError::ProductNotFound(product_id).into());
            }

            if product::is_referenced(unit.conn(), &product_id).await? {
                product::set_active(unit.conn(), &product_id, false).await?;
                Ok::<_, LedgerError>(Removal::Deactivated)
            } else {
                product::delete(unit.conn(), &product_id).await?;
                Ok(Removal::Deleted)
            }
        })
    })
    .await?;

    info!(id = %id, removal = ?removal, "Product removed");
    Ok(removal)
}
