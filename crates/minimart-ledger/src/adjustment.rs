//! # Inventory Adjustment Processor
//!
//! Receiving, issuing and stock counts. Each is one unit of work built on
//! [`apply_movement`].
//!
//! ## Stock Count Lifecycle
//! ```text
//! create_stock_count(product, counted = 8)
//!      │  system_quantity = 10, variance = -2   (informational)
//!      ▼
//!   is_adjusted = false
//!      │
//!      │  ... sales move live stock to 9 ...
//!      ▼
//! apply_stock_count(id)
//!      │  adjustment = counted - live stock = 8 - 9 = -1
//!      │  ADJUSTMENT entry, reference "SC-{id}"
//!      ▼
//!   is_adjusted = true, stock == 8
//!      │
//!      ▼
//! apply_stock_count(id) ──► AlreadyAdjusted
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{info, warn};
use uuid::Uuid;

use minimart_core::validation::{
    validate_counted_quantity, validate_line_count, validate_quantity, validate_reason,
};
use minimart_core::{
    CoreError, LedgerEntry, LineRequest, MovementContext, Product, StockCount, StockMovement,
    STOCK_COUNT_REASON,
};
use minimart_db::repository::{product, stock_count};
use minimart_db::{with_atomic_unit, Database};

use crate::error::{LedgerError, LedgerResult};
use crate::stock_ledger::apply_movement;

/// Loads a product that may take part in new stock activity.
pub(crate) async fn find_active_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> LedgerResult<Product> {
    let product = product::find_by_id(conn, product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    Ok(product)
}

// =============================================================================
// Receiving
// =============================================================================

/// Receives a delivery. Lines apply in order; a failing line aborts the batch.
///
/// Repeated products accumulate, each line getting its own entry with the
/// running stock.
pub async fn receive_stock(
    db: &Database,
    items: Vec<LineRequest>,
    reference: Option<String>,
    notes: Option<String>,
    actor: Option<String>,
) -> LedgerResult<Vec<LedgerEntry>> {
    validate_line_count("items", items.len())?;
    for line in &items {
        validate_quantity(line.quantity)?;
    }

    let context = MovementContext {
        reference,
        reason: None,
        notes,
        actor,
    };

    let result: LedgerResult<Vec<LedgerEntry>> = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            let mut entries = Vec::with_capacity(items.len());
            for line in &items {
                find_active_product(unit.conn(), &line.product_id).await?;
                let entry = apply_movement(
                    unit.conn(),
                    &line.product_id,
                    StockMovement::receiving(line.quantity),
                    &context,
                )
                .await?;
                entries.push(entry);
            }
            Ok(entries)
        })
    })
    .await;

    match &result {
        Ok(entries) => info!(lines = entries.len(), "Stock received"),
        Err(err) => warn!(error = %err, kind = ?err.kind(), "Receiving rejected"),
    }

    result
}

// =============================================================================
// Issuing
// =============================================================================

/// Takes stock out for damage, expiry, transfer or internal use.
///
/// ## Errors
/// - `Validation` when the reason is blank or the quantity is not positive
/// - `InsufficientStock` when the quantity exceeds current stock
pub async fn issue_stock(
    db: &Database,
    product_id: &str,
    quantity: i64,
    reason: String,
    reference: Option<String>,
    notes: Option<String>,
    actor: Option<String>,
) -> LedgerResult<LedgerEntry> {
    validate_quantity(quantity)?;
    validate_reason(&reason)?;

    let product_id = product_id.to_string();
    let context = MovementContext {
        reference,
        reason: Some(reason.trim().to_string()),
        notes,
        actor,
    };

    let result: LedgerResult<LedgerEntry> = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            find_active_product(unit.conn(), &product_id).await?;
            apply_movement(
                unit.conn(),
                &product_id,
                StockMovement::issuing(quantity),
                &context,
            )
            .await
        })
    })
    .await;

    match &result {
        Ok(entry) => info!(
            product_id = %entry.product_id,
            quantity,
            current_stock = entry.current_stock,
            "Stock issued"
        ),
        Err(err) => warn!(error = %err, kind = ?err.kind(), "Issuing rejected"),
    }

    result
}

// =============================================================================
// Stock Counts
// =============================================================================

/// Records a physical count against the product's current stock.
pub async fn create_stock_count(
    db: &Database,
    product_id: &str,
    counted_quantity: i64,
    notes: Option<String>,
    actor: Option<String>,
) -> LedgerResult<StockCount> {
    validate_counted_quantity(counted_quantity)?;

    let product_id = product_id.to_string();
    let count = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            let product = find_active_product(unit.conn(), &product_id).await?;

            let count = StockCount {
                id: Uuid::new_v4().to_string(),
                product_id: product.id,
                system_quantity: product.stock,
                counted_quantity,
                variance: counted_quantity - product.stock,
                is_adjusted: false,
                notes,
                counted_by: actor,
                created_at: Utc::now(),
                adjusted_at: None,
            };
            stock_count::insert(unit.conn(), &count).await?;

            Ok::<_, LedgerError>(count)
        })
    })
    .await?;

    info!(id = %count.id, product_id = %count.product_id, variance = count.variance, "Stock count recorded");
    Ok(count)
}

/// Brings stock to a count's counted quantity.
///
/// The adjustment is computed against live stock at apply time, not the
/// system quantity captured when the count was taken.
///
/// ## Errors
/// - `StockCountNotFound` for an unknown id
/// - `AlreadyAdjusted` when the count was applied before
pub async fn apply_stock_count(
    db: &Database,
    count_id: &str,
    actor: Option<String>,
) -> LedgerResult<StockCount> {
    let count_id = count_id.to_string();

    let result: LedgerResult<StockCount> = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            let count = stock_count::find_by_id(unit.conn(), &count_id)
                .await?
                .ok_or_else(|| CoreError::StockCountNotFound(count_id.clone()))?;
            if count.is_adjusted {
                return Err(CoreError::AlreadyAdjusted(count.id).into());
            }

            let product = product::find_by_id(unit.conn(), &count.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(count.product_id.clone()))?;

            let context = MovementContext::with_reference(count.reference())
                .reason(STOCK_COUNT_REASON)
                .notes(count.notes.clone())
                .actor(actor);
            apply_movement(
                unit.conn(),
                &product.id,
                StockMovement::adjustment(count.counted_quantity - product.stock),
                &context,
            )
            .await?;

            let adjusted = stock_count::mark_adjusted(unit.conn(), &count.id, Utc::now())
                .await?
                .ok_or_else(|| CoreError::AlreadyAdjusted(count.id.clone()))?;
            Ok(adjusted)
        })
    })
    .await;

    match &result {
        Ok(count) => info!(
            id = %count.id,
            product_id = %count.product_id,
            counted_quantity = count.counted_quantity,
            "Stock count applied"
        ),
        Err(err) => warn!(error = %err, kind = ?err.kind(), "Stock count apply rejected"),
    }

    result
}
