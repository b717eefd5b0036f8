//! # Stock Ledger
//!
//! The single primitive that changes a product's stock.
//!
//! ```text
//! apply_movement(conn, product_id, movement, context)
//!      │
//!      ├── UPDATE products SET stock = stock + delta
//!      │   WHERE stock + delta >= 0 RETURNING stock
//!      │
//!      ├── no row ──► ProductNotFound | InsufficientStock
//!      │
//!      └── INSERT stock_ledger (previous = new - delta, current = new)
//! ```
//!
//! Always called with a unit's connection, so the stock write and the entry
//! commit or roll back together with everything else in the unit.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use minimart_core::{CoreError, LedgerEntry, MovementContext, StockMovement};
use minimart_db::repository::{ledger, product};

use crate::error::LedgerResult;

/// Applies `movement` to a product and appends the explaining entry.
///
/// ## Errors
/// - `ProductNotFound` when the product id is unknown
/// - `InsufficientStock` when the movement would drive stock negative
pub async fn apply_movement(
    conn: &mut SqliteConnection,
    product_id: &str,
    movement: StockMovement,
    context: &MovementContext,
) -> LedgerResult<LedgerEntry> {
    let delta = movement.delta();
    let now = Utc::now();

    let Some(new_stock) = ledger::apply_delta(&mut *conn, product_id, delta, now).await? else {
        let current = product::find_by_id(&mut *conn, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        return Err(CoreError::InsufficientStock {
            product_id: current.id,
            name: current.name,
            available: current.stock,
            requested: movement.magnitude,
        }
        .into());
    };

    let entry = ledger::insert_entry(
        conn,
        product_id,
        movement.kind,
        delta,
        new_stock - delta,
        context,
        now,
    )
    .await?;

    debug!(
        product_id = %product_id,
        kind = %movement.kind,
        delta,
        previous_stock = entry.previous_stock,
        current_stock = entry.current_stock,
        "Stock movement applied"
    );

    Ok(entry)
}
