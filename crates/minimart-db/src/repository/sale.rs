//! # Sale Repository
//!
//! Database operations for sales, sale items and payments.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD (one unit of work, sale processor)                          │
//! │     └── insert_sale()    → Sale { status: COMPLETED }                  │
//! │     └── insert_item()    × n, frozen name/barcode/price                │
//! │     └── insert_payment() × 1                                           │
//! │                                                                         │
//! │  2. (OPTIONAL) REVERSE (one unit of work, reversal processor)          │
//! │     └── transition_status() COMPLETED → VOIDED | REFUNDED              │
//! │         guarded by `WHERE status = 'COMPLETED'`                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use minimart_core::{Payment, Sale, SaleDetail, SaleItem, SaleStatus};

const SALE_COLUMNS: &str = "id, sale_number, status, subtotal_cents, discount_cents, total_cents, \
                            member_id, points_earned, notes, cashier, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, name_snapshot, barcode_snapshot, \
                            unit_price_cents, quantity, line_total_cents, created_at";

const PAYMENT_COLUMNS: &str = "id, sale_id, method, amount_cents, change_cents, created_at";

// =============================================================================
// Connection-level queries (usable inside a unit of work)
// =============================================================================

/// Inserts a sale header.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, sale_number = %sale.sale_number, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, sale_number, status,
            subtotal_cents, discount_cents, total_cents,
            member_id, points_earned, notes, cashier,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(&sale.member_id)
    .bind(sale.points_earned)
    .bind(&sale.notes)
    .bind(&sale.cashier)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts a line item.
///
/// ## Snapshot Pattern
/// Product name, barcode and price are copied to the item so later catalog
/// changes never alter the sale's history.
pub async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    debug!(sale_id = %item.sale_id, product_id = %item.product_id, quantity = item.quantity, "Adding sale item");

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, name_snapshot, barcode_snapshot,
            unit_price_cents, quantity, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(&item.barcode_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts the sale's payment.
pub async fn insert_payment(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
    debug!(sale_id = %payment.sale_id, amount_cents = payment.amount_cents, "Recording payment");

    sqlx::query(
        r#"
        INSERT INTO payments (id, sale_id, method, amount_cents, change_cents, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.sale_id)
    .bind(payment.method)
    .bind(payment.amount_cents)
    .bind(payment.change_cents)
    .bind(payment.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets a sale header by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(sale)
}

/// Line items of a sale, in insertion order.
pub async fn items_for_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid ASC"
    ))
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

/// The payment recorded for a sale.
pub async fn payment_for_sale(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE sale_id = ?1"
    ))
    .bind(sale_id)
    .fetch_optional(conn)
    .await?;

    Ok(payment)
}

/// Loads a sale with its items and payment.
pub async fn find_detail(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SaleDetail>> {
    let Some(sale) = find_by_id(&mut *conn, id).await? else {
        return Ok(None);
    };
    let items = items_for_sale(&mut *conn, id).await?;
    let Some(payment) = payment_for_sale(&mut *conn, id).await? else {
        return Ok(None);
    };

    Ok(Some(SaleDetail { sale, items, payment }))
}

/// Moves a COMPLETED sale to `status`, optionally replacing its notes.
///
/// Returns false when the sale is no longer COMPLETED, leaving it untouched.
pub async fn transition_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: SaleStatus,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, status = %status, "Transitioning sale status");

    let result = sqlx::query(
        r#"
        UPDATE sales
        SET status = ?2, notes = COALESCE(?3, notes), updated_at = ?4
        WHERE id = ?1 AND status = 'COMPLETED'
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(notes)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-backed read access to sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Gets a sale with items and payment.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        let mut conn = self.pool.acquire().await?;
        find_detail(&mut conn, id).await
    }

    /// Gets a sale by its business number.
    pub async fn get_by_number(&self, sale_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE sale_number = ?1"
        ))
        .bind(sale_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Most recent sales, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Number of sales recorded.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
