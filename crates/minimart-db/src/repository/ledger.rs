//! # Stock Ledger Repository
//!
//! The only SQL that changes `products.stock`, and the append-only entry log
//! that explains every change.
//!
//! ## Apply A Delta
//! ```text
//! UPDATE products
//!    SET stock = stock + :delta
//!  WHERE id = :id AND stock + :delta >= 0
//! RETURNING stock
//!      │
//!      ├── row returned → new stock; previous = new - delta
//!      └── no row       → product missing, or stock would go negative
//! ```
//! The non-negative check runs in the same statement as the write, so it
//! holds at commit time no matter what a pre-check saw earlier.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product;
use minimart_core::{LedgerEntry, LedgerQuery, MovementContext, MovementKind};

const ENTRY_COLUMNS: &str = "id, product_id, kind, quantity, previous_stock, current_stock, \
                             reference, reason, notes, created_by, created_at";

const DEFAULT_QUERY_LIMIT: i64 = 100;

// =============================================================================
// Connection-level queries (usable inside a unit of work)
// =============================================================================

/// Adds `delta` to the product's stock if the result stays non-negative.
///
/// Returns the new stock, or `None` when the product doesn't exist or the
/// change would drive stock below zero.
pub async fn apply_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1 AND stock + ?2 >= 0
        RETURNING stock
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .fetch_optional(conn)
    .await?;

    Ok(stock)
}

/// Appends an entry and returns it with its commit sequence.
pub async fn insert_entry(
    conn: &mut SqliteConnection,
    product_id: &str,
    kind: MovementKind,
    quantity: i64,
    previous_stock: i64,
    context: &MovementContext,
    now: DateTime<Utc>,
) -> DbResult<LedgerEntry> {
    debug!(product_id = %product_id, kind = %kind, quantity, previous_stock, "Appending ledger entry");

    let entry = sqlx::query_as::<_, LedgerEntry>(&format!(
        r#"
        INSERT INTO stock_ledger (
            product_id, kind, quantity, previous_stock, current_stock,
            reference, reason, notes, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(product_id)
    .bind(kind)
    .bind(quantity)
    .bind(previous_stock)
    .bind(previous_stock + quantity)
    .bind(&context.reference)
    .bind(&context.reason)
    .bind(&context.notes)
    .bind(&context.actor)
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(entry)
}

/// All entries for a product in commit order.
pub async fn chain_for_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM stock_ledger WHERE product_id = ?1 ORDER BY id ASC"
    ))
    .bind(product_id)
    .fetch_all(conn)
    .await?;

    Ok(entries)
}

// =============================================================================
// Repository
// =============================================================================

/// Read-only access to ledger entries.
///
/// There is no update or delete here; the schema rejects both.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Most recent entries for a product, newest first.
    pub async fn for_product(&self, product_id: &str, limit: i64) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM stock_ledger WHERE product_id = ?1 \
             ORDER BY id DESC LIMIT ?2"
        ))
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries written under a reference (sale number, `SC-{id}`, PO), in
    /// commit order.
    pub async fn by_reference(&self, reference: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM stock_ledger WHERE reference = ?1 ORDER BY id ASC"
        ))
        .bind(reference)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries matching a filter, newest first.
    pub async fn query(&self, filter: &LedgerQuery) -> DbResult<Vec<LedgerEntry>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM stock_ledger WHERE 1 = 1"));

        if let Some(product_id) = &filter.product_id {
            builder.push(" AND product_id = ").push_bind(product_id.clone());
        }
        if let Some(kind) = filter.kind {
            builder.push(" AND kind = ").push_bind(kind);
        }
        if let Some(from) = filter.from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            builder.push(" AND created_at <= ").push_bind(to);
        }

        builder
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(filter.limit.unwrap_or(DEFAULT_QUERY_LIMIT));

        let entries = builder
            .build_query_as::<LedgerEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// A product's stock together with its chain, read in one transaction so
    /// both come from the same committed state.
    ///
    /// Returns `None` when the product doesn't exist.
    pub async fn chain_snapshot(&self, product_id: &str) -> DbResult<Option<(i64, Vec<LedgerEntry>)>> {
        let mut tx = self.pool.begin().await?;

        let Some(product) = product::find_by_id(&mut *tx, product_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        let chain = chain_for_product(&mut *tx, product_id).await?;
        tx.commit().await?;

        Ok(Some((product.stock, chain)))
    }

    /// Total number of entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_ledger")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
