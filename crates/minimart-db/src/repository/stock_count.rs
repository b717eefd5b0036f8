//! # Stock Count Repository
//!
//! Physical counts and their one-way `is_adjusted` flag.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use minimart_core::StockCount;

const COUNT_COLUMNS: &str = "id, product_id, system_quantity, counted_quantity, variance, \
                             is_adjusted, notes, counted_by, created_at, adjusted_at";

/// Inserts a new, unadjusted count.
pub async fn insert(conn: &mut SqliteConnection, count: &StockCount) -> DbResult<()> {
    debug!(id = %count.id, product_id = %count.product_id, variance = count.variance, "Recording stock count");

    sqlx::query(
        r#"
        INSERT INTO stock_counts (
            id, product_id, system_quantity, counted_quantity, variance,
            is_adjusted, notes, counted_by, created_at, adjusted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&count.id)
    .bind(&count.product_id)
    .bind(count.system_quantity)
    .bind(count.counted_quantity)
    .bind(count.variance)
    .bind(count.is_adjusted)
    .bind(&count.notes)
    .bind(&count.counted_by)
    .bind(count.created_at)
    .bind(count.adjusted_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets a count by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<StockCount>> {
    let count = sqlx::query_as::<_, StockCount>(&format!(
        "SELECT {COUNT_COLUMNS} FROM stock_counts WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(count)
}

/// Flags a count as applied. Returns the updated row, or `None` when it was
/// already adjusted.
pub async fn mark_adjusted(
    conn: &mut SqliteConnection,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<Option<StockCount>> {
    let count = sqlx::query_as::<_, StockCount>(&format!(
        r#"
        UPDATE stock_counts
        SET is_adjusted = 1, adjusted_at = ?2
        WHERE id = ?1 AND is_adjusted = 0
        RETURNING {COUNT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(now)
    .fetch_optional(conn)
    .await?;

    Ok(count)
}

/// Pool-backed read access to stock counts.
#[derive(Debug, Clone)]
pub struct StockCountRepository {
    pool: SqlitePool,
}

impl StockCountRepository {
    /// Creates a new StockCountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockCountRepository { pool }
    }

    /// Gets a count by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockCount>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Counts, newest first, optionally filtered by product and state.
    pub async fn list(
        &self,
        product_id: Option<&str>,
        is_adjusted: Option<bool>,
    ) -> DbResult<Vec<StockCount>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COUNT_COLUMNS} FROM stock_counts WHERE 1 = 1"));

        if let Some(product_id) = product_id {
            builder.push(" AND product_id = ").push_bind(product_id.to_string());
        }
        if let Some(is_adjusted) = is_adjusted {
            builder.push(" AND is_adjusted = ").push_bind(is_adjusted);
        }
        builder.push(" ORDER BY created_at DESC");

        let counts = builder
            .build_query_as::<StockCount>()
            .fetch_all(&self.pool)
            .await?;

        Ok(counts)
    }
}
