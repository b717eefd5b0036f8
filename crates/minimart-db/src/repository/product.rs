//! # Product Repository
//!
//! Catalog rows as the ledger needs them: identity, price, active flag and
//! the stock threshold.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                                                               │
//! │                                                                         │
//! │  id, barcode, name, price, cost, min_stock, is_active                  │
//! │      ▲                                                                  │
//! │      └── this module (catalog operations)                              │
//! │                                                                         │
//! │  stock                                                                  │
//! │      ▲                                                                  │
//! │      ├── insert() sets the opening value once                          │
//! │      └── repository::ledger::apply_delta() for every later change      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use minimart_core::{Product, StockOverview};

const PRODUCT_COLUMNS: &str = "id, barcode, name, price_cents, cost_cents, stock, min_stock, \
                               is_active, created_at, updated_at";

// =============================================================================
// Connection-level queries (usable inside a unit of work)
// =============================================================================

/// Gets a product by id, active or not.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Inserts a new product with its opening stock.
///
/// ## Errors
/// `UniqueViolation` when the barcode is already used.
pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(id = %product.id, name = %product.name, stock = product.stock, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, barcode, name, price_cents, cost_cents,
            stock, min_stock, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&product.id)
    .bind(&product.barcode)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.cost_cents)
    .bind(product.stock)
    .bind(product.min_stock)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => {
            DbError::duplicate(field, product.barcode.clone().unwrap_or_default())
        }
        other => other,
    })?;

    Ok(())
}

/// Sets the active flag. Returns false when the product doesn't exist.
pub async fn set_active(conn: &mut SqliteConnection, id: &str, active: bool) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(id)
    .bind(active)
    .bind(chrono::Utc::now())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Whether any sale, ledger entry, count or promotion refers to the product.
///
/// Such products are history and may only be deactivated.
pub async fn is_referenced(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let referenced: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (SELECT 1 FROM sale_items WHERE product_id = ?1)
            OR EXISTS (SELECT 1 FROM stock_ledger WHERE product_id = ?1)
            OR EXISTS (SELECT 1 FROM stock_counts WHERE product_id = ?1)
            OR EXISTS (SELECT 1 FROM promotion_products WHERE product_id = ?1)
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(referenced)
}

/// Hard-deletes an unreferenced product.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting product");

    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-backed read access to products.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.products().get_by_id("uuid-here").await?;
/// let low = db.products().low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Gets a product by barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Active products at or below their reorder threshold but not empty,
    /// lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock > 0 AND stock <= min_stock \
             ORDER BY stock ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Aggregate stock position across active products.
    pub async fn overview(&self) -> DbResult<StockOverview> {
        let overview = sqlx::query_as::<_, StockOverview>(
            r#"
            SELECT
                COUNT(*) AS active_products,
                COALESCE(SUM(CASE WHEN stock > 0 AND stock <= min_stock THEN 1 ELSE 0 END), 0) AS low_stock,
                COALESCE(SUM(CASE WHEN stock = 0 THEN 1 ELSE 0 END), 0) AS out_of_stock,
                COALESCE(SUM(stock * price_cents), 0) AS retail_value_cents,
                COALESCE(SUM(stock * COALESCE(cost_cents, price_cents)), 0) AS cost_value_cents
            FROM products
            WHERE is_active = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(overview)
    }

    /// Counts active products.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
