//! # Promotion Repository
//!
//! Promotions and their product roles, assembled into the engine's
//! [`Promotion`] model.
//!
//! ```text
//! promotions ─────────────┐
//!   kind, buy/free qty,   │      ┌──────────────────────────────┐
//!   discount_bps, window  ├────► │ Promotion { rule, window,    │
//!                         │      │   trigger_product_ids,       │
//! promotion_products ─────┤      │   free_products (+ price) }  │
//!   role = trigger | free │      └──────────────────────────────┘
//! products.price_cents ───┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use minimart_core::promotion::{FreeProduct, Promotion, PromotionKind, PromotionRule, ValidityWindow};

const ROLE_TRIGGER: &str = "trigger";
const ROLE_FREE: &str = "free";

#[derive(Debug, FromRow)]
struct PromotionRow {
    id: String,
    name: String,
    description: Option<String>,
    kind: PromotionKind,
    is_active: bool,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    buy_qty: Option<i64>,
    free_qty: Option<i64>,
    discount_bps: Option<i64>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    promotion_id: String,
    product_id: String,
    role: String,
    price_cents: i64,
}

impl PromotionRow {
    fn into_promotion(self, roles: Vec<RoleRow>) -> Promotion {
        let discount_bps = self
            .discount_bps
            .and_then(|bps| u32::try_from(bps).ok());
        let rule = PromotionRule::from_parts(self.kind, self.buy_qty, self.free_qty, discount_bps);

        let mut trigger_product_ids = Vec::new();
        let mut free_products = Vec::new();
        for role in roles {
            if role.role == ROLE_FREE {
                free_products.push(FreeProduct {
                    product_id: role.product_id,
                    price_cents: role.price_cents,
                });
            } else {
                trigger_product_ids.push(role.product_id);
            }
        }

        Promotion {
            id: self.id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            window: ValidityWindow {
                start: self.start_date,
                end: self.end_date,
            },
            rule,
            trigger_product_ids,
            free_products,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Connection-level queries
// =============================================================================

/// Inserts a promotion with its trigger and free product roles.
pub async fn insert(conn: &mut SqliteConnection, promotion: &Promotion) -> DbResult<()> {
    debug!(id = %promotion.id, kind = %promotion.rule.kind(), "Inserting promotion");

    let (buy_qty, free_qty, discount_bps) = promotion.rule.parts();

    sqlx::query(
        r#"
        INSERT INTO promotions (
            id, name, description, kind, is_active, start_date, end_date,
            buy_qty, free_qty, discount_bps, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
        "#,
    )
    .bind(&promotion.id)
    .bind(&promotion.name)
    .bind(&promotion.description)
    .bind(promotion.rule.kind())
    .bind(promotion.is_active)
    .bind(promotion.window.start)
    .bind(promotion.window.end)
    .bind(buy_qty)
    .bind(free_qty)
    .bind(discount_bps.map(i64::from))
    .bind(promotion.created_at)
    .execute(&mut *conn)
    .await?;

    let roles = promotion
        .trigger_product_ids
        .iter()
        .map(|id| (id.as_str(), ROLE_TRIGGER))
        .chain(
            promotion
                .free_products
                .iter()
                .map(|free| (free.product_id.as_str(), ROLE_FREE)),
        );

    for (product_id, role) in roles {
        sqlx::query(
            "INSERT OR IGNORE INTO promotion_products (promotion_id, product_id, role) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(&promotion.id)
        .bind(product_id)
        .bind(role)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Sets the active flag. Returns false when the promotion doesn't exist.
pub async fn set_active(conn: &mut SqliteConnection, id: &str, active: bool) -> DbResult<bool> {
    let result = sqlx::query("UPDATE promotions SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(active)
        .bind(Utc::now())
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn load(conn: &mut SqliteConnection, rows: Vec<PromotionRow>) -> DbResult<Vec<Promotion>> {
    let role_rows = sqlx::query_as::<_, RoleRow>(
        r#"
        SELECT pp.promotion_id, pp.product_id, pp.role, p.price_cents
        FROM promotion_products pp
        JOIN products p ON p.id = pp.product_id
        ORDER BY pp.rowid ASC
        "#,
    )
    .fetch_all(conn)
    .await?;

    let mut roles: HashMap<String, Vec<RoleRow>> = HashMap::new();
    for role in role_rows {
        roles.entry(role.promotion_id.clone()).or_default().push(role);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let promotion_roles = roles.remove(&row.id).unwrap_or_default();
            row.into_promotion(promotion_roles)
        })
        .collect())
}

const PROMOTION_COLUMNS: &str = "id, name, description, kind, is_active, start_date, end_date, \
                                 buy_qty, free_qty, discount_bps, created_at";

/// Gets a promotion by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Promotion>> {
    let row = sqlx::query_as::<_, PromotionRow>(&format!(
        "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(load(conn, vec![row]).await?.into_iter().next()),
        None => Ok(None),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-backed read access to promotions.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Gets a promotion by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// All promotions, newest first.
    pub async fn all(&self) -> DbResult<Vec<Promotion>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, PromotionRow>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY created_at DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        load(&mut conn, rows).await
    }

    /// Promotions with the active flag set whose window contains `now`,
    /// newest first.
    pub async fn active_at(&self, now: DateTime<Utc>) -> DbResult<Vec<Promotion>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, PromotionRow>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE is_active = 1 ORDER BY created_at DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        let promotions = load(&mut conn, rows).await?;
        Ok(promotions
            .into_iter()
            .filter(|promotion| promotion.is_active_at(now))
            .collect())
    }
}
