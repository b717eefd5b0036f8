//! # Member Repository
//!
//! Loyalty accounts and their point transactions.
//!
//! ```text
//! members.total_points ──► never below zero (CHECK + guarded UPDATE)
//!        ▲
//!        └── apply_points(delta) ──► point_transactions row
//!                                     balance_before / balance_after
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use minimart_core::{Member, PointTransaction};

const MEMBER_COLUMNS: &str = "id, phone, first_name, last_name, email, total_points, \
                              total_spent_cents, is_active, created_at, updated_at";

const POINT_COLUMNS: &str = "id, member_id, sale_id, kind, points, balance_before, \
                             balance_after, description, created_by, created_at";

// =============================================================================
// Connection-level queries (usable inside a unit of work)
// =============================================================================

/// Inserts a member.
///
/// ## Errors
/// `UniqueViolation` on a duplicate phone or email.
pub async fn insert(conn: &mut SqliteConnection, member: &Member) -> DbResult<()> {
    debug!(id = %member.id, "Inserting member");

    sqlx::query(
        r#"
        INSERT INTO members (
            id, phone, first_name, last_name, email,
            total_points, total_spent_cents, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&member.id)
    .bind(&member.phone)
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(&member.email)
    .bind(member.total_points)
    .bind(member.total_spent_cents)
    .bind(member.is_active)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } if field.ends_with("email") => {
            DbError::duplicate(field, member.email.clone().unwrap_or_default())
        }
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, member.phone.clone()),
        other => other,
    })?;

    Ok(())
}

/// Gets a member by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Member>> {
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(member)
}

/// Sets the active flag. Returns false when the member doesn't exist.
pub async fn set_active(
    conn: &mut SqliteConnection,
    id: &str,
    active: bool,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(id = %id, active, "Setting member active flag");

    let result = sqlx::query("UPDATE members SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Adds `points` to the balance and `spent_cents` to lifetime spend.
///
/// Returns the balance before the change, or `None` when the member doesn't
/// exist or the balance would go negative.
pub async fn apply_points(
    conn: &mut SqliteConnection,
    member_id: &str,
    points: i64,
    spent_cents: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let balance_after: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE members
        SET total_points = total_points + ?2,
            total_spent_cents = total_spent_cents + ?3,
            updated_at = ?4
        WHERE id = ?1 AND total_points + ?2 >= 0
        RETURNING total_points
        "#,
    )
    .bind(member_id)
    .bind(points)
    .bind(spent_cents)
    .bind(now)
    .fetch_optional(conn)
    .await?;

    Ok(balance_after.map(|after| after - points))
}

/// Appends a point transaction.
pub async fn insert_point_transaction(
    conn: &mut SqliteConnection,
    record: &PointTransaction,
) -> DbResult<()> {
    debug!(member_id = %record.member_id, kind = ?record.kind, points = record.points, "Appending point transaction");

    sqlx::query(
        r#"
        INSERT INTO point_transactions (
            id, member_id, sale_id, kind, points,
            balance_before, balance_after, description, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&record.id)
    .bind(&record.member_id)
    .bind(&record.sale_id)
    .bind(record.kind)
    .bind(record.points)
    .bind(record.balance_before)
    .bind(record.balance_after)
    .bind(&record.description)
    .bind(&record.created_by)
    .bind(record.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-backed read access to members.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Creates a new MemberRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MemberRepository { pool }
    }

    /// Gets a member by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Member>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Gets a member by phone number.
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE phone = ?1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Point transactions for a member, newest first.
    pub async fn point_history(&self, member_id: &str, limit: i64) -> DbResult<Vec<PointTransaction>> {
        let history = sqlx::query_as::<_, PointTransaction>(&format!(
            "SELECT {POINT_COLUMNS} FROM point_transactions WHERE member_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ))
        .bind(member_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }
}
