//! # Member Directory
//!
//! Loyalty members and manual point adjustments.
//!
//! ```text
//! adjust_points(member, +50)  ──► BONUS       balance 120 → 170
//! adjust_points(member, -30)  ──► ADJUSTMENT  balance 170 → 140
//! adjust_points(member, -500) ──► InsufficientPoints, balance unchanged
//! ```
//!
//! Earned points come from the sale processor; nothing here runs on a sale.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use minimart_core::validation::{
    validate_email, validate_member_name, validate_phone, validate_points,
};
use minimart_core::{
    CoreError, Member, NewMember, PointTransaction, PointTransactionType, ValidationError,
};
use minimart_db::repository::member;
use minimart_db::{with_atomic_unit, Database};

use crate::error::{LedgerError, LedgerResult};

const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Registers a member with a zero balance.
///
/// ## Errors
/// `UniqueViolation` (CONFLICT) when the phone or email is already registered.
pub async fn create_member(db: &Database, new: NewMember) -> LedgerResult<Member> {
    validate_phone(&new.phone)?;
    validate_member_name(&new.first_name)?;
    let email = new
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    if let Some(email) = &email {
        validate_email(email)?;
    }

    let now = Utc::now();
    let record = Member {
        id: Uuid::new_v4().to_string(),
        phone: new.phone.trim().to_string(),
        first_name: new.first_name.trim().to_string(),
        last_name: new
            .last_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        email,
        total_points: 0,
        total_spent_cents: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let created = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            member::insert(unit.conn(), &record).await?;
            Ok::<_, LedgerError>(record)
        })
    })
    .await?;

    info!(id = %created.id, "Member registered");
    Ok(created)
}

pub async fn get_member(db: &Database, id: &str) -> LedgerResult<Member> {
    let member = db
        .members()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::MemberNotFound(id.to_string()))?;

    Ok(member)
}

pub async fn get_member_by_phone(db: &Database, phone: &str) -> LedgerResult<Member> {
    let member = db
        .members()
        .get_by_phone(phone.trim())
        .await?
        .ok_or_else(|| CoreError::MemberNotFound(phone.to_string()))?;

    Ok(member)
}

/// Turns a member's account on or off. An inactive member can't be linked
/// to new sales; balance and history are kept.
pub async fn set_member_active(db: &Database, id: &str, active: bool) -> LedgerResult<Member> {
    let member_id = id.to_string();

    let updated = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            if !member::set_active(unit.conn(), &member_id, active, Utc::now()).await? {
                return Err(CoreError::MemberNotFound(member_id).into());
            }
            let updated = member::find_by_id(unit.conn(), &member_id)
                .await?
                .ok_or_else(|| CoreError::MemberNotFound(member_id.clone()))?;
            Ok::<_, LedgerError>(updated)
        })
    })
    .await?;

    info!(id = %updated.id, active, "Member status changed");
    Ok(updated)
}

/// Adds (BONUS) or removes (ADJUSTMENT) points by hand.
///
/// ## Errors
/// - `Validation` for a zero adjustment
/// - `MemberNotFound` for an unknown member
/// - `InsufficientPoints` when the balance would go below zero
/// - `Validation` when the balance would overflow
pub async fn adjust_points(
    db: &Database,
    member_id: &str,
    points: i64,
    description: Option<String>,
    actor: Option<String>,
) -> LedgerResult<PointTransaction> {
    validate_points(points)?;

    let member_id = member_id.to_string();
    let result: LedgerResult<PointTransaction> = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            let current = member::find_by_id(unit.conn(), &member_id)
                .await?
                .ok_or_else(|| CoreError::MemberNotFound(member_id.clone()))?;

            let Some(balance_after) = current.total_points.checked_add(points) else {
                return Err(ValidationError::OutOfRange {
                    field: "points".to_string(),
                    min: -current.total_points,
                    max: i64::MAX - current.total_points,
                }
                .into());
            };
            if balance_after < 0 {
                return Err(CoreError::InsufficientPoints {
                    member_id: current.id,
                    balance: current.total_points,
                    requested: points,
                }
                .into());
            }

            let now = Utc::now();
            let balance_before = member::apply_points(unit.conn(), &member_id, points, 0, now)
                .await?
                .ok_or_else(|| CoreError::InsufficientPoints {
                    member_id: member_id.clone(),
                    balance: current.total_points,
                    requested: points,
                })?;

            let kind = if points > 0 {
                PointTransactionType::Bonus
            } else {
                PointTransactionType::Adjustment
            };
            let record = PointTransaction {
                id: Uuid::new_v4().to_string(),
                member_id: member_id.clone(),
                sale_id: None,
                kind,
                points,
                balance_before,
                balance_after: balance_before + points,
                description,
                created_by: actor,
                created_at: now,
            };
            member::insert_point_transaction(unit.conn(), &record).await?;

            Ok(record)
        })
    })
    .await;

    match &result {
        Ok(record) => info!(
            member_id = %record.member_id,
            points = record.points,
            balance_after = record.balance_after,
            "Points adjusted"
        ),
        Err(err) => warn!(error = %err, kind = ?err.kind(), "Point adjustment rejected"),
    }

    result
}

/// Point history, newest first.
pub async fn point_history(
    db: &Database,
    member_id: &str,
    limit: Option<i64>,
) -> LedgerResult<Vec<PointTransaction>> {
    get_member(db, member_id).await?;

    let history = db
        .members()
        .point_history(member_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await?;

    Ok(history)
}
