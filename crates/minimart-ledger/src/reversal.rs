//! # Reversal Processor
//!
//! Void and refund: move a COMPLETED sale to a terminal status and put every
//! sold unit back on the shelf.
//!
//! ```text
//! COMPLETED ──void──►   VOIDED     REFUND entries, reason "Transaction Voided"
//!     │
//!     └─────refund──► REFUNDED     REFUND entries, reason "Customer Refund",
//!                                  notes += "[REFUND: reason]"
//!
//! VOIDED / REFUNDED ──any──► InvalidStateTransition
//! ```
//!
//! Points earned by the sale stay with the member. Taking them back is a
//! separate point adjustment.

use chrono::Utc;
use tracing::{info, warn};

use minimart_core::validation::validate_reason;
use minimart_core::{
    CoreError, MovementContext, ReversalMode, SaleDetail, SaleStatus, StockMovement,
};
use minimart_db::repository::sale;
use minimart_db::{with_atomic_unit, Database};

use crate::error::LedgerResult;
use crate::stock_ledger::apply_movement;

/// Voids or refunds a sale.
///
/// ## Errors
/// - `TransactionNotFound` for an unknown sale id
/// - `InvalidStateTransition` when the sale is not COMPLETED
pub async fn reverse_sale(
    db: &Database,
    sale_id: &str,
    mode: ReversalMode,
    reason: Option<String>,
    actor: Option<String>,
) -> LedgerResult<SaleDetail> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    if let Some(reason) = &reason {
        validate_reason(reason)?;
    }

    let sale_id = sale_id.to_string();
    let result: LedgerResult<SaleDetail> = with_atomic_unit(db, move |unit| {
        Box::pin(async move {
            let record = sale::find_by_id(unit.conn(), &sale_id)
                .await?
                .ok_or_else(|| CoreError::TransactionNotFound(sale_id.clone()))?;

            if record.status != SaleStatus::Completed {
                return Err(CoreError::InvalidStateTransition {
                    sale_id: record.id,
                    current_status: record.status.to_string(),
                }
                .into());
            }

            let notes = match (mode, &reason) {
                (ReversalMode::Refund, Some(reason)) => Some(refund_notes(record.notes.as_deref(), reason)),
                _ => None,
            };

            let now = Utc::now();
            let moved = sale::transition_status(
                unit.conn(),
                &record.id,
                mode.target_status(),
                notes.as_deref(),
                now,
            )
            .await?;
            if !moved {
                return Err(CoreError::InvalidStateTransition {
                    sale_id: record.id,
                    current_status: record.status.to_string(),
                }
                .into());
            }

            let context = MovementContext::with_reference(record.sale_number.clone())
                .reason(reason.unwrap_or_else(|| mode.default_reason().to_string()))
                .actor(actor);
            for item in sale::items_for_sale(unit.conn(), &record.id).await? {
                apply_movement(
                    unit.conn(),
                    &item.product_id,
                    StockMovement::refund(item.quantity),
                    &context,
                )
                .await?;
            }

            let detail = sale::find_detail(unit.conn(), &record.id)
                .await?
                .ok_or_else(|| CoreError::TransactionNotFound(record.id.clone()))?;
            Ok(detail)
        })
    })
    .await;

    match &result {
        Ok(detail) => info!(
            sale_number = %detail.sale.sale_number,
            status = %detail.sale.status,
            items = detail.items.len(),
            "Sale reversed"
        ),
        Err(err) => warn!(error = %err, kind = ?err.kind(), "Reversal rejected"),
    }

    result
}

/// Sale notes after a refund: existing notes, then `[REFUND: reason]`.
fn refund_notes(existing: Option<&str>, reason: &str) -> String {
    format!("{} [REFUND: {}]", existing.unwrap_or_default(), reason)
        .trim()
        .to_string()
}
