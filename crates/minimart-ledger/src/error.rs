//! # Ledger Error Type
//!
//! The error every ledger operation returns, and its caller-facing kind.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Ledger                             │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                  ├──► LedgerError ──► kind()           │
//! │  sqlx::Error ──────► DbError ────┘                      │               │
//! │                                                          ▼               │
//! │   NOT_FOUND  CONFLICT  INVALID_INPUT  INSUFFICIENT_STOCK                │
//! │   PAYMENT_INSUFFICIENT  INVALID_STATE_TRANSITION  UNAVAILABLE           │
//! │                                                                         │
//! │  Every kind is scoped to one request. Nothing is retried here; an      │
//! │  UNAVAILABLE failure left no partial state and may be resubmitted.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use minimart_core::{CoreError, ValidationError};
use minimart_db::DbError;

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Business rule or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure (constraint, connection, lock).
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

/// Caller-facing failure category.
///
/// ```json
/// { "kind": "INSUFFICIENT_STOCK", "message": "Insufficient stock for 'Green Tea' ..." }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Unknown product, member, transaction, stock count or promotion id.
    NotFound,
    /// Duplicate unique key, or a stock count that was already applied.
    Conflict,
    /// Malformed request: empty cart, non-positive quantity, bad discount.
    InvalidInput,
    /// A movement would drive stock negative.
    InsufficientStock,
    /// Tendered amount below the sale total.
    PaymentInsufficient,
    /// Reversing a sale that is not COMPLETED.
    InvalidStateTransition,
    /// Store unreachable, busy or failed mid-commit. Nothing was written.
    Unavailable,
}

impl LedgerError {
    /// Maps the error to its caller-facing kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Core(err) => match err {
                CoreError::ProductNotFound(_)
                | CoreError::MemberNotFound(_)
                | CoreError::TransactionNotFound(_)
                | CoreError::StockCountNotFound(_)
                | CoreError::PromotionNotFound(_) => ErrorKind::NotFound,
                CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
                CoreError::PaymentInsufficient { .. } => ErrorKind::PaymentInsufficient,
                CoreError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
                CoreError::AlreadyAdjusted(_) => ErrorKind::Conflict,
                CoreError::MemberInactive(_)
                | CoreError::InsufficientPoints { .. }
                | CoreError::Validation(_) => ErrorKind::InvalidInput,
            },
            LedgerError::Db(err) => match err {
                DbError::NotFound { .. } => ErrorKind::NotFound,
                DbError::UniqueViolation { .. } => ErrorKind::Conflict,
                DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => {
                    ErrorKind::InvalidInput
                }
                DbError::ConnectionFailed(_)
                | DbError::MigrationFailed(_)
                | DbError::QueryFailed(_)
                | DbError::Busy(_)
                | DbError::TransactionFailed(_)
                | DbError::PoolExhausted
                | DbError::Internal(_) => ErrorKind::Unavailable,
            },
        }
    }

    /// Serializable form for a transport layer.
    ///
    /// Infrastructure details are logged, not returned.
    pub fn report(&self) -> ErrorReport {
        let kind = self.kind();
        let message = if kind == ErrorKind::Unavailable {
            error!(error = %self, "Store unavailable");
            "The store is temporarily unavailable; no changes were made".to_string()
        } else {
            self.to_string()
        };

        ErrorReport { kind, message }
    }
}

/// What a caller receives when an operation fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// Machine-readable category.
    pub kind: ErrorKind,
    /// Human-readable message with context (product, quantities, status).
    pub message: String,
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: LedgerError = CoreError::AlreadyAdjusted("sc-1".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: LedgerError = ValidationError::Empty { field: "items".into() }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err: LedgerError = DbError::duplicate("products.barcode", "885").into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: LedgerError = DbError::PoolExhausted.into();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err: LedgerError = CoreError::InvalidStateTransition {
            sale_id: "s-1".into(),
            current_status: "VOIDED".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    }

    #[test]
    fn test_report_serialization() {
        let err: LedgerError = CoreError::InsufficientStock {
            product_id: "p-1".into(),
            name: "Green Tea".into(),
            available: 3,
            requested: 5,
        }
        .into();

        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["kind"], "INSUFFICIENT_STOCK");
        assert!(json["message"].as_str().unwrap().contains("available 3"));
    }

    #[test]
    fn test_unavailable_report_hides_details() {
        let err: LedgerError = DbError::QueryFailed("disk I/O error".into()).into();
        let report = err.report();
        assert_eq!(report.kind, ErrorKind::Unavailable);
        assert!(!report.message.contains("disk"));
    }
}
