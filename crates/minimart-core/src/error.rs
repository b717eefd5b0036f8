//! # Error Types
//!
//! Domain-specific error types for minimart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  minimart-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  minimart-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  minimart-ledger errors                                                │
//! │  └── LedgerError      - What callers see, with an ErrorKind            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError ← DbError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities, status)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is an expected, caller-facing failure. None of them are
/// retried automatically; the caller corrects the request and resubmits.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is unknown, or the product has been deactivated.
    #[error("Product not found or inactive: {0}")]
    ProductNotFound(String),

    /// Member id is unknown.
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Member exists but is deactivated.
    #[error("Member {0} is inactive")]
    MemberInactive(String),

    /// Sale id is unknown.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Stock count id is unknown.
    #[error("Stock count not found: {0}")]
    StockCountNotFound(String),

    /// Promotion id is unknown.
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// A movement would drive stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 5 × Green Tea
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Green Tea", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Till shows: "Insufficient stock for 'Green Tea'. Available: 3"
    /// ```
    #[error("Insufficient stock for '{name}' ({product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Tendered amount is below the sale total.
    #[error("Payment amount ({paid_cents}) is less than total ({total_cents})")]
    PaymentInsufficient { paid_cents: i64, total_cents: i64 },

    /// Sale is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Voiding or refunding a sale that is already voided or refunded
    #[error("Transaction {sale_id} is already {current_status}")]
    InvalidStateTransition {
        sale_id: String,
        current_status: String,
    },

    /// Stock count has already been applied to stock.
    #[error("Stock count {0} has already been adjusted")]
    AlreadyAdjusted(String),

    /// A point adjustment would drive the member balance below zero.
    #[error("Insufficient points for member {member_id}: balance {balance}, adjustment {requested}")]
    InsufficientPoints {
        member_id: String,
        balance: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any unit of work starts, so they never leave partial state.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustNotBeZero { field: String },

    /// Invalid format (e.g., invalid UUID, inverted date window).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection must not be empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            name: "Green Tea".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 'Green Tea' (p-1): available 3, requested 5"
        );

        let err = CoreError::InvalidStateTransition {
            sale_id: "s-1".to_string(),
            current_status: "VOIDED".to_string(),
        };
        assert_eq!(err.to_string(), "Transaction s-1 is already VOIDED");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "reason".to_string(),
        };
        assert_eq!(err.to_string(), "reason is required");

        let err = ValidationError::Empty {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items must contain at least one entry");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
