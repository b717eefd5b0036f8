//! # Validation Module
//!
//! Input validation for ledger requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (before any unit of work starts)                 │
//! │  ├── Shape checks (empty cart, non-positive quantities)                │
//! │  └── Range checks (discount vs subtotal, points != 0)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Processors (inside the unit of work)                         │
//! │  ├── Existence / active checks against live rows                       │
//! │  └── Stock pre-check naming the product                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), UNIQUE barcode / phone                        │
//! │  └── Conditional stock UPDATE at commit time                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use minimart_core::validation::{validate_quantity, validate_reason};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_reason("  ").is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use minimart_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Green Tea 500ml").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates the mandatory reason on an issuing movement.
///
/// Damage, expiry and transfers must always be explained.
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    validate_text("reason", reason, 500)
}

/// Validates a promotion name.
pub fn validate_promotion_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates a member's first name.
pub fn validate_member_name(name: &str) -> ValidationResult<()> {
    validate_text("first_name", name, 100)
}

/// Validates an optional member email: `local@domain` with a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, 254)?;

    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a member phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, `+` and `-` only
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_text("phone", phone, 20)?;

    if !phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement or line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ```rust
/// use minimart_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a physically counted quantity. Zero is a legitimate count.
pub fn validate_counted_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "counted_quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "counted_quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level or threshold set on a catalog row.
pub fn validate_stock_level(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a sale discount against the subtotal it reduces.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed the subtotal (a sale total is never negative)
pub fn validate_discount(discount_cents: i64, subtotal_cents: i64) -> ValidationResult<()> {
    if discount_cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });
    }

    if discount_cents > subtotal_cents {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: subtotal_cents,
        });
    }

    Ok(())
}

/// Validates a tendered payment amount.
///
/// Zero is accepted (a fully discounted sale); the comparison with the total
/// happens in the sale processor.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a manual point adjustment.
pub fn validate_points(points: i64) -> ValidationResult<()> {
    if points == 0 {
        return Err(ValidationError::MustNotBeZero {
            field: "points".to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage held in basis points (0% to 100%).
pub fn validate_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a sale or receiving batch.
///
/// ## Rules
/// - At least one line
/// - At most MAX_SALE_LINES
pub fn validate_line_count(field: &str, lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }

    if lines > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    Ok(())
}

/// Validates a promotion validity window. Either bound may be absent.
pub fn validate_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "end_date".to_string(),
                reason: "must not be before start_date".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents("price", 0).is_ok());
        assert!(validate_price_cents("price", MAX_PRICE_CENTS).is_ok());

        assert!(validate_price_cents("price", -1).is_err());
        assert!(validate_price_cents("price", MAX_PRICE_CENTS + 1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_counted_quantity() {
        assert!(validate_counted_quantity(0).is_ok());
        assert!(validate_counted_quantity(12).is_ok());
        assert!(validate_counted_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(0, 1000).is_ok());
        assert!(validate_discount(1000, 1000).is_ok());
        assert!(validate_discount(-1, 1000).is_err());
        assert!(validate_discount(1001, 1000).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("damaged").is_ok());
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_points() {
        assert!(validate_points(10).is_ok());
        assert!(validate_points(-10).is_ok());
        assert!(matches!(
            validate_points(0),
            Err(ValidationError::MustNotBeZero { .. })
        ));
    }

    #[test]
    fn test_validate_line_count() {
        assert!(matches!(
            validate_line_count("items", 0),
            Err(ValidationError::Empty { .. })
        ));
        assert!(validate_line_count("items", 1).is_ok());
        assert!(validate_line_count("items", MAX_SALE_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+66 81-234-5678").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("somchai@example.co.th").is_ok());
        assert!(validate_email("somchai").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("somchai@localhost").is_err());
    }

    #[test]
    fn test_validate_stock_level() {
        assert!(validate_stock_level("stock", 0).is_ok());
        assert!(matches!(
            validate_stock_level("min_stock", -1),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_window() {
        let now = Utc::now();
        assert!(validate_window(None, None).is_ok());
        assert!(validate_window(Some(now), None).is_ok());
        assert!(validate_window(Some(now), Some(now + Duration::days(1))).is_ok());
        assert!(validate_window(Some(now), Some(now - Duration::days(1))).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps(0).is_ok());
        assert!(validate_rate_bps(10_000).is_ok());
        assert!(validate_rate_bps(10_001).is_err());
    }
}
