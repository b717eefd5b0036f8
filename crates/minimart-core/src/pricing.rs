//! # Sale Pricing
//!
//! Pure arithmetic for ringing up a sale: line totals from frozen prices,
//! subtotal, discount, total, change and loyalty points.
//!
//! ```text
//! PricedLine × n ──► subtotal ──► − discount ──► total
//!                                                 │
//!                        payment.amount − total ◄─┤──► change
//!                                                 │
//!                         floor(total / value) ◄──┘──► points
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_discount;

// =============================================================================
// Priced Line
// =============================================================================

/// A sale line with the product's data frozen at this moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl PricedLine {
    /// Freezes the product's current name, barcode and price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        PricedLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// unit_price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Computed money fields of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub paid: Money,
    pub change: Money,
    pub points_earned: i64,
}

/// Prices a sale.
///
/// ## Errors
/// - `Validation` if the discount is negative or exceeds the subtotal
/// - `PaymentInsufficient` if `paid < total`
///
/// ## Example
/// ```rust
/// use minimart_core::money::Money;
/// use minimart_core::pricing::{price_sale, PricedLine};
///
/// let lines = vec![PricedLine {
///     product_id: "p-1".into(),
///     name: "Rice 5kg".into(),
///     barcode: None,
///     unit_price_cents: 6_500,
///     quantity: 2,
/// }];
/// let totals = price_sale(&lines, Money::zero(), Money::from_major(150), 2_500).unwrap();
///
/// assert_eq!(totals.total, Money::from_major(130));
/// assert_eq!(totals.change, Money::from_major(20));
/// assert_eq!(totals.points_earned, 5);
/// ```
pub fn price_sale(
    lines: &[PricedLine],
    discount: Money,
    paid: Money,
    point_value_cents: i64,
) -> CoreResult<SaleTotals> {
    let subtotal: Money = lines.iter().map(PricedLine::line_total).sum();
    validate_discount(discount.cents(), subtotal.cents())?;

    let total = subtotal - discount;
    if paid < total {
        return Err(CoreError::PaymentInsufficient {
            paid_cents: paid.cents(),
            total_cents: total.cents(),
        });
    }

    Ok(SaleTotals {
        subtotal,
        discount,
        total,
        paid,
        change: paid - total,
        points_earned: points_earned(total, point_value_cents),
    })
}

/// Loyalty points for a sale total: `floor(total / point_value)`.
///
/// Never rounds up, never negative. A non-positive point value earns nothing.
pub fn points_earned(total: Money, point_value_cents: i64) -> i64 {
    if point_value_cents <= 0 || total.cents() <= 0 {
        return 0;
    }
    total.cents() / point_value_cents
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::DEFAULT_POINT_VALUE_CENTS;

    fn line(price_cents: i64, quantity: i64) -> PricedLine {
        PricedLine {
            product_id: format!("p-{price_cents}"),
            name: "Item".to_string(),
            barcode: None,
            unit_price_cents: price_cents,
            quantity,
        }
    }

    #[test]
    fn test_totals_and_change() {
        let lines = vec![line(1000, 3), line(250, 2)];
        let totals = price_sale(
            &lines,
            Money::from_cents(500),
            Money::from_cents(4000),
            DEFAULT_POINT_VALUE_CENTS,
        )
        .unwrap();

        assert_eq!(totals.subtotal.cents(), 3500);
        assert_eq!(totals.total.cents(), 3000);
        assert_eq!(totals.change.cents(), 1000);
        assert_eq!(totals.total, totals.subtotal - totals.discount);
        assert_eq!(totals.points_earned, 1);
    }

    #[test]
    fn test_exact_payment_gives_zero_change() {
        let totals = price_sale(&[line(999, 1)], Money::zero(), Money::from_cents(999), 2500).unwrap();
        assert!(totals.change.is_zero());
    }

    #[test]
    fn test_payment_insufficient() {
        let err = price_sale(&[line(1000, 2)], Money::zero(), Money::from_cents(1999), 2500)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::PaymentInsufficient {
                paid_cents: 1999,
                total_cents: 2000
            }
        ));
    }

    #[test]
    fn test_discount_above_subtotal_rejected() {
        let err = price_sale(&[line(1000, 1)], Money::from_cents(1001), Money::from_cents(5000), 2500)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_points_floor() {
        assert_eq!(points_earned(Money::from_major(130), DEFAULT_POINT_VALUE_CENTS), 5);
        assert_eq!(points_earned(Money::from_cents(4999), DEFAULT_POINT_VALUE_CENTS), 1);
        assert_eq!(points_earned(Money::from_major(24), DEFAULT_POINT_VALUE_CENTS), 0);
        assert_eq!(points_earned(Money::from_major(100), 0), 0);
    }
}
