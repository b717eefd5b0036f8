//! # Promotion Rule Engine
//!
//! Stateless evaluation of discount rules against a cart.
//!
//! ## Evaluation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate(cart, promotions, now)                                        │
//! │                                                                         │
//! │  promotions ──► active at `now`? ──► rule.discount(cart) ──► > 0 ?     │
//! │                       │                                        │        │
//! │                       └── no: skipped          yes: applied ◄──┘        │
//! │                                                                         │
//! │  Every applied promotion is summed. There is no precedence and no      │
//! │  stacking suppression: two promotions on the same product both count.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rule Kinds
//! | Kind               | Parameters            | Discount                                   |
//! |--------------------|-----------------------|--------------------------------------------|
//! | Buy X Get Y        | buy, free             | `floor(q / (buy+free)) * free * price`     |
//! | Quantity Discount  | min qty, rate         | `line_total * rate` when `q >= min`        |
//! | Bundle Free        | free                  | `min(q over triggers) * free * free_price` |
//! | Next Item Discount | buy, rate             | `floor(q / (buy+1)) * price * rate`        |
//!
//! Percentages are basis points and round half up to the cent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::{DiscountRate, Money};

/// Default "buy" quantity for Buy X Get Y and Next Item Discount.
pub const DEFAULT_BUY_QTY: i64 = 2;

/// Default "free" quantity for Buy X Get Y and Bundle Free.
pub const DEFAULT_FREE_QTY: i64 = 1;

/// Default minimum quantity for Quantity Discount.
pub const DEFAULT_MIN_QTY: i64 = 1;

// =============================================================================
// Promotion Model
// =============================================================================

/// Stored discriminator of a promotion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionKind {
    BuyXGetY,
    QuantityDiscount,
    BundleFree,
    NextItemDiscount,
}

impl PromotionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionKind::BuyXGetY => "BUY_X_GET_Y",
            PromotionKind::QuantityDiscount => "QUANTITY_DISCOUNT",
            PromotionKind::BundleFree => "BUNDLE_FREE",
            PromotionKind::NextItemDiscount => "NEXT_ITEM_DISCOUNT",
        }
    }
}

impl fmt::Display for PromotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discount rule with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionRule {
    /// Every `buy + free` units of a trigger product, `free` are free.
    BuyXGetY { buy_qty: i64, free_qty: i64 },
    /// A trigger line of at least `min_qty` units gets `rate` off.
    QuantityDiscount { min_qty: i64, rate: DiscountRate },
    /// Buying every trigger product gives `free_qty` of each free product per bundle.
    BundleFree { free_qty: i64 },
    /// Every `buy + 1`-th unit of a trigger product gets `rate` off.
    NextItemDiscount { buy_qty: i64, rate: DiscountRate },
}

impl PromotionRule {
    /// Builds a rule from stored columns, filling in defaults for absent or
    /// non-positive parameters.
    ///
    /// ```rust
    /// use minimart_core::promotion::{PromotionKind, PromotionRule};
    ///
    /// let rule = PromotionRule::from_parts(PromotionKind::BuyXGetY, None, None, None);
    /// assert_eq!(rule, PromotionRule::BuyXGetY { buy_qty: 2, free_qty: 1 });
    /// ```
    pub fn from_parts(
        kind: PromotionKind,
        buy_qty: Option<i64>,
        free_qty: Option<i64>,
        discount_bps: Option<u32>,
    ) -> Self {
        let positive = |value: Option<i64>, default: i64| value.filter(|v| *v > 0).unwrap_or(default);
        let rate = DiscountRate::from_bps(discount_bps.unwrap_or(0));

        match kind {
            PromotionKind::BuyXGetY => PromotionRule::BuyXGetY {
                buy_qty: positive(buy_qty, DEFAULT_BUY_QTY),
                free_qty: positive(free_qty, DEFAULT_FREE_QTY),
            },
            PromotionKind::QuantityDiscount => PromotionRule::QuantityDiscount {
                min_qty: positive(buy_qty, DEFAULT_MIN_QTY),
                rate,
            },
            PromotionKind::BundleFree => PromotionRule::BundleFree {
                free_qty: positive(free_qty, DEFAULT_FREE_QTY),
            },
            PromotionKind::NextItemDiscount => PromotionRule::NextItemDiscount {
                buy_qty: positive(buy_qty, DEFAULT_BUY_QTY),
                rate,
            },
        }
    }

    pub const fn kind(&self) -> PromotionKind {
        match self {
            PromotionRule::BuyXGetY { .. } => PromotionKind::BuyXGetY,
            PromotionRule::QuantityDiscount { .. } => PromotionKind::QuantityDiscount,
            PromotionRule::BundleFree { .. } => PromotionKind::BundleFree,
            PromotionRule::NextItemDiscount { .. } => PromotionKind::NextItemDiscount,
        }
    }

    /// Stored columns: (buy_qty, free_qty, discount_bps).
    pub fn parts(&self) -> (Option<i64>, Option<i64>, Option<u32>) {
        match *self {
            PromotionRule::BuyXGetY { buy_qty, free_qty } => (Some(buy_qty), Some(free_qty), None),
            PromotionRule::QuantityDiscount { min_qty, rate } => (Some(min_qty), None, Some(rate.bps())),
            PromotionRule::BundleFree { free_qty } => (None, Some(free_qty), None),
            PromotionRule::NextItemDiscount { buy_qty, rate } => (Some(buy_qty), None, Some(rate.bps())),
        }
    }
}

/// Optional `[start, end]` bounds; an absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidityWindow {
    #[ts(as = "Option<String>")]
    pub start: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    /// Both bounds are inclusive.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= now) && self.end.map_or(true, |end| now <= end)
    }
}

/// A product given away by a Bundle Free promotion, priced from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FreeProduct {
    pub product_id: String,
    pub price_cents: i64,
}

/// A promotion as loaded for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub window: ValidityWindow,
    pub rule: PromotionRule,
    pub trigger_product_ids: Vec<String>,
    /// Only meaningful for Bundle Free.
    pub free_products: Vec<FreeProduct>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Active flag set and `now` inside the validity window.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.window.contains(now)
    }

    fn triggers(&self, product_id: &str) -> bool {
        self.trigger_product_ids.iter().any(|id| id == product_id)
    }
}

/// Input for registering a promotion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPromotion {
    pub name: String,
    pub description: Option<String>,
    pub kind: PromotionKind,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub window: ValidityWindow,
    pub buy_qty: Option<i64>,
    pub free_qty: Option<i64>,
    /// Percentage in basis points (1000 = 10%).
    pub discount_bps: Option<u32>,
    pub trigger_product_ids: Vec<String>,
    #[serde(default)]
    pub free_product_ids: Vec<String>,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Cart & Result
// =============================================================================

/// One cart line as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price_cents: i64) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
            unit_price_cents,
        }
    }

    fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A promotion that produced a positive discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedPromotion {
    pub promotion_id: String,
    pub name: String,
    pub kind: PromotionKind,
    pub discount: Money,
    pub description: String,
}

/// Outcome of evaluating a cart.
///
/// `final_total == original_total - total_discount`. Discounts are summed
/// without a floor, so stacked promotions can exceed the cart total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationResult {
    pub original_total: Money,
    pub total_discount: Money,
    pub final_total: Money,
    pub applied_promotions: Vec<AppliedPromotion>,
}

// =============================================================================
// Engine
// =============================================================================

/// Evaluates every promotion active at `now` against the full cart.
///
/// Inactive and out-of-window promotions are skipped, so callers may pass an
/// unfiltered list. Applied promotions keep the order of `promotions`.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use minimart_core::promotion::{evaluate, CartLine, Promotion, PromotionRule, ValidityWindow};
///
/// let promo = Promotion {
///     id: "promo-1".into(),
///     name: "Buy 2 Get 1".into(),
///     description: None,
///     is_active: true,
///     window: ValidityWindow::default(),
///     rule: PromotionRule::BuyXGetY { buy_qty: 2, free_qty: 1 },
///     trigger_product_ids: vec!["water".into()],
///     free_products: vec![],
///     created_at: Utc::now(),
/// };
///
/// let result = evaluate(&[CartLine::new("water", 7, 1_000)], &[promo], Utc::now());
/// assert_eq!(result.total_discount.cents(), 2_000);
/// ```
pub fn evaluate(cart: &[CartLine], promotions: &[Promotion], now: DateTime<Utc>) -> CalculationResult {
    let original_total: Money = cart.iter().map(CartLine::line_total).sum();

    let applied_promotions: Vec<AppliedPromotion> = promotions
        .iter()
        .filter(|promo| promo.is_active_at(now))
        .filter_map(|promo| {
            let (discount, description) = rule_discount(promo, cart);
            discount.is_positive().then(|| AppliedPromotion {
                promotion_id: promo.id.clone(),
                name: promo.name.clone(),
                kind: promo.rule.kind(),
                discount,
                description,
            })
        })
        .collect();

    let total_discount: Money = applied_promotions.iter().map(|applied| applied.discount).sum();

    CalculationResult {
        original_total,
        total_discount,
        final_total: original_total - total_discount,
        applied_promotions,
    }
}

/// Discount and description for one promotion against the cart.
fn rule_discount(promo: &Promotion, cart: &[CartLine]) -> (Money, String) {
    let trigger_lines = || cart.iter().filter(|line| promo.triggers(&line.product_id));

    match promo.rule {
        PromotionRule::BuyXGetY { buy_qty, free_qty } => {
            let group_size = buy_qty.saturating_add(free_qty);
            let mut free_units: i64 = 0;
            let mut discount = Money::zero();
            for line in trigger_lines() {
                let units = (line.quantity / group_size).saturating_mul(free_qty);
                free_units = free_units.saturating_add(units);
                discount += line.unit_price() * units;
            }
            (discount, format!("{free_units} free item(s)"))
        }

        PromotionRule::QuantityDiscount { min_qty, rate } => {
            let mut qualified = 0;
            let mut discount = Money::zero();
            for line in trigger_lines().filter(|line| line.quantity >= min_qty) {
                discount += line.line_total().percentage(rate);
                qualified += 1;
            }
            (discount, format!("{rate} off {qualified} line(s)"))
        }

        PromotionRule::BundleFree { free_qty } => bundle_free(promo, cart, free_qty),

        PromotionRule::NextItemDiscount { buy_qty, rate } => {
            let group_size = buy_qty.saturating_add(1);
            let mut discounted: i64 = 0;
            let mut discount = Money::zero();
            for line in trigger_lines() {
                let count = line.quantity / group_size;
                discounted = discounted.saturating_add(count);
                discount += (line.unit_price() * count).percentage(rate);
            }
            (discount, format!("{rate} off {discounted} item(s)"))
        }
    }
}

fn bundle_free(promo: &Promotion, cart: &[CartLine], free_qty: i64) -> (Money, String) {
    if promo.trigger_product_ids.is_empty() || promo.free_products.is_empty() {
        return (Money::zero(), String::new());
    }

    let present = |id: &String| {
        cart.iter()
            .any(|line| &line.product_id == id && line.quantity >= 1)
    };
    if !promo.trigger_product_ids.iter().all(present) {
        return (Money::zero(), String::new());
    }

    let bundle_count = cart
        .iter()
        .filter(|line| promo.triggers(&line.product_id) && line.quantity >= 1)
        .map(|line| line.quantity)
        .min()
        .unwrap_or(0);

    let discount: Money = promo
        .free_products
        .iter()
        .map(|free| Money::from_cents(free.price_cents) * bundle_count.saturating_mul(free_qty))
        .sum();

    (discount, format!("{} free item(s)", bundle_count.saturating_mul(free_qty)))
}

// =============================================================================
// Unit Tests
// =============================================================================
