//! # Domain Types
//!
//! Core domain types used throughout the Minimart backend.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   LedgerEntry   │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  stock (≥ 0)    │◄──│  kind           │   │  sale_number    │       │
//! │  │  min_stock      │   │  quantity (±)   │   │  status         │       │
//! │  │  price_cents    │   │  previous/current│  │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockCount    │   │     Member      │   │PointTransaction │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  counted_qty    │   │  total_points   │◄──│  kind, points   │       │
//! │  │  is_adjusted    │   │  total_spent    │   │  before/after   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Promotion types live in [`crate::promotion`] next to the engine that
//! evaluates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product as seen by the ledger.
///
/// The Catalog owns identity, price and the active flag; the Stock Ledger
/// exclusively owns `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, ...), unique when present.
    pub barcode: Option<String>,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Retail price in cents.
    pub price_cents: i64,

    /// Cost in cents (for stock valuation).
    pub cost_cents: Option<i64>,

    /// Units on hand. Never negative after a committed operation.
    pub stock: i64,

    /// Threshold at or below which the product is reported as low stock.
    pub min_stock: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the retail price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Cost used for valuation, falling back to the retail price.
    #[inline]
    pub fn valuation_cost(&self) -> Money {
        Money::from_cents(self.cost_cents.unwrap_or(self.price_cents))
    }

    /// Whether `quantity` units can leave the shelf right now.
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// In stock, but at or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= self.min_stock
    }
}

/// Input for registering a product with the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub barcode: Option<String>,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    /// Opening stock, recorded as the product's first RECEIVING entry.
    pub stock: i64,
    /// Reorder threshold; the configured default applies when absent.
    pub min_stock: Option<i64>,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Classification of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Goods received from a supplier.
    Receiving,
    /// Goods leaving the shelf outside a sale (damage, expiry, transfer).
    Issuing,
    /// Goods sold at the till.
    Sale,
    /// Goods returned by a void or refund.
    Refund,
    /// Correction from a physical stock count.
    Adjustment,
}

impl MovementKind {
    /// Stable upper-case name, as stored.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Receiving => "RECEIVING",
            MovementKind::Issuing => "ISSUING",
            MovementKind::Sale => "SALE",
            MovementKind::Refund => "REFUND",
            MovementKind::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a movement moves stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// A stock change expressed as kind, direction and magnitude.
///
/// Receiving and refunds are always inbound; issuing and sales are always
/// outbound; only adjustments pick a direction from the counted variance.
/// The signed form exists only at the storage edge ([`StockMovement::delta`]).
///
/// ```rust
/// use minimart_core::{Direction, MovementKind, StockMovement};
///
/// let sale = StockMovement::sale(3);
/// assert_eq!(sale.delta(), -3);
///
/// let count = StockMovement::adjustment(-2);
/// assert_eq!(count.direction, Direction::Outbound);
/// assert_eq!(count.kind, MovementKind::Adjustment);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub kind: MovementKind,
    pub direction: Direction,
    /// Units moved, never negative.
    pub magnitude: i64,
}

impl StockMovement {
    /// Goods arriving from a supplier.
    pub const fn receiving(quantity: i64) -> Self {
        Self::inbound(MovementKind::Receiving, quantity)
    }

    /// Goods written off or transferred out.
    pub const fn issuing(quantity: i64) -> Self {
        Self::outbound(MovementKind::Issuing, quantity)
    }

    /// Goods sold.
    pub const fn sale(quantity: i64) -> Self {
        Self::outbound(MovementKind::Sale, quantity)
    }

    /// Goods restored by a void or refund.
    pub const fn refund(quantity: i64) -> Self {
        Self::inbound(MovementKind::Refund, quantity)
    }

    /// Correction toward a counted quantity; the sign picks the direction.
    pub const fn adjustment(delta: i64) -> Self {
        if delta < 0 {
            Self::outbound(MovementKind::Adjustment, -delta)
        } else {
            Self::inbound(MovementKind::Adjustment, delta)
        }
    }

    /// Rebuilds a movement from a stored signed quantity.
    pub const fn from_delta(kind: MovementKind, delta: i64) -> Self {
        if delta < 0 {
            Self::outbound(kind, -delta)
        } else {
            Self::inbound(kind, delta)
        }
    }

    const fn inbound(kind: MovementKind, magnitude: i64) -> Self {
        StockMovement {
            kind,
            direction: Direction::Inbound,
            magnitude,
        }
    }

    const fn outbound(kind: MovementKind, magnitude: i64) -> Self {
        StockMovement {
            kind,
            direction: Direction::Outbound,
            magnitude,
        }
    }

    /// Signed change applied to stock.
    pub const fn delta(&self) -> i64 {
        match self.direction {
            Direction::Inbound => self.magnitude,
            Direction::Outbound => -self.magnitude,
        }
    }
}

/// Audit context attached to a movement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementContext {
    /// Sale number, PO number, `SC-{id}`, ...
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    /// Who performed the movement.
    pub actor: Option<String>,
}

impl MovementContext {
    pub fn with_reference(reference: impl Into<String>) -> Self {
        MovementContext {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// Immutable record of one stock change.
///
/// ## Invariants
/// - `current_stock == previous_stock + quantity`
/// - Ordered by `id` (commit sequence), each entry's `current_stock` is the
///   next entry's `previous_stock` for the same product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    /// Commit sequence, assigned by the store.
    pub id: i64,
    pub product_id: String,
    pub kind: MovementKind,
    /// Signed delta (negative for outflow).
    pub quantity: i64,
    pub previous_stock: i64,
    pub current_stock: i64,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The movement this entry records.
    pub fn movement(&self) -> StockMovement {
        StockMovement::from_delta(self.kind, self.quantity)
    }

    /// Snapshot arithmetic holds for this entry.
    pub fn is_balanced(&self) -> bool {
        self.current_stock == self.previous_stock + self.quantity
    }

    /// `next` picks up exactly where this entry left off.
    pub fn chains_to(&self, next: &LedgerEntry) -> bool {
        self.product_id == next.product_id && self.current_stock == next.previous_stock
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// ```text
/// COMPLETED ──void──► VOIDED    (terminal)
///     │
///     └──refund──► REFUNDED     (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Sale has been paid and stock deducted.
    Completed,
    /// Sale was cancelled; stock restored.
    Voided,
    /// Goods returned by the customer; stock restored.
    Refunded,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "COMPLETED",
            SaleStatus::Voided => "VOIDED",
            SaleStatus::Refunded => "REFUNDED",
        }
    }

    /// Voided and refunded sales never change again.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, SaleStatus::Completed)
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a completed sale is reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversalMode {
    Void,
    Refund,
}

impl ReversalMode {
    /// Terminal status the sale moves to.
    pub const fn target_status(&self) -> SaleStatus {
        match self {
            ReversalMode::Void => SaleStatus::Voided,
            ReversalMode::Refund => SaleStatus::Refunded,
        }
    }

    /// Reason written on the restoring ledger entries when none is given.
    pub const fn default_reason(&self) -> &'static str {
        match self {
            ReversalMode::Void => crate::VOID_REASON,
            ReversalMode::Refund => crate::REFUND_REASON,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// QR code / bank transfer.
    Qr,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction header.
///
/// ## Invariants
/// - `total_cents == subtotal_cents - discount_cents`
/// - The matching [`Payment`] has `amount >= total` and
///   `change == amount - total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Business id (`TXN-YYYYMMDD-XXXXXXXX`), used as ledger reference.
    pub sale_number: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub member_id: Option<String>,
    pub points_earned: i64,
    pub notes: Option<String>,
    pub cashier: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Barcode at time of sale (frozen).
    pub barcode_snapshot: Option<String>,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// The single payment recorded against a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    /// Amount tendered in cents.
    pub amount_cents: i64,
    /// Change returned to the customer.
    pub change_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale with its persisted items and payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payment: Payment,
}

/// One requested line of a sale or receiving batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl LineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineRequest {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Payment tendered with a sale request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

/// Everything the sale processor needs to ring up a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub items: Vec<LineRequest>,
    #[serde(default)]
    pub discount_cents: i64,
    pub payment: PaymentRequest,
    pub member_id: Option<String>,
    pub notes: Option<String>,
    /// Recorded as the actor on the sale's ledger entries.
    pub cashier: Option<String>,
}

impl NewSale {
    /// A cash sale without discount or member.
    pub fn cash(items: Vec<LineRequest>, amount_cents: i64) -> Self {
        NewSale {
            items,
            discount_cents: 0,
            payment: PaymentRequest {
                method: PaymentMethod::Cash,
                amount_cents,
            },
            member_id: None,
            notes: None,
            cashier: None,
        }
    }
}

// =============================================================================
// Stock Count
// =============================================================================

/// A physical count of a product compared against system stock.
///
/// `variance` is informational: applying the count moves stock to
/// `counted_quantity` from whatever the live stock is at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockCount {
    pub id: String,
    pub product_id: String,
    /// System stock when the count was recorded.
    pub system_quantity: i64,
    pub counted_quantity: i64,
    /// counted - system, at count time.
    pub variance: i64,
    /// False at creation; permanently true once applied.
    pub is_adjusted: bool,
    pub notes: Option<String>,
    pub counted_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub adjusted_at: Option<DateTime<Utc>>,
}

impl StockCount {
    /// Ledger reference written when the count is applied.
    pub fn reference(&self) -> String {
        format!("SC-{}", self.id)
    }
}

// =============================================================================
// Members & Points
// =============================================================================

/// A loyalty account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Member {
    pub id: String,
    /// Unique phone number, the lookup key at the till.
    pub phone: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Never negative.
    pub total_points: i64,
    pub total_spent_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a member.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMember {
    pub phone: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointTransactionType {
    /// Accrued from a sale.
    Earn,
    /// Manual credit.
    Bonus,
    /// Manual debit.
    Adjustment,
}

/// Ledger-style record of one loyalty point change.
///
/// Same snapshot rule as [`LedgerEntry`]:
/// `balance_after == balance_before + points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PointTransaction {
    pub id: String,
    pub member_id: String,
    /// Sale that earned the points, for `Earn` entries.
    pub sale_id: Option<String>,
    pub kind: PointTransactionType,
    pub points: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reporting
// =============================================================================

/// Aggregate stock position across active products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockOverview {
    pub active_products: i64,
    /// `0 < stock <= min_stock`
    pub low_stock: i64,
    pub out_of_stock: i64,
    /// Σ stock × price
    pub retail_value_cents: i64,
    /// Σ stock × cost (price when cost is unknown)
    pub cost_value_cents: i64,
}

/// Filter for browsing ledger entries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerQuery {
    pub product_id: Option<String>,
    pub kind: Option<MovementKind>,
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
    /// Defaults to 100 when absent.
    pub limit: Option<i64>,
}

/// Where a product's ledger chain first stops adding up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainReport {
    /// Every entry balances and chains; stock matches the last snapshot.
    Consistent { entries: i64, stock: i64 },
    /// Entry `entry_id` does not start where the previous one ended, or
    /// does not balance.
    BrokenLink { entry_id: i64, expected_previous: i64, found_previous: i64 },
    /// The product row disagrees with the last entry's snapshot.
    StockMismatch { last_snapshot: i64, stock: i64 },
}

impl ChainReport {
    pub fn is_consistent(&self) -> bool {
        matches!(self, ChainReport::Consistent { .. })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, kind: MovementKind, quantity: i64, previous: i64) -> LedgerEntry {
        LedgerEntry {
            id,
            product_id: "p-1".to_string(),
            kind,
            quantity,
            previous_stock: previous,
            current_stock: previous + quantity,
            reference: None,
            reason: None,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_movement_directions() {
        assert_eq!(StockMovement::receiving(4).delta(), 4);
        assert_eq!(StockMovement::issuing(3).delta(), -3);
        assert_eq!(StockMovement::sale(2).delta(), -2);
        assert_eq!(StockMovement::refund(2).delta(), 2);
        assert_eq!(StockMovement::adjustment(-5).magnitude, 5);
        assert_eq!(StockMovement::adjustment(0).direction, Direction::Inbound);
    }

    #[test]
    fn test_entry_chain() {
        let first = entry(1, MovementKind::Receiving, 10, 0);
        let second = entry(2, MovementKind::Issuing, -3, 10);
        let broken = entry(3, MovementKind::Sale, -1, 9);

        assert!(first.is_balanced());
        assert!(first.chains_to(&second));
        assert!(!second.chains_to(&broken));
        assert_eq!(second.movement(), StockMovement::issuing(3));
    }

    #[test]
    fn test_sale_status_terminal() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        assert!(!SaleStatus::Completed.is_terminal());
        assert!(SaleStatus::Voided.is_terminal());
        assert!(SaleStatus::Refunded.is_terminal());
        assert_eq!(ReversalMode::Refund.target_status(), SaleStatus::Refunded);
        assert_eq!(ReversalMode::Void.default_reason(), "Transaction Voided");
    }

    #[test]
    fn test_low_stock() {
        let now = Utc::now();
        let mut product = Product {
            id: "p-1".to_string(),
            barcode: None,
            name: "Green Tea".to_string(),
            price_cents: 2000,
            cost_cents: None,
            stock: 3,
            min_stock: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_low_stock());
        assert_eq!(product.valuation_cost().cents(), 2000);

        product.stock = 0;
        assert!(!product.is_low_stock());
        assert!(!product.can_supply(1));
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&MovementKind::Receiving).unwrap(),
            "\"RECEIVING\""
        );
        assert_eq!(serde_json::to_string(&PaymentMethod::Qr).unwrap(), "\"qr\"");
    }
}
