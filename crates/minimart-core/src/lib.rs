//! # minimart-core: Pure Business Logic for the Minimart Store Backend
//!
//! This crate holds every rule of the store backend that can be expressed
//! without touching storage: money arithmetic, domain types, validation, the
//! promotion rule engine and loyalty point accrual.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Minimart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               minimart-ledger (processors, facade)              │   │
//! │  │   create_sale, reverse_sale, receive_stock, evaluate_cart ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ minimart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ promotion │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  engine   │  │   rules   │  │   │
//! │  │   │  Sale     │  │DiscountRate│ │  loyalty  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  minimart-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, unit of work               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LedgerEntry, Sale, Member, Promotion, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`pricing`] - Sale totals, change and loyalty points
//! - [`promotion`] - Stateless promotion rule engine
//!
//! ## Example Usage
//!
//! ```rust
//! use minimart_core::money::{DiscountRate, Money};
//!
//! let line_total = Money::from_major(100);
//! let discount = line_total.percentage(DiscountRate::from_percent(10));
//! assert_eq!(discount, Money::from_major(10));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod promotion;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency cents that earn one loyalty point (25 currency units).
///
/// Points are always floored: a 49.99 sale earns one point.
pub const DEFAULT_POINT_VALUE_CENTS: i64 = 2_500;

/// Maximum number of lines allowed in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity on a single line or stock movement.
///
/// Guards against typing 10000 instead of 100 at the till or the back door.
pub const MAX_ITEM_QUANTITY: i64 = 99_999;

/// Maximum unit price in cents (10,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Reason recorded on ledger entries written by a sale.
pub const SALE_REASON: &str = "POS Sale";

/// Default reason recorded when a sale is voided.
pub const VOID_REASON: &str = "Transaction Voided";

/// Default reason recorded when a sale is refunded.
pub const REFUND_REASON: &str = "Customer Refund";

/// Reason recorded on ledger entries written by a stock count.
pub const STOCK_COUNT_REASON: &str = "Stock count adjustment";
