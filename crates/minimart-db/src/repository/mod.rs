//! # Repository Module
//!
//! Row-level database access for the store backend.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Inside a unit of work (writes, and reads that must see them)          │
//! │       │                                                                 │
//! │       │  product::find_by_id(unit.conn(), id)                          │
//! │       │  ledger::apply_delta(unit.conn(), id, -3, now)                 │
//! │       ▼                                                                 │
//! │  free functions taking &mut SqliteConnection                           │
//! │                                                                         │
//! │  Outside a unit (reporting, lookups)                                   │
//! │       │                                                                 │
//! │       │  db.ledger().for_product(id, 50)                               │
//! │       ▼                                                                 │
//! │  XRepository { pool } methods                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog rows, low stock, overview
//! - [`LedgerRepository`](ledger::LedgerRepository) - Stock ledger entries (read-only)
//! - [`SaleRepository`](sale::SaleRepository) - Sales, items, payments
//! - [`StockCountRepository`](stock_count::StockCountRepository) - Physical counts
//! - [`MemberRepository`](member::MemberRepository) - Members and point history
//! - [`PromotionRepository`](promotion::PromotionRepository) - Promotions with product roles

pub mod ledger;
pub mod member;
pub mod product;
pub mod promotion;
pub mod sale;
pub mod stock_count;
