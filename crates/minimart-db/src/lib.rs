//! # minimart-db: Database Layer for the Minimart Store Backend
//!
//! SQLite storage for the ledger, with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Minimart Data Flow                               │
//! │                                                                         │
//! │  minimart-ledger processor (create_sale, issue_stock, ...)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   minimart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │ SqlitePool    │◄───│ product       │    │ 001_initial  │  │   │
//! │  │   │ write gate    │    │ ledger, sale  │    │ _schema.sql  │  │   │
//! │  │   └───────┬───────┘    │ stock_count   │    └──────────────┘  │   │
//! │  │           │            │ member, promo │                      │   │
//! │  │   ┌───────▼───────┐    └───────────────┘                      │   │
//! │  │   │  UnitOfWork   │  with_atomic_unit: commit or roll back    │   │
//! │  │   │  (unit.rs)    │                                           │   │
//! │  │   └───────────────┘                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`unit`] - Unit of work and the `with_atomic_unit` primitive
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minimart_db::{with_atomic_unit, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("store.db")).await?;
//!
//! let low = db.products().low_stock().await?;
//!
//! with_atomic_unit(&db, |unit| Box::pin(async move {
//!     // every query here uses unit.conn()
//!     Ok::<_, DbError>(())
//! })).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit::{with_atomic_unit, UnitFuture, UnitOfWork};

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::member::MemberRepository;
pub use repository::product::ProductRepository;
pub use repository::promotion::PromotionRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock_count::StockCountRepository;
