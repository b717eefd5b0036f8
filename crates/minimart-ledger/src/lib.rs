//! # minimart-ledger: Inventory / Transaction Ledger
//!
//! Every change to stock, sales and loyalty points in the store backend goes
//! through this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Minimart Data Flow                               │
//! │                                                                         │
//! │  transport (HTTP, desktop command, seed binary)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 minimart-ledger (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │  Ledger facade                                                  │   │
//! │  │     │                                                           │   │
//! │  │     ├── sale / reversal / adjustment / members  (units of work)│   │
//! │  │     │        │                                                  │   │
//! │  │     │        └──► stock_ledger::apply_movement                  │   │
//! │  │     │                                                           │   │
//! │  │     └── promotions / reporting / catalog reads                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                        │                                        │
//! │       ▼                        ▼                                        │
//! │  minimart-core (pure)     minimart-db (SQLite)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use minimart_core::{LineRequest, NewSale};
//! use minimart_ledger::{Ledger, LedgerConfig};
//!
//! let ledger = Ledger::open(LedgerConfig::from_env()?).await?;
//!
//! let detail = ledger
//!     .create_sale(NewSale::cash(vec![LineRequest::new(&product_id, 2)], 20_000))
//!     .await?;
//! println!("{} change {}", detail.sale.sale_number, detail.payment.change_cents);
//! ```

pub mod adjustment;
pub mod catalog;
pub mod config;
pub mod error;
pub mod members;
pub mod promotions;
pub mod reporting;
pub mod reversal;
pub mod sale;
pub mod service;
pub mod stock_ledger;
pub mod telemetry;

pub use catalog::Removal;
pub use config::{ConfigError, LedgerConfig};
pub use error::{ErrorKind, ErrorReport, LedgerError, LedgerResult};
pub use service::Ledger;
