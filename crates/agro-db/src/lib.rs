//! # agro-db: Storage and Ledger Engine for Agro Ledger
//!
//! SQLite storage for lots, the movement log, transfer audits and sales,
//! plus the [`Ledger`] that wraps each stock-changing operation in one
//! transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Agro Ledger Data Flow                            │
//! │                                                                         │
//! │  POS ticket / ERP transfer / purchase receipt                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     agro-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Ledger     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (ledger/)    │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ fulfill_sale  │───►│ lot           │    │ 001_schema   │  │   │
//! │  │   │ transfer      │    │ movement      │    │ 002_append_  │  │   │
//! │  │   │ receive/adjust│    │ transfer, sale│    │     only     │  │   │
//! │  │   │ retry+timeout │    │               │    │              │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           └──────────┬─────────┘                               │   │
//! │  │                ┌─────▼──────┐   ┌──────────┐                   │   │
//! │  │                │  Database  │   │  config  │ ledger.toml + env │   │
//! │  │                │ (pool.rs)  │   └──────────┘                   │   │
//! │  │                └────────────┘                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `ledger.toml` loading and environment overrides
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Lot store, movement log, transfer audits, sales
//! - [`ledger`] - Transactional operations, retry, error taxonomy
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agro_db::{Database, Ledger, LedgerConfig};
//!
//! let config = LedgerConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let ledger = Ledger::new(db, &config);
//!
//! let sale = ledger.fulfill_sale(request).await?;
//! let report = ledger.reconcile_all(None, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, LedgerConfig, LedgerSettings, RetrySettings};
pub use error::{DbError, DbResult};
pub use ledger::error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::retry::RetryPolicy;
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::lot::LotRepository;
pub use repository::movement::MovementRepository;
pub use repository::sale::SaleRepository;
pub use repository::transfer::TransferRepository;
