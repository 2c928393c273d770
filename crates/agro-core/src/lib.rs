//! # agro-core: Pure Ledger Logic for Agro Ledger
//!
//! This crate holds the inventory-ledger rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Agro Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Intake (POS tickets, ERP transfers, purchases)           │   │
//! │  │    SaleRequest ──► TransferRequest ──► ReceiveStockRequest      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ agro-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ quantity  │  │   fifo    │  │ validation│  │   │
//! │  │   │    Lot    │  │   money   │  │ plan_fifo │  │  mapping  │  │   │
//! │  │   │ Movement  │  │           │  │ residual  │  │ reconcile │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    agro-db (Database Layer)                     │   │
//! │  │     lot store, movement log, transactions, retry, timeouts      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ledger records (Lot, Movement, TransferAudit, Sale)
//! - [`request`] - Typed intake requests and query filters
//! - [`quantity`] - Exact decimal quantities in base units
//! - [`money`] - Integer-cent costs and prices
//! - [`fifo`] - FIFO allocation planner
//! - [`reconcile`] - Lot vs. movement-log arithmetic
//! - [`mapping`] - Request → record field mapping, one default per field
//! - [`validation`] - Request validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use agro_core::{Money, Quantity};
//!
//! // 12.5 kg of urea at $18.50 per kg
//! let qty: Quantity = "12.5".parse().unwrap();
//! let cost = Money::from_cents(1850).extend(qty);
//! assert_eq!(cost.cents(), 23125);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fifo;
pub mod mapping;
pub mod money;
pub mod quantity;
pub mod reconcile;
pub mod request;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use reconcile::LotReconciliation;
pub use request::*;
pub use types::*;

use rust_decimal::Decimal;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Origin module of point-of-sale tickets.
pub const ORIGIN_POS: &str = "POS";

/// Origin module of back-office operations.
pub const ORIGIN_ERP: &str = "ERP";

/// Origin module stamped on both movements of a transfer.
pub const ORIGIN_TRANSFER: &str = "TRANSFER";

/// Selling unit recorded when a sale line does not name one.
pub const DEFAULT_UNIT: &str = "unit";

/// Largest quantity, in base units, that a request may carry or a lot may
/// hold.
pub const MAX_QUANTITY: Quantity = Quantity::new(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

/// Maximum lines in a single sale.
pub const MAX_SALE_ITEMS: usize = 200;

/// Maximum length of ids, codes and folios.
pub const MAX_ID_LENGTH: usize = 64;

/// Maximum length of references and reasons.
pub const MAX_REFERENCE_LENGTH: usize = 255;

/// Residual a FIFO walk may leave unplaced (0.001).
///
/// Three decimal places of the base unit: the rounding allowance of
/// converting bulk selling units (sacks, drums) into base units.
pub fn default_residual_tolerance() -> Quantity {
    Quantity::from_parts(1, 3)
}
