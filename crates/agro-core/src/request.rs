//! # Intake Requests
//!
//! Typed requests accepted by the ledger. Each one is validated by
//! [`crate::validation`] before any transaction is opened.
//!
//! All requests deserialize from camelCase JSON so an intake layer (HTTP,
//! queue consumer, CLI) can hand them over unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{CostingMethod, SaleStatus};

// =============================================================================
// Sale
// =============================================================================

/// A sale/ticket to persist and fulfill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub folio: String,
    pub branch_id: String,
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub total: Money,
    /// Defaults to the configured origin module when absent.
    #[serde(default)]
    pub origin_module: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<SaleLineRequest>,
}

/// One line of a [`SaleRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: String,
    /// Quantity in the selling unit.
    pub quantity: Quantity,
    /// Quantity in base units when the selling unit is a bulk unit.
    #[serde(default)]
    pub base_quantity: Option<Quantity>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub unit_price: Money,
}

// =============================================================================
// Transfer
// =============================================================================

/// Move stock of one product between two branches.
///
/// The source lot is `source_lot_id` when given, otherwise the exact
/// `(product_id, source_branch_id, lot_code)` lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub product_id: String,
    pub source_branch_id: String,
    pub dest_branch_id: String,
    pub quantity: Quantity,
    #[serde(default)]
    pub source_lot_id: Option<String>,
    #[serde(default)]
    pub lot_code: Option<String>,
    /// Lot code at the destination. Defaults to the source lot's code.
    #[serde(default)]
    pub dest_lot_code: Option<String>,
    /// Unit cost for a newly created destination lot.
    #[serde(default)]
    pub unit_cost: Option<Money>,
    /// Costing method for a newly created destination lot.
    #[serde(default)]
    pub costing_method: Option<CostingMethod>,
    /// Free text appended to the `TRF:{id}` reference.
    #[serde(default)]
    pub reference: Option<String>,
}

// =============================================================================
// Stock Intake
// =============================================================================

/// Receive purchased stock into a lot, creating the lot on first receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockRequest {
    pub product_id: String,
    pub branch_id: String,
    pub quantity: Quantity,
    #[serde(default)]
    pub lot_code: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<Money>,
    #[serde(default)]
    pub costing_method: Option<CostingMethod>,
    /// FIFO key for a new lot. Defaults to the time of receipt.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    /// Purchase order, invoice or delivery note.
    pub reference: String,
    #[serde(default)]
    pub origin_module: Option<String>,
}

/// Correct a lot's quantity by a signed, non-zero delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub lot_id: String,
    pub delta: Quantity,
    pub reason: String,
    #[serde(default)]
    pub origin_module: Option<String>,
}

// =============================================================================
// Queries
// =============================================================================

/// Filter for the movement log. Every field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    pub product_id: Option<String>,
    pub branch_id: Option<String>,
    pub lot_id: Option<String>,
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub to: Option<DateTime<Utc>>,
}

/// Filter for transfer audits. `branch_id` matches either side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFilter {
    pub product_id: Option<String>,
    pub branch_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 50;

    pub fn new(limit: u32, offset: u32) -> Self {
        Page { limit, offset }
    }

    pub fn first(limit: u32) -> Self {
        Page { limit, offset: 0 }
    }

    /// Clamps the limit to `1..=max`.
    pub fn clamped(&self, max: u32) -> Self {
        Page {
            limit: self.limit.clamp(1, max.max(1)),
            offset: self.offset,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::first(Page::DEFAULT_LIMIT)
    }
}
