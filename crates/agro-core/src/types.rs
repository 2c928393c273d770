//! # Domain Types
//!
//! Core ledger records shared by the pure logic and the database layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Lot        │   │    Movement     │   │ TransferAudit   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  lot_id         │   │  transfer_id    │       │
//! │  │  product_id     │   │  entrada/salida │◄──│  outbound id    │       │
//! │  │  branch_id      │   │  quantity > 0   │◄──│  inbound id     │       │
//! │  │  lot_code       │   │  reference      │   │  source/dest    │       │
//! │  │  quantity ≥ 0   │   │  origin_module  │   │  lot ids        │       │
//! │  │  received_at    │   │  (immutable)    │   │  (immutable)    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │      Sale       │──►│    SaleItem     │   SaleAggregate =           │
//! │  │  folio, totals  │   │  quantity       │     header + items          │
//! │  │  status         │   │  base_quantity  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record has a UUID v4 `id`. Business identifiers (`lot_code`, `folio`,
//! `reference`) are human-readable and never used for relations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Costing Method
// =============================================================================

/// How a lot values its stock. Inherited by lots created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CostingMethod {
    /// Receipts into an existing lot re-average its unit cost.
    #[default]
    Average,
    /// Receipts never change the lot's unit cost.
    Fifo,
}

impl CostingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostingMethod::Average => "average",
            CostingMethod::Fifo => "fifo",
        }
    }
}

// =============================================================================
// Movement Type
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock entering a lot (receipt, inbound transfer, positive adjustment).
    Entrada,
    /// Stock leaving a lot (sale, outbound transfer, negative adjustment).
    Salida,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "entrada",
            MovementType::Salida => "salida",
        }
    }
}

// =============================================================================
// Lot
// =============================================================================

/// Stock of one product at one branch under one lot code.
///
/// ## Invariants
/// - `quantity` is never negative
/// - `(product_id, branch_id, lot_code)` is unique, NULL codes included
/// - lots are never deleted; an exhausted lot stays at zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub product_id: String,
    pub branch_id: String,
    /// On-hand quantity in the product's base unit.
    pub quantity: Quantity,
    /// Supplier or internal lot code. `None` is the branch's uncoded lot.
    pub lot_code: Option<String>,
    /// Cost per base unit, when known.
    pub unit_cost: Option<Money>,
    pub costing_method: CostingMethod,
    /// FIFO key: older lots are consumed first.
    pub received_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    /// Free-form warehouse location (shelf, bay).
    pub location: Option<String>,
}

impl Lot {
    /// Whether the lot can satisfy any part of a deduction.
    #[inline]
    pub fn has_stock(&self) -> bool {
        self.quantity.is_positive()
    }

    /// Sort key for FIFO consumption: receipt time, then id.
    #[inline]
    pub fn fifo_key(&self) -> (DateTime<Utc>, &str) {
        (self.received_at, self.id.as_str())
    }
}

/// Fields needed to insert a lot. Built by the mapping functions in
/// [`crate::mapping`], never by hand in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLot {
    pub product_id: String,
    pub branch_id: String,
    pub lot_code: Option<String>,
    pub unit_cost: Option<Money>,
    pub costing_method: CostingMethod,
    pub received_at: DateTime<Utc>,
    pub location: Option<String>,
}

// =============================================================================
// Movement
// =============================================================================

/// One immutable entry of the movement log.
///
/// Every lot quantity change produces exactly one movement with the same
/// quantity and direction. Movements are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub product_id: String,
    pub branch_id: String,
    /// The lot whose quantity changed.
    pub lot_id: String,
    pub movement_type: MovementType,
    /// Always strictly positive; direction comes from `movement_type`.
    pub quantity: Quantity,
    pub unit_cost: Option<Money>,
    /// Business reference (`SALE:...`, `TRF:...`, `ADJ:...`).
    pub reference: String,
    /// Calling subsystem ("POS", "ERP", "TRANSFER", ...).
    pub origin_module: String,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Quantity with sign: positive for entrada, negative for salida.
    pub fn signed_quantity(&self) -> Quantity {
        match self.movement_type {
            MovementType::Entrada => self.quantity,
            MovementType::Salida => -self.quantity,
        }
    }

    /// Value of the movement at its unit cost, if the cost is known.
    pub fn total_cost(&self) -> Option<Money> {
        self.unit_cost.map(|cost| cost.extend(self.quantity))
    }
}

/// Fields needed to append a movement. The log assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovement {
    pub product_id: String,
    pub branch_id: String,
    pub lot_id: String,
    pub movement_type: MovementType,
    pub quantity: Quantity,
    pub unit_cost: Option<Money>,
    pub reference: String,
    pub origin_module: String,
}

// =============================================================================
// Transfer Audit
// =============================================================================

/// Immutable record pairing the salida and entrada of one transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TransferAudit {
    pub transfer_id: String,
    pub product_id: String,
    pub source_branch_id: String,
    pub dest_branch_id: String,
    pub source_lot_id: String,
    pub dest_lot_id: String,
    pub outbound_movement_id: String,
    pub inbound_movement_id: String,
    pub quantity: Quantity,
    pub unit_cost: Option<Money>,
    pub lot_code: Option<String>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale handed to the engine.
///
/// Both statuses deduct stock; `Pending` marks credit sales awaiting payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    #[default]
    Completed,
}

// =============================================================================
// Sale
// =============================================================================

/// Sale header. Totals are supplied by the caller and stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Human-readable ticket number.
    pub folio: String,
    pub branch_id: String,
    pub status: SaleStatus,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub origin_module: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line item of a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// 1-based position in the ticket.
    pub line_no: i64,
    pub product_id: String,
    /// Quantity in the unit the customer bought (sacks, drums, pieces).
    pub quantity: Quantity,
    /// Quantity in the product's base unit, when it differs.
    pub base_quantity: Option<Quantity>,
    pub unit: String,
    pub unit_price: Money,
    pub line_total: Money,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// The quantity the ledger deducts for this line.
    pub fn deducted_quantity(&self) -> Quantity {
        self.base_quantity.unwrap_or(self.quantity)
    }
}

/// Header plus items, persisted atomically with the stock deductions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleAggregate {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Engine Results
// =============================================================================

/// One lot touched while fulfilling a sale line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotAllocation {
    pub lot_id: String,
    pub lot_code: Option<String>,
    pub quantity: Quantity,
    pub unit_cost: Option<Money>,
    pub movement_id: String,
    pub remaining_in_lot: Quantity,
}

/// Lots consumed by one sale line, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFulfillment {
    pub line_no: i64,
    pub product_id: String,
    pub requested: Quantity,
    pub allocations: Vec<LotAllocation>,
}

impl LineFulfillment {
    /// Sum of the quantities actually deducted.
    pub fn deducted(&self) -> Quantity {
        self.allocations.iter().map(|a| a.quantity).sum()
    }

    /// Cost of goods sold for the line, counting only lots with a known cost.
    pub fn cost_of_goods(&self) -> Money {
        self.allocations
            .iter()
            .filter_map(|a| a.unit_cost.map(|cost| cost.extend(a.quantity)))
            .fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Result of a committed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFulfillment {
    pub sale: SaleAggregate,
    pub lines: Vec<LineFulfillment>,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub transfer_id: String,
    pub reference: String,
    pub source_lot: Lot,
    pub dest_lot: Lot,
    pub dest_lot_created: bool,
    pub outbound_movement_id: String,
    pub inbound_movement_id: String,
    pub audit: TransferAudit,
}

/// Result of a committed receipt or adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub lot: Lot,
    pub movement: Movement,
    pub lot_created: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn movement(kind: MovementType, qty: i64, cost: Option<i64>) -> Movement {
        Movement {
            id: "m-1".to_string(),
            product_id: "UREA-25".to_string(),
            branch_id: "SUC-01".to_string(),
            lot_id: "lot-1".to_string(),
            movement_type: kind,
            quantity: Quantity::from_units(qty),
            unit_cost: cost.map(Money::from_cents),
            reference: "SALE:x".to_string(),
            origin_module: "POS".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_signed_quantity() {
        assert_eq!(
            movement(MovementType::Entrada, 5, None).signed_quantity(),
            Quantity::from_units(5)
        );
        assert_eq!(
            movement(MovementType::Salida, 5, None).signed_quantity(),
            Quantity::from_units(-5)
        );
    }

    #[test]
    fn test_total_cost() {
        let m = movement(MovementType::Salida, 3, Some(45000));
        assert_eq!(m.total_cost(), Some(Money::from_cents(135000)));
        assert_eq!(movement(MovementType::Salida, 3, None).total_cost(), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&MovementType::Salida).unwrap();
        assert_eq!(json, "\"salida\"");
        let method: CostingMethod = serde_json::from_str("\"fifo\"").unwrap();
        assert_eq!(method, CostingMethod::Fifo);
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
    }

    #[test]
    fn test_line_cost_of_goods_skips_unknown_costs() {
        let line = LineFulfillment {
            line_no: 1,
            product_id: "UREA-25".to_string(),
            requested: Quantity::from_units(12),
            allocations: vec![
                LotAllocation {
                    lot_id: "a".to_string(),
                    lot_code: None,
                    quantity: Quantity::from_units(10),
                    unit_cost: Some(Money::from_cents(100)),
                    movement_id: "m-a".to_string(),
                    remaining_in_lot: Quantity::ZERO,
                },
                LotAllocation {
                    lot_id: "b".to_string(),
                    lot_code: None,
                    quantity: Quantity::from_units(2),
                    unit_cost: None,
                    movement_id: "m-b".to_string(),
                    remaining_in_lot: Quantity::from_units(3),
                },
            ],
        };
        assert_eq!(line.deducted(), Quantity::from_units(12));
        assert_eq!(line.cost_of_goods(), Money::from_cents(1000));
    }
}
