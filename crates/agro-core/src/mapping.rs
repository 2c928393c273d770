//! # Field Mapping
//!
//! Every place where a record is built from a request, or from another
//! record, lives here. Each default is written down exactly once.
//!
//! ## Mapping Table
//! ```text
//! ┌──────────────────────┬──────────────────────────┬──────────────────────────────┐
//! │ Target field         │ Source                   │ Default                      │
//! ├──────────────────────┼──────────────────────────┼──────────────────────────────┤
//! │ NewLot (receipt)                                                               │
//! │   lot_code           │ req.lot_code             │ NULL (uncoded lot)           │
//! │   unit_cost          │ req.unit_cost            │ NULL                         │
//! │   costing_method     │ req.costing_method       │ average                      │
//! │   received_at        │ req.received_at          │ now                          │
//! │   location           │ req.location             │ NULL                         │
//! ├──────────────────────┼──────────────────────────┼──────────────────────────────┤
//! │ NewLot (transfer destination)                                                  │
//! │   lot_code           │ req.dest_lot_code        │ source.lot_code              │
//! │   unit_cost          │ req.unit_cost            │ source.unit_cost             │
//! │   costing_method     │ req.costing_method       │ source.costing_method        │
//! │   received_at        │ source.received_at       │ (stock keeps its FIFO age)   │
//! │   location           │ -                        │ NULL                         │
//! ├──────────────────────┼──────────────────────────┼──────────────────────────────┤
//! │ Sale                                                                           │
//! │   origin_module      │ req.origin_module        │ configured default ("POS")   │
//! │ SaleItem                                                                       │
//! │   unit               │ line.unit                │ "unit"                       │
//! │   line_total         │ unit_price × quantity    │ -                            │
//! │   deducted quantity  │ line.base_quantity       │ line.quantity                │
//! ├──────────────────────┼──────────────────────────┼──────────────────────────────┤
//! │ NewMovement                                                                    │
//! │   unit_cost (salida) │ lot.unit_cost            │ NULL                         │
//! │   unit_cost(entrada) │ explicit cost            │ lot.unit_cost                │
//! └──────────────────────┴──────────────────────────┴──────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::quantity::Quantity;
use crate::request::{ReceiveStockRequest, SaleLineRequest, SaleRequest, TransferRequest};
use crate::types::{
    CostingMethod, Lot, MovementType, NewLot, NewMovement, Sale, SaleItem,
};
use crate::DEFAULT_UNIT;

// =============================================================================
// Lots
// =============================================================================

impl NewLot {
    /// Lot created by the first receipt of a (product, branch, lot code).
    pub fn for_receipt(req: &ReceiveStockRequest, now: DateTime<Utc>) -> NewLot {
        NewLot {
            product_id: req.product_id.trim().to_string(),
            branch_id: req.branch_id.trim().to_string(),
            lot_code: normalize_code(req.lot_code.as_deref()),
            unit_cost: req.unit_cost,
            costing_method: req.costing_method.unwrap_or(CostingMethod::Average),
            received_at: req.received_at.unwrap_or(now),
            location: req.location.clone(),
        }
    }

    /// Lot created at the destination branch of a transfer.
    pub fn for_transfer_destination(source: &Lot, req: &TransferRequest) -> NewLot {
        NewLot {
            product_id: source.product_id.clone(),
            branch_id: req.dest_branch_id.trim().to_string(),
            lot_code: destination_lot_code(source, req),
            unit_cost: req.unit_cost.or(source.unit_cost),
            costing_method: req.costing_method.unwrap_or(source.costing_method),
            received_at: source.received_at,
            location: None,
        }
    }
}

/// Lot code used at the destination of a transfer.
pub fn destination_lot_code(source: &Lot, req: &TransferRequest) -> Option<String> {
    normalize_code(req.dest_lot_code.as_deref()).or_else(|| source.lot_code.clone())
}

/// Blank codes are the same lot as no code.
pub fn normalize_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Movements
// =============================================================================

impl NewMovement {
    /// Outbound movement. Carries the lot's own unit cost.
    pub fn salida(lot: &Lot, quantity: Quantity, reference: &str, origin_module: &str) -> Self {
        NewMovement {
            product_id: lot.product_id.clone(),
            branch_id: lot.branch_id.clone(),
            lot_id: lot.id.clone(),
            movement_type: MovementType::Salida,
            quantity,
            unit_cost: lot.unit_cost,
            reference: reference.to_string(),
            origin_module: origin_module.to_string(),
        }
    }

    /// Inbound movement at `unit_cost`, or the lot's cost when not given.
    pub fn entrada(
        lot: &Lot,
        quantity: Quantity,
        unit_cost: Option<Money>,
        reference: &str,
        origin_module: &str,
    ) -> Self {
        NewMovement {
            product_id: lot.product_id.clone(),
            branch_id: lot.branch_id.clone(),
            lot_id: lot.id.clone(),
            movement_type: MovementType::Entrada,
            quantity,
            unit_cost: unit_cost.or(lot.unit_cost),
            reference: reference.to_string(),
            origin_module: origin_module.to_string(),
        }
    }
}

/// `SALE:{id} {folio}`
pub fn sale_reference(sale: &Sale) -> String {
    format!("SALE:{} {}", sale.id, sale.folio)
}

/// `TRF:{transferId}` plus the caller's free text, if any.
pub fn transfer_reference(transfer_id: &str, free_text: Option<&str>) -> String {
    match free_text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => format!("TRF:{} {}", transfer_id, text),
        None => format!("TRF:{}", transfer_id),
    }
}

/// `ADJ:{reason}`
pub fn adjustment_reference(reason: &str) -> String {
    format!("ADJ:{}", reason.trim())
}

/// The caller's origin module, or the configured default.
pub fn origin_or(origin_module: Option<&str>, default: &str) -> String {
    origin_module
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .unwrap_or(default)
        .to_string()
}

// =============================================================================
// Sales
// =============================================================================

/// Sale header from a request.
pub fn sale_header(
    req: &SaleRequest,
    sale_id: String,
    default_origin: &str,
    now: DateTime<Utc>,
) -> Sale {
    Sale {
        id: sale_id,
        folio: req.folio.trim().to_string(),
        branch_id: req.branch_id.trim().to_string(),
        status: req.status,
        subtotal: req.subtotal,
        tax: req.tax,
        total: req.total,
        origin_module: origin_or(req.origin_module.as_deref(), default_origin),
        notes: req.notes.clone(),
        created_at: now,
    }
}

/// Sale item from a request line. `line_no` is 1-based.
pub fn sale_item(
    sale_id: &str,
    item_id: String,
    line_no: i64,
    line: &SaleLineRequest,
    now: DateTime<Utc>,
) -> SaleItem {
    SaleItem {
        id: item_id,
        sale_id: sale_id.to_string(),
        line_no,
        product_id: line.product_id.trim().to_string(),
        quantity: line.quantity,
        base_quantity: line.base_quantity,
        unit: line
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_UNIT)
            .to_string(),
        unit_price: line.unit_price,
        line_total: line.unit_price.extend(line.quantity),
        created_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn source_lot() -> Lot {
        Lot {
            id: "lot-x".to_string(),
            product_id: "UREA-25".to_string(),
            branch_id: "SUC-NORTE".to_string(),
            quantity: Quantity::from_units(10),
            lot_code: Some("L-2026-07".to_string()),
            unit_cost: Some(Money::from_cents(42000)),
            costing_method: CostingMethod::Fifo,
            received_at: Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap(),
            last_updated_at: now(),
            location: Some("Bodega 2".to_string()),
        }
    }

    fn transfer() -> TransferRequest {
        TransferRequest {
            product_id: "UREA-25".to_string(),
            source_branch_id: "SUC-NORTE".to_string(),
            dest_branch_id: "SUC-SUR".to_string(),
            quantity: Quantity::from_units(4),
            source_lot_id: None,
            lot_code: Some("L-2026-07".to_string()),
            dest_lot_code: None,
            unit_cost: None,
            costing_method: None,
            reference: None,
        }
    }

    #[test]
    fn test_transfer_destination_inherits_from_source() {
        let lot = NewLot::for_transfer_destination(&source_lot(), &transfer());
        assert_eq!(lot.branch_id, "SUC-SUR");
        assert_eq!(lot.lot_code.as_deref(), Some("L-2026-07"));
        assert_eq!(lot.unit_cost, Some(Money::from_cents(42000)));
        assert_eq!(lot.costing_method, CostingMethod::Fifo);
        assert_eq!(lot.received_at, source_lot().received_at);
        assert_eq!(lot.location, None);
    }

    #[test]
    fn test_transfer_destination_overrides() {
        let mut req = transfer();
        req.dest_lot_code = Some("SUR-01".to_string());
        req.unit_cost = Some(Money::from_cents(43500));
        req.costing_method = Some(CostingMethod::Average);

        let lot = NewLot::for_transfer_destination(&source_lot(), &req);
        assert_eq!(lot.lot_code.as_deref(), Some("SUR-01"));
        assert_eq!(lot.unit_cost, Some(Money::from_cents(43500)));
        assert_eq!(lot.costing_method, CostingMethod::Average);
    }

    #[test]
    fn test_receipt_defaults() {
        let req = ReceiveStockRequest {
            product_id: " GLIFO-20L ".to_string(),
            branch_id: "SUC-CENTRO".to_string(),
            quantity: Quantity::from_units(40),
            lot_code: Some("  ".to_string()),
            unit_cost: None,
            costing_method: None,
            received_at: None,
            location: None,
            reference: "OC-881".to_string(),
            origin_module: None,
        };
        let lot = NewLot::for_receipt(&req, now());
        assert_eq!(lot.product_id, "GLIFO-20L");
        assert_eq!(lot.lot_code, None);
        assert_eq!(lot.costing_method, CostingMethod::Average);
        assert_eq!(lot.received_at, now());
    }

    #[test]
    fn test_sale_item_mapping() {
        let line = SaleLineRequest {
            product_id: "UREA-25".to_string(),
            quantity: Quantity::from_parts(5, 1),
            base_quantity: Some(Quantity::from_parts(125, 1)),
            unit: None,
            unit_price: Money::from_cents(48000),
        };
        let item = sale_item("sale-1", "item-1".to_string(), 1, &line, now());
        assert_eq!(item.unit, DEFAULT_UNIT);
        assert_eq!(item.line_total, Money::from_cents(24000));
        assert_eq!(item.deducted_quantity(), Quantity::from_parts(125, 1));
    }

    #[test]
    fn test_movement_costs() {
        let lot = source_lot();
        let out = NewMovement::salida(&lot, Quantity::from_units(4), "TRF:1", "TRANSFER");
        assert_eq!(out.unit_cost, Some(Money::from_cents(42000)));
        assert_eq!(out.movement_type, MovementType::Salida);

        let inbound = NewMovement::entrada(&lot, Quantity::from_units(4), None, "TRF:1", "TRANSFER");
        assert_eq!(inbound.unit_cost, Some(Money::from_cents(42000)));

        let priced = NewMovement::entrada(
            &lot,
            Quantity::from_units(4),
            Some(Money::from_cents(40000)),
            "OC-1",
            "ERP",
        );
        assert_eq!(priced.unit_cost, Some(Money::from_cents(40000)));
    }

    #[test]
    fn test_references() {
        assert_eq!(transfer_reference("abc", None), "TRF:abc");
        assert_eq!(transfer_reference("abc", Some("  ")), "TRF:abc");
        assert_eq!(transfer_reference("abc", Some("reabasto")), "TRF:abc reabasto");
        assert_eq!(adjustment_reference(" merma "), "ADJ:merma");
        assert_eq!(origin_or(None, "POS"), "POS");
        assert_eq!(origin_or(Some("ERP"), "POS"), "ERP");
    }
}
