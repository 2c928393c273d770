//! # Stock Intake
//!
//! Receipts of purchased stock and signed corrections. Both go through the
//! movement log like any sale or transfer; history is never edited.
//!
//! ## Receipt Costing
//! ```text
//! new lot            → unit cost from the receipt
//! existing, average  → (qty·cost + in_qty·in_cost) / (qty + in_qty)
//! existing, fifo     → keeps its cost (first receipt wins)
//! ```
//!
//! Transfers into an existing destination lot follow the same rule.

use chrono::Utc;
use sqlx::SqliteConnection;

use super::error::{LedgerError, LedgerResult};
use crate::config::LedgerSettings;
use crate::repository::{lot, movement};
use agro_core::mapping::{adjustment_reference, normalize_code, origin_or};
use agro_core::{
    AdjustStockRequest, CostingMethod, Lot, Money, NewLot, NewMovement, Quantity,
    ReceiveStockRequest, StockChange,
};

/// Receives stock into the (product, branch, lot code) lot, creating it on
/// first receipt. Does not commit.
pub async fn receive_stock_in(
    conn: &mut SqliteConnection,
    req: &ReceiveStockRequest,
    settings: &LedgerSettings,
) -> LedgerResult<StockChange> {
    let now = Utc::now();
    let code = normalize_code(req.lot_code.as_deref());

    let existing = lot::find_lot(conn, req.product_id.trim(), req.branch_id.trim(), code.as_deref()).await?;
    let (target, lot_created) = match existing {
        Some(found) => {
            let blended = blended_cost(&found, req.quantity, req.unit_cost);
            if blended != found.unit_cost {
                lot::set_unit_cost(conn, &found.id, blended).await?;
            }
            (found, false)
        }
        None => (lot::create_lot(conn, &NewLot::for_receipt(req, now), now).await?, true),
    };

    let updated = lot::increment(conn, &target.id, req.quantity).await?;
    let origin = origin_or(req.origin_module.as_deref(), &settings.default_origin_module);
    let entrada = movement::append(
        conn,
        &NewMovement::entrada(&updated, req.quantity, req.unit_cost, req.reference.trim(), &origin),
    )
    .await?;

    Ok(StockChange {
        lot: updated,
        movement: entrada,
        lot_created,
    })
}

/// Unit cost of an existing lot after `incoming_qty` arrives at
/// `incoming_cost`.
pub(super) fn blended_cost(lot: &Lot, incoming_qty: Quantity, incoming_cost: Option<Money>) -> Option<Money> {
    let Some(incoming) = incoming_cost else {
        return lot.unit_cost;
    };

    match (lot.costing_method, lot.unit_cost) {
        (CostingMethod::Average, Some(current)) if lot.quantity.is_positive() => Some(
            Money::weighted_average((lot.quantity, current), (incoming_qty, incoming)),
        ),
        (CostingMethod::Average, _) => Some(incoming),
        (CostingMethod::Fifo, current) => current.or(Some(incoming)),
    }
}

/// Applies a signed correction to one lot. Does not commit.
///
/// ## Errors
/// - `NotFound` if the lot doesn't exist
/// - `StockInsufficient` if a negative delta exceeds the lot
pub async fn adjust_stock_in(
    conn: &mut SqliteConnection,
    req: &AdjustStockRequest,
    settings: &LedgerSettings,
) -> LedgerResult<StockChange> {
    let lot_id = req.lot_id.trim();
    let target = lot::find_lot_by_id(conn, lot_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("Lot", lot_id))?;

    let reference = adjustment_reference(&req.reason);
    let origin = origin_or(req.origin_module.as_deref(), &settings.default_origin_module);
    let amount = req.delta.abs();

    let (updated, new_movement) = if req.delta.is_positive() {
        let updated = lot::increment(conn, &target.id, amount).await?;
        let entrada = NewMovement::entrada(&updated, amount, None, &reference, &origin);
        (updated, entrada)
    } else {
        let updated = lot::decrement(conn, &target.id, amount).await?;
        let salida = NewMovement::salida(&updated, amount, &reference, &origin);
        (updated, salida)
    };

    let logged = movement::append(conn, &new_movement).await?;

    Ok(StockChange {
        lot: updated,
        movement: logged,
        lot_created: false,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
