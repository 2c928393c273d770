//! # FIFO Sale Fulfillment
//!
//! Persists a sale and deducts each line from the branch's lots, oldest
//! first, inside the caller's transaction.
//!
//! ## Per Line
//! ```text
//! requested = baseQuantity ?? quantity
//!      │
//!      ▼
//! find_available_lots (oldest first) ──► plan_fifo ──► StockInsufficient?
//!      │                                                   (abort all)
//!      ▼
//! for each planned lot:  decrement ──► append salida (lot's unit cost)
//!      │
//!      ▼
//! Σ applied vs requested ──► |residual| > tolerance? ──► InternalConsistency
//!      │
//!      ▼
//! insert sale item
//! ```
//!
//! Lines for the same product run in order, so a later line sees the
//! deductions of an earlier one.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, error};
use uuid::Uuid;

use super::error::{LedgerError, LedgerResult};
use crate::config::LedgerSettings;
use crate::repository::{lot, movement, sale};
use agro_core::fifo::{check_residual, plan_fifo};
use agro_core::mapping::{sale_header, sale_item, sale_reference};
use agro_core::{
    CoreError, LineFulfillment, LotAllocation, NewMovement, Quantity, SaleAggregate,
    SaleFulfillment, SaleRequest,
};

/// Fulfills a validated sale inside `conn`'s transaction.
///
/// Does not commit. On error the caller must roll back; partial writes
/// from earlier lines are still in the transaction.
///
/// ## Errors
/// - `StockInsufficient` if any line cannot be covered
/// - `InternalConsistency` if deductions drift from the request
/// - `TransientConflict` on a serialization failure
pub async fn fulfill_sale_in(
    conn: &mut SqliteConnection,
    req: &SaleRequest,
    settings: &LedgerSettings,
) -> LedgerResult<SaleFulfillment> {
    let now = Utc::now();
    let header = sale_header(req, Uuid::new_v4().to_string(), &settings.default_origin_module, now);
    sale::insert_sale(conn, &header).await?;

    let reference = sale_reference(&header);
    let mut items = Vec::with_capacity(req.items.len());
    let mut lines = Vec::with_capacity(req.items.len());

    for (idx, line) in req.items.iter().enumerate() {
        let line_no = idx as i64 + 1;
        let item = sale_item(&header.id, Uuid::new_v4().to_string(), line_no, line, now);
        let requested = item.deducted_quantity();

        let allocations = deduct_fifo(
            conn,
            &item.product_id,
            &header.branch_id,
            requested,
            &reference,
            &header.origin_module,
            settings.residual_tolerance,
        )
        .await?;

        sale::insert_item(conn, &item).await?;

        lines.push(LineFulfillment {
            line_no,
            product_id: item.product_id.clone(),
            requested,
            allocations,
        });
        items.push(item);
    }

    Ok(SaleFulfillment {
        sale: SaleAggregate {
            sale: header,
            items,
        },
        lines,
    })
}

/// Deducts `requested` from the product's lots at a branch, oldest first,
/// writing one salida per lot touched.
pub async fn deduct_fifo(
    conn: &mut SqliteConnection,
    product_id: &str,
    branch_id: &str,
    requested: Quantity,
    reference: &str,
    origin_module: &str,
    tolerance: Quantity,
) -> LedgerResult<Vec<LotAllocation>> {
    let lots = lot::find_available_lots(conn, product_id, branch_id).await?;
    let plan = plan_fifo(product_id, branch_id, &lots, requested, tolerance)
        .map_err(|e| consistency_logged(e, branch_id))?;

    debug!(
        product_id,
        branch_id,
        requested = %requested,
        available = %plan.available,
        lots = plan.deductions.len(),
        "FIFO plan"
    );

    let mut allocations = Vec::with_capacity(plan.deductions.len());
    for step in &plan.deductions {
        let updated = lot::decrement(conn, &step.lot_id, step.quantity).await?;
        let salida = movement::append(
            conn,
            &NewMovement::salida(&updated, step.quantity, reference, origin_module),
        )
        .await?;

        allocations.push(LotAllocation {
            lot_id: updated.id.clone(),
            lot_code: updated.lot_code.clone(),
            quantity: step.quantity,
            unit_cost: updated.unit_cost,
            movement_id: salida.id,
            remaining_in_lot: updated.quantity,
        });
    }

    let applied: Quantity = allocations.iter().map(|a| a.quantity).sum();
    check_residual(product_id, requested - applied, tolerance)
        .map_err(|e| consistency_logged(e, branch_id))?;

    Ok(allocations)
}

/// Converts a planner error, logging residual failures at error level.
fn consistency_logged(err: CoreError, branch_id: &str) -> LedgerError {
    if let CoreError::ResidualExceeded {
        product_id,
        residual,
        tolerance,
    } = &err
    {
        error!(
            product_id = %product_id,
            branch_id,
            residual = %residual,
            tolerance = %tolerance,
            "FIFO deductions do not cover the requested quantity"
        );
    }
    err.into()
}

// =============================================================================
// Unit Tests
// =============================================================================
