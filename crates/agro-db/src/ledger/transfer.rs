//! # Transfer Orchestrator
//!
//! Moves stock of one lot between branches.
//!
//! ## Steps (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. resolve source lot   explicit id (must match product + branch)     │
//! │                          else (product, source branch, lot code)       │
//! │  2. check quantity       source.quantity < qty → StockInsufficient     │
//! │  3. decrement source                                                    │
//! │  4. find-or-create dest  (product, dest branch, dest code ?? src code) │
//! │     increment dest       new lot inherits cost + costing method        │
//! │                          existing average lot re-blends its cost       │
//! │  5. append movements     salida @ source, entrada @ dest               │
//! │                          reference TRF:{id}, origin TRANSFER           │
//! │  6. insert audit row     points at both movements                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::error::{LedgerError, LedgerResult};
use super::intake::blended_cost;
use crate::repository::{lot, movement, transfer};
use agro_core::mapping::{destination_lot_code, normalize_code, transfer_reference};
use agro_core::{
    Lot, NewLot, NewMovement, TransferAudit, TransferOutcome, TransferRequest, ORIGIN_TRANSFER,
};

/// Executes a validated transfer inside `conn`'s transaction. Does not
/// commit.
///
/// ## Errors
/// - `NotFound` if the source lot can't be resolved
/// - `StockInsufficient` if the source lot holds less than requested
/// - `Validation` if the destination lot would pass `MAX_QUANTITY`
/// - `TransientConflict` on a serialization failure
pub async fn transfer_in(
    conn: &mut SqliteConnection,
    req: &TransferRequest,
) -> LedgerResult<TransferOutcome> {
    let now = Utc::now();
    let quantity = req.quantity;

    let source = resolve_source_lot(conn, req).await?;
    if source.quantity < quantity {
        return Err(LedgerError::StockInsufficient {
            product_id: source.product_id,
            branch_id: source.branch_id,
            lot_id: Some(source.id),
            available: source.quantity,
            required: quantity,
        });
    }

    let source = lot::decrement(conn, &source.id, quantity).await?;

    let unit_cost = req.unit_cost.or(source.unit_cost);
    let dest_branch = req.dest_branch_id.trim();
    let dest_code = destination_lot_code(&source, req);
    let (dest, dest_lot_created) =
        match lot::find_lot(conn, &source.product_id, dest_branch, dest_code.as_deref()).await? {
            Some(existing) => {
                let blended = blended_cost(&existing, quantity, unit_cost);
                if blended != existing.unit_cost {
                    lot::set_unit_cost(conn, &existing.id, blended).await?;
                }
                (existing, false)
            }
            None => {
                let new_lot = NewLot::for_transfer_destination(&source, req);
                (lot::create_lot(conn, &new_lot, now).await?, true)
            }
        };
    let dest = lot::increment(conn, &dest.id, quantity).await?;

    let transfer_id = Uuid::new_v4().to_string();
    let reference = transfer_reference(&transfer_id, req.reference.as_deref());

    let outbound = movement::append(
        conn,
        &NewMovement::salida(&source, quantity, &reference, ORIGIN_TRANSFER),
    )
    .await?;
    let inbound = movement::append(
        conn,
        &NewMovement::entrada(&dest, quantity, unit_cost, &reference, ORIGIN_TRANSFER),
    )
    .await?;

    let audit = TransferAudit {
        transfer_id: transfer_id.clone(),
        product_id: source.product_id.clone(),
        source_branch_id: source.branch_id.clone(),
        dest_branch_id: dest.branch_id.clone(),
        source_lot_id: source.id.clone(),
        dest_lot_id: dest.id.clone(),
        outbound_movement_id: outbound.id.clone(),
        inbound_movement_id: inbound.id.clone(),
        quantity,
        unit_cost,
        lot_code: dest.lot_code.clone(),
        reference: reference.clone(),
        created_at: now,
    };
    transfer::insert_audit(conn, &audit).await?;

    Ok(TransferOutcome {
        transfer_id,
        reference,
        source_lot: source,
        dest_lot: dest,
        dest_lot_created,
        outbound_movement_id: outbound.id,
        inbound_movement_id: inbound.id,
        audit,
    })
}

async fn resolve_source_lot(conn: &mut SqliteConnection, req: &TransferRequest) -> LedgerResult<Lot> {
    let product_id = req.product_id.trim();
    let branch_id = req.source_branch_id.trim();

    let explicit = req.source_lot_id.as_deref().map(str::trim).filter(|id| !id.is_empty());

    match explicit {
        Some(lot_id) => lot::find_lot_by_id(conn, lot_id)
            .await?
            .filter(|lot| lot.product_id == product_id && lot.branch_id == branch_id)
            .ok_or_else(|| LedgerError::not_found("Lot", lot_id)),
        None => {
            let code = normalize_code(req.lot_code.as_deref());
            lot::find_lot(conn, product_id, branch_id, code.as_deref())
                .await?
                .ok_or_else(|| {
                    LedgerError::not_found(
                        "Lot",
                        format!("{}@{} code {}", product_id, branch_id, code.as_deref().unwrap_or("<none>")),
                    )
                })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
