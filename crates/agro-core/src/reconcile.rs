//! # Reconciliation
//!
//! Every lot's quantity must equal Σ entrada − Σ salida over its movements.
//! This module holds the arithmetic; `agro-db` feeds it stored rows.

use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;
use crate::types::{Lot, Movement};

/// Outcome of checking one lot against its movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotReconciliation {
    pub lot_id: String,
    pub product_id: String,
    pub branch_id: String,
    /// Quantity stored on the lot.
    pub recorded: Quantity,
    /// Quantity derived from the movement log.
    pub derived: Quantity,
    /// `recorded - derived`
    pub difference: Quantity,
    pub balanced: bool,
    pub movement_count: usize,
}

/// Σ entrada − Σ salida.
pub fn derive_balance<'a, I>(movements: I) -> Quantity
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements.into_iter().map(Movement::signed_quantity).sum()
}

/// Compares a lot with the movements recorded against it.
///
/// Movements for other lots are ignored, so callers may pass a wider slice.
pub fn reconcile(lot: &Lot, movements: &[Movement]) -> LotReconciliation {
    let own: Vec<&Movement> = movements.iter().filter(|m| m.lot_id == lot.id).collect();
    let derived = derive_balance(own.iter().copied());
    let difference = lot.quantity - derived;

    LotReconciliation {
        lot_id: lot.id.clone(),
        product_id: lot.product_id.clone(),
        branch_id: lot.branch_id.clone(),
        recorded: lot.quantity,
        derived,
        difference,
        balanced: difference.is_zero(),
        movement_count: own.len(),
    }
}
