//! # FIFO Allocation
//!
//! Plans how a requested quantity is taken from a product's lots at one
//! branch, oldest lot first. The plan is pure; `agro-db` applies it inside
//! the sale transaction and re-checks the residual against what it wrote.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  requested = 12                                                         │
//! │                                                                         │
//! │  lots (receivedAt asc, id asc, quantity > 0):                           │
//! │     A (day 1) = 10     B (day 2) = 5                                    │
//! │                                                                         │
//! │  Σ available = 15 ≥ 12 ──► walk                                         │
//! │     take min(10, 12) = 10 from A   remaining 2                          │
//! │     take min(5, 2)   =  2 from B   remaining 0  ──► stop                │
//! │                                                                         │
//! │  residual 0 ≤ tolerance ──► plan OK: [A:10, B:2]                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::Lot;

// =============================================================================
// Plan Types
// =============================================================================

/// Quantity to take from one lot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDeduction {
    pub lot_id: String,
    pub lot_code: Option<String>,
    pub quantity: Quantity,
    /// The lot's own unit cost, carried onto the salida movement.
    pub unit_cost: Option<Money>,
    /// Lot quantity after the deduction.
    pub remaining_in_lot: Quantity,
}

/// Full allocation of one requested quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct FifoPlan {
    pub requested: Quantity,
    /// Σ quantity of the lots that were considered.
    pub available: Quantity,
    /// Oldest lot first.
    pub deductions: Vec<PlannedDeduction>,
    /// Requested quantity the walk could not place.
    pub residual: Quantity,
}

impl FifoPlan {
    /// Σ of the planned deductions.
    pub fn allocated(&self) -> Quantity {
        self.deductions.iter().map(|d| d.quantity).sum()
    }
}

// =============================================================================
// Planner
// =============================================================================

/// Plans a FIFO deduction of `requested` from `lots`.
///
/// Lots with no stock are skipped. The input does not need to be sorted;
/// the planner orders by `(received_at, id)`.
///
/// ## Errors
/// - `Validation` if `requested` is not positive
/// - `InsufficientStock` if Σ available < requested
/// - `ResidualExceeded` if the walk leaves more than `tolerance` unplaced
pub fn plan_fifo(
    product_id: &str,
    branch_id: &str,
    lots: &[Lot],
    requested: Quantity,
    tolerance: Quantity,
) -> CoreResult<FifoPlan> {
    if !requested.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    let mut ordered: Vec<&Lot> = lots.iter().filter(|lot| lot.has_stock()).collect();
    ordered.sort_by(|a, b| a.fifo_key().cmp(&b.fifo_key()));

    let available: Quantity = ordered.iter().map(|lot| lot.quantity).sum();
    if available < requested {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            branch_id: branch_id.to_string(),
            available,
            required: requested,
        });
    }

    let mut remaining = requested;
    let mut deductions = Vec::new();

    for lot in ordered {
        if !remaining.is_positive() {
            break;
        }

        let take = lot.quantity.min(remaining);
        remaining -= take;
        deductions.push(PlannedDeduction {
            lot_id: lot.id.clone(),
            lot_code: lot.lot_code.clone(),
            quantity: take,
            unit_cost: lot.unit_cost,
            remaining_in_lot: lot.quantity - take,
        });
    }

    check_residual(product_id, remaining, tolerance)?;

    Ok(FifoPlan {
        requested,
        available,
        deductions,
        residual: remaining,
    })
}

/// Fails when `residual` is outside `±tolerance`.
pub fn check_residual(product_id: &str, residual: Quantity, tolerance: Quantity) -> CoreResult<()> {
    if residual.abs() > tolerance {
        return Err(CoreError::ResidualExceeded {
            product_id: product_id.to_string(),
            residual,
            tolerance,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CostingMethod;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn tolerance() -> Quantity {
        Quantity::from_parts(1, 3)
    }

    fn lot(id: &str, day: i64, qty: Quantity, cost: Option<i64>) -> Lot {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        Lot {
            id: id.to_string(),
            product_id: "UREA-25".to_string(),
            branch_id: "SUC-CENTRO".to_string(),
            quantity: qty,
            lot_code: Some(format!("L-{id}")),
            unit_cost: cost.map(Money::from_cents),
            costing_method: CostingMethod::Average,
            received_at: base + Duration::days(day),
            last_updated_at: base,
            location: None,
        }
    }

    #[test]
    fn test_split_across_two_lots() {
        let lots = vec![
            lot("b", 2, Quantity::from_units(5), Some(45000)),
            lot("a", 1, Quantity::from_units(10), Some(42000)),
        ];
        let plan = plan_fifo("UREA-25", "SUC-CENTRO", &lots, Quantity::from_units(12), tolerance())
            .unwrap();

        assert_eq!(plan.deductions.len(), 2);
        assert_eq!(plan.deductions[0].lot_id, "a");
        assert_eq!(plan.deductions[0].quantity, Quantity::from_units(10));
        assert_eq!(plan.deductions[0].unit_cost, Some(Money::from_cents(42000)));
        assert_eq!(plan.deductions[0].remaining_in_lot, Quantity::ZERO);
        assert_eq!(plan.deductions[1].lot_id, "b");
        assert_eq!(plan.deductions[1].quantity, Quantity::from_units(2));
        assert_eq!(plan.deductions[1].remaining_in_lot, Quantity::from_units(3));
        assert!(plan.residual.is_zero());
    }

    #[test]
    fn test_insufficient_stock() {
        let lots = vec![
            lot("a", 1, Quantity::from_units(10), None),
            lot("b", 2, Quantity::from_units(5), None),
        ];
        let err = plan_fifo("UREA-25", "SUC-CENTRO", &lots, Quantity::from_units(20), tolerance())
            .unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available, required, ..
            } => {
                assert_eq!(available, Quantity::from_units(15));
                assert_eq!(required, Quantity::from_units(20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_day_ties_break_on_id() {
        let lots = vec![
            lot("lot-2", 1, Quantity::from_units(5), None),
            lot("lot-1", 1, Quantity::from_units(5), None),
        ];
        let plan = plan_fifo("UREA-25", "SUC-CENTRO", &lots, Quantity::from_units(3), tolerance())
            .unwrap();
        assert_eq!(plan.deductions.len(), 1);
        assert_eq!(plan.deductions[0].lot_id, "lot-1");
    }

    #[test]
    fn test_empty_lots_are_skipped() {
        let lots = vec![
            lot("a", 1, Quantity::ZERO, None),
            lot("b", 2, "2.75".parse().unwrap(), None),
        ];
        let plan = plan_fifo("UREA-25", "SUC-CENTRO", &lots, "2.5".parse().unwrap(), tolerance())
            .unwrap();
        assert_eq!(plan.deductions.len(), 1);
        assert_eq!(plan.deductions[0].lot_id, "b");
        assert_eq!(plan.deductions[0].remaining_in_lot, "0.25".parse().unwrap());
    }

    #[test]
    fn test_non_positive_request_rejected() {
        let lots = vec![lot("a", 1, Quantity::from_units(10), None)];
        let err = plan_fifo("UREA-25", "SUC-CENTRO", &lots, Quantity::ZERO, tolerance()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_check_residual() {
        assert!(check_residual("UREA-25", "0.0009".parse().unwrap(), tolerance()).is_ok());
        assert!(check_residual("UREA-25", "-0.001".parse().unwrap(), tolerance()).is_ok());
        let err = check_residual("UREA-25", "0.002".parse().unwrap(), tolerance()).unwrap_err();
        assert!(matches!(err, CoreError::ResidualExceeded { .. }));
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn lots_strategy() -> impl Strategy<Value = Vec<Lot>> {
        prop::collection::vec((0i64..5_000, 0i64..30), 0..8).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (thousandths, day))| {
                    lot(
                        &format!("lot-{i:02}"),
                        day,
                        Quantity::from_parts(thousandths, 3),
                        None,
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_plan_conserves_requested_quantity(
            lots in lots_strategy(),
            requested in 1i64..20_000,
        ) {
            let requested = Quantity::from_parts(requested, 3);
            let available: Quantity = lots.iter().map(|l| l.quantity).sum();

            match plan_fifo("UREA-25", "SUC-CENTRO", &lots, requested, tolerance()) {
                Ok(plan) => {
                    prop_assert!(available >= requested);
                    prop_assert_eq!(plan.allocated(), requested);
                    for d in &plan.deductions {
                        let source = lots.iter().find(|l| l.id == d.lot_id).unwrap();
                        prop_assert!(d.quantity.is_positive());
                        prop_assert!(d.quantity <= source.quantity);
                        prop_assert!(!d.remaining_in_lot.is_negative());
                    }
                }
                Err(CoreError::InsufficientStock { .. }) => {
                    prop_assert!(available < requested);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        #[test]
        fn prop_older_lots_are_emptied_first(
            lots in lots_strategy(),
            requested in 1i64..20_000,
        ) {
            let requested = Quantity::from_parts(requested, 3);
            if let Ok(plan) = plan_fifo("UREA-25", "SUC-CENTRO", &lots, requested, tolerance()) {
                // Every deduction but the last takes its lot to zero.
                let last = plan.deductions.len().saturating_sub(1);
                for d in &plan.deductions[..last] {
                    prop_assert!(d.remaining_in_lot.is_zero());
                }

                // No lot older than a touched lot is left with stock.
                if let Some(newest) = plan.deductions.last() {
                    let newest = lots.iter().find(|l| l.id == newest.lot_id).unwrap();
                    for l in lots.iter().filter(|l| l.has_stock() && l.fifo_key() < newest.fifo_key()) {
                        let consumed = plan.deductions.iter().any(|d| d.lot_id == l.id && d.remaining_in_lot.is_zero());
                        prop_assert!(consumed, "older lot {} left untouched", l.id);
                    }
                }
            }
        }
    }
}
