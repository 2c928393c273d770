//! # Money Module
//!
//! Provides the `Money` type for unit costs, unit prices and sale totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    A lot's unitCost, a movement's unitCost and a line's unitPrice      │
//! │    are all i64 cents. Only `Quantity` is fractional, and the two meet  │
//! │    in exactly one place: `Money::extend` (price × quantity), which     │
//! │    rounds once with Bankers Rounding.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agro_core::{Money, Quantity};
//!
//! let per_kg = Money::from_cents(1850); // $18.50 / kg
//! let line = per_kg.extend(Quantity::from_parts(125, 1)); // 12.5 kg
//! assert_eq!(line.cents(), 23125);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Lot.unit_cost ──► Movement.unit_cost (salida carries the lot's own cost)
///                 └─► TransferAudit.unit_cost
///
/// SaleLine.unit_price × base quantity ──► SaleItem.line_total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use agro_core::Money;
    ///
    /// let cost = Money::from_cents(45000); // $450.00 per sack
    /// assert_eq!(cost.cents(), 45000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a per-unit amount by a fractional quantity.
    ///
    /// The exact product is rounded once, to whole cents, with Bankers
    /// Rounding (round half to even):
    /// ```text
    ///   $0.05 × 0.5 kg = 2.5¢ → 2¢
    ///   $0.07 × 0.5 kg = 3.5¢ → 4¢
    /// ```
    pub fn extend(&self, quantity: Quantity) -> Money {
        let exact = Decimal::from(self.0)
            .checked_mul(quantity.value())
            .unwrap_or(if quantity.is_negative() == self.is_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            });
        Money::from_decimal_cents(exact)
    }

    /// Weighted average unit cost after adding stock to a lot.
    ///
    /// ## Arguments
    /// * `on_hand` - Quantity and unit cost already in the lot
    /// * `incoming` - Quantity and unit cost being received
    ///
    /// ## Example
    /// ```rust
    /// use agro_core::{Money, Quantity};
    ///
    /// // 10 sacks at $400 + 10 sacks at $500 = $450 average
    /// let avg = Money::weighted_average(
    ///     (Quantity::from_units(10), Money::from_cents(40000)),
    ///     (Quantity::from_units(10), Money::from_cents(50000)),
    /// );
    /// assert_eq!(avg.cents(), 45000);
    /// ```
    ///
    /// Falls back to the incoming cost when the quantities are not positive
    /// in total or the arithmetic would overflow.
    pub fn weighted_average(on_hand: (Quantity, Money), incoming: (Quantity, Money)) -> Money {
        let blended = || {
            let total_qty = on_hand.0.checked_add(incoming.0)?;
            if !total_qty.is_positive() {
                return None;
            }
            let held = Decimal::from(on_hand.1.cents()).checked_mul(on_hand.0.value())?;
            let added = Decimal::from(incoming.1.cents()).checked_mul(incoming.0.value())?;
            held.checked_add(added)?.checked_div(total_qty.value())
        };

        match blended() {
            Some(avg) => Money::from_decimal_cents(avg),
            None => incoming.1,
        }
    }

    fn from_decimal_cents(exact: Decimal) -> Money {
        let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        Money(rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form for logs and error messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
