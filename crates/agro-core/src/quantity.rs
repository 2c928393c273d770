//! # Quantity Module
//!
//! Provides the `Quantity` type for stock amounts expressed in a product's
//! base unit (pieces, kilograms, litres).
//!
//! ## Why Decimal Quantities?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BULK PRODUCTS ARE FRACTIONAL                                           │
//! │                                                                         │
//! │  A 25 kg sack of urea sold as "half a sack" deducts 12.5 kg.           │
//! │  A 20 L drum of herbicide sold by the litre deducts 0.75 L.            │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    10.0 - 9.9 - 0.1 = -0.0000000000000003  ❌ NEGATIVE STOCK!           │
//! │                                                                         │
//! │  With rust_decimal:                                                     │
//! │    10.0 - 9.9 - 0.1 = 0.0                  ✅ EXACT                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are persisted as TEXT so SQLite never turns them into REALs.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

// =============================================================================
// Quantity Type
// =============================================================================

/// An exact, signed amount of stock in a product's base unit.
///
/// Lot quantities are never negative (the lot store refuses it), but
/// adjustment deltas and reconciliation differences are signed, so the
/// type itself is too.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Zero units.
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    /// Wraps a decimal value.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Quantity(value)
    }

    /// Whole base units.
    ///
    /// ## Example
    /// ```rust
    /// use agro_core::Quantity;
    ///
    /// let sacks = Quantity::from_units(10);
    /// assert_eq!(sacks.to_string(), "10");
    /// ```
    #[inline]
    pub fn from_units(units: i64) -> Self {
        Quantity(Decimal::from(units))
    }

    /// Fixed-point constructor: `from_parts(125, 1)` is 12.5.
    #[inline]
    pub fn from_parts(mantissa: i64, scale: u32) -> Self {
        Quantity(Decimal::new(mantissa, scale))
    }

    /// The underlying decimal.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Strictly less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }

    /// Addition that returns `None` on overflow.
    #[inline]
    pub fn checked_add(&self, amount: Quantity) -> Option<Quantity> {
        self.0.checked_add(amount.0).map(Quantity)
    }

    /// Subtraction that refuses to go below zero.
    ///
    /// ## Returns
    /// `None` when `amount` exceeds `self`, which is exactly the condition
    /// under which a lot decrement must be refused.
    pub fn checked_sub_non_negative(&self, amount: Quantity) -> Option<Quantity> {
        let result = self.0.checked_sub(amount.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Quantity(result))
        }
    }

    /// Rounds to `scale` decimal places with banker's rounding.
    pub fn round_to(&self, scale: u32) -> Self {
        Quantity(
            self.0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Number of decimal places carried by this value.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Canonical form without trailing zeros (`12.500` becomes `12.5`).
    #[inline]
    pub fn normalize(&self) -> Self {
        Quantity(self.0.normalize())
    }
}

// =============================================================================
// Bulk Conversion
// =============================================================================

/// Converts a display quantity (sacks, drums, boxes) into base units.
///
/// The result is rounded to the scale of `tolerance` with banker's rounding,
/// so a tolerance of `0.001` keeps three decimal places of the base unit.
///
/// ## Example
/// ```rust
/// use agro_core::quantity::{base_quantity_for, Quantity};
///
/// // Half a 25 kg sack
/// let base = base_quantity_for(
///     Quantity::from_parts(5, 1),
///     Quantity::from_units(25),
///     Quantity::from_parts(1, 3),
/// );
/// assert_eq!(base, Quantity::from_parts(125, 1));
/// ```
pub fn base_quantity_for(
    display_quantity: Quantity,
    units_per_display: Quantity,
    tolerance: Quantity,
) -> Quantity {
    let exact = display_quantity
        .0
        .checked_mul(units_per_display.0)
        .unwrap_or(Decimal::MAX);
    Quantity(exact).round_to(tolerance.scale()).normalize()
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Quantity {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Quantity)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity(value)
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, |acc, q| Quantity(acc.0.saturating_add(q.0)))
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, |acc, q| Quantity(acc.0.saturating_add(q.0)))
    }
}

// =============================================================================
// SQLite Mapping
// =============================================================================
// Stored as TEXT in canonical (normalized) form.

#[cfg(feature = "sqlx")]
mod sqlite {
    use super::Quantity;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
    use sqlx::{Database, Decode, Encode, Type};

    impl Type<Sqlite> for Quantity {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Quantity {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.0.normalize().to_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Quantity {
        fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(text.parse::<Quantity>()?)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
