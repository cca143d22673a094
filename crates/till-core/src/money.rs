//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A register that computes tax as `subtotal * 0.1` in floats will        │
//! │  eventually disagree with its own receipts by a unit.                   │
//! │                                                                         │
//! │  OUR SOLUTION: integer minor units end to end                           │
//! │    Prices, line totals, subtotals and tax are all i64 minor units.      │
//! │    Rounding happens exactly ONCE, at the aggregate tax step.            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//! use till_core::types::TaxRate;
//!
//! let subtotal = Money::from_minor(350);
//! let tax = subtotal.tax(TaxRate::from_bps(1000)); // 10%
//! assert_eq!(tax.minor(), 35);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: leaves room for refunds and corrections
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type:
/// catalog prices, line totals, subtotals, tax amounts and grand totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax using round-half-up (commercial rounding).
    ///
    /// ## Rounding Policy
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF UP (ties away from zero)                                │
    /// │                                                                     │
    /// │  10.4 → 10    10.5 → 11    10.6 → 11                                │
    /// │                                                                     │
    /// │  Applied exactly ONCE, to the aggregate pre-tax total.              │
    /// │  NEVER accumulated from per-line rounded taxes: summing per-line    │
    /// │  roundings drifts from the aggregate by up to one unit per line.    │
    /// │                                                                     │
    /// │    lines 105 + 105 at 10%:                                          │
    /// │      per line:  round(10.5) + round(10.5) = 22   ❌                 │
    /// │      aggregate: round(21.0)               = 21   ✅                 │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps ± 5000) / 10000`.
    /// The ±5000 term provides the half-up behaviour (5000/10000 = 0.5),
    /// with the sign chosen so ties round away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_minor(105);
    /// let rate = TaxRate::from_bps(1000); // 10%
    ///
    /// // 105 × 10% = 10.5 → rounds up to 11
    /// assert_eq!(subtotal.tax(rate).minor(), 11);
    /// ```
    pub fn tax(&self, rate: TaxRate) -> Money {
        // i128 to prevent overflow on large amounts
        let numerator = self.0 as i128 * rate.bps() as i128;
        let rounded = if numerator >= 0 {
            (numerator + 5_000) / 10_000
        } else {
            (numerator - 5_000) / 10_000
        };
        Money(rounded as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(150);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 450);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows the raw minor-unit amount.
///
/// Currency formatting (symbols, separators, locale) is a client concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default money is zero.
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

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(28500);
        assert_eq!(money.minor(), 28500);
        assert!(!money.is_zero());
        assert!(!money.is_negative());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);

        let mut c = a;
        c += b;
        assert_eq!(c.minor(), 1500);
        c -= b;
        assert_eq!(c.minor(), 1000);
    }

    #[test]
    fn test_tax_exact() {
        // 350 at 10% = 35, no rounding involved
        let amount = Money::from_minor(350);
        assert_eq!(amount.tax(TaxRate::from_bps(1000)).minor(), 35);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 105 at 10% = 10.5 → 11 (ties away from zero)
        assert_eq!(Money::from_minor(105).tax(TaxRate::from_bps(1000)).minor(), 11);
        // 104 at 10% = 10.4 → 10
        assert_eq!(Money::from_minor(104).tax(TaxRate::from_bps(1000)).minor(), 10);
        // 106 at 10% = 10.6 → 11
        assert_eq!(Money::from_minor(106).tax(TaxRate::from_bps(1000)).minor(), 11);
    }

    #[test]
    fn test_tax_negative_ties_away_from_zero() {
        // Refund-side amounts mirror the positive behaviour
        assert_eq!(Money::from_minor(-105).tax(TaxRate::from_bps(1000)).minor(), -11);
        assert_eq!(Money::from_minor(-104).tax(TaxRate::from_bps(1000)).minor(), -10);
    }

    #[test]
    fn test_tax_zero_rate() {
        let amount = Money::from_minor(12345);
        assert_eq!(amount.tax(TaxRate::zero()).minor(), 0);
    }

    #[test]
    fn test_tax_large_amount_no_overflow() {
        // Near-i64 amounts go through i128 internally
        let amount = Money::from_minor(i64::MAX / 10_000);
        let tax = amount.tax(TaxRate::from_bps(1000));
        assert!(tax.minor() > 0);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(200);
        assert_eq!(unit_price.multiply_quantity(4).minor(), 800);
    }

    #[test]
    fn test_display_raw_minor_units() {
        assert_eq!(format!("{}", Money::from_minor(28500)), "28500");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-550");
    }
}
