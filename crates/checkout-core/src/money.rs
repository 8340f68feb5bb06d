//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  3 × 2.15 + 2 × 0.96 in f64 = 8.370000000000001                         │
//! │  Paying exactly 8.37 then looks like a 0.000000000000001 shortfall.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3 × 215 + 2 × 96 = 837 cents, and 837 >= 837                         │
//! │    The "within one cent" tolerance falls out of the representation.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use checkout_core::money::Money;
//!
//! let price = Money::from_cents(215);
//! let line = price * 3;
//! assert_eq!(line.cents(), 645);
//!
//! // Decimal text parses exactly, no f64 round trip
//! let tendered: Money = "8.37".parse().unwrap();
//! assert_eq!(tendered.cents(), 837);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: shortfalls and the wrong-state payment sentinel are
///   negative amounts
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartLine.line_total ──► Cart.total ──► Register::pay
///                                                              │
///                                   tendered − total ◄─────────┘
///                                   (change, or negative shortfall)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Applies a whole-percent discount, rounding the result down to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::money::Money;
    ///
    /// // 54.99 at 5% off = 52.2405 → 52.24
    /// let discounted = Money::from_cents(5499).apply_percentage_discount(5);
    /// assert_eq!(discounted.cents(), 5224);
    /// ```
    ///
    /// Percentages above 100 produce a negative price; callers that store
    /// prices reject those.
    pub fn apply_percentage_discount(&self, percent: i64) -> Money {
        let scaled = (self.0 as i128).saturating_mul(100 - i128::from(percent));
        let cents = scaled.div_euclid(100);
        Money::from_cents(i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX }))
    }

    /// True when `self` and `other` differ by at most `tolerance`.
    #[inline]
    pub fn is_within(&self, other: Money, tolerance: Money) -> bool {
        self.0.abs_diff(other.0) <= tolerance.0.unsigned_abs()
    }

    /// Parses decimal text, rounding digits past the cent as `rounding` says.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::money::{Money, Rounding};
    ///
    /// assert_eq!(Money::parse_rounded("8.361", Rounding::HalfUp).unwrap().cents(), 836);
    /// assert_eq!(Money::parse_rounded("8.361", Rounding::Ceiling).unwrap().cents(), 837);
    /// ```
    pub fn parse_rounded(text: &str, rounding: Rounding) -> Result<Money, ValidationError> {
        let text = text.trim();
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount", text),
        };

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = match rounding {
            Rounding::HalfUp => digits.next().is_some_and(|d| d >= 5),
            // toward +∞: only positive amounts grow
            Rounding::Ceiling => !negative && digits.any(|d| d > 0),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// How [`Money::parse_rounded`] treats digits past the second decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Half a cent or more rounds away from zero.
    HalfUp,
    /// Any remainder rounds toward positive infinity.
    Ceiling,
}

/// Parses decimal text (`"2.15"`, `"8"`, `"-0.5"`, `"+3.1"`).
///
/// Digits beyond the second decimal place round half-up, so recorded values
/// like `"8.370000000000001"` land on `8.37`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_rounded(s, Rounding::HalfUp)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// Arithmetic saturates at the i64 bounds instead of overflowing.

/// Plain decimal rendering, parseable back by `FromStr`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a cart quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0.saturating_mul(i64::from(qty)))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(215).to_string(), "2.15");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-4200).to_string(), "-42.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_exact_decimals() {
        assert_eq!("2.15".parse::<Money>().unwrap().cents(), 215);
        assert_eq!("8".parse::<Money>().unwrap().cents(), 800);
        assert_eq!("0.5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!(".96".parse::<Money>().unwrap().cents(), 96);
        assert_eq!("-42".parse::<Money>().unwrap().cents(), -4200);
        assert_eq!("-0.05".parse::<Money>().unwrap().cents(), -5);
        assert_eq!(" 1.86 ".parse::<Money>().unwrap().cents(), 186);
    }

    #[test]
    fn test_parse_rounds_extra_digits() {
        assert_eq!("8.370000000000001".parse::<Money>().unwrap().cents(), 837);
        assert_eq!("2.155".parse::<Money>().unwrap().cents(), 216);
        assert_eq!("2.154".parse::<Money>().unwrap().cents(), 215);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1,50".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("--1".parse::<Money>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for cents in [0, 1, 99, 100, 837, -4200, -1] {
            let money = Money::from_cents(cents);
            assert_eq!(money.to_string().parse::<Money>().unwrap(), money);
        }
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percentage_discount_floors() {
        assert_eq!(Money::from_cents(5499).apply_percentage_discount(5).cents(), 5224);
        assert_eq!(Money::from_cents(1000).apply_percentage_discount(10).cents(), 900);
        assert_eq!(Money::from_cents(999).apply_percentage_discount(0).cents(), 999);
        assert_eq!(Money::from_cents(999).apply_percentage_discount(100).cents(), 0);
        assert!(Money::from_cents(999).apply_percentage_discount(150).is_negative());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
        assert_eq!(Money::from_cents(-550).abs().cents(), 550);
    }

    #[test]
    fn test_is_within_tolerance() {
        let total = Money::from_cents(837);
        let one_cent = Money::from_cents(1);
        assert!(total.is_within(Money::from_cents(836), one_cent));
        assert!(total.is_within(Money::from_cents(838), one_cent));
        assert!(!total.is_within(Money::from_cents(835), one_cent));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!((huge * 2).cents(), i64::MAX);
        assert_eq!((huge + huge).cents(), i64::MAX);
        assert_eq!((-huge - huge - huge).cents(), i64::MIN);
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);

        let total: Money = [huge, huge, huge].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
        assert!(!total.is_within(-total, Money::from_cents(1)));
    }

    #[test]
    fn test_parse_ceiling() {
        let ceil = |text| Money::parse_rounded(text, Rounding::Ceiling).unwrap().cents();
        assert_eq!(ceil("8.361"), 837);
        assert_eq!(ceil("8.3600"), 836);
        assert_eq!(ceil("8.36"), 836);
        assert_eq!(ceil("-0.009"), 0);
        assert_eq!(ceil("-8.361"), -836);
        assert!(Money::parse_rounded("8,36", Rounding::Ceiling).is_err());
    }
}
