//! # Domain Types
//!
//! Core domain types shared by the scanner, the register and the catalog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────────┐                    │
//! │  │    Barcode      │        │      Product        │                    │
//! │  │  ─────────────  │        │  ─────────────────  │                    │
//! │  │  i64 (EAN-13)   │◄───────│  barcode (identity) │                    │
//! │  │  is_valid()     │        │  price  (Money)     │                    │
//! │  └─────────────────┘        │  name   (String)    │                    │
//! │                             └─────────────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! A product IS its barcode. Two products with the same barcode are equal,
//! hash the same and sort together, whatever their price or name.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::BARCODE_DIGITS;

// =============================================================================
// Barcode
// =============================================================================

/// A scanned product identifier.
///
/// Any value can be scanned (a smudged label still produces a number), so
/// the type is a plain signed integer; only catalog entries are required to
/// pass [`Barcode::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(i64);

impl Barcode {
    /// Wraps a raw identifier.
    #[inline]
    pub const fn new(code: i64) -> Self {
        Barcode(code)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// EAN-13 checksum.
    ///
    /// ## Algorithm
    /// ```text
    /// 5410188006711 → digits 5 4 1 0 1 8 8 0 0 6 7 1 | 1
    ///                 weight 1 3 1 3 1 3 1 3 1 3 1 3 | key
    ///
    /// sum = 5 + 12 + 1 + 0 + 1 + 24 + 8 + 0 + 0 + 18 + 7 + 3 = 79
    /// key = (10 - 79 % 10) % 10 = 1  ✓
    /// ```
    ///
    /// Short codes are left-padded with zeros; negative codes and codes
    /// longer than 13 digits are never valid.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::Barcode;
    ///
    /// assert!(Barcode::new(130).is_valid());
    /// assert!(Barcode::new(123).is_valid());
    /// assert!(!Barcode::new(1232).is_valid());
    /// assert!(!Barcode::new(-1).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        if self.0 < 0 {
            return false;
        }

        let digits = format!("{:0width$}", self.0, width = BARCODE_DIGITS);
        if digits.len() > BARCODE_DIGITS {
            return false;
        }

        let digits: Vec<u32> = digits.bytes().map(|b| u32::from(b - b'0')).collect();
        let sum: u32 = digits[..BARCODE_DIGITS - 1]
            .iter()
            .enumerate()
            .map(|(i, d)| if i % 2 == 1 { d * 3 } else { *d })
            .sum();
        let key = (10 - sum % 10) % 10;

        key == digits[BARCODE_DIGITS - 1]
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Barcode {
    fn from(code: i64) -> Self {
        Barcode(code)
    }
}

impl FromStr for Barcode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        text.parse::<i64>()
            .map(Barcode)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "barcode".to_string(),
                reason: format!("'{}' is not an integer", text),
            })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product known to the catalog.
///
/// Immutable once built: the catalog hands out clones, carts store clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    barcode: Barcode,
    price: Money,
    name: String,
}

impl Product {
    /// Creates a product.
    pub fn new(barcode: Barcode, price: Money, name: impl Into<String>) -> Self {
        Product {
            barcode,
            price,
            name: name.into(),
        }
    }

    /// Identity of the product.
    #[inline]
    pub fn barcode(&self) -> Barcode {
        self.barcode
    }

    /// Unit price.
    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Display name (may be empty).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the product's barcode passes the EAN-13 checksum.
    #[inline]
    pub fn has_valid_barcode(&self) -> bool {
        self.barcode.is_valid()
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.barcode == other.barcode
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.barcode.hash(state);
    }
}

impl PartialOrd for Product {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered by identity only, never by price or name.
impl Ord for Product {
    fn cmp(&self, other: &Self) -> Ordering {
        self.barcode.cmp(&other.barcode)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_checksum_known_values() {
        assert!(Barcode::new(130).is_valid());
        assert!(Barcode::new(123).is_valid());
        assert!(!Barcode::new(1232).is_valid());

        assert!(Barcode::new(5410188006711).is_valid());
        assert!(Barcode::new(8715700110622).is_valid());
        assert!(Barcode::new(45496420598).is_valid());
        assert!(!Barcode::new(3474377910730).is_valid());
    }

    #[test]
    fn test_checksum_range() {
        assert!(!Barcode::new(-1).is_valid());
        assert!(!Barcode::new(-5410188006711).is_valid());
        assert!(!Barcode::new(i64::MIN).is_valid());
        // 14 digits never fit
        assert!(!Barcode::new(10000000000000).is_valid());
        assert!(!Barcode::new(i64::MAX).is_valid());
        assert!(Barcode::new(9999999999994).is_valid());
        assert!(Barcode::new(0).is_valid());
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let code = Barcode::new(3017620402678);
        let first = code.is_valid();
        for _ in 0..10 {
            assert_eq!(code.is_valid(), first);
        }
    }

    #[test]
    fn test_barcode_parsing() {
        assert_eq!("5410188006711".parse::<Barcode>().unwrap(), Barcode::new(5410188006711));
        assert_eq!(" 1 ".parse::<Barcode>().unwrap(), Barcode::new(1));
        assert_eq!("-7".parse::<Barcode>().unwrap(), Barcode::new(-7));
        assert!("12a".parse::<Barcode>().is_err());
        assert!("".parse::<Barcode>().is_err());
    }

    #[test]
    fn test_product_identity_ignores_price_and_name() {
        let a = Product::new(Barcode::new(123), Money::from_cents(100), "A");
        let b = Product::new(Barcode::new(123), Money::from_cents(999), "B");
        let c = Product::new(Barcode::new(130), Money::from_cents(100), "A");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Product> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_product_ordering_follows_barcode() {
        let cheap_high = Product::new(Barcode::new(900), Money::from_cents(1), "z");
        let dear_low = Product::new(Barcode::new(100), Money::from_cents(9999), "a");
        assert!(dear_low < cheap_high);
    }

    #[test]
    fn test_product_serialization() {
        let product = Product::new(Barcode::new(123), Money::from_cents(215), "Juice");
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"barcode\":123"));
        assert!(json.contains("\"price\":215"));
    }
}
