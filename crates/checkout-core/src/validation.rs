//! # Validation Module
//!
//! Field validation for product records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Record Validation                          │
//! │                                                                         │
//! │  "5410188006711, 2.15, Tropicana, 10%"                                 │
//! │        │           │        │       │                                   │
//! │        ▼           ▼        ▼       ▼                                   │
//! │  Barcode::from_str Money  validate_ parse_discount                     │
//! │        │           │      product_  │                                   │
//! │        │           │      name      │                                   │
//! │        │           └────────┬───────┘                                   │
//! │        │                    ▼                                           │
//! │        │       apply_percentage_discount → validate_price              │
//! │        ▼                                                                │
//! │  validate_barcode (EAN-13 checksum)                                    │
//! │                                                                         │
//! │  Any failure rejects the whole catalog load.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use checkout_core::validation::{parse_discount, validate_product_name};
//!
//! assert_eq!(parse_discount("10%").unwrap(), 10);
//! assert!(validate_product_name("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Barcode;
use crate::MAX_UNIT_PRICE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product display name and returns it trimmed.
///
/// ## Rules
/// - Must not be blank once trimmed
pub fn validate_product_name(name: &str) -> ValidationResult<&str> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    Ok(name)
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (zero is allowed for free items)
/// - Must not exceed [`MAX_UNIT_PRICE`]
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE.major(),
        });
    }

    Ok(())
}

/// Validates that a barcode passes the EAN-13 checksum.
pub fn validate_barcode(barcode: Barcode) -> ValidationResult<()> {
    if !barcode.is_valid() {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: format!("{} fails the EAN-13 checksum", barcode),
        });
    }

    Ok(())
}

/// Parses a discount field such as `"10%"` into a whole percentage.
///
/// ## Rules
/// - Must end with `%`
/// - The prefix must be an integer
pub fn parse_discount(field: &str) -> ValidationResult<i64> {
    let field = field.trim();

    let percent = field
        .strip_suffix('%')
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "discount".to_string(),
            reason: format!("'{}' must end with '%'", field),
        })?;

    percent
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "discount".to_string(),
            reason: format!("'{}' is not a whole percentage", percent),
        })
}

/// Validates an audit sampling probability.
pub fn validate_probability(probability: f64) -> ValidationResult<()> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(ValidationError::OutOfRange {
            field: "audit_probability".to_string(),
            min: 0,
            max: 1,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name(" Ketchup ").unwrap(), "Ketchup");
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(215)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_price(MAX_UNIT_PRICE).is_ok());
        assert!(matches!(
            validate_price(MAX_UNIT_PRICE + Money::from_cents(1)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode(Barcode::new(5410188006711)).is_ok());
        assert!(validate_barcode(Barcode::new(5410188006712)).is_err());
    }

    #[test]
    fn test_parse_discount() {
        assert_eq!(parse_discount("5%").unwrap(), 5);
        assert_eq!(parse_discount(" 10% ").unwrap(), 10);
        assert_eq!(parse_discount("-10%").unwrap(), -10);

        assert!(parse_discount("10").is_err());
        assert!(parse_discount("%").is_err());
        assert!(parse_discount("ten%").is_err());
        assert!(parse_discount("").is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability(0.0).is_ok());
        assert!(validate_probability(0.1).is_ok());
        assert!(validate_probability(1.0).is_ok());
        assert!(validate_probability(1.5).is_err());
        assert!(validate_probability(-0.1).is_err());
        assert!(validate_probability(f64::NAN).is_err());
    }
}
