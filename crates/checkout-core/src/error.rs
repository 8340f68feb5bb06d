//! # Error Types
//!
//! Field validation errors for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                      │
//! │  └── ValidationError  - Field validation failures                      │
//! │                                                                         │
//! │  checkout-catalog errors                                               │
//! │  └── CatalogError     - Unreadable source, malformed record            │
//! │                                                                         │
//! │  checkout-session errors                                               │
//! │  └── SessionError     - Wrong state, audit mismatch, ...               │
//! │                                                                         │
//! │  Flow: ValidationError → CatalogError → SessionError → ReplayError     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Field validation errors.
///
/// Raised while turning raw text (catalog records, trace parameters) into
/// domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value is not in the expected format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }
}
