//! # Catalog Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / wrong extension ──► CatalogError::SourceUnreadable   │
//! │                                                                         │
//! │  ValidationError (checkout-core)  ──► CatalogError::MalformedRecord    │
//! │                                        (with the 1-based line number)   │
//! │                                                                         │
//! │  CatalogError ──► SessionError::CatalogUnavailable (checkout-session)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use checkout_core::{Barcode, ValidationError};
use thiserror::Error;

/// Catalog load and lookup errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source cannot be used at all.
    ///
    /// ## When This Occurs
    /// - Path does not end in `.csv`
    /// - File is missing or unreadable
    #[error("Catalog source {path} is unreadable: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// A line violates the record format; the whole load is rejected.
    #[error("Malformed catalog record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// No product under this barcode.
    #[error("Product not found: {0}")]
    NotFound(Barcode),
}

impl CatalogError {
    /// Creates a SourceUnreadable error.
    pub fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        CatalogError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Creates a MalformedRecord error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        CatalogError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Tags a field validation failure with its line number.
    pub fn invalid_field(line: usize, err: ValidationError) -> Self {
        CatalogError::malformed(line, err.to_string())
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
