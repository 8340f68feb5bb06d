//! # checkout-catalog: Product Catalog
//!
//! Builds the immutable barcode → product table that both the scanner and
//! the register consult.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Load                                     │
//! │                                                                         │
//! │  products.csv                                                          │
//! │       │  (must end in .csv, must be readable)                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                checkout-catalog (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐          ┌───────────────────────────┐     │   │
//! │  │   │  record.rs    │ ───────► │       catalog.rs          │     │   │
//! │  │   │ parse_record  │ Product  │  staging table → install  │     │   │
//! │  │   │ (one line)    │          │  (all or nothing)         │     │   │
//! │  │   └───────────────┘          └───────────────────────────┘     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Catalog::lookup(barcode) → Product | NotFound                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`catalog`] - The product table and its load/lookup operations
//! - [`record`] - Parsing of a single source line
//! - [`error`] - Catalog error types
//!
//! ## Usage
//!
//! ```rust
//! use checkout_catalog::Catalog;
//! use checkout_core::Barcode;
//!
//! let catalog = Catalog::parse("5410188006711,2.15,Tropicana\n").unwrap();
//! let juice = catalog.lookup(Barcode::new(5410188006711)).unwrap();
//! assert_eq!(juice.price().cents(), 215);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod record;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::Catalog;
pub use error::{CatalogError, CatalogResult};

/// File extension a catalog source must carry.
pub const CATALOG_EXTENSION: &str = "csv";
