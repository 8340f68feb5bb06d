//! # Product Catalog
//!
//! The barcode → product table.
//!
//! ## Atomic Loads
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Load Works                                     │
//! │                                                                         │
//! │  load("products.csv")                                                  │
//! │       │                                                                 │
//! │       ├── extension != .csv ──────────► SourceUnreadable                │
//! │       ├── read_to_string fails ───────► SourceUnreadable                │
//! │       ▼                                                                 │
//! │  staging table (empty)                                                 │
//! │       │                                                                 │
//! │       ├── line 1 ok ──► insert                                          │
//! │       ├── line 2 ok ──► insert (same barcode: replaces)                 │
//! │       ├── line 3 bad ─► MalformedRecord, staging dropped                │
//! │       ▼                                                                 │
//! │  swap staging into self (only if every line parsed)                    │
//! │                                                                         │
//! │  A failed load leaves the previous contents untouched.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use checkout_core::{Barcode, Product};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::record::parse_record;
use crate::CATALOG_EXTENSION;

/// Immutable-after-load product table.
///
/// ## Usage
/// ```rust,no_run
/// use checkout_catalog::Catalog;
///
/// let catalog = Catalog::from_path("fixtures/products.csv")?;
/// println!("{} products", catalog.size());
/// # Ok::<(), checkout_catalog::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<Barcode, Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Loads a catalog file into a fresh catalog.
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let mut catalog = Catalog::new();
        catalog.load(path)?;
        Ok(catalog)
    }

    /// Parses catalog text held in memory.
    pub fn parse(source: &str) -> CatalogResult<Self> {
        let mut catalog = Catalog::new();
        catalog.load_str(source)?;
        Ok(catalog)
    }

    /// Replaces the contents with the records of a `.csv` file.
    ///
    /// ## Errors
    /// - `SourceUnreadable`: wrong extension, missing or unreadable file
    /// - `MalformedRecord`: any line breaks the record rules
    ///
    /// On error the catalog keeps its previous contents.
    pub fn load(&mut self, path: impl AsRef<Path>) -> CatalogResult<()> {
        let path = path.as_ref();

        let has_csv_extension = path
            .extension()
            .is_some_and(|ext| ext == CATALOG_EXTENSION);
        if !has_csv_extension {
            warn!(?path, "Refusing catalog source without .csv extension");
            return Err(CatalogError::unreadable(path, "expected a .csv file"));
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            warn!(?path, error = %e, "Catalog source unreadable");
            CatalogError::unreadable(path, e.to_string())
        })?;

        self.load_str(&source)?;
        info!(?path, products = self.size(), "Catalog loaded");
        Ok(())
    }

    /// Replaces the contents with the records in `source`.
    ///
    /// Same rules and atomicity as [`Catalog::load`].
    pub fn load_str(&mut self, source: &str) -> CatalogResult<()> {
        let mut staging = BTreeMap::new();

        for (index, text) in source.lines().enumerate() {
            let line = index + 1;
            let product = parse_record(line, text).map_err(|e| {
                warn!(line, error = %e, "Rejecting catalog");
                e
            })?;

            if let Some(previous) = staging.insert(product.barcode(), product) {
                debug!(line, barcode = %previous.barcode(), "Duplicate barcode, keeping later record");
            }
        }

        self.products = staging;
        Ok(())
    }

    /// Looks up a product by barcode.
    pub fn lookup(&self, barcode: Barcode) -> CatalogResult<Product> {
        self.products
            .get(&barcode)
            .cloned()
            .ok_or(CatalogError::NotFound(barcode))
    }

    /// Whether a product exists under this barcode.
    pub fn contains(&self, barcode: Barcode) -> bool {
        self.products.contains_key(&barcode)
    }

    /// Number of loaded products.
    pub fn size(&self) -> usize {
        self.products.len()
    }

    /// Checks if the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in barcode order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::Money;

    const TWO_PRODUCTS: &str = "\
5410188006711,2.15,Tropicana Tonic Breakfast
8715700110622,0.96,Ketchup
";

    #[test]
    fn test_parse_two_records() {
        let catalog = Catalog::parse(TWO_PRODUCTS).unwrap();
        assert_eq!(catalog.size(), 2);

        let ketchup = catalog.lookup(Barcode::new(8715700110622)).unwrap();
        assert_eq!(ketchup.price(), Money::from_cents(96));
        assert_eq!(ketchup.name(), "Ketchup");
    }

    #[test]
    fn test_duplicates_keep_last() {
        let catalog = Catalog::parse(
            "3474377910731,1.00,First\n3474377910731,2.00,Second\n",
        )
        .unwrap();
        assert_eq!(catalog.size(), 1);
        assert_eq!(
            catalog.lookup(Barcode::new(3474377910731)).unwrap().name(),
            "Second"
        );
    }

    #[test]
    fn test_malformed_line_rejects_everything() {
        let err = Catalog::parse("5410188006711,2.15,Juice\n8715700110622,0.96\n").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_failed_reload_keeps_previous_contents() {
        let mut catalog = Catalog::parse(TWO_PRODUCTS).unwrap();
        assert!(catalog.load_str("garbage").is_err());
        assert_eq!(catalog.size(), 2);
    }

    #[test]
    fn test_empty_source() {
        let catalog = Catalog::parse("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_lookup_missing() {
        let catalog = Catalog::parse(TWO_PRODUCTS).unwrap();
        assert!(matches!(
            catalog.lookup(Barcode::new(1)),
            Err(CatalogError::NotFound(code)) if code == Barcode::new(1)
        ));
        assert!(!catalog.contains(Barcode::new(1)));
    }

    #[test]
    fn test_wrong_extension_is_unreadable() {
        let mut catalog = Catalog::new();
        let err = catalog.load("products.txt").unwrap_err();
        assert!(matches!(err, CatalogError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_iter_is_barcode_ordered() {
        let catalog = Catalog::parse(TWO_PRODUCTS).unwrap();
        let codes: Vec<i64> = catalog.iter().map(|p| p.barcode().value()).collect();
        assert_eq!(codes, vec![5410188006711, 8715700110622]);
    }
}
