//! # Catalog Records
//!
//! One source line → one [`Product`].
//!
//! ## Record Format
//! ```text
//! identifier , price , name [, discount%]
//!
//! 5410188006711,2.15,Tropicana Tonic Breakfast
//! 45496420598,54.99,Jeu switch Minecraft,5%     → stored at 52.24
//! ```

use checkout_core::validation::{parse_discount, validate_barcode, validate_price, validate_product_name};
use checkout_core::{Barcode, Money, Product};

use crate::error::{CatalogError, CatalogResult};

/// Field separator of the source format.
pub const FIELD_SEPARATOR: char = ',';

/// Parses a single record. `line` is 1-based and only used for errors.
///
/// ## Rules
/// - 3 or 4 fields
/// - integer identifier passing the EAN-13 checksum
/// - decimal price, non-negative after the discount
/// - non-blank name
/// - optional fourth field `<integer>%`, applied as a floor-rounded discount
pub fn parse_record(line: usize, text: &str) -> CatalogResult<Product> {
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if fields.len() != 3 && fields.len() != 4 {
        return Err(CatalogError::malformed(
            line,
            format!("expected 3 or 4 fields, found {}", fields.len()),
        ));
    }

    let barcode: Barcode = fields[0]
        .parse()
        .map_err(|e| CatalogError::invalid_field(line, e))?;
    let mut price: Money = fields[1]
        .parse()
        .map_err(|e| CatalogError::invalid_field(line, e))?;
    let name = validate_product_name(fields[2]).map_err(|e| CatalogError::invalid_field(line, e))?;

    if let Some(discount) = fields.get(3) {
        let percent = parse_discount(discount).map_err(|e| CatalogError::invalid_field(line, e))?;
        price = price.apply_percentage_discount(percent);
    }

    validate_price(price).map_err(|e| CatalogError::invalid_field(line, e))?;
    validate_barcode(barcode).map_err(|e| CatalogError::invalid_field(line, e))?;

    Ok(Product::new(barcode, price, name))
}
