//! # Cart
//!
//! The product → quantity mapping carried by the scanner and, after a
//! successful handoff, owned by the register.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Scanner / Register        Cart method          Effect                  │
//! │  ──────────────────        ───────────          ──────                  │
//! │                                                                         │
//! │  scan (hit) ─────────────► add() ─────────────► qty += 1 (or insert)    │
//! │                                                                         │
//! │  remove ─────────────────► remove_one() ──────► qty -= 1 (drop at 0)    │
//! │                                                                         │
//! │  handoff ────────────────► clone() ───────────► independent snapshot    │
//! │                                                                         │
//! │  pay ────────────────────► total() ───────────► Σ price × qty           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::money::Money;
use crate::types::{Barcode, Product};

/// One product and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product snapshot taken when the first unit was added.
    pub product: Product,

    /// Always ≥ 1; a line reaching zero is removed.
    pub quantity: u32,
}

impl CartLine {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price() * self.quantity
    }
}

/// A shopping cart.
///
/// ## Invariants
/// - Lines are unique by barcode (adding the same product increases quantity)
/// - Quantity is never zero: removing the last unit removes the line
/// - A clone is a fully independent snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<Barcode, CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of `product`, returning the new quantity.
    pub fn add(&mut self, product: Product) -> u32 {
        let line = self
            .lines
            .entry(product.barcode())
            .or_insert(CartLine { product, quantity: 0 });
        line.quantity += 1;
        line.quantity
    }

    /// Removes one unit of the product with this barcode.
    ///
    /// Returns the remaining quantity, or `None` if the product was not in
    /// the cart.
    pub fn remove_one(&mut self, barcode: Barcode) -> Option<u32> {
        let line = self.lines.get_mut(&barcode)?;
        line.quantity -= 1;
        let remaining = line.quantity;
        if remaining == 0 {
            self.lines.remove(&barcode);
        }
        Some(remaining)
    }

    /// Quantity of a product, 0 if absent.
    pub fn quantity(&self, barcode: Barcode) -> u32 {
        self.lines.get(&barcode).map_or(0, |line| line.quantity)
    }

    /// Whether the cart holds at least one unit of this barcode.
    pub fn contains(&self, barcode: Barcode) -> bool {
        self.lines.contains_key(&barcode)
    }

    /// Total number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Σ unit price × quantity.
    pub fn total(&self) -> Money {
        self.lines.values().map(CartLine::line_total).sum()
    }

    /// Snapshot of the distinct products in the cart.
    pub fn products(&self) -> BTreeSet<Product> {
        self.lines.values().map(|line| line.product.clone()).collect()
    }

    /// Lines in barcode order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn juice() -> Product {
        Product::new(Barcode::new(5410188006711), Money::from_cents(215), "Tropicana")
    }

    fn ketchup() -> Product {
        Product::new(Barcode::new(8715700110622), Money::from_cents(96), "Ketchup")
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(juice()), 1);
        assert_eq!(cart.add(juice()), 2);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity(juice().barcode()), 2);
    }

    #[test]
    fn test_remove_drops_line_at_zero() {
        let mut cart = Cart::new();
        cart.add(juice());
        cart.add(juice());

        assert_eq!(cart.remove_one(juice().barcode()), Some(1));
        assert_eq!(cart.remove_one(juice().barcode()), Some(0));
        assert!(cart.is_empty());
        assert_eq!(cart.quantity(juice().barcode()), 0);
        assert_eq!(cart.remove_one(juice().barcode()), None);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add(juice());
        }
        cart.add(ketchup());
        cart.add(ketchup());

        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.total(), Money::from_cents(837));
    }

    #[test]
    fn test_clone_is_independent_snapshot() {
        let mut original = Cart::new();
        original.add(juice());

        let mut snapshot = original.clone();
        snapshot.add(ketchup());
        original.clear();

        assert!(original.is_empty());
        assert_eq!(snapshot.total_quantity(), 2);
    }

    #[test]
    fn test_products_snapshot() {
        let mut cart = Cart::new();
        cart.add(ketchup());
        cart.add(juice());
        cart.add(juice());

        let mut products = cart.products();
        assert_eq!(products.len(), 2);

        products.clear();
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::new();
        assert!(cart.total().is_zero());
        assert_eq!(cart.total_quantity(), 0);
    }
}
