//! # checkout-core: Pure Business Logic for the Self-Checkout System
//!
//! This crate is the shared vocabulary of the workspace. It holds the domain
//! types that both the handheld scanner and the register agree on, as pure
//! values with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/replay (trace replay tool)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          checkout-session: Scanner ⇄ Register protocol          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              checkout-catalog: CSV product table                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ checkout-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Barcode  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │  Product  │  │  parsing  │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO RANDOMNESS • PURE FUNCTIONS                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Barcode (with EAN-13 checksum) and Product
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Product → quantity cart shared by scanner and register
//! - [`error`] - Validation error type
//! - [`validation`] - Field validation used by the catalog loader
//!
//! ## Example Usage
//!
//! ```rust
//! use checkout_core::{Barcode, Cart, Money, Product};
//!
//! let juice = Product::new(Barcode::new(5410188006711), Money::from_cents(215), "Juice");
//! let mut cart = Cart::new();
//! cart.add(juice.clone());
//! cart.add(juice);
//!
//! assert_eq!(cart.quantity(Barcode::new(5410188006711)), 2);
//! assert_eq!(cart.total(), Money::from_cents(430));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::ValidationError;
pub use money::{Money, Rounding};
pub use types::{Barcode, Product};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of items a shopper is asked to re-scan during an audit.
///
/// ## Business Reason
/// An audit is a spot check, not a full re-scan. Large carts are sampled
/// up to this many items; smaller carts are re-scanned entirely.
pub const MAX_AUDIT_ITEMS: u32 = 12;

/// Highest unit price a catalog accepts (1,000,000.00).
///
/// ## Business Reason
/// Nothing in a self-checkout costs more. The cap also keeps every cart
/// total far inside the range of [`Money`].
pub const MAX_UNIT_PRICE: Money = Money::from_cents(100_000_000);

/// Number of digits in a barcode once zero-padded (EAN-13).
pub const BARCODE_DIGITS: usize = 13;
