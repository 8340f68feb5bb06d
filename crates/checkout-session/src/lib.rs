//! # checkout-session: Scanner and Register State Machines
//!
//! A handheld [`Scanner`] accumulates a shopper's cart and hands it off to a
//! [`Register`], which may demand an audit re-scan, lets a cashier correct
//! the cart, and settles payment.
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Handoff Protocol                                 │
//! │                                                                         │
//! │   Scanner                                  Register                     │
//! │   ───────                                  ────────                     │
//! │   unlock() → Shopping                      Idle                         │
//! │   scan() × n                                                            │
//! │   handoff() ───── HandoffManifest ───────► connect()                    │
//! │                                              │                          │
//! │                     ┌── AuditRequested ◄─────┤ policy draws "audit"     │
//! │   Auditing ◄────────┘                        │ (stays Idle)             │
//! │   scan() × min(n, 12)                        │                          │
//! │   AuditPassed                                │                          │
//! │   handoff() ───── HandoffManifest ───────► connect()                    │
//! │                                              │ audit_passed: no draw    │
//! │   Locked ◄──────── Accepted ◄────────────────┘                          │
//! │                                            AwaitingPayment              │
//! │                                            (or AwaitingCashier)         │
//! │                                            pay() → Idle                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scanner`] - The shopper's handheld device
//! - [`register`] - The checkout terminal
//! - [`protocol`] - Handoff manifest, replies and the [`Terminal`] seam
//! - [`audit`] - Injectable audit sampling policy
//! - [`config`] - TOML / environment configuration
//! - [`error`] - Session error types and protocol result codes
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use checkout_catalog::Catalog;
//! use checkout_core::{Barcode, Money};
//! use checkout_session::{FixedAudit, HandoffOutcome, Register, RegisterState, Scanner};
//!
//! let catalog = Arc::new(Catalog::parse("5410188006711,2.15,Juice\n").unwrap());
//! let mut scanner = Scanner::new(Arc::clone(&catalog));
//! let mut register = Register::new(catalog, Box::new(FixedAudit::never()));
//!
//! scanner.unlock().unwrap();
//! scanner.scan(Barcode::new(5410188006711)).unwrap();
//! assert_eq!(scanner.handoff(&mut register).unwrap(), HandoffOutcome::Completed);
//! assert_eq!(register.state(), RegisterState::AwaitingPayment);
//!
//! let outcome = register.pay(Money::from_cents(500));
//! assert_eq!(outcome.balance(), Money::from_cents(285));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod config;
pub mod error;
pub mod protocol;
pub mod register;
pub mod scanner;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{AuditPolicy, FixedAudit, RandomAudit, DEFAULT_AUDIT_PROBABILITY};
pub use config::{CatalogConfig, CheckoutConfig, RegisterConfig, ScannerConfig};
pub use error::{SessionError, SessionResult};
pub use protocol::{ConnectReply, HandoffManifest, HandoffOutcome, Terminal};
pub use register::{PaymentOutcome, Register, RegisterState, Settlement, WRONG_STATE_BALANCE};
pub use scanner::{Scanner, ScannerState};
