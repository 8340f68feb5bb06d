//! # Register
//!
//! The checkout terminal that receives carts from scanners, optionally
//! demands an audit, lets a cashier correct the cart and settles payment.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │        connect() draws "audit" ──┐                                      │
//! │                                  ▼                                      │
//! │   ┌────────────────────────── Idle ◄──────────────┐ pay() settled       │
//! │   │ connect() accepted           ▲                 │ abandon()           │
//! │   │                              │ close_session() │                     │
//! │   ├─► AwaitingCashier            │ (cart empty)    │                     │
//! │   │   (unknown items or          │                 │                     │
//! │   │    empty cart)               │                 │                     │
//! │   │        │ open_session()      │                 │                     │
//! │   │        ▼                     │                 │                     │
//! │   │   CashierAuthenticated ──────┘                 │                     │
//! │   │     scan_item() / remove_item()                │                     │
//! │   │        │ close_session() (cart non-empty)      │                     │
//! │   │        ▼                                       │                     │
//! │   └─► AwaitingPayment ─────────────────────────────┘                     │
//! │          │ open_session() → CashierAuthenticated                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment
//! Amounts are compared in integer cents. Tendering at least the total
//! settles the sale; anything less leaves the register waiting.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use checkout_catalog::Catalog;
use checkout_core::{Barcode, Cart, CartLine, Money};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::AuditPolicy;
use crate::config::RegisterConfig;
use crate::error::{SessionError, SessionResult};
use crate::protocol::{ConnectReply, HandoffManifest, Terminal};

/// Balance reported by [`PaymentOutcome::Rejected`] (−42.00).
pub const WRONG_STATE_BALANCE: Money = Money::from_cents(-4200);

// =============================================================================
// Register State
// =============================================================================

/// Lifecycle state of a [`Register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegisterState {
    /// No customer.
    #[default]
    Idle,
    /// A cart needs a cashier (unknown items, or nothing scanned).
    AwaitingCashier,
    /// A cart is ready to be paid.
    AwaitingPayment,
    /// A cashier is editing the cart.
    CashierAuthenticated,
}

impl fmt::Display for RegisterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterState::Idle => write!(f, "Idle"),
            RegisterState::AwaitingCashier => write!(f, "AwaitingCashier"),
            RegisterState::AwaitingPayment => write!(f, "AwaitingPayment"),
            RegisterState::CashierAuthenticated => write!(f, "CashierAuthenticated"),
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Record of a completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub register_id: String,
    pub total: Money,
    pub tendered: Money,
    pub change: Money,
    pub lines: Vec<CartLine>,
    pub settled_at: DateTime<Utc>,
}

/// Result of [`Register::pay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Sale completed; the register is idle again.
    Settled(Settlement),
    /// Not enough money; nothing changed.
    Insufficient { shortfall: Money },
    /// `pay` was called outside `AwaitingPayment`.
    Rejected { state: RegisterState },
}

impl PaymentOutcome {
    /// Single signed amount for the outcome.
    ///
    /// ```text
    /// Settled       → change (≥ 0)
    /// Insufficient  → −shortfall
    /// Rejected      → WRONG_STATE_BALANCE
    /// ```
    pub fn balance(&self) -> Money {
        match self {
            PaymentOutcome::Settled(settlement) => settlement.change,
            PaymentOutcome::Insufficient { shortfall } => -*shortfall,
            PaymentOutcome::Rejected { .. } => WRONG_STATE_BALANCE,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentOutcome::Settled(_))
    }
}

// =============================================================================
// Register
// =============================================================================

/// A checkout register.
#[derive(Debug)]
pub struct Register {
    id: String,
    catalog: Arc<Catalog>,
    state: RegisterState,
    cart: Cart,
    policy: Box<dyn AuditPolicy>,
    last_settlement: Option<Settlement>,
}

impl Register {
    /// Creates an idle register with a generated id.
    pub fn new(catalog: Arc<Catalog>, policy: Box<dyn AuditPolicy>) -> Self {
        Register {
            id: Uuid::new_v4().to_string(),
            catalog,
            state: RegisterState::Idle,
            cart: Cart::new(),
            policy,
            last_settlement: None,
        }
    }

    /// Creates a register whose id and audit policy come from configuration.
    pub fn from_config(catalog: Arc<Catalog>, config: &RegisterConfig) -> Self {
        let mut register = Register::new(catalog, config.audit_policy());
        register.id = config.id.clone();
        register
    }

    /// Creates a register with its own catalog loaded from `path`.
    ///
    /// Fails with [`SessionError::CatalogUnavailable`] if the catalog does
    /// not load.
    pub fn open(path: impl AsRef<Path>, config: &RegisterConfig) -> SessionResult<Self> {
        let catalog = Catalog::from_path(path)?;
        Ok(Register::from_config(Arc::new(catalog), config))
    }

    /// Replaces the audit policy.
    pub fn set_audit_policy(&mut self, policy: Box<dyn AuditPolicy>) {
        self.policy = policy;
    }

    // =========================================================================
    // Handoff
    // =========================================================================

    /// Handles a scanner's connection attempt.
    pub fn connect(&mut self, manifest: &HandoffManifest) -> ConnectReply {
        if self.state != RegisterState::Idle {
            warn!(register = %self.id, scanner = %manifest.scanner_id, state = %self.state, "Connection rejected");
            return ConnectReply::Rejected;
        }

        if !manifest.audit_passed && !manifest.cart.is_empty() && self.policy.should_audit() {
            info!(register = %self.id, scanner = %manifest.scanner_id, "Audit requested");
            return ConnectReply::AuditRequested;
        }

        self.cart = manifest.cart.clone();
        let next = if manifest.needs_cashier() {
            RegisterState::AwaitingCashier
        } else {
            RegisterState::AwaitingPayment
        };
        info!(
            register = %self.id,
            scanner = %manifest.scanner_id,
            items = self.cart.total_quantity(),
            unrecognized = manifest.unrecognized.len(),
            "Cart accepted"
        );
        self.transition(next);
        ConnectReply::Accepted
    }

    // =========================================================================
    // Cashier Session
    // =========================================================================

    /// Authenticates a cashier.
    pub fn open_session(&mut self) -> SessionResult<()> {
        match self.state {
            RegisterState::AwaitingCashier | RegisterState::AwaitingPayment => {
                self.transition(RegisterState::CashierAuthenticated);
                Ok(())
            }
            state => Err(SessionError::wrong_state("open_session", state)),
        }
    }

    /// Ends the cashier session.
    pub fn close_session(&mut self) -> SessionResult<()> {
        self.require(RegisterState::CashierAuthenticated, "close_session")?;
        if self.cart.is_empty() {
            self.transition(RegisterState::Idle);
        } else {
            self.transition(RegisterState::AwaitingPayment);
        }
        Ok(())
    }

    /// Adds one unit of an item on the cashier's behalf.
    pub fn scan_item(&mut self, barcode: Barcode) -> SessionResult<()> {
        self.require(RegisterState::CashierAuthenticated, "scan_item")?;
        let product = self
            .catalog
            .lookup(barcode)
            .map_err(|_| SessionError::Unrecognized(barcode))?;
        let quantity = self.cart.add(product);
        debug!(register = %self.id, %barcode, quantity, "Cashier added item");
        Ok(())
    }

    /// Removes one unit of an item on the cashier's behalf.
    pub fn remove_item(&mut self, barcode: Barcode) -> SessionResult<()> {
        self.require(RegisterState::CashierAuthenticated, "remove_item")?;
        let remaining = self
            .cart
            .remove_one(barcode)
            .ok_or(SessionError::NotInCart(barcode))?;
        debug!(register = %self.id, %barcode, remaining, "Cashier removed item");
        Ok(())
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Takes payment for the current cart.
    pub fn pay(&mut self, tendered: Money) -> PaymentOutcome {
        if self.state != RegisterState::AwaitingPayment {
            warn!(register = %self.id, state = %self.state, %tendered, "Payment outside AwaitingPayment");
            return PaymentOutcome::Rejected { state: self.state };
        }

        let total = self.cart.total();
        if tendered < total {
            let shortfall = total - tendered;
            debug!(register = %self.id, %total, %tendered, %shortfall, "Insufficient payment");
            return PaymentOutcome::Insufficient { shortfall };
        }

        let settlement = Settlement {
            id: Uuid::new_v4(),
            register_id: self.id.clone(),
            total,
            tendered,
            change: tendered - total,
            lines: self.cart.lines().cloned().collect(),
            settled_at: Utc::now(),
        };
        info!(
            register = %self.id,
            settlement = %settlement.id,
            %total,
            change = %settlement.change,
            "Sale settled"
        );

        self.cart.clear();
        self.transition(RegisterState::Idle);
        self.last_settlement = Some(settlement.clone());
        PaymentOutcome::Settled(settlement)
    }

    /// Drops the current cart and returns to `Idle`, from any state.
    pub fn abandon(&mut self) {
        self.cart.clear();
        self.transition(RegisterState::Idle);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Register identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state.
    pub fn state(&self) -> RegisterState {
        self.state
    }

    /// The authoritative cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Quantity of an item in the cart, 0 if absent.
    pub fn quantity(&self, barcode: Barcode) -> u32 {
        self.cart.quantity(barcode)
    }

    /// Amount due for the current cart.
    pub fn total(&self) -> Money {
        self.cart.total()
    }

    /// Most recent completed sale.
    pub fn last_settlement(&self) -> Option<&Settlement> {
        self.last_settlement.as_ref()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require(&self, expected: RegisterState, operation: &'static str) -> SessionResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::wrong_state(operation, self.state))
        }
    }

    fn transition(&mut self, next: RegisterState) {
        if self.state != next {
            debug!(register = %self.id, from = %self.state, to = %next, "Register state change");
            self.state = next;
        }
    }
}

impl Terminal for Register {
    fn connect(&mut self, manifest: &HandoffManifest) -> ConnectReply {
        Register::connect(self, manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::FixedAudit;
    use checkout_core::Product;
    use std::collections::BTreeSet;

    const JUICE: i64 = 5410188006711;
    const WATER: i64 = 8715700110622;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::parse("5410188006711,2.15,Juice\n8715700110622,0.96,Water\n").unwrap())
    }

    fn register(policy: FixedAudit) -> Register {
        Register::new(catalog(), Box::new(policy))
    }

    fn manifest(items: &[(i64, i64)], unrecognized: &[i64], audit_passed: bool) -> HandoffManifest {
        let mut cart = Cart::new();
        for &(barcode, cents) in items {
            cart.add(Product::new(Barcode::new(barcode), Money::from_cents(cents), "item"));
        }
        HandoffManifest {
            scanner_id: "scanner-test".into(),
            cart,
            unrecognized: unrecognized.iter().copied().map(Barcode::new).collect::<BTreeSet<_>>(),
            audit_passed,
        }
    }

    fn awaiting_payment() -> Register {
        let mut register = register(FixedAudit::never());
        let reply = register.connect(&manifest(&[(JUICE, 215), (JUICE, 215)], &[], false));
        assert_eq!(reply, ConnectReply::Accepted);
        register
    }

    #[test]
    fn test_pay_on_huge_total_does_not_overflow() {
        let huge = i64::MAX / 2 + 1;
        let mut register = register(FixedAudit::never());
        register.connect(&manifest(&[(130, huge), (130, huge)], &[], false));
        assert_eq!(register.total(), Money::from_cents(i64::MAX));

        let outcome = register.pay(Money::from_cents(1));
        assert_eq!(outcome.balance(), Money::from_cents(1 - i64::MAX));
        assert_eq!(register.state(), RegisterState::AwaitingPayment);
    }

    #[test]
    fn test_connect_routes_by_cart() {
        let mut register = register(FixedAudit::never());
        assert_eq!(register.connect(&manifest(&[], &[], false)), ConnectReply::Accepted);
        assert_eq!(register.state(), RegisterState::AwaitingCashier);

        let mut register = register_with_unknown();
        assert_eq!(register.state(), RegisterState::AwaitingCashier);
        assert_eq!(register.quantity(Barcode::new(JUICE)), 1);

        register.abandon();
        assert!(register.cart().is_empty());
        assert_eq!(register.state(), RegisterState::Idle);
    }

    fn register_with_unknown() -> Register {
        let mut register = register(FixedAudit::never());
        register.connect(&manifest(&[(JUICE, 215)], &[4006381333931], false));
        register
    }

    #[test]
    fn test_busy_register_rejects() {
        let mut register = awaiting_payment();
        assert_eq!(register.connect(&manifest(&[(WATER, 96)], &[], false)), ConnectReply::Rejected);
        assert_eq!(register.quantity(Barcode::new(JUICE)), 2);
        assert_eq!(register.quantity(Barcode::new(WATER)), 0);
    }

    #[test]
    fn test_audit_request_mutates_nothing() {
        let mut register = register(FixedAudit::always());
        let reply = register.connect(&manifest(&[(JUICE, 215)], &[], false));
        assert_eq!(reply, ConnectReply::AuditRequested);
        assert_eq!(register.state(), RegisterState::Idle);
        assert!(register.cart().is_empty());
    }

    #[test]
    fn test_audit_skipped_when_passed_or_empty() {
        let mut register = register(FixedAudit::always());
        assert_eq!(register.connect(&manifest(&[(JUICE, 215)], &[], true)), ConnectReply::Accepted);

        let mut register = Register::new(catalog(), Box::new(FixedAudit::always()));
        assert_eq!(register.connect(&manifest(&[], &[], false)), ConnectReply::Accepted);
    }

    #[test]
    fn test_cashier_session() {
        let mut register = awaiting_payment();
        assert!(register.scan_item(Barcode::new(WATER)).is_err());

        register.open_session().unwrap();
        assert!(register.open_session().is_err());
        register.scan_item(Barcode::new(WATER)).unwrap();
        assert_eq!(register.scan_item(Barcode::new(4006381333931)).unwrap_err().code(), -2);
        register.remove_item(Barcode::new(JUICE)).unwrap();
        assert_eq!(register.remove_item(Barcode::new(3017620402678)).unwrap_err().code(), -2);
        assert_eq!(register.total(), Money::from_cents(215 + 96));

        register.close_session().unwrap();
        assert_eq!(register.state(), RegisterState::AwaitingPayment);
        assert!(register.close_session().is_err());
    }

    #[test]
    fn test_close_session_with_empty_cart_goes_idle() {
        let mut register = awaiting_payment();
        register.open_session().unwrap();
        register.remove_item(Barcode::new(JUICE)).unwrap();
        register.remove_item(Barcode::new(JUICE)).unwrap();
        register.close_session().unwrap();
        assert_eq!(register.state(), RegisterState::Idle);
    }

    #[test]
    fn test_pay() {
        let mut register = awaiting_payment();

        let outcome = register.pay(Money::from_cents(400));
        assert_eq!(outcome, PaymentOutcome::Insufficient { shortfall: Money::from_cents(30) });
        assert_eq!(outcome.balance(), Money::from_cents(-30));
        assert_eq!(register.state(), RegisterState::AwaitingPayment);

        let outcome = register.pay(Money::from_cents(1000));
        assert_eq!(outcome.balance(), Money::from_cents(570));
        assert!(outcome.is_settled());
        assert_eq!(register.state(), RegisterState::Idle);
        assert!(register.cart().is_empty());

        let settlement = register.last_settlement().unwrap();
        assert_eq!(settlement.total, Money::from_cents(430));
        assert_eq!(settlement.lines.len(), 1);
        assert_eq!(settlement.register_id, register.id());
    }

    #[test]
    fn test_pay_exact_amount() {
        let mut register = awaiting_payment();
        let outcome = register.pay(Money::from_cents(430));
        assert!(outcome.is_settled());
        assert_eq!(outcome.balance(), Money::zero());
    }

    #[test]
    fn test_pay_wrong_state() {
        let mut register = register(FixedAudit::never());
        let outcome = register.pay(Money::from_cents(10_000));
        assert_eq!(outcome, PaymentOutcome::Rejected { state: RegisterState::Idle });
        assert!(outcome.balance().is_negative());
        assert!(register.last_settlement().is_none());

        let mut register = awaiting_payment();
        register.open_session().unwrap();
        assert!(matches!(register.pay(Money::from_cents(430)), PaymentOutcome::Rejected { .. }));
        assert_eq!(register.quantity(Barcode::new(JUICE)), 2);
    }

    #[test]
    fn test_from_config() {
        let config = RegisterConfig {
            id: "register-9".into(),
            audit_probability: 1.0,
            audit_seed: Some(3),
        };
        let mut register = Register::from_config(catalog(), &config);
        assert_eq!(register.id(), "register-9");
        assert_eq!(register.connect(&manifest(&[(JUICE, 215)], &[], false)), ConnectReply::AuditRequested);

        register.set_audit_policy(Box::new(FixedAudit::never()));
        assert_eq!(register.connect(&manifest(&[(JUICE, 215)], &[], false)), ConnectReply::Accepted);
    }
}
