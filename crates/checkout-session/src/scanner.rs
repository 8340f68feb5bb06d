//! # Scanner
//!
//! The handheld device a shopper carries through the store.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            unlock()                                                     │
//! │  Locked ─────────────► Shopping ◄──┐ scan() / remove()                 │
//! │    ▲                      │  └─────┘                                    │
//! │    │                      │ handoff() → AuditRequested                  │
//! │    │                      ▼                                             │
//! │    │                  Auditing ◄──┐ scan() (budget > 0)                 │
//! │    │                   │     └────┘                                     │
//! │    │        budget = 0 │     │ unknown item / over-scan                 │
//! │    │                   ▼     ▼                                          │
//! │    │         AuditPassed     AuditFailed                                │
//! │    │              │              │                                      │
//! │    └──────────────┘              │                                      │
//! │    handoff() → Accepted          │                                      │
//! │    (also from Shopping)          │                                      │
//! │                                  │                                      │
//! │  abandon() from anywhere ────────┴──────────────────────────► Locked    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls made from a state that does not accept them return
//! [`SessionError::WrongState`] and change nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use checkout_catalog::Catalog;
use checkout_core::{Barcode, Cart, Product, MAX_AUDIT_ITEMS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ScannerConfig;
use crate::error::{SessionError, SessionResult};
use crate::protocol::{ConnectReply, HandoffManifest, HandoffOutcome, Terminal};

// =============================================================================
// Scanner State
// =============================================================================

/// Lifecycle state of a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScannerState {
    /// Waiting for a shopper.
    #[default]
    Locked,
    /// Accumulating the cart.
    Shopping,
    /// Re-scanning items at the register's request.
    Auditing,
    /// Audit completed; ready for a second handoff.
    AuditPassed,
    /// Audit failed; only `abandon` leaves this state.
    AuditFailed,
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerState::Locked => write!(f, "Locked"),
            ScannerState::Shopping => write!(f, "Shopping"),
            ScannerState::Auditing => write!(f, "Auditing"),
            ScannerState::AuditPassed => write!(f, "AuditPassed"),
            ScannerState::AuditFailed => write!(f, "AuditFailed"),
        }
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// A shopper's handheld scanner.
#[derive(Debug)]
pub struct Scanner {
    id: String,
    catalog: Arc<Catalog>,
    state: ScannerState,
    cart: Cart,
    unrecognized: BTreeSet<Barcode>,
    audit_tally: BTreeMap<Barcode, u32>,
    audit_remaining: u32,
}

impl Scanner {
    /// Creates a locked scanner with a generated id.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Scanner::with_id(Uuid::new_v4().to_string(), catalog)
    }

    /// Creates a locked scanner with the given id.
    pub fn with_id(id: impl Into<String>, catalog: Arc<Catalog>) -> Self {
        Scanner {
            id: id.into(),
            catalog,
            state: ScannerState::Locked,
            cart: Cart::new(),
            unrecognized: BTreeSet::new(),
            audit_tally: BTreeMap::new(),
            audit_remaining: 0,
        }
    }

    /// Creates a scanner with its own catalog loaded from `path`.
    ///
    /// Fails with [`SessionError::CatalogUnavailable`] if the catalog does
    /// not load.
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let catalog = Catalog::from_path(path)?;
        Ok(Scanner::new(Arc::new(catalog)))
    }

    /// Creates a locked scanner named by `config`.
    pub fn from_config(catalog: Arc<Catalog>, config: &ScannerConfig) -> Self {
        Scanner::with_id(config.id.clone(), catalog)
    }

    // =========================================================================
    // Shopping
    // =========================================================================

    /// Starts a new shopping session.
    pub fn unlock(&mut self) -> SessionResult<()> {
        self.require(ScannerState::Locked, "unlock")?;
        self.clear();
        self.transition(ScannerState::Shopping);
        Ok(())
    }

    /// Scans one item.
    ///
    /// While shopping, a known barcode adds one unit to the cart and an
    /// unknown one is remembered and reported as
    /// [`SessionError::Unrecognized`]. While auditing, the scan is checked
    /// against the cart.
    pub fn scan(&mut self, barcode: Barcode) -> SessionResult<()> {
        match self.state {
            ScannerState::Shopping => self.scan_for_cart(barcode),
            ScannerState::Auditing => self.scan_for_audit(barcode),
            state => Err(SessionError::wrong_state("scan", state)),
        }
    }

    fn scan_for_cart(&mut self, barcode: Barcode) -> SessionResult<()> {
        match self.catalog.lookup(barcode) {
            Ok(product) => {
                let quantity = self.cart.add(product);
                debug!(scanner = %self.id, %barcode, quantity, "Item scanned");
                Ok(())
            }
            Err(_) => {
                self.unrecognized.insert(barcode);
                debug!(scanner = %self.id, %barcode, "Unrecognized item scanned");
                Err(SessionError::Unrecognized(barcode))
            }
        }
    }

    fn scan_for_audit(&mut self, barcode: Barcode) -> SessionResult<()> {
        let tally = self.audit_tally.entry(barcode).or_insert(0);
        *tally += 1;

        if *tally > self.cart.quantity(barcode) {
            warn!(scanner = %self.id, %barcode, "Audit mismatch");
            self.transition(ScannerState::AuditFailed);
            return Err(SessionError::AuditMismatch(barcode));
        }

        self.audit_remaining = self.audit_remaining.saturating_sub(1);
        if self.audit_remaining == 0 {
            self.transition(ScannerState::AuditPassed);
        }
        Ok(())
    }

    /// Removes one unit of an item from the cart.
    pub fn remove(&mut self, barcode: Barcode) -> SessionResult<()> {
        self.require(ScannerState::Shopping, "remove")?;
        match self.cart.remove_one(barcode) {
            Some(remaining) => {
                debug!(scanner = %self.id, %barcode, remaining, "Item removed");
                Ok(())
            }
            None => Err(SessionError::NotInCart(barcode)),
        }
    }

    /// Discards the session and locks the scanner, from any state.
    pub fn abandon(&mut self) {
        self.clear();
        self.transition(ScannerState::Locked);
    }

    // =========================================================================
    // Handoff
    // =========================================================================

    /// Hands the cart to a register.
    ///
    /// Allowed from `Shopping` and `AuditPassed`. An `Accepted` reply locks
    /// the scanner; an `AuditRequested` reply while shopping starts the
    /// audit. Any other reply is an error and leaves the scanner as it was.
    pub fn handoff<T>(&mut self, terminal: &mut T) -> SessionResult<HandoffOutcome>
    where
        T: Terminal + ?Sized,
    {
        if !matches!(self.state, ScannerState::Shopping | ScannerState::AuditPassed) {
            return Err(SessionError::wrong_state("handoff", self.state));
        }

        let manifest = self.manifest();
        let reply = terminal.connect(&manifest);

        match (reply, self.state) {
            (ConnectReply::Accepted, _) => {
                info!(
                    scanner = %self.id,
                    items = self.cart.total_quantity(),
                    total = %self.cart.total(),
                    "Cart handed off"
                );
                self.clear();
                self.transition(ScannerState::Locked);
                Ok(HandoffOutcome::Completed)
            }
            (ConnectReply::AuditRequested, ScannerState::Shopping) => {
                self.begin_audit();
                Ok(HandoffOutcome::AuditRequested)
            }
            (reply, state) => {
                warn!(scanner = %self.id, ?reply, %state, "Handoff refused");
                Err(SessionError::HandoffRefused {
                    reply,
                    state: state.to_string(),
                })
            }
        }
    }

    /// Builds the snapshot sent to a register.
    pub fn manifest(&self) -> HandoffManifest {
        HandoffManifest {
            scanner_id: self.id.clone(),
            cart: self.cart.clone(),
            unrecognized: self.unrecognized.clone(),
            audit_passed: self.audit_passed(),
        }
    }

    fn begin_audit(&mut self) {
        self.audit_tally.clear();
        self.audit_remaining = self.cart.total_quantity().min(MAX_AUDIT_ITEMS);
        info!(scanner = %self.id, budget = self.audit_remaining, "Audit requested");

        if self.audit_remaining == 0 {
            self.transition(ScannerState::AuditPassed);
        } else {
            self.transition(ScannerState::Auditing);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Scanner identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state.
    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Quantity of an item in the cart, 0 if absent.
    pub fn quantity(&self, barcode: Barcode) -> u32 {
        self.cart.quantity(barcode)
    }

    /// Snapshot of the distinct products in the cart.
    pub fn cart(&self) -> BTreeSet<Product> {
        self.cart.products()
    }

    /// Snapshot of the unrecognized barcodes scanned this session.
    pub fn unrecognized(&self) -> BTreeSet<Barcode> {
        self.unrecognized.clone()
    }

    /// Re-scans still expected in the current audit.
    pub fn audit_remaining(&self) -> u32 {
        self.audit_remaining
    }

    /// True exactly when the scanner is in `AuditPassed`.
    pub fn audit_passed(&self) -> bool {
        self.state == ScannerState::AuditPassed
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require(&self, expected: ScannerState, operation: &'static str) -> SessionResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::wrong_state(operation, self.state))
        }
    }

    fn transition(&mut self, next: ScannerState) {
        if self.state != next {
            debug!(scanner = %self.id, from = %self.state, to = %next, "Scanner state change");
            self.state = next;
        }
    }

    fn clear(&mut self) {
        self.cart.clear();
        self.unrecognized.clear();
        self.audit_tally.clear();
        self.audit_remaining = 0;
    }
}
