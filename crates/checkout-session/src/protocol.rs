//! # Handoff Protocol
//!
//! The only point of contact between a scanner and a register.
//!
//! ## Message Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Scanner::handoff(&mut terminal)                                       │
//! │       │                                                                 │
//! │       │  HandoffManifest { cart, unrecognized, audit_passed }           │
//! │       │  (owned snapshot, nothing borrowed from the scanner)            │
//! │       ▼                                                                 │
//! │  Terminal::connect(&manifest) ──► ConnectReply                          │
//! │                                     ├── Accepted        (0)            │
//! │                                     ├── AuditRequested  (1)            │
//! │                                     └── Rejected       (−1)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HandoffOutcome::{Completed (0), AuditRequested (1)} or SessionError    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use checkout_core::{Barcode, Cart};
use serde::{Deserialize, Serialize};

/// Everything a register learns from a scanner during a handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffManifest {
    /// Id of the scanner that built the manifest.
    pub scanner_id: String,

    /// Snapshot of the scanner's cart.
    pub cart: Cart,

    /// Barcodes scanned while shopping that the catalog did not know.
    pub unrecognized: BTreeSet<Barcode>,

    /// True when the scanner has just completed an audit re-scan.
    pub audit_passed: bool,
}

impl HandoffManifest {
    /// Whether a cashier has to look at this cart before payment.
    pub fn needs_cashier(&self) -> bool {
        !self.unrecognized.is_empty() || self.cart.is_empty()
    }
}

/// A register's answer to a connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectReply {
    /// Cart taken over; the scanner is done.
    Accepted,
    /// The shopper must re-scan part of the cart first.
    AuditRequested,
    /// The register is busy.
    Rejected,
}

impl ConnectReply {
    /// Integer code used by recorded traces.
    pub fn code(&self) -> i32 {
        match self {
            ConnectReply::Accepted => 0,
            ConnectReply::AuditRequested => 1,
            ConnectReply::Rejected => -1,
        }
    }
}

/// Successful result of [`crate::Scanner::handoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandoffOutcome {
    /// The register accepted the cart; the scanner is locked again.
    Completed,
    /// The scanner entered its audit phase.
    AuditRequested,
}

impl HandoffOutcome {
    /// Integer code used by recorded traces.
    pub fn code(&self) -> i32 {
        match self {
            HandoffOutcome::Completed => 0,
            HandoffOutcome::AuditRequested => 1,
        }
    }
}

/// Anything a scanner can hand its cart to.
///
/// Implemented by [`crate::Register`]; tests implement it to script replies.
pub trait Terminal {
    /// Handles one connection attempt.
    fn connect(&mut self, manifest: &HandoffManifest) -> ConnectReply;
}
