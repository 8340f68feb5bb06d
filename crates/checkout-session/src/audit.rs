//! # Audit Sampling
//!
//! Decides whether a register asks a scanner for an audit re-scan. This is
//! the only source of nondeterminism in the system, so it sits behind a
//! trait that tests and trace replay can replace.
//!
//! ## Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RandomAudit (production)      │  FixedAudit (tests, replay)            │
//! │  ─────────────────────────     │  ──────────────────────────            │
//! │  draw in [0, 1) < probability  │  always() → every draw audits          │
//! │  default probability 0.10      │  never()  → no draw audits             │
//! │  optional seed (reproducible)  │                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The register only consults its policy when the cart is non-empty and the
//! scanner has not just passed an audit.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Probability of an audit when nothing is configured.
pub const DEFAULT_AUDIT_PROBABILITY: f64 = 0.1;

/// Decides, one connection at a time, whether to demand an audit.
pub trait AuditPolicy: fmt::Debug {
    /// Draws once. `true` means "request an audit".
    fn should_audit(&mut self) -> bool;
}

/// Bernoulli draw backed by `rand`.
#[derive(Debug, Clone)]
pub struct RandomAudit {
    probability: f64,
    rng: StdRng,
}

impl RandomAudit {
    /// Creates a policy seeded from OS entropy.
    pub fn new(probability: f64) -> Self {
        RandomAudit {
            probability,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible policy.
    pub fn seeded(probability: f64, seed: u64) -> Self {
        RandomAudit {
            probability,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Configured probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomAudit {
    fn default() -> Self {
        RandomAudit::new(DEFAULT_AUDIT_PROBABILITY)
    }
}

impl AuditPolicy for RandomAudit {
    fn should_audit(&mut self) -> bool {
        self.rng.gen::<f64>() < self.probability
    }
}

/// Deterministic policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAudit {
    audit: bool,
}

impl FixedAudit {
    /// Every draw requests an audit.
    pub const fn always() -> Self {
        FixedAudit { audit: true }
    }

    /// No draw requests an audit.
    pub const fn never() -> Self {
        FixedAudit { audit: false }
    }
}

impl AuditPolicy for FixedAudit {
    fn should_audit(&mut self) -> bool {
        self.audit
    }
}
