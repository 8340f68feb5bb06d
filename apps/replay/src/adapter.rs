//! # Replay Adapter
//!
//! Drives named scanners and registers from trace events and checks each
//! result against the recording.
//!
//! ## Event Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation     Object     Call                         Compared as      │
//! │  ─────────     ──────     ────                         ───────────      │
//! │  unlock        scanner    unlock()                     code             │
//! │  scan          scanner    scan(param)                  code             │
//! │  handoff       scanner    handoff(register = param)    code             │
//! │  openSession   register   open_session()               code             │
//! │  closeSession  register   close_session()              code             │
//! │  addItem       register   scan_item(param)             code             │
//! │  pay           register   pay(param)                   balance ± 0.01   │
//! │  remove        either     remove / remove_item(param)  code             │
//! │  abandon       either     abandon()                    not compared     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Objects are created on first use. Before every handoff the addressed
//! register's audit policy is fixed from the recorded result (1 → always
//! audit, anything else → never), so recordings replay deterministically.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use checkout_catalog::Catalog;
use checkout_core::{Barcode, Money, Rounding};
use checkout_session::{
    CheckoutConfig, FixedAudit, Register, RegisterConfig, Scanner, ScannerConfig, SessionError,
    SessionResult,
};
use tracing::{debug, warn};

use crate::error::{ReplayError, ReplayResult};
use crate::trace::{Expected, Operation, TraceEvent, TraceLog};
use crate::ReplayReport;

/// Allowed difference between a recorded and an actual payment balance.
pub const BALANCE_TOLERANCE: Money = Money::from_cents(1);

/// Named scanners and registers under replay.
#[derive(Debug)]
pub struct ReplayAdapter {
    config: CheckoutConfig,
    scanner_catalog: Option<Arc<Catalog>>,
    register_catalog: Option<Arc<Catalog>>,
    scanners: HashMap<String, Scanner>,
    registers: HashMap<String, Register>,
}

impl ReplayAdapter {
    /// Creates an adapter loading catalogs from the configured paths.
    pub fn new(config: CheckoutConfig) -> Self {
        ReplayAdapter {
            config,
            scanner_catalog: None,
            register_catalog: None,
            scanners: HashMap::new(),
            registers: HashMap::new(),
        }
    }

    /// Creates an adapter whose scanners and registers share `catalog`.
    pub fn with_catalog(config: CheckoutConfig, catalog: Arc<Catalog>) -> Self {
        let mut adapter = ReplayAdapter::new(config);
        adapter.scanner_catalog = Some(Arc::clone(&catalog));
        adapter.register_catalog = Some(catalog);
        adapter
    }

    /// Replays every event of `log`, stopping at the first failure.
    pub fn run(&mut self, log: &TraceLog) -> ReplayResult<ReplayReport> {
        for event in log.events() {
            self.process(event)?;
        }

        Ok(ReplayReport {
            traces: log.traces.len(),
            events: log.event_count(),
            sessions: log.session_count(),
        })
    }

    /// Replays one event.
    pub fn process(&mut self, event: &TraceEvent) -> ReplayResult<()> {
        debug!(line = event.line, object = %event.object, operation = %event.operation, "Replaying");
        let name = event.object.as_str();

        let actual = match event.operation {
            Operation::Unlock => code_of(self.scanner(name)?.unlock()),
            Operation::Scan => {
                let barcode: Barcode = event.parse_param(0)?;
                code_of(self.scanner(name)?.scan(barcode))
            }
            Operation::Handoff => self.handoff(event)?,
            Operation::OpenSession => code_of(self.register(name)?.open_session()),
            Operation::CloseSession => code_of(self.register(name)?.close_session()),
            Operation::AddItem => {
                let barcode: Barcode = event.parse_param(0)?;
                code_of(self.register(name)?.scan_item(barcode))
            }
            Operation::Pay => {
                let tendered = tender_of(event)?;
                let balance = self.register(name)?.pay(tendered).balance();
                return check_balance(event, balance);
            }
            Operation::Remove => {
                let barcode: Barcode = event.parse_param(0)?;
                if let Some(scanner) = self.scanners.get_mut(name) {
                    code_of(scanner.remove(barcode))
                } else if let Some(register) = self.registers.get_mut(name) {
                    code_of(register.remove_item(barcode))
                } else {
                    return Err(unknown_object(event));
                }
            }
            Operation::Abandon => return self.abandon(event),
        };

        check_code(event, actual)
    }

    fn handoff(&mut self, event: &TraceEvent) -> ReplayResult<i32> {
        let register_name = event.param(0)?;
        let policy = if event.expected.code() == Some(1) {
            FixedAudit::always()
        } else {
            FixedAudit::never()
        };
        self.register(register_name)?.set_audit_policy(Box::new(policy));
        self.scanner(&event.object)?;

        match (
            self.scanners.get_mut(&event.object),
            self.registers.get_mut(register_name),
        ) {
            (Some(scanner), Some(register)) => Ok(match scanner.handoff(register) {
                Ok(outcome) => outcome.code(),
                Err(e) => e.code(),
            }),
            _ => Err(unknown_object(event)),
        }
    }

    fn abandon(&mut self, event: &TraceEvent) -> ReplayResult<()> {
        let name = event.object.as_str();

        if self.scanners.contains_key(name) || name.starts_with('s') {
            self.scanner(name)?.abandon();
        } else if self.registers.contains_key(name) || name.starts_with('c') {
            self.register(name)?.abandon();
        } else {
            return Err(unknown_object(event));
        }
        Ok(())
    }

    // =========================================================================
    // Object Registry
    // =========================================================================

    fn scanner(&mut self, name: &str) -> ReplayResult<&mut Scanner> {
        match self.scanners.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let catalog = shared_catalog(&mut self.scanner_catalog, &self.config.catalog.scanner_path)?;
                let config = ScannerConfig {
                    id: name.to_string(),
                };
                debug!(scanner = name, "Creating scanner");
                Ok(entry.insert(Scanner::from_config(catalog, &config)))
            }
        }
    }

    fn register(&mut self, name: &str) -> ReplayResult<&mut Register> {
        match self.registers.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let catalog = shared_catalog(&mut self.register_catalog, &self.config.catalog.register_path)?;
                let config = RegisterConfig {
                    id: name.to_string(),
                    ..self.config.register.clone()
                };
                debug!(register = name, "Creating register");
                Ok(entry.insert(Register::from_config(catalog, &config)))
            }
        }
    }

    /// Scanner created by earlier events, if any.
    pub fn scanner_named(&self, name: &str) -> Option<&Scanner> {
        self.scanners.get(name)
    }

    /// Register created by earlier events, if any.
    pub fn register_named(&self, name: &str) -> Option<&Register> {
        self.registers.get(name)
    }
}

/// Returns the catalog in `slot`, loading it from `path` on first use.
fn shared_catalog(slot: &mut Option<Arc<Catalog>>, path: &Path) -> ReplayResult<Arc<Catalog>> {
    if let Some(catalog) = slot {
        return Ok(Arc::clone(catalog));
    }
    let catalog = Arc::new(Catalog::from_path(path).map_err(SessionError::from)?);
    *slot = Some(Arc::clone(&catalog));
    Ok(catalog)
}

/// Tendered amount of a `pay` event, rounded up to the cent.
///
/// A payment settles when it falls short of the total by less than one
/// cent, and with a whole-cent total that holds exactly when the ceiling of
/// the tender reaches it.
fn tender_of(event: &TraceEvent) -> ReplayResult<Money> {
    let raw = event.param(0)?;
    Money::parse_rounded(raw, Rounding::Ceiling).map_err(|_| {
        ReplayError::malformed(event.line, format!("invalid parameter '{}' for {}", raw, event.operation))
    })
}

fn unknown_object(event: &TraceEvent) -> ReplayError {
    ReplayError::UnknownObject {
        line: event.line,
        name: event.object.clone(),
    }
}

fn code_of(result: SessionResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

fn check_code(event: &TraceEvent, actual: i32) -> ReplayResult<()> {
    match event.expected.code() {
        Some(expected) if expected != actual => {
            warn!(line = event.line, expected, actual, "Replay mismatch");
            Err(mismatch(event, expected.to_string(), actual.to_string()))
        }
        _ => Ok(()),
    }
}

fn check_balance(event: &TraceEvent, balance: Money) -> ReplayResult<()> {
    match event.expected {
        Expected::Value(expected) if !expected.is_within(balance, BALANCE_TOLERANCE) => {
            warn!(line = event.line, %expected, actual = %balance, "Replay mismatch");
            Err(mismatch(event, expected.to_string(), balance.to_string()))
        }
        _ => Ok(()),
    }
}

fn mismatch(event: &TraceEvent, expected: String, actual: String) -> ReplayError {
    ReplayError::Mismatch {
        line: event.line,
        object: event.object.clone(),
        operation: event.operation.to_string(),
        expected,
        actual,
    }
}
