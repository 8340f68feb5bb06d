//! # checkout-replay: Recorded Trace Replay
//!
//! Replays recorded scanner/register usage against fresh instances and
//! checks every result against the recording.
//!
//! ## Usage
//! ```bash
//! cargo run -p checkout-replay --bin replay -- traces/session.csv
//! cargo run -p checkout-replay --bin replay -- traces/log_split.json --config checkout.toml
//! ```
//!
//! ## Modules
//!
//! - [`trace`] - CSV and JSON trace parsing
//! - [`adapter`] - Named scanners/registers driven by trace events
//! - [`error`] - Replay error types

pub mod adapter;
pub mod error;
pub mod trace;

use std::path::Path;

use checkout_session::CheckoutConfig;
use tracing::info;

pub use adapter::ReplayAdapter;
pub use error::{ReplayError, ReplayResult};
pub use trace::{Expected, Operation, TraceEvent, TraceLog};

/// Summary of a successful replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub traces: usize,
    pub events: usize,
    pub sessions: usize,
}

/// Reads a trace file and replays it with catalogs from `config`.
pub fn replay_file(path: impl AsRef<Path>, config: CheckoutConfig) -> ReplayResult<ReplayReport> {
    let path = path.as_ref();
    let log = TraceLog::from_path(path)?;
    info!(?path, traces = log.traces.len(), events = log.event_count(), "Trace loaded");

    let report = ReplayAdapter::new(config).run(&log)?;
    info!(
        events = report.events,
        sessions = report.sessions,
        "Replay completed without mismatch"
    );
    Ok(report)
}
