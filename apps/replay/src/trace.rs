//! # Trace Formats
//!
//! Parses recorded usage logs into [`TraceEvent`]s.
//!
//! ## CSV
//! One event per line, seven comma-separated columns:
//! ```text
//! lineId, timestamp, sessionId, object, operation, [params], expected
//!   1,    1584540061, client7,  scan1,  scanner,  [3560070048786], 0
//!   2,    1584540063, client7,  scan1,  transmission, [caisse1], 1
//! ```
//! Blank lines are skipped.
//!
//! ## JSON
//! ```text
//! {"traces": [
//!   {"events": [
//!     {"action": "scanner",
//!      "inputs":  {"param": 3560070048786},     ← may be {}
//!      "outputs": {"Status": 0},                ← {} means "not checked"
//!      "meta_data": {"object": "scan1"}}
//!   ]}
//! ]}
//! ```
//! Events are numbered 1.. across the whole file; each trace counts as one
//! session.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use checkout_core::Money;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ReplayError, ReplayResult};

/// Number of columns in a CSV trace line.
pub const CSV_COLUMNS: usize = 7;

// =============================================================================
// Operations
// =============================================================================

/// Operation named by a trace event.
///
/// Recorded logs use the French names; both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Unlock,
    Scan,
    Handoff,
    OpenSession,
    CloseSession,
    /// Register-side scan by the cashier.
    AddItem,
    Pay,
    Abandon,
    /// Scanner `remove` or register `remove_item`, depending on the object.
    Remove,
}

impl Operation {
    /// Parses an operation name, reporting `line` on failure.
    pub fn parse(line: usize, name: &str) -> ReplayResult<Self> {
        name.parse().map_err(|_| ReplayError::UnknownOperation {
            line,
            name: name.to_string(),
        })
    }
}

impl FromStr for Operation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unlock" | "debloquer" => Ok(Operation::Unlock),
            "scan" | "scanner" => Ok(Operation::Scan),
            "handoff" | "transmission" => Ok(Operation::Handoff),
            "openSession" | "ouvrirSession" => Ok(Operation::OpenSession),
            "closeSession" | "fermerSession" => Ok(Operation::CloseSession),
            "addItem" | "ajouter" => Ok(Operation::AddItem),
            "pay" | "payer" => Ok(Operation::Pay),
            "abandon" => Ok(Operation::Abandon),
            "remove" | "removeItem" | "supprimer" => Ok(Operation::Remove),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Unlock => "unlock",
            Operation::Scan => "scan",
            Operation::Handoff => "handoff",
            Operation::OpenSession => "openSession",
            Operation::CloseSession => "closeSession",
            Operation::AddItem => "addItem",
            Operation::Pay => "pay",
            Operation::Abandon => "abandon",
            Operation::Remove => "remove",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Expected Results
// =============================================================================

/// Recorded result of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// `?`: the recording has no result for this event.
    Unchecked,
    /// A result code or, for payments, a balance.
    Value(Money),
}

impl Expected {
    /// Parses a recorded result (`0`, `-2`, `1.0`, `5.63`, `?`).
    pub fn parse(line: usize, text: &str) -> ReplayResult<Self> {
        let text = text.trim();
        if text == "?" {
            return Ok(Expected::Unchecked);
        }
        text.parse::<Money>()
            .map(Expected::Value)
            .map_err(|_| ReplayError::malformed(line, format!("expected result '{}' is not a number", text)))
    }

    /// Integer result code, truncating any fraction.
    pub fn code(&self) -> Option<i32> {
        match self {
            Expected::Unchecked => None,
            Expected::Value(value) => i32::try_from(value.major()).ok(),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Unchecked => f.write_str("?"),
            Expected::Value(value) => write!(f, "{}", value),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Line (CSV) or running event number (JSON), used in errors.
    pub line: usize,
    /// Session the event belongs to.
    pub session: String,
    /// Name of the scanner or register addressed.
    pub object: String,
    pub operation: Operation,
    pub params: Vec<String>,
    pub expected: Expected,
}

impl TraceEvent {
    /// Parameter at `index`, or a MalformedTrace error.
    pub fn param(&self, index: usize) -> ReplayResult<&str> {
        self.params
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                ReplayError::malformed(self.line, format!("{} needs parameter #{}", self.operation, index + 1))
            })
    }

    /// Parses the parameter at `index`.
    pub fn parse_param<T: FromStr>(&self, index: usize) -> ReplayResult<T> {
        let raw = self.param(index)?;
        raw.parse().map_err(|_| {
            ReplayError::malformed(self.line, format!("invalid parameter '{}' for {}", raw, self.operation))
        })
    }
}

// =============================================================================
// Trace Log
// =============================================================================

/// A parsed trace file: one or more traces of events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLog {
    pub traces: Vec<Vec<TraceEvent>>,
}

impl TraceLog {
    /// Reads a trace file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> ReplayResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => TraceLog::parse_csv(&std::fs::read_to_string(path)?),
            Some("json") => TraceLog::parse_json(&std::fs::read_to_string(path)?),
            _ => Err(ReplayError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Parses a CSV trace; the whole file is one trace.
    pub fn parse_csv(source: &str) -> ReplayResult<Self> {
        let mut events = Vec::new();

        for (index, text) in source.lines().enumerate() {
            let line = index + 1;
            if text.trim().is_empty() {
                continue;
            }

            let columns: Vec<&str> = text.split(',').map(str::trim).collect();
            if columns.len() != CSV_COLUMNS {
                return Err(ReplayError::malformed(
                    line,
                    format!("expected {} columns, found {}", CSV_COLUMNS, columns.len()),
                ));
            }

            let params = columns[5]
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| ReplayError::malformed(line, "parameters must be bracketed"))?;

            events.push(TraceEvent {
                line,
                session: columns[2].to_string(),
                object: columns[3].to_string(),
                operation: Operation::parse(line, columns[4])?,
                params: split_params(params),
                expected: Expected::parse(line, columns[6])?,
            });
        }

        Ok(TraceLog { traces: vec![events] })
    }

    /// Parses a JSON trace file.
    pub fn parse_json(source: &str) -> ReplayResult<Self> {
        let file: JsonTraceFile = serde_json::from_str(source)?;
        let mut line = 0;
        let mut traces = Vec::with_capacity(file.traces.len());

        for (trace_index, trace) in file.traces.into_iter().enumerate() {
            let mut events = Vec::with_capacity(trace.events.len());
            for event in trace.events {
                line += 1;
                let expected = match event.outputs.get("Status") {
                    Some(status) => Expected::parse(line, &json_text(status))?,
                    None => Expected::Unchecked,
                };
                events.push(TraceEvent {
                    line,
                    session: (trace_index + 1).to_string(),
                    object: event.meta_data.object.trim().to_string(),
                    operation: Operation::parse(line, &event.action)?,
                    params: event.inputs.get("param").map(json_text).into_iter().collect(),
                    expected,
                });
            }
            traces.push(events);
        }

        Ok(TraceLog { traces })
    }

    /// Total number of events.
    pub fn event_count(&self) -> usize {
        self.traces.iter().map(Vec::len).sum()
    }

    /// Number of distinct sessions.
    pub fn session_count(&self) -> usize {
        self.events().map(|event| event.session.as_str()).collect::<BTreeSet<_>>().len()
    }

    /// All events in replay order.
    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.traces.iter().flatten()
    }
}

fn split_params(inner: &str) -> Vec<String> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner.split(',').map(|p| p.trim().to_string()).collect()
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// JSON Layout
// =============================================================================

#[derive(Debug, Deserialize)]
struct JsonTraceFile {
    traces: Vec<JsonTrace>,
}

#[derive(Debug, Deserialize)]
struct JsonTrace {
    events: Vec<JsonEvent>,
}

#[derive(Debug, Deserialize)]
struct JsonEvent {
    action: String,
    #[serde(default)]
    inputs: Map<String, Value>,
    #[serde(default)]
    outputs: Map<String, Value>,
    meta_data: JsonMetaData,
}

#[derive(Debug, Deserialize)]
struct JsonMetaData {
    object: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_aliases() {
        assert_eq!("debloquer".parse::<Operation>(), Ok(Operation::Unlock));
        assert_eq!("transmission".parse::<Operation>(), Ok(Operation::Handoff));
        assert_eq!("removeItem".parse::<Operation>(), Ok(Operation::Remove));
        assert_eq!("supprimer".parse::<Operation>(), Ok(Operation::Remove));
        assert!("teleport".parse::<Operation>().is_err());
    }

    #[test]
    fn test_expected_values() {
        assert_eq!(Expected::parse(1, "?").unwrap(), Expected::Unchecked);
        assert_eq!(Expected::parse(1, "-2").unwrap().code(), Some(-2));
        assert_eq!(Expected::parse(1, "1.0").unwrap().code(), Some(1));
        assert_eq!(
            Expected::parse(1, "5.63").unwrap(),
            Expected::Value(Money::from_cents(563))
        );
        assert!(Expected::parse(4, "ok").is_err());
    }

    #[test]
    fn test_parse_csv() {
        let log = TraceLog::parse_csv(
            "1,1584540061,client7,scan1,debloquer,[],0\n\
             2,1584540062,client7,scan1,scanner,[3560070048786],0\n\
             \n\
             4,1584540070,client8,caisse1,payer,[ 10.5 ],-42\n",
        )
        .unwrap();

        assert_eq!(log.event_count(), 3);
        assert_eq!(log.session_count(), 2);

        let events: Vec<_> = log.events().collect();
        assert_eq!(events[0].operation, Operation::Unlock);
        assert!(events[0].params.is_empty());
        assert_eq!(events[1].params, vec!["3560070048786".to_string()]);
        assert_eq!(events[2].line, 4);
        assert_eq!(events[2].params, vec!["10.5".to_string()]);
    }

    #[test]
    fn test_parse_csv_errors() {
        assert!(matches!(
            TraceLog::parse_csv("1,2,3,4,5,[]\n"),
            Err(ReplayError::MalformedTrace { line: 1, .. })
        ));
        assert!(matches!(
            TraceLog::parse_csv("1,2,s,scan1,scanner,123,0\n"),
            Err(ReplayError::MalformedTrace { .. })
        ));
        assert!(matches!(
            TraceLog::parse_csv("1,2,s,scan1,debloquer,[],0\n2,2,s,scan1,fly,[],0\n"),
            Err(ReplayError::UnknownOperation { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_json() {
        let log = TraceLog::parse_json(
            r#"{"traces": [
                {"events": [
                    {"action": "debloquer", "inputs": {}, "outputs": {"Status": 0}, "meta_data": {"object": "scan1"}},
                    {"action": "scanner", "inputs": {"param": 3560070048786}, "outputs": {}, "meta_data": {"object": "scan1"}}
                ]},
                {"events": [
                    {"action": "payer", "inputs": {"param": "12.5"}, "outputs": {"Status": "-42.0"}, "meta_data": {"object": "caisse1"}}
                ]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(log.traces.len(), 2);
        assert_eq!(log.session_count(), 2);

        let events: Vec<_> = log.events().collect();
        assert_eq!(events[0].expected.code(), Some(0));
        assert_eq!(events[1].params, vec!["3560070048786".to_string()]);
        assert_eq!(events[1].expected, Expected::Unchecked);
        assert_eq!(events[2].line, 3);
        assert_eq!(events[2].parse_param::<Money>(0).unwrap(), Money::from_cents(1250));
    }
}
