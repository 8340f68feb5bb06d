//! # Replay Error Types
//!
//! A replay stops at the first problem. `Mismatch` means the system under
//! test disagreed with the recording; every other variant means the replay
//! itself could not run.

use std::path::PathBuf;

use checkout_session::SessionError;
use thiserror::Error;

/// Result type alias for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors that stop a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Actual result differs from the recorded one.
    #[error("Line {line}: {object}.{operation} expected {expected}, got {actual}")]
    Mismatch {
        line: usize,
        object: String,
        operation: String,
        expected: String,
        actual: String,
    },

    /// Operation name not recognised.
    #[error("Line {line}: unknown operation '{name}'")]
    UnknownOperation { line: usize, name: String },

    /// Object name that cannot be resolved to a scanner or register.
    #[error("Line {line}: unknown object '{name}'")]
    UnknownObject { line: usize, name: String },

    /// Trace file content that does not follow the trace format.
    #[error("Line {line}: malformed trace: {reason}")]
    MalformedTrace { line: usize, reason: String },

    /// Trace file with an extension other than `.csv` or `.json`.
    #[error("Unsupported trace file: {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),

    /// Scanner or register construction failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Trace file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON trace could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReplayError {
    /// Creates a MalformedTrace error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        ReplayError::MalformedTrace {
            line,
            reason: reason.into(),
        }
    }

    /// Returns true for a recorded-versus-actual disagreement.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ReplayError::Mismatch { .. })
    }

    /// Process exit code for the `replay` binary.
    pub fn exit_code(&self) -> u8 {
        if self.is_mismatch() {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let mismatch = ReplayError::Mismatch {
            line: 3,
            object: "scan1".into(),
            operation: "scan".into(),
            expected: "0".into(),
            actual: "-2".into(),
        };
        assert!(mismatch.is_mismatch());
        assert_eq!(mismatch.exit_code(), 1);
        assert_eq!(mismatch.to_string(), "Line 3: scan1.scan expected 0, got -2");

        assert_eq!(ReplayError::malformed(1, "too few columns").exit_code(), 2);
    }
}
