//! # Session Error Types
//!
//! Error types for scanner and register operations.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Protocol     │  │     Items       │  │     Construction        │ │
//! │  │  (code −1)      │  │  (code −2/−3)   │  │                         │ │
//! │  │  WrongState     │  │  Unrecognized   │  │  CatalogUnavailable     │ │
//! │  │  HandoffRefused │  │  NotInCart      │  │  InvalidConfig          │ │
//! │  │                 │  │  AuditMismatch  │  │  ConfigLoad/SaveFailed  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every protocol error leaves the machine that reported it unchanged,
//! except `AuditMismatch`, which is reported after the scanner has moved
//! to `AuditFailed`.

use checkout_catalog::CatalogError;
use checkout_core::Barcode;
use thiserror::Error;

use crate::protocol::ConnectReply;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result code for a call made from the wrong state (and for refused handoffs).
pub const CODE_WRONG_STATE: i32 = -1;
/// Result code for an unknown barcode or a barcode missing from the cart.
pub const CODE_UNKNOWN_ITEM: i32 = -2;
/// Result code for a failed audit re-scan.
pub const CODE_AUDIT_MISMATCH: i32 = -3;

/// Errors reported by the scanner and the register.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Operation not allowed in the current state.
    #[error("{operation} is not allowed while {state}")]
    WrongState {
        operation: &'static str,
        state: String,
    },

    /// The register's reply cannot be honoured from the scanner's state.
    #[error("Handoff refused: register replied {reply:?} while scanner was {state}")]
    HandoffRefused { reply: ConnectReply, state: String },

    // =========================================================================
    // Item Errors
    // =========================================================================
    /// Barcode unknown to the catalog.
    #[error("Unrecognized barcode: {0}")]
    Unrecognized(Barcode),

    /// Barcode not in the cart.
    #[error("Barcode {0} is not in the cart")]
    NotInCart(Barcode),

    /// Audit re-scan does not match the cart.
    #[error("Audit mismatch on barcode {0}")]
    AuditMismatch(Barcode),

    // =========================================================================
    // Construction / Configuration Errors
    // =========================================================================
    /// The product catalog failed to load.
    #[error("Product catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),

    /// Invalid configuration value.
    #[error("Invalid checkout configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

impl From<checkout_core::ValidationError> for SessionError {
    fn from(err: checkout_core::ValidationError) -> Self {
        SessionError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Protocol Result Codes
// =============================================================================

impl SessionError {
    /// Creates a WrongState error.
    pub fn wrong_state(operation: &'static str, state: impl ToString) -> Self {
        SessionError::WrongState {
            operation,
            state: state.to_string(),
        }
    }

    /// Integer result code used by recorded traces.
    ///
    /// ```text
    /// −1  wrong state, refused handoff (and any non-protocol error)
    /// −2  unrecognized barcode, barcode not in cart
    /// −3  audit mismatch
    /// ```
    pub fn code(&self) -> i32 {
        match self {
            SessionError::Unrecognized(_) | SessionError::NotInCart(_) => CODE_UNKNOWN_ITEM,
            SessionError::AuditMismatch(_) => CODE_AUDIT_MISMATCH,
            _ => CODE_WRONG_STATE,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }
}
