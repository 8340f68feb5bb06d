//! # Checkout Configuration
//!
//! Configuration for scanners, registers and the catalogs they load.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CHECKOUT_AUDIT_PROBABILITY=0.25                                    │
//! │     CHECKOUT_REGISTER_CATALOG=/srv/catalog/products.csv                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/checkout/checkout.toml (Linux)                           │
//! │     ~/Library/Application Support/com.checkout.checkout/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     probability 0.1, generated device ids, fixtures/products.csv       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [register]
//! id = "register-1"
//! audit_probability = 0.1
//! audit_seed = 42        # optional, reproducible sampling
//!
//! [scanner]
//! id = "scanner-1"
//!
//! [catalog]
//! scanner_path = "fixtures/products.csv"
//! register_path = "fixtures/products.csv"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use checkout_core::validation::validate_probability;

use crate::audit::{AuditPolicy, RandomAudit, DEFAULT_AUDIT_PROBABILITY};
use crate::error::{SessionError, SessionResult};

// =============================================================================
// Register Configuration
// =============================================================================

/// Configuration for a register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Register identifier, used in logs and settlements.
    /// Auto-generated when not provided.
    #[serde(default = "generated_id")]
    pub id: String,

    /// Probability that a connection is answered with an audit request.
    #[serde(default = "default_audit_probability")]
    pub audit_probability: f64,

    /// Seed for the audit draw. Unset means OS entropy.
    #[serde(default)]
    pub audit_seed: Option<u64>,
}

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_audit_probability() -> f64 {
    DEFAULT_AUDIT_PROBABILITY
}

impl Default for RegisterConfig {
    fn default() -> Self {
        RegisterConfig {
            id: generated_id(),
            audit_probability: default_audit_probability(),
            audit_seed: None,
        }
    }
}

impl RegisterConfig {
    /// Builds the audit policy described by this configuration.
    pub fn audit_policy(&self) -> Box<dyn AuditPolicy> {
        match self.audit_seed {
            Some(seed) => Box::new(RandomAudit::seeded(self.audit_probability, seed)),
            None => Box::new(RandomAudit::new(self.audit_probability)),
        }
    }
}

// =============================================================================
// Scanner Configuration
// =============================================================================

/// Configuration for a scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Scanner identifier, carried in every handoff manifest.
    #[serde(default = "generated_id")]
    pub id: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig { id: generated_id() }
    }
}

// =============================================================================
// Catalog Configuration
// =============================================================================

/// Where scanners and registers load their product catalogs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file loaded by scanners.
    #[serde(default = "default_catalog_path")]
    pub scanner_path: PathBuf,

    /// Catalog file loaded by registers.
    #[serde(default = "default_catalog_path")]
    pub register_path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("fixtures/products.csv")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            scanner_path: default_catalog_path(),
            register_path: default_catalog_path(),
        }
    }
}

// =============================================================================
// Main Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Register settings.
    #[serde(default)]
    pub register: RegisterConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Catalog locations.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl CheckoutConfig {
    /// Creates a new config with defaults and generated device ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Checkout config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        if self.register.id.trim().is_empty() {
            return Err(SessionError::InvalidConfig("register id must not be empty".into()));
        }

        if self.scanner.id.trim().is_empty() {
            return Err(SessionError::InvalidConfig("scanner id must not be empty".into()));
        }

        validate_probability(self.register.audit_probability)?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup; `apply_env_overrides` passes
    /// the process environment.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CHECKOUT_AUDIT_PROBABILITY") {
            match value.parse::<f64>() {
                Ok(p) => {
                    debug!(probability = p, "Overriding audit probability from environment");
                    self.register.audit_probability = p;
                }
                Err(_) => warn!(value = %value, "Ignoring non-numeric audit probability"),
            }
        }

        if let Some(value) = lookup("CHECKOUT_AUDIT_SEED") {
            match value.parse::<u64>() {
                Ok(seed) => self.register.audit_seed = Some(seed),
                Err(_) => warn!(value = %value, "Ignoring invalid audit seed"),
            }
        }

        if let Some(id) = lookup("CHECKOUT_REGISTER_ID") {
            debug!(register_id = %id, "Overriding register ID from environment");
            self.register.id = id;
        }

        if let Some(id) = lookup("CHECKOUT_SCANNER_ID") {
            debug!(scanner_id = %id, "Overriding scanner ID from environment");
            self.scanner.id = id;
        }

        if let Some(path) = lookup("CHECKOUT_SCANNER_CATALOG") {
            self.catalog.scanner_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("CHECKOUT_REGISTER_CATALOG") {
            self.catalog.register_path = PathBuf::from(path);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "checkout", "checkout")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }
}
