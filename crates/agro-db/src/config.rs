//! # Ledger Configuration
//!
//! Settings for the database, the ledger engine and its retry policy.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     AGRO_DB_PATH=/var/lib/agro/ledger.db                               │
//! │     AGRO_RESIDUAL_TOLERANCE=0.001                                      │
//! │     AGRO_SALE_TIMEOUT_SECS / AGRO_TRANSFER_TIMEOUT_SECS                │
//! │     AGRO_RETRY_MAX_ATTEMPTS                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/agroledger/ledger.toml (Linux)                           │
//! │     ~/Library/Application Support/com.agro.ledger/ledger.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/agro/ledger.db"
//! max_connections = 5
//! busy_timeout_ms = 5000
//!
//! [ledger]
//! residual_tolerance = "0.001"
//! sale_timeout_secs = 10
//! transfer_timeout_secs = 10
//! intake_timeout_secs = 10
//! default_origin_module = "ERP"
//! max_page_size = 500
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 25
//! max_backoff_ms = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pool::DbConfig;
use agro_core::{default_residual_tolerance, Quantity, ORIGIN_ERP};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`LedgerConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Database Settings
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits on the database lock before giving up.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./agro_ledger.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5_000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl From<&DatabaseSettings> for DbConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        let config = if settings.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&settings.path).max_connections(settings.max_connections)
        };
        config.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
    }
}

// =============================================================================
// Ledger Settings
// =============================================================================

/// `[ledger]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Unallocated quantity a FIFO walk may leave behind. Three decimal
    /// places of the base unit by default.
    #[serde(default = "default_residual_tolerance")]
    pub residual_tolerance: Quantity,

    #[serde(default = "default_timeout_secs")]
    pub sale_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub transfer_timeout_secs: u64,

    /// Bound for receipts and adjustments.
    #[serde(default = "default_timeout_secs")]
    pub intake_timeout_secs: u64,

    /// Origin stamped on sales and movements whose request names none.
    #[serde(default = "default_origin_module")]
    pub default_origin_module: String,

    /// Upper bound on `Page::limit` for reporting queries.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_origin_module() -> String {
    ORIGIN_ERP.to_string()
}

fn default_max_page_size() -> u32 {
    500
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            residual_tolerance: default_residual_tolerance(),
            sale_timeout_secs: default_timeout_secs(),
            transfer_timeout_secs: default_timeout_secs(),
            intake_timeout_secs: default_timeout_secs(),
            default_origin_module: default_origin_module(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl LedgerSettings {
    pub fn sale_timeout(&self) -> Duration {
        Duration::from_secs(self.sale_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn intake_timeout(&self) -> Duration {
        Duration::from_secs(self.intake_timeout_secs)
    }
}

// =============================================================================
// Retry Settings
// =============================================================================

/// `[retry]` section. Applies to serialization conflicts only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts including the first. 1 disables retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    25
}

fn default_max_backoff() -> u64 {
    500
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete ledger configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub retry: RetrySettings,
}

impl LedgerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, or `ledger.toml` in the platform
    ///    config dir). A missing file is not an error.
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file. Absent keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading ledger config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.residual_tolerance.is_negative() {
            return Err(ConfigError::Invalid(
                "residual_tolerance must not be negative".into(),
            ));
        }

        let timeouts = [
            ("sale_timeout_secs", self.ledger.sale_timeout_secs),
            ("transfer_timeout_secs", self.ledger.transfer_timeout_secs),
            ("intake_timeout_secs", self.ledger.intake_timeout_secs),
        ];
        for (name, secs) in timeouts {
            if secs == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
            }
        }

        if self.ledger.default_origin_module.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_origin_module must not be empty".into(),
            ));
        }

        if self.ledger.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be greater than 0".into()));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `AGRO_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("AGRO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("AGRO_RESIDUAL_TOLERANCE") {
            match raw.parse::<Quantity>() {
                Ok(tolerance) => self.ledger.residual_tolerance = tolerance,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring AGRO_RESIDUAL_TOLERANCE"),
            }
        }

        if let Some(raw) = lookup("AGRO_SALE_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.ledger.sale_timeout_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring AGRO_SALE_TIMEOUT_SECS"),
            }
        }

        if let Some(raw) = lookup("AGRO_TRANSFER_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.ledger.transfer_timeout_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring AGRO_TRANSFER_TIMEOUT_SECS"),
            }
        }

        if let Some(raw) = lookup("AGRO_RETRY_MAX_ATTEMPTS") {
            match raw.parse() {
                Ok(attempts) => self.retry.max_attempts = attempts,
                Err(_) => warn!(value = %raw, "Ignoring AGRO_RETRY_MAX_ATTEMPTS"),
            }
        }
    }

    /// `ledger.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "agro", "ledger")
            .map(|dirs| dirs.config_dir().join("ledger.toml"))
    }

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::from(&self.database)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.ledger.residual_tolerance, "0.001".parse().unwrap());
        assert_eq!(config.ledger.sale_timeout(), Duration::from_secs(10));
        assert_eq!(config.ledger.transfer_timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LedgerConfig = toml::from_str(
            r#"
            [ledger]
            residual_tolerance = "0.01"
            transfer_timeout_secs = 3

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.residual_tolerance, "0.01".parse().unwrap());
        assert_eq!(config.ledger.transfer_timeout_secs, 3);
        assert_eq!(config.ledger.sale_timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 25);
        assert_eq!(config.database, DatabaseSettings::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AGRO_DB_PATH", "/tmp/other.db"),
            ("AGRO_RESIDUAL_TOLERANCE", "0.0005"),
            ("AGRO_SALE_TIMEOUT_SECS", "4"),
            ("AGRO_TRANSFER_TIMEOUT_SECS", "not-a-number"),
            ("AGRO_RETRY_MAX_ATTEMPTS", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = LedgerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.ledger.residual_tolerance, "0.0005".parse().unwrap());
        assert_eq!(config.ledger.sale_timeout_secs, 4);
        assert_eq!(config.ledger.transfer_timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = LedgerConfig::default();
        config.ledger.residual_tolerance = "-0.1".parse().unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = LedgerConfig::default();
        config.ledger.sale_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = LedgerConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = LedgerConfig::default();
        config.retry.initial_backoff_ms = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("agro-ledger-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[database]\npath = \":memory:\"\n").unwrap();

        let config = LedgerConfig::from_file(&path).unwrap();
        assert!(config.db_config().is_in_memory());

        std::fs::write(&path, "[ledger\n").unwrap();
        assert!(matches!(LedgerConfig::from_file(&path), Err(ConfigError::Parse(_))));

        std::fs::remove_file(&path).unwrap();
    }
}
