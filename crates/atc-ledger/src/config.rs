//! # Ledger Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. [`LedgerConfig::default`]
//! 2. a YAML file ([`LedgerConfig::from_yaml_file`])
//! 3. environment variables ([`LedgerConfig::apply_env`])
//! 4. command-line flags, applied by the binary
//!
//! ```yaml
//! write_mode: versioned          # or last_writer_wins
//! document_updates: forward_only # or unrestricted
//! ledger_path: /var/lib/atc/ledger.json
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `ATC_WRITE_MODE` | `write_mode` |
//! | `ATC_DOCUMENT_UPDATES` | `document_updates` |
//! | `ATC_LEDGER_PATH` | `ledger_path` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atc_state::DocumentUpdatePolicy;

/// Environment variable overriding [`LedgerConfig::write_mode`].
pub const ENV_WRITE_MODE: &str = "ATC_WRITE_MODE";
/// Environment variable overriding [`LedgerConfig::document_updates`].
pub const ENV_DOCUMENT_UPDATES: &str = "ATC_DOCUMENT_UPDATES";
/// Environment variable overriding [`LedgerConfig::ledger_path`].
pub const ENV_LEDGER_PATH: &str = "ATC_LEDGER_PATH";

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`LedgerConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An override carried a value outside the accepted set.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Setting that was being overridden.
        field: &'static str,
        /// What was wrong.
        message: String,
    },
}

/// How registries write back a record they loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Conditional put on the version seen at load. A concurrent writer
    /// turns the second write into a conflict.
    #[default]
    Versioned,
    /// Unconditional put. Safe only behind a layer that serializes writes
    /// per key.
    LastWriterWins,
}

impl std::str::FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "versioned" => Ok(Self::Versioned),
            "last_writer_wins" => Ok(Self::LastWriterWins),
            other => Err(format!(
                "unknown write mode {other:?} (expected versioned or last_writer_wins)"
            )),
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Versioned => "versioned",
            Self::LastWriterWins => "last_writer_wins",
        })
    }
}

/// Runtime settings for a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Write-back strategy for read-modify-write operations.
    pub write_mode: WriteMode,
    /// How far `contractUpdation` may move a contract.
    pub document_updates: DocumentUpdatePolicy,
    /// Snapshot file backing the ledger, if any.
    pub ledger_path: Option<PathBuf>,
}

impl LedgerConfig {
    /// Parse a YAML document. Missing fields keep their defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Overlay the `ATC_*` environment variables.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Overlay variables resolved through `lookup`. Unset or empty
    /// variables leave the current value in place.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_WRITE_MODE) {
            self.write_mode = raw.trim().parse().map_err(|message| ConfigError::InvalidValue {
                field: ENV_WRITE_MODE,
                message,
            })?;
        }
        if let Some(raw) = get(ENV_DOCUMENT_UPDATES) {
            self.document_updates =
                raw.trim().parse().map_err(|message| ConfigError::InvalidValue {
                    field: ENV_DOCUMENT_UPDATES,
                    message,
                })?;
        }
        if let Some(raw) = get(ENV_LEDGER_PATH) {
            self.ledger_path = Some(PathBuf::from(raw));
        }
        Ok(self)
    }
}
