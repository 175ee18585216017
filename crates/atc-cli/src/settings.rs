//! # Ledger Settings
//!
//! Resolves the effective [`LedgerConfig`] from the config file, the
//! `ATC_*` environment, and command-line flags, in that order of
//! increasing precedence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use atc_ledger::{LedgerConfig, WriteMode};
use atc_state::DocumentUpdatePolicy;

/// Snapshot file used when neither config, environment, nor flags name one.
pub const DEFAULT_LEDGER_PATH: &str = "atc-ledger.json";

/// Flags that override configured ledger settings.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ledger snapshot file.
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Write-back strategy: versioned or last_writer_wins.
    #[arg(long, global = true)]
    pub write_mode: Option<WriteMode>,

    /// contractUpdation policy: unrestricted or forward_only.
    #[arg(long, global = true)]
    pub document_updates: Option<DocumentUpdatePolicy>,
}

impl SettingsArgs {
    /// Layer file, environment, and flags over the defaults.
    pub fn resolve(&self) -> Result<LedgerConfig> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// [`resolve`](Self::resolve) with an explicit environment lookup.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<LedgerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match &self.config {
            Some(path) => LedgerConfig::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LedgerConfig::default(),
        };
        let mut config = base.apply_env_with(lookup)?;

        if let Some(mode) = self.write_mode {
            config.write_mode = mode;
        }
        if let Some(policy) = self.document_updates {
            config.document_updates = policy;
        }
        if let Some(path) = &self.ledger {
            config.ledger_path = Some(path.clone());
        }
        if config.ledger_path.is_none() {
            config.ledger_path = Some(PathBuf::from(DEFAULT_LEDGER_PATH));
        }
        tracing::debug!(
            write_mode = %config.write_mode,
            document_updates = ?config.document_updates,
            ledger = ?config.ledger_path,
            "resolved ledger settings"
        );
        Ok(config)
    }
}
