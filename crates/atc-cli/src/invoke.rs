//! # Invoke and Query Subcommands
//!
//! Run one named ledger function against the snapshot file.
//!
//! - `invoke` runs mutations and saves the snapshot on success.
//! - `query` runs reads and prints the payload to stdout.
//!
//! A failed function leaves the snapshot file untouched. Concurrent runs
//! against one snapshot take turns on its lock.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Args;

use atc_ledger::{is_query, Dispatcher, Ledger, LedgerConfig, SnapshotStore};

/// Arguments for `atc invoke` and `atc query`.
#[derive(Args, Debug, Clone)]
pub struct FunctionArgs {
    /// Ledger function name (e.g. `initContract`, `readContract`).
    pub function: String,

    /// Positional string arguments passed to the function.
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,
}

/// Whether a call may mutate the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mutating function.
    Invoke,
    /// Read-only function.
    Query,
}

/// Run `call` against the configured ledger, writing any payload to `out`.
pub fn run_function(
    mode: Mode,
    call: &FunctionArgs,
    config: &LedgerConfig,
    out: &mut impl Write,
) -> Result<u8> {
    match (mode, is_query(&call.function)) {
        (Mode::Invoke, true) => bail!("{} is a query; use `atc query`", call.function),
        (Mode::Query, false) => bail!("{} is not a query; use `atc invoke`", call.function),
        _ => {}
    }

    let path = config
        .ledger_path
        .clone()
        .context("no ledger path configured")?;
    let store = SnapshotStore::open(&path)
        .with_context(|| format!("opening ledger {}", path.display()))?;
    let ledger = Ledger::builder(store.clone()).config(config.clone()).build();
    let dispatcher = Dispatcher::new(ledger);

    let payload = match dispatcher.invoke(&call.function, &call.args) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(function = %call.function, kind = %err.kind(), "{err}");
            return Ok(exit_code(err.kind()));
        }
    };

    if mode == Mode::Invoke {
        store
            .save()
            .with_context(|| format!("saving ledger {}", path.display()))?;
        tracing::info!(function = %call.function, ledger = %path.display(), "ledger saved");
    }
    if let Some(bytes) = payload {
        out.write_all(&bytes)?;
        out.write_all(b"\n")?;
    }
    Ok(0)
}

/// Process exit code for a failed ledger function.
pub fn exit_code(kind: atc_core::ErrorKind) -> u8 {
    use atc_core::ErrorKind;
    match kind {
        ErrorKind::InvalidArgument => 2,
        ErrorKind::AlreadyExists => 3,
        ErrorKind::NotFound => 4,
        ErrorKind::PermissionDenied => 5,
        ErrorKind::Conflict => 6,
        ErrorKind::StorageFailure => 7,
    }
}
