//! # atc-cli — Asset Transfer Chain Command-Line Interface
//!
//! Runs ledger functions against a JSON snapshot file.
//!
//! ## Subcommands
//!
//! - `invoke` — run a mutating function and save the snapshot
//! - `query` — run a read-only function and print its payload
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from ledger logic.
//! - stdout carries payloads only. Logs go to stderr.

pub mod invoke;
pub mod settings;
