//! # atc CLI entry point
//!
//! Parses command-line arguments, installs logging, resolves settings, and
//! dispatches to the subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atc_cli::invoke::{run_function, FunctionArgs, Mode};
use atc_cli::settings::SettingsArgs;

/// Asset transfer chain ledger CLI.
///
/// Creates assets and sales contracts, moves contracts through their
/// shipment lifecycle, and reads ledger state from a local snapshot file.
#[derive(Parser, Debug)]
#[command(name = "atc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a mutating ledger function (initAsset, readyForShipment, ...).
    Invoke(FunctionArgs),

    /// Run a read-only ledger function (readContract, keys, ...).
    Query(FunctionArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let result = cli.settings.resolve().and_then(|config| {
        let mut stdout = std::io::stdout().lock();
        match &cli.command {
            Commands::Invoke(call) => run_function(Mode::Invoke, call, &config, &mut stdout),
            Commands::Query(call) => run_function(Mode::Query, call, &config, &mut stdout),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
