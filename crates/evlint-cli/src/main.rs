//! # evlint CLI entry point
//!
//! Parses command-line arguments, initialises tracing, resolves the run
//! configuration, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evlint_cli::schemas::{run_schemas, SchemasArgs};
use evlint_cli::validate::{run_validate, ValidateArgs};
use evlint_cli::{load_config, EXIT_FATAL};

/// evlint: validate JSON event files against named JSON Schemas.
///
/// Each event file names its schema under a reserved key. Every defect found
/// is appended to the result log; the batch always runs to completion.
#[derive(Parser, Debug)]
#[command(name = "evlint", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate every event file and append findings to the result log.
    Validate(ValidateArgs),

    /// Load the schema directory and report the state of each schema.
    Schemas(SchemasArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("evlint v{} starting", env!("CARGO_PKG_VERSION"));

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Validate(args) => run_validate(&args, config),
        Commands::Schemas(args) => run_schemas(&args, config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
