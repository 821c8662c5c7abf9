//! # evlint-cli: Command-Line Interface
//!
//! Provides the `evlint` binary.
//!
//! ## Subcommands
//!
//! - `evlint validate`: run a batch and append findings to the result log.
//! - `evlint schemas`: load the schema directory and list each schema's state.
//!
//! ```bash
//! evlint validate --schemas task_folder/schema --events task_folder/event
//! evlint validate --fail-on-problems --json
//! evlint --config evlint.yaml schemas
//! ```
//!
//! ## Exit codes
//!
//! - `0`: the run completed. Findings are data and do not change the code
//!   unless `--fail-on-problems` is given.
//! - `1`: findings were recorded and `--fail-on-problems` was given, or
//!   `schemas` found a schema it cannot use.
//! - `2`: the run could not complete (unreadable directory, unwritable log,
//!   invalid configuration).
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; validation logic lives in `evlint-schema`.

pub mod schemas;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use evlint_core::Config;

/// Exit code for a completed run with nothing to report.
pub const EXIT_OK: u8 = 0;
/// Exit code when findings should fail the invocation.
pub const EXIT_PROBLEMS: u8 = 1;
/// Exit code for a run that could not complete.
pub const EXIT_FATAL: u8 = 2;

/// Load the configuration file if one was given, otherwise use defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Schema directory options shared by all subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct SchemaDirArgs {
    /// Directory containing schema files.
    #[arg(long = "schemas", value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// File name suffix that marks a schema file.
    #[arg(long, value_name = "SUFFIX")]
    pub schema_suffix: Option<String>,
}

impl SchemaDirArgs {
    /// Overlay the given flags onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.schema_dir {
            config.schema_dir = dir.clone();
        }
        if let Some(suffix) = &self.schema_suffix {
            config.schema_suffix = suffix.clone();
        }
    }
}
