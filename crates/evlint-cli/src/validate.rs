//! # Validate Subcommand
//!
//! Runs one batch: loads the schema directory, validates every event file,
//! and appends each finding to the result log. Prints a summary and the
//! location of the log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use evlint_core::{Config, LogSink};
use evlint_schema::{BatchReport, Pipeline};

use crate::{SchemaDirArgs, EXIT_OK, EXIT_PROBLEMS};

/// Arguments for the `evlint validate` subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub schemas: SchemaDirArgs,

    /// Directory containing event files.
    #[arg(long = "events", value_name = "DIR")]
    pub event_dir: Option<PathBuf>,

    /// Result log to append findings to.
    #[arg(long = "result", value_name = "FILE")]
    pub result_file: Option<PathBuf>,

    /// Key in each event that names its schema.
    #[arg(long, value_name = "KEY")]
    pub schema_field: Option<String>,

    /// Exit with status 1 if any finding was recorded.
    #[arg(long)]
    pub fail_on_problems: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ValidateArgs {
    /// Overlay the given flags onto `config`.
    pub fn apply(&self, config: &mut Config) {
        self.schemas.apply(config);
        if let Some(dir) = &self.event_dir {
            config.event_dir = dir.clone();
        }
        if let Some(file) = &self.result_file {
            config.result_file = file.clone();
        }
        if let Some(field) = &self.schema_field {
            config.schema_field = field.clone();
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the batch completed, 1 if `--fail-on-problems`
/// was given and findings were recorded.
pub fn run_validate(args: &ValidateArgs, mut config: Config) -> Result<u8> {
    args.apply(&mut config);
    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let result_file = pipeline.config().result_file.clone();

    let mut sink = LogSink::open(&result_file).context("failed to open result log")?;
    let mut report = pipeline.run(&mut sink).context("validation batch aborted")?;
    report.result_file = Some(result_file);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if args.fail_on_problems && !report.is_clean() {
        Ok(EXIT_PROBLEMS)
    } else {
        Ok(EXIT_OK)
    }
}

fn print_summary(report: &BatchReport) {
    println!(
        "Schemas: {}/{} usable",
        report.schemas_usable, report.schemas_loaded
    );
    println!(
        "Events: {}/{} passed",
        report.events_passed, report.events_checked
    );
    if !report.is_clean() {
        println!("Problems: {}", report.problems);
        for (code, count) in &report.problems_by_kind {
            println!("  {code}: {count}");
        }
    }
    if let Some(path) = &report.result_file {
        println!("Check the results in {}", path.display());
    }
}
