//! # Schemas Subcommand
//!
//! Loads the schema directory the same way `validate` does and lists every
//! schema with its state on stdout. Findings go to stderr rather than to
//! the result log.

use anyhow::{Context, Result};
use clap::Args;

use evlint_core::{CollectingSink, Config};
use evlint_schema::{SchemaCache, SchemaStatus};

use crate::{SchemaDirArgs, EXIT_OK, EXIT_PROBLEMS};

/// Arguments for the `evlint schemas` subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct SchemasArgs {
    #[command(flatten)]
    pub schemas: SchemaDirArgs,
}

/// Execute the schemas subcommand.
///
/// Returns exit code: 0 if every schema is usable, 1 otherwise.
pub fn run_schemas(args: &SchemasArgs, mut config: Config) -> Result<u8> {
    args.schemas.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let mut sink = CollectingSink::new();
    let cache = SchemaCache::build(&config.schema_dir, &config.schema_suffix, &mut sink)
        .context("failed to load schemas")?;

    println!(
        "Schemas in {}: {}/{} usable",
        config.schema_dir.display(),
        cache.usable_count(),
        cache.len()
    );
    for entry in cache.entries() {
        println!("  {:<32} {}", entry.name(), entry.status());
    }
    for problem in sink.problems() {
        eprintln!("FAIL: {}: {}", problem.subject, problem.kind);
    }

    let all_usable = cache
        .entries()
        .all(|e| e.status() == SchemaStatus::Usable);
    if all_usable {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_PROBLEMS)
    }
}
