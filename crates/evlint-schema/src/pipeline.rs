//! # Batch Pipeline
//!
//! Runs one validation batch:
//!
//! 1. enumerate the schema and event directories once ([`BatchInput`]);
//! 2. build the [`SchemaCache`];
//! 3. pass every event file through content validation, then conformance
//!    validation;
//! 4. record each finding and continue with the next file.
//!
//! Findings never stop the batch. The run ends early only on an
//! [`EvlintError`]: an unlistable directory, an unreadable file (other than a
//! missing one), or a sink that cannot be written.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use evlint_core::{list_files, Config, EvlintError, ProblemSink, SinkError, ValidationProblem};

use crate::cache::SchemaCache;
use crate::conformance::SchemaConformanceValidator;
use crate::content::EventContentValidator;
use crate::validator::{settle, Validator};

/// File listings captured at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchInput {
    /// File names in the schema directory, sorted. Includes files without
    /// the schema suffix; the cache builder filters them.
    pub schema_files: Vec<OsString>,
    /// File names in the event directory, sorted. Never includes the result
    /// log.
    pub event_files: Vec<OsString>,
}

impl BatchInput {
    /// List both input directories.
    pub fn discover(config: &Config) -> Result<Self, EvlintError> {
        let mut event_files = list_files(&config.event_dir)?;
        if let Some(log_name) = entry_name_in(&config.result_file, &config.event_dir) {
            event_files.retain(|name| *name != log_name);
        }
        Ok(Self {
            schema_files: list_files(&config.schema_dir)?,
            event_files,
        })
    }
}

/// File name of `file` if it lives directly in `dir`.
///
/// Both sides are canonicalized, so `./event/result.log` and
/// `event/result.log` match. A file that does not exist matches nothing.
fn entry_name_in(file: &Path, dir: &Path) -> Option<OsString> {
    let file = std::fs::canonicalize(file).ok()?;
    let dir = std::fs::canonicalize(dir).ok()?;
    if file.parent()? == dir.as_path() {
        file.file_name().map(|name| name.to_os_string())
    } else {
        None
    }
}

/// Outcome counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Schema files found (with the schema suffix).
    pub schemas_loaded: usize,
    /// Schemas whose definition is an object.
    pub schemas_usable: usize,
    /// Event files examined.
    pub events_checked: usize,
    /// Event files that produced no finding.
    pub events_passed: usize,
    /// Findings recorded, including those against schema files.
    pub problems: usize,
    /// Findings per problem class.
    pub problems_by_kind: BTreeMap<&'static str, usize>,
    /// Result log the findings were written to, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_file: Option<PathBuf>,
}

impl BatchReport {
    /// Event files that produced a finding.
    pub fn events_failed(&self) -> usize {
        self.events_checked - self.events_passed
    }

    /// Whether the run recorded no findings at all.
    pub fn is_clean(&self) -> bool {
        self.problems == 0
    }
}

/// Forwards to another sink while counting findings per class.
struct TallySink<'s> {
    inner: &'s mut dyn ProblemSink,
    by_kind: BTreeMap<&'static str, usize>,
    recorded: usize,
}

impl<'s> TallySink<'s> {
    fn new(inner: &'s mut dyn ProblemSink) -> Self {
        Self {
            inner,
            by_kind: BTreeMap::new(),
            recorded: 0,
        }
    }
}

impl ProblemSink for TallySink<'_> {
    fn record(&mut self, problem: &ValidationProblem) -> Result<(), SinkError> {
        self.inner.record(problem)?;
        *self.by_kind.entry(problem.kind.code()).or_default() += 1;
        self.recorded += 1;
        Ok(())
    }

    fn recorded(&self) -> usize {
        self.recorded
    }
}

/// A configured validation batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EvlintError::Config`] if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, EvlintError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enumerate the input directories and validate everything in them.
    pub fn run(&self, sink: &mut dyn ProblemSink) -> Result<BatchReport, EvlintError> {
        let input = BatchInput::discover(&self.config)?;
        self.run_input(&input, sink)
    }

    /// Validate a previously captured listing.
    pub fn run_input(
        &self,
        input: &BatchInput,
        sink: &mut dyn ProblemSink,
    ) -> Result<BatchReport, EvlintError> {
        let config = &self.config;
        tracing::info!(
            schema_dir = %config.schema_dir.display(),
            event_dir = %config.event_dir.display(),
            event_count = input.event_files.len(),
            "starting batch"
        );

        let mut tally = TallySink::new(sink);
        let cache = SchemaCache::from_files(
            &config.schema_dir,
            &input.schema_files,
            &config.schema_suffix,
            &mut tally,
        )?;

        let content = EventContentValidator::new(&cache, &config.schema_field);
        let conformance = SchemaConformanceValidator::new(&cache);

        let mut report = BatchReport {
            schemas_loaded: cache.len(),
            schemas_usable: cache.usable_count(),
            ..BatchReport::default()
        };

        for file_name in &input.event_files {
            report.events_checked += 1;
            let path = config.event_dir.join(file_name);

            let Some(document) = settle(content.validate(path.as_path()), &mut tally)? else {
                continue;
            };
            if settle(conformance.validate(&document), &mut tally)?.is_some() {
                tracing::debug!(
                    file = document.file_name(),
                    schema = document.schema_name(),
                    "event passed"
                );
                report.events_passed += 1;
            }
        }

        report.problems = tally.recorded();
        report.problems_by_kind = tally.by_kind;

        tracing::info!(
            events_checked = report.events_checked,
            events_passed = report.events_passed,
            problems = report.problems,
            "batch complete"
        );
        Ok(report)
    }
}
