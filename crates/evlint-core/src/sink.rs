//! # Result Log
//!
//! Destination for [`ValidationProblem`]s. The production sink is
//! [`LogSink`], an append-only file opened once per run. Each problem becomes
//! one record:
//!
//! ```text
//! [1718000000.123456] file "order-17.json"
//! problem: No such schema: ghost
//!
//! ```
//!
//! A record is written with a single `write_all` call so that records never
//! interleave. Sinks take `&mut self`; sharing one across threads requires
//! the caller to serialize access.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::ValidationProblem;

/// Errors raised by the result log.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The log file could not be opened for appending.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A record could not be written.
    #[error("cannot write to {}: {source}", .path.display())]
    Write {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Anything that accepts validation problems.
pub trait ProblemSink {
    /// Record one problem.
    fn record(&mut self, problem: &ValidationProblem) -> Result<(), SinkError>;

    /// Number of problems recorded through this sink so far.
    fn recorded(&self) -> usize;
}

/// Render one log record.
pub fn format_record(timestamp: DateTime<Utc>, problem: &ValidationProblem) -> String {
    format!(
        "[{}.{:06}] file \"{}\"\nproblem: {}\n\n",
        timestamp.timestamp(),
        timestamp.timestamp_subsec_micros(),
        problem.subject,
        problem.kind
    )
}

/// Append-only file sink.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
    recorded: usize,
}

impl LogSink {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] if the file cannot be opened. Callers
    /// should treat this as fatal: without a log, findings cannot be reported.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file,
            recorded: 0,
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProblemSink for LogSink {
    fn record(&mut self, problem: &ValidationProblem) -> Result<(), SinkError> {
        let record = format_record(Utc::now(), problem);
        self.file
            .write_all(record.as_bytes())
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.recorded += 1;
        tracing::debug!(subject = %problem.subject, code = problem.kind.code(), "recorded problem");
        Ok(())
    }

    fn recorded(&self) -> usize {
        self.recorded
    }
}

/// In-memory sink that keeps every problem it receives.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    problems: Vec<ValidationProblem>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Problems in the order they were recorded.
    pub fn problems(&self) -> &[ValidationProblem] {
        &self.problems
    }

    /// Subjects of all recorded problems, in order.
    pub fn subjects(&self) -> Vec<&str> {
        self.problems.iter().map(|p| p.subject.as_str()).collect()
    }

    /// Consumes self and returns the recorded problems.
    pub fn into_inner(self) -> Vec<ValidationProblem> {
        self.problems
    }
}

impl ProblemSink for CollectingSink {
    fn record(&mut self, problem: &ValidationProblem) -> Result<(), SinkError> {
        self.problems.push(problem.clone());
        Ok(())
    }

    fn recorded(&self) -> usize {
        self.problems.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProblemKind;
    use chrono::TimeZone;

    fn ghost() -> ValidationProblem {
        ValidationProblem::new(
            "order-17.json",
            ProblemKind::UnknownSchemaReference {
                name: "ghost".into(),
            },
        )
    }

    #[test]
    fn record_format_is_stable() {
        let ts = Utc.timestamp_opt(1_718_000_000, 123_456_000).unwrap();
        assert_eq!(
            format_record(ts, &ghost()),
            "[1718000000.123456] file \"order-17.json\"\nproblem: No such schema: ghost\n\n"
        );
    }

    #[test]
    fn log_sink_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.log");

        let mut sink = LogSink::open(&path).unwrap();
        sink.record(&ghost()).unwrap();
        assert_eq!(sink.recorded(), 1);
        drop(sink);

        let mut sink = LogSink::open(&path).unwrap();
        sink.record(&ghost()).unwrap();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("file \"order-17.json\"").count(), 2);
        assert_eq!(text.matches("problem: No such schema: ghost").count(), 2);
    }

    #[test]
    fn log_sink_open_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogSink::open(dir.path().join("no/such/dir/result.log")).unwrap_err();
        assert!(matches!(err, SinkError::Open { .. }));
    }

    #[test]
    fn collecting_sink_keeps_order() {
        let mut sink = CollectingSink::new();
        sink.record(&ValidationProblem::new("a", ProblemKind::NotAnObject))
            .unwrap();
        sink.record(&ghost()).unwrap();
        assert_eq!(sink.subjects(), vec!["a", "order-17.json"]);
        assert_eq!(sink.recorded(), 2);
    }
}
