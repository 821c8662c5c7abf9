//! # Error Types: Findings and Fatal Errors
//!
//! Two tiers of failure flow through evlint:
//!
//! - [`ValidationProblem`]: a defect in one input file. Recorded against that
//!   file in the result log; the batch moves on to the next file.
//! - [`EvlintError`]: a condition that stops the run, such as a result log
//!   that cannot be opened or a directory that cannot be listed.
//!
//! [`CheckError`] is the error type of a single validation step and carries
//! either tier, so a step can return early with `?` regardless of which tier
//! it hit.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::sink::SinkError;

/// Location of a JSON syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonPosition {
    /// 0-based byte offset into the file.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column within the line; 0 for an empty input.
    pub column: usize,
}

impl fmt::Display for JsonPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.offset, self.line, self.column
        )
    }
}

/// A defect found in one input file.
///
/// The `Display` output of each variant is the message written to the
/// result log after `problem: `.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemKind {
    /// The file was listed but does not exist when read.
    #[error("No such file")]
    MissingFile,

    /// The file is not well-formed JSON.
    #[error("INVALID JSON. Unable to read file at position: {position}: {reason}")]
    MalformedJson {
        /// Where the parser stopped.
        position: JsonPosition,
        /// Parser-supplied description.
        reason: String,
    },

    /// A schema file whose top-level value is not an object.
    #[error("BAD SCHEMA. A JSON schema must be of type \"object\"")]
    BadSchema,

    /// An event file whose top-level value is not an object.
    #[error("The file does not match any schema")]
    NotAnObject,

    /// An event file with no usable schema name under the reserved key.
    #[error("The file does not contain any schema name")]
    MissingSchemaReference,

    /// An event file naming a schema that has no file in the schema directory.
    #[error("No such schema: {name}")]
    UnknownSchemaReference {
        /// The schema name as written in the event.
        name: String,
    },

    /// A known schema that cannot be used to validate anything.
    #[error("Schema {name} does not match the global convention{}", reason_suffix(.reason))]
    InvalidSchemaDefinition {
        /// The schema name.
        name: String,
        /// Compiler diagnostic, when the schema was an object but failed to compile.
        reason: Option<String>,
    },

    /// An event whose content violates its schema.
    #[error("The content of the file does not match the schema {name}: {detail}")]
    ContentSchemaMismatch {
        /// The schema name.
        name: String,
        /// Validator-supplied description of every violation.
        detail: String,
    },
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => String::new(),
    }
}

impl ProblemKind {
    /// Stable machine-readable identifier for the problem class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::MalformedJson { .. } => "malformed_json",
            Self::BadSchema => "bad_schema",
            Self::NotAnObject => "not_an_object",
            Self::MissingSchemaReference => "missing_schema_reference",
            Self::UnknownSchemaReference { .. } => "unknown_schema_reference",
            Self::InvalidSchemaDefinition { .. } => "invalid_schema_definition",
            Self::ContentSchemaMismatch { .. } => "content_schema_mismatch",
        }
    }
}

/// One reported defect: the file it concerns and what is wrong with it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("file \"{subject}\": {kind}")]
pub struct ValidationProblem {
    /// File name the problem is reported against.
    pub subject: String,
    /// What is wrong.
    pub kind: ProblemKind,
}

impl ValidationProblem {
    /// Create a problem for the given subject.
    pub fn new(subject: impl Into<String>, kind: ProblemKind) -> Self {
        Self {
            subject: subject.into(),
            kind,
        }
    }
}

/// Error returned by a single validation step.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The input is defective; record it and continue.
    #[error(transparent)]
    Problem(#[from] ValidationProblem),

    /// An I/O failure other than a missing file. Fatal.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Fatal error that ends a run.
#[derive(Error, Debug)]
pub enum EvlintError {
    /// An input file could not be read for a reason other than absence.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// An input directory could not be listed.
    #[error("cannot list directory {}: {source}", .path.display())]
    DirectoryListing {
        /// The directory.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The result log could not be opened or written.
    #[error("result log error: {0}")]
    Sink(#[from] SinkError),

    /// The run configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
