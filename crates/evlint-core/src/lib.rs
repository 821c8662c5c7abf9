//! # evlint-core: Foundational Types for evlint
//!
//! Leaf crate of the evlint workspace. Defines the problem taxonomy that
//! every validation stage reports into, the file and JSON loading
//! primitives, the append-only result log, and run configuration.
//!
//! ## Key Design Principles
//!
//! 1. **Findings are data, not failures.** A defective input file produces a
//!    [`ValidationProblem`] that is recorded and skipped. Only conditions that
//!    prevent findings from being surfaced at all (unwritable log, unreadable
//!    directory) surface as [`EvlintError`].
//!
//! 2. **Explicit sinks.** There is no global logger. A [`ProblemSink`] is
//!    constructed by the caller and passed by `&mut` to whatever records
//!    findings.
//!
//! 3. **Absence is special.** The file reader distinguishes a missing file
//!    (a finding) from every other I/O failure (fatal).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `evlint-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod sink;
pub mod source;

// Re-export primary types for ergonomic imports.
pub use config::{Config, ConfigError};
pub use error::{CheckError, EvlintError, JsonPosition, ProblemKind, ValidationProblem};
pub use sink::{CollectingSink, LogSink, ProblemSink, SinkError};
pub use source::{file_name_of, list_files, load_json, parse_json, read_source};
