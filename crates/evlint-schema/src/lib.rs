//! # evlint-schema: Event Validation Pipeline
//!
//! Validates a batch of JSON event documents against a directory of named
//! JSON Schemas and records every defect to a [`ProblemSink`].
//!
//! ## Stages
//!
//! 1. [`SchemaCache::build`] loads every `<name>.schema` file once. Schemas
//!    that fail to parse or are not objects are reported and still kept, so
//!    that events naming them are told the schema is broken rather than
//!    missing.
//! 2. [`EventContentValidator`] parses one event file and resolves the
//!    schema name stored under the reserved key.
//! 3. [`SchemaConformanceValidator`] checks the event content against the
//!    resolved schema with the `jsonschema` crate.
//!
//! [`Pipeline`] drives the stages over the whole batch. Every stage
//! implements [`Validator`]; a stage either produces its output or returns a
//! [`CheckError`](evlint_core::CheckError), and the pipeline records the
//! problem and moves on to the next file.
//!
//! ## Crate Policy
//!
//! - Depends only on `evlint-core` internally.
//! - External `$ref` targets are never fetched; schemas must be
//!   self-contained.
//!
//! [`ProblemSink`]: evlint_core::ProblemSink

pub mod cache;
pub mod conformance;
pub mod content;
pub mod pipeline;
pub mod validator;

pub use cache::{SchemaCache, SchemaEntry, SchemaStatus};
pub use conformance::SchemaConformanceValidator;
pub use content::{is_truthy, EventContentValidator, EventDocument};
pub use pipeline::{BatchInput, BatchReport, Pipeline};
pub use validator::{settle, JsonFileValidator, Validator};
