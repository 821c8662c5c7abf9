//! # Schema Conformance
//!
//! Validates event content against its schema with the `jsonschema` crate.
//! The draft is taken from the schema's `$schema` keyword and defaults to
//! Draft 2020-12. Schemas are checked against their meta-schema when
//! compiled; a schema that fails that check is reported against the schema
//! file, once per event that references it.
//!
//! ## Schema Resolution
//!
//! Only in-document references (`#/definitions/...`, `#/$defs/...`) are
//! resolved. Any `$ref` that would need another document is refused by
//! [`RefuseExternalRefs`], so compiling a schema never touches the network
//! or other files.

use std::collections::HashMap;
use std::fmt;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;

use evlint_core::{CheckError, ProblemKind, ValidationProblem};

use crate::cache::SchemaCache;
use crate::content::EventDocument;
use crate::validator::Validator;

/// Retriever that rejects every external reference.
struct RefuseExternalRefs;

impl Retrieve for RefuseExternalRefs {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external reference not resolved: {}", uri.as_str()).into())
    }
}

/// A single violation reported by the JSON Schema validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value in the event.
    pub instance_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Join violations into the one-line detail carried by the log record.
fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Compile a schema value, refusing external references.
fn compile(schema: &Value) -> Result<jsonschema::Validator, String> {
    jsonschema::options()
        .with_retriever(RefuseExternalRefs)
        .build(schema)
        .map_err(|e| e.to_string())
}

/// Checks resolved events against their schemas.
///
/// Every usable schema in the cache is compiled once at construction.
pub struct SchemaConformanceValidator<'a> {
    cache: &'a SchemaCache,
    compiled: HashMap<&'a str, Result<jsonschema::Validator, String>>,
}

impl fmt::Debug for SchemaConformanceValidator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaConformanceValidator")
            .field("schema_count", &self.cache.len())
            .field("compiled", &self.compiled.len())
            .finish()
    }
}

impl<'a> SchemaConformanceValidator<'a> {
    /// Compile every usable schema in `cache`.
    pub fn new(cache: &'a SchemaCache) -> Self {
        let compiled = cache
            .entries()
            .filter_map(|entry| {
                let schema = entry.usable()?;
                let result = compile(schema);
                if let Err(reason) = &result {
                    tracing::warn!(schema = entry.name(), %reason, "schema failed to compile");
                }
                Some((entry.name(), result))
            })
            .collect();
        Self { cache, compiled }
    }

    /// Every violation of `instance` against a compiled schema.
    fn violations(validator: &jsonschema::Validator, instance: &Value) -> Vec<Violation> {
        validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

impl Validator for SchemaConformanceValidator<'_> {
    type Input = EventDocument;
    type Output = ();

    fn validate(&self, document: &EventDocument) -> Result<(), CheckError> {
        let name = document.schema_name();

        let Some(entry) = self.cache.get(name) else {
            return Err(ValidationProblem::new(
                document.file_name(),
                ProblemKind::UnknownSchemaReference {
                    name: name.to_string(),
                },
            )
            .into());
        };

        let invalid_definition = |reason: Option<String>| {
            CheckError::from(ValidationProblem::new(
                entry.file_name(),
                ProblemKind::InvalidSchemaDefinition {
                    name: name.to_string(),
                    reason,
                },
            ))
        };

        let validator = match self.compiled.get(name) {
            Some(Ok(validator)) => validator,
            Some(Err(reason)) => return Err(invalid_definition(Some(reason.clone()))),
            None => return Err(invalid_definition(None)),
        };

        let violations = Self::violations(validator, document.content());
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationProblem::new(
                document.file_name(),
                ProblemKind::ContentSchemaMismatch {
                    name: name.to_string(),
                    detail: describe(&violations),
                },
            )
            .into())
        }
    }
}
