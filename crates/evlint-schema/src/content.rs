//! # Event Content Validation
//!
//! Checks that an event file is a JSON object that names a known schema
//! under the reserved key (`event` by default). The checks run in order and
//! stop at the first failure, so an event file yields at most one problem
//! from this stage:
//!
//! 1. the file exists and parses;
//! 2. the top-level value is an object;
//! 3. the reserved key holds a truthy value;
//! 4. that value is the name of a schema in the cache.
//!
//! "Truthy" is deliberately loose: `null`, `false`, `0`, `""`, `[]` and `{}`
//! all count as "no schema name".

use std::path::Path;

use serde_json::Value;

use evlint_core::{file_name_of, CheckError, ProblemKind, ValidationProblem};

use crate::cache::SchemaCache;
use crate::validator::{JsonFileValidator, Validator};

/// Whether a JSON value counts as present for the schema-name check.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// An event that passed content validation and is ready for conformance
/// checking.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDocument {
    file_name: String,
    schema_name: String,
    content: Value,
}

impl EventDocument {
    /// File the event was read from.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Schema the event claims to follow. Always a key of the cache it was
    /// validated against.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Parsed event. Always an object.
    pub fn content(&self) -> &Value {
        &self.content
    }
}

/// Resolves event files to the schema they name.
#[derive(Debug, Clone, Copy)]
pub struct EventContentValidator<'a> {
    cache: &'a SchemaCache,
    schema_field: &'a str,
}

impl<'a> EventContentValidator<'a> {
    /// Validator that looks schema names up in `cache` under `schema_field`.
    pub fn new(cache: &'a SchemaCache, schema_field: &'a str) -> Self {
        Self {
            cache,
            schema_field,
        }
    }
}

impl Validator for EventContentValidator<'_> {
    type Input = Path;
    type Output = EventDocument;

    fn validate(&self, path: &Path) -> Result<EventDocument, CheckError> {
        let file_name = file_name_of(path);
        let reject = |kind| CheckError::from(ValidationProblem::new(file_name.as_str(), kind));

        let content = JsonFileValidator.validate(path)?;

        let Some(object) = content.as_object() else {
            return Err(reject(ProblemKind::NotAnObject));
        };

        let reference = match object.get(self.schema_field) {
            Some(value) if is_truthy(value) => value,
            _ => return Err(reject(ProblemKind::MissingSchemaReference)),
        };

        // Only strings can name a schema; anything else is reported as written.
        let schema_name = match reference {
            Value::String(name) if self.cache.contains(name) => name.clone(),
            Value::String(name) => {
                return Err(reject(ProblemKind::UnknownSchemaReference {
                    name: name.clone(),
                }))
            }
            other => {
                return Err(reject(ProblemKind::UnknownSchemaReference {
                    name: other.to_string(),
                }))
            }
        };

        Ok(EventDocument {
            file_name,
            schema_name,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn cache() -> SchemaCache {
        SchemaCache::from_definitions(
            [
                ("user", Some(json!({"type": "object"}))),
                ("broken", Some(json!([1]))),
                ("5", Some(json!({}))),
            ],
            ".schema",
        )
    }

    fn check(body: &str) -> Result<EventDocument, CheckError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, body).unwrap();
        let cache = cache();
        EventContentValidator::new(&cache, "event").validate(path.as_path())
    }

    fn problem_kind(result: Result<EventDocument, CheckError>) -> ProblemKind {
        match result {
            Err(CheckError::Problem(p)) => {
                assert_eq!(p.subject, "event.json");
                p.kind
            }
            Err(other) => panic!("expected problem, got fatal: {other}"),
            Ok(doc) => panic!("expected problem, got document: {doc:?}"),
        }
    }

    #[test]
    fn resolves_known_schema() {
        let doc = check(r#"{"event": "user", "name": "Ann"}"#).unwrap();
        assert_eq!(doc.file_name(), "event.json");
        assert_eq!(doc.schema_name(), "user");
        assert_eq!(doc.content()["name"], "Ann");
    }

    #[test]
    fn known_but_unusable_schema_still_resolves() {
        let doc = check(r#"{"event": "broken"}"#).unwrap();
        assert_eq!(doc.schema_name(), "broken");
    }

    #[test]
    fn malformed_json_stops_before_shape_checks() {
        assert_eq!(problem_kind(check("{")).code(), "malformed_json");
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(problem_kind(check(r#"["event", "user"]"#)), ProblemKind::NotAnObject);
        assert_eq!(problem_kind(check("\"user\"")), ProblemKind::NotAnObject);
    }

    #[test]
    fn missing_or_falsy_schema_name_is_rejected() {
        for body in [
            r#"{"name": "Ann"}"#,
            r#"{"event": ""}"#,
            r#"{"event": null}"#,
            r#"{"event": 0}"#,
            r#"{"event": false}"#,
            r#"{"event": []}"#,
        ] {
            assert_eq!(
                problem_kind(check(body)),
                ProblemKind::MissingSchemaReference,
                "body: {body}"
            );
        }
    }

    #[test]
    fn unknown_schema_is_named() {
        assert_eq!(
            problem_kind(check(r#"{"event": "ghost"}"#)),
            ProblemKind::UnknownSchemaReference {
                name: "ghost".into()
            }
        );
    }

    #[test]
    fn non_string_schema_name_never_matches() {
        assert_eq!(
            problem_kind(check(r#"{"event": 5}"#)),
            ProblemKind::UnknownSchemaReference { name: "5".into() }
        );
    }

    #[test]
    fn missing_event_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache();
        let result = EventContentValidator::new(&cache, "event")
            .validate(dir.path().join("event.json").as_path());
        assert_eq!(problem_kind(result), ProblemKind::MissingFile);
    }

    #[test]
    fn custom_schema_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"type": "user", "event": "ghost"}"#).unwrap();
        let cache = cache();
        let doc = EventContentValidator::new(&cache, "type")
            .validate(path.as_path())
            .unwrap();
        assert_eq!(doc.schema_name(), "user");
    }

    #[test]
    fn truthiness_of_scalars() {
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!({"a": 1})));
        assert!(is_truthy(&json!("0")));
    }

    proptest! {
        #[test]
        fn non_empty_strings_are_truthy(s in ".+") {
            prop_assert!(is_truthy(&Value::String(s)));
        }

        #[test]
        fn non_zero_integers_are_truthy(n in any::<i64>().prop_filter("non-zero", |n| *n != 0)) {
            prop_assert!(is_truthy(&json!(n)));
        }
    }
}
