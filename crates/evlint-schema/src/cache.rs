//! # Schema Cache
//!
//! Loads the schema directory once per run into a map from schema name to
//! [`SchemaEntry`]. The schema name is the file name with the schema suffix
//! (`.schema` by default) removed; files without the suffix are ignored.
//!
//! A schema file that cannot be parsed, or whose top-level value is not an
//! object, is reported as [`ProblemKind::BadSchema`] but still inserted. The
//! name stays "known": an event that references it gets
//! "does not match the global convention" from the conformance stage instead
//! of "No such schema".

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use evlint_core::{list_files, EvlintError, ProblemKind, ProblemSink, ValidationProblem};

use crate::validator::{settle, JsonFileValidator, Validator};

/// Whether a cached schema can be used for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaStatus {
    /// Parsed to a JSON object.
    Usable,
    /// Parsed, but the top-level value is not an object.
    NotAnObject,
    /// Missing or not well-formed JSON.
    Unreadable,
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Usable => "ok",
            Self::NotAnObject => "not an object",
            Self::Unreadable => "unreadable",
        };
        f.write_str(label)
    }
}

/// One schema file as loaded at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    name: String,
    file_name: String,
    definition: Option<Value>,
}

impl SchemaEntry {
    /// Schema name (file name without suffix).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the schema was loaded from.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Parsed value, whatever its shape. `None` if the file could not be parsed.
    pub fn definition(&self) -> Option<&Value> {
        self.definition.as_ref()
    }

    /// The definition, only if it is an object.
    pub fn usable(&self) -> Option<&Value> {
        self.definition.as_ref().filter(|v| v.is_object())
    }

    /// Classify the entry.
    pub fn status(&self) -> SchemaStatus {
        match &self.definition {
            Some(Value::Object(_)) => SchemaStatus::Usable,
            Some(_) => SchemaStatus::NotAnObject,
            None => SchemaStatus::Unreadable,
        }
    }
}

/// Schema name for `file_name`, or `None` if it lacks the suffix.
pub fn schema_name_for<'a>(file_name: &'a str, suffix: &str) -> Option<&'a str> {
    file_name.strip_suffix(suffix)
}

/// All schemas known to a run, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    entries: BTreeMap<String, SchemaEntry>,
}

impl SchemaCache {
    /// Load every schema file in `schema_dir`.
    ///
    /// Problems with individual schema files go to `sink`.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be listed, a schema file cannot be read
    /// for a reason other than absence, or the sink cannot be written.
    pub fn build(
        schema_dir: &Path,
        suffix: &str,
        sink: &mut dyn ProblemSink,
    ) -> Result<Self, EvlintError> {
        let files = list_files(schema_dir)?;
        Self::from_files(schema_dir, &files, suffix, sink)
    }

    /// Load the given schema files from `schema_dir`.
    ///
    /// `files` is a listing captured earlier; a file that has since
    /// disappeared is reported as missing. Names that are not valid UTF-8
    /// are matched and reported under their lossy rendering.
    pub fn from_files(
        schema_dir: &Path,
        files: &[OsString],
        suffix: &str,
        sink: &mut dyn ProblemSink,
    ) -> Result<Self, EvlintError> {
        let mut entries = BTreeMap::new();

        for raw_name in files {
            let file_name = raw_name.to_string_lossy().into_owned();
            let Some(name) = schema_name_for(&file_name, suffix) else {
                continue;
            };

            let path = schema_dir.join(raw_name);
            let definition = settle(JsonFileValidator.validate(path.as_path()), sink)?;

            if !matches!(definition, Some(Value::Object(_))) {
                sink.record(&ValidationProblem::new(
                    file_name.as_str(),
                    ProblemKind::BadSchema,
                ))?;
            }

            tracing::debug!(schema = name, file = %file_name, "loaded schema");
            entries.insert(
                name.to_string(),
                SchemaEntry {
                    name: name.to_string(),
                    file_name: file_name.clone(),
                    definition,
                },
            );
        }

        let cache = Self { entries };
        tracing::info!(
            schema_count = cache.len(),
            usable = cache.usable_count(),
            "built schema cache"
        );
        Ok(cache)
    }

    /// Build a cache directly from values, keyed by schema name.
    ///
    /// No problems are reported; `None` marks an unreadable schema.
    pub fn from_definitions<I, S>(definitions: I, suffix: &str) -> Self
    where
        I: IntoIterator<Item = (S, Option<Value>)>,
        S: Into<String>,
    {
        let entries = definitions
            .into_iter()
            .map(|(name, definition)| {
                let name = name.into();
                let entry = SchemaEntry {
                    file_name: format!("{name}{suffix}"),
                    name: name.clone(),
                    definition,
                };
                (name, entry)
            })
            .collect();
        Self { entries }
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.get(name)
    }

    /// Whether `name` is a known schema, usable or not.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of schema files loaded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no schema files were loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of schemas with an object definition.
    pub fn usable_count(&self) -> usize {
        self.entries.values().filter(|e| e.usable().is_some()).count()
    }

    /// Schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.values()
    }
}
