//! Run configuration.
//!
//! Every field has a default, so an empty YAML document (or no config file
//! at all) yields a working configuration. The CLI layers its flags on top.
//!
//! ```yaml
//! schema_dir: task_folder/schema
//! event_dir: task_folder/event
//! result_file: result.log
//! schema_suffix: .schema
//! schema_field: event
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default directory holding `<name>.schema` files.
pub const DEFAULT_SCHEMA_DIR: &str = "task_folder/schema";
/// Default directory holding event files.
pub const DEFAULT_EVENT_DIR: &str = "task_folder/event";
/// Default result log, relative to the working directory.
pub const DEFAULT_RESULT_FILE: &str = "result.log";
/// Suffix that marks a file in the schema directory as a schema.
pub const DEFAULT_SCHEMA_SUFFIX: &str = ".schema";
/// Reserved key in an event document that names its schema.
pub const DEFAULT_SCHEMA_FIELD: &str = "event";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for schema files.
    pub schema_dir: PathBuf,
    /// Directory scanned for event files.
    pub event_dir: PathBuf,
    /// Result log path.
    pub result_file: PathBuf,
    /// File name suffix identifying schema files; stripped to get the schema name.
    pub schema_suffix: String,
    /// Key in each event document whose value names its schema.
    pub schema_field: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            event_dir: PathBuf::from(DEFAULT_EVENT_DIR),
            result_file: PathBuf::from(DEFAULT_RESULT_FILE),
            schema_suffix: DEFAULT_SCHEMA_SUFFIX.to_string(),
            schema_field: DEFAULT_SCHEMA_FIELD.to_string(),
        }
    }
}

impl Config {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as null rather than an empty mapping.
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
                path: PathBuf::new(),
                reason: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every file look alike.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_suffix.is_empty() {
            return Err(ConfigError::Empty {
                field: "schema_suffix",
            });
        }
        if self.schema_field.is_empty() {
            return Err(ConfigError::Empty {
                field: "schema_field",
            });
        }
        Ok(())
    }

    /// File name of the schema file that defines `schema_name`.
    pub fn schema_file_name(&self, schema_name: &str) -> String {
        format!("{schema_name}{}", self.schema_suffix)
    }
}
