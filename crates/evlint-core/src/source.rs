//! # Source Loading
//!
//! Reads input files and parses them as JSON. A file that does not exist is
//! a finding ([`ProblemKind::MissingFile`]); a file that exists but cannot be
//! read is fatal ([`CheckError::Io`]). Parse failures carry the byte offset,
//! line, and column of the syntax error.
//!
//! Directory listing lives here as well: [`list_files`] enumerates the
//! non-directory entries of one directory once, in sorted order.

use std::ffi::OsString;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::{CheckError, EvlintError, JsonPosition, ProblemKind, ValidationProblem};

/// The name a problem about `path` is reported under: its final component.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read the full contents of a file.
///
/// # Errors
///
/// - [`CheckError::Problem`] with [`ProblemKind::MissingFile`] if the path does not exist.
/// - [`CheckError::Io`] for any other failure.
pub fn read_source(path: &Path) -> Result<Vec<u8>, CheckError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ValidationProblem::new(file_name_of(path), ProblemKind::MissingFile).into())
        }
        Err(source) => Err(CheckError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse raw bytes as a JSON value.
///
/// Invalid UTF-8 is reported by the parser like any other syntax error.
pub fn parse_json(bytes: &[u8]) -> Result<Value, ProblemKind> {
    serde_json::from_slice(bytes).map_err(|e| {
        let (line, column) = (e.line(), e.column());
        let full = e.to_string();
        let reason = full
            .strip_suffix(&format!(" at line {line} column {column}"))
            .unwrap_or(&full)
            .to_string();
        ProblemKind::MalformedJson {
            position: JsonPosition {
                offset: byte_offset(bytes, line, column),
                line,
                column,
            },
            reason,
        }
    })
}

/// Read and parse a JSON file, reporting problems against its file name.
pub fn load_json(path: &Path) -> Result<Value, CheckError> {
    let bytes = read_source(path)?;
    parse_json(&bytes).map_err(|kind| ValidationProblem::new(file_name_of(path), kind).into())
}

/// Convert serde_json's 1-based line and column into a 0-based byte offset.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
            .unwrap_or(bytes.len())
    };
    (line_start + column.saturating_sub(1)).min(bytes.len())
}

/// List the names of the files in `dir`, sorted.
///
/// Directories are skipped, including symlinks that resolve to one. Names
/// are returned as the OS gives them; a name that is not valid UTF-8 is
/// still listed and is reported under its lossy rendering.
///
/// # Errors
///
/// Returns [`EvlintError::DirectoryListing`] if the directory or one of its
/// entries cannot be read.
pub fn list_files(dir: &Path) -> Result<Vec<OsString>, EvlintError> {
    let listing_error = |source| EvlintError::DirectoryListing {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(listing_error)? {
        let entry = entry.map_err(listing_error)?;
        if entry.path().is_dir() {
            tracing::debug!(dir = %dir.display(), entry = ?entry.file_name(), "skipping directory");
            continue;
        }
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}
