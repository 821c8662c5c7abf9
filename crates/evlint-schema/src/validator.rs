//! The capability shared by every validation stage.

use std::path::Path;

use serde_json::Value;

use evlint_core::{load_json, CheckError, EvlintError, ProblemSink};

/// A validation stage.
///
/// A stage takes one input and either produces its output or fails with a
/// [`CheckError`]. `CheckError::Problem` means the input is defective and
/// should be recorded; anything else is fatal.
pub trait Validator {
    /// What the stage examines.
    type Input: ?Sized;
    /// What the stage hands to the next one.
    type Output;

    /// Run the stage on one input.
    fn validate(&self, input: &Self::Input) -> Result<Self::Output, CheckError>;

    /// Run the stage and discard its output.
    fn is_valid(&self, input: &Self::Input) -> Result<bool, CheckError> {
        match self.validate(input) {
            Ok(_) => Ok(true),
            Err(CheckError::Problem(_)) => Ok(false),
            Err(fatal) => Err(fatal),
        }
    }
}

/// Reads a file and checks that it is well-formed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileValidator;

impl Validator for JsonFileValidator {
    type Input = Path;
    type Output = Value;

    fn validate(&self, path: &Path) -> Result<Value, CheckError> {
        load_json(path)
    }
}

/// Record the problem a stage reported and yield `None`, or escalate a
/// fatal error.
pub fn settle<T>(
    result: Result<T, CheckError>,
    sink: &mut dyn ProblemSink,
) -> Result<Option<T>, EvlintError> {
    match result {
        Ok(output) => Ok(Some(output)),
        Err(CheckError::Problem(problem)) => {
            sink.record(&problem)?;
            Ok(None)
        }
        Err(CheckError::Io { path, source }) => Err(EvlintError::Io { path, source }),
    }
}
