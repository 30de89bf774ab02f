//! Shared JSON reading with file-path context.
//!
//! Every stage file goes through [`load_json`] so that missing files,
//! directories, and malformed JSON are reported the same way, then through
//! [`validate_model`] to become a typed record.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use timetable_core::{DataLoadError, TimetableError, ValidationError};
use timetable_models::Validate;

/// Read and parse a JSON document.
///
/// # Errors
///
/// `DataLoadError` naming `path` when it does not exist, is not a regular
/// file, cannot be read, or is not valid JSON.
pub fn load_json(path: &Path) -> Result<Value, DataLoadError> {
    timetable_core::read_json(path)
}

/// Decode and validate `value` as a `T`.
///
/// When `filepath` is given it is recorded under `details["filepath"]` of
/// the returned error.
pub fn validate_model<T>(value: Value, filepath: Option<&Path>) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    timetable_models::from_value(value).map_err(|e| {
        let err = ValidationError::from(e);
        match filepath {
            Some(path) => err.with_detail("filepath", path.display().to_string()),
            None => err,
        }
    })
}

/// [`load_json`] followed by [`validate_model`].
pub fn load_and_validate<T>(path: &Path) -> Result<T, TimetableError>
where
    T: DeserializeOwned + Validate,
{
    let value = load_json(path)?;
    Ok(validate_model(value, Some(path))?)
}
