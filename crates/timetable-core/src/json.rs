//! Reading JSON documents from disk with the file path attached to every
//! failure. The loader and the schema validator both read through here so a
//! bad path is reported identically by either.

use std::path::Path;

use serde_json::Value;

use crate::error::DataLoadError;

/// Read and parse a JSON document.
///
/// # Errors
///
/// `DataLoadError` naming `path` when it does not exist, is not a regular
/// file, cannot be read, or is not valid JSON.
pub fn read_json(path: &Path) -> Result<Value, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::at(path, format!("File not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(DataLoadError::at(path, format!("Path is not a file: {}", path.display())));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| DataLoadError::at(path, format!("Cannot read file: {e}")))?;
    serde_json::from_str(&content)
        .map_err(|e| DataLoadError::at(path, format!("Invalid JSON: {e}")))
}
