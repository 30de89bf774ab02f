//! # Schema Validator
//!
//! Draft-07 validation of parsed JSON against named schema documents.
//!
//! Schema documents are read lazily and cached by name. Each validation
//! compiles the cached document with a local retriever so that relative
//! `$ref`s such as `../common.schema.json#/definitions/clockTime` resolve
//! to files under the schema directory.
//!
//! Rule violations come back as [`SchemaError`] values sorted by data path.
//! Only missing or malformed files are reported as [`DataLoadError`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::{json, Value};
use timetable_core::{DataLoadError, Settings};

/// Well-known schema names and their files relative to the schema directory.
pub const SCHEMA_MAP: [(&str, &str); 11] = [
    ("config", "stage1/config.schema.json"),
    ("faculty", "stage1/faculty.schema.json"),
    ("subject", "stage1/subject.schema.json"),
    ("subjects_full", "stage2/subjects.schema.json"),
    ("faculty_full", "stage2/faculty.schema.json"),
    ("teaching_assignments", "stage3/teachingAssignments.schema.json"),
    ("overlap_constraints", "stage3/overlapConstraints.schema.json"),
    ("statistics", "stage3/statistics.schema.json"),
    ("scheduling_input", "stage4/schedulingInput.schema.json"),
    ("ai_schedule", "stage5/aiSchedule.schema.json"),
    ("enriched_timetable", "stage6/enrichedTimetable.schema.json"),
];

const SCHEMA_SUFFIX: &str = ".schema.json";

/// Resolves `$ref` targets to files under the schema directory.
///
/// The URI's path (scheme and authority dropped) is taken as a path
/// relative to `schema_dir`. Paths that would climb out of the directory
/// are refused.
struct LocalSchemaRetriever {
    schema_dir: PathBuf,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let relative = uri_path(uri_str);
        let relative = Path::new(relative);

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(format!("refusing to resolve schema outside schema directory: {uri_str}").into());
        }

        let path = self.schema_dir.join(relative);
        tracing::debug!(uri = uri_str, path = %path.display(), "resolving schema reference");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read referenced schema {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Path part of an absolute URI, without the leading slash or fragment.
fn uri_path(uri: &str) -> &str {
    let without_fragment = uri.split('#').next().unwrap_or(uri);
    let after_scheme = match without_fragment.find("://") {
        Some(i) => &without_fragment[i + 3..],
        None => without_fragment,
    };
    // Drop the authority; what remains starts at the path.
    match after_scheme.find('/') {
        Some(i) => after_scheme[i..].trim_start_matches('/'),
        None => after_scheme,
    }
}

/// One rule violation found by [`SchemaValidator::validate_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    pub message: String,
    /// Dotted data path, e.g. `faculty.0.facultyId`. Empty at the root.
    pub path: String,
    /// Dotted path of the failing keyword within the schema.
    pub schema_path: String,
    /// The offending value. Omitted when it is an object.
    pub value: Option<Value>,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: String::new(),
            schema_path: String::new(),
            value: None,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "message": self.message,
            "path": self.path,
            "schema_path": self.schema_path,
            "value": self.value,
        })
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.path, self.message)
        }
    }
}

/// Converts a JSON pointer (`/faculty/0/facultyId`) to dotted form.
fn dotted(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Validates JSON documents against the named schemas of one directory.
#[derive(Debug)]
pub struct SchemaValidator {
    schema_dir: PathBuf,
    cache: RefCell<HashMap<String, Rc<Value>>>,
}

impl SchemaValidator {
    /// Creates a validator over `schema_dir`. Nothing is read until a
    /// schema is first requested.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.schemas_dir())
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// File backing `name`: the mapped file for well-known names, otherwise
    /// `name` itself (with `.schema.json` appended when it has no `.json`
    /// extension) under the schema directory.
    pub fn resolve_path(&self, name: &str) -> PathBuf {
        if let Some((_, file)) = SCHEMA_MAP.iter().find(|(known, _)| *known == name) {
            return self.schema_dir.join(file);
        }
        if name.ends_with(".json") {
            self.schema_dir.join(name)
        } else {
            self.schema_dir.join(format!("{name}{SCHEMA_SUFFIX}"))
        }
    }

    /// Returns the parsed schema document, reading it on first use.
    ///
    /// Repeated calls return the same `Rc`.
    ///
    /// # Errors
    ///
    /// `DataLoadError` when the file does not exist or is not valid JSON.
    pub fn get_schema(&self, name: &str) -> Result<Rc<Value>, DataLoadError> {
        if let Some(schema) = self.cache.borrow().get(name) {
            tracing::debug!(schema = name, "schema cache hit");
            return Ok(Rc::clone(schema));
        }

        let path = self.resolve_path(name);
        if !path.is_file() {
            return Err(
                DataLoadError::at(&path, format!("Schema file not found: {}", path.display()))
                    .with_detail("schema_name", name),
            );
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            DataLoadError::at(&path, format!("Cannot read schema file: {e}"))
                .with_detail("schema_name", name)
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| {
            DataLoadError::at(&path, format!("Invalid JSON in schema file: {e}"))
                .with_detail("schema_name", name)
        })?;

        tracing::debug!(schema = name, path = %path.display(), "loaded schema");
        let schema = Rc::new(schema);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&schema));
        Ok(schema)
    }

    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft7);
        opts.with_retriever(LocalSchemaRetriever {
            schema_dir: self.schema_dir.clone(),
        });
        opts
    }

    fn build_validator(&self, name: &str) -> Result<Validator, DataLoadError> {
        let schema = self.get_schema(name)?;
        self.build_options().build(&schema).map_err(|e| {
            DataLoadError::at(&self.resolve_path(name), format!("Invalid schema: {e}"))
                .with_detail("schema_name", name)
        })
    }

    /// Validates `data` against schema `name`.
    ///
    /// Returns every violation, sorted by data path; an empty vector means
    /// the document conforms.
    ///
    /// # Errors
    ///
    /// `DataLoadError` when the schema cannot be loaded or compiled.
    pub fn validate_data(&self, data: &Value, name: &str) -> Result<Vec<SchemaError>, DataLoadError> {
        let validator = self.build_validator(name)?;

        let mut errors: Vec<SchemaError> = validator
            .iter_errors(data)
            .map(|e| SchemaError {
                message: e.to_string(),
                path: dotted(&e.instance_path.to_string()),
                schema_path: dotted(&e.schema_path.to_string()),
                value: match &*e.instance {
                    Value::Object(_) => None,
                    other => Some(other.clone()),
                },
            })
            .collect();
        errors.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(schema = name, violations = errors.len(), "validated document");
        Ok(errors)
    }

    /// Reads and parses `path`, then validates it against schema `name`.
    ///
    /// # Errors
    ///
    /// `DataLoadError` when the file is missing, is not a regular file, or is
    /// not valid JSON, or when the schema cannot be loaded.
    pub fn validate_file(&self, path: &Path, name: &str) -> Result<Vec<SchemaError>, DataLoadError> {
        let data = timetable_core::read_json(path)?;
        self.validate_data(&data, name)
    }

    /// `true` when `data` conforms. A schema that cannot be loaded counts
    /// as non-conforming.
    pub fn is_valid(&self, data: &Value, name: &str) -> bool {
        matches!(self.validate_data(data, name), Ok(errors) if errors.is_empty())
    }

    /// `true` when the file exists, parses, and conforms.
    pub fn is_file_valid(&self, path: &Path, name: &str) -> bool {
        matches!(self.validate_file(path, name), Ok(errors) if errors.is_empty())
    }

    /// Well-known schema names, in map order.
    pub fn list_schemas(&self) -> Vec<&'static str> {
        SCHEMA_MAP.iter().map(|(name, _)| *name).collect()
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Number of schema documents currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }
}

/// One-shot [`SchemaValidator::validate_data`] with a throwaway validator.
pub fn validate_json(
    data: &Value,
    name: &str,
    schema_dir: &Path,
) -> Result<Vec<SchemaError>, DataLoadError> {
    SchemaValidator::new(schema_dir).validate_data(data, name)
}

/// One-shot [`SchemaValidator::validate_file`] with a throwaway validator.
pub fn validate_json_file(
    path: &Path,
    name: &str,
    schema_dir: &Path,
) -> Result<Vec<SchemaError>, DataLoadError> {
    SchemaValidator::new(schema_dir).validate_file(path, name)
}
