//! # Error Types: Structured Error Taxonomy
//!
//! Every failure the pipeline reports is one of five kinds, wrapped by the
//! root [`TimetableError`]:
//!
//! | Kind | Context field(s) | Raised when |
//! |---|---|---|
//! | [`ValidationError`] | `field`, `value` | a record or document violates a rule |
//! | [`DataLoadError`] | `filepath` | a file is missing, unreadable, or not JSON |
//! | [`ConfigurationError`] | `config_key` | a setting is missing or malformed |
//! | [`StageError`] | `stage`, `operation` | a stage operation cannot proceed |
//! | [`SchedulingError`] | `constraint`, `session_id` | solver output breaks a constraint |
//!
//! Each kind carries a human-readable `message` and a free-form `details` map.
//! `Display` renders the context-prefixed form shown to users; `to_json()`
//! renders the structured form used by `--json` output.
//!
//! Library code returns these and never prints them. The CLI boundary is the
//! only place they become messages and exit codes.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Value};
use thiserror::Error;

/// Free-form structured context attached to every error.
pub type Details = BTreeMap<String, Value>;

/// Root error type for the timetable pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimetableError {
    /// Data failed a shape, range, or cross-reference rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A file could not be found, read, or parsed.
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    /// A setting is missing or invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A pipeline stage operation failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// A scheduling constraint was violated.
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

impl TimetableError {
    /// Name of the error kind, as emitted in `error_type`.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::DataLoad(_) => "DataLoadError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Stage(_) => "StageError",
            Self::Scheduling(_) => "SchedulingError",
        }
    }

    /// The bare message, without the context prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(e) => &e.message,
            Self::DataLoad(e) => &e.message,
            Self::Configuration(e) => &e.message,
            Self::Stage(e) => &e.message,
            Self::Scheduling(e) => &e.message,
        }
    }

    /// The structured details map.
    pub fn details(&self) -> &Details {
        match self {
            Self::Validation(e) => &e.details,
            Self::DataLoad(e) => &e.details,
            Self::Configuration(e) => &e.details,
            Self::Stage(e) => &e.details,
            Self::Scheduling(e) => &e.details,
        }
    }

    /// Structured JSON form: `error_type`, `message`, `details`, plus the
    /// kind-specific context fields.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Validation(e) => e.to_json(),
            Self::DataLoad(e) => e.to_json(),
            Self::Configuration(e) => e.to_json(),
            Self::Stage(e) => e.to_json(),
            Self::Scheduling(e) => e.to_json(),
        }
    }
}

/// `"{kind} {preposition} '{context}': {message}"`, or `"{kind}: {message}"`
/// without context.
fn with_context(kind: &str, preposition: &str, context: &Option<String>, message: &str) -> String {
    match context {
        Some(context) => format!("{kind} {preposition} '{context}': {message}"),
        None => format!("{kind}: {message}"),
    }
}

fn stage_display(stage: &Option<u8>, operation: &Option<String>, message: &str) -> String {
    let mut parts = Vec::new();
    if let Some(stage) = stage {
        parts.push(format!("Stage {stage}"));
    }
    if let Some(op) = operation {
        parts.push(format!("operation '{op}'"));
    }
    if parts.is_empty() {
        format!("Stage error: {message}")
    } else {
        format!("{}: {message}", parts.join(" "))
    }
}

fn scheduling_display(
    constraint: &Option<String>,
    session_id: &Option<String>,
    message: &str,
) -> String {
    let mut parts = Vec::new();
    if let Some(c) = constraint {
        parts.push(format!("constraint '{c}'"));
    }
    if let Some(s) = session_id {
        parts.push(format!("session '{s}'"));
    }
    if parts.is_empty() {
        format!("Scheduling error: {message}")
    } else {
        format!("Scheduling error ({}): {message}", parts.join(", "))
    }
}

fn base_json(error_type: &str, message: &str, details: &Details) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    map.insert("error_type".into(), Value::String(error_type.into()));
    map.insert("message".into(), Value::String(message.into()));
    map.insert(
        "details".into(),
        Value::Object(details.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
    );
    map
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Data failed a validation rule.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", with_context("Validation error", "in", .field, .message))]
pub struct ValidationError {
    /// What went wrong.
    pub message: String,
    /// Dotted path of the offending field, when one can be named.
    pub field: Option<String>,
    /// The offending value, when one can be shown.
    pub value: Option<Value>,
    /// Additional context (e.g. `filepath`, `errors`).
    pub details: Details,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            value: None,
            details: Details::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = base_json("ValidationError", &self.message, &self.details);
        map.insert("field".into(), json!(self.field));
        map.insert("value".into(), self.value.clone().unwrap_or(Value::Null));
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// DataLoadError
// ---------------------------------------------------------------------------

/// A file could not be located, read, or decoded.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", with_context("Data load error", "for", .filepath, .message))]
pub struct DataLoadError {
    pub message: String,
    /// Path of the file (or directory) that failed to load.
    pub filepath: Option<String>,
    pub details: Details,
}

impl DataLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            filepath: None,
            details: Details::new(),
        }
    }

    /// Shorthand for the common case of a message tied to a path.
    pub fn at(path: &Path, message: impl Into<String>) -> Self {
        Self::new(message).with_filepath(path)
    }

    pub fn with_filepath(mut self, path: &Path) -> Self {
        self.filepath = Some(path.display().to_string());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = base_json("DataLoadError", &self.message, &self.details);
        map.insert("filepath".into(), json!(self.filepath));
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// ConfigurationError
// ---------------------------------------------------------------------------

/// A setting is missing or malformed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", with_context("Configuration error", "for", .config_key, .message))]
pub struct ConfigurationError {
    pub message: String,
    /// The environment variable or file key at fault.
    pub config_key: Option<String>,
    pub details: Details,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            config_key: None,
            details: Details::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = base_json("ConfigurationError", &self.message, &self.details);
        map.insert("config_key".into(), json!(self.config_key));
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// StageError
// ---------------------------------------------------------------------------

/// A stage operation (build, validate, load) could not complete.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", stage_display(.stage, .operation, .message))]
pub struct StageError {
    pub message: String,
    /// Stage number, `1..=6`.
    pub stage: Option<u8>,
    /// Operation name, e.g. `"build"` or `"prerequisites"`.
    pub operation: Option<String>,
    pub details: Details,
}

impl StageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: None,
            operation: None,
            details: Details::new(),
        }
    }

    pub fn with_stage(mut self, stage: u8) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = base_json("StageError", &self.message, &self.details);
        map.insert("stage".into(), json!(self.stage));
        map.insert("operation".into(), json!(self.operation));
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// SchedulingError
// ---------------------------------------------------------------------------

/// A schedule violates a named constraint.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", scheduling_display(.constraint, .session_id, .message))]
pub struct SchedulingError {
    pub message: String,
    pub constraint: Option<String>,
    pub session_id: Option<String>,
    pub details: Details,
}

impl SchedulingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            constraint: None,
            session_id: None,
            details: Details::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut map = base_json("SchedulingError", &self.message, &self.details);
        map.insert("constraint".into(), json!(self.constraint));
        map.insert("session_id".into(), json!(self.session_id));
        Value::Object(map)
    }
}
