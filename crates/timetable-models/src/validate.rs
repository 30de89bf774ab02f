//! # Model Validation
//!
//! Parsing a stage record happens in two passes:
//!
//! 1. **Decode.** `serde` enforces shape: required fields, JSON types,
//!    enumerated literals, fixed-length arrays, and (for closed records)
//!    rejection of unknown fields.
//! 2. **Validate.** [`Validate`] enforces what types alone cannot: numeric
//!    ranges, non-empty identifiers, time formats, and cross-field rules
//!    such as a subject's credit total.
//!
//! Both passes report through [`ModelError`], which converts into the core
//! [`ValidationError`] without losing the field path or offending value.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment as PathSegment;
use thiserror::Error;

use timetable_core::ValidationError;

/// One rule violation at a dotted field path (`faculty[2].facultyId`).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
    pub value: Option<Value>,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Failure to construct a typed record from JSON.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The JSON did not have the record's shape.
    #[error("{0}")]
    Decode(FieldViolation),

    /// The JSON decoded but broke one or more rules.
    #[error("{} rule violation(s), first: {}", .0.len(), .0[0])]
    Invalid(Vec<FieldViolation>),
}

impl ModelError {
    /// All violations, in discovery order.
    pub fn violations(&self) -> Vec<&FieldViolation> {
        match self {
            Self::Decode(v) => vec![v],
            Self::Invalid(vs) => vs.iter().collect(),
        }
    }
}

impl From<ModelError> for ValidationError {
    fn from(err: ModelError) -> Self {
        let message = format!("Model validation failed: {err}");
        let violations = err.violations();
        let errors: Vec<Value> = violations
            .iter()
            .map(|v| {
                serde_json::json!({
                    "path": v.path,
                    "message": v.message,
                    "value": v.value,
                })
            })
            .collect();

        let mut out = ValidationError::new(message).with_detail("errors", Value::Array(errors));
        if let Some(first) = violations.first() {
            if !first.path.is_empty() {
                out = out.with_field(first.path.clone());
            }
            if let Some(value) = &first.value {
                out = out.with_value(value.clone());
            }
        }
        out
    }
}

/// Rules beyond what the type shape enforces.
pub trait Validate {
    /// Push every violation found under `path` into `out`.
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>);

    /// Validate from the root, returning all violations at once.
    fn validate(&self) -> Result<(), ModelError> {
        let mut out = Vec::new();
        self.validate_at("", &mut out);
        if out.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Invalid(out))
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        for (i, item) in self.iter().enumerate() {
            item.validate_at(&format!("{path}[{i}]"), out);
        }
    }
}

/// Decode and validate a record from a JSON value.
pub fn from_value<T>(value: Value) -> Result<T, ModelError>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_path_to_error::deserialize(&value)
        .map_err(|e| ModelError::Decode(decode_violation(&value, &e)))?;
    record.validate()?;
    Ok(record)
}

/// Decode and validate a record from JSON text.
pub fn from_str<T>(text: &str) -> Result<T, ModelError>
where
    T: DeserializeOwned + Validate,
{
    let value: Value = serde_json::from_str(text).map_err(|e| {
        ModelError::Decode(FieldViolation {
            path: String::new(),
            message: e.to_string(),
            value: None,
        })
    })?;
    from_value(value)
}

/// Turn a decode failure into a violation at the full path of the failing
/// field, carrying the input value found there.
///
/// Missing, unknown, and duplicate field errors are reported at the
/// enclosing record; the field named in backticks is appended to the path.
fn decode_violation(input: &Value, err: &serde_path_to_error::Error<serde_json::Error>) -> FieldViolation {
    let message = err.inner().to_string();

    let mut keys: Vec<Segment<'_>> = err
        .path()
        .iter()
        .filter_map(|segment| match segment {
            PathSegment::Seq { index } => Some(Segment::Index(*index)),
            PathSegment::Map { key } => Some(Segment::Key(key.as_str())),
            PathSegment::Enum { variant } => Some(Segment::Key(variant.as_str())),
            PathSegment::Unknown => None,
        })
        .collect();

    let named = ["missing field `", "unknown field `", "duplicate field `"]
        .iter()
        .find_map(|marker| {
            let start = message.find(marker)? + marker.len();
            let len = message[start..].find('`')?;
            Some(&message[start..start + len])
        });
    if let Some(name) = named {
        if !matches!(keys.last(), Some(Segment::Key(last)) if *last == name) {
            keys.push(Segment::Key(name));
        }
    }

    let mut path = String::new();
    let mut value = Some(input);
    for key in &keys {
        match key {
            Segment::Index(i) => {
                path.push_str(&format!("[{i}]"));
                value = value.and_then(|v| v.get(*i));
            }
            Segment::Key(k) => {
                path = field(&path, k);
                value = value.and_then(|v| v.get(*k));
            }
        }
    }

    let value = value.filter(|_| !keys.is_empty()).cloned();
    FieldViolation {
        path,
        message,
        value,
    }
}

enum Segment<'a> {
    Index(usize),
    Key(&'a str),
}

// ---------------------------------------------------------------------------
// Rule helpers shared by the stage modules
// ---------------------------------------------------------------------------

pub(crate) fn field(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

pub(crate) fn require_non_empty(out: &mut Vec<FieldViolation>, base: &str, name: &str, value: &str) {
    if value.is_empty() {
        out.push(FieldViolation {
            path: field(base, name),
            message: "must not be empty".into(),
            value: Some(Value::String(value.to_string())),
        });
    }
}

pub(crate) fn require_at_least(out: &mut Vec<FieldViolation>, base: &str, name: &str, value: u32, min: u32) {
    if value < min {
        out.push(FieldViolation {
            path: field(base, name),
            message: format!("must be >= {min}"),
            value: Some(Value::from(value)),
        });
    }
}

pub(crate) fn require_semester(out: &mut Vec<FieldViolation>, base: &str, value: u8) {
    if !(1..=8).contains(&value) {
        out.push(FieldViolation {
            path: field(base, "semester"),
            message: "must be between 1 and 8".into(),
            value: Some(Value::from(value)),
        });
    }
}

pub(crate) fn require_non_negative(out: &mut Vec<FieldViolation>, base: &str, name: &str, value: f64) {
    if !(value >= 0.0) {
        out.push(FieldViolation {
            path: field(base, name),
            message: "must be >= 0".into(),
            value: serde_json::Number::from_f64(value).map(Value::Number),
        });
    }
}

/// `HH:MM`, 24-hour.
pub(crate) fn require_clock_time(out: &mut Vec<FieldViolation>, base: &str, name: &str, value: &str) {
    if !is_clock_time(value) {
        out.push(FieldViolation {
            path: field(base, name),
            message: format!("Time must be in HH:MM format, got: {value}"),
            value: Some(Value::String(value.to_string())),
        });
    }
}

pub(crate) fn is_clock_time(value: &str) -> bool {
    let Some((h, m)) = value.split_once(':') else {
        return false;
    };
    match (h.parse::<u8>(), m.parse::<u8>()) {
        (Ok(h), Ok(m)) => h <= 23 && m <= 59,
        _ => false,
    }
}
