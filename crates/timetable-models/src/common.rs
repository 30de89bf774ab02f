//! Enumerations and small value types shared across stages.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Kind of teaching activity a subject component represents.
    pub enum ComponentType {
        Theory => "theory",
        Tutorial => "tutorial",
        Practical => "practical",
    }
}

string_enum! {
    pub enum RoomType {
        Lecture => "lecture",
        Lab => "lab",
    }
}

string_enum! {
    pub enum BreakType {
        Short => "short",
        Lunch => "lunch",
    }
}

string_enum! {
    /// Stage 1 subject classification.
    pub enum SubjectKind {
        Core => "core",
        Elective => "elective",
    }
}

string_enum! {
    /// Stage 2 subject classification; `diff` marks differently-scheduled subjects.
    pub enum SubjectFullKind {
        Core => "core",
        Elective => "elective",
        Diff => "diff",
    }
}

string_enum! {
    /// Priority of a special subject; `external` subjects are taught outside the department.
    pub enum SubjectPriority {
        High => "high",
        Medium => "medium",
        Low => "low",
        External => "external",
    }
}

string_enum! {
    pub enum AssignmentPriority {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

string_enum! {
    pub enum AssignmentRole {
        Primary => "primary",
        Supporting => "supporting",
    }
}

/// Generation timestamp on stage 3+ metadata.
///
/// Producers emit both zoned (`2024-01-15T10:00:00Z`) and naive
/// (`2024-01-15T10:00:00.123456`) forms. The original form is kept so a
/// record serializes back to an equivalent timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedAt {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl GeneratedAt {
    pub fn parse(s: &str) -> Result<Self, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Zoned(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(Self::Naive)
            .ok_or_else(|| format!("invalid datetime '{s}': expected ISO 8601"))
    }

    /// Wall-clock value, ignoring any offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }

    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Zoned(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

impl fmt::Display for GeneratedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for GeneratedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for GeneratedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        GeneratedAt::parse(&raw).map_err(serde::de::Error::custom)
    }
}
