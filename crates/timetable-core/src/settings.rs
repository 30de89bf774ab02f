//! # Settings: Explicit Configuration Context
//!
//! [`Settings`] is built once at the process boundary and handed to the
//! loader, the schema validator, and the CLI handlers. Nothing below the CLI
//! reads the environment on its own.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults.
//! 2. An optional YAML file (`--config PATH`), keys named after the fields.
//! 3. `TIMETABLE_*` environment variables.
//!
//! | Field | Variable | Default |
//! |---|---|---|
//! | `data_dir` | `TIMETABLE_DATA_DIR` | `.` |
//! | `schemas_dir` | `TIMETABLE_SCHEMAS_DIR` | `<data_dir>/schemas` |
//! | `scripts_dir` | `TIMETABLE_SCRIPTS_DIR` | `<data_dir>/scripts` |
//! | `output_dir` | `TIMETABLE_OUTPUT_DIR` | `<data_dir>/exports` |
//! | `log_level` | `TIMETABLE_LOG_LEVEL` | `INFO` |
//! | `log_format` | `TIMETABLE_LOG_FORMAT` | `text` |
//! | `log_file` | `TIMETABLE_LOG_FILE` | none |
//! | `strict_mode` | `TIMETABLE_STRICT_MODE` | `false` |
//! | `script_interpreter` | `TIMETABLE_SCRIPT_INTERPRETER` | `python3` |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ConfigurationError;
use crate::stage::Stage;

pub const ENV_DATA_DIR: &str = "TIMETABLE_DATA_DIR";
pub const ENV_SCHEMAS_DIR: &str = "TIMETABLE_SCHEMAS_DIR";
pub const ENV_SCRIPTS_DIR: &str = "TIMETABLE_SCRIPTS_DIR";
pub const ENV_OUTPUT_DIR: &str = "TIMETABLE_OUTPUT_DIR";
pub const ENV_LOG_LEVEL: &str = "TIMETABLE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "TIMETABLE_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "TIMETABLE_LOG_FILE";
pub const ENV_STRICT_MODE: &str = "TIMETABLE_STRICT_MODE";
pub const ENV_SCRIPT_INTERPRETER: &str = "TIMETABLE_SCRIPT_INTERPRETER";

const DEFAULT_INTERPRETER: &str = "python3";

/// Log verbosity, named the way operators set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Directive for a `tracing_subscriber::EnvFilter`.
    pub fn as_filter_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `WARN` is accepted as an alias of `WARNING`.
impl FromStr for LogLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ConfigurationError::new(format!(
                "Invalid log level '{s}': expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL"
            ))
            .with_key(ENV_LOG_LEVEL)),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::new(format!(
                "Invalid log format '{s}': expected 'text' or 'json'"
            ))
            .with_key(ENV_LOG_FORMAT)),
        }
    }
}

/// Runtime configuration for the pipeline tools.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Root holding `stage_1/` … `stage_6/`.
    pub data_dir: PathBuf,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    /// Promote every cross-reference finding to an error.
    pub strict_mode: bool,
    /// Program used to run stage build scripts.
    pub script_interpreter: String,
    schemas_dir: Option<PathBuf>,
    scripts_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(".")
    }
}

/// On-disk settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    data_dir: Option<PathBuf>,
    schemas_dir: Option<PathBuf>,
    scripts_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_format: Option<String>,
    log_file: Option<PathBuf>,
    strict_mode: Option<bool>,
    script_interpreter: Option<String>,
}

impl Settings {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            log_file: None,
            strict_mode: false,
            script_interpreter: DEFAULT_INTERPRETER.to_string(),
            schemas_dir: None,
            scripts_dir: None,
            output_dir: None,
        }
    }

    /// Defaults overlaid with `TIMETABLE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let mut settings = Self::default();
        settings.apply_lookup(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Defaults overlaid with a YAML settings file.
    ///
    /// Relative paths in the file resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let mut settings = Self::default();
        settings.apply_file(path)?;
        Ok(settings)
    }

    /// File (if given) then environment, the order the CLI uses.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut settings = Self::default();
        if let Some(path) = config_file {
            settings.apply_file(path)?;
        }
        settings.apply_lookup(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigurationError> {
        let key = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::new(format!("cannot read settings file: {e}")).with_key(&key)
        })?;
        let file: SettingsFile = serde_yaml::from_str(&text).map_err(|e| {
            ConfigurationError::new(format!("invalid settings file: {e}")).with_key(&key)
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

        if let Some(p) = file.data_dir {
            self.data_dir = resolve(p);
        }
        if let Some(p) = file.schemas_dir {
            self.schemas_dir = Some(resolve(p));
        }
        if let Some(p) = file.scripts_dir {
            self.scripts_dir = Some(resolve(p));
        }
        if let Some(p) = file.output_dir {
            self.output_dir = Some(resolve(p));
        }
        if let Some(p) = file.log_file {
            self.log_file = Some(resolve(p));
        }
        if let Some(level) = file.log_level {
            self.log_level = level.parse().map_err(|e: ConfigurationError| e.with_key("log_level"))?;
        }
        if let Some(format) = file.log_format {
            self.log_format = format.parse().map_err(|e: ConfigurationError| e.with_key("log_format"))?;
        }
        if let Some(strict) = file.strict_mode {
            self.strict_mode = strict;
        }
        if let Some(interp) = file.script_interpreter {
            self.script_interpreter = interp;
        }
        Ok(())
    }

    /// Overlay values from an arbitrary key lookup. `from_env` passes
    /// `std::env::var`; tests pass a map.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_SCHEMAS_DIR) {
            self.schemas_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_SCRIPTS_DIR) {
            self.scripts_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            self.output_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_LOG_LEVEL) {
            self.log_level = v.parse()?;
        }
        if let Some(v) = get(ENV_LOG_FORMAT) {
            self.log_format = v.parse()?;
        }
        if let Some(v) = get(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_STRICT_MODE) {
            self.strict_mode = parse_bool(&v).ok_or_else(|| {
                ConfigurationError::new(format!("Invalid boolean '{v}'")).with_key(ENV_STRICT_MODE)
            })?;
        }
        if let Some(v) = get(ENV_SCRIPT_INTERPRETER) {
            self.script_interpreter = v;
        }
        Ok(())
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_schemas_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schemas_dir = Some(dir.into());
        self
    }

    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = Some(dir.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn schemas_dir(&self) -> PathBuf {
        self.schemas_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("schemas"))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.scripts_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("scripts"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("exports"))
    }

    /// `data_dir/stage_N`. Rejects stage numbers outside `1..=6`.
    pub fn stage_dir(&self, stage: u8) -> Result<PathBuf, ConfigurationError> {
        Ok(Stage::new(stage)?.dir(&self.data_dir))
    }

    pub fn is_debug(&self) -> bool {
        self.log_level == LogLevel::Debug
    }

    /// Flat JSON view with every derived directory resolved.
    pub fn to_json(&self) -> Value {
        json!({
            "data_dir": self.data_dir.display().to_string(),
            "schemas_dir": self.schemas_dir().display().to_string(),
            "scripts_dir": self.scripts_dir().display().to_string(),
            "output_dir": self.output_dir().display().to_string(),
            "log_level": self.log_level.as_str(),
            "log_format": self.log_format.as_str(),
            "log_file": self.log_file.as_ref().map(|p| p.display().to_string()),
            "strict_mode": self.strict_mode,
            "script_interpreter": self.script_interpreter,
        })
    }
}

impl Serialize for Settings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
