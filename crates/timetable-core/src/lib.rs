//! # timetable-core: Foundational Types for the Timetable Pipeline
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! pieces every other crate agrees on:
//!
//! 1. **One error taxonomy.** [`TimetableError`] wraps five structured error
//!    kinds. Each carries a message, a `details` map, and its own context
//!    field (field name, file path, config key, stage/operation, or
//!    constraint/session).
//!
//! 2. **An explicit settings context.** [`Settings`] is built once at the
//!    process boundary (environment, YAML file, or by hand) and passed down.
//!    Library code never reads process-wide configuration on its own.
//!
//! 3. **Stage numbering.** [`Stage`] is a validated `1..=6` stage number that
//!    knows its directory name and the fixed filenames it holds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `timetable-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod json;
pub mod settings;
pub mod stage;

pub use error::{
    ConfigurationError, DataLoadError, Details, SchedulingError, StageError, TimetableError,
    ValidationError,
};
pub use json::read_json;
pub use settings::{LogFormat, LogLevel, Settings};
pub use stage::{Stage, STAGE_COUNT};
