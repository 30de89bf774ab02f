//! # timetable-loader: Stage-Aware Data Loading
//!
//! Reads the pipeline's data directory into the typed records of
//! `timetable-models` and checks that the stages agree with one another.
//!
//! - [`json`]: path-aware JSON reading and model validation.
//! - [`DataLoader`]: cached per-stage loaders, typed stage aggregates, and
//!   the `validate_stage*` cross-reference checks.
//! - [`crossref`]: the checks themselves and the [`StrictPolicy`] that
//!   decides which findings are errors.
//! - [`schedule`]: hard-constraint checks of solver output.
//! - [`files`]: one-shot loaders for a single file at any path.
//!
//! ## Crate Policy
//!
//! - Depends on `timetable-core` and `timetable-models` internally. Schema
//!   validation (`timetable-schema`) is a separate check.
//! - I/O and JSON failures are `DataLoadError`; shape and rule failures are
//!   `ValidationError`. Nothing is retried.
//! - Loaders take their settings explicitly; there is no global state.

pub mod crossref;
pub mod files;
pub mod json;
pub mod loader;
pub mod schedule;

pub use crossref::{CrossRefCategory, Finding, StrictPolicy};
pub use json::{load_and_validate, load_json, validate_model};
pub use loader::{DataLoader, Stage1Data, Stage2Data, Stage3Data};
