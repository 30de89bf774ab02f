//! # timetable-schema: Raw Document Validation
//!
//! Validates stage documents as plain JSON against the draft-07 schemas in
//! the `schemas/` directory, independently of the typed models in
//! `timetable-models`. The two checks can disagree; `timetable schema
//! validate` reports this side of the drift.
//!
//! ## Schema Resolution
//!
//! Well-known names map to files through [`SCHEMA_MAP`]. Any other name is
//! taken as a path relative to the schema directory. Cross-file `$ref`s
//! (every stage schema refers into `common.schema.json`) are read from the
//! same directory; nothing is fetched over the network.
//!
//! ## Crate Policy
//!
//! - Depends only on `timetable-core` internally.
//! - A [`SchemaValidator`] caches parsed schema documents behind a
//!   `RefCell` and is therefore `!Sync`. Build one per thread.
//! - Unreadable schemas and documents are `DataLoadError`s; rule
//!   violations are data ([`SchemaError`]), never errors.

pub mod validator;

pub use validator::{validate_json, validate_json_file, SchemaError, SchemaValidator, SCHEMA_MAP};
