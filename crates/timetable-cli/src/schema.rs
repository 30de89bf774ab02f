//! # Schema Subcommand
//!
//! Lists the well-known schemas and validates a data file against one of
//! them. When `--file` is omitted the file is inferred from the schema name
//! using the stage layout.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use timetable_core::stage::files;
use timetable_core::Settings;
use timetable_schema::SchemaValidator;

/// Arguments for the `timetable schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// List well-known schema names and whether their files exist.
    List,

    /// Validate a data file against a schema.
    Validate {
        /// Schema name (see `schema list`) or a path under the schema directory.
        name: String,

        /// Data file; relative paths are tried under the data directory first.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

const ERRORS_SHOWN: usize = 10;

/// Data file checked by default for a schema name, relative to the data
/// directory. `subject` has no default because stage 1 splits subjects
/// across several files.
pub fn default_data_file(name: &str) -> Option<PathBuf> {
    let (stage, file) = match name {
        "config" => (1, files::CONFIG),
        "faculty" => (1, files::FACULTY_BASIC),
        "subjects_full" => (2, files::SUBJECTS_FULL),
        "faculty_full" => (2, files::FACULTY_FULL),
        "teaching_assignments" => (3, files::TEACHING_ASSIGNMENTS_SEM1),
        "overlap_constraints" => (3, files::OVERLAP_CONSTRAINTS),
        "statistics" => (3, files::STATISTICS),
        "scheduling_input" => (4, files::SCHEDULING_INPUT),
        "ai_schedule" => (5, files::AI_SCHEDULE),
        "enriched_timetable" => (6, files::ENRICHED_TIMETABLE),
        _ => return None,
    };
    Some(PathBuf::from(format!("stage_{stage}")).join(file))
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, settings: &Settings) -> Result<u8> {
    let validator = SchemaValidator::from_settings(settings);
    match &args.command {
        SchemaCommand::List => {
            println!("Schemas in {}:", validator.schema_dir().display());
            for name in validator.list_schemas() {
                let path = validator.resolve_path(name);
                let tag = if path.is_file() { "OK" } else { "MISSING" };
                println!("  {tag}: {name:<22} {}", path.display());
            }
            Ok(0)
        }
        SchemaCommand::Validate { name, file } => {
            let rel = match file.clone().or_else(|| default_data_file(name)) {
                Some(rel) => rel,
                None => bail!("no default data file for schema '{name}'; pass --file"),
            };
            let path = crate::resolve_path(&rel, &settings.data_dir);
            tracing::debug!(schema = %name, file = %path.display(), "validating against schema");

            let errors = validator.validate_file(&path, name)?;
            if errors.is_empty() {
                println!("OK: {} is valid against schema '{name}'", path.display());
                return Ok(0);
            }

            println!(
                "FAIL: {} has {} schema error(s) against '{name}'",
                path.display(),
                errors.len()
            );
            for e in errors.iter().take(ERRORS_SHOWN) {
                println!("  {e}");
            }
            if errors.len() > ERRORS_SHOWN {
                println!("  ... and {} more", errors.len() - ERRORS_SHOWN);
            }
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_files_follow_stage_layout() {
        assert_eq!(
            default_data_file("config"),
            Some(PathBuf::from("stage_1/config.json"))
        );
        assert_eq!(
            default_data_file("enriched_timetable"),
            Some(PathBuf::from("stage_6/timetable_enriched.json"))
        );
        assert_eq!(default_data_file("subject"), None);
    }

    #[test]
    fn every_defaulted_name_is_a_known_schema() {
        for (name, _) in timetable_schema::SCHEMA_MAP {
            if let Some(rel) = default_data_file(name) {
                assert!(rel.to_string_lossy().starts_with("stage_"), "{name}");
            }
        }
    }

    #[test]
    fn validate_reports_violations() {
        let dir = tempfile::tempdir().unwrap();
        let schemas = dir.path().join("schemas");
        std::fs::create_dir_all(&schemas).unwrap();
        std::fs::write(
            schemas.join("tiny.schema.json"),
            r#"{"type": "object", "required": ["id"]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("good.json"), r#"{"id": 1}"#).unwrap();
        std::fs::write(dir.path().join("bad.json"), r#"{}"#).unwrap();

        let settings = Settings::new(dir.path());
        let run = |file: &str| {
            let args = SchemaArgs {
                command: SchemaCommand::Validate {
                    name: "tiny".into(),
                    file: Some(PathBuf::from(file)),
                },
            };
            run_schema(&args, &settings).unwrap()
        };
        assert_eq!(run("good.json"), 0);
        assert_eq!(run("bad.json"), 1);
    }

    #[test]
    fn unknown_name_without_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = SchemaArgs {
            command: SchemaCommand::Validate {
                name: "custom".into(),
                file: None,
            },
        };
        assert!(run_schema(&args, &Settings::new(dir.path())).is_err());
    }
}
