//! # timetable CLI entry point
//!
//! Parses command-line arguments, resolves [`Settings`], installs logging,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use timetable_cli::build::{run_build, BuildArgs};
use timetable_cli::export::{run_export, ExportArgs};
use timetable_cli::info::{run_info, InfoArgs};
use timetable_cli::load::{run_load, LoadArgs};
use timetable_cli::logging;
use timetable_cli::schema::{run_schema, SchemaArgs};
use timetable_cli::status::{run_status, StatusArgs};
use timetable_cli::validate::{run_validate, ValidateArgs};
use timetable_core::Settings;

/// Timetable pipeline CLI.
///
/// Inspects, validates, exports, and builds the six-stage timetable data
/// directory.
#[derive(Parser, Debug)]
#[command(name = "timetable", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to a YAML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding stage_1/ … stage_6/.
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat cross-reference findings as errors.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which stage files are present.
    Status(StatusArgs),

    /// Validate stage data against model rules and cross-stage references.
    Validate(ValidateArgs),

    /// Summarize configuration, faculty, subjects, or scheduling input.
    Info(InfoArgs),

    /// Load one entity and print it.
    Load(LoadArgs),

    /// List schemas or validate a file against one.
    Schema(SchemaArgs),

    /// Export entities as JSON, CSV, or Markdown.
    Export(ExportArgs),

    /// Run a stage's build scripts after checking its prerequisites.
    Build(BuildArgs),
}

impl Cli {
    /// Settings file and environment, then command-line overrides.
    fn settings(&self) -> Result<Settings, timetable_core::ConfigurationError> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            settings = settings.with_data_dir(dir);
        }
        if self.strict {
            settings = settings.with_strict_mode(true);
        }
        Ok(settings)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("FAIL: {e}");
            return ExitCode::from(1);
        }
    };
    if let Err(e) = logging::init(&settings, cli.verbose, cli.quiet) {
        eprintln!("FAIL: {e:#}");
        return ExitCode::from(1);
    }

    tracing::debug!(
        data_dir = %settings.data_dir.display(),
        strict = settings.strict_mode,
        "timetable CLI starting"
    );

    let result = match &cli.command {
        Commands::Status(args) => run_status(args, &settings),
        Commands::Validate(args) => run_validate(args, &settings),
        Commands::Info(args) => run_info(args, &settings),
        Commands::Load(args) => run_load(args, &settings),
        Commands::Schema(args) => run_schema(args, &settings),
        Commands::Export(args) => run_export(args, &settings),
        Commands::Build(args) => run_build(args, &settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use timetable_cli::build::BuildTarget;
    use timetable_cli::export::{ExportEntity, ExportFormat};
    use timetable_cli::info::InfoCommand;
    use timetable_cli::load::Entity;
    use timetable_cli::schema::SchemaCommand;

    #[test]
    fn cli_parse_validate_stage() {
        let cli = Cli::try_parse_from(["timetable", "validate", "--stage", "stage_3"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.stage.map(|s| s.number()), Some(3));
            assert!(!args.all);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_stage_and_all_conflict() {
        assert!(Cli::try_parse_from(["timetable", "validate", "-s", "2", "--all"]).is_err());
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "timetable", "validate", "--all", "--strict", "-vv", "--data-dir", "/data",
        ])
        .unwrap();
        assert!(cli.strict);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/data")));
    }

    #[test]
    fn cli_parse_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["timetable", "-q", "-v", "status"]).is_err());
        let cli = Cli::try_parse_from(["timetable", "status", "-q", "--json"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn cli_parse_info_subjects() {
        let cli = Cli::try_parse_from([
            "timetable", "info", "subjects", "--stage", "2", "--semester", "3",
        ])
        .unwrap();
        if let Commands::Info(args) = cli.command {
            assert!(matches!(
                args.command,
                InfoCommand::Subjects { stage: 2, semester: Some(3) }
            ));
        } else {
            panic!("expected info");
        }
    }

    #[test]
    fn cli_parse_load_entity() {
        let cli = Cli::try_parse_from(["timetable", "load", "scheduling-input", "--json"]).unwrap();
        if let Commands::Load(args) = cli.command {
            assert_eq!(args.entity, Entity::SchedulingInput);
            assert!(args.json);
        } else {
            panic!("expected load");
        }
    }

    #[test]
    fn cli_parse_schema_validate() {
        let cli =
            Cli::try_parse_from(["timetable", "schema", "validate", "config", "-f", "x.json"])
                .unwrap();
        if let Commands::Schema(args) = cli.command {
            match args.command {
                SchemaCommand::Validate { name, file } => {
                    assert_eq!(name, "config");
                    assert_eq!(file, Some(PathBuf::from("x.json")));
                }
                SchemaCommand::List => panic!("expected validate"),
            }
        }
    }

    #[test]
    fn cli_parse_export_defaults() {
        let cli = Cli::try_parse_from(["timetable", "export", "faculty"]).unwrap();
        if let Commands::Export(args) = cli.command {
            assert_eq!(args.entity, ExportEntity::Faculty);
            assert_eq!(args.format, ExportFormat::Json);
            assert_eq!(args.stage, 2);
            assert!(args.output.is_none());
        }
        let cli = Cli::try_parse_from(["timetable", "export", "all", "-f", "md"]).unwrap();
        if let Commands::Export(args) = cli.command {
            assert_eq!(args.format, ExportFormat::Md);
        }
    }

    #[test]
    fn cli_parse_build_targets() {
        let cli = Cli::try_parse_from(["timetable", "build", "stage4", "--no-validate"]).unwrap();
        if let Commands::Build(args) = cli.command {
            assert_eq!(args.target, "4".parse::<BuildTarget>().unwrap());
            assert!(args.no_validate);
        }
        assert!(Cli::try_parse_from(["timetable", "build", "stage1"]).is_err());
    }

    #[test]
    fn settings_apply_overrides() {
        let cli = Cli::try_parse_from(["timetable", "--strict", "-d", "/srv/data", "status"]).unwrap();
        let settings = cli.settings().unwrap();
        assert!(settings.strict_mode);
        assert_eq!(settings.data_dir, PathBuf::from("/srv/data"));
    }
}
