//! # Validate Subcommand
//!
//! Loads each requested stage through the typed models and runs its
//! cross-stage checks. Load and rule failures are errors; cross-reference
//! findings are warnings unless `--strict` promotes them.
//!
//! With `--all`, stages whose directory does not exist yet are skipped so a
//! partially built pipeline can still be checked.

use anyhow::Result;
use clap::Args;

use timetable_core::{Settings, Stage};
use timetable_loader::DataLoader;

/// Arguments for the `timetable validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Stage to validate (`3`, `stage3`, or `stage_3`).
    #[arg(short, long, value_name = "N")]
    pub stage: Option<Stage>,

    /// Validate every stage whose directory exists.
    #[arg(short, long, conflicts_with = "stage")]
    pub all: bool,
}

/// Outcome of validating one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Passed { warnings: Vec<String> },
    Failed { error: String },
    Skipped,
}

/// Validate one stage. `skip_absent` turns a missing stage directory into
/// [`StageOutcome::Skipped`].
pub fn validate_one(loader: &DataLoader, stage: Stage, skip_absent: bool) -> StageOutcome {
    if skip_absent && !stage.dir(loader.data_dir()).is_dir() {
        return StageOutcome::Skipped;
    }
    match loader.validate_stage(stage.number()) {
        Ok(warnings) => StageOutcome::Passed { warnings },
        Err(e) => StageOutcome::Failed { error: e.to_string() },
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every checked stage passed, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, settings: &Settings) -> Result<u8> {
    let stages: Vec<Stage> = match (args.stage, args.all) {
        (Some(stage), _) => vec![stage],
        (None, true) => Stage::all().collect(),
        (None, false) => {
            println!("Usage: timetable validate (--stage N | --all) [--strict]");
            return Ok(1);
        }
    };

    let loader = crate::open_loader(settings)?;
    tracing::info!(
        stages = stages.len(),
        strict = settings.strict_mode,
        "validating data directory"
    );

    let mut failed = 0usize;
    let mut checked = 0usize;
    for stage in stages {
        match validate_one(&loader, stage, args.all) {
            StageOutcome::Passed { warnings } => {
                checked += 1;
                println!("OK: {stage} validation passed");
                for w in &warnings {
                    println!("  WARN: {w}");
                }
            }
            StageOutcome::Failed { error } => {
                checked += 1;
                failed += 1;
                println!("FAIL: {stage}: {error}");
            }
            StageOutcome::Skipped => {
                println!("WARN: {stage} skipped, {} not found", stage.dir_name());
            }
        }
    }

    if failed > 0 {
        println!("\n{failed} of {checked} stage(s) failed validation.");
        Ok(1)
    } else {
        println!("\nAll {checked} stage(s) passed validation.");
        Ok(0)
    }
}
