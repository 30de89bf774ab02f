//! # Status Subcommand
//!
//! Reports which stage directories and files exist under the data
//! directory. Purely informational: it never parses the files and always
//! exits 0.

use anyhow::Result;
use clap::Args;
use serde_json::{json, Value};

use timetable_core::{Settings, Stage};

/// Arguments for the `timetable status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the settings and stage report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Presence of one stage's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    pub stage: Stage,
    pub dir_exists: bool,
    pub present: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

impl StageStatus {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    fn to_json(&self) -> Value {
        json!({
            "stage": self.stage.number(),
            "description": self.stage.description(),
            "directory": self.stage.dir_name(),
            "exists": self.dir_exists,
            "present": self.present,
            "missing": self.missing,
        })
    }
}

/// Scan every stage directory under `settings.data_dir`.
pub fn scan(settings: &Settings) -> Vec<StageStatus> {
    Stage::all()
        .map(|stage| {
            let dir = stage.dir(&settings.data_dir);
            let (present, missing): (Vec<&'static str>, Vec<&'static str>) = stage
                .files()
                .iter()
                .copied()
                .partition(|name| dir.join(name).is_file());
            StageStatus {
                stage,
                dir_exists: dir.is_dir(),
                present,
                missing,
            }
        })
        .collect()
}

/// Execute the status subcommand.
pub fn run_status(args: &StatusArgs, settings: &Settings) -> Result<u8> {
    let report = scan(settings);

    if args.json {
        let out = json!({
            "settings": settings.to_json(),
            "stages": report.iter().map(StageStatus::to_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(0);
    }

    println!("Data directory: {}", settings.data_dir.display());
    for s in &report {
        let total = s.present.len() + s.missing.len();
        let tag = if !s.dir_exists {
            "MISSING"
        } else if s.is_complete() {
            "OK"
        } else {
            "PARTIAL"
        };
        println!(
            "  {tag}: {} {:<40} {}/{} files",
            s.stage.dir_name(),
            s.stage.description(),
            s.present.len(),
            total
        );
        if s.dir_exists {
            for name in &s.missing {
                println!("      missing {name}");
            }
        }
    }
    Ok(0)
}
