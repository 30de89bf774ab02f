//! # Build Subcommand
//!
//! Regenerates a stage's files from the previous stage by running its build
//! scripts from `<scripts_dir>/stageN/`. Each script is invoked as
//! `<interpreter> <script> --data-dir <data_dir>` with the scripts directory
//! as working directory.
//!
//! Before any script runs, the previous stage is loaded through the typed
//! models. If that fails the stage is not built and a [`StageError`] is
//! reported. A missing script fails only its own step.
//!
//! ```bash
//! timetable build stage3 --no-reports
//! timetable build all
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use anyhow::Result;
use clap::Args;

use timetable_core::stage::ASSIGNMENT_SEMESTERS;
use timetable_core::{Settings, Stage, StageError, TimetableError};
use timetable_loader::DataLoader;

/// `stage2` … `stage6`, or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTarget {
    Stage(Stage),
    All,
}

impl BuildTarget {
    /// Stages to build, in pipeline order.
    pub fn stages(self) -> Vec<Stage> {
        match self {
            Self::Stage(stage) => vec![stage],
            Self::All => Stage::all().filter(|s| s.prerequisite().is_some()).collect(),
        }
    }
}

impl FromStr for BuildTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let stage: Stage = s.parse().map_err(|e: timetable_core::ConfigurationError| e.message)?;
        if stage.prerequisite().is_none() {
            return Err(format!("{stage} holds raw inputs and has no build step"));
        }
        Ok(Self::Stage(stage))
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(stage) => write!(f, "stage{}", stage.number()),
            Self::All => f.write_str("all"),
        }
    }
}

/// Arguments for the `timetable build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// `stage2` … `stage6`, or `all`.
    pub target: BuildTarget,

    /// Skip the validation scripts.
    #[arg(long)]
    pub no_validate: bool,

    /// Skip report generation (stage 3).
    #[arg(long)]
    pub no_reports: bool,

    /// Skip faculty and student views (stage 6).
    #[arg(long)]
    pub no_views: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub validate: bool,
    pub reports: bool,
    pub views: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            validate: true,
            reports: true,
            views: true,
        }
    }
}

impl From<&BuildArgs> for BuildOptions {
    fn from(args: &BuildArgs) -> Self {
        Self {
            validate: !args.no_validate,
            reports: !args.no_reports,
            views: !args.no_views,
        }
    }
}

/// One script in a stage build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStep {
    pub script: &'static str,
    pub description: &'static str,
}

const fn step(script: &'static str, description: &'static str) -> BuildStep {
    BuildStep {
        script,
        description,
    }
}

/// The scripts a stage build runs, in order.
pub fn plan(stage: Stage, opts: BuildOptions) -> Vec<BuildStep> {
    let mut steps = Vec::new();
    match stage.number() {
        2 => {
            steps.push(step("build_subjects_full.py", "Building subjects with components"));
            steps.push(step("build_faculty_full.py", "Building faculty with workload"));
            if opts.validate {
                steps.push(step("validate_stage2.py", "Validating Stage 2 data"));
            }
        }
        3 => {
            steps.push(step("generate_overlap_matrix.py", "Generating overlap constraints"));
            steps.push(step("build_assignments_sem3.py", "Building Semester 3 assignments"));
            steps.push(step("build_assignments_sem1.py", "Building Semester 1 assignments"));
            if opts.validate {
                steps.push(step("validate_stage3.py", "Validating assignments"));
            }
            steps.push(step("generate_statistics.py", "Generating statistics"));
            if opts.reports {
                steps.push(step("generate_reports.py", "Generating reports"));
            }
        }
        4 => {
            steps.push(step("build_scheduling_input.py", "Building scheduling input"));
            if opts.validate {
                steps.push(step("validate_stage4.py", "Validating Stage 4 data"));
            }
        }
        5 => {
            steps.push(step("generate_schedule_template.py", "Generating schedule template"));
            if opts.validate {
                steps.push(step("validate_stage5.py", "Validating Stage 5 data"));
            }
        }
        6 => {
            steps.push(step("enrich_schedule.py", "Enriching schedule with full details"));
            steps.push(step("analyze_schedule.py", "Analyzing schedule quality"));
            if opts.validate {
                steps.push(step("validate_assignments.py", "Validating enriched assignments"));
            }
            if opts.views {
                steps.push(step("generate_faculty_views.py", "Generating faculty views"));
                steps.push(step("generate_student_views.py", "Generating student views"));
            }
        }
        _ => {}
    }
    steps
}

/// Loads what `stage` is built from and summarizes it.
///
/// # Errors
///
/// `StageError` (operation `prerequisites`) when the previous stage's files
/// are missing or invalid.
pub fn check_prerequisites(loader: &DataLoader, stage: Stage) -> Result<String, StageError> {
    let summary = || -> Result<String, TimetableError> {
        Ok(match stage.number() {
            2 => {
                let subjects = loader.load_subjects(None)?;
                let faculty = loader.load_faculty()?;
                format!(
                    "Stage 1 data found: {} subjects, {} faculty",
                    subjects.subjects.len(),
                    faculty.faculty.len()
                )
            }
            3 => {
                let faculty = loader.load_faculty_full()?;
                let subjects = loader.load_subjects_full()?;
                format!(
                    "Stage 2 data found: {} subjects, {} faculty",
                    subjects.subjects.len(),
                    faculty.faculty.len()
                )
            }
            4 => {
                let counts = ASSIGNMENT_SEMESTERS
                    .iter()
                    .map(|&sem| {
                        loader
                            .load_teaching_assignments(sem)
                            .map(|f| format!("{} sem{sem}", f.assignments.len()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                loader.load_overlap_constraints()?;
                format!("Stage 3 data found: {} assignments", counts.join(", "))
            }
            5 => {
                let input = loader.load_scheduling_input()?;
                format!("Stage 4 data found: {} assignments", input.assignments.len())
            }
            6 => {
                let schedule = loader.load_ai_schedule()?;
                format!("Stage 5 data found: {} scheduled sessions", schedule.schedule.len())
            }
            _ => String::new(),
        })
    };

    summary().map_err(|e| {
        let previous = stage.number().saturating_sub(1);
        StageError::new(format!("Stage {previous} data not found or invalid: {e}"))
            .with_stage(stage.number())
            .with_operation("prerequisites")
            .with_detail("error_type", e.error_type())
    })
}

/// Outcome of one build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub description: String,
    pub success: bool,
    pub output: String,
}

impl StepResult {
    fn failed(description: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: false,
            output: output.into(),
        }
    }
}

/// Runs one script and captures its combined output.
pub fn run_script(interpreter: &str, script: &Path, data_dir: &Path, description: &str) -> StepResult {
    let mut cmd = Command::new(interpreter);
    cmd.arg(script).arg("--data-dir").arg(data_dir);
    if let Some(dir) = script.parent() {
        cmd.current_dir(dir);
    }
    tracing::debug!(script = %script.display(), interpreter, "running build script");

    match cmd.output() {
        Ok(out) => {
            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            StepResult {
                description: description.to_string(),
                success: out.status.success(),
                output,
            }
        }
        Err(e) => StepResult::failed(description, format!("Error: cannot run {interpreter}: {e}")),
    }
}

/// Builds one stage: scripts directory check, prerequisites, then each
/// planned script.
///
/// # Errors
///
/// `StageError` when the prerequisites are not met.
pub fn build_stage(
    settings: &Settings,
    loader: &DataLoader,
    stage: Stage,
    opts: BuildOptions,
) -> Result<Vec<StepResult>, StageError> {
    let n = stage.number();
    let scripts_dir = settings.scripts_dir().join(format!("stage{n}"));
    if !scripts_dir.is_dir() {
        return Ok(vec![StepResult::failed(
            format!("Stage {n} scripts"),
            format!("Scripts directory not found: {}", scripts_dir.display()),
        )]);
    }

    let summary = check_prerequisites(loader, stage)?;
    let mut results = vec![StepResult {
        description: "Prerequisites check".into(),
        success: true,
        output: summary,
    }];

    // Scripts run from their own directory, so hand them an absolute path.
    let data_dir: PathBuf =
        std::fs::canonicalize(loader.data_dir()).unwrap_or_else(|_| loader.data_dir().to_path_buf());

    for s in plan(stage, opts) {
        let script = scripts_dir.join(s.script);
        let result = if script.is_file() {
            run_script(&settings.script_interpreter, &script, &data_dir, s.description)
        } else {
            StepResult::failed(s.description, format!("Script not found: {}", script.display()))
        };
        tracing::info!(stage = n, script = s.script, success = result.success, "build step");
        results.push(result);
    }
    Ok(results)
}

/// Execute the build subcommand.
///
/// Returns exit code: 0 when every step of every built stage succeeded.
/// `build all` stops at the first stage whose prerequisites fail.
pub fn run_build(args: &BuildArgs, settings: &Settings) -> Result<u8> {
    let loader = crate::open_loader(settings)?;
    let opts = BuildOptions::from(args);
    let mut failed = false;

    for stage in args.target.stages() {
        println!("{stage}: {}", stage.description());
        // Scripts rewrite the previous stage's outputs between stages.
        loader.clear_cache();
        match build_stage(settings, &loader, stage, opts) {
            Ok(results) => {
                for r in &results {
                    if r.success {
                        println!("  OK: {}", r.description);
                    } else {
                        failed = true;
                        let first = r.output.lines().next().unwrap_or("");
                        println!("  FAIL: {}: {first}", r.description);
                    }
                    if !r.output.is_empty() {
                        tracing::debug!(step = %r.description, output = %r.output.trim_end());
                    }
                }
            }
            Err(e) => {
                println!("  FAIL: {e}");
                return Ok(1);
            }
        }
    }

    Ok(u8::from(failed))
}
