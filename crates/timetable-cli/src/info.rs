//! # Info Subcommand
//!
//! Human-readable summaries of the pipeline data: configuration, faculty,
//! subjects, and the stage 4 scheduling input. `info all` walks every stage
//! and reports each one that cannot be loaded as a warning.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use timetable_core::{Settings, TimetableError};
use timetable_loader::DataLoader;

/// Arguments for the `timetable info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(subcommand)]
    pub command: InfoCommand,
}

/// Available info targets.
#[derive(Subcommand, Debug)]
pub enum InfoCommand {
    /// Working days, time slots, breaks, and rooms by type.
    Config,

    /// Faculty counts and workloads.
    Faculty {
        /// Stage to read faculty from (1 or 2).
        #[arg(short, long, default_value_t = 1)]
        stage: u8,
    },

    /// Subject counts per semester.
    Subjects {
        /// Stage to read subjects from (1 or 2).
        #[arg(short, long, default_value_t = 1)]
        stage: u8,

        /// Only subjects of this semester.
        #[arg(long)]
        semester: Option<u8>,
    },

    /// Stage 4 scheduling input summary.
    Scheduling,

    /// One line per stage for the whole data directory.
    All,
}

const FACULTY_SHOWN: usize = 10;
const SUBJECTS_SHOWN: usize = 15;
const ASSIGNMENTS_SHOWN: usize = 10;

/// Execute the info subcommand.
pub fn run_info(args: &InfoArgs, settings: &Settings) -> Result<u8> {
    let loader = crate::open_loader(settings)?;
    match &args.command {
        InfoCommand::Config => info_config(&loader)?,
        InfoCommand::Faculty { stage } => info_faculty(&loader, *stage)?,
        InfoCommand::Subjects { stage, semester } => info_subjects(&loader, *stage, *semester)?,
        InfoCommand::Scheduling => info_scheduling(&loader)?,
        InfoCommand::All => info_all(&loader),
    }
    Ok(0)
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {label:<26} {value}");
}

fn print_more(total: usize, shown: usize) {
    if total > shown {
        println!("  ... and {} more", total - shown);
    }
}

fn info_config(loader: &DataLoader) -> Result<()> {
    let file = loader.load_config()?;
    let config = &file.config;

    println!("Configuration Summary");
    row("Day Start", &config.day_start);
    row("Day End", &config.day_end);
    row("Working Days", config.weekdays.join(", "));
    row("Time Slots", config.time_slots.len());
    row("Rooms", config.resources.rooms.len());
    if !config.break_windows.is_empty() {
        row("Breaks", config.break_windows.len());
    }

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for room in &config.resources.rooms {
        *by_type.entry(room.room_type.as_str()).or_default() += 1;
    }
    println!("\nRooms by Type:");
    for (kind, count) in by_type {
        println!("  {kind}: {count}");
    }
    Ok(())
}

fn info_faculty(loader: &DataLoader, stage: u8) -> Result<()> {
    match stage {
        1 => {
            let file = loader.load_faculty()?;
            let subjects: usize = file
                .faculty
                .iter()
                .map(|f| f.assigned_subjects.len() + f.supporting_subjects.len())
                .sum();
            println!("Faculty Summary (Stage 1)");
            row("Total Faculty", file.faculty.len());
            row("Total Subject Assignments", subjects);

            println!("\nFaculty Members:");
            for (i, f) in file.faculty.iter().take(FACULTY_SHOWN).enumerate() {
                println!("  {}. {} ({})", i + 1, f.name, f.faculty_id);
            }
            print_more(file.faculty.len(), FACULTY_SHOWN);
        }
        2 => {
            let file = loader.load_faculty_full()?;
            let primary: usize = file.faculty.iter().map(|f| f.primary_assignments.len()).sum();
            let supporting: usize =
                file.faculty.iter().map(|f| f.supporting_assignments.len()).sum();
            println!("Faculty Summary (Stage 2)");
            row("Total Faculty", file.faculty.len());
            row("Primary Assignments", primary);
            row("Supporting Assignments", supporting);

            println!("\nFaculty Members:");
            for (i, f) in file.faculty.iter().take(FACULTY_SHOWN).enumerate() {
                println!(
                    "  {}. {} ({}) - Workload: {}h",
                    i + 1,
                    f.name,
                    f.faculty_id,
                    f.workload_stats.total_weekly_hours
                );
            }
            print_more(file.faculty.len(), FACULTY_SHOWN);
        }
        other => bail!("faculty info is available for stage 1 or 2, not {other}"),
    }
    Ok(())
}

fn info_subjects(loader: &DataLoader, stage: u8, semester: Option<u8>) -> Result<()> {
    let suffix = semester.map(|s| format!(" - Semester {s}")).unwrap_or_default();
    // (code, title, semester, component count)
    let subjects: Vec<(String, String, u8, Option<usize>)> = match stage {
        1 => loader
            .load_subjects(semester)?
            .subjects
            .into_iter()
            .map(|s| (s.subject_code, s.title, s.semester, None))
            .collect(),
        2 => loader
            .load_subjects_full()?
            .subjects
            .iter()
            .filter(|s| semester.map_or(true, |n| s.semester == n))
            .map(|s| {
                (s.subject_code.clone(), s.title.clone(), s.semester, Some(s.components.len()))
            })
            .collect(),
        other => bail!("subject info is available for stage 1 or 2, not {other}"),
    };

    println!("Subjects Summary (Stage {stage}){suffix}");
    row("Total Subjects", subjects.len());
    let mut by_semester: BTreeMap<u8, usize> = BTreeMap::new();
    for (_, _, sem, _) in &subjects {
        *by_semester.entry(*sem).or_default() += 1;
    }
    for (sem, count) in by_semester {
        row(&format!("Semester {sem}"), count);
    }
    if stage == 2 {
        let components: usize = subjects.iter().filter_map(|s| s.3).sum();
        row("Total Components", components);
    }

    println!("\nSubjects:");
    for (i, (code, title, _, components)) in subjects.iter().take(SUBJECTS_SHOWN).enumerate() {
        match components {
            Some(n) => println!("  {}. [{code}] {title} ({n} components)", i + 1),
            None => println!("  {}. [{code}] {title}", i + 1),
        }
    }
    print_more(subjects.len(), SUBJECTS_SHOWN);
    Ok(())
}

fn info_scheduling(loader: &DataLoader) -> Result<()> {
    let input = loader.load_scheduling_input()?;
    let meta = &input.metadata;

    println!("Scheduling Input Summary");
    row("Total Assignments", input.assignments.len());
    row("Semester 1 Assignments", meta.semester1_assignments);
    row("Semester 3 Assignments", meta.semester3_assignments);
    row("Sessions per Week", input.total_sessions());
    row("Time Slots", meta.total_time_slots);
    row("Rooms", meta.total_rooms);
    row("Working Days", input.configuration.weekdays.join(", "));

    let mut by_component: BTreeMap<&str, usize> = BTreeMap::new();
    for a in &input.assignments {
        *by_component.entry(a.component_type.as_str()).or_default() += 1;
    }
    println!("\nAssignments by Component Type:");
    for (kind, count) in by_component {
        println!("  {kind}: {count}");
    }

    println!("\nSample Assignments:");
    for (i, a) in input.assignments.iter().take(ASSIGNMENTS_SHOWN).enumerate() {
        println!("  {}. [{}] {}", i + 1, a.subject_code, a.subject_title);
        println!(
            "      Faculty: {}, Sessions: {}",
            a.faculty_name, a.sessions_per_week
        );
    }
    print_more(input.assignments.len(), ASSIGNMENTS_SHOWN);
    Ok(())
}

/// Per-stage one-line summaries, in pipeline order.
pub fn stage_summaries(loader: &DataLoader) -> Vec<(u8, Result<Vec<String>, TimetableError>)> {
    let stage1 = || -> Result<Vec<String>, TimetableError> {
        let config = loader.load_config()?;
        let faculty = loader.load_faculty()?;
        let subjects = loader.load_subjects(None)?;
        let groups = loader.load_student_groups()?;
        Ok(vec![
            format!(
                "Config: {} slots, {} rooms",
                config.config.time_slots.len(),
                config.config.resources.rooms.len()
            ),
            format!("Faculty: {} members", faculty.faculty.len()),
            format!("Subjects: {} total", subjects.subjects.len()),
            format!("Student Groups: {} groups", groups.student_groups.len()),
        ])
    };
    let stage2 = || -> Result<Vec<String>, TimetableError> {
        let data = loader.load_all_stage2()?;
        Ok(vec![
            format!("Faculty Full: {} with workload data", data.faculty_full.faculty.len()),
            format!("Subjects Full: {} with components", data.subjects_full.subjects.len()),
        ])
    };
    let stage3 = || -> Result<Vec<String>, TimetableError> {
        let mut lines: Vec<String> = loader
            .load_all_teaching_assignments()?
            .iter()
            .map(|(sem, file)| format!("Semester {sem}: {} assignments", file.assignments.len()))
            .collect();
        let stats = loader.load_statistics()?;
        lines.push(format!("Total: {} assignments", stats.combined.total_assignments));
        Ok(lines)
    };
    let stage4 = || -> Result<Vec<String>, TimetableError> {
        let input = loader.load_scheduling_input()?;
        Ok(vec![
            format!("Scheduling Input: {} assignments", input.assignments.len()),
            format!(
                "Time Slots: {}, Rooms: {}",
                input.metadata.total_time_slots, input.metadata.total_rooms
            ),
        ])
    };
    let stage5 = || -> Result<Vec<String>, TimetableError> {
        let schedule = loader.load_ai_schedule()?;
        Ok(vec![format!("AI Schedule: {} scheduled sessions", schedule.schedule.len())])
    };
    let stage6 = || -> Result<Vec<String>, TimetableError> {
        let timetable = loader.load_enriched_timetable()?;
        Ok(vec![format!(
            "Enriched Timetable: {} complete sessions",
            timetable.metadata.total_sessions
        )])
    };

    vec![
        (1, stage1()),
        (2, stage2()),
        (3, stage3()),
        (4, stage4()),
        (5, stage5()),
        (6, stage6()),
    ]
}

fn info_all(loader: &DataLoader) {
    println!("Timetable Data Summary");
    for (stage, summary) in stage_summaries(loader) {
        println!("\nStage {stage}");
        match summary {
            Ok(lines) => {
                for line in lines {
                    println!("  OK: {line}");
                }
            }
            Err(e) => println!("  WARN: {e}"),
        }
    }
}
