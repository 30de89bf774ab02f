//! # Load Subcommand
//!
//! Loads one entity through the typed models and prints it, either as a
//! short listing or, with `--json`, as the re-serialized record. Because the
//! record passes through the models first, `--json` output is the normalized
//! form rather than the raw file.

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};

use timetable_core::Settings;
use timetable_loader::DataLoader;

/// Entities the loader can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Entity {
    Config,
    Faculty,
    Subjects,
    StudentGroups,
    RoomPreferences,
    Assignments,
    Overlap,
    Statistics,
    SchedulingInput,
    AiSchedule,
    Timetable,
}

/// Arguments for the `timetable load` subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Entity to load.
    #[arg(value_enum)]
    pub entity: Entity,

    /// Stage to read faculty or subjects from (1 or 2).
    #[arg(short, long, default_value_t = 1)]
    pub stage: u8,

    /// Semester filter for subjects; selects the assignments file.
    #[arg(long)]
    pub semester: Option<u8>,

    /// Print the loaded record as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A loaded entity: its JSON form and a short human listing.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub json: Value,
    pub lines: Vec<String>,
}

impl Loaded {
    fn new<T: Serialize>(record: &T, lines: Vec<String>) -> Result<Self> {
        Ok(Self {
            json: serde_json::to_value(record)?,
            lines,
        })
    }
}

const LISTED: usize = 10;

fn truncated<I: ExactSizeIterator<Item = String>>(items: I) -> Vec<String> {
    let total = items.len();
    let mut lines: Vec<String> = items.take(LISTED).map(|l| format!("  {l}")).collect();
    if total > LISTED {
        lines.push(format!("  ... and {} more", total - LISTED));
    }
    lines
}

/// Load `args.entity` from the data directory.
pub fn load_entity(loader: &DataLoader, args: &LoadArgs) -> Result<Loaded> {
    match args.entity {
        Entity::Config => {
            let file = loader.load_config()?;
            let c = &file.config;
            let mut lines = vec![
                format!("Day: {} - {}", c.day_start, c.day_end),
                format!("Working Days: {}", c.weekdays.join(", ")),
                format!("Time Slots: {}", c.time_slots.len()),
                format!("Rooms: {}", c.resources.rooms.len()),
                format!("Breaks: {}", c.break_windows.len()),
            ];
            lines.extend(truncated(c.time_slots.iter().map(|s| {
                format!("Slot {}: {} - {} ({} min)", s.slot_id, s.start, s.end, s.length_minutes)
            })));
            Loaded::new(&*file, lines)
        }
        Entity::Faculty => match args.stage {
            1 => {
                let file = loader.load_faculty()?;
                let mut lines = vec![format!("Faculty: {}", file.faculty.len())];
                lines.extend(truncated(file.faculty.iter().map(|f| {
                    format!(
                        "{} {} ({}), {} assigned, {} supporting",
                        f.faculty_id,
                        f.name,
                        f.designation,
                        f.assigned_subjects.len(),
                        f.supporting_subjects.len()
                    )
                })));
                Loaded::new(&*file, lines)
            }
            2 => {
                let file = loader.load_faculty_full()?;
                let mut lines = vec![format!("Faculty: {}", file.faculty.len())];
                lines.extend(truncated(file.faculty.iter().map(|f| {
                    format!(
                        "{} {} ({}), {} subjects, {}h/week",
                        f.faculty_id,
                        f.name,
                        f.department,
                        f.total_subjects(),
                        f.workload_stats.total_weekly_hours
                    )
                })));
                Loaded::new(&*file, lines)
            }
            other => bail!("faculty is available for stage 1 or 2, not {other}"),
        },
        Entity::Subjects => match args.stage {
            1 => {
                let file = loader.load_subjects(args.semester)?;
                let mut lines = vec![format!("Subjects: {}", file.subjects.len())];
                lines.extend(truncated(file.subjects.iter().map(|s| {
                    format!(
                        "[{}] {} (semester {}, {} credits)",
                        s.subject_code, s.title, s.semester, s.total_credits
                    )
                })));
                Loaded::new(&file, lines)
            }
            2 => {
                let file = loader.load_subjects_full()?;
                let subjects = match args.semester {
                    Some(n) => file.subjects_by_semester(n),
                    None => file.subjects.iter().collect(),
                };
                let mut lines = vec![format!("Subjects: {}", subjects.len())];
                lines.extend(truncated(subjects.iter().map(|s| {
                    format!(
                        "[{}] {} (semester {}, {} components)",
                        s.subject_code,
                        s.title,
                        s.semester,
                        s.components.len()
                    )
                })));
                Loaded::new(&serde_json::json!({ "subjects": subjects }), lines)
            }
            other => bail!("subjects are available for stage 1 or 2, not {other}"),
        },
        Entity::StudentGroups => {
            let file = loader.load_student_groups()?;
            let mut lines = vec![
                format!("Student Groups: {}", file.student_groups.len()),
                format!("Elective Subject Groups: {}", file.elective_subject_groups.len()),
                format!("Elective Student Groups: {}", file.elective_student_groups.len()),
            ];
            lines.extend(truncated(file.student_groups.iter().map(|g| {
                format!(
                    "{} (semester {}, section {}, {} students)",
                    g.student_group_id, g.semester, g.section, g.student_count
                )
            })));
            Loaded::new(&*file, lines)
        }
        Entity::RoomPreferences => {
            let file = loader.load_room_preferences()?;
            let mut lines = vec![format!("Room Preferences: {}", file.room_preferences.len())];
            lines.extend(truncated(file.room_preferences.iter().map(|p| {
                format!(
                    "{} {} for {}: {}",
                    p.subject_code,
                    p.component_type,
                    p.student_group_id,
                    p.preferred_rooms.join(", ")
                )
            })));
            Loaded::new(&*file, lines)
        }
        Entity::Assignments => {
            let files = match args.semester {
                Some(n) => std::iter::once((n, loader.load_teaching_assignments(n)?)).collect(),
                None => loader.load_all_teaching_assignments()?,
            };
            let mut json = Map::new();
            let mut lines = Vec::new();
            for (sem, file) in &files {
                lines.push(format!(
                    "Semester {sem}: {} assignments, {} sessions/week",
                    file.assignments.len(),
                    file.total_sessions()
                ));
                lines.extend(truncated(file.assignments.iter().map(|a| {
                    format!(
                        "{} [{}] {} {} by {} x{}",
                        a.assignment_id,
                        a.subject_code,
                        a.component_type,
                        a.student_group_ids.join("+"),
                        a.faculty_id,
                        a.sessions_per_week
                    )
                })));
                json.insert(format!("semester{sem}"), serde_json::to_value(&**file)?);
            }
            Ok(Loaded {
                json: Value::Object(json),
                lines,
            })
        }
        Entity::Overlap => {
            let file = loader.load_overlap_constraints()?;
            let mut lines = vec![format!("Groups: {}", file.known_groups().len())];
            lines.extend(truncated(file.cannot_overlap_with.iter().map(|(group, others)| {
                format!(
                    "{group}: cannot overlap {}; parallel with {}",
                    others.join(", "),
                    file.parallel_groups(group).join(", ")
                )
            })));
            Loaded::new(&*file, lines)
        }
        Entity::Statistics => {
            let file = loader.load_statistics()?;
            let mut lines: Vec<String> = [&file.semester1, &file.semester3]
                .iter()
                .map(|s| {
                    format!(
                        "Semester {}: {} assignments, {} sessions, {}h",
                        s.semester, s.total_assignments, s.total_sessions, s.total_hours
                    )
                })
                .collect();
            lines.push(format!(
                "Combined: {} assignments, {} sessions, {}h",
                file.combined.total_assignments,
                file.combined.total_sessions,
                file.combined.total_hours
            ));
            Loaded::new(&*file, lines)
        }
        Entity::SchedulingInput => {
            let input = loader.load_scheduling_input()?;
            let m = &input.metadata;
            let lines = vec![
                format!(
                    "Assignments: {} (semester 1: {}, semester 3: {})",
                    m.total_assignments, m.semester1_assignments, m.semester3_assignments
                ),
                format!("Sessions per Week: {}", input.total_sessions()),
                format!("Time Slots: {}, Rooms: {}", m.total_time_slots, m.total_rooms),
                format!("Working Days: {}", input.configuration.weekdays.join(", ")),
            ];
            Loaded::new(&*input, lines)
        }
        Entity::AiSchedule => {
            let schedule = loader.load_ai_schedule()?;
            let mut lines = vec![format!("Sessions: {}", schedule.schedule.len())];
            lines.extend(truncated(schedule.schedule.iter().map(|s| {
                format!("{} {} {} in {}", s.assignment_id, s.day, s.slots.join("+"), s.room_id)
            })));
            Loaded::new(&*schedule, lines)
        }
        Entity::Timetable => {
            let timetable = loader.load_enriched_timetable()?;
            let mut lines = vec![format!(
                "Sessions: {} declared, {} listed",
                timetable.metadata.total_sessions,
                timetable.sessions.len()
            )];
            lines.extend(truncated(timetable.sessions.iter().map(|s| {
                format!(
                    "{} {} {} in {} ({})",
                    s.assignment_id,
                    s.day,
                    s.slots.join("+"),
                    s.room_id,
                    s.subject_code.as_deref().unwrap_or("-")
                )
            })));
            Loaded::new(&*timetable, lines)
        }
    }
}

/// Execute the load subcommand.
pub fn run_load(args: &LoadArgs, settings: &Settings) -> Result<u8> {
    let loader = crate::open_loader(settings)?;
    let loaded = load_entity(&loader, args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&loaded.json)?);
    } else {
        for line in &loaded.lines {
            println!("{line}");
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(entity: Entity) -> LoadArgs {
        LoadArgs {
            entity,
            stage: 1,
            semester: None,
            json: true,
        }
    }

    #[test]
    fn ai_schedule_round_trips_through_models() {
        let dir = tempfile::tempdir().unwrap();
        let stage5 = dir.path().join("stage_5");
        std::fs::create_dir_all(&stage5).unwrap();
        std::fs::write(
            stage5.join("ai_solved_schedule.json"),
            r#"{"schedule": [{"assignmentId": "TA-1", "day": "Mon", "slots": ["S1"], "roomId": "R1"}]}"#,
        )
        .unwrap();

        let loader = DataLoader::new(dir.path()).unwrap();
        let loaded = load_entity(&loader, &args(Entity::AiSchedule)).unwrap();
        assert_eq!(loaded.json["schedule"][0]["roomId"], "R1");
        assert_eq!(loaded.lines[0], "Sessions: 1");
        assert_eq!(loaded.lines[1], "  TA-1 Mon S1 in R1");
    }

    #[test]
    fn faculty_from_stage_three_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DataLoader::new(dir.path()).unwrap();
        let mut a = args(Entity::Faculty);
        a.stage = 3;
        assert!(load_entity(&loader, &a).is_err());
    }

    #[test]
    fn truncation_reports_remainder() {
        let lines = truncated((0..12).map(|i| i.to_string()).collect::<Vec<_>>().into_iter());
        assert_eq!(lines.len(), LISTED + 1);
        assert_eq!(lines.last().unwrap(), "  ... and 2 more");
    }

    #[test]
    fn entity_names_are_kebab_case() {
        let names: Vec<_> = Entity::value_variants()
            .iter()
            .filter_map(|e| e.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert!(names.contains(&"student-groups".to_string()));
        assert!(names.contains(&"ai-schedule".to_string()));
    }
}
