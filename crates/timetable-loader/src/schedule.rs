//! # Solver Output Checks
//!
//! The solver is opaque, so its output is checked against the problem it
//! was given. Every placed session must name a stage 4 assignment and room;
//! no room, faculty member, or student group may be in two places in the
//! same slot; and each assignment must receive exactly its weekly sessions.
//!
//! Violations are hard constraints and come back as [`SchedulingError`]s
//! regardless of the strict policy.

use std::collections::{BTreeMap, BTreeSet};

use timetable_core::SchedulingError;
use timetable_models::stage4::SchedulingAssignment;
use timetable_models::{AiSchedule, SchedulingInput, StudentGroupOverlapConstraints};

pub const UNKNOWN_REFERENCE: &str = "unknown_reference";
pub const ROOM_CONFLICT: &str = "room_conflict";
pub const FACULTY_CONFLICT: &str = "faculty_conflict";
pub const GROUP_CONFLICT: &str = "group_conflict";
pub const SESSION_COUNT: &str = "session_count";

/// A placed session resolved against its assignment.
struct Placement<'a> {
    session_id: String,
    room_id: &'a str,
    assignment: &'a SchedulingAssignment,
}

/// Two distinct groups may share a slot when the overlap matrix allows it
/// or lists them as parallel. A group never shares a slot with itself.
fn groups_clash(overlap: &StudentGroupOverlapConstraints, a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let parallel = overlap.parallel_groups(a).iter().any(|g| g == b)
        || overlap.parallel_groups(b).iter().any(|g| g == a);
    !parallel && !overlap.can_schedule_together(a, b)
}

/// Check `schedule` against `input`.
pub fn check_schedule(input: &SchedulingInput, schedule: &AiSchedule) -> Vec<SchedulingError> {
    let mut out = Vec::new();
    let known_rooms: BTreeSet<&str> = input.rooms.iter().map(|r| r.room_id.as_str()).collect();
    let overlap = &input.constraints.student_group_overlap;

    // (day, slot) -> placements occupying it.
    let mut occupancy: BTreeMap<(&str, &str), Vec<Placement<'_>>> = BTreeMap::new();

    for session in &schedule.schedule {
        let session_id = session.session_id();
        let Some(assignment) = input.get_assignment(&session.assignment_id) else {
            out.push(
                SchedulingError::new(format!(
                    "Session references unknown assignment: {}",
                    session.assignment_id
                ))
                .with_constraint(UNKNOWN_REFERENCE)
                .with_session(session_id),
            );
            continue;
        };
        if !known_rooms.is_empty() && !known_rooms.contains(session.room_id.as_str()) {
            out.push(
                SchedulingError::new(format!("Session references unknown room: {}", session.room_id))
                    .with_constraint(UNKNOWN_REFERENCE)
                    .with_session(session_id.clone()),
            );
        }
        // A slot listed twice is still one occupancy.
        let slots: BTreeSet<&str> = session.slots.iter().map(String::as_str).collect();
        for slot in slots {
            occupancy
                .entry((session.day.as_str(), slot))
                .or_default()
                .push(Placement {
                    session_id: session_id.clone(),
                    room_id: &session.room_id,
                    assignment,
                });
        }
    }

    // Multi-slot sessions meet in several slots; report each clash once.
    let mut reported: BTreeSet<(&'static str, String, String)> = BTreeSet::new();
    for ((day, slot), placements) in &occupancy {
        for (i, a) in placements.iter().enumerate() {
            for b in &placements[i + 1..] {
                let mut clash = |constraint: &'static str, what: String| {
                    let key = (constraint, a.session_id.clone(), b.session_id.clone());
                    if reported.insert(key) {
                        out.push(
                            SchedulingError::new(format!(
                                "{what} double-booked on {day} {slot}: {} and {}",
                                a.session_id, b.session_id
                            ))
                            .with_constraint(constraint)
                            .with_session(b.session_id.clone())
                            .with_detail("other_session", a.session_id.clone())
                            .with_detail("day", *day)
                            .with_detail("slot", *slot),
                        );
                    }
                };

                if a.room_id == b.room_id {
                    clash(ROOM_CONFLICT, format!("Room {}", a.room_id));
                }
                if a.assignment.faculty_id == b.assignment.faculty_id {
                    clash(FACULTY_CONFLICT, format!("Faculty {}", a.assignment.faculty_id));
                }
                let shared_group = a.assignment.student_group_ids.iter().find_map(|ga| {
                    b.assignment
                        .student_group_ids
                        .iter()
                        .find(|gb| groups_clash(overlap, ga, gb))
                        .map(|gb| (ga, gb))
                });
                if let Some((ga, gb)) = shared_group {
                    let what = if ga == gb {
                        format!("Student group {ga}")
                    } else {
                        format!("Student groups {ga} and {gb}")
                    };
                    clash(GROUP_CONFLICT, what);
                }
            }
        }
    }

    let placed = schedule.counts_by_assignment();
    for assignment in &input.assignments {
        let count = placed.get(assignment.assignment_id.as_str()).copied().unwrap_or(0);
        if count != assignment.sessions_per_week {
            out.push(
                SchedulingError::new(format!(
                    "Assignment {} needs {} sessions per week but {count} were placed",
                    assignment.assignment_id, assignment.sessions_per_week
                ))
                .with_constraint(SESSION_COUNT)
                .with_detail("assignment_id", assignment.assignment_id.clone())
                .with_detail("expected", assignment.sessions_per_week)
                .with_detail("placed", count),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use timetable_models::from_value;

    fn assignment(id: &str, faculty: &str, groups: &[&str], sessions: u32) -> Value {
        json!({
            "assignmentId": id, "subjectCode": "CS101", "subjectTitle": "IP",
            "componentType": "theory", "semester": 1, "facultyId": faculty,
            "facultyName": faculty, "studentGroupIds": groups,
            "sessionDuration": 55, "sessionsPerWeek": sessions,
            "requiresRoomType": "lecture", "priority": "high"
        })
    }

    fn input(assignments: Vec<Value>, overlap: Value) -> SchedulingInput {
        let n = assignments.len();
        let mut matrix = json!({"cannotOverlapWith": {}, "canRunParallelWith": {}});
        if let Value::Object(entries) = overlap {
            matrix.as_object_mut().unwrap().extend(entries);
        }
        from_value(json!({
            "metadata": {
                "totalAssignments": n, "semester1Assignments": n, "semester3Assignments": 0,
                "totalTimeSlots": 2, "totalRooms": 2
            },
            "rooms": [
                {"roomId": "R1", "type": "lecture", "capacity": 60},
                {"roomId": "R2", "type": "lecture", "capacity": 60}
            ],
            "assignments": assignments,
            "constraints": {"studentGroupOverlap": matrix}
        }))
        .unwrap()
    }

    fn schedule(sessions: Value) -> AiSchedule {
        from_value(json!({ "schedule": sessions })).unwrap()
    }

    fn constraints(errors: &[SchedulingError]) -> Vec<&str> {
        errors.iter().filter_map(|e| e.constraint.as_deref()).collect()
    }

    #[test]
    fn clean_schedule_has_no_errors() {
        let input = input(
            vec![assignment("A1", "F1", &["SEM1-A"], 1), assignment("A2", "F2", &["SEM1-B"], 1)],
            json!({}),
        );
        let schedule = schedule(json!([
            {"assignmentId": "A1", "day": "Mon", "slots": ["S1"], "roomId": "R1"},
            {"assignmentId": "A2", "day": "Mon", "slots": ["S1"], "roomId": "R2"}
        ]));
        assert!(check_schedule(&input, &schedule).is_empty());
    }

    #[test]
    fn detects_room_faculty_and_group_clashes_once() {
        let input = input(
            vec![assignment("A1", "F1", &["SEM1-A"], 1), assignment("A2", "F1", &["SEM1-A"], 1)],
            json!({}),
        );
        let schedule = schedule(json!([
            {"assignmentId": "A1", "day": "Mon", "slots": ["S1", "S2"], "roomId": "R1"},
            {"assignmentId": "A2", "day": "Mon", "slots": ["S1", "S2"], "roomId": "R1"}
        ]));
        let errors = check_schedule(&input, &schedule);
        assert_eq!(constraints(&errors), vec![ROOM_CONFLICT, FACULTY_CONFLICT, GROUP_CONFLICT]);
        assert_eq!(errors[0].session_id.as_deref(), Some("A2"));
    }

    #[test]
    fn repeated_slot_in_one_session_is_not_a_clash() {
        let input = input(vec![assignment("A1", "F1", &["SEM1-A"], 1)], json!({}));
        let schedule = schedule(json!([
            {"assignmentId": "A1", "day": "Mon", "slots": ["S1", "S1"], "roomId": "R1"}
        ]));
        assert!(check_schedule(&input, &schedule).is_empty());
    }

    #[test]
    fn overlap_matrix_governs_distinct_groups() {
        let assignments = vec![assignment("A1", "F1", &["SEM3-A"], 1), assignment("A2", "F2", &["ELEC_AD"], 1)];
        let placed = schedule(json!([
            {"assignmentId": "A1", "day": "Tue", "slots": ["S1"], "roomId": "R1"},
            {"assignmentId": "A2", "day": "Tue", "slots": ["S1"], "roomId": "R2"}
        ]));

        let blocked = input(assignments.clone(), json!({"cannotOverlapWith": {"ELEC_AD": ["SEM3-A"]}}));
        assert_eq!(constraints(&check_schedule(&blocked, &placed)), vec![GROUP_CONFLICT]);

        let parallel = input(
            assignments,
            json!({"cannotOverlapWith": {"ELEC_AD": ["SEM3-A"]}, "canRunParallelWith": {"SEM3-A": ["ELEC_AD"]}}),
        );
        assert!(check_schedule(&parallel, &placed).is_empty());
    }

    #[test]
    fn reports_unknown_references_and_count_mismatch() {
        let input = input(vec![assignment("A1", "F1", &["SEM1-A"], 2)], json!({}));
        let schedule = schedule(json!([
            {"assignmentId": "A1", "sessionNumber": 1, "day": "Mon", "slots": ["S1"], "roomId": "R9"},
            {"assignmentId": "A9", "day": "Mon", "slots": ["S2"], "roomId": "R1"}
        ]));
        let errors = check_schedule(&input, &schedule);
        assert_eq!(
            constraints(&errors),
            vec![UNKNOWN_REFERENCE, UNKNOWN_REFERENCE, SESSION_COUNT]
        );
        assert_eq!(errors[0].session_id.as_deref(), Some("A1#1"));
        assert_eq!(errors[2].details["placed"], 1);
    }
}
