//! A small, internally consistent six-stage dataset written to a temp dir.
//!
//! Two faculty members (FAC001, FAC002), one core subject per semester
//! (CS101 in semester 1, CS301 in semester 3), one section per semester,
//! and a solver placement that satisfies every hard constraint.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

pub struct Dataset {
    pub dir: TempDir,
}

impl Dataset {
    /// Writes every stage.
    pub fn full() -> Self {
        let ds = Self { dir: TempDir::new().unwrap() };
        ds.write(1, "config.json", &config());
        ds.write(1, "facultyBasic.json", &faculty_basic());
        ds.write(1, "subjects1CoreBasic.json", &subjects_basic(1, "CS101"));
        ds.write(1, "subjects3CoreBasic.json", &subjects_basic(3, "CS301"));
        ds.write(1, "studentGroups.json", &student_groups());
        ds.write(1, "roomPreferences.json", &room_preferences());
        ds.write(2, "faculty2Full.json", &faculty_full());
        ds.write(2, "subjects2Full.json", &subjects_full());
        ds.write(3, "teachingAssignments_sem1.json", &teaching_assignments(1));
        ds.write(3, "teachingAssignments_sem3.json", &teaching_assignments(3));
        ds.write(3, "studentGroupOverlapConstraints.json", &overlap_constraints());
        ds.write(3, "statistics.json", &statistics(1, 1, 2));
        ds.write(4, "schedulingInput.json", &scheduling_input());
        ds.write(5, "ai_solved_schedule.json", &ai_schedule());
        ds.write(6, "timetable_enriched.json", &enriched_timetable(4));
        ds
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, stage: u8, name: &str) -> PathBuf {
        self.root().join(format!("stage_{stage}")).join(name)
    }

    pub fn write(&self, stage: u8, name: &str, value: &Value) {
        let path = self.path(stage, name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    pub fn remove(&self, stage: u8, name: &str) {
        fs::remove_file(self.path(stage, name)).unwrap();
    }
}

pub fn config() -> Value {
    let week = json!(["S1", "S2", "S3", "S4", "S5", "S6", "S7"]);
    json!({
        "config": {
            "dayStart": "09:00",
            "dayEnd": "16:30",
            "weekdays": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            "daySlotPattern": {
                "Mon": week, "Tue": week, "Wed": week, "Thu": week, "Fri": week,
                "Sat": ["S1", "S2", "S3", "S4"]
            },
            "breakWindows": [
                {"start": "10:50", "end": "11:05", "type": "short"},
                {"start": "12:55", "end": "13:45", "type": "lunch"}
            ],
            "timeSlots": [
                {"slotId": "S1", "start": "09:00", "end": "09:55", "lengthMinutes": 55},
                {"slotId": "S2", "start": "09:55", "end": "10:50", "lengthMinutes": 55},
                {"slotId": "S3", "start": "11:05", "end": "12:00", "lengthMinutes": 55},
                {"slotId": "S4", "start": "12:00", "end": "12:55", "lengthMinutes": 55},
                {"slotId": "S5", "start": "13:45", "end": "14:40", "lengthMinutes": 55},
                {"slotId": "S6", "start": "14:40", "end": "15:35", "lengthMinutes": 55},
                {"slotId": "S7", "start": "15:35", "end": "16:30", "lengthMinutes": 55}
            ],
            "theorySessionMinutes": 55,
            "labTutorialSessionMinutes": 110,
            "creditToHours": {"theory": 1, "tutorial": 2, "practical": 2},
            "validSlotCombinations": {
                "single": week,
                "double": ["S1+S2", "S3+S4", "S5+S6", "S6+S7"],
                "saturday": ["S1+S2", "S3+S4"]
            },
            "sessionTypes": {
                "theory": {"duration": 55, "requiresContiguous": false},
                "tutorial": {"duration": 110, "requiresContiguous": true},
                "practical": {"duration": 110, "requiresContiguous": true}
            },
            "resourceConstraints": {
                "maxConsecutiveSlotsPerFaculty": 5,
                "maxDailySlotsPerStudentGroup": 7,
                "minGapBetweenSameFaculty": 0
            },
            "resources": {
                "rooms": [
                    {"roomId": "AB-402", "type": "lecture", "capacity": 60},
                    {"roomId": "LAB-1", "type": "lab", "capacity": 30}
                ]
            }
        }
    })
}

pub fn faculty_basic() -> Value {
    json!({
        "faculty": [
            {"facultyId": "FAC001", "name": "Dr. Rao", "designation": "Professor",
             "assignedSubjects": ["CS101"], "supportingSubjects": ["CS301"]},
            {"facultyId": "FAC002", "name": "Dr. Iyer", "designation": "Associate Professor",
             "assignedSubjects": [{"CS301": ["A"]}]}
        ]
    })
}

pub fn subjects_basic(semester: u8, code: &str) -> Value {
    json!({
        "subjects": [{
            "subjectCode": code,
            "shortCode": code,
            "title": format!("Subject {code}"),
            "creditPattern": [2, 0, 0],
            "totalCredits": 2,
            "department": "MCA",
            "semester": semester,
            "isElective": false,
            "type": "core"
        }]
    })
}

pub fn student_groups() -> Value {
    json!({
        "studentGroups": [
            {"semester": 1, "section": "A", "studentCount": 55,
             "studentGroupId": "SEM1-A", "compulsorySubjects": ["CS101"]},
            {"semester": 3, "section": "A", "studentCount": 48,
             "studentGroupId": "SEM3-A", "compulsorySubjects": ["CS301"]}
        ]
    })
}

pub fn room_preferences() -> Value {
    json!({
        "roomPreferences": [
            {"subjectCode": "CS101", "componentType": "theory", "semester": 1,
             "studentGroupId": "SEM1-A", "preferredRooms": ["AB-402"]}
        ]
    })
}

fn primary(code: &str, semester: u8, group: &str) -> Value {
    json!({
        "subjectCode": code, "semester": semester, "sections": ["A"],
        "studentGroupIds": [group], "componentIds": [format!("{code}-TH")],
        "componentTypes": ["theory"], "role": "primary",
        "weeklyHoursPerSection": 2, "totalWeeklyHours": 2,
        "sessionsPerWeekPerSection": 2, "totalSessionsPerWeek": 2
    })
}

fn workload() -> Value {
    json!({
        "theoryHours": 2, "tutorialHours": 0, "practicalHours": 0,
        "totalSessions": 2, "totalWeeklyHours": 2
    })
}

pub fn faculty_full() -> Value {
    json!({
        "faculty": [
            {"facultyId": "FAC001", "name": "Dr. Rao", "designation": "Professor",
             "department": "MCA",
             "primaryAssignments": [primary("CS101", 1, "SEM1-A")],
             "supportingAssignments": [{"subjectCode": "CS301", "semester": 3, "role": "supporting"}],
             "workloadStats": workload()},
            {"facultyId": "FAC002", "name": "Dr. Iyer", "designation": "Associate Professor",
             "department": "MCA",
             "primaryAssignments": [primary("CS301", 3, "SEM3-A")],
             "supportingAssignments": [],
             "workloadStats": workload()}
        ]
    })
}

fn subject_full(code: &str, semester: u8) -> Value {
    json!({
        "subjectCode": code,
        "shortCode": code,
        "title": format!("Subject {code}"),
        "creditPattern": [2, 0, 0],
        "totalCredits": 2,
        "department": "MCA",
        "semester": semester,
        "isElective": false,
        "type": "core",
        "components": [{
            "componentId": format!("{code}-TH"),
            "componentType": "theory",
            "credits": 2,
            "sessionDuration": 55,
            "sessionsPerWeek": 2,
            "totalWeeklyMinutes": 110,
            "mustBeInRoomType": "lecture",
            "blockSizeSlots": 1,
            "mustBeContiguous": false
        }]
    })
}

pub fn subjects_full() -> Value {
    json!({ "subjects": [subject_full("CS101", 1), subject_full("CS301", 3)] })
}

/// The semester's single theory assignment: CS101 by FAC001 for SEM1-A,
/// or CS301 by FAC002 for SEM3-A.
pub fn assignment(semester: u8) -> Value {
    let (id, code, faculty, name, group) = match semester {
        1 => ("TA-S1-001", "CS101", "FAC001", "Dr. Rao", "SEM1-A"),
        _ => ("TA-S3-001", "CS301", "FAC002", "Dr. Iyer", "SEM3-A"),
    };
    json!({
        "assignmentId": id,
        "subjectCode": code,
        "shortCode": code,
        "subjectTitle": format!("Subject {code}"),
        "componentId": format!("{code}-TH"),
        "componentType": "theory",
        "semester": semester,
        "facultyId": faculty,
        "facultyName": name,
        "studentGroupIds": [group],
        "sections": ["A"],
        "sessionDuration": 55,
        "sessionsPerWeek": 2,
        "requiresRoomType": "lecture",
        "requiresContiguous": false,
        "blockSizeSlots": 1,
        "priority": "high",
        "isElective": false,
        "isDiffSubject": false,
        "constraints": {"studentGroupConflicts": [], "facultyConflicts": []}
    })
}

pub fn teaching_assignments(semester: u8) -> Value {
    json!({
        "metadata": {
            "semester": semester, "generatedAt": "2025-10-07T14:03:11.512345",
            "totalAssignments": 1, "generator": format!("build_assignments_sem{semester}.py")
        },
        "assignments": [assignment(semester)],
        "statistics": {
            "totalAssignments": 1, "byType": {}, "byComponentType": {}, "byPriority": {},
            "totalSessions": 2, "totalWeeklyHours": 1.83, "facultyAssignments": {},
            "roomRequirements": {}, "withFixedTiming": 0, "withPreAllocatedRooms": 0,
            "withRoomPreferences": 0
        }
    })
}

pub fn overlap_constraints() -> Value {
    json!({
        "cannotOverlapWith": {"SEM1-A": ["SEM1"], "SEM3-A": ["SEM3"]},
        "canRunParallelWith": {"SEM1-A": ["SEM3-A"]}
    })
}

fn semester_stats(semester: u8, assignments: u32) -> Value {
    let mut groups = serde_json::Map::new();
    groups.insert(
        format!("SEM{semester}-A"),
        json!({"assignments": assignments, "sessions": 2 * assignments, "hours": 1.83, "subjectCount": 1}),
    );
    json!({
        "semester": semester,
        "totalAssignments": assignments,
        "totalSessions": 2 * assignments,
        "totalHours": 1.83,
        "byType": {"core": {"count": assignments, "sessions": 2 * assignments}},
        "byComponent": {"theory": {"count": assignments, "sessions": 2 * assignments, "hours": 1.83}},
        "byPriority": {"high": {"count": assignments, "sessions": 2 * assignments}},
        "byRoomType": {"lecture": {"count": assignments, "sessions": 2 * assignments}},
        "facultyDistribution": {},
        "subjectCoverage": {},
        "studentGroups": groups,
        "constraints": {
            "withStudentConflicts": 0, "withFacultyConflicts": 0, "withFixedTiming": 0,
            "withRoomAllocation": 0, "withRoomPreferences": 0, "withContiguousRequirement": 0
        },
        "conflictPatterns": {},
        "roomRequirements": {"uniqueRoomsNeeded": 1, "preAllocatedRooms": [], "preferredRoomsList": []}
    })
}

/// Statistics claiming `sem1` and `sem3` assignments and `combined` overall.
pub fn statistics(sem1: u32, sem3: u32, combined: u32) -> Value {
    json!({
        "metadata": {"generatedAt": "2025-10-07T14:05:00Z", "generator": "generate_statistics.py", "version": "1.0"},
        "semester1": semester_stats(1, sem1),
        "semester3": semester_stats(3, sem3),
        "combined": {
            "totalAssignments": combined, "totalSessions": 2 * combined, "totalHours": 3.67,
            "facultyWorkload": {},
            "resourceAnalysis": {
                "lectureRoomSessions": 2 * combined, "labSessions": 0,
                "theorySessions": 2 * combined, "practicalSessions": 0, "tutorialSessions": 0
            }
        }
    })
}

pub fn scheduling_input() -> Value {
    json!({
        "metadata": {
            "totalAssignments": 2, "semester1Assignments": 1, "semester3Assignments": 1,
            "totalTimeSlots": 38, "totalRooms": 2
        },
        "configuration": {"weekdays": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]},
        "rooms": [
            {"roomId": "AB-402", "type": "lecture", "capacity": 60},
            {"roomId": "LAB-1", "type": "lab", "capacity": 30}
        ],
        "assignments": [assignment(1), assignment(3)],
        "constraints": {
            "facultyList": ["FAC001", "FAC002"],
            "studentGroupList": ["SEM1-A", "SEM3-A"],
            "studentGroupOverlap": overlap_constraints()
        }
    })
}

/// Four sessions with no room, faculty, or group clash.
pub fn ai_schedule() -> Value {
    json!({
        "schedule": [
            {"assignmentId": "TA-S1-001", "sessionNumber": 1, "day": "Mon", "slots": ["S1"], "roomId": "AB-402"},
            {"assignmentId": "TA-S1-001", "sessionNumber": 2, "day": "Wed", "slots": ["S1"], "roomId": "AB-402"},
            {"assignmentId": "TA-S3-001", "sessionNumber": 1, "day": "Mon", "slots": ["S2"], "roomId": "AB-402"},
            {"assignmentId": "TA-S3-001", "sessionNumber": 2, "day": "Thu", "slots": ["S3"], "roomId": "AB-402"}
        ]
    })
}

/// An enriched timetable declaring `declared` sessions; it always lists
/// the four placed by [`ai_schedule`].
pub fn enriched_timetable(declared: u32) -> Value {
    let sessions: Vec<Value> = ai_schedule()["schedule"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            let (code, faculty, group) = if s["assignmentId"] == "TA-S1-001" {
                ("CS101", "FAC001", "SEM1-A")
            } else {
                ("CS301", "FAC002", "SEM3-A")
            };
            json!({
                "assignmentId": s["assignmentId"],
                "day": s["day"],
                "slots": s["slots"],
                "roomId": s["roomId"],
                "subjectCode": code,
                "facultyId": faculty,
                "studentGroupIds": [group]
            })
        })
        .collect();
    json!({
        "metadata": {"totalSessions": declared, "generatedAt": "2025-10-07T15:00:00Z"},
        "sessions": sessions
    })
}
