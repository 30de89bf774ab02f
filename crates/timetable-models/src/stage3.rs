//! # Stage 3: Teaching Assignments and Constraints
//!
//! The scheduling-ready view: one [`TeachingAssignment`] per faculty ×
//! component × section group, the student-group overlap matrix, and a
//! statistics summary used to reconcile counts across files.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{AssignmentPriority, ComponentType, GeneratedAt, RoomType};
use crate::validate::{
    field, require_at_least, require_non_empty, require_non_negative, require_semester,
    FieldViolation, Validate,
};

// ==================== Teaching assignments ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignmentConstraints {
    #[serde(default)]
    pub student_group_conflicts: Vec<String>,
    #[serde(default)]
    pub faculty_conflicts: Vec<String>,
    #[serde(default)]
    pub fixed_day: Option<String>,
    #[serde(default)]
    pub fixed_slot: Option<String>,
    #[serde(default)]
    pub must_be_in_room: Option<String>,
}

/// One faculty member teaching one component to one set of student groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TeachingAssignment {
    pub assignment_id: String,
    pub subject_code: String,
    pub short_code: String,
    pub subject_title: String,
    pub component_id: String,
    pub component_type: ComponentType,
    pub semester: u8,
    pub faculty_id: String,
    pub faculty_name: String,
    pub student_group_ids: Vec<String>,
    pub sections: Vec<String>,
    /// Minutes.
    pub session_duration: u32,
    pub sessions_per_week: u32,
    pub requires_room_type: RoomType,
    #[serde(default)]
    pub preferred_rooms: Vec<String>,
    pub requires_contiguous: bool,
    pub block_size_slots: u32,
    pub priority: AssignmentPriority,
    pub is_elective: bool,
    pub is_diff_subject: bool,
    pub constraints: AssignmentConstraints,
}

impl TeachingAssignment {
    /// `session_duration × sessions_per_week / 60`, unrounded.
    pub fn weekly_hours(&self) -> f64 {
        f64::from(self.session_duration) * f64::from(self.sessions_per_week) / 60.0
    }

    pub fn is_lab_session(&self) -> bool {
        self.requires_room_type == RoomType::Lab
    }
}

impl Validate for TeachingAssignment {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "assignmentId", &self.assignment_id);
        require_non_empty(out, path, "subjectCode", &self.subject_code);
        require_non_empty(out, path, "shortCode", &self.short_code);
        require_non_empty(out, path, "subjectTitle", &self.subject_title);
        require_non_empty(out, path, "componentId", &self.component_id);
        require_non_empty(out, path, "facultyId", &self.faculty_id);
        require_non_empty(out, path, "facultyName", &self.faculty_name);
        require_semester(out, path, self.semester);
        require_at_least(out, path, "sessionDuration", self.session_duration, 1);
        require_at_least(out, path, "blockSizeSlots", self.block_size_slots, 1);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignmentStatistics {
    pub total_assignments: u32,
    pub by_type: BTreeMap<String, u32>,
    pub by_component_type: BTreeMap<String, u32>,
    pub by_priority: BTreeMap<String, u32>,
    pub total_sessions: u32,
    pub total_weekly_hours: f64,
    pub faculty_assignments: BTreeMap<String, u32>,
    pub room_requirements: BTreeMap<String, u32>,
    pub with_fixed_timing: u32,
    pub with_pre_allocated_rooms: u32,
    pub with_room_preferences: u32,
}

impl Validate for AssignmentStatistics {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_negative(out, path, "totalWeeklyHours", self.total_weekly_hours);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignmentMetadata {
    pub semester: u8,
    pub generated_at: GeneratedAt,
    pub total_assignments: u32,
    pub generator: String,
}

/// `teachingAssignments_semN.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeachingAssignmentsFile {
    pub metadata: AssignmentMetadata,
    pub assignments: Vec<TeachingAssignment>,
    pub statistics: AssignmentStatistics,
}

impl TeachingAssignmentsFile {
    pub fn get_assignment(&self, assignment_id: &str) -> Option<&TeachingAssignment> {
        self.assignments
            .iter()
            .find(|a| a.assignment_id == assignment_id)
    }

    pub fn assignments_for_faculty(&self, faculty_id: &str) -> Vec<&TeachingAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.faculty_id == faculty_id)
            .collect()
    }

    pub fn assignments_for_subject(&self, subject_code: &str) -> Vec<&TeachingAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.subject_code == subject_code)
            .collect()
    }

    pub fn assignments_for_group(&self, student_group_id: &str) -> Vec<&TeachingAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.student_group_ids.iter().any(|g| g == student_group_id))
            .collect()
    }

    pub fn theory_assignments(&self) -> Vec<&TeachingAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.component_type == ComponentType::Theory)
            .collect()
    }

    /// Assignments that need a lab room, whatever their component type.
    pub fn lab_assignments(&self) -> Vec<&TeachingAssignment> {
        self.assignments.iter().filter(|a| a.is_lab_session()).collect()
    }

    pub fn total_sessions(&self) -> u32 {
        self.assignments
            .iter()
            .fold(0u32, |acc, a| acc.saturating_add(a.sessions_per_week))
    }

    pub fn total_weekly_hours(&self) -> f64 {
        self.assignments.iter().map(TeachingAssignment::weekly_hours).sum()
    }
}

impl Validate for TeachingAssignmentsFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_semester(out, &field(path, "metadata"), self.metadata.semester);
        self.assignments.validate_at(&field(path, "assignments"), out);
        self.statistics.validate_at(&field(path, "statistics"), out);
    }
}

// ==================== Overlap constraints ====================

/// Which student groups may or may not share a time slot.
///
/// Lookups are directional: `cannot_overlap_with[a]` lists groups that `a`
/// clashes with, and nothing forces the file to be symmetric.
/// [`can_schedule_together`](Self::can_schedule_together) checks both
/// directions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentGroupOverlapConstraints {
    pub cannot_overlap_with: BTreeMap<String, Vec<String>>,
    pub can_run_parallel_with: BTreeMap<String, Vec<String>>,
}

impl StudentGroupOverlapConstraints {
    pub fn conflicts_for(&self, group_id: &str) -> &[String] {
        self.cannot_overlap_with
            .get(group_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn parallel_groups(&self, group_id: &str) -> &[String] {
        self.can_run_parallel_with
            .get(group_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// False iff either group lists the other as a conflict.
    pub fn can_schedule_together(&self, a: &str, b: &str) -> bool {
        !self.conflicts_for(a).iter().any(|g| g == b) && !self.conflicts_for(b).iter().any(|g| g == a)
    }

    /// Every group id named as a key or value in either map.
    pub fn known_groups(&self) -> BTreeSet<&str> {
        self.cannot_overlap_with
            .iter()
            .chain(self.can_run_parallel_with.iter())
            .flat_map(|(k, vs)| std::iter::once(k.as_str()).chain(vs.iter().map(String::as_str)))
            .collect()
    }
}

impl Validate for StudentGroupOverlapConstraints {
    fn validate_at(&self, _path: &str, _out: &mut Vec<FieldViolation>) {}
}

// ==================== Statistics ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentStats {
    pub count: u32,
    pub sessions: u32,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeStats {
    pub count: u32,
    pub sessions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}

/// Shape shared by the priority and room-type breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountStats {
    pub count: u32,
    pub sessions: u32,
}

pub type PriorityStats = CountStats;
pub type RoomTypeStats = CountStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FacultyDistributionEntry {
    pub faculty_name: String,
    pub assignments: u32,
    pub sessions: u32,
    pub hours: f64,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub subject_count: u32,
    #[serde(default)]
    pub components: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubjectCoverageEntry {
    pub title: String,
    #[serde(default)]
    pub faculty: Vec<String>,
    pub faculty_count: u32,
    #[serde(default)]
    pub components: Vec<String>,
    pub component_count: u32,
    pub total_sessions: u32,
    #[serde(default)]
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentGroupStatsEntry {
    pub assignments: u32,
    pub sessions: u32,
    pub hours: f64,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub subject_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConstraintStats {
    pub with_student_conflicts: u32,
    pub with_faculty_conflicts: u32,
    pub with_fixed_timing: u32,
    pub with_room_allocation: u32,
    pub with_room_preferences: u32,
    pub with_contiguous_requirement: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomRequirementStats {
    pub unique_rooms_needed: u32,
    pub pre_allocated_rooms: Vec<String>,
    pub preferred_rooms_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SemesterStats {
    pub semester: u8,
    pub total_assignments: u32,
    pub total_sessions: u32,
    pub total_hours: f64,
    pub by_type: BTreeMap<String, TypeStats>,
    pub by_component: BTreeMap<String, ComponentStats>,
    pub by_priority: BTreeMap<String, PriorityStats>,
    pub by_room_type: BTreeMap<String, RoomTypeStats>,
    pub faculty_distribution: BTreeMap<String, FacultyDistributionEntry>,
    pub subject_coverage: BTreeMap<String, SubjectCoverageEntry>,
    pub student_groups: BTreeMap<String, StudentGroupStatsEntry>,
    pub constraints: ConstraintStats,
    pub conflict_patterns: BTreeMap<String, u32>,
    pub room_requirements: RoomRequirementStats,
}

impl Validate for SemesterStats {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_semester(out, path, self.semester);
        require_non_negative(out, path, "totalHours", self.total_hours);
        for (kind, stats) in &self.by_component {
            require_non_negative(out, &field(path, &format!("byComponent.{kind}")), "hours", stats.hours);
        }
        for (id, entry) in &self.faculty_distribution {
            require_non_negative(
                out,
                &field(path, &format!("facultyDistribution.{id}")),
                "hours",
                entry.hours,
            );
        }
        for (id, entry) in &self.student_groups {
            require_non_negative(out, &field(path, &format!("studentGroups.{id}")), "hours", entry.hours);
        }
    }
}

/// Per-faculty workload across semesters. The per-semester blocks are
/// free-form maps because producers vary their keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FacultyWorkloadEntry {
    pub faculty_name: String,
    pub sem1: BTreeMap<String, Value>,
    pub sem3: BTreeMap<String, Value>,
    pub total: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceAnalysis {
    pub lecture_room_sessions: u32,
    pub lab_sessions: u32,
    pub theory_sessions: u32,
    pub practical_sessions: u32,
    pub tutorial_sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CombinedStats {
    pub total_assignments: u32,
    pub total_sessions: u32,
    pub total_hours: f64,
    pub faculty_workload: BTreeMap<String, FacultyWorkloadEntry>,
    pub resource_analysis: ResourceAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatisticsMetadata {
    pub generated_at: GeneratedAt,
    pub generator: String,
    pub version: String,
}

/// `statistics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatisticsFile {
    pub metadata: StatisticsMetadata,
    pub semester1: SemesterStats,
    pub semester3: SemesterStats,
    pub combined: CombinedStats,
}

impl StatisticsFile {
    /// Only semesters 1 and 3 carry statistics.
    pub fn semester_stats(&self, semester: u8) -> Option<&SemesterStats> {
        match semester {
            1 => Some(&self.semester1),
            3 => Some(&self.semester3),
            _ => None,
        }
    }
}

impl Validate for StatisticsFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.semester1.validate_at(&field(path, "semester1"), out);
        self.semester3.validate_at(&field(path, "semester3"), out);
        require_non_negative(out, &field(path, "combined"), "totalHours", self.combined.total_hours);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::validate::from_value;
    use proptest::prelude::*;
    use serde_json::json;

    pub(crate) fn assignment(id: &str, faculty: &str, kind: &str, duration: u32, sessions: u32) -> Value {
        let room = if kind == "theory" { "lecture" } else { "lab" };
        json!({
            "assignmentId": id,
            "subjectCode": "CS101",
            "shortCode": "IP",
            "subjectTitle": "Introduction to Programming",
            "componentId": format!("CS101-{kind}"),
            "componentType": kind,
            "semester": 1,
            "facultyId": faculty,
            "facultyName": "Dr. Smith",
            "studentGroupIds": ["SEM1-A"],
            "sections": ["A"],
            "sessionDuration": duration,
            "sessionsPerWeek": sessions,
            "requiresRoomType": room,
            "requiresContiguous": false,
            "blockSizeSlots": 1,
            "priority": "high",
            "isElective": false,
            "isDiffSubject": false,
            "constraints": {"studentGroupConflicts": [], "facultyConflicts": []}
        })
    }

    pub(crate) fn semester_stats(semester: u8, assignments: u32, sessions: u32) -> Value {
        json!({
            "semester": semester,
            "totalAssignments": assignments,
            "totalSessions": sessions,
            "totalHours": 2.75,
            "byType": {"core": {"count": assignments, "sessions": sessions}},
            "byComponent": {"theory": {"count": assignments, "sessions": sessions, "hours": 2.75}},
            "byPriority": {"high": {"count": assignments, "sessions": sessions}},
            "byRoomType": {"lecture": {"count": assignments, "sessions": sessions}},
            "facultyDistribution": {
                "F1": {"facultyName": "Dr. Smith", "assignments": assignments,
                       "sessions": sessions, "hours": 2.75, "subjectCount": 1}
            },
            "subjectCoverage": {
                "CS101": {"title": "IP", "facultyCount": 1, "componentCount": 1, "totalSessions": sessions}
            },
            "studentGroups": {
                "SEM1-A": {"assignments": assignments, "sessions": sessions, "hours": 2.75, "subjectCount": 1}
            },
            "constraints": {
                "withStudentConflicts": 0, "withFacultyConflicts": 0, "withFixedTiming": 0,
                "withRoomAllocation": 0, "withRoomPreferences": 0, "withContiguousRequirement": 0
            },
            "conflictPatterns": {},
            "roomRequirements": {"uniqueRoomsNeeded": 1, "preAllocatedRooms": [], "preferredRoomsList": []}
        })
    }

    #[test]
    fn weekly_hours_is_unrounded() {
        let a: TeachingAssignment = from_value(assignment("A1", "F1", "theory", 55, 3)).unwrap();
        assert_eq!(a.weekly_hours(), 55.0 * 3.0 / 60.0);
        assert!(!a.is_lab_session());

        let lab: TeachingAssignment = from_value(assignment("A2", "F1", "practical", 110, 1)).unwrap();
        assert!(lab.is_lab_session());
    }

    #[test]
    fn assignment_constraint_defaults() {
        let a: TeachingAssignment = from_value(assignment("A1", "F1", "theory", 55, 3)).unwrap();
        assert!(a.constraints.fixed_day.is_none());
        assert!(a.constraints.must_be_in_room.is_none());
        assert!(a.preferred_rooms.is_empty());
    }

    #[test]
    fn external_priority_not_allowed_on_assignments() {
        let mut raw = assignment("A1", "F1", "theory", 55, 3);
        raw["priority"] = json!("external");
        assert!(from_value::<TeachingAssignment>(raw).is_err());
    }

    #[test]
    fn assignments_file_queries() {
        let file: TeachingAssignmentsFile = from_value(json!({
            "metadata": {
                "semester": 1, "generatedAt": "2025-10-07T14:03:11.512345",
                "totalAssignments": 2, "generator": "build_assignments_sem1.py"
            },
            "assignments": [
                assignment("A1", "F1", "theory", 55, 3),
                assignment("A2", "F2", "practical", 110, 1)
            ],
            "statistics": {
                "totalAssignments": 2, "byType": {}, "byComponentType": {}, "byPriority": {},
                "totalSessions": 4, "totalWeeklyHours": 4.58, "facultyAssignments": {},
                "roomRequirements": {}, "withFixedTiming": 0, "withPreAllocatedRooms": 0,
                "withRoomPreferences": 0
            }
        }))
        .unwrap();
        assert!(file.get_assignment("A2").is_some());
        assert_eq!(file.assignments_for_faculty("F1").len(), 1);
        assert_eq!(file.assignments_for_subject("CS101").len(), 2);
        assert_eq!(file.assignments_for_group("SEM1-A").len(), 2);
        assert_eq!(file.theory_assignments().len(), 1);
        assert_eq!(file.lab_assignments().len(), 1);
        assert_eq!(file.total_sessions(), 4);
    }

    #[test]
    fn overlap_lookup_checks_both_directions() {
        let c: StudentGroupOverlapConstraints = from_value(json!({
            "cannotOverlapWith": {"SEM1-A": ["SEM1"]},
            "canRunParallelWith": {"SEM1-A": ["SEM1-B"]}
        }))
        .unwrap();
        assert!(!c.can_schedule_together("SEM1-A", "SEM1"));
        assert!(!c.can_schedule_together("SEM1", "SEM1-A"));
        assert!(c.can_schedule_together("SEM1-A", "SEM1-B"));
        assert!(c.conflicts_for("unknown").is_empty());
        assert_eq!(c.parallel_groups("SEM1-A"), ["SEM1-B"]);
        assert!(c.known_groups().contains("SEM1"));
    }

    #[test]
    fn statistics_semester_lookup() {
        let stats: StatisticsFile = from_value(json!({
            "metadata": {"generatedAt": "2024-01-15T10:00:00Z", "generator": "g", "version": "1.0"},
            "semester1": semester_stats(1, 2, 4),
            "semester3": semester_stats(3, 1, 3),
            "combined": {
                "totalAssignments": 3, "totalSessions": 7, "totalHours": 5.5,
                "facultyWorkload": {
                    "F1": {"facultyName": "Dr. Smith", "sem1": {"sessions": 4}, "sem3": {}, "total": {"sessions": 4}}
                },
                "resourceAnalysis": {
                    "lectureRoomSessions": 7, "labSessions": 0, "theorySessions": 7,
                    "practicalSessions": 0, "tutorialSessions": 0
                }
            }
        }))
        .unwrap();
        assert_eq!(stats.semester_stats(1).unwrap().total_assignments, 2);
        assert_eq!(stats.semester_stats(3).unwrap().total_sessions, 3);
        assert!(stats.semester_stats(2).is_none());
        assert_eq!(stats.combined.total_assignments, 3);
    }

    #[test]
    fn negative_hours_rejected() {
        let mut raw = semester_stats(1, 1, 1);
        raw["totalHours"] = json!(-1.0);
        let err = from_value::<SemesterStats>(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "totalHours");
    }

    proptest! {
        #[test]
        fn weekly_hours_matches_formula(duration in 1u32..300, sessions in 0u32..10) {
            let a: TeachingAssignment =
                from_value(assignment("A", "F", "theory", duration, sessions)).unwrap();
            prop_assert_eq!(a.weekly_hours(), f64::from(duration) * f64::from(sessions) / 60.0);
        }

        #[test]
        fn overlap_is_symmetric(a in "[A-D]", b in "[A-D]", listed_under_a in any::<bool>()) {
            let mut cannot = BTreeMap::new();
            if listed_under_a {
                cannot.insert(a.clone(), vec![b.clone()]);
            } else {
                cannot.insert(b.clone(), vec![a.clone()]);
            }
            let c = StudentGroupOverlapConstraints {
                cannot_overlap_with: cannot,
                can_run_parallel_with: BTreeMap::new(),
            };
            prop_assert!(!c.can_schedule_together(&a, &b));
            prop_assert!(!c.can_schedule_together(&b, &a));
        }
    }
}
