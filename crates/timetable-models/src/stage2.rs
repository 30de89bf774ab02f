//! # Stage 2: Enriched Subjects and Faculty
//!
//! `subjects2Full.json` expands every subject into schedulable components;
//! `faculty2Full.json` attaches per-faculty assignments and workload.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{AssignmentRole, ComponentType, RoomType, SubjectFullKind, SubjectPriority};
use crate::validate::{
    field, require_at_least, require_non_empty, require_semester, FieldViolation, Validate,
};

// ==================== Subjects ====================

/// One schedulable part of a subject (theory, tutorial, or practical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubjectComponent {
    pub component_id: String,
    pub component_type: ComponentType,
    pub credits: u32,
    /// Minutes.
    pub session_duration: u32,
    pub sessions_per_week: u32,
    pub total_weekly_minutes: u32,
    pub must_be_in_room_type: RoomType,
    pub block_size_slots: u32,
    pub must_be_contiguous: bool,
}

impl Validate for SubjectComponent {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "componentId", &self.component_id);
        require_at_least(out, path, "sessionDuration", self.session_duration, 1);
        require_at_least(out, path, "blockSizeSlots", self.block_size_slots, 1);
    }
}

/// Pre-scheduled day and slots for a subject outside the solver's control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedTiming {
    pub day: String,
    pub slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubjectFull {
    pub subject_code: String,
    pub short_code: String,
    pub title: String,
    pub credit_pattern: [u32; 3],
    pub total_credits: u32,
    pub department: String,
    pub semester: u8,
    #[serde(default)]
    pub is_elective: bool,
    #[serde(rename = "type")]
    pub kind: SubjectFullKind,
    #[serde(default)]
    pub components: Vec<SubjectComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<SubjectPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_timing: Option<FixedTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_in_main_timetable: Option<bool>,
}

impl SubjectFull {
    pub fn theory_credits(&self) -> u32 {
        self.credit_pattern[0]
    }

    pub fn tutorial_credits(&self) -> u32 {
        self.credit_pattern[1]
    }

    pub fn practical_credits(&self) -> u32 {
        self.credit_pattern[2]
    }

    pub fn get_component(&self, component_id: &str) -> Option<&SubjectComponent> {
        self.components.iter().find(|c| c.component_id == component_id)
    }

    pub fn components_by_type(&self, kind: ComponentType) -> Vec<&SubjectComponent> {
        self.components
            .iter()
            .filter(|c| c.component_type == kind)
            .collect()
    }
}

impl Validate for SubjectFull {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "subjectCode", &self.subject_code);
        require_non_empty(out, path, "shortCode", &self.short_code);
        require_non_empty(out, path, "title", &self.title);
        require_semester(out, path, self.semester);
        self.components.validate_at(&field(path, "components"), out);
    }
}

/// `subjects2Full.json`: `{"subjects": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectsFullFile {
    pub subjects: Vec<SubjectFull>,
}

impl SubjectsFullFile {
    pub fn get_subject(&self, subject_code: &str) -> Option<&SubjectFull> {
        self.subjects.iter().find(|s| s.subject_code == subject_code)
    }

    pub fn subjects_by_semester(&self, semester: u8) -> Vec<&SubjectFull> {
        self.subjects.iter().filter(|s| s.semester == semester).collect()
    }

    pub fn elective_subjects(&self) -> Vec<&SubjectFull> {
        self.subjects.iter().filter(|s| s.is_elective).collect()
    }

    /// Non-elective subjects of kind `core`; `diff` subjects are excluded.
    pub fn core_subjects(&self) -> Vec<&SubjectFull> {
        self.subjects
            .iter()
            .filter(|s| !s.is_elective && s.kind == SubjectFullKind::Core)
            .collect()
    }

    pub fn codes(&self) -> BTreeSet<&str> {
        self.subjects.iter().map(|s| s.subject_code.as_str()).collect()
    }
}

impl Validate for SubjectsFullFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.subjects.validate_at(&field(path, "subjects"), out);
    }
}

// ==================== Faculty ====================

fn require_role(out: &mut Vec<FieldViolation>, path: &str, role: AssignmentRole, expected: AssignmentRole) {
    if role != expected {
        out.push(FieldViolation {
            path: field(path, "role"),
            message: format!("must be '{expected}'"),
            value: Some(Value::String(role.to_string())),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrimaryAssignment {
    pub subject_code: String,
    pub semester: u8,
    #[serde(default)]
    pub sections: Vec<String>,
    pub student_group_ids: Vec<String>,
    pub component_ids: Vec<String>,
    pub component_types: Vec<ComponentType>,
    pub role: AssignmentRole,
    pub weekly_hours_per_section: u32,
    pub total_weekly_hours: u32,
    pub sessions_per_week_per_section: u32,
    pub total_sessions_per_week: u32,
}

impl Validate for PrimaryAssignment {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "subjectCode", &self.subject_code);
        require_semester(out, path, self.semester);
        require_role(out, path, self.role, AssignmentRole::Primary);
    }
}

/// Backup or helper role on a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SupportingAssignment {
    pub subject_code: String,
    pub semester: u8,
    pub role: AssignmentRole,
}

impl Validate for SupportingAssignment {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "subjectCode", &self.subject_code);
        require_semester(out, path, self.semester);
        require_role(out, path, self.role, AssignmentRole::Supporting);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkloadStats {
    pub theory_hours: u32,
    pub tutorial_hours: u32,
    pub practical_hours: u32,
    pub total_sessions: u32,
    pub total_weekly_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FacultyFull {
    pub faculty_id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    #[serde(default)]
    pub primary_assignments: Vec<PrimaryAssignment>,
    #[serde(default)]
    pub supporting_assignments: Vec<SupportingAssignment>,
    pub workload_stats: WorkloadStats,
}

impl FacultyFull {
    pub fn get_primary_assignment(&self, subject_code: &str) -> Option<&PrimaryAssignment> {
        self.primary_assignments
            .iter()
            .find(|a| a.subject_code == subject_code)
    }

    pub fn assignments_for_semester(&self, semester: u8) -> Vec<&PrimaryAssignment> {
        self.primary_assignments
            .iter()
            .filter(|a| a.semester == semester)
            .collect()
    }

    /// Distinct subjects across primary and supporting assignments.
    pub fn total_subjects(&self) -> usize {
        self.primary_assignments
            .iter()
            .map(|a| a.subject_code.as_str())
            .chain(self.supporting_assignments.iter().map(|a| a.subject_code.as_str()))
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn is_supporting_only(&self) -> bool {
        self.primary_assignments.is_empty()
    }
}

impl Validate for FacultyFull {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "facultyId", &self.faculty_id);
        require_non_empty(out, path, "name", &self.name);
        self.primary_assignments
            .validate_at(&field(path, "primaryAssignments"), out);
        self.supporting_assignments
            .validate_at(&field(path, "supportingAssignments"), out);
    }
}

/// `faculty2Full.json`: `{"faculty": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacultyFullFile {
    pub faculty: Vec<FacultyFull>,
}

impl FacultyFullFile {
    pub fn get_faculty(&self, faculty_id: &str) -> Option<&FacultyFull> {
        self.faculty.iter().find(|f| f.faculty_id == faculty_id)
    }

    /// Faculty holding a primary assignment for the subject.
    pub fn faculty_by_subject(&self, subject_code: &str) -> Vec<&FacultyFull> {
        self.faculty
            .iter()
            .filter(|f| f.get_primary_assignment(subject_code).is_some())
            .collect()
    }

    pub fn faculty_by_department(&self, department: &str) -> Vec<&FacultyFull> {
        self.faculty
            .iter()
            .filter(|f| f.department == department)
            .collect()
    }

    pub fn ids(&self) -> BTreeSet<&str> {
        self.faculty.iter().map(|f| f.faculty_id.as_str()).collect()
    }
}

impl Validate for FacultyFullFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.faculty.validate_at(&field(path, "faculty"), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::from_value;
    use serde_json::json;

    fn component(kind: &str, duration: u32) -> Value {
        let room = if kind == "practical" { "lab" } else { "lecture" };
        json!({
            "componentId": format!("CS101-{kind}"),
            "componentType": kind,
            "credits": 3,
            "sessionDuration": duration,
            "sessionsPerWeek": 3,
            "totalWeeklyMinutes": duration * 3,
            "mustBeInRoomType": room,
            "blockSizeSlots": 1,
            "mustBeContiguous": false
        })
    }

    fn subject_full(code: &str, kind: &str, elective: bool) -> Value {
        json!({
            "subjectCode": code,
            "shortCode": "X",
            "title": "Title",
            "creditPattern": [3, 0, 1],
            "totalCredits": 4,
            "department": "MCA",
            "semester": 1,
            "isElective": elective,
            "type": kind,
            "components": [component("theory", 55), component("practical", 110)]
        })
    }

    fn faculty_full(id: &str, primary: &[&str], supporting: &[&str]) -> Value {
        let primary: Vec<Value> = primary
            .iter()
            .map(|code| {
                json!({
                    "subjectCode": code, "semester": 1, "sections": ["A"],
                    "studentGroupIds": ["SEM1-A"], "componentIds": [format!("{code}-TH")],
                    "componentTypes": ["theory"], "role": "primary",
                    "weeklyHoursPerSection": 3, "totalWeeklyHours": 3,
                    "sessionsPerWeekPerSection": 3, "totalSessionsPerWeek": 3
                })
            })
            .collect();
        let supporting: Vec<Value> = supporting
            .iter()
            .map(|code| json!({"subjectCode": code, "semester": 1, "role": "supporting"}))
            .collect();
        json!({
            "facultyId": id, "name": "Dr. X", "designation": "Professor",
            "department": "MCA",
            "primaryAssignments": primary,
            "supportingAssignments": supporting,
            "workloadStats": {
                "theoryHours": 3, "tutorialHours": 0, "practicalHours": 0,
                "totalSessions": 3, "totalWeeklyHours": 3
            }
        })
    }

    #[test]
    fn subject_full_components_and_queries() {
        let file: SubjectsFullFile = from_value(json!({
            "subjects": [
                subject_full("CS101", "core", false),
                subject_full("CS350", "elective", true),
                subject_full("CS399", "diff", false)
            ]
        }))
        .unwrap();
        let cs101 = file.get_subject("CS101").unwrap();
        assert_eq!(cs101.components.len(), 2);
        assert_eq!(cs101.components_by_type(ComponentType::Practical).len(), 1);
        assert!(cs101.get_component("CS101-theory").is_some());
        assert_eq!(file.core_subjects().len(), 1);
        assert_eq!(file.elective_subjects().len(), 1);
        assert_eq!(file.subjects_by_semester(1).len(), 3);
    }

    #[test]
    fn subject_full_special_fields_default_to_none() {
        let s: SubjectFull = from_value(subject_full("CS101", "core", false)).unwrap();
        assert!(s.priority.is_none());
        assert!(s.fixed_timing.is_none());
        assert!(s.not_in_main_timetable.is_none());
    }

    #[test]
    fn subject_full_accepts_fixed_timing_and_external_priority() {
        let mut raw = subject_full("HS101", "diff", false);
        raw["priority"] = json!("external");
        raw["fixedTiming"] = json!({"day": "Sat", "slots": ["S1", "S2"]});
        let s: SubjectFull = from_value(raw).unwrap();
        assert_eq!(s.priority, Some(SubjectPriority::External));
        assert_eq!(s.fixed_timing.unwrap().duration, None);
    }

    #[test]
    fn zero_session_duration_rejected_with_path() {
        let mut raw = subject_full("CS101", "core", false);
        raw["components"][1]["sessionDuration"] = json!(0);
        let err = from_value::<SubjectFull>(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "components[1].sessionDuration");
    }

    #[test]
    fn faculty_full_queries() {
        let file: FacultyFullFile = from_value(json!({
            "faculty": [
                faculty_full("F1", &["CS101", "CS102"], &["CS101"]),
                faculty_full("F2", &[], &["CS301"])
            ]
        }))
        .unwrap();
        let f1 = file.get_faculty("F1").unwrap();
        assert_eq!(f1.total_subjects(), 2);
        assert!(!f1.is_supporting_only());
        assert!(file.get_faculty("F2").unwrap().is_supporting_only());
        assert_eq!(file.faculty_by_subject("CS102").len(), 1);
        assert_eq!(file.faculty_by_department("MCA").len(), 2);
        assert_eq!(f1.assignments_for_semester(1).len(), 2);
    }

    #[test]
    fn primary_assignment_role_must_be_primary() {
        let mut raw = faculty_full("F1", &["CS101"], &[]);
        raw["primaryAssignments"][0]["role"] = json!("supporting");
        let err = from_value::<FacultyFull>(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "primaryAssignments[0].role");
    }

    #[test]
    fn unknown_role_literal_rejected() {
        let mut raw = faculty_full("F1", &["CS101"], &[]);
        raw["primaryAssignments"][0]["role"] = json!("lead");
        assert!(from_value::<FacultyFull>(raw).is_err());
    }
}
