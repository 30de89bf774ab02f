//! # Stage 4: Scheduling Input
//!
//! `schedulingInput.json` is the complete problem handed to the external
//! solver. Records here are open: the solver side may add keys, so unknown
//! fields are ignored rather than rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{AssignmentPriority, ComponentType, GeneratedAt, RoomType};
use crate::stage3::{AssignmentConstraints, StudentGroupOverlapConstraints};
use crate::validate::{field, require_at_least, require_non_empty, FieldViolation, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingMetadata {
    pub total_assignments: u32,
    pub semester1_assignments: u32,
    pub semester3_assignments: u32,
    pub total_time_slots: u32,
    pub total_rooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<GeneratedAt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingConfiguration {
    #[serde(default)]
    pub weekdays: Vec<String>,
}

/// A concrete slot on a concrete day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlot {
    pub slot_id: String,
    pub day: String,
    pub start: String,
    pub end: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCombination {
    /// `single`, `double`, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub slots: Vec<String>,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRoom {
    pub room_id: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingStudentGroup {
    pub group_id: String,
    #[serde(default)]
    pub description: String,
    pub size: u32,
    pub semester: u8,
    #[serde(default)]
    pub parent_groups: Vec<String>,
}

/// A stage 3 teaching assignment plus the slot shapes it may occupy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingAssignment {
    pub assignment_id: String,
    pub subject_code: String,
    #[serde(default)]
    pub short_code: String,
    pub subject_title: String,
    #[serde(default)]
    pub component_id: String,
    pub component_type: ComponentType,
    pub semester: u8,
    pub faculty_id: String,
    pub faculty_name: String,
    pub student_group_ids: Vec<String>,
    #[serde(default)]
    pub sections: Vec<String>,
    pub session_duration: u32,
    pub sessions_per_week: u32,
    pub requires_room_type: RoomType,
    #[serde(default)]
    pub preferred_rooms: Vec<String>,
    #[serde(default)]
    pub requires_contiguous: bool,
    #[serde(default = "default_block_size")]
    pub block_size_slots: u32,
    pub priority: AssignmentPriority,
    #[serde(default)]
    pub is_elective: bool,
    #[serde(default)]
    pub is_diff_subject: bool,
    #[serde(default)]
    pub valid_slot_types: Vec<String>,
    #[serde(default)]
    pub constraints: AssignmentConstraints,
}

fn default_block_size() -> u32 {
    1
}

impl SchedulingAssignment {
    pub fn weekly_hours(&self) -> f64 {
        f64::from(self.session_duration) * f64::from(self.sessions_per_week) / 60.0
    }
}

impl Validate for SchedulingAssignment {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "assignmentId", &self.assignment_id);
        require_non_empty(out, path, "facultyId", &self.faculty_id);
        require_at_least(out, path, "sessionDuration", self.session_duration, 1);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingConstraints {
    #[serde(default)]
    pub faculty_list: Vec<String>,
    #[serde(default)]
    pub student_group_list: Vec<String>,
    #[serde(default)]
    pub student_group_overlap: StudentGroupOverlapConstraints,
}

/// `schedulingInput.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub metadata: SchedulingMetadata,
    #[serde(default)]
    pub configuration: SchedulingConfiguration,
    #[serde(default)]
    pub time_slots: Vec<DaySlot>,
    #[serde(default)]
    pub slot_combinations: Vec<SlotCombination>,
    #[serde(default)]
    pub rooms: Vec<SchedulingRoom>,
    #[serde(default)]
    pub student_groups: Vec<SchedulingStudentGroup>,
    pub assignments: Vec<SchedulingAssignment>,
    #[serde(default)]
    pub constraints: SchedulingConstraints,
}

impl SchedulingInput {
    pub fn get_assignment(&self, assignment_id: &str) -> Option<&SchedulingAssignment> {
        self.assignments
            .iter()
            .find(|a| a.assignment_id == assignment_id)
    }

    pub fn slots_for_day(&self, day: &str) -> Vec<&DaySlot> {
        self.time_slots.iter().filter(|s| s.day == day).collect()
    }

    pub fn total_sessions(&self) -> u32 {
        self.assignments
            .iter()
            .fold(0u32, |acc, a| acc.saturating_add(a.sessions_per_week))
    }

    /// Sessions per week keyed by faculty id.
    pub fn sessions_by_faculty(&self) -> BTreeMap<&str, u32> {
        let mut out = BTreeMap::new();
        for a in &self.assignments {
            *out.entry(a.faculty_id.as_str()).or_insert(0) += a.sessions_per_week;
        }
        out
    }
}

impl Validate for SchedulingInput {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.assignments.validate_at(&field(path, "assignments"), out);
        let listed = self.assignments.len();
        if self.metadata.total_assignments as usize != listed {
            out.push(FieldViolation {
                path: field(path, "metadata.totalAssignments"),
                message: format!("declares {} assignments but {listed} are listed", self.metadata.total_assignments),
                value: Some(self.metadata.total_assignments.into()),
            });
        }
    }
}
