//! # Stages 5 and 6: Solver Output and Enriched Timetable
//!
//! The solver returns `ai_solved_schedule.json`, placing every session of
//! every stage 4 assignment on a day, one or more slots, and a room. Stage 6
//! joins that placement back to subject and faculty detail in
//! `timetable_enriched.json`. Both are open records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::GeneratedAt;
use crate::validate::{field, require_non_empty, FieldViolation, Validate};

/// One placed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub assignment_id: String,
    /// 1-based index among the assignment's weekly sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u32>,
    pub day: String,
    pub slots: Vec<String>,
    pub room_id: String,
}

impl ScheduledSession {
    /// `assignmentId#n`, or the bare assignment id when unnumbered.
    pub fn session_id(&self) -> String {
        match self.session_number {
            Some(n) => format!("{}#{n}", self.assignment_id),
            None => self.assignment_id.clone(),
        }
    }
}

impl Validate for ScheduledSession {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "assignmentId", &self.assignment_id);
        require_non_empty(out, path, "day", &self.day);
        require_non_empty(out, path, "roomId", &self.room_id);
        if self.slots.is_empty() {
            out.push(FieldViolation {
                path: field(path, "slots"),
                message: "must name at least one slot".into(),
                value: None,
            });
        }
    }
}

/// `ai_solved_schedule.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSchedule {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    pub schedule: Vec<ScheduledSession>,
}

impl AiSchedule {
    pub fn sessions_for_assignment(&self, assignment_id: &str) -> Vec<&ScheduledSession> {
        self.schedule
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .collect()
    }

    /// Placed session count per assignment id.
    pub fn counts_by_assignment(&self) -> BTreeMap<&str, u32> {
        let mut out = BTreeMap::new();
        for s in &self.schedule {
            *out.entry(s.assignment_id.as_str()).or_insert(0) += 1;
        }
        out
    }
}

impl Validate for AiSchedule {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.schedule.validate_at(&field(path, "schedule"), out);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMetadata {
    pub total_sessions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<GeneratedAt>,
}

/// A placed session joined with its subject, faculty, and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSession {
    pub assignment_id: String,
    pub day: String,
    pub slots: Vec<String>,
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_name: Option<String>,
    #[serde(default)]
    pub student_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// `timetable_enriched.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTimetable {
    pub metadata: EnrichedMetadata,
    #[serde(default)]
    pub sessions: Vec<EnrichedSession>,
}

impl EnrichedTimetable {
    pub fn sessions_for_faculty(&self, faculty_id: &str) -> Vec<&EnrichedSession> {
        self.sessions
            .iter()
            .filter(|s| s.faculty_id.as_deref() == Some(faculty_id))
            .collect()
    }

    pub fn sessions_for_group(&self, group_id: &str) -> Vec<&EnrichedSession> {
        self.sessions
            .iter()
            .filter(|s| s.student_group_ids.iter().any(|g| g == group_id))
            .collect()
    }
}

impl Validate for EnrichedTimetable {
    fn validate_at(&self, _path: &str, _out: &mut Vec<FieldViolation>) {}
}
