//! # Cross-Reference Checks
//!
//! Each stage's files are individually well-formed by the time they reach
//! this module. What remains is whether they agree with one another: a
//! faculty member teaching a subject that is not in the catalogue, an
//! assignment naming a student group the overlap matrix has never heard
//! of, statistics that no longer match the assignments they summarize.
//!
//! Checks return [`Finding`]s. A [`StrictPolicy`] decides which categories
//! are errors; by default none are.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

use timetable_core::ValidationError;
use timetable_models::{AiSchedule, EnrichedTimetable};

use crate::loader::{Stage1Data, Stage2Data, Stage3Data};

/// The kinds of disagreement the stage checks look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrossRefCategory {
    /// Faculty assigned or supporting subject missing from the catalogue.
    UnknownFacultySubject,
    /// Student group compulsory subject missing from the catalogue.
    UnknownCompulsorySubject,
    /// Room preference naming a room the config does not define.
    UnknownPreferredRoom,
    /// `daySlotPattern` slot with no matching entry in `timeSlots`.
    UnknownPatternSlot,
    /// Stage 2 primary or supporting assignment for an unknown subject.
    UnknownPrimarySubject,
    UnknownAssignmentFaculty,
    UnknownAssignmentSubject,
    /// Assignment student group absent from the overlap matrix.
    UnknownAssignmentGroup,
    /// Statistics totals disagree with the assignment files.
    StatisticsMismatch,
    /// Enriched timetable session total disagrees with its sessions.
    SessionTotalMismatch,
}

impl CrossRefCategory {
    pub const ALL: [CrossRefCategory; 10] = [
        Self::UnknownFacultySubject,
        Self::UnknownCompulsorySubject,
        Self::UnknownPreferredRoom,
        Self::UnknownPatternSlot,
        Self::UnknownPrimarySubject,
        Self::UnknownAssignmentFaculty,
        Self::UnknownAssignmentSubject,
        Self::UnknownAssignmentGroup,
        Self::StatisticsMismatch,
        Self::SessionTotalMismatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownFacultySubject => "unknown_faculty_subject",
            Self::UnknownCompulsorySubject => "unknown_compulsory_subject",
            Self::UnknownPreferredRoom => "unknown_preferred_room",
            Self::UnknownPatternSlot => "unknown_pattern_slot",
            Self::UnknownPrimarySubject => "unknown_primary_subject",
            Self::UnknownAssignmentFaculty => "unknown_assignment_faculty",
            Self::UnknownAssignmentSubject => "unknown_assignment_subject",
            Self::UnknownAssignmentGroup => "unknown_assignment_group",
            Self::StatisticsMismatch => "statistics_mismatch",
            Self::SessionTotalMismatch => "session_total_mismatch",
        }
    }
}

impl fmt::Display for CrossRefCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cross-reference problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: CrossRefCategory,
    pub message: String,
}

impl Finding {
    pub fn new(category: CrossRefCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Which finding categories are promoted from warning to error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrictPolicy {
    escalated: BTreeSet<CrossRefCategory>,
}

impl StrictPolicy {
    /// Every category is a warning.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Every category is an error.
    pub fn strict() -> Self {
        Self {
            escalated: CrossRefCategory::ALL.into_iter().collect(),
        }
    }

    /// Promote one more category.
    pub fn escalate(mut self, category: CrossRefCategory) -> Self {
        self.escalated.insert(category);
        self
    }

    pub fn is_error(&self, category: CrossRefCategory) -> bool {
        self.escalated.contains(&category)
    }

    pub fn is_lenient(&self) -> bool {
        self.escalated.is_empty()
    }

    /// Split `findings` by this policy.
    ///
    /// Returns the warnings when nothing was promoted. Otherwise returns a
    /// single `ValidationError` listing every promoted finding; the
    /// remaining warnings are logged.
    pub fn apply(&self, stage: u8, findings: Vec<Finding>) -> Result<Vec<Finding>, ValidationError> {
        let (errors, warnings): (Vec<Finding>, Vec<Finding>) =
            findings.into_iter().partition(|f| self.is_error(f.category));

        for w in &warnings {
            tracing::warn!(stage, category = %w.category, "{}", w.message);
        }
        if errors.is_empty() {
            return Ok(warnings);
        }

        let messages: Vec<Value> = errors.iter().map(|f| Value::from(f.message.clone())).collect();
        let categories: BTreeSet<&str> = errors.iter().map(|f| f.category.as_str()).collect();
        Err(ValidationError::new(format!(
            "Stage {stage} cross-reference check failed with {} error(s): {}",
            errors.len(),
            errors[0].message
        ))
        .with_detail("stage", stage)
        .with_detail("errors", messages)
        .with_detail(
            "categories",
            categories.into_iter().map(Value::from).collect::<Vec<_>>(),
        ))
    }
}

/// Stage 1: faculty and student groups against the subject catalogue,
/// room preferences against configured rooms, and the day pattern against
/// the defined slots.
pub fn check_stage1(data: &Stage1Data) -> Vec<Finding> {
    let mut out = Vec::new();
    let subject_codes = data.subjects.codes();

    for faculty in &data.faculty.faculty {
        for code in faculty.all_subject_codes() {
            if !subject_codes.contains(code.as_str()) {
                out.push(Finding::new(
                    CrossRefCategory::UnknownFacultySubject,
                    format!("Faculty {} references unknown subject: {code}", faculty.faculty_id),
                ));
            }
        }
    }

    for group in &data.student_groups.student_groups {
        for code in &group.compulsory_subjects {
            if !subject_codes.contains(code.as_str()) {
                out.push(Finding::new(
                    CrossRefCategory::UnknownCompulsorySubject,
                    format!(
                        "Student group {} references unknown subject: {code}",
                        group.student_group_id
                    ),
                ));
            }
        }
    }

    if let Some(prefs) = &data.room_preferences {
        let config = &data.config.config;
        for pref in &prefs.room_preferences {
            let unknown: BTreeSet<&str> = pref
                .referenced_rooms()
                .filter(|room| config.get_room(room).is_none())
                .collect();
            for room in unknown {
                out.push(Finding::new(
                    CrossRefCategory::UnknownPreferredRoom,
                    format!(
                        "Room preference for {} ({}) references unknown room: {room}",
                        pref.subject_code, pref.student_group_id
                    ),
                ));
            }
        }
    }

    for (day, slot) in data.config.config.undefined_pattern_slots() {
        out.push(Finding::new(
            CrossRefCategory::UnknownPatternSlot,
            format!("Day slot pattern for {day} references undefined slot: {slot}"),
        ));
    }

    out
}

/// Stage 2: every primary and supporting assignment names a subject in
/// `subjects2Full.json`.
pub fn check_stage2(data: &Stage2Data) -> Vec<Finding> {
    let codes = data.subjects_full.codes();
    let mut out = Vec::new();

    for faculty in &data.faculty_full.faculty {
        let referenced = faculty
            .primary_assignments
            .iter()
            .map(|a| (a.subject_code.as_str(), "primary"))
            .chain(
                faculty
                    .supporting_assignments
                    .iter()
                    .map(|a| (a.subject_code.as_str(), "supporting")),
            );
        for (code, role) in referenced {
            if !codes.contains(code) {
                out.push(Finding::new(
                    CrossRefCategory::UnknownPrimarySubject,
                    format!(
                        "Faculty {} has {role} assignment for unknown subject: {code}",
                        faculty.faculty_id
                    ),
                ));
            }
        }
    }

    out
}

/// Stage 3: assignments against stage 2 faculty and subjects and the
/// overlap matrix, and statistics against live assignment counts.
pub fn check_stage3(data: &Stage3Data, stage2: &Stage2Data) -> Vec<Finding> {
    let mut out = Vec::new();
    let faculty_ids = stage2.faculty_full.ids();
    let subject_codes = stage2.subjects_full.codes();
    let known_groups = data.overlap_constraints.known_groups();

    for file in data.assignments.values() {
        let mut unknown_groups: BTreeMap<&str, &str> = BTreeMap::new();
        for a in &file.assignments {
            if !faculty_ids.contains(a.faculty_id.as_str()) {
                out.push(Finding::new(
                    CrossRefCategory::UnknownAssignmentFaculty,
                    format!("Assignment {} references unknown faculty: {}", a.assignment_id, a.faculty_id),
                ));
            }
            if !subject_codes.contains(a.subject_code.as_str()) {
                out.push(Finding::new(
                    CrossRefCategory::UnknownAssignmentSubject,
                    format!("Assignment {} references unknown subject: {}", a.assignment_id, a.subject_code),
                ));
            }
            for group in &a.student_group_ids {
                if !known_groups.contains(group.as_str()) {
                    unknown_groups.entry(group.as_str()).or_insert(a.assignment_id.as_str());
                }
            }
        }
        // One finding per group, naming the first assignment that uses it.
        for (group, assignment_id) in unknown_groups {
            out.push(Finding::new(
                CrossRefCategory::UnknownAssignmentGroup,
                format!(
                    "Student group {group} (first used by {assignment_id}) is missing from the overlap constraints"
                ),
            ));
        }
    }

    let stats = &data.statistics;
    let mut live_total = 0usize;
    for (semester, file) in &data.assignments {
        let live = file.assignments.len();
        live_total += live;
        if let Some(sem) = stats.semester_stats(*semester) {
            if sem.total_assignments as usize != live {
                out.push(Finding::new(
                    CrossRefCategory::StatisticsMismatch,
                    format!(
                        "Statistics report {} assignments for semester {semester} but {live} are defined",
                        sem.total_assignments
                    ),
                ));
            }
        }
    }
    if stats.combined.total_assignments as usize != live_total {
        out.push(Finding::new(
            CrossRefCategory::StatisticsMismatch,
            format!(
                "Statistics report {} assignments in total but {live_total} are defined",
                stats.combined.total_assignments
            ),
        ));
    }

    out
}

/// Stage 6: the enriched timetable's declared total against its own
/// sessions and, when present, the stage 5 schedule.
pub fn check_stage6(timetable: &EnrichedTimetable, schedule: Option<&AiSchedule>) -> Vec<Finding> {
    let mut out = Vec::new();
    let declared = timetable.metadata.total_sessions as usize;
    let listed = timetable.sessions.len();

    if declared != listed {
        out.push(Finding::new(
            CrossRefCategory::SessionTotalMismatch,
            format!("Enriched timetable declares {declared} sessions but lists {listed}"),
        ));
    }
    if let Some(schedule) = schedule {
        let scheduled = schedule.schedule.len();
        if scheduled != listed {
            out.push(Finding::new(
                CrossRefCategory::SessionTotalMismatch,
                format!("Enriched timetable lists {listed} sessions but the solver placed {scheduled}"),
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn findings() -> Vec<Finding> {
        vec![
            Finding::new(CrossRefCategory::UnknownFacultySubject, "Faculty F1 references unknown subject: X"),
            Finding::new(CrossRefCategory::UnknownPreferredRoom, "Room preference references unknown room: R9"),
        ]
    }

    #[test]
    fn lenient_policy_returns_all_warnings() {
        let out = StrictPolicy::lenient().apply(1, findings()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].to_string(), "Faculty F1 references unknown subject: X");
    }

    #[test]
    fn escalated_category_becomes_single_error() {
        let policy = StrictPolicy::lenient().escalate(CrossRefCategory::UnknownPreferredRoom);
        assert!(policy.is_error(CrossRefCategory::UnknownPreferredRoom));
        assert!(!policy.is_error(CrossRefCategory::UnknownFacultySubject));

        let err = policy.apply(1, findings()).unwrap_err();
        assert!(err.message.contains("1 error(s)"));
        assert_eq!(err.details["stage"], 1);
        assert_eq!(err.details["categories"][0], "unknown_preferred_room");
    }

    #[test]
    fn strict_policy_promotes_every_category() {
        let policy = StrictPolicy::strict();
        assert!(CrossRefCategory::ALL.iter().all(|c| policy.is_error(*c)));
        let err = policy.apply(3, findings()).unwrap_err();
        assert_eq!(err.details["errors"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn strict_policy_passes_clean_stage() {
        assert!(StrictPolicy::strict().apply(2, Vec::new()).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn escalation_promotes_exactly_its_category(
            picks in proptest::collection::vec(0usize..CrossRefCategory::ALL.len(), 0..12),
            escalated in 0usize..CrossRefCategory::ALL.len(),
        ) {
            let findings: Vec<Finding> = picks
                .iter()
                .map(|&i| Finding::new(CrossRefCategory::ALL[i], format!("finding {i}")))
                .collect();
            let policy = StrictPolicy::lenient().escalate(CrossRefCategory::ALL[escalated]);
            let promoted = picks.iter().filter(|&&i| i == escalated).count();

            match policy.apply(1, findings) {
                Ok(warnings) => {
                    prop_assert_eq!(promoted, 0);
                    prop_assert_eq!(warnings.len(), picks.len());
                }
                Err(err) => {
                    prop_assert!(promoted > 0);
                    prop_assert_eq!(err.details["errors"].as_array().map(Vec::len), Some(promoted));
                }
            }
        }
    }
}
