//! # Stage Numbering and Directory Layout
//!
//! The data root holds one directory per stage, `stage_1/` through
//! `stage_6/`, each with a fixed set of JSON filenames. Stages depend on
//! their predecessor: stage N is built from the files of stage N-1.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Number of pipeline stages.
pub const STAGE_COUNT: u8 = 6;

/// Fixed filenames inside each stage directory.
pub mod files {
    pub const CONFIG: &str = "config.json";
    pub const FACULTY_BASIC: &str = "facultyBasic.json";
    pub const SUBJECTS_SEM1_CORE: &str = "subjects1CoreBasic.json";
    pub const SUBJECTS_SEM3_CORE: &str = "subjects3CoreBasic.json";
    pub const SUBJECTS_SEM3_ELECTIVE: &str = "subjects3ElectBasic.json";
    pub const STUDENT_GROUPS: &str = "studentGroups.json";
    pub const ROOM_PREFERENCES: &str = "roomPreferences.json";

    pub const FACULTY_FULL: &str = "faculty2Full.json";
    pub const SUBJECTS_FULL: &str = "subjects2Full.json";

    pub const TEACHING_ASSIGNMENTS_SEM1: &str = "teachingAssignments_sem1.json";
    pub const TEACHING_ASSIGNMENTS_SEM3: &str = "teachingAssignments_sem3.json";
    pub const OVERLAP_CONSTRAINTS: &str = "studentGroupOverlapConstraints.json";
    pub const STATISTICS: &str = "statistics.json";

    pub const SCHEDULING_INPUT: &str = "schedulingInput.json";
    pub const AI_SCHEDULE: &str = "ai_solved_schedule.json";
    pub const ENRICHED_TIMETABLE: &str = "timetable_enriched.json";

    /// Subject files in merge order.
    pub const SUBJECT_FILES: [&str; 3] =
        [SUBJECTS_SEM1_CORE, SUBJECTS_SEM3_CORE, SUBJECTS_SEM3_ELECTIVE];

    /// Filename of the teaching-assignment file for a semester.
    pub fn teaching_assignments(semester: u8) -> String {
        format!("teachingAssignments_sem{semester}.json")
    }
}

/// Semesters for which teaching-assignment files are produced.
pub const ASSIGNMENT_SEMESTERS: [u8; 2] = [1, 3];

/// A validated pipeline stage number in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    /// Construct a stage, rejecting numbers outside `1..=6`.
    pub fn new(number: u8) -> Result<Self, ConfigurationError> {
        if (1..=STAGE_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ConfigurationError::new(format!(
                "Invalid stage number {number}: must be between 1 and {STAGE_COUNT}"
            ))
            .with_key("stage"))
        }
    }

    /// All six stages in order.
    pub fn all() -> impl Iterator<Item = Stage> {
        (1..=STAGE_COUNT).map(Stage)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Directory name under the data root, e.g. `stage_3`.
    pub fn dir_name(self) -> String {
        format!("stage_{}", self.0)
    }

    /// Absolute stage directory under `root`.
    pub fn dir(self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }

    /// The stage this one is built from, if any.
    pub fn prerequisite(self) -> Option<Stage> {
        (self.0 > 1).then(|| Stage(self.0 - 1))
    }

    /// Fixed filenames expected in this stage's directory.
    pub fn files(self) -> &'static [&'static str] {
        use files::*;
        match self.0 {
            1 => &[
                CONFIG,
                FACULTY_BASIC,
                SUBJECTS_SEM1_CORE,
                SUBJECTS_SEM3_CORE,
                SUBJECTS_SEM3_ELECTIVE,
                STUDENT_GROUPS,
                ROOM_PREFERENCES,
            ],
            2 => &[FACULTY_FULL, SUBJECTS_FULL],
            3 => &[
                TEACHING_ASSIGNMENTS_SEM1,
                TEACHING_ASSIGNMENTS_SEM3,
                OVERLAP_CONSTRAINTS,
                STATISTICS,
            ],
            4 => &[SCHEDULING_INPUT],
            5 => &[AI_SCHEDULE],
            _ => &[ENRICHED_TIMETABLE],
        }
    }

    /// Short human description used by `timetable status`.
    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "Raw inputs",
            2 => "Enriched subjects and faculty",
            3 => "Teaching assignments and constraints",
            4 => "Scheduling input",
            5 => "Solver output",
            _ => "Enriched timetable",
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = ConfigurationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stage::new(value)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        stage.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage {}", self.0)
    }
}

/// Accepts `3`, `stage3`, and `stage_3`.
impl FromStr for Stage {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .trim_start_matches("stage")
            .trim_start_matches('_');
        let n: u8 = digits.parse().map_err(|_| {
            ConfigurationError::new(format!("Invalid stage '{s}'")).with_key("stage")
        })?;
        Stage::new(n)
    }
}
