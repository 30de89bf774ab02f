//! # timetable-models: Typed Stage Records
//!
//! One module per pipeline stage, each mapping the stage's JSON files onto
//! immutable value types. JSON keys are camelCase, Rust fields snake_case;
//! the mapping is fixed per field via serde renames.
//!
//! ## Open and closed records
//!
//! Stage 1–3 records are closed: an unknown key is a decode error. Two
//! exceptions are open and ignore extra keys: [`stage1::GroupHierarchyEntry`]
//! and every stage 4–6 record, whose producer is the external solver side.
//!
//! ## Construction
//!
//! Use [`from_value`] / [`from_str`] rather than `serde_json` directly: they
//! run the [`Validate`] rules (ranges, non-empty ids, credit totals) after
//! decoding and report every violation with its field path.

pub mod common;
pub mod schedule;
pub mod stage1;
pub mod stage2;
pub mod stage3;
pub mod stage4;
pub mod validate;

pub use common::{
    AssignmentPriority, AssignmentRole, BreakType, ComponentType, GeneratedAt, RoomType,
    SubjectFullKind, SubjectKind, SubjectPriority,
};
pub use schedule::{AiSchedule, EnrichedTimetable, ScheduledSession};
pub use stage1::{
    AssignedSubject, Config, ConfigFile, Faculty, FacultyFile, RoomPreferenceFile, Subject,
    SubjectFile, StudentGroupFile,
};
pub use stage2::{FacultyFull, FacultyFullFile, SubjectFull, SubjectsFullFile};
pub use stage3::{
    StatisticsFile, StudentGroupOverlapConstraints, TeachingAssignment, TeachingAssignmentsFile,
};
pub use stage4::SchedulingInput;
pub use validate::{from_str, from_value, FieldViolation, ModelError, Validate};
