//! Single-file loaders that bypass the stage directory layout.
//!
//! Each reads one JSON file at an arbitrary path into its typed record,
//! with no caching.

use std::path::Path;

use timetable_core::TimetableError;
use timetable_models::{
    ConfigFile, FacultyFile, FacultyFullFile, RoomPreferenceFile, StatisticsFile,
    StudentGroupFile, StudentGroupOverlapConstraints, SubjectFile, SubjectsFullFile,
    TeachingAssignmentsFile,
};

use crate::json::load_and_validate;

pub fn load_config(path: &Path) -> Result<ConfigFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_faculty(path: &Path) -> Result<FacultyFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_subjects(path: &Path) -> Result<SubjectFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_student_groups(path: &Path) -> Result<StudentGroupFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_room_preferences(path: &Path) -> Result<RoomPreferenceFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_faculty_full(path: &Path) -> Result<FacultyFullFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_subjects_full(path: &Path) -> Result<SubjectsFullFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_teaching_assignments(path: &Path) -> Result<TeachingAssignmentsFile, TimetableError> {
    load_and_validate(path)
}

pub fn load_overlap_constraints(
    path: &Path,
) -> Result<StudentGroupOverlapConstraints, TimetableError> {
    load_and_validate(path)
}

pub fn load_statistics(path: &Path) -> Result<StatisticsFile, TimetableError> {
    load_and_validate(path)
}
