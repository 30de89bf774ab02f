//! Every stage file in the shared dataset survives decode, re-encode, and
//! decode again unchanged.

mod common;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use timetable_models::{
    from_value, AiSchedule, ConfigFile, EnrichedTimetable, FacultyFile, FacultyFullFile,
    RoomPreferenceFile, SchedulingInput, StatisticsFile, StudentGroupFile,
    StudentGroupOverlapConstraints, SubjectFile, SubjectsFullFile, TeachingAssignmentsFile,
    Validate,
};

fn assert_round_trip<T>(raw: Value)
where
    T: DeserializeOwned + Serialize + Validate + PartialEq + std::fmt::Debug,
{
    let first: T = from_value(raw).expect("fixture parses");
    let encoded = serde_json::to_value(&first).expect("serializes");
    let second: T = from_value(encoded).expect("re-parses");
    assert_eq!(first, second);
}

#[test]
fn stage_one_files_round_trip() {
    assert_round_trip::<ConfigFile>(common::config());
    assert_round_trip::<FacultyFile>(common::faculty_basic());
    assert_round_trip::<SubjectFile>(common::subjects_basic(1, "CS101"));
    assert_round_trip::<StudentGroupFile>(common::student_groups());
    assert_round_trip::<RoomPreferenceFile>(common::room_preferences());
}

#[test]
fn room_allocations_round_trip() {
    let mut prefs = common::room_preferences();
    prefs["roomPreferences"][0]["roomAllocations"] = serde_json::json!({"A": "LAB-1"});
    assert_round_trip::<RoomPreferenceFile>(prefs);
}

#[test]
fn stage_two_files_round_trip() {
    assert_round_trip::<FacultyFullFile>(common::faculty_full());
    assert_round_trip::<SubjectsFullFile>(common::subjects_full());
}

#[test]
fn stage_three_files_round_trip() {
    assert_round_trip::<TeachingAssignmentsFile>(common::teaching_assignments(1));
    assert_round_trip::<StudentGroupOverlapConstraints>(common::overlap_constraints());
    assert_round_trip::<StatisticsFile>(common::statistics(1, 1, 2));
}

#[test]
fn solver_and_timetable_files_round_trip() {
    assert_round_trip::<SchedulingInput>(common::scheduling_input());
    assert_round_trip::<AiSchedule>(common::ai_schedule());
    assert_round_trip::<EnrichedTimetable>(common::enriched_timetable(4));
}
