//! # Stage 1: Raw Institutional Inputs
//!
//! | File | Root type |
//! |---|---|
//! | `config.json` | [`ConfigFile`] |
//! | `facultyBasic.json` | [`FacultyFile`] |
//! | `subjects1CoreBasic.json`, `subjects3CoreBasic.json`, `subjects3ElectBasic.json` | [`SubjectFile`] |
//! | `studentGroups.json` | [`StudentGroupFile`] |
//! | `roomPreferences.json` | [`RoomPreferenceFile`] |
//!
//! Every record here is closed (unknown fields are rejected) except
//! [`GroupHierarchyEntry`], which ignores extra keys.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::common::{BreakType, ComponentType, RoomType, SubjectKind};
use crate::validate::{
    field, require_at_least, require_clock_time, require_non_empty, require_semester,
    FieldViolation, Validate,
};

// ==================== Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimeSlot {
    pub slot_id: String,
    pub start: String,
    pub end: String,
    pub length_minutes: u32,
}

impl Validate for TimeSlot {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_clock_time(out, path, "start", &self.start);
        require_clock_time(out, path, "end", &self.end);
        require_at_least(out, path, "lengthMinutes", self.length_minutes, 1);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakWindow {
    pub start: String,
    pub end: String,
    #[serde(rename = "type")]
    pub kind: BreakType,
}

/// Ordered slot ids per teaching day. Days absent from the file are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaySlotPattern {
    #[serde(rename = "Mon", default)]
    pub mon: Vec<String>,
    #[serde(rename = "Tue", default)]
    pub tue: Vec<String>,
    #[serde(rename = "Wed", default)]
    pub wed: Vec<String>,
    #[serde(rename = "Thu", default)]
    pub thu: Vec<String>,
    #[serde(rename = "Fri", default)]
    pub fri: Vec<String>,
    #[serde(rename = "Sat", default)]
    pub sat: Vec<String>,
}

impl DaySlotPattern {
    pub const DAYS: [&'static str; 6] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    /// Slots for a day keyed `Mon`..`Sat`; unknown days yield an empty slice.
    pub fn slots_for_day(&self, day: &str) -> &[String] {
        match day {
            "Mon" => &self.mon,
            "Tue" => &self.tue,
            "Wed" => &self.wed,
            "Thu" => &self.thu,
            "Fri" => &self.fri,
            "Sat" => &self.sat,
            _ => &[],
        }
    }

    /// `(day, slot_id)` pairs in day order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Self::DAYS
            .iter()
            .flat_map(move |day| self.slots_for_day(day).iter().map(move |s| (*day, s.as_str())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreditToHours {
    pub theory: u32,
    pub tutorial: u32,
    pub practical: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidSlotCombinations {
    #[serde(default)]
    pub single: Vec<String>,
    #[serde(default)]
    pub double: Vec<String>,
    #[serde(default)]
    pub saturday: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionType {
    /// Minutes.
    pub duration: u32,
    pub requires_contiguous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionTypes {
    pub theory: SessionType,
    pub tutorial: SessionType,
    pub practical: SessionType,
}

impl SessionTypes {
    pub fn get(&self, kind: ComponentType) -> &SessionType {
        match kind {
            ComponentType::Theory => &self.theory,
            ComponentType::Tutorial => &self.tutorial,
            ComponentType::Practical => &self.practical,
        }
    }
}

impl Validate for SessionTypes {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        for kind in ComponentType::ALL {
            let base = field(path, kind.as_str());
            require_at_least(out, &base, "duration", self.get(*kind).duration, 1);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceConstraints {
    pub max_consecutive_slots_per_faculty: u32,
    pub max_daily_slots_per_student_group: u32,
    pub min_gap_between_same_faculty: u32,
}

impl Validate for ResourceConstraints {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_at_least(
            out,
            path,
            "maxConsecutiveSlotsPerFaculty",
            self.max_consecutive_slots_per_faculty,
            1,
        );
        require_at_least(
            out,
            path,
            "maxDailySlotsPerStudentGroup",
            self.max_daily_slots_per_student_group,
            1,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Room {
    pub room_id: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub capacity: u32,
}

impl Validate for Room {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_at_least(out, path, "capacity", self.capacity, 1);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resources {
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Resources {
    pub fn get_room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.room_id == room_id)
    }

    pub fn rooms_by_type(&self, room_type: RoomType) -> Vec<&Room> {
        self.rooms.iter().filter(|r| r.room_type == room_type).collect()
    }
}

/// Scheduling parameters: the week's shape, session lengths, and rooms.
///
/// The rule that every slot named in `day_slot_pattern` exists in
/// `time_slots` is a cross-reference check, run by the loader's stage 1
/// validation rather than at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub day_start: String,
    pub day_end: String,
    pub weekdays: Vec<String>,
    pub day_slot_pattern: DaySlotPattern,
    pub break_windows: Vec<BreakWindow>,
    pub time_slots: Vec<TimeSlot>,
    pub theory_session_minutes: u32,
    pub lab_tutorial_session_minutes: u32,
    pub credit_to_hours: CreditToHours,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_pattern: Option<BTreeMap<String, String>>,
    pub valid_slot_combinations: ValidSlotCombinations,
    pub session_types: SessionTypes,
    pub resource_constraints: ResourceConstraints,
    pub resources: Resources,
}

impl Config {
    pub fn get_slot(&self, slot_id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.slot_id == slot_id)
    }

    pub fn slots_for_day(&self, day: &str) -> &[String] {
        self.day_slot_pattern.slots_for_day(day)
    }

    pub fn get_room(&self, room_id: &str) -> Option<&Room> {
        self.resources.get_room(room_id)
    }

    pub fn rooms_by_type(&self, room_type: RoomType) -> Vec<&Room> {
        self.resources.rooms_by_type(room_type)
    }

    /// `(day, slot_id)` pairs in the day pattern with no matching time slot.
    pub fn undefined_pattern_slots(&self) -> Vec<(&'static str, &str)> {
        let known: BTreeSet<&str> = self.time_slots.iter().map(|s| s.slot_id.as_str()).collect();
        self.day_slot_pattern
            .iter()
            .filter(|(_, slot)| !known.contains(slot))
            .collect()
    }
}

impl Validate for Config {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.time_slots.validate_at(&field(path, "timeSlots"), out);
        self.session_types.validate_at(&field(path, "sessionTypes"), out);
        self.resource_constraints
            .validate_at(&field(path, "resourceConstraints"), out);
        self.resources
            .rooms
            .validate_at(&field(path, "resources.rooms"), out);
    }
}

/// `config.json`: `{"config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub config: Config,
}

impl Validate for ConfigFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.config.validate_at(&field(path, "config"), out);
    }
}

// ==================== Faculty ====================

/// One entry of `assignedSubjects`: a bare subject code, or a single-key
/// object mapping a code to the sections taught.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedSubject {
    Code(String),
    CodeWithSections(String, Vec<String>),
}

impl AssignedSubject {
    pub fn code(&self) -> &str {
        match self {
            Self::Code(code) | Self::CodeWithSections(code, _) => code,
        }
    }

    /// Sections taught; empty means all sections.
    pub fn sections(&self) -> &[String] {
        match self {
            Self::Code(_) => &[],
            Self::CodeWithSections(_, sections) => sections,
        }
    }
}

impl Serialize for AssignedSubject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_str(code),
            Self::CodeWithSections(code, sections) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(code, sections)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for AssignedSubject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AssignedSubjectVisitor;

        impl<'de> Visitor<'de> for AssignedSubjectVisitor {
            type Value = AssignedSubject;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a subject code or a single-key {code: [sections]} object")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(AssignedSubject::Code(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let (code, sections): (String, Vec<String>) = map
                    .next_entry()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom(
                        "assigned subject object must have exactly one key",
                    ));
                }
                Ok(AssignedSubject::CodeWithSections(code, sections))
            }
        }

        deserializer.deserialize_any(AssignedSubjectVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Faculty {
    pub faculty_id: String,
    pub name: String,
    pub designation: String,
    #[serde(default)]
    pub assigned_subjects: Vec<AssignedSubject>,
    #[serde(default)]
    pub supporting_subjects: Vec<String>,
}

impl Faculty {
    /// Assigned (either form) plus supporting subject codes.
    pub fn all_subject_codes(&self) -> BTreeSet<String> {
        self.assigned_subjects
            .iter()
            .map(|s| s.code().to_string())
            .chain(self.supporting_subjects.iter().cloned())
            .collect()
    }
}

impl Validate for Faculty {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "facultyId", &self.faculty_id);
        require_non_empty(out, path, "name", &self.name);
    }
}

/// `facultyBasic.json`: `{"faculty": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacultyFile {
    pub faculty: Vec<Faculty>,
}

impl FacultyFile {
    pub fn get(&self, faculty_id: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.faculty_id == faculty_id)
    }
}

impl Validate for FacultyFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.faculty.validate_at(&field(path, "faculty"), out);
    }
}

// ==================== Subjects ====================

/// A course as listed in the stage 1 subject files.
///
/// `credit_pattern` is `[theory, tutorial, practical]`; `total_credits` must
/// equal its sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Subject {
    pub subject_code: String,
    pub short_code: String,
    pub title: String,
    pub credit_pattern: [u32; 3],
    pub total_credits: u32,
    pub department: String,
    pub semester: u8,
    pub is_elective: bool,
    #[serde(rename = "type")]
    pub kind: SubjectKind,
}

impl Subject {
    pub fn theory_credits(&self) -> u32 {
        self.credit_pattern[0]
    }

    pub fn tutorial_credits(&self) -> u32 {
        self.credit_pattern[1]
    }

    pub fn practical_credits(&self) -> u32 {
        self.credit_pattern[2]
    }

    pub fn has_theory(&self) -> bool {
        self.theory_credits() > 0
    }

    pub fn has_tutorial(&self) -> bool {
        self.tutorial_credits() > 0
    }

    pub fn has_practical(&self) -> bool {
        self.practical_credits() > 0
    }
}

impl Validate for Subject {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_non_empty(out, path, "subjectCode", &self.subject_code);
        require_non_empty(out, path, "shortCode", &self.short_code);
        require_non_empty(out, path, "title", &self.title);
        require_semester(out, path, self.semester);

        let expected: u64 = self.credit_pattern.iter().map(|&c| u64::from(c)).sum();
        if u64::from(self.total_credits) != expected {
            out.push(FieldViolation {
                path: field(path, "totalCredits"),
                message: format!(
                    "Total credits ({}) doesn't match sum of credit pattern ({expected})",
                    self.total_credits
                ),
                value: Some(Value::from(self.total_credits)),
            });
        }
    }
}

/// Any of the three stage 1 subject files: `{"subjects": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectFile {
    pub subjects: Vec<Subject>,
}

impl SubjectFile {
    pub fn get(&self, subject_code: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.subject_code == subject_code)
    }

    pub fn for_semester(&self, semester: u8) -> Vec<&Subject> {
        self.subjects.iter().filter(|s| s.semester == semester).collect()
    }

    pub fn codes(&self) -> BTreeSet<&str> {
        self.subjects.iter().map(|s| s.subject_code.as_str()).collect()
    }
}

impl Validate for SubjectFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.subjects.validate_at(&field(path, "subjects"), out);
    }
}

// ==================== Student groups ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentGroup {
    pub semester: u8,
    pub section: String,
    pub student_count: u32,
    pub student_group_id: String,
    #[serde(default)]
    pub compulsory_subjects: Vec<String>,
}

impl Validate for StudentGroup {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_semester(out, path, self.semester);
        require_non_empty(out, path, "section", &self.section);
        require_non_empty(out, path, "studentGroupId", &self.student_group_id);
    }
}

/// Electives that can run in parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElectiveSubjectGroup {
    pub group_id: String,
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subject_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElectiveStudentGroup {
    pub student_group_id: String,
    pub parent_group_id: String,
    pub student_count: u32,
    pub sections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_sections: Vec<String>,
}

/// Open record: unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupHierarchyEntry {
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentGroupFile {
    pub student_groups: Vec<StudentGroup>,
    #[serde(default)]
    pub elective_subject_groups: Vec<ElectiveSubjectGroup>,
    #[serde(default)]
    pub elective_student_groups: Vec<ElectiveStudentGroup>,
    #[serde(default)]
    pub group_hierarchy: BTreeMap<String, GroupHierarchyEntry>,
}

impl StudentGroupFile {
    pub fn get_group(&self, group_id: &str) -> Option<&StudentGroup> {
        self.student_groups
            .iter()
            .find(|g| g.student_group_id == group_id)
    }

    pub fn get_elective_group(&self, group_id: &str) -> Option<&ElectiveStudentGroup> {
        self.elective_student_groups
            .iter()
            .find(|g| g.student_group_id == group_id)
    }

    /// Core and elective student group ids.
    pub fn all_group_ids(&self) -> BTreeSet<&str> {
        self.student_groups
            .iter()
            .map(|g| g.student_group_id.as_str())
            .chain(
                self.elective_student_groups
                    .iter()
                    .map(|g| g.student_group_id.as_str()),
            )
            .collect()
    }
}

impl Validate for StudentGroupFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.student_groups
            .validate_at(&field(path, "studentGroups"), out);
    }
}

// ==================== Room preferences ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomPreference {
    pub subject_code: String,
    pub component_type: ComponentType,
    pub semester: u8,
    pub student_group_id: String,
    pub preferred_rooms: Vec<String>,
    /// Section → fixed room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_allocations: Option<BTreeMap<String, String>>,
}

impl RoomPreference {
    /// Every room id this preference mentions.
    pub fn referenced_rooms(&self) -> impl Iterator<Item = &str> {
        self.preferred_rooms.iter().map(String::as_str).chain(
            self.room_allocations
                .iter()
                .flat_map(|m| m.values().map(String::as_str)),
        )
    }
}

impl Validate for RoomPreference {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        require_semester(out, path, self.semester);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomPreferenceFile {
    pub room_preferences: Vec<RoomPreference>,
}

impl RoomPreferenceFile {
    /// Preferences for a subject, optionally narrowed to one component.
    pub fn preferences_for(
        &self,
        subject_code: &str,
        component: Option<ComponentType>,
    ) -> Vec<&RoomPreference> {
        self.room_preferences
            .iter()
            .filter(|p| p.subject_code == subject_code)
            .filter(|p| component.map_or(true, |c| p.component_type == c))
            .collect()
    }
}

impl Validate for RoomPreferenceFile {
    fn validate_at(&self, path: &str, out: &mut Vec<FieldViolation>) {
        self.room_preferences
            .validate_at(&field(path, "roomPreferences"), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{from_value, ModelError};
    use serde_json::json;

    pub(crate) fn sample_config() -> Value {
        json!({
            "config": {
                "dayStart": "09:00",
                "dayEnd": "16:30",
                "weekdays": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
                "daySlotPattern": {
                    "Mon": ["S1", "S2", "S3", "S4", "S5", "S6", "S7"],
                    "Tue": ["S1", "S2", "S3", "S4", "S5", "S6", "S7"],
                    "Wed": ["S1", "S2", "S3", "S4", "S5", "S6", "S7"],
                    "Thu": ["S1", "S2", "S3", "S4", "S5", "S6", "S7"],
                    "Fri": ["S1", "S2", "S3", "S4", "S5", "S6", "S7"],
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
                    "single": ["S1", "S2", "S3", "S4", "S5", "S6", "S7"],
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

    fn subject(code: &str, pattern: [u32; 3], total: u32) -> Value {
        json!({
            "subjectCode": code,
            "shortCode": "IP",
            "title": "Introduction to Programming",
            "creditPattern": pattern,
            "totalCredits": total,
            "department": "MCA",
            "semester": 1,
            "isElective": false,
            "type": "core"
        })
    }

    #[test]
    fn config_loads_seven_slots_six_weekdays() {
        let file: ConfigFile = from_value(sample_config()).unwrap();
        assert_eq!(file.config.time_slots.len(), 7);
        assert_eq!(file.config.weekdays.len(), 6);
        assert_eq!(file.config.slots_for_day("Sat").len(), 4);
        assert!(file.config.slots_for_day("Sun").is_empty());
        assert_eq!(file.config.get_slot("S3").unwrap().start, "11:05");
        assert_eq!(file.config.rooms_by_type(RoomType::Lab).len(), 1);
        assert!(file.config.credit_pattern.is_none());
        assert!(file.config.undefined_pattern_slots().is_empty());
    }

    #[test]
    fn config_rejects_unknown_field() {
        let mut raw = sample_config();
        raw["config"]["surprise"] = json!(true);
        assert!(from_value::<ConfigFile>(raw).is_err());
    }

    #[test]
    fn config_reports_bad_time_with_path() {
        let mut raw = sample_config();
        raw["config"]["timeSlots"][1]["start"] = json!("9am");
        let err = from_value::<ConfigFile>(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "config.timeSlots[1].start");
    }

    #[test]
    fn config_rejects_zero_capacity_room() {
        let mut raw = sample_config();
        raw["config"]["resources"]["rooms"][0]["capacity"] = json!(0);
        let err = from_value::<ConfigFile>(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "config.resources.rooms[0].capacity");
    }

    #[test]
    fn undefined_pattern_slots_found() {
        let mut raw = sample_config();
        raw["config"]["daySlotPattern"]["Fri"] = json!(["S1", "S9"]);
        let file: ConfigFile = from_value(raw).unwrap();
        assert_eq!(file.config.undefined_pattern_slots(), vec![("Fri", "S9")]);
    }

    #[test]
    fn faculty_codes_union_assigned_and_supporting() {
        let f: Faculty = from_value(json!({
            "facultyId": "FAC001",
            "name": "Dr. Smith",
            "designation": "Professor",
            "assignedSubjects": ["CS101", {"CS301": ["A", "B"]}],
            "supportingSubjects": ["CS102"]
        }))
        .unwrap();
        let codes: Vec<String> = f.all_subject_codes().into_iter().collect();
        assert_eq!(codes, vec!["CS101", "CS102", "CS301"]);
        assert_eq!(f.assigned_subjects[1].sections(), ["A", "B"]);
    }

    #[test]
    fn assigned_subject_round_trips_both_forms() {
        let raw = json!(["CS101", {"CS301": ["A"]}]);
        let parsed: Vec<AssignedSubject> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }

    #[test]
    fn assigned_subject_rejects_multi_key_object() {
        let raw = json!({"CS101": ["A"], "CS102": ["B"]});
        assert!(serde_json::from_value::<AssignedSubject>(raw).is_err());
    }

    #[test]
    fn faculty_defaults_and_empty_id() {
        let f: Faculty = from_value(json!({
            "facultyId": "F1", "name": "N", "designation": "D"
        }))
        .unwrap();
        assert!(f.assigned_subjects.is_empty());
        assert!(f.supporting_subjects.is_empty());

        let err = from_value::<Faculty>(json!({
            "facultyId": "", "name": "N", "designation": "D"
        }))
        .unwrap_err();
        assert_eq!(err.violations()[0].path, "facultyId");
    }

    #[test]
    fn subject_credit_accessors() {
        let s: Subject = from_value(subject("CS101", [3, 0, 1], 4)).unwrap();
        assert_eq!(s.theory_credits(), 3);
        assert!(!s.has_tutorial());
        assert!(s.has_practical());
    }

    #[test]
    fn subject_total_mismatch_rejected() {
        let err = from_value::<Subject>(subject("CS101", [3, 0, 1], 5)).unwrap_err();
        let ModelError::Invalid(vs) = err else { panic!("expected rule violation") };
        assert_eq!(vs[0].path, "totalCredits");
        assert!(vs[0].message.contains("doesn't match"));
    }

    #[test]
    fn subject_credit_sum_does_not_wrap() {
        let err = from_value::<Subject>(subject("CS101", [u32::MAX, 1, 0], 0)).unwrap_err();
        let ModelError::Invalid(vs) = err else { panic!("expected rule violation") };
        assert_eq!(vs[0].path, "totalCredits");
        assert!(vs[0].message.contains("4294967296"));
    }

    #[test]
    fn subject_pattern_must_have_three_entries() {
        let mut raw = subject("CS101", [3, 0, 1], 4);
        raw["creditPattern"] = json!([3, 1]);
        assert!(matches!(
            from_value::<Subject>(raw),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn subject_negative_credit_rejected() {
        let mut raw = subject("CS101", [3, 0, 1], 4);
        raw["creditPattern"] = json!([3, -1, 2]);
        assert!(from_value::<Subject>(raw).is_err());
    }

    #[test]
    fn subject_semester_out_of_range() {
        let mut raw = subject("CS101", [3, 0, 1], 4);
        raw["semester"] = json!(9);
        let err = from_value::<Subject>(raw).unwrap_err();
        assert_eq!(err.violations()[0].path, "semester");
    }

    #[test]
    fn student_group_file_defaults_and_hierarchy_is_open() {
        let file: StudentGroupFile = from_value(json!({
            "studentGroups": [{
                "semester": 3, "section": "A", "studentCount": 48,
                "studentGroupId": "SEM3-A"
            }],
            "groupHierarchy": {
                "SEM3-A": {"children": ["ELEC_AD_A1"], "color": "blue"}
            }
        }))
        .unwrap();
        assert!(file.elective_subject_groups.is_empty());
        assert!(file.get_group("SEM3-A").unwrap().compulsory_subjects.is_empty());
        let entry = &file.group_hierarchy["SEM3-A"];
        assert_eq!(entry.children, vec!["ELEC_AD_A1"]);
        assert!(entry.parent.is_none());
    }

    #[test]
    fn room_preferences_filter_by_component() {
        let file: RoomPreferenceFile = from_value(json!({
            "roomPreferences": [
                {"subjectCode": "CS101", "componentType": "theory", "semester": 1,
                 "studentGroupId": "SEM1-A", "preferredRooms": ["AB-402"]},
                {"subjectCode": "CS101", "componentType": "practical", "semester": 1,
                 "studentGroupId": "SEM1-A", "preferredRooms": ["LAB-1"],
                 "roomAllocations": {"A": "LAB-2"}}
            ]
        }))
        .unwrap();
        assert_eq!(file.preferences_for("CS101", None).len(), 2);
        let labs = file.preferences_for("CS101", Some(ComponentType::Practical));
        assert_eq!(labs.len(), 1);
        let rooms: Vec<&str> = labs[0].referenced_rooms().collect();
        assert_eq!(rooms, vec!["LAB-1", "LAB-2"]);
    }
}
