//! # Data Loader
//!
//! [`DataLoader`] reads stage files from a data directory laid out as
//! `stage_1/` … `stage_6/`, returning typed records behind `Rc` handles.
//! Each file is parsed once per loader: later loads of the same file
//! return the cached record until [`DataLoader::clear_cache`] is called.
//!
//! The cache is keyed by file path and record type and lives in a
//! `RefCell`, so a loader is `!Sync`.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::de::DeserializeOwned;

use timetable_core::stage::{files, ASSIGNMENT_SEMESTERS};
use timetable_core::{
    DataLoadError, SchedulingError, Settings, Stage, TimetableError, ValidationError,
};
use timetable_models::{
    AiSchedule, ConfigFile, EnrichedTimetable, FacultyFile, FacultyFullFile, RoomPreferenceFile,
    SchedulingInput, StatisticsFile, StudentGroupFile, StudentGroupOverlapConstraints,
    SubjectFile, SubjectsFullFile, TeachingAssignmentsFile, Validate,
};

use crate::crossref::{self, Finding, StrictPolicy};
use crate::json::load_and_validate;
use crate::schedule;

type CacheKey = (PathBuf, TypeId);

/// Stage 1 input, typed.
#[derive(Debug, Clone)]
pub struct Stage1Data {
    pub config: Rc<ConfigFile>,
    pub faculty: Rc<FacultyFile>,
    /// Merged core and elective subject files.
    pub subjects: SubjectFile,
    pub student_groups: Rc<StudentGroupFile>,
    /// `None` when `roomPreferences.json` is absent.
    pub room_preferences: Option<Rc<RoomPreferenceFile>>,
}

#[derive(Debug, Clone)]
pub struct Stage2Data {
    pub faculty_full: Rc<FacultyFullFile>,
    pub subjects_full: Rc<SubjectsFullFile>,
}

#[derive(Debug, Clone)]
pub struct Stage3Data {
    /// Teaching assignments by semester; absent semester files are omitted.
    pub assignments: BTreeMap<u8, Rc<TeachingAssignmentsFile>>,
    pub overlap_constraints: Rc<StudentGroupOverlapConstraints>,
    pub statistics: Rc<StatisticsFile>,
}

impl Stage3Data {
    pub fn total_assignments(&self) -> usize {
        self.assignments.values().map(|f| f.assignments.len()).sum()
    }
}

/// Typed, cached access to a pipeline data directory.
#[derive(Debug)]
pub struct DataLoader {
    data_dir: PathBuf,
    policy: StrictPolicy,
    cache: RefCell<HashMap<CacheKey, Rc<dyn Any>>>,
}

impl DataLoader {
    /// Opens `data_dir` with the lenient policy.
    ///
    /// # Errors
    ///
    /// `DataLoadError` when `data_dir` does not exist or is not a directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, DataLoadError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            return Err(DataLoadError::at(
                &data_dir,
                format!("Data directory not found: {}", data_dir.display()),
            ));
        }
        if !data_dir.is_dir() {
            return Err(DataLoadError::at(
                &data_dir,
                format!("Data path is not a directory: {}", data_dir.display()),
            ));
        }
        tracing::debug!(data_dir = %data_dir.display(), "opened data directory");
        Ok(Self {
            data_dir,
            policy: StrictPolicy::lenient(),
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Opens `settings.data_dir`; strict mode selects [`StrictPolicy::strict`].
    pub fn from_settings(settings: &Settings) -> Result<Self, DataLoadError> {
        let policy = if settings.strict_mode {
            StrictPolicy::strict()
        } else {
            StrictPolicy::lenient()
        };
        Ok(Self::new(&settings.data_dir)?.with_policy(policy))
    }

    pub fn with_policy(mut self, policy: StrictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &StrictPolicy {
        &self.policy
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `<data_dir>/stage_<n>`.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` (as `TimetableError`) when `stage` is not 1..=6.
    pub fn stage_dir(&self, stage: u8) -> Result<PathBuf, TimetableError> {
        Ok(Stage::new(stage)?.dir(&self.data_dir))
    }

    fn stage_file(&self, stage: u8, name: &str) -> Result<PathBuf, TimetableError> {
        Ok(self.stage_dir(stage)?.join(name))
    }

    /// Number of records currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Drops every cached record. The next load of any file re-reads it.
    pub fn clear_cache(&self) {
        let dropped = self.cache.borrow().len();
        self.cache.borrow_mut().clear();
        tracing::debug!(dropped, "cleared loader cache");
    }

    fn load_cached<T>(&self, path: &Path) -> Result<Rc<T>, TimetableError>
    where
        T: DeserializeOwned + Validate + 'static,
    {
        let key = (path.to_path_buf(), TypeId::of::<T>());
        let hit = self.cache.borrow().get(&key).cloned();
        if let Some(record) = hit.and_then(|r| r.downcast::<T>().ok()) {
            tracing::debug!(path = %path.display(), "cache hit");
            return Ok(record);
        }

        tracing::debug!(path = %path.display(), "cache miss");
        let record: Rc<T> = Rc::new(load_and_validate(path)?);
        self.cache
            .borrow_mut()
            .insert(key, Rc::clone(&record) as Rc<dyn Any>);
        Ok(record)
    }

    /// Loads an optional file: `Ok(None)` when it is absent.
    fn load_optional<T>(&self, path: &Path) -> Result<Option<Rc<T>>, TimetableError>
    where
        T: DeserializeOwned + Validate + 'static,
    {
        if path.exists() {
            self.load_cached(path).map(Some)
        } else {
            tracing::debug!(path = %path.display(), "optional file absent");
            Ok(None)
        }
    }

    // ----- Stage 1 -----

    pub fn load_config(&self) -> Result<Rc<ConfigFile>, TimetableError> {
        self.load_cached(&self.stage_file(1, files::CONFIG)?)
    }

    pub fn load_faculty(&self) -> Result<Rc<FacultyFile>, TimetableError> {
        self.load_cached(&self.stage_file(1, files::FACULTY_BASIC)?)
    }

    /// Merges every subject file that exists, then keeps only `semester`
    /// when given.
    ///
    /// # Errors
    ///
    /// `DataLoadError` when none of the subject files exist; otherwise the
    /// first load failure.
    pub fn load_subjects(&self, semester: Option<u8>) -> Result<SubjectFile, TimetableError> {
        let stage_dir = self.stage_dir(1)?;
        let mut merged = SubjectFile::default();
        let mut found = 0;

        for name in files::SUBJECT_FILES {
            let path = stage_dir.join(name);
            if let Some(file) = self.load_optional::<SubjectFile>(&path)? {
                found += 1;
                merged.subjects.extend(file.subjects.iter().cloned());
            }
        }

        if found == 0 {
            return Err(DataLoadError::at(
                &stage_dir,
                format!("No subject files found in {}", stage_dir.display()),
            )
            .with_detail("expected", files::SUBJECT_FILES.to_vec())
            .into());
        }

        if let Some(semester) = semester {
            merged.subjects.retain(|s| s.semester == semester);
        }
        Ok(merged)
    }

    pub fn load_student_groups(&self) -> Result<Rc<StudentGroupFile>, TimetableError> {
        self.load_cached(&self.stage_file(1, files::STUDENT_GROUPS)?)
    }

    pub fn load_room_preferences(&self) -> Result<Rc<RoomPreferenceFile>, TimetableError> {
        self.load_cached(&self.stage_file(1, files::ROOM_PREFERENCES)?)
    }

    /// All stage 1 files. Room preferences are optional.
    pub fn load_all_stage1(&self) -> Result<Stage1Data, TimetableError> {
        let data = Stage1Data {
            config: self.load_config()?,
            faculty: self.load_faculty()?,
            subjects: self.load_subjects(None)?,
            student_groups: self.load_student_groups()?,
            room_preferences: self.load_optional(&self.stage_file(1, files::ROOM_PREFERENCES)?)?,
        };
        tracing::info!(
            faculty = data.faculty.faculty.len(),
            subjects = data.subjects.subjects.len(),
            student_groups = data.student_groups.student_groups.len(),
            "loaded stage 1"
        );
        Ok(data)
    }

    // ----- Stage 2 -----

    pub fn load_faculty_full(&self) -> Result<Rc<FacultyFullFile>, TimetableError> {
        self.load_cached(&self.stage_file(2, files::FACULTY_FULL)?)
    }

    pub fn load_subjects_full(&self) -> Result<Rc<SubjectsFullFile>, TimetableError> {
        self.load_cached(&self.stage_file(2, files::SUBJECTS_FULL)?)
    }

    pub fn load_all_stage2(&self) -> Result<Stage2Data, TimetableError> {
        let data = Stage2Data {
            faculty_full: self.load_faculty_full()?,
            subjects_full: self.load_subjects_full()?,
        };
        tracing::info!(
            faculty = data.faculty_full.faculty.len(),
            subjects = data.subjects_full.subjects.len(),
            "loaded stage 2"
        );
        Ok(data)
    }

    // ----- Stage 3 -----

    pub fn load_teaching_assignments(
        &self,
        semester: u8,
    ) -> Result<Rc<TeachingAssignmentsFile>, TimetableError> {
        self.load_cached(&self.stage_file(3, &files::teaching_assignments(semester))?)
    }

    /// Semesters 1 and 3, each loaded independently; absent files are
    /// omitted from the map.
    pub fn load_all_teaching_assignments(
        &self,
    ) -> Result<BTreeMap<u8, Rc<TeachingAssignmentsFile>>, TimetableError> {
        let mut out = BTreeMap::new();
        for semester in ASSIGNMENT_SEMESTERS {
            let path = self.stage_file(3, &files::teaching_assignments(semester))?;
            if let Some(file) = self.load_optional(&path)? {
                out.insert(semester, file);
            }
        }
        Ok(out)
    }

    pub fn load_overlap_constraints(
        &self,
    ) -> Result<Rc<StudentGroupOverlapConstraints>, TimetableError> {
        self.load_cached(&self.stage_file(3, files::OVERLAP_CONSTRAINTS)?)
    }

    pub fn load_statistics(&self) -> Result<Rc<StatisticsFile>, TimetableError> {
        self.load_cached(&self.stage_file(3, files::STATISTICS)?)
    }

    pub fn load_all_stage3(&self) -> Result<Stage3Data, TimetableError> {
        let data = Stage3Data {
            assignments: self.load_all_teaching_assignments()?,
            overlap_constraints: self.load_overlap_constraints()?,
            statistics: self.load_statistics()?,
        };
        tracing::info!(
            semesters = data.assignments.len(),
            assignments = data.total_assignments(),
            "loaded stage 3"
        );
        Ok(data)
    }

    // ----- Stages 4-6 -----

    pub fn load_scheduling_input(&self) -> Result<Rc<SchedulingInput>, TimetableError> {
        self.load_cached(&self.stage_file(4, files::SCHEDULING_INPUT)?)
    }

    pub fn load_ai_schedule(&self) -> Result<Rc<AiSchedule>, TimetableError> {
        self.load_cached(&self.stage_file(5, files::AI_SCHEDULE)?)
    }

    pub fn load_enriched_timetable(&self) -> Result<Rc<EnrichedTimetable>, TimetableError> {
        self.load_cached(&self.stage_file(6, files::ENRICHED_TIMETABLE)?)
    }

    // ----- Cross-validation -----

    fn finish(&self, stage: u8, findings: Vec<Finding>) -> Result<Vec<Finding>, TimetableError> {
        let checked = findings.len();
        let warnings = self.policy.apply(stage, findings)?;
        tracing::info!(stage, checked, warnings = warnings.len(), "cross-reference check complete");
        Ok(warnings)
    }

    /// Cross-reference checks within stage 1.
    ///
    /// # Errors
    ///
    /// Load failures, or a `ValidationError` listing the findings the
    /// policy promotes.
    pub fn validate_stage1(&self) -> Result<Vec<Finding>, TimetableError> {
        let data = self.load_all_stage1()?;
        self.finish(1, crossref::check_stage1(&data))
    }

    pub fn validate_stage2(&self) -> Result<Vec<Finding>, TimetableError> {
        let data = self.load_all_stage2()?;
        self.finish(2, crossref::check_stage2(&data))
    }

    /// Stage 3 against itself and stage 2.
    pub fn validate_stage3(&self) -> Result<Vec<Finding>, TimetableError> {
        let stage2 = self.load_all_stage2()?;
        let data = self.load_all_stage3()?;
        self.finish(3, crossref::check_stage3(&data, &stage2))
    }

    /// Solver output against the scheduling input. Every returned error is
    /// a broken hard constraint.
    pub fn validate_stage5(&self) -> Result<Vec<SchedulingError>, TimetableError> {
        let input = self.load_scheduling_input()?;
        let placed = self.load_ai_schedule()?;
        let errors = schedule::check_schedule(&input, &placed);
        for e in &errors {
            tracing::warn!(constraint = e.constraint.as_deref().unwrap_or(""), "{}", e.message);
        }
        tracing::info!(sessions = placed.schedule.len(), errors = errors.len(), "checked solver output");
        Ok(errors)
    }

    /// Enriched timetable totals, compared with stage 5 when present.
    pub fn validate_stage6(&self) -> Result<Vec<Finding>, TimetableError> {
        let timetable = self.load_enriched_timetable()?;
        let placed = self.load_optional::<AiSchedule>(&self.stage_file(5, files::AI_SCHEDULE)?)?;
        self.finish(6, crossref::check_stage6(&timetable, placed.as_deref()))
    }

    /// Runs the check for one stage and flattens the outcome to messages.
    ///
    /// Stage 4 has no cross-reference check beyond its own model rules, so
    /// it loads the scheduling input and reports nothing.
    pub fn validate_stage(&self, stage: u8) -> Result<Vec<String>, TimetableError> {
        let messages = |findings: Vec<Finding>| -> Vec<String> {
            findings.into_iter().map(|f| f.message).collect()
        };
        match Stage::new(stage)?.number() {
            1 => self.validate_stage1().map(messages),
            2 => self.validate_stage2().map(messages),
            3 => self.validate_stage3().map(messages),
            4 => self.load_scheduling_input().map(|_| Vec::new()),
            5 => {
                let errors = self.validate_stage5()?;
                if errors.is_empty() {
                    Ok(Vec::new())
                } else {
                    let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
                    Err(ValidationError::new(format!(
                        "Solver output breaks {} hard constraint(s): {}",
                        errors.len(),
                        listed[0]
                    ))
                    .with_detail("stage", 5)
                    .with_detail("errors", listed)
                    .into())
                }
            }
            _ => self.validate_stage6().map(messages),
        }
    }
}
