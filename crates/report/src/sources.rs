//! Collaborators the composer reads from: student records and photos

use crate::model::{AttendanceRecord, StudentRecord, SubjectRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lookup of students and their records
pub trait StudentDirectory {
    fn find_student(&self, umis: &str) -> Option<StudentRecord>;

    fn attendance_for(&self, umis: &str) -> Vec<AttendanceRecord>;

    /// Subjects taught to a department in a given year
    fn subjects_for(&self, department_id: u32, year: u32) -> Vec<SubjectRecord>;
}

/// Directory backed by in-memory lists, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryDirectory {
    pub students: Vec<StudentRecord>,
    pub attendance: Vec<AttendanceRecord>,
    pub subjects: Vec<SubjectRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_student(mut self, student: StudentRecord) -> Self {
        self.students.push(student);
        self
    }

    pub fn with_attendance(mut self, records: impl IntoIterator<Item = AttendanceRecord>) -> Self {
        self.attendance.extend(records);
        self
    }

    pub fn with_subjects(mut self, subjects: impl IntoIterator<Item = SubjectRecord>) -> Self {
        self.subjects.extend(subjects);
        self
    }
}

impl StudentDirectory for InMemoryDirectory {
    fn find_student(&self, umis: &str) -> Option<StudentRecord> {
        self.students.iter().find(|s| s.umis == umis).cloned()
    }

    fn attendance_for(&self, umis: &str) -> Vec<AttendanceRecord> {
        self.attendance
            .iter()
            .filter(|a| a.student_umis == umis)
            .cloned()
            .collect()
    }

    fn subjects_for(&self, department_id: u32, year: u32) -> Vec<SubjectRecord> {
        self.subjects
            .iter()
            .filter(|s| s.department_id == department_id && s.year == year)
            .cloned()
            .collect()
    }
}

/// Source of student photos
pub trait PhotoStore {
    fn photo_for(&self, umis: &str) -> Option<PathBuf>;
}

/// Photos stored as `<dir>/<umis>.jpg` or `<dir>/<umis>.png`
#[derive(Debug, Clone)]
pub struct DirectoryPhotoStore {
    dir: PathBuf,
}

impl DirectoryPhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PhotoStore for DirectoryPhotoStore {
    /// JPEG wins over PNG when both exist
    fn photo_for(&self, umis: &str) -> Option<PathBuf> {
        ["jpg", "png"]
            .iter()
            .map(|ext| self.dir.join(format!("{umis}.{ext}")))
            .find(|path| path.is_file())
    }
}
