//! Grade sources for the subject performance table

use crate::model::{StudentRecord, SubjectGrade, SubjectRecord};
use std::collections::HashMap;

/// Where subject grades come from
pub trait GradeBook {
    fn grade(&self, student: &StudentRecord, subject: &SubjectRecord) -> Option<SubjectGrade>;

    /// True when grades are generated rather than recorded
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// No grades available; the table shows "-" and "Not Graded"
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGrades;

impl GradeBook for NoGrades {
    fn grade(&self, _student: &StudentRecord, _subject: &SubjectRecord) -> Option<SubjectGrade> {
        None
    }
}

/// Grades read from persisted records, keyed by (umis, subject code)
#[derive(Debug, Clone, Default)]
pub struct RecordedGrades {
    grades: HashMap<(String, String), SubjectGrade>,
}

impl RecordedGrades {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, umis: &str, subject_code: &str, grade: SubjectGrade) {
        self.grades
            .insert((umis.to_string(), subject_code.to_string()), grade);
    }
}

impl GradeBook for RecordedGrades {
    fn grade(&self, student: &StudentRecord, subject: &SubjectRecord) -> Option<SubjectGrade> {
        self.grades
            .get(&(student.umis.clone(), subject.code.clone()))
            .cloned()
    }
}

const MOCK_GRADES: [&str; 7] = ["O", "D+", "D", "A+", "A", "B", "U"];

/// Deterministic placeholder grades for demos
///
/// The same seed, student and subject always give the same grade.
#[derive(Debug, Clone, Copy)]
pub struct MockGrades {
    seed: u64,
}

impl MockGrades {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl GradeBook for MockGrades {
    fn grade(&self, student: &StudentRecord, subject: &SubjectRecord) -> Option<SubjectGrade> {
        let mut rng = fastrand::Rng::with_seed(mix(self.seed, &student.umis, &subject.code));
        let credits = if rng.bool() { 3 } else { 4 };
        let grade = MOCK_GRADES[rng.usize(..MOCK_GRADES.len())];
        Some(SubjectGrade::new(credits, grade))
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

/// FNV-1a over the seed, umis and subject code, stable across toolchains
fn mix(seed: u64, umis: &str, code: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let bytes = seed
        .to_le_bytes()
        .into_iter()
        .chain(umis.bytes())
        .chain([0])
        .chain(code.bytes());
    bytes.fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}
