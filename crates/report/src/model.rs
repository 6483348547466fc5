//! Student, attendance and subject records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Department a student belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: u32,
    pub name: String,
}

/// A student as read from the records store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Unique institutional identifier
    pub umis: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub guardian_phone: Option<String>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub current_year: Option<u32>,
}

impl StudentRecord {
    pub fn new(umis: &str, name: &str) -> Self {
        Self {
            umis: umis.to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            guardian_phone: None,
            department: None,
            current_year: None,
        }
    }
}

/// Attendance status for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Leave => "Leave",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            "Leave" => Ok(AttendanceStatus::Leave),
            other => Err(format!("unknown attendance status: {other}")),
        }
    }
}

/// One attendance entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_umis: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(student_umis: &str, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            student_umis: student_umis.to_string(),
            date,
            status,
        }
    }
}

/// A subject taught to a department in a given year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub code: String,
    pub name: String,
    pub department_id: u32,
    pub year: u32,
}

/// Credits and grade for one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectGrade {
    pub credits: u8,
    pub grade: String,
}

impl SubjectGrade {
    pub fn new(credits: u8, grade: &str) -> Self {
        Self {
            credits,
            grade: grade.to_string(),
        }
    }

    /// `Re-appear` for a U grade, `Completed` otherwise
    pub fn remark(&self) -> &'static str {
        if self.grade == "U" {
            "Re-appear"
        } else {
            "Completed"
        }
    }
}

/// Marks as entered: a number or free text such as "AB"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Marks {
    Number(f64),
    Text(String),
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marks::Number(n) => write!(f, "{n}"),
            Marks::Text(s) => f.write_str(s),
        }
    }
}

/// Marks for one subject in a batch row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMark {
    pub subject: String,
    pub marks: Marks,
}

/// Pre-aggregated row of the batch report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchStudentSummary {
    pub roll_number: Option<String>,
    pub name: String,
    pub email: String,
    pub department: String,
    pub year: Option<u32>,
    pub attendance_pct: f64,
    pub marks: Vec<SubjectMark>,
}
