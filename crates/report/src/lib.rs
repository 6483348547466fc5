//! Report - student academic reports as PDF
//!
//! This crate provides:
//! - Student, attendance and subject records
//! - Attendance aggregation and tiering
//! - Grade sources (none, recorded, placeholder)
//! - A backend-agnostic document model
//! - Composers for the single-student report and the batch report
//! - A PDF backend with flow layout, pagination and page overlays
//!
//! # Example
//!
//! ```ignore
//! use report::{generate_student_report, InMemoryDirectory, ReportComposer, ReportConfig};
//!
//! let config = ReportConfig::from_file("report.json")?;
//! let directory = InMemoryDirectory::from_json(&std::fs::read_to_string("records.json")?)?;
//! let composer = ReportComposer::new(config);
//! let path = generate_student_report(&directory, &composer, "UMIS001")?;
//! ```

pub mod batch;
pub mod composer;
pub mod config;
pub mod document;
pub mod grades;
pub mod model;
pub mod render;
pub mod sources;
pub mod summary;
pub mod theme;

pub use batch::{marks_summary, BatchComposer, BatchOptions};
pub use composer::{generate_student_report, ComposedReport, ReportComposer};
pub use config::{Institution, ReportConfig};
pub use document::{
    Block, Cell, CellContent, Line, Margins, Orientation, Padding, Paragraph, PieChart, PieSlice,
    ReportDocument, Row, Rule, Section, SectionKind, Table, TextAlign, TextStyle, VerticalAlign,
};
pub use grades::{GradeBook, MockGrades, NoGrades, RecordedGrades};
pub use model::{
    AttendanceRecord, AttendanceStatus, BatchStudentSummary, Department, Marks, StudentRecord,
    SubjectGrade, SubjectMark, SubjectRecord,
};
pub use render::PdfRenderer;
pub use sources::{DirectoryPhotoStore, InMemoryDirectory, PhotoStore, StudentDirectory};
pub use summary::{AttendanceSummary, Tier};
pub use theme::{FontConfig, HexColor, Theme};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while composing or rendering reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short message safe to show to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::StudentNotFound(_) => "student not found",
            _ => "could not generate report, try again",
        }
    }
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
