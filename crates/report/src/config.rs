//! Report configuration loaded from JSON

use crate::theme::Theme;
use crate::{ReportError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Institution texts printed on the reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Institution {
    pub name: String,
    /// Line under the name in the student report header
    pub subtitle: String,
    pub address: String,
    /// Line under the name in the batch report header
    pub batch_subtitle: String,
    /// Text drawn diagonally behind every page of the student report
    pub watermark: String,
    /// Institution line of the student report footer
    pub footer_name: String,
    pub system_name: String,
}

impl Default for Institution {
    fn default() -> Self {
        Self {
            name: "SETHUPATHY GOVERNMENT ARTS COLLEGE".to_string(),
            subtitle: "(Autonomous) | Affiliated to Madurai Kamaraj University".to_string(),
            address: "Ramanathapuram - 623 501, Tamil Nadu".to_string(),
            batch_subtitle: "Ramanathapuram - 623501 | (Autonomous)".to_string(),
            watermark: "SETHUPATHY COLLEGE".to_string(),
            footer_name: "Sethupathy Government Arts College (Autonomous) | Ramanathapuram"
                .to_string(),
            system_name: "Student Management System v2.0".to_string(),
        }
    }
}

/// Paths, links and styling for report generation
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory student reports are written to
    pub output_dir: PathBuf,
    /// Base of the verification link, including the trailing slash
    pub base_url: String,
    /// Directory holding `<umis>.jpg` / `<umis>.png` photos
    pub photo_dir: PathBuf,
    /// Fixed output path of the batch report
    pub batch_output_path: PathBuf,
    /// Rows shown in the detailed attendance log
    pub attendance_log_limit: usize,
    /// Characters kept from a batch row's marks summary
    pub marks_summary_limit: usize,
    pub institution: Institution,
    pub theme: Theme,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static/reports"),
            base_url: "http://127.0.0.1:5000/".to_string(),
            photo_dir: PathBuf::from("static/student_photos"),
            batch_output_path: PathBuf::from("static/reports/batch_report.pdf"),
            attendance_log_limit: 20,
            marks_summary_limit: 50,
            institution: Institution::default(),
            theme: Theme::default(),
        }
    }
}

impl ReportConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.attendance_log_limit == 0 {
            return Err(ReportError::Config(
                "attendance_log_limit must be at least 1".to_string(),
            ));
        }
        let font = &self.theme.font;
        if font.family != pdf_core::STANDARD_FAMILY && font.regular.is_none() {
            return Err(ReportError::Config(format!(
                "font family '{}' needs a regular TrueType file",
                font.family
            )));
        }
        Ok(())
    }

    /// Verification link encoded in the report QR code
    pub fn verification_url(&self, umis: &str) -> String {
        format!("{}verify/{}", self.base_url, umis)
    }

    /// `<output_dir>/student_report_<umis>_<YYYYmmdd_HHMMSS>.pdf`
    pub fn student_report_path(&self, umis: &str, generated_at: NaiveDateTime) -> PathBuf {
        self.output_dir.join(format!(
            "student_report_{}_{}.pdf",
            umis,
            generated_at.format("%Y%m%d_%H%M%S")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ReportConfig::from_json("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.attendance_log_limit, 20);
        assert_eq!(config.marks_summary_limit, 50);
    }

    #[test]
    fn test_partial_json() {
        let config = ReportConfig::from_json(
            r#"{"base_url": "https://college.example/", "institution": {"watermark": "DRAFT"}}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://college.example/");
        assert_eq!(config.institution.watermark, "DRAFT");
        assert_eq!(config.institution.name, Institution::default().name);
    }

    #[test]
    fn test_verification_url_is_plain_concatenation() {
        let config = ReportConfig::default();
        assert_eq!(
            config.verification_url("UMIS123"),
            "http://127.0.0.1:5000/verify/UMIS123"
        );
    }

    #[test]
    fn test_student_report_path() {
        let config = ReportConfig::default();
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(
            config.student_report_path("U42", at),
            PathBuf::from("static/reports/student_report_U42_20240309_140507.pdf")
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ReportConfig::from_json(r#"{"attendance_log_limit": 0}"#),
            Err(ReportError::Config(_))
        ));
        assert!(matches!(
            ReportConfig::from_json(r#"{"theme": {"font": {"family": "noto"}}}"#),
            Err(ReportError::Config(_))
        ));
        assert!(matches!(
            ReportConfig::from_json("not json"),
            Err(ReportError::Json(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let err = ReportConfig::from_file("/definitely/missing/report.json").unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
