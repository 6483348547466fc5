//! Multi-student batch report

use crate::config::ReportConfig;
use crate::document::{
    Block, Cell, Line, Margins, Orientation, Padding, Paragraph, ReportDocument, Row, Section,
    SectionKind, Table, TextAlign, TextStyle, VerticalAlign,
};
use crate::model::{BatchStudentSummary, SubjectMark};
use crate::render::PdfRenderer;
use crate::theme::HexColor;
use crate::{ReportError, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_TITLE: &str = "STUDENT BATCH REPORT";
const COLUMNS: [&str; 8] = [
    "S.No",
    "Roll No",
    "Name",
    "Email",
    "Department",
    "Year",
    "Attendance %",
    "Marks Summary",
];
const COLUMN_WIDTHS: [f64; 8] = [28.8, 64.8, 129.6, 158.4, 108.0, 36.0, 64.8, 180.0];
const SIGNATURE_LINE: &str = "_____________________";

/// Title and signature options for a batch report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Upper-cased before printing
    pub title: Option<String>,
    pub hod_sign: bool,
    pub principal_sign: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            title: None,
            hod_sign: true,
            principal_sign: false,
        }
    }
}

/// `subject: marks` pairs joined with `, `, cut to `limit` characters
///
/// Returns `-` for an empty list. `...` is appended only when something
/// was cut.
pub fn marks_summary(marks: &[SubjectMark], limit: usize) -> String {
    if marks.is_empty() {
        return "-".to_string();
    }

    let joined = marks
        .iter()
        .map(|m| format!("{}: {}", m.subject, m.marks))
        .collect::<Vec<_>>()
        .join(", ");

    if joined.chars().count() > limit {
        let mut cut: String = joined.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        joined
    }
}

/// Builds the landscape batch report
pub struct BatchComposer {
    config: ReportConfig,
    generated_at: Option<NaiveDateTime>,
}

impl BatchComposer {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            generated_at: None,
        }
    }

    /// Fix the generation time instead of reading the clock
    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn compose(&self, rows: &[BatchStudentSummary], options: &BatchOptions) -> ReportDocument {
        let theme = &self.config.theme;
        let institution = &self.config.institution;
        let generated_at = self
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());
        let title = options
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_uppercase();

        log::info!("composing batch report '{}' with {} row(s)", title, rows.len());

        let mut document = ReportDocument::new(
            title.clone(),
            Orientation::Landscape,
            Margins {
                top: 40.0,
                right: 30.0,
                bottom: 30.0,
                left: 30.0,
            },
        );

        let mut header = Section::new(SectionKind::Header);
        header
            .push(Block::Paragraph(
                Paragraph::styled(
                    institution.name.clone(),
                    TextStyle::new()
                        .size(16.0)
                        .bold()
                        .color(theme.primary)
                        .align(TextAlign::Center),
                )
                .spacing(0.0, 4.0),
            ))
            .push(Block::Paragraph(
                Paragraph::styled(
                    institution.batch_subtitle.clone(),
                    TextStyle::new()
                        .size(10.0)
                        .color(HexColor::rgb(0x55, 0x55, 0x55))
                        .align(TextAlign::Center),
                )
                .spacing(0.0, 15.0),
            ))
            .push(Block::Spacer { height: 14.4 });

        let mut title_section = Section::new(SectionKind::Title);
        title_section
            .push(Block::Paragraph(Paragraph::styled(
                title,
                TextStyle::new()
                    .size(14.0)
                    .bold()
                    .color(theme.secondary)
                    .align(TextAlign::Center),
            )))
            .push(Block::Spacer { height: 21.6 });

        let mut table_section = Section::new(SectionKind::BatchTable);
        table_section.push(Block::Table(self.table(rows)));

        document.sections = vec![header, title_section, table_section];

        if options.hod_sign || options.principal_sign {
            document.sections.push(signatures(options));
        }

        let mut footer = Section::new(SectionKind::Footer);
        footer
            .push(Block::Spacer { height: 28.8 })
            .push(Block::Paragraph(Paragraph::styled(
                format!(
                    "Generated on {} | Student Management System",
                    generated_at.format("%d %B %Y at %I:%M %p")
                ),
                TextStyle::new()
                    .size(8.0)
                    .color(HexColor::GRAY)
                    .align(TextAlign::Center),
            )));
        document.sections.push(footer);

        document
    }

    fn table(&self, rows: &[BatchStudentSummary]) -> Table {
        let theme = &self.config.theme;
        let left = TextStyle::new().align(TextAlign::Left);

        let mut table = Table::new(COLUMN_WIDTHS.to_vec())
            .header_rows(1)
            .style(TextStyle::new().size(8.0).align(TextAlign::Center))
            .padding(Padding::symmetric(6.0, 6.0))
            .grid(Line::new(0.5, HexColor::rgb(0xcc, 0xcc, 0xcc)))
            .border(Line::new(1.5, theme.secondary))
            .row_backgrounds(vec![HexColor::WHITE, HexColor::rgb(0xf9, 0xf9, 0xf9)])
            .row(
                Row::new(COLUMNS.iter().map(|c| Cell::text(*c)).collect())
                    .with_style(TextStyle::new().size(9.0).bold().color(HexColor::WHITE))
                    .with_background(theme.primary),
            );

        for (index, row) in rows.iter().enumerate() {
            table = table.row(Row::new(vec![
                Cell::text((index + 1).to_string()),
                Cell::text(row.roll_number.clone().unwrap_or_else(|| "N/A".to_string())),
                Cell::text(row.name.clone()).with_style(left),
                Cell::text(row.email.clone()).with_style(left),
                Cell::text(row.department.clone()),
                Cell::text(row.year.map(|y| y.to_string()).unwrap_or_default()),
                Cell::text(format!("{:.1}%", row.attendance_pct)),
                Cell::text(marks_summary(&row.marks, self.config.marks_summary_limit)),
            ]));
        }

        table
    }

    /// Compose and write to the configured batch path, creating its parent
    /// directory
    pub fn generate(&self, rows: &[BatchStudentSummary], options: &BatchOptions) -> Result<PathBuf> {
        let document = self.compose(rows, options);
        let path = self.config.batch_output_path.clone();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }

        PdfRenderer::new(self.config.theme.clone()).render_to_file(&document, &path)?;
        Ok(path)
    }
}

fn signatures(options: &BatchOptions) -> Section {
    let block = |enabled: bool, role: &str, align: TextAlign| {
        if !enabled {
            return Cell::empty();
        }
        let style = TextStyle::new().size(10.0).align(align);
        Cell::paragraphs(vec![
            Paragraph::styled(SIGNATURE_LINE, style).spacing(24.0, 0.0),
            Paragraph::styled(role, style.bold()),
        ])
    };

    let mut table = Table::new(vec![360.0, 360.0]).row(Row::new(vec![
        block(options.hod_sign, "Head of Department", TextAlign::Left),
        block(options.principal_sign, "Principal", TextAlign::Right),
    ]));
    table.valign = VerticalAlign::Top;

    let mut section = Section::new(SectionKind::Signatures);
    section
        .push(Block::Spacer { height: 43.2 })
        .push(Block::Table(table));
    section
}
