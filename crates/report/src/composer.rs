//! Single-student report composition

use crate::config::ReportConfig;
use crate::document::{
    Block, Cell, Line, Margins, Orientation, Padding, Paragraph, PieChart, PieSlice,
    ReportDocument, Row, Rule, Section, SectionKind, Table, TextAlign, TextStyle,
};
use crate::grades::{GradeBook, NoGrades};
use crate::model::{AttendanceRecord, StudentRecord, SubjectRecord};
use crate::render::PdfRenderer;
use crate::sources::{DirectoryPhotoStore, PhotoStore, StudentDirectory};
use crate::summary::AttendanceSummary;
use crate::theme::{HexColor, Theme};
use crate::{ReportError, Result};
use chrono::{Local, NaiveDateTime};
use pdf_core::image_dimensions;
use std::path::{Path, PathBuf};

const NOT_PROVIDED: &str = "Not Provided";
const NO_SUBJECTS: &str = "No subject enrollment records found for this academic year.";
const NO_ATTENDANCE: &str = "No attendance records available.";
const NO_CHART_DATA: &str = "(No data for visual chart)";
const PLACEHOLDER_GRADES_NOTE: &str =
    "Grades and credits shown are placeholder values and are not an official record.";

const SUMMARY_BACKGROUNDS: [HexColor; 4] = [
    HexColor::rgb(0xe3, 0xf2, 0xfd),
    HexColor::rgb(0xe8, 0xf5, 0xe9),
    HexColor::rgb(0xff, 0xeb, 0xee),
    HexColor::rgb(0xff, 0xf3, 0xe0),
];
const INFO_GRID: HexColor = HexColor::rgb(0xb0, 0xbe, 0xc5);
const SUBTITLE: HexColor = HexColor::rgb(0xe0, 0xe0, 0xe0);

/// A composed report and where it should be written
#[derive(Debug, Clone)]
pub struct ComposedReport {
    pub document: ReportDocument,
    pub output_path: PathBuf,
}

/// Builds the single-student academic report
///
/// Photos come from the configured photo directory and no grades are shown
/// unless a [`GradeBook`] is supplied.
pub struct ReportComposer {
    config: ReportConfig,
    photos: Box<dyn PhotoStore>,
    grades: Box<dyn GradeBook>,
    seed: Option<u64>,
    generated_at: Option<NaiveDateTime>,
}

impl ReportComposer {
    pub fn new(config: ReportConfig) -> Self {
        let photos = DirectoryPhotoStore::new(config.photo_dir.clone());
        Self {
            config,
            photos: Box::new(photos),
            grades: Box::new(NoGrades),
            seed: None,
            generated_at: None,
        }
    }

    pub fn with_photo_store(mut self, photos: impl PhotoStore + 'static) -> Self {
        self.photos = Box::new(photos);
        self
    }

    pub fn with_grade_book(mut self, grades: impl GradeBook + 'static) -> Self {
        self.grades = Box::new(grades);
        self
    }

    /// Fix the verification suffix generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fix the generation time instead of reading the clock
    pub fn with_timestamp(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Build the report document for one student
    ///
    /// Only subjects matching the student's department and current year
    /// are listed.
    pub fn compose(
        &self,
        student: &StudentRecord,
        attendance: &[AttendanceRecord],
        subjects: &[SubjectRecord],
    ) -> ComposedReport {
        let generated_at = self
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());
        let theme = &self.config.theme;
        let summary = AttendanceSummary::from_records(attendance);

        let enrolled: Vec<&SubjectRecord> = match (&student.department, student.current_year) {
            (Some(department), Some(year)) => subjects
                .iter()
                .filter(|s| s.department_id == department.id && s.year == year)
                .collect(),
            _ => Vec::new(),
        };

        log::info!(
            "composing report for {}: {} attendance record(s), {} subject(s)",
            student.umis,
            summary.total(),
            enrolled.len()
        );

        let mut document = ReportDocument::new(
            format!("Student Academic Report - {}", student.name),
            Orientation::Portrait,
            Margins::all(50.0),
        );
        document.watermark = Some(self.config.institution.watermark.clone());
        document.page_numbers = true;
        document.sections = vec![
            self.header(student),
            title_banner(theme),
            student_info(student, theme),
            attendance_summary(&summary, theme),
            self.subject_performance(student, &enrolled),
            attendance_log(attendance, self.config.attendance_log_limit, theme),
            self.footer(student, generated_at),
        ];

        ComposedReport {
            document,
            output_path: self.config.student_report_path(&student.umis, generated_at),
        }
    }

    /// Compose and write the report, returning the written path
    pub fn generate(
        &self,
        student: &StudentRecord,
        attendance: &[AttendanceRecord],
        subjects: &[SubjectRecord],
    ) -> Result<PathBuf> {
        let report = self.compose(student, attendance, subjects);

        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;

        PdfRenderer::new(self.config.theme.clone())
            .render_to_file(&report.document, &report.output_path)?;
        Ok(report.output_path)
    }

    fn header(&self, student: &StudentRecord) -> Section {
        let theme = &self.config.theme;
        let institution = &self.config.institution;

        let photo = match self
            .photos
            .photo_for(&student.umis)
            .filter(|path| is_readable_image(path))
        {
            Some(path) => {
                log::debug!("using photo {}", path.display());
                Cell::image(path, 79.2, 79.2)
            }
            None => {
                log::debug!("no photo for {}", student.umis);
                Cell::paragraphs(vec![Paragraph::styled(
                    "NO PHOTO",
                    TextStyle::new().size(8.0).bold(),
                )])
            }
        };

        let subtitle = TextStyle::new().size(9.0).color(SUBTITLE).leading(11.0);
        let college = Cell::paragraphs(vec![
            Paragraph::styled(
                institution.name.clone(),
                TextStyle::new().size(18.0).bold().color(HexColor::WHITE).leading(22.0),
            )
            .spacing(0.0, 4.0),
            Paragraph::styled(institution.subtitle.clone(), subtitle.italic()),
            Paragraph::styled(institution.address.clone(), subtitle),
        ])
        .with_background(theme.primary);

        let qr = Cell::qr_code(self.config.verification_url(&student.umis), 60.0);

        let table = Table::new(vec![93.6, 288.0, 93.6])
            .style(TextStyle::new().align(TextAlign::Center))
            .padding(Padding::symmetric(8.0, 4.0))
            .grid(Line::new(0.5, HexColor::LIGHTGREY))
            .border(Line::new(2.0, theme.primary))
            .row(Row::new(vec![
                photo.with_background(HexColor::WHITE),
                college,
                qr.with_background(HexColor::WHITE),
            ]));

        let mut section = Section::new(SectionKind::Header);
        section
            .push(Block::Table(table))
            .push(Block::Rule(Rule {
                thickness: 3.0,
                color: theme.accent,
                width: Some(468.0),
            }))
            .push(Block::Rule(Rule {
                thickness: 1.0,
                color: theme.secondary,
                width: Some(468.0),
            }))
            .push(Block::Spacer { height: 10.8 });
        section
    }

    fn subject_performance(&self, student: &StudentRecord, subjects: &[&SubjectRecord]) -> Section {
        let theme = &self.config.theme;
        let mut section = Section::new(SectionKind::SubjectPerformance);
        section.push(heading("ACADEMIC SUBJECTS & PERFORMANCE", theme));

        if subjects.is_empty() {
            section.push(Block::Paragraph(Paragraph::styled(
                NO_SUBJECTS,
                TextStyle::new().italic(),
            )));
        } else {
            let mut table = Table::new(vec![86.4, 201.6, 57.6, 57.6, 86.4])
                .header_rows(1)
                .style(TextStyle::new().align(TextAlign::Center))
                .padding(Padding::symmetric(8.0, 6.0))
                .grid(Line::new(1.0, HexColor::rgb(0xee, 0xee, 0xee)))
                .border(Line::new(1.0, theme.secondary))
                .row_backgrounds(vec![HexColor::WHITE, HexColor::rgb(0xf8, 0xf9, 0xfa)])
                .row(header_row(
                    &["Subject Code", "Subject Name", "Credits", "Grade", "Remarks"],
                    theme.secondary,
                ));

            let left = TextStyle::new().align(TextAlign::Left);
            for subject in subjects {
                let (credits, grade, remark) = match self.grades.grade(student, subject) {
                    Some(g) => (g.credits.to_string(), g.grade.clone(), g.remark().to_string()),
                    None => ("-".to_string(), "-".to_string(), "Not Graded".to_string()),
                };
                table = table.row(Row::new(vec![
                    Cell::text(subject.code.clone()),
                    Cell::text(subject.name.clone()).with_style(left),
                    Cell::text(credits),
                    Cell::text(grade),
                    Cell::text(remark),
                ]));
            }
            section.push(Block::Table(table));

            if self.grades.is_placeholder() {
                log::warn!("report for {} uses placeholder grades", student.umis);
                section.push(Block::Paragraph(
                    Paragraph::styled(
                        PLACEHOLDER_GRADES_NOTE,
                        TextStyle::new().size(8.0).italic().color(theme.muted),
                    )
                    .spacing(4.0, 0.0),
                ));
            }
        }

        section.push(Block::Spacer { height: 25.2 });
        section
    }

    fn footer(&self, student: &StudentRecord, generated_at: NaiveDateTime) -> Section {
        let theme = &self.config.theme;
        let institution = &self.config.institution;
        let mut rng = match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let verification = format!("{}-{}", student.umis, rng.u32(1000..=9999));

        let style = TextStyle::new()
            .size(8.0)
            .leading(10.0)
            .color(theme.muted)
            .align(TextAlign::Center);
        let lines = [
            format!(
                "Report Generated: {} | Verification ID: {}",
                generated_at.format("%d %B %Y at %I:%M %p"),
                verification
            ),
            institution.footer_name.clone(),
            format!(
                "Scan the QR Code to verify authenticity online. | {}",
                institution.system_name
            ),
            "This is a computer-generated document and does not require a signature.".to_string(),
        ];

        let mut section = Section::new(SectionKind::Footer);
        section
            .push(Block::Spacer { height: 36.0 })
            .push(Block::Rule(Rule {
                thickness: 2.0,
                color: theme.accent,
                width: Some(468.0),
            }))
            .push(Block::Spacer { height: 10.8 });
        for line in lines {
            section.push(Block::Paragraph(Paragraph::styled(line, style)));
        }
        section
    }
}

fn heading(text: &str, theme: &Theme) -> Block {
    Block::Paragraph(
        Paragraph::styled(text, TextStyle::new().size(13.0).bold().color(theme.primary))
            .spacing(15.0, 10.0),
    )
}

/// Bold white labels on a coloured row
fn header_row(labels: &[&str], background: HexColor) -> Row {
    Row::new(labels.iter().map(|label| Cell::text(*label)).collect())
        .with_style(TextStyle::new().bold().color(HexColor::WHITE))
        .with_background(background)
}

fn or_not_provided(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_PROVIDED)
        .to_string()
}

fn title_banner(theme: &Theme) -> Section {
    let banner = Table::new(vec![468.0])
        .padding(Padding::all(10.0))
        .row(Row::new(vec![Cell::paragraphs(vec![Paragraph::styled(
            "STUDENT ACADEMIC REPORT",
            TextStyle::new()
                .size(16.0)
                .bold()
                .color(HexColor::WHITE)
                .align(TextAlign::Center),
        )])
        .with_background(theme.secondary)]));

    let mut section = Section::new(SectionKind::Title);
    section
        .push(Block::Table(banner))
        .push(Block::Spacer { height: 18.0 });
    section
}

fn student_info(student: &StudentRecord, theme: &Theme) -> Section {
    let department = student
        .department
        .as_ref()
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "Not Assigned".to_string());
    let year = student
        .current_year
        .map(|y| format!("Year {y}"))
        .unwrap_or_else(|| "Not Specified".to_string());

    let fields = [
        ("UMIS Number:", student.umis.clone()),
        ("Full Name:", student.name.clone()),
        ("Email Address:", or_not_provided(student.email.as_deref())),
        ("Phone Number:", or_not_provided(student.phone.as_deref())),
        ("Department:", department),
        ("Current Year:", year),
        ("Parent/Guardian Contact:", or_not_provided(student.guardian_phone.as_deref())),
    ];

    let label = TextStyle::new().bold().color(theme.primary);
    let mut table = Table::new(vec![158.4, 309.6])
        .style(TextStyle::new().size(10.0))
        .padding(Padding::symmetric(10.0, 12.0))
        .grid(Line::new(1.0, INFO_GRID))
        .border(Line::new(2.0, theme.secondary));
    for (name, value) in fields {
        table = table.row(Row::new(vec![
            Cell::text(name).with_style(label).with_background(theme.light),
            Cell::text(value).with_background(HexColor::WHITE),
        ]));
    }

    let mut section = Section::new(SectionKind::StudentInfo);
    section
        .push(heading("STUDENT INFORMATION", theme))
        .push(Block::Table(table))
        .push(Block::Spacer { height: 25.2 });
    section
}

fn attendance_summary(summary: &AttendanceSummary, theme: &Theme) -> Section {
    let tier_color = theme.tier_color(summary.tier());
    let values = [
        summary.total().to_string(),
        summary.present().to_string(),
        summary.absent().to_string(),
        summary.leave().to_string(),
    ];

    let mut cells: Vec<Cell> = values
        .into_iter()
        .zip(SUMMARY_BACKGROUNDS)
        .map(|(value, background)| Cell::text(value).with_background(background))
        .collect();
    let on_tier = TextStyle::new().color(HexColor::WHITE);
    cells.push(
        Cell::text(format!("{:.1}%", summary.percentage()))
            .with_style(on_tier)
            .with_background(tier_color),
    );
    cells.push(
        Cell::text(summary.tier().label())
            .with_style(on_tier)
            .with_background(tier_color),
    );

    let table = Table::new(vec![75.6; 6])
        .style(TextStyle::new().size(10.0).align(TextAlign::Center))
        .padding(Padding::symmetric(10.0, 6.0))
        .grid(Line::new(1.5, HexColor::WHITE))
        .border(Line::new(2.0, theme.secondary))
        .row(header_row(
            &["Total Days", "Present", "Absent", "Leave", "Percentage", "Status"],
            theme.primary,
        ))
        .row(Row::new(cells).with_style(TextStyle::new().bold()));

    let mut section = Section::new(SectionKind::AttendanceSummary);
    section
        .push(heading("ATTENDANCE SUMMARY & TRENDS", theme))
        .push(Block::Table(table))
        .push(Block::Spacer { height: 7.2 });

    if summary.total() > 0 {
        section.push(Block::PieChart(PieChart {
            width: 432.0,
            height: 100.0,
            diameter: 80.0,
            slices: vec![
                PieSlice {
                    label: "Present".to_string(),
                    value: summary.present() as f64,
                    color: theme.success,
                },
                PieSlice {
                    label: "Absent".to_string(),
                    value: summary.absent() as f64,
                    color: theme.danger,
                },
                PieSlice {
                    label: "Leave".to_string(),
                    value: summary.leave() as f64,
                    color: theme.warning,
                },
            ],
            caption: vec![
                Paragraph::styled("Visual Representation", TextStyle::new().bold()),
                Paragraph::new("Attendance Distribution"),
            ],
        }));
    } else {
        section.push(Block::Paragraph(Paragraph::new(NO_CHART_DATA)));
    }

    section.push(Block::Spacer { height: 25.2 });
    section
}

fn attendance_log(records: &[AttendanceRecord], limit: usize, theme: &Theme) -> Section {
    let mut section = Section::new(SectionKind::AttendanceLog);
    section.push(heading("DETAILED ATTENDANCE LOG", theme));

    if records.is_empty() {
        section.push(Block::Paragraph(Paragraph::styled(
            NO_ATTENDANCE,
            TextStyle::new().italic(),
        )));
        return section;
    }

    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut table = Table::new(vec![43.2, 129.6, 115.2, 108.0])
        .header_rows(1)
        .style(TextStyle::new().align(TextAlign::Center))
        .padding(Padding::symmetric(6.0, 6.0))
        .grid(Line::new(0.5, INFO_GRID))
        .border(Line::new(2.0, theme.secondary))
        .row_backgrounds(vec![HexColor::WHITE, HexColor::rgb(0xf5, 0xf5, 0xf5)])
        .row(header_row(&["S.No", "Date", "Day", "Status"], theme.primary));

    for (index, record) in sorted.iter().take(limit).enumerate() {
        table = table.row(Row::new(vec![
            Cell::text((index + 1).to_string()),
            Cell::text(record.date.format("%d-%b-%Y").to_string()),
            Cell::text(record.date.format("%A").to_string()),
            Cell::text(record.status.as_str())
                .with_style(TextStyle::new().color(theme.status_color(record.status))),
        ]));
    }
    section.push(Block::Table(table));

    if sorted.len() > limit {
        section.push(Block::Paragraph(Paragraph::styled(
            format!("...and {} more records available online.", sorted.len() - limit),
            TextStyle::new().italic(),
        )));
    }
    section
}

/// Look a student up and write their report
///
/// Fails with [`ReportError::StudentNotFound`] for an unknown identifier.
pub fn generate_student_report(
    directory: &dyn StudentDirectory,
    composer: &ReportComposer,
    umis: &str,
) -> Result<PathBuf> {
    let student = directory
        .find_student(umis)
        .ok_or_else(|| ReportError::StudentNotFound(umis.to_string()))?;
    let attendance = directory.attendance_for(umis);
    let subjects = match (&student.department, student.current_year) {
        (Some(department), Some(year)) => directory.subjects_for(department.id, year),
        _ => Vec::new(),
    };

    composer.generate(&student, &attendance, &subjects)
}

/// Broken photos get the same placeholder as missing ones
fn is_readable_image(path: &Path) -> bool {
    let dimensions = std::fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|data| image_dimensions(&data).map_err(|e| e.to_string()));
    match dimensions {
        Ok((width, height)) if width > 0 && height > 0 => true,
        Ok(_) => {
            log::warn!("ignoring empty photo {}", path.display());
            false
        }
        Err(e) => {
            log::warn!("ignoring photo {}: {e}", path.display());
            false
        }
    }
}
