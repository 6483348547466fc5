//! Integration tests for report generation
//!
//! Reports are written to temporary directories and read back with lopdf.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use lopdf::{Document, Object};
use pretty_assertions::assert_eq;
use report::{
    generate_student_report, AttendanceRecord, AttendanceStatus, BatchComposer, BatchOptions,
    BatchStudentSummary, Department, DirectoryPhotoStore, FontConfig, InMemoryDirectory, Marks,
    PdfRenderer, ReportComposer, ReportConfig, ReportError, StudentRecord, SubjectMark,
    SubjectRecord,
};
use std::path::Path;

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 5)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap()
}

fn config(dir: &Path) -> ReportConfig {
    ReportConfig {
        output_dir: dir.join("reports"),
        photo_dir: dir.join("photos"),
        batch_output_path: dir.join("reports").join("batch_report.pdf"),
        ..ReportConfig::default()
    }
}

fn student() -> StudentRecord {
    StudentRecord {
        email: Some("meena@example.com".to_string()),
        phone: Some("98765 43210".to_string()),
        department: Some(Department {
            id: 4,
            name: "Mathematics".to_string(),
        }),
        current_year: Some(1),
        ..StudentRecord::new("UMIS2024001", "Meena K")
    }
}

fn attendance(count: usize) -> Vec<AttendanceRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    (0..count)
        .map(|i| {
            let status = if i % 5 == 4 {
                AttendanceStatus::Absent
            } else {
                AttendanceStatus::Present
            };
            AttendanceRecord::new("UMIS2024001", start + Duration::days(i as i64), status)
        })
        .collect()
}

fn directory(records: usize) -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_student(student())
        .with_attendance(attendance(records))
        .with_subjects([
            SubjectRecord {
                code: "MA101".to_string(),
                name: "Calculus".to_string(),
                department_id: 4,
                year: 1,
            },
            SubjectRecord {
                code: "MA102".to_string(),
                name: "Linear Algebra".to_string(),
                department_id: 4,
                year: 1,
            },
        ])
}

fn all_text(pdf: &Document) -> String {
    pdf.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&pdf.get_page_content(*id).unwrap()).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

fn page_text(pdf: &Document, page: u32) -> String {
    let page_id = pdf.get_pages()[&page];
    String::from_utf8_lossy(&pdf.get_page_content(page_id).unwrap()).into_owned()
}

fn image_filters(pdf: &Document) -> Vec<Vec<u8>> {
    pdf.objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) => {
                let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok()?;
                if subtype != b"Image" {
                    return None;
                }
                let filter = stream.dict.get(b"Filter").and_then(Object::as_name).ok()?;
                Some(filter.to_vec())
            }
            _ => None,
        })
        .collect()
}

fn write_image(path: &Path, format: ImageFormat) {
    let img = ImageBuffer::from_pixel(32, 40, Rgb([200u8, 180, 160]));
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, format)
        .unwrap();
}

#[test]
fn test_student_report_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let composer = ReportComposer::new(config(dir.path()))
        .with_seed(9)
        .with_timestamp(timestamp());

    let path = generate_student_report(&directory(10), &composer, "UMIS2024001").unwrap();
    assert_eq!(
        path,
        dir.path()
            .join("reports")
            .join("student_report_UMIS2024001_20241105_101500.pdf")
    );

    let pdf = Document::load(&path).unwrap();
    assert!(!pdf.get_pages().is_empty());

    let text = all_text(&pdf);
    for expected in [
        "(STUDENT ACADEMIC REPORT)",
        "(STUDENT INFORMATION)",
        "(Meena K)",
        "(98765 43210)",
        "(Mathematics)",
        "(Calculus)",
        "(Not Graded)",
        "(80.0%)",
        "(Excellent)",
        "(Visual Representation)",
        "(NO PHOTO)",
    ] {
        assert!(text.contains(expected), "missing {expected}");
    }

    let first = page_text(&pdf, 1);
    assert!(first.contains("(SETHUPATHY COLLEGE)"));
    assert!(first.contains("(Page 1)"));
}

#[test]
fn test_every_page_has_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let composer = ReportComposer::new(config(dir.path())).with_timestamp(timestamp());

    let path = generate_student_report(&directory(25), &composer, "UMIS2024001").unwrap();
    let pdf = Document::load(&path).unwrap();
    let pages = pdf.get_pages().len() as u32;
    assert!(pages >= 2);

    for page in 1..=pages {
        let text = page_text(&pdf, page);
        assert!(text.contains(&format!("(Page {page})")), "page {page}");
        assert!(text.contains("(SETHUPATHY COLLEGE)"), "page {page}");
    }

    let text = all_text(&pdf);
    assert!(text.contains("(...and 5 more records available online.)"));
    assert!(text.contains("(20)"));
    assert!(!text.contains("(21)"));
}

#[test]
fn test_empty_attendance_report() {
    let dir = tempfile::tempdir().unwrap();
    let directory = InMemoryDirectory::new().with_student(StudentRecord::new("U0", "Nila"));
    let composer = ReportComposer::new(config(dir.path())).with_timestamp(timestamp());

    let path = generate_student_report(&directory, &composer, "U0").unwrap();
    let text = all_text(&Document::load(&path).unwrap());
    assert!(text.contains("(\\(No data for visual chart\\))"));
    assert!(text.contains("(No attendance records available.)"));
    assert!(text.contains("(No subject enrollment records found for this academic year.)"));
    // The status cell wraps the label onto two lines
    assert!(text.contains("(Improvement)"));
}

#[test]
fn test_jpeg_photo_preferred_over_png() {
    let dir = tempfile::tempdir().unwrap();
    let photos = dir.path().join("photos");
    std::fs::create_dir_all(&photos).unwrap();
    write_image(&photos.join("UMIS2024001.jpg"), ImageFormat::Jpeg);
    write_image(&photos.join("UMIS2024001.png"), ImageFormat::Png);

    let composer = ReportComposer::new(config(dir.path()))
        .with_photo_store(DirectoryPhotoStore::new(&photos))
        .with_timestamp(timestamp());
    let path = generate_student_report(&directory(3), &composer, "UMIS2024001").unwrap();

    let pdf = Document::load(&path).unwrap();
    assert_eq!(image_filters(&pdf), vec![b"DCTDecode".to_vec()]);
    assert!(!all_text(&pdf).contains("(NO PHOTO)"));
}

#[test]
fn test_unreadable_photo_shows_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let photos = dir.path().join("photos");
    std::fs::create_dir_all(&photos).unwrap();
    std::fs::write(photos.join("UMIS2024001.jpg"), b"not a jpeg").unwrap();

    let composer = ReportComposer::new(config(dir.path())).with_timestamp(timestamp());
    let path = generate_student_report(&directory(3), &composer, "UMIS2024001").unwrap();

    let pdf = Document::load(&path).unwrap();
    assert!(image_filters(&pdf).is_empty());
    assert!(all_text(&pdf).contains("(NO PHOTO)"));
}

#[test]
fn test_unwritable_output_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a directory").unwrap();

    let config = ReportConfig {
        output_dir: blocker.join("reports"),
        ..config(dir.path())
    };
    let composer = ReportComposer::new(config).with_timestamp(timestamp());
    let err = generate_student_report(&directory(3), &composer, "UMIS2024001").unwrap_err();

    assert!(matches!(err, ReportError::Io { .. }));
    assert_eq!(err.user_message(), "could not generate report, try again");
}

#[test]
fn test_unknown_student() {
    let dir = tempfile::tempdir().unwrap();
    let composer = ReportComposer::new(config(dir.path()));
    let err = generate_student_report(&directory(3), &composer, "NOBODY").unwrap_err();
    assert!(matches!(err, ReportError::StudentNotFound(_)));
    assert_eq!(err.user_message(), "student not found");
}

#[test]
fn test_long_batch_repeats_header() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<BatchStudentSummary> = (0..80)
        .map(|i| BatchStudentSummary {
            roll_number: Some(format!("R{i:03}")),
            name: format!("Student {i}"),
            email: format!("student{i}@example.com"),
            department: "Physics".to_string(),
            year: Some(2),
            attendance_pct: 70.0 + (i % 30) as f64,
            marks: vec![
                SubjectMark {
                    subject: "Mechanics".to_string(),
                    marks: Marks::Number(65.0),
                },
                SubjectMark {
                    subject: "Optics".to_string(),
                    marks: Marks::Text("AB".to_string()),
                },
            ],
        })
        .collect();

    let options = BatchOptions {
        title: Some("Physics second year".to_string()),
        principal_sign: true,
        ..BatchOptions::default()
    };
    let path = BatchComposer::new(config(dir.path()))
        .with_timestamp(timestamp())
        .generate(&rows, &options)
        .unwrap();
    assert_eq!(path, dir.path().join("reports").join("batch_report.pdf"));

    let pdf = Document::load(&path).unwrap();
    let pages = pdf.get_pages().len() as u32;
    assert!(pages >= 3);

    // Every page the table spans starts with its header row
    let table_pages = (1..=pages)
        .filter(|page| page_text(&pdf, *page).contains("(Student "))
        .collect::<Vec<_>>();
    assert!(table_pages.len() >= 3);
    for page in table_pages {
        assert!(page_text(&pdf, page).contains("(Marks Summary)"), "page {page}");
    }

    let text = all_text(&pdf);
    assert!(text.contains("(PHYSICS SECOND YEAR)"));
    assert!(text.contains("(Mechanics: 65, Optics: AB)"));
    assert!(text.contains("(Head of Department)"));
    assert!(text.contains("(Principal)"));
    assert!(!text.contains("(Page 1)"));
}

#[test]
fn test_document_model_renders_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let composer = ReportComposer::new(config(dir.path())).with_timestamp(timestamp());
    let report = composer.compose(&student(), &attendance(5), &[]);

    let json = report.document.to_json().unwrap();
    assert!(json.contains("\"type\": \"piechart\""));

    let document = report::ReportDocument::from_json(&json).unwrap();
    let bytes = PdfRenderer::new(ReportConfig::default().theme)
        .render(&document)
        .unwrap();
    let pdf = Document::load_mem(&bytes).unwrap();
    assert!(!pdf.get_pages().is_empty());
}

fn font_file(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fonts")
        .join(name)
}

/// Subtypes of every font dictionary in the file
fn font_subtypes(pdf: &Document) -> Vec<Vec<u8>> {
    let mut subtypes: Vec<Vec<u8>> = pdf
        .objects
        .values()
        .filter_map(|object| {
            let dict = object.as_dict().ok()?;
            if dict.get(b"Type").and_then(Object::as_name).ok()? != b"Font" {
                return None;
            }
            Some(dict.get(b"Subtype").and_then(Object::as_name).ok()?.to_vec())
        })
        .collect();
    subtypes.sort();
    subtypes.dedup();
    subtypes
}

#[test]
fn test_truetype_theme_font_renders_non_latin_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.theme.font = FontConfig {
        family: "dejavu".to_string(),
        regular: Some(font_file("DejaVuSans.ttf")),
        bold: Some(font_file("DejaVuSans-Bold.ttf")),
        ..FontConfig::default()
    };

    let name = "Méena Ωmega ñ";
    let directory = InMemoryDirectory::new()
        .with_student(StudentRecord {
            name: name.to_string(),
            ..student()
        })
        .with_attendance(attendance(25));
    let composer = ReportComposer::new(config).with_timestamp(timestamp());
    let path = generate_student_report(&directory, &composer, "UMIS2024001").unwrap();

    let pdf = Document::load(&path).unwrap();
    assert!(pdf.get_pages().len() >= 2);
    assert_eq!(
        font_subtypes(&pdf),
        vec![b"CIDFontType2".to_vec(), b"Type0".to_vec()]
    );

    let regular = std::fs::read(font_file("DejaVuSans.ttf")).unwrap();
    let bold = std::fs::read(font_file("DejaVuSans-Bold.ttf")).unwrap();
    let hex = |data: &[u8], text: &str| {
        let face = ttf_parser::Face::parse(data, 0).unwrap();
        text.chars()
            .map(|c| format!("{:04X}", face.glyph_index(c).unwrap().0))
            .collect::<String>()
    };

    let text = all_text(&pdf);
    assert!(!text.contains(") Tj"), "no literal strings with an embedded family");
    assert!(
        text.contains(&hex(&regular, name)) || text.contains(&hex(&bold, name)),
        "student name is drawn as glyph ids"
    );
    // Page numbers use the regular face
    assert!(page_text(&pdf, 2).contains(&format!("<{}> Tj", hex(&regular, "Page 2"))));
}
