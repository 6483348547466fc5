//! Student Report Demo - composes one academic report
//!
//! Uses built-in sample records unless a records file is given:
//!
//! Run with: cargo run --example student_report -p report [records.json] [config.json]
//!
//! `records.json` holds `students`, `attendance` and `subjects` arrays.

use chrono::{Duration, Local};
use report::{
    generate_student_report, AttendanceRecord, AttendanceStatus, Department, InMemoryDirectory,
    MockGrades, ReportComposer, ReportConfig, StudentRecord, SubjectRecord,
};

fn sample_directory() -> InMemoryDirectory {
    let student = StudentRecord {
        email: Some("priya.s@example.edu".to_string()),
        phone: Some("98765 43210".to_string()),
        guardian_phone: Some("94433 22110".to_string()),
        department: Some(Department {
            id: 3,
            name: "Computer Science".to_string(),
        }),
        current_year: Some(2),
        ..StudentRecord::new("UMIS2023042", "Priya S")
    };

    let today = Local::now().date_naive();
    let attendance = (0..32).map(|day| {
        let status = match day % 9 {
            3 => AttendanceStatus::Absent,
            7 => AttendanceStatus::Leave,
            _ => AttendanceStatus::Present,
        };
        AttendanceRecord::new("UMIS2023042", today - Duration::days(day), status)
    });

    let subjects = [
        ("CS201", "Data Structures"),
        ("CS202", "Database Systems"),
        ("CS203", "Operating Systems"),
        ("MA204", "Discrete Mathematics"),
    ]
    .map(|(code, name)| SubjectRecord {
        code: code.to_string(),
        name: name.to_string(),
        department_id: 3,
        year: 2,
    });

    InMemoryDirectory::new()
        .with_student(student)
        .with_attendance(attendance)
        .with_subjects(subjects)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (directory, umis) = match args.first() {
        Some(path) => {
            let directory = InMemoryDirectory::from_json(&std::fs::read_to_string(path)?)?;
            let umis = directory
                .students
                .first()
                .map(|s| s.umis.clone())
                .ok_or_else(|| anyhow::anyhow!("{path} has no students"))?;
            (directory, umis)
        }
        None => (sample_directory(), "UMIS2023042".to_string()),
    };

    let config = match args.get(1) {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig {
            output_dir: "output".into(),
            ..ReportConfig::default()
        },
    };

    // Sample data has no recorded grades
    let composer = ReportComposer::new(config).with_grade_book(MockGrades::new(2024));
    let path = generate_student_report(&directory, &composer, &umis)?;
    println!("Report written to {}", path.display());
    Ok(())
}
