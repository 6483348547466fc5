//! Batch Report Demo - one landscape table for a whole class
//!
//! Run with: cargo run --example batch_report -p report [rows.json]
//!
//! `rows.json` is an array of batch rows; sample rows are used otherwise.

use report::{BatchComposer, BatchOptions, BatchStudentSummary, Marks, ReportConfig, SubjectMark};

const NAMES: [&str; 8] = [
    "Arun Kumar",
    "Bharathi M",
    "Deepa R",
    "Gokul Raj",
    "Harini V",
    "Karthik S",
    "Lakshmi Priya",
    "Mohammed Asif",
];

fn first_name(name: &str) -> &str {
    name.split(' ').next().unwrap_or(name)
}

fn sample_rows() -> Vec<BatchStudentSummary> {
    (0..45)
        .map(|i| {
            let name = NAMES[i % NAMES.len()];
            let marks = if i % 11 == 10 {
                Vec::new()
            } else {
                vec![
                    SubjectMark {
                        subject: "Data Structures".to_string(),
                        marks: Marks::Number(55.0 + (i * 7 % 40) as f64),
                    },
                    SubjectMark {
                        subject: "Database Systems".to_string(),
                        marks: if i % 6 == 5 {
                            Marks::Text("AB".to_string())
                        } else {
                            Marks::Number(60.0 + (i * 3 % 35) as f64)
                        },
                    },
                ]
            };
            BatchStudentSummary {
                roll_number: (i % 13 != 12).then(|| format!("23CS{:03}", i + 1)),
                name: name.to_string(),
                email: format!("{}{}@example.edu", first_name(name).to_lowercase(), i),
                department: "Computer Science".to_string(),
                year: Some(2),
                attendance_pct: 62.0 + (i * 13 % 38) as f64 + 0.25,
                marks,
            }
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rows = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => sample_rows(),
    };

    let config = ReportConfig {
        batch_output_path: "output/batch_report.pdf".into(),
        ..ReportConfig::default()
    };
    let options = BatchOptions {
        title: Some("II B.Sc Computer Science - Semester Review".to_string()),
        principal_sign: true,
        ..BatchOptions::default()
    };

    let path = BatchComposer::new(config).generate(&rows, &options)?;
    println!("Batch report with {} row(s) written to {}", rows.len(), path.display());
    Ok(())
}
