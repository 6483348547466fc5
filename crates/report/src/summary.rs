//! Attendance aggregation

use crate::model::{AttendanceRecord, AttendanceStatus};
use serde::Serialize;
use std::fmt;

/// Qualitative attendance label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Excellent,
    Satisfactory,
    NeedsImprovement,
}

impl Tier {
    /// `>= 75` Excellent, `>= 60` Satisfactory, otherwise Needs Improvement
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 75.0 {
            Tier::Excellent
        } else if percentage >= 60.0 {
            Tier::Satisfactory
        } else {
            Tier::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Satisfactory => "Satisfactory",
            Tier::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attendance counts with derived percentage and tier
///
/// Only constructible from counts or records, so the percentage and tier
/// always agree with the counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
    present: usize,
    absent: usize,
    leave: usize,
}

impl AttendanceSummary {
    pub fn from_counts(present: usize, absent: usize, leave: usize) -> Self {
        Self {
            present,
            absent,
            leave,
        }
    }

    /// Aggregate records; order does not matter
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        records
            .iter()
            .fold(Self::from_counts(0, 0, 0), |mut summary, record| {
                match record.status {
                    AttendanceStatus::Present => summary.present += 1,
                    AttendanceStatus::Absent => summary.absent += 1,
                    AttendanceStatus::Leave => summary.leave += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.present + self.absent + self.leave
    }

    pub fn present(&self) -> usize {
        self.present
    }

    pub fn absent(&self) -> usize {
        self.absent
    }

    pub fn leave(&self) -> usize {
        self.leave
    }

    /// Present days as a percentage of all days, 0 with no records
    pub fn percentage(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.present as f64 / total as f64 * 100.0,
        }
    }

    pub fn tier(&self) -> Tier {
        Tier::from_percentage(self.percentage())
    }
}
