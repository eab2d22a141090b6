//! Export summary and reporting
//!
//! This module defines the structure for reporting export results.

use std::path::PathBuf;
use std::time::Duration;

/// Summary of a completed export run.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Records written to the output file by this run and, when resumed,
    /// the runs before it
    pub records_exported: u64,

    /// Pages fetched from the directory
    pub pages_processed: u64,

    /// Number of columns in the output header
    pub attribute_count: usize,

    /// Whether this run resumed from a checkpoint
    pub resumed: bool,

    /// Wall-clock duration of this run
    pub duration: Duration,

    /// Path of the output file
    pub output: PathBuf,
}

impl ExportSummary {
    /// Export throughput for this run
    pub fn records_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.records_exported as f64 / secs
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            records = self.records_exported,
            pages = self.pages_processed,
            attributes = self.attribute_count,
            resumed = self.resumed,
            duration_secs = format!("{:.2}", self.duration.as_secs_f64()),
            output = %self.output.display(),
            "Export completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(records: u64, duration: Duration) -> ExportSummary {
        ExportSummary {
            records_exported: records,
            pages_processed: 2,
            attribute_count: 5,
            resumed: false,
            duration,
            output: PathBuf::from("users.csv"),
        }
    }

    #[test]
    fn test_records_per_second() {
        let s = summary(100, Duration::from_secs(4));
        assert!((s.records_per_second() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_records_per_second_with_zero_duration() {
        let s = summary(100, Duration::ZERO);
        assert_eq!(s.records_per_second(), 0.0);
    }
}
