// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result output.
//!
//! [`TextReport`] is the stdout contract read by downstream plotting tools:
//! one `label: number` line per worker, numbers grouped with `,`.
//! [`JsonReporter`] saves the full [`BenchmarkReport`] to timestamped files.

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::ReporterError;
use crate::metrics::{format_grouped, BenchmarkReport, BenchmarkResult};

pub const SHORT_LIVED_LABEL: &str = "Short-lived allocations/sec:";
pub const LONG_LIVED_LABEL: &str = "Long-lived allocations/sec: ";

/// The two throughput lines, exactly as downstream tools parse them.
pub struct TextReport<'a> {
    result: &'a BenchmarkResult,
}

impl<'a> TextReport<'a> {
    pub fn new(result: &'a BenchmarkResult) -> Self {
        Self { result }
    }

    /// Informational runtime line; not parsed downstream.
    pub fn runtime_line(&self) -> String {
        format!(
            "Total benchmark runtime: {:.2} seconds",
            self.result.total_runtime.as_secs_f64()
        )
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            SHORT_LIVED_LABEL,
            format_grouped(self.result.short_lived_allocs_per_sec)
        )?;
        writeln!(
            f,
            "{} {}",
            LONG_LIVED_LABEL,
            format_grouped(self.result.long_lived_allocs_per_sec)
        )
    }
}

/// JSON reporter for benchmark results.
pub struct JsonReporter {
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter, creating the output directory if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| ReporterError::DirectoryCreation {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save a report as `alloc_pressure_<timestamp>.json`.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%S%.3fZ");
        let filepath = self
            .output_dir
            .join(format!("alloc_pressure_{}.json", timestamp));

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// List all existing reports in the output directory, oldest first.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load an existing report from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport, ReporterError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchmarkConfig;
    use crate::worker::WorkerOutcome;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample_result() -> BenchmarkResult {
        BenchmarkResult::from_outcomes(
            WorkerOutcome::Completed {
                measured: 148_148_148,
                iterations: 180_000_000,
            },
            WorkerOutcome::Completed {
                measured: 1_200_000,
                iterations: 1_500_000,
            },
            Duration::from_millis(120_000),
            Duration::from_millis(150_012),
        )
    }

    /// Mirrors how the plotting tool reads a throughput line.
    fn parse_throughput(line: &str) -> Option<f64> {
        if !line.to_lowercase().contains("allocations/sec") {
            return None;
        }
        let (_, number) = line.split_once(':')?;
        number.trim().replace(',', "").parse().ok()
    }

    #[test]
    fn test_text_report_exact_format() {
        let result = sample_result();
        let text = TextReport::new(&result).to_string();

        assert_eq!(
            text,
            "Short-lived allocations/sec: 1,234,568\n\
             Long-lived allocations/sec:  10,000\n"
        );
    }

    #[test]
    fn test_text_report_is_parseable() {
        let result = sample_result();
        let text = TextReport::new(&result).to_string();

        let values: Vec<f64> = text.lines().filter_map(parse_throughput).collect();
        assert_eq!(values, vec![1_234_568.0, 10_000.0]);
    }

    #[test]
    fn test_runtime_line() {
        let result = sample_result();
        assert_eq!(
            TextReport::new(&result).runtime_line(),
            "Total benchmark runtime: 150.01 seconds"
        );
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path().join("reports")).unwrap();

        let report = BenchmarkReport::new(BenchmarkConfig::default(), sample_result());
        let path = reporter.save(&report).unwrap();
        assert!(path.exists());

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.result.short_lived, report.result.short_lived);
        assert_eq!(loaded.result.long_lived, report.result.long_lived);
        assert_eq!(loaded.result.total_runtime, report.result.total_runtime);
        assert!(
            (loaded.result.short_lived_allocs_per_sec - report.result.short_lived_allocs_per_sec)
                .abs()
                < 1e-6
        );
        assert_eq!(loaded.config, report.config);

        let listed = reporter.list_reports().unwrap();
        assert_eq!(listed, vec![path]);
    }
}
