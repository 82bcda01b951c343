//! Custom error types for allocpressure.
//!
//! Explicit enum error types only. Worker faults are plain values so they can
//! travel back through a thread join handle; the coordinator decides which of
//! them are fatal.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worker::WorkerKind;

/// Top-level error type for the benchmark harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    // =========================================================================
    // Run Errors
    // =========================================================================
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Reporter error: {0}")]
    Reporter(#[from] ReporterError),
}

/// Hard validation errors abort the run before any worker is started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HardValidationError {
    #[error("Duration must be positive: {field}")]
    ZeroDuration { field: &'static str },

    #[error("Empty size range: {field} = {start}..{end}")]
    EmptySizeRange {
        field: &'static str,
        start: usize,
        end: usize,
    },

    #[error("Invalid retention policy: prune_count {prune_count} must be in 1..{max_size}")]
    InvalidRetention { max_size: usize, prune_count: usize },
}

/// The allocator could not satisfy a request.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("allocation of {requested} bytes failed")]
pub struct AllocFailure {
    pub requested: usize,
}

/// A worker ran out of memory mid-run.
///
/// The worker that raised it has already stopped; the measured count it
/// accumulated up to this point is kept in its outcome.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("resource exhaustion after {elapsed:?} (retained: {retained_len}, requested: {requested_bytes} bytes)")]
pub struct ResourceExhaustionFault {
    pub elapsed: Duration,
    pub retained_len: usize,
    pub requested_bytes: usize,
}

/// Eviction range does not fit the retained sequence. Non-fatal.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot prune {prune_count} entries from a set of {len}")]
pub struct PruneBoundsFault {
    pub len: usize,
    pub prune_count: usize,
}

/// Failures that abort the whole run.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Failed to spawn {worker} worker thread: {source}")]
    Spawn {
        worker: WorkerKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{worker} worker panicked: {message}")]
    WorkerPanicked { worker: WorkerKind, message: String },
}

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_error_display() {
        let err = HardValidationError::InvalidRetention {
            max_size: 10,
            prune_count: 10,
        };
        assert!(err.to_string().contains("prune_count 10"));
        assert!(err.to_string().contains("1..10"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::ZeroDuration { field: "measure" };
        let bench_err: BenchError = validation_err.into();
        assert!(matches!(bench_err, BenchError::HardValidation(_)));
    }

    #[test]
    fn test_fault_display_mentions_retained_len() {
        let fault = ResourceExhaustionFault {
            elapsed: Duration::from_millis(50),
            retained_len: 1234,
            requested_bytes: 9000,
        };
        let text = fault.to_string();
        assert!(text.contains("retained: 1234"));
        assert!(text.contains("9000 bytes"));
    }
}
