//! allocpressure Core Library
//!
//! Dual-phase allocation benchmark harness. Two workers run concurrently:
//! one churns small short-lived buffers, the other keeps a bounded FIFO
//! window of medium buffers. Both warm up, then count allocations over a
//! fixed measurement window; the coordinator reports allocations per second.

pub mod alloc;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod phase;
pub mod reporter;
pub mod retained;
pub mod types;
pub mod worker;

// Re-export commonly used types
pub use alloc::{BufferAllocator, FailingAllocator, SystemAllocator};
pub use config::BenchmarkConfig;
pub use coordinator::{run_benchmark, Coordinator};
pub use error::{
    AllocFailure, BenchError, BenchResult, CoordinatorError, HardValidationError,
    PruneBoundsFault, ReporterError, ResourceExhaustionFault,
};
pub use metrics::{BenchmarkReport, BenchmarkResult, SystemInfo};
pub use phase::{Clock, ManualClock, MonotonicClock, Phase, PhaseClock, SteppingClock};
pub use reporter::{JsonReporter, TextReport};
pub use retained::RetainedSet;
pub use types::{Pacing, RetentionPolicy, SizeRange};
pub use worker::{
    AllocationWorker, LongLivedWorker, ShortLivedWorker, WorkerKind, WorkerOutcome, WorkerState,
};
