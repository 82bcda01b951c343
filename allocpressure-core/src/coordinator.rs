// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run orchestration.
//!
//! Spawns one OS thread per worker, blocks on both joins with no timeout and
//! turns the two outcomes into a [`BenchmarkResult`]. A worker that faults
//! simply returns early; only a panic or a failed spawn aborts the run.

use std::any::Any;
use std::thread;
use std::time::Instant;

use crate::config::BenchmarkConfig;
use crate::error::{BenchResult, CoordinatorError, HardValidationError};
use crate::metrics::BenchmarkResult;
use crate::phase::{Clock, MonotonicClock};
use crate::worker::{
    AllocationWorker, LongLivedWorker, ShortLivedWorker, WorkerKind, WorkerOutcome,
};

/// Owns a validated configuration and runs both workers against it.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: BenchmarkConfig,
}

impl Coordinator {
    /// Validate `config` and build a coordinator for it.
    pub fn new(config: BenchmarkConfig) -> Result<Self, HardValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run both built-in workers against the system allocator and wall clock.
    pub fn run(&self) -> Result<BenchmarkResult, CoordinatorError> {
        self.run_with(
            ShortLivedWorker::new(&self.config),
            LongLivedWorker::new(&self.config),
            MonotonicClock::new(),
            MonotonicClock::new(),
        )
    }

    /// Run the given workers concurrently, each reading its own clock.
    pub fn run_with<S, L, CS, CL>(
        &self,
        mut short_lived: S,
        mut long_lived: L,
        short_clock: CS,
        long_clock: CL,
    ) -> Result<BenchmarkResult, CoordinatorError>
    where
        S: AllocationWorker,
        L: AllocationWorker,
        CS: Clock,
        CL: Clock,
    {
        let config = &self.config;
        let started = Instant::now();

        tracing::debug!(
            warmup_ms = config.warmup.as_millis() as u64,
            measure_ms = config.measure_ms(),
            pacing = %config.pacing,
            "Spawning workers"
        );

        let (short_outcome, long_outcome) = thread::scope(|scope| {
            let long_handle = thread::Builder::new()
                .name(WorkerKind::LongLived.thread_name().to_string())
                .spawn_scoped(scope, move || long_lived.run(&long_clock, config))
                .map_err(|source| CoordinatorError::Spawn {
                    worker: WorkerKind::LongLived,
                    source,
                })?;

            let short_handle = thread::Builder::new()
                .name(WorkerKind::ShortLived.thread_name().to_string())
                .spawn_scoped(scope, move || short_lived.run(&short_clock, config))
                .map_err(|source| CoordinatorError::Spawn {
                    worker: WorkerKind::ShortLived,
                    source,
                })?;

            let short_outcome = join_worker(WorkerKind::ShortLived, short_handle.join());
            let long_outcome = join_worker(WorkerKind::LongLived, long_handle.join());
            Ok::<_, CoordinatorError>((short_outcome?, long_outcome?))
        })?;

        let total_runtime = started.elapsed();
        tracing::info!(
            runtime_ms = total_runtime.as_millis() as u64,
            long_lived_faulted = long_outcome.is_faulted(),
            "Benchmark threads finished"
        );

        Ok(BenchmarkResult::from_outcomes(
            short_outcome,
            long_outcome,
            config.measure,
            total_runtime,
        ))
    }
}

/// Validate `config`, run both workers and return the result.
pub fn run_benchmark(config: BenchmarkConfig) -> BenchResult<BenchmarkResult> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run()?)
}

fn join_worker(
    worker: WorkerKind,
    joined: thread::Result<WorkerOutcome>,
) -> Result<WorkerOutcome, CoordinatorError> {
    joined.map_err(|payload| CoordinatorError::WorkerPanicked {
        worker,
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::FailingAllocator;
    use crate::error::ResourceExhaustionFault;
    use crate::phase::SteppingClock;
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BenchmarkConfig::with_durations(ms(0), ms(100));
        assert!(Coordinator::new(config.clone()).is_err());
        assert!(matches!(
            run_benchmark(config),
            Err(crate::error::BenchError::HardValidation(_))
        ));
    }

    #[test]
    fn test_stepping_clocks_give_exact_counts() {
        let config = BenchmarkConfig::with_durations(ms(100), ms(200));
        let coordinator = Coordinator::new(config.clone()).unwrap();

        let result = coordinator
            .run_with(
                ShortLivedWorker::new(&config),
                LongLivedWorker::new(&config),
                SteppingClock::new(ms(10)),
                SteppingClock::new(ms(10)),
            )
            .unwrap();

        assert_eq!(result.short_lived.measured_count(), 20);
        assert_eq!(result.long_lived.measured_count(), 20);
        // 20 * 1000 / 200
        assert_eq!(result.short_lived_allocs_per_sec, 100.0);
        assert_eq!(result.long_lived_allocs_per_sec, 100.0);
    }

    #[test]
    fn test_long_lived_fault_does_not_affect_short_lived() {
        let config = BenchmarkConfig::with_durations(ms(15), ms(200));
        let coordinator = Coordinator::new(config.clone()).unwrap();

        let result = coordinator
            .run_with(
                ShortLivedWorker::new(&config),
                LongLivedWorker::with_allocator(&config, FailingAllocator::new(10)),
                SteppingClock::new(ms(5)),
                SteppingClock::new(ms(5)),
            )
            .unwrap();

        assert_eq!(result.long_lived.measured_count(), 7);
        assert_eq!(result.long_lived.fault().map(|f| f.elapsed), Some(ms(50)));
        assert!(!result.short_lived.is_faulted());
        // Reads 15..=210 in 5ms steps
        assert_eq!(result.short_lived.measured_count(), 40);
    }

    struct PanickingWorker;

    impl AllocationWorker for PanickingWorker {
        fn kind(&self) -> WorkerKind {
            WorkerKind::LongLived
        }

        fn allocate_once(&mut self, _elapsed: Duration) -> Result<(), ResourceExhaustionFault> {
            panic!("bookkeeping corrupted");
        }
    }

    #[test]
    fn test_worker_panic_is_fatal() {
        let config = BenchmarkConfig::with_durations(ms(10), ms(20));
        let coordinator = Coordinator::new(config.clone()).unwrap();

        let err = coordinator
            .run_with(
                ShortLivedWorker::new(&config),
                PanickingWorker,
                SteppingClock::new(ms(1)),
                SteppingClock::new(ms(1)),
            )
            .unwrap_err();

        match err {
            CoordinatorError::WorkerPanicked { worker, message } => {
                assert_eq!(worker, WorkerKind::LongLived);
                assert!(message.contains("bookkeeping corrupted"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
