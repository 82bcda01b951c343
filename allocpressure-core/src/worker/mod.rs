// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Allocation workers.
//!
//! A worker performs one allocation pattern per iteration. The shared run
//! loop in [`AllocationWorker::run`] reads the clock once per iteration,
//! handles the WarmingUp → Measuring transition, and counts allocations only
//! while measuring. Each worker owns all of its state; the outcome is
//! returned by value so a faulted worker cannot disturb the other one.

mod long_lived;
mod short_lived;

pub use long_lived::LongLivedWorker;
pub use short_lived::ShortLivedWorker;

use std::fmt;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::BenchmarkConfig;
use crate::error::ResourceExhaustionFault;
use crate::phase::{Clock, Phase, PhaseClock};
use crate::types::SizeRange;

/// Which allocation pattern a worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Small buffers dropped immediately (young-generation pressure)
    ShortLived,
    /// Medium buffers kept in a bounded FIFO (old-generation pressure)
    LongLived,
}

impl WorkerKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShortLived => "short-lived",
            Self::LongLived => "long-lived",
        }
    }

    /// OS thread name used by the coordinator.
    pub const fn thread_name(&self) -> &'static str {
        match self {
            Self::ShortLived => "short-lived-worker",
            Self::LongLived => "long-lived-worker",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-worker phase and counter.
#[derive(Debug, Clone)]
pub struct WorkerState {
    clock: PhaseClock,
    phase: Phase,
    measured_count: u64,
    iterations: u64,
}

impl WorkerState {
    pub fn new(clock: PhaseClock) -> Self {
        Self {
            clock,
            phase: Phase::WarmingUp,
            measured_count: 0,
            iterations: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn measured_count(&self) -> u64 {
        self.measured_count
    }

    /// Allocations performed in any phase.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.clock.elapsed(now)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.clock.is_finished(now)
    }

    /// Update the phase for `now`.
    ///
    /// Returns true exactly once: on the first observation at or past the
    /// warmup boundary. The counter is reset to zero at that point.
    pub fn observe(&mut self, now: Duration) -> bool {
        if self.phase == Phase::WarmingUp && self.clock.phase_at(now) == Phase::Measuring {
            self.phase = Phase::Measuring;
            self.measured_count = 0;
            return true;
        }
        false
    }

    /// Record one completed allocation.
    pub fn record_allocation(&mut self) {
        self.iterations += 1;
        if self.phase == Phase::Measuring {
            self.measured_count += 1;
        }
    }
}

/// Final result of one worker's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerOutcome {
    /// Ran for the full configured duration.
    Completed { measured: u64, iterations: u64 },
    /// Stopped early; `measured` is the count accumulated before the fault.
    Faulted {
        measured: u64,
        iterations: u64,
        fault: ResourceExhaustionFault,
    },
}

impl WorkerOutcome {
    pub fn measured_count(&self) -> u64 {
        match self {
            Self::Completed { measured, .. } | Self::Faulted { measured, .. } => *measured,
        }
    }

    pub fn iterations(&self) -> u64 {
        match self {
            Self::Completed { iterations, .. } | Self::Faulted { iterations, .. } => *iterations,
        }
    }

    pub fn fault(&self) -> Option<&ResourceExhaustionFault> {
        match self {
            Self::Completed { .. } => None,
            Self::Faulted { fault, .. } => Some(fault),
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.fault().is_some()
    }
}

/// Seeded stream of buffer sizes.
#[derive(Debug, Clone)]
pub struct SizeSampler {
    rng: SmallRng,
    range: SizeRange,
}

impl SizeSampler {
    pub fn new(seed: u64, range: SizeRange) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            range,
        }
    }

    pub fn next_size(&mut self) -> usize {
        self.rng.random_range(self.range.as_range())
    }
}

/// One allocation pattern, driven by the shared run loop.
pub trait AllocationWorker: Send {
    fn kind(&self) -> WorkerKind;

    /// Perform a single allocation.
    ///
    /// `elapsed` is the time since the worker started, for fault reporting.
    fn allocate_once(&mut self, elapsed: Duration) -> Result<(), ResourceExhaustionFault>;

    /// Run until the configured warmup and measurement windows have passed,
    /// or until an allocation fails.
    fn run<C: Clock>(&mut self, clock: &C, config: &BenchmarkConfig) -> WorkerOutcome
    where
        Self: Sized,
    {
        let kind = self.kind();
        let mut state = WorkerState::new(PhaseClock::from_config(clock.now(), config));

        tracing::info!(worker = %kind, "Worker starting");

        loop {
            let now = clock.now();
            if state.is_finished(now) {
                break;
            }

            if state.observe(now) {
                tracing::info!(
                    worker = %kind,
                    warmup_allocations = state.iterations(),
                    "Entering measurement phase"
                );
            }

            if let Err(fault) = self.allocate_once(state.elapsed(now)) {
                tracing::error!(
                    worker = %kind,
                    elapsed_ms = fault.elapsed.as_millis() as u64,
                    retained = fault.retained_len,
                    requested_bytes = fault.requested_bytes,
                    measured = state.measured_count(),
                    "Allocation failed, worker stopping"
                );
                return WorkerOutcome::Faulted {
                    measured: state.measured_count(),
                    iterations: state.iterations(),
                    fault,
                };
            }
            state.record_allocation();

            if config.pacing.should_yield(state.iterations()) {
                std::thread::yield_now();
            }
        }

        tracing::info!(
            worker = %kind,
            measured = state.measured_count(),
            iterations = state.iterations(),
            "Worker finished"
        );

        WorkerOutcome::Completed {
            measured: state.measured_count(),
            iterations: state.iterations(),
        }
    }
}
