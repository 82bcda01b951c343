// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Warmup/measurement phase protocol.
//!
//! Phases: WarmingUp → Measuring. The transition is derived purely from
//! elapsed time against the configured durations; [`PhaseClock`] holds no
//! state beyond the captured start timestamp.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::BenchmarkConfig;

/// Source of monotonic timestamps, expressed as time since an arbitrary origin.
pub trait Clock: Send {
    fn now(&self) -> Duration;
}

/// Wall-clock time from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.nanos.store(now.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Clock that returns its current time and then advances by a fixed step.
///
/// The first read returns the start time.
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<Duration>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        Self::starting_at(Duration::ZERO, step)
    }

    pub fn starting_at(start: Duration, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Benchmark phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Allocations happen but are not counted.
    WarmingUp,
    /// Allocations are counted toward throughput. Terminal.
    Measuring,
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WarmingUp => "WarmingUp",
            Self::Measuring => "Measuring",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Maps a timestamp onto a [`Phase`] relative to a fixed start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseClock {
    start: Duration,
    warmup: Duration,
    measure: Duration,
}

impl PhaseClock {
    pub fn new(start: Duration, warmup: Duration, measure: Duration) -> Self {
        Self {
            start,
            warmup,
            measure,
        }
    }

    pub fn from_config(start: Duration, config: &BenchmarkConfig) -> Self {
        Self::new(start, config.warmup, config.measure)
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    /// Time since start; zero if `now` precedes it.
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start)
    }

    pub fn phase_at(&self, now: Duration) -> Phase {
        if self.elapsed(now) < self.warmup {
            Phase::WarmingUp
        } else {
            Phase::Measuring
        }
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.elapsed(now) >= self.warmup + self.measure
    }
}
