// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Old-generation pressure: medium buffers held in a bounded FIFO window.

use std::time::Duration;

use crate::alloc::{BufferAllocator, SystemAllocator};
use crate::config::BenchmarkConfig;
use crate::error::ResourceExhaustionFault;
use crate::retained::RetainedSet;

use super::{AllocationWorker, SizeSampler, WorkerKind};

/// Allocates a buffer per iteration and retains it until it is pruned.
#[derive(Debug)]
pub struct LongLivedWorker<A = SystemAllocator> {
    sizes: SizeSampler,
    allocator: A,
    retained: RetainedSet<Vec<u8>>,
    prune_faults: u64,
}

impl LongLivedWorker<SystemAllocator> {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self::with_allocator(config, SystemAllocator)
    }
}

impl<A: BufferAllocator> LongLivedWorker<A> {
    pub fn with_allocator(config: &BenchmarkConfig, allocator: A) -> Self {
        Self {
            sizes: SizeSampler::new(config.long_lived_seed, config.long_lived_sizes),
            allocator,
            retained: RetainedSet::new(config.retention),
            prune_faults: 0,
        }
    }

    pub fn retained(&self) -> &RetainedSet<Vec<u8>> {
        &self.retained
    }

    /// Prunes skipped because the eviction range was invalid.
    pub fn prune_faults(&self) -> u64 {
        self.prune_faults
    }

    fn exhausted(&self, elapsed: Duration, requested_bytes: usize) -> ResourceExhaustionFault {
        ResourceExhaustionFault {
            elapsed,
            retained_len: self.retained.len(),
            requested_bytes,
        }
    }
}

impl<A: BufferAllocator> AllocationWorker for LongLivedWorker<A> {
    fn kind(&self) -> WorkerKind {
        WorkerKind::LongLived
    }

    fn allocate_once(&mut self, elapsed: Duration) -> Result<(), ResourceExhaustionFault> {
        let size = self.sizes.next_size();
        let buf = match self.allocator.allocate(size) {
            Ok(buf) => buf,
            Err(failure) => return Err(self.exhausted(elapsed, failure.requested)),
        };

        let pruned = match self.retained.insert(buf, size) {
            Ok(pruned) => pruned,
            Err(failure) => return Err(self.exhausted(elapsed, failure.requested)),
        };

        match pruned {
            Ok(0) => {}
            Ok(evicted) => {
                tracing::trace!(
                    evicted = evicted,
                    retained = self.retained.len(),
                    "Pruned retained set"
                );
            }
            Err(fault) => {
                self.prune_faults += 1;
                tracing::warn!(
                    len = fault.len,
                    prune_count = fault.prune_count,
                    "Error during pruning: {}",
                    fault
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::FailingAllocator;
    use crate::phase::SteppingClock;
    use crate::types::RetentionPolicy;
    use crate::worker::WorkerOutcome;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn small_config(max_size: usize, prune_count: usize) -> BenchmarkConfig {
        let mut config = BenchmarkConfig::with_durations(ms(10), ms(1_000));
        config.retention = RetentionPolicy {
            max_size,
            prune_count,
        };
        config
    }

    #[test]
    fn test_fault_preserves_measured_count() {
        let config = BenchmarkConfig::with_durations(ms(15), ms(1_000));
        let clock = SteppingClock::new(ms(5));
        // Reads 5 and 10 warm up, 15..=45 are seven measured allocations,
        // the tenth request at 50ms fails.
        let mut worker = LongLivedWorker::with_allocator(&config, FailingAllocator::new(10));

        let outcome = worker.run(&clock, &config);

        match outcome {
            WorkerOutcome::Faulted {
                measured, fault, ..
            } => {
                assert_eq!(measured, 7);
                assert_eq!(fault.elapsed, ms(50));
                assert_eq!(fault.retained_len, 9);
                assert!((5_000..15_000).contains(&fault.requested_bytes));
            }
            other => panic!("expected fault, got {:?}", other),
        }
        // No further allocation after the fault
        assert_eq!(worker.retained().len(), 9);
    }

    #[test]
    fn test_retained_length_bounded_during_run() {
        let config = small_config(50, 20);
        let mut worker = LongLivedWorker::new(&config);
        let mut pruned_once = false;

        for step in 0..1_000u64 {
            worker.allocate_once(ms(step)).unwrap();
            let len = worker.retained().len();
            assert!(len <= 50);
            if worker.retained().prune_count() > 0 {
                pruned_once = true;
            }
            if pruned_once {
                assert!(len >= 30);
            }
        }
        assert!(pruned_once);
        assert_eq!(worker.prune_faults(), 0);
    }

    #[test]
    fn test_invalid_prune_bounds_are_not_fatal() {
        // Bypasses validation on purpose: the eviction range never fits
        let config = small_config(3, 10);
        let mut worker = LongLivedWorker::new(&config);

        for step in 0..6u64 {
            assert!(worker.allocate_once(ms(step)).is_ok());
        }
        assert_eq!(worker.retained().len(), 6);
        assert_eq!(worker.prune_faults(), 3);
    }

    #[test]
    fn test_buffer_sizes_in_configured_range() {
        let config = small_config(1_000, 10);
        let mut worker = LongLivedWorker::new(&config);
        for step in 0..200u64 {
            worker.allocate_once(ms(step)).unwrap();
        }
        assert!(worker
            .retained()
            .iter()
            .all(|buf| (5_000..15_000).contains(&buf.len())));
    }
}
