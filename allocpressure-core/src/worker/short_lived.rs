// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Young-generation pressure: many small buffers, none retained.

use std::hint::black_box;
use std::time::Duration;

use crate::alloc::{BufferAllocator, SystemAllocator};
use crate::config::BenchmarkConfig;
use crate::error::ResourceExhaustionFault;

use super::{AllocationWorker, SizeSampler, WorkerKind};

/// Allocates a buffer per iteration and drops it before the next one.
#[derive(Debug)]
pub struct ShortLivedWorker<A = SystemAllocator> {
    sizes: SizeSampler,
    allocator: A,
    bytes_allocated: u64,
}

impl ShortLivedWorker<SystemAllocator> {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self::with_allocator(config, SystemAllocator)
    }
}

impl<A: BufferAllocator> ShortLivedWorker<A> {
    pub fn with_allocator(config: &BenchmarkConfig, allocator: A) -> Self {
        Self {
            sizes: SizeSampler::new(config.short_lived_seed, config.short_lived_sizes),
            allocator,
            bytes_allocated: 0,
        }
    }

    /// Bytes requested over the whole run, warmup included.
    pub fn bytes_allocated(&self) -> u64 {
        self.bytes_allocated
    }
}

impl<A: BufferAllocator> AllocationWorker for ShortLivedWorker<A> {
    fn kind(&self) -> WorkerKind {
        WorkerKind::ShortLived
    }

    fn allocate_once(&mut self, elapsed: Duration) -> Result<(), ResourceExhaustionFault> {
        let size = self.sizes.next_size();
        let buf = self
            .allocator
            .allocate(size)
            .map_err(|failure| ResourceExhaustionFault {
                elapsed,
                retained_len: 0,
                requested_bytes: failure.requested,
            })?;
        self.bytes_allocated += size as u64;

        // Dropped here; black_box keeps the allocation from being elided.
        drop(black_box(buf));
        Ok(())
    }
}
