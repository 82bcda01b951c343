// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fallible buffer allocation.
//!
//! Workers never call the infallible `vec![0; n]`: an out-of-memory
//! condition must come back as a value so the long-lived worker can keep its
//! partial count instead of aborting the process.

use crate::error::AllocFailure;

/// Produces zero-filled byte buffers.
pub trait BufferAllocator: Send {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, AllocFailure>;
}

/// Allocates from the global allocator via `try_reserve_exact`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, AllocFailure> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| AllocFailure { requested: len })?;
        // Touch the pages like a zeroed managed array would; capacity is exact
        // so this never reallocates.
        buf.resize(len, 0);
        Ok(buf)
    }
}

/// Wraps another allocator and refuses every request from the `fail_at`-th
/// onwards (1-based). Used to simulate exhaustion deterministically.
#[derive(Debug, Clone)]
pub struct FailingAllocator<A = SystemAllocator> {
    inner: A,
    fail_at: u64,
    requests: u64,
}

impl FailingAllocator<SystemAllocator> {
    pub fn new(fail_at: u64) -> Self {
        Self::wrap(SystemAllocator, fail_at)
    }
}

impl<A: BufferAllocator> FailingAllocator<A> {
    pub fn wrap(inner: A, fail_at: u64) -> Self {
        Self {
            inner,
            fail_at,
            requests: 0,
        }
    }

    /// Requests seen so far, including refused ones.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl<A: BufferAllocator> BufferAllocator for FailingAllocator<A> {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, AllocFailure> {
        self.requests += 1;
        if self.requests >= self.fail_at {
            return Err(AllocFailure { requested: len });
        }
        self.inner.allocate(len)
    }
}
