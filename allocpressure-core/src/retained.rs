// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Bounded FIFO retention for the long-lived worker.
//!
//! Entries are kept in insertion order. Once the length exceeds the policy's
//! `max_size`, the oldest `prune_count` entries are dropped in one batch, so
//! the steady-state length saws between `max_size - prune_count` and
//! `max_size`.

use std::collections::VecDeque;

use crate::error::{AllocFailure, PruneBoundsFault};
use crate::types::RetentionPolicy;

/// Insertion-ordered set of owned values with bulk front eviction.
#[derive(Debug)]
pub struct RetainedSet<T> {
    entries: VecDeque<T>,
    policy: RetentionPolicy,
    /// Total number of completed prunes
    prunes: u64,
    /// Total number of entries evicted
    evicted: u64,
}

impl<T> RetainedSet<T> {
    /// Create an empty set. The policy is taken as-is; validation belongs to
    /// the configuration.
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            entries: VecDeque::new(),
            policy,
            prunes: 0,
            evicted: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn prune_count(&self) -> u64 {
        self.prunes
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Append `value`, reserving room fallibly first.
    ///
    /// `bytes` is the size reported in the failure if the reservation is refused.
    pub fn push(&mut self, value: T, bytes: usize) -> Result<(), AllocFailure> {
        self.entries
            .try_reserve(1)
            .map_err(|_| AllocFailure { requested: bytes })?;
        self.entries.push_back(value);
        Ok(())
    }

    /// Whether the set is above its cap.
    pub fn needs_prune(&self) -> bool {
        self.entries.len() > self.policy.max_size
    }

    /// Evict the oldest `prune_count` entries if the set is above its cap.
    ///
    /// Returns the number of entries evicted (zero when under the cap).
    pub fn enforce_cap(&mut self) -> Result<usize, PruneBoundsFault> {
        if !self.needs_prune() {
            return Ok(0);
        }

        let len = self.entries.len();
        let count = self.policy.prune_count;
        if count == 0 || count > len {
            return Err(PruneBoundsFault {
                len,
                prune_count: count,
            });
        }

        self.entries.drain(..count);
        self.prunes += 1;
        self.evicted += count as u64;
        Ok(count)
    }

    /// Append and then enforce the cap.
    ///
    /// Allocation failures are returned as the outer error; a prune that
    /// could not run is reported in the inner result and leaves the new
    /// entry in place.
    pub fn insert(
        &mut self,
        value: T,
        bytes: usize,
    ) -> Result<Result<usize, PruneBoundsFault>, AllocFailure> {
        self.push(value, bytes)?;
        Ok(self.enforce_cap())
    }
}
