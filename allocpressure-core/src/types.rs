// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Small value types shared by the configuration and the workers.
//!
//! Each type validates its invariants in `new`, so a value that exists is a
//! value the workers can use without further checks.

use std::fmt;
use std::num::NonZeroU32;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Half-open range of buffer sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    start: usize,
    end: usize,
}

impl SizeRange {
    /// Create a new range; `start..end` must not be empty.
    pub fn new(field: &'static str, start: usize, end: usize) -> Result<Self, HardValidationError> {
        let range = Self { start, end };
        range.validate(field)?;
        Ok(range)
    }

    pub(crate) const fn new_unchecked(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) fn validate(&self, field: &'static str) -> Result<(), HardValidationError> {
        if self.start >= self.end {
            return Err(HardValidationError::EmptySizeRange {
                field,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) bytes", self.start, self.end)
    }
}

/// Size cap and bulk eviction count for the retained set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Length above which a prune is triggered
    pub max_size: usize,
    /// Number of oldest entries removed per prune
    pub prune_count: usize,
}

impl RetentionPolicy {
    /// Create a validated policy. Requires `0 < prune_count < max_size`.
    pub fn new(max_size: usize, prune_count: usize) -> Result<Self, HardValidationError> {
        let policy = Self {
            max_size,
            prune_count,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub(crate) fn validate(&self) -> Result<(), HardValidationError> {
        if self.prune_count == 0 || self.prune_count >= self.max_size {
            return Err(HardValidationError::InvalidRetention {
                max_size: self.max_size,
                prune_count: self.prune_count,
            });
        }
        Ok(())
    }

    /// Lower edge of the steady-state sawtooth.
    pub fn floor(&self) -> usize {
        self.max_size.saturating_sub(self.prune_count)
    }
}

/// How a worker paces its allocation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Spin as fast as allocation allows.
    #[default]
    Unpaced,
    /// Call `std::thread::yield_now` once every N iterations.
    YieldEvery(NonZeroU32),
}

impl Pacing {
    /// Whether the loop should yield after `iteration` (1-based).
    pub fn should_yield(&self, iteration: u64) -> bool {
        match self {
            Self::Unpaced => false,
            Self::YieldEvery(n) => iteration % u64::from(n.get()) == 0,
        }
    }
}

impl fmt::Display for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaced => write!(f, "unpaced"),
            Self::YieldEvery(n) => write!(f, "yield every {} iterations", n),
        }
    }
}
