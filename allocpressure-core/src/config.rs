// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark configuration with strict validation.
//!
//! Defaults reproduce the historical fixed constants. Every override goes
//! through [`BenchmarkConfig::validate`] before the coordinator starts any
//! worker; an invalid field is a hard error.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;
use crate::types::{Pacing, RetentionPolicy, SizeRange};

/// Default warmup: 30 seconds.
pub const DEFAULT_WARMUP: Duration = Duration::from_millis(30_000);
/// Default measurement window: 2 minutes.
pub const DEFAULT_MEASURE: Duration = Duration::from_millis(120_000);

/// Short-lived buffers are drawn from `[0, 512)` bytes.
pub const SHORT_LIVED_SIZES: SizeRange = SizeRange::new_unchecked(0, 512);
/// Long-lived buffers are drawn from `[5000, 15000)` bytes.
pub const LONG_LIVED_SIZES: SizeRange = SizeRange::new_unchecked(5_000, 15_000);

/// Retained set length that triggers a prune.
pub const MAX_RETAINED: usize = 80_000;
/// Entries evicted per prune.
pub const PRUNE_COUNT: usize = 30_000;

pub const SHORT_LIVED_SEED: u64 = 42;
pub const LONG_LIVED_SEED: u64 = 99;

/// Complete configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub warmup: Duration,
    pub measure: Duration,
    pub short_lived_sizes: SizeRange,
    pub long_lived_sizes: SizeRange,
    pub retention: RetentionPolicy,
    pub short_lived_seed: u64,
    pub long_lived_seed: u64,
    #[serde(default)]
    pub pacing: Pacing,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            measure: DEFAULT_MEASURE,
            short_lived_sizes: SHORT_LIVED_SIZES,
            long_lived_sizes: LONG_LIVED_SIZES,
            retention: RetentionPolicy {
                max_size: MAX_RETAINED,
                prune_count: PRUNE_COUNT,
            },
            short_lived_seed: SHORT_LIVED_SEED,
            long_lived_seed: LONG_LIVED_SEED,
            pacing: Pacing::Unpaced,
        }
    }
}

impl BenchmarkConfig {
    /// Default configuration with the given phase durations.
    pub fn with_durations(warmup: Duration, measure: Duration) -> Self {
        Self {
            warmup,
            measure,
            ..Self::default()
        }
    }

    /// Warmup plus measurement.
    pub fn total(&self) -> Duration {
        self.warmup + self.measure
    }

    /// Measurement window in whole milliseconds, as used by the throughput formula.
    pub fn measure_ms(&self) -> u64 {
        self.measure.as_millis() as u64
    }

    /// Check every invariant the workers rely on.
    pub fn validate(&self) -> Result<(), HardValidationError> {
        if self.warmup.is_zero() {
            return Err(HardValidationError::ZeroDuration { field: "warmup" });
        }
        // Sub-millisecond windows would divide by zero in the throughput formula
        if self.measure_ms() == 0 {
            return Err(HardValidationError::ZeroDuration { field: "measure" });
        }

        self.short_lived_sizes.validate("short_lived_sizes")?;
        self.long_lived_sizes.validate("long_lived_sizes")?;

        self.retention.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BenchmarkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total(), Duration::from_millis(150_000));
        assert_eq!(config.measure_ms(), 120_000);
        assert_eq!(config.retention.floor(), 50_000);
    }

    #[test]
    fn test_zero_warmup_rejected() {
        let config = BenchmarkConfig::with_durations(Duration::ZERO, Duration::from_millis(10));
        assert_eq!(
            config.validate(),
            Err(HardValidationError::ZeroDuration { field: "warmup" })
        );
    }

    #[test]
    fn test_sub_millisecond_measure_rejected() {
        let config =
            BenchmarkConfig::with_durations(Duration::from_millis(10), Duration::from_micros(500));
        assert_eq!(
            config.validate(),
            Err(HardValidationError::ZeroDuration { field: "measure" })
        );
    }

    #[test]
    fn test_invalid_retention_rejected() {
        let mut config = BenchmarkConfig::default();
        config.retention = RetentionPolicy {
            max_size: 100,
            prune_count: 100,
        };
        assert!(matches!(
            config.validate(),
            Err(HardValidationError::InvalidRetention { .. })
        ));
    }

    #[test]
    fn test_empty_size_range_rejected() {
        let mut config = BenchmarkConfig::default();
        config.short_lived_sizes = SizeRange::new_unchecked(512, 512);
        assert!(matches!(
            config.validate(),
            Err(HardValidationError::EmptySizeRange { field: "short_lived_sizes", .. })
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = BenchmarkConfig::with_durations(
            Duration::from_millis(100),
            Duration::from_millis(200),
        );
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BenchmarkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
