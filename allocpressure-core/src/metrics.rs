// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Throughput metrics and report types.
//!
//! The throughput formula is fixed: allocations counted during the
//! measurement window, times 1000, divided by the window length in
//! milliseconds.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::config::BenchmarkConfig;
use crate::worker::WorkerOutcome;

/// Allocations per second for `count` allocations over `measure_ms`.
pub fn allocs_per_sec(count: u64, measure_ms: u64) -> f64 {
    count as f64 * 1000.0 / measure_ms as f64
}

/// Render with `,` thousands separators and no decimals.
///
/// Rounds half away from zero.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format bytes in human-readable form (auto-selects B/KiB/MiB/GiB).
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.2} KiB", b / KIB)
    } else if b < KIB * KIB * KIB {
        format!("{:.2} MiB", b / (KIB * KIB))
    } else {
        format!("{:.2} GiB", b / (KIB * KIB * KIB))
    }
}

/// Throughput of both workers for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub short_lived_allocs_per_sec: f64,
    pub long_lived_allocs_per_sec: f64,
    /// Wall-clock time from spawning the workers to joining both
    pub total_runtime: Duration,
    pub measure: Duration,
    pub short_lived: WorkerOutcome,
    pub long_lived: WorkerOutcome,
}

impl BenchmarkResult {
    pub fn from_outcomes(
        short_lived: WorkerOutcome,
        long_lived: WorkerOutcome,
        measure: Duration,
        total_runtime: Duration,
    ) -> Self {
        let measure_ms = measure.as_millis() as u64;
        Self {
            short_lived_allocs_per_sec: allocs_per_sec(short_lived.measured_count(), measure_ms),
            long_lived_allocs_per_sec: allocs_per_sec(long_lived.measured_count(), measure_ms),
            total_runtime,
            measure,
            short_lived,
            long_lived,
        }
    }
}

/// Host information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Memory available to new allocations in bytes
    pub available_memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            available_memory_bytes: sys.available_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete record of one run, for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark_suite: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub config: BenchmarkConfig,
    pub result: BenchmarkResult,
}

impl BenchmarkReport {
    pub fn new(config: BenchmarkConfig, result: BenchmarkResult) -> Self {
        Self {
            benchmark_suite: "allocpressure".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            config,
            result,
        }
    }
}
