// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! allocpressure CLI
//!
//! Runs the dual-phase allocation benchmark and prints throughput in the
//! `label: number` format read by the plotting scripts. Logs go to stderr.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use allocpressure_core::metrics::format_bytes;
use allocpressure_core::{
    BenchmarkConfig, BenchmarkReport, Coordinator, JsonReporter, Pacing, SystemInfo, TextReport,
};
use clap::Parser;

/// Dual-phase allocation throughput benchmark
#[derive(Parser)]
#[command(name = "allocpressure")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Warmup duration in milliseconds
    #[arg(long)]
    warmup_ms: Option<u64>,

    /// Measurement duration in milliseconds
    #[arg(long)]
    measure_ms: Option<u64>,

    /// Retained set length that triggers a prune
    #[arg(long)]
    max_retained: Option<usize>,

    /// Entries evicted from the retained set per prune
    #[arg(long)]
    prune_count: Option<usize>,

    /// Yield the worker thread once every N allocations
    #[arg(long)]
    yield_every: Option<NonZeroU32>,

    /// Also write a JSON report into this directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> BenchmarkConfig {
        let mut config = BenchmarkConfig::default();
        if let Some(ms) = self.warmup_ms {
            config.warmup = Duration::from_millis(ms);
        }
        if let Some(ms) = self.measure_ms {
            config.measure = Duration::from_millis(ms);
        }
        if let Some(max_size) = self.max_retained {
            config.retention.max_size = max_size;
        }
        if let Some(prune_count) = self.prune_count {
            config.retention.prune_count = prune_count;
        }
        if let Some(n) = self.yield_every {
            config.pacing = Pacing::YieldEvery(n);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for results
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = args.to_config();
    let coordinator = Coordinator::new(config)?;
    let config = coordinator.config();

    println!(
        "Starting benchmark: Warmup={}ms, Measure={}ms, Total={}ms",
        config.warmup.as_millis(),
        config.measure.as_millis(),
        config.total().as_millis()
    );
    let system = SystemInfo::collect();
    println!(
        "Memory: total={} available={}",
        format_bytes(system.memory_bytes),
        format_bytes(system.available_memory_bytes)
    );

    let result = coordinator.run()?;

    println!("Benchmark threads finished.");
    let report = TextReport::new(&result);
    print!("{}", report);
    println!("{}", report.runtime_line());

    if let Some(dir) = &args.output {
        let reporter = JsonReporter::new(dir)?;
        let path = reporter.save(&BenchmarkReport::new(config.clone(), result))?;
        tracing::info!(path = %path.display(), "Benchmark report saved");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_historical_constants() {
        let args = Args::parse_from(["allocpressure"]);
        assert_eq!(args.to_config(), BenchmarkConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "allocpressure",
            "--warmup-ms",
            "100",
            "--measure-ms",
            "200",
            "--max-retained",
            "1000",
            "--prune-count",
            "400",
            "--yield-every",
            "64",
        ]);
        let config = args.to_config();

        assert_eq!(config.warmup, Duration::from_millis(100));
        assert_eq!(config.measure, Duration::from_millis(200));
        assert_eq!(config.retention.max_size, 1000);
        assert_eq!(config.retention.prune_count, 400);
        assert_eq!(
            config.pacing,
            Pacing::YieldEvery(NonZeroU32::new(64).unwrap())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_yield_interval_rejected_by_parser() {
        assert!(Args::try_parse_from(["allocpressure", "--yield-every", "0"]).is_err());
    }
}
