//! # Result Aggregation
//!
//! Pure computation: per-item results plus the batch configuration in,
//! [`ValidationSummary`] and [`ValidationPerformanceMetrics`] out. No
//! I/O apart from a single point-in-time memory probe.
//!
//! ## Conventions
//!
//! - An empty batch has a pass rate of 100 and succeeds (validating
//!   nothing finds nothing wrong). Documented, not implicit; see DESIGN.md.
//! - `warning_resources` and `failed_resources` are independent counters:
//!   a valid result with warnings counts as both passed and warning-only.
//! - Duration statistics ignore items whose measured duration is zero,
//!   defending against malformed entries.

use std::collections::BTreeMap;
use std::time::Duration;

use conforma_core::{
    Severity, ValidationConfiguration, ValidationPerformanceMetrics, ValidationResult,
    ValidationSummary,
};

/// Compute summary statistics and performance metrics for a finished batch.
///
/// `wall_clock` is the total batch duration, which differs from the sum of
/// per-item durations whenever items ran concurrently.
pub fn aggregate(
    results: &[ValidationResult],
    config: &ValidationConfiguration,
    wall_clock: Duration,
) -> (ValidationSummary, ValidationPerformanceMetrics) {
    let total = results.len();
    let passed = results.iter().filter(|r| r.is_valid).count();
    let failed = total - passed;
    let warning = results.iter().filter(|r| r.has_warnings()).count();

    let mut issues_by_severity: BTreeMap<String, usize> = BTreeMap::new();
    let mut issues_by_resource_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_issues = 0usize;
    let mut fatal_issues = 0usize;

    for result in results {
        for issue in &result.issues {
            total_issues += 1;
            if issue.severity == Severity::Fatal {
                fatal_issues += 1;
            }
            *issues_by_severity
                .entry(issue.severity.as_str().to_string())
                .or_default() += 1;
            *issues_by_resource_type
                .entry(result.resource_type.clone())
                .or_default() += 1;
        }
    }

    // Empty-batch convention: nothing validated, nothing wrong.
    let pass_rate = if total == 0 {
        100.0
    } else {
        100.0 * passed as f64 / total as f64
    };
    let overall_success =
        pass_rate >= config.min_pass_rate && fatal_issues <= config.max_fatal_errors;

    let summary = ValidationSummary {
        total_resources: total,
        passed_resources: passed,
        failed_resources: failed,
        warning_resources: warning,
        total_issues,
        fatal_issues,
        issues_by_severity,
        issues_by_resource_type,
        pass_rate,
        overall_success,
    };

    let metrics = performance_metrics(results, config, wall_clock, total);
    (summary, metrics)
}

fn performance_metrics(
    results: &[ValidationResult],
    config: &ValidationConfiguration,
    wall_clock: Duration,
    total: usize,
) -> ValidationPerformanceMetrics {
    let timed: Vec<Duration> = results
        .iter()
        .map(|r| r.duration)
        .filter(|d| !d.is_zero())
        .collect();

    let (average, min, max) = if timed.is_empty() {
        (Duration::ZERO, Duration::ZERO, Duration::ZERO)
    } else {
        let sum: Duration = timed.iter().sum();
        let average = sum / timed.len() as u32;
        let min = timed.iter().min().copied().unwrap_or(Duration::ZERO);
        let max = timed.iter().max().copied().unwrap_or(Duration::ZERO);
        (average, min, max)
    };

    let wall_secs = wall_clock.as_secs_f64();
    let throughput = if wall_secs > 0.0 {
        total as f64 / wall_secs
    } else {
        0.0
    };

    ValidationPerformanceMetrics {
        average_duration: average,
        min_duration: min,
        max_duration: max,
        throughput_per_second: throughput,
        memory_bytes: resident_memory_bytes(),
        concurrency: config.max_concurrency,
    }
}

/// Point-in-time resident-set size of this process, in bytes.
///
/// Reads `VmRSS` from `/proc/self/status` on Linux. This is a snapshot at
/// aggregation time, not a peak; platforms without a cheap probe report 0.
#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> u64 {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return 0;
    };
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kib: u64 = rest
                .trim()
                .trim_end_matches("kB")
                .trim()
                .parse()
                .unwrap_or(0);
            return kib * 1024;
        }
    }
    0
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes() -> u64 {
    0
}
