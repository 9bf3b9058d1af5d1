//! # Batch Reports, Summaries, and Progress Snapshots
//!
//! A [`BatchValidationReport`] follows a strict lifecycle:
//!
//! 1. **Created** at batch start with an empty result list.
//! 2. **Appended to** as items complete (in whatever order concurrency
//!    yields them).
//! 3. **Finalized** exactly once at batch end: results are sorted by
//!    resource name and the computed summary and performance metrics are
//!    attached. Rendering a non-finalized report is a caller bug and the
//!    report generators reject it.
//!
//! [`ValidationSummary`] and [`ValidationPerformanceMetrics`] are pure
//! data; the math that fills them lives in the engine's aggregator.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ValidationConfiguration;
use crate::result::ValidationResult;

/// Aggregate counts and the batch verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total resources processed.
    pub total_resources: usize,
    /// Resources with `is_valid == true`.
    pub passed_resources: usize,
    /// Resources with `is_valid == false`.
    pub failed_resources: usize,
    /// Resources carrying at least one `Warning` issue. Independent of
    /// pass/fail: a passing resource with warnings counts here too.
    pub warning_resources: usize,
    /// Total issues across all resources.
    pub total_issues: usize,
    /// Total `Fatal` issues across all resources.
    pub fatal_issues: usize,
    /// Issue counts keyed by severity name.
    pub issues_by_severity: BTreeMap<String, usize>,
    /// Issue counts keyed by resource type.
    pub issues_by_resource_type: BTreeMap<String, usize>,
    /// `100 * passed / total`. By documented convention an empty batch has
    /// a pass rate of 100: validating nothing finds nothing wrong.
    pub pass_rate: f64,
    /// `pass_rate >= min_pass_rate && fatal_issues <= max_fatal_errors`.
    /// True for an empty batch (pending product sign-off; see DESIGN.md).
    pub overall_success: bool,
}

/// Performance figures for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPerformanceMetrics {
    /// Mean per-item duration over items with a strictly positive duration.
    pub average_duration: Duration,
    /// Fastest such item.
    pub min_duration: Duration,
    /// Slowest such item.
    pub max_duration: Duration,
    /// Items per wall-clock second; 0 when the wall clock measured 0.
    pub throughput_per_second: f64,
    /// Point-in-time resident-set snapshot at aggregation time, in bytes.
    /// Explicitly not a peak; 0 where the platform offers no cheap probe.
    pub memory_bytes: u64,
    /// The configured concurrency ceiling, not a measured value.
    pub concurrency: usize,
}

/// Transient progress snapshot emitted to an observer after each item
/// completes. Never persisted; ordering across concurrent items is
/// unspecified apart from `completed` being monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchValidationProgress {
    /// Items completed so far (atomic across workers).
    pub completed: usize,
    /// Total items in the batch.
    pub total: usize,
    /// Name of the item that just completed.
    pub current: String,
    /// Stage label, e.g. `"validating"`.
    pub stage: String,
}

/// The full record of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchValidationReport {
    /// Caller-supplied batch name.
    pub batch_name: String,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the batch finished; `None` until finalized.
    pub completed_at: Option<DateTime<Utc>>,
    /// Total wall-clock duration of the batch.
    pub wall_clock: Duration,
    /// The configuration the batch ran under.
    pub configuration: ValidationConfiguration,
    /// All per-resource results. Sorted by resource name once finalized.
    pub results: Vec<ValidationResult>,
    /// Computed summary; `None` until finalized.
    pub summary: Option<ValidationSummary>,
    /// Computed performance metrics; `None` until finalized.
    pub metrics: Option<ValidationPerformanceMetrics>,
}

impl BatchValidationReport {
    /// Create an empty report at batch start.
    pub fn new(batch_name: impl Into<String>, configuration: ValidationConfiguration) -> Self {
        Self {
            batch_name: batch_name.into(),
            started_at: Utc::now(),
            completed_at: None,
            wall_clock: Duration::ZERO,
            configuration,
            results: Vec::new(),
            summary: None,
            metrics: None,
        }
    }

    /// Append one completed item.
    pub fn push_result(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// Finalize the report: record the end time and wall clock, attach the
    /// computed summary and metrics, and sort results by resource name so
    /// rendering is deterministic regardless of completion order.
    pub fn finalize(
        &mut self,
        wall_clock: Duration,
        summary: ValidationSummary,
        metrics: ValidationPerformanceMetrics,
    ) {
        self.results
            .sort_by(|a, b| a.resource_name.cmp(&b.resource_name));
        self.wall_clock = wall_clock;
        self.completed_at = Some(Utc::now());
        self.summary = Some(summary);
        self.metrics = Some(metrics);
    }

    /// Whether `finalize` has run.
    pub fn is_finalized(&self) -> bool {
        self.summary.is_some() && self.metrics.is_some()
    }
}
