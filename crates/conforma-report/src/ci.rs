//! # CI Summary
//!
//! A condensed pass/fail verdict for automated pipelines. The `exit_code`
//! is intended to be returned as the process exit status of a pipeline
//! step: 0 continues the pipeline, 1 fails the gate. `details` is bounded
//! to the first 10 failing resource names so output size is independent
//! of batch size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use conforma_core::{BatchValidationReport, ReportError};

use crate::require_finalized;

/// Maximum failing resource names listed in `details`.
const MAX_LISTED_FAILURES: usize = 10;

/// Pipeline-facing verdict derived from a finalized report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiSummary {
    /// `Summary.overall_success`, verbatim.
    pub success: bool,
    /// 0 when successful, 1 otherwise.
    pub exit_code: i32,
    /// One-line human summary.
    pub summary: String,
    /// Up to the first 10 failing resource names.
    pub details: String,
    /// Key metrics for dashboards.
    pub metrics: BTreeMap<String, serde_json::Value>,
    /// Paths of the artifacts written alongside this run.
    pub artifacts: Vec<String>,
}

/// Derive the CI summary. In-memory only; cannot fail on I/O grounds.
///
/// # Errors
///
/// `ReportError::NotFinalized` when the report has not been finalized.
pub fn ci_summary(
    report: &BatchValidationReport,
    artifacts: Vec<String>,
) -> Result<CiSummary, ReportError> {
    require_finalized(report, "ci")?;
    let Some(s) = report.summary.as_ref() else {
        return Err(ReportError::NotFinalized { format: "ci" });
    };
    let Some(m) = report.metrics.as_ref() else {
        return Err(ReportError::NotFinalized { format: "ci" });
    };

    let summary_line = format!(
        "{}: {}/{} passed ({:.1}%), {} fatal issue(s)",
        report.batch_name, s.passed_resources, s.total_resources, s.pass_rate, s.fatal_issues
    );

    // Results are sorted by name once finalized, so this listing is
    // deterministic too.
    let failing: Vec<&str> = report
        .results
        .iter()
        .filter(|r| !r.is_valid)
        .map(|r| r.resource_name.as_str())
        .collect();
    let details = if failing.is_empty() {
        String::from("all resources passed")
    } else {
        let shown = failing.iter().take(MAX_LISTED_FAILURES).copied().collect::<Vec<_>>();
        let mut details = format!("failing: {}", shown.join(", "));
        if failing.len() > MAX_LISTED_FAILURES {
            details.push_str(&format!(" (and {} more)", failing.len() - MAX_LISTED_FAILURES));
        }
        details
    };

    let mut metrics = BTreeMap::new();
    metrics.insert("total_resources".into(), s.total_resources.into());
    metrics.insert("passed_resources".into(), s.passed_resources.into());
    metrics.insert("failed_resources".into(), s.failed_resources.into());
    metrics.insert("pass_rate".into(), s.pass_rate.into());
    metrics.insert("fatal_issues".into(), s.fatal_issues.into());
    metrics.insert(
        "wall_clock_ms".into(),
        (report.wall_clock.as_secs_f64() * 1000.0).into(),
    );
    metrics.insert("throughput_per_second".into(), m.throughput_per_second.into());

    Ok(CiSummary {
        success: s.overall_success,
        exit_code: i32::from(!s.overall_success),
        summary: summary_line,
        details,
        metrics,
        artifacts,
    })
}
