//! # Console Text
//!
//! Compact terminal summary of a finalized report. Rendering is
//! idempotent: the same report yields byte-identical text on every call
//! (nothing time- or environment-dependent is included).
//!
//! Verbose mode additionally lists every issue for each failing resource.

use std::fmt::Write as _;

use conforma_core::{BatchValidationReport, ReportError};

use crate::{millis, require_finalized, ReportRenderer};

/// Console renderer; `verbose` expands failing resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer {
    verbose: bool,
}

impl ConsoleRenderer {
    /// Compact renderer.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable per-issue detail for failing resources.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl ReportRenderer for ConsoleRenderer {
    fn format_name(&self) -> &'static str {
        "console"
    }

    fn render(&self, report: &BatchValidationReport) -> Result<String, ReportError> {
        require_finalized(report, self.format_name())?;
        // Guarded above: summary and metrics are present once finalized.
        let Some(summary) = report.summary.as_ref() else {
            return Err(ReportError::NotFinalized {
                format: self.format_name(),
            });
        };
        let Some(metrics) = report.metrics.as_ref() else {
            return Err(ReportError::NotFinalized {
                format: self.format_name(),
            });
        };

        let mut out = String::new();
        let verdict = if summary.overall_success { "PASS" } else { "FAIL" };

        // Writing to a String cannot fail; unwraps via `let _`.
        let _ = writeln!(out, "Batch validation: {}", report.batch_name);
        let _ = writeln!(
            out,
            "  resources: {} total, {} passed, {} failed, {} with warnings",
            summary.total_resources,
            summary.passed_resources,
            summary.failed_resources,
            summary.warning_resources
        );
        let _ = writeln!(
            out,
            "  issues:    {} total ({} fatal)",
            summary.total_issues, summary.fatal_issues
        );
        let _ = writeln!(
            out,
            "  pass rate: {:.1}% (threshold {:.1}%)",
            summary.pass_rate, report.configuration.min_pass_rate
        );
        let _ = writeln!(
            out,
            "  timing:    {} ms wall clock, {:.1}/s throughput, concurrency {}",
            millis(report.wall_clock),
            metrics.throughput_per_second,
            metrics.concurrency
        );
        let _ = writeln!(out, "  verdict:   {verdict}");

        if self.verbose {
            for result in report.results.iter().filter(|r| !r.is_valid) {
                let _ = writeln!(
                    out,
                    "\n  {} ({}) — {} issue(s):",
                    result.resource_name,
                    result.resource_type,
                    result.issues.len()
                );
                for issue in &result.issues {
                    let _ = writeln!(out, "    {issue}");
                }
            }
        }

        Ok(out)
    }
}
