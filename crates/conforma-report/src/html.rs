//! # HTML Artifact
//!
//! A self-contained page: inline CSS, summary cards, a performance table,
//! and a per-resource table whose rows list each issue's severity, code,
//! description, and element path. All document-derived text is escaped.

use std::fmt::Write as _;

use conforma_core::{BatchValidationReport, ReportError, ValidationResult};

use crate::{millis, require_finalized, ReportRenderer};

const STYLE: &str = "\
body{font-family:-apple-system,Segoe UI,sans-serif;margin:2em;color:#1a1a2e}\
h1{font-size:1.4em}h2{font-size:1.1em;margin-top:1.6em}\
.cards{display:flex;gap:1em;flex-wrap:wrap}\
.card{border:1px solid #d0d0e0;border-radius:6px;padding:0.8em 1.2em;min-width:7em}\
.card .num{font-size:1.6em;font-weight:700}\
.card.pass .num{color:#1b7f4d}.card.fail .num{color:#b3261e}.card.warn .num{color:#9a6a00}\
table{border-collapse:collapse;margin-top:0.6em;width:100%}\
th,td{border:1px solid #d0d0e0;padding:0.4em 0.7em;text-align:left;font-size:0.92em}\
th{background:#f2f2f8}\
tr.invalid td.name{color:#b3261e;font-weight:600}\
td.sev-error,td.sev-fatal{color:#b3261e}\
td.sev-warning{color:#9a6a00}\
td.sev-information{color:#555}\
.verdict{display:inline-block;padding:0.2em 0.8em;border-radius:4px;color:#fff;font-weight:700}\
.verdict.pass{background:#1b7f4d}.verdict.fail{background:#b3261e}";

/// Self-contained HTML renderer.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    title: String,
}

impl HtmlRenderer {
    /// Renderer with the default page title.
    pub fn new() -> Self {
        Self {
            title: "Conformance Validation Report".to_string(),
        }
    }

    /// Override the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl ReportRenderer for HtmlRenderer {
    fn format_name(&self) -> &'static str {
        "html"
    }

    fn render(&self, report: &BatchValidationReport) -> Result<String, ReportError> {
        require_finalized(report, self.format_name())?;
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

        let mut out = String::with_capacity(4096);
        let verdict_class = if summary.overall_success { "pass" } else { "fail" };
        let verdict_text = if summary.overall_success { "PASS" } else { "FAIL" };

        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
            escape(&self.title)
        );
        let _ = write!(
            out,
            "<h1>{} — {} <span class=\"verdict {verdict_class}\">{verdict_text}</span></h1>\n",
            escape(&self.title),
            escape(&report.batch_name)
        );
        let _ = write!(
            out,
            "<p>Started {} · wall clock {} ms</p>\n",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            millis(report.wall_clock)
        );

        // Summary cards.
        out.push_str("<div class=\"cards\">\n");
        card(&mut out, "", "Total", summary.total_resources.to_string());
        card(&mut out, "pass", "Passed", summary.passed_resources.to_string());
        card(&mut out, "fail", "Failed", summary.failed_resources.to_string());
        card(&mut out, "warn", "With warnings", summary.warning_resources.to_string());
        card(&mut out, "", "Pass rate", format!("{:.1}%", summary.pass_rate));
        card(&mut out, "fail", "Fatal issues", summary.fatal_issues.to_string());
        out.push_str("</div>\n");

        // Performance table.
        out.push_str("<h2>Performance</h2>\n<table>\n<tr><th>Metric</th><th>Value</th></tr>\n");
        perf_row(&mut out, "Average item duration (ms)", millis(metrics.average_duration));
        perf_row(&mut out, "Fastest item (ms)", millis(metrics.min_duration));
        perf_row(&mut out, "Slowest item (ms)", millis(metrics.max_duration));
        perf_row(
            &mut out,
            "Throughput (items/s)",
            format!("{:.2}", metrics.throughput_per_second),
        );
        perf_row(
            &mut out,
            "Memory snapshot (MiB)",
            format!("{:.1}", metrics.memory_bytes as f64 / (1024.0 * 1024.0)),
        );
        perf_row(&mut out, "Configured concurrency", metrics.concurrency.to_string());
        out.push_str("</table>\n");

        // Per-resource table with expanded issue rows.
        out.push_str(
            "<h2>Resources</h2>\n<table>\n<tr><th>Resource</th><th>Type</th>\
             <th>Valid</th><th>Issues</th><th>Duration (ms)</th></tr>\n",
        );
        for result in &report.results {
            resource_rows(&mut out, result);
        }
        out.push_str("</table>\n</body>\n</html>\n");

        Ok(out)
    }
}

fn card(out: &mut String, class: &str, label: &str, value: String) {
    let _ = write!(
        out,
        "<div class=\"card {class}\"><div class=\"num\">{value}</div><div>{label}</div></div>\n"
    );
}

fn perf_row(out: &mut String, label: &str, value: String) {
    let _ = write!(out, "<tr><td>{label}</td><td>{value}</td></tr>\n");
}

fn resource_rows(out: &mut String, result: &ValidationResult) {
    let row_class = if result.is_valid { "valid" } else { "invalid" };
    let _ = write!(
        out,
        "<tr class=\"{row_class}\"><td class=\"name\">{}</td><td>{}</td><td>{}</td>\
         <td>{}</td><td>{}</td></tr>\n",
        escape(&result.resource_name),
        escape(&result.resource_type),
        result.is_valid,
        result.issues.len(),
        millis(result.duration)
    );
    for issue in &result.issues {
        let _ = write!(
            out,
            "<tr><td></td><td class=\"sev-{sev}\">{sev}</td><td>{}</td>\
             <td colspan=\"2\">{}{}</td></tr>\n",
            escape(&issue.code),
            escape(&issue.description),
            if issue.element_path.is_empty() {
                String::new()
            } else {
                format!(" <code>{}</code>", escape(&issue.element_path))
            },
            sev = issue.severity.as_str(),
        );
    }
}

/// Minimal HTML escaping for text nodes and attribute values.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
