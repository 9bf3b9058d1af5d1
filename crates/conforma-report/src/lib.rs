//! # conforma-report — Report Generation for the Conforma Stack
//!
//! Renders a **finalized** `BatchValidationReport` into the five output
//! surfaces the pipeline consumes:
//!
//! - HTML — self-contained page for humans ([`HtmlRenderer`])
//! - JSON — structured artifact for machines ([`JsonRenderer`])
//! - CSV — one row per resource for spreadsheets ([`CsvRenderer`])
//! - console text — compact terminal summary ([`ConsoleRenderer`])
//! - CI summary — pass/fail verdict plus exit code ([`ci_summary`])
//!
//! Renderers never mutate the report. Rendering a non-finalized report is
//! rejected with `ReportError::NotFinalized`; file-writing failures wrap
//! into `ReportError` naming the target format. The in-memory surfaces
//! (console, CI summary) cannot fail on I/O grounds.

use std::path::Path;

use conforma_core::{BatchValidationReport, ReportError};

pub mod ci;
pub mod console;
pub mod csv;
pub mod html;
pub mod json;

pub use ci::{ci_summary, CiSummary};
pub use console::ConsoleRenderer;
pub use csv::CsvRenderer;
pub use html::HtmlRenderer;
pub use json::JsonRenderer;

/// A finalized-report-to-text renderer for one output format.
pub trait ReportRenderer {
    /// Format name used in error messages and artifact listings.
    fn format_name(&self) -> &'static str;

    /// Render the report to text.
    ///
    /// # Errors
    ///
    /// `ReportError::NotFinalized` when the report has not been finalized;
    /// `ReportError::Serialize` for serialization failures.
    fn render(&self, report: &BatchValidationReport) -> Result<String, ReportError>;
}

/// Render and write one artifact to `path`.
///
/// # Errors
///
/// Rendering errors pass through; write failures become
/// `ReportError::Io` naming the renderer's format.
pub fn write_report(
    renderer: &dyn ReportRenderer,
    report: &BatchValidationReport,
    path: &Path,
) -> Result<(), ReportError> {
    let text = renderer.render(report)?;
    std::fs::write(path, text).map_err(|e| ReportError::Io {
        format: renderer.format_name(),
        source: e,
    })?;
    tracing::info!(
        format = renderer.format_name(),
        path = %path.display(),
        "wrote report artifact"
    );
    Ok(())
}

/// Guard shared by every renderer: a report must be finalized before it
/// can be rendered.
pub(crate) fn require_finalized(
    report: &BatchValidationReport,
    format: &'static str,
) -> Result<(), ReportError> {
    if report.is_finalized() {
        Ok(())
    } else {
        Err(ReportError::NotFinalized { format })
    }
}

/// Milliseconds with one decimal, the display unit for durations.
pub(crate) fn millis(d: std::time::Duration) -> String {
    format!("{:.1}", d.as_secs_f64() * 1000.0)
}
