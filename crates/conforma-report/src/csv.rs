//! # CSV Artifact
//!
//! One row per resource with a semicolon-joined digest of that resource's
//! issues. Fields containing delimiters, quotes, or newlines are quoted
//! per RFC 4180.

use conforma_core::{BatchValidationReport, ReportError, ValidationResult};

use crate::{millis, require_finalized, ReportRenderer};

const HEADER: &str = "resource_name,resource_type,is_valid,issue_count,duration_ms,issues";

/// CSV renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    /// Create the renderer.
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for CsvRenderer {
    fn format_name(&self) -> &'static str {
        "csv"
    }

    fn render(&self, report: &BatchValidationReport) -> Result<String, ReportError> {
        require_finalized(report, self.format_name())?;

        let mut out = String::from(HEADER);
        out.push('\n');
        for result in &report.results {
            out.push_str(&row(result));
            out.push('\n');
        }
        Ok(out)
    }
}

fn row(result: &ValidationResult) -> String {
    let digest = result
        .issues
        .iter()
        .map(|i| {
            if i.element_path.is_empty() {
                format!("[{}] {}: {}", i.severity, i.code, i.description)
            } else {
                format!("[{}] {} at {}: {}", i.severity, i.code, i.element_path, i.description)
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    [
        quote(&result.resource_name),
        quote(&result.resource_type),
        result.is_valid.to_string(),
        result.issues.len().to_string(),
        millis(result.duration),
        quote(&digest),
    ]
    .join(",")
}

/// RFC 4180 quoting: wrap when the field contains a comma, quote, or
/// newline; double embedded quotes.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn one_row_per_resource_plus_header() {
        let csv = CsvRenderer::new().render(&fixtures::sample_report()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("a,Patient,true,0,"));
        assert!(lines[3].starts_with("c,Observation,false,1,"));
    }

    #[test]
    fn issue_digest_is_semicolon_joined_and_quoted() {
        let csv = CsvRenderer::new().render(&fixtures::sample_report()).unwrap();
        let c_row = csv.lines().nth(3).unwrap();
        // The digest carries quotes and commas, so it must be quoted with
        // embedded quotes doubled.
        assert!(c_row.contains("\"[error] SCHEMA_VIOLATION at /status: \"\"status\"\" is a required property\""));
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn unfinalized_report_is_rejected() {
        assert!(CsvRenderer::new()
            .render(&fixtures::unfinalized_report())
            .is_err());
    }
}
