//! # JSON Artifact
//!
//! Direct structured serialization of the finalized report with stable
//! snake_case field names, for machine consumption.

use conforma_core::{BatchValidationReport, ReportError};

use crate::{require_finalized, ReportRenderer};

/// Pretty-printed JSON renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    /// Create the renderer.
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for JsonRenderer {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn render(&self, report: &BatchValidationReport) -> Result<String, ReportError> {
        require_finalized(report, self.format_name())?;
        serde_json::to_string_pretty(report).map_err(|e| ReportError::Serialize {
            format: self.format_name(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use conforma_core::BatchValidationReport;

    #[test]
    fn json_round_trip_preserves_counts_and_validity() {
        let report = fixtures::sample_report();
        let json = JsonRenderer::new().render(&report).unwrap();
        let back: BatchValidationReport = serde_json::from_str(&json).unwrap();

        let summary = back.summary.as_ref().unwrap();
        let original = report.summary.as_ref().unwrap();
        assert_eq!(summary.total_resources, original.total_resources);
        assert_eq!(summary.passed_resources, original.passed_resources);
        for (a, b) in back.results.iter().zip(report.results.iter()) {
            assert_eq!(a.is_valid, b.is_valid);
            assert_eq!(a.resource_name, b.resource_name);
        }
    }

    #[test]
    fn unfinalized_report_is_rejected() {
        let err = JsonRenderer::new()
            .render(&fixtures::unfinalized_report())
            .unwrap_err();
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn field_names_are_stable_snake_case() {
        let json = JsonRenderer::new().render(&fixtures::sample_report()).unwrap();
        for field in [
            "\"batch_name\"",
            "\"total_resources\"",
            "\"passed_resources\"",
            "\"overall_success\"",
            "\"is_valid\"",
            "\"issues_by_severity\"",
        ] {
            assert!(json.contains(field), "missing field {field}");
        }
    }
}
