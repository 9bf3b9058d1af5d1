//! # Per-Resource Validation Results
//!
//! A [`ValidationResult`] is the complete outcome of validating one
//! resource: the ordered findings, the profiles that were checked, the
//! measured duration, and the derived validity flag.
//!
//! The validity flag is derived at construction —
//! `is_valid == !exists(issue: issue.severity >= Error)` — and serialized
//! alongside the issues so machine consumers never re-derive it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::issue::{Severity, ValidationIssue};

/// Outcome of validating a single resource. Built once by the validator,
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Resource name (file stem in directory mode, caller-supplied otherwise).
    pub resource_name: String,
    /// Declared resource type (`"Unknown"` when the document carries none).
    pub resource_type: String,
    /// Findings in the order the engine produced them.
    pub issues: Vec<ValidationIssue>,
    /// Profile identifiers this resource was checked against.
    pub profiles: Vec<String>,
    /// Measured duration from validator entry to return.
    pub duration: Duration,
    /// Derived validity: no issue at `Error` or above.
    pub is_valid: bool,
}

impl ValidationResult {
    /// Build a result, deriving `is_valid` from the issue list.
    pub fn new(
        resource_name: impl Into<String>,
        resource_type: impl Into<String>,
        issues: Vec<ValidationIssue>,
        profiles: Vec<String>,
        duration: Duration,
    ) -> Self {
        let is_valid = !issues.iter().any(|i| i.severity.is_blocking());
        Self {
            resource_name: resource_name.into(),
            resource_type: resource_type.into(),
            issues,
            profiles,
            duration,
            is_valid,
        }
    }

    /// Build a failed result carrying exactly one `Fatal` issue.
    ///
    /// This is the failure-isolation contract: parse failures, engine
    /// failures, and exhausted file I/O all collapse into this shape so a
    /// batch caller sees them as data, not as exceptions.
    pub fn fatal(
        resource_name: impl Into<String>,
        code: &str,
        description: impl Into<String>,
        profiles: Vec<String>,
        duration: Duration,
    ) -> Self {
        let issue = ValidationIssue::new(Severity::Fatal, code, description, "");
        Self::new(resource_name, "Unknown", vec![issue], profiles, duration)
    }

    /// Number of issues at exactly the given severity.
    pub fn count_at(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Number of `Error`-severity issues.
    pub fn error_count(&self) -> usize {
        self.count_at(Severity::Error)
    }

    /// Number of `Warning`-severity issues.
    pub fn warning_count(&self) -> usize {
        self.count_at(Severity::Warning)
    }

    /// Number of `Fatal`-severity issues.
    pub fn fatal_count(&self) -> usize {
        self.count_at(Severity::Fatal)
    }

    /// Whether the result carries at least one warning. Independent of
    /// validity: a passing resource may still have warnings.
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::codes;

    fn issue(severity: Severity) -> ValidationIssue {
        ValidationIssue::new(severity, "T", "test issue", "")
    }

    #[test]
    fn no_issues_is_valid() {
        let r = ValidationResult::new("a", "Patient", vec![], vec![], Duration::from_millis(1));
        assert!(r.is_valid);
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let r = ValidationResult::new(
            "a",
            "Patient",
            vec![issue(Severity::Information), issue(Severity::Warning)],
            vec![],
            Duration::from_millis(1),
        );
        assert!(r.is_valid);
        assert!(r.has_warnings());
    }

    #[test]
    fn error_and_fatal_invalidate() {
        for severity in [Severity::Error, Severity::Fatal] {
            let r = ValidationResult::new(
                "a",
                "Patient",
                vec![issue(Severity::Warning), issue(severity)],
                vec![],
                Duration::from_millis(1),
            );
            assert!(!r.is_valid, "severity {severity} must invalidate");
        }
    }

    #[test]
    fn fatal_constructor_carries_exactly_one_fatal_issue() {
        let r = ValidationResult::fatal(
            "broken.json",
            codes::PARSE_ERROR,
            "unexpected end of input",
            vec!["patient.schema.json".into()],
            Duration::from_millis(3),
        );
        assert!(!r.is_valid);
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.issues[0].severity, Severity::Fatal);
        assert_eq!(r.issues[0].code, codes::PARSE_ERROR);
        assert_eq!(r.resource_type, "Unknown");
    }

    #[test]
    fn json_round_trip_preserves_validity() {
        let r = ValidationResult::new(
            "a",
            "Observation",
            vec![issue(Severity::Error)],
            vec!["obs".into()],
            Duration::from_millis(12),
        );
        let json = serde_json::to_string(&r).unwrap();
        let back: ValidationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.is_valid, r.is_valid);
        assert_eq!(back.resource_name, r.resource_name);
        assert_eq!(back.issues.len(), 1);
    }
}
