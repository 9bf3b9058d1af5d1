//! # Single-Resource Validator
//!
//! Wraps a [`ResourceParser`] and a [`ConformanceEngine`] into one
//! infallible operation: `validate` always returns a
//! [`ValidationResult`], never an error.
//!
//! ## Failure isolation
//!
//! Parse failures and engine failures become a single `Fatal` issue
//! (`PARSE_ERROR` / `VALIDATION_ERROR`) inside the returned result, so a
//! caller processing many resources is never aborted by one malformed
//! input. Cancellation is handled by the orchestrator *around* this
//! validator; nothing here suspends.
//!
//! Only identifiers and counts are logged — never document content.

use std::sync::Arc;
use std::time::Instant;

use conforma_core::issue::codes;
use conforma_core::{ValidationIssue, ValidationResult};

use crate::engine::{map_severity, ConformanceEngine};
use crate::parser::{ParsedResource, ResourceParser};

/// Validates one resource at a time against a fixed parser and engine.
///
/// Cheap to clone; clones share the underlying capabilities.
#[derive(Clone)]
pub struct ResourceValidator {
    parser: Arc<dyn ResourceParser>,
    engine: Arc<dyn ConformanceEngine>,
}

impl ResourceValidator {
    /// Build a validator from the two capabilities.
    pub fn new(parser: Arc<dyn ResourceParser>, engine: Arc<dyn ConformanceEngine>) -> Self {
        Self { parser, engine }
    }

    /// Access the parser, e.g. for serialization recognition during
    /// directory enumeration.
    pub fn parser(&self) -> &dyn ResourceParser {
        self.parser.as_ref()
    }

    /// Validate a pre-parsed document against the given profiles.
    pub fn validate(&self, resource: &ParsedResource, profiles: &[String]) -> ValidationResult {
        let started = Instant::now();

        let issues = match self.engine.check(resource, profiles) {
            Ok(findings) => findings
                .into_iter()
                .map(|f| {
                    ValidationIssue::new(map_severity(f.severity), f.code, f.message, f.path)
                })
                .collect(),
            Err(e) => {
                tracing::warn!(resource = %resource.name, "conformance engine failed");
                vec![ValidationIssue::new(
                    conforma_core::Severity::Fatal,
                    codes::VALIDATION_ERROR,
                    e.to_string(),
                    "",
                )]
            }
        };

        let result = ValidationResult::new(
            resource.name.clone(),
            resource.resource_type.clone(),
            issues,
            profiles.to_vec(),
            started.elapsed(),
        );
        tracing::debug!(
            resource = %result.resource_name,
            resource_type = %result.resource_type,
            issues = result.issues.len(),
            valid = result.is_valid,
            "validated resource"
        );
        result
    }

    /// Validate raw text: parse first, then delegate to [`Self::validate`].
    /// Parse failure yields a `Fatal` `PARSE_ERROR` result and the engine
    /// is never consulted.
    pub fn validate_text(&self, name: &str, text: &str, profiles: &[String]) -> ValidationResult {
        let started = Instant::now();
        match self.parser.parse(name, text) {
            Ok(resource) => {
                let mut result = self.validate(&resource, profiles);
                // Duration covers parsing too for the text entry point.
                result.duration = started.elapsed();
                result
            }
            Err(e) => {
                tracing::debug!(resource = %name, "parse failed");
                ValidationResult::fatal(
                    strip_recognized_extension(name),
                    codes::PARSE_ERROR,
                    e.to_string(),
                    profiles.to_vec(),
                    started.elapsed(),
                )
            }
        }
    }
}

/// Reports key on bare resource names even when parsing failed before a
/// name could be derived from the document.
fn strip_recognized_extension(name: &str) -> &str {
    for ext in [".json", ".yaml", ".yml"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem;
        }
    }
    name
}
