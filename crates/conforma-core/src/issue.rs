//! # Severities and Validation Issues
//!
//! A [`ValidationIssue`] is one finding raised against one resource: a
//! severity, a stable machine code, a human-readable description, and the
//! element path the finding points at. Issues are immutable once created.
//!
//! Severity ordering is load-bearing: `is_valid` on a result is defined as
//! "no issue at [`Severity::Error`] or above", so the derived `Ord` on
//! [`Severity`] must list variants from least to most severe.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known issue codes used across the stack.
///
/// Codes are stable strings: they appear in JSON/CSV artifacts and are
/// matched by downstream pipeline tooling, so they must never be renamed
/// casually.
pub mod codes {
    /// The document could not be parsed from its serialization.
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    /// The conformance engine itself failed (not a finding about the document).
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// Reading the file from disk failed after exhausting retries.
    pub const FILE_PROCESSING_ERROR: &str = "FILE_PROCESSING_ERROR";
    /// The document is not structurally a clinical resource.
    pub const STRUCTURE_ERROR: &str = "STRUCTURE_ERROR";
    /// The document violates a constraint of a named profile.
    pub const SCHEMA_VIOLATION: &str = "SCHEMA_VIOLATION";
    /// A requested profile identifier is not known to the engine.
    pub const UNKNOWN_PROFILE: &str = "UNKNOWN_PROFILE";
}

/// Severity of a validation issue, ordered from least to most severe.
///
/// `Error` and `Fatal` invalidate a resource; `Information` and `Warning`
/// do not.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory note, no action required.
    Information,
    /// Suspicious but conformant; fix when convenient.
    Warning,
    /// Non-conformant; the resource fails validation.
    Error,
    /// Processing-level failure (parse, engine, I/O); the resource fails
    /// validation and counts against the batch fatal budget.
    Fatal,
}

impl Severity {
    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Whether an issue at this severity invalidates its resource.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conformance finding against one resource.
///
/// Immutable once created. The optional `details` map carries free-form
/// context (e.g. the schema keyword that fired, the retry count for an I/O
/// failure); a `BTreeMap` keeps serialization order deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity of the finding.
    pub severity: Severity,
    /// Stable machine code (see [`codes`]).
    pub code: String,
    /// Human-readable description. The only field that may carry internal
    /// error text; collaborators that display reports own any redaction.
    pub description: String,
    /// Path to the violating element (JSON Pointer where applicable),
    /// empty for document-level findings.
    pub element_path: String,
    /// Optional free-form context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl ValidationIssue {
    /// Create an issue with an empty details map.
    pub fn new(
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        element_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            description: description.into(),
            element_path: element_path.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attach one detail entry, builder-style.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.element_path.is_empty() {
            write!(f, "[{}] {}: {}", self.severity, self.code, self.description)
        } else {
            write!(
                f,
                "[{}] {} at {}: {}",
                self.severity, self.code, self.element_path, self.description
            )
        }
    }
}
