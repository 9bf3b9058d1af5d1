//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the Conforma stack. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Propagation policy
//!
//! - Per-item failures (parse, engine, exhausted file I/O) are *not*
//!   errors at the API boundary: the validator folds them into the item's
//!   own `ValidationResult` as a single `Fatal` issue.
//! - Batch-level precondition failures are raised before any processing.
//! - Cancellation always propagates as [`BatchError::Cancelled`]; it is
//!   never absorbed into a seemingly-complete report.
//! - Report-generation failures propagate as [`ReportError`] naming the
//!   target format.

use thiserror::Error;

/// Top-level error type for the Conforma stack.
#[derive(Error, Debug)]
pub enum ConformaError {
    /// Batch orchestration error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// Report generation error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Parse error surfaced outside the per-item isolation contract
    /// (e.g. a caller parsing a single document directly).
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Conformance-engine error surfaced outside the isolation contract.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// A document could not be parsed from its serialization.
#[derive(Error, Debug)]
#[error("cannot parse resource '{resource_name}': {reason}")]
pub struct ParseError {
    /// Name of the resource that failed to parse.
    pub resource_name: String,
    /// Reason parsing failed. Never includes document content.
    pub reason: String,
}

impl ParseError {
    /// Build a parse error for the named resource.
    pub fn new(resource_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            reason: reason.into(),
        }
    }
}

/// The conformance engine failed while checking a document. This is a
/// failure *of the engine*, not a finding about the document.
#[derive(Error, Debug)]
#[error("conformance engine failed on '{resource_name}': {reason}")]
pub struct EngineError {
    /// Name of the resource being checked when the engine failed.
    pub resource_name: String,
    /// Reason the engine failed.
    pub reason: String,
}

impl EngineError {
    /// Build an engine error for the named resource.
    pub fn new(resource_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            reason: reason.into(),
        }
    }
}

/// Batch-level failures. Per-item failures never appear here.
#[derive(Error, Debug)]
pub enum BatchError {
    /// A precondition failed before any processing started.
    #[error("precondition failed: {reason}")]
    Precondition {
        /// What was wrong (e.g. "directory does not exist: /data").
        reason: String,
    },

    /// The batch was cancelled. In-flight items may have completed, but
    /// the caller receives this outcome rather than a truncated report.
    #[error("batch validation was cancelled")]
    Cancelled,

    /// I/O failure during batch setup (e.g. enumerating the directory).
    #[error("io error during batch setup: {0}")]
    Io(#[from] std::io::Error),
}

/// Report generation failed for one target format.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Writing the artifact to disk failed.
    #[error("failed to write {format} report: {source}")]
    Io {
        /// Target format name ("html", "json", "csv").
        format: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the report failed.
    #[error("failed to serialize {format} report: {source}")]
    Serialize {
        /// Target format name.
        format: &'static str,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The report was not finalized before rendering.
    #[error("cannot render {format} report: report is not finalized")]
    NotFinalized {
        /// Target format name.
        format: &'static str,
    },
}
