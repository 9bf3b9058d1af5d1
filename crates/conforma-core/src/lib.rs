//! # conforma-core — Foundational Types for the Conforma Stack
//!
//! This crate is the bedrock of the Conforma clinical conformance stack.
//! It defines the data model shared by the validation engine, the report
//! generators, and the CLI. Every other crate in the workspace depends on
//! `conforma-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Results are values, not channels.** A [`ValidationResult`] is built
//!    exactly once by the validator and never mutated afterwards. Per-item
//!    failures are folded into the result as a single `Fatal` issue rather
//!    than propagated as errors, so one malformed document can never abort
//!    a batch that processes many.
//!
//! 2. **Four ordered severities.** `Information < Warning < Error < Fatal`.
//!    A result is valid iff it carries no issue at `Error` or above.
//!
//! 3. **Deterministic reports.** A finalized [`BatchValidationReport`]
//!    lists results sorted by resource name, independent of the
//!    non-deterministic completion order during concurrent processing.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `conforma-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod config;
pub mod error;
pub mod issue;
pub mod report;
pub mod result;

// Re-export primary types for ergonomic imports.
pub use config::ValidationConfiguration;
pub use error::{BatchError, ConformaError, EngineError, ParseError, ReportError};
pub use issue::{codes, Severity, ValidationIssue};
pub use report::{
    BatchValidationProgress, BatchValidationReport, ValidationPerformanceMetrics,
    ValidationSummary,
};
pub use result::ValidationResult;
