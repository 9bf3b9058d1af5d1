//! # conforma-engine — Validation Engine for the Conforma Stack
//!
//! Wraps two swappable capabilities — a [`ResourceParser`] and a
//! [`ConformanceEngine`] — into a single-resource validator with a strict
//! failure-isolation contract, and drives that validator over many
//! resources with bounded concurrency, retryable file I/O, progress
//! reporting, and cooperative cancellation.
//!
//! ## Architecture
//!
//! ```text
//! caller ── BatchValidator ──┬── ResourceValidator ── ResourceParser
//!                            │         │
//!                            │         └── ConformanceEngine
//!                            ├── RetryPolicy (file reads)
//!                            ├── CancelToken (cooperative)
//!                            └── aggregate() ── summary + metrics
//! ```
//!
//! Per-item failures never cross the validator boundary as errors: a parse
//! failure, engine failure, or exhausted file read becomes a single
//! `Fatal` issue inside that item's own `ValidationResult`. The only
//! outcomes a batch caller must handle are a finalized report, a
//! precondition failure, or cancellation.

pub mod aggregate;
pub mod batch;
pub mod cancel;
pub mod engine;
pub mod parser;
pub mod progress;
pub mod retry;
pub mod validator;

pub use aggregate::aggregate;
pub use batch::BatchValidator;
pub use cancel::CancelToken;
pub use engine::{
    map_severity, ConformanceEngine, EngineFinding, EngineSeverity, SchemaConformanceEngine,
};
pub use parser::{ClinicalResourceParser, ParsedResource, ResourceParser};
pub use progress::{NoopObserver, ProgressObserver, TracingObserver};
pub use retry::RetryPolicy;
pub use validator::ResourceValidator;
