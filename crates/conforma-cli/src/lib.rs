//! # conforma-cli — Command-Line Surface
//!
//! Subcommand argument types and handlers for the `conforma` binary.
//! The binary in `main.rs` assembles subcommands, initializes tracing,
//! and maps the CI verdict to the process exit code.

pub mod validate;
