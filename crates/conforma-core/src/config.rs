//! # Batch Validation Configuration
//!
//! One [`ValidationConfiguration`] governs one batch run: which profiles
//! to check, the pass-rate gate, the fatal-issue budget, and the
//! concurrency ceiling. Immutable for the duration of a batch.

use serde::{Deserialize, Serialize};

/// Configuration for a batch validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfiguration {
    /// Profile identifiers every resource is validated against.
    pub profiles: Vec<String>,
    /// Minimum pass rate (percent, 0–100) for the batch to succeed.
    pub min_pass_rate: f64,
    /// Maximum number of `Fatal` issues tolerated across the batch.
    pub max_fatal_errors: usize,
    /// Upper bound on concurrently-validated resources.
    pub max_concurrency: usize,
}

impl Default for ValidationConfiguration {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            min_pass_rate: 100.0,
            max_fatal_errors: 0,
            max_concurrency: default_concurrency(),
        }
    }
}

impl ValidationConfiguration {
    /// Default configuration: no profiles, 100% pass rate required, zero
    /// fatal budget, concurrency = available parallelism.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile identifiers to validate against.
    pub fn with_profiles(mut self, profiles: Vec<String>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Set the minimum pass-rate threshold, clamped to 0–100.
    pub fn with_min_pass_rate(mut self, percent: f64) -> Self {
        self.min_pass_rate = percent.clamp(0.0, 100.0);
        self
    }

    /// Set the fatal-issue budget.
    pub fn with_max_fatal_errors(mut self, max: usize) -> Self {
        self.max_fatal_errors = max;
        self
    }

    /// Set the concurrency ceiling (values below 1 are raised to 1).
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }
}

/// Available parallelism, falling back to 1 where the platform cannot say.
fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
