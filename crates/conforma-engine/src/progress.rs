//! # Progress Observation
//!
//! After each item completes, the orchestrator emits a
//! [`BatchValidationProgress`] snapshot to a [`ProgressObserver`].
//! Emission is best-effort: observers must return quickly and must not
//! assume any ordering across concurrently-completing items beyond the
//! monotonic `completed` counter.

use conforma_core::BatchValidationProgress;

/// Receives progress snapshots during a batch run.
pub trait ProgressObserver: Send + Sync {
    /// Called after each item completes. Must not block.
    fn on_progress(&self, progress: &BatchValidationProgress);
}

/// Observer that discards all snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _progress: &BatchValidationProgress) {}
}

/// Observer that logs each snapshot at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, progress: &BatchValidationProgress) {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            current = %progress.current,
            stage = %progress.stage,
            "batch progress"
        );
    }
}
