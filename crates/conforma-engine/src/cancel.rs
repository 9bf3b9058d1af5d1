//! # Cooperative Cancellation
//!
//! A [`CancelToken`] threads one cancellation signal through directory
//! enumeration, per-item processing, and the fan-in join. Cancellation is
//! cooperative: once raised, no new work is scheduled, in-flight items may
//! finish or unwind, and the orchestrator surfaces
//! `BatchError::Cancelled` instead of a truncated report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Clonable cancellation handle. All clones observe the same signal.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Idempotent; wakes every waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Whether the signal has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Suspend until the signal is raised. Returns immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.inner.notify.notified();
            // Re-check after registering: cancel() may have fired between
            // the flag check and registration.
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
