//! # File I/O Retry Policy
//!
//! Exponential-backoff retry for the read step of directory-mode batches.
//! Transient failures (locking, permission races, interrupted reads) are
//! retried; failures that cannot heal on their own (missing file,
//! malformed content) surface immediately.

use std::future::Future;
use std::io;
use std::time::Duration;

/// Retry policy for a single file read.
///
/// Defaults match the batch contract: up to 3 retries with delays of
/// 100ms, 200ms, 400ms before the final attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retry attempts after the initial one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// Whether an I/O failure is worth retrying. Missing files and malformed
/// content will not heal between attempts.
fn is_transient(e: &io::Error) -> bool {
    !matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput
    )
}

impl RetryPolicy {
    /// Run `op` with backoff, returning the first success or the error of
    /// the final attempt.
    pub async fn run<T, F, Fut>(&self, name: &str, op: F) -> io::Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = io::Result<T>>,
    {
        for attempt in 0..self.max_retries {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if is_transient(&e) => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    tracing::warn!(
                        resource = %name,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "file read failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
        // Final attempt, no more retries.
        op().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn exhausts_all_attempts_on_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: io::Result<()> = fast_policy()
            .run("t", || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(io::Error::new(io::ErrorKind::WouldBlock, "locked"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4, "3 retries plus final attempt");
    }

    #[tokio::test]
    async fn non_transient_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: io::Result<()> = fast_policy()
            .run("t", || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_once_the_failure_clears() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = fast_policy()
            .run("t", || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(io::Error::new(io::ErrorKind::WouldBlock, "locked"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
