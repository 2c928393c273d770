//! # Retry and Time Bounds
//!
//! ```text
//! attempt 1 ──► TransientConflict ──► sleep ~25ms ──► attempt 2 ──► ...
//!     │                                                   │
//!     └── any other error: returned as-is                 └── Ok: returned
//!
//! each attempt = timeout(limit, BEGIN → work → COMMIT)
//! ```
//!
//! A dropped attempt future drops its `Transaction`, which rolls back.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{LedgerError, LedgerResult};
use crate::config::RetrySettings;

/// Bounded exponential retry of serialization conflicts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        RetryPolicy {
            max_attempts: settings.max_attempts.max(1),
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Runs `attempt` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` is reached.
    ///
    /// Each call to `attempt` must start a fresh transaction.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> LedgerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let mut backoff = self.create_backoff();
        backoff.reset();

        let mut attempt_no = 1;
        loop {
            match attempt().await {
                Ok(value) => {
                    if attempt_no > 1 {
                        debug!(operation, attempt = attempt_no, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt_no < self.max_attempts => {
                    let wait = backoff.next_backoff().unwrap_or(self.max_backoff);
                    warn!(
                        operation,
                        attempt = attempt_no,
                        max_attempts = self.max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Serialization conflict, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt_no += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(operation, attempts = attempt_no, error = %e, "Retries exhausted");
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// Runs `work` under a time bound. On expiry the future is dropped and a
/// `Timeout` error is returned.
pub async fn bounded<T, Fut>(operation: &str, limit: Duration, work: Fut) -> LedgerResult<T>
where
    Fut: Future<Output = LedgerResult<T>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, limit_ms = limit.as_millis() as u64, "Transaction timed out");
            Err(LedgerError::Timeout {
                operation: operation.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::from(&RetrySettings {
            max_attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        })
    }

    fn conflict() -> LedgerError {
        LedgerError::TransientConflict {
            message: "database is locked".into(),
        }
    }

    #[tokio::test]
    async fn test_retries_conflicts_until_success() {
        let calls = &AtomicU32::new(0);
        let result = fast(3)
            .run("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(conflict())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: LedgerResult<()> = fast(2)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(conflict())
            })
            .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_business_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: LedgerResult<()> = fast(5)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LedgerError::not_found("Lot", "x"))
            })
            .await;

        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: LedgerResult<()> = bounded("slow", Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(LedgerError::Timeout { .. })));
        assert!(!result.unwrap_err().is_retryable());
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::from(&RetrySettings {
            max_attempts: 0,
            ..Default::default()
        });
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
    }
}
