//! Read Retry Policy
//!
//! Idempotent reads are bounded by a per-attempt timeout and retried on
//! transient failures with a short, fixed backoff schedule. Writes never go
//! through this policy.

use std::{future::Future, time::Duration};

use smallvec::{SmallVec, smallvec};
use tracing::warn;

/// Default time allowed for a single attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that may succeed if the operation is simply tried again.
pub trait Transient {
    /// Whether a retry could succeed.
    fn is_transient(&self) -> bool;
}

impl Transient for sqlx::Error {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_) | Self::PoolTimedOut)
    }
}

/// Outcome of a read that did not succeed.
#[derive(Debug)]
pub enum ReadError<E> {
    /// Every attempt failed transiently or timed out.
    Unavailable,

    /// The operation failed in a way retrying cannot fix.
    Failed(E),
}

/// Timeout and backoff schedule for idempotent reads.
#[derive(Debug, Clone)]
pub struct ReadRetryPolicy {
    timeout: Duration,
    backoff: SmallVec<[Duration; 2]>,
}

impl Default for ReadRetryPolicy {
    /// 10 second attempts, retried after 500ms and then 1000ms.
    fn default() -> Self {
        Self {
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff: smallvec![Duration::from_millis(500), Duration::from_millis(1000)],
        }
    }
}

impl ReadRetryPolicy {
    /// A policy with a custom attempt timeout and backoff schedule.
    ///
    /// The number of retries equals the length of `backoff`.
    pub fn new(timeout: Duration, backoff: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            timeout,
            backoff: backoff.into_iter().collect(),
        }
    }

    /// A policy that tries exactly once.
    pub fn no_retries(timeout: Duration) -> Self {
        Self::new(timeout, [])
    }

    /// Maximum number of attempts this policy makes.
    pub fn max_attempts(&self) -> usize {
        self.backoff.len() + 1
    }

    /// Run `attempt` until it succeeds, fails permanently, or retries run out.
    ///
    /// # Errors
    ///
    /// - [`ReadError::Failed`]: the attempt returned a non-transient error.
    /// - [`ReadError::Unavailable`]: every attempt timed out or failed transiently.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, ReadError<E>>
    where
        E: Transient + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut delays = self.backoff.iter();
        let mut attempt_number = 1_usize;

        loop {
            match tokio::time::timeout(self.timeout, attempt()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) if error.is_transient() => {
                    warn!(operation, attempt = attempt_number, %error, "transient read failure");
                }
                Ok(Err(error)) => return Err(ReadError::Failed(error)),
                Err(_elapsed) => {
                    warn!(
                        operation,
                        attempt = attempt_number,
                        timeout = ?self.timeout,
                        "read attempt timed out"
                    );
                }
            }

            let Some(delay) = delays.next() else {
                return Err(ReadError::Unavailable);
            };

            tokio::time::sleep(*delay).await;
            attempt_number += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use testresult::TestResult;

    use super::*;

    fn quick_policy() -> ReadRetryPolicy {
        ReadRetryPolicy::new(Duration::from_millis(200), [Duration::ZERO, Duration::ZERO])
    }

    #[test]
    fn default_policy_matches_reference_schedule() {
        let policy = ReadRetryPolicy::default();

        assert_eq!(policy.timeout, Duration::from_secs(10));
        assert_eq!(
            policy.backoff.as_slice(),
            [Duration::from_millis(500), Duration::from_millis(1000)]
        );
        assert_eq!(policy.max_attempts(), 3);
    }

    #[tokio::test]
    async fn success_is_returned_without_retrying() -> TestResult {
        let calls = Arc::new(AtomicUsize::new(0));

        let value = quick_policy()
            .run("test", || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, sqlx::Error>(42)
                }
            })
            .await
            .map_err(|_error| "read failed")?;

        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() -> TestResult {
        let calls = Arc::new(AtomicUsize::new(0));

        let value = quick_policy()
            .run("test", || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(sqlx::Error::PoolTimedOut)
                    } else {
                        Ok("done")
                    }
                }
            })
            .await
            .map_err(|_error| "read failed")?;

        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_retries_report_unavailable() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result = quick_policy()
            .run("test", || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(sqlx::Error::Io(std::io::Error::other("connection reset")))
                }
            })
            .await;

        assert!(
            matches!(result, Err(ReadError::Unavailable)),
            "expected Unavailable, got {result:?}"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result = quick_policy()
            .run("test", || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(sqlx::Error::RowNotFound)
                }
            })
            .await;

        assert!(
            matches!(result, Err(ReadError::Failed(sqlx::Error::RowNotFound))),
            "expected Failed(RowNotFound), got {result:?}"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempts_time_out() {
        let policy = ReadRetryPolicy::new(Duration::from_millis(10), [Duration::ZERO]);

        let result = policy
            .run("test", || async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, sqlx::Error>(())
            })
            .await;

        assert!(
            matches!(result, Err(ReadError::Unavailable)),
            "expected Unavailable, got {result:?}"
        );
    }
}
