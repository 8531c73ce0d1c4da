//! Retry-with-backoff helper shared by the CLI broker, the input queue,
//! and the LLM router's fallback chain.
//!
//! The delay schedule is linear (`base`, `2*base`, `3*base`, ...) rather
//! than geometric, matching the "1s, 2s, 3s" schedule named for the input
//! queue; callers that want classic exponential backoff can still get it
//! by doubling `base` themselves between attempts, but no component in
//! this workspace currently needs that.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Describes how many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Delay before the first retry; each subsequent retry waits one more
    /// multiple of this (2nd retry waits `2 * base`, and so on).
    pub base: Duration,
    /// Number of retries after the initial attempt. `0` means try once.
    pub max_retries: u32,
}

impl BackoffPolicy {
    /// The broker/input-queue default: 1s base, 2 retries (1s, then 2s).
    #[must_use]
    pub fn default_broker() -> Self {
        Self {
            base: Duration::from_secs(1),
            max_retries: 2,
        }
    }

    fn delay_for(self, retry_attempt: u32) -> Duration {
        self.base * (retry_attempt + 1)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::default_broker()
    }
}

/// Run `op`, retrying on `Err` according to `policy`.
///
/// `op` is invoked once, then up to `policy.max_retries` more times,
/// sleeping `policy.delay_for(attempt)` between attempts. The error from
/// the final attempt is returned if every attempt fails. Each retry is
/// logged at `warn` level with the attempt number, matching the
/// never-silently-swallow discipline used throughout this workspace.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: BackoffPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(attempt, ?delay, %err, "retrying after failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(flavor = "multi_thread")]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let calls = AtomicU32::new(0);
        let policy = BackoffPolicy {
            base: Duration::from_millis(1),
            max_retries: 2,
        };
        let result: Result<u32, &'static str> = retry_with_backoff(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(7) }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn retries_up_to_max_then_returns_last_error() {
        let calls = AtomicU32::new(0);
        let policy = BackoffPolicy {
            base: Duration::from_millis(1),
            max_retries: 2,
        };
        let result: Result<u32, &'static str> = retry_with_backoff(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom") }
        })
        .await;
        assert_eq!(result, Err("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn recovers_on_a_later_attempt() {
        let calls = AtomicU32::new(0);
        let policy = BackoffPolicy {
            base: Duration::from_millis(1),
            max_retries: 2,
        };
        let result: Result<u32, &'static str> = retry_with_backoff(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 1 { Err("boom") } else { Ok(42) } }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
