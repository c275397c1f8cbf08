//! # Retry Scheduler
//!
//! Generic delayed-retry driver for asynchronous operations. The scheduler
//! is agnostic to what "failure" means for the wrapped operation: it reacts
//! only to the operation returning `Err`, never to any code carried inside
//! a successful value.
//!
//! Retry is an explicit opt-in for collaborators calling out to real
//! network endpoints; the core pipelines never retry on their own.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry parameters: attempt count, base delay and delay shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt. Zero means the
    /// operation runs exactly once.
    pub times: u32,
    /// Base delay between attempts.
    pub delay: Duration,
    /// Override for the wait after the initial attempt fails.
    pub first: Option<Duration>,
    /// Linearly scale the delay by the attempt number.
    pub increment: bool,
    /// Cap applied to incremented delays.
    pub max: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            times: 3,
            delay: Duration::from_millis(3000),
            first: None,
            increment: false,
            max: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(times: u32, delay: Duration) -> Self {
        Self {
            times,
            delay,
            ..Self::default()
        }
    }

    pub fn with_first(mut self, first: Duration) -> Self {
        self.first = Some(first);
        self
    }

    pub fn incremental(mut self, max: Option<Duration>) -> Self {
        self.increment = true;
        self.max = max;
        self
    }

    /// Wait before re-running after `attempt` has failed.
    fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.first.unwrap_or(self.delay);
        }
        if !self.increment {
            return self.delay;
        }
        let scaled = self.delay.saturating_mul(attempt);
        match self.max {
            Some(max) if scaled > max => max,
            _ => scaled,
        }
    }
}

/// Run `operation` until it succeeds or the retry budget is exhausted.
///
/// Attempt 0 runs immediately; each failed attempt `n < times` waits the
/// policy's backoff before re-running. The final failure is surfaced
/// unchanged. A zero backoff retries without suspension.
pub async fn with_retry<F, Fut, T, E>(
    trigger: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.times {
                    return Err(err);
                }
                let wait = policy.backoff(attempt);
                if wait.is_zero() {
                    debug!(trigger, attempt, "async retry");
                } else {
                    debug!(trigger, attempt, delay_ms = wait.as_millis() as u64, "async retry");
                    tokio::time::sleep(wait).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn exhausts_budget_then_surfaces_last_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(2, Duration::ZERO);

        let result: Result<(), &str> = with_retry("x", &policy, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("boom") }
        })
        .await;

        assert_eq!(result, Err("boom"));
        // 1 initial attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::default();

        let result: Result<u32, ()> = with_retry("x", &policy, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(7) }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_times_runs_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(0, Duration::ZERO);

        let result: Result<(), &str> = with_retry("x", &policy, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("boom") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<u32, &str> = with_retry("x", &policy, || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient")
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_uses_first_override_then_base_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(300))
            .with_first(Duration::from_millis(50));
        assert_eq!(policy.backoff(0), Duration::from_millis(50));
        assert_eq!(policy.backoff(1), Duration::from_millis(300));
        assert_eq!(policy.backoff(5), Duration::from_millis(300));
    }

    #[test]
    fn incremental_backoff_scales_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .incremental(Some(Duration::from_millis(250)));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(250));
        assert_eq!(policy.backoff(4), Duration::from_millis(250));
    }
}
