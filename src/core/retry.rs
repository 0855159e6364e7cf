//! Retry policy with bounded-attempt exponential backoff.
//!
//! The policy wraps a single operation: attempt 1 runs immediately, each
//! failure sleeps an exponentially growing, clamped delay before the next
//! attempt, and the last error propagates unchanged once attempts are
//! exhausted. Retries may re-run side-effecting work; callers must pass
//! idempotent or side-effect-free operations.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

/// Bounded-attempt exponential backoff policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first try), at least 1
    pub max_attempts: u32,

    /// Base delay multiplier in seconds
    pub backoff_multiplier: f64,

    /// Floor on the backoff delay in seconds
    pub min_wait_seconds: f64,

    /// Ceiling on the backoff delay in seconds
    pub max_wait_seconds: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_multiplier: 1.0,
            min_wait_seconds: 1.0,
            max_wait_seconds: 10.0,
        }
    }
}

impl RetryPolicy {
    /// Calculate the backoff delay before retry `retry` (1-indexed):
    /// `clamp(multiplier * 2^(retry - 1), min_wait, max_wait)`.
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let exponential = self.backoff_multiplier * 2f64.powi(retry.saturating_sub(1) as i32);

        let clamped = exponential
            .min(self.max_wait_seconds)
            .max(self.min_wait_seconds)
            .max(0.0);

        Duration::from_secs_f64(clamped)
    }

    /// Check if another attempt is allowed after `attempt` attempts
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Drive an operation through the policy.
    ///
    /// The operation receives the 1-indexed attempt number and is invoked
    /// once per attempt. The backoff sleep uses the tokio clock, so tests
    /// can pause time.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !self.should_retry(attempt) {
                        return Err(e);
                    }

                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
