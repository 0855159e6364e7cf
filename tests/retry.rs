//! Retry Policy Integration Tests
//!
//! Drives `RetryPolicy::execute` with injected failing and succeeding
//! operations on a paused tokio clock, so backoff timing is exact.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::Result;
use textlens::core::RetryPolicy;

fn policy(max_attempts: u32, multiplier: f64, min: f64, max: f64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_multiplier: multiplier,
        min_wait_seconds: min,
        max_wait_seconds: max,
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_sleeps_nothing() {
    let policy = policy(3, 1.0, 0.0, 60.0);
    let started = tokio::time::Instant::now();

    let result: Result<&str> = policy.execute(|_| async { Ok("done") }).await;

    assert_eq!(result.unwrap(), "done");
    assert!(started.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_fails_twice_then_succeeds_with_backoff() {
    let policy = policy(3, 1.0, 0.0, 60.0);
    let attempts = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<u32> = policy
        .execute(|attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    anyhow::bail!("not yet");
                }
                Ok(attempt)
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // Backoff sleeps before the two retries: 1s then 2s
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_propagates_last_error_unchanged() {
    let policy = policy(2, 1.0, 1.0, 60.0);
    let attempts = AtomicU32::new(0);

    let result: Result<()> = policy
        .execute(|attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { anyhow::bail!("backend down on attempt {}", attempt) }
        })
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "backend down on attempt 2");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_fails_immediately() {
    let policy = policy(1, 1.0, 1.0, 60.0);
    let attempts = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<()> = policy
        .execute(|_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { anyhow::bail!("boom") }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_delays_clamped_to_ceiling_during_execution() {
    // 10 * 2^k would explode; every delay is capped at 5s
    let policy = policy(3, 10.0, 0.0, 5.0);
    let started = tokio::time::Instant::now();

    let result: Result<()> = policy.execute(|_| async { anyhow::bail!("nope") }).await;

    assert!(result.is_err());
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert!(started.elapsed() < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_zero_min_wait_allows_zero_delay() {
    let policy = policy(3, 0.0, 0.0, 10.0);
    let started = tokio::time::Instant::now();

    let result: Result<()> = policy.execute(|_| async { anyhow::bail!("nope") }).await;

    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_millis(1));
}

#[test]
fn test_backoff_formula() {
    let policy = policy(10, 0.5, 1.0, 8.0);

    // 0.5 * 2^(k-1), clamped to [1, 8]
    assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1)); // 0.5 floored
    assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(1)); // 1.0
    assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(2));
    assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(4));
    assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(8));
    assert_eq!(policy.delay_for_attempt(6), Duration::from_secs(8)); // Capped
}
