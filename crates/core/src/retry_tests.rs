// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[derive(Debug)]
struct FakeError {
    class: ErrorClass,
}

impl std::fmt::Display for FakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fake error ({:?})", self.class)
    }
}

impl Classify for FakeError {
    fn class(&self) -> ErrorClass {
        self.class
    }
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(1), 2.0, Duration::from_millis(5))
}

#[tokio::test(start_paused = true)]
async fn succeeds_without_retry_when_operation_succeeds_first_try() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry_with_backoff(&fast_policy(3), "op", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(42) }
    })
    .await;
    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn permanent_error_causes_exactly_one_attempt() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry_with_backoff(&fast_policy(5), "op", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(FakeError { class: ErrorClass::Permanent }) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_error_causes_max_retries_plus_one_attempts() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry_with_backoff(&fast_policy(3), "op", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(FakeError { class: ErrorClass::Transient }) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_transient_failures_below_the_limit() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, FakeError> = retry_with_backoff(&fast_policy(5), "op", || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(FakeError { class: ErrorClass::Transient })
            } else {
                Ok(7)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 7);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn delay_for_is_capped_at_max_delay_plus_half_jitter() {
    let policy = RetryPolicy::new(10, Duration::from_millis(100), 2.0, Duration::from_millis(300));
    for attempt in 0..10 {
        let d = policy.delay_for(attempt);
        assert!(d.as_secs_f64() <= 300.0 / 1000.0 * 1.5 + 0.001);
    }
}
