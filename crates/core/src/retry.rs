// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Exponential backoff with jitter, generic over any classified error.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{Classify, ErrorClass};

/// Tuning for one family of retryable operations (e.g. "catalog client calls"
/// vs "language-model calls" get their own policy with their own timing).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub exponential_base: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            exponential_base: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, exponential_base: f64, max_delay: Duration) -> Self {
        Self { max_retries, initial_delay, exponential_base, max_delay }
    }

    /// Delay before the attempt numbered `attempt` (0-based), including jitter.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.exponential_base.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());
        let jitter = rand::thread_rng().gen_range(0.0..=(capped * 0.5));
        Duration::from_secs_f64(capped + jitter)
    }
}

/// Runs `operation` until it succeeds, a permanent error surfaces, or
/// retries are exhausted. `operation_name` is used only for logging.
///
/// Mirrors the source implementation's cause-chain classification: any
/// error in `E`'s [`Classify::class`] impl that delegates to a wrapped
/// error's own classification keeps that classification regardless of how
/// deeply it is wrapped.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + std::fmt::Display,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => match err.class() {
                ErrorClass::Permanent => {
                    tracing::warn!(operation = operation_name, error = %err, "permanent error, not retrying");
                    return Err(err);
                }
                ErrorClass::Transient | ErrorClass::Structural => {
                    if attempt >= policy.max_retries {
                        tracing::warn!(
                            operation = operation_name,
                            attempt,
                            error = %err,
                            "retries exhausted"
                        );
                        return Err(err);
                    }
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
