//! # Bounded Retry
//!
//! Retries a fallible async operation with linearly increasing backoff:
//! attempt `n` that fails waits `n × base_delay` before attempt `n + 1`.
//! Nothing waits after the final attempt.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::domain::{DEFAULT_BASE_DELAY_SECS, DEFAULT_MAX_ATTEMPTS};

/// Retry policy: total attempts and backoff unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Backoff unit.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(DEFAULT_BASE_DELAY_SECS),
        }
    }
}

/// Every attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Attempts made.
    pub attempts: u32,
    /// Error of the final attempt.
    pub last_error: E,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `op` until it succeeds or the attempts run out. `op` receives the
    /// 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(last_error) if attempt >= max_attempts => {
                    tracing::error!(
                        "[wa-03] giving up after {} attempts: {}",
                        attempt,
                        last_error
                    );
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error,
                    });
                }
                Err(e) => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        "[wa-03] attempt {}/{} failed: {}; retrying in {}s",
                        attempt,
                        max_attempts,
                        e,
                        delay.as_secs()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
