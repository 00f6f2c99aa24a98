//! Bounded retry for registry calls
//!
//! Every remote call is wrapped in [`RetryPolicy::run`]. Any error returned by
//! the call is retried; once attempts run out the last error is returned as-is.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default attempts per call
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Retry schedule: attempt count plus exponential backoff between attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failure
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each further failure
    pub backoff_factor: f64,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            initial_delay: Duration::from_secs(60),
            backoff_factor: 1.5,
            max_delay: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            backoff_factor: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the `failed_attempt`-th failure (1-based)
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exponent = i32::try_from(failed_attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(scaled)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `call` until it succeeds or attempts are exhausted.
    ///
    /// `operation` names the call in logs.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            debug!(operation, attempt, "calling registry");
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %err,
                        "registry call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(operation, attempts, error = %err, "registry call failed, giving up");
                    return Err(err);
                }
            }
        }
    }
}
