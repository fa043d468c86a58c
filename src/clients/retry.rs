//! Bounded exponential-backoff retry.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry a failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 count as 1.
    pub max_retries: u32,
    /// Sleep after the first failure; doubles after each further failure.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Sleep after failed attempt `attempt` (0-indexed): `base_delay * 2^attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2_u32
            .checked_pow(attempt)
            .map_or(Duration::MAX, |factor| self.base_delay.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `operation` until it succeeds or `policy.max_retries` attempts
/// have failed.
///
/// Backoff is applied between failures only: no sleep before the first
/// attempt nor after the last. Every error is retried the same way; an
/// operation that wants to short-circuit must return `Ok`.
///
/// # Errors
///
/// Returns the error of the last attempt.
pub async fn with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_retries.max(1);
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt.saturating_add(1) >= max_attempts => return Err(error),
            Err(error) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
