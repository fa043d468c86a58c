//! Minimum-spacing limiter for outbound calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Enforces a fixed gap between consecutive permits.
///
/// Each [`RateLimiter::wait`] returns no earlier than `delay` after the
/// previous `wait` returned. The release instant is recorded when `wait`
/// completes, so time spent by the caller between permits counts toward
/// the gap. The lock is held across the sleep: concurrent callers queue
/// and the spacing holds for them too.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter. A zero `delay` never blocks.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_release: Mutex::new(None),
        }
    }

    /// Configured spacing between permits.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspends until the next permit is available.
    pub async fn wait(&self) {
        let mut last = self.last_release.lock().await;
        if let Some(prev) = *last
            && !self.delay.is_zero()
        {
            sleep_until(prev + self.delay).await;
        }
        *last = Some(Instant::now());
    }
}
