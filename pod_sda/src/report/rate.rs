//! Send-rate limiting on the injected clock.

use std::time::Duration;

/// Permits one send per `1/rate` seconds.
///
/// The first call is always permitted. `mark` is called only after a
/// successful send, so a failed send is retried on the next cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiter {
    period: Duration,
    last: Option<Duration>,
}

impl RateLimiter {
    /// `rate_hz` must be positive (checked by config validation).
    pub fn from_hz(rate_hz: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / rate_hz),
            last: None,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// True when at least one period has elapsed since the last send.
    #[inline]
    pub fn ready(&self, now: Duration) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.period,
        }
    }

    /// Record a successful send at `now`.
    #[inline]
    pub fn mark(&mut self, now: Duration) {
        self.last = Some(now);
    }
}
