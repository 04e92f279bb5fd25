#![forbid(unsafe_code)]

//! Host-driven monotonic clock.

use std::time::Duration;

/// Source of monotonic time since engine start.
pub trait MonotonicClock {
    /// Current monotonic time.
    fn now_mono(&self) -> Duration;
}

/// Deterministic clock advanced explicitly by the host.
///
/// Browser hosts set it from the `requestAnimationFrame` timestamp; tests
/// advance it by fixed steps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time. Earlier values are ignored so time never
    /// runs backwards.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Set current time from a host timestamp in milliseconds.
    ///
    /// Negative and non-finite values are ignored.
    pub fn set_millis(&mut self, now_ms: f64) {
        if let Some(now) = millis_to_duration(now_ms) {
            self.set(now);
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl MonotonicClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Convert a host timestamp in milliseconds. `None` for NaN, infinities,
/// and negative values.
#[must_use]
pub fn millis_to_duration(ms: f64) -> Option<Duration> {
    (ms.is_finite() && ms >= 0.0).then(|| Duration::from_secs_f64(ms / 1000.0))
}
