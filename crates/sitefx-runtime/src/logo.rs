#![forbid(unsafe_code)]

//! Rapid-click counter for the site logo.
//!
//! Counts clicks whose gaps stay under [`LogoConfig::max_gap`]. Reaching
//! [`LogoConfig::clicks`] reports a trigger and resets the count whether or
//! not the caller ends up activating a mode.

use std::time::Duration;

/// Logo trigger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoConfig {
    /// Clicks required (default: 7).
    pub clicks: u32,
    /// A gap of at least this long restarts the count (default: 1500ms).
    pub max_gap: Duration,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            clicks: 7,
            max_gap: Duration::from_millis(1500),
        }
    }
}

/// Counts rapid logo clicks.
#[derive(Debug, Clone, Default)]
pub struct LogoClickCounter {
    config: LogoConfig,
    count: u32,
    last_click: Option<Duration>,
}

impl LogoClickCounter {
    /// Create a counter.
    #[must_use]
    pub fn new(config: LogoConfig) -> Self {
        Self {
            config,
            count: 0,
            last_click: None,
        }
    }

    /// Register a click at `now`. Returns `true` when this click completes
    /// the run.
    pub fn click(&mut self, now: Duration) -> bool {
        self.check_timeout(now);

        self.count += 1;
        self.last_click = Some(now);
        if self.count >= self.config.clicks.max(1) {
            tracing::debug!(clicks = self.count, "logo click run completed");
            self.reset();
            return true;
        }
        false
    }

    /// Drop a stale run. Returns `true` if a partial run was discarded.
    pub fn check_timeout(&mut self, now: Duration) -> bool {
        match self.last_click {
            Some(last) if now.saturating_sub(last) >= self.config.max_gap => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Clicks in the current run.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Discard the current run.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn seven_quick_clicks_trigger() {
        let mut counter = LogoClickCounter::default();
        let results: Vec<bool> = (0..7).map(|i| counter.click(ms(i * 200))).collect();
        assert_eq!(results, vec![false, false, false, false, false, false, true]);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn gap_at_limit_restarts() {
        let mut counter = LogoClickCounter::default();
        for i in 0..6 {
            counter.click(ms(i * 100));
        }
        assert_eq!(counter.count(), 6);

        // Last click at 500ms; 1500ms later counts as a fresh first click.
        assert!(!counter.click(ms(2000)));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn gap_just_under_limit_continues() {
        let mut counter = LogoClickCounter::default();
        let mut t = 0;
        for _ in 0..6 {
            assert!(!counter.click(ms(t)));
            t += 1499;
        }
        assert!(counter.click(ms(t)));
    }

    #[test]
    fn fourteen_clicks_trigger_twice() {
        let mut counter = LogoClickCounter::default();
        let triggers = (0..14).filter(|i| counter.click(ms(i * 100))).count();
        assert_eq!(triggers, 2);
    }

    #[test]
    fn check_timeout_discards_partial_run() {
        let mut counter = LogoClickCounter::default();
        counter.click(ms(0));
        counter.click(ms(100));
        assert!(!counter.check_timeout(ms(1599)));
        assert!(counter.check_timeout(ms(1600)));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn custom_click_count() {
        let mut counter = LogoClickCounter::new(LogoConfig {
            clicks: 3,
            ..Default::default()
        });
        assert!(!counter.click(ms(0)));
        assert!(!counter.click(ms(10)));
        assert!(counter.click(ms(20)));
    }
}
