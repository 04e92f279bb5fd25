#![forbid(unsafe_code)]

//! Frame scheduling.
//!
//! A field renderer ticks when its [`FrameScheduler`] says a frame is due.
//! The host calls [`FrameScheduler::poll`] from its refresh callback (or a
//! test loop) with the current monotonic time.
//!
//! - [`VsyncScheduler`]: one tick per distinct host refresh, like a
//!   `requestAnimationFrame` loop.
//! - [`IntervalScheduler`]: fixed period with bounded catch-up, so a stalled
//!   tab does not replay hundreds of frames on resume.

use std::time::Duration;

/// Decides how many frames are due.
pub trait FrameScheduler {
    /// Begin scheduling at `now`. Restarting a running scheduler keeps its
    /// phase.
    fn start(&mut self, now: Duration);

    /// Stop scheduling. `poll` returns 0 until the next `start`.
    fn stop(&mut self);

    /// Whether the scheduler is running.
    fn is_running(&self) -> bool;

    /// Number of ticks due at `now`.
    fn poll(&mut self, now: Duration) -> u32;
}

/// One tick per host refresh.
#[derive(Debug, Clone, Default)]
pub struct VsyncScheduler {
    running: bool,
    last: Option<Duration>,
}

impl VsyncScheduler {
    /// Create a stopped scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameScheduler for VsyncScheduler {
    fn start(&mut self, _now: Duration) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
        self.last = None;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn poll(&mut self, now: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        // Repeated timestamps come from duplicate callbacks in one refresh.
        if self.last.is_some_and(|last| now <= last) {
            return 0;
        }
        self.last = Some(now);
        1
    }
}

/// Fixed-period ticks with bounded catch-up.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    max_catch_up: u32,
    next_due: Option<Duration>,
}

impl IntervalScheduler {
    /// Default catch-up bound.
    pub const DEFAULT_MAX_CATCH_UP: u32 = 4;

    /// Create a stopped scheduler. A zero interval is raised to 1ms.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            max_catch_up: Self::DEFAULT_MAX_CATCH_UP,
            next_due: None,
        }
    }

    /// Limit ticks reported by one `poll` (minimum 1).
    #[must_use]
    pub fn with_max_catch_up(mut self, max: u32) -> Self {
        self.max_catch_up = max.max(1);
        self
    }

    /// Configured period.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for IntervalScheduler {
    fn start(&mut self, now: Duration) {
        if self.next_due.is_none() {
            self.next_due = Some(now);
        }
    }

    fn stop(&mut self) {
        self.next_due = None;
    }

    fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    fn poll(&mut self, now: Duration) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut ticks = 0;
        while due <= now && ticks < self.max_catch_up {
            ticks += 1;
            due = due.saturating_add(self.interval);
        }
        if due <= now {
            // Drop the backlog; resume on the next period boundary after now.
            let behind = now.saturating_sub(due).as_nanos() / self.interval.as_nanos();
            let skip = u32::try_from(behind + 1).unwrap_or(u32::MAX);
            due = due.saturating_add(self.interval.saturating_mul(skip));
            tracing::trace!(skipped = skip, "interval scheduler dropped backlog");
        }
        self.next_due = Some(due);
        ticks
    }
}
