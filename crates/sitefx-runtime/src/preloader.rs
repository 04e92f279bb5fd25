#![forbid(unsafe_code)]

//! Start-up loading gate.

use std::time::Duration;

/// Reports `loading` for a fixed period after the engine starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloaderGate {
    duration: Duration,
    started_at: Option<Duration>,
    done: bool,
}

impl Default for PreloaderGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(2500))
    }
}

impl PreloaderGate {
    /// Create a gate that stays closed for `duration` after `start`.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: None,
            done: false,
        }
    }

    /// Start the gate. Later calls are ignored.
    pub fn start(&mut self, now: Duration) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Update at `now`. Returns `true` on the step where loading finishes.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.done {
            return false;
        }
        match self.started_at {
            Some(start) if now.saturating_sub(start) >= self.duration => {
                self.done = true;
                tracing::debug!("preloader finished");
                true
            }
            _ => false,
        }
    }

    /// Whether the content layer should still show the preloader.
    ///
    /// A gate that was never started counts as loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        !self.done
    }
}
