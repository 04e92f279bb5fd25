#![forbid(unsafe_code)]

//! Refresh-callback driver.
//!
//! [`FrameDriver`] pairs a [`Stage`] with a [`FrameScheduler`] and keeps the
//! last [`FrameReport`]. Browser bindings share it through a `RefCell`;
//! [`drive`] steps it and releases the borrow before notifying the page, so a
//! frame callback may call straight back into the engine.

use std::cell::RefCell;

use sitefx_runtime::audio::AudioSink;
use sitefx_runtime::scheduler::{FrameScheduler, VsyncScheduler};

use crate::report::FrameReport;
use crate::stage::{Stage, SurfaceProvider};

/// Outcome of one [`FrameDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// A frame was stepped.
    Fresh(FrameReport),
    /// Nothing was due; the previous report, if any.
    Unchanged(Option<FrameReport>),
}

/// A stage stepped from host refresh callbacks.
#[derive(Debug)]
pub struct FrameDriver<P: SurfaceProvider, A: AudioSink, S: FrameScheduler = VsyncScheduler> {
    stage: Stage<P, A>,
    scheduler: S,
    last: Option<FrameReport>,
}

impl<P: SurfaceProvider, A: AudioSink, S: FrameScheduler> FrameDriver<P, A, S> {
    #[must_use]
    pub fn new(stage: Stage<P, A>, scheduler: S) -> Self {
        Self {
            stage,
            scheduler,
            last: None,
        }
    }

    /// Set the clock to `now_ms` and step if the scheduler has a frame due.
    /// The scheduler starts on the first tick.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        self.stage.set_time_millis(now_ms);
        let now = self.stage.now();
        if !self.scheduler.is_running() {
            self.scheduler.start(now);
        }
        if self.scheduler.poll(now) == 0 {
            return Tick::Unchanged(self.last);
        }
        let report = FrameReport::from_step(&self.stage.step());
        self.last = Some(report);
        Tick::Fresh(report)
    }

    /// Stop scheduling until the next tick.
    pub fn pause(&mut self) {
        self.scheduler.stop();
    }

    /// Report from the most recent stepped frame.
    #[must_use]
    pub const fn last(&self) -> Option<FrameReport> {
        self.last
    }

    #[must_use]
    pub const fn stage(&self) -> &Stage<P, A> {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage<P, A> {
        &mut self.stage
    }
}

/// Tick `driver` and hand a fresh report to `notify` after the borrow ends.
///
/// A call made while the driver is already borrowed skips the frame and
/// returns `None`.
pub fn drive<P, A, S, F>(
    driver: &RefCell<FrameDriver<P, A, S>>,
    now_ms: f64,
    notify: F,
) -> Option<FrameReport>
where
    P: SurfaceProvider,
    A: AudioSink,
    S: FrameScheduler,
    F: FnOnce(&FrameReport),
{
    let tick = match driver.try_borrow_mut() {
        Ok(mut guard) => guard.tick(now_ms),
        Err(_) => {
            tracing::debug!("frame skipped; driver busy");
            return None;
        }
    };
    match tick {
        Tick::Fresh(report) => {
            notify(&report);
            Some(report)
        }
        Tick::Unchanged(last) => last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitefx_core::event::{Event, KeyEvent};
    use sitefx_runtime::audio::SilentSink;
    use sitefx_runtime::mode::Mode;

    use crate::stage::{RasterProvider, StageConfig};

    type TestDriver = FrameDriver<RasterProvider, SilentSink>;

    fn driver() -> RefCell<TestDriver> {
        let mut stage = Stage::new(StageConfig::default(), RasterProvider, SilentSink);
        stage.resize(32, 32);
        RefCell::new(FrameDriver::new(stage, VsyncScheduler::new()))
    }

    #[test]
    fn repeated_timestamp_reuses_last_report() {
        let driver = driver();
        let first = drive(&driver, 16.0, |_| {}).map(|r| r.frame);
        let mut notified = false;
        let again = drive(&driver, 16.0, |_| notified = true).map(|r| r.frame);
        assert_eq!(first, Some(1));
        assert_eq!(again, first);
        assert!(!notified);
    }

    #[test]
    fn callback_can_reenter_the_driver() {
        let driver = driver();
        let mut seen_mode = None;
        drive(&driver, 16.0, |report| {
            // Reads and writes from inside the callback.
            seen_mode = Some(driver.borrow().stage().mode());
            let mut guard = driver.borrow_mut();
            for key in ["m", "a", "t", "r", "i", "x"] {
                guard.stage_mut().push_event(Event::Key(KeyEvent::from_dom_key(key)));
            }
            guard.pause();
            assert_eq!(report.mode, "normal");
        });
        assert_eq!(seen_mode, Some(Mode::Normal));

        let report = drive(&driver, 32.0, |_| {});
        assert_eq!(report.map(|r| r.mode), Some("matrix"));
    }

    #[test]
    fn nested_drive_skips_instead_of_panicking() {
        let driver = driver();
        let guard = driver.borrow_mut();
        assert_eq!(drive(&driver, 16.0, |_| {}), None);
        drop(guard);
        assert!(drive(&driver, 16.0, |_| {}).is_some());
    }
}
