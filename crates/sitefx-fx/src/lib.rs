#![forbid(unsafe_code)]

//! Field renderers and the pointer overlay.
//!
//! Every full-viewport effect implements [`FieldFx`] and paints through the
//! [`Canvas`] seam. Effects read the current [`ModeSignal`] from
//! [`FxContext`] and never write mode state.
//!
//! Invariants:
//! - A zero-area canvas is a no-op, never a panic.
//! - Effects keep their state across frames; only `resize` reallocates.

pub mod pointer;
pub mod rain;
pub mod wave;

use sitefx_core::geometry::Size;
use sitefx_render::Canvas;
use sitefx_runtime::mode::ModeSignal;

pub use pointer::{Blur, OverlayFrame, OverlayVisual, PointerConfig, PointerOverlay, PointerState};
pub use rain::{RainConfig, RainField, RainState};
pub use wave::{WaveConfig, WaveField, WavePalette, WavePoint};

/// Per-frame inputs shared by every effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FxContext {
    /// Frames rendered so far by the host loop.
    pub frame: u64,
    /// Current mode snapshot.
    pub signal: ModeSignal,
}

impl FxContext {
    /// Context for `frame` under `signal`.
    #[must_use]
    pub const fn new(frame: u64, signal: ModeSignal) -> Self {
        Self { frame, signal }
    }
}

/// Full-viewport animated effect.
pub trait FieldFx {
    /// Human-readable name (used for logs).
    fn name(&self) -> &'static str;

    /// Viewport changed. Called before the first render after a resize.
    fn resize(&mut self, size: Size);

    /// Advance one tick and paint into `canvas`.
    fn render(&mut self, ctx: FxContext, canvas: &mut dyn Canvas);
}

/// Deterministic xorshift32 PRNG.
#[inline]
pub(crate) fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Uniform draw in `[0, 1)`.
#[inline]
pub(crate) fn unit(state: &mut u32) -> f64 {
    f64::from(xorshift32(state)) / (f64::from(u32::MAX) + 1.0)
}
