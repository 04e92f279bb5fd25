#![forbid(unsafe_code)]

//! Parametric dot-wave field.
//!
//! A fixed grid of dots (50×35 by default) spans the viewport. Each dot's
//! vertical offset is the sum of three travelling sinusoids, and its color,
//! opacity, and radius are pure functions of grid position, elapsed time,
//! and the active palette. Only `time` is stored between ticks.
//!
//! # Invariants
//!
//! - Opacity is always within [`OPACITY_MIN`, `OPACITY_MAX`].
//! - Radius is never below [`RADIUS_MIN`].
//! - Resizing changes the geometry only; `time` keeps running.

use std::f64::consts::PI;

use sitefx_core::geometry::Size;
use sitefx_render::color::hue_to_rgb;
use sitefx_render::{Canvas, PackedRgba};
use sitefx_runtime::mode::Mode;

use crate::{FieldFx, FxContext};

/// Lower opacity clamp.
pub const OPACITY_MIN: f64 = 0.03;
/// Upper opacity clamp.
pub const OPACITY_MAX: f64 = 0.6;
/// Smallest dot radius in pixels.
pub const RADIUS_MIN: f64 = 0.5;

const RADIUS_BASE: f64 = 1.5;
const RADIUS_VARIANCE: f64 = 0.7;
const NORMAL_RGB: (u8, u8, u8) = (120, 130, 160);

/// Wave field configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveConfig {
    /// Dots per row (default: 50, minimum 2).
    pub columns: u32,
    /// Dots per column (default: 35, minimum 2).
    pub rows: u32,
    /// Time added per tick (default: 0.015).
    pub time_step: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            columns: 50,
            rows: 35,
            time_step: 0.015,
        }
    }
}

/// Color scheme, chosen from the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WavePalette {
    /// Muted slate dots.
    #[default]
    Normal,
    /// Cycling hue (Celebratory and LogoTriggered).
    Festive,
    /// Green pulses.
    Matrix,
}

impl WavePalette {
    /// Palette for `mode`.
    #[must_use]
    pub const fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Normal => Self::Normal,
            Mode::Celebratory | Mode::LogoTriggered => Self::Festive,
            Mode::Matrix => Self::Matrix,
        }
    }
}

/// One derived dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub rgb: (u8, u8, u8),
    pub opacity: f64,
}

impl WavePoint {
    /// Fill color with opacity applied.
    #[must_use]
    pub fn color(&self) -> PackedRgba {
        let (r, g, b) = self.rgb;
        PackedRgba::rgb_alpha(r, g, b, self.opacity)
    }
}

/// Normalized grid coordinate `index / (count - 1)`.
#[inline]
fn normalized(index: u32, count: u32) -> f64 {
    let span = count.max(2) - 1;
    f64::from(index.min(span)) / f64::from(span)
}

/// Vertical displacement at `(u, v)` and time `t`.
#[must_use]
pub fn wave_offset(u: f64, v: f64, t: f64) -> f64 {
    let wave1 = (u * 5.0 + t + v * 2.5).sin() * 20.0;
    let wave2 = (u * 3.5 + v * 3.5 + t * 0.7).sin() * 15.0;
    let wave3 = (v * 4.5 + t * 1.2 - u * 2.5).cos() * 10.0;
    wave1 + wave2 + wave3
}

/// Slow shimmer shared by the Normal and Festive palettes, in `[0.1, 0.7]`.
#[must_use]
pub fn shimmer(u: f64, v: f64, t: f64) -> f64 {
    0.4 + (u * PI * 2.2 + t * 1.1 + v * PI * 1.2).sin() * 0.3
}

/// Clamped dot opacity.
#[must_use]
pub fn dot_opacity(u: f64, v: f64, t: f64, palette: WavePalette) -> f64 {
    let raw = match palette {
        WavePalette::Matrix => 0.1 + (u * 7.0 + v * 5.0 + t * 2.5).sin().max(0.0) * 0.25,
        WavePalette::Festive => 0.25 + shimmer(u, v, t) * 0.35,
        WavePalette::Normal => 0.08 + shimmer(u, v, t) * 0.18,
    };
    if raw.is_nan() {
        return OPACITY_MIN;
    }
    raw.clamp(OPACITY_MIN, OPACITY_MAX)
}

/// Dot color before opacity.
#[must_use]
pub fn dot_rgb(u: f64, v: f64, t: f64, palette: WavePalette) -> (u8, u8, u8) {
    match palette {
        WavePalette::Matrix => (0, 255, 0),
        WavePalette::Festive => hue_to_rgb(t * 30.0 + u * 180.0 + v * 90.0),
        WavePalette::Normal => NORMAL_RGB,
    }
}

/// Dot radius, floored at [`RADIUS_MIN`].
#[must_use]
pub fn dot_radius(u: f64, v: f64, t: f64) -> f64 {
    let r = RADIUS_BASE + (u * 10.0 + v * 5.0 + t * 1.5).sin() * RADIUS_VARIANCE;
    if r.is_nan() { RADIUS_MIN } else { r.max(RADIUS_MIN) }
}

/// Derive dot `(i, j)` of a `config` grid over `size` at time `t`.
#[must_use]
pub fn wave_point(
    i: u32,
    j: u32,
    config: &WaveConfig,
    size: Size,
    t: f64,
    palette: WavePalette,
) -> WavePoint {
    let u = normalized(i, config.columns);
    let v = normalized(j, config.rows);
    WavePoint {
        x: u * f64::from(size.width),
        y: v * f64::from(size.height) + wave_offset(u, v, t),
        radius: dot_radius(u, v, t),
        rgb: dot_rgb(u, v, t, palette),
        opacity: dot_opacity(u, v, t, palette),
    }
}

/// Animated dot grid.
#[derive(Debug, Clone)]
pub struct WaveField {
    config: WaveConfig,
    size: Size,
    time: f64,
}

impl Default for WaveField {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaveField {
    /// Create a field at `time = 0`.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config: WaveConfig {
                columns: config.columns.max(2),
                rows: config.rows.max(2),
                time_step: if config.time_step.is_finite() {
                    config.time_step
                } else {
                    WaveConfig::default().time_step
                },
            },
            size: Size::default(),
            time: 0.0,
        }
    }

    /// Elapsed wave time.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Current geometry.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Every dot at the current time, row by row of `i`.
    pub fn points(&self, palette: WavePalette) -> impl Iterator<Item = WavePoint> + '_ {
        let WaveConfig { columns, rows, .. } = self.config;
        (0..columns).flat_map(move |i| {
            (0..rows).map(move |j| wave_point(i, j, &self.config, self.size, self.time, palette))
        })
    }

    /// Clear, advance time, and draw every dot.
    pub fn tick(&mut self, palette: WavePalette, canvas: &mut dyn Canvas) {
        self.size = canvas.size();
        canvas.clear();
        self.time += self.config.time_step;
        if self.size.is_empty() {
            return;
        }
        for p in self.points(palette) {
            canvas.fill_circle(p.x as f32, p.y as f32, p.radius as f32, p.color());
        }
    }
}

impl FieldFx for WaveField {
    fn name(&self) -> &'static str {
        "wave"
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn render(&mut self, ctx: FxContext, canvas: &mut dyn Canvas) {
        self.tick(WavePalette::for_mode(ctx.signal.mode), canvas);
    }
}
