#![forbid(unsafe_code)]

//! Falling-character rain field.
//!
//! One drop per column of `cell_size` pixels. Each tick the whole surface is
//! faded toward black, every column draws one random glyph at its drop row,
//! and the drop moves down one row. Drops past the bottom respawn at the top
//! with a small per-tick chance, so columns desynchronize over time.
//!
//! # Determinism
//!
//! Uses xorshift32 seeded from [`RainConfig::seed`]; two fields with the same
//! seed and the same resize history paint identical frames.

use sitefx_core::geometry::Size;
use sitefx_render::{Canvas, PackedRgba};

use crate::{FieldFx, FxContext, unit};

/// Glyphs the rain draws from.
pub const RAIN_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890@#$%^&*()*&^%<>?:\";{}[]|";

/// Rain field configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainConfig {
    /// Column width and row height in pixels (default: 12).
    pub cell_size: f32,
    /// Alpha of the per-tick black fade (default: 0.07).
    pub fade_alpha: f64,
    /// A past-the-bottom drop respawns when a uniform draw exceeds this
    /// (default: 0.975).
    pub respawn_threshold: f64,
    /// Glyph color (default: `#00FF00`).
    pub color: PackedRgba,
    /// PRNG seed.
    pub seed: u32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            cell_size: 12.0,
            fade_alpha: 0.07,
            respawn_threshold: 0.975,
            color: PackedRgba::GREEN,
            seed: 0x5EED_1234,
        }
    }
}

impl RainConfig {
    /// Default config with a custom seed.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Lifecycle of a rain field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RainState {
    /// Not yet sized; no columns.
    #[default]
    Unstarted,
    /// Columns seeded and ticking.
    Running,
}

/// Falling-character rain.
#[derive(Debug, Clone)]
pub struct RainField {
    config: RainConfig,
    state: RainState,
    size: Size,
    /// Drop row per column (fractional until the first respawn).
    drops: Vec<f32>,
    alphabet: Vec<char>,
    rng: u32,
}

impl Default for RainField {
    fn default() -> Self {
        Self::new(RainConfig::default())
    }
}

impl RainField {
    /// Create an unstarted field.
    #[must_use]
    pub fn new(config: RainConfig) -> Self {
        let cell_size = if config.cell_size.is_finite() && config.cell_size >= 1.0 {
            config.cell_size
        } else {
            RainConfig::default().cell_size
        };
        Self {
            config: RainConfig {
                cell_size,
                ..config
            },
            state: RainState::Unstarted,
            size: Size::default(),
            drops: Vec::new(),
            alphabet: RAIN_ALPHABET.chars().collect(),
            rng: config.seed | 1,
        }
    }

    /// Size to the viewport and seed every column.
    pub fn start(&mut self, size: Size) {
        self.state = RainState::Running;
        self.reseed(size);
        tracing::debug!(
            columns = self.drops.len(),
            width = size.width,
            height = size.height,
            "rain field started"
        );
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RainState {
        self.state
    }

    /// Drop rows, one per column.
    #[must_use]
    pub fn drops(&self) -> &[f32] {
        &self.drops
    }

    /// Column count for a viewport width.
    #[must_use]
    pub fn columns_for(&self, width: u32) -> usize {
        (width as f32 / self.config.cell_size).floor() as usize
    }

    /// Rows visible in the current viewport.
    fn row_span(&self) -> f32 {
        self.size.height as f32 / self.config.cell_size
    }

    fn reseed(&mut self, size: Size) {
        self.size = size;
        let columns = self.columns_for(size.width);
        let rows = self.row_span();
        self.drops.clear();
        self.drops.reserve(columns);
        for _ in 0..columns {
            let start = (unit(&mut self.rng) * f64::from(rows)) as f32;
            // The f32 cast may round up to `rows`; keep seeds strictly inside.
            self.drops.push(start.min(rows * (1.0 - f32::EPSILON)).max(0.0));
        }
    }

    /// Advance one tick and draw.
    pub fn tick(&mut self, canvas: &mut dyn Canvas) {
        if self.state == RainState::Unstarted {
            self.start(canvas.size());
        }
        if self.size.is_empty() {
            return;
        }

        let cell = self.config.cell_size;
        let height = self.size.height as f32;
        canvas.fill(PackedRgba::rgb_alpha(0, 0, 0, self.config.fade_alpha));

        for i in 0..self.drops.len() {
            let pick = (unit(&mut self.rng) * self.alphabet.len() as f64) as usize;
            let glyph = self.alphabet.get(pick).copied().unwrap_or(' ');
            let row = self.drops[i];
            canvas.fill_glyph(glyph, i as f32 * cell, row * cell, cell, self.config.color);

            let next = row + 1.0;
            let respawn =
                next * cell > height && unit(&mut self.rng) > self.config.respawn_threshold;
            self.drops[i] = if respawn { 0.0 } else { next };
        }
    }
}

impl FieldFx for RainField {
    fn name(&self) -> &'static str {
        "rain"
    }

    fn resize(&mut self, size: Size) {
        if self.state == RainState::Running {
            self.reseed(size);
        } else {
            self.size = size;
        }
    }

    fn render(&mut self, _ctx: FxContext, canvas: &mut dyn Canvas) {
        self.tick(canvas);
    }
}
