#![forbid(unsafe_code)]

//! Owned raster surface.
//!
//! [`RasterSurface`] is a row-major `Vec<PackedRgba>` with explicit device
//! pixel dimensions. It implements [`Canvas`] with pixel-centre coverage (no
//! anti-aliasing) and SourceOver blending, which keeps headless output exact
//! and reproducible.
//!
//! # Failure Modes
//!
//! - Zero-area or oversized requests fail with [`SurfaceError`]; the caller
//!   decides whether to skip mounting the renderer.

use std::fmt;
use std::io::{self, Write};

use sitefx_core::geometry::Size;

use crate::canvas::Canvas;
use crate::color::PackedRgba;
use crate::glyph::{ADVANCE_RATIO, GLYPH_COLS, GLYPH_ROWS, GlyphMask};

/// Largest accepted side length in device pixels.
pub const MAX_SIDE: u32 = 16_384;

/// Why a surface could not be acquired or resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Width or height was zero.
    ZeroArea,
    /// A side exceeded [`MAX_SIDE`].
    TooLarge { width: u32, height: u32 },
    /// The host could not provide a drawing context.
    ContextUnavailable(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroArea => write!(f, "surface has zero area"),
            Self::TooLarge { width, height } => {
                write!(f, "surface {width}x{height} exceeds {MAX_SIDE} px per side")
            }
            Self::ContextUnavailable(msg) => write!(f, "drawing context unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

fn validate(size: Size) -> Result<(), SurfaceError> {
    if size.is_empty() {
        return Err(SurfaceError::ZeroArea);
    }
    if size.width > MAX_SIDE || size.height > MAX_SIDE {
        return Err(SurfaceError::TooLarge {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

/// Owned row-major pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<PackedRgba>,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl RasterSurface {
    /// Allocate a transparent surface.
    pub fn new(size: Size) -> Result<Self, SurfaceError> {
        validate(size)?;
        Ok(Self {
            width: size.width,
            height: size.height,
            pixels: vec![PackedRgba::TRANSPARENT; pixel_count(size)],
        })
    }

    /// Pixel at `(x, y)`, or `None` out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<PackedRgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[PackedRgba] {
        &self.pixels
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.a() > 0).count()
    }

    /// Write a binary PPM (P6), compositing every pixel over `background`.
    pub fn write_ppm<W: Write>(&self, out: &mut W, background: PackedRgba) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut row = Vec::with_capacity(self.width as usize * 3);
        for line in self.pixels.chunks(self.width as usize) {
            row.clear();
            for px in line {
                let c = px.over(background);
                row.extend_from_slice(&[c.r(), c.g(), c.b()]);
            }
            out.write_all(&row)?;
        }
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: PackedRgba) {
        let idx = self.index(x, y);
        if let Some(px) = self.pixels.get_mut(idx) {
            *px = color.over(*px);
        }
    }

    /// Pixel columns (or rows) whose centres fall in `[start, end)`.
    fn span(start: f32, end: f32, limit: u32) -> std::ops::Range<u32> {
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return 0..0;
        }
        let lo = (start - 0.5).ceil().max(0.0);
        let hi = (end - 0.5).ceil().clamp(0.0, limit as f32);
        (lo as u32).min(limit)..hi as u32
    }
}

fn pixel_count(size: Size) -> usize {
    size.width as usize * size.height as usize
}

impl Canvas for RasterSurface {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn resize(&mut self, size: Size) -> Result<(), SurfaceError> {
        validate(size)?;
        self.width = size.width;
        self.height = size.height;
        self.pixels.clear();
        self.pixels.resize(pixel_count(size), PackedRgba::TRANSPARENT);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels.fill(PackedRgba::TRANSPARENT);
    }

    fn fill(&mut self, color: PackedRgba) {
        for px in &mut self.pixels {
            *px = color.over(*px);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: PackedRgba) {
        if color.a() == 0 {
            return;
        }
        let cols = Self::span(x, x + width, self.width);
        for py in Self::span(y, y + height, self.height) {
            for px in cols.clone() {
                self.blend(px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: PackedRgba) {
        if color.a() == 0 || radius.is_nan() || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let cols = Self::span(cx - radius, cx + radius, self.width);
        for py in Self::span(cy - radius, cy + radius, self.height) {
            let dy = py as f32 + 0.5 - cy;
            for px in cols.clone() {
                let dx = px as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, color);
                }
            }
        }
    }

    fn fill_glyph(&mut self, glyph: char, x: f32, y: f32, px: f32, color: PackedRgba) {
        if color.a() == 0 || px.is_nan() || px <= 0.0 {
            return;
        }
        let cell_w = px * ADVANCE_RATIO / GLYPH_COLS as f32;
        let cell_h = px / GLYPH_ROWS as f32;
        let top = y - px;
        for (col, row) in GlyphMask::for_char(glyph).cells() {
            self.fill_rect(
                x + col as f32 * cell_w,
                top + row as f32 * cell_h,
                cell_w,
                cell_h,
                color,
            );
        }
    }
}
