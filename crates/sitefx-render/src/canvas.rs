#![forbid(unsafe_code)]

//! The drawing seam shared by every field renderer.
//!
//! Renderers only ever issue these primitives, so the same code paints into a
//! browser 2D context or into an owned [`RasterSurface`](crate::RasterSurface).
//! Coordinates are device pixels with the origin at the top-left; colors are
//! straight-alpha [`PackedRgba`] composited with SourceOver.

use sitefx_core::geometry::Size;

use crate::color::PackedRgba;
use crate::surface::SurfaceError;

/// A 2D drawing target.
pub trait Canvas {
    /// Current dimensions in device pixels.
    fn size(&self) -> Size;

    /// Reallocate to `size`. Contents are discarded.
    fn resize(&mut self, size: Size) -> Result<(), SurfaceError>;

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Composite `color` over every pixel.
    fn fill(&mut self, color: PackedRgba) {
        let size = self.size();
        self.fill_rect(0.0, 0.0, size.width as f32, size.height as f32, color);
    }

    /// Composite `color` over an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: PackedRgba);

    /// Composite `color` over a disc centred at `(cx, cy)`.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: PackedRgba);

    /// Draw `glyph` at font size `px` with its alphabetic baseline at `y`
    /// and its left edge at `x`.
    fn fill_glyph(&mut self, glyph: char, x: f32, y: f32, px: f32, color: PackedRgba);
}

impl<C: Canvas + ?Sized> Canvas for Box<C> {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn resize(&mut self, size: Size) -> Result<(), SurfaceError> {
        (**self).resize(size)
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn fill(&mut self, color: PackedRgba) {
        (**self).fill(color);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: PackedRgba) {
        (**self).fill_rect(x, y, width, height, color);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: PackedRgba) {
        (**self).fill_circle(cx, cy, radius, color);
    }

    fn fill_glyph(&mut self, glyph: char, x: f32, y: f32, px: f32, color: PackedRgba) {
        (**self).fill_glyph(glyph, x, y, px, color);
    }
}
