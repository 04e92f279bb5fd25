#![forbid(unsafe_code)]

//! Render: packed colors, the [`canvas::Canvas`] drawing seam shared by every
//! field renderer, and [`surface::RasterSurface`], an owned pixel buffer that
//! implements it for headless hosts and tests.

pub mod canvas;
pub mod color;
pub mod glyph;
pub mod surface;

pub use canvas::Canvas;
pub use color::PackedRgba;
pub use surface::{RasterSurface, SurfaceError};
