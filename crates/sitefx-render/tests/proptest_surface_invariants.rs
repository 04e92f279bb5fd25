//! Property-based invariant tests for colors and the raster surface.
//!
//! 1. SourceOver never lowers alpha below either input.
//! 2. Every hue maps to a color with one channel at 255 and one at 0.
//! 3. Drawing primitives never panic and never grow the pixel buffer.
//! 4. A rectangle paints exactly the pixel centres it covers.

use proptest::prelude::*;
use sitefx_core::geometry::Size;
use sitefx_render::color::hue_to_rgb;
use sitefx_render::{Canvas, PackedRgba, RasterSurface};

// ── Helpers ─────────────────────────────────────────────────────────────

fn color_strategy() -> impl Strategy<Value = PackedRgba> {
    any::<u32>().prop_map(PackedRgba)
}

fn coord() -> impl Strategy<Value = f32> {
    prop_oneof![
        -100.0f32..200.0,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(-0.0f32),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Alpha is monotone under SourceOver
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn over_alpha_monotone(src in color_strategy(), dst in color_strategy()) {
        let out = src.over(dst);
        prop_assert!(out.a() >= src.a().max(dst.a()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Hue output is fully saturated
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hue_fully_saturated(hue in -1000.0f64..1000.0) {
        let (r, g, b) = hue_to_rgb(hue);
        let channels = [r, g, b];
        prop_assert!(channels.contains(&255), "hue {} -> {:?}", hue, channels);
        prop_assert!(channels.contains(&0), "hue {} -> {:?}", hue, channels);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Primitives are total
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn primitives_never_panic(
        w in 1u32..64,
        h in 1u32..64,
        x in coord(),
        y in coord(),
        extent in coord(),
        glyph in any::<char>(),
        color in color_strategy(),
    ) {
        let mut s = RasterSurface::new(Size::new(w, h)).unwrap();
        s.fill_rect(x, y, extent, extent, color);
        s.fill_circle(x, y, extent, color);
        s.fill_glyph(glyph, x, y, extent, color);
        s.fill(color);
        prop_assert_eq!(s.pixels().len(), (w * h) as usize);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Integer rectangles paint exact areas
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn integer_rect_area(
        x in 0u32..32,
        y in 0u32..32,
        rw in 0u32..32,
        rh in 0u32..32,
    ) {
        let mut s = RasterSurface::new(Size::new(32, 32)).unwrap();
        s.fill_rect(x as f32, y as f32, rw as f32, rh as f32, PackedRgba::WHITE);
        let expected = (rw.min(32 - x) * rh.min(32 - y)) as usize;
        prop_assert_eq!(s.painted_count(), expected);
    }
}
