#![forbid(unsafe_code)]

//! Packed colors and hue conversion.

use std::fmt;

/// A compact RGBA color.
///
/// - **Layout:** `0xRRGGBBAA` (R in bits 31..24, A in bits 7..0).
///
/// Stored as straight alpha (RGB channels are not pre-multiplied).
/// Compositing uses Porter-Duff SourceOver (`src over dst`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque `#00FF00`, the rain glyph and Matrix dot color.
    pub const GREEN: Self = Self::rgb(0, 255, 0);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Create a color from RGB and a fractional alpha in `[0.0, 1.0]`.
    #[inline]
    pub fn rgb_alpha(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self::rgba(r, g, b, alpha_to_u8(alpha))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Alpha as a fraction in `[0.0, 1.0]`.
    #[inline]
    pub fn alpha(self) -> f64 {
        f64::from(self.a()) / 255.0
    }

    #[inline]
    const fn div_round_u8(numer: u64, denom: u64) -> u8 {
        debug_assert!(denom != 0);
        let v = (numer + (denom / 2)) / denom;
        if v > 255 { 255 } else { v as u8 }
    }

    /// Porter-Duff SourceOver: `src over dst`.
    ///
    /// Computes the exact rational form and rounds once at the end.
    #[inline]
    pub fn over(self, dst: Self) -> Self {
        let s_a = self.a() as u64;
        if s_a == 255 {
            return self;
        }
        if s_a == 0 {
            return dst;
        }

        let d_a = dst.a() as u64;
        let inv_s_a = 255 - s_a;

        // numer_a = 255*s_a + d_a*(255 - s_a), in the 255^2 domain.
        let numer_a = 255 * s_a + d_a * inv_s_a;
        let out_a = Self::div_round_u8(numer_a, 255);

        let channel = |src: u8, dst: u8| {
            Self::div_round_u8(
                (src as u64) * s_a * 255 + (dst as u64) * d_a * inv_s_a,
                numer_a,
            )
        };

        Self::rgba(
            channel(self.r(), dst.r()),
            channel(self.g(), dst.g()),
            channel(self.b(), dst.b()),
            out_a,
        )
    }

    /// Apply uniform opacity in `[0.0, 1.0]` by scaling alpha.
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        let a = ((self.a() as f32) * opacity).round().clamp(0.0, 255.0) as u8;
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// CSS `rgba(...)` notation, for 2D canvas fill styles.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PackedRgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alpha = (self.alpha() * 1000.0).round() / 1000.0;
        write!(f, "rgba({}, {}, {}, {alpha})", self.r(), self.g(), self.b())
    }
}

fn alpha_to_u8(alpha: f64) -> u8 {
    if alpha.is_nan() {
        return 0;
    }
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Six-segment hue to RGB at full saturation and value.
///
/// `hue` is reduced into `[0, 360)` first. Within each 60° segment the
/// ramping channel is `floor(fraction * 255)`, so segment starts are exact
/// primaries or secondaries.
pub fn hue_to_rgb(hue: f64) -> (u8, u8, u8) {
    let hue = if hue.is_finite() {
        hue.rem_euclid(360.0)
    } else {
        0.0
    };
    let up = |start: f64| ramp((hue - start) / 60.0);
    let down = |start: f64| ramp(1.0 - (hue - start) / 60.0);

    if hue < 60.0 {
        (255, up(0.0), 0)
    } else if hue < 120.0 {
        (down(60.0), 255, 0)
    } else if hue < 180.0 {
        (0, 255, up(120.0))
    } else if hue < 240.0 {
        (0, down(180.0), 255)
    } else if hue < 300.0 {
        (up(240.0), 0, 255)
    } else {
        (255, 0, down(300.0))
    }
}

fn ramp(fraction: f64) -> u8 {
    (fraction * 255.0).floor().clamp(0.0, 255.0) as u8
}
