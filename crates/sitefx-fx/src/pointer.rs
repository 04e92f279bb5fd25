#![forbid(unsafe_code)]

//! Custom pointer overlay.
//!
//! Pointer tracking is split in two:
//!
//! 1. [`PointerOverlay::on_move`] runs at native event rate and only records
//!    the latest coordinates in [`PointerState`].
//! 2. [`PointerOverlay::tick`] runs once per display frame, reads the state,
//!    and produces the [`OverlayFrame`] to present.
//!
//! Presentation cost is therefore one update per frame no matter how many
//! move events arrive.
//!
//! # Mode rules
//!
//! - Normal: soft disc; hidden while hovering an interactive node, which
//!   shows the native glyph for its role instead.
//! - Celebratory / LogoTriggered: larger, brighter, pulsing disc; same
//!   hover suppression.
//! - Matrix: always the blinking block; hover suppression does not apply
//!   and the native glyph stays hidden.

use std::time::Duration;

use sitefx_core::geometry::Point;
use sitefx_core::interactive::{InteractiveRole, NativeCursor, NodeId};
use sitefx_render::{Canvas, PackedRgba};
use sitefx_runtime::mode::Mode;

/// Blur applied to the disc by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blur {
    Small,
    Medium,
}

impl Blur {
    /// Blur radius in CSS pixels.
    #[must_use]
    pub const fn radius_px(self) -> f32 {
        match self {
            Self::Small => 4.0,
            Self::Medium => 12.0,
        }
    }
}

/// Overlay geometry and styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerConfig {
    /// Disc diameter in Normal mode (default: 24).
    pub disc_size: f32,
    /// Disc diameter in festive modes (default: 36).
    pub festive_disc_size: f32,
    /// Disc opacity in Normal mode (default: 0.7).
    pub disc_opacity: f32,
    /// Disc opacity in festive modes (default: 0.9).
    pub festive_disc_opacity: f32,
    /// Block glyph width (default: 8).
    pub block_width: f32,
    /// Block glyph height (default: 20).
    pub block_height: f32,
    /// Block offset from the pointer on both axes (default: 2).
    pub block_offset: f32,
    /// Full blink cycle; the block is lit for the first half (default: 1s).
    pub blink_period: Duration,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            disc_size: 24.0,
            festive_disc_size: 36.0,
            disc_opacity: 0.7,
            festive_disc_opacity: 0.9,
            block_width: 8.0,
            block_height: 20.0,
            block_offset: 2.0,
            blink_period: Duration::from_secs(1),
        }
    }
}

/// Latest raw pointer position. Written by the move handler only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

/// What the overlay shows this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayVisual {
    /// Nothing drawn; the native glyph is in charge.
    Hidden,
    /// Gradient disc with its top-left corner at `origin`.
    Disc {
        origin: Point,
        diameter: f32,
        blur: Blur,
        opacity: f32,
        pulsing: bool,
    },
    /// Block glyph. `origin` is its bottom-left corner; it extends upward.
    Block {
        origin: Point,
        width: f32,
        height: f32,
        lit: bool,
    },
}

/// One presented overlay state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub visual: OverlayVisual,
    pub native_cursor: NativeCursor,
}

impl OverlayFrame {
    /// Whether the custom overlay is showing.
    #[must_use]
    pub const fn overlay_visible(&self) -> bool {
        !matches!(self.visual, OverlayVisual::Hidden)
    }

    /// Paint the overlay into `canvas` (headless hosts).
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        match self.visual {
            OverlayVisual::Hidden => {}
            OverlayVisual::Disc {
                origin,
                diameter,
                opacity,
                ..
            } => {
                let r = diameter / 2.0;
                let color = DISC_COLOR.with_opacity(opacity);
                canvas.fill_circle(origin.x + r, origin.y + r, r, color);
            }
            OverlayVisual::Block {
                origin,
                width,
                height,
                lit,
            } => {
                if lit {
                    canvas.fill_rect(origin.x, origin.y - height, width, height, PackedRgba::GREEN);
                }
            }
        }
    }
}

/// Representative tint of the cyan-pink-yellow disc gradient.
const DISC_COLOR: PackedRgba = PackedRgba::rgb(34, 211, 238);

/// Pointer overlay state machine.
#[derive(Debug, Clone, Default)]
pub struct PointerOverlay {
    config: PointerConfig,
    state: PointerState,
    hovered: Option<(NodeId, InteractiveRole)>,
}

impl PointerOverlay {
    /// Create an overlay with `config`.
    #[must_use]
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            state: PointerState::default(),
            hovered: None,
        }
    }

    /// Record the latest pointer position. Does no other work.
    #[inline]
    pub fn on_move(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.state = PointerState { x, y };
        }
    }

    /// The pointer entered an interactive node.
    pub fn hover_enter(&mut self, node: NodeId, role: InteractiveRole) {
        self.hovered = Some((node, role));
    }

    /// The pointer left a node. Leaving a node other than the hovered one
    /// is ignored.
    pub fn hover_leave(&mut self, node: NodeId) {
        if self.hovered.is_some_and(|(hovered, _)| hovered == node) {
            self.hovered = None;
        }
    }

    /// Latest recorded position.
    #[must_use]
    pub const fn state(&self) -> PointerState {
        self.state
    }

    /// Role of the hovered interactive node, if any.
    #[must_use]
    pub fn hovered_role(&self) -> Option<InteractiveRole> {
        self.hovered.map(|(_, role)| role)
    }

    /// Produce this frame's overlay at monotonic time `now` under `mode`.
    #[must_use]
    pub fn tick(&self, mode: Mode, now: Duration) -> OverlayFrame {
        let PointerState { x, y } = self.state;
        let c = &self.config;

        if mode == Mode::Matrix {
            return OverlayFrame {
                visual: OverlayVisual::Block {
                    origin: Point::new(x, y).offset(c.block_offset, c.block_offset),
                    width: c.block_width,
                    height: c.block_height,
                    lit: blink_lit(now, c.blink_period),
                },
                native_cursor: NativeCursor::Hidden,
            };
        }

        if let Some(role) = self.hovered_role() {
            return OverlayFrame {
                visual: OverlayVisual::Hidden,
                native_cursor: role.native_cursor(),
            };
        }

        let festive = mode.is_festive();
        OverlayFrame {
            visual: OverlayVisual::Disc {
                origin: Point::new(x, y),
                diameter: if festive { c.festive_disc_size } else { c.disc_size },
                blur: if festive { Blur::Medium } else { Blur::Small },
                opacity: if festive {
                    c.festive_disc_opacity
                } else {
                    c.disc_opacity
                },
                pulsing: festive,
            },
            native_cursor: NativeCursor::Hidden,
        }
    }
}

fn blink_lit(now: Duration, period: Duration) -> bool {
    let period = period.as_nanos().max(1);
    now.as_nanos() % period < period.div_ceil(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn move_only_records_state() {
        let mut overlay = PointerOverlay::default();
        overlay.on_move(10.0, 20.0);
        overlay.on_move(30.0, 40.0);
        assert_eq!(overlay.state(), PointerState { x: 30.0, y: 40.0 });
    }

    #[test]
    fn non_finite_moves_ignored() {
        let mut overlay = PointerOverlay::default();
        overlay.on_move(5.0, 5.0);
        overlay.on_move(f32::NAN, 1.0);
        assert_eq!(overlay.state(), PointerState { x: 5.0, y: 5.0 });
    }

    #[test]
    fn normal_disc_at_pointer() {
        let mut overlay = PointerOverlay::default();
        overlay.on_move(100.0, 50.0);
        let frame = overlay.tick(Mode::Normal, ms(0));
        assert_eq!(
            frame.visual,
            OverlayVisual::Disc {
                origin: Point::new(100.0, 50.0),
                diameter: 24.0,
                blur: Blur::Small,
                opacity: 0.7,
                pulsing: false,
            }
        );
        assert_eq!(frame.native_cursor, NativeCursor::Hidden);
    }

    #[test]
    fn festive_disc_for_both_festive_modes() {
        let overlay = PointerOverlay::default();
        for mode in [Mode::Celebratory, Mode::LogoTriggered] {
            match overlay.tick(mode, ms(0)).visual {
                OverlayVisual::Disc {
                    diameter,
                    blur,
                    opacity,
                    pulsing,
                    ..
                } => {
                    assert_eq!(diameter, 36.0);
                    assert_eq!(blur, Blur::Medium);
                    assert_eq!(opacity, 0.9);
                    assert!(pulsing);
                }
                other => panic!("expected disc, got {other:?}"),
            }
        }
    }

    #[test]
    fn hover_shows_native_glyph_by_role() {
        let mut overlay = PointerOverlay::default();
        overlay.hover_enter(NodeId(1), InteractiveRole::Button);
        let frame = overlay.tick(Mode::Normal, ms(0));
        assert!(!frame.overlay_visible());
        assert_eq!(frame.native_cursor, NativeCursor::Pointer);

        overlay.hover_leave(NodeId(1));
        overlay.hover_enter(NodeId(2), InteractiveRole::TextArea);
        assert_eq!(overlay.tick(Mode::Celebratory, ms(0)).native_cursor, NativeCursor::Text);
    }

    #[test]
    fn leave_restores_overlay_next_tick() {
        let mut overlay = PointerOverlay::default();
        overlay.hover_enter(NodeId(1), InteractiveRole::Link);
        assert!(!overlay.tick(Mode::Normal, ms(0)).overlay_visible());
        overlay.hover_leave(NodeId(1));
        let frame = overlay.tick(Mode::Normal, ms(16));
        assert!(frame.overlay_visible());
        assert_eq!(frame.native_cursor, NativeCursor::Hidden);
    }

    #[test]
    fn stale_leave_is_ignored() {
        let mut overlay = PointerOverlay::default();
        overlay.hover_enter(NodeId(1), InteractiveRole::Button);
        overlay.hover_enter(NodeId(2), InteractiveRole::Select);
        overlay.hover_leave(NodeId(1));
        assert_eq!(overlay.hovered_role(), Some(InteractiveRole::Select));
    }

    #[test]
    fn matrix_block_ignores_hover() {
        let mut overlay = PointerOverlay::default();
        overlay.on_move(10.0, 10.0);
        overlay.hover_enter(NodeId(1), InteractiveRole::Button);
        let frame = overlay.tick(Mode::Matrix, ms(100));
        assert_eq!(
            frame.visual,
            OverlayVisual::Block {
                origin: Point::new(12.0, 12.0),
                width: 8.0,
                height: 20.0,
                lit: true,
            }
        );
        assert_eq!(frame.native_cursor, NativeCursor::Hidden);
    }

    #[test]
    fn block_blinks_with_one_second_period() {
        let overlay = PointerOverlay::default();
        let lit = |t| match overlay.tick(Mode::Matrix, ms(t)).visual {
            OverlayVisual::Block { lit, .. } => lit,
            _ => unreachable!(),
        };
        assert!(lit(0));
        assert!(lit(499));
        assert!(!lit(500));
        assert!(!lit(999));
        assert!(lit(1000));
    }

    #[test]
    fn paint_disc_and_block() {
        use sitefx_core::geometry::Size;
        use sitefx_render::RasterSurface;

        let mut overlay = PointerOverlay::default();
        overlay.on_move(10.0, 30.0);
        let mut s = RasterSurface::new(Size::new(64, 64)).unwrap();
        overlay.tick(Mode::Normal, ms(0)).paint(&mut s);
        assert!(s.get(22, 42).is_some_and(|p| p.a() > 0));

        let mut s = RasterSurface::new(Size::new(64, 64)).unwrap();
        overlay.tick(Mode::Matrix, ms(0)).paint(&mut s);
        // Block spans x 12..20, y 12..32.
        assert_eq!(s.get(13, 20), Some(PackedRgba::GREEN));
        assert_eq!(s.get(13, 33), Some(PackedRgba::TRANSPARENT));
    }
}
