#![forbid(unsafe_code)]

//! JSON frame report handed back to the host after each step.
//!
//! The content layer reads this to restyle DOM nodes: the page mode class,
//! the banner, the preloader, the native `cursor` keyword, and the overlay
//! element's position. Overlay coordinates are the element's CSS top-left.

use serde::Serialize;
use sitefx_fx::pointer::OverlayVisual;
use sitefx_runtime::mode::Banner;

use crate::stage::StepResult;

/// Banner payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BannerReport {
    pub text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<&'static str>,
}

impl From<Banner> for BannerReport {
    fn from(banner: Banner) -> Self {
        Self {
            text: banner.text,
            subtitle: banner.subtitle,
        }
    }
}

/// Overlay element placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayReport {
    Hidden,
    #[serde(rename_all = "camelCase")]
    Disc {
        x: f32,
        y: f32,
        diameter: f32,
        blur_px: f32,
        opacity: f32,
        pulsing: bool,
    },
    Block {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        lit: bool,
    },
}

impl From<OverlayVisual> for OverlayReport {
    fn from(visual: OverlayVisual) -> Self {
        match visual {
            OverlayVisual::Hidden => Self::Hidden,
            OverlayVisual::Disc {
                origin,
                diameter,
                blur,
                opacity,
                pulsing,
            } => Self::Disc {
                x: origin.x,
                y: origin.y,
                diameter,
                blur_px: blur.radius_px(),
                opacity,
                pulsing,
            },
            OverlayVisual::Block {
                origin,
                width,
                height,
                lit,
            } => Self::Block {
                x: origin.x,
                y: origin.y - height,
                width,
                height,
                lit,
            },
        }
    }
}

/// Everything the content layer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub frame: u64,
    pub mode: &'static str,
    pub version: u64,
    pub suppress_background: bool,
    pub loading: bool,
    pub banner: Option<BannerReport>,
    /// CSS `cursor` keyword for the document.
    pub cursor: &'static str,
    pub overlay: OverlayReport,
}

impl FrameReport {
    /// Build from a step result.
    #[must_use]
    pub fn from_step(result: &StepResult) -> Self {
        Self {
            frame: result.frame_idx,
            mode: result.signal.mode.as_str(),
            version: result.signal.version,
            suppress_background: result.signal.suppress_background,
            loading: result.loading,
            banner: result.banner.map(BannerReport::from),
            cursor: result.overlay.native_cursor.css_keyword(),
            overlay: result.overlay.visual.into(),
        }
    }

    /// Serialize for the host.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Every field is a plain number, bool, or static string.
        serde_json::to_string(self).unwrap_or_default()
    }
}
