#![forbid(unsafe_code)]

//! `sitefx-web` runs the site surface engine inside a browser page.
//!
//! Design goals:
//! - **Host-driven I/O**: the page pushes input events and size changes.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! [`stage::Stage`] is platform-independent and is what tests and the demo
//! drive. The `wasm-bindgen` surface (`SiteFx`) is compiled only for wasm32.

pub mod driver;
pub mod options;
pub mod report;
pub mod stage;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::SiteFx;

pub use driver::{FrameDriver, Tick, drive};
pub use options::{OptionsError, StageOptions, parse_config};
pub use report::FrameReport;
pub use stage::{Layer, RasterProvider, Stage, StageConfig, StepResult, SurfaceProvider};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct SiteFx;

#[cfg(not(target_arch = "wasm32"))]
impl SiteFx {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
