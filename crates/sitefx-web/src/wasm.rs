#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use sitefx_core::event::{Event, KeyEvent};
use sitefx_core::geometry::Size;
use sitefx_core::interactive::{InteractiveRole, NodeCaps, NodeId};
use sitefx_render::{Canvas, PackedRgba, SurfaceError};
use sitefx_runtime::audio::{AudioCue, AudioError, AudioSink, Voice, pitch_frequency};
use sitefx_runtime::scheduler::VsyncScheduler;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AudioContext, CanvasRenderingContext2d, HtmlCanvasElement, OscillatorType};

use crate::driver::{FrameDriver, drive};
use crate::options::parse_config;
use crate::report::FrameReport;
use crate::stage::{Layer, Stage, SurfaceProvider};

// ---------------------------------------------------------------------------
// Canvas 2D surface
// ---------------------------------------------------------------------------

/// A `<canvas>` with its 2D context.
pub struct Canvas2d {
    element: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    fn from_element(element: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = element
            .get_context("2d")
            .map_err(|err| SurfaceError::ContextUnavailable(format!("{err:?}")))?
            .ok_or_else(|| SurfaceError::ContextUnavailable("2d context is null".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::ContextUnavailable("not a 2d context".into()))?;
        Ok(Self { element, ctx })
    }

    fn set_fill(&self, color: PackedRgba) {
        self.ctx.set_fill_style_str(&color.to_css());
    }
}

impl Canvas for Canvas2d {
    fn size(&self) -> Size {
        Size::new(self.element.width(), self.element.height())
    }

    fn resize(&mut self, size: Size) -> Result<(), SurfaceError> {
        if size.is_empty() {
            return Err(SurfaceError::ZeroArea);
        }
        self.element.set_width(size.width);
        self.element.set_height(size.height);
        Ok(())
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: PackedRgba) {
        self.set_fill(color);
        self.ctx
            .fill_rect(f64::from(x), f64::from(y), f64::from(width), f64::from(height));
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: PackedRgba) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        self.set_fill(color);
        self.ctx.begin_path();
        if self
            .ctx
            .arc(f64::from(cx), f64::from(cy), f64::from(radius), 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn fill_glyph(&mut self, glyph: char, x: f32, y: f32, px: f32, color: PackedRgba) {
        self.set_fill(color);
        self.ctx.set_font(&format!("{px}px monospace"));
        let mut buf = [0u8; 4];
        let _ = self
            .ctx
            .fill_text(glyph.encode_utf8(&mut buf), f64::from(x), f64::from(y));
    }
}

impl Drop for Canvas2d {
    /// An unmounted layer leaves a blank canvas behind.
    fn drop(&mut self) {
        self.clear();
    }
}

/// Hands out the two mounted `<canvas>` elements.
#[derive(Default)]
pub struct CanvasProvider {
    wave: Option<HtmlCanvasElement>,
    rain: Option<HtmlCanvasElement>,
}

impl SurfaceProvider for CanvasProvider {
    type Surface = Canvas2d;

    fn acquire(&mut self, layer: Layer, size: Size) -> Result<Canvas2d, SurfaceError> {
        let element = match layer {
            Layer::Wave => self.wave.clone(),
            Layer::Rain => self.rain.clone(),
        }
        .ok_or_else(|| SurfaceError::ContextUnavailable(format!("no {} canvas", layer.as_str())))?;
        let mut canvas = Canvas2d::from_element(element)?;
        canvas.resize(size)?;
        Ok(canvas)
    }
}

// ---------------------------------------------------------------------------
// WebAudio
// ---------------------------------------------------------------------------

const CUE_GAIN: f32 = 0.08;

/// Plays cues on plain oscillators. The context is created on first use so
/// autoplay policy only applies after a user gesture.
#[derive(Default)]
pub struct WebAudioSink {
    ctx: Option<AudioContext>,
}

fn rejected(err: JsValue) -> AudioError {
    AudioError::Rejected(format!("{err:?}"))
}

const fn oscillator_type(voice: Voice) -> OscillatorType {
    match voice {
        Voice::Poly => OscillatorType::Triangle,
        Voice::Fm => OscillatorType::Sawtooth,
        Voice::Membrane => OscillatorType::Sine,
        Voice::Mono => OscillatorType::Square,
    }
}

impl WebAudioSink {
    fn context(&mut self) -> Result<&AudioContext, AudioError> {
        if self.ctx.is_none() {
            let ctx = AudioContext::new()
                .map_err(|err| AudioError::Unavailable(format!("{err:?}")))?;
            self.ctx = Some(ctx);
        }
        self.ctx
            .as_ref()
            .ok_or_else(|| AudioError::Unavailable("no audio context".into()))
    }
}

impl AudioSink for WebAudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        let ctx = self.context()?;
        let _ = ctx.resume();
        let start = ctx.current_time();
        let kind = oscillator_type(cue.voice());

        for step in cue.steps() {
            let at = start + step.offset.as_secs_f64();
            let end = at + step.length.duration().as_secs_f64();
            for pitch in step.pitches {
                let Some(freq) = pitch_frequency(pitch) else {
                    continue;
                };
                let osc = ctx.create_oscillator().map_err(rejected)?;
                osc.set_type(kind);
                osc.frequency().set_value(freq);
                let gain = ctx.create_gain().map_err(rejected)?;
                gain.gain().set_value(CUE_GAIN);
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.001, end)
                    .map_err(rejected)?;
                osc.connect_with_audio_node(&gain).map_err(rejected)?;
                gain.connect_with_audio_node(&ctx.destination())
                    .map_err(rejected)?;
                osc.start_with_when(at).map_err(rejected)?;
                osc.stop_with_when(end).map_err(rejected)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JS API
// ---------------------------------------------------------------------------

type WebDriver = FrameDriver<CanvasProvider, WebAudioSink>;
type FrameCallback = Rc<RefCell<Option<js_sys::Function>>>;

/// Step `driver` and call the page's frame callback with no borrow held, so
/// the callback may call any `SiteFx` method.
fn run_frame(driver: &RefCell<WebDriver>, on_frame: &FrameCallback, now_ms: f64) -> Option<FrameReport> {
    drive(driver, now_ms, |report| {
        let callback = on_frame.borrow().clone();
        if let Some(callback) = callback {
            let payload = JsValue::from_str(&report.to_json());
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                tracing::warn!(error = ?err, "frame callback failed");
            }
        }
    })
}

type FrameClosure = Closure<dyn FnMut(f64)>;

/// A running `requestAnimationFrame` loop.
struct RafLoop {
    handle: Rc<Cell<Option<i32>>>,
    closure: Rc<RefCell<Option<FrameClosure>>>,
}

impl RafLoop {
    fn cancel(self) {
        if let Some(id) = self.handle.take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.cancel_animation_frame(id);
        }
        // Breaks the closure's reference to its own slot.
        self.closure.borrow_mut().take();
    }
}

/// Site surface engine.
///
/// JS owns the DOM: it tags nodes, forwards events, and restyles the page
/// from the JSON frame report. Rust owns timing, modes, and both canvases.
/// Every method takes `&self`, so the frame callback may call back in.
#[wasm_bindgen]
pub struct SiteFx {
    driver: Rc<RefCell<WebDriver>>,
    on_frame: FrameCallback,
    logo: NodeId,
    raf: RefCell<Option<RafLoop>>,
}

fn node_id(id: u32) -> NodeId {
    NodeId(id)
}

impl SiteFx {
    fn push(&self, event: Event, time_stamp: Option<f64>) {
        let Ok(mut driver) = self.driver.try_borrow_mut() else {
            tracing::debug!("event dropped; driver busy");
            return;
        };
        let stage = driver.stage_mut();
        match time_stamp {
            Some(at_ms) => stage.push_event_at_millis(event, at_ms),
            None => stage.push_event(event),
        }
    }

    fn cancel_loop(&self) {
        if let Some(raf) = self.raf.borrow_mut().take() {
            raf.cancel();
        }
    }
}

#[wasm_bindgen]
impl SiteFx {
    /// Create an engine from a JSON options string (may be empty).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<SiteFx, JsValue> {
        let config = parse_config(options.as_deref().unwrap_or(""))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let mut stage = Stage::new(config, CanvasProvider::default(), WebAudioSink::default());
        let logo = stage.register_with(InteractiveRole::Link, NodeCaps::LOGO);
        Ok(Self {
            driver: Rc::new(RefCell::new(FrameDriver::new(stage, VsyncScheduler::new()))),
            on_frame: Rc::new(RefCell::new(None)),
            logo,
            raf: RefCell::new(None),
        })
    }

    /// Attach the wave and rain canvases.
    pub fn mount(&self, wave: HtmlCanvasElement, rain: HtmlCanvasElement) {
        let mut driver = self.driver.borrow_mut();
        let provider = driver.stage_mut().provider_mut();
        provider.wave = Some(wave);
        provider.rain = Some(rain);
    }

    /// Tag a node by element tag or role name. Returns its id.
    #[wasm_bindgen(js_name = registerInteractive)]
    pub fn register_interactive(&self, tag: &str) -> Result<u32, JsValue> {
        let role = InteractiveRole::from_tag(tag)
            .ok_or_else(|| JsValue::from_str(&format!("unknown interactive tag: {tag}")))?;
        Ok(self.driver.borrow_mut().stage_mut().register(role).0)
    }

    /// Tag a decorative footer word. Returns its id.
    #[wasm_bindgen(js_name = registerFooterWord)]
    pub fn register_footer_word(&self) -> u32 {
        self.driver
            .borrow_mut()
            .stage_mut()
            .register_with(InteractiveRole::Marked, NodeCaps::FOOTER_WORD)
            .0
    }

    /// Id of the built-in logo node, for hover events.
    #[wasm_bindgen(js_name = logoId)]
    pub fn logo_id(&self) -> u32 {
        self.logo.0
    }

    /// Forward `KeyboardEvent.key`, optionally with `event.timeStamp` so the
    /// word timeout measures typing rather than frame gaps.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&self, key: &str, time_stamp: Option<f64>) {
        self.push(Event::Key(KeyEvent::from_dom_key(key)), time_stamp);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.push(Event::PointerMove { x, y }, None);
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(&self, id: u32) {
        self.push(Event::PointerEnter(node_id(id)), None);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&self, id: u32) {
        self.push(Event::PointerLeave(node_id(id)), None);
    }

    /// Focus moved to `id`, or left every tagged node.
    pub fn focus(&self, id: Option<u32>) {
        self.push(Event::Focus(id.map(node_id)), None);
    }

    /// Logo clicked, optionally with `event.timeStamp`.
    #[wasm_bindgen(js_name = logoClick)]
    pub fn logo_click(&self, time_stamp: Option<f64>) {
        self.push(Event::Click(self.logo), time_stamp);
    }

    #[wasm_bindgen(js_name = footerWordClick)]
    pub fn footer_word_click(&self, id: u32) {
        self.push(Event::Click(node_id(id)), None);
    }

    /// Viewport resized, in device pixels.
    pub fn resize(&self, width: u32, height: u32) {
        self.push(Event::Resize { width, height }, None);
    }

    /// Step once at host time `now_ms`. Returns the frame report as JSON.
    pub fn frame(&self, now_ms: f64) -> Option<String> {
        run_frame(&self.driver, &self.on_frame, now_ms).map(|report| report.to_json())
    }

    /// Called with the JSON frame report after every rendered frame.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&self, callback: Option<js_sys::Function>) {
        *self.on_frame.borrow_mut() = callback;
    }

    /// Drive [`frame`](Self::frame) from `requestAnimationFrame`.
    pub fn start(&self) -> Result<(), JsValue> {
        if self.raf.borrow().is_some() {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let closure: Rc<RefCell<Option<FrameClosure>>> = Rc::new(RefCell::new(None));

        let driver = Rc::clone(&self.driver);
        let on_frame = Rc::clone(&self.on_frame);
        let next_handle = Rc::clone(&handle);
        let slot = Rc::clone(&closure);
        let loop_window = window.clone();
        *closure.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
            run_frame(&driver, &on_frame, now_ms);
            // `stop()` inside the callback empties the slot and ends the loop.
            let next = slot.borrow().as_ref().and_then(|cb| {
                loop_window
                    .request_animation_frame(cb.as_ref().unchecked_ref())
                    .ok()
            });
            next_handle.set(next);
        }));

        let first = closure
            .borrow()
            .as_ref()
            .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
            .transpose()?;
        handle.set(first);
        *self.raf.borrow_mut() = Some(RafLoop { handle, closure });
        Ok(())
    }

    /// Cancel the animation loop. The stage keeps its state.
    pub fn stop(&self) {
        self.cancel_loop();
        if let Ok(mut driver) = self.driver.try_borrow_mut() {
            driver.pause();
        }
    }

    /// Current mode name.
    pub fn mode(&self) -> String {
        self.driver.borrow().stage().mode().as_str().to_owned()
    }

    /// Current banner as JSON, if any.
    pub fn banner(&self) -> Option<String> {
        let banner = self.driver.borrow().stage().banner()?;
        serde_json::to_string(&crate::report::BannerReport::from(banner)).ok()
    }

    /// Cancel the animation loop and release both canvases.
    pub fn destroy(&self) {
        self.stop();
        self.on_frame.borrow_mut().take();
        let mut driver = self.driver.borrow_mut();
        let stage = driver.stage_mut();
        stage.destroy();
        let provider = stage.provider_mut();
        provider.wave = None;
        provider.rain = None;
    }
}

impl Drop for SiteFx {
    fn drop(&mut self) {
        self.cancel_loop();
    }
}
