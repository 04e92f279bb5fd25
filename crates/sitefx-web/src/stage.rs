#![forbid(unsafe_code)]

//! Host-driven stage.
//!
//! [`Stage`] wires the sequence matcher, mode coordinator, logo counter,
//! field renderers, and pointer overlay into one step-based loop without
//! threads or blocking. The host controls the event loop:
//!
//! 1. Register tagged nodes via [`Stage::register`].
//! 2. Push events via [`Stage::push_event`] (stamped with the current
//!    time) or [`Stage::push_event_at`] (stamped by the host).
//! 3. Advance time via [`Stage::advance_time`] or [`Stage::set_time`].
//! 4. Call [`Stage::step`] once per display frame.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sitefx_core::event::{Event, KeyEvent};
//! use sitefx_runtime::audio::SilentSink;
//! use sitefx_runtime::mode::Mode;
//! use sitefx_web::stage::{RasterProvider, Stage, StageConfig};
//!
//! let mut stage = Stage::new(StageConfig::default(), RasterProvider, SilentSink);
//! stage.resize(320, 200);
//! for key in ["m", "a", "t", "r", "i", "x"] {
//!     stage.push_event(Event::Key(KeyEvent::from_dom_key(key)));
//! }
//! stage.advance_time(Duration::from_millis(16));
//! let result = stage.step();
//! assert_eq!(result.signal.mode, Mode::Matrix);
//! assert!(stage.is_rain_mounted());
//! ```
//!
//! # Mount rules
//!
//! - The wave layer mounts on the first step with a non-empty viewport.
//! - The rain layer mounts while Matrix is active and is dropped when it ends.
//! - A surface that fails to acquire leaves its layer unmounted; acquisition
//!   is retried only after the viewport changes.
//!
//! # Event time
//!
//! Keys and clicks are matched at their arrival stamp, so the word idle
//! timeout and the logo click gap measure input timing rather than frame
//! timing. Mode activations and deadlines use the step time.

use std::collections::VecDeque;
use std::time::Duration;

use sitefx_core::event::Event;
use sitefx_core::geometry::Size;
use sitefx_core::interactive::{InteractiveRole, NodeCaps, NodeId, NodeRegistry};
use sitefx_core::key_sequence::{SequenceConfig, SequenceHits, SequenceMatcher};
use sitefx_fx::{
    FieldFx, FxContext, OverlayFrame, PointerConfig, PointerOverlay, RainConfig, RainField,
    WaveConfig, WaveField,
};
use sitefx_render::{Canvas, RasterSurface, SurfaceError};
use sitefx_runtime::audio::{AudioCue, AudioSink, play_best_effort};
use sitefx_runtime::clock::{DeterministicClock, MonotonicClock, millis_to_duration};
use sitefx_runtime::logo::{LogoClickCounter, LogoConfig};
use sitefx_runtime::mode::{
    Activation, Banner, Mode, ModeCoordinator, ModeDurations, ModeRequest, ModeSignal,
};
use sitefx_runtime::pop::{POP_DURATION, PopTracker};
use sitefx_runtime::preloader::PreloaderGate;

/// Default preloader length.
pub const PRELOADER_DURATION: Duration = Duration::from_millis(2500);

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// Which full-viewport layer a surface backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Wave,
    Rain,
}

impl Layer {
    /// Stable lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wave => "wave",
            Self::Rain => "rain",
        }
    }
}

/// Hands out drawing surfaces for the stage's layers.
pub trait SurfaceProvider {
    type Surface: Canvas;

    /// Acquire a surface for `layer` sized to `size`.
    fn acquire(&mut self, layer: Layer, size: Size) -> Result<Self::Surface, SurfaceError>;
}

/// Allocates owned [`RasterSurface`]s (headless hosts and tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterProvider;

impl SurfaceProvider for RasterProvider {
    type Surface = RasterSurface;

    fn acquire(&mut self, _layer: Layer, size: Size) -> Result<RasterSurface, SurfaceError> {
        RasterSurface::new(size)
    }
}

#[derive(Debug)]
enum Slot<S> {
    Empty,
    Mounted(S),
    /// Acquisition failed at this viewport size.
    Failed(Size),
}

impl<S> Slot<S> {
    fn surface(&self) -> Option<&S> {
        match self {
            Self::Mounted(s) => Some(s),
            _ => None,
        }
    }
}

fn ensure_mounted<P: SurfaceProvider>(
    slot: &mut Slot<P::Surface>,
    provider: &mut P,
    layer: Layer,
    size: Size,
) {
    if size.is_empty() {
        return;
    }
    match slot {
        Slot::Mounted(_) => {}
        Slot::Failed(at) if *at == size => {}
        _ => match provider.acquire(layer, size) {
            Ok(surface) => {
                tracing::debug!(
                    layer = layer.as_str(),
                    width = size.width,
                    height = size.height,
                    "surface mounted"
                );
                *slot = Slot::Mounted(surface);
            }
            Err(err) => {
                tracing::warn!(
                    layer = layer.as_str(),
                    error = %err,
                    "surface unavailable; layer not mounted"
                );
                *slot = Slot::Failed(size);
            }
        },
    }
}

fn resize_slot<S: Canvas>(slot: &mut Slot<S>, layer: Layer, size: Size) {
    match slot {
        Slot::Mounted(surface) => {
            if let Err(err) = surface.resize(size) {
                tracing::warn!(
                    layer = layer.as_str(),
                    error = %err,
                    "surface resize failed; layer unmounted"
                );
                *slot = Slot::Failed(size);
            }
        }
        Slot::Failed(_) => *slot = Slot::Empty,
        Slot::Empty => {}
    }
}

// ---------------------------------------------------------------------------
// Config and results
// ---------------------------------------------------------------------------

/// Everything a [`Stage`] is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    pub sequences: SequenceConfig,
    pub durations: ModeDurations,
    pub logo: LogoConfig,
    pub rain: RainConfig,
    pub wave: WaveConfig,
    pub pointer: PointerConfig,
    /// How long `loading` stays true after the first step (default: 2.5s).
    pub preloader: Duration,
    /// How long a clicked footer word stays popped (default: 1s).
    pub pop_duration: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            sequences: SequenceConfig::default(),
            durations: ModeDurations::default(),
            logo: LogoConfig::default(),
            rain: RainConfig::default(),
            wave: WaveConfig::default(),
            pointer: PointerConfig::default(),
            preloader: PRELOADER_DURATION,
            pop_duration: POP_DURATION,
        }
    }
}

/// Result of a single [`Stage::step`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// False once the stage has been destroyed.
    pub running: bool,
    /// Whether any layer was painted.
    pub rendered: bool,
    /// Number of events processed during this step.
    pub events_processed: u32,
    /// Frames stepped so far.
    pub frame_idx: u64,
    /// Mode snapshot after this step.
    pub signal: ModeSignal,
    /// Transition message for the active mode.
    pub banner: Option<Banner>,
    /// Pointer overlay to present.
    pub overlay: OverlayFrame,
    /// Whether the preloader is still showing.
    pub loading: bool,
}

const fn cue_for(request: ModeRequest) -> AudioCue {
    match request {
        ModeRequest::Celebratory => AudioCue::Celebration,
        ModeRequest::Matrix => AudioCue::Matrix,
        ModeRequest::LogoTriggered => AudioCue::Logo,
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Host-driven, non-blocking engine runner.
pub struct Stage<P: SurfaceProvider, A: AudioSink> {
    config: StageConfig,
    clock: DeterministicClock,
    events: VecDeque<(Duration, Event)>,
    registry: NodeRegistry,
    matcher: SequenceMatcher,
    modes: ModeCoordinator,
    logo: LogoClickCounter,
    pops: PopTracker,
    preloader: PreloaderGate,
    pointer: PointerOverlay,
    overlay: OverlayFrame,
    wave: WaveField,
    wave_slot: Slot<P::Surface>,
    rain: Option<RainField>,
    rain_slot: Slot<P::Surface>,
    provider: P,
    audio: A,
    focus: Option<NodeId>,
    viewport: Size,
    running: bool,
    frame_idx: u64,
}

impl<P: SurfaceProvider, A: AudioSink> Stage<P, A> {
    /// Create a stage at time zero with an empty viewport.
    pub fn new(config: StageConfig, provider: P, audio: A) -> Self {
        let pointer = PointerOverlay::new(config.pointer);
        let overlay = pointer.tick(Mode::Normal, Duration::ZERO);
        Self {
            clock: DeterministicClock::new(),
            events: VecDeque::new(),
            registry: NodeRegistry::new(),
            matcher: SequenceMatcher::new(config.sequences.clone()),
            modes: ModeCoordinator::new(config.durations),
            logo: LogoClickCounter::new(config.logo),
            pops: PopTracker::new(config.pop_duration),
            preloader: PreloaderGate::new(config.preloader),
            pointer,
            overlay,
            wave: WaveField::new(config.wave),
            wave_slot: Slot::Empty,
            rain: None,
            rain_slot: Slot::Empty,
            provider,
            audio,
            focus: None,
            viewport: Size::default(),
            running: true,
            frame_idx: 0,
            config,
        }
    }

    // -- Nodes --------------------------------------------------------------

    /// Tag a node with `role` and its default capabilities.
    pub fn register(&mut self, role: InteractiveRole) -> NodeId {
        self.registry.register(role)
    }

    /// Tag a node with `role` and explicit capabilities.
    pub fn register_with(&mut self, role: InteractiveRole, caps: NodeCaps) -> NodeId {
        self.registry.register_with(role, caps)
    }

    /// Remove a node's tag.
    pub fn unregister(&mut self, node: NodeId) {
        self.registry.unregister(node);
        if self.focus == Some(node) {
            self.focus = None;
        }
        self.pointer.hover_leave(node);
    }

    /// Node tags.
    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    // -- Input and time -----------------------------------------------------

    /// Queue an event for the next step, stamped with the current time.
    /// Ignored after [`destroy`](Self::destroy).
    pub fn push_event(&mut self, event: Event) {
        let at = self.clock.now_mono();
        self.push_event_at(event, at);
    }

    /// Queue an event that arrived at host time `at`. Stamps later than the
    /// step that processes the event are clamped to the step time.
    pub fn push_event_at(&mut self, event: Event, at: Duration) {
        if self.running {
            self.events.push_back((at, event));
        }
    }

    /// Queue an event with a host timestamp in milliseconds. Unusable stamps
    /// fall back to the current time.
    pub fn push_event_at_millis(&mut self, event: Event, at_ms: f64) {
        match millis_to_duration(at_ms) {
            Some(at) => self.push_event_at(event, at),
            None => self.push_event(event),
        }
    }

    /// Queue a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.push_event(Event::Resize { width, height });
    }

    /// Advance monotonic time by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set monotonic time. Earlier values are ignored.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Set monotonic time from a host timestamp in milliseconds.
    pub fn set_time_millis(&mut self, now_ms: f64) {
        self.clock.set_millis(now_ms);
    }

    /// Current monotonic time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    // -- Stepping -----------------------------------------------------------

    /// Expire deadlines, process pending events, and render one frame.
    pub fn step(&mut self) -> StepResult {
        if !self.running {
            return self.result(false, 0);
        }
        let now = self.clock.now_mono();

        self.preloader.start(now);
        self.preloader.poll(now);
        self.modes.poll(now);
        self.pops.poll(now);

        let mut events_processed: u32 = 0;
        while let Some((at, event)) = self.events.pop_front() {
            events_processed += 1;
            self.handle_event(event, at.min(now), now);
        }
        // Idle buffers expire only after queued input has been matched.
        self.matcher.check_timeout(now);
        self.logo.check_timeout(now);

        self.sync_layers();
        let rendered = self.render();
        self.overlay = self.pointer.tick(self.modes.mode(), now);
        self.frame_idx += 1;

        self.result(rendered, events_processed)
    }

    fn result(&self, rendered: bool, events_processed: u32) -> StepResult {
        StepResult {
            running: self.running,
            rendered,
            events_processed,
            frame_idx: self.frame_idx,
            signal: self.modes.signal(),
            banner: self.modes.banner(),
            overlay: self.overlay,
            loading: self.preloader.is_loading(),
        }
    }

    fn handle_event(&mut self, event: Event, at: Duration, now: Duration) {
        match event {
            Event::Key(key) => {
                if self.focus.is_some_and(|node| self.registry.is_text_entry(node)) {
                    tracing::trace!(key = %key.code, "key ignored during text entry");
                    return;
                }
                let hits = self.matcher.feed(&key, at);
                if hits.contains(SequenceHits::COMBO) {
                    self.request(ModeRequest::Celebratory, now);
                }
                if hits.contains(SequenceHits::WORD) {
                    self.request(ModeRequest::Matrix, now);
                }
            }
            Event::PointerMove { x, y } => self.pointer.on_move(x, y),
            Event::PointerEnter(node) => {
                if let Some(role) = self.registry.role(node) {
                    self.pointer.hover_enter(node, role);
                }
            }
            Event::PointerLeave(node) => self.pointer.hover_leave(node),
            Event::Click(node) => self.handle_click(node, at, now),
            Event::Focus(node) => self.focus = node,
            Event::Resize { width, height } => self.apply_resize(Size::new(width, height)),
        }
    }

    fn handle_click(&mut self, node: NodeId, at: Duration, now: Duration) {
        let caps = self.registry.caps(node);
        if caps.contains(NodeCaps::LOGO) && self.logo.click(at) {
            self.request(ModeRequest::LogoTriggered, now);
        }
        if caps.contains(NodeCaps::FOOTER_WORD) {
            self.pops.pop(node, now);
            // The combo mode and Matrix mute the footer.
            if !matches!(self.modes.mode(), Mode::Matrix | Mode::Celebratory) {
                play_best_effort(&mut self.audio, AudioCue::Chime);
            }
        }
    }

    /// Route a mode request through the coordinator. Activations request
    /// their audio cue.
    fn request(&mut self, request: ModeRequest, now: Duration) -> Activation {
        let activation = self.modes.activate(request, now);
        if activation.is_activated() {
            play_best_effort(&mut self.audio, cue_for(request));
        }
        activation
    }

    fn apply_resize(&mut self, size: Size) {
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        resize_slot(&mut self.wave_slot, Layer::Wave, size);
        resize_slot(&mut self.rain_slot, Layer::Rain, size);
        self.wave.resize(size);
        if let Some(rain) = &mut self.rain {
            rain.resize(size);
        }
    }

    fn sync_layers(&mut self) {
        ensure_mounted(&mut self.wave_slot, &mut self.provider, Layer::Wave, self.viewport);

        let wants_rain = self.modes.mode() == Mode::Matrix;
        if wants_rain {
            if self.rain.is_none() {
                tracing::debug!("rain field mounted");
                self.rain = Some(RainField::new(self.config.rain));
            }
            ensure_mounted(&mut self.rain_slot, &mut self.provider, Layer::Rain, self.viewport);
        } else if self.rain.is_some() {
            tracing::debug!("rain field unmounted");
            self.rain = None;
            self.rain_slot = Slot::Empty;
        }
    }

    fn render(&mut self) -> bool {
        let ctx = FxContext::new(self.frame_idx, self.modes.signal());
        let mut rendered = false;
        if let Slot::Mounted(surface) = &mut self.wave_slot {
            self.wave.render(ctx, surface);
            rendered = true;
        }
        if let (Some(rain), Slot::Mounted(surface)) = (&mut self.rain, &mut self.rain_slot) {
            rain.render(ctx, surface);
            rendered = true;
        }
        rendered
    }

    /// Stop stepping and release every surface. Pending events are dropped.
    pub fn destroy(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.events.clear();
        self.wave_slot = Slot::Empty;
        self.rain = None;
        self.rain_slot = Slot::Empty;
        tracing::info!(frames = self.frame_idx, "stage destroyed");
    }

    // -- Readers ------------------------------------------------------------

    /// Whether [`destroy`](Self::destroy) has not been called.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    /// Current mode snapshot.
    #[must_use]
    pub fn signal(&self) -> ModeSignal {
        self.modes.signal()
    }

    /// Current transition message.
    #[must_use]
    pub fn banner(&self) -> Option<Banner> {
        self.modes.banner()
    }

    /// Overlay computed by the last step.
    #[must_use]
    pub const fn overlay(&self) -> OverlayFrame {
        self.overlay
    }

    /// Whether the preloader is still showing.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.preloader.is_loading()
    }

    /// Whether a footer word is currently popped.
    #[must_use]
    pub fn is_popped(&self, node: NodeId) -> bool {
        self.pops.is_popped(node)
    }

    /// Whether the rain layer is mounted with a surface.
    #[must_use]
    pub fn is_rain_mounted(&self) -> bool {
        self.rain.is_some() && self.rain_slot.surface().is_some()
    }

    /// The wave layer's surface, once mounted.
    #[must_use]
    pub fn wave_surface(&self) -> Option<&P::Surface> {
        self.wave_slot.surface()
    }

    /// The rain layer's surface, while mounted.
    #[must_use]
    pub fn rain_surface(&self) -> Option<&P::Surface> {
        self.rain_slot.surface()
    }

    /// The wave renderer.
    #[must_use]
    pub const fn wave(&self) -> &WaveField {
        &self.wave
    }

    /// Audio sink.
    #[must_use]
    pub const fn audio(&self) -> &A {
        &self.audio
    }

    /// Surface provider, for hosts that attach drawing targets after
    /// construction.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    /// Earliest pending deadline (mode reversion, word timeout, pop expiry).
    ///
    /// Hosts that do not animate every frame can sleep until then.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.modes.next_deadline(),
            self.matcher.next_deadline(),
            self.pops.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

impl<P: SurfaceProvider, A: AudioSink> Drop for Stage<P, A> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<P: SurfaceProvider, A: AudioSink> std::fmt::Debug for Stage<P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("mode", &self.modes.mode())
            .field("viewport", &self.viewport)
            .field("frame_idx", &self.frame_idx)
            .field("pending_events", &self.events.len())
            .field("rain_mounted", &self.is_rain_mounted())
            .field("running", &self.running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitefx_core::event::KeyEvent;
    use sitefx_runtime::audio::RecordingSink;

    type TestStage = Stage<RasterProvider, RecordingSink>;

    fn stage() -> TestStage {
        let mut stage = Stage::new(
            StageConfig::default(),
            RasterProvider,
            RecordingSink::default(),
        );
        stage.resize(64, 48);
        stage.step();
        stage
    }

    fn type_keys<P: SurfaceProvider>(stage: &mut Stage<P, RecordingSink>, keys: &[&str]) {
        for key in keys {
            stage.push_event(Event::Key(KeyEvent::from_dom_key(key)));
        }
    }

    const WORD: [&str; 6] = ["m", "a", "t", "r", "i", "x"];
    const COMBO: [&str; 10] = [
        "ArrowUp",
        "ArrowUp",
        "ArrowDown",
        "ArrowDown",
        "ArrowLeft",
        "ArrowRight",
        "ArrowLeft",
        "ArrowRight",
        "b",
        "a",
    ];

    /// Provider that refuses every request.
    struct NoContext;

    impl SurfaceProvider for NoContext {
        type Surface = RasterSurface;

        fn acquire(&mut self, _layer: Layer, _size: Size) -> Result<RasterSurface, SurfaceError> {
            Err(SurfaceError::ContextUnavailable("2d".into()))
        }
    }

    #[test]
    fn wave_mounts_on_first_sized_step() {
        let mut stage = Stage::new(StageConfig::default(), RasterProvider, RecordingSink::default());
        assert!(!stage.step().rendered);
        stage.resize(32, 32);
        let result = stage.step();
        assert!(result.rendered);
        assert_eq!(stage.wave_surface().map(Canvas::size), Some(Size::new(32, 32)));
    }

    #[test]
    fn word_mounts_rain_until_reversion() {
        let mut stage = stage();
        type_keys(&mut stage, &WORD);
        stage.step();
        assert_eq!(stage.mode(), Mode::Matrix);
        assert!(stage.is_rain_mounted());
        assert_eq!(stage.audio().played(), &[AudioCue::Matrix]);

        stage.advance_time(Duration::from_secs(12));
        let result = stage.step();
        assert_eq!(result.signal.mode, Mode::Normal);
        assert!(!stage.is_rain_mounted());
        assert_eq!(result.banner, None);
    }

    #[test]
    fn keys_ignored_while_text_entry_focused() {
        let mut stage = stage();
        let input = stage.register(InteractiveRole::TextInput);
        stage.push_event(Event::Focus(Some(input)));
        type_keys(&mut stage, &WORD);
        stage.step();
        assert_eq!(stage.mode(), Mode::Normal);

        stage.push_event(Event::Focus(None));
        type_keys(&mut stage, &WORD);
        stage.step();
        assert_eq!(stage.mode(), Mode::Matrix);
    }

    #[test]
    fn logo_clicks_trigger_logo_mode() {
        let mut stage = stage();
        let logo = stage.register_with(InteractiveRole::Link, NodeCaps::LOGO);
        for _ in 0..7 {
            stage.push_event(Event::Click(logo));
            stage.advance_time(Duration::from_millis(200));
            stage.step();
        }
        assert_eq!(stage.mode(), Mode::LogoTriggered);
        assert_eq!(stage.audio().played(), &[AudioCue::Logo]);
    }

    #[test]
    fn footer_chime_muted_by_combo_and_matrix() {
        let mut stage = stage();
        let word = stage.register_with(InteractiveRole::Marked, NodeCaps::FOOTER_WORD);
        stage.push_event(Event::Click(word));
        stage.step();
        assert!(stage.is_popped(word));
        assert_eq!(stage.audio().played(), &[AudioCue::Chime]);

        type_keys(&mut stage, &WORD);
        stage.push_event(Event::Click(word));
        stage.step();
        assert_eq!(stage.audio().played(), &[AudioCue::Chime, AudioCue::Matrix]);

        stage.advance_time(Duration::from_secs(1));
        stage.step();
        assert!(!stage.is_popped(word));
    }

    #[test]
    fn word_timeout_follows_key_stamps_not_frames() {
        let mut stage = stage();
        stage.push_event(Event::Key(KeyEvent::from_dom_key("m")));
        stage.step();
        for (i, key) in ["a", "t", "r", "i", "x"].into_iter().enumerate() {
            let at = Duration::from_millis(200 * (i as u64 + 1));
            stage.push_event_at(Event::Key(KeyEvent::from_dom_key(key)), at);
        }
        // One slow frame long after the first key.
        stage.set_time(Duration::from_millis(1_600));
        assert_eq!(stage.step().signal.mode, Mode::Matrix);
    }

    #[test]
    fn word_timeout_still_applies_between_stamped_keys() {
        let mut stage = stage();
        stage.push_event_at(Event::Key(KeyEvent::from_dom_key("m")), Duration::ZERO);
        for key in ["a", "t", "r", "i", "x"] {
            let late = Duration::from_millis(1_500);
            stage.push_event_at(Event::Key(KeyEvent::from_dom_key(key)), late);
        }
        stage.set_time(Duration::from_millis(1_600));
        assert_eq!(stage.step().signal.mode, Mode::Normal);
    }

    #[test]
    fn footer_chime_plays_in_logo_mode_but_not_combo_mode() {
        let mut stage = stage();
        let logo = stage.register_with(InteractiveRole::Link, NodeCaps::LOGO);
        let word = stage.register_with(InteractiveRole::Marked, NodeCaps::FOOTER_WORD);
        for _ in 0..7 {
            stage.push_event(Event::Click(logo));
            stage.advance_time(Duration::from_millis(100));
            stage.step();
        }
        assert_eq!(stage.mode(), Mode::LogoTriggered);
        stage.push_event(Event::Click(word));
        stage.step();
        assert_eq!(stage.audio().played(), &[AudioCue::Logo, AudioCue::Chime]);

        type_keys(&mut stage, &COMBO);
        stage.step();
        assert_eq!(stage.mode(), Mode::Celebratory);
        stage.push_event(Event::Click(word));
        stage.step();
        assert_eq!(
            stage.audio().played(),
            &[AudioCue::Logo, AudioCue::Chime, AudioCue::Celebration]
        );
    }

    #[test]
    fn failed_surface_leaves_layer_unmounted() {
        let mut stage = Stage::new(StageConfig::default(), NoContext, RecordingSink::default());
        stage.resize(64, 64);
        let result = stage.step();
        assert!(!result.rendered);
        assert!(stage.wave_surface().is_none());
        // Input still flows.
        type_keys(&mut stage, &WORD);
        assert_eq!(stage.step().signal.mode, Mode::Matrix);
        assert!(!stage.is_rain_mounted());
    }

    #[test]
    fn resize_reallocates_mounted_surfaces() {
        let mut stage = stage();
        type_keys(&mut stage, &WORD);
        stage.step();
        stage.resize(100, 40);
        stage.step();
        assert_eq!(stage.wave_surface().map(Canvas::size), Some(Size::new(100, 40)));
        assert_eq!(stage.rain_surface().map(Canvas::size), Some(Size::new(100, 40)));
    }

    #[test]
    fn preloader_clears_after_delay() {
        let mut stage = stage();
        assert!(stage.is_loading());
        stage.advance_time(PRELOADER_DURATION);
        assert!(!stage.step().loading);
    }

    #[test]
    fn destroy_stops_stepping() {
        let mut stage = stage();
        stage.destroy();
        stage.push_event(Event::PointerMove { x: 1.0, y: 1.0 });
        let result = stage.step();
        assert!(!result.running);
        assert_eq!(result.events_processed, 0);
        assert!(stage.wave_surface().is_none());
    }

    #[test]
    fn next_deadline_tracks_mode() {
        let mut stage = stage();
        assert_eq!(stage.next_deadline(), None);
        type_keys(&mut stage, &WORD);
        stage.step();
        assert_eq!(stage.next_deadline(), Some(Duration::from_secs(12)));
    }
}
