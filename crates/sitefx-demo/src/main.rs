#![forbid(unsafe_code)]

//! Headless sitefx session.
//!
//! Drives a [`Stage`] on raster surfaces through a scripted visit (hover,
//! the combo, the word, rapid logo clicks, a footer word) and logs every mode
//! transition as a frame report. Finishes with a relay dry run against an
//! in-memory transport.
//!
//! | Variable          | Meaning                                         |
//! |-------------------|-------------------------------------------------|
//! | `RUST_LOG`        | Log filter (default `info`)                     |
//! | `SITEFX_OPTIONS`  | Stage options as JSON                           |
//! | `SITEFX_DUMP`     | Write the final wave frame to this path as PPM  |
//! | `EMAIL_*`         | Relay configuration, see `sitefx_relay::config` |

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::time::Duration;

use sitefx_core::event::{Event, KeyEvent};
use sitefx_core::interactive::{InteractiveRole, NodeCaps, NodeId};
use sitefx_render::color::PackedRgba;
use sitefx_runtime::audio::RecordingSink;
use sitefx_runtime::scheduler::{FrameScheduler, IntervalScheduler};
use sitefx_relay::{MemoryTransport, RelayConfig, RelayHandler};
use sitefx_web::{FrameReport, OptionsError, RasterProvider, Stage, StageConfig, parse_config};
use tracing_subscriber::EnvFilter;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const SESSION_END_MS: u64 = 40_000;
const VIEWPORT: (u32, u32) = (320, 180);

const COMBO_KEYS: [&str; 10] = [
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

const SAMPLE_SUBMISSION: &str =
    r#"{"name":"Demo","email":"demo@example.com","subject":"Hello","message":"Sent from sitefx-demo."}"#;

#[derive(Debug)]
enum DemoError {
    Options(OptionsError),
    Dump { path: String, source: io::Error },
    NoWaveSurface,
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Options(err) => write!(f, "invalid SITEFX_OPTIONS: {err}"),
            Self::Dump { path, source } => write!(f, "cannot write {path}: {source}"),
            Self::NoWaveSurface => f.write_str("the wave layer was never mounted"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Options(err) => Some(err),
            Self::Dump { source, .. } => Some(source),
            Self::NoWaveSurface => None,
        }
    }
}

impl From<OptionsError> for DemoError {
    fn from(err: OptionsError) -> Self {
        Self::Options(err)
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

struct Nodes {
    logo: NodeId,
    footer_word: NodeId,
    button: NodeId,
    email_field: NodeId,
}

fn type_keys(script: &mut Vec<(u64, Event)>, start_ms: u64, gap_ms: u64, keys: &[&str]) {
    for (i, key) in keys.iter().enumerate() {
        let at = start_ms + gap_ms * i as u64;
        script.push((at, Event::Key(KeyEvent::from_dom_key(key))));
    }
}

/// Timestamped events for one visit, sorted by time.
fn session(nodes: &Nodes) -> Vec<(u64, Event)> {
    let mut script = Vec::new();

    // Wander over a button while the page loads.
    for (i, at) in (500..2_000).step_by(100).enumerate() {
        let x = 20.0 + 12.0 * i as f32;
        script.push((at, Event::PointerMove { x, y: 90.0 }));
    }
    script.push((1_200, Event::PointerEnter(nodes.button)));
    script.push((1_800, Event::PointerLeave(nodes.button)));

    // Typing the word inside a text field must not trigger anything.
    script.push((2_600, Event::Focus(Some(nodes.email_field))));
    type_keys(&mut script, 2_700, 80, &["m", "a", "t", "r", "i", "x"]);
    script.push((3_400, Event::Focus(None)));

    type_keys(&mut script, 4_000, 60, &COMBO_KEYS);
    type_keys(&mut script, 7_000, 90, &["m", "a", "t", "r", "i", "x"]);

    for i in 0..7 {
        script.push((25_000 + 150 * i, Event::Click(nodes.logo)));
    }

    script.push((36_000, Event::PointerMove { x: 160.0, y: 170.0 }));
    script.push((36_100, Event::Click(nodes.footer_word)));

    script.sort_by_key(|(at, _)| *at);
    script
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn run_stage(config: StageConfig) -> Stage<RasterProvider, RecordingSink> {
    let mut stage = Stage::new(config, RasterProvider, RecordingSink::default());
    let nodes = Nodes {
        logo: stage.register_with(InteractiveRole::Link, NodeCaps::LOGO),
        footer_word: stage.register_with(InteractiveRole::Marked, NodeCaps::FOOTER_WORD),
        button: stage.register(InteractiveRole::Button),
        email_field: stage.register(InteractiveRole::TextInput),
    };
    stage.resize(VIEWPORT.0, VIEWPORT.1);

    let script = session(&nodes);
    let mut pending = script.into_iter().peekable();
    let mut scheduler = IntervalScheduler::new(FRAME_INTERVAL);
    scheduler.start(Duration::ZERO);

    let mut last_version = None;
    let mut was_loading = true;
    let mut frames = 0u64;

    for now_ms in (0..=SESSION_END_MS).step_by(4) {
        while let Some((_, event)) = pending.next_if(|(at, _)| *at <= now_ms) {
            stage.push_event(event);
        }
        let now = Duration::from_millis(now_ms);
        if scheduler.poll(now) == 0 {
            continue;
        }
        stage.set_time(now);
        let result = stage.step();
        frames += 1;

        if was_loading && !result.loading {
            tracing::info!(at_ms = now_ms, "preloader finished");
        }
        was_loading = result.loading;

        if last_version != Some(result.signal.version) {
            last_version = Some(result.signal.version);
            tracing::info!(
                at_ms = now_ms,
                mode = %result.signal.mode,
                rain = stage.is_rain_mounted(),
                "mode transition"
            );
            tracing::debug!(report = %FrameReport::from_step(&result).to_json(), "frame");
        }
    }

    tracing::info!(
        frames,
        cues = ?stage.audio().played(),
        popped = stage.is_popped(nodes.footer_word),
        "session finished"
    );
    stage
}

fn dump_wave(stage: &Stage<RasterProvider, RecordingSink>, path: &str) -> Result<(), DemoError> {
    let surface = stage.wave_surface().ok_or(DemoError::NoWaveSurface)?;
    let io_err = |source| DemoError::Dump {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    surface
        .write_ppm(&mut out, PackedRgba::BLACK)
        .and_then(|()| out.flush())
        .map_err(io_err)?;
    tracing::info!(path, painted = surface.painted_count(), "wave frame written");
    Ok(())
}

fn relay_dry_run() {
    let config = RelayConfig::from_env();
    let mut relay = RelayHandler::new(config, MemoryTransport::default());
    let response = relay.handle("POST", SAMPLE_SUBMISSION);
    tracing::info!(
        status = response.status,
        body = %response.body(),
        queued = relay.transport().sent().len(),
        "relay dry run"
    );
}

fn run() -> Result<(), DemoError> {
    let options = std::env::var("SITEFX_OPTIONS").unwrap_or_default();
    let config = parse_config(&options)?;

    let stage = run_stage(config);
    if let Ok(path) = std::env::var("SITEFX_DUMP") {
        dump_wave(&stage, &path)?;
    }
    relay_dry_run();
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "sitefx-demo failed");
            ExitCode::FAILURE
        }
    }
}
