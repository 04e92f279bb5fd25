//! Property-based invariant tests for the stage.
//!
//! 1. Any event stream is processed without panicking.
//! 2. The rain layer is mounted exactly while Matrix is active.
//! 3. `suppress_background` follows Matrix and LogoTriggered in every step result.
//! 4. While a text field holds focus, no key changes the mode.
//! 5. Hidden overlay implies a non-hidden native glyph, outside Matrix.

use std::time::Duration;

use proptest::prelude::*;
use sitefx_core::event::{Event, KeyEvent};
use sitefx_core::interactive::{InteractiveRole, NativeCursor, NodeCaps, NodeId};
use sitefx_runtime::audio::SilentSink;
use sitefx_runtime::mode::Mode;
use sitefx_web::{RasterProvider, Stage, StageConfig};

// ── Helpers ─────────────────────────────────────────────────────────────

const KEYS: [&str; 12] = [
    "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "b", "a", "m", "t", "r", "i", "x", "Shift",
];

fn key_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(KEYS.to_vec())
}

fn event_strategy(nodes: u32) -> impl Strategy<Value = Event> {
    prop_oneof![
        6 => key_strategy().prop_map(|k| Event::Key(KeyEvent::from_dom_key(k))),
        2 => (0.0f32..500.0, 0.0f32..500.0).prop_map(|(x, y)| Event::PointerMove { x, y }),
        1 => (0..nodes).prop_map(|n| Event::PointerEnter(NodeId(n))),
        1 => (0..nodes).prop_map(|n| Event::PointerLeave(NodeId(n))),
        2 => (0..nodes).prop_map(|n| Event::Click(NodeId(n))),
        1 => prop::option::of(0..nodes).prop_map(|n| Event::Focus(n.map(NodeId))),
        1 => (0u32..300, 0u32..300).prop_map(|(width, height)| Event::Resize { width, height }),
    ]
}

/// Registers a logo, a footer word, a button, and a text field (ids 0..4).
fn stage() -> Stage<RasterProvider, SilentSink> {
    let mut stage = Stage::new(StageConfig::default(), RasterProvider, SilentSink);
    stage.register_with(InteractiveRole::Link, NodeCaps::LOGO);
    stage.register_with(InteractiveRole::Marked, NodeCaps::FOOTER_WORD);
    stage.register(InteractiveRole::Button);
    stage.register(InteractiveRole::TextInput);
    stage
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3, 5. Random sessions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn random_sessions_hold_invariants(
        steps in prop::collection::vec(
            (prop::collection::vec(event_strategy(5), 0..8), 0u64..2000),
            1..60,
        ),
    ) {
        let mut stage = stage();
        stage.resize(64, 64);
        for (events, gap) in steps {
            for event in events {
                stage.push_event(event);
            }
            stage.advance_time(Duration::from_millis(gap));
            let result = stage.step();
            let matrix = result.signal.mode == Mode::Matrix;

            prop_assert_eq!(
                result.signal.suppress_background,
                matches!(result.signal.mode, Mode::Matrix | Mode::LogoTriggered)
            );
            prop_assert_eq!(result.banner.is_some(), result.signal.mode != Mode::Normal);
            if !stage.viewport().is_empty() {
                prop_assert_eq!(stage.is_rain_mounted(), matrix);
            } else {
                prop_assert!(!stage.is_rain_mounted());
            }
            if !matrix && !result.overlay.overlay_visible() {
                prop_assert!(result.overlay.native_cursor != NativeCursor::Hidden);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Focus filter
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn focused_text_field_swallows_keys(keys in prop::collection::vec(key_strategy(), 0..80)) {
        let mut stage = stage();
        stage.push_event(Event::Focus(Some(NodeId(3))));
        for key in keys {
            stage.push_event(Event::Key(KeyEvent::from_dom_key(key)));
            stage.advance_time(Duration::from_millis(50));
            let result = stage.step();
            prop_assert_eq!(result.signal.mode, Mode::Normal);
            prop_assert_eq!(result.signal.version, 0);
        }
    }
}
