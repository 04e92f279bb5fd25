#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! The host translates raw DOM (or native) events into [`Event`] values and
//! pushes them into the engine in arrival order.
//!
//! # Design Notes
//!
//! - Key identifiers are normalized to lowercase: `"ArrowUp"` becomes
//!   [`KeyCode::Up`] and `"B"` becomes `KeyCode::Char('b')`.
//! - Keys the engine has no name for map to [`KeyCode::Unidentified`]; matchers
//!   treat them as a reset, never as an error.
//! - Pointer coordinates are viewport CSS pixels.

use std::fmt;

use crate::interactive::NodeId;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// Raw pointer movement at native event rate.
    PointerMove {
        x: f32,
        y: f32,
    },

    /// The pointer entered a tagged node.
    PointerEnter(NodeId),

    /// The pointer left a tagged node.
    PointerLeave(NodeId),

    /// A tagged node was clicked.
    Click(NodeId),

    /// Input focus moved. `None` when focus left every tagged node.
    Focus(Option<NodeId>),

    /// Viewport was resized (device pixels).
    Resize {
        width: u32,
        height: u32,
    },
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Normalized key identifier.
    pub code: KeyCode,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a press event.
    #[must_use]
    pub const fn press(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Press,
        }
    }

    /// Build a press event from a DOM `KeyboardEvent.key` string.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        Self::press(KeyCode::from_dom_key(key))
    }
}

/// Key press kind. Only `Press` and `Repeat` feed key sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Lowercase key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character, lowercased.
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key (F1..=F24).
    F(u8),
    /// Modifier-only presses and anything else without a stable name.
    Unidentified,
}

impl KeyCode {
    /// Normalize a DOM `KeyboardEvent.key` value.
    ///
    /// Matching is case-insensitive, so `"ArrowUp"` and `"arrowup"` agree.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        let mut chars = key.chars();
        if let Some(first) = chars.next()
            && chars.next().is_none()
        {
            return Self::Char(lowercase_char(first));
        }

        let lower = key.to_ascii_lowercase();
        match lower.as_str() {
            "arrowup" | "up" => Self::Up,
            "arrowdown" | "down" => Self::Down,
            "arrowleft" | "left" => Self::Left,
            "arrowright" | "right" => Self::Right,
            "enter" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "delete" | "del" => Self::Delete,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" => Self::PageUp,
            "pagedown" => Self::PageDown,
            "spacebar" => Self::Char(' '),
            other => parse_function_key(other).map_or(Self::Unidentified, Self::F),
        }
    }

    /// Lowercase identifier, matching the DOM name where one exists.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::Up => "arrowup".into(),
            Self::Down => "arrowdown".into(),
            Self::Left => "arrowleft".into(),
            Self::Right => "arrowright".into(),
            Self::Enter => "enter".into(),
            Self::Escape => "escape".into(),
            Self::Backspace => "backspace".into(),
            Self::Tab => "tab".into(),
            Self::Delete => "delete".into(),
            Self::Home => "home".into(),
            Self::End => "end".into(),
            Self::PageUp => "pageup".into(),
            Self::PageDown => "pagedown".into(),
            Self::F(n) => format!("f{n}"),
            Self::Unidentified => "unidentified".into(),
        }
    }

    /// Whether this is one of the four arrow keys.
    #[must_use]
    pub const fn is_arrow(&self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

fn lowercase_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

fn parse_function_key(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('f')?;
    let n: u8 = digits.parse().ok()?;
    (1..=24).contains(&n).then_some(n)
}
