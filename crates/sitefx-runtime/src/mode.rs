#![forbid(unsafe_code)]

//! Global visual mode coordinator.
//!
//! [`ModeCoordinator`] is the single writer of the site-wide [`Mode`]. Every
//! trigger (combo, word, logo clicks) goes through [`ModeCoordinator::activate`];
//! renderers and the content layer only ever see [`ModeSignal`] copies.
//!
//! # Invariants
//!
//! 1. At most one non-Normal mode is active.
//! 2. An active mode reverts to Normal when `now >= activated_at + duration`,
//!    never earlier.
//! 3. Matrix wins: while Matrix is active, Celebratory and LogoTriggered
//!    requests are refused, and a Matrix request supersedes either.
//! 4. Matrix re-entry is a silent no-op; its deadline is not extended.
//! 5. Celebratory and LogoTriggered replace each other (and themselves)
//!    with a fresh duration.
//! 6. `version` increments on every observable change (activation,
//!    replacement, reversion) and on nothing else.
//!
//! # Example
//!
//! ```
//! use sitefx_runtime::mode::{Mode, ModeCoordinator, ModeRequest};
//! use std::time::Duration;
//!
//! let mut modes = ModeCoordinator::default();
//! modes.activate(ModeRequest::Matrix, Duration::ZERO);
//! assert_eq!(modes.mode(), Mode::Matrix);
//! assert!(modes.signal().suppress_background);
//!
//! modes.poll(Duration::from_secs(12));
//! assert_eq!(modes.mode(), Mode::Normal);
//! ```

use std::fmt;
use std::time::Duration;

/// Site-wide visual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Triggered by the key combo.
    Celebratory,
    /// Triggered by the typed word.
    Matrix,
    /// Triggered by rapid logo clicks.
    LogoTriggered,
}

impl Mode {
    /// Stable lowercase name for hosts and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Celebratory => "celebratory",
            Self::Matrix => "matrix",
            Self::LogoTriggered => "logo",
        }
    }

    /// Celebratory or LogoTriggered: the two modes that share the festive
    /// palette and pointer style.
    #[must_use]
    pub const fn is_festive(self) -> bool {
        matches!(self, Self::Celebratory | Self::LogoTriggered)
    }

    /// Matrix or LogoTriggered: the page hides its background imagery.
    #[must_use]
    pub const fn suppresses_background(self) -> bool {
        matches!(self, Self::Matrix | Self::LogoTriggered)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to enter a non-Normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeRequest {
    Celebratory,
    Matrix,
    LogoTriggered,
}

impl ModeRequest {
    /// The mode this request enters.
    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::Celebratory => Mode::Celebratory,
            Self::Matrix => Mode::Matrix,
            Self::LogoTriggered => Mode::LogoTriggered,
        }
    }
}

/// How long each mode stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDurations {
    /// Default: 7s.
    pub celebratory: Duration,
    /// Default: 12s.
    pub matrix: Duration,
    /// Default: 5s.
    pub logo: Duration,
}

impl Default for ModeDurations {
    fn default() -> Self {
        Self {
            celebratory: Duration::from_secs(7),
            matrix: Duration::from_secs(12),
            logo: Duration::from_secs(5),
        }
    }
}

impl ModeDurations {
    /// Duration for `request`.
    #[must_use]
    pub const fn for_request(&self, request: ModeRequest) -> Duration {
        match request {
            ModeRequest::Celebratory => self.celebratory,
            ModeRequest::Matrix => self.matrix,
            ModeRequest::LogoTriggered => self.logo,
        }
    }
}

/// Transition message shown while a mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Banner {
    pub text: &'static str,
    pub subtitle: Option<&'static str>,
}

impl Banner {
    const SUBTITLE: &'static str = "Enjoy the chaos!";

    /// Banner announcing `mode`, if it has one.
    #[must_use]
    pub const fn for_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Normal => None,
            Mode::Celebratory => Some(Self {
                text: "FUN MODE ACTIVATED!",
                subtitle: Some(Self::SUBTITLE),
            }),
            Mode::Matrix => Some(Self {
                text: "ENTERING THE MATRIX...",
                subtitle: None,
            }),
            Mode::LogoTriggered => Some(Self {
                text: "LOGO FUN MODE!",
                subtitle: Some(Self::SUBTITLE),
            }),
        }
    }
}

/// Read-only snapshot handed to renderers and the content layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSignal {
    pub mode: Mode,
    /// True while Matrix or LogoTriggered is active: the content layer drops
    /// its background imagery (Matrix shows the rain field behind it).
    pub suppress_background: bool,
    pub version: u64,
}

/// Why [`ModeCoordinator::activate`] did not change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refusal {
    /// Matrix is active and outranks the request.
    MatrixActive,
    /// Matrix was requested while already active.
    AlreadyMatrix,
}

/// Result of an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    /// The mode is now active until `deadline`.
    Activated {
        mode: Mode,
        previous: Mode,
        deadline: Duration,
    },
    /// Nothing changed.
    Refused(Refusal),
}

impl Activation {
    /// Whether the request changed the mode.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        matches!(self, Self::Activated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveMode {
    mode: Mode,
    activated_at: Duration,
    deadline: Duration,
}

/// Versioned single-writer mode container.
#[derive(Debug, Clone, Default)]
pub struct ModeCoordinator {
    durations: ModeDurations,
    active: Option<ActiveMode>,
    version: u64,
}

impl ModeCoordinator {
    /// Create a coordinator in Normal mode.
    #[must_use]
    pub fn new(durations: ModeDurations) -> Self {
        Self {
            durations,
            active: None,
            version: 0,
        }
    }

    /// Request a mode at monotonic time `now`.
    ///
    /// Expired modes are reverted first, so a stale deadline never blocks a
    /// new activation.
    pub fn activate(&mut self, request: ModeRequest, now: Duration) -> Activation {
        self.poll(now);

        let previous = self.mode();
        let target = request.mode();
        match (previous, target) {
            (Mode::Matrix, Mode::Matrix) => {
                tracing::debug!("matrix re-entry ignored");
                return Activation::Refused(Refusal::AlreadyMatrix);
            }
            (Mode::Matrix, _) => {
                tracing::debug!(requested = %target, "activation refused while matrix active");
                return Activation::Refused(Refusal::MatrixActive);
            }
            _ => {}
        }

        let duration = self.durations.for_request(request);
        let deadline = now.saturating_add(duration);
        self.active = Some(ActiveMode {
            mode: target,
            activated_at: now,
            deadline,
        });
        self.version += 1;
        tracing::info!(
            mode = %target,
            previous = %previous,
            duration_ms = duration.as_millis() as u64,
            "mode activated"
        );
        Activation::Activated {
            mode: target,
            previous,
            deadline,
        }
    }

    /// Revert an expired mode. Returns the mode that ended, if any.
    pub fn poll(&mut self, now: Duration) -> Option<Mode> {
        let active = self.active?;
        if now < active.deadline {
            return None;
        }
        self.active = None;
        self.version += 1;
        tracing::info!(
            mode = %active.mode,
            active_ms = now.saturating_sub(active.activated_at).as_millis() as u64,
            "mode reverted"
        );
        Some(active.mode)
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.active.map_or(Mode::Normal, |a| a.mode)
    }

    /// Snapshot for readers.
    #[must_use]
    pub fn signal(&self) -> ModeSignal {
        let mode = self.mode();
        ModeSignal {
            mode,
            suppress_background: mode.suppresses_background(),
            version: self.version,
        }
    }

    /// Banner for the active mode; `None` in Normal.
    #[must_use]
    pub fn banner(&self) -> Option<Banner> {
        Banner::for_mode(self.mode())
    }

    /// When the active mode reverts.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.active.map(|a| a.deadline)
    }

    /// Change counter.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Configured durations.
    #[must_use]
    pub const fn durations(&self) -> &ModeDurations {
        &self.durations
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
