#![forbid(unsafe_code)]

//! Best-effort audio cues.
//!
//! Each mode activation (and a footer word click in Normal mode) requests a
//! short synth phrase. The phrase is data ([`AudioCue::steps`]); playing it
//! is the host's job behind [`AudioSink`]. A sink failure is logged and never
//! blocks the activation that requested it.

use std::fmt;
use std::time::Duration;

/// A short synth phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Three rising major triads (combo).
    Celebration,
    /// Three low FM notes (word).
    Matrix,
    /// Three membrane hits (logo).
    Logo,
    /// Three-note arpeggio (footer word).
    Chime,
}

/// Synth voice a cue is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    /// Polyphonic triangle-ish voice.
    Poly,
    /// Frequency-modulated voice.
    Fm,
    /// Pitched drum.
    Membrane,
    /// Plain monophonic voice.
    Mono,
}

/// Note length at the reference tempo of 120 bpm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteLength {
    Eighth,
    Half,
}

impl NoteLength {
    /// Length as wall time.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Eighth => Duration::from_millis(250),
            Self::Half => Duration::from_millis(1000),
        }
    }
}

/// One onset in a cue: every pitch starts together at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueStep {
    pub offset: Duration,
    /// Scientific pitch names, e.g. `"C4"`.
    pub pitches: &'static [&'static str],
    pub length: NoteLength,
}

const fn step(offset_ms: u64, pitches: &'static [&'static str], length: NoteLength) -> CueStep {
    CueStep {
        offset: Duration::from_millis(offset_ms),
        pitches,
        length,
    }
}

const CELEBRATION: [CueStep; 3] = [
    step(0, &["C4", "E4", "G4"], NoteLength::Eighth),
    step(200, &["E4", "G4", "C5"], NoteLength::Eighth),
    step(400, &["G4", "C5", "E5"], NoteLength::Eighth),
];

const MATRIX: [CueStep; 3] = [
    step(0, &["C2"], NoteLength::Half),
    step(100, &["G2"], NoteLength::Half),
    step(200, &["D3"], NoteLength::Half),
];

const LOGO: [CueStep; 3] = [
    step(0, &["C2"], NoteLength::Eighth),
    step(150, &["G2"], NoteLength::Eighth),
    step(300, &["C3"], NoteLength::Eighth),
];

const CHIME: [CueStep; 3] = [
    step(0, &["C5"], NoteLength::Eighth),
    step(100, &["E5"], NoteLength::Eighth),
    step(200, &["G5"], NoteLength::Eighth),
];

impl AudioCue {
    /// Voice the cue is written for.
    #[must_use]
    pub const fn voice(self) -> Voice {
        match self {
            Self::Celebration => Voice::Poly,
            Self::Matrix => Voice::Fm,
            Self::Logo => Voice::Membrane,
            Self::Chime => Voice::Mono,
        }
    }

    /// Onsets in time order.
    #[must_use]
    pub const fn steps(self) -> &'static [CueStep] {
        match self {
            Self::Celebration => &CELEBRATION,
            Self::Matrix => &MATRIX,
            Self::Logo => &LOGO,
            Self::Chime => &CHIME,
        }
    }

    /// Time from the first onset to the end of the last note.
    #[must_use]
    pub fn total_duration(self) -> Duration {
        self.steps()
            .iter()
            .map(|s| s.offset + s.length.duration())
            .max()
            .unwrap_or_default()
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Celebration => "celebration",
            Self::Matrix => "matrix",
            Self::Logo => "logo",
            Self::Chime => "chime",
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frequency in Hz of a scientific pitch name (`"A4"` = 440 Hz).
///
/// Accepts an optional `#` or `b` after the letter. Returns `None` for
/// anything else.
#[must_use]
pub fn pitch_frequency(name: &str) -> Option<f32> {
    let mut chars = name.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let mut class: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let octave_str = if let Some(r) = rest.strip_prefix('#') {
        class += 1;
        r
    } else if let Some(r) = rest.strip_prefix('b') {
        class -= 1;
        r
    } else {
        rest
    };
    let octave: i32 = octave_str.parse().ok()?;
    if !(-1..=9).contains(&octave) {
        return None;
    }
    let midi = 12 * (octave + 1) + class;
    Some(440.0 * 2f32.powf((midi - 69) as f32 / 12.0))
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Why a cue could not be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The host has no audio output (or it is still locked by autoplay
    /// policy).
    Unavailable(String),
    /// The host rejected the request.
    Rejected(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "audio unavailable: {msg}"),
            Self::Rejected(msg) => write!(f, "audio request rejected: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Host audio output.
pub trait AudioSink {
    /// Start playing `cue`. Must not block until the cue ends.
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError>;
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _cue: AudioCue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Records requested cues, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    played: Vec<AudioCue>,
}

impl RecordingSink {
    /// Cues requested so far, in order.
    #[must_use]
    pub fn played(&self) -> &[AudioCue] {
        &self.played
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        self.played.push(cue);
        Ok(())
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        (**self).play(cue)
    }
}

/// Play `cue`, logging instead of returning failures.
///
/// Returns `true` if the sink accepted the cue.
pub fn play_best_effort<S: AudioSink + ?Sized>(sink: &mut S, cue: AudioCue) -> bool {
    match sink.play(cue) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(cue = %cue, error = %err, "audio cue failed");
            false
        }
    }
}
