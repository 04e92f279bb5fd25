#![forbid(unsafe_code)]

//! Key sequence matcher for hidden-mode triggers.
//!
//! Two target sequences are tracked independently over the same key stream:
//! a 10-key *combo* (arrows plus two letters) and a 6-letter *word*. Each is a
//! [`PrefixMatcher`] whose buffer always equals a prefix of its target.
//!
//! # Design
//!
//! ## Invariants
//! 1. `buffer == target[..buffer.len()]` at all times, and
//!    `buffer.len() < target.len()` between calls.
//! 2. A completed sequence clears its buffer before returning.
//! 3. On mismatch the buffer falls back to the longest suffix of
//!    `buffer + key` that is still a prefix of the target. For targets whose
//!    first symbol does not reappear, this is `[key]` when `key` restarts the
//!    sequence and `[]` otherwise.
//! 4. With an idle timeout configured, a key arriving at or after
//!    `last_accept + timeout` is evaluated against an empty buffer.
//!
//! ## Failure Modes
//! - Unknown keys ([`KeyCode::Unidentified`]) never match, so they reset the
//!   buffer like any other mismatch.
//!
//! Timestamps are host monotonic time expressed as [`Duration`] since start,
//! so the matcher behaves identically under a deterministic clock.
//!
//! # Example
//!
//! ```
//! use sitefx_core::key_sequence::{SequenceHits, SequenceMatcher};
//! use sitefx_core::event::KeyEvent;
//! use std::time::Duration;
//!
//! let mut matcher = SequenceMatcher::with_defaults();
//! let mut hits = SequenceHits::empty();
//! for (i, key) in ["m", "a", "t", "r", "i", "x"].into_iter().enumerate() {
//!     let now = Duration::from_millis(i as u64 * 100);
//!     hits |= matcher.feed(&KeyEvent::from_dom_key(key), now);
//! }
//! assert!(hits.contains(SequenceHits::WORD));
//! ```

use std::time::Duration;

use bitflags::bitflags;

use crate::event::{KeyCode, KeyEvent, KeyEventKind};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The 10-key combo: up up down down left right left right b a.
pub const COMBO_SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Char('b'),
    KeyCode::Char('a'),
];

/// The 6-letter word.
pub const WORD_SEQUENCE: [KeyCode; 6] = [
    KeyCode::Char('m'),
    KeyCode::Char('a'),
    KeyCode::Char('t'),
    KeyCode::Char('r'),
    KeyCode::Char('i'),
    KeyCode::Char('x'),
];

/// Configuration for sequence detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceConfig {
    /// Combo target (default: [`COMBO_SEQUENCE`]).
    pub combo: Vec<KeyCode>,

    /// Word target (default: [`WORD_SEQUENCE`]).
    pub word: Vec<KeyCode>,

    /// Word buffer idle timeout (default: 1500ms).
    ///
    /// Measured from the last key the word buffer accepted.
    pub word_idle_timeout: Duration,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            combo: COMBO_SEQUENCE.to_vec(),
            word: WORD_SEQUENCE.to_vec(),
            word_idle_timeout: Duration::from_millis(1500),
        }
    }
}

impl SequenceConfig {
    /// Create a config with a custom word idle timeout.
    #[must_use]
    pub fn with_word_timeout(timeout: Duration) -> Self {
        Self {
            word_idle_timeout: timeout,
            ..Default::default()
        }
    }

    /// Replace the word target with the letters of `word`, lowercased.
    #[must_use]
    pub fn with_word(mut self, word: &str) -> Self {
        self.word = word
            .chars()
            .map(|c| KeyCode::from_dom_key(c.encode_utf8(&mut [0; 4])))
            .collect();
        self
    }
}

// ---------------------------------------------------------------------------
// PrefixMatcher
// ---------------------------------------------------------------------------

/// Outcome of feeding one key to a [`PrefixMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixStep {
    /// The key extended the running prefix.
    Extended,
    /// The key mismatched, but a shorter prefix ending in it survives.
    Restarted,
    /// The key mismatched and nothing survives; the buffer is empty.
    Cleared,
    /// The key completed the target; the buffer is empty.
    Complete,
}

/// Running prefix match against one fixed target sequence.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    target: Vec<KeyCode>,
    /// `fallback[i]`: length of the longest proper suffix of `target[..=i]`
    /// that is also a prefix of `target`.
    fallback: Vec<usize>,
    buffer: Vec<KeyCode>,
    last_accept: Option<Duration>,
    idle_timeout: Option<Duration>,
}

impl PrefixMatcher {
    /// Create a matcher for `target` with no idle timeout.
    #[must_use]
    pub fn new(target: Vec<KeyCode>) -> Self {
        let fallback = fallback_table(&target);
        let capacity = target.len();
        Self {
            target,
            fallback,
            buffer: Vec::with_capacity(capacity),
            last_accept: None,
            idle_timeout: None,
        }
    }

    /// Clear the buffer once `timeout` has elapsed since the last accepted key.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Feed one key at monotonic time `now`.
    pub fn feed(&mut self, key: KeyCode, now: Duration) -> PrefixStep {
        self.check_timeout(now);

        if self.target.is_empty() {
            return PrefixStep::Cleared;
        }

        let prev = self.buffer.len();
        let next = self.next_len(key);

        if next == self.target.len() {
            self.reset();
            PrefixStep::Complete
        } else if next == prev + 1 {
            self.buffer.push(key);
            self.last_accept = Some(now);
            PrefixStep::Extended
        } else if next == 0 {
            self.reset();
            PrefixStep::Cleared
        } else {
            self.buffer.clear();
            self.buffer.extend_from_slice(&self.target[..next]);
            self.last_accept = Some(now);
            PrefixStep::Restarted
        }
    }

    /// Discard the buffer if the idle timeout has expired.
    ///
    /// Returns `true` if buffered keys were discarded.
    pub fn check_timeout(&mut self, now: Duration) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Monotonic time at which the buffer will be discarded, if pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        let timeout = self.idle_timeout?;
        let last = self.last_accept?;
        Some(last.saturating_add(timeout))
    }

    /// Time remaining until the idle timeout discards the buffer.
    #[must_use]
    pub fn time_until_timeout(&self, now: Duration) -> Option<Duration> {
        self.deadline().map(|deadline| deadline.saturating_sub(now))
    }

    /// Discard any buffered keys.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_accept = None;
    }

    /// Currently buffered keys (always a prefix of the target).
    #[must_use]
    pub fn buffer(&self) -> &[KeyCode] {
        &self.buffer
    }

    /// The target sequence.
    #[must_use]
    pub fn target(&self) -> &[KeyCode] {
        &self.target
    }

    fn next_len(&self, key: KeyCode) -> usize {
        let mut len = self.buffer.len();
        loop {
            if len < self.target.len() && self.target[len] == key {
                return len + 1;
            }
            if len == 0 {
                return 0;
            }
            len = self.fallback[len - 1];
        }
    }
}

fn fallback_table(target: &[KeyCode]) -> Vec<usize> {
    let mut table = vec![0; target.len()];
    let mut k = 0;
    for i in 1..target.len() {
        while k > 0 && target[i] != target[k] {
            k = table[k - 1];
        }
        if target[i] == target[k] {
            k += 1;
        }
        table[i] = k;
    }
    table
}

// ---------------------------------------------------------------------------
// SequenceMatcher
// ---------------------------------------------------------------------------

bitflags! {
    /// Sequences completed by a single key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SequenceHits: u8 {
        /// The combo completed.
        const COMBO = 1 << 0;
        /// The word completed.
        const WORD = 1 << 1;
    }
}

/// Combo and word matchers fed from one key stream.
pub struct SequenceMatcher {
    config: SequenceConfig,
    combo: PrefixMatcher,
    word: PrefixMatcher,
}

impl std::fmt::Debug for SequenceMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceMatcher")
            .field("combo_len", &self.combo.buffer().len())
            .field("word_len", &self.word.buffer().len())
            .finish()
    }
}

impl SequenceMatcher {
    /// Create a matcher with the given configuration.
    #[must_use]
    pub fn new(config: SequenceConfig) -> Self {
        let combo = PrefixMatcher::new(config.combo.clone());
        let word =
            PrefixMatcher::new(config.word.clone()).with_idle_timeout(config.word_idle_timeout);
        Self {
            config,
            combo,
            word,
        }
    }

    /// Create a matcher with default combo, word, and timeout.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SequenceConfig::default())
    }

    /// Feed a key event.
    ///
    /// Release events are ignored. Press and repeat events advance both
    /// matchers; the returned flags name every sequence this key completed.
    pub fn feed(&mut self, event: &KeyEvent, now: Duration) -> SequenceHits {
        if event.kind == KeyEventKind::Release {
            return SequenceHits::empty();
        }

        let mut hits = SequenceHits::empty();
        if self.combo.feed(event.code, now) == PrefixStep::Complete {
            tracing::debug!(key = %event.code, "combo sequence completed");
            hits |= SequenceHits::COMBO;
        }
        if self.word.feed(event.code, now) == PrefixStep::Complete {
            tracing::debug!(key = %event.code, "word sequence completed");
            hits |= SequenceHits::WORD;
        }
        hits
    }

    /// Discard an idle word buffer. Call on every step.
    ///
    /// Returns `true` if buffered keys were discarded.
    pub fn check_timeout(&mut self, now: Duration) -> bool {
        self.word.check_timeout(now)
    }

    /// Earliest pending timeout, for hosts that schedule wakeups.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.word.deadline()
    }

    /// Discard both buffers.
    pub fn reset(&mut self) {
        self.combo.reset();
        self.word.reset();
    }

    /// Buffered combo keys.
    #[must_use]
    pub fn combo_buffer(&self) -> &[KeyCode] {
        self.combo.buffer()
    }

    /// Buffered word keys.
    #[must_use]
    pub fn word_buffer(&self) -> &[KeyCode] {
        self.word.buffer()
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn key(name: &str) -> KeyEvent {
        KeyEvent::from_dom_key(name)
    }

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

    fn feed_all(matcher: &mut SequenceMatcher, keys: &[&str], start: u64) -> SequenceHits {
        let mut hits = SequenceHits::empty();
        for (i, name) in keys.iter().enumerate() {
            hits |= matcher.feed(&key(name), ms(start + i as u64 * 50));
        }
        hits
    }

    // --- Combo tests ---

    #[test]
    fn full_combo_completes_once() {
        let mut m = SequenceMatcher::with_defaults();
        let mut completions = 0;
        for (i, name) in COMBO_KEYS.iter().enumerate() {
            if m.feed(&key(name), ms(i as u64 * 50))
                .contains(SequenceHits::COMBO)
            {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(m.combo_buffer().is_empty());
        assert!(m.word_buffer().is_empty());
    }

    #[test]
    fn combo_is_case_insensitive() {
        let mut m = SequenceMatcher::with_defaults();
        let mut keys = COMBO_KEYS;
        keys[8] = "B";
        keys[9] = "A";
        assert!(feed_all(&mut m, &keys, 0).contains(SequenceHits::COMBO));
    }

    #[test]
    fn mismatch_with_non_restarting_key_clears() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &COMBO_KEYS[..4], 0);
        assert_eq!(m.combo_buffer().len(), 4);

        m.feed(&key("q"), ms(500));
        assert!(m.combo_buffer().is_empty());
    }

    #[test]
    fn mismatch_with_first_symbol_restarts_at_one() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &COMBO_KEYS[..5], 0);

        m.feed(&key("ArrowUp"), ms(500));
        assert_eq!(m.combo_buffer(), &[KeyCode::Up]);
    }

    #[test]
    fn third_up_keeps_longest_valid_prefix() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &["ArrowUp", "ArrowUp", "ArrowUp"], 0);
        assert_eq!(m.combo_buffer(), &[KeyCode::Up, KeyCode::Up]);

        // The fallback lets the held third "up" still lead into a full combo.
        let hits = feed_all(&mut m, &COMBO_KEYS[2..], 200);
        assert!(hits.contains(SequenceHits::COMBO));
    }

    #[test]
    fn unidentified_key_resets() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &COMBO_KEYS[..3], 0);
        m.feed(&key("Shift"), ms(200));
        assert!(m.combo_buffer().is_empty());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &COMBO_KEYS[..2], 0);
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            kind: KeyEventKind::Release,
        };
        assert!(m.feed(&release, ms(100)).is_empty());
        assert_eq!(m.combo_buffer().len(), 2);
    }

    #[test]
    fn combo_has_no_idle_timeout() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &COMBO_KEYS[..5], 0);
        let hits = feed_all(&mut m, &COMBO_KEYS[5..], 60_000);
        assert!(hits.contains(SequenceHits::COMBO));
    }

    // --- Word tests ---

    #[test]
    fn word_completes() {
        let mut m = SequenceMatcher::with_defaults();
        let hits = feed_all(&mut m, &["m", "a", "t", "r", "i", "x"], 0);
        assert_eq!(hits, SequenceHits::WORD);
        assert!(m.word_buffer().is_empty());
    }

    #[test]
    fn word_idle_timeout_clears_before_next_key() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &["m", "a", "t"], 0);
        assert_eq!(m.word_buffer().len(), 3);

        // Last accepted key at 100ms; 1500ms later the buffer is gone.
        let hits = m.feed(&key("r"), ms(1600));
        assert!(hits.is_empty());
        assert!(m.word_buffer().is_empty());
    }

    #[test]
    fn word_just_inside_timeout_still_counts() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &["m", "a", "t"], 0);
        m.feed(&key("r"), ms(1599));
        assert_eq!(m.word_buffer().len(), 4);
    }

    #[test]
    fn check_timeout_reports_discard() {
        let mut m = SequenceMatcher::with_defaults();
        m.feed(&key("m"), ms(0));
        assert_eq!(m.next_deadline(), Some(ms(1500)));
        assert!(!m.check_timeout(ms(1499)));
        assert!(m.check_timeout(ms(1500)));
        assert!(m.word_buffer().is_empty());
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn word_restart_on_m() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &["m", "a", "m"], 0);
        assert_eq!(m.word_buffer(), &[KeyCode::Char('m')]);
    }

    #[test]
    fn arrows_reset_word_buffer() {
        let mut m = SequenceMatcher::with_defaults();
        feed_all(&mut m, &["m", "a", "ArrowUp"], 0);
        assert!(m.word_buffer().is_empty());
    }

    #[test]
    fn custom_word() {
        let config = SequenceConfig::default().with_word("Neo");
        assert_eq!(
            config.word,
            vec![KeyCode::Char('n'), KeyCode::Char('e'), KeyCode::Char('o')]
        );
        let mut m = SequenceMatcher::new(config);
        assert!(feed_all(&mut m, &["n", "e", "o"], 0).contains(SequenceHits::WORD));
    }

    // --- PrefixMatcher ---

    #[test]
    fn fallback_table_for_combo() {
        assert_eq!(
            fallback_table(&COMBO_SEQUENCE),
            vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn fallback_table_with_repeats() {
        let abab: Vec<KeyCode> = "abab".chars().map(KeyCode::Char).collect();
        assert_eq!(fallback_table(&abab), vec![0, 0, 1, 2]);
    }

    #[test]
    fn prefix_steps() {
        let mut p = PrefixMatcher::new(vec![KeyCode::Char('a'), KeyCode::Char('b')]);
        assert_eq!(p.feed(KeyCode::Char('a'), ms(0)), PrefixStep::Extended);
        assert_eq!(p.feed(KeyCode::Char('a'), ms(1)), PrefixStep::Restarted);
        assert_eq!(p.feed(KeyCode::Char('c'), ms(2)), PrefixStep::Cleared);
        assert_eq!(p.feed(KeyCode::Char('a'), ms(3)), PrefixStep::Extended);
        assert_eq!(p.feed(KeyCode::Char('b'), ms(4)), PrefixStep::Complete);
        assert!(p.buffer().is_empty());
    }

    #[test]
    fn empty_target_never_matches() {
        let mut p = PrefixMatcher::new(Vec::new());
        assert_eq!(p.feed(KeyCode::Char('a'), ms(0)), PrefixStep::Cleared);
    }

    #[test]
    fn time_until_timeout() {
        let mut p = PrefixMatcher::new(WORD_SEQUENCE.to_vec()).with_idle_timeout(ms(1500));
        assert!(p.time_until_timeout(ms(0)).is_none());
        p.feed(KeyCode::Char('m'), ms(100));
        assert_eq!(p.time_until_timeout(ms(600)), Some(ms(1000)));
        assert_eq!(p.time_until_timeout(ms(5000)), Some(Duration::ZERO));
    }

    #[test]
    fn debug_format() {
        let m = SequenceMatcher::with_defaults();
        let dbg = format!("{m:?}");
        assert!(dbg.contains("SequenceMatcher"));
    }

    #[test]
    fn default_config_values() {
        let config = SequenceConfig::default();
        assert_eq!(config.combo.len(), 10);
        assert_eq!(config.word.len(), 6);
        assert_eq!(config.word_idle_timeout, ms(1500));
        assert_eq!(
            SequenceConfig::with_word_timeout(ms(900)).word_idle_timeout,
            ms(900)
        );
    }
}
