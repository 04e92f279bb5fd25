#![forbid(unsafe_code)]

//! Viewport reveal triggers.
//!
//! [`VisibilityTrigger`] keeps one boolean record per observed node and
//! flips it when the host reports that the node crossed its visibility
//! threshold. The host primitive (an intersection observer in browsers) is
//! abstracted as [`IntersectionSource`].
//!
//! # Invariants
//!
//! 1. A record exists for every node passed to `observe` until `teardown`.
//! 2. With `trigger_once`, the host observation is removed right after the
//!    first `false -> true` flip, and the record stays `true`.
//! 3. Without `trigger_once`, the record follows the latest entry.
//! 4. `teardown` unobserves every observation that is still active.
//!
//! [`SectionTracker`] is the nav-highlight variant: it reports which named
//! section most recently crossed a fixed threshold.

use std::collections::HashMap;

use crate::interactive::NodeId;

// ---------------------------------------------------------------------------
// Host seam
// ---------------------------------------------------------------------------

/// Host-side visibility observation primitive.
pub trait IntersectionSource {
    /// Begin reporting entries for `node` at `threshold` (visible fraction).
    fn observe(&mut self, node: NodeId, threshold: f32);

    /// Stop reporting entries for `node`.
    fn unobserve(&mut self, node: NodeId);
}

/// One report from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub node: NodeId,
    /// Visible fraction of the node in `[0, 1]`.
    pub ratio: f32,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Whether this entry counts as visible at `threshold`.
    #[must_use]
    pub fn is_visible_at(&self, threshold: f32) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

// ---------------------------------------------------------------------------
// VisibilityTrigger
// ---------------------------------------------------------------------------

/// Reveal options for one observed node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    /// Visible fraction required to reveal (default: 0.1).
    pub threshold: f32,
    /// Stop observing after the first reveal (default: true).
    pub trigger_once: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            trigger_once: true,
        }
    }
}

impl RevealOptions {
    /// Default options with a custom threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Keep observing after the first reveal.
    #[must_use]
    pub fn repeating(mut self) -> Self {
        self.trigger_once = false;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct VisibilityRecord {
    options: RevealOptions,
    visible: bool,
    observing: bool,
}

/// Per-node reveal state driven by host intersection entries.
pub struct VisibilityTrigger<S: IntersectionSource> {
    source: S,
    records: HashMap<NodeId, VisibilityRecord>,
}

impl<S: IntersectionSource> std::fmt::Debug for VisibilityTrigger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityTrigger")
            .field("records", &self.records.len())
            .field("active", &self.active_observations())
            .finish()
    }
}

impl<S: IntersectionSource> VisibilityTrigger<S> {
    /// Create a trigger backed by `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            records: HashMap::new(),
        }
    }

    /// Start observing `node`. Returns the current signal value.
    ///
    /// Observing an already-known node keeps its record and only replaces
    /// the options if the observation is still active.
    pub fn observe(&mut self, node: NodeId, options: RevealOptions) -> bool {
        if let Some(record) = self.records.get_mut(&node) {
            if record.observing {
                record.options = options;
                self.source.observe(node, options.threshold);
            }
            return record.visible;
        }

        self.source.observe(node, options.threshold);
        self.records.insert(
            node,
            VisibilityRecord {
                options,
                visible: false,
                observing: true,
            },
        );
        false
    }

    /// Apply a host entry. Returns the new value if the signal changed.
    ///
    /// Entries for unknown or no-longer-observed nodes are ignored.
    pub fn on_entry(&mut self, entry: IntersectionEntry) -> Option<bool> {
        let record = self.records.get_mut(&entry.node)?;
        if !record.observing {
            return None;
        }

        let now_visible = entry.is_visible_at(record.options.threshold);
        if now_visible == record.visible {
            return None;
        }
        if !now_visible && record.options.trigger_once {
            return None;
        }

        record.visible = now_visible;
        if now_visible && record.options.trigger_once {
            record.observing = false;
            self.source.unobserve(entry.node);
        }
        tracing::trace!(node = entry.node.0, visible = now_visible, "reveal signal changed");
        Some(now_visible)
    }

    /// Current signal for `node`. Unknown nodes are not visible.
    #[must_use]
    pub fn is_visible(&self, node: NodeId) -> bool {
        self.records.get(&node).is_some_and(|r| r.visible)
    }

    /// Number of host observations still active.
    #[must_use]
    pub fn active_observations(&self) -> usize {
        self.records.values().filter(|r| r.observing).count()
    }

    /// Unobserve everything still active and drop all records.
    pub fn teardown(&mut self) {
        for (node, record) in self.records.drain() {
            if record.observing {
                self.source.unobserve(node);
            }
        }
    }

    /// Borrow the host source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: IntersectionSource> Drop for VisibilityTrigger<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ---------------------------------------------------------------------------
// SectionTracker
// ---------------------------------------------------------------------------

/// Suffix stripped from section element ids before reporting.
const WRAPPER_SUFFIX: &str = "_wrapper";

/// Tracks the section that most recently scrolled into view.
pub struct SectionTracker<S: IntersectionSource> {
    source: S,
    threshold: f32,
    sections: HashMap<NodeId, String>,
    active: Option<String>,
}

impl<S: IntersectionSource> std::fmt::Debug for SectionTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionTracker")
            .field("threshold", &self.threshold)
            .field("sections", &self.sections.len())
            .field("active", &self.active)
            .finish()
    }
}

impl<S: IntersectionSource> SectionTracker<S> {
    /// Default crossing threshold.
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    /// Create a tracker with the default threshold.
    pub fn new(source: S) -> Self {
        Self::with_threshold(source, Self::DEFAULT_THRESHOLD)
    }

    /// Create a tracker with a custom threshold.
    pub fn with_threshold(source: S, threshold: f32) -> Self {
        Self {
            source,
            threshold: threshold.clamp(0.0, 1.0),
            sections: HashMap::new(),
            active: None,
        }
    }

    /// Observe a section node under its element id.
    pub fn observe_section(&mut self, node: NodeId, element_id: impl Into<String>) {
        let element_id = element_id.into();
        let name = element_id
            .strip_suffix(WRAPPER_SUFFIX)
            .map(str::to_owned)
            .unwrap_or(element_id);
        self.source.observe(node, self.threshold);
        self.sections.insert(node, name);
    }

    /// Apply a host entry. Returns the new active section if it changed.
    ///
    /// Leaving a section does not clear the highlight; the next section to
    /// intersect replaces it.
    pub fn on_entry(&mut self, entry: IntersectionEntry) -> Option<&str> {
        if !entry.is_visible_at(self.threshold) {
            return None;
        }
        let name = self.sections.get(&entry.node)?;
        if self.active.as_deref() == Some(name.as_str()) {
            return None;
        }
        self.active = Some(name.clone());
        self.active.as_deref()
    }

    /// Currently highlighted section.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Unobserve every section.
    pub fn teardown(&mut self) {
        for (node, _) in self.sections.drain() {
            self.source.unobserve(node);
        }
    }

    /// Borrow the host source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: IntersectionSource> Drop for SectionTracker<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FakeSource {
        observed: Vec<(NodeId, f32)>,
        unobserved: Vec<NodeId>,
    }

    impl IntersectionSource for FakeSource {
        fn observe(&mut self, node: NodeId, threshold: f32) {
            self.observed.push((node, threshold));
        }

        fn unobserve(&mut self, node: NodeId) {
            self.unobserved.push(node);
        }
    }

    fn entry(node: u32, ratio: f32) -> IntersectionEntry {
        IntersectionEntry {
            node: NodeId(node),
            ratio,
            is_intersecting: ratio > 0.0,
        }
    }

    #[test]
    fn default_options() {
        let opts = RevealOptions::default();
        assert_eq!(opts.threshold, 0.1);
        assert!(opts.trigger_once);
    }

    #[test]
    fn trigger_once_reveals_and_unobserves() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        assert!(!trigger.observe(NodeId(1), RevealOptions::default()));
        assert_eq!(trigger.source().observed, vec![(NodeId(1), 0.1)]);

        assert_eq!(trigger.on_entry(entry(1, 0.05)), None);
        assert_eq!(trigger.on_entry(entry(1, 0.2)), Some(true));
        assert!(trigger.is_visible(NodeId(1)));
        assert_eq!(trigger.source().unobserved, vec![NodeId(1)]);
        assert_eq!(trigger.active_observations(), 0);

        // Exiting does not revert a trigger-once record.
        assert_eq!(trigger.on_entry(entry(1, 0.0)), None);
        assert!(trigger.is_visible(NodeId(1)));
    }

    #[test]
    fn repeating_follows_exit() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        trigger.observe(NodeId(2), RevealOptions::default().repeating());

        assert_eq!(trigger.on_entry(entry(2, 0.5)), Some(true));
        assert_eq!(trigger.on_entry(entry(2, 0.6)), None);
        assert_eq!(trigger.on_entry(entry(2, 0.0)), Some(false));
        assert!(!trigger.is_visible(NodeId(2)));
        assert!(trigger.source().unobserved.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        trigger.observe(NodeId(3), RevealOptions::with_threshold(0.5));
        assert_eq!(trigger.on_entry(entry(3, 0.49)), None);
        assert_eq!(trigger.on_entry(entry(3, 0.5)), Some(true));
    }

    #[test]
    fn non_intersecting_entry_never_reveals() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        trigger.observe(NodeId(4), RevealOptions::with_threshold(0.0));
        let e = IntersectionEntry {
            node: NodeId(4),
            ratio: 0.0,
            is_intersecting: false,
        };
        assert_eq!(trigger.on_entry(e), None);
    }

    #[test]
    fn unknown_node_entries_ignored() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        assert_eq!(trigger.on_entry(entry(9, 1.0)), None);
        assert!(!trigger.is_visible(NodeId(9)));
    }

    #[test]
    fn teardown_unobserves_only_active() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        trigger.observe(NodeId(1), RevealOptions::default());
        trigger.observe(NodeId(2), RevealOptions::default());
        trigger.on_entry(entry(1, 1.0));

        trigger.teardown();
        let mut unobserved = trigger.source().unobserved.clone();
        unobserved.sort();
        // Node 1 was unobserved on reveal, node 2 on teardown.
        assert_eq!(unobserved, vec![NodeId(1), NodeId(2)]);
        assert!(!trigger.is_visible(NodeId(1)));
    }

    #[test]
    fn re_observe_keeps_record() {
        let mut trigger = VisibilityTrigger::new(FakeSource::default());
        trigger.observe(NodeId(1), RevealOptions::default());
        trigger.on_entry(entry(1, 1.0));
        assert!(trigger.observe(NodeId(1), RevealOptions::default()));
        assert_eq!(trigger.source().observed.len(), 1);
    }

    #[test]
    fn with_threshold_clamps() {
        assert_eq!(RevealOptions::with_threshold(2.0).threshold, 1.0);
        assert_eq!(RevealOptions::with_threshold(-1.0).threshold, 0.0);
    }

    // --- SectionTracker ---

    #[test]
    fn section_tracker_strips_wrapper_suffix() {
        let mut tracker = SectionTracker::new(FakeSource::default());
        tracker.observe_section(NodeId(1), "about_wrapper");
        tracker.observe_section(NodeId(2), "projects");

        assert_eq!(tracker.on_entry(entry(1, 0.6)), Some("about"));
        assert_eq!(tracker.active(), Some("about"));
        assert_eq!(tracker.on_entry(entry(2, 0.7)), Some("projects"));
    }

    #[test]
    fn section_tracker_ignores_below_threshold_and_repeats() {
        let mut tracker = SectionTracker::new(FakeSource::default());
        tracker.observe_section(NodeId(1), "home");
        assert_eq!(tracker.on_entry(entry(1, 0.3)), None);
        assert_eq!(tracker.active(), None);
        assert_eq!(tracker.on_entry(entry(1, 0.9)), Some("home"));
        assert_eq!(tracker.on_entry(entry(1, 1.0)), None);
        assert_eq!(tracker.on_entry(entry(1, 0.0)), None);
        assert_eq!(tracker.active(), Some("home"));
    }

    #[test]
    fn section_tracker_teardown() {
        let mut tracker = SectionTracker::new(FakeSource::default());
        tracker.observe_section(NodeId(1), "a");
        tracker.observe_section(NodeId(2), "b");
        assert_eq!(tracker.source().observed[0].1, 0.5);
        tracker.teardown();
        assert_eq!(tracker.source().unobserved.len(), 2);
    }
}
