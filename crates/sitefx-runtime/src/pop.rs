#![forbid(unsafe_code)]

//! Short-lived "popped" highlights for decorative footer words.

use std::collections::HashMap;
use std::time::Duration;

use sitefx_core::interactive::NodeId;

/// Default highlight length.
pub const POP_DURATION: Duration = Duration::from_secs(1);

/// Tracks which words are currently popped and until when.
#[derive(Debug, Clone)]
pub struct PopTracker {
    duration: Duration,
    popped: HashMap<NodeId, Duration>,
}

impl Default for PopTracker {
    fn default() -> Self {
        Self::new(POP_DURATION)
    }
}

impl PopTracker {
    /// Create a tracker whose pops last `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            popped: HashMap::new(),
        }
    }

    /// Pop `node` at `now`. Re-popping restarts its highlight.
    pub fn pop(&mut self, node: NodeId, now: Duration) {
        self.popped.insert(node, now.saturating_add(self.duration));
    }

    /// Expire finished highlights. Returns the nodes that un-popped.
    pub fn poll(&mut self, now: Duration) -> Vec<NodeId> {
        let mut ended: Vec<NodeId> = self
            .popped
            .iter()
            .filter(|&(_, &until)| now >= until)
            .map(|(&node, _)| node)
            .collect();
        ended.sort();
        for node in &ended {
            self.popped.remove(node);
        }
        ended
    }

    /// Whether `node` is popped.
    #[must_use]
    pub fn is_popped(&self, node: NodeId) -> bool {
        self.popped.contains_key(&node)
    }

    /// Currently popped nodes, sorted.
    #[must_use]
    pub fn popped(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.popped.keys().copied().collect();
        nodes.sort();
        nodes
    }

    /// Earliest pending un-pop.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.popped.values().copied().min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_lasts_one_second() {
        let mut pops = PopTracker::default();
        pops.pop(NodeId(1), Duration::ZERO);
        assert!(pops.is_popped(NodeId(1)));
        assert!(pops.poll(Duration::from_millis(999)).is_empty());
        assert_eq!(pops.poll(Duration::from_secs(1)), vec![NodeId(1)]);
        assert!(!pops.is_popped(NodeId(1)));
    }

    #[test]
    fn repop_restarts() {
        let mut pops = PopTracker::default();
        pops.pop(NodeId(1), Duration::ZERO);
        pops.pop(NodeId(1), Duration::from_millis(800));
        assert!(pops.poll(Duration::from_millis(1500)).is_empty());
        assert_eq!(pops.next_deadline(), Some(Duration::from_millis(1800)));
    }

    #[test]
    fn independent_words() {
        let mut pops = PopTracker::default();
        pops.pop(NodeId(2), Duration::ZERO);
        pops.pop(NodeId(1), Duration::from_millis(500));
        assert_eq!(pops.popped(), vec![NodeId(1), NodeId(2)]);
        assert_eq!(pops.poll(Duration::from_secs(1)), vec![NodeId(2)]);
        assert_eq!(pops.popped(), vec![NodeId(1)]);
    }
}
