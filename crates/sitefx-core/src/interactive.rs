#![forbid(unsafe_code)]

//! Interactive node tags.
//!
//! UI nodes that take part in pointer suppression, focus filtering, or click
//! triggers are tagged explicitly when they are constructed. The engine asks
//! the [`NodeRegistry`] what a node is instead of inspecting element names or
//! attributes at event time.
//!
//! # Usage
//!
//! ```
//! use sitefx_core::interactive::{InteractiveRole, NativeCursor, NodeCaps, NodeRegistry};
//!
//! let mut registry = NodeRegistry::new();
//! let button = registry.register(InteractiveRole::Button);
//! let field = registry.register(InteractiveRole::TextInput);
//!
//! assert_eq!(registry.native_cursor(button), Some(NativeCursor::Pointer));
//! assert_eq!(registry.native_cursor(field), Some(NativeCursor::Text));
//! assert!(registry.caps(field).contains(NodeCaps::TEXT_ENTRY));
//! ```

use std::collections::HashMap;

use bitflags::bitflags;

/// Opaque handle for a UI node known to the engine.
///
/// Ids are issued by [`NodeRegistry::register`] and are never reused within
/// one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// The interactive role a node was constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractiveRole {
    /// Clickable button.
    Button,
    /// Hyperlink.
    Link,
    /// Single-line text field.
    TextInput,
    /// Multi-line text field.
    TextArea,
    /// Drop-down selector.
    Select,
    /// Region explicitly marked interactive by the content layer.
    Marked,
    /// Content-editable region. Swallows key sequences like a text field.
    Editable,
}

impl InteractiveRole {
    /// Native pointer glyph shown while hovering a node with this role.
    #[must_use]
    pub const fn native_cursor(self) -> NativeCursor {
        match self {
            Self::TextInput | Self::TextArea | Self::Editable => NativeCursor::Text,
            Self::Button | Self::Link | Self::Select | Self::Marked => NativeCursor::Pointer,
        }
    }

    /// Capabilities implied by the role.
    #[must_use]
    pub const fn default_caps(self) -> NodeCaps {
        match self {
            Self::TextInput | Self::TextArea | Self::Editable => {
                NodeCaps::INTERACTIVE.union(NodeCaps::TEXT_ENTRY)
            }
            Self::Button | Self::Link | Self::Select | Self::Marked => NodeCaps::INTERACTIVE,
        }
    }

    /// Parse a host element tag (`"button"`, `"a"`, `"input"`, ...) or role
    /// name. Case-insensitive.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "button" => Some(Self::Button),
            "a" | "link" => Some(Self::Link),
            "input" => Some(Self::TextInput),
            "textarea" => Some(Self::TextArea),
            "select" => Some(Self::Select),
            "marked" | "interactive" => Some(Self::Marked),
            "editable" | "contenteditable" => Some(Self::Editable),
            _ => None,
        }
    }
}

/// Platform pointer glyph requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeCursor {
    /// Native glyph hidden; the custom overlay is drawn instead.
    #[default]
    Hidden,
    /// Platform default arrow.
    Auto,
    /// Pointing hand for clickable controls.
    Pointer,
    /// I-beam for text fields.
    Text,
}

impl NativeCursor {
    /// CSS `cursor` keyword for this glyph.
    #[must_use]
    pub const fn css_keyword(self) -> &'static str {
        match self {
            Self::Hidden => "none",
            Self::Auto => "auto",
            Self::Pointer => "pointer",
            Self::Text => "text",
        }
    }
}

bitflags! {
    /// Capability tags attached to a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeCaps: u8 {
        /// Hovering suppresses the custom pointer overlay.
        const INTERACTIVE = 1 << 0;
        /// While focused, key events are not fed to the sequence matcher.
        const TEXT_ENTRY = 1 << 1;
        /// Clicks count toward the logo rapid-click trigger.
        const LOGO = 1 << 2;
        /// Clicks pop the decorative footer word.
        const FOOTER_WORD = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeEntry {
    role: InteractiveRole,
    caps: NodeCaps,
}

/// Typed lookup from [`NodeId`] to role and capabilities.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeId, NodeEntry>,
    next_id: u32,
}

impl NodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with the capabilities implied by `role`.
    pub fn register(&mut self, role: InteractiveRole) -> NodeId {
        self.register_with(role, role.default_caps())
    }

    /// Register a node with an explicit capability set.
    ///
    /// `INTERACTIVE` is always included.
    pub fn register_with(&mut self, role: InteractiveRole, caps: NodeCaps) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.nodes.insert(
            id,
            NodeEntry {
                role,
                caps: caps | NodeCaps::INTERACTIVE,
            },
        );
        id
    }

    /// Add capabilities to an existing node. Unknown ids are ignored.
    pub fn add_caps(&mut self, node: NodeId, caps: NodeCaps) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.caps |= caps;
        }
    }

    /// Forget a node (e.g. when its element is removed).
    pub fn unregister(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    /// Role of a node, if registered.
    #[must_use]
    pub fn role(&self, node: NodeId) -> Option<InteractiveRole> {
        self.nodes.get(&node).map(|entry| entry.role)
    }

    /// Capabilities of a node. Unknown nodes have none.
    #[must_use]
    pub fn caps(&self, node: NodeId) -> NodeCaps {
        self.nodes
            .get(&node)
            .map(|entry| entry.caps)
            .unwrap_or_default()
    }

    /// Native glyph to show while hovering `node`.
    #[must_use]
    pub fn native_cursor(&self, node: NodeId) -> Option<NativeCursor> {
        self.role(node).map(InteractiveRole::native_cursor)
    }

    /// Whether focusing `node` should stop key sequence matching.
    #[must_use]
    pub fn is_text_entry(&self, node: NodeId) -> bool {
        self.caps(node).contains(NodeCaps::TEXT_ENTRY)
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_native_cursor() {
        assert_eq!(InteractiveRole::Button.native_cursor(), NativeCursor::Pointer);
        assert_eq!(InteractiveRole::Link.native_cursor(), NativeCursor::Pointer);
        assert_eq!(InteractiveRole::Select.native_cursor(), NativeCursor::Pointer);
        assert_eq!(InteractiveRole::Marked.native_cursor(), NativeCursor::Pointer);
        assert_eq!(InteractiveRole::TextInput.native_cursor(), NativeCursor::Text);
        assert_eq!(InteractiveRole::TextArea.native_cursor(), NativeCursor::Text);
        assert_eq!(InteractiveRole::Editable.native_cursor(), NativeCursor::Text);
    }

    #[test]
    fn ids_are_unique() {
        let mut registry = NodeRegistry::new();
        let a = registry.register(InteractiveRole::Button);
        let b = registry.register(InteractiveRole::Button);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_node_has_no_caps() {
        let registry = NodeRegistry::new();
        assert_eq!(registry.caps(NodeId(42)), NodeCaps::empty());
        assert_eq!(registry.native_cursor(NodeId(42)), None);
        assert!(!registry.is_text_entry(NodeId(42)));
    }

    #[test]
    fn register_with_always_interactive() {
        let mut registry = NodeRegistry::new();
        let logo = registry.register_with(InteractiveRole::Button, NodeCaps::LOGO);
        let caps = registry.caps(logo);
        assert!(caps.contains(NodeCaps::LOGO));
        assert!(caps.contains(NodeCaps::INTERACTIVE));
    }

    #[test]
    fn add_caps_and_unregister() {
        let mut registry = NodeRegistry::new();
        let word = registry.register(InteractiveRole::Marked);
        registry.add_caps(word, NodeCaps::FOOTER_WORD);
        assert!(registry.caps(word).contains(NodeCaps::FOOTER_WORD));

        registry.unregister(word);
        assert!(registry.is_empty());
        assert_eq!(registry.role(word), None);
    }

    #[test]
    fn text_fields_are_text_entry() {
        let mut registry = NodeRegistry::new();
        let input = registry.register(InteractiveRole::TextInput);
        let area = registry.register(InteractiveRole::TextArea);
        let button = registry.register(InteractiveRole::Button);
        assert!(registry.is_text_entry(input));
        assert!(registry.is_text_entry(area));
        assert!(!registry.is_text_entry(button));
    }

    #[test]
    fn roles_parse_from_tags() {
        assert_eq!(InteractiveRole::from_tag("A"), Some(InteractiveRole::Link));
        assert_eq!(InteractiveRole::from_tag("textarea"), Some(InteractiveRole::TextArea));
        assert_eq!(InteractiveRole::from_tag("contenteditable"), Some(InteractiveRole::Editable));
        assert_eq!(InteractiveRole::from_tag("div"), None);
    }

    #[test]
    fn css_keywords() {
        assert_eq!(NativeCursor::Hidden.css_keyword(), "none");
        assert_eq!(NativeCursor::Pointer.css_keyword(), "pointer");
        assert_eq!(NativeCursor::Text.css_keyword(), "text");
        assert_eq!(NativeCursor::Auto.css_keyword(), "auto");
    }
}
