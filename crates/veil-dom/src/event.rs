#![forbid(unsafe_code)]

//! Events dispatched through a [`Document`](crate::Document).
//!
//! Only the two event kinds the modal layer listens for are modeled: pointer
//! clicks and key releases. Events bubble from their target up to the root
//! element; any handler may prevent the default action or stop propagation.

use bitflags::bitflags;

use crate::node::NodeId;

/// The kind of a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A primary-button click.
    Click,
    /// A key release.
    KeyUp,
}

impl EventKind {
    /// The DOM event type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyUp => "keyup",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A keyboard key, identified the way legacy `keyCode` values do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    /// A printable character.
    Char(char),
    /// Any other key, by raw key code.
    Code(u32),
}

impl Key {
    /// Decode a legacy numeric key code.
    #[must_use]
    pub const fn from_key_code(code: u32) -> Self {
        match code {
            27 => Self::Escape,
            13 => Self::Enter,
            9 => Self::Tab,
            other => Self::Code(other),
        }
    }

    /// The legacy numeric key code.
    ///
    /// Letters report their upper-case code point, matching browsers.
    #[must_use]
    pub fn key_code(self) -> u32 {
        match self {
            Self::Escape => 27,
            Self::Enter => 13,
            Self::Tab => 9,
            Self::Char(c) => c.to_ascii_uppercase() as u32,
            Self::Code(code) => code,
        }
    }
}

bitflags! {
    /// Dispatch state flags carried by a [`DomEvent`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u8 {
        /// A handler called [`DomEvent::prevent_default`].
        const DEFAULT_PREVENTED = 1 << 0;
        /// A handler called [`DomEvent::stop_propagation`].
        const PROPAGATION_STOPPED = 1 << 1;
    }
}

/// An event travelling through the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    kind: EventKind,
    target: NodeId,
    current_target: NodeId,
    key: Option<Key>,
    flags: EventFlags,
}

impl DomEvent {
    /// Create a click event aimed at `target`.
    #[must_use]
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            current_target: target,
            key: None,
            flags: EventFlags::empty(),
        }
    }

    /// Create a key-release event aimed at `target`.
    #[must_use]
    pub fn keyup(target: NodeId, key: Key) -> Self {
        Self {
            kind: EventKind::KeyUp,
            target,
            current_target: target,
            key: Some(key),
            flags: EventFlags::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The node the event was dispatched at.
    #[inline]
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listeners are currently running.
    #[inline]
    #[must_use]
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    /// The key for keyboard events.
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        self.key
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Suppress the default action for this event.
    pub fn prevent_default(&mut self) {
        self.flags.insert(EventFlags::DEFAULT_PREVENTED);
    }

    #[inline]
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.flags.contains(EventFlags::DEFAULT_PREVENTED)
    }

    /// Stop bubbling after listeners on the current node have run.
    pub fn stop_propagation(&mut self) {
        self.flags.insert(EventFlags::PROPAGATION_STOPPED);
    }

    #[inline]
    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.flags.contains(EventFlags::PROPAGATION_STOPPED)
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = node;
    }
}
