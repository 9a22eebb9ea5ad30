#![forbid(unsafe_code)]

//! Events emitted on a modal instance, and their subscription plumbing.
//!
//! Subscribers are stored as `Weak` callbacks and cleaned up lazily during
//! emission; the returned [`Subscription`] owns the strong reference, so
//! dropping it unsubscribes. Callbacks run with no internal borrow held and
//! may call back into the modal (for example, hiding it on `keyEsc`).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use veil_dom::{Key, NodeId};

/// Payload of click events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// The element that was clicked.
    pub target: NodeId,
}

/// Payload of key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// The element the key event was dispatched at.
    pub target: NodeId,
}

/// An event fired on a modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    /// A document click landed outside the active modal's panel.
    ClickOut(ClickEvent),
    /// A click landed inside this modal's panel.
    ClickIn(ClickEvent),
    /// ESC was released while this modal was active.
    KeyEsc(KeyEvent),
    /// Another modal became active on top of this one.
    Inactive,
}

impl ModalEvent {
    #[must_use]
    pub const fn kind(&self) -> ModalEventKind {
        match self {
            Self::ClickOut(_) => ModalEventKind::ClickOut,
            Self::ClickIn(_) => ModalEventKind::ClickIn,
            Self::KeyEsc(_) => ModalEventKind::KeyEsc,
            Self::Inactive => ModalEventKind::Inactive,
        }
    }
}

/// Discriminant of [`ModalEvent`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalEventKind {
    ClickOut,
    ClickIn,
    KeyEsc,
    Inactive,
}

impl ModalEventKind {
    /// The event name hosts bind to.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClickOut => "clickOut",
            Self::ClickIn => "clickIn",
            Self::KeyEsc => "keyEsc",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ModalEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

type Callback = dyn Fn(&ModalEvent);

/// Fan-out of events to weakly-held subscribers.
#[derive(Clone, Default)]
pub(crate) struct Emitter {
    subscribers: Rc<RefCell<Vec<Weak<Callback>>>>,
}

impl Emitter {
    pub(crate) fn subscribe(&self, callback: impl Fn(&ModalEvent) + 'static) -> Subscription {
        let callback: Rc<Callback> = Rc::new(callback);
        self.subscribers
            .borrow_mut()
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: callback,
        }
    }

    /// Deliver `event` to live subscribers in registration order.
    ///
    /// Returns the number of callbacks invoked.
    pub(crate) fn emit(&self, event: &ModalEvent) -> usize {
        let live: Vec<Rc<Callback>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        tracing::trace!(event = %event.kind(), subscribers = live.len(), "emit");
        for callback in &live {
            callback(event);
        }
        live.len()
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// RAII guard for an event subscription.
///
/// Dropping it removes the callback before the next emission.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    _callback: Rc<Callback>,
}

impl Subscription {
    /// Unsubscribe explicitly.
    pub fn unsubscribe(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
