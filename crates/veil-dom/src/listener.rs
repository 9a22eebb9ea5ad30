#![forbid(unsafe_code)]

//! Listener registrations keyed by owner.
//!
//! Every registration records the [`ListenerOwner`] that installed it, so a
//! component can drop all of its handlers in one call when it unmounts
//! ([`Document::off_all`](crate::Document::off_all)) without tracking
//! individual [`ListenerId`]s. Removing registrations that no longer exist
//! is a no-op.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Document;
use crate::event::{DomEvent, EventKind};
use crate::node::NodeId;

/// Global counter for listener owners.
static LISTENER_OWNER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A shared event handler.
///
/// Handlers receive the dispatching document so they never need to capture
/// it, which would keep the document alive through its own registry.
pub type Handler = Rc<dyn Fn(&Document, &mut DomEvent)>;

/// Key grouping the registrations installed by one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerOwner(u64);

impl ListenerOwner {
    /// Allocate a new unique owner key.
    #[must_use]
    pub fn next() -> Self {
        Self(LISTENER_OWNER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Handle to one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    target: NodeId,
    kind: EventKind,
    owner: ListenerOwner,
    handler: Handler,
}

/// Registrations in insertion order.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        target: NodeId,
        kind: EventKind,
        owner: ListenerOwner,
        handler: Handler,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.registrations.push(Registration {
            id,
            target,
            kind,
            owner,
            handler,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub(crate) fn remove_owner(&mut self, owner: ListenerOwner) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.owner != owner);
        before - self.registrations.len()
    }

    pub(crate) fn count_owner(&self, owner: ListenerOwner) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.owner == owner)
            .count()
    }

    /// Snapshot of the handlers to run for `kind` on `target`.
    pub(crate) fn handlers(&self, target: NodeId, kind: EventKind) -> Vec<Handler> {
        self.registrations
            .iter()
            .filter(|r| r.target == target && r.kind == kind)
            .map(|r| Rc::clone(&r.handler))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.registrations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        Rc::new(|_: &Document, _: &mut DomEvent| {})
    }

    #[test]
    fn owners_are_unique() {
        assert_ne!(ListenerOwner::next(), ListenerOwner::next());
    }

    #[test]
    fn remove_owner_only_drops_that_owner() {
        let mut registry = ListenerRegistry::default();
        let a = ListenerOwner::next();
        let b = ListenerOwner::next();
        let node = NodeId::from_index(0);
        registry.add(node, EventKind::Click, a, noop());
        registry.add(node, EventKind::KeyUp, a, noop());
        registry.add(node, EventKind::Click, b, noop());

        assert_eq!(registry.remove_owner(a), 2);
        assert_eq!(registry.count_owner(a), 0);
        assert_eq!(registry.count_owner(b), 1);
        assert_eq!(registry.remove_owner(a), 0);
    }

    #[test]
    fn remove_by_id_is_idempotent() {
        let mut registry = ListenerRegistry::default();
        let id = registry.add(
            NodeId::from_index(1),
            EventKind::Click,
            ListenerOwner::next(),
            noop(),
        );
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn handlers_filter_by_target_and_kind() {
        let mut registry = ListenerRegistry::default();
        let owner = ListenerOwner::next();
        let n0 = NodeId::from_index(0);
        let n1 = NodeId::from_index(1);
        registry.add(n0, EventKind::Click, owner, noop());
        registry.add(n0, EventKind::KeyUp, owner, noop());
        registry.add(n1, EventKind::Click, owner, noop());

        assert_eq!(registry.handlers(n0, EventKind::Click).len(), 1);
        assert_eq!(registry.handlers(n1, EventKind::KeyUp).len(), 0);
    }
}
