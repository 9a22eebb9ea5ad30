#![forbid(unsafe_code)]

//! The document tree.
//!
//! A [`Document`] is a cheap, clonable handle to a single-threaded node
//! arena. It starts with a root element (`html`) holding a `body`. Nodes are
//! never freed: detaching one only unlinks it from its parent, so a
//! [`NodeId`] stays valid for the lifetime of the document. Ids carry the
//! [`DocumentId`] they were created in and are rejected by every other
//! document.
//!
//! # Invariants
//!
//! 1. The root element has no parent and can never be inserted elsewhere.
//! 2. A node appears in at most one parent's child list.
//! 3. No node is its own ancestor.
//! 4. Listener handlers run with no interior borrow held, so a handler may
//!    freely mutate the document that dispatched it.
//!
//! # Failure Modes
//!
//! - Any operation given a node id from outside the arena returns
//!   [`DomError::UnknownNode`].
//! - `append_child` into the child's own subtree returns
//!   [`DomError::HierarchyRequest`].

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DomError;
use crate::event::{DomEvent, EventKind, Key};
use crate::listener::{Handler, ListenerId, ListenerOwner, ListenerRegistry};
use crate::style::{ClassList, InlineStyle};
use crate::viewport::{Viewport, resolve_width};

/// Global counter for document ids.
static DOCUMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn new() -> Self {
        Self(DOCUMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    doc: DocumentId,
    index: u32,
}

impl NodeId {
    /// A node id owned by no document.
    #[cfg(test)]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self {
            doc: DocumentId(0),
            index,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// The document this node belongs to.
    #[inline]
    pub const fn document(self) -> DocumentId {
        self.doc
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: InlineStyle,
    classes: ClassList,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            style: InlineStyle::new(),
            classes: ClassList::new(),
        }
    }
}

struct DocumentInner {
    id: DocumentId,
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    viewport: Viewport,
    listeners: ListenerRegistry,
}

impl DocumentInner {
    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        if id.doc != self.id {
            return Err(DomError::UnknownNode(id));
        }
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        if id.doc != self.id {
            return Err(DomError::UnknownNode(id));
        }
        self.nodes.get_mut(id.index()).ok_or(DomError::UnknownNode(id))
    }

    /// `node` followed by each of its ancestors, nearest first.
    fn ancestors_inclusive(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        let mut path = vec![node];
        let mut current = self.node(node)?.parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.node(parent)?.parent;
        }
        Ok(path)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> Result<bool, DomError> {
        self.node(ancestor)?;
        Ok(self.ancestors_inclusive(node)?.contains(&ancestor))
    }

    fn unlink(&mut self, child: NodeId) -> Result<bool, DomError> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(false);
        };
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        Ok(true)
    }

    fn body_overflow_y(&self) -> &str {
        self.nodes[self.body.index()]
            .style
            .get("overflow-y")
            .unwrap_or("")
    }

    fn client_width(&self) -> u32 {
        self.viewport.client_width(self.body_overflow_y())
    }
}

/// Shared handle to an in-memory document.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("id", &inner.id)
            .field("nodes", &inner.nodes.len())
            .field("listeners", &inner.listeners.len())
            .field("viewport", &inner.viewport)
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Document {}

impl Document {
    /// Create a document with an `html` root element containing `body`.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let doc = DocumentId::new();
        let root = NodeId { doc, index: 0 };
        let body = NodeId { doc, index: 1 };
        let mut html = NodeData::new("html");
        html.children.push(body);
        let mut body_data = NodeData::new("body");
        body_data.parent = Some(root);

        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                id: doc,
                nodes: vec![html, body_data],
                root,
                body,
                viewport,
                listeners: ListenerRegistry::default(),
            })),
        }
    }

    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.inner.borrow().id
    }

    /// The root (`html`) element.
    #[must_use]
    pub fn document_element(&self) -> NodeId {
        self.inner.borrow().root
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.inner.borrow().viewport
    }

    /// Replace the window metrics, as a resize or content change would.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.inner.borrow_mut().viewport = viewport;
    }

    /// `window.innerWidth`.
    #[must_use]
    pub fn inner_width(&self) -> u32 {
        self.inner.borrow().viewport.inner_width
    }

    // --- Tree ---

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let id = NodeId {
            doc: inner.id,
            index: inner.nodes.len() as u32,
        };
        inner.nodes.push(NodeData::new(tag));
        id
    }

    pub fn tag(&self, node: NodeId) -> Result<String, DomError> {
        Ok(self.inner.borrow().node(node)?.tag.clone())
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.inner.borrow().node(node)?.parent)
    }

    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        Ok(self.inner.borrow().node(node)?.children.clone())
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.node(parent)?;
        if child == inner.root || inner.contains(child, parent)? {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        inner.unlink(child)?;
        inner.node_mut(parent)?.children.push(child);
        inner.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.node(parent)?;
        if inner.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        inner.unlink(child)?;
        Ok(())
    }

    /// Unlink `node` from its parent. Returns whether it was attached.
    pub fn detach(&self, node: NodeId) -> Result<bool, DomError> {
        self.inner.borrow_mut().unlink(node)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> Result<bool, DomError> {
        self.inner.borrow().contains(ancestor, node)
    }

    /// Whether `node` is reachable from the root element.
    pub fn is_connected(&self, node: NodeId) -> Result<bool, DomError> {
        let inner = self.inner.borrow();
        inner.contains(inner.root, node)
    }

    // --- Style ---

    /// Inline style value of `property`, empty when undeclared.
    pub fn style(&self, node: NodeId, property: &str) -> Result<String, DomError> {
        Ok(self
            .inner
            .borrow()
            .node(node)?
            .style
            .get(property)
            .unwrap_or_default()
            .to_owned())
    }

    /// Set an inline style declaration; an empty value removes it.
    pub fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.inner
            .borrow_mut()
            .node_mut(node)?
            .style
            .set(property, value);
        Ok(())
    }

    pub fn add_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.inner.borrow_mut().node_mut(node)?.classes.add(class))
    }

    pub fn remove_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.inner.borrow_mut().node_mut(node)?.classes.remove(class))
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.inner.borrow().node(node)?.classes.contains(class))
    }

    // --- Metrics ---

    /// Laid-out width of `node` (`offsetWidth`).
    ///
    /// An inline `px`/`%` width wins; otherwise connected block elements fill
    /// the client width and detached nodes measure zero.
    pub fn offset_width(&self, node: NodeId) -> Result<u32, DomError> {
        let inner = self.inner.borrow();
        let data = inner.node(node)?;
        let client = inner.client_width();
        if let Some(width) = data.style.get("width").and_then(|w| resolve_width(w, client)) {
            return Ok(width);
        }
        if !inner.contains(inner.root, node)? {
            return Ok(0);
        }
        Ok(client)
    }

    // --- Listeners ---

    /// Register `handler` for `kind` events reaching `target`.
    pub fn on(
        &self,
        target: NodeId,
        kind: EventKind,
        owner: ListenerOwner,
        handler: impl Fn(&Document, &mut DomEvent) + 'static,
    ) -> Result<ListenerId, DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.node(target)?;
        let handler: Handler = Rc::new(handler);
        let id = inner.listeners.add(target, kind, owner, handler);
        #[cfg(feature = "tracing")]
        tracing::trace!(target_node = %target, kind = %kind, owner = owner.id(), "listener added");
        Ok(id)
    }

    /// Remove one registration. Returns whether it existed.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }

    /// Remove every registration installed by `owner`.
    ///
    /// Returns how many were removed; zero when none remain.
    pub fn off_all(&self, owner: ListenerOwner) -> usize {
        let removed = self.inner.borrow_mut().listeners.remove_owner(owner);
        #[cfg(feature = "tracing")]
        tracing::trace!(owner = owner.id(), removed, "listeners removed");
        removed
    }

    #[must_use]
    pub fn listener_count(&self, owner: ListenerOwner) -> usize {
        self.inner.borrow().listeners.count_owner(owner)
    }

    // --- Dispatch ---

    /// Dispatch `event`, bubbling from its target up to the root element.
    ///
    /// Returns the event after all handlers ran so callers can inspect
    /// [`DomEvent::default_prevented`].
    pub fn dispatch(&self, mut event: DomEvent) -> Result<DomEvent, DomError> {
        let path = self.inner.borrow().ancestors_inclusive(event.target())?;
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = %event.kind(), target_node = %event.target(), depth = path.len(), "dispatch");

        for node in path {
            let handlers = self.inner.borrow().listeners.handlers(node, event.kind());
            event.set_current_target(node);
            for handler in handlers {
                handler(self, &mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        Ok(event)
    }

    /// Dispatch a click at `target`.
    pub fn click(&self, target: NodeId) -> Result<DomEvent, DomError> {
        self.dispatch(DomEvent::click(target))
    }

    /// Dispatch a key release at `target`.
    pub fn keyup(&self, target: NodeId, key: Key) -> Result<DomEvent, DomError> {
        self.dispatch(DomEvent::keyup(target, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn new_document_has_root_and_body() {
        let doc = Document::default();
        let root = doc.document_element();
        let body = doc.body();
        assert_eq!(doc.tag(root).unwrap(), "html");
        assert_eq!(doc.tag(body).unwrap(), "body");
        assert_eq!(doc.parent(body).unwrap(), Some(root));
        assert_eq!(doc.children(root).unwrap(), vec![body]);
        assert!(doc.is_connected(body).unwrap());
    }

    #[test]
    fn append_moves_between_parents() {
        let doc = Document::default();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(a, child).unwrap();
        doc.append_child(b, child).unwrap();

        assert!(doc.children(a).unwrap().is_empty());
        assert_eq!(doc.children(b).unwrap(), vec![child]);
        assert_eq!(doc.parent(child).unwrap(), Some(b));
    }

    #[test]
    fn append_into_own_subtree_is_rejected() {
        let doc = Document::default();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
        assert!(matches!(
            doc.append_child(outer, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
        assert!(matches!(
            doc.append_child(doc.body(), doc.document_element()),
            Err(DomError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn remove_child_requires_direct_parent() {
        let doc = Document::default();
        let parent = doc.create_element("div");
        let child = doc.create_element("div");
        assert_eq!(
            doc.remove_child(parent, child),
            Err(DomError::NotAChild { parent, child })
        );
        doc.append_child(parent, child).unwrap();
        doc.remove_child(parent, child).unwrap();
        assert_eq!(doc.parent(child).unwrap(), None);
    }

    #[test]
    fn detach_reports_previous_attachment() {
        let doc = Document::default();
        let el = doc.create_element("div");
        doc.append_child(doc.body(), el).unwrap();
        assert!(doc.is_connected(el).unwrap());
        assert!(doc.detach(el).unwrap());
        assert!(!doc.detach(el).unwrap());
        assert!(!doc.is_connected(el).unwrap());
    }

    #[test]
    fn contains_is_inclusive() {
        let doc = Document::default();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        let other = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        assert!(doc.contains(outer, outer).unwrap());
        assert!(doc.contains(outer, inner).unwrap());
        assert!(!doc.contains(inner, outer).unwrap());
        assert!(!doc.contains(outer, other).unwrap());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let doc = Document::default();
        let bogus = NodeId::from_index(999);
        assert_eq!(doc.tag(bogus), Err(DomError::UnknownNode(bogus)));
        assert!(doc.click(bogus).is_err());
    }

    #[test]
    fn node_from_another_document_is_unknown() {
        let doc = Document::default();
        let other = Document::default();
        let local = doc.create_element("main");
        doc.append_child(doc.body(), local).unwrap();
        let foreign = other.create_element("div");
        assert_eq!(local.index(), foreign.index());

        assert_eq!(doc.tag(foreign), Err(DomError::UnknownNode(foreign)));
        assert_eq!(
            doc.append_child(doc.body(), foreign),
            Err(DomError::UnknownNode(foreign))
        );
        assert_eq!(doc.detach(foreign), Err(DomError::UnknownNode(foreign)));
        assert_eq!(doc.parent(local).unwrap(), Some(doc.body()));
        assert_eq!(foreign.document(), other.id());
    }

    #[test]
    fn style_defaults_to_empty_string() {
        let doc = Document::default();
        let body = doc.body();
        assert_eq!(doc.style(body, "overflow-y").unwrap(), "");
        doc.set_style(body, "overflow-y", "scroll").unwrap();
        assert_eq!(doc.style(body, "overflowY").unwrap(), "scroll");
        doc.set_style(body, "overflow-y", "").unwrap();
        assert_eq!(doc.style(body, "overflow-y").unwrap(), "");
    }

    #[test]
    fn offset_width_follows_scrollbar_and_inline_width() {
        let doc = Document::new(
            Viewport::new(1024, 768)
                .with_scrollbar_width(15)
                .with_content_height(2000),
        );
        let root = doc.document_element();
        assert_eq!(doc.offset_width(root).unwrap(), 1009);

        doc.set_style(root, "width", "800px").unwrap();
        assert_eq!(doc.offset_width(root).unwrap(), 800);

        let detached = doc.create_element("div");
        assert_eq!(doc.offset_width(detached).unwrap(), 0);
    }

    #[test]
    fn forced_body_scroll_reserves_gutter() {
        let doc = Document::new(Viewport::new(1024, 768).with_scrollbar_width(15));
        let root = doc.document_element();
        assert_eq!(doc.offset_width(root).unwrap(), 1024);
        doc.set_style(doc.body(), "overflow-y", "scroll").unwrap();
        assert_eq!(doc.offset_width(root).unwrap(), 1009);
    }

    #[test]
    fn click_bubbles_to_root() {
        let doc = Document::default();
        let panel = doc.create_element("div");
        doc.append_child(doc.body(), panel).unwrap();
        let owner = ListenerOwner::next();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for node in [panel, doc.body(), doc.document_element()] {
            let seen = Rc::clone(&seen);
            doc.on(node, EventKind::Click, owner, move |_, event| {
                seen.borrow_mut().push(event.current_target());
            })
            .unwrap();
        }

        let event = doc.click(panel).unwrap();
        assert_eq!(event.target(), panel);
        assert_eq!(
            *seen.borrow(),
            vec![panel, doc.body(), doc.document_element()]
        );
    }

    #[test]
    fn stop_propagation_halts_bubbling() {
        let doc = Document::default();
        let owner = ListenerOwner::next();
        let reached_root = Rc::new(Cell::new(false));

        doc.on(doc.body(), EventKind::Click, owner, |_, event| {
            event.stop_propagation();
        })
        .unwrap();
        let flag = Rc::clone(&reached_root);
        doc.on(doc.document_element(), EventKind::Click, owner, move |_, _| {
            flag.set(true);
        })
        .unwrap();

        doc.click(doc.body()).unwrap();
        assert!(!reached_root.get());
    }

    #[test]
    fn keyup_handlers_can_prevent_default() {
        let doc = Document::default();
        doc.on(
            doc.document_element(),
            EventKind::KeyUp,
            ListenerOwner::next(),
            |_, event| {
                if event.key() == Some(Key::Escape) {
                    event.prevent_default();
                }
            },
        )
        .unwrap();

        assert!(doc.keyup(doc.body(), Key::Escape).unwrap().default_prevented());
        assert!(!doc.keyup(doc.body(), Key::Enter).unwrap().default_prevented());
    }

    #[test]
    fn handlers_may_mutate_the_document() {
        let doc = Document::default();
        let el = doc.create_element("div");
        doc.append_child(doc.body(), el).unwrap();
        let owner = ListenerOwner::next();
        doc.on(el, EventKind::Click, owner, move |doc, event| {
            doc.detach(event.target()).unwrap();
            doc.off_all(owner);
        })
        .unwrap();

        doc.click(el).unwrap();
        assert!(!doc.is_connected(el).unwrap());
        assert_eq!(doc.listener_count(owner), 0);
    }

    #[test]
    fn off_all_is_idempotent() {
        let doc = Document::default();
        let owner = ListenerOwner::next();
        doc.on(doc.body(), EventKind::Click, owner, |_, _| {}).unwrap();
        doc.on(doc.body(), EventKind::KeyUp, owner, |_, _| {}).unwrap();
        assert_eq!(doc.listener_count(owner), 2);
        assert_eq!(doc.off_all(owner), 2);
        assert_eq!(doc.off_all(owner), 0);
    }

    #[test]
    fn clones_share_state() {
        let doc = Document::default();
        let alias = doc.clone();
        let el = alias.create_element("div");
        alias.append_child(alias.body(), el).unwrap();
        assert_eq!(doc, alias);
        assert!(doc.is_connected(el).unwrap());
        assert_ne!(doc, Document::default());
    }
}
