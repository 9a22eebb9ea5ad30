#![forbid(unsafe_code)]

//! A mounted modal.
//!
//! [`ModalInstance`] is the host-facing handle of one modal. Mounting moves
//! its root element to the end of `body` so it stacks above the page no
//! matter where it was declared. The host then drives it through the
//! lifecycle hooks, either directly or through [`ModalInstance::set_show`] /
//! [`ModalInstance::finish_transition`], which stand in for the host's
//! transition system.
//!
//! Dropping the handle destroys the modal.
//!
//! # Failure Modes
//!
//! - A hook invoked in the wrong phase returns
//!   [`LifecycleError::UnexpectedPhase`] and changes nothing.
//! - Any hook after [`ModalInstance::destroy`] returns
//!   [`LifecycleError::Destroyed`]; `destroy` itself is idempotent.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use veil_dom::{EventKind, ListenerId, ListenerOwner, NodeId};

use crate::controller::ModalController;
use crate::error::LifecycleError;
use crate::events::{ClickEvent, Emitter, ModalEvent, ModalEventKind, Subscription};
use crate::phase::{Hook, ModalPhase};
use crate::props::ModalProps;

/// Global counter for unique modal IDs.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a mounted modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

impl ModalId {
    fn new() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "modal-{}", self.0)
    }
}

struct ModalState {
    props: ModalProps,
    phase: ModalPhase,
}

/// The part of a modal the controller can reach through its weak `active`
/// reference.
pub(crate) struct ModalShared {
    id: ModalId,
    owner: ListenerOwner,
    root: NodeId,
    panel: Cell<Option<NodeId>>,
    panel_listener: Cell<Option<ListenerId>>,
    emitter: Emitter,
    state: RefCell<ModalState>,
}

impl ModalShared {
    #[inline]
    pub(crate) fn id(&self) -> ModalId {
        self.id
    }

    #[inline]
    pub(crate) fn panel(&self) -> Option<NodeId> {
        self.panel.get()
    }

    pub(crate) fn emit(&self, event: &ModalEvent) -> usize {
        self.emitter.emit(event)
    }
}

/// Host handle of one mounted modal.
pub struct ModalInstance {
    shared: Rc<ModalShared>,
    controller: ModalController,
}

impl std::fmt::Debug for ModalInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ModalInstance")
            .field("id", &self.shared.id)
            .field("root", &self.shared.root)
            .field("panel", &self.shared.panel.get())
            .field("phase", &state.phase)
            .field("props", &state.props)
            .finish()
    }
}

impl ModalInstance {
    /// Create a `div` root holding a `div` panel and mount it.
    pub fn create(controller: &ModalController, props: ModalProps) -> Result<Self, LifecycleError> {
        let doc = controller.document();
        let root = doc.create_element("div");
        let panel = doc.create_element("div");
        doc.append_child(root, panel)?;
        Self::mount(controller, root, Some(panel), props)
    }

    /// Mount a modal whose markup is already built.
    ///
    /// `root` is re-parented as the last child of `body`. `panel` is the
    /// clickable dialog area; clicks inside it emit `clickIn` and never
    /// `clickOut`. With `props.show` set the show transition starts
    /// immediately.
    pub fn mount(
        controller: &ModalController,
        root: NodeId,
        panel: Option<NodeId>,
        props: ModalProps,
    ) -> Result<Self, LifecycleError> {
        let doc = controller.document();
        if let Some(panel) = panel {
            doc.tag(panel)?;
        }
        doc.append_child(doc.body(), root)?;

        let instance = Self {
            shared: Rc::new(ModalShared {
                id: ModalId::new(),
                owner: ListenerOwner::next(),
                root,
                panel: Cell::new(None),
                panel_listener: Cell::new(None),
                emitter: Emitter::default(),
                state: RefCell::new(ModalState {
                    props,
                    phase: ModalPhase::Hidden,
                }),
            }),
            controller: controller.clone(),
        };
        instance.set_panel(panel)?;
        tracing::debug!(modal = instance.id().id(), root = %root, "modal mounted");

        if props.show {
            instance.before_enter()?;
        }
        Ok(instance)
    }

    // --- Accessors ---

    #[inline]
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.shared.id
    }

    /// The element relocated under `body`.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.shared.root
    }

    #[inline]
    #[must_use]
    pub fn panel(&self) -> Option<NodeId> {
        self.shared.panel.get()
    }

    #[must_use]
    pub fn phase(&self) -> ModalPhase {
        self.shared.state.borrow().phase
    }

    #[must_use]
    pub fn props(&self) -> ModalProps {
        self.shared.state.borrow().props
    }

    /// Whether this modal is the controller's active modal.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.active_id() == Some(self.id())
    }

    #[must_use]
    pub fn controller(&self) -> &ModalController {
        &self.controller
    }

    /// Owner key of this modal's listener registrations.
    #[must_use]
    pub fn listener_owner(&self) -> ListenerOwner {
        self.shared.owner
    }

    // --- Events ---

    /// Receive every event fired on this modal.
    pub fn subscribe(&self, callback: impl Fn(&ModalEvent) + 'static) -> Subscription {
        self.shared.emitter.subscribe(callback)
    }

    /// Receive events of one kind.
    pub fn on(&self, kind: ModalEventKind, callback: impl Fn(&ModalEvent) + 'static) -> Subscription {
        self.shared.emitter.subscribe(move |event| {
            if event.kind() == kind {
                callback(event);
            }
        })
    }

    /// Replace the panel element.
    ///
    /// The `clickIn` listener moves to the new panel; `None` makes every
    /// document click count as outside.
    pub fn set_panel(&self, panel: Option<NodeId>) -> Result<(), LifecycleError> {
        self.ensure_alive()?;
        let doc = self.controller.document();
        if let Some(panel) = panel {
            doc.tag(panel)?;
        }
        if let Some(previous) = self.shared.panel_listener.take() {
            doc.off(previous);
        }
        self.shared.panel.set(panel);

        if let Some(panel) = panel {
            let modal = Rc::downgrade(&self.shared);
            let listener = doc.on(panel, EventKind::Click, self.shared.owner, move |_, event| {
                if let Some(modal) = modal.upgrade() {
                    modal.emit(&ModalEvent::ClickIn(ClickEvent {
                        target: event.target(),
                    }));
                }
            })?;
            self.shared.panel_listener.set(Some(listener));
        }
        Ok(())
    }

    // --- Transition driver ---

    /// Update the `show` prop, starting or cancelling a transition.
    ///
    /// | phase      | `true`             | `false`            |
    /// |------------|--------------------|--------------------|
    /// | `Hidden`   | `before_enter`     | no-op              |
    /// | `Entering` | no-op              | `enter_cancelled`  |
    /// | `Shown`    | no-op              | `before_leave`     |
    /// | `Leaving`  | `leave_cancelled`  | no-op              |
    pub fn set_show(&self, show: bool) -> Result<(), LifecycleError> {
        self.ensure_alive()?;
        match (show, self.phase()) {
            (true, ModalPhase::Hidden) => self.before_enter()?,
            (false, ModalPhase::Entering) => self.enter_cancelled()?,
            (false, ModalPhase::Shown) => self.before_leave()?,
            (true, ModalPhase::Leaving) => self.leave_cancelled()?,
            _ => {}
        }
        self.shared.state.borrow_mut().props.show = show;
        Ok(())
    }

    /// Update the `overlay` prop. Applies from the next show.
    pub fn set_overlay(&self, overlay: bool) -> Result<(), LifecycleError> {
        self.ensure_alive()?;
        self.shared.state.borrow_mut().props.overlay = overlay;
        Ok(())
    }

    /// Complete the running transition, if any.
    pub fn finish_transition(&self) -> Result<(), LifecycleError> {
        match self.phase() {
            ModalPhase::Entering => self.after_enter(),
            ModalPhase::Leaving => self.after_leave(),
            ModalPhase::Destroyed => Err(LifecycleError::Destroyed),
            ModalPhase::Hidden | ModalPhase::Shown => Ok(()),
        }
    }

    // --- Hooks ---

    /// Just before the show transition starts.
    pub fn before_enter(&self) -> Result<(), LifecycleError> {
        self.expect_phase(Hook::BeforeEnter)?;
        let overlay = self.shared.state.borrow().props.overlay;
        self.controller.prepare_enter(overlay)?;
        self.advance(Hook::BeforeEnter);
        Ok(())
    }

    /// The show transition completed; this modal becomes active.
    pub fn after_enter(&self) -> Result<(), LifecycleError> {
        self.expect_phase(Hook::AfterEnter)?;
        let superseded = self.controller.activate(&self.shared)?;
        self.advance(Hook::AfterEnter);
        if let Some(previous) = superseded {
            previous.emit(&ModalEvent::Inactive);
        }
        Ok(())
    }

    /// The show transition was interrupted; the controller is not touched.
    pub fn enter_cancelled(&self) -> Result<(), LifecycleError> {
        self.expect_phase(Hook::EnterCancelled)?;
        self.controller.cancel_enter()?;
        self.advance(Hook::EnterCancelled);
        Ok(())
    }

    pub fn before_leave(&self) -> Result<(), LifecycleError> {
        self.expect_phase(Hook::BeforeLeave)?;
        self.advance(Hook::BeforeLeave);
        Ok(())
    }

    pub fn leave_cancelled(&self) -> Result<(), LifecycleError> {
        self.expect_phase(Hook::LeaveCancelled)?;
        self.advance(Hook::LeaveCancelled);
        Ok(())
    }

    /// The hide transition completed.
    pub fn after_leave(&self) -> Result<(), LifecycleError> {
        self.expect_phase(Hook::AfterLeave)?;
        self.controller.deactivate(&self.shared)?;
        self.advance(Hook::AfterLeave);
        Ok(())
    }

    /// Unmount the modal.
    ///
    /// Releases its share of controller state whatever phase it is in,
    /// removes every listener it registered, and detaches its root element.
    /// Calling it again does nothing.
    pub fn destroy(&self) {
        let phase = std::mem::replace(
            &mut self.shared.state.borrow_mut().phase,
            ModalPhase::Destroyed,
        );
        if phase == ModalPhase::Destroyed {
            return;
        }

        let released = match phase {
            ModalPhase::Shown | ModalPhase::Leaving => self.controller.deactivate(&self.shared),
            ModalPhase::Entering => self.controller.cancel_enter(),
            ModalPhase::Hidden | ModalPhase::Destroyed => Ok(()),
        };
        if let Err(err) = released {
            tracing::warn!(modal = self.id().id(), error = %err, "releasing modal state failed");
        }
        self.controller.forget(&self.shared);

        let doc = self.controller.document();
        self.shared.panel_listener.set(None);
        let removed = doc.off_all(self.shared.owner);
        if let Err(err) = doc.detach(self.shared.root) {
            tracing::warn!(modal = self.id().id(), error = %err, "detaching modal root failed");
        }
        tracing::debug!(modal = self.id().id(), from = %phase, listeners = removed, "modal destroyed");
    }

    // --- Internals ---

    fn ensure_alive(&self) -> Result<(), LifecycleError> {
        if self.phase() == ModalPhase::Destroyed {
            return Err(LifecycleError::Destroyed);
        }
        Ok(())
    }

    fn expect_phase(&self, hook: Hook) -> Result<(), LifecycleError> {
        let found = self.phase();
        if found == ModalPhase::Destroyed {
            return Err(LifecycleError::Destroyed);
        }
        if found != hook.from_phase() {
            tracing::warn!(modal = self.id().id(), hook = %hook, found = %found, "lifecycle hook out of order");
            return Err(LifecycleError::UnexpectedPhase { hook, found });
        }
        Ok(())
    }

    fn advance(&self, hook: Hook) {
        let phase = hook.to_phase();
        self.shared.state.borrow_mut().phase = phase;
        tracing::debug!(modal = self.id().id(), hook = %hook, phase = %phase, "lifecycle hook");
    }
}

impl Drop for ModalInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}
