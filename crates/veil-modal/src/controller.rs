#![forbid(unsafe_code)]

//! The modal activation controller.
//!
//! One controller exists per [`Document`]. It owns the state every modal on
//! that document shares:
//!
//! - `active`: a weak reference to the most recently activated modal.
//! - `active_count`: how many modals are between `after_enter` and
//!   `after_leave`.
//! - `entering`: how many modals are between `before_enter` and
//!   `after_enter` (or `enter_cancelled`).
//!
//! It also installs two listeners on the root element, once per document:
//! clicks outside the active modal's panel emit `clickOut` on it, and ESC
//! key releases emit `keyEsc` on it (with the default action prevented).
//!
//! # Invariants
//!
//! 1. `active` is `None` or refers to a live, counted modal.
//! 2. `active_count` never underflows; an unmatched release is logged and
//!    clamped at zero.
//! 3. The scroll lock is decided only when no modal is active, and released
//!    when the last shown modal leaves (or the last pending show is
//!    cancelled with nothing shown).
//! 4. No interior borrow is held while modal events are emitted, so event
//!    callbacks may drive further lifecycle hooks.
//!
//! # Example
//!
//! ```
//! use veil_dom::{Document, Key, Viewport};
//! use veil_modal::{ModalController, ModalInstance, ModalProps};
//!
//! let doc = Document::new(Viewport::new(1024, 768));
//! let controller = ModalController::for_document(&doc)?;
//! let modal = ModalInstance::create(&controller, ModalProps::new().show(true))?;
//! modal.finish_transition()?;
//! assert_eq!(controller.active_id(), Some(modal.id()));
//!
//! let escaped = doc.keyup(doc.body(), Key::Escape)?;
//! assert!(escaped.default_prevented());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use veil_dom::{Document, DocumentId, DomError, DomEvent, EventKind, Key, ListenerOwner};

use crate::events::{ClickEvent, KeyEvent, ModalEvent};
use crate::instance::{ModalId, ModalShared};
use crate::props::ControllerConfig;
use crate::scroll_lock;

thread_local! {
    static CONTROLLERS: RefCell<AHashMap<DocumentId, Weak<RefCell<ControllerState>>>> =
        RefCell::new(AHashMap::new());
}

struct ControllerState {
    active: Option<Weak<ModalShared>>,
    active_count: usize,
    entering: usize,
    config: ControllerConfig,
    /// Page class currently on the root element.
    applied_class: Option<String>,
    owner: ListenerOwner,
}

impl ControllerState {
    fn active_modal(&self) -> Option<Rc<ModalShared>> {
        self.active.as_ref().and_then(Weak::upgrade)
    }

    fn is_active(&self, modal: &Rc<ModalShared>) -> bool {
        self.active
            .as_ref()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Rc::as_ptr(modal)))
    }
}

/// Shared handle to the activation state of one document.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct ModalController {
    doc: Document,
    state: Rc<RefCell<ControllerState>>,
}

impl std::fmt::Debug for ModalController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ModalController")
            .field("document", &self.doc.id())
            .field("active", &state.active_modal().map(|m| m.id()))
            .field("active_count", &state.active_count)
            .field("entering", &state.entering)
            .field("config", &state.config)
            .finish()
    }
}

impl ModalController {
    /// Get the controller of `doc`, installing it with the default
    /// configuration on first use.
    pub fn for_document(doc: &Document) -> Result<Self, DomError> {
        match Self::lookup(doc) {
            Some(controller) => Ok(controller),
            None => Self::install(doc, ControllerConfig::default()),
        }
    }

    /// Get the controller of `doc` and apply `config`, installing it if
    /// needed.
    pub fn with_config(doc: &Document, config: ControllerConfig) -> Result<Self, DomError> {
        if let Some(controller) = Self::lookup(doc) {
            controller.set_config(config);
            return Ok(controller);
        }
        Self::install(doc, config)
    }

    fn lookup(doc: &Document) -> Option<Self> {
        let state = CONTROLLERS.with(|controllers| {
            let mut controllers = controllers.borrow_mut();
            controllers.retain(|_, state| state.strong_count() > 0);
            controllers.get(&doc.id()).and_then(Weak::upgrade)
        })?;
        Some(Self {
            doc: doc.clone(),
            state,
        })
    }

    fn install(doc: &Document, config: ControllerConfig) -> Result<Self, DomError> {
        let owner = ListenerOwner::next();
        let state = Rc::new(RefCell::new(ControllerState {
            active: None,
            active_count: 0,
            entering: 0,
            config,
            applied_class: None,
            owner,
        }));

        let root = doc.document_element();
        let click_state = Rc::clone(&state);
        doc.on(root, EventKind::Click, owner, move |doc, event| {
            on_document_click(&click_state, doc, event);
        })?;
        let key_state = Rc::clone(&state);
        doc.on(root, EventKind::KeyUp, owner, move |_, event| {
            on_document_keyup(&key_state, event);
        })?;

        CONTROLLERS.with(|controllers| {
            controllers
                .borrow_mut()
                .insert(doc.id(), Rc::downgrade(&state));
        });
        tracing::debug!(document = doc.id().id(), "modal controller installed");

        Ok(Self {
            doc: doc.clone(),
            state,
        })
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The modal currently on top, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<ModalId> {
        self.state.borrow().active_modal().map(|modal| modal.id())
    }

    /// Number of modals between `after_enter` and `after_leave`.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.borrow().active_count
    }

    /// Number of modals between `before_enter` and the end of their show
    /// transition.
    #[must_use]
    pub fn entering_count(&self) -> usize {
        self.state.borrow().entering
    }

    #[must_use]
    pub fn config(&self) -> ControllerConfig {
        self.state.borrow().config.clone()
    }

    /// Replace the configuration.
    ///
    /// The lock value applies from the next lock decision and the page class
    /// from the next activation. A class already on the root element is still
    /// removed when the last shown modal leaves.
    pub fn set_config(&self, config: ControllerConfig) {
        self.state.borrow_mut().config = config;
    }

    /// Owner key of the two document-level listeners.
    #[must_use]
    pub fn listener_owner(&self) -> ListenerOwner {
        self.state.borrow().owner
    }

    /// Whether both handles refer to the same shared state.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // --- Lifecycle (driven by ModalInstance) ---

    /// A modal is about to start its show transition.
    ///
    /// When no modal is active this decides the scroll lock for the stack
    /// that is about to open.
    pub(crate) fn prepare_enter(&self, overlay: bool) -> Result<(), DomError> {
        let (has_active, lock_value) = {
            let state = self.state.borrow();
            (
                state.active_modal().is_some(),
                state.config.lock_value.clone(),
            )
        };
        if !has_active {
            let locked = scroll_lock::lock_needed(&self.doc, overlay)?;
            scroll_lock::apply(&self.doc, if locked { &lock_value } else { "" })?;
            tracing::debug!(locked, overlay, "scroll lock decided");
        }
        self.state.borrow_mut().entering += 1;
        Ok(())
    }

    /// A modal finished its show transition and becomes active.
    ///
    /// Returns the modal it supersedes; the caller emits `inactive` on it
    /// once its own phase has advanced.
    pub(crate) fn activate(
        &self,
        modal: &Rc<ModalShared>,
    ) -> Result<Option<Rc<ModalShared>>, DomError> {
        let (wanted, applied) = {
            let state = self.state.borrow();
            (state.config.page_class.clone(), state.applied_class.clone())
        };
        let root = self.doc.document_element();
        if let Some(old) = applied.as_ref().filter(|&old| Some(old) != wanted.as_ref()) {
            self.doc.remove_class(root, old)?;
        }
        if let Some(class) = &wanted {
            self.doc.add_class(root, class)?;
        }

        let mut state = self.state.borrow_mut();
        let previous = state
            .active_modal()
            .filter(|previous| !Rc::ptr_eq(previous, modal));
        state.active = Some(Rc::downgrade(modal));
        state.active_count += 1;
        state.entering = state.entering.saturating_sub(1);
        state.applied_class = wanted;
        if let Some(previous) = &previous {
            tracing::debug!(
                modal = modal.id().id(),
                previous = previous.id().id(),
                "modal superseded"
            );
        }
        Ok(previous)
    }

    /// A counted modal stopped being shown (hide completed or unmounted).
    pub(crate) fn deactivate(&self, modal: &Rc<ModalShared>) -> Result<(), DomError> {
        let (count, applied) = {
            let state = self.state.borrow();
            (state.active_count, state.applied_class.clone())
        };
        if count == 0 {
            tracing::warn!(
                modal = modal.id().id(),
                "modal released with no shown modals"
            );
        }
        let remaining = count.saturating_sub(1);
        if remaining == 0 {
            scroll_lock::release(&self.doc)?;
            if let Some(class) = &applied {
                self.doc.remove_class(self.doc.document_element(), class)?;
            }
            tracing::debug!("scroll lock released");
        }

        let mut state = self.state.borrow_mut();
        state.active_count = remaining;
        if remaining == 0 {
            state.applied_class = None;
        }
        if state.is_active(modal) {
            state.active = None;
        }
        Ok(())
    }

    /// A show transition was interrupted before `after_enter`.
    ///
    /// The active modal and count are untouched; the scroll lock is only
    /// released if nothing else is shown or entering.
    pub(crate) fn cancel_enter(&self) -> Result<(), DomError> {
        let idle = {
            let state = self.state.borrow();
            state.active_count == 0 && state.entering <= 1
        };
        if idle {
            scroll_lock::release(&self.doc)?;
        }
        let mut state = self.state.borrow_mut();
        state.entering = state.entering.saturating_sub(1);
        Ok(())
    }

    /// Drop any reference to a modal that is going away uncounted.
    pub(crate) fn forget(&self, modal: &Rc<ModalShared>) {
        let mut state = self.state.borrow_mut();
        if state.is_active(modal) {
            state.active = None;
        }
    }
}

fn on_document_click(state: &RefCell<ControllerState>, doc: &Document, event: &mut DomEvent) {
    let active = state.borrow().active_modal();
    let Some(active) = active else {
        return;
    };
    // A panel that is unset or unknown counts as "outside".
    let inside = active
        .panel()
        .is_some_and(|panel| doc.contains(panel, event.target()).unwrap_or(false));
    if !inside {
        tracing::debug!(modal = active.id().id(), "click outside active modal");
        active.emit(&ModalEvent::ClickOut(ClickEvent {
            target: event.target(),
        }));
    }
}

fn on_document_keyup(state: &RefCell<ControllerState>, event: &mut DomEvent) {
    if event.key() != Some(Key::Escape) {
        return;
    }
    let active = state.borrow().active_modal();
    let Some(active) = active else {
        return;
    };
    event.prevent_default();
    tracing::debug!(modal = active.id().id(), "escape on active modal");
    active.emit(&ModalEvent::KeyEsc(KeyEvent {
        key: Key::Escape,
        target: event.target(),
    }));
}

#[cfg(test)]
fn installed_controllers() -> usize {
    CONTROLLERS.with(|controllers| {
        let mut controllers = controllers.borrow_mut();
        controllers.retain(|_, state| state.strong_count() > 0);
        controllers.len()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_dom::Viewport;

    #[test]
    fn one_controller_per_document() {
        let doc = Document::default();
        let a = ModalController::for_document(&doc).unwrap();
        let b = ModalController::for_document(&doc).unwrap();
        assert!(a.same_as(&b));

        let other = Document::default();
        let c = ModalController::for_document(&other).unwrap();
        assert!(!a.same_as(&c));
    }

    #[test]
    fn installs_exactly_two_document_listeners() {
        let doc = Document::default();
        let controller = ModalController::for_document(&doc).unwrap();
        let _again = ModalController::for_document(&doc).unwrap();
        assert_eq!(doc.listener_count(controller.listener_owner()), 2);
    }

    #[test]
    fn with_config_reconfigures_existing_controller() {
        let doc = Document::default();
        let controller = ModalController::for_document(&doc).unwrap();
        let config = ControllerConfig::new().lock_value("hidden").page_class(None);
        let reconfigured = ModalController::with_config(&doc, config.clone()).unwrap();

        assert!(controller.same_as(&reconfigured));
        assert_eq!(controller.config(), config);
    }

    #[test]
    fn controller_goes_away_with_its_document() {
        let baseline = installed_controllers();
        {
            let doc = Document::default();
            let _controller = ModalController::for_document(&doc).unwrap();
            assert_eq!(installed_controllers(), baseline + 1);
        }
        assert_eq!(installed_controllers(), baseline);
    }

    #[test]
    fn events_without_active_modal_are_ignored() {
        let doc = Document::new(Viewport::default());
        let controller = ModalController::for_document(&doc).unwrap();
        assert_eq!(controller.active_id(), None);

        let click = doc.click(doc.body()).unwrap();
        assert!(!click.default_prevented());
        let esc = doc.keyup(doc.body(), Key::Escape).unwrap();
        assert!(!esc.default_prevented());
    }

    #[test]
    fn cancel_enter_releases_lock_only_when_idle() {
        let doc = Document::new(
            Viewport::new(1024, 768)
                .with_scrollbar_width(15)
                .with_content_height(2000),
        );
        let controller = ModalController::for_document(&doc).unwrap();

        controller.prepare_enter(true).unwrap();
        controller.prepare_enter(true).unwrap();
        assert_eq!(scroll_lock::body_overflow(&doc), "scroll");
        assert_eq!(controller.entering_count(), 2);

        controller.cancel_enter().unwrap();
        assert_eq!(scroll_lock::body_overflow(&doc), "scroll");
        controller.cancel_enter().unwrap();
        assert_eq!(scroll_lock::body_overflow(&doc), "");
        assert_eq!(controller.entering_count(), 0);
        assert_eq!(controller.active_count(), 0);
    }
}
