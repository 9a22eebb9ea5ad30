#![forbid(unsafe_code)]

//! Modal activation controller for veil.
//!
//! Many modals can be mounted on a page and several can be shown at once,
//! stacked. This crate keeps track of which one is on top and coordinates
//! what they share:
//!
//! - **Activation**: the most recently shown modal is *active*. Showing
//!   another one emits `inactive` on the previous active modal.
//! - **Document listeners**: one click listener and one keyup listener per
//!   document, routing `clickOut` and `keyEsc` to the active modal only.
//! - **Scroll lock**: the first overlay modal of a stack forces the body's
//!   `overflow-y` so the page keeps its scrollbar gutter; the last one to
//!   leave releases it.
//!
//! The host drives each [`ModalInstance`] through its lifecycle hooks around
//! its own show/hide animation; see [`phase`] for the state machine.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use veil_dom::{Document, Viewport};
//! use veil_modal::{ModalController, ModalEventKind, ModalInstance, ModalProps};
//!
//! let doc = Document::new(Viewport::new(1024, 768));
//! let controller = ModalController::for_document(&doc)?;
//!
//! let first = ModalInstance::create(&controller, ModalProps::new())?;
//! let second = ModalInstance::create(&controller, ModalProps::new())?;
//!
//! let superseded = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&superseded);
//! let _sub = first.on(ModalEventKind::Inactive, move |_| flag.set(true));
//!
//! first.set_show(true)?;
//! first.finish_transition()?;
//! second.set_show(true)?;
//! second.finish_transition()?;
//!
//! assert!(second.is_active());
//! assert!(superseded.get());
//! assert_eq!(controller.active_count(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod controller;
mod error;
pub mod events;
pub mod instance;
pub mod phase;
pub mod props;
pub mod scroll_lock;

pub use controller::ModalController;
#[cfg(feature = "props-config")]
pub use error::ConfigError;
pub use error::LifecycleError;
pub use events::{ClickEvent, KeyEvent, ModalEvent, ModalEventKind, Subscription};
pub use instance::{ModalId, ModalInstance};
pub use phase::{Hook, ModalPhase};
pub use props::{ControllerConfig, ModalProps};
