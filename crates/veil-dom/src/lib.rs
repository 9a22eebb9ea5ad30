#![forbid(unsafe_code)]

//! In-memory host document for veil.
//!
//! This crate models the slice of a browser document that overlay components
//! depend on: an element tree rooted at `html`/`body`, inline styles and
//! class lists, window metrics, owner-keyed event listeners, and bubbling
//! dispatch of click and key-release events.
//!
//! It is single-threaded by construction ([`Document`] is an `Rc` handle).

mod error;
pub mod event;
pub mod listener;
pub mod node;
pub mod style;
pub mod viewport;

pub use error::DomError;
pub use event::{DomEvent, EventFlags, EventKind, Key};
pub use listener::{Handler, ListenerId, ListenerOwner};
pub use node::{Document, DocumentId, NodeId};
pub use style::{ClassList, InlineStyle};
pub use viewport::Viewport;
