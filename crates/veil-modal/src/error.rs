#![forbid(unsafe_code)]

use veil_dom::DomError;

use crate::phase::{Hook, ModalPhase};

/// Error returned when a lifecycle hook cannot run.
///
/// A failed hook leaves both the modal and the controller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The hook was invoked out of order.
    UnexpectedPhase {
        hook: Hook,
        /// Phase the modal was actually in.
        found: ModalPhase,
    },
    /// The modal has already been destroyed.
    Destroyed,
    /// A document operation failed (for example, an element that does not
    /// belong to the controller's document).
    Dom(DomError),
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedPhase { hook, found } => write!(
                f,
                "{hook} requires phase {}, found {found}",
                hook.from_phase()
            ),
            Self::Destroyed => write!(f, "modal has been destroyed"),
            Self::Dom(err) => write!(f, "document error: {err}"),
        }
    }
}

impl std::error::Error for LifecycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for LifecycleError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

/// Error loading props or controller configuration.
#[cfg(feature = "props-config")]
#[derive(Debug)]
pub enum ConfigError {
    /// The input was not valid JSON for the target type.
    Json(serde_json::Error),
}

#[cfg(feature = "props-config")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

#[cfg(feature = "props-config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

#[cfg(feature = "props-config")]
impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
