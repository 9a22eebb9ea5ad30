#![forbid(unsafe_code)]

//! Modal props and controller configuration.
//!
//! With the `props-config` feature both types deserialize from JSON; missing
//! fields take their defaults.

#[cfg(feature = "props-config")]
use crate::error::ConfigError;

/// Default value written to the body's `overflow-y` while scroll is locked.
pub const DEFAULT_LOCK_VALUE: &str = "scroll";

/// Default class added to the root element while any modal is shown.
pub const DEFAULT_PAGE_CLASS: &str = "veil-modal-page";

/// Host-controlled options of one modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "props-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ModalProps {
    /// Whether the modal should be visible.
    pub show: bool,
    /// Whether the modal covers the page and locks its scroll.
    pub overlay: bool,
}

impl Default for ModalProps {
    fn default() -> Self {
        Self {
            show: false,
            overlay: true,
        }
    }
}

impl ModalProps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    #[must_use]
    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Parse props from a JSON object such as `{"show": true}`.
    #[cfg(feature = "props-config")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Document-wide settings of a [`ModalController`](crate::ModalController).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "props-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ControllerConfig {
    /// Body `overflow-y` value applied when the scroll lock engages.
    pub lock_value: String,
    /// Class toggled on the root element while any modal is shown.
    /// `None` disables the page class.
    pub page_class: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            lock_value: DEFAULT_LOCK_VALUE.to_owned(),
            page_class: Some(DEFAULT_PAGE_CLASS.to_owned()),
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lock_value(mut self, value: impl Into<String>) -> Self {
        self.lock_value = value.into();
        self
    }

    #[must_use]
    pub fn page_class(mut self, class: Option<&str>) -> Self {
        self.page_class = class.map(str::to_owned);
        self
    }

    /// Parse a configuration from JSON.
    #[cfg(feature = "props-config")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
