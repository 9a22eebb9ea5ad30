#![forbid(unsafe_code)]

//! Window metrics used to resolve element widths.

/// Window geometry in CSS pixels.
///
/// The document reserves `scrollbar_width` pixels of the window for a
/// vertical scrollbar whenever one is visible: either the content is taller
/// than the window, or the body forces one with `overflow-y: scroll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// `window.innerWidth`, scrollbar included.
    pub inner_width: u32,
    /// `window.innerHeight`.
    pub inner_height: u32,
    /// Width of a native vertical scrollbar; zero for overlay scrollbars.
    pub scrollbar_width: u32,
    /// Height of the laid-out page content.
    pub content_height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

impl Viewport {
    /// A window whose content fits without scrolling.
    #[must_use]
    pub const fn new(inner_width: u32, inner_height: u32) -> Self {
        Self {
            inner_width,
            inner_height,
            scrollbar_width: 0,
            content_height: 0,
        }
    }

    #[must_use]
    pub const fn with_scrollbar_width(mut self, scrollbar_width: u32) -> Self {
        self.scrollbar_width = scrollbar_width;
        self
    }

    #[must_use]
    pub const fn with_content_height(mut self, content_height: u32) -> Self {
        self.content_height = content_height;
        self
    }

    /// Whether content is taller than the window.
    #[inline]
    #[must_use]
    pub const fn overflows(&self) -> bool {
        self.content_height > self.inner_height
    }

    /// Whether a vertical scrollbar is shown for the given body `overflow-y`.
    #[must_use]
    pub fn scrollbar_visible(&self, overflow_y: &str) -> bool {
        match overflow_y {
            "scroll" => true,
            "hidden" | "clip" => false,
            _ => self.overflows(),
        }
    }

    /// Width available to block content, scrollbar excluded.
    #[must_use]
    pub fn client_width(&self, overflow_y: &str) -> u32 {
        if self.scrollbar_visible(overflow_y) {
            self.inner_width.saturating_sub(self.scrollbar_width)
        } else {
            self.inner_width
        }
    }
}

/// Resolve a CSS `width` value against the containing block width.
///
/// Only `px` and `%` lengths are resolved; anything else (such as `auto`)
/// yields `None` so the caller falls back to block layout.
pub(crate) fn resolve_width(value: &str, containing: u32) -> Option<u32> {
    let value = value.trim();
    if let Some(px) = value.strip_suffix("px") {
        let px: f64 = px.trim().parse().ok()?;
        return (px >= 0.0).then(|| px.round() as u32);
    }
    if let Some(pct) = value.strip_suffix('%') {
        let pct: f64 = pct.trim().parse().ok()?;
        return (pct >= 0.0).then(|| (f64::from(containing) * pct / 100.0).round() as u32);
    }
    None
}
