#![forbid(unsafe_code)]

//! Body scroll lock.
//!
//! While an overlay modal is shown the page must keep its scrollbar gutter,
//! otherwise content shifts sideways when the overlay hides the page's own
//! scrolling. The lock forces `overflow-y` on the body; it is decided once,
//! when the first modal of a stack starts entering, and released when the
//! last shown modal has left.

use veil_dom::{Document, DomError};

/// Measure the page's native scrollbar width.
///
/// Any inline `width` on the root element is cleared for the measurement so
/// it cannot mask the gutter, then restored if it was set. The result is
/// `window.inner_width - root.offset_width`; zero means no gutter.
pub fn scrollbar_width(doc: &Document) -> Result<i64, DomError> {
    let root = doc.document_element();
    let saved = doc.style(root, "width")?;
    doc.set_style(root, "width", "")?;
    let offset = doc.offset_width(root);
    if !saved.is_empty() {
        doc.set_style(root, "width", &saved)?;
    }
    Ok(i64::from(doc.inner_width()) - i64::from(offset?))
}

/// Whether an entering modal needs the lock.
pub(crate) fn lock_needed(doc: &Document, overlay: bool) -> Result<bool, DomError> {
    if !overlay {
        return Ok(false);
    }
    Ok(scrollbar_width(doc)? > 0)
}

/// Set the body's `overflow-y`; an empty value clears it.
pub(crate) fn apply(doc: &Document, value: &str) -> Result<(), DomError> {
    doc.set_style(doc.body(), "overflow-y", value)
}

pub(crate) fn release(doc: &Document) -> Result<(), DomError> {
    apply(doc, "")
}

/// Current body `overflow-y`, empty when unlocked.
pub fn body_overflow(doc: &Document) -> String {
    doc.style(doc.body(), "overflow-y").unwrap_or_default()
}
