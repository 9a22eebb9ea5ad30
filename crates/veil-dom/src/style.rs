#![forbid(unsafe_code)]

//! Inline style declarations and class lists.

use ahash::AHashMap;

/// Inline `style` declarations of one element.
///
/// Property names are normalized to kebab-case, so `overflowY` and
/// `overflow-y` address the same declaration. Assigning an empty value
/// removes the declaration, as `element.style.prop = ''` does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: AHashMap<String, String>,
}

impl InlineStyle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a declared value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .get(&normalize_property(property))
            .map(String::as_str)
    }

    /// Set a declaration; an empty (or blank) value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = normalize_property(property);
        let value = value.trim();
        if value.is_empty() {
            self.declarations.remove(&property);
        } else {
            self.declarations.insert(property, value.to_owned());
        }
    }

    /// Remove a declaration, returning its previous value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.declarations.remove(&normalize_property(property))
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }
}

/// Convert `camelCase` property names to `kebab-case` and lower-case them.
fn normalize_property(property: &str) -> String {
    let property = property.trim();
    let mut out = String::with_capacity(property.len() + 2);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Ordered, duplicate-free list of class names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: Vec<String>,
}

impl ClassList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add(&mut self, class: &str) -> bool {
        if class.is_empty() || self.contains(class) {
            return false;
        }
        self.classes.push(class.to_owned());
        true
    }

    /// Remove a class. Returns `false` if it was absent.
    pub fn remove(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
