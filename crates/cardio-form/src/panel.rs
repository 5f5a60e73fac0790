#![forbid(unsafe_code)]

//! Panels: the steps of the multi-step form.

use std::ops::Range;

use crate::field::Field;

/// Declaration of one panel and the fields it groups, in document order.
#[derive(Debug, Clone)]
pub struct PanelSpec {
    pub id: String,
    pub title: String,
    pub fields: Vec<Field>,
}

impl PanelSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields,
        }
    }
}

/// One step of the form.
///
/// Panels never store their own active flag; the navigator holds the single
/// active index and every presentation bit is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Identifier targeted by the tab strip.
    pub id: String,
    /// Tab title.
    pub title: String,
    /// Position in the form (0-based).
    pub ordinal: usize,
    /// Indices of this panel's fields in the form's document order.
    pub fields: Range<usize>,
}

/// Derived presentation of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPresentation {
    /// Carries the open/active class.
    pub active: bool,
    /// Accessibility hidden flag; always the negation of `active`.
    pub hidden: bool,
}

impl PanelPresentation {
    pub(crate) fn new(active: bool) -> Self {
        Self {
            active,
            hidden: !active,
        }
    }
}

/// One entry of the tab strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Target panel identifier.
    pub target: String,
    /// Tab text.
    pub title: String,
    /// Mirrors the target panel's active state.
    pub selected: bool,
}
