//! Symbol entity: a (SID, optional text, optional import-location) tuple.
//!
//! Upstream reference: `ion/symbols.rs` (`SymbolTable`'s parallel text array),
//! generalized to spec.md §3's richer per-symbol attributes.

use std::rc::Rc;

/// Where a symbol with unknown text came from: a named shared table and its
/// 1-based slot within that table's own local symbol list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLocation {
    pub name: Rc<str>,
    pub position: u32,
}

/// A single entry in a symbol context.
///
/// `text` is absent when the declaring shared table could not be resolved,
/// or when a `symbols` list element was null / not a string (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct Symbol {
    pub sid: u32,
    pub text: Option<Rc<str>>,
    pub import_location: Option<ImportLocation>,
    pub add_count: u32,
}

impl Symbol {
    pub fn named(sid: u32, text: Rc<str>) -> Self {
        Self {
            sid,
            text: Some(text),
            import_location: None,
            add_count: 0,
        }
    }

    /// A local symbol slot with no text (`symbols` list null/non-string
    /// element, or post-pass placeholder). Equivalent to symbol zero.
    pub fn unknown_local(sid: u32) -> Self {
        Self {
            sid,
            text: None,
            import_location: None,
            add_count: 0,
        }
    }

    /// A synthesized unknown-text symbol standing in for an unresolved
    /// import slot (spec.md §4.6 "By SID").
    pub fn unknown_shared(sid: u32, location: ImportLocation) -> Self {
        Self {
            sid,
            text: None,
            import_location: Some(location),
            add_count: 0,
        }
    }

    pub fn has_known_text(&self) -> bool {
        self.text.is_some()
    }
}

/// Equality per spec.md §8 testable property 7: text compares by value when
/// both sides have text; otherwise two local (no import-location)
/// unknown-text symbols are always equal (both represent symbol zero), and
/// two shared unknown-text symbols are equal iff their import-locations
/// match. A local vs. shared unknown-text pair is never equal.
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        match (&self.text, &other.text) {
            (Some(a), Some(b)) => a == b,
            (None, None) => match (&self.import_location, &other.import_location) {
                (None, None) => true,
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for Symbol {}

/// Renders a symbol the way it would appear in Ion text: quoted/bare text
/// when known, `$<sid>` identifier syntax otherwise.
impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}", super::quoting::format_symbol_text(text)),
            None => write!(f, "${}", self.sid),
        }
    }
}
