//! Lazily-built by-name index over a table's local symbols.
//!
//! Upstream reference: `ion/symbols.rs`'s `SymbolTable::lookup` (a plain
//! `HashMap<String, u32>` built eagerly). Here the map is built lazily and
//! only once the local symbol count passes a threshold, per spec.md §4.6;
//! below the threshold, callers fall back to a linear scan over the
//! `symbols` vector, which is itself already a dense, `sid`-ordered array —
//! so unlike the by-name map, no separate "by-SID dense array" structure is
//! needed (see DESIGN.md Open Question notes).

use std::collections::HashMap;
use std::rc::Rc;

/// Symbol counts at or above this are worth a hash index; below it a linear
/// scan over the (already small) symbol list is cheaper to build.
pub const INDEX_BUILD_THRESHOLD: usize = 16;

#[derive(Default)]
pub struct ByNameIndex {
    map: Option<HashMap<Rc<str>, u32>>,
}

impl ByNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.map.is_some()
    }

    /// Builds the index from scratch over `symbols` (sid, text) pairs in
    /// ascending sid order, so the first (lowest-SID) occurrence of any
    /// duplicated text wins, per spec.md §4.6 "Duplicate text".
    pub fn build<'a>(&mut self, symbols: impl Iterator<Item = (u32, &'a str)>) {
        let mut map = HashMap::new();
        for (sid, text) in symbols {
            map.entry(Rc::from(text)).or_insert(sid);
        }
        self.map = Some(map);
    }

    /// Inserts a freshly-added symbol into an already-built index. A
    /// duplicate key is left untouched (treated as success), matching the
    /// upstream hash-insert semantics.
    pub fn insert(&mut self, text: Rc<str>, sid: u32) {
        if let Some(map) = &mut self.map {
            map.entry(text).or_insert(sid);
        }
    }

    pub fn get(&self, text: &str) -> Option<u32> {
        self.map.as_ref().and_then(|m| m.get(text).copied())
    }

    pub fn clear(&mut self) {
        self.map = None;
    }
}
