//! The `Table` entity: system, shared, or local symbol context.
//!
//! Upstream reference: `ion/symbols.rs`'s `SymbolTable`, generalized to
//! spec.md §3-4's three-kind model (system/shared/local) with an explicit
//! owner token and lazily-built lookup index, instead of one eagerly-built
//! `HashMap` shared by every kind.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::error::SymbolTableError;
use super::import::ResolvedImport;
use super::indices::{ByNameIndex, INDEX_BUILD_THRESHOLD};
use super::symbol::Symbol;

/// Which of the three roles a table plays (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    System,
    Shared,
    Local,
}

/// An opaque arena-owner token. Two tables share an owner iff they were
/// produced by the same `open`/mutation lineage; a clone either aliases its
/// source's text (same owner) or deep-copies it (new owner), per spec.md §5.
#[derive(Clone)]
pub struct OwnerId(Rc<()>);

impl OwnerId {
    pub fn new() -> Self {
        OwnerId(Rc::new(()))
    }

    pub fn same_as(&self, other: &OwnerId) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for OwnerId {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}
impl Eq for OwnerId {}

/// A symbol table: system, shared, or local.
///
/// Mutable fields use `Cell`/`RefCell` because spec.md §5 scopes a table to
/// single-threaded, one-owner-at-a-time use, and the by-name index must be
/// buildable lazily behind a shared (`&Table`) reference once a table has
/// been locked and handed out as `Rc<Table>`.
pub struct Table {
    owner: RefCell<OwnerId>,
    kind: TableKind,
    is_locked: Cell<bool>,
    name: RefCell<Option<Rc<str>>>,
    version: Cell<u32>,
    /// The highest SID this table assigns, counting imports.
    max_id: Cell<u32>,
    /// The lowest SID this table's own local symbols start at (1 + the sum
    /// of every import's declared max_id).
    min_local_id: Cell<u32>,
    /// Tracks `max_id` independent of in-memory local symbol count, so a
    /// caller can query what was last flushed without forcing a rebuild
    /// (see SPEC_FULL.md "Supplemented features").
    flushed_max_id: Cell<u32>,
    imports: RefCell<Vec<ResolvedImport>>,
    symbols: RefCell<Vec<Symbol>>,
    by_name: RefCell<ByNameIndex>,
    /// Borrowed reference to the system table this table was built against.
    /// `Weak`, never `Rc`, per spec.md §4.1: the system table owns no
    /// reference back to tables built under it.
    system_table: Weak<Table>,
}

impl Table {
    /// Builds a fresh, unlocked, empty local table with no imports.
    ///
    /// Per spec.md §4.6 ("for LOCAL tables, SIDs 1..system.max_id are
    /// resolved in the system table"), a local table's own SID space starts
    /// right after the system table's, not at 1 — so a brand-new local
    /// table already reports `max_id == system_table.max_id()` before any
    /// import or local symbol is added.
    pub fn new_local(system_table: Weak<Table>) -> Rc<Table> {
        let system_max_id = system_table.upgrade().map(|t| t.max_id()).unwrap_or(0);
        Rc::new(Table {
            owner: RefCell::new(OwnerId::new()),
            kind: TableKind::Local,
            is_locked: Cell::new(false),
            name: RefCell::new(None),
            version: Cell::new(0),
            max_id: Cell::new(system_max_id),
            min_local_id: Cell::new(system_max_id + 1),
            flushed_max_id: Cell::new(system_max_id),
            imports: RefCell::new(Vec::new()),
            symbols: RefCell::new(Vec::new()),
            by_name: RefCell::new(ByNameIndex::new()),
            system_table,
        })
    }

    /// Builds a shared table directly from its declared contents. Locked on
    /// construction: shared tables are immutable once named (spec.md §4.2).
    pub fn new_shared(
        name: Rc<str>,
        version: u32,
        symbols: Vec<Symbol>,
        system_table: Weak<Table>,
    ) -> Result<Rc<Table>, SymbolTableError> {
        let max_id = symbols.last().map(|s| s.sid).unwrap_or(0);
        Ok(Rc::new(Table {
            owner: RefCell::new(OwnerId::new()),
            kind: TableKind::Shared,
            is_locked: Cell::new(true),
            name: RefCell::new(Some(name)),
            version: Cell::new(version.max(1)),
            max_id: Cell::new(max_id),
            min_local_id: Cell::new(1),
            flushed_max_id: Cell::new(max_id),
            imports: RefCell::new(Vec::new()),
            symbols: RefCell::new(symbols),
            by_name: RefCell::new(ByNameIndex::new()),
            system_table,
        }))
    }

    /// Builds the bootstrap system table (spec.md §4.1). `system_table`
    /// points to the table being built itself, via `Rc::new_cyclic`.
    pub fn new_system(version: u32, symbols: Vec<Symbol>) -> Rc<Table> {
        let max_id = symbols.last().map(|s| s.sid).unwrap_or(0);
        Rc::new_cyclic(|weak_self| Table {
            owner: RefCell::new(OwnerId::new()),
            kind: TableKind::System,
            is_locked: Cell::new(true),
            name: RefCell::new(Some(Rc::from("$ion"))),
            version: Cell::new(version),
            max_id: Cell::new(max_id),
            min_local_id: Cell::new(1),
            flushed_max_id: Cell::new(max_id),
            imports: RefCell::new(Vec::new()),
            symbols: RefCell::new(symbols),
            by_name: RefCell::new(ByNameIndex::new()),
            system_table: weak_self.clone(),
        })
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked.get()
    }

    pub fn lock(&self) {
        self.is_locked.set(true);
    }

    pub fn name(&self) -> Option<Rc<str>> {
        self.name.borrow().as_ref().cloned()
    }

    pub fn version(&self) -> u32 {
        self.version.get()
    }

    pub fn max_id(&self) -> u32 {
        self.max_id.get()
    }

    pub fn flushed_max_id(&self) -> u32 {
        self.flushed_max_id.get()
    }

    pub fn set_flushed_max_id(&self, value: u32) {
        self.flushed_max_id.set(value);
    }

    pub fn min_local_id(&self) -> u32 {
        self.min_local_id.get()
    }

    pub fn owner(&self) -> OwnerId {
        OwnerId::clone(&self.owner.borrow())
    }

    pub fn system_table(&self) -> Option<Rc<Table>> {
        self.system_table.upgrade()
    }

    pub fn imports(&self) -> std::cell::Ref<'_, Vec<ResolvedImport>> {
        self.imports.borrow()
    }

    pub fn symbols(&self) -> std::cell::Ref<'_, Vec<Symbol>> {
        self.symbols.borrow()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.borrow().len()
    }

    fn ensure_mutable(&self) -> Result<(), SymbolTableError> {
        if self.is_locked.get() {
            Err(SymbolTableError::Immutable)
        } else {
            Ok(())
        }
    }

    pub fn set_name(&self, name: Rc<str>) -> Result<(), SymbolTableError> {
        self.ensure_mutable()?;
        *self.name.borrow_mut() = Some(name);
        Ok(())
    }

    pub fn set_version(&self, version: u32) -> Result<(), SymbolTableError> {
        self.ensure_mutable()?;
        self.version.set(version.max(1));
        Ok(())
    }

    /// Appends an import, shifting `min_local_id`/`max_id` by its declared
    /// size. Only legal before any local symbols have been declared
    /// (spec.md §4.3 "Import ordering").
    pub fn add_import(&self, import: ResolvedImport) -> Result<(), SymbolTableError> {
        self.ensure_mutable()?;
        if !self.symbols.borrow().is_empty() {
            return Err(SymbolTableError::HasLocalSymbols);
        }
        let declared = import.declared_max_id();
        self.imports.borrow_mut().push(import);
        let new_min = self.min_local_id.get() + declared;
        self.min_local_id.set(new_min);
        self.max_id.set(new_min - 1);
        Ok(())
    }

    /// Appends a local symbol with known text, returning its assigned SID.
    ///
    /// `flushed_max_id` is untouched: it only advances when a serializer
    /// calls [`Table::set_flushed_max_id`] after writing symbols out.
    pub fn add_symbol(&self, text: Rc<str>) -> Result<u32, SymbolTableError> {
        self.ensure_mutable()?;
        let sid = self.max_id.get() + 1;
        self.max_id.set(sid);
        self.symbols.borrow_mut().push(Symbol::named(sid, text.clone()));
        self.touch_index(text, sid);
        Ok(sid)
    }

    /// Appends an unknown-text local symbol slot (a `null`/non-string
    /// element decoded from `symbols`), returning its assigned SID.
    pub fn add_unknown_symbol(&self) -> Result<u32, SymbolTableError> {
        self.ensure_mutable()?;
        let sid = self.max_id.get() + 1;
        self.max_id.set(sid);
        self.symbols.borrow_mut().push(Symbol::unknown_local(sid));
        Ok(sid)
    }

    /// Increments `add_count` on the local symbol at `sid`, if `sid` falls
    /// within this table's own local range. A `sid` resolving into the
    /// system table or an import has no local slot to bump and is a no-op.
    pub fn bump_local_add_count(&self, sid: u32) -> bool {
        let min = self.min_local_id.get();
        if sid < min {
            return false;
        }
        let offset = (sid - min) as usize;
        match self.symbols.borrow_mut().get_mut(offset) {
            Some(symbol) => {
                symbol.add_count += 1;
                true
            }
            None => false,
        }
    }

    fn touch_index(&self, text: Rc<str>, sid: u32) {
        let mut index = self.by_name.borrow_mut();
        if index.is_built() {
            index.insert(text, sid);
        } else if self.symbols.borrow().len() >= INDEX_BUILD_THRESHOLD {
            self.rebuild_index(&mut index);
        }
    }

    fn rebuild_index(&self, index: &mut ByNameIndex) {
        let symbols = self.symbols.borrow();
        index.build(symbols.iter().filter_map(|s| s.text.as_ref().map(|t| (s.sid, t.as_ref()))));
    }

    /// Finds a local symbol's SID by text, building the by-name index first
    /// if the symbol count has crossed the threshold and it isn't built yet.
    pub fn find_local_by_text(&self, text: &str) -> Option<u32> {
        {
            let mut index = self.by_name.borrow_mut();
            if !index.is_built() && self.symbols.borrow().len() >= INDEX_BUILD_THRESHOLD {
                self.rebuild_index(&mut index);
            }
            if index.is_built() {
                return index.get(text);
            }
        }
        self.symbols
            .borrow()
            .iter()
            .find(|s| s.text.as_deref() == Some(text))
            .map(|s| s.sid)
    }

    pub fn local_by_sid(&self, sid: u32) -> Option<Symbol> {
        let min = self.min_local_id.get();
        if sid < min {
            return None;
        }
        let offset = (sid - min) as usize;
        self.symbols.borrow().get(offset).cloned()
    }

    /// Clones this table under a given destination owner. If `new_owner`
    /// matches this table's own owner, text is aliased (cheap `Rc` clone);
    /// otherwise every symbol's text is deep-copied into a fresh owner
    /// (spec.md §5 "Same-owner vs. new-owner clone").
    pub fn clone_for_owner(&self, new_owner: OwnerId) -> Rc<Table> {
        let same_owner = self.owner.borrow().same_as(&new_owner);
        let symbols: Vec<Symbol> = self.symbols.borrow().iter().cloned().collect();
        let symbols = if same_owner {
            symbols
        } else {
            symbols
                .into_iter()
                .map(|s| Symbol {
                    sid: s.sid,
                    text: s.text.as_deref().map(Rc::from),
                    import_location: s.import_location.clone(),
                    add_count: s.add_count,
                })
                .collect()
        };
        Rc::new(Table {
            owner: RefCell::new(new_owner),
            kind: self.kind,
            is_locked: Cell::new(false),
            name: RefCell::new(self.name.borrow().as_ref().cloned()),
            version: Cell::new(self.version.get()),
            max_id: Cell::new(self.max_id.get()),
            min_local_id: Cell::new(self.min_local_id.get()),
            flushed_max_id: Cell::new(self.flushed_max_id.get()),
            imports: RefCell::new(self.imports.borrow().iter().cloned().collect()),
            symbols: RefCell::new(symbols),
            by_name: RefCell::new(ByNameIndex::new()),
            system_table: self.system_table.clone(),
        })
    }
}
