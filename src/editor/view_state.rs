//! Per-row presentation state for the service list, keyed by position.
//!
//! Rows have no identity beyond their index, so every structural change to
//! the service list must be mirrored here through one of the re-keying
//! methods. After each of them every key names a row that exists and still
//! describes the same logical row it described before.

use super::focus::TransientFocus;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

/// Position of one music item: (service index, item index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub category: usize,
    pub item: usize,
}

impl CellRef {
    pub fn new(category: usize, item: usize) -> Self {
        CellRef { category, item }
    }
}

/// A structural change expressed as a mapping from old to new positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Remap {
    /// The row at this index was deleted; later rows move up by one.
    Removed(usize),
    /// The rows at these two indices traded places.
    Swapped(usize, usize),
}

impl Remap {
    /// New position of the row that was at `pos`, or `None` if it is gone.
    pub(crate) fn apply(self, pos: usize) -> Option<usize> {
        match self {
            Remap::Removed(gone) => match pos.cmp(&gone) {
                Ordering::Less => Some(pos),
                Ordering::Equal => None,
                Ordering::Greater => Some(pos - 1),
            },
            Remap::Swapped(a, b) if pos == a => Some(b),
            Remap::Swapped(a, b) if pos == b => Some(a),
            Remap::Swapped(..) => Some(pos),
        }
    }
}

/// Rebuilds `map` with every key passed through `f`; `None` drops the entry.
/// `f` must be injective over the kept keys.
pub(crate) fn rekey<K: Ord + Copy, V>(map: &mut BTreeMap<K, V>, mut f: impl FnMut(K) -> Option<K>) {
    let old = std::mem::take(map);
    for (key, value) in old {
        if let Some(new_key) = f(key) {
            map.insert(new_key, value);
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ViewState {
    /// Service shows its full editor instead of a one-line summary.
    service_expanded: BTreeMap<usize, bool>,
    /// Expanded service shows every item instead of the first few.
    category_expanded: BTreeMap<usize, bool>,
    /// The single music item in inline-edit mode.
    editing: Option<CellRef>,
    /// Type suggestion list visibility per item.
    typeahead_open: BTreeMap<CellRef, bool>,
    focus: TransientFocus,
}

impl ViewState {
    pub fn is_service_expanded(&self, idx: usize) -> bool {
        self.service_expanded.get(&idx).copied().unwrap_or(false)
    }

    pub fn is_category_expanded(&self, idx: usize) -> bool {
        self.category_expanded.get(&idx).copied().unwrap_or(false)
    }

    pub fn editing(&self) -> Option<CellRef> {
        self.editing
    }

    pub fn is_editing(&self, cell: CellRef) -> bool {
        self.editing == Some(cell)
    }

    pub fn is_typeahead_open(&self, cell: CellRef) -> bool {
        self.typeahead_open.get(&cell).copied().unwrap_or(false)
    }

    pub fn focused(&self) -> Option<usize> {
        self.focus.index()
    }

    pub fn service_expanded_map(&self) -> &BTreeMap<usize, bool> {
        &self.service_expanded
    }

    pub fn category_expanded_map(&self) -> &BTreeMap<usize, bool> {
        &self.category_expanded
    }

    pub fn typeahead_map(&self) -> &BTreeMap<CellRef, bool> {
        &self.typeahead_open
    }

    pub fn set_service_expanded(&mut self, idx: usize, expanded: bool) {
        self.service_expanded.insert(idx, expanded);
    }

    pub fn set_category_expanded(&mut self, idx: usize, expanded: bool) {
        self.category_expanded.insert(idx, expanded);
    }

    pub fn toggle_service_expanded(&mut self, idx: usize) {
        let next = !self.is_service_expanded(idx);
        self.set_service_expanded(idx, next);
    }

    pub fn toggle_category_expanded(&mut self, idx: usize) {
        let next = !self.is_category_expanded(idx);
        self.set_category_expanded(idx, next);
    }

    /// Replaces the editing cursor. Whatever cell was open before is closed
    /// implicitly.
    pub fn set_editing(&mut self, cell: Option<CellRef>) {
        self.editing = cell;
    }

    pub fn set_typeahead(&mut self, cell: CellRef, open: bool) {
        self.typeahead_open.insert(cell, open);
    }

    pub fn start_focus(&mut self, idx: usize, now: Instant) {
        self.focus.start(idx, now);
    }

    pub fn expire_focus(&mut self, now: Instant) -> bool {
        self.focus.expire(now)
    }

    /// Service `idx` was deleted: its state is dropped and later keys
    /// compact down by one.
    pub fn category_removed(&mut self, idx: usize) {
        self.apply_category_remap(Remap::Removed(idx));
    }

    /// Services `a` and `b` traded places: their state trades with them.
    pub fn categories_swapped(&mut self, a: usize, b: usize) {
        self.apply_category_remap(Remap::Swapped(a, b));
    }

    /// Item `item` of service `category` was deleted. Only that service's
    /// cells are touched.
    pub fn item_removed(&mut self, category: usize, item: usize) {
        let remap = Remap::Removed(item);
        let within = |cell: CellRef| {
            if cell.category == category {
                remap.apply(cell.item).map(|item| CellRef::new(category, item))
            } else {
                Some(cell)
            }
        };
        self.editing = self.editing.and_then(within);
        rekey(&mut self.typeahead_open, within);
    }

    fn apply_category_remap(&mut self, remap: Remap) {
        let cell_remap = |cell: CellRef| {
            remap
                .apply(cell.category)
                .map(|category| CellRef::new(category, cell.item))
        };
        rekey(&mut self.service_expanded, |k| remap.apply(k));
        rekey(&mut self.category_expanded, |k| remap.apply(k));
        rekey(&mut self.typeahead_open, cell_remap);
        self.editing = self.editing.and_then(cell_remap);
        self.focus.remap(remap);
    }
}
