//! The service → music item hierarchy.
//!
//! Every structural change goes through `ServiceEditor`, which updates the
//! sequence and the matching `ViewState` in the same call so callers never
//! observe the two out of step. All operations are total: an out-of-range
//! index or a move past either end changes nothing and returns false.

use super::view_state::{CellRef, ViewState};
use crate::data::event::{MusicItem, MusicList};
use std::time::Instant;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceCategory {
    pub name: String,
    pub items: Vec<MusicItem>,
}

impl ServiceCategory {
    /// An unnamed service holding one blank item, ready to type into.
    pub fn blank() -> Self {
        ServiceCategory {
            name: String::new(),
            items: vec![MusicItem::default()],
        }
    }

    /// Unnamed services are dropped by the server, so warn once anything in
    /// them is worth keeping.
    pub fn needs_name(&self) -> bool {
        self.name.trim().is_empty() && self.items.iter().any(MusicItem::has_title)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemField {
    Title,
    Composer,
    Type,
}

impl ItemField {
    pub const ALL: [ItemField; 3] = [ItemField::Title, ItemField::Composer, ItemField::Type];

    pub fn label(self) -> &'static str {
        match self {
            ItemField::Title => "Title",
            ItemField::Composer => "Composer",
            ItemField::Type => "Type",
        }
    }

    pub fn next(self) -> ItemField {
        match self {
            ItemField::Title => ItemField::Composer,
            ItemField::Composer => ItemField::Type,
            ItemField::Type => ItemField::Title,
        }
    }

    pub fn read(self, item: &MusicItem) -> &str {
        match self {
            ItemField::Title => &item.title,
            ItemField::Composer => &item.composer,
            ItemField::Type => &item.kind,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ServiceEditor {
    categories: Vec<ServiceCategory>,
    view: ViewState,
}

impl ServiceEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the editor from a stored music list. The first service starts
    /// open.
    pub fn from_music_list(list: &MusicList) -> Self {
        let categories: Vec<ServiceCategory> = list
            .iter()
            .map(|(name, items)| ServiceCategory {
                name: name.clone(),
                items: items.clone(),
            })
            .collect();
        let mut view = ViewState::default();
        if !categories.is_empty() {
            view.set_service_expanded(0, true);
            view.set_category_expanded(0, true);
        }
        ServiceEditor { categories, view }
    }

    pub fn categories(&self) -> &[ServiceCategory] {
        &self.categories
    }

    pub fn get(&self, idx: usize) -> Option<&ServiceCategory> {
        self.categories.get(idx)
    }

    pub fn item(&self, cell: CellRef) -> Option<&MusicItem> {
        self.categories.get(cell.category)?.items.get(cell.item)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Appends a blank service and opens its first item for editing.
    pub fn add_category(&mut self) -> usize {
        self.categories.push(ServiceCategory::blank());
        let idx = self.categories.len() - 1;
        self.view.set_service_expanded(idx, true);
        self.view.set_category_expanded(idx, true);
        self.view.set_editing(Some(CellRef::new(idx, 0)));
        tracing::debug!(index = idx, "service added");
        idx
    }

    pub fn remove_category(&mut self, idx: usize) -> bool {
        if idx >= self.categories.len() {
            return false;
        }
        self.categories.remove(idx);
        self.view.category_removed(idx);
        tracing::debug!(index = idx, "service removed");
        true
    }

    pub fn move_category_up(&mut self, idx: usize, now: Instant) -> bool {
        if idx == 0 || idx >= self.categories.len() {
            return false;
        }
        self.swap_categories(idx, idx - 1, now);
        true
    }

    pub fn move_category_down(&mut self, idx: usize, now: Instant) -> bool {
        if idx + 1 >= self.categories.len() {
            return false;
        }
        self.swap_categories(idx, idx + 1, now);
        true
    }

    fn swap_categories(&mut self, from: usize, to: usize, now: Instant) {
        self.categories.swap(from, to);
        self.view.categories_swapped(from, to);
        self.view.start_focus(to, now);
        tracing::debug!(from, to, "service moved");
    }

    pub fn rename_category(&mut self, idx: usize, name: &str) -> bool {
        match self.categories.get_mut(idx) {
            Some(category) => {
                category.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Appends a blank item to a service and opens it for editing. Returns
    /// the new item's index.
    pub fn add_item(&mut self, category: usize) -> Option<usize> {
        let items = &mut self.categories.get_mut(category)?.items;
        items.push(MusicItem::default());
        let item = items.len() - 1;
        self.view.set_category_expanded(category, true);
        self.view.set_editing(Some(CellRef::new(category, item)));
        tracing::debug!(category, item, "music item added");
        Some(item)
    }

    pub fn remove_item(&mut self, category: usize, item: usize) -> bool {
        let Some(items) = self.categories.get_mut(category).map(|c| &mut c.items) else {
            return false;
        };
        if item >= items.len() {
            return false;
        }
        items.remove(item);
        self.view.item_removed(category, item);
        tracing::debug!(category, item, "music item removed");
        true
    }

    pub fn set_item_field(&mut self, cell: CellRef, field: ItemField, value: &str) -> bool {
        let Some(item) = self
            .categories
            .get_mut(cell.category)
            .and_then(|c| c.items.get_mut(cell.item))
        else {
            return false;
        };
        let slot = match field {
            ItemField::Title => &mut item.title,
            ItemField::Composer => &mut item.composer,
            ItemField::Type => &mut item.kind,
        };
        *slot = value.to_string();
        true
    }

    /// Moves the editing cursor to `cell`, closing whichever cell was open,
    /// and makes sure the full item list is showing.
    pub fn set_editing_cell(&mut self, cell: CellRef) -> bool {
        if self.item(cell).is_none() {
            return false;
        }
        self.view.set_editing(Some(cell));
        self.view.set_category_expanded(cell.category, true);
        true
    }

    pub fn clear_editing_cell(&mut self) {
        self.view.set_editing(None);
    }

    pub fn toggle_typeahead(&mut self, cell: CellRef, open: bool) -> bool {
        if self.item(cell).is_none() {
            return false;
        }
        self.view.set_typeahead(cell, open);
        true
    }

    pub fn toggle_service_expanded(&mut self, idx: usize) -> bool {
        if idx >= self.categories.len() {
            return false;
        }
        self.view.toggle_service_expanded(idx);
        true
    }

    pub fn toggle_category_expanded(&mut self, idx: usize) -> bool {
        if idx >= self.categories.len() {
            return false;
        }
        self.view.toggle_category_expanded(idx);
        true
    }

    /// Shows a service's full item editor in one step.
    pub fn open_service(&mut self, idx: usize) -> bool {
        if idx >= self.categories.len() {
            return false;
        }
        self.view.set_service_expanded(idx, true);
        self.view.set_category_expanded(idx, true);
        true
    }

    pub fn expire_focus(&mut self, now: Instant) -> bool {
        self.view.expire_focus(now)
    }
}
