//! What each service block looks like, derived from the editor on demand.

use super::services::{ServiceCategory, ServiceEditor};
use super::view_state::CellRef;
use crate::data::event::MusicItem;

pub const MUSIC_TYPES: [&str; 5] = ["Responses", "Psalm", "Magnificat", "Nunc Dimittis", "Anthem"];

/// Items listed in a collapsed service's one-line summary.
const SUMMARY_PREVIEW: usize = 3;
/// Items listed when a service is open but its item list is truncated.
const TRUNCATED_PREVIEW: usize = 2;

pub fn music_type_suggestions(query: &str) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    MUSIC_TYPES
        .iter()
        .copied()
        .filter(|t| t.to_lowercase().contains(&needle))
        .collect()
}

pub fn service_label(category: &ServiceCategory) -> &str {
    if category.name.trim().is_empty() {
        "Unnamed Service"
    } else {
        &category.name
    }
}

pub fn item_count_label(count: usize) -> String {
    if count == 1 {
        "1 music item".to_string()
    } else {
        format!("{count} music items")
    }
}

#[derive(Debug, PartialEq)]
pub enum ServiceView<'a> {
    Summary {
        name: &'a str,
        item_count: usize,
        preview: &'a [MusicItem],
        more: usize,
    },
    Truncated {
        name: &'a str,
        preview: &'a [MusicItem],
        more: usize,
    },
    Full {
        name: &'a str,
        rows: Vec<ItemView<'a>>,
    },
}

#[derive(Debug, PartialEq)]
pub enum ItemView<'a> {
    Collapsed(&'a MusicItem),
    Editing {
        item: &'a MusicItem,
        /// Present while the type suggestion list is open.
        suggestions: Option<Vec<&'static str>>,
    },
}

pub fn present_service(editor: &ServiceEditor, idx: usize) -> Option<ServiceView<'_>> {
    let category = editor.get(idx)?;
    let view = editor.view();
    let name = service_label(category);
    let items = &category.items;

    if !view.is_service_expanded(idx) {
        let shown = items.len().min(SUMMARY_PREVIEW);
        return Some(ServiceView::Summary {
            name,
            item_count: items.len(),
            preview: &items[..shown],
            more: items.len() - shown,
        });
    }

    if !view.is_category_expanded(idx) {
        let shown = items.len().min(TRUNCATED_PREVIEW);
        return Some(ServiceView::Truncated {
            name,
            preview: &items[..shown],
            more: items.len() - shown,
        });
    }

    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let cell = CellRef::new(idx, i);
            if view.is_editing(cell) {
                let suggestions = view
                    .is_typeahead_open(cell)
                    .then(|| music_type_suggestions(&item.kind));
                ItemView::Editing { item, suggestions }
            } else {
                ItemView::Collapsed(item)
            }
        })
        .collect();
    Some(ServiceView::Full { name, rows })
}
