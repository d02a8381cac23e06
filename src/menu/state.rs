use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{MenuError, Result};
use crate::grid::{GridKind, ItemGrid};
use crate::item::{ItemId, ItemPayload, ItemRecord, StateTag};
use crate::pages::NavRole;
use crate::permission::Modifier;
use crate::slot::Slot;

use super::{Menu, MenuConfig, MenuContent};

/// Persisted layout of a menu. Handlers are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuState {
    pub title: String,
    pub rows: u8,
    pub pages: usize,
    pub kind: GridKind,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub items: Vec<ItemState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    pub page: usize,
    pub slot: i32,
    pub id: ItemId,
    pub payload: ItemPayload,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<StateTag>,
}

impl ItemState {
    fn capture(page: usize, slot: Slot, record: &ItemRecord) -> Self {
        Self {
            page,
            slot: slot.index(),
            id: record.id(),
            payload: record.payload().clone(),
            tags: record.tags().to_vec(),
        }
    }

    fn nav_role(&self) -> Option<NavRole> {
        self.tags.iter().find_map(|tag| NavRole::from_tag(tag.as_str()))
    }
}

impl MenuState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Find the persisted entry for a record id.
    pub fn item(&self, id: ItemId) -> Option<&ItemState> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Menu config for this layout on top of `base` (logger, metrics).
    pub fn config(&self, base: MenuConfig) -> MenuConfig {
        let has_nav = self.items.iter().any(|item| item.nav_role().is_some());
        MenuConfig {
            title: self.title.clone(),
            kind: self.kind,
            rows: self.rows,
            growable: false,
            pages: self.pages,
            paginated: self.pages > 1 || has_nav,
            modifiers: self.modifiers.clone(),
            ..base
        }
    }
}

impl Menu {
    /// Reduce the menu to its persisted shape. Pinned navigation records are
    /// stored once, tagged with their role.
    pub fn to_state(&self) -> MenuState {
        let dims = self.active_grid().dimensions();
        let mut items = Vec::new();
        let page_count = match &self.content {
            MenuContent::Single(grid) => {
                collect(&mut items, 0, grid, &[]);
                1
            }
            MenuContent::Paged(pages) => {
                let mut pinned = Vec::new();
                for role in [NavRole::Next, NavRole::Previous] {
                    if let Some(nav) = pages.nav(role) {
                        let record = nav.item.clone().with_tag(StateTag::new(role.tag()));
                        items.push(ItemState::capture(0, nav.slot, &record));
                        pinned.push((nav.slot, nav.item.id()));
                    }
                }
                for (index, grid) in pages.pages().enumerate() {
                    collect(&mut items, index, grid, &pinned);
                }
                pages.page_count()
            }
        };
        MenuState {
            title: self.config.title.clone(),
            rows: dims.rows(),
            pages: page_count,
            kind: dims.kind(),
            modifiers: self.config.modifiers.clone(),
            items,
        }
    }

    pub fn from_state(state: &MenuState) -> Result<Self> {
        Self::restore(state, MenuConfig::default())
    }

    /// Rebuild a menu from persisted state. Every record comes back with the
    /// empty action; callers re-bind handlers by id.
    pub fn restore(state: &MenuState, base: MenuConfig) -> Result<Self> {
        if state.pages == 0 {
            return Err(MenuError::InvalidPageCount(0));
        }
        let mut menu = Menu::new(state.config(base))?;
        let page_count = menu.pages().map_or(1, |pages| pages.page_count());
        let capacity = menu.active_grid().capacity();

        for item in &state.items {
            if item.page >= page_count {
                return Err(MenuError::PageOutOfRange {
                    index: item.page,
                    len: page_count,
                });
            }
            let slot = Slot::from_index(item.slot);
            if slot.position().is_none_or(|pos| pos >= capacity) {
                return Err(MenuError::SlotOutOfRange(item.slot));
            }

            let record = ItemRecord::restore(item.id, item.payload.clone(), item.tags.clone());
            let record = menu.dispatcher.stamp(record);
            match (&mut menu.content, item.nav_role()) {
                (MenuContent::Paged(pages), Some(role)) => {
                    pages.set_nav(role, slot, record);
                }
                (MenuContent::Paged(pages), None) => {
                    if !pages.set_item(item.page, slot, record) && pages.is_pinned(slot) {
                        return Err(MenuError::SlotPinned(item.slot));
                    }
                }
                (MenuContent::Single(grid), _) => {
                    grid.set(slot, record);
                }
            }
        }
        Ok(menu)
    }
}

fn collect(out: &mut Vec<ItemState>, page: usize, grid: &ItemGrid, pinned: &[(Slot, ItemId)]) {
    for (slot, record) in grid.iter() {
        if pinned.contains(&(slot, record.id())) {
            continue;
        }
        out.push(ItemState::capture(page, slot, record));
    }
}
