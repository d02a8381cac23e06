use std::collections::BTreeSet;

use crate::error::{MenuError, Result};
use crate::grid::{GridDimensions, ItemGrid};
use crate::item::{ActorId, ItemRecord};
use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::render::GridSnapshot;
use crate::slot::Slot;

use super::{NavRole, PageChange, PageListener, PageMove, PageVerdict};

const TARGET: &str = "slotgrid::pages";

/// A record mirrored into the same slot of every page.
#[derive(Debug, Clone)]
pub struct PinnedSlot {
    pub slot: Slot,
    pub item: ItemRecord,
}

/// Ordered pages sharing one shape, shown one at a time.
///
/// `current` always indexes an existing page. Pinned navigation records are
/// written to every page whenever they are set and whenever a page is added.
pub struct PageSet {
    pages: Vec<ItemGrid>,
    dims: GridDimensions,
    current: usize,
    next_nav: Option<PinnedSlot>,
    previous_nav: Option<PinnedSlot>,
    viewers: BTreeSet<ActorId>,
    listener: Option<Box<dyn PageListener>>,
    render_requested: bool,
    logger: Option<Logger>,
}

impl PageSet {
    /// `count` empty pages shaped like `dims`. Pages never grow.
    pub fn new(dims: GridDimensions, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(MenuError::InvalidPageCount(count));
        }
        let dims = dims.without_growth();
        Ok(Self {
            pages: (0..count).map(|_| ItemGrid::new(dims)).collect(),
            dims,
            current: 0,
            next_nav: None,
            previous_nav: None,
            viewers: BTreeSet::new(),
            listener: None,
            render_requested: false,
            logger: None,
        })
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: PageListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &ItemGrid {
        &self.pages[self.current]
    }

    /// Raw access to the shown page. Writes here bypass the pinned-slot
    /// guard; prefer [`PageSet::set_item`] and [`PageSet::remove_item`].
    pub fn current_mut(&mut self) -> &mut ItemGrid {
        &mut self.pages[self.current]
    }

    pub fn page_at(&self, index: usize) -> Option<&ItemGrid> {
        self.pages.get(index)
    }

    /// Raw access to page `index`; bypasses the pinned-slot guard.
    pub fn page_at_mut(&mut self, index: usize) -> Option<&mut ItemGrid> {
        self.pages.get_mut(index)
    }

    /// Write into page `index`. Pinned slots are refused, so a navigation
    /// record stays identical on every page.
    pub fn set_item(&mut self, index: usize, slot: Slot, item: ItemRecord) -> bool {
        if self.is_pinned(slot) {
            return false;
        }
        self.pages
            .get_mut(index)
            .is_some_and(|page| page.set(slot, item))
    }

    /// Clear a cell of page `index`. Pinned slots are left alone.
    pub fn remove_item(&mut self, index: usize, slot: Slot) -> Option<ItemRecord> {
        if self.is_pinned(slot) {
            return None;
        }
        self.pages.get_mut(index)?.remove(slot)
    }

    pub fn pages(&self) -> impl Iterator<Item = &ItemGrid> + '_ {
        self.pages.iter()
    }

    /// Show page `index` to `actor`.
    pub fn open(&mut self, actor: ActorId, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.current = index;
        self.viewers.insert(actor);
        self.render_requested = true;
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "open",
            [json_kv("actor", actor.to_string()), json_kv("page", index)],
        );
        Ok(())
    }

    pub fn close(&mut self, actor: ActorId) -> bool {
        self.viewers.remove(&actor)
    }

    pub fn viewers(&self) -> &BTreeSet<ActorId> {
        &self.viewers
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.pages.len() {
            return Err(MenuError::PageOutOfRange {
                index,
                len: self.pages.len(),
            });
        }
        Ok(())
    }

    pub fn next(&mut self) -> bool {
        let target = self.current + 1;
        self.move_to(target, PageMove::Next)
    }

    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(target) => self.move_to(target, PageMove::Previous),
            None => false,
        }
    }

    /// Jump to `index`. Jumping to the current page is a successful no-op.
    pub fn page(&mut self, index: usize) -> bool {
        if index == self.current {
            return true;
        }
        self.move_to(index, PageMove::Jump)
    }

    fn move_to(&mut self, to: usize, cause: PageMove) -> bool {
        if to >= self.pages.len() {
            return false;
        }
        let from = self.current;
        self.current = to;

        let change = PageChange { from, to, cause };
        let verdict = match self.listener.as_mut() {
            Some(listener) => listener.on_page_change(&change),
            None => PageVerdict::Allow,
        };
        if verdict == PageVerdict::Veto {
            self.current = from;
            emit(
                self.logger.as_ref(),
                LogLevel::Debug,
                TARGET,
                "page_vetoed",
                [json_kv("from", from), json_kv("to", to), json_kv("cause", cause.as_str())],
            );
            return false;
        }

        self.render_requested = true;
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "page_changed",
            [json_kv("from", from), json_kv("to", to), json_kv("cause", cause.as_str())],
        );
        true
    }

    /// Append an empty page carrying the pinned records. Returns its index.
    pub fn add_page(&mut self) -> usize {
        let mut page = ItemGrid::new(self.dims);
        for pinned in [&self.next_nav, &self.previous_nav].into_iter().flatten() {
            page.set(pinned.slot, pinned.item.clone());
        }
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub fn set_next_nav(&mut self, slot: Slot, item: ItemRecord) -> bool {
        self.set_nav(NavRole::Next, slot, item)
    }

    pub fn set_previous_nav(&mut self, slot: Slot, item: ItemRecord) -> bool {
        self.set_nav(NavRole::Previous, slot, item)
    }

    /// Install a navigation record on every page. A slot outside the page
    /// shape leaves everything untouched.
    pub fn set_nav(&mut self, role: NavRole, slot: Slot, item: ItemRecord) -> bool {
        if !self.pages[0].contains(slot) {
            return false;
        }
        self.clear_nav(role);
        let other = match role {
            NavRole::Next => NavRole::Previous,
            NavRole::Previous => NavRole::Next,
        };
        if self.nav(other).is_some_and(|pinned| pinned.slot == slot) {
            *self.nav_mut(other) = None;
        }
        for page in &mut self.pages {
            page.set(slot, item.clone());
        }
        *self.nav_mut(role) = Some(PinnedSlot { slot, item });
        self.render_requested = true;
        true
    }

    /// Remove a navigation record from every page.
    pub fn clear_nav(&mut self, role: NavRole) -> Option<PinnedSlot> {
        let pinned = self.nav_mut(role).take()?;
        for page in &mut self.pages {
            if page.get(pinned.slot).is_some_and(|item| item.id() == pinned.item.id()) {
                page.remove(pinned.slot);
            }
        }
        self.render_requested = true;
        Some(pinned)
    }

    pub fn nav(&self, role: NavRole) -> Option<&PinnedSlot> {
        match role {
            NavRole::Next => self.next_nav.as_ref(),
            NavRole::Previous => self.previous_nav.as_ref(),
        }
    }

    fn nav_mut(&mut self, role: NavRole) -> &mut Option<PinnedSlot> {
        match role {
            NavRole::Next => &mut self.next_nav,
            NavRole::Previous => &mut self.previous_nav,
        }
    }

    /// Navigation role pinned at `slot`, if any.
    pub fn nav_role(&self, slot: Slot) -> Option<NavRole> {
        [NavRole::Next, NavRole::Previous]
            .into_iter()
            .find(|role| self.nav(*role).is_some_and(|pinned| pinned.slot == slot))
    }

    pub fn is_pinned(&self, slot: Slot) -> bool {
        self.nav_role(slot).is_some()
    }

    /// Role of the navigation control shown at `slot` on the current page.
    /// The record there must be the pinned one, not just share its slot.
    pub fn nav_control(&self, slot: Slot) -> Option<NavRole> {
        let role = self.nav_role(slot)?;
        let pinned = self.nav(role)?;
        let shown = self.current().get(slot)?;
        (shown.id() == pinned.item.id()).then_some(role)
    }

    pub fn pinned_slots(&self) -> Vec<Slot> {
        [&self.next_nav, &self.previous_nav]
            .into_iter()
            .flatten()
            .map(|pinned| pinned.slot)
            .collect()
    }

    /// Spread records over the free, unpinned cells of each page in order,
    /// appending pages once the last one is full. Returns what did not fit.
    pub fn add_content<I>(&mut self, items: I) -> Vec<ItemRecord>
    where
        I: IntoIterator<Item = ItemRecord>,
    {
        let pinned = self.pinned_slots();
        let mut page = 0;
        let mut added = 0;
        let mut overflow = Vec::new();
        for item in items {
            loop {
                let free = free_slots(&self.pages[page]).find(|slot| !pinned.contains(slot));
                if let Some(slot) = free {
                    self.pages[page].set(slot, item);
                    added += 1;
                    break;
                }
                if page + 1 < self.pages.len() {
                    page += 1;
                    continue;
                }
                if only_pinned(&self.pages[page], &pinned) {
                    overflow.push(item);
                    break;
                }
                page = self.add_page();
            }
        }
        if added > 0 {
            self.render_requested = true;
        }
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "content_added",
            [
                json_kv("added", added),
                json_kv("overflow", overflow.len()),
                json_kv("pages", self.pages.len()),
            ],
        );
        overflow
    }

    /// Snapshot of the current page, annotated with its position.
    pub fn snapshot(&self, title: &str) -> GridSnapshot {
        self.current()
            .snapshot(title)
            .with_page(self.current, self.pages.len())
    }

    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Return and clear the pending render flag.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }
}

fn free_slots(grid: &ItemGrid) -> impl Iterator<Item = Slot> + '_ {
    (0..grid.capacity() as i32)
        .map(Slot::from_index)
        .filter(move |slot| grid.get(*slot).is_none())
}

fn only_pinned(grid: &ItemGrid, pinned: &[Slot]) -> bool {
    grid.iter().all(|(slot, _)| pinned.contains(&slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemPayload;
    use crate::logging::MemorySink;
    use std::sync::{Arc, Mutex};

    fn pages(count: usize) -> PageSet {
        PageSet::new(GridDimensions::chest(1).unwrap(), count).unwrap()
    }

    fn item(name: &str) -> ItemRecord {
        ItemRecord::new(ItemPayload::new(name))
    }

    #[test]
    fn zero_pages_is_a_construction_error() {
        let err = PageSet::new(GridDimensions::chest(1).unwrap(), 0).err();
        assert!(matches!(err, Some(MenuError::InvalidPageCount(0))));
    }

    #[test]
    fn three_page_navigation() {
        let mut set = pages(3);
        assert!(!set.previous());
        assert_eq!(set.current_page_index(), 0);

        assert!(set.next());
        assert!(set.next());
        assert!(!set.next());
        assert_eq!(set.current_page_index(), 2);

        assert!(set.previous());
        assert_eq!(set.current_page_index(), 1);
    }

    #[test]
    fn jumps_use_half_open_bounds() {
        let mut set = pages(3);
        assert!(set.page(2));
        assert!(!set.page(3));
        assert_eq!(set.current_page_index(), 2);
        assert!(set.page(2));
        assert!(set.page(0));
    }

    #[test]
    fn veto_rolls_the_move_back() {
        let mut set = pages(3);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        set.set_listener(move |change: &PageChange| {
            log.lock().unwrap().push(*change);
            if change.to == 2 {
                PageVerdict::Veto
            } else {
                PageVerdict::Allow
            }
        });

        assert!(set.next());
        set.take_render_request();
        assert!(!set.next());
        assert_eq!(set.current_page_index(), 1);
        assert!(!set.take_render_request());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[1],
            PageChange {
                from: 1,
                to: 2,
                cause: PageMove::Next
            }
        );
    }

    #[test]
    fn open_validates_and_tracks_viewers() {
        let mut set = pages(2);
        let actor = ActorId::new();
        assert!(matches!(
            set.open(actor, 2),
            Err(MenuError::PageOutOfRange { index: 2, len: 2 })
        ));
        assert!(set.viewers().is_empty());

        set.open(actor, 1).unwrap();
        assert_eq!(set.current_page_index(), 1);
        assert!(set.take_render_request());
        assert!(set.viewers().contains(&actor));
        assert!(set.close(actor));
        assert!(!set.close(actor));
    }

    #[test]
    fn pinned_nav_is_written_to_every_page_and_inherited() {
        let mut set = pages(2);
        let arrow = item("arrow");
        let slot = Slot::from_index(8);
        assert!(set.set_next_nav(slot, arrow.clone()));
        for index in 0..2 {
            assert_eq!(set.page_at(index).unwrap().get(slot).unwrap().id(), arrow.id());
        }

        let added = set.add_page();
        assert_eq!(added, 2);
        assert_eq!(set.page_at(added).unwrap().get(slot).unwrap().id(), arrow.id());
        assert_eq!(set.nav_role(slot), Some(NavRole::Next));
    }

    #[test]
    fn moving_a_nav_clears_its_old_slot() {
        let mut set = pages(2);
        let back = item("back");
        assert!(set.set_previous_nav(Slot::from_index(0), back.clone()));
        assert!(set.set_previous_nav(Slot::from_index(1), back));
        for page in set.pages() {
            assert!(page.get(0).is_none());
            assert!(page.get(1).is_some());
        }
        assert!(!set.set_next_nav(Slot::from_index(9), item("oob")));
        assert_eq!(set.pinned_slots(), vec![Slot::from_index(1)]);

        set.clear_nav(NavRole::Previous);
        assert!(set.pages().all(|page| page.is_empty()));
    }

    #[test]
    fn pinned_slots_refuse_page_local_writes() {
        let mut set = pages(2);
        let next = item("next");
        let next_id = next.id();
        assert!(set.set_next_nav(Slot::from_index(8), next));

        assert!(!set.set_item(0, Slot::from_index(8), item("sword")));
        assert!(set.remove_item(1, Slot::from_index(8)).is_none());
        for page in set.pages() {
            assert_eq!(page.get(8).unwrap().id(), next_id);
        }
        assert!(set.set_item(1, Slot::from_index(2), item("shield")));
        assert!(set.remove_item(1, Slot::from_index(2)).is_some());
        assert!(!set.set_item(5, Slot::from_index(2), item("lost")));
    }

    #[test]
    fn nav_control_requires_the_pinned_record() {
        let mut set = pages(2);
        assert!(set.set_next_nav(Slot::from_index(8), item("next")));
        assert_eq!(set.nav_control(Slot::from_index(8)), Some(NavRole::Next));

        set.current_mut().set(8, item("impostor"));
        assert_eq!(set.nav_role(Slot::from_index(8)), Some(NavRole::Next));
        assert_eq!(set.nav_control(Slot::from_index(8)), None);
        assert_eq!(set.nav_control(Slot::from_index(3)), None);
    }

    #[test]
    fn content_skips_pinned_slots_and_appends_pages() {
        let mut set = pages(1);
        set.set_previous_nav(Slot::from_index(0), item("prev"));
        set.set_next_nav(Slot::from_index(8), item("next"));

        let overflow = set.add_content((0..10).map(|n| item(&format!("c{n}"))));
        assert!(overflow.is_empty());
        assert_eq!(set.page_count(), 2);
        assert_eq!(set.page_at(0).unwrap().len(), 9);
        assert_eq!(set.page_at(1).unwrap().get(1).unwrap().payload().material, "c7");
        assert_eq!(set.page_at(1).unwrap().get(8).unwrap().payload().material, "next");
    }

    #[test]
    fn snapshot_reports_page_position() {
        let sink = MemorySink::new();
        let mut set = pages(2).with_logger(Some(Logger::new(sink.clone())));
        set.next();
        let snapshot = set.snapshot("Shop");
        let page = snapshot.page.unwrap();
        assert_eq!((page.current, page.count), (1, 2));
        assert!(sink.messages().contains(&"page_changed".to_string()));
    }
}
