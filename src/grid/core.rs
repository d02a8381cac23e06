use std::collections::HashSet;

use crate::direction::Direction;
use crate::error::Result;
use crate::item::{ItemId, ItemPayload, ItemRecord};
use crate::render::GridSnapshot;
use crate::slot::{Slot, WIDTH};

use super::iter::{GridIterator, SlotCursor};
use super::{GridDimensions, GridKind};

/// Outcome of a batch [`ItemGrid::add_many`].
#[derive(Debug, Default)]
pub struct AddReport {
    pub placed: Vec<Slot>,
    /// Records that found no room, in input order.
    pub overflow: Vec<ItemRecord>,
    pub grew: bool,
}

impl AddReport {
    pub fn changed(&self) -> bool {
        !self.placed.is_empty()
    }
}

/// Dense slot container: one optional record per cell.
///
/// Growth only happens inside `add`/`try_add`/`add_many`, one row at a time,
/// and only for growable chests below the row ceiling.
#[derive(Debug, Clone)]
pub struct ItemGrid {
    dims: GridDimensions,
    cells: Vec<Option<ItemRecord>>,
}

impl ItemGrid {
    pub fn new(dims: GridDimensions) -> Self {
        Self {
            dims,
            cells: vec![None; dims.capacity()],
        }
    }

    pub fn chest(rows: u8) -> Result<Self> {
        Ok(Self::new(GridDimensions::chest(rows)?))
    }

    pub fn growable_chest(rows: u8) -> Result<Self> {
        Ok(Self::new(GridDimensions::chest(rows)?.growable()?))
    }

    pub fn of_kind(kind: GridKind) -> Result<Self> {
        Ok(Self::new(GridDimensions::fixed(kind)?))
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn rows(&self) -> u8 {
        self.dims.rows()
    }

    pub fn kind(&self) -> GridKind {
        self.dims.kind()
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn is_growable(&self) -> bool {
        self.dims.is_growable()
    }

    /// True when `slot` addresses a cell of this grid.
    pub fn contains(&self, slot: Slot) -> bool {
        slot.position().is_some_and(|pos| pos < self.cells.len())
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn first_empty(&self) -> Option<Slot> {
        self.cells
            .iter()
            .position(Option::is_none)
            .map(|pos| Slot::from_index(pos as i32))
    }

    fn cell(&self, slot: Slot) -> Option<usize> {
        slot.position().filter(|pos| *pos < self.cells.len())
    }

    pub fn get(&self, at: impl Into<Slot>) -> Option<&ItemRecord> {
        let pos = self.cell(at.into())?;
        self.cells[pos].as_ref()
    }

    pub fn get_mut(&mut self, at: impl Into<Slot>) -> Option<&mut ItemRecord> {
        let pos = self.cell(at.into())?;
        self.cells[pos].as_mut()
    }

    /// Write `item` into a cell, replacing its previous occupant.
    /// Returns false (and drops nothing) when the slot is outside the grid.
    pub fn set(&mut self, at: impl Into<Slot>, item: ItemRecord) -> bool {
        match self.cell(at.into()) {
            Some(pos) => {
                self.cells[pos] = Some(item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, at: impl Into<Slot>) -> Option<ItemRecord> {
        let pos = self.cell(at.into())?;
        self.cells[pos].take()
    }

    /// Append one empty row. Only growable chests below the ceiling grow.
    pub fn grow(&mut self) -> bool {
        if !self.dims.add_row() {
            return false;
        }
        self.cells.resize(self.dims.capacity(), None);
        true
    }

    /// Place `item` in the first empty cell, growing by at most one row.
    /// Hands the record back when there is no room.
    pub fn try_add(&mut self, item: ItemRecord) -> std::result::Result<Slot, ItemRecord> {
        if let Some(slot) = self.first_empty() {
            self.set(slot, item);
            return Ok(slot);
        }
        if self.grow() {
            if let Some(slot) = self.first_empty() {
                self.set(slot, item);
                return Ok(slot);
            }
        }
        Err(item)
    }

    /// Returns whether the grid changed.
    pub fn add(&mut self, item: ItemRecord) -> bool {
        self.try_add(item).is_ok()
    }

    /// Place records in order, growing at most once for the whole batch.
    pub fn add_many<I>(&mut self, items: I) -> AddReport
    where
        I: IntoIterator<Item = ItemRecord>,
    {
        let mut report = AddReport::default();
        for item in items {
            let slot = match self.first_empty() {
                Some(slot) => Some(slot),
                None if !report.grew && self.grow() => {
                    report.grew = true;
                    self.first_empty()
                }
                None => None,
            };
            match slot {
                Some(slot) => {
                    self.set(slot, item);
                    report.placed.push(slot);
                }
                None => report.overflow.push(item),
            }
        }
        report
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<&ItemRecord>
    where
        P: FnMut(&ItemRecord) -> bool,
    {
        self.cells.iter().flatten().find(|item| predicate(item))
    }

    pub fn find_slot<P>(&self, mut predicate: P) -> Option<Slot>
    where
        P: FnMut(&ItemRecord) -> bool,
    {
        self.iter()
            .find(|(_, item)| predicate(item))
            .map(|(slot, _)| slot)
    }

    /// Visit every occupied cell in index order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&ItemRecord),
    {
        self.cells.iter().flatten().for_each(|item| f(item));
    }

    /// Visit every cell, empty ones included.
    pub fn for_each_indexed<F>(&self, mut f: F)
    where
        F: FnMut(Slot, Option<&ItemRecord>),
    {
        for (pos, cell) in self.cells.iter().enumerate() {
            f(Slot::from_index(pos as i32), cell.as_ref());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &ItemRecord)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(pos, cell)| cell.as_ref().map(|item| (Slot::from_index(pos as i32), item)))
    }

    /// Remove the first record (in index order) matching `predicate`.
    pub fn remove_matching<P>(&mut self, mut predicate: P) -> Option<ItemRecord>
    where
        P: FnMut(&ItemRecord) -> bool,
    {
        let pos = self
            .cells
            .iter()
            .position(|cell| cell.as_ref().is_some_and(|item| predicate(item)))?;
        self.cells[pos].take()
    }

    /// Remove every record whose id is in `ids`. Returns how many went.
    pub fn remove_set(&mut self, ids: &HashSet<ItemId>) -> usize {
        self.remove_where(|item| ids.contains(&item.id()))
    }

    /// Remove every record whose payload equals one of `payloads`.
    pub fn remove_payloads(&mut self, payloads: &[ItemPayload]) -> usize {
        self.remove_where(|item| payloads.contains(item.payload()))
    }

    fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&ItemRecord) -> bool,
    {
        let mut removed = 0;
        for cell in self.cells.iter_mut() {
            if cell.as_ref().is_some_and(|item| predicate(item)) {
                *cell = None;
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    /// Walk `direction` from its origin, filling every empty cell on the way.
    pub fn fill_empty<F>(&mut self, direction: Direction, mut factory: F) -> usize
    where
        F: FnMut(Slot) -> ItemRecord,
    {
        let mut cursor = SlotCursor::new(direction, self);
        let mut filled = 0;
        while let Some(slot) = cursor.next_slot_empty_only(self) {
            self.set(slot, factory(slot));
            filled += 1;
        }
        filled
    }

    /// Fill the empty cells of a 1-based row.
    pub fn fill_row<F>(&mut self, row: i32, factory: F) -> usize
    where
        F: FnMut(Slot) -> ItemRecord,
    {
        let rows = self.rows();
        let slots = (1..=WIDTH as i32).map(|column| Slot::from_row_col_in(row, column, rows));
        self.fill_slots(slots.collect(), factory)
    }

    /// Fill the empty cells of a 1-based column.
    pub fn fill_column<F>(&mut self, column: i32, factory: F) -> usize
    where
        F: FnMut(Slot) -> ItemRecord,
    {
        let rows = self.rows();
        let slots = (1..=rows as i32).map(|row| Slot::from_row_col_in(row, column, rows));
        self.fill_slots(slots.collect(), factory)
    }

    /// Fill the empty cells on the outer edge of the grid.
    pub fn fill_border<F>(&mut self, factory: F) -> usize
    where
        F: FnMut(Slot) -> ItemRecord,
    {
        let rows = self.rows() as i32;
        let last = WIDTH as i32;
        let slots = (0..self.cells.len() as i32)
            .map(Slot::from_index)
            .filter(|slot| {
                let (row, column) = (slot.row() as i32, slot.column() as i32);
                row == 1 || row == rows || column == 1 || column == last
            })
            .collect();
        self.fill_slots(slots, factory)
    }

    /// Fill the empty cells of the rectangle spanned by two corners.
    pub fn fill_between<F>(&mut self, from: Slot, to: Slot, factory: F) -> usize
    where
        F: FnMut(Slot) -> ItemRecord,
    {
        if !self.contains(from) || !self.contains(to) {
            return 0;
        }
        let rows = self.rows();
        let (top, bottom) = (from.row().min(to.row()), from.row().max(to.row()));
        let (left, right) = (from.column().min(to.column()), from.column().max(to.column()));
        let slots = (top..=bottom)
            .flat_map(|row| {
                (left..=right).map(move |column| Slot::from_row_col_in(row as i32, column as i32, rows))
            })
            .collect();
        self.fill_slots(slots, factory)
    }

    fn fill_slots<F>(&mut self, slots: Vec<Slot>, mut factory: F) -> usize
    where
        F: FnMut(Slot) -> ItemRecord,
    {
        let mut filled = 0;
        for slot in slots {
            if self.contains(slot) && self.get(slot).is_none() {
                self.set(slot, factory(slot));
                filled += 1;
            }
        }
        filled
    }

    pub fn iterator(&self, direction: Direction) -> GridIterator<'_> {
        GridIterator::new(self, direction)
    }

    pub fn iterator_from(&self, direction: Direction, row: i32, column: i32) -> Result<GridIterator<'_>> {
        GridIterator::starting_at(self, direction, row, column)
    }

    pub fn snapshot(&self, title: &str) -> GridSnapshot {
        GridSnapshot::capture(title, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemPayload;

    fn item(name: &str) -> ItemRecord {
        ItemRecord::new(ItemPayload::new(name))
    }

    #[test]
    fn invalid_slots_are_no_ops() {
        let mut grid = ItemGrid::chest(1).unwrap();
        assert!(!grid.set(Slot::INVALID, item("a")));
        assert!(!grid.set(9, item("a")));
        assert!(!grid.set(-3, item("a")));
        assert!(grid.get(60).is_none());
        assert!(grid.remove(Slot::INVALID).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn set_replaces_and_remove_takes() {
        let mut grid = ItemGrid::chest(2).unwrap();
        assert!(grid.set((2, 3), item("a")));
        assert!(grid.set(11, item("b")));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.remove(Slot::from_row_col(2, 3)).unwrap().payload().material, "b");
        assert!(grid.get(11).is_none());
    }

    #[test]
    fn fifty_five_items_into_a_growable_single_row() {
        let mut grid = ItemGrid::growable_chest(1).unwrap();
        for n in 0..9 {
            assert!(grid.add(item(&format!("i{n}"))));
            assert_eq!(grid.rows(), 1);
        }

        assert!(grid.add(item("i9")));
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.get(9).unwrap().payload().material, "i9");

        for n in 10..54 {
            assert!(grid.add(item(&format!("i{n}"))));
        }
        assert_eq!(grid.rows(), 6);
        for index in 45..54 {
            let expected = format!("i{index}");
            assert_eq!(grid.get(index).unwrap().payload().material, expected);
        }

        assert!(!grid.add(item("i54")));
        assert_eq!(grid.capacity(), 54);
        assert!(grid.is_full());
    }

    #[test]
    fn non_growable_grids_reject_when_full() {
        let mut grid = ItemGrid::of_kind(GridKind::Brewing).unwrap();
        for n in 0..4 {
            assert!(grid.add(item(&format!("p{n}"))));
        }
        let rejected = grid.try_add(item("extra")).unwrap_err();
        assert_eq!(rejected.payload().material, "extra");
        assert!(!grid.grow());
        assert_eq!(grid.capacity(), 4);
    }

    #[test]
    fn add_many_grows_once_per_batch() {
        let mut grid = ItemGrid::growable_chest(1).unwrap();
        let report = grid.add_many((0..30).map(|n| item(&format!("b{n}"))));
        assert!(report.grew);
        assert!(report.changed());
        assert_eq!(report.placed.len(), 18);
        assert_eq!(report.overflow.len(), 12);
        assert_eq!(report.overflow[0].payload().material, "b18");
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn add_many_on_a_full_fixed_grid_changes_nothing() {
        let mut grid = ItemGrid::of_kind(GridKind::Furnace).unwrap();
        grid.add_many((0..3).map(|n| item(&format!("f{n}"))));
        let report = grid.add_many([item("late")]);
        assert!(!report.changed());
        assert!(!report.grew);
        assert_eq!(report.overflow.len(), 1);
    }

    #[test]
    fn remove_matching_takes_only_the_first_match() {
        let mut grid = ItemGrid::chest(1).unwrap();
        grid.set(2, item("gold"));
        grid.set(5, item("gold"));
        let removed = grid
            .remove_matching(|record| record.payload().material == "gold")
            .unwrap();
        assert_eq!(grid.len(), 1);
        assert!(grid.get(2).is_none());
        assert_eq!(grid.get(5).unwrap().payload().material, "gold");
        assert_ne!(removed.id(), grid.get(5).unwrap().id());
    }

    #[test]
    fn remove_set_removes_every_member() {
        let mut grid = ItemGrid::chest(1).unwrap();
        let keep = item("keep");
        let a = item("a");
        let b = item("b");
        grid.set(0, a.clone());
        grid.set(1, keep.clone());
        grid.set(2, b.clone());
        grid.set(3, a.clone());
        let ids: HashSet<ItemId> = [a.id(), b.id()].into_iter().collect();
        assert_eq!(grid.remove_set(&ids), 3);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.find(|_| true).unwrap().id(), keep.id());

        grid.set(4, item("dirt"));
        assert_eq!(grid.remove_payloads(&[ItemPayload::new("dirt")]), 1);
    }

    #[test]
    fn scans_visit_cells_in_index_order() {
        let mut grid = ItemGrid::chest(1).unwrap();
        grid.set(7, item("late"));
        grid.set(1, item("early"));
        let mut seen = Vec::new();
        grid.for_each(|record| seen.push(record.payload().material.clone()));
        assert_eq!(seen, vec!["early", "late"]);

        let mut empty = 0;
        grid.for_each_indexed(|_, cell| {
            if cell.is_none() {
                empty += 1;
            }
        });
        assert_eq!(empty, 7);
        assert_eq!(grid.find_slot(|r| r.payload().material == "late"), Some(Slot::from_index(7)));
        assert_eq!(grid.first_empty(), Some(Slot::FIRST));
    }

    #[test]
    fn fill_empty_follows_direction_and_skips_occupied() {
        let mut grid = ItemGrid::chest(2).unwrap();
        grid.set(9, item("keep"));
        let mut order = Vec::new();
        let filled = grid.fill_empty(Direction::Vertical, |slot| {
            order.push(slot.index());
            item("glass")
        });
        assert_eq!(filled, 17);
        assert_eq!(&order[..3], &[0, 1, 10]);
        assert_eq!(grid.get(9).unwrap().payload().material, "keep");
        assert!(grid.is_full());
    }

    #[test]
    fn fill_empty_backward_covers_a_fixed_grid() {
        let mut grid = ItemGrid::of_kind(GridKind::Hopper).unwrap();
        let mut order = Vec::new();
        let filled = grid.fill_empty(Direction::BackwardHorizontal, |slot| {
            order.push(slot.index());
            item("pipe")
        });
        assert_eq!(filled, 5);
        assert_eq!(order, vec![4, 3, 2, 1, 0]);
        assert!(grid.is_full());
    }

    #[test]
    fn fill_helpers_respect_shape() {
        let mut grid = ItemGrid::chest(3).unwrap();
        assert_eq!(grid.fill_border(|_| item("frame")), 20);
        assert_eq!(grid.len(), 20);
        assert!(grid.get((2, 5)).is_none());

        grid.clear();
        assert_eq!(grid.fill_row(2, |_| item("row")), 9);
        assert_eq!(grid.fill_column(1, |_| item("col")), 2);
        assert_eq!(grid.fill_row(4, |_| item("none")), 0);

        grid.clear();
        let filled = grid.fill_between(Slot::from_row_col(3, 4), Slot::from_row_col(2, 2), |_| item("box"));
        assert_eq!(filled, 6);
        assert!(grid.get((2, 2)).is_some());
        assert!(grid.get((3, 4)).is_some());
        assert!(grid.get((1, 2)).is_none());
    }

    #[test]
    fn fill_on_fixed_kind_stays_in_capacity() {
        let mut grid = ItemGrid::of_kind(GridKind::Hopper).unwrap();
        assert_eq!(grid.fill_row(1, |_| item("x")), 5);
        assert_eq!(grid.fill_border(|_| item("y")), 0);
    }
}
