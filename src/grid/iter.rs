use thiserror::Error;

use crate::direction::Direction;
use crate::error::{MenuError, Result};
use crate::item::ItemRecord;
use crate::slot::Slot;

use super::ItemGrid;

/// Raised when an iterator call that expects another slot finds none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IterError {
    /// `next_item` ran off the grid.
    #[error("no slot follows {position}")]
    Exhausted { position: Slot },
    /// `next_non_empty_item` scanned to the edge without finding an item.
    #[error("no non-empty slot left; scan ended after {last_scanned}")]
    NoNonEmptyItem { last_scanned: Slot },
}

/// Traversal state without a grid borrow.
///
/// Every step takes the grid explicitly so callers can mutate the grid
/// between steps. The first step yields the start slot itself.
#[derive(Debug, Clone)]
pub struct SlotCursor {
    position: Slot,
    pending_next: Option<Slot>,
    direction: Direction,
}

impl SlotCursor {
    /// Cursor at the direction's natural origin within `grid`.
    pub fn new(direction: Direction, grid: &ItemGrid) -> Self {
        Self {
            position: Slot::INVALID,
            pending_next: Some(direction.origin_in(grid.rows(), grid.capacity())),
            direction,
        }
    }

    /// Cursor whose first step yields `(row, column)`.
    pub fn starting_at(direction: Direction, row: i32, column: i32, grid: &ItemGrid) -> Result<Self> {
        let start = Slot::from_row_col_in(row, column, grid.rows());
        if row < 1 || column < 1 || !grid.contains(start) {
            return Err(MenuError::InvalidStart { row, column });
        }
        Ok(Self {
            position: Slot::INVALID,
            pending_next: Some(start),
            direction,
        })
    }

    pub fn position(&self) -> Slot {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn peek(&mut self, grid: &ItemGrid) -> Slot {
        let direction = self.direction;
        let position = self.position;
        *self
            .pending_next
            .get_or_insert_with(|| direction.shift(position, grid.rows()))
    }

    /// Compute and cache the would-be next slot; true if it is inside `grid`.
    pub fn has_next(&mut self, grid: &ItemGrid) -> bool {
        let next = self.peek(grid);
        grid.contains(next)
    }

    /// Advance one step. `None` once traversal leaves the grid; the position
    /// then stays on the last slot visited.
    pub fn next_slot(&mut self, grid: &ItemGrid) -> Option<Slot> {
        let next = self.peek(grid);
        self.pending_next = None;
        if !grid.contains(next) {
            return None;
        }
        self.position = next;
        Some(next)
    }

    /// Advance past occupied slots to the next empty one.
    pub fn next_slot_empty_only(&mut self, grid: &ItemGrid) -> Option<Slot> {
        loop {
            let slot = self.next_slot(grid)?;
            if grid.get(slot).is_none() {
                return Some(slot);
            }
        }
    }
}

/// Cursor bound to one grid.
#[derive(Debug, Clone)]
pub struct GridIterator<'a> {
    grid: &'a ItemGrid,
    cursor: SlotCursor,
}

impl<'a> GridIterator<'a> {
    pub fn new(grid: &'a ItemGrid, direction: Direction) -> Self {
        Self {
            grid,
            cursor: SlotCursor::new(direction, grid),
        }
    }

    pub fn starting_at(grid: &'a ItemGrid, direction: Direction, row: i32, column: i32) -> Result<Self> {
        Ok(Self {
            grid,
            cursor: SlotCursor::starting_at(direction, row, column, grid)?,
        })
    }

    pub fn position(&self) -> Slot {
        self.cursor.position()
    }

    pub fn has_next(&mut self) -> bool {
        self.cursor.has_next(self.grid)
    }

    pub fn next_slot(&mut self) -> Option<Slot> {
        self.cursor.next_slot(self.grid)
    }

    pub fn next_slot_empty_only(&mut self) -> Option<Slot> {
        self.cursor.next_slot_empty_only(self.grid)
    }

    /// Advance and return whatever sits in the next slot; `Ok(None)` means
    /// the slot exists but is empty.
    pub fn next_item(&mut self) -> std::result::Result<Option<&'a ItemRecord>, IterError> {
        match self.next_slot() {
            Some(slot) => Ok(self.grid.get(slot)),
            None => Err(IterError::Exhausted {
                position: self.cursor.position(),
            }),
        }
    }

    /// Advance past empty slots and return the next item.
    pub fn next_non_empty_item(&mut self) -> std::result::Result<&'a ItemRecord, IterError> {
        while let Some(slot) = self.next_slot() {
            if let Some(item) = self.grid.get(slot) {
                return Ok(item);
            }
        }
        Err(IterError::NoNonEmptyItem {
            last_scanned: self.cursor.position(),
        })
    }
}

impl Iterator for GridIterator<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        self.next_slot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ItemGrid;
    use crate::item::ItemPayload;

    fn item(name: &str) -> ItemRecord {
        ItemRecord::new(ItemPayload::new(name))
    }

    #[test]
    fn first_step_yields_the_origin() {
        let grid = ItemGrid::chest(2).unwrap();
        let slots: Vec<i32> = GridIterator::new(&grid, Direction::Horizontal)
            .map(|slot| slot.index())
            .collect();
        assert_eq!(slots, (0..18).collect::<Vec<_>>());
    }

    #[test]
    fn has_next_caches_without_advancing() {
        let grid = ItemGrid::chest(1).unwrap();
        let mut iter = GridIterator::starting_at(&grid, Direction::RightOnly, 1, 8).unwrap();
        assert!(iter.has_next());
        assert!(iter.has_next());
        assert_eq!(iter.position(), Slot::INVALID);
        assert_eq!(iter.next_slot().map(|s| s.index()), Some(7));
        assert_eq!(iter.next_slot().map(|s| s.index()), Some(8));
        assert!(!iter.has_next());
        assert_eq!(iter.next_slot(), None);
        assert_eq!(iter.position().index(), 8);
    }

    #[test]
    fn explicit_start_must_be_valid() {
        let grid = ItemGrid::chest(2).unwrap();
        assert!(matches!(
            GridIterator::starting_at(&grid, Direction::Horizontal, 0, 1),
            Err(MenuError::InvalidStart { row: 0, column: 1 })
        ));
        assert!(GridIterator::starting_at(&grid, Direction::Horizontal, 1, -2).is_err());
        assert!(GridIterator::starting_at(&grid, Direction::Horizontal, 3, 1).is_err());
        assert!(GridIterator::starting_at(&grid, Direction::Horizontal, 2, 9).is_ok());
    }

    #[test]
    fn empty_only_skips_occupied_slots() {
        let mut grid = ItemGrid::chest(1).unwrap();
        grid.set(0, item("a"));
        grid.set(1, item("b"));
        grid.set(3, item("c"));
        let mut iter = GridIterator::new(&grid, Direction::Horizontal);
        assert_eq!(iter.next_slot_empty_only().map(|s| s.index()), Some(2));
        assert_eq!(iter.next_slot_empty_only().map(|s| s.index()), Some(4));
    }

    #[test]
    fn empty_only_returns_none_when_grid_is_full() {
        let mut grid = ItemGrid::of_kind(crate::grid::GridKind::Furnace).unwrap();
        for index in 0..3 {
            grid.set(index, item("coal"));
        }
        let mut iter = GridIterator::new(&grid, Direction::Horizontal);
        assert_eq!(iter.next_slot_empty_only(), None);
    }

    #[test]
    fn next_item_distinguishes_empty_from_exhausted() {
        let mut grid = ItemGrid::of_kind(crate::grid::GridKind::Furnace).unwrap();
        grid.set(1, item("ore"));
        let mut iter = GridIterator::new(&grid, Direction::Horizontal);
        assert_eq!(iter.next_item().unwrap(), None);
        assert_eq!(iter.next_item().unwrap().map(|i| i.payload().material.as_str()), Some("ore"));
        assert_eq!(iter.next_item().unwrap(), None);
        assert_eq!(
            iter.next_item().unwrap_err(),
            IterError::Exhausted {
                position: Slot::from_index(2)
            }
        );
    }

    #[test]
    fn next_non_empty_item_reports_last_scanned_slot() {
        let mut grid = ItemGrid::chest(1).unwrap();
        grid.set(4, item("gem"));
        let mut iter = GridIterator::new(&grid, Direction::Horizontal);
        assert_eq!(iter.next_non_empty_item().unwrap().payload().material, "gem");
        let err = iter.next_non_empty_item().unwrap_err();
        assert_eq!(
            err,
            IterError::NoNonEmptyItem {
                last_scanned: Slot::from_index(8)
            }
        );
        assert!(err.to_string().contains("r1c9"));
    }

    #[test]
    fn traversal_stops_at_fixed_capacity() {
        use crate::grid::GridKind;

        for kind in [GridKind::Furnace, GridKind::Brewing, GridKind::Hopper, GridKind::Dispenser] {
            let grid = ItemGrid::of_kind(kind).unwrap();
            let capacity = grid.capacity();
            for direction in Direction::ALL {
                let slots: Vec<Slot> = GridIterator::new(&grid, direction).collect();
                assert!(slots.iter().all(|slot| grid.contains(*slot)), "{kind:?} {direction:?}");
                let expected = match direction {
                    Direction::Horizontal
                    | Direction::Vertical
                    | Direction::BackwardHorizontal
                    | Direction::BackwardVertical
                    | Direction::LeftOnly
                    | Direction::RightOnly => capacity,
                    _ => 1,
                };
                assert_eq!(slots.len(), expected, "{kind:?} {direction:?}");
            }
        }
    }

    #[test]
    fn backward_traversal_starts_at_last_real_cell() {
        let grid = ItemGrid::of_kind(crate::grid::GridKind::Hopper).unwrap();
        let slots: Vec<i32> = GridIterator::new(&grid, Direction::BackwardHorizontal)
            .map(|slot| slot.index())
            .collect();
        assert_eq!(slots, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn detached_cursor_allows_mutation_between_steps() {
        let mut grid = ItemGrid::chest(1).unwrap();
        let mut cursor = SlotCursor::new(Direction::BackwardHorizontal, &grid);
        while let Some(slot) = cursor.next_slot_empty_only(&grid) {
            grid.set(slot, item("fill"));
            if grid.len() == 3 {
                break;
            }
        }
        assert!(grid.get(8).is_some());
        assert!(grid.get(6).is_some());
        assert!(grid.get(5).is_none());
    }
}
