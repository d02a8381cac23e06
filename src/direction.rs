//! Traversal rules over a slot grid.
//!
//! Each [`Direction`] is a pure step function: given the current slot and the
//! grid height it produces the following slot, or [`Slot::INVALID`] once the
//! step would leave the grid. An invalid input always stays invalid, so
//! repeatedly shifting eventually settles on the sentinel.

use serde::{Deserialize, Serialize};

use crate::slot::{Slot, WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Row-major forward; wraps the last column onto the next row.
    Horizontal,
    /// Column-major forward; wraps the last row onto the next column.
    Vertical,
    BackwardHorizontal,
    BackwardVertical,
    UpOnly,
    DownOnly,
    LeftOnly,
    RightOnly,
    RightUp,
    RightDown,
    LeftUp,
    LeftDown,
}

impl Direction {
    pub const ALL: [Direction; 12] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::BackwardHorizontal,
        Direction::BackwardVertical,
        Direction::UpOnly,
        Direction::DownOnly,
        Direction::LeftOnly,
        Direction::RightOnly,
        Direction::RightUp,
        Direction::RightDown,
        Direction::LeftUp,
        Direction::LeftDown,
    ];

    /// Compute the slot after `current` in a grid `rows` tall.
    pub fn shift(self, current: Slot, rows: u8) -> Slot {
        if !current.is_valid() || current.row() > rows {
            return Slot::INVALID;
        }

        let row = current.row() as i32;
        let column = current.column() as i32;
        let height = rows as i32;
        let width = WIDTH as i32;

        match self {
            Direction::Horizontal => Slot::from_index(current.index() + 1).within(rows),
            Direction::BackwardHorizontal => Slot::from_index(current.index() - 1),
            Direction::Vertical => {
                if row < height {
                    Slot::from_row_col_in(row + 1, column, rows)
                } else if column < width {
                    Slot::from_row_col_in(1, column + 1, rows)
                } else {
                    Slot::INVALID
                }
            }
            Direction::BackwardVertical => {
                if row > 1 {
                    Slot::from_row_col_in(row - 1, column, rows)
                } else if column > 1 {
                    Slot::from_row_col_in(height, column - 1, rows)
                } else {
                    Slot::INVALID
                }
            }
            Direction::UpOnly => Slot::from_row_col_in(row - 1, column, rows),
            Direction::DownOnly => Slot::from_row_col_in(row + 1, column, rows),
            Direction::LeftOnly => Slot::from_row_col_in(row, column - 1, rows),
            Direction::RightOnly => Slot::from_row_col_in(row, column + 1, rows),
            Direction::RightUp => {
                combine(Direction::UpOnly, Direction::RightOnly, current, rows)
            }
            Direction::RightDown => {
                combine(Direction::DownOnly, Direction::RightOnly, current, rows)
            }
            Direction::LeftUp => combine(Direction::UpOnly, Direction::LeftOnly, current, rows),
            Direction::LeftDown => {
                combine(Direction::DownOnly, Direction::LeftOnly, current, rows)
            }
        }
    }

    /// Natural starting cell for a traversal in this direction.
    pub fn origin(self, rows: u8) -> Slot {
        self.origin_in(rows, rows as usize * WIDTH as usize)
    }

    /// Like [`Direction::origin`], for a grid holding only `capacity` cells.
    /// Fixed kinds narrower than a full row start from their last real column.
    pub fn origin_in(self, rows: u8, capacity: usize) -> Slot {
        let rows = rows as i32;
        let last_column = capacity.clamp(1, WIDTH as usize) as i32;
        match self {
            Direction::Horizontal
            | Direction::Vertical
            | Direction::DownOnly
            | Direction::RightOnly
            | Direction::RightDown => Slot::FIRST,
            Direction::BackwardHorizontal | Direction::BackwardVertical | Direction::LeftUp => {
                Slot::from_row_col(rows, last_column)
            }
            Direction::UpOnly | Direction::RightUp => Slot::from_row_col(rows, 1),
            Direction::LeftOnly | Direction::LeftDown => Slot::from_row_col(1, last_column),
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::RightUp | Direction::RightDown | Direction::LeftUp | Direction::LeftDown
        )
    }
}

/// Diagonal step: the row comes from the vertical primitive, the column from
/// the horizontal one. Both must stay inside the grid.
fn combine(vertical: Direction, horizontal: Direction, current: Slot, rows: u8) -> Slot {
    let v = vertical.shift(current, rows);
    let h = horizontal.shift(current, rows);
    if !v.is_valid() || !h.is_valid() {
        return Slot::INVALID;
    }
    Slot::from_row_col_in(v.row() as i32, h.column() as i32, rows)
}
