use std::fmt;
use std::hash::{Hash, Hasher};

/// Number of columns in every grid row.
pub const WIDTH: u8 = 9;

/// Row ceiling for any grid.
pub const MAX_ROWS: u8 = 6;

/// Absolute number of addressable cells (`MAX_ROWS * WIDTH`).
pub const MAX_CELLS: i32 = MAX_ROWS as i32 * WIDTH as i32;

/// One logical cell address.
///
/// Rows and columns are 1-based, the linear `index` is 0-based. A slot whose
/// coordinate falls outside the grid carries `index == -1` ("Not-A-Slot") and
/// zeroed row/column. Equality and hashing only look at the index, so every
/// invalid slot compares equal to [`Slot::INVALID`].
#[derive(Debug, Clone, Copy, Eq)]
pub struct Slot {
    row: u8,
    column: u8,
    index: i32,
}

impl Slot {
    /// Top-left cell.
    pub const FIRST: Slot = Slot {
        row: 1,
        column: 1,
        index: 0,
    };

    /// The sentinel returned whenever an address leaves the grid.
    pub const INVALID: Slot = Slot {
        row: 0,
        column: 0,
        index: -1,
    };

    /// Address a cell by 1-based row and column against the absolute ceiling.
    pub const fn from_row_col(row: i32, column: i32) -> Self {
        Self::from_row_col_in(row, column, MAX_ROWS)
    }

    /// Address a cell by 1-based row and column inside a grid `rows` tall.
    pub const fn from_row_col_in(row: i32, column: i32, rows: u8) -> Self {
        let rows = if rows > MAX_ROWS { MAX_ROWS } else { rows };
        if row < 1 || column < 1 || column > WIDTH as i32 || row > rows as i32 {
            return Self::INVALID;
        }
        let index = (row - 1) * WIDTH as i32 + (column - 1);
        if index >= MAX_CELLS {
            return Self::INVALID;
        }
        Self {
            row: row as u8,
            column: column as u8,
            index,
        }
    }

    /// Address a cell by its 0-based linear index.
    pub const fn from_index(index: i32) -> Self {
        if index < 0 || index >= MAX_CELLS {
            return Self::INVALID;
        }
        Self {
            row: (index / WIDTH as i32 + 1) as u8,
            column: (index % WIDTH as i32 + 1) as u8,
            index,
        }
    }

    pub const fn row(&self) -> u8 {
        self.row
    }

    pub const fn column(&self) -> u8 {
        self.column
    }

    /// Linear index, `-1` for the sentinel.
    pub const fn index(&self) -> i32 {
        self.index
    }

    pub const fn is_valid(&self) -> bool {
        self.index != -1
    }

    /// Linear index as a `usize`, or `None` for the sentinel.
    pub fn position(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }

    /// The same slot, or the sentinel when it lies below row `rows`.
    pub fn within(self, rows: u8) -> Self {
        if self.is_valid() && self.row <= rows {
            self
        } else {
            Self::INVALID
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::INVALID
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl From<i32> for Slot {
    fn from(index: i32) -> Self {
        Self::from_index(index)
    }
}

impl From<(i32, i32)> for Slot {
    fn from((row, column): (i32, i32)) -> Self {
        Self::from_row_col(row, column)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "r{}c{} (#{})", self.row, self.column, self.index)
        } else {
            f.write_str("invalid slot")
        }
    }
}
