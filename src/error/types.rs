use thiserror::Error;

use crate::action::ActionError;
use crate::grid::IterError;

/// Unified result type for the slotgrid crate.
pub type Result<T> = std::result::Result<T, MenuError>;

/// Errors surfaced while building or driving grids, pages and menus.
///
/// Bounds misses on `get`/`set`/`remove` and page moves are not errors; they
/// come back as `None`/`false`.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("row count {0} is outside 1..=6")]
    InvalidRows(u8),
    #[error("page count {0} must be at least 1")]
    InvalidPageCount(usize),
    #[error("iterator start r{row}c{column} is not a valid slot")]
    InvalidStart { row: i32, column: i32 },
    #[error("slot {0} is outside the grid")]
    SlotOutOfRange(i32),
    #[error("slot {0} is pinned to page navigation")]
    SlotPinned(i32),
    #[error("page {index} is out of range (0..{len})")]
    PageOutOfRange { index: usize, len: usize },
    #[error("grid kind `{0}` does not support that shape")]
    FixedKind(String),
    #[error("iteration error: {0}")]
    Iter(#[from] IterError),
    #[error("action failed: {0}")]
    Action(#[from] ActionError),
    #[error("state serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
