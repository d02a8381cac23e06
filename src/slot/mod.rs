//! Slot addressing: linear index to (row, column) and back.

mod core;

pub use self::core::{MAX_CELLS, MAX_ROWS, Slot, WIDTH};
