//! Item grids: shape, storage and traversal.

mod core;
mod dimensions;
pub mod iter;

pub use self::core::{AddReport, ItemGrid};
pub use dimensions::{GridDimensions, GridKind};
pub use iter::{GridIterator, IterError, SlotCursor};
