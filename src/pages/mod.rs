//! Multi-page views with pinned navigation slots.

mod core;
mod events;

pub use self::core::{PageSet, PinnedSlot};
pub use events::{NavRole, PageChange, PageListener, PageMove, PageVerdict};
