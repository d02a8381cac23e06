//! Slot-grid menus: addressable cells, directional traversal, growable
//! grids, paged views with pinned navigation and per-item async actions.
//!
//! Modules follow the orchestrator pattern: a `mod.rs` that re-exports the
//! public surface of a private `core.rs` where the module is large enough to
//! warrant it.

pub mod action;
pub mod direction;
pub mod error;
pub mod grid;
pub mod item;
pub mod logging;
pub mod menu;
pub mod metrics;
pub mod pages;
pub mod permission;
pub mod render;
pub mod slot;
pub mod tags;

pub use action::{
    ActionError, ActionRecord, ActionResponse, ClickEvent, ClickKind, Completion, DispatchOutcome,
    Dispatcher, ExecutionMode, SkipReason,
};
pub use direction::Direction;
pub use error::{MenuError, Result};
pub use grid::{AddReport, GridDimensions, GridIterator, GridKind, ItemGrid, IterError, SlotCursor};
pub use item::{ActorId, Cooldowns, ItemId, ItemPayload, ItemRecord, StateTag};
pub use logging::{FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult, MemorySink};
pub use menu::{ClickOutcome, ItemState, Menu, MenuConfig, MenuContent, MenuState};
pub use metrics::{DispatchMetrics, MetricSnapshot};
pub use pages::{NavRole, PageChange, PageListener, PageMove, PageSet, PageVerdict, PinnedSlot};
pub use permission::{AllowAll, Interaction, InteractionKind, Modifier, ModifierGate, PermissionGate};
pub use render::{GridSnapshot, PageInfo, RecordingSink, RenderSink, SnapshotCell, SnapshotRenderer};
pub use slot::{MAX_CELLS, MAX_ROWS, Slot, WIDTH};
pub use tags::{ITEM_ID_KEY, MetaTagStore, TagStore};
