//! Render boundary: snapshots and the sink they are pushed to.

mod core;

pub use self::core::{GridSnapshot, PageInfo, RecordingSink, RenderSink, SnapshotCell, SnapshotRenderer};
