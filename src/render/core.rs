use std::sync::{Arc, Mutex};

use blake3::Hash;
use serde::Serialize;

use crate::grid::{GridKind, ItemGrid};
use crate::item::{ItemId, ItemPayload};

/// Position of a snapshot within a page set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotCell {
    pub id: ItemId,
    pub payload: ItemPayload,
}

/// Render-ready copy of one grid: no handlers, no shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSnapshot {
    pub title: String,
    pub kind: GridKind,
    pub rows: u8,
    pub page: Option<PageInfo>,
    pub cells: Vec<Option<SnapshotCell>>,
}

impl GridSnapshot {
    pub fn capture(title: &str, grid: &ItemGrid) -> Self {
        let mut cells = Vec::with_capacity(grid.capacity());
        grid.for_each_indexed(|_, cell| {
            cells.push(cell.map(|item| SnapshotCell {
                id: item.id(),
                payload: item.payload().clone(),
            }));
        });
        Self {
            title: title.to_string(),
            kind: grid.kind(),
            rows: grid.rows(),
            page: None,
            cells,
        }
    }

    pub fn with_page(mut self, current: usize, count: usize) -> Self {
        self.page = Some(PageInfo { current, count });
        self
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Content hash used to skip redundant renders.
    pub fn fingerprint(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.title.as_bytes());
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update(&[self.rows]);
        if let Some(page) = self.page {
            hasher.update(&(page.current as u64).to_le_bytes());
            hasher.update(&(page.count as u64).to_le_bytes());
        }
        for cell in &self.cells {
            match cell {
                Some(cell) => {
                    hasher.update(&[1u8]);
                    hasher.update(cell.id.as_uuid().as_bytes());
                    hasher.update(cell.payload.material.as_bytes());
                    hasher.update(&cell.payload.amount.to_le_bytes());
                    for (key, value) in &cell.payload.meta {
                        hasher.update(key.as_bytes());
                        hasher.update(value.as_bytes());
                    }
                }
                None => {
                    hasher.update(&[0u8]);
                }
            }
        }
        hasher.finalize()
    }
}

/// Host-side drawing surface.
pub trait RenderSink: Send {
    fn render(&mut self, snapshot: &GridSnapshot);
}

/// Forwards snapshots to a sink, dropping ones identical to the last
/// forwarded snapshot.
pub struct SnapshotRenderer {
    sink: Box<dyn RenderSink>,
    last: Option<Hash>,
    renders: u64,
}

impl SnapshotRenderer {
    pub fn new<S>(sink: S) -> Self
    where
        S: RenderSink + 'static,
    {
        Self {
            sink: Box::new(sink),
            last: None,
            renders: 0,
        }
    }

    /// Render unless the content matches the previous render.
    pub fn submit(&mut self, snapshot: &GridSnapshot) -> bool {
        let hash = snapshot.fingerprint();
        if self.last.map(|last| last == hash).unwrap_or(false) {
            return false;
        }
        self.last = Some(hash);
        self.renders += 1;
        self.sink.render(snapshot);
        true
    }

    pub fn force(&mut self, snapshot: &GridSnapshot) {
        self.invalidate();
        self.submit(snapshot);
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }
}

/// Keeps every rendered snapshot. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<GridSnapshot>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<GridSnapshot> {
        self.frames
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<GridSnapshot> {
        self.frames
            .lock()
            .ok()
            .and_then(|guard| guard.last().cloned())
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, snapshot: &GridSnapshot) {
        if let Ok(mut guard) = self.frames.lock() {
            guard.push(snapshot.clone());
        }
    }
}
