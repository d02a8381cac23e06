//! Menu facade: one grid or a page set, wired to the dispatcher, the
//! permission gate and the render sink.

mod config;
mod state;

pub use config::MenuConfig;
pub use state::{ItemState, MenuState};

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::action::{ClickEvent, DispatchOutcome, Dispatcher};
use crate::error::{MenuError, Result};
use crate::grid::ItemGrid;
use crate::item::{ActorId, ItemRecord};
use crate::logging::{LogLevel, emit, json_kv};
use crate::metrics::DispatchMetrics;
use crate::pages::{NavRole, PageListener, PageSet};
use crate::permission::{Interaction, InteractionKind, ModifierGate, PermissionGate, classify};
use crate::render::{GridSnapshot, RenderSink, SnapshotRenderer};
use crate::slot::Slot;
use crate::tags::TagStore;

const TARGET: &str = "slotgrid::menu";

pub enum MenuContent {
    Single(ItemGrid),
    Paged(PageSet),
}

/// What the menu did with one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Mutation the click would perform, if any.
    pub interaction: Option<InteractionKind>,
    /// Whether the host may apply that mutation.
    pub allowed: bool,
    pub dispatch: Option<DispatchOutcome>,
    pub page_turned: bool,
}

impl ClickOutcome {
    /// True when the host must cancel the click's default effect.
    pub fn cancelled(&self) -> bool {
        self.interaction.is_some() && !self.allowed
    }
}

pub struct Menu {
    config: MenuConfig,
    content: MenuContent,
    dispatcher: Dispatcher,
    gate: Box<dyn PermissionGate>,
    renderer: Option<SnapshotRenderer>,
    viewers: BTreeSet<ActorId>,
}

impl Menu {
    pub fn new(config: MenuConfig) -> Result<Self> {
        let dims = config.dimensions()?;
        let content = if config.paginated {
            MenuContent::Paged(PageSet::new(dims, config.pages)?.with_logger(config.logger.clone()))
        } else {
            MenuContent::Single(ItemGrid::new(dims))
        };
        let dispatcher = Dispatcher::default()
            .with_logger(config.logger.clone())
            .with_metrics(config.metrics_handle());
        let gate = Box::new(ModifierGate::new(config.modifiers.clone()));
        emit(
            config.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "menu_created",
            [
                json_kv("title", config.title.clone()),
                json_kv("kind", dims.kind().as_str()),
                json_kv("rows", dims.rows()),
                json_kv("paginated", config.paginated),
            ],
        );
        Ok(Self {
            config,
            content,
            dispatcher,
            gate,
            renderer: None,
            viewers: BTreeSet::new(),
        })
    }

    /// Replace the identity tag store. Records added earlier keep the stamp
    /// written by the previous store.
    pub fn with_tag_store(mut self, store: Arc<dyn TagStore>) -> Self {
        self.dispatcher = Dispatcher::new(store)
            .with_logger(self.config.logger.clone())
            .with_metrics(self.config.metrics_handle());
        self
    }

    pub fn with_gate<G>(mut self, gate: G) -> Self
    where
        G: PermissionGate + 'static,
    {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_render_sink<S>(mut self, sink: S) -> Self
    where
        S: RenderSink + 'static,
    {
        self.renderer = Some(SnapshotRenderer::new(sink));
        self
    }

    /// Install a page-change listener. Ignored for single-grid menus.
    pub fn with_page_listener<L>(mut self, listener: L) -> Self
    where
        L: PageListener + 'static,
    {
        if let MenuContent::Paged(pages) = &mut self.content {
            pages.set_listener(listener);
        }
        self
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn content(&self) -> &MenuContent {
        &self.content
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The grid currently shown: the single grid or the current page.
    pub fn active_grid(&self) -> &ItemGrid {
        match &self.content {
            MenuContent::Single(grid) => grid,
            MenuContent::Paged(pages) => pages.current(),
        }
    }

    /// Raw access to the shown grid; skips stamping and the pinned-slot guard.
    pub fn active_grid_mut(&mut self) -> &mut ItemGrid {
        match &mut self.content {
            MenuContent::Single(grid) => grid,
            MenuContent::Paged(pages) => pages.current_mut(),
        }
    }

    pub fn pages(&self) -> Option<&PageSet> {
        match &self.content {
            MenuContent::Paged(pages) => Some(pages),
            MenuContent::Single(_) => None,
        }
    }

    pub fn pages_mut(&mut self) -> Option<&mut PageSet> {
        match &mut self.content {
            MenuContent::Paged(pages) => Some(pages),
            MenuContent::Single(_) => None,
        }
    }

    /// Add one record. Single grids may grow; page sets append pages.
    pub fn add_item(&mut self, item: ItemRecord) -> bool {
        self.add_items([item]).is_empty()
    }

    /// Add records in order and return the ones that found no room.
    pub fn add_items<I>(&mut self, items: I) -> Vec<ItemRecord>
    where
        I: IntoIterator<Item = ItemRecord>,
    {
        let stamped: Vec<ItemRecord> = items
            .into_iter()
            .map(|item| self.dispatcher.stamp(item))
            .collect();
        let overflow = match &mut self.content {
            MenuContent::Single(grid) => {
                let report = grid.add_many(stamped);
                if report.grew {
                    emit(
                        self.config.logger.as_ref(),
                        LogLevel::Debug,
                        TARGET,
                        "grid_grew",
                        [json_kv("rows", grid.rows())],
                    );
                }
                report.overflow
            }
            MenuContent::Paged(pages) => pages.add_content(stamped),
        };
        if !overflow.is_empty() {
            emit(
                self.config.logger.as_ref(),
                LogLevel::Warn,
                TARGET,
                "items_rejected",
                [json_kv("count", overflow.len())],
            );
        }
        self.refresh();
        overflow
    }

    /// Write a record into the active grid. On paged menus the pinned
    /// navigation slots are refused; use [`Menu::set_nav`] for those.
    pub fn set_item(&mut self, at: impl Into<Slot>, item: ItemRecord) -> bool {
        let slot = at.into();
        let item = self.dispatcher.stamp(item);
        let changed = match &mut self.content {
            MenuContent::Single(grid) => grid.set(slot, item),
            MenuContent::Paged(pages) => {
                let index = pages.current_page_index();
                pages.set_item(index, slot, item)
            }
        };
        if changed {
            self.refresh();
        }
        changed
    }

    /// Clear a cell of the active grid. Pinned navigation slots stay put;
    /// [`PageSet::clear_nav`] removes those from every page.
    pub fn remove_item(&mut self, at: impl Into<Slot>) -> Option<ItemRecord> {
        let slot = at.into();
        let removed = match &mut self.content {
            MenuContent::Single(grid) => grid.remove(slot),
            MenuContent::Paged(pages) => {
                let index = pages.current_page_index();
                pages.remove_item(index, slot)
            }
        };
        if removed.is_some() {
            self.refresh();
        }
        removed
    }

    pub fn set_next_nav(&mut self, slot: Slot, item: ItemRecord) -> bool {
        self.set_nav(NavRole::Next, slot, item)
    }

    pub fn set_previous_nav(&mut self, slot: Slot, item: ItemRecord) -> bool {
        self.set_nav(NavRole::Previous, slot, item)
    }

    /// Pin a navigation record on every page. Single-grid menus have no
    /// pages to navigate and refuse.
    pub fn set_nav(&mut self, role: NavRole, slot: Slot, item: ItemRecord) -> bool {
        let item = self.dispatcher.stamp(item);
        let done = match &mut self.content {
            MenuContent::Paged(pages) => pages.set_nav(role, slot, item),
            MenuContent::Single(_) => false,
        };
        if done {
            self.refresh();
        }
        done
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.pages_mut().is_some_and(PageSet::next);
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn previous_page(&mut self) -> bool {
        let moved = self.pages_mut().is_some_and(PageSet::previous);
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn page(&mut self, index: usize) -> bool {
        let moved = self.pages_mut().is_some_and(|pages| pages.page(index));
        if moved {
            self.refresh();
        }
        moved
    }

    /// Show the menu to `actor` on page `index` (0 for single grids).
    pub fn open(&mut self, actor: ActorId, index: usize) -> Result<()> {
        match &mut self.content {
            MenuContent::Paged(pages) => pages.open(actor, index)?,
            MenuContent::Single(_) if index == 0 => {
                self.viewers.insert(actor);
            }
            MenuContent::Single(_) => return Err(MenuError::PageOutOfRange { index, len: 1 }),
        }
        self.update();
        Ok(())
    }

    pub fn close(&mut self, actor: ActorId) -> bool {
        match &mut self.content {
            MenuContent::Paged(pages) => pages.close(actor),
            MenuContent::Single(_) => self.viewers.remove(&actor),
        }
    }

    pub fn viewers(&self) -> &BTreeSet<ActorId> {
        match &self.content {
            MenuContent::Paged(pages) => pages.viewers(),
            MenuContent::Single(_) => &self.viewers,
        }
    }

    pub fn snapshot(&self) -> GridSnapshot {
        match &self.content {
            MenuContent::Single(grid) => grid.snapshot(&self.config.title),
            MenuContent::Paged(pages) => pages.snapshot(&self.config.title),
        }
    }

    /// Push the current snapshot even if nothing changed.
    pub fn update(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.invalidate();
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        if let MenuContent::Paged(pages) = &mut self.content {
            pages.take_render_request();
        }
        let snapshot = self.snapshot();
        let rendered = self
            .renderer
            .as_mut()
            .is_some_and(|renderer| renderer.submit(&snapshot));
        if rendered {
            self.record(DispatchMetrics::record_render);
        }
    }

    fn record(&self, f: impl FnOnce(&mut DispatchMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                f(&mut *guard);
            }
        }
    }

    /// Route a host click: classify it, consult the gate, dispatch the item
    /// under it and follow navigation controls.
    pub async fn handle_click(&mut self, event: ClickEvent) -> Result<ClickOutcome> {
        self.record(DispatchMetrics::record_click);

        let grid = self.active_grid();
        let slot = Slot::from_index(event.raw_slot);
        let inside = grid.contains(slot);
        let occupied = inside && grid.get(slot).is_some();
        let interaction = classify(&event, inside, occupied);

        let nav = self.pages().and_then(|pages| pages.nav_control(slot)).filter(|_| inside);
        let allowed = match interaction {
            Some(_) if nav.is_some() => false,
            Some(kind) => self.gate.allows(&Interaction {
                kind,
                actor: event.actor,
                slot,
                item: if inside { grid.get(slot) } else { None },
            }),
            None => true,
        };
        if !allowed {
            self.record(DispatchMetrics::record_denied);
            emit(
                self.config.logger.as_ref(),
                LogLevel::Debug,
                TARGET,
                "interaction_denied",
                [
                    json_kv("actor", event.actor.to_string()),
                    json_kv("raw_slot", event.raw_slot),
                    json_kv("interaction", interaction.map(InteractionKind::as_str).unwrap_or("none")),
                ],
            );
        }

        let mut outcome = ClickOutcome {
            interaction,
            allowed,
            dispatch: None,
            page_turned: false,
        };
        if !inside {
            return Ok(outcome);
        }

        let pending = self.dispatcher.dispatch(self.active_grid(), slot, event);
        let dispatched = pending.await?;
        outcome.dispatch = Some(dispatched);

        if let (Some(role), DispatchOutcome::Completed(_)) = (nav, dispatched) {
            outcome.page_turned = match role {
                NavRole::Next => self.next_page(),
                NavRole::Previous => self.previous_page(),
            };
        }
        Ok(outcome)
    }

    /// [`Menu::handle_click`] driven to completion on the calling thread.
    /// Async records still need their runtime to be running elsewhere.
    pub fn handle_click_blocking(&mut self, event: ClickEvent) -> Result<ClickOutcome> {
        futures::executor::block_on(self.handle_click(event))
    }

    /// Emit the current metrics snapshot through the configured logger.
    pub fn emit_metrics(&self) {
        let Some(metrics) = self.config.metrics.as_ref() else {
            return;
        };
        let Some(logger) = self.config.logger.as_ref() else {
            return;
        };
        let snapshot = match metrics.lock() {
            Ok(guard) => guard.snapshot(),
            Err(_) => return,
        };
        let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
    }
}
