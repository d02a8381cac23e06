use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::grid::ItemGrid;
use crate::item::{ItemPayload, ItemRecord};
use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::metrics::DispatchMetrics;
use crate::slot::Slot;
use crate::tags::{self, MetaTagStore, TagStore};

use super::{ActionError, ClickEvent, Completion};

const TARGET: &str = "slotgrid::dispatch";

/// Why a click never reached a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The slot is empty or outside the grid.
    NoItem,
    /// The click's payload carries a different (or no) item id.
    IdentityMismatch,
    /// The actor is still cooling down on this item.
    Cooldown,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoItem => "no_item",
            SkipReason::IdentityMismatch => "identity_mismatch",
            SkipReason::Cooldown => "cooldown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed(Completion),
    Skipped(SkipReason),
}

impl DispatchOutcome {
    pub fn completion(&self) -> Option<Completion> {
        match self {
            DispatchOutcome::Completed(completion) => Some(*completion),
            DispatchOutcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DispatchOutcome::Skipped(_))
    }
}

/// Looks up the record behind a click, applies the identity and cooldown
/// gates, then drives the record's action.
#[derive(Clone)]
pub struct Dispatcher {
    tags: Arc<dyn TagStore>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<DispatchMetrics>>>,
}

impl Dispatcher {
    pub fn new(tags: Arc<dyn TagStore>) -> Self {
        Self {
            tags,
            logger: None,
            metrics: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Mutex<DispatchMetrics>>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn tag_store(&self) -> &dyn TagStore {
        self.tags.as_ref()
    }

    /// Stamp `record`'s id onto its payload so later clicks can be verified.
    pub fn stamp(&self, record: ItemRecord) -> ItemRecord {
        record.stamped(self.tags.as_ref())
    }

    /// True when `payload` carries the id of `record`.
    pub fn verify(&self, record: &ItemRecord, payload: &ItemPayload) -> bool {
        tags::read_item_id(self.tags.as_ref(), payload) == Some(record.id())
    }

    /// Find the record a click belongs to.
    pub fn resolve<'g>(
        &self,
        grid: &'g ItemGrid,
        slot: Slot,
        event: &ClickEvent,
    ) -> Result<&'g ItemRecord, SkipReason> {
        let record = grid.get(slot).ok_or(SkipReason::NoItem)?;
        match &event.clicked {
            Some(payload) if self.verify(record, payload) => Ok(record),
            _ => Err(SkipReason::IdentityMismatch),
        }
    }

    /// Run the action installed at `slot`.
    ///
    /// Gates are evaluated synchronously against `grid`; the returned future
    /// owns everything it needs and can outlive the borrow.
    pub fn dispatch(
        &self,
        grid: &ItemGrid,
        slot: Slot,
        event: ClickEvent,
    ) -> BoxFuture<'static, Result<DispatchOutcome, ActionError>> {
        let record = match self.resolve(grid, slot, &event) {
            Ok(record) => record,
            Err(reason) => return self.skip(slot, &event, reason),
        };

        let now = SystemTime::now();
        if record.cooldowns().is_active(event.actor, now) {
            return self.skip(slot, &event, SkipReason::Cooldown);
        }
        if let Some(cooldown) = record.cooldown() {
            record.cooldowns().set(event.actor, now + cooldown);
        }

        self.with_counters(DispatchMetrics::record_dispatch);
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "dispatch",
            [
                json_kv("slot", slot.index()),
                json_kv("item", record.id().to_string()),
                json_kv("actor", event.actor.to_string()),
                json_kv("async", record.action().is_async()),
            ],
        );

        let run = record.action().run(slot, event);
        let logger = self.logger.clone();
        let metrics = self.metrics.clone();
        async move {
            let result = run.await;
            let (level, message, fields) = match &result {
                Ok(completion) => {
                    with(&metrics, |m| m.record_completion(completion.attempts));
                    (
                        LogLevel::Debug,
                        "dispatch_complete",
                        vec![
                            json_kv("slot", slot.index()),
                            json_kv("response", completion.response.as_str()),
                            json_kv("attempts", completion.attempts),
                        ],
                    )
                }
                Err(err) => {
                    with(&metrics, DispatchMetrics::record_failure);
                    (
                        LogLevel::Warn,
                        "dispatch_failed",
                        vec![json_kv("slot", slot.index()), json_kv("error", err.to_string())],
                    )
                }
            };
            emit(logger.as_ref(), level, TARGET, message, fields);
            result.map(DispatchOutcome::Completed)
        }
        .boxed()
    }

    fn skip(
        &self,
        slot: Slot,
        event: &ClickEvent,
        reason: SkipReason,
    ) -> BoxFuture<'static, Result<DispatchOutcome, ActionError>> {
        match reason {
            SkipReason::Cooldown => self.with_counters(DispatchMetrics::record_cooldown_skip),
            SkipReason::IdentityMismatch => self.with_counters(DispatchMetrics::record_identity_miss),
            SkipReason::NoItem => {}
        }
        emit(
            self.logger.as_ref(),
            LogLevel::Trace,
            TARGET,
            "dispatch_skipped",
            [
                json_kv("slot", slot.index()),
                json_kv("actor", event.actor.to_string()),
                json_kv("reason", reason.as_str()),
            ],
        );
        future::ready(Ok(DispatchOutcome::Skipped(reason))).boxed()
    }

    fn with_counters(&self, f: impl FnOnce(&mut DispatchMetrics)) {
        with(&self.metrics, f);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(MetaTagStore::default()))
    }
}

fn with(metrics: &Option<Arc<Mutex<DispatchMetrics>>>, f: impl FnOnce(&mut DispatchMetrics)) {
    if let Some(metrics) = metrics {
        if let Ok(mut guard) = metrics.lock() {
            f(&mut *guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionRecord, ActionResponse};
    use crate::item::{ActorId, ItemPayload};
    use crate::logging::MemorySink;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn counting_record(calls: &Arc<AtomicU64>) -> ItemRecord {
        let counter = Arc::clone(calls);
        ItemRecord::new(ItemPayload::new("button")).with_action(ActionRecord::sync(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            ActionResponse::Done
        }))
    }

    fn click_on(grid: &ItemGrid, actor: ActorId, slot: i32) -> ClickEvent {
        let mut event = ClickEvent::left(actor, slot);
        event.clicked = grid.get(slot).map(|record| record.payload().clone());
        event
    }

    #[tokio::test]
    async fn dispatch_runs_the_verified_item() {
        let dispatcher = Dispatcher::default();
        let calls = Arc::new(AtomicU64::new(0));
        let mut grid = ItemGrid::chest(1).unwrap();
        grid.set(2, dispatcher.stamp(counting_record(&calls)));

        let event = click_on(&grid, ActorId::new(), 2);
        let outcome = dispatcher.dispatch(&grid, Slot::from_index(2), event).await.unwrap();
        assert_eq!(outcome.completion().map(|c| c.response), Some(ActionResponse::Done));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_slot_is_no_item() {
        let dispatcher = Dispatcher::default();
        let grid = ItemGrid::chest(1).unwrap();
        let outcome = dispatcher
            .dispatch(&grid, Slot::from_index(0), ClickEvent::left(ActorId::new(), 0))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::NoItem));
    }

    #[tokio::test]
    async fn stale_payload_is_treated_as_no_item_here() {
        let dispatcher = Dispatcher::default();
        let calls = Arc::new(AtomicU64::new(0));
        let mut grid = ItemGrid::chest(1).unwrap();
        let old = dispatcher.stamp(counting_record(&calls));
        let stale_payload = old.payload().clone();
        grid.set(0, dispatcher.stamp(counting_record(&calls)));

        let event = ClickEvent::left(ActorId::new(), 0).with_clicked(stale_payload);
        let outcome = dispatcher.dispatch(&grid, Slot::FIRST, event).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::IdentityMismatch));

        let unstamped = ClickEvent::left(ActorId::new(), 0).with_clicked(ItemPayload::new("button"));
        let outcome = dispatcher.dispatch(&grid, Slot::FIRST, unstamped).await.unwrap();
        assert!(outcome.is_skipped());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cooldown_skips_without_invoking_the_handler() {
        let dispatcher = Dispatcher::default();
        let calls = Arc::new(AtomicU64::new(0));
        let mut grid = ItemGrid::chest(1).unwrap();
        let record = counting_record(&calls).with_cooldown(Duration::from_secs(60));
        grid.set(0, dispatcher.stamp(record));

        let actor = ActorId::new();
        let first = dispatcher.dispatch(&grid, Slot::FIRST, click_on(&grid, actor, 0)).await.unwrap();
        assert!(!first.is_skipped());
        let second = dispatcher.dispatch(&grid, Slot::FIRST, click_on(&grid, actor, 0)).await.unwrap();
        assert_eq!(second, DispatchOutcome::Skipped(SkipReason::Cooldown));

        let other = ActorId::new();
        let third = dispatcher.dispatch(&grid, Slot::FIRST, click_on(&grid, other, 0)).await.unwrap();
        assert!(!third.is_skipped());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handler_failure_propagates_and_is_counted() {
        let sink = MemorySink::new();
        let metrics = Arc::new(Mutex::new(DispatchMetrics::new()));
        let dispatcher = Dispatcher::default()
            .with_logger(Some(Logger::new(sink.clone())))
            .with_metrics(Some(Arc::clone(&metrics)));
        let mut grid = ItemGrid::chest(1).unwrap();
        let record = ItemRecord::new(ItemPayload::new("trap"))
            .with_action(ActionRecord::try_sync(|_, _| Err(ActionError::handler("nope"))));
        grid.set(0, dispatcher.stamp(record));

        let err = dispatcher
            .dispatch(&grid, Slot::FIRST, click_on(&grid, ActorId::new(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Handler(_)));
        assert_eq!(metrics.lock().unwrap().snapshot().failures, 1);
        assert!(sink.messages().contains(&"dispatch_failed".to_string()));
    }

    #[tokio::test]
    async fn retries_are_reported_in_metrics() {
        let metrics = Arc::new(Mutex::new(DispatchMetrics::new()));
        let dispatcher = Dispatcher::default().with_metrics(Some(Arc::clone(&metrics)));
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let record = ItemRecord::new(ItemPayload::new("lever")).with_action(ActionRecord::sync(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                ActionResponse::Retry
            } else {
                ActionResponse::Done
            }
        }));
        let mut grid = ItemGrid::chest(1).unwrap();
        grid.set(0, dispatcher.stamp(record));

        let outcome = dispatcher
            .dispatch(&grid, Slot::FIRST, click_on(&grid, ActorId::new(), 0))
            .await
            .unwrap();
        assert_eq!(outcome.completion().map(|c| c.attempts), Some(3));
        let snapshot = metrics.lock().unwrap().snapshot();
        assert_eq!(snapshot.dispatches, 1);
        assert_eq!(snapshot.retries, 2);
    }
}
