use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use thiserror::Error;
use tokio::runtime::Handle;

use crate::slot::Slot;

use super::ClickEvent;

/// Result of one handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionResponse {
    /// The action ran to completion.
    Done,
    /// Run the handler again.
    Retry,
    /// Nothing to do; the default for records without behaviour.
    Empty,
}

impl ActionResponse {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionResponse::Retry)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionResponse::Done => "done",
            ActionResponse::Retry => "retry",
            ActionResponse::Empty => "empty",
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("handler failed: {0}")]
    Handler(String),
    #[error("action task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ActionError {
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

pub type ActionFuture = BoxFuture<'static, Result<ActionResponse, ActionError>>;

/// Type-erased handler shared by every clone of an [`ActionRecord`].
pub type ActionHandler = Arc<dyn Fn(Slot, ClickEvent) -> ActionFuture + Send + Sync>;

/// Where a record's handler and its retries run.
///
/// Chosen once when the record is built. `Sync` drives the retry loop on
/// whichever task awaits the dispatch; `Async` moves the whole loop into a
/// task spawned on the given runtime.
#[derive(Clone)]
pub enum ExecutionMode {
    Sync,
    Async(Handle),
}

impl fmt::Debug for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sync => f.write_str("Sync"),
            ExecutionMode::Async(_) => f.write_str("Async"),
        }
    }
}

/// Terminal response plus the number of handler invocations it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub response: ActionResponse,
    pub attempts: u64,
}

impl Completion {
    pub fn retries(&self) -> u64 {
        self.attempts.saturating_sub(1)
    }
}

/// Per-item action contract: a handler and the mode it runs in.
#[derive(Clone)]
pub struct ActionRecord {
    handler: ActionHandler,
    mode: ExecutionMode,
}

impl ActionRecord {
    /// Build a record from a future-returning handler.
    pub fn new<F, Fut>(mode: ExecutionMode, handler: F) -> Self
    where
        F: Fn(Slot, ClickEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ActionResponse, ActionError>> + Send + 'static,
    {
        Self {
            handler: erase(move |slot, event| handler(slot, event).boxed()),
            mode,
        }
    }

    /// Record whose handler immediately answers [`ActionResponse::Empty`].
    pub fn empty() -> Self {
        Self {
            handler: erase(|_, _| future::ready(Ok(ActionResponse::Empty)).boxed()),
            mode: ExecutionMode::Sync,
        }
    }

    /// Inline record around a plain closure.
    pub fn sync<F>(handler: F) -> Self
    where
        F: Fn(Slot, &ClickEvent) -> ActionResponse + Send + Sync + 'static,
    {
        Self {
            handler: erase(move |slot, event| future::ready(Ok(handler(slot, &event))).boxed()),
            mode: ExecutionMode::Sync,
        }
    }

    /// Inline record around a closure that may fail.
    pub fn try_sync<F>(handler: F) -> Self
    where
        F: Fn(Slot, &ClickEvent) -> Result<ActionResponse, ActionError> + Send + Sync + 'static,
    {
        Self {
            handler: erase(move |slot, event| future::ready(handler(slot, &event)).boxed()),
            mode: ExecutionMode::Sync,
        }
    }

    /// Record whose retry loop runs on `handle`.
    pub fn spawned<F, Fut>(handle: Handle, handler: F) -> Self
    where
        F: Fn(Slot, ClickEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ActionResponse, ActionError>> + Send + 'static,
    {
        Self::new(ExecutionMode::Async(handle), handler)
    }

    pub fn mode(&self) -> &ExecutionMode {
        &self.mode
    }

    pub fn is_async(&self) -> bool {
        matches!(self.mode, ExecutionMode::Async(_))
    }

    /// Invoke the handler until it answers something other than `Retry`.
    ///
    /// There is no attempt cap and no backoff: a handler that always answers
    /// `Retry` keeps the returned future pending forever. Async records yield
    /// to their runtime between attempts so the task can still be torn down.
    pub fn run(
        &self,
        slot: Slot,
        event: ClickEvent,
    ) -> BoxFuture<'static, Result<Completion, ActionError>> {
        let handler = Arc::clone(&self.handler);
        match &self.mode {
            ExecutionMode::Sync => retry_until_terminal(handler, slot, event, false).boxed(),
            ExecutionMode::Async(handle) => {
                let task = handle.spawn(retry_until_terminal(handler, slot, event, true));
                async move {
                    match task.await {
                        Ok(result) => result,
                        Err(err) => Err(ActionError::from(err)),
                    }
                }
                .boxed()
            }
        }
    }
}

impl Default for ActionRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRecord")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn erase<F>(handler: F) -> ActionHandler
where
    F: Fn(Slot, ClickEvent) -> ActionFuture + Send + Sync + 'static,
{
    Arc::new(handler)
}

async fn retry_until_terminal(
    handler: ActionHandler,
    slot: Slot,
    event: ClickEvent,
    cooperative: bool,
) -> Result<Completion, ActionError> {
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        let response = handler(slot, event.clone()).await?;
        if response.is_terminal() {
            return Ok(Completion { response, attempts });
        }
        if cooperative {
            tokio::task::yield_now().await;
        }
    }
}
