//! Per-item actions: the handler contract, the retry loop and the dispatcher
//! that routes clicks to them.

mod dispatcher;
mod event;
mod record;

pub use dispatcher::{DispatchOutcome, Dispatcher, SkipReason};
pub use event::{ClickEvent, ClickKind};
pub use record::{ActionError, ActionFuture, ActionHandler, ActionRecord, ActionResponse, Completion, ExecutionMode};
