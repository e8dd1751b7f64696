//! Headless demo screens.
//!
//! A screen owns its state and a [`Scope`](crate::Scope). Public methods are the
//! command handlers a front end would bind to buttons; each either mutates the
//! state directly or launches a task into the scope. `dispose` cancels every
//! task the screen launched.

pub mod event_bus;
pub mod state_holder;
pub mod stream_demos;
pub mod task_runner;

pub use event_bus::{EventBus, EventCommand, EventLog};
pub use state_holder::{CounterCommand, StateHolder};
pub use stream_demos::{StreamDemos, StreamKind};
pub use task_runner::{PendingOperation, TaskRunner};
