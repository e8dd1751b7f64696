//! Reactive primitives and headless demo screens.
//!
//! The crate has two layers. The reactive core provides cold [`Observable`]
//! pipelines, the hot [`BehaviorSubject`](subjects::BehaviorSubject) and
//! [`ReplaySubject`](subjects::ReplaySubject), and a [`Scope`] that owns
//! cancellable background tasks. On top of it, [`screens`] contains four
//! self-contained demos: a task runner, stream demos, a state holder and an
//! event bus. Each screen is a state object with command handlers and a
//! `dispose` that cancels everything it launched.

pub mod config;
mod errors;
mod observable;
mod observer;
mod scope;
pub mod screens;
pub mod subjects;
mod subscription;

pub use errors::*;
pub use observable::*;
pub use observer::Observer;
pub use scope::{Scope, TaskHandle};
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};

use std::sync::{Mutex, MutexGuard, PoisonError};

// Recovers the guard from a poisoned mutex.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
