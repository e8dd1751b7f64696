//! The `subjects` module provides hot streams: sources that exist and emit
//! whether or not anyone is observing them, multicasting every emission to all
//! registered observers.
//!
//! Subjects are split into an emitter and a receiver by their `emitter_receiver`
//! function. The emitter behaves as an `Observer`, enabling `next()`, `error()`
//! and `complete()` calls, so it can also be passed to the `subscribe` method of
//! another `Observable`. The receiver functions as an `Observable`, enabling the
//! `subscribe` and `unsubscribe` methods and every `ObservableExt` operator.
//!
//! Two varieties exist: [`BehaviorSubject`] always holds a current value and hands
//! it to each new subscriber, [`ReplaySubject`] keeps a buffer of the most recent
//! emissions and replays it to each new subscriber before live values.
//!
//! Observers are notified while the subject is locked. An observer must not call
//! back into the subject it is registered on.

mod behavior_subject;
mod replay_subject;

pub use behavior_subject::*;
pub use replay_subject::*;

use std::sync::atomic::{AtomicU64, Ordering};

// Identifies a registered observer so its subscription can remove it again.
fn next_key() -> u64 {
    static KEY: AtomicU64 = AtomicU64::new(0);
    KEY.fetch_add(1, Ordering::Relaxed)
}
