//! The `observable` module provides the building blocks for creating and chaining
//! cold streams.
//!
//! An [`Observable`] does nothing until it is subscribed to. Every subscription
//! runs the producer again, so an observable can be collected any number of
//! times and each run yields the same sequence.

mod creation;

pub use creation::*;

use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use crate::lock;
use crate::observer::Observer;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

/// The `Observable` struct represents a source of values that can be observed
/// and transformed.
///
/// # Example
///
/// A synchronous `Observable` emitting 1 to 3. It returns an empty `Subscription`
/// since there is nothing to stop or await.
///
/// ```no_run
/// use rxlab::subscribe::{Subscriber, Subscription};
/// use rxlab::{Observable, ObservableExt, Observer, Subscribeable};
///
/// let mut observable = Observable::new(|mut subscriber| {
///     for i in 1..=3 {
///         subscriber.next(i);
///     }
///     subscriber.complete();
///     Subscription::empty()
/// })
/// .map(|v| v * 10);
///
/// observable.subscribe(Subscriber::on_next(|v| println!("Emitted {}", v)));
/// ```
pub struct Observable<T> {
    subscribe_fn: Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// `sf` is invoked once per subscription to deliver values to the
    /// `Subscriber`. It returns a `Subscription` that enables unsubscribing and,
    /// for asynchronous producers, awaiting the Tokio task that emits.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, v: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(v)
    }
}

// Downstream subscriber shared between the three callbacks of an operator stage.
type Shared<T> = Arc<Mutex<Subscriber<T>>>;

fn forward_terminal<T: 'static, U: 'static>(
    o_shared: &Shared<U>,
    next_fn: impl FnMut(T) + Send + 'static,
) -> Subscriber<T> {
    let o_cloned_e = Arc::clone(o_shared);
    let o_cloned_c = Arc::clone(o_shared);

    Subscriber::new(
        next_fn,
        move |observable_error| lock(&o_cloned_e).error(observable_error),
        move || lock(&o_cloned_c).complete(),
    )
}

/// The `ObservableExt` trait provides the operator stages that can be chained on
/// any `Subscribeable` to build a pipeline.
///
/// Each stage is restartable exactly when its source is: subscribing to the
/// resulting observable subscribes to the source again.
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> {
    /// Transforms the items emitted by the observable using a transformation
    /// function.
    fn map<U, F>(mut self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        U: 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_n = Arc::clone(&o_shared);
            let f = Arc::clone(&f);

            let u = forward_terminal(&o_shared, move |v| {
                let t = f(v);
                lock(&o_cloned_n).next(t);
            });
            self.subscribe(u)
        })
    }

    /// Filters the items emitted by the observable based on a predicate function.
    ///
    /// Only items for which the predicate returns `true` are emitted.
    fn filter<P>(mut self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_n = Arc::clone(&o_shared);
            let predicate = Arc::clone(&predicate);

            let u = forward_terminal(&o_shared, move |v| {
                if predicate(&v) {
                    lock(&o_cloned_n).next(v);
                }
            });
            self.subscribe(u)
        })
    }

    /// Catches an error from the source and replaces it with a single value.
    ///
    /// When the source signals `error`, `handler` turns the error into a
    /// substitute item which is emitted, and the resulting observable then
    /// completes normally. Downstream observers never see the error.
    fn catch_and_substitute<F>(mut self, handler: F) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(Arc<dyn Error + Send + Sync>) -> T + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);
            let handler = Arc::clone(&handler);

            let u = Subscriber::new(
                move |v| lock(&o_shared).next(v),
                move |observable_error| {
                    tracing::debug!(error = %observable_error, "substituting stream error");
                    let substitute = handler(observable_error);
                    let mut o = lock(&o_cloned_e);
                    o.next(substitute);
                    o.complete();
                },
                move || lock(&o_cloned_c).complete(),
            );
            self.subscribe(u)
        })
    }
}

impl<O, T: 'static> ObservableExt<T> for O where O: Subscribeable<ObsType = T> {}

#[cfg(test)]
mod tests;
