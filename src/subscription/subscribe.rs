use std::{error::Error, sync::Arc};

use tokio::task::{JoinError, JoinHandle};

use crate::observer::Observer;

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by a stream.
pub trait Subscribeable {
    /// The type of items emitted by the stream.
    type ObsType;

    /// Subscribes to the stream and specifies how to handle emitted values.
    ///
    /// The returned `Subscription` allows the caller to unsubscribe and, for
    /// asynchronous sources, to await their completion.
    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, releasing the resources held by a
/// subscription and signalling the source to stop emitting.
///
/// The instance is consumed, making it unusable after the `unsubscribe`
/// operation.
pub trait Unsubscribeable {
    fn unsubscribe(self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;
type ErrorFn = Box<dyn FnMut(Arc<dyn Error + Send + Sync>) + Send>;

/// A type that acts as an observer, allowing users to handle emitted values, errors
/// and completion when subscribing to an `Observable` or a subject.
///
/// Once `error` or `complete` has been delivered the subscriber is stopped and
/// every later signal is ignored.
pub struct Subscriber<NextFnType> {
    next_fn: NextFn<NextFnType>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    stopped: bool,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` with custom handling functions for emitted
    /// values, errors and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send,
        complete_fn: impl FnMut() + 'static + Send,
    ) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: Some(Box::new(complete_fn)),
            error_fn: Some(Box::new(error_fn)),
            stopped: false,
        }
    }

    /// Create a new Subscriber with only the `next` function.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: None,
            error_fn: None,
            stopped: false,
        }
    }

    /// Set the completion function for the Subscriber.
    pub fn on_complete(&mut self, complete_fn: impl FnMut() + 'static + Send) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Set the error-handling function for the Subscriber.
    pub fn on_error(&mut self, error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Returns `true` after `error` or `complete` has been delivered.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.stopped {
            return;
        }
        (self.next_fn)(v);
    }

    fn complete(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(cfn) = &mut self.complete_fn {
            (cfn)();
        }
    }

    fn error(&mut self, observable_error: Arc<dyn Error + Send + Sync>) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(efn) = &mut self.error_fn {
            (efn)(observable_error);
        }
    }
}

/// Handle used by a `Subscription` to await an asynchronous source.
pub enum SubscriptionHandle {
    /// Synchronous source, nothing to await.
    Nil,

    /// Holds a join handle for awaiting an observable that emits from a Tokio task.
    JoinTask(JoinHandle<()>),
}

impl SubscriptionHandle {
    /// Waits until the source behind this handle has stopped emitting.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tokio task driving the source panicked.
    pub async fn join(self) -> Result<(), JoinError> {
        match self {
            SubscriptionHandle::JoinTask(task_handle) => task_handle.await,
            SubscriptionHandle::Nil => Ok(()),
        }
    }
}

/// Represents a subscription to an observable or a subject, allowing control over
/// the subscription.
///
/// Dropping a `Subscription` does not unsubscribe; call
/// [`unsubscribe`](Unsubscribeable::unsubscribe) to stop a source.
pub struct Subscription {
    pub(crate) unsubscribe_logic: UnsubscribeLogic,
    pub(crate) subscription_future: SubscriptionHandle,
}

impl Subscription {
    /// Creates a new `Subscription` with the specified unsubscribe logic and
    /// subscription handle.
    #[must_use]
    pub fn new(
        unsubscribe_logic: UnsubscribeLogic,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        Subscription {
            unsubscribe_logic,
            subscription_future,
        }
    }

    /// Subscription that neither unsubscribes nor awaits anything.
    #[must_use]
    pub fn empty() -> Self {
        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
    }

    /// Moves the await handle out, leaving `SubscriptionHandle::Nil` behind.
    pub(crate) fn take_handle(&mut self) -> SubscriptionHandle {
        std::mem::replace(&mut self.subscription_future, SubscriptionHandle::Nil)
    }

    /// Awaits the completion of the Tokio task associated with this subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the task used by the observable panicked.
    pub async fn join(self) -> Result<(), JoinError> {
        self.subscription_future.join().await
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.unsubscribe_logic.unsubscribe();
    }
}

/// Enumerates unsubscribe logic options for a subscription.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// If one subscription depends on another. Wrapped subscription's unsubscribe
    /// will be called upon unsubscribing.
    Wrapped(Box<Subscription>),

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),
}

impl UnsubscribeLogic {
    fn unsubscribe(self) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => fnc(),
            UnsubscribeLogic::Wrapped(subscription) => subscription.unsubscribe(),
        }
    }
}
