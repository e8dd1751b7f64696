use std::{
    collections::VecDeque,
    error::Error,
    sync::{Arc, Mutex},
};

use crate::{
    lock,
    observer::Observer,
    subscription::subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
        Unsubscribeable,
    },
    Observable,
};

/// Specifies the buffer size for replaying previous emissions in `ReplaySubject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufSize {
    /// Every emitted value is kept and replayed.
    Unbounded,

    /// Only the most recent `n` values are kept; the oldest is evicted first.
    Bounded(usize),
}

/// A multicast `Subject` that replays its most recent emissions to new
/// subscribers.
///
/// The subject keeps a ring buffer of the last emitted values. A new subscriber
/// first receives every buffered value, oldest first, and is then registered for
/// live values. Emissions with no subscribers are still buffered.
///
/// Even when stopped by `complete` or `error`, the buffer is replayed before the
/// terminal signal reaches a late subscriber.
///
/// ```no_run
/// use rxlab::subjects::{BufSize, ReplaySubject};
/// use rxlab::subscribe::Subscriber;
/// use rxlab::{Observer, Subscribeable};
///
/// let (mut emitter, mut receiver) = ReplaySubject::emitter_receiver(BufSize::Bounded(3));
///
/// for i in 1..=5 {
///     emitter.next(i);
/// }
///
/// // Receives 3, 4, 5 right away, then 6.
/// receiver.subscribe(Subscriber::on_next(|v| println!("event {}", v)));
/// emitter.next(6);
/// ```
pub struct ReplaySubject<T> {
    buf_size: BufSize,
    values: VecDeque<T>,
    observers: Vec<(u64, Subscriber<T>)>,
    completed: bool,
    closed: bool,
    error: Option<Arc<dyn Error + Send + Sync>>,
}

impl<T: Send + 'static> ReplaySubject<T> {
    /// Creates a `ReplaySubject` with the given replay buffer size.
    ///
    /// Returns a `ReplaySubjectEmitter` for emitting values and a
    /// `ReplaySubjectReceiver` for subscribing to them.
    pub fn emitter_receiver(
        buf_size: BufSize,
    ) -> (ReplaySubjectEmitter<T>, ReplaySubjectReceiver<T>) {
        let values = match buf_size {
            BufSize::Unbounded => VecDeque::with_capacity(16),
            BufSize::Bounded(size) => VecDeque::with_capacity(size),
        };
        let s = Arc::new(Mutex::new(ReplaySubject {
            buf_size,
            values,
            observers: Vec::with_capacity(16),
            completed: false,
            closed: false,
            error: None,
        }));

        (
            ReplaySubjectEmitter(Arc::clone(&s)),
            ReplaySubjectReceiver(Arc::clone(&s)),
        )
    }
}

impl<T> ReplaySubject<T> {
    fn store(&mut self, v: T) {
        match self.buf_size {
            BufSize::Unbounded => self.values.push_back(v),
            BufSize::Bounded(0) => {}
            BufSize::Bounded(buf_size) => {
                if self.values.len() == buf_size {
                    self.values.pop_front();
                }
                self.values.push_back(v);
            }
        }
    }
}

/// Subscription handler for `ReplaySubject`.
///
/// Acts as an `Observable`; its `unsubscribe` method closes the subject and
/// removes every registered observer.
#[derive(Clone)]
pub struct ReplaySubjectReceiver<T>(Arc<Mutex<ReplaySubject<T>>>);

/// Multicasting emitter for `ReplaySubject`.
#[derive(Clone)]
pub struct ReplaySubjectEmitter<T>(Arc<Mutex<ReplaySubject<T>>>);

impl<T> ReplaySubjectReceiver<T> {
    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        lock(&self.0).observers.len()
    }

    /// Returns `true` if no observers are registered, `false` otherwise.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> ReplaySubjectReceiver<T> {
    /// Returns the buffered values, oldest first.
    pub fn buffered(&self) -> Vec<T> {
        lock(&self.0).values.iter().cloned().collect()
    }
}

impl<T: Clone + Send + 'static> Subscribeable for ReplaySubjectReceiver<T> {
    type ObsType = T;

    fn subscribe(&mut self, mut v: Subscriber<Self::ObsType>) -> Subscription {
        let key = super::next_key();

        {
            let mut src = lock(&self.0);
            if src.closed {
                return Subscription::empty();
            }
            for value in &src.values {
                v.next(value.clone());
            }
            if src.completed {
                if let Some(err) = &src.error {
                    v.error(Arc::clone(err));
                } else {
                    v.complete();
                }
                return Subscription::empty();
            }
            src.observers.push((key, v));
        }

        let source_cloned = Arc::clone(&self.0);

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                lock(&source_cloned).observers.retain(|(k, _)| *k != key);
            })),
            SubscriptionHandle::Nil,
        )
    }
}

impl<T> Unsubscribeable for ReplaySubjectReceiver<T> {
    fn unsubscribe(self) {
        let mut r = lock(&self.0);
        r.closed = true;
        r.observers.clear();
    }
}

impl<T: Clone> Observer for ReplaySubjectEmitter<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        let mut src = lock(&self.0);
        if src.completed || src.closed {
            return;
        }
        src.store(v.clone());
        for (_, o) in &mut src.observers {
            o.next(v.clone());
        }
    }

    fn error(&mut self, e: Arc<dyn Error + Send + Sync>) {
        let mut src = lock(&self.0);
        if src.completed || src.closed {
            return;
        }
        for (_, o) in &mut src.observers {
            o.error(Arc::clone(&e));
        }
        src.completed = true;
        src.error = Some(e);
        src.observers.clear();
    }

    fn complete(&mut self) {
        let mut src = lock(&self.0);
        if src.completed || src.closed {
            return;
        }
        for (_, o) in &mut src.observers {
            o.complete();
        }
        src.completed = true;
        src.observers.clear();
    }
}

impl<T: Clone + Send + 'static> From<ReplaySubjectEmitter<T>> for Subscriber<T> {
    fn from(mut value: ReplaySubjectEmitter<T>) -> Self {
        let mut vn = value.clone();
        let mut ve = value.clone();
        Subscriber::new(
            move |v| vn.next(v),
            move |e| ve.error(e),
            move || value.complete(),
        )
    }
}

impl<T: Clone + Send + 'static> From<ReplaySubjectReceiver<T>> for Observable<T> {
    fn from(mut value: ReplaySubjectReceiver<T>) -> Self {
        Observable::new(move |subscriber| value.subscribe(subscriber))
    }
}
