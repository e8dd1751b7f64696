use std::{
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

/// A latest-value cell: a `Subject` that always holds a current value.
///
/// Every new subscriber immediately receives the current value, then each
/// subsequent value synchronously as it is emitted. Emitting with no
/// subscribers still replaces the current value.
///
/// After `complete` or `error` the value is frozen and new subscribers only
/// receive the terminal signal.
///
/// ```no_run
/// use rxlab::subjects::BehaviorSubject;
/// use rxlab::subscribe::Subscriber;
/// use rxlab::{Observer, Subscribeable};
///
/// let (mut emitter, mut receiver) = BehaviorSubject::emitter_receiver(0);
///
/// emitter.next(1);
///
/// // Receives 1 right away, then 2.
/// receiver.subscribe(Subscriber::on_next(|v| println!("counter {}", v)));
/// emitter.update(|v| v + 1);
///
/// assert_eq!(emitter.value(), 2);
/// ```
pub struct BehaviorSubject<T> {
    value: T,
    observers: Vec<(u64, Subscriber<T>)>,
    completed: bool,
    closed: bool,
    error: Option<Arc<dyn Error + Send + Sync>>,
}

impl<T: Send + 'static> BehaviorSubject<T> {
    /// Creates a `BehaviorSubject` holding `value`.
    ///
    /// Returns a `BehaviorSubjectEmitter` for emitting values and a
    /// `BehaviorSubjectReceiver` for subscribing to them.
    pub fn emitter_receiver(value: T) -> (BehaviorSubjectEmitter<T>, BehaviorSubjectReceiver<T>) {
        let s = Arc::new(Mutex::new(BehaviorSubject {
            value,
            observers: Vec::with_capacity(16),
            completed: false,
            closed: false,
            error: None,
        }));

        (
            BehaviorSubjectEmitter(Arc::clone(&s)),
            BehaviorSubjectReceiver(Arc::clone(&s)),
        )
    }
}

impl<T: Clone> BehaviorSubject<T> {
    fn store_and_emit(&mut self, v: T) {
        self.value = v;
        for (_, o) in &mut self.observers {
            o.next(self.value.clone());
        }
    }
}

/// Subscription handler for `BehaviorSubject`.
#[derive(Clone)]
pub struct BehaviorSubjectReceiver<T>(Arc<Mutex<BehaviorSubject<T>>>);

/// Emitting side of `BehaviorSubject`.
#[derive(Clone)]
pub struct BehaviorSubjectEmitter<T>(Arc<Mutex<BehaviorSubject<T>>>);

impl<T> BehaviorSubjectReceiver<T> {
    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        lock(&self.0).observers.len()
    }

    /// Returns `true` if no observers are registered, `false` otherwise.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> BehaviorSubjectReceiver<T> {
    /// Returns the current value.
    pub fn value(&self) -> T {
        lock(&self.0).value.clone()
    }
}

impl<T: Clone> BehaviorSubjectEmitter<T> {
    /// Returns the current value.
    pub fn value(&self) -> T {
        lock(&self.0).value.clone()
    }

    /// Replaces the current value with `f(current)` and emits the result.
    ///
    /// Reading and writing happen under one lock, so concurrent updates never
    /// lose an increment. Does nothing once the subject is stopped.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let mut src = lock(&self.0);
        if src.completed || src.closed {
            return;
        }
        let v = f(&src.value);
        src.store_and_emit(v);
    }
}

impl<T: Clone + Send + 'static> Subscribeable for BehaviorSubjectReceiver<T> {
    type ObsType = T;

    fn subscribe(&mut self, mut v: Subscriber<Self::ObsType>) -> Subscription {
        let key = super::next_key();

        {
            let mut src = lock(&self.0);
            if src.closed {
                return Subscription::empty();
            }
            // A stopped subject only replays its terminal signal.
            if src.completed {
                if let Some(err) = &src.error {
                    v.error(Arc::clone(err));
                } else {
                    v.complete();
                }
                return Subscription::empty();
            }
            v.next(src.value.clone());
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

impl<T> Unsubscribeable for BehaviorSubjectReceiver<T> {
    fn unsubscribe(self) {
        let mut r = lock(&self.0);
        r.closed = true;
        r.observers.clear();
    }
}

impl<T: Clone> Observer for BehaviorSubjectEmitter<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        let mut src = lock(&self.0);
        if src.completed || src.closed {
            return;
        }
        src.store_and_emit(v);
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

impl<T: Clone + Send + 'static> From<BehaviorSubjectEmitter<T>> for Subscriber<T> {
    fn from(mut value: BehaviorSubjectEmitter<T>) -> Self {
        let mut vn = value.clone();
        let mut ve = value.clone();
        Subscriber::new(
            move |v| vn.next(v),
            move |e| ve.error(e),
            move || value.complete(),
        )
    }
}

impl<T: Clone + Send + 'static> From<BehaviorSubjectReceiver<T>> for Observable<T> {
    fn from(mut value: BehaviorSubjectReceiver<T>) -> Self {
        Observable::new(move |subscriber| value.subscribe(subscriber))
    }
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use crate::{
        observer::Observer, subjects::BehaviorSubject, subscribe::Subscriber, Subscribeable,
        Unsubscribeable,
    };

    fn recording_subscriber() -> (Subscriber<i32>, Arc<Mutex<Vec<i32>>>) {
        let nexts = Arc::new(Mutex::new(Vec::new()));
        let nexts_c = Arc::clone(&nexts);
        (
            Subscriber::on_next(move |n| nexts_c.lock().unwrap().push(n)),
            nexts,
        )
    }

    #[test]
    fn late_subscriber_sees_latest_value_only() {
        let (mut stx, mut srx) = BehaviorSubject::emitter_receiver(0);

        stx.next(1);
        stx.next(2);

        let (s, nexts) = recording_subscriber();
        srx.subscribe(s);
        stx.next(3);

        assert_eq!(*nexts.lock().unwrap(), vec![2, 3]);
        assert_eq!(srx.value(), 3);
    }

    #[test]
    fn update_reads_and_writes_current_value() {
        let (stx, mut srx) = BehaviorSubject::emitter_receiver(10);
        let (s, nexts) = recording_subscriber();
        srx.subscribe(s);

        stx.update(|v| v + 5);
        stx.update(|v| v * 2);

        assert_eq!(*nexts.lock().unwrap(), vec![10, 15, 30]);
        assert_eq!(stx.value(), 30);
    }

    #[test]
    fn unsubscribing_one_observer_keeps_the_others() {
        let (mut stx, mut srx) = BehaviorSubject::emitter_receiver(0);
        let (a, a_nexts) = recording_subscriber();
        let (b, b_nexts) = recording_subscriber();

        let a_subscription = srx.subscribe(a);
        srx.subscribe(b);
        assert_eq!(srx.len(), 2);

        a_subscription.unsubscribe();
        stx.next(7);

        assert_eq!(srx.len(), 1);
        assert_eq!(*a_nexts.lock().unwrap(), vec![0]);
        assert_eq!(*b_nexts.lock().unwrap(), vec![0, 7]);
    }

    #[test]
    fn closed_receiver_rejects_subscribers_and_updates() {
        let (stx, srx) = BehaviorSubject::emitter_receiver(1);
        let mut srx_c = srx.clone();

        srx.unsubscribe();
        let (s, nexts) = recording_subscriber();
        srx_c.subscribe(s);
        stx.update(|v| v + 1);

        assert!(nexts.lock().unwrap().is_empty());
        assert_eq!(stx.value(), 1);
    }
}
