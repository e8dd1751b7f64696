use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    observer::Observer,
    subscription::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
};

use super::Observable;

/// Creates an observable whose producer runs as a Tokio task.
///
/// `producer` is called once per subscription with the `Subscriber` and returns
/// the future that emits into it. The future is spawned immediately, so the
/// observable must be subscribed from within a Tokio runtime. Unsubscribing
/// drops the future at its next await point; no further signals reach the
/// subscriber after that.
pub fn from_task<T, F, Fut>(producer: F) -> Observable<T>
where
    T: 'static,
    F: Fn(Subscriber<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Observable::new(move |subscriber| {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let emissions = producer(subscriber);

        let join_handle = tokio::task::spawn(async move {
            tokio::select! {
                biased;

                () = cancelled.cancelled() => {
                    tracing::trace!("producer task unsubscribed");
                }
                () = emissions => {}
            }
        });

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || token.cancel())),
            SubscriptionHandle::JoinTask(join_handle),
        )
    })
}

/// Emits `values` in order, waiting `period` before each emission, then
/// completes.
pub fn delayed_sequence<T>(values: Vec<T>, period: Duration) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    from_task(move |mut o: Subscriber<T>| {
        let values = values.clone();
        async move {
            for v in values {
                tokio::time::sleep(period).await;
                o.next(v);
            }
            o.complete();
        }
    })
}
