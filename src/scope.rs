//! Structured task group tied to the lifetime of a screen.

use std::future::Future;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::subscription::subscribe::{Subscription, Unsubscribeable};

/// Owner of every background task a screen launches.
///
/// Tasks run on the current Tokio runtime under a child of the scope's
/// cancellation token. [`dispose`](Scope::dispose) cancels all of them, including
/// in-flight delays and endless loops; a task launched after disposal is
/// cancelled before it first runs. Cloning a `Scope` yields another handle to the
/// same group.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `future` into the scope.
    ///
    /// The future is dropped at its next await point once either the returned
    /// handle or the scope is cancelled. Drop guards held by the future still run.
    pub fn launch<F>(&self, future: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.child_token();
        let cancelled = token.clone();

        let join = self.tracker.spawn(async move {
            tokio::select! {
                biased;

                () = cancelled.cancelled() => {
                    tracing::debug!("scope task cancelled");
                }
                () = future => {}
            }
        });

        TaskHandle { token, join }
    }

    /// Ties an observable subscription to the scope.
    ///
    /// The returned task finishes when the source stops emitting. Cancelling it,
    /// or disposing the scope, unsubscribes from the source.
    pub fn attach(&self, mut subscription: Subscription) -> TaskHandle {
        let handle = subscription.take_handle();
        let unsubscribe = UnsubscribeOnDrop(Some(subscription));

        self.launch(async move {
            let _unsubscribe = unsubscribe;
            if let Err(e) = handle.join().await {
                tracing::warn!(error = %e, "attached stream task failed");
            }
        })
    }

    /// Cancels every task in the scope.
    pub fn dispose(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(tasks = self.tracker.len(), "disposing scope");
        }
        self.token.cancel();
        self.tracker.close();
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Number of tasks that have not finished yet.
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every task launched so far has finished.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

struct UnsubscribeOnDrop(Option<Subscription>);

impl Drop for UnsubscribeOnDrop {
    fn drop(&mut self) {
        if let Some(s) = self.0.take() {
            s.unsubscribe();
        }
    }
}

/// Handle to a single task launched into a [`Scope`].
///
/// Dropping the handle detaches the task; it keeps running until it finishes or
/// the scope is disposed.
#[derive(Debug)]
pub struct TaskHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Cancels this task only.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the task ran to completion or observed cancellation.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Returns `true` while the task is neither finished nor cancelled.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.join.is_finished()
    }

    /// Waits for the task to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use tokio::time::{sleep, Duration};

    use super::*;

    fn ticking(scope: &Scope, ticks: &Arc<AtomicUsize>) -> TaskHandle {
        let ticks = Arc::clone(ticks);
        scope.launch(async move {
            loop {
                sleep(Duration::from_millis(100)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_cancels_endless_loops() {
        let scope = Scope::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let a = ticking(&scope, &ticks);
        let b = ticking(&scope, &ticks);

        sleep(Duration::from_millis(350)).await;
        scope.dispose();
        scope.wait().await;

        assert_eq!(ticks.load(Ordering::SeqCst), 6);
        assert!(a.is_finished() && b.is_finished());
        assert_eq!(scope.active_tasks(), 0);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_one_task_leaves_siblings_running() {
        let scope = Scope::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let a = ticking(&scope, &first);
        let _b = ticking(&scope, &second);

        sleep(Duration::from_millis(250)).await;
        a.cancel();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 7);
        assert!(!scope.is_disposed());
        scope.dispose();
    }

    #[tokio::test]
    async fn launch_after_dispose_never_runs() {
        let scope = Scope::new();
        scope.dispose();

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_c = Arc::clone(&ran);
        let handle = scope.launch(async move {
            ran_c.fetch_add(1, Ordering::SeqCst);
        });
        handle.join().await.unwrap();

        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
