//! Long-running suspending operations with a busy indicator.

use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use crate::{config::TaskRunnerConfig, lock, LabError, Result, Scope, TaskHandle};

/// Shown instead of a sum when the input cannot be added up.
pub const SUM_FAILURE_MESSAGE: &str = "Failed to calculate the sum";

/// State of the operation currently shown by the task runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingOperation {
    pub is_running: bool,
    pub result: Option<String>,
}

impl PendingOperation {
    /// Marks the start of a run and clears the previous result. Returns `false`
    /// if an operation is already running.
    fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        self.result = None;
        true
    }
}

// Clears the busy flag on every exit path of a run, cancellation included.
struct BusyGuard(Arc<Mutex<PendingOperation>>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        lock(&self.0).is_running = false;
    }
}

/// Suspends for `duration` and reports how long it took.
pub async fn simulate_long_operation(duration: Duration) -> String {
    tokio::time::sleep(duration).await;
    format!("Operation completed in {} ms", duration.as_millis())
}

/// Parses whitespace-separated integers.
///
/// Blank input is a single empty token and therefore fails to parse.
pub fn parse_numbers(text: &str) -> Result<Vec<i64>> {
    let text = text.trim();
    let tokens: Vec<&str> = if text.is_empty() {
        vec![text]
    } else {
        text.split_whitespace().collect()
    };

    tokens
        .into_iter()
        .map(|token| {
            token.parse::<i64>().map_err(|source| LabError::Parse {
                token: token.to_string(),
                source,
            })
        })
        .collect()
}

/// Sums `numbers` on a separate task after waiting `delay`.
///
/// The computation task is aborted if the returned future is dropped.
pub async fn calculate_sum(numbers: Vec<i64>, delay: Duration) -> Result<i64> {
    let computation = AbortOnDropHandle::new(tokio::task::spawn(async move {
        tokio::time::sleep(delay).await;
        numbers.iter().try_fold(0i64, |acc, n| acc.checked_add(*n))
    }));

    computation.await?.ok_or(LabError::SumOverflow)
}

/// Runs one operation at a time and exposes its progress as a
/// [`PendingOperation`].
pub struct TaskRunner {
    scope: Scope,
    config: TaskRunnerConfig,
    state: Arc<Mutex<PendingOperation>>,
    current: Mutex<Option<TaskHandle>>,
}

impl TaskRunner {
    pub fn new(scope: Scope, config: TaskRunnerConfig) -> Self {
        Self {
            scope,
            config,
            state: Arc::new(Mutex::new(PendingOperation::default())),
            current: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PendingOperation {
        lock(&self.state).clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).is_running
    }

    /// Starts the delayed-message operation with the configured duration.
    pub fn run_long_operation(&self) -> bool {
        self.run_delayed_message(self.config.operation())
    }

    /// Starts an operation that completes after `duration`.
    ///
    /// Returns `false` without doing anything while another operation runs or
    /// once the runner is disposed.
    pub fn run_delayed_message(&self, duration: Duration) -> bool {
        self.launch("delayed message", simulate_long_operation(duration))
    }

    /// Starts summing the integers in `text`.
    ///
    /// Returns `false` without doing anything while another operation runs or
    /// once the runner is disposed. A malformed input ends the run with
    /// [`SUM_FAILURE_MESSAGE`].
    pub fn run_sum(&self, text: &str) -> bool {
        let text = text.to_string();
        let delay = self.config.sum_delay();

        self.launch("sum", async move {
            let sum = match parse_numbers(&text) {
                Ok(numbers) => calculate_sum(numbers, delay).await,
                Err(e) => Err(e),
            };
            match sum {
                Ok(sum) => format!("Sum of numbers: {}", sum),
                Err(e) => {
                    warn!(error = %e, input = %text, "sum failed");
                    SUM_FAILURE_MESSAGE.to_string()
                }
            }
        })
    }

    fn launch<F>(&self, name: &'static str, work: F) -> bool
    where
        F: Future<Output = String> + Send + 'static,
    {
        if self.scope.is_disposed() {
            debug!(operation = name, "runner disposed, ignoring");
            return false;
        }
        if !lock(&self.state).start() {
            debug!(operation = name, "operation already running, ignoring");
            return false;
        }
        info!(operation = name, "operation started");

        // Owned by the task so that it drops even if the task never runs.
        let busy = BusyGuard(Arc::clone(&self.state));
        let state = Arc::clone(&self.state);

        let handle = self.scope.launch(async move {
            let _busy = busy;
            let result = work.await;
            debug!(operation = name, %result, "operation finished");
            lock(&state).result = Some(result);
        });
        *lock(&self.current) = Some(handle);
        true
    }

    /// Waits for the operation in flight, if any.
    pub async fn wait(&self) {
        let handle = lock(&self.current).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.join().await {
                warn!(error = %e, "operation task failed");
            }
        }
    }

    pub fn dispose(&self) {
        self.scope.dispose();
    }
}
