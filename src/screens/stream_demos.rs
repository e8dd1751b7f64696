//! Cold stream demos: a delayed counter, a transformed derivative and a stream
//! that recovers from a failure.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::{
    config::StreamsConfig, delayed_sequence, from_task, lock, subscribe::Subscriber, LabError,
    Observable, ObservableExt, Observer, Scope, Subscribeable, TaskHandle,
};

/// Emits 1 to 10, waiting `period` before each value.
pub fn number_stream(period: Duration) -> Observable<i32> {
    delayed_sequence((1..=10).collect(), period)
}

/// Squares every value and keeps the even results.
pub fn transform<O>(stream: O) -> Observable<i32>
where
    O: Subscribeable<ObsType = i32> + Send + Sync + 'static,
{
    stream.map(|v| v * v).filter(|v| v % 2 == 0)
}

/// Emits two values, waiting `period` before each, then fails.
pub fn failing_stream(period: Duration) -> Observable<String> {
    from_task(move |mut o: Subscriber<String>| async move {
        tokio::time::sleep(period).await;
        o.next("First value".to_string());
        tokio::time::sleep(period).await;
        o.next("Second value".to_string());
        o.error(Arc::new(LabError::Stream("Stream failure".to_string())));
    })
}

/// [`failing_stream`] with its failure replaced by a final fallback value.
///
/// Always yields exactly three values and completes normally.
pub fn error_stream(period: Duration) -> Observable<String> {
    failing_stream(period).catch_and_substitute(|e| format!("Caught error: {}", e))
}

/// Which stream a run collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Numbers,
    Transformed,
    Errors,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Numbers => write!(f, "numbers"),
            StreamKind::Transformed => write!(f, "transformed"),
            StreamKind::Errors => write!(f, "errors"),
        }
    }
}

#[derive(Debug, Default)]
struct RunLog {
    run: u64,
    entries: Vec<String>,
    completed: bool,
}

/// Collects one stream at a time into a display log.
///
/// Starting a run cancels the run in flight and clears the log, so values of
/// two runs never interleave.
pub struct StreamDemos {
    scope: Scope,
    config: StreamsConfig,
    log: Arc<Mutex<RunLog>>,
    current: Mutex<Option<TaskHandle>>,
}

impl StreamDemos {
    pub fn new(scope: Scope, config: StreamsConfig) -> Self {
        Self {
            scope,
            config,
            log: Arc::new(Mutex::new(RunLog::default())),
            current: Mutex::new(None),
        }
    }

    fn observable(&self, kind: StreamKind) -> Observable<String> {
        let period = self.config.emit_interval();
        match kind {
            StreamKind::Numbers => number_stream(period).map(|v| v.to_string()),
            StreamKind::Transformed => transform(number_stream(period)).map(|v| v.to_string()),
            StreamKind::Errors => error_stream(period),
        }
    }

    /// Starts collecting the stream of `kind`.
    ///
    /// A run already in flight is cancelled first: its source is unsubscribed
    /// and the log is cleared, so the log only ever holds values of the latest
    /// run.
    pub fn run(&self, kind: StreamKind) {
        let mut current = lock(&self.current);
        if let Some(previous) = current.take() {
            previous.cancel();
        }

        let run = {
            let mut log = lock(&self.log);
            log.run += 1;
            log.entries.clear();
            log.completed = false;
            log.run
        };
        info!(%kind, run, "stream run started");

        let log_n = Arc::clone(&self.log);
        let log_e = Arc::clone(&self.log);
        let log_c = Arc::clone(&self.log);
        let subscriber = Subscriber::new(
            move |v: String| {
                let mut log = lock(&log_n);
                if log.run == run {
                    log.entries.push(v);
                }
            },
            move |e| {
                // Only reachable for sources without a catch stage.
                warn!(error = %e, run, "stream run failed");
                let mut log = lock(&log_e);
                if log.run == run {
                    log.completed = true;
                }
            },
            move || {
                let mut log = lock(&log_c);
                if log.run == run {
                    debug!(run, "stream run completed");
                    log.completed = true;
                }
            },
        );

        let subscription = self.observable(kind).subscribe(subscriber);
        *current = Some(self.scope.attach(subscription));
    }

    /// Values collected by the latest run, in emission order.
    pub fn log(&self) -> Vec<String> {
        lock(&self.log).entries.clone()
    }

    /// Returns `true` once the latest run has terminated.
    pub fn is_completed(&self) -> bool {
        lock(&self.log).completed
    }

    /// Waits for the run in flight, if any.
    pub async fn wait(&self) {
        let handle = lock(&self.current).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.join().await {
                warn!(error = %e, "stream run task failed");
            }
        }
    }

    pub fn dispose(&self) {
        self.scope.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demos() -> StreamDemos {
        StreamDemos::new(Scope::new(), StreamsConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn numbers_run_collects_one_to_ten() {
        let demos = demos();
        demos.run(StreamKind::Numbers);
        demos.wait().await;

        let expected: Vec<String> = (1..=10).map(|v| v.to_string()).collect();
        assert_eq!(demos.log(), expected);
        assert!(demos.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn errors_run_ends_with_fallback() {
        let demos = demos();
        demos.run(StreamKind::Errors);
        demos.wait().await;

        assert_eq!(
            demos.log(),
            vec!["First value", "Second value", "Caught error: Stream failure"]
        );
        assert!(demos.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn new_run_replaces_the_one_in_flight() {
        let demos = demos();
        demos.run(StreamKind::Numbers);
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(demos.log(), vec!["1", "2"]);

        demos.run(StreamKind::Transformed);
        demos.wait().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(demos.log(), vec!["4", "16", "36", "64", "100"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_collection() {
        let demos = demos();
        demos.run(StreamKind::Numbers);
        tokio::time::sleep(Duration::from_millis(1700)).await;

        demos.dispose();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(demos.log(), vec!["1", "2", "3"]);
        assert!(!demos.is_completed());
    }
}
