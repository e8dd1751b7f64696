//! A multicast event stream with replay, fed by manual and generated events.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use rand::Rng;
use tracing::{debug, info};

use crate::{
    config::EventBusConfig,
    lock,
    subjects::{BufSize, ReplaySubject, ReplaySubjectEmitter, ReplaySubjectReceiver},
    subscribe::{Subscriber, Subscription},
    Observer, Result, Scope, Subscribeable, TaskHandle,
};

/// Commands accepted by [`EventBus::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCommand {
    EmitManual,
    StartAutoGeneration,
    StopAutoGeneration,
}

/// The most recent events seen by the screen plus a running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<String>,
    capacity: usize,
    total: u64,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// Appends `event`, evicting the oldest entry once the log is full.
    pub fn record(&mut self, event: String) {
        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Kept events, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Kept events, newest first, the way they are listed on screen.
    pub fn newest_first(&self) -> Vec<String> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of events ever recorded, including evicted ones.
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Hot event stream replaying its last events to late subscribers.
pub struct EventBus {
    scope: Scope,
    config: EventBusConfig,
    emitter: ReplaySubjectEmitter<String>,
    receiver: ReplaySubjectReceiver<String>,
    log: Arc<Mutex<EventLog>>,
    manual_seq: AtomicU64,
    auto_seq: Arc<AtomicU64>,
    auto: Mutex<Option<TaskHandle>>,
}

impl EventBus {
    /// Creates the bus and attaches the screen's own log observer.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::InvalidValueRange`](crate::LabError::InvalidValueRange)
    /// if `config.value_min` is greater than `config.value_max`.
    pub fn new(scope: Scope, config: EventBusConfig) -> Result<Self> {
        config.validate()?;
        let (emitter, mut receiver) =
            ReplaySubject::emitter_receiver(BufSize::Bounded(config.replay));
        let log = Arc::new(Mutex::new(EventLog::with_capacity(config.log_capacity)));

        let log_n = Arc::clone(&log);
        receiver.subscribe(Subscriber::on_next(move |event: String| {
            lock(&log_n).record(event);
        }));

        Ok(Self {
            scope,
            config,
            emitter,
            receiver,
            log,
            manual_seq: AtomicU64::new(0),
            auto_seq: Arc::new(AtomicU64::new(0)),
            auto: Mutex::new(None),
        })
    }

    /// Emits a manual event right away and returns it.
    pub fn emit_manual(&self) -> String {
        let n = self.manual_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let event = format!("Manual event #{}", n);
        debug!(%event, "manual emission");
        self.emitter.clone().next(event.clone());
        event
    }

    /// Starts emitting a random event every configured interval.
    ///
    /// Returns `false` and changes nothing if generation is already running.
    pub fn start_auto_generation(&self) -> bool {
        if self.scope.is_disposed() {
            return false;
        }
        let mut auto = lock(&self.auto);
        if auto.as_ref().is_some_and(TaskHandle::is_active) {
            debug!("auto-generation already running");
            return false;
        }

        let mut emitter = self.emitter.clone();
        let seq = Arc::clone(&self.auto_seq);
        let interval = self.config.auto_interval();
        let range = self.config.value_min..=self.config.value_max;

        *auto = Some(self.scope.launch(async move {
            loop {
                tokio::time::sleep(interval).await;
                let n = seq.fetch_add(1, Ordering::Relaxed) + 1;
                let value = rand::rng().random_range(range.clone());
                emitter.next(format!("Auto event #{}: {}", n, value));
            }
        }));
        info!(interval_ms = interval.as_millis() as u64, "auto-generation started");
        true
    }

    /// Stops auto-generation. Returns `false` if it was not running.
    pub fn stop_auto_generation(&self) -> bool {
        match lock(&self.auto).take() {
            Some(handle) => {
                handle.cancel();
                info!("auto-generation stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_auto_generating(&self) -> bool {
        lock(&self.auto).as_ref().is_some_and(TaskHandle::is_active)
    }

    /// Attaches an observer; it first receives the replayed events.
    ///
    /// Observers run while the bus is locked. An observer must not call back
    /// into this bus or its [`receiver`](EventBus::receiver); doing so
    /// deadlocks. Forward events elsewhere and read the bus afterwards.
    pub fn subscribe(&self, subscriber: Subscriber<String>) -> Subscription {
        self.receiver.clone().subscribe(subscriber)
    }

    /// Receiving side of the bus, usable with every observable operator.
    pub fn receiver(&self) -> ReplaySubjectReceiver<String> {
        self.receiver.clone()
    }

    pub fn log(&self) -> EventLog {
        lock(&self.log).clone()
    }

    pub fn handle(&self, command: EventCommand) {
        debug!(?command, "event bus command");
        match command {
            EventCommand::EmitManual => {
                self.emit_manual();
            }
            EventCommand::StartAutoGeneration => {
                self.start_auto_generation();
            }
            EventCommand::StopAutoGeneration => {
                self.stop_auto_generation();
            }
        }
    }

    /// Stops auto-generation and completes the event stream.
    pub fn dispose(&self) {
        self.scope.dispose();
        *lock(&self.auto) = None;
        self.emitter.clone().complete();
    }
}
