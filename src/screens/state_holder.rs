//! A counter behind a latest-value subject.

use std::sync::Mutex;

use tracing::{debug, info};

use crate::{
    config::StateHolderConfig,
    lock,
    subjects::{BehaviorSubject, BehaviorSubjectEmitter, BehaviorSubjectReceiver},
    subscribe::{Subscriber, Subscription},
    Observer, Scope, Subscribeable, TaskHandle,
};

/// Commands accepted by [`StateHolder::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterCommand {
    Increment,
    Decrement,
    Reset,
    Add(i64),
    ToggleAutoIncrement,
}

/// Integer counter observable as a hot stream.
///
/// Observers attached through [`subscribe`](StateHolder::subscribe) receive the
/// current value at once and every change after it. At most one auto-increment
/// loop runs at a time.
pub struct StateHolder {
    scope: Scope,
    config: StateHolderConfig,
    emitter: BehaviorSubjectEmitter<i64>,
    receiver: BehaviorSubjectReceiver<i64>,
    auto: Mutex<Option<TaskHandle>>,
}

impl StateHolder {
    pub fn new(scope: Scope, config: StateHolderConfig) -> Self {
        let (emitter, receiver) = BehaviorSubject::emitter_receiver(0);
        Self {
            scope,
            config,
            emitter,
            receiver,
            auto: Mutex::new(None),
        }
    }

    pub fn value(&self) -> i64 {
        self.emitter.value()
    }

    pub fn increment(&self) {
        self.add(1);
    }

    pub fn decrement(&self) {
        self.add(-1);
    }

    pub fn reset(&self) {
        self.emitter.update(|_| 0);
    }

    pub fn add(&self, amount: i64) {
        self.emitter.update(|v| v.wrapping_add(amount));
    }

    /// Starts the auto-increment loop, or stops it if it is running. Returns
    /// whether the loop is running afterwards.
    pub fn toggle_auto_increment(&self) -> bool {
        if self.scope.is_disposed() {
            return false;
        }
        let mut auto = lock(&self.auto);

        if let Some(handle) = auto.take() {
            if handle.is_active() {
                handle.cancel();
                info!("auto-increment stopped");
                return false;
            }
        }

        let emitter = self.emitter.clone();
        let interval = self.config.auto_increment_interval();
        *auto = Some(self.scope.launch(async move {
            loop {
                tokio::time::sleep(interval).await;
                emitter.update(|v| v.wrapping_add(1));
                debug!(value = emitter.value(), "auto-incremented");
            }
        }));
        info!(interval_ms = interval.as_millis() as u64, "auto-increment started");
        true
    }

    pub fn is_auto_incrementing(&self) -> bool {
        lock(&self.auto).as_ref().is_some_and(TaskHandle::is_active)
    }

    /// Attaches an observer; it receives the current value immediately.
    ///
    /// Observers run while the counter is locked. An observer must not call
    /// back into this holder or its [`receiver`](StateHolder::receiver), so
    /// `value()` inside an observer deadlocks; use the value it is handed.
    pub fn subscribe(&self, subscriber: Subscriber<i64>) -> Subscription {
        self.receiver.clone().subscribe(subscriber)
    }

    /// Receiving side of the counter, usable with every observable operator.
    pub fn receiver(&self) -> BehaviorSubjectReceiver<i64> {
        self.receiver.clone()
    }

    pub fn handle(&self, command: CounterCommand) {
        debug!(?command, "counter command");
        match command {
            CounterCommand::Increment => self.increment(),
            CounterCommand::Decrement => self.decrement(),
            CounterCommand::Reset => self.reset(),
            CounterCommand::Add(amount) => self.add(amount),
            CounterCommand::ToggleAutoIncrement => {
                self.toggle_auto_increment();
            }
        }
    }

    /// Stops the auto-increment loop and completes the counter stream.
    pub fn dispose(&self) {
        self.scope.dispose();
        *lock(&self.auto) = None;
        self.emitter.clone().complete();
    }
}
