//! Configuration data model.
//!
//! Every field has a default, so an empty file or no file at all yields the
//! stock timings of the demos.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::LabError;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    #[serde(default)]
    pub task_runner: TaskRunnerConfig,
    #[serde(default)]
    pub streams: StreamsConfig,
    #[serde(default)]
    pub state_holder: StateHolderConfig,
    #[serde(default)]
    pub event_bus: EventBusConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRunnerConfig {
    /// Duration of the delayed-message operation.
    #[serde(default = "default_operation_ms")]
    pub operation_ms: u64,
    /// Delay of the background sum computation.
    #[serde(default = "default_sum_delay_ms")]
    pub sum_delay_ms: u64,
}

impl Default for TaskRunnerConfig {
    fn default() -> Self {
        Self {
            operation_ms: default_operation_ms(),
            sum_delay_ms: default_sum_delay_ms(),
        }
    }
}

impl TaskRunnerConfig {
    pub fn operation(&self) -> Duration {
        Duration::from_millis(self.operation_ms)
    }

    pub fn sum_delay(&self) -> Duration {
        Duration::from_millis(self.sum_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamsConfig {
    /// Delay before each stream emission.
    #[serde(default = "default_emit_interval_ms")]
    pub emit_interval_ms: u64,
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            emit_interval_ms: default_emit_interval_ms(),
        }
    }
}

impl StreamsConfig {
    pub fn emit_interval(&self) -> Duration {
        Duration::from_millis(self.emit_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateHolderConfig {
    #[serde(default = "default_auto_increment_ms")]
    pub auto_increment_ms: u64,
}

impl Default for StateHolderConfig {
    fn default() -> Self {
        Self {
            auto_increment_ms: default_auto_increment_ms(),
        }
    }
}

impl StateHolderConfig {
    pub fn auto_increment_interval(&self) -> Duration {
        Duration::from_millis(self.auto_increment_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Number of events replayed to a late subscriber.
    #[serde(default = "default_replay")]
    pub replay: usize,
    /// Number of events kept in the screen's visible log.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    #[serde(default = "default_auto_interval_ms")]
    pub auto_interval_ms: u64,
    /// Inclusive lower bound of generated values.
    #[serde(default = "default_value_min")]
    pub value_min: i32,
    /// Inclusive upper bound of generated values.
    #[serde(default = "default_value_max")]
    pub value_max: i32,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            replay: default_replay(),
            log_capacity: default_log_capacity(),
            auto_interval_ms: default_auto_interval_ms(),
            value_min: default_value_min(),
            value_max: default_value_max(),
        }
    }
}

impl EventBusConfig {
    pub fn auto_interval(&self) -> Duration {
        Duration::from_millis(self.auto_interval_ms)
    }

    /// Rejects an empty range of generated values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.value_min > self.value_max {
            return Err(LabError::InvalidValueRange {
                min: self.value_min,
                max: self.value_max,
            });
        }
        Ok(())
    }
}

fn default_operation_ms() -> u64 {
    2000
}

fn default_sum_delay_ms() -> u64 {
    1000
}

fn default_emit_interval_ms() -> u64 {
    500
}

fn default_auto_increment_ms() -> u64 {
    1000
}

fn default_replay() -> usize {
    3
}

fn default_log_capacity() -> usize {
    10
}

fn default_auto_interval_ms() -> u64 {
    2000
}

fn default_value_min() -> i32 {
    1
}

fn default_value_max() -> i32 {
    100
}
