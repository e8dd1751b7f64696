use std::num::ParseIntError;

use tokio::task::JoinError;

pub type Result<T> = std::result::Result<T, LabError>;

/// Failures produced by the demo operations.
///
/// None of these reach a screen's state unhandled: the task runner replaces them
/// with a fixed message and streams substitute a fallback value.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("'{token}' is not a valid integer")]
    Parse {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("sum does not fit into a 64-bit integer")]
    SumOverflow,

    #[error("background computation did not finish")]
    Background(#[from] JoinError),

    #[error("{0}")]
    Stream(String),

    #[error("event_bus.value_min ({min}) is greater than event_bus.value_max ({max})")]
    InvalidValueRange { min: i32, max: i32 },
}
