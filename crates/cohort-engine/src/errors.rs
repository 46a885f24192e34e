use chrono::NaiveTime;
use thiserror::Error;

/// Errors raised by the pure scheduling logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A session must start strictly before it ends.
    #[error("Start time {start} must be before end time {end}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },
}
