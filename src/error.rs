//! Error types for the transform log.

use crate::log::Operation;
use crate::types::TransformId;
use thiserror::Error;

/// Main error type for log operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError<T = TransformId> {
    #[error("Transform not logged: {0:?}")]
    UnknownEntry(T),

    #[error(
        "Relative position {relative_position} out of range for {operation}: \
         target {target} not in [{min}, {max}]"
    )]
    PositionOutOfRange {
        operation: Operation,
        relative_position: isize,
        target: isize,
        min: isize,
        max: isize,
    },
}

impl<T> LogError<T> {
    /// True if the resolved target fell below the valid range.
    pub fn is_too_low(&self) -> bool {
        matches!(self, LogError::PositionOutOfRange { target, min, .. } if target < min)
    }

    /// True if the resolved target fell above the valid range.
    pub fn is_too_high(&self) -> bool {
        matches!(self, LogError::PositionOutOfRange { target, max, .. } if target > max)
    }
}

/// Returned when an event name is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown event kind: {0}")]
pub struct ParseEventKindError(pub String);

/// Error loading a [`LogConfig`](crate::types::LogConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for log operations.
pub type Result<R, T = TransformId> = std::result::Result<R, LogError<T>>;
