//! Error taxonomy for a single `estimate` call
//!
//! Every variant is fatal for the call that produced it. None of them is
//! retried internally; the caller may run the whole estimate again.

use thiserror::Error;

/// Errors that can occur while estimating per-task CPU share
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimatorError {
    /// The snapshot record buffer could not be reserved
    #[error("Failed to allocate snapshot buffer for {capacity} task records")]
    AllocationFailed { capacity: usize },

    /// The provider captured zero tasks
    #[error("Task table provider captured no tasks")]
    EmptySnapshot,

    /// More tasks were live than the snapshot buffer could hold
    #[error("Task table outgrew the snapshot buffer of {capacity} records")]
    SnapshotOverflow { capacity: usize },

    /// The scheduler clock did not advance between the two snapshots
    #[error("Scheduler clock did not advance between snapshots (wait interval too short?)")]
    NoElapsedTime,

    /// The provider could not read the task table at all
    #[error("Task table provider failed: {0}")]
    Provider(String),
}

impl From<std::io::Error> for EstimatorError {
    fn from(err: std::io::Error) -> Self {
        EstimatorError::Provider(err.to_string())
    }
}

/// Result type for estimator operations
pub type Result<T> = std::result::Result<T, EstimatorError>;
