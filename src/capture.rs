//! Snapshot capture
//!
//! The buffer is sized from the provider's current task count plus a slack
//! margin, so tasks created between the count query and the enumeration do
//! not overflow it. A table that still outgrows the buffer fails the capture
//! with [`EstimatorError::SnapshotOverflow`]; a partial snapshot would show
//! the missing tail as created or deleted tasks. The buffer is an owned
//! `Vec`: it is released on every return path, success or error.

use crate::error::{EstimatorError, Result};
use crate::provider::TaskTableProvider;
use crate::task::Snapshot;

/// Extra buffer slots beyond the reported task count
pub const DEFAULT_SNAPSHOT_SLACK: usize = 5;

/// Capture one snapshot of every live task
pub fn capture_snapshot<P>(provider: &mut P, slack: usize) -> Result<Snapshot>
where
    P: TaskTableProvider + ?Sized,
{
    let reported = provider.task_count()?;
    let capacity = reported
        .checked_add(slack)
        .ok_or(EstimatorError::AllocationFailed { capacity: usize::MAX })?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| EstimatorError::AllocationFailed { capacity })?;

    let state = provider.capture_into(&mut buffer, capacity)?;

    if buffer.len() > capacity {
        tracing::warn!(
            "provider wrote {} records into a buffer of {}",
            buffer.len(),
            capacity
        );
        return Err(EstimatorError::SnapshotOverflow { capacity });
    }
    if state.task_count < buffer.len() {
        buffer.truncate(state.task_count);
    }

    if buffer.is_empty() {
        return Err(EstimatorError::EmptySnapshot);
    }

    tracing::debug!(
        "captured {} of {} expected tasks (capacity {}), total run time {}",
        buffer.len(),
        reported,
        capacity,
        state.total_run_time
    );

    Ok(Snapshot::new(buffer, state.total_run_time))
}
