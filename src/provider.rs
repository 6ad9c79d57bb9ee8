//! Collaborator interfaces consumed by the estimator
//!
//! The estimator never touches a live task table directly. It asks a
//! [`TaskTableProvider`] for point-in-time enumerations and a
//! [`TimerProvider`] to let the scheduler run in between.

use std::collections::VecDeque;

use crate::error::{EstimatorError, Result};
use crate::task::TaskRecord;

/// Result of one enumeration of the task table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemState {
    /// Number of records written into the buffer
    pub task_count: usize,
    /// Scheduler-wide cumulative clock reading at capture time
    pub total_run_time: u64,
}

/// Read-only, point-in-time access to the scheduler's task table
pub trait TaskTableProvider {
    /// Current number of live tasks, used to size the capture buffer
    fn task_count(&mut self) -> Result<usize>;

    /// Enumerate live tasks into `buffer`, writing at most `capacity` records
    ///
    /// The enumeration must be internally consistent. It may under-fill the
    /// buffer when tasks disappear between [`task_count`](Self::task_count)
    /// and this call. When more than `capacity` tasks are live it must fail
    /// with [`EstimatorError::SnapshotOverflow`] rather than return a subset.
    fn capture_into(
        &mut self,
        buffer: &mut Vec<TaskRecord>,
        capacity: usize,
    ) -> Result<SystemState>;
}

/// Suspends the caller while the scheduler runs other tasks
pub trait TimerProvider {
    /// Block for `ticks` scheduler ticks; `0` returns immediately
    fn wait(&mut self, ticks: u32);
}

/// One scripted view of the task table
#[derive(Debug, Clone)]
pub struct Frame {
    pub records: Vec<TaskRecord>,
    pub total_run_time: u64,
    /// Count reported by `task_count`, when it should differ from `records.len()`
    pub reported_count: Option<usize>,
}

impl Frame {
    pub fn new(records: Vec<TaskRecord>, total_run_time: u64) -> Self {
        Self {
            records,
            total_run_time,
            reported_count: None,
        }
    }

    /// Make `task_count` report `count` instead of the real record count
    pub fn reporting(mut self, count: usize) -> Self {
        self.reported_count = Some(count);
        self
    }
}

/// Deterministic provider that replays a fixed sequence of frames
///
/// Each `capture_into` consumes the next frame, so the tables seen by the
/// first and second capture can differ just as a live scheduler's would.
#[derive(Debug, Default)]
pub struct ScriptedTaskTable {
    frames: VecDeque<Frame>,
    captures: usize,
}

impl ScriptedTaskTable {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            captures: 0,
        }
    }

    /// Number of captures served so far
    pub fn captures(&self) -> usize {
        self.captures
    }

    fn current(&self) -> Result<&Frame> {
        self.frames
            .front()
            .ok_or_else(|| EstimatorError::Provider("scripted task table exhausted".to_string()))
    }
}

impl TaskTableProvider for ScriptedTaskTable {
    fn task_count(&mut self) -> Result<usize> {
        let frame = self.current()?;
        Ok(frame.reported_count.unwrap_or(frame.records.len()))
    }

    fn capture_into(
        &mut self,
        buffer: &mut Vec<TaskRecord>,
        capacity: usize,
    ) -> Result<SystemState> {
        let frame = self
            .frames
            .pop_front()
            .ok_or_else(|| EstimatorError::Provider("scripted task table exhausted".to_string()))?;
        self.captures += 1;

        if frame.records.len() > capacity {
            return Err(EstimatorError::SnapshotOverflow { capacity });
        }
        buffer.extend(frame.records);
        Ok(SystemState {
            task_count: buffer.len(),
            total_run_time: frame.total_run_time,
        })
    }
}
