//! Task table data model: identities, records and snapshots

/// Longest task name kept in a record, in bytes
///
/// Matches both the FreeRTOS `configMAX_TASK_NAME_LEN` default and the Linux
/// `comm` limit.
pub const MAX_TASK_NAME_LEN: usize = 16;

/// Stable handle for one task instance
///
/// Handles may be recycled by the scheduler once a task is destroyed.
/// Providers that can tell lifecycles apart put a distinguishing value in
/// `generation` so a recycled handle compares unequal; others leave it at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskIdentity {
    handle: u64,
    generation: u64,
}

impl TaskIdentity {
    /// Identity from a bare scheduler handle
    pub fn new(handle: u64) -> Self {
        Self {
            handle,
            generation: 0,
        }
    }

    /// Identity from a handle plus a lifecycle discriminator
    pub fn with_generation(handle: u64, generation: u64) -> Self {
        Self { handle, generation }
    }

    pub fn handle(&self) -> u64 {
        self.handle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One task as seen at capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub identity: TaskIdentity,
    /// Display name, not unique and never used for matching
    pub name: String,
    /// Cumulative run time in scheduler clock units
    pub cumulative_run_time: u64,
}

impl TaskRecord {
    /// Create a record, truncating the name to [`MAX_TASK_NAME_LEN`] bytes
    pub fn new(identity: TaskIdentity, name: &str, cumulative_run_time: u64) -> Self {
        Self {
            identity,
            name: bounded_name(name),
            cumulative_run_time,
        }
    }
}

fn bounded_name(name: &str) -> String {
    if name.len() <= MAX_TASK_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_TASK_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Point-in-time view of the whole task table
///
/// Owned and immutable once captured; two snapshots never share state with
/// each other or with the live table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<TaskRecord>,
    total_run_time: u64,
}

impl Snapshot {
    pub fn new(records: Vec<TaskRecord>, total_run_time: u64) -> Self {
        Self {
            records,
            total_run_time,
        }
    }

    /// Records in provider enumeration order
    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    /// Scheduler-wide cumulative clock reading at capture time
    pub fn total_run_time(&self) -> u64 {
        self.total_run_time
    }

    pub fn task_count(&self) -> usize {
        self.records.len()
    }
}
