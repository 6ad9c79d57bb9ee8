//! rtstats - per-task CPU share from two snapshots of a live task table
//!
//! The estimator captures the scheduler's task table, lets the scheduler run
//! for a number of ticks, captures it again, and matches the two snapshots by
//! task identity. Each task present in both gets its run time over the
//! interval and its floored percentage share; tasks present in only one are
//! reported as deleted or created.
//!
//! ```
//! use rtstats::estimator::Estimator;
//! use rtstats::provider::{Frame, ScriptedTaskTable};
//! use rtstats::task::{TaskIdentity, TaskRecord};
//! use rtstats::timer::ManualTimer;
//!
//! let a = |run| TaskRecord::new(TaskIdentity::new(1), "A", run);
//! let mut table = ScriptedTaskTable::new([
//!     Frame::new(vec![a(100)], 1000),
//!     Frame::new(vec![a(180)], 1200),
//! ]);
//!
//! let report = Estimator::default()
//!     .estimate(&mut table, &mut ManualTimer::new(), 20)
//!     .unwrap();
//! assert_eq!(report.to_lines(), vec!["A 80 40"]);
//! ```

pub mod capture;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod differ;
pub mod error;
pub mod estimator;
pub mod filter;
pub mod json_output;
pub mod procfs;
pub mod provider;
pub mod report;
pub mod task;
pub mod timer;
