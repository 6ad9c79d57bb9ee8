//! Snapshot differ: matches two task-table snapshots and computes CPU share
//!
//! Tasks are matched by [`TaskIdentity`] only. For each start record, in
//! enumeration order, the first not-yet-consumed end record with the same
//! identity is taken and both are consumed. Whatever is left over in the
//! start snapshot was deleted during the interval, whatever is left over in
//! the end snapshot was created.
//!
//! The identity index maps each identity to the queue of end positions that
//! carry it, so consuming "the first unconsumed end record" is a `pop_front`.
//! This gives the same pairing as a nested linear search in O(n + m).

use std::collections::VecDeque;

use fnv::FnvHashMap;
use serde::Serialize;

use crate::error::{EstimatorError, Result};
use crate::task::{Snapshot, TaskIdentity};

/// Outcome for one task seen in either snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchResult {
    /// Present in both snapshots
    Matched {
        name: String,
        #[serde(rename = "run_time")]
        elapsed_run_time: u64,
        percentage: u64,
    },
    /// Present at start, gone by the end
    Deleted { name: String },
    /// Absent at start, present by the end
    Created { name: String },
}

impl MatchResult {
    pub fn name(&self) -> &str {
        match self {
            MatchResult::Matched { name, .. }
            | MatchResult::Deleted { name }
            | MatchResult::Created { name } => name,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// Everything the differ produced for one pair of snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    /// Scheduler clock advance between the two snapshots
    pub total_elapsed: u64,
    pub processor_count: u32,
    /// Matched, then Deleted, then Created
    pub results: Vec<MatchResult>,
}

impl DiffReport {
    pub fn matched(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| r.is_matched())
    }

    pub fn deleted(&self) -> impl Iterator<Item = &MatchResult> {
        self.results
            .iter()
            .filter(|r| matches!(r, MatchResult::Deleted { .. }))
    }

    pub fn created(&self) -> impl Iterator<Item = &MatchResult> {
        self.results
            .iter()
            .filter(|r| matches!(r, MatchResult::Created { .. }))
    }
}

/// Share of the interval, in whole percent, floored
///
/// `processor_count` normalizes for cores sharing one global clock. The result
/// is not clamped: rounding and normalization mean shares need not sum to 100.
pub fn percentage(elapsed_run_time: u64, total_elapsed: u64, processor_count: u32) -> u64 {
    let denominator = u128::from(total_elapsed) * u128::from(processor_count.max(1));
    if denominator == 0 {
        return 0;
    }
    let share = u128::from(elapsed_run_time) * 100 / denominator;
    u64::try_from(share).unwrap_or(u64::MAX)
}

/// Match `start` against `end` and compute per-task run time and share
pub fn diff_snapshots(
    start: &Snapshot,
    end: &Snapshot,
    processor_count: u32,
) -> Result<DiffReport> {
    let total_elapsed = end.total_run_time().saturating_sub(start.total_run_time());
    if total_elapsed == 0 {
        return Err(EstimatorError::NoElapsedTime);
    }

    let mut index: FnvHashMap<TaskIdentity, VecDeque<usize>> = FnvHashMap::default();
    for (pos, record) in end.records().iter().enumerate() {
        index.entry(record.identity).or_default().push_back(pos);
    }

    let mut end_consumed = vec![false; end.task_count()];
    let mut matched = Vec::with_capacity(start.task_count().min(end.task_count()));
    let mut deleted = Vec::new();

    for record in start.records() {
        let partner = index
            .get_mut(&record.identity)
            .and_then(|positions| positions.pop_front());

        match partner {
            Some(pos) => {
                end_consumed[pos] = true;
                let later = &end.records()[pos];
                let elapsed_run_time = later
                    .cumulative_run_time
                    .saturating_sub(record.cumulative_run_time);
                matched.push(MatchResult::Matched {
                    name: record.name.clone(),
                    elapsed_run_time,
                    percentage: percentage(elapsed_run_time, total_elapsed, processor_count),
                });
            }
            None => deleted.push(MatchResult::Deleted {
                name: record.name.clone(),
            }),
        }
    }

    let created = end
        .records()
        .iter()
        .zip(&end_consumed)
        .filter(|&(_, &consumed)| !consumed)
        .map(|(record, _)| MatchResult::Created {
            name: record.name.clone(),
        });

    let mut results = matched;
    results.append(&mut deleted);
    results.extend(created);

    tracing::debug!(
        "diff: {} results over {} clock units on {} processor(s)",
        results.len(),
        total_elapsed,
        processor_count
    );

    Ok(DiffReport {
        total_elapsed,
        processor_count,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskRecord;

    fn record(handle: u64, name: &str, run_time: u64) -> TaskRecord {
        TaskRecord::new(TaskIdentity::new(handle), name, run_time)
    }

    fn matched(name: &str, elapsed: u64, pct: u64) -> MatchResult {
        MatchResult::Matched {
            name: name.to_string(),
            elapsed_run_time: elapsed,
            percentage: pct,
        }
    }

    fn deleted(name: &str) -> MatchResult {
        MatchResult::Deleted {
            name: name.to_string(),
        }
    }

    fn created(name: &str) -> MatchResult {
        MatchResult::Created {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_single_task_share() {
        let start = Snapshot::new(vec![record(1, "worker", 100)], 1000);
        let end = Snapshot::new(vec![record(1, "worker", 180)], 1200);

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(report.total_elapsed, 200);
        assert_eq!(report.results, vec![matched("worker", 80, 40)]);
    }

    #[test]
    fn test_processor_count_normalizes_share() {
        let start = Snapshot::new(vec![record(1, "worker", 100)], 1000);
        let end = Snapshot::new(vec![record(1, "worker", 180)], 1200);

        let report = diff_snapshots(&start, &end, 2).unwrap();
        assert_eq!(report.results, vec![matched("worker", 80, 20)]);
    }

    #[test]
    fn test_created_and_deleted_ordering() {
        let start = Snapshot::new(vec![record(1, "A", 10), record(2, "B", 20)], 0);
        let end = Snapshot::new(vec![record(2, "B", 50), record(3, "C", 5)], 40);

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(
            report.results,
            vec![matched("B", 30, 75), deleted("A"), created("C")]
        );
    }

    #[test]
    fn test_no_elapsed_time() {
        let start = Snapshot::new(vec![record(1, "A", 10)], 500);
        let end = Snapshot::new(vec![record(1, "A", 90)], 500);
        assert_eq!(
            diff_snapshots(&start, &end, 1),
            Err(EstimatorError::NoElapsedTime)
        );
    }

    #[test]
    fn test_clock_running_backwards_is_no_elapsed_time() {
        let start = Snapshot::new(vec![record(1, "A", 10)], 500);
        let end = Snapshot::new(vec![record(1, "A", 20)], 400);
        assert_eq!(
            diff_snapshots(&start, &end, 1),
            Err(EstimatorError::NoElapsedTime)
        );
    }

    #[test]
    fn test_matching_ignores_names() {
        // Same name, different tasks; renamed task keeps its identity
        let start = Snapshot::new(vec![record(1, "dup", 0), record(2, "old", 0)], 0);
        let end = Snapshot::new(vec![record(3, "dup", 0), record(2, "new", 10)], 100);

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(
            report.results,
            vec![matched("old", 10, 10), deleted("dup"), created("dup")]
        );
    }

    #[test]
    fn test_recycled_handle_with_new_generation_not_matched() {
        let start = Snapshot::new(
            vec![TaskRecord::new(TaskIdentity::with_generation(42, 1), "short", 5)],
            0,
        );
        let end = Snapshot::new(
            vec![TaskRecord::new(TaskIdentity::with_generation(42, 2), "fresh", 1)],
            100,
        );

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(report.results, vec![deleted("short"), created("fresh")]);
    }

    #[test]
    fn test_duplicate_identities_consumed_once_in_order() {
        let start = Snapshot::new(
            vec![record(9, "s1", 0), record(9, "s2", 0), record(9, "s3", 0)],
            0,
        );
        let end = Snapshot::new(vec![record(9, "e1", 10), record(9, "e2", 20)], 100);

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(
            report.results,
            vec![matched("s1", 10, 10), matched("s2", 20, 20), deleted("s3")]
        );
    }

    #[test]
    fn test_counter_going_backwards_saturates() {
        let start = Snapshot::new(vec![record(1, "A", 50)], 0);
        let end = Snapshot::new(vec![record(1, "A", 10)], 100);

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(report.results, vec![matched("A", 0, 0)]);
    }

    #[test]
    fn test_share_may_exceed_100() {
        // A single core can't exceed the wall clock, but mismatched
        // processor configuration can; no clamping happens
        let start = Snapshot::new(vec![record(1, "A", 0)], 0);
        let end = Snapshot::new(vec![record(1, "A", 300)], 100);

        let report = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(report.results, vec![matched("A", 300, 300)]);
    }

    #[test]
    fn test_percentage_large_values_do_not_overflow() {
        assert_eq!(percentage(u64::MAX, u64::MAX, 1), 100);
        assert_eq!(percentage(u64::MAX / 2, u64::MAX, 4), 12);
    }

    #[test]
    fn test_percentage_floors() {
        assert_eq!(percentage(1, 3, 1), 33);
        assert_eq!(percentage(2, 3, 1), 66);
        assert_eq!(percentage(0, 3, 1), 0);
    }

    #[test]
    fn test_percentage_zero_processors_treated_as_one() {
        assert_eq!(percentage(50, 100, 0), 50);
    }

    #[test]
    fn test_report_category_iterators() {
        let start = Snapshot::new(vec![record(1, "A", 10), record(2, "B", 20)], 0);
        let end = Snapshot::new(vec![record(2, "B", 50), record(3, "C", 5)], 40);
        let report = diff_snapshots(&start, &end, 1).unwrap();

        assert_eq!(report.matched().count(), 1);
        assert_eq!(report.deleted().next().map(MatchResult::name), Some("A"));
        assert_eq!(report.created().next().map(MatchResult::name), Some("C"));
    }

    #[test]
    fn test_diff_is_idempotent() {
        let start = Snapshot::new(vec![record(1, "A", 10), record(2, "B", 20)], 0);
        let end = Snapshot::new(vec![record(2, "B", 50), record(3, "C", 5)], 40);

        let first = diff_snapshots(&start, &end, 1).unwrap();
        let second = diff_snapshots(&start, &end, 1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_result_json_shape() {
        let json = serde_json::to_value(matched("B", 30, 75)).unwrap();
        assert_eq!(json["status"], "matched");
        assert_eq!(json["run_time"], 30);
        assert_eq!(json["percentage"], 75);

        let json = serde_json::to_value(deleted("A")).unwrap();
        assert_eq!(json["status"], "deleted");
        assert_eq!(json["name"], "A");
    }
}
