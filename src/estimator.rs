//! Two-snapshot CPU share estimation
//!
//! One `estimate` call is: capture, wait, capture, diff. The calling thread
//! drives every step and takes no lock on the task table; the scheduler keeps
//! creating and destroying tasks underneath, which the differ tolerates.
//! Nothing survives between calls.

use crate::capture::capture_snapshot;
use crate::config::EstimatorConfig;
use crate::differ::{diff_snapshots, DiffReport, MatchResult};
use crate::error::Result;
use crate::provider::{TaskTableProvider, TimerProvider};

/// One rendered line per [`MatchResult`]
pub type ReportLines = Vec<String>;

/// Result of one successful estimate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilizationReport {
    /// Ticks waited between the two captures
    pub wait_ticks: u32,
    pub diff: DiffReport,
}

impl UtilizationReport {
    pub fn results(&self) -> &[MatchResult] {
        &self.diff.results
    }

    pub fn total_elapsed(&self) -> u64 {
        self.diff.total_elapsed
    }

    /// `<name> <run time> <percentage>`, `<name> Deleted`, `<name> Created`
    pub fn to_lines(&self) -> ReportLines {
        self.results()
            .iter()
            .map(|result| match result {
                MatchResult::Matched {
                    name,
                    elapsed_run_time,
                    percentage,
                } => format!("{} {} {}", name, elapsed_run_time, percentage),
                MatchResult::Deleted { name } => format!("{} Deleted", name),
                MatchResult::Created { name } => format!("{} Created", name),
            })
            .collect()
    }
}

/// Stateless estimator parameterized by the measured environment
#[derive(Debug, Clone)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate each task's share of the next `wait_ticks` ticks
    ///
    /// `wait_ticks == 0` captures back-to-back, which on most clocks yields
    /// [`EstimatorError::NoElapsedTime`](crate::error::EstimatorError::NoElapsedTime).
    pub fn estimate<P, T>(
        &self,
        provider: &mut P,
        timer: &mut T,
        wait_ticks: u32,
    ) -> Result<UtilizationReport>
    where
        P: TaskTableProvider + ?Sized,
        T: TimerProvider + ?Sized,
    {
        let start = capture_snapshot(provider, self.config.snapshot_slack)?;

        timer.wait(wait_ticks);

        let end = capture_snapshot(provider, self.config.snapshot_slack)?;
        let diff = diff_snapshots(&start, &end, self.config.processor_count)?;

        tracing::info!(
            "estimate over {} ticks: {} matched, {} deleted, {} created",
            wait_ticks,
            diff.matched().count(),
            diff.deleted().count(),
            diff.created().count()
        );

        Ok(UtilizationReport { wait_ticks, diff })
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}
