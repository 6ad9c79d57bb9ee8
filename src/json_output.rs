//! JSON output format for utilization reports

use serde::Serialize;

use crate::differ::MatchResult;
use crate::estimator::UtilizationReport;
use crate::filter::TaskFilter;

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Scheduler clock advance over the interval
    pub total_elapsed: u64,
    pub processor_count: u32,
    pub wait_ticks: u32,
    /// Matched, deleted and created tasks, in report order
    pub tasks: Vec<&'a MatchResult>,
}

impl<'a> JsonOutput<'a> {
    pub fn new(report: &'a UtilizationReport, filter: &TaskFilter) -> Self {
        Self {
            total_elapsed: report.total_elapsed(),
            processor_count: report.diff.processor_count,
            wait_ticks: report.wait_ticks,
            tasks: filter.apply(report.results()),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
