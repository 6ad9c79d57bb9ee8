//! CSV output format for utilization reports

use crate::differ::MatchResult;
use crate::estimator::UtilizationReport;
use crate::filter::TaskFilter;

const HEADER: &str = "task,status,run_time,percentage";

/// CSV output formatter
#[derive(Debug)]
pub struct CsvOutput<'a> {
    rows: Vec<&'a MatchResult>,
}

impl<'a> CsvOutput<'a> {
    pub fn new(report: &'a UtilizationReport, filter: &TaskFilter) -> Self {
        Self {
            rows: filter.apply(report.results()),
        }
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(result: &MatchResult) -> String {
        let name = Self::escape_field(result.name());
        match result {
            MatchResult::Matched {
                elapsed_run_time,
                percentage,
                ..
            } => format!("{},matched,{},{}", name, elapsed_run_time, percentage),
            MatchResult::Deleted { .. } => format!("{},deleted,,", name),
            MatchResult::Created { .. } => format!("{},created,,", name),
        }
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(HEADER);
        output.push('\n');

        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }

        output
    }
}
