//! Report rendering
//!
//! Text is the `| Task | Run Time | Percentage` table; JSON and CSV live in
//! their own modules.

use anyhow::Result;

use crate::cli::OutputFormat;
use crate::csv_output::CsvOutput;
use crate::differ::MatchResult;
use crate::estimator::UtilizationReport;
use crate::filter::TaskFilter;
use crate::json_output::JsonOutput;

const TEXT_HEADER: &str = "| Task | Run Time | Percentage";

/// Render the text table
pub fn to_text(report: &UtilizationReport, filter: &TaskFilter) -> String {
    let mut output = String::new();
    output.push_str(TEXT_HEADER);
    output.push('\n');

    for result in filter.apply(report.results()) {
        let line = match result {
            MatchResult::Matched {
                name,
                elapsed_run_time,
                percentage,
            } => format!("| {} | {} | {}%", name, elapsed_run_time, percentage),
            MatchResult::Deleted { name } => format!("| {} | Deleted", name),
            MatchResult::Created { name } => format!("| {} | Created", name),
        };
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Render a report in the requested format
pub fn render(
    report: &UtilizationReport,
    format: OutputFormat,
    filter: &TaskFilter,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => to_text(report, filter),
        OutputFormat::Json => {
            let mut json = JsonOutput::new(report, filter).to_json()?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => CsvOutput::new(report, filter).to_csv(),
    })
}
