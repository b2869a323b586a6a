//! Rendering of reports for the terminal.

use clap::ValueEnum;

use itr::output::{ExportError, ExportFormat, Exporter, Report, ReportError, summary};
use thiserror::Error;

/// Errors raised while rendering a report.
#[derive(Debug, Error)]
pub(crate) enum RenderError {
    /// Table or aggregation export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report serialization failed
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Output format of the `score` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Full report as compact JSON
    Json,
    /// Full report as indented JSON
    Pretty,
    /// Company table as CSV
    Csv,
    /// Aggregations as CSV
    AggregationsCsv,
    /// Plain-text summary
    Text,
    /// Aggregations as a Markdown table
    Markdown,
}

/// Render `report` in `format`.
pub(crate) fn render(report: &Report, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(report).map_err(ExportError::from)?),
        OutputFormat::Pretty => Ok(report.to_json()?),
        OutputFormat::Csv => Ok(report.companies.export_to_string(ExportFormat::Csv)?),
        OutputFormat::AggregationsCsv => match &report.aggregated_scores {
            Some(aggregations) => Ok(aggregations.export_to_string(ExportFormat::Csv)?),
            None => Ok(String::new()),
        },
        OutputFormat::Text => Ok(report.to_text()),
        OutputFormat::Markdown => Ok(report
            .aggregated_scores
            .as_ref()
            .map(summary::to_markdown)
            .unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itr::output::ReportBuilder;
    use rstest::rstest;

    #[rstest]
    #[case(OutputFormat::Json, "\"companies\"")]
    #[case(OutputFormat::Pretty, "\"rejected\": []")]
    #[case(OutputFormat::Text, "No aggregation requested")]
    fn test_render_empty_report(#[case] format: OutputFormat, #[case] expected: &str) {
        let report = ReportBuilder::new().build();
        assert!(render(&report, format).unwrap().contains(expected));
    }

    #[test]
    fn test_render_without_aggregations() {
        let report = ReportBuilder::new().build();
        assert!(render(&report, OutputFormat::Markdown).unwrap().is_empty());
        assert!(render(&report, OutputFormat::AggregationsCsv).unwrap().is_empty());
    }
}
