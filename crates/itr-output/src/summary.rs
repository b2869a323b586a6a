//! Human-readable summaries of portfolio aggregations.

use std::fmt;

use itr_scoring::{ScoreAggregation, ScoreAggregations};

fn score_text(score: Option<f64>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}"))
}

fn group_text(aggregation: &ScoreAggregation) -> String {
    aggregation
        .group
        .as_ref()
        .map_or_else(|| "portfolio".to_string(), ToString::to_string)
}

/// Render aggregations as a fixed-width text table.
///
/// # Examples
///
/// ```
/// use itr_output::summary::to_ascii_table;
/// use itr_scoring::{PortfolioAggregationMethod, ScoreAggregations};
///
/// let empty = ScoreAggregations {
///     aggregation_method: PortfolioAggregationMethod::Wats,
///     grouping_columns: vec![],
///     aggregations: vec![],
/// };
/// assert!(to_ascii_table(&empty).contains("WATS"));
/// ```
pub fn to_ascii_table(aggregations: &ScoreAggregations) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\nPortfolio Temperature Scores ({})\n",
        aggregations.aggregation_method
    ));
    output.push_str(&"=".repeat(96));
    output.push('\n');
    output.push_str(&format!(
        "{:<10} {:<6} {:<36} {:>8} {:>10} {:>10} {:>12}\n",
        "Scope", "Frame", "Group", "Score", "Companies", "Coverage", "Uncovered"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    for aggregation in aggregations.iter() {
        output.push_str(&format!(
            "{:<10} {:<6} {:<36} {:>8} {:>10} {:>9.1}% {:>12.2}\n",
            aggregation.scope.to_string(),
            aggregation.time_frame.to_string(),
            group_text(aggregation),
            score_text(aggregation.temperature_score),
            aggregation.num_companies,
            aggregation.coverage_percentage,
            aggregation.uncovered_investment_value,
        ));
    }

    output.push_str(&"=".repeat(96));
    output.push('\n');
    output
}

/// Render aggregations as a Markdown table.
pub fn to_markdown(aggregations: &ScoreAggregations) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Portfolio Temperature Scores ({})\n\n",
        aggregations.aggregation_method
    ));
    if !aggregations.grouping_columns.is_empty() {
        output.push_str(&format!(
            "**Grouped by:** {}\n\n",
            aggregations.grouping_columns.join(", ")
        ));
    }
    output.push_str("| Scope | Time frame | Group | Score | Companies | Coverage |\n");
    output.push_str("|-------|------------|-------|-------|-----------|----------|\n");
    for aggregation in aggregations.iter() {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1}% |\n",
            aggregation.scope,
            aggregation.time_frame,
            group_text(aggregation),
            score_text(aggregation.temperature_score),
            aggregation.num_companies,
            aggregation.coverage_percentage,
        ));
    }
    output
}

/// One-line description of a single aggregation.
#[derive(Debug, Clone, Copy)]
pub struct AggregationLine<'a>(pub &'a ScoreAggregation);

impl fmt::Display for AggregationLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        write!(
            f,
            "{} {} [{}]: {} ({} companies, {:.1}% coverage)",
            a.scope,
            a.time_frame,
            group_text(a),
            score_text(a.temperature_score),
            a.num_companies,
            a.coverage_percentage
        )
    }
}
