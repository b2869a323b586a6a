//! Temperature score response.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use itr_scoring::{RejectedScore, ScoreAggregations};

use crate::summary;
use crate::table::ScoreTable;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one temperature score request.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Portfolio aggregations; absent when aggregation was not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated_scores: Option<ScoreAggregations>,

    /// Full score rows after anonymization and sensitivity filtering.
    pub scores: ScoreTable,

    /// Compact per-company view of the scores.
    pub companies: ScoreTable,

    /// Records that could not be scored.
    pub rejected: Vec<RejectedScore>,
}

impl Report {
    /// Create a new report.
    pub fn new(
        aggregated_scores: Option<ScoreAggregations>,
        scores: ScoreTable,
        companies: ScoreTable,
        rejected: Vec<RejectedScore>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            aggregated_scores,
            scores,
            companies,
            rejected,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text summary of the aggregations and rejections.
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Generated: {}\n", self.timestamp.to_rfc3339()));
        match &self.aggregated_scores {
            Some(aggregations) => output.push_str(&summary::to_ascii_table(aggregations)),
            None => output.push_str("\nNo aggregation requested.\n"),
        }
        output.push_str(&format!("\nCompany scores: {}\n", self.companies.len()));
        if !self.rejected.is_empty() {
            output.push_str(&format!("Rejected records: {}\n", self.rejected.len()));
            for rejected in &self.rejected {
                output.push_str(&format!(
                    "  {} {} {}: {}\n",
                    rejected.company_id, rejected.scope, rejected.time_frame, rejected.reason
                ));
            }
        }
        output
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    aggregated_scores: Option<ScoreAggregations>,
    scores: Option<ScoreTable>,
    companies: Option<ScoreTable>,
    rejected: Vec<RejectedScore>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the portfolio aggregations.
    pub fn aggregated_scores(mut self, aggregations: ScoreAggregations) -> Self {
        self.aggregated_scores = Some(aggregations);
        self
    }

    /// Set the full score table.
    pub fn scores(mut self, scores: ScoreTable) -> Self {
        self.scores = Some(scores);
        self
    }

    /// Set the compact company table.
    pub fn companies(mut self, companies: ScoreTable) -> Self {
        self.companies = Some(companies);
        self
    }

    /// Set the rejected records.
    pub fn rejected(mut self, rejected: Vec<RejectedScore>) -> Self {
        self.rejected = rejected;
        self
    }

    /// Build the report.
    pub fn build(self) -> Report {
        Report::new(
            self.aggregated_scores,
            self.scores.unwrap_or_default(),
            self.companies.unwrap_or_default(),
            self.rejected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itr_scoring::PortfolioAggregationMethod;

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .aggregated_scores(ScoreAggregations {
                aggregation_method: PortfolioAggregationMethod::Wats,
                grouping_columns: vec![],
                aggregations: vec![],
            })
            .build();

        assert!(report.aggregated_scores.is_some());
        assert!(report.scores.is_empty());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"aggregation_method\": \"WATS\""));
    }

    #[test]
    fn test_aggregates_omitted_when_absent() {
        let report = ReportBuilder::new().build();
        let json = report.to_json().unwrap();
        assert!(!json.contains("aggregated_scores"));
        assert!(report.to_text().contains("No aggregation requested"));
    }
}
