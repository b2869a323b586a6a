//! Portfolio aggregation of company temperature scores.
//!
//! Records are bucketed by scope and time frame, optionally partitioned by
//! grouping columns, and combined into one weighted score per bucket. Records
//! whose weight cannot be computed are left out of the weighted sum and their
//! investment value is reported as uncovered.

pub mod grouping;
pub mod method;

pub use grouping::{GroupKey, partition};
pub use method::{
    MethodInfo, PortfolioAggregationMethod, available_methods, get_method_info, method_map,
};

use std::collections::BTreeMap;

use itr_data::{EScope, ETimeFrame};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScoringError};
use crate::record::{ScoreRecord, ScoreResultType};

/// One company's share of an aggregated score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Company id.
    pub company_id: String,
    /// Company name.
    pub company_name: String,
    /// Company temperature score.
    pub temperature_score: f64,
    /// How the company score was obtained.
    pub score_result_type: ScoreResultType,
    /// Normalized weight; zero for unweighted records.
    pub weight: f64,
    /// weight × score.
    pub contribution: f64,
}

/// Aggregated score of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAggregation {
    /// Method used.
    pub aggregation_method: PortfolioAggregationMethod,
    /// Scope.
    pub scope: EScope,
    /// Time frame.
    pub time_frame: ETimeFrame,
    /// Group, or `None` for the whole portfolio.
    pub group: Option<GroupKey>,
    /// Weighted score; `None` when no record has a usable weight.
    pub temperature_score: Option<f64>,
    /// Number of records in the bucket.
    pub num_companies: usize,
    /// Investment value of all records.
    pub total_investment_value: f64,
    /// Investment value of records with a usable weight.
    pub weighted_investment_value: f64,
    /// Investment value of records without a usable weight.
    pub uncovered_investment_value: f64,
    /// Share of investment value backed by weighted, non-fallback scores, in percent.
    pub coverage_percentage: f64,
    /// Per-company contributions.
    pub contributions: Vec<Contribution>,
}

/// All aggregations of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAggregations {
    /// Method used.
    pub aggregation_method: PortfolioAggregationMethod,
    /// Grouping columns, empty when ungrouped.
    pub grouping_columns: Vec<String>,
    /// Portfolio totals followed by their groups, per scope and time frame.
    pub aggregations: Vec<ScoreAggregation>,
}

impl ScoreAggregations {
    /// Portfolio-wide aggregation of one scope and time frame.
    pub fn get(&self, scope: EScope, time_frame: ETimeFrame) -> Option<&ScoreAggregation> {
        self.aggregations
            .iter()
            .find(|a| a.scope == scope && a.time_frame == time_frame && a.group.is_none())
    }

    /// Group aggregations of one scope and time frame.
    pub fn groups(
        &self,
        scope: EScope,
        time_frame: ETimeFrame,
    ) -> impl Iterator<Item = &ScoreAggregation> + '_ {
        self.aggregations
            .iter()
            .filter(move |a| a.scope == scope && a.time_frame == time_frame && a.group.is_some())
    }

    /// Iterate every aggregation.
    pub fn iter(&self) -> impl Iterator<Item = &ScoreAggregation> + '_ {
        self.aggregations.iter()
    }

    /// Number of aggregations.
    pub fn len(&self) -> usize {
        self.aggregations.len()
    }

    /// Whether there is no aggregation.
    pub fn is_empty(&self) -> bool {
        self.aggregations.is_empty()
    }
}

/// Aggregates company scores with a fixed method.
#[derive(Debug, Clone, Copy)]
pub struct AggregationEngine {
    method: PortfolioAggregationMethod,
}

impl AggregationEngine {
    /// Create an engine for `method`.
    pub const fn new(method: PortfolioAggregationMethod) -> Self {
        Self { method }
    }

    /// Method in use.
    pub const fn method(&self) -> PortfolioAggregationMethod {
        self.method
    }

    /// Aggregate records per scope and time frame, plus one aggregation per
    /// group when `grouping_columns` is not empty.
    ///
    /// Fails with [`ScoringError::InvalidAggregationMethod`] when no record
    /// carries the attributes the method weights by.
    pub fn aggregate(
        &self,
        records: &[ScoreRecord],
        grouping_columns: &[String],
    ) -> Result<ScoreAggregations> {
        if !records.is_empty()
            && records
                .iter()
                .all(|r| self.method.raw_weight(&r.company, r.base_year_emissions).is_none())
        {
            let info = self.method.info();
            return Err(ScoringError::InvalidAggregationMethod {
                method: self.method.to_string(),
                reason: format!(
                    "no company has the required attributes ({})",
                    info.required_attributes.join(", ")
                ),
            });
        }

        let mut buckets: BTreeMap<(EScope, ETimeFrame), Vec<&ScoreRecord>> = BTreeMap::new();
        for record in records {
            buckets
                .entry((record.scope, record.time_frame))
                .or_default()
                .push(record);
        }

        let mut aggregations = Vec::new();
        for ((scope, time_frame), bucket) in buckets {
            aggregations.push(self.aggregate_bucket(scope, time_frame, None, &bucket));
            if !grouping_columns.is_empty() {
                for (key, group) in partition(&bucket, grouping_columns) {
                    debug!(%scope, %time_frame, group = %key, size = group.len(), "aggregating group");
                    aggregations.push(self.aggregate_bucket(scope, time_frame, Some(key), &group));
                }
            }
        }

        info!(
            method = %self.method,
            aggregations = aggregations.len(),
            "aggregated portfolio scores"
        );
        Ok(ScoreAggregations {
            aggregation_method: self.method,
            grouping_columns: grouping_columns.to_vec(),
            aggregations,
        })
    }

    fn aggregate_bucket(
        &self,
        scope: EScope,
        time_frame: ETimeFrame,
        group: Option<GroupKey>,
        records: &[&ScoreRecord],
    ) -> ScoreAggregation {
        let weights: Vec<Option<f64>> = records
            .iter()
            .map(|r| {
                self.method
                    .raw_weight(&r.company, r.base_year_emissions)
                    .filter(|w| w.is_finite() && *w > 0.0)
            })
            .collect();
        let weight_sum: f64 = weights.iter().flatten().sum();

        let mut total_investment_value = 0.0;
        let mut weighted_investment_value = 0.0;
        let mut uncovered_investment_value = 0.0;
        let mut covered_investment_value = 0.0;
        let mut contributions = Vec::with_capacity(records.len());

        for (record, weight) in records.iter().zip(&weights) {
            let value = record.company.investment_value;
            total_investment_value += value;
            let normalized = match weight {
                Some(w) => {
                    weighted_investment_value += value;
                    if record.score_result_type.is_covered() {
                        covered_investment_value += value;
                    }
                    w / weight_sum
                }
                None => {
                    uncovered_investment_value += value;
                    0.0
                }
            };
            contributions.push(Contribution {
                company_id: record.company.company_id.clone(),
                company_name: record.company.company_name.clone(),
                temperature_score: record.temperature_score,
                score_result_type: record.score_result_type,
                weight: normalized,
                contribution: normalized * record.temperature_score,
            });
        }

        let temperature_score = (weight_sum > 0.0)
            .then(|| contributions.iter().map(|c| c.contribution).sum::<f64>());
        let coverage_percentage = if total_investment_value > 0.0 {
            covered_investment_value / total_investment_value * 100.0
        } else {
            0.0
        };

        ScoreAggregation {
            aggregation_method: self.method,
            scope,
            time_frame,
            group,
            temperature_score,
            num_companies: records.len(),
            total_investment_value,
            weighted_investment_value,
            uncovered_investment_value,
            coverage_percentage,
            contributions,
        }
    }
}
