//! Temperature score request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use itr_data::{BenchmarkData, CompanyData, CompanyFacts, EScope, ETimeFrame, PortfolioCompany};
use itr_output::SensitivityTier;
use itr_scoring::PortfolioAggregationMethod;

use crate::config::ItrConfig;
use crate::error::{ItrError, Result};

const fn default_true() -> bool {
    true
}

/// One scoring request over a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureScoreRequest {
    /// Portfolio holdings.
    pub companies: Vec<PortfolioCompany>,
    /// Fallback score; the configured default when absent.
    #[serde(default)]
    pub default_score: Option<f64>,
    /// Providers to consult, in priority order; all when empty.
    #[serde(default)]
    pub data_providers: Vec<String>,
    /// Weighting method; the configured default when absent.
    #[serde(default)]
    pub aggregation_method: Option<PortfolioAggregationMethod>,
    /// Columns to group aggregations by.
    #[serde(default)]
    pub grouping_columns: Vec<String>,
    /// Extra columns of the compact company table.
    #[serde(default)]
    pub include_columns: Vec<String>,
    /// Replace company identities with opaque tokens.
    #[serde(default)]
    pub anonymize_data_dump: bool,
    /// Compute portfolio aggregations.
    #[serde(default = "default_true")]
    pub aggregate: bool,
    /// Scopes to score; `S1+S2`, `S3` and `S1+S2+S3` when empty.
    #[serde(default)]
    pub scopes: Vec<EScope>,
    /// Time frames to score; all when empty.
    #[serde(default)]
    pub time_frames: Vec<ETimeFrame>,
    /// Data-exposure tier of the response.
    #[serde(default)]
    pub sensitivity: SensitivityTier,
    /// Company data supplied with the request, consulted before any provider.
    #[serde(default)]
    pub company_data: Option<Vec<CompanyData>>,
    /// Benchmark data supplied with the request, used instead of the providers'.
    #[serde(default)]
    pub benchmarks: Option<BenchmarkData>,
}

impl TemperatureScoreRequest {
    /// Request over `companies` with every option at its default.
    pub const fn new(companies: Vec<PortfolioCompany>) -> Self {
        Self {
            companies,
            default_score: None,
            data_providers: Vec::new(),
            aggregation_method: None,
            grouping_columns: Vec::new(),
            include_columns: Vec::new(),
            anonymize_data_dump: false,
            aggregate: true,
            scopes: Vec::new(),
            time_frames: Vec::new(),
            sensitivity: SensitivityTier::Full,
            company_data: None,
            benchmarks: None,
        }
    }

    /// Parse a JSON request; malformed JSON is a client error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ItrError::malformed(e.to_string()))
    }

    /// Scopes to score.
    pub fn scopes(&self) -> Vec<EScope> {
        if self.scopes.is_empty() {
            EScope::defaults()
        } else {
            dedup(&self.scopes)
        }
    }

    /// Time frames to score.
    pub fn time_frames(&self) -> Vec<ETimeFrame> {
        if self.time_frames.is_empty() {
            ETimeFrame::all()
        } else {
            dedup(&self.time_frames)
        }
    }

    /// Fallback score in effect.
    pub fn fallback_score(&self, config: &ItrConfig) -> f64 {
        self.default_score.unwrap_or(config.default_score)
    }

    /// Aggregation method in effect.
    pub fn method(&self, config: &ItrConfig) -> PortfolioAggregationMethod {
        self.aggregation_method.unwrap_or(config.aggregation_method)
    }

    /// Check the request against the configuration.
    ///
    /// Provider names are checked when the providers are selected.
    pub fn validate(&self, config: &ItrConfig) -> Result<()> {
        if self.companies.is_empty() {
            return Err(ItrError::malformed("the portfolio has no companies"));
        }

        let mut ids = HashSet::with_capacity(self.companies.len());
        for company in &self.companies {
            if company.company_id.trim().is_empty() {
                return Err(ItrError::malformed(format!(
                    "company {:?} has an empty company_id",
                    company.company_name
                )));
            }
            if !ids.insert(company.company_id.as_str()) {
                return Err(ItrError::malformed(format!(
                    "duplicate company_id {}",
                    company.company_id
                )));
            }
            if !company.investment_value.is_finite() || company.investment_value < 0.0 {
                return Err(ItrError::malformed(format!(
                    "investment value of {} must be a non-negative number",
                    company.company_id
                )));
            }
        }

        let fallback = self.fallback_score(config);
        if !fallback.is_finite() || fallback < 0.0 || !config.scoring.in_domain(fallback) {
            return Err(ItrError::malformed(format!(
                "default score {fallback} is outside [{}, {}]",
                config.scoring.score_floor.max(0.0),
                config.scoring.score_ceiling
            )));
        }

        for column in &self.grouping_columns {
            let known = CompanyFacts::is_known_column(column)
                || self
                    .companies
                    .iter()
                    .any(|c| c.user_fields.contains_key(column));
            if !known {
                return Err(ItrError::malformed(format!(
                    "unknown grouping column {column}"
                )));
            }
        }
        Ok(())
    }
}

fn dedup<T: Copy + PartialEq>(values: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for &value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
