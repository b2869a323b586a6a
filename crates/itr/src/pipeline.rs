//! End-to-end temperature score calculation.

use std::sync::Arc;

use tracing::info;

use itr_data::{
    BenchmarkProvider, BenchmarkStore, CompanyDataStore, CompositeCompanyProvider, DataWarehouse,
};
use itr_output::{Anonymizer, Report, ReportBuilder, ScoreTable, SensitivityFilter};
use itr_scoring::{AggregationEngine, ScoringEngine};

use crate::catalog::ProviderCatalog;
use crate::config::ItrConfig;
use crate::error::{ItrError, Result};
use crate::request::TemperatureScoreRequest;

/// Columns of the compact company table, before any requested include columns.
pub const COMPANY_COLUMNS: &[&str] = &["company_name", "scope", "time_frame", "temperature_score"];

/// Name of the provider holding a request's inline company data.
pub const INLINE_PROVIDER: &str = "request";

/// Score a portfolio.
///
/// Steps: validate the request, join companies with benchmarks, score every
/// requested scope and time frame, aggregate, anonymize, apply the
/// sensitivity tier and select the compact company columns.
///
/// # Errors
///
/// * [`ItrError::Malformed`] for invalid requests, unknown providers or
///   unusable inline data
/// * [`ItrError::Data`] when a company is unknown to every provider
/// * [`ItrError::Scoring`] when a whole scope and time frame is degenerate or
///   the aggregation method cannot weight the portfolio
pub fn calculate(
    request: &TemperatureScoreRequest,
    config: &ItrConfig,
    catalog: &ProviderCatalog,
) -> Result<Report> {
    request.validate(config)?;

    let selected = catalog
        .select(&request.data_providers)
        .map_err(|name| ItrError::malformed(format!("unknown data provider {name}")))?;

    let mut companies = CompositeCompanyProvider::new();
    if let Some(data) = &request.company_data {
        let store = CompanyDataStore::from_companies(INLINE_PROVIDER, data.clone())
            .map_err(|e| ItrError::malformed(e.to_string()))?;
        companies.push(Arc::new(store));
    }
    for provider in &selected {
        companies.push(Arc::clone(&provider.companies));
    }

    let inline_benchmarks = request
        .benchmarks
        .clone()
        .map(BenchmarkStore::new)
        .transpose()
        .map_err(|e| ItrError::malformed(e.to_string()))?;
    let benchmarks: &dyn BenchmarkProvider = match &inline_benchmarks {
        Some(store) => store,
        None => selected
            .iter()
            .find_map(|p| p.benchmarks.as_deref())
            .ok_or_else(|| ItrError::malformed("no benchmark data available"))?,
    };

    let scopes = request.scopes();
    let time_frames = request.time_frames();
    let fallback_score = request.fallback_score(config);
    let method = request.method(config);
    info!(
        companies = request.companies.len(),
        providers = companies.len(),
        scopes = scopes.len(),
        time_frames = time_frames.len(),
        method = %method,
        "calculating temperature scores"
    );

    let warehouse = DataWarehouse::new(
        &companies,
        benchmarks,
        config.scoring.projection_settings(config.time_frames),
    );
    let rows = warehouse.build(
        &request.companies,
        &scopes,
        config.time_frames.max_horizon_year(&time_frames),
    )?;
    info!(rows = rows.len(), "built portfolio data");

    let engine = ScoringEngine::new(config.scoring, config.time_frames)?;
    let scored = engine.score(&rows, &scopes, &time_frames, fallback_score)?;

    let mut aggregations = if request.aggregate {
        let aggregations =
            AggregationEngine::new(method).aggregate(&scored.records, &request.grouping_columns)?;
        info!(aggregations = aggregations.len(), "aggregated portfolio");
        Some(aggregations)
    } else {
        None
    };

    let mut scores = ScoreTable::from_records(&scored.records)?;
    let mut rejected = scored.rejected;

    if request.anonymize_data_dump {
        let mut anonymizer = Anonymizer::new();
        anonymizer.anonymize_table(&mut scores);
        if let Some(aggregations) = aggregations.as_mut() {
            anonymizer.anonymize_aggregations(aggregations);
        }
        anonymizer.anonymize_rejected(&mut rejected);
        info!(companies = anonymizer.len(), "anonymized response");
    }

    SensitivityFilter::new(request.sensitivity)
        .with_retained(&request.grouping_columns)
        .apply(&mut scores);

    let company_columns: Vec<&str> = COMPANY_COLUMNS
        .iter()
        .copied()
        .chain(request.include_columns.iter().map(String::as_str))
        .collect();
    let company_table = scores.select(&company_columns);

    let mut builder = ReportBuilder::new()
        .scores(scores)
        .companies(company_table)
        .rejected(rejected);
    if let Some(aggregations) = aggregations {
        builder = builder.aggregated_scores(aggregations);
    }
    Ok(builder.build())
}
