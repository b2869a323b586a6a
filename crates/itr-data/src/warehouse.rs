//! Join of portfolio companies with company data and benchmark curves.
//!
//! The warehouse produces one [`PortfolioRow`] per company and requested
//! scope, carrying everything the scoring engine needs: projected production,
//! the trajectory and target intensity pathways, and the matched benchmark.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::benchmark::{BenchmarkCalibration, BenchmarkKey, GLOBAL_REGION};
use crate::error::{DataError, Result};
use crate::interfaces::{
    CompanyData, CompanyFacts, EScope, ETimeFrame, PortfolioCompany, TimeFrameHorizons,
};
use crate::projection::{
    TargetContext, extrapolate_trajectory, historic_intensities, project_production,
    target_pathway,
};
use crate::provider::{BenchmarkProvider, CompanyDataProvider};
use crate::series::YearSeries;

/// Projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Base year and time frame offsets.
    pub horizons: TimeFrameHorizons,
    /// Cap on the absolute compound annual intensity trend.
    pub max_annual_trend: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            horizons: TimeFrameHorizons::default(),
            max_annual_trend: 0.5,
        }
    }
}

/// Benchmark curve resolved for a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedBenchmark {
    /// Region of the curve actually used; `Global` after a fallback.
    pub region: String,
    /// Benchmark intensity over the projection window.
    pub intensities: YearSeries,
    /// Calibration of the benchmark set.
    pub calibration: BenchmarkCalibration,
}

/// Outcome of the benchmark lookup for a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BenchmarkMatch {
    /// A curve was found.
    Matched(MatchedBenchmark),
    /// Neither the company's region nor the global region has a curve.
    Missing {
        /// Sector of the company
        sector: String,
        /// Region of the company
        region: String,
        /// Requested scope
        scope: EScope,
    },
}

impl BenchmarkMatch {
    /// The matched curve, or [`DataError::MissingBenchmarkCoverage`].
    pub fn require(&self) -> Result<&MatchedBenchmark> {
        match self {
            Self::Matched(matched) => Ok(matched),
            Self::Missing {
                sector,
                region,
                scope,
            } => Err(DataError::MissingBenchmarkCoverage {
                sector: sector.clone(),
                region: region.clone(),
                scope: *scope,
            }),
        }
    }

    /// The matched curve, if any.
    pub const fn matched(&self) -> Option<&MatchedBenchmark> {
        match self {
            Self::Matched(matched) => Some(matched),
            Self::Missing { .. } => None,
        }
    }
}

/// Portfolio data for one company and scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    /// Joined company attributes.
    pub company: CompanyFacts,
    /// Scope of the row.
    pub scope: EScope,
    /// Emissions at the base year (latest report at or before it).
    pub base_year_emissions: Option<f64>,
    /// Emission intensity at the base year.
    pub base_intensity: Option<f64>,
    /// Production over the projection window.
    pub projected_production: Option<YearSeries>,
    /// Trajectory-method intensities over the projection window.
    pub projected_intensities: Option<YearSeries>,
    /// Target-method intensities over the projection window.
    pub projected_targets: Option<YearSeries>,
    /// Last year covered by a usable target.
    pub target_end_year: Option<i32>,
    /// Benchmark lookup outcome.
    pub benchmark: BenchmarkMatch,
}

/// Joins company data with benchmark curves.
#[derive(Debug, Clone, Copy)]
pub struct DataWarehouse<'a> {
    companies: &'a dyn CompanyDataProvider,
    benchmarks: &'a dyn BenchmarkProvider,
    settings: ProjectionSettings,
}

impl<'a> DataWarehouse<'a> {
    /// Create a warehouse over the given providers.
    pub const fn new(
        companies: &'a dyn CompanyDataProvider,
        benchmarks: &'a dyn BenchmarkProvider,
        settings: ProjectionSettings,
    ) -> Self {
        Self {
            companies,
            benchmarks,
            settings,
        }
    }

    /// Projection settings in use.
    pub const fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    /// Build portfolio rows for every company and scope, projected up to `horizon_year`.
    ///
    /// Fails with [`DataError::UnknownCompany`] if any company is absent from
    /// the company provider. Missing benchmark coverage does not fail; the
    /// row carries a [`BenchmarkMatch::Missing`] marker instead.
    pub fn build(
        &self,
        portfolio: &[PortfolioCompany],
        scopes: &[EScope],
        horizon_year: i32,
    ) -> Result<Vec<PortfolioRow>> {
        let years = self.settings.horizons.base_year..=horizon_year;
        let mut rows = Vec::with_capacity(portfolio.len() * scopes.len());

        for entry in portfolio {
            let data = self
                .companies
                .company(&entry.company_id)
                .ok_or_else(|| DataError::UnknownCompany(entry.company_id.clone()))?;
            let facts = CompanyFacts::join(entry, data);
            for &scope in scopes {
                rows.push(self.build_row(&facts, data, scope, years.clone()));
            }
        }

        info!(
            companies = portfolio.len(),
            scopes = scopes.len(),
            rows = rows.len(),
            horizon_year,
            "built portfolio data"
        );
        Ok(rows)
    }

    fn build_row(
        &self,
        facts: &CompanyFacts,
        data: &CompanyData,
        scope: EScope,
        years: RangeInclusive<i32>,
    ) -> PortfolioRow {
        let base_year = *years.start();
        let benchmark = self.match_benchmark(data, scope, years.clone());
        let benchmarks = self.benchmarks;
        let growth = self
            .lookup(data, scope, |key| benchmarks.production_benchmark(key))
            .map(|curve| &curve.projections);
        // Absolute targets read production at their target year, whatever
        // window was requested.
        let production_end = data
            .targets
            .iter()
            .filter(|t| t.is_usable(base_year))
            .map(|t| t.target_year)
            .fold(
                (*years.end()).max(self.settings.horizons.horizon_year(ETimeFrame::Long)),
                i32::max,
            );
        let projected_production =
            project_production(&data.historic_production, growth, base_year..=production_end);

        let emissions = data.emissions(scope);
        let base_year_emissions = emissions.as_ref().and_then(|e| {
            e.latest_at_or_before(base_year)
                .or_else(|| e.first())
                .map(|p| p.value)
        });

        let mut row = PortfolioRow {
            company: facts.clone(),
            scope,
            base_year_emissions,
            base_intensity: None,
            projected_production: None,
            projected_intensities: None,
            projected_targets: None,
            target_end_year: None,
            benchmark,
        };

        let (Some(emissions), Some(production)) = (emissions, projected_production) else {
            debug!(
                company_id = %facts.company_id,
                %scope,
                "no emission or production history, row left unprojected"
            );
            return row;
        };

        let intensities = historic_intensities(&emissions, &data.historic_production);
        let Some(base) = intensities
            .latest_at_or_before(base_year)
            .or_else(|| intensities.first())
        else {
            debug!(company_id = %facts.company_id, %scope, "no intensity history");
            row.projected_production = Some(production.window(years));
            return row;
        };

        row.base_intensity = Some(base.value);
        row.projected_intensities =
            extrapolate_trajectory(&intensities, years.clone(), self.settings.max_annual_trend);

        let ctx = TargetContext {
            emissions: &emissions,
            intensities: &intensities,
            production: &production,
            base_intensity: base.value,
        };
        let targets = data.targets_for(scope);
        let pathway = if targets.is_empty() && scope.is_composite() {
            self.component_pathways(data, scope, &production, years.clone())
        } else {
            target_pathway(&targets, &ctx, years.clone())
        };
        if let Some((pathway, end_year)) = pathway {
            row.projected_targets = Some(pathway);
            row.target_end_year = Some(end_year);
        }
        row.projected_production = Some(production.window(years));
        row
    }

    /// Sum of the component pathways of a composite scope, when every
    /// component has one.
    fn component_pathways(
        &self,
        data: &CompanyData,
        scope: EScope,
        production: &YearSeries,
        years: RangeInclusive<i32>,
    ) -> Option<(YearSeries, i32)> {
        let base_year = *years.start();
        let mut combined: Option<(YearSeries, i32)> = None;
        for &component in scope.components() {
            let emissions = data.emissions(component)?;
            let intensities = historic_intensities(&emissions, &data.historic_production);
            let base = intensities
                .latest_at_or_before(base_year)
                .or_else(|| intensities.first())?;
            let ctx = TargetContext {
                emissions: &emissions,
                intensities: &intensities,
                production,
                base_intensity: base.value,
            };
            let (pathway, end_year) =
                target_pathway(&data.targets_for(component), &ctx, years.clone())?;
            combined = Some(match combined {
                None => (pathway, end_year),
                Some((acc, acc_end)) => (acc.sum_common(&pathway), acc_end.max(end_year)),
            });
        }
        combined
    }

    fn match_benchmark(
        &self,
        data: &CompanyData,
        scope: EScope,
        years: RangeInclusive<i32>,
    ) -> BenchmarkMatch {
        let benchmarks = self.benchmarks;
        match self.lookup(data, scope, |key| benchmarks.intensity_benchmark(key)) {
            Some(curve) => BenchmarkMatch::Matched(MatchedBenchmark {
                region: curve.region.clone(),
                intensities: curve.projections.resample(years),
                calibration: benchmarks.calibration(),
            }),
            None => {
                warn!(
                    company_id = %data.company_id,
                    sector = %data.sector,
                    region = %data.region,
                    %scope,
                    "missing benchmark coverage"
                );
                BenchmarkMatch::Missing {
                    sector: data.sector.clone(),
                    region: data.region.clone(),
                    scope,
                }
            }
        }
    }

    /// Look a curve up for the company's region, then for the global region.
    fn lookup<T>(
        &self,
        data: &CompanyData,
        scope: EScope,
        find: impl Fn(&BenchmarkKey) -> Option<&'a T>,
    ) -> Option<&'a T> {
        let key = BenchmarkKey::new(&data.sector, &data.region, scope);
        find(&key).or_else(|| {
            if data.region == GLOBAL_REGION {
                return None;
            }
            debug!(%key, "falling back to global benchmark");
            find(&BenchmarkKey::new(&data.sector, GLOBAL_REGION, scope))
        })
    }
}
