//! Temperature scoring.
//!
//! A projection's cumulative emissions over the scored window are compared
//! against the cumulative emissions the benchmark allows over the same
//! window. The overshoot (or undershoot) is converted into a temperature
//! through the benchmark's global carbon budget and the transient climate
//! response to cumulative emissions:
//!
//! score = T_bench + budget × (cumulative / cumulative_budget − 1) × tcre / carbon_conversion

use std::collections::BTreeMap;

use itr_data::{
    BenchmarkCalibration, EScope, ETimeFrame, PortfolioRow, ProjectionSettings,
    TimeFrameHorizons, YearSeries,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScoringError};
use crate::record::{RejectedScore, ScoreDiagnostics, ScoreRecord, ScoreResultType, ScoreSet};

/// Scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Transient climate response to cumulative emissions (°C per 1000 PgC).
    pub tcre: f64,
    /// GtCO2 per 1000 PgC.
    pub carbon_conversion: f64,
    /// Lowest reportable score.
    pub score_floor: f64,
    /// Highest reportable score.
    pub score_ceiling: f64,
    /// Cap on the absolute compound annual intensity trend.
    pub max_annual_trend: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tcre: 2.2,
            carbon_conversion: 3664.0,
            score_floor: 0.0,
            score_ceiling: 6.0,
            max_annual_trend: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.tcre,
            self.carbon_conversion,
            self.score_floor,
            self.score_ceiling,
            self.max_annual_trend,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ScoringError::InvalidConfig(
                "scoring parameters must be finite".to_string(),
            ));
        }
        if self.tcre <= 0.0 || self.carbon_conversion <= 0.0 {
            return Err(ScoringError::InvalidConfig(
                "tcre and carbon_conversion must be positive".to_string(),
            ));
        }
        if self.score_ceiling <= self.score_floor {
            return Err(ScoringError::InvalidConfig(format!(
                "score ceiling {} must exceed floor {}",
                self.score_ceiling, self.score_floor
            )));
        }
        if self.max_annual_trend < 0.0 {
            return Err(ScoringError::InvalidConfig(
                "max_annual_trend must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `score` lies in the reportable domain.
    pub fn in_domain(&self, score: f64) -> bool {
        (self.score_floor..=self.score_ceiling).contains(&score)
    }

    /// Projection settings for the given horizons.
    pub const fn projection_settings(&self, horizons: TimeFrameHorizons) -> ProjectionSettings {
        ProjectionSettings {
            horizons,
            max_annual_trend: self.max_annual_trend,
        }
    }
}

/// Converts portfolio rows into temperature scores.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    horizons: TimeFrameHorizons,
}

impl ScoringEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: ScoringConfig, horizons: TimeFrameHorizons) -> Result<Self> {
        config.validate()?;
        if !horizons.is_valid() {
            return Err(ScoringError::InvalidConfig(
                "time frame offsets must be positive and increasing".to_string(),
            ));
        }
        Ok(Self { config, horizons })
    }

    /// Scoring parameters in use.
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every row of a requested scope for every requested time frame.
    ///
    /// Degenerate records are rejected individually. The call fails only when
    /// every record of some (scope, time frame) bucket was rejected, with the
    /// first error of that bucket.
    ///
    /// # Arguments
    ///
    /// * `rows` - Portfolio rows from the data warehouse
    /// * `scopes` - Scopes to score
    /// * `time_frames` - Time frames to score
    /// * `fallback_score` - Score used when neither projection resolves
    pub fn score(
        &self,
        rows: &[PortfolioRow],
        scopes: &[EScope],
        time_frames: &[ETimeFrame],
        fallback_score: f64,
    ) -> Result<ScoreSet> {
        let mut set = ScoreSet::default();
        let mut buckets: BTreeMap<(EScope, ETimeFrame), (usize, Option<ScoringError>)> =
            BTreeMap::new();

        for row in rows.iter().filter(|r| scopes.contains(&r.scope)) {
            for &time_frame in time_frames {
                let bucket = buckets.entry((row.scope, time_frame)).or_default();
                match self.score_row(row, time_frame, fallback_score) {
                    Ok(record) => {
                        debug!(
                            company_id = %record.company.company_id,
                            scope = %record.scope,
                            time_frame = %record.time_frame,
                            score = record.temperature_score,
                            result_type = %record.score_result_type,
                            "scored"
                        );
                        bucket.0 += 1;
                        set.records.push(record);
                    }
                    Err(err) => {
                        warn!(error = %err, "rejected score record");
                        set.rejected.push(RejectedScore {
                            company_id: row.company.company_id.clone(),
                            company_name: row.company.company_name.clone(),
                            scope: row.scope,
                            time_frame,
                            reason: err.to_string(),
                        });
                        if bucket.1.is_none() {
                            bucket.1 = Some(err);
                        }
                    }
                }
            }
        }

        if let Some(err) = buckets
            .into_values()
            .find_map(|(scored, first_error)| if scored == 0 { first_error } else { None })
        {
            return Err(err);
        }

        info!(
            records = set.records.len(),
            rejected = set.rejected.len(),
            "scored portfolio"
        );
        Ok(set)
    }

    /// Score a single row for one time frame.
    pub fn score_row(
        &self,
        row: &PortfolioRow,
        time_frame: ETimeFrame,
        fallback_score: f64,
    ) -> Result<ScoreRecord> {
        let fallback = || ScoreRecord {
            company: row.company.clone(),
            scope: row.scope,
            time_frame,
            base_year_emissions: row.base_year_emissions,
            trajectory_score: None,
            target_score: None,
            temperature_score: fallback_score,
            score_result_type: ScoreResultType::Fallback,
            diagnostics: None,
            projected_targets: row.projected_targets.clone(),
            projected_intensities: row.projected_intensities.clone(),
        };
        let invalid = |reason: String| ScoringError::InvalidProjection {
            company_id: row.company.company_id.clone(),
            scope: row.scope,
            time_frame,
            reason,
        };

        let Some(matched) = row.benchmark.matched() else {
            return Ok(fallback());
        };
        let (Some(production), Some(base_intensity)) =
            (row.projected_production.as_ref(), row.base_intensity)
        else {
            return Ok(fallback());
        };
        if base_intensity.is_nan() || base_intensity <= 0.0 {
            return Err(invalid(format!(
                "base intensity {base_intensity} is not positive"
            )));
        }

        let base_year = self.horizons.base_year;
        let horizon_year = self.horizons.horizon_year(time_frame);
        let window = base_year..=horizon_year;

        if !matched.intensities.window(window.clone()).is_monotonic() {
            return Err(invalid(format!(
                "benchmark curve for region {} is not monotonic",
                matched.region
            )));
        }

        let cumulative_budget = cumulative(&matched.intensities, production, base_year, horizon_year);
        if !(cumulative_budget.is_finite() && cumulative_budget > 0.0) {
            return Err(invalid(format!(
                "cumulative benchmark budget {cumulative_budget} is not positive"
            )));
        }

        let calibration = matched.calibration;
        let evaluate = |pathway: &YearSeries| -> Result<(f64, f64)> {
            let total = cumulative(pathway, production, base_year, horizon_year);
            let raw = self.temperature(calibration, total / cumulative_budget);
            if !raw.is_finite() {
                return Err(invalid(format!("score {raw} is not finite")));
            }
            Ok((total, self.clamp(raw)))
        };

        let trajectory = row
            .projected_intensities
            .as_ref()
            .map(&evaluate)
            .transpose()?;
        let lower_year = self.horizons.lower_year(time_frame);
        let target = match (&row.projected_targets, row.target_end_year) {
            (Some(pathway), Some(end_year)) if end_year > lower_year => Some(evaluate(pathway)?),
            _ => None,
        };

        let (temperature_score, score_result_type) = match (trajectory, target) {
            (Some((_, t)), Some((_, g))) => ((t + g) / 2.0, ScoreResultType::Blended),
            (Some((_, t)), None) => (t, ScoreResultType::Trajectory),
            (None, Some((_, g))) => (g, ScoreResultType::Target),
            (None, None) => return Ok(fallback()),
        };

        let mut record = fallback();
        record.trajectory_score = trajectory.map(|(_, s)| s);
        record.target_score = target.map(|(_, s)| s);
        record.temperature_score = temperature_score;
        record.score_result_type = score_result_type;
        record.diagnostics = Some(ScoreDiagnostics {
            benchmark_region: matched.region.clone(),
            benchmark_temperature: calibration.benchmark_temperature,
            benchmark_global_budget: calibration.benchmark_global_budget,
            is_afolu_included: calibration.is_afolu_included,
            horizon_year,
            cumulative_budget,
            cumulative_trajectory: trajectory.map(|(c, _)| c),
            cumulative_target: target.map(|(c, _)| c),
            trajectory_overshoot_ratio: trajectory.map(|(c, _)| c / cumulative_budget),
            target_overshoot_ratio: target.map(|(c, _)| c / cumulative_budget),
        });
        Ok(record)
    }

    /// Temperature for a cumulative emissions ratio against the budget.
    pub fn temperature(&self, calibration: BenchmarkCalibration, overshoot_ratio: f64) -> f64 {
        calibration.benchmark_temperature
            + calibration.benchmark_global_budget * (overshoot_ratio - 1.0) * self.config.tcre
                / self.config.carbon_conversion
    }

    fn clamp(&self, score: f64) -> f64 {
        score.clamp(self.config.score_floor, self.config.score_ceiling)
    }
}

/// Σ intensity(y) × production(y) over `start..=end`.
fn cumulative(intensity: &YearSeries, production: &YearSeries, start: i32, end: i32) -> f64 {
    (start..=end)
        .map(|year| {
            intensity.value_at(year).unwrap_or(f64::NAN)
                * production.value_at(year).unwrap_or(f64::NAN)
        })
        .sum()
}
