//! Company-level score records.

use derive_more::Display;
use itr_data::{CompanyFacts, EScope, ETimeFrame, YearSeries};
use serde::{Deserialize, Serialize};

/// Which inputs a temperature score was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum ScoreResultType {
    /// Mean of the trajectory and target scores
    #[display("blended")]
    Blended,

    /// Trajectory score only
    #[display("trajectory")]
    Trajectory,

    /// Target score only
    #[display("target")]
    Target,

    /// Neither resolved; the fallback score was used
    #[display("fallback")]
    Fallback,
}

impl ScoreResultType {
    /// Whether the score is backed by company data.
    pub const fn is_covered(&self) -> bool {
        !matches!(self, Self::Fallback)
    }
}

/// Intermediate values of a computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDiagnostics {
    /// Region of the benchmark curve used.
    pub benchmark_region: String,
    /// Temperature the benchmark is calibrated to.
    pub benchmark_temperature: f64,
    /// Global carbon budget of the benchmark (GtCO2).
    pub benchmark_global_budget: f64,
    /// Whether the budget includes land use.
    pub is_afolu_included: bool,
    /// Last year of the scored window.
    pub horizon_year: i32,
    /// Cumulative emissions allowed by the benchmark.
    pub cumulative_budget: f64,
    /// Cumulative emissions of the trajectory projection.
    pub cumulative_trajectory: Option<f64>,
    /// Cumulative emissions of the target projection.
    pub cumulative_target: Option<f64>,
    /// Trajectory emissions relative to the budget.
    pub trajectory_overshoot_ratio: Option<f64>,
    /// Target emissions relative to the budget.
    pub target_overshoot_ratio: Option<f64>,
}

/// Temperature score of one company for one scope and time frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    /// Company attributes.
    #[serde(flatten)]
    pub company: CompanyFacts,
    /// Scope.
    pub scope: EScope,
    /// Time frame.
    pub time_frame: ETimeFrame,
    /// Emissions at the base year, the basis of emission-weighted aggregation.
    pub base_year_emissions: Option<f64>,
    /// Score of the trajectory projection.
    pub trajectory_score: Option<f64>,
    /// Score of the target projection.
    pub target_score: Option<f64>,
    /// Final temperature score (°C).
    pub temperature_score: f64,
    /// How the final score was obtained.
    pub score_result_type: ScoreResultType,
    /// Intermediate values; absent for fallback scores.
    #[serde(flatten)]
    pub diagnostics: Option<ScoreDiagnostics>,
    /// Target-method intensities.
    pub projected_targets: Option<YearSeries>,
    /// Trajectory-method intensities.
    pub projected_intensities: Option<YearSeries>,
}

/// A record that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedScore {
    /// Company id.
    pub company_id: String,
    /// Company name.
    pub company_name: String,
    /// Scope.
    pub scope: EScope,
    /// Time frame.
    pub time_frame: ETimeFrame,
    /// Why the record was rejected.
    pub reason: String,
}

/// Output of the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSet {
    /// Scored records, in portfolio, scope and time frame order.
    pub records: Vec<ScoreRecord>,
    /// Records rejected as degenerate.
    pub rejected: Vec<RejectedScore>,
}

impl ScoreSet {
    /// Records of one scope and time frame.
    pub fn bucket(
        &self,
        scope: EScope,
        time_frame: ETimeFrame,
    ) -> impl Iterator<Item = &ScoreRecord> + '_ {
        self.records
            .iter()
            .filter(move |r| r.scope == scope && r.time_frame == time_frame)
    }

    /// Number of scored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was scored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
