//! Data-exposure tiers for score output.
//!
//! | Tier          | Removed from the score table                                     |
//! |---------------|------------------------------------------------------------------|
//! | `full`        | nothing                                                          |
//! | `crystal_box` | projected target and trajectory intensities                      |
//! | `grey_box`    | as crystal box, plus benchmark calibration and cumulative values |
//! | `black_box`   | everything outside the allow-list and the grouping columns       |
//!
//! Scores themselves are never altered.

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::table::ScoreTable;

/// Intermediate projection series.
pub const PROJECTION_COLUMNS: &[&str] = &["projected_targets", "projected_intensities"];

/// Benchmark calibration and cumulative emission diagnostics.
pub const DIAGNOSTIC_COLUMNS: &[&str] = &[
    "benchmark_temperature",
    "benchmark_global_budget",
    "is_afolu_included",
    "cumulative_budget",
    "cumulative_trajectory",
    "cumulative_target",
    "trajectory_overshoot_ratio",
    "target_overshoot_ratio",
];

/// Columns a black box table may expose.
pub const BLACK_BOX_COLUMNS: &[&str] = &[
    "company_id",
    "company_name",
    "company_isin",
    "sector",
    "region",
    "scope",
    "time_frame",
    "temperature_score",
    "score_result_type",
    "investment_value",
    "market_cap",
    "enterprise_value",
    "cash_equivalents",
    "total_assets",
    "revenue",
    "ownership_percentage",
    "base_year_emissions",
];

/// Declared data-exposure tier of a response.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityTier {
    /// Everything, including intermediate projections
    #[default]
    #[display("full")]
    Full,

    /// Scores and diagnostics without projection series
    #[display("crystal_box")]
    CrystalBox,

    /// Scores without projection series or calibration details
    #[display("grey_box")]
    GreyBox,

    /// Scores, identity, grouping and weighting attributes only
    #[display("black_box")]
    BlackBox,
}

impl FromStr for SensitivityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "full" => Ok(Self::Full),
            "crystal_box" => Ok(Self::CrystalBox),
            "grey_box" | "gray_box" => Ok(Self::GreyBox),
            "black_box" => Ok(Self::BlackBox),
            other => Err(format!("unknown sensitivity tier: {other}")),
        }
    }
}

/// Applies a sensitivity tier to score tables.
#[derive(Debug, Clone, Default)]
pub struct SensitivityFilter {
    tier: SensitivityTier,
    retained: Vec<String>,
}

impl SensitivityFilter {
    /// Create a filter for `tier`.
    pub const fn new(tier: SensitivityTier) -> Self {
        Self {
            tier,
            retained: Vec::new(),
        }
    }

    /// Also keep `columns` under black box, e.g. the grouping columns of a request.
    pub fn with_retained<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.retained.extend(columns.iter().map(|c| c.as_ref().to_string()));
        self
    }

    /// Tier applied by this filter.
    pub const fn tier(&self) -> SensitivityTier {
        self.tier
    }

    /// Remove the columns the tier does not expose.
    pub fn apply(&self, table: &mut ScoreTable) {
        match self.tier {
            SensitivityTier::Full => {}
            SensitivityTier::CrystalBox => table.drop_columns(PROJECTION_COLUMNS),
            SensitivityTier::GreyBox => {
                table.drop_columns(PROJECTION_COLUMNS);
                table.drop_columns(DIAGNOSTIC_COLUMNS);
            }
            SensitivityTier::BlackBox => {
                let mut allowed = BLACK_BOX_COLUMNS.to_vec();
                allowed.extend(self.retained.iter().map(String::as_str));
                table.retain_columns(&allowed);
            }
        }
    }
}

/// Filter `table` for `tier`, returning the shaped table.
pub fn filter(mut table: ScoreTable, tier: SensitivityTier) -> ScoreTable {
    SensitivityFilter::new(tier).apply(&mut table);
    table
}
