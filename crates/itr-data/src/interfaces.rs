//! Core domain types shared across the temperature score pipeline.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::series::YearSeries;

/// Emission scope, either a single GHG Protocol scope or a composite of several.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
pub enum EScope {
    /// Direct emissions
    #[serde(rename = "S1")]
    #[display("S1")]
    S1,

    /// Indirect emissions from purchased energy
    #[serde(rename = "S2")]
    #[display("S2")]
    S2,

    /// Other indirect value-chain emissions
    #[serde(rename = "S3")]
    #[display("S3")]
    S3,

    /// Scope 1 and 2 combined
    #[serde(rename = "S1+S2")]
    #[display("S1+S2")]
    S1S2,

    /// Scope 1, 2 and 3 combined
    #[serde(rename = "S1+S2+S3")]
    #[display("S1+S2+S3")]
    S1S2S3,
}

impl EScope {
    /// Returns all scopes.
    pub fn all() -> Vec<Self> {
        vec![Self::S1, Self::S2, Self::S3, Self::S1S2, Self::S1S2S3]
    }

    /// Scopes scored when a request does not name any.
    pub fn defaults() -> Vec<Self> {
        vec![Self::S1S2, Self::S3, Self::S1S2S3]
    }

    /// Single scopes whose emissions make up this scope.
    pub const fn components(&self) -> &'static [Self] {
        match self {
            Self::S1 => &[Self::S1],
            Self::S2 => &[Self::S2],
            Self::S3 => &[Self::S3],
            Self::S1S2 => &[Self::S1, Self::S2],
            Self::S1S2S3 => &[Self::S1, Self::S2, Self::S3],
        }
    }

    /// Whether this scope combines several single scopes.
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::S1S2 | Self::S1S2S3)
    }
}

impl FromStr for EScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(' ', "").as_str() {
            "S1" => Ok(Self::S1),
            "S2" => Ok(Self::S2),
            "S3" => Ok(Self::S3),
            "S1+S2" | "S1S2" => Ok(Self::S1S2),
            "S1+S2+S3" | "S1S2S3" => Ok(Self::S1S2S3),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

/// Forward-looking horizon bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ETimeFrame {
    /// Near-term horizon
    #[display("short")]
    Short,

    /// Medium-term horizon
    #[display("mid")]
    Mid,

    /// Long-term horizon
    #[display("long")]
    Long,
}

impl ETimeFrame {
    /// Returns all time frames, shortest first.
    pub fn all() -> Vec<Self> {
        vec![Self::Short, Self::Mid, Self::Long]
    }
}

impl FromStr for ETimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "mid" | "medium" => Ok(Self::Mid),
            "long" => Ok(Self::Long),
            other => Err(format!("unknown time frame: {other}")),
        }
    }
}

/// Year offsets of each time frame relative to the projection base year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeFrameHorizons {
    /// First projection year; historic data up to this year anchors projections.
    pub base_year: i32,
    /// Years from the base year to the short horizon.
    pub short: i32,
    /// Years from the base year to the mid horizon.
    pub mid: i32,
    /// Years from the base year to the long horizon.
    pub long: i32,
}

impl Default for TimeFrameHorizons {
    fn default() -> Self {
        Self {
            base_year: 2020,
            short: 5,
            mid: 15,
            long: 30,
        }
    }
}

impl TimeFrameHorizons {
    /// Last year included when scoring `time_frame`.
    pub const fn horizon_year(&self, time_frame: ETimeFrame) -> i32 {
        self.base_year
            + match time_frame {
                ETimeFrame::Short => self.short,
                ETimeFrame::Mid => self.mid,
                ETimeFrame::Long => self.long,
            }
    }

    /// Horizon of the preceding time frame, or the base year for `Short`.
    ///
    /// A target counts towards `time_frame` only if it ends after this year.
    pub const fn lower_year(&self, time_frame: ETimeFrame) -> i32 {
        match time_frame {
            ETimeFrame::Short => self.base_year,
            ETimeFrame::Mid => self.horizon_year(ETimeFrame::Short),
            ETimeFrame::Long => self.horizon_year(ETimeFrame::Mid),
        }
    }

    /// Furthest horizon year among `time_frames`, or the base year if empty.
    pub fn max_horizon_year(&self, time_frames: &[ETimeFrame]) -> i32 {
        time_frames
            .iter()
            .map(|tf| self.horizon_year(*tf))
            .max()
            .unwrap_or(self.base_year)
    }

    /// Whether the offsets are strictly increasing and positive.
    pub const fn is_valid(&self) -> bool {
        self.short > 0 && self.mid > self.short && self.long > self.mid
    }
}

/// Kind of emission reduction target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// Reduction of total emissions
    #[display("absolute")]
    Absolute,

    /// Reduction of emissions per unit of production
    #[display("intensity")]
    Intensity,
}

/// A stated emission reduction target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionTarget {
    /// Scope the target covers.
    pub scope: EScope,
    /// Absolute or intensity target.
    pub target_type: TargetType,
    /// Reference year the reduction is measured against.
    pub base_year: i32,
    /// Year by which the reduction should be achieved.
    pub target_year: i32,
    /// Fractional reduction versus the base year, in `[0, 1]`.
    pub reduction_ambition: f64,
}

impl EmissionTarget {
    /// Whether the target can contribute to a pathway starting at `projection_start`.
    pub fn is_usable(&self, projection_start: i32) -> bool {
        self.target_year > projection_start
            && self.target_year > self.base_year
            && (0.0..=1.0).contains(&self.reduction_ambition)
    }
}

/// Fundamental and target data for one company, as held by a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyData {
    /// Unique company identifier.
    pub company_id: String,
    /// Display name.
    pub company_name: String,
    /// ISIN, when known.
    #[serde(default)]
    pub company_isin: Option<String>,
    /// Sector used for benchmark matching.
    pub sector: String,
    /// Region used for benchmark matching.
    pub region: String,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Enterprise value.
    #[serde(default)]
    pub enterprise_value: Option<f64>,
    /// Cash and cash equivalents.
    #[serde(default)]
    pub cash_equivalents: Option<f64>,
    /// Total assets.
    #[serde(default)]
    pub total_assets: Option<f64>,
    /// Revenue.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Share of the company's emissions attributed to the investor, in percent.
    #[serde(default)]
    pub ownership_percentage: Option<f64>,
    /// Stated emission targets.
    #[serde(default)]
    pub targets: Vec<EmissionTarget>,
    /// Historic emissions per single scope (tCO2e).
    #[serde(default)]
    pub historic_emissions: BTreeMap<EScope, YearSeries>,
    /// Historic production (sector-specific units).
    #[serde(default)]
    pub historic_production: YearSeries,
}

impl CompanyData {
    /// Historic emissions for `scope`.
    ///
    /// Composite scopes sum their components over the years every component
    /// reports; `None` if any component is missing.
    pub fn emissions(&self, scope: EScope) -> Option<YearSeries> {
        let mut components = scope.components().iter();
        let first = self.historic_emissions.get(components.next()?)?.clone();
        components.try_fold(first, |acc, component| {
            self.historic_emissions
                .get(component)
                .map(|series| acc.sum_common(series))
        })
    }

    /// Targets stated directly for `scope`.
    pub fn targets_for(&self, scope: EScope) -> Vec<&EmissionTarget> {
        self.targets.iter().filter(|t| t.scope == scope).collect()
    }
}

/// One holding in the requested portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCompany {
    /// Identifier used to look the company up in the data providers.
    pub company_id: String,
    /// Display name.
    pub company_name: String,
    /// ISIN, when known.
    #[serde(default)]
    pub company_isin: Option<String>,
    /// Value invested in the company.
    pub investment_value: f64,
    /// Free-form fields for grouping or extra output columns.
    #[serde(default)]
    pub user_fields: BTreeMap<String, Value>,
}

/// Company attributes carried into every score row and used for weighting and grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFacts {
    /// Unique company identifier.
    pub company_id: String,
    /// Display name.
    pub company_name: String,
    /// ISIN, when known.
    pub company_isin: Option<String>,
    /// Sector.
    pub sector: String,
    /// Region.
    pub region: String,
    /// Value invested in the company.
    pub investment_value: f64,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Enterprise value.
    pub enterprise_value: Option<f64>,
    /// Cash and cash equivalents.
    pub cash_equivalents: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Revenue.
    pub revenue: Option<f64>,
    /// Ownership of the company's emissions, in percent.
    pub ownership_percentage: Option<f64>,
    /// Free-form portfolio fields.
    #[serde(flatten)]
    pub user_fields: BTreeMap<String, Value>,
}

impl CompanyFacts {
    /// Join a portfolio entry with the provider's company data.
    ///
    /// Identity fields from the portfolio entry take precedence.
    pub fn join(entry: &PortfolioCompany, data: &CompanyData) -> Self {
        Self {
            company_id: entry.company_id.clone(),
            company_name: entry.company_name.clone(),
            company_isin: entry
                .company_isin
                .clone()
                .or_else(|| data.company_isin.clone()),
            sector: data.sector.clone(),
            region: data.region.clone(),
            investment_value: entry.investment_value,
            market_cap: data.market_cap,
            enterprise_value: data.enterprise_value,
            cash_equivalents: data.cash_equivalents,
            total_assets: data.total_assets,
            revenue: data.revenue,
            ownership_percentage: data.ownership_percentage,
            user_fields: entry.user_fields.clone(),
        }
    }

    /// Enterprise value plus cash, when both are known.
    pub fn ev_plus_cash(&self) -> Option<f64> {
        Some(self.enterprise_value? + self.cash_equivalents?)
    }

    /// Whether `column` names a known company attribute.
    pub fn is_known_column(column: &str) -> bool {
        matches!(
            column,
            "company_id"
                | "company_name"
                | "company_isin"
                | "sector"
                | "region"
                | "investment_value"
                | "market_cap"
                | "enterprise_value"
                | "cash_equivalents"
                | "total_assets"
                | "revenue"
                | "ownership_percentage"
        )
    }

    /// Attribute value rendered for grouping; `None` when absent.
    pub fn attribute(&self, column: &str) -> Option<String> {
        let number = |v: Option<f64>| v.map(|x| x.to_string());
        match column {
            "company_id" => Some(self.company_id.clone()),
            "company_name" => Some(self.company_name.clone()),
            "company_isin" => self.company_isin.clone(),
            "sector" => Some(self.sector.clone()),
            "region" => Some(self.region.clone()),
            "investment_value" => Some(self.investment_value.to_string()),
            "market_cap" => number(self.market_cap),
            "enterprise_value" => number(self.enterprise_value),
            "cash_equivalents" => number(self.cash_equivalents),
            "total_assets" => number(self.total_assets),
            "revenue" => number(self.revenue),
            "ownership_percentage" => number(self.ownership_percentage),
            other => match self.user_fields.get(other) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(v) => Some(v.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::YearValue;
    use rstest::rstest;

    #[rstest]
    #[case("S1", EScope::S1)]
    #[case("s1+s2", EScope::S1S2)]
    #[case("S1S2S3", EScope::S1S2S3)]
    fn test_scope_from_str(#[case] input: &str, #[case] expected: EScope) {
        assert_eq!(input.parse::<EScope>().unwrap(), expected);
    }

    #[test]
    fn test_scope_display_matches_serde() {
        for scope in EScope::all() {
            let json = serde_json::to_string(&scope).unwrap();
            assert_eq!(json, format!("\"{scope}\""));
        }
    }

    #[test]
    fn test_horizons() {
        let horizons = TimeFrameHorizons::default();
        assert_eq!(horizons.horizon_year(ETimeFrame::Short), 2025);
        assert_eq!(horizons.horizon_year(ETimeFrame::Long), 2050);
        assert_eq!(horizons.lower_year(ETimeFrame::Mid), 2025);
        assert_eq!(horizons.max_horizon_year(&[ETimeFrame::Mid]), 2035);
        assert!(horizons.is_valid());
    }

    #[test]
    fn test_composite_emissions_sum_components() {
        let mut emissions = BTreeMap::new();
        emissions.insert(
            EScope::S1,
            YearSeries::from(vec![YearValue::new(2019, 10.0), YearValue::new(2020, 8.0)]),
        );
        emissions.insert(
            EScope::S2,
            YearSeries::from(vec![YearValue::new(2020, 2.0)]),
        );
        let company = CompanyData {
            company_id: "A".into(),
            company_name: "A".into(),
            company_isin: None,
            sector: "Steel".into(),
            region: "Europe".into(),
            market_cap: None,
            enterprise_value: None,
            cash_equivalents: None,
            total_assets: None,
            revenue: None,
            ownership_percentage: None,
            targets: vec![],
            historic_emissions: emissions,
            historic_production: YearSeries::new(),
        };

        let s1s2 = company.emissions(EScope::S1S2).unwrap();
        assert_eq!(s1s2.len(), 1);
        assert_eq!(s1s2.get(2020), Some(10.0));
        assert!(company.emissions(EScope::S1S2S3).is_none());
    }

    #[test]
    fn test_target_usability() {
        let target = EmissionTarget {
            scope: EScope::S1S2,
            target_type: TargetType::Absolute,
            base_year: 2018,
            target_year: 2030,
            reduction_ambition: 0.5,
        };
        assert!(target.is_usable(2020));
        assert!(!target.is_usable(2030));
        let too_ambitious = EmissionTarget {
            reduction_ambition: 1.5,
            ..target
        };
        assert!(!too_ambitious.is_usable(2020));
    }
}
