//! Portfolio aggregation methods.
//!
//! Each method defines a raw weight per score record; the engine normalizes
//! the raw weights within every bucket. Methods are looked up by name through
//! a small registry so that callers can list and describe them.

use std::collections::HashMap;
use std::str::FromStr;

use derive_more::Display;
use itr_data::CompanyFacts;
use serde::{Deserialize, Serialize};

/// Weighting scheme for portfolio aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortfolioAggregationMethod {
    /// Weighted average temperature score
    #[display("WATS")]
    Wats,

    /// Total emissions weighted temperature score
    #[display("TETS")]
    Tets,

    /// Market cap owned emissions
    #[display("MOTS")]
    Mots,

    /// Enterprise value owned emissions
    #[display("EOTS")]
    Eots,

    /// Enterprise value plus cash owned emissions
    #[display("ECOTS")]
    Ecots,

    /// Total assets owned emissions
    #[display("AOTS")]
    Aots,

    /// Revenue owned emissions
    #[display("ROTS")]
    Rots,
}

impl PortfolioAggregationMethod {
    /// All methods, in registry order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Wats,
            Self::Tets,
            Self::Mots,
            Self::Eots,
            Self::Ecots,
            Self::Aots,
            Self::Rots,
        ]
    }

    /// Whether the weight scales with the company's emissions.
    pub const fn is_emissions_based(&self) -> bool {
        !matches!(self, Self::Wats)
    }

    /// Denominator of ownership-based methods.
    pub fn ownership_denominator(&self, company: &CompanyFacts) -> Option<f64> {
        match self {
            Self::Wats | Self::Tets => None,
            Self::Mots => company.market_cap,
            Self::Eots => company.enterprise_value,
            Self::Ecots => company.ev_plus_cash(),
            Self::Aots => company.total_assets,
            Self::Rots => company.revenue,
        }
    }

    /// Raw, unnormalized weight of a record.
    ///
    /// `None` when the attributes the method needs are absent. The value may
    /// still be non-positive or non-finite; the engine treats such weights as
    /// unusable.
    pub fn raw_weight(&self, company: &CompanyFacts, emissions: Option<f64>) -> Option<f64> {
        match self {
            Self::Wats => Some(company.investment_value),
            Self::Tets => {
                let ownership = company.ownership_percentage.unwrap_or(100.0) / 100.0;
                Some(emissions? * ownership)
            }
            _ => {
                let denominator = self.ownership_denominator(company)?;
                Some(company.investment_value / denominator * emissions?)
            }
        }
    }

    /// Registry entry of this method.
    pub fn info(&self) -> MethodInfo {
        available_methods()
            .into_iter()
            .find(|m| m.method == *self)
            .unwrap_or(MethodInfo {
                method: *self,
                name: "",
                description: "",
                required_attributes: &[],
            })
    }
}

impl FromStr for PortfolioAggregationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_method_info(s)
            .map(|info| info.method)
            .ok_or_else(|| format!("unknown aggregation method: {s}"))
    }
}

/// Method metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    /// The method.
    pub method: PortfolioAggregationMethod,
    /// Method name (unique identifier).
    pub name: &'static str,
    /// What the weight represents.
    pub description: &'static str,
    /// Attributes every weighted record needs.
    pub required_attributes: &'static [&'static str],
}

/// Get all available method info.
pub fn available_methods() -> Vec<MethodInfo> {
    vec![
        MethodInfo {
            method: PortfolioAggregationMethod::Wats,
            name: "WATS",
            description: "Investment value weighted average",
            required_attributes: &["investment_value"],
        },
        MethodInfo {
            method: PortfolioAggregationMethod::Tets,
            name: "TETS",
            description: "Emissions scaled by ownership percentage (default 100%)",
            required_attributes: &["base_year_emissions"],
        },
        MethodInfo {
            method: PortfolioAggregationMethod::Mots,
            name: "MOTS",
            description: "Emissions owned through share of market capitalization",
            required_attributes: &["investment_value", "market_cap", "base_year_emissions"],
        },
        MethodInfo {
            method: PortfolioAggregationMethod::Eots,
            name: "EOTS",
            description: "Emissions owned through share of enterprise value",
            required_attributes: &["investment_value", "enterprise_value", "base_year_emissions"],
        },
        MethodInfo {
            method: PortfolioAggregationMethod::Ecots,
            name: "ECOTS",
            description: "Emissions owned through share of enterprise value plus cash",
            required_attributes: &[
                "investment_value",
                "enterprise_value",
                "cash_equivalents",
                "base_year_emissions",
            ],
        },
        MethodInfo {
            method: PortfolioAggregationMethod::Aots,
            name: "AOTS",
            description: "Emissions owned through share of total assets",
            required_attributes: &["investment_value", "total_assets", "base_year_emissions"],
        },
        MethodInfo {
            method: PortfolioAggregationMethod::Rots,
            name: "ROTS",
            description: "Emissions owned through share of revenue",
            required_attributes: &["investment_value", "revenue", "base_year_emissions"],
        },
    ]
}

/// Get method info by name, case-insensitively.
pub fn get_method_info(name: &str) -> Option<MethodInfo> {
    let name = name.trim();
    available_methods()
        .into_iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Get a map of all methods indexed by name.
pub fn method_map() -> HashMap<&'static str, MethodInfo> {
    available_methods().into_iter().map(|m| (m.name, m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn company() -> CompanyFacts {
        CompanyFacts {
            company_id: "A".into(),
            company_name: "Alpha".into(),
            company_isin: None,
            sector: "Steel".into(),
            region: "Europe".into(),
            investment_value: 10.0,
            market_cap: Some(100.0),
            enterprise_value: Some(200.0),
            cash_equivalents: Some(50.0),
            total_assets: Some(500.0),
            revenue: Some(40.0),
            ownership_percentage: Some(50.0),
            user_fields: BTreeMap::new(),
        }
    }

    #[rstest]
    #[case(PortfolioAggregationMethod::Wats, 10.0)]
    #[case(PortfolioAggregationMethod::Tets, 500.0)]
    #[case(PortfolioAggregationMethod::Mots, 100.0)]
    #[case(PortfolioAggregationMethod::Eots, 50.0)]
    #[case(PortfolioAggregationMethod::Ecots, 40.0)]
    #[case(PortfolioAggregationMethod::Aots, 20.0)]
    #[case(PortfolioAggregationMethod::Rots, 250.0)]
    fn test_raw_weight(#[case] method: PortfolioAggregationMethod, #[case] expected: f64) {
        let weight = method.raw_weight(&company(), Some(1000.0)).unwrap();
        assert_relative_eq!(weight, expected);
    }

    #[test]
    fn test_missing_attributes_give_no_weight() {
        let mut company = company();
        company.market_cap = None;
        assert!(PortfolioAggregationMethod::Mots.raw_weight(&company, Some(1.0)).is_none());
        assert!(PortfolioAggregationMethod::Tets.raw_weight(&company, None).is_none());
        assert!(PortfolioAggregationMethod::Wats.raw_weight(&company, None).is_some());
    }

    #[test]
    fn test_tets_defaults_to_full_ownership() {
        let mut company = company();
        company.ownership_percentage = None;
        let weight = PortfolioAggregationMethod::Tets
            .raw_weight(&company, Some(80.0))
            .unwrap();
        assert_relative_eq!(weight, 80.0);
        assert!(
            !PortfolioAggregationMethod::Tets
                .info()
                .required_attributes
                .contains(&"ownership_percentage")
        );
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(available_methods().len(), 7);
        assert_eq!(method_map().len(), 7);
        assert_eq!(
            "ecots".parse::<PortfolioAggregationMethod>().unwrap(),
            PortfolioAggregationMethod::Ecots
        );
        assert!("XYZ".parse::<PortfolioAggregationMethod>().is_err());
        for method in PortfolioAggregationMethod::all() {
            assert_eq!(method.info().name, method.to_string());
        }
    }

    #[test]
    fn test_serde_uses_method_names() {
        let json = serde_json::to_string(&PortfolioAggregationMethod::Ecots).unwrap();
        assert_eq!(json, "\"ECOTS\"");
    }
}
