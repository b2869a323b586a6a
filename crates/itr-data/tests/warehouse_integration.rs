//! Integration tests for loading reference data and building portfolio rows.

use approx::assert_relative_eq;
use itr_data::{
    BenchmarkStore, CompanyDataStore, CompositeCompanyProvider, DataWarehouse, EScope,
    PortfolioCompany, ProjectionSettings,
};
use std::collections::BTreeMap;
use std::sync::Arc;

const BENCHMARKS: &str = r#"{
    "production": [
        {"sector": "Electricity Utilities", "region": "Europe", "scope": "S1+S2",
         "projections": [{"year": 2020, "value": 0.0}, {"year": 2021, "value": 0.01}]}
    ],
    "intensity": {
        "benchmark_temperature": 1.5,
        "benchmark_global_budget": 396.0,
        "is_afolu_included": false,
        "benchmarks": [
            {"sector": "Electricity Utilities", "region": "Europe", "scope": "S1+S2",
             "projections": [{"year": 2020, "value": 0.5}, {"year": 2050, "value": 0.05}]}
        ]
    }
}"#;

const COMPANIES: &str = r#"[
    {
        "company_id": "US0079031078",
        "company_name": "Company AG",
        "sector": "Electricity Utilities",
        "region": "Europe",
        "market_cap": 5000.0,
        "targets": [
            {"scope": "S1+S2", "target_type": "intensity", "base_year": 2019,
             "target_year": 2030, "reduction_ambition": 0.4}
        ],
        "historic_emissions": {
            "S1": [{"year": 2019, "value": 400.0}, {"year": 2020, "value": 380.0}],
            "S2": [{"year": 2019, "value": 100.0}, {"year": 2020, "value": 95.0}]
        },
        "historic_production": [{"year": 2019, "value": 1000.0}, {"year": 2020, "value": 1000.0}]
    }
]"#;

fn portfolio_entry(id: &str) -> PortfolioCompany {
    PortfolioCompany {
        company_id: id.to_string(),
        company_name: "Company AG".to_string(),
        company_isin: Some(id.to_string()),
        investment_value: 35_000_000.0,
        user_fields: BTreeMap::new(),
    }
}

#[test]
fn test_rows_from_json_reference_data() {
    let benchmarks = BenchmarkStore::from_json_str(BENCHMARKS).unwrap();
    let store = CompanyDataStore::from_json_str("reference", COMPANIES).unwrap();
    let companies = CompositeCompanyProvider::new().with(Arc::new(store));
    let warehouse = DataWarehouse::new(&companies, &benchmarks, ProjectionSettings::default());

    let rows = warehouse
        .build(&[portfolio_entry("US0079031078")], &[EScope::S1S2], 2050)
        .unwrap();
    let row = &rows[0];

    assert_relative_eq!(row.base_year_emissions.unwrap(), 475.0);
    assert_relative_eq!(row.base_intensity.unwrap(), 0.475);

    let production = row.projected_production.as_ref().unwrap();
    assert_relative_eq!(production.get(2021).unwrap(), 1010.0);

    let targets = row.projected_targets.as_ref().unwrap();
    assert_relative_eq!(targets.get(2030).unwrap(), 0.5 * 0.6, epsilon = 1e-12);
    assert_eq!(row.target_end_year, Some(2030));

    let matched = row.benchmark.require().unwrap();
    assert_eq!(matched.region, "Europe");
    assert_relative_eq!(matched.calibration.benchmark_global_budget, 396.0);
}

#[test]
fn test_scopes_without_history_are_unprojected() {
    let benchmarks = BenchmarkStore::from_json_str(BENCHMARKS).unwrap();
    let store = CompanyDataStore::from_json_str("reference", COMPANIES).unwrap();
    let warehouse = DataWarehouse::new(&store, &benchmarks, ProjectionSettings::default());

    let rows = warehouse
        .build(&[portfolio_entry("US0079031078")], &[EScope::S3], 2030)
        .unwrap();
    assert!(rows[0].base_year_emissions.is_none());
    assert!(rows[0].projected_intensities.is_none());
    assert!(rows[0].benchmark.matched().is_none());
}
