//! Demonstration of a full temperature score calculation with inline data.

use itr::output::{ExportFormat, Exporter, summary};
use itr::{ItrConfig, ProviderCatalog, TemperatureScoreRequest, calculate};

const REQUEST: &str = r#"{
    "companies": [
        {"company_id": "US0079031078", "company_name": "Company AG", "investment_value": 35000000,
         "user_fields": {"portfolio": "core"}},
        {"company_id": "US00724F1012", "company_name": "Company AH", "investment_value": 15000000,
         "user_fields": {"portfolio": "satellite"}}
    ],
    "aggregation_method": "MOTS",
    "grouping_columns": ["portfolio"],
    "include_columns": ["sector", "score_result_type"],
    "scopes": ["S1+S2"],
    "company_data": [
        {
            "company_id": "US0079031078",
            "company_name": "Company AG",
            "sector": "Electricity Utilities",
            "region": "Europe",
            "market_cap": 5000000000,
            "targets": [
                {"scope": "S1+S2", "target_type": "intensity", "base_year": 2019,
                 "target_year": 2035, "reduction_ambition": 0.6}
            ],
            "historic_emissions": {
                "S1": [{"year": 2018, "value": 5200000}, {"year": 2019, "value": 5000000}, {"year": 2020, "value": 4700000}],
                "S2": [{"year": 2018, "value": 300000}, {"year": 2019, "value": 290000}, {"year": 2020, "value": 280000}]
            },
            "historic_production": [
                {"year": 2018, "value": 10000000}, {"year": 2019, "value": 10100000}, {"year": 2020, "value": 10150000}
            ]
        },
        {
            "company_id": "US00724F1012",
            "company_name": "Company AH",
            "sector": "Steel",
            "region": "Asia",
            "market_cap": 800000000,
            "historic_emissions": {
                "S1": [{"year": 2019, "value": 2100000}, {"year": 2020, "value": 2150000}],
                "S2": [{"year": 2019, "value": 400000}, {"year": 2020, "value": 410000}]
            },
            "historic_production": [{"year": 2019, "value": 1200000}, {"year": 2020, "value": 1210000}]
        }
    ],
    "benchmarks": {
        "production": [
            {"sector": "Electricity Utilities", "region": "Global", "scope": "S1+S2",
             "projections": [{"year": 2020, "value": 0.0}, {"year": 2021, "value": 0.02}, {"year": 2050, "value": 0.02}]}
        ],
        "intensity": {
            "benchmark_temperature": 1.5,
            "benchmark_global_budget": 396.0,
            "is_afolu_included": false,
            "benchmarks": [
                {"sector": "Electricity Utilities", "region": "Europe", "scope": "S1+S2",
                 "projections": [{"year": 2020, "value": 0.45}, {"year": 2030, "value": 0.15}, {"year": 2050, "value": 0.0}]},
                {"sector": "Steel", "region": "Global", "scope": "S1+S2",
                 "projections": [{"year": 2020, "value": 1.9}, {"year": 2035, "value": 1.2}, {"year": 2050, "value": 0.3}]}
            ]
        }
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ITR Temperature Score Demo ===\n");

    let config = ItrConfig::default();
    let catalog = ProviderCatalog::new();
    let request = TemperatureScoreRequest::from_json_str(REQUEST)?;

    let report = calculate(&request, &config, &catalog)?;

    println!("1. Portfolio scores");
    if let Some(aggregations) = &report.aggregated_scores {
        println!("{}", summary::to_ascii_table(aggregations));
        println!("{}", summary::to_markdown(aggregations));
    }

    println!("2. Company scores (CSV)\n");
    println!("{}", report.companies.export_to_string(ExportFormat::Csv)?);

    println!("3. Company scores as a DataFrame\n");
    println!("{}", report.companies.to_dataframe()?);

    println!("4. Full report (JSON)\n");
    println!("{}", report.to_json()?);

    Ok(())
}
