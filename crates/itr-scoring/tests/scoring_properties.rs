//! End-to-end properties of scoring and aggregation.

use approx::assert_relative_eq;
use itr_data::{
    BenchmarkData, BenchmarkStore, CompanyData, CompanyDataStore, CompanyFacts, DataWarehouse,
    EScope, ETimeFrame, EmissionTarget, IntensityBenchmark, IntensityBenchmarkSet, PortfolioCompany,
    ProductionBenchmark, TargetType, TimeFrameHorizons, YearSeries,
};
use itr_scoring::{
    AggregationEngine, PortfolioAggregationMethod, ScoreRecord, ScoreResultType, ScoringConfig,
    ScoringEngine,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use std::collections::BTreeMap;

fn curve(start: f64, end: f64) -> YearSeries {
    [(2020, start), (2050, end)].into_iter().collect()
}

fn benchmarks() -> BenchmarkStore {
    let intensity = |scope| IntensityBenchmark {
        sector: "Steel".into(),
        region: "Global".into(),
        scope,
        projections: curve(1.0, 0.2),
    };
    let production = |scope| ProductionBenchmark {
        sector: "Steel".into(),
        region: "Global".into(),
        scope,
        projections: curve(0.01, 0.01),
    };
    BenchmarkStore::new(BenchmarkData {
        production: vec![production(EScope::S1), production(EScope::S1S2)],
        intensity: IntensityBenchmarkSet {
            benchmark_temperature: 1.5,
            benchmark_global_budget: 396.0,
            is_afolu_included: false,
            benchmarks: vec![intensity(EScope::S1), intensity(EScope::S1S2)],
        },
    })
    .unwrap()
}

fn company(id: &str, emissions: &[(EScope, [f64; 3])]) -> CompanyData {
    let historic_emissions = emissions
        .iter()
        .map(|(scope, values)| {
            let series: YearSeries = (2018..=2020).zip(values.iter().copied()).collect();
            (*scope, series)
        })
        .collect();
    CompanyData {
        company_id: id.into(),
        company_name: format!("Company {id}"),
        company_isin: None,
        sector: "Steel".into(),
        region: "Europe".into(),
        market_cap: Some(1000.0),
        enterprise_value: None,
        cash_equivalents: None,
        total_assets: None,
        revenue: None,
        ownership_percentage: None,
        targets: vec![],
        historic_emissions,
        historic_production: [(2018, 100.0), (2019, 100.0), (2020, 100.0)]
            .into_iter()
            .collect(),
    }
}

fn entry(id: &str, value: f64) -> PortfolioCompany {
    PortfolioCompany {
        company_id: id.into(),
        company_name: format!("Company {id}"),
        company_isin: None,
        investment_value: value,
        user_fields: BTreeMap::new(),
    }
}

#[test]
fn test_composite_scope_scores_summed_emissions() {
    let split = company("SPLIT", &[(EScope::S1, [80.0, 75.0, 70.0]), (EScope::S2, [20.0, 20.0, 20.0])]);
    let merged = company("MERGED", &[(EScope::S1, [100.0, 95.0, 90.0])]);
    let store = CompanyDataStore::from_companies("test", vec![split, merged]).unwrap();
    let benchmarks = benchmarks();
    let config = ScoringConfig::default();
    let horizons = TimeFrameHorizons::default();
    let warehouse = DataWarehouse::new(&store, &benchmarks, config.projection_settings(horizons));
    let engine = ScoringEngine::new(config, horizons).unwrap();

    let composite = warehouse.build(&[entry("SPLIT", 1.0)], &[EScope::S1S2], 2050).unwrap();
    let single = warehouse.build(&[entry("MERGED", 1.0)], &[EScope::S1], 2050).unwrap();
    let time_frames = ETimeFrame::all();

    let composite = engine.score(&composite, &[EScope::S1S2], &time_frames, 3.2).unwrap();
    let single = engine.score(&single, &[EScope::S1], &time_frames, 3.2).unwrap();
    for (a, b) in composite.records.iter().zip(&single.records) {
        assert_eq!(a.time_frame, b.time_frame);
        assert_eq!(a.score_result_type, ScoreResultType::Trajectory);
        assert_relative_eq!(a.temperature_score, b.temperature_score, epsilon = 1e-12);
    }
}

#[test]
fn test_short_score_independent_of_requested_time_frames() {
    let mut growing = company("GROW", &[(EScope::S1, [100.0, 100.0, 100.0])]);
    growing.targets = vec![EmissionTarget {
        scope: EScope::S1,
        target_type: TargetType::Absolute,
        base_year: 2020,
        target_year: 2040,
        reduction_ambition: 0.5,
    }];
    let store = CompanyDataStore::from_companies("test", vec![growing]).unwrap();
    let benchmarks = benchmarks();
    let config = ScoringConfig::default();
    let horizons = TimeFrameHorizons::default();
    let warehouse = DataWarehouse::new(&store, &benchmarks, config.projection_settings(horizons));
    let engine = ScoringEngine::new(config, horizons).unwrap();

    let short_only = warehouse
        .build(&[entry("GROW", 1.0)], &[EScope::S1], horizons.horizon_year(ETimeFrame::Short))
        .unwrap();
    let all_frames = warehouse
        .build(&[entry("GROW", 1.0)], &[EScope::S1], horizons.horizon_year(ETimeFrame::Long))
        .unwrap();

    let alone = engine.score(&short_only, &[EScope::S1], &[ETimeFrame::Short], 3.2).unwrap();
    let together = engine
        .score(&all_frames, &[EScope::S1], &[ETimeFrame::Short, ETimeFrame::Long], 3.2)
        .unwrap();
    let short = together
        .records
        .iter()
        .find(|r| r.time_frame == ETimeFrame::Short)
        .unwrap();

    assert_eq!(alone.records[0].score_result_type, ScoreResultType::Blended);
    assert_relative_eq!(
        alone.records[0].target_score.unwrap(),
        short.target_score.unwrap(),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        alone.records[0].temperature_score,
        short.temperature_score,
        epsilon = 1e-12
    );
}

fn random_records(rng: &mut StdRng, n: usize) -> Vec<ScoreRecord> {
    let sectors = ["Steel", "Cement", "Utilities"];
    (0..n)
        .map(|i| {
            let fallback = rng.gen_range(0.0..1.0) < 0.2;
            let mut user_fields = BTreeMap::new();
            if rng.gen_range(0.0..1.0) < 0.7 {
                let desk = if rng.gen_range(0.0..1.0) < 0.5 { "equity" } else { "credit" };
                user_fields.insert("desk".to_string(), serde_json::json!(desk));
            }
            ScoreRecord {
                company: CompanyFacts {
                    company_id: format!("C{i}"),
                    company_name: format!("Company {i}"),
                    company_isin: None,
                    sector: sectors[rng.gen_range(0..sectors.len())].to_string(),
                    region: "Europe".into(),
                    investment_value: rng.gen_range(1.0..100.0),
                    market_cap: (rng.gen_range(0.0..1.0) < 0.8).then(|| rng.gen_range(100.0..1000.0)),
                    enterprise_value: None,
                    cash_equivalents: None,
                    total_assets: None,
                    revenue: None,
                    ownership_percentage: None,
                    user_fields,
                },
                scope: EScope::S1S2,
                time_frame: ETimeFrame::Mid,
                base_year_emissions: Some(rng.gen_range(1.0..500.0)),
                trajectory_score: None,
                target_score: None,
                temperature_score: if fallback { 3.2 } else { rng.gen_range(1.0..5.0) },
                score_result_type: if fallback {
                    ScoreResultType::Fallback
                } else {
                    ScoreResultType::Trajectory
                },
                diagnostics: None,
                projected_targets: None,
                projected_intensities: None,
            }
        })
        .collect()
}

#[rstest]
#[case(PortfolioAggregationMethod::Wats, 1)]
#[case(PortfolioAggregationMethod::Tets, 2)]
#[case(PortfolioAggregationMethod::Mots, 3)]
fn test_weights_normalize_and_groups_partition(
    #[case] method: PortfolioAggregationMethod,
    #[case] seed: u64,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = random_records(&mut rng, 40);
    let columns = vec!["sector".to_string(), "desk".to_string()];
    let result = AggregationEngine::new(method)
        .aggregate(&records, &columns)
        .unwrap();

    let total = result.get(EScope::S1S2, ETimeFrame::Mid).unwrap();
    assert_eq!(total.num_companies, records.len());
    assert!(total.contributions.iter().all(|c| c.weight >= 0.0));
    let weight_sum: f64 = total.contributions.iter().map(|c| c.weight).sum();
    assert_relative_eq!(weight_sum, 1.0, epsilon = 1e-9);
    assert_relative_eq!(
        total.weighted_investment_value + total.uncovered_investment_value,
        total.total_investment_value,
        epsilon = 1e-9
    );
    assert!((0.0..=100.0).contains(&total.coverage_percentage));

    let groups: Vec<_> = result.groups(EScope::S1S2, ETimeFrame::Mid).collect();
    let grouped: usize = groups.iter().map(|g| g.num_companies).sum();
    assert_eq!(grouped, records.len());
    let mut ids: Vec<&str> = groups
        .iter()
        .flat_map(|g| g.contributions.iter().map(|c| c.company_id.as_str()))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), records.len());
    let grouped_value: f64 = groups.iter().map(|g| g.total_investment_value).sum();
    assert_relative_eq!(grouped_value, total.total_investment_value, epsilon = 1e-9);
}

#[test]
fn test_all_fallback_portfolio() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut records = random_records(&mut rng, 5);
    for record in &mut records {
        record.temperature_score = 3.2;
        record.score_result_type = ScoreResultType::Fallback;
    }
    let result = AggregationEngine::new(PortfolioAggregationMethod::Wats)
        .aggregate(&records, &[])
        .unwrap();
    let total = result.get(EScope::S1S2, ETimeFrame::Mid).unwrap();
    assert_relative_eq!(total.temperature_score.unwrap(), 3.2, epsilon = 1e-12);
    assert_relative_eq!(total.coverage_percentage, 0.0);
}
