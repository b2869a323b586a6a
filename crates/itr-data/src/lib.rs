#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/itr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod error;
pub mod interfaces;
pub mod projection;
pub mod provider;
pub mod series;
pub mod warehouse;

pub use benchmark::{
    BenchmarkCalibration, BenchmarkData, BenchmarkKey, BenchmarkStore, GLOBAL_REGION,
    IntensityBenchmark, IntensityBenchmarkSet, ProductionBenchmark,
};
pub use error::{DataError, Result};
pub use interfaces::{
    CompanyData, CompanyFacts, EScope, ETimeFrame, EmissionTarget, PortfolioCompany, TargetType,
    TimeFrameHorizons,
};
pub use provider::{BenchmarkProvider, CompanyDataProvider, CompanyDataStore, CompositeCompanyProvider};
pub use series::{YearSeries, YearValue};
pub use warehouse::{BenchmarkMatch, DataWarehouse, MatchedBenchmark, PortfolioRow, ProjectionSettings};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
