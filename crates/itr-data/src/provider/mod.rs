//! Data provider interfaces.
//!
//! The pipeline only talks to these traits. File-backed reference data and
//! inline request payloads both end up as a [`CompanyDataStore`]; several
//! stores can be chained with a [`CompositeCompanyProvider`].

pub mod composite;
pub mod store;

pub use composite::CompositeCompanyProvider;
pub use store::CompanyDataStore;

use std::fmt;

use crate::benchmark::{BenchmarkCalibration, BenchmarkKey, IntensityBenchmark, ProductionBenchmark};
use crate::interfaces::CompanyData;

/// Supplies company fundamental and target data by company id.
pub trait CompanyDataProvider: fmt::Debug + Send + Sync {
    /// Provider name, used in logs and the provider catalog.
    fn name(&self) -> &str;

    /// Look up one company.
    fn company(&self, company_id: &str) -> Option<&CompanyData>;

    /// Whether the provider knows `company_id`.
    fn contains(&self, company_id: &str) -> bool {
        self.company(company_id).is_some()
    }
}

/// Supplies benchmark curves by sector, region and scope.
pub trait BenchmarkProvider: fmt::Debug + Send + Sync {
    /// Production growth curve for an exact key.
    fn production_benchmark(&self, key: &BenchmarkKey) -> Option<&ProductionBenchmark>;

    /// Intensity curve for an exact key.
    fn intensity_benchmark(&self, key: &BenchmarkKey) -> Option<&IntensityBenchmark>;

    /// Calibration of the intensity curves.
    fn calibration(&self) -> BenchmarkCalibration;
}
