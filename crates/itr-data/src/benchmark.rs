//! Production and emission-intensity benchmark curves.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::interfaces::EScope;
use crate::provider::BenchmarkProvider;
use crate::series::YearSeries;

/// Region name of curves that apply when no region-specific curve exists.
pub const GLOBAL_REGION: &str = "Global";

/// Lookup key of a benchmark curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BenchmarkKey {
    /// Sector name.
    pub sector: String,
    /// Region name.
    pub region: String,
    /// Scope the curve applies to.
    pub scope: EScope,
}

impl BenchmarkKey {
    /// Create a new key.
    pub fn new(sector: impl Into<String>, region: impl Into<String>, scope: EScope) -> Self {
        Self {
            sector: sector.into(),
            region: region.into(),
            scope,
        }
    }
}

impl fmt::Display for BenchmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.sector, self.region, self.scope)
    }
}

/// Projected yearly production growth for a sector and region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionBenchmark {
    /// Sector name.
    pub sector: String,
    /// Region name.
    pub region: String,
    /// Scope the curve applies to.
    pub scope: EScope,
    /// Yearly growth rates (0.02 = 2 % growth over the previous year).
    pub projections: YearSeries,
}

/// Allowed emission intensity pathway for a sector and region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityBenchmark {
    /// Sector name.
    pub sector: String,
    /// Region name.
    pub region: String,
    /// Scope the curve applies to.
    pub scope: EScope,
    /// Allowed emission intensity per year.
    pub projections: YearSeries,
}

/// Calibration shared by every intensity curve of a benchmark set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCalibration {
    /// Temperature outcome the benchmark is aligned with (°C).
    pub benchmark_temperature: f64,
    /// Global carbon budget consistent with that outcome (GtCO2).
    pub benchmark_global_budget: f64,
    /// Whether the budget includes agriculture, forestry and other land use.
    pub is_afolu_included: bool,
}

/// A set of intensity curves sharing one calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityBenchmarkSet {
    /// Temperature outcome the benchmark is aligned with (°C).
    pub benchmark_temperature: f64,
    /// Global carbon budget consistent with that outcome (GtCO2).
    pub benchmark_global_budget: f64,
    /// Whether the budget includes agriculture, forestry and other land use.
    #[serde(default)]
    pub is_afolu_included: bool,
    /// Curves by sector, region and scope.
    pub benchmarks: Vec<IntensityBenchmark>,
}

/// Benchmark reference data as supplied in a file or request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkData {
    /// Production growth curves.
    pub production: Vec<ProductionBenchmark>,
    /// Emission intensity curves.
    pub intensity: IntensityBenchmarkSet,
}

/// Immutable, indexed benchmark curves.
#[derive(Debug, Clone)]
pub struct BenchmarkStore {
    production: HashMap<BenchmarkKey, ProductionBenchmark>,
    intensity: HashMap<BenchmarkKey, IntensityBenchmark>,
    calibration: BenchmarkCalibration,
}

impl BenchmarkStore {
    /// Index benchmark data.
    ///
    /// Fails if the calibration is not finite or a key appears twice.
    pub fn new(data: BenchmarkData) -> Result<Self> {
        let BenchmarkData {
            production,
            intensity,
        } = data;

        let calibration = BenchmarkCalibration {
            benchmark_temperature: intensity.benchmark_temperature,
            benchmark_global_budget: intensity.benchmark_global_budget,
            is_afolu_included: intensity.is_afolu_included,
        };
        if !calibration.benchmark_temperature.is_finite()
            || !calibration.benchmark_global_budget.is_finite()
        {
            return Err(DataError::InvalidData(
                "benchmark temperature and global budget must be finite".to_string(),
            ));
        }

        let mut production_index = HashMap::with_capacity(production.len());
        for curve in production {
            let key = BenchmarkKey::new(&curve.sector, &curve.region, curve.scope);
            if production_index.insert(key.clone(), curve).is_some() {
                return Err(DataError::InvalidData(format!(
                    "duplicate production benchmark {key}"
                )));
            }
        }

        let mut intensity_index = HashMap::with_capacity(intensity.benchmarks.len());
        for curve in intensity.benchmarks {
            let key = BenchmarkKey::new(&curve.sector, &curve.region, curve.scope);
            if intensity_index.insert(key.clone(), curve).is_some() {
                return Err(DataError::InvalidData(format!(
                    "duplicate intensity benchmark {key}"
                )));
            }
        }

        Ok(Self {
            production: production_index,
            intensity: intensity_index,
            calibration,
        })
    }

    /// Load benchmark data from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Parse benchmark data from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Number of (production, intensity) curves.
    pub fn curve_counts(&self) -> (usize, usize) {
        (self.production.len(), self.intensity.len())
    }

    /// Whether the store holds no curves at all.
    pub fn is_empty(&self) -> bool {
        self.production.is_empty() && self.intensity.is_empty()
    }
}

impl BenchmarkProvider for BenchmarkStore {
    fn production_benchmark(&self, key: &BenchmarkKey) -> Option<&ProductionBenchmark> {
        self.production.get(key)
    }

    fn intensity_benchmark(&self, key: &BenchmarkKey) -> Option<&IntensityBenchmark> {
        self.intensity.get(key)
    }

    fn calibration(&self) -> BenchmarkCalibration {
        self.calibration
    }
}
