//! Error types for data operations.

use thiserror::Error;

use crate::interfaces::EScope;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading company data or joining it with benchmarks.
#[derive(Debug, Error)]
pub enum DataError {
    /// Requested company is absent from every company data provider
    #[error("Unknown company: {0} is not available in the selected data providers")]
    UnknownCompany(String),

    /// No benchmark curve exists for the sector/region/scope combination
    #[error("Missing benchmark coverage for sector {sector}, region {region}, scope {scope}")]
    MissingBenchmarkCoverage {
        /// Sector of the company
        sector: String,
        /// Region of the company
        region: String,
        /// Requested scope
        scope: EScope,
    },

    /// Reference data is structurally valid JSON but semantically invalid
    #[error("Invalid reference data: {0}")]
    InvalidData(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
