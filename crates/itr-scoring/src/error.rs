//! Error types for scoring and aggregation.

use itr_data::{EScope, ETimeFrame};
use thiserror::Error;

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors raised while scoring or aggregating.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A record's inputs cannot produce a meaningful score
    #[error("Invalid projection for {company_id} ({scope}, {time_frame}): {reason}")]
    InvalidProjection {
        /// Company the record belongs to
        company_id: String,
        /// Scope of the record
        scope: EScope,
        /// Time frame of the record
        time_frame: ETimeFrame,
        /// What made the projection degenerate
        reason: String,
    },

    /// The aggregation method cannot weight the given records
    #[error("Invalid aggregation method {method}: {reason}")]
    InvalidAggregationMethod {
        /// Method name
        method: String,
        /// Why it cannot be applied
        reason: String,
    },

    /// Scoring parameters are out of range
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(String),
}
