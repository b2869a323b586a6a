//! Error taxonomy of a temperature score request.

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;

use itr_data::DataError;
use itr_output::TableError;
use itr_scoring::ScoringError;

use crate::config::ConfigError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ItrError>;

/// Errors surfaced by [`crate::calculate`] and the configuration layer.
#[derive(Debug, Error)]
pub enum ItrError {
    /// Data loading or joining failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Scoring or aggregation failed
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Score rows could not be tabulated
    #[error(transparent)]
    Table(#[from] TableError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request itself is invalid
    #[error("Malformed portfolio input: {0}")]
    Malformed(String),
}

impl ItrError {
    /// Shorthand for [`ItrError::Malformed`].
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed(detail.into())
    }

    /// Classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(DataError::UnknownCompany(_)) => ErrorKind::UnknownCompany,
            Self::Data(DataError::MissingBenchmarkCoverage { .. }) => {
                ErrorKind::MissingBenchmarkCoverage
            }
            Self::Data(_) | Self::Table(_) => ErrorKind::Internal,
            Self::Scoring(ScoringError::InvalidProjection { .. }) => ErrorKind::InvalidProjection,
            Self::Scoring(ScoringError::InvalidAggregationMethod { .. }) => {
                ErrorKind::InvalidAggregationMethod
            }
            Self::Scoring(ScoringError::InvalidConfig(_)) | Self::Config(_) => {
                ErrorKind::Configuration
            }
            Self::Malformed(_) => ErrorKind::MalformedPortfolioInput,
        }
    }
}

/// Error classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum ErrorKind {
    /// A requested company is absent from every selected provider
    #[display("UnknownCompany")]
    UnknownCompany,

    /// A benchmark curve was required but not found
    #[display("MissingBenchmarkCoverage")]
    MissingBenchmarkCoverage,

    /// Every record of a scope and time frame was degenerate
    #[display("InvalidProjection")]
    InvalidProjection,

    /// The aggregation method cannot weight the portfolio
    #[display("InvalidAggregationMethod")]
    InvalidAggregationMethod,

    /// The request failed validation
    #[display("MalformedPortfolioInput")]
    MalformedPortfolioInput,

    /// Configuration or reference data is unusable
    #[display("Configuration")]
    Configuration,

    /// Anything else
    #[display("Internal")]
    Internal,
}

impl ErrorKind {
    /// Whether the caller is at fault.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCompany | Self::MalformedPortfolioInput | Self::InvalidAggregationMethod
        )
    }

    /// HTTP-style status code of the class.
    pub const fn status(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

/// Client-facing rendering of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub detail: String,
}

impl From<&ItrError> for ErrorResponse {
    fn from(err: &ItrError) -> Self {
        let kind = err.kind();
        Self {
            status: kind.status(),
            kind,
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itr_data::{EScope, ETimeFrame};
    use rstest::rstest;

    #[rstest]
    #[case(ItrError::Data(DataError::UnknownCompany("X".into())), ErrorKind::UnknownCompany, 400)]
    #[case(ItrError::malformed("empty portfolio"), ErrorKind::MalformedPortfolioInput, 400)]
    #[case(
        ItrError::Scoring(ScoringError::InvalidAggregationMethod {
            method: "MOTS".into(),
            reason: "no market cap".into(),
        }),
        ErrorKind::InvalidAggregationMethod,
        400
    )]
    #[case(
        ItrError::Scoring(ScoringError::InvalidProjection {
            company_id: "X".into(),
            scope: EScope::S1S2,
            time_frame: ETimeFrame::Long,
            reason: "zero budget".into(),
        }),
        ErrorKind::InvalidProjection,
        500
    )]
    #[case(
        ItrError::Data(DataError::MissingBenchmarkCoverage {
            sector: "Steel".into(),
            region: "Asia".into(),
            scope: EScope::S3,
        }),
        ErrorKind::MissingBenchmarkCoverage,
        500
    )]
    #[case(ItrError::Data(DataError::InvalidData("bad".into())), ErrorKind::Internal, 500)]
    fn test_error_classes(#[case] err: ItrError, #[case] kind: ErrorKind, #[case] status: u16) {
        let response = ErrorResponse::from(&err);
        assert_eq!(response.kind, kind);
        assert_eq!(response.status, status);
        assert_eq!(response.detail, err.to_string());
    }

    #[test]
    fn test_response_json() {
        let response = ErrorResponse::from(&ItrError::malformed("no companies"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["kind"], "MalformedPortfolioInput");
        assert_eq!(json["detail"], "Malformed portfolio input: no companies");
    }
}
