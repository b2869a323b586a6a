#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/itr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregation;
pub mod error;
pub mod record;
pub mod temperature;

pub use aggregation::{
    AggregationEngine, Contribution, GroupKey, MethodInfo, PortfolioAggregationMethod,
    ScoreAggregation, ScoreAggregations, available_methods, get_method_info,
};
pub use error::{Result, ScoringError};
pub use record::{RejectedScore, ScoreDiagnostics, ScoreRecord, ScoreResultType, ScoreSet};
pub use temperature::{ScoringConfig, ScoringEngine};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
