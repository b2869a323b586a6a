#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/itr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod request;

// Re-export main types from sub-crates
pub use itr_data as data;
pub use itr_output as output;
pub use itr_scoring as scoring;

pub use catalog::{NamedProvider, ProviderCatalog, ProviderDescription};
pub use config::{ConfigError, ItrConfig, ProviderConfig, ProviderKind, ProviderParameters};
pub use error::{ErrorKind, ErrorResponse, ItrError, Result};
pub use pipeline::{COMPANY_COLUMNS, INLINE_PROVIDER, calculate};
pub use request::TemperatureScoreRequest;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
