//! Service configuration.
//!
//! Loaded once at start-up and passed explicitly to [`crate::calculate`].
//!
//! ```json
//! {
//!     "default_score": 3.2,
//!     "aggregation_method": "WATS",
//!     "log_level": "info",
//!     "data_providers": [
//!         {
//!             "name": "reference",
//!             "type": "json",
//!             "parameters": {
//!                 "company_path": "data/companies.json",
//!                 "benchmark_path": "data/benchmarks.json"
//!             }
//!         }
//!     ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use itr_data::TimeFrameHorizons;
use itr_scoring::{PortfolioAggregationMethod, ScoringConfig, ScoringError};

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Cannot read configuration {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`ItrConfig`]
    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Scoring parameters are out of range
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// A provider's reference data could not be loaded
    #[error("Cannot load data provider {name}: {reason}")]
    Provider {
        /// Provider name
        name: String,
        /// What went wrong
        reason: String,
    },

    /// Any other inconsistency
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Kind of backing store of a data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// JSON reference files
    #[display("json")]
    Json,
}

/// Where a provider finds its reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderParameters {
    /// JSON array of company data.
    pub company_path: PathBuf,
    /// JSON benchmark data; providers without it contribute companies only.
    #[serde(default)]
    pub benchmark_path: Option<PathBuf>,
}

/// One configured data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Name requests use to select the provider.
    pub name: String,
    /// Backing store.
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Store parameters.
    pub parameters: ProviderParameters,
}

/// Global configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItrConfig {
    /// Score assigned when neither projection resolves.
    pub default_score: f64,
    /// Aggregation method used when a request does not name one.
    pub aggregation_method: PortfolioAggregationMethod,
    /// Base year and time frame offsets.
    pub time_frames: TimeFrameHorizons,
    /// Scoring parameters.
    pub scoring: ScoringConfig,
    /// Default log filter of the binary.
    pub log_level: String,
    /// Configured data providers, in priority order.
    pub data_providers: Vec<ProviderConfig>,
    /// Directory relative provider paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for ItrConfig {
    fn default() -> Self {
        Self {
            default_score: 3.2,
            aggregation_method: PortfolioAggregationMethod::Wats,
            time_frames: TimeFrameHorizons::default(),
            scoring: ScoringConfig::default(),
            log_level: "info".to_string(),
            data_providers: Vec::new(),
            base_dir: None,
        }
    }
}

impl ItrConfig {
    /// Default location: `<config dir>/itr/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("itr").join("config.json"))
    }

    /// Load and validate a configuration file.
    ///
    /// Relative provider paths resolve against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse and validate a configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file at [`Self::default_path`], or the defaults if there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(path),
            _ => Ok(Self::default()),
        }
    }

    /// Check the configuration is consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        if !self.time_frames.is_valid() {
            return Err(ConfigError::Invalid(
                "time frame offsets must be positive and increasing".to_string(),
            ));
        }
        if !self.default_score.is_finite()
            || self.default_score < 0.0
            || !self.scoring.in_domain(self.default_score)
        {
            return Err(ConfigError::Invalid(format!(
                "default score {} is outside [{}, {}]",
                self.default_score,
                self.scoring.score_floor.max(0.0),
                self.scoring.score_ceiling
            )));
        }

        let mut names = HashSet::new();
        for provider in &self.data_providers {
            if provider.name.trim().is_empty() {
                return Err(ConfigError::Invalid("provider name is empty".to_string()));
            }
            if !names.insert(provider.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate provider name {}",
                    provider.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve a provider path against [`Self::base_dir`].
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ItrConfig::from_json_str("{}").unwrap();
        assert_eq!(config.default_score, 3.2);
        assert_eq!(config.aggregation_method, PortfolioAggregationMethod::Wats);
        assert_eq!(config.time_frames.base_year, 2020);
        assert_eq!(config.scoring.tcre, 2.2);
        assert!(config.data_providers.is_empty());
    }

    #[test]
    fn test_provider_entries() {
        let config = ItrConfig::from_json_str(
            r#"{
                "aggregation_method": "MOTS",
                "data_providers": [
                    {"name": "reference", "type": "json",
                     "parameters": {"company_path": "companies.json",
                                    "benchmark_path": "benchmarks.json"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.aggregation_method, PortfolioAggregationMethod::Mots);
        let provider = &config.data_providers[0];
        assert_eq!(provider.kind, ProviderKind::Json);
        assert_eq!(
            provider.parameters.benchmark_path.as_deref(),
            Some(Path::new("benchmarks.json"))
        );
    }

    #[rstest]
    #[case(r#"{"default_score": -1.0}"#)]
    #[case(r#"{"default_score": 7.0}"#)]
    #[case(r#"{"scoring": {"tcre": 0.0}}"#)]
    #[case(r#"{"time_frames": {"short": 10, "mid": 5}}"#)]
    #[case(
        r#"{"data_providers": [
            {"name": "a", "type": "json", "parameters": {"company_path": "x"}},
            {"name": "a", "type": "json", "parameters": {"company_path": "y"}}
        ]}"#
    )]
    fn test_invalid_configs(#[case] json: &str) {
        assert!(ItrConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = std::env::temp_dir().join("itr_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"log_level": "debug"}"#).unwrap();

        let config = ItrConfig::from_path(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.resolve(Path::new("data.json")), dir.join("data.json"));
        let absolute = std::env::temp_dir().join("elsewhere.json");
        assert_eq!(config.resolve(&absolute), absolute);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = ItrConfig::from_path("/nonexistent/itr/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
