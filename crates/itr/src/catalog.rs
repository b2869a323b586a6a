//! Named data providers built from the configuration.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use itr_data::{BenchmarkStore, CompanyDataProvider, CompanyDataStore};

use crate::config::{ConfigError, ItrConfig, ProviderKind};

/// A configured provider with its loaded reference data.
#[derive(Debug, Clone)]
pub struct NamedProvider {
    /// Name requests select the provider by.
    pub name: String,
    /// Backing store kind.
    pub kind: ProviderKind,
    /// Company data.
    pub companies: Arc<dyn CompanyDataProvider>,
    /// Benchmark curves, when the provider ships them.
    pub benchmarks: Option<Arc<BenchmarkStore>>,
}

/// Entry of the provider listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescription {
    /// Provider name.
    pub name: String,
    /// Backing store kind.
    #[serde(rename = "type")]
    pub kind: ProviderKind,
}

/// Providers available to requests, in configuration order.
///
/// Built once at start-up and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    providers: Vec<NamedProvider>,
}

impl ProviderCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured provider.
    pub fn from_config(config: &ItrConfig) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for provider in &config.data_providers {
            let load_error = |reason: String| ConfigError::Provider {
                name: provider.name.clone(),
                reason,
            };
            match provider.kind {
                ProviderKind::Json => {
                    let company_path = config.resolve(&provider.parameters.company_path);
                    let companies = CompanyDataStore::from_json_path(&provider.name, &company_path)
                        .map_err(|e| load_error(format!("{}: {e}", company_path.display())))?;
                    let benchmarks = provider
                        .parameters
                        .benchmark_path
                        .as_deref()
                        .map(|path| {
                            let path = config.resolve(path);
                            BenchmarkStore::from_json_path(&path)
                                .map_err(|e| load_error(format!("{}: {e}", path.display())))
                        })
                        .transpose()?;
                    info!(
                        provider = %provider.name,
                        companies = companies.len(),
                        benchmarks = benchmarks.is_some(),
                        "loaded data provider"
                    );
                    catalog.register(
                        provider.name.clone(),
                        provider.kind,
                        Arc::new(companies),
                        benchmarks.map(Arc::new),
                    )?;
                }
            }
        }
        Ok(catalog)
    }

    /// Add a provider under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: ProviderKind,
        companies: Arc<dyn CompanyDataProvider>,
        benchmarks: Option<Arc<BenchmarkStore>>,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ConfigError::Invalid(format!(
                "duplicate provider name {name}"
            )));
        }
        self.providers.push(NamedProvider {
            name,
            kind,
            companies,
            benchmarks,
        });
        Ok(())
    }

    /// Provider named `name`.
    pub fn get(&self, name: &str) -> Option<&NamedProvider> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Name and kind of every provider.
    pub fn describe(&self) -> Vec<ProviderDescription> {
        self.providers
            .iter()
            .map(|p| ProviderDescription {
                name: p.name.clone(),
                kind: p.kind,
            })
            .collect()
    }

    /// Providers named in `names`, in that order; all providers when empty.
    ///
    /// Returns the first unknown name on failure.
    pub fn select(&self, names: &[String]) -> Result<Vec<&NamedProvider>, String> {
        if names.is_empty() {
            return Ok(self.providers.iter().collect());
        }
        names
            .iter()
            .map(|name| self.get(name).ok_or_else(|| name.clone()))
            .collect()
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is configured.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str) -> Arc<dyn CompanyDataProvider> {
        Arc::new(CompanyDataStore::from_companies(name, vec![]).unwrap())
    }

    fn catalog() -> ProviderCatalog {
        let mut catalog = ProviderCatalog::new();
        catalog
            .register("primary", ProviderKind::Json, store("primary"), None)
            .unwrap();
        catalog
            .register("secondary", ProviderKind::Json, store("secondary"), None)
            .unwrap();
        catalog
    }

    #[test]
    fn test_describe() {
        let listing = catalog().describe();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "primary");
        let json = serde_json::to_value(&listing[1]).unwrap();
        assert_eq!(json, serde_json::json!({"name": "secondary", "type": "json"}));
    }

    #[test]
    fn test_select() {
        let catalog = catalog();
        let all = catalog.select(&[]).unwrap();
        assert_eq!(all.len(), 2);

        let picked = catalog.select(&["secondary".to_string()]).unwrap();
        assert_eq!(picked[0].name, "secondary");

        let err = catalog
            .select(&["secondary".to_string(), "missing".to_string()])
            .unwrap_err();
        assert_eq!(err, "missing");
    }

    #[test]
    fn test_duplicate_registration() {
        let mut catalog = catalog();
        assert!(
            catalog
                .register("primary", ProviderKind::Json, store("primary"), None)
                .is_err()
        );
    }

    #[test]
    fn test_unreadable_provider_files() {
        let config = ItrConfig::from_json_str(
            r#"{"data_providers": [
                {"name": "broken", "type": "json",
                 "parameters": {"company_path": "/nonexistent/companies.json"}}
            ]}"#,
        )
        .unwrap();
        let err = ProviderCatalog::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Provider { ref name, .. } if name == "broken"));
    }
}
