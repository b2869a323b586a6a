//! Ordered composition of several company data providers.

use std::sync::Arc;

use super::CompanyDataProvider;
use crate::interfaces::CompanyData;

/// Chains providers; the first provider that knows a company wins.
#[derive(Debug, Clone, Default)]
pub struct CompositeCompanyProvider {
    providers: Vec<Arc<dyn CompanyDataProvider>>,
}

impl CompositeCompanyProvider {
    /// Create an empty composite.
    pub const fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider with lower priority than those already added.
    pub fn push(&mut self, provider: Arc<dyn CompanyDataProvider>) {
        self.providers.push(provider);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, provider: Arc<dyn CompanyDataProvider>) -> Self {
        self.push(provider);
        self
    }

    /// Number of chained providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is chained.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Name of the provider that supplies `company_id`.
    pub fn source_of(&self, company_id: &str) -> Option<&str> {
        self.providers
            .iter()
            .find(|p| p.contains(company_id))
            .map(|p| p.name())
    }
}

impl CompanyDataProvider for CompositeCompanyProvider {
    fn name(&self) -> &str {
        "composite"
    }

    fn company(&self, company_id: &str) -> Option<&CompanyData> {
        self.providers.iter().find_map(|p| p.company(company_id))
    }
}
