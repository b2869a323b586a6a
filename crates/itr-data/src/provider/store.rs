//! In-memory company data store.

use std::collections::HashMap;
use std::path::Path;

use super::CompanyDataProvider;
use crate::error::{DataError, Result};
use crate::interfaces::CompanyData;

/// Company data indexed by company id.
///
/// Built once, either from a reference file at start-up or from the inline
/// company data of a single request, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CompanyDataStore {
    name: String,
    companies: HashMap<String, CompanyData>,
}

impl CompanyDataStore {
    /// Index a list of companies.
    ///
    /// Fails if two entries share a company id.
    pub fn from_companies(name: impl Into<String>, companies: Vec<CompanyData>) -> Result<Self> {
        let name = name.into();
        let mut index = HashMap::with_capacity(companies.len());
        for company in companies {
            let id = company.company_id.clone();
            if index.insert(id.clone(), company).is_some() {
                return Err(DataError::InvalidData(format!(
                    "duplicate company id {id} in provider {name}"
                )));
            }
        }
        Ok(Self {
            name,
            companies: index,
        })
    }

    /// Load a JSON array of companies from disk.
    pub fn from_json_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(name, &contents)
    }

    /// Parse a JSON array of companies.
    pub fn from_json_str(name: impl Into<String>, json: &str) -> Result<Self> {
        let companies: Vec<CompanyData> = serde_json::from_str(json)?;
        Self::from_companies(name, companies)
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

impl CompanyDataProvider for CompanyDataStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn company(&self, company_id: &str) -> Option<&CompanyData> {
        self.companies.get(company_id)
    }
}
