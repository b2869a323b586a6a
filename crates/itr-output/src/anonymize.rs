//! Replacement of company identifying fields with opaque tokens.
//!
//! Tokens are numbered in order of first appearance. One [`Anonymizer`] is
//! shared by every part of a response so that the same company carries the
//! same token in the score table, the aggregation contributions and the
//! rejected records.

use std::collections::HashMap;

use serde_json::Value;

use itr_scoring::{RejectedScore, ScoreAggregations};

use crate::table::ScoreTable;

/// Stable company-to-token mapping for one response.
#[derive(Debug, Clone, Default)]
pub struct Anonymizer {
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    next: usize,
}

impl Anonymizer {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of companies tokenized so far.
    pub fn len(&self) -> usize {
        self.next
    }

    /// Whether no company has been tokenized.
    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    /// Token number of a company, assigning the next one on first sight.
    ///
    /// The id alone decides the token; the name is only remembered for rows
    /// that carry no id.
    pub fn token(&mut self, company_id: &str, company_name: Option<&str>) -> usize {
        let n = match self.by_id.get(company_id) {
            Some(&n) => n,
            None => {
                let n = self.allocate();
                self.by_id.insert(company_id.to_string(), n);
                n
            }
        };
        if let Some(name) = company_name {
            self.by_name.entry(name.to_string()).or_insert(n);
        }
        n
    }

    fn name_token(&mut self, company_name: &str) -> usize {
        match self.by_name.get(company_name) {
            Some(&n) => n,
            None => {
                let n = self.allocate();
                self.by_name.insert(company_name.to_string(), n);
                n
            }
        }
    }

    fn allocate(&mut self) -> usize {
        self.next += 1;
        self.next
    }

    /// Opaque id for token `n`.
    pub fn id_token(n: usize) -> String {
        format!("company_{n}")
    }

    /// Opaque name for token `n`.
    pub fn name_token_text(n: usize) -> String {
        format!("Company {n}")
    }

    /// Anonymize the identity columns of a table in place.
    pub fn anonymize_table(&mut self, table: &mut ScoreTable) {
        for row in table.rows_mut() {
            let id = row.get("company_id").and_then(Value::as_str).map(str::to_string);
            let name = row
                .get("company_name")
                .and_then(Value::as_str)
                .map(str::to_string);
            let n = match (&id, &name) {
                (Some(id), name) => self.token(id, name.as_deref()),
                (None, Some(name)) => self.name_token(name),
                (None, None) => continue,
            };
            if row.contains_key("company_id") {
                row.insert("company_id".into(), Value::String(Self::id_token(n)));
            }
            if row.contains_key("company_name") {
                row.insert("company_name".into(), Value::String(Self::name_token_text(n)));
            }
            if row.contains_key("company_isin") {
                row.insert("company_isin".into(), Value::Null);
            }
        }
    }

    /// Anonymize contributions and identity-valued group keys.
    pub fn anonymize_aggregations(&mut self, aggregations: &mut ScoreAggregations) {
        for aggregation in &mut aggregations.aggregations {
            for contribution in &mut aggregation.contributions {
                let n = self.token(&contribution.company_id, Some(&contribution.company_name));
                contribution.company_id = Self::id_token(n);
                contribution.company_name = Self::name_token_text(n);
            }
            if let Some(group) = &mut aggregation.group {
                for (column, value) in group.columns.iter().zip(group.values.iter_mut()) {
                    *value = match (column.as_str(), value.take()) {
                        (_, None) => None,
                        ("company_id", Some(id)) => Some(Self::id_token(self.token(&id, None))),
                        ("company_name", Some(name)) => {
                            Some(Self::name_token_text(self.name_token(&name)))
                        }
                        ("company_isin", Some(_)) => None,
                        (_, other) => other,
                    };
                }
            }
        }
    }

    /// Anonymize rejected records.
    pub fn anonymize_rejected(&mut self, rejected: &mut [RejectedScore]) {
        for record in rejected {
            let n = self.token(&record.company_id, Some(&record.company_name));
            record.company_id = Self::id_token(n);
            record.company_name = Self::name_token_text(n);
        }
    }
}

/// Anonymize a single table with a fresh mapping.
pub fn anonymize(mut table: ScoreTable) -> ScoreTable {
    Anonymizer::new().anonymize_table(&mut table);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn table() -> ScoreTable {
        let rows = [
            json!({"company_id": "US1", "company_name": "Alpha", "company_isin": "US1",
                   "scope": "S1+S2", "temperature_score": 2.0}),
            json!({"company_id": "US2", "company_name": "Beta", "company_isin": "US2",
                   "scope": "S1+S2", "temperature_score": 3.0}),
            json!({"company_id": "US1", "company_name": "Alpha", "company_isin": "US1",
                   "scope": "S3", "temperature_score": 2.5}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        ScoreTable::from_rows(rows)
    }

    #[test]
    fn test_tokens_in_first_appearance_order() {
        let anonymized = anonymize(table());
        assert_eq!(anonymized.get(0, "company_id"), Some(&json!("company_1")));
        assert_eq!(anonymized.get(1, "company_name"), Some(&json!("Company 2")));
        assert_eq!(anonymized.get(2, "company_id"), Some(&json!("company_1")));
        assert!(anonymized.get(0, "company_isin").is_none());
        assert!(anonymized.has_column("company_isin"));
    }

    #[test]
    fn test_scores_untouched_and_mapping_injective() {
        let original = table();
        let anonymized = anonymize(original.clone());
        for i in 0..original.len() {
            assert_eq!(
                original.get(i, "temperature_score"),
                anonymized.get(i, "temperature_score")
            );
        }
        let ids: HashSet<String> = (0..anonymized.len())
            .map(|i| anonymized.cell_text(i, "company_id"))
            .collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_shared_mapping_across_parts() {
        let mut anonymizer = Anonymizer::new();
        let mut scores = table();
        anonymizer.anonymize_table(&mut scores);
        let mut rejected = vec![RejectedScore {
            company_id: "US2".into(),
            company_name: "Beta".into(),
            scope: itr_data::EScope::S1S2,
            time_frame: itr_data::ETimeFrame::Long,
            reason: "degenerate".into(),
        }];
        anonymizer.anonymize_rejected(&mut rejected);
        assert_eq!(rejected[0].company_id, "company_2");
        assert_eq!(anonymizer.len(), 2);
    }

    #[test]
    fn test_shared_name_distinct_ids_get_distinct_tokens() {
        let rows = [
            json!({"company_id": "A", "company_name": "Holding", "temperature_score": 2.0}),
            json!({"company_id": "B", "company_name": "Holding", "temperature_score": 3.0}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        let mut anonymizer = Anonymizer::new();
        let mut scores = ScoreTable::from_rows(rows);
        anonymizer.anonymize_table(&mut scores);

        assert_eq!(scores.get(0, "company_id"), Some(&json!("company_1")));
        assert_eq!(scores.get(1, "company_id"), Some(&json!("company_2")));
        assert_ne!(scores.get(0, "company_name"), scores.get(1, "company_name"));

        let mut rejected = vec![RejectedScore {
            company_id: "B".into(),
            company_name: "Holding".into(),
            scope: itr_data::EScope::S1S2,
            time_frame: itr_data::ETimeFrame::Short,
            reason: "degenerate".into(),
        }];
        anonymizer.anonymize_rejected(&mut rejected);
        assert_eq!(rejected[0].company_id, "company_2");
    }
}
