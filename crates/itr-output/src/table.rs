//! Tabular view of score records.
//!
//! Records are flattened into JSON objects so that output shaping
//! (sensitivity tiers, anonymization, column selection) can work on column
//! names without knowing the record types.

use polars::prelude::*;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use itr_scoring::ScoreRecord;

/// Errors that can occur while building or converting a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// A record did not serialize into a JSON object
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record serialized to something other than an object
    #[error("Record is not an object: {0}")]
    NotAnObject(String),

    /// DataFrame construction failed
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Leading columns of a score table, in display order. Other columns (user
/// fields) follow in first-appearance order.
pub const SCORE_COLUMNS: &[&str] = &[
    "company_id",
    "company_name",
    "company_isin",
    "sector",
    "region",
    "scope",
    "time_frame",
    "temperature_score",
    "score_result_type",
    "trajectory_score",
    "target_score",
    "investment_value",
    "market_cap",
    "enterprise_value",
    "cash_equivalents",
    "total_assets",
    "revenue",
    "ownership_percentage",
    "base_year_emissions",
    "benchmark_region",
    "benchmark_temperature",
    "benchmark_global_budget",
    "is_afolu_included",
    "horizon_year",
    "cumulative_budget",
    "cumulative_trajectory",
    "cumulative_target",
    "trajectory_overshoot_ratio",
    "target_overshoot_ratio",
    "projected_targets",
    "projected_intensities",
];

/// Ordered columns over JSON object rows.
///
/// A row may lack a column; it reads as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl ScoreTable {
    /// Flatten score records into a table.
    pub fn from_records(records: &[ScoreRecord]) -> Result<Self, TableError> {
        let rows = records
            .iter()
            .map(|record| match serde_json::to_value(record)? {
                Value::Object(map) => Ok(map),
                other => Err(TableError::NotAnObject(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rows(rows))
    }

    /// Build a table from object rows, ordering the known score columns first.
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = SCORE_COLUMNS
            .iter()
            .filter(|c| rows.iter().any(|r| r.contains_key(**c)))
            .map(|c| (*c).to_string())
            .collect();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows.
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Mutable rows.
    pub fn rows_mut(&mut self) -> &mut [Map<String, Value>] {
        &mut self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `column` exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Cell value; `None` for a missing row or `null` cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .filter(|v| !v.is_null())
    }

    /// Remove the named columns.
    pub fn drop_columns(&mut self, columns: &[&str]) {
        self.columns.retain(|c| !columns.contains(&c.as_str()));
        for row in &mut self.rows {
            row.retain(|key, _| !columns.contains(&key.as_str()));
        }
    }

    /// Keep only the named columns, in their current order.
    pub fn retain_columns(&mut self, columns: &[&str]) {
        self.columns.retain(|c| columns.contains(&c.as_str()));
        for row in &mut self.rows {
            row.retain(|key, _| columns.contains(&key.as_str()));
        }
    }

    /// New table with `columns` in the given order; unknown names are skipped.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let mut selected: Vec<String> = Vec::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();
            if self.has_column(column) && !selected.iter().any(|c| c == column) {
                selected.push(column.to_string());
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect();
        Self {
            columns: selected,
            rows,
        }
    }

    /// Rewrite every value of one column.
    pub fn map_column<F>(&mut self, column: &str, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        for row in &mut self.rows {
            if let Some(value) = row.get_mut(column) {
                *value = f(value);
            }
        }
    }

    /// Cell rendered as text; nested values as compact JSON, `null` as empty.
    pub fn cell_text(&self, row: usize, column: &str) -> String {
        match self.get(row, column) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Convert to a polars `DataFrame`.
    ///
    /// Columns whose values are all numbers become `f64`, all booleans become
    /// `bool`; everything else is rendered as text.
    pub fn to_dataframe(&self) -> Result<DataFrame, TableError> {
        let columns = self
            .columns
            .iter()
            .map(|name| self.to_column(name))
            .collect::<Vec<Column>>();
        Ok(DataFrame::new(columns)?)
    }

    fn to_column(&self, name: &str) -> Column {
        let values: Vec<Option<&Value>> = self
            .rows
            .iter()
            .map(|r| r.get(name).filter(|v| !v.is_null()))
            .collect();
        let present = || values.iter().flatten();

        if present().all(|v| v.is_number()) {
            let data: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Series::new(name.into(), data).into()
        } else if present().all(|v| v.is_boolean()) {
            let data: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Series::new(name.into(), data).into()
        } else {
            let data: Vec<Option<String>> = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            Series::new(name.into(), data).into()
        }
    }
}

struct OrderedRow<'a> {
    columns: &'a [String],
    row: &'a Map<String, Value>,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.row.get(column).unwrap_or(&Value::Null))?;
        }
        map.end()
    }
}

impl Serialize for ScoreTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&OrderedRow {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> ScoreTable {
        let rows = vec![
            json!({"company_name": "Alpha", "temperature_score": 2.1, "desk": "equity",
                   "projected_targets": [{"year": 2020, "value": 1.0}]}),
            json!({"company_name": "Beta", "temperature_score": 3.2, "scope": "S1+S2"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        ScoreTable::from_rows(rows)
    }

    #[test]
    fn test_known_columns_first() {
        let table = table();
        assert_eq!(
            table.columns(),
            &["company_name", "scope", "temperature_score", "projected_targets", "desk"]
        );
        assert!(table.get(0, "scope").is_none());
    }

    #[test]
    fn test_drop_and_select() {
        let mut table = table();
        table.drop_columns(&["projected_targets"]);
        assert!(!table.has_column("projected_targets"));
        assert!(!table.rows()[0].contains_key("projected_targets"));

        let selected = table.select(&["temperature_score", "company_name", "missing"]);
        assert_eq!(selected.columns(), &["temperature_score", "company_name"]);
    }

    #[test]
    fn test_serializes_in_column_order_with_nulls() {
        let json = serde_json::to_string(&table().select(&["scope", "company_name"])).unwrap();
        assert_eq!(
            json,
            r#"[{"scope":null,"company_name":"Alpha"},{"scope":"S1+S2","company_name":"Beta"}]"#
        );
    }

    #[test]
    fn test_to_dataframe() {
        let df = table().to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
        assert_eq!(
            df.column("temperature_score").unwrap().dtype(),
            &DataType::Float64
        );
        assert_eq!(df.column("desk").unwrap().dtype(), &DataType::String);
    }
}
