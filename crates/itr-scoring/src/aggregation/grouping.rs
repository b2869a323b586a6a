//! Partitioning of score records by company attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::ScoreRecord;

/// Values of the grouping columns shared by a group of records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Grouping column names.
    pub columns: Vec<String>,
    /// Value per column; `None` when a record lacks the attribute.
    pub values: Vec<Option<String>>,
}

impl GroupKey {
    /// Key of `record` for the given columns.
    pub fn of(record: &ScoreRecord, columns: &[String]) -> Self {
        Self {
            columns: columns.to_vec(),
            values: columns
                .iter()
                .map(|column| record.company.attribute(column))
                .collect(),
        }
    }

    /// Value of one grouping column.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values[i].as_deref())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.columns.iter().zip(&self.values).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{column}={}", value.as_deref().unwrap_or("<none>"))?;
        }
        Ok(())
    }
}

/// Partition records by the cross product of `columns`.
///
/// Every record lands in exactly one group. Groups are ordered by their
/// values, with absent values first.
pub fn partition<'a>(
    records: &[&'a ScoreRecord],
    columns: &[String],
) -> BTreeMap<GroupKey, Vec<&'a ScoreRecord>> {
    let mut groups: BTreeMap<GroupKey, Vec<&'a ScoreRecord>> = BTreeMap::new();
    for &record in records {
        groups
            .entry(GroupKey::of(record, columns))
            .or_default()
            .push(record);
    }
    groups
}
