//! CSV and JSON export of score tables and aggregations.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use itr_scoring::ScoreAggregations;

use crate::table::ScoreTable;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn json_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, ExportError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

impl Exporter for ScoreTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(self.columns())?;
                for row in 0..self.len() {
                    wtr.write_record(self.columns().iter().map(|c| self.cell_text(row, c)))?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => json_string(self, false),
            ExportFormat::PrettyJson => json_string(self, true),
        }
    }
}

/// Flattened aggregation for CSV export.
#[derive(Debug, Serialize)]
struct AggregationFlat {
    aggregation_method: String,
    scope: String,
    time_frame: String,
    group: String,
    temperature_score: Option<f64>,
    num_companies: usize,
    total_investment_value: f64,
    weighted_investment_value: f64,
    uncovered_investment_value: f64,
    coverage_percentage: f64,
}

impl Exporter for ScoreAggregations {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for aggregation in self.iter() {
                    wtr.serialize(AggregationFlat {
                        aggregation_method: aggregation.aggregation_method.to_string(),
                        scope: aggregation.scope.to_string(),
                        time_frame: aggregation.time_frame.to_string(),
                        group: aggregation
                            .group
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_default(),
                        temperature_score: aggregation.temperature_score,
                        num_companies: aggregation.num_companies,
                        total_investment_value: aggregation.total_investment_value,
                        weighted_investment_value: aggregation.weighted_investment_value,
                        uncovered_investment_value: aggregation.uncovered_investment_value,
                        coverage_percentage: aggregation.coverage_percentage,
                    })?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => json_string(self, false),
            ExportFormat::PrettyJson => json_string(self, true),
        }
    }
}
