#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/itr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod anonymize;
pub mod export;
pub mod report;
pub mod sensitivity;
pub mod summary;
pub mod table;

pub use anonymize::{Anonymizer, anonymize};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{Report, ReportBuilder, ReportError};
pub use sensitivity::{SensitivityFilter, SensitivityTier, filter};
pub use summary::{AggregationLine, to_ascii_table, to_markdown};
pub use table::{SCORE_COLUMNS, ScoreTable, TableError};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
