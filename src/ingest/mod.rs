//! Ingestion of uploaded case-record CSVs.
//!
//! Parses raw upload bytes into a [`RecordTable`], dropping malformed rows,
//! checks the fixed required-column set and projects the table onto it.

mod columns;
mod csv_table;
mod table;

pub use columns::{missing_columns, REQUIRED_COLUMNS, SCORE_COLUMN};
pub use csv_table::{parse_table, IngestStats, IngestedTable};
pub use table::{Record, RecordTable};
