//! CSV parsing with row-level fault tolerance.
//!
//! The whole upload must be UTF-8 with a header row. Individual records with
//! the wrong number of fields are skipped and counted, never repaired.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::columns::{missing_columns, REQUIRED_COLUMNS};
use super::table::{Record, RecordTable};
use crate::error::AppError;

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Counters collected while reading an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Rows accepted from the file, before projection.
    pub total_rows: usize,
    /// Rows dropped because their structure did not match the header.
    pub skipped_rows: usize,
    /// Whether the file started with a UTF-8 BOM.
    pub has_bom: bool,
}

/// A validated upload projected onto the required columns.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: RecordTable,
    pub stats: IngestStats,
}

/// Parses an uploaded CSV and projects it onto [`REQUIRED_COLUMNS`].
///
/// # Errors
///
/// - `AppError::EmptyFile` if the upload has no content
/// - `AppError::NotUtf8` if the content is not UTF-8
/// - `AppError::CsvInvalid` if there is no usable header row
/// - `AppError::MissingColumns` if any required column is absent
pub fn parse_table(filename: &str, bytes: &[u8]) -> Result<IngestedTable, AppError> {
    let has_bom = bytes.starts_with(UTF8_BOM);
    let data = if has_bom { &bytes[UTF8_BOM.len()..] } else { bytes };

    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::EmptyFile {
            filename: filename.to_string(),
        });
    }

    if std::str::from_utf8(data).is_err() {
        return Err(AppError::NotUtf8 {
            filename: filename.to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // row width is checked below so bad rows can be skipped
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::CsvInvalid {
            filename: filename.to_string(),
            message: e.to_string(),
        })?
        .iter()
        .map(String::from)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::CsvInvalid {
            filename: filename.to_string(),
            message: "no header row".into(),
        });
    }

    let mut table = RecordTable::new(headers.iter().cloned());
    let mut skipped_rows = 0usize;
    let mut record = csv::StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                if record.len() != headers.len() {
                    skipped_rows += 1;
                    warn!(
                        "[INGEST] {}: skipping line {} ({} fields, expected {})",
                        filename,
                        line,
                        record.len(),
                        headers.len()
                    );
                    continue;
                }
                table.push(Record::new(line, record.iter().map(String::from).collect()));
            }
            Ok(false) => break,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                skipped_rows += 1;
                warn!("[INGEST] {}: skipping undecodable row: {}", filename, e);
            }
            Err(e) => {
                return Err(AppError::CsvInvalid {
                    filename: filename.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    let stats = IngestStats {
        total_rows: table.len(),
        skipped_rows,
        has_bom,
    };

    info!(
        "[INGEST] Total rows in the original data for {}: {} ({} skipped)",
        filename, stats.total_rows, stats.skipped_rows
    );

    let missing = missing_columns(table.headers());
    if !missing.is_empty() {
        return Err(AppError::MissingColumns {
            filename: filename.to_string(),
            missing,
        });
    }

    let table = table.project(&REQUIRED_COLUMNS).ok_or_else(|| {
        AppError::Internal(format!("projection of {} lost a required column", filename))
    })?;

    debug!(
        filename,
        columns = table.headers().len(),
        rows = table.len(),
        "Projected onto required columns"
    );

    Ok(IngestedTable { table, stats })
}
