//! Sheet layout: column widths, cell typing and table styling.

use rust_xlsxwriter::{Table, TableColumn, TableStyle};

use crate::ingest::RecordTable;
use crate::partition::Bucket;

/// Characters added to the widest cell of each column.
pub const COLUMN_PADDING: f64 = 2.0;

/// Widest column Excel accepts.
pub const MAX_COLUMN_WIDTH: f64 = 255.0;

/// Table style applied to every bucket sheet.
pub const TABLE_STYLE: TableStyle = TableStyle::Light1;

/// Columns written as numbers when their text parses as one.
pub const NUMERIC_COLUMNS: [&str; 2] = ["Child Weight Zscore", "Last Weight Zscore"];

pub fn is_numeric_column(header: &str) -> bool {
    NUMERIC_COLUMNS.contains(&header)
}

/// Width of each column: longest non-empty cell (header included) plus
/// padding, capped at [`MAX_COLUMN_WIDTH`].
///
/// Lengths are taken from the uploaded text rather than from the written
/// value, so numeric cells always measure the same.
pub fn column_widths(table: &RecordTable) -> Vec<f64> {
    table
        .headers()
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = std::iter::once(header.as_str())
                .chain(table.rows().iter().map(|row| row.get(col)))
                .filter(|value| !value.is_empty())
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0);
            (longest as f64 + COLUMN_PADDING).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Structured table definition for a bucket sheet.
pub(super) fn bucket_table(bucket: Bucket, headers: &[String]) -> Table {
    let columns: Vec<TableColumn> = headers
        .iter()
        .map(|header| TableColumn::new().set_header(header))
        .collect();

    Table::new()
        .set_name(bucket.table_name())
        .set_style(TABLE_STYLE)
        .set_banded_rows(true)
        .set_banded_columns(false)
        .set_first_column(false)
        .set_last_column(false)
        .set_columns(&columns)
}

/// Last row index covered by a table holding `data_rows` rows under a header.
/// A table needs at least one body row, so an empty bucket spans a blank one.
pub(super) fn table_last_row(data_rows: usize) -> u32 {
    data_rows.max(1) as u32
}
