//! Workbook assembly.

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use super::layout::{bucket_table, column_widths, is_numeric_column, table_last_row};
use crate::error::AppError;
use crate::ingest::RecordTable;
use crate::partition::{Bucket, Partitioned, Score};

/// MIME type of the generated workbooks.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Renders the three bucket sheets into an XLSX document.
///
/// The workbook is built fully in memory; any failure aborts the whole
/// document so a half-formatted file is never produced.
///
/// # Errors
///
/// Returns `AppError::Render` naming the sheet that could not be written.
pub fn render_workbook(filename: &str, parts: &Partitioned) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();

    for bucket in Bucket::ALL {
        let worksheet = workbook.add_worksheet();
        write_bucket_sheet(worksheet, bucket, parts.bucket(bucket)).map_err(|e| {
            AppError::Render {
                filename: filename.to_string(),
                message: format!("sheet {}: {}", bucket.sheet_name(), e),
            }
        })?;
    }

    let bytes = workbook.save_to_buffer().map_err(|e| AppError::Render {
        filename: filename.to_string(),
        message: e.to_string(),
    })?;

    info!(
        "[RENDER] {}: workbook ready ({} rows, {} bytes)",
        filename,
        parts.bucketed_rows(),
        bytes.len()
    );
    Ok(bytes)
}

fn write_bucket_sheet(
    worksheet: &mut Worksheet,
    bucket: Bucket,
    table: &RecordTable,
) -> Result<(), XlsxError> {
    worksheet.set_name(bucket.sheet_name())?;

    let headers = table.headers();
    let numeric: Vec<bool> = headers.iter().map(|h| is_numeric_column(h)).collect();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }

    for (idx, record) in table.rows().iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, value) in record.values.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            match Score::parse(value) {
                Score::Value(number) if numeric[col] => {
                    worksheet.write_number(row, col as u16, number)?;
                }
                _ => {
                    worksheet.write_string(row, col as u16, value)?;
                }
            }
        }
    }

    if !headers.is_empty() {
        let last_col = (headers.len() - 1) as u16;
        worksheet.add_table(
            0,
            0,
            table_last_row(table.len()),
            last_col,
            &bucket_table(bucket, headers),
        )?;
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }

    debug!(
        sheet = bucket.sheet_name(),
        rows = table.len(),
        "Bucket sheet written"
    );
    Ok(())
}
