//! XLSX rendering of partitioned case records.
//!
//! One workbook per upload, one sheet per severity bucket. Every sheet is a
//! styled structured table with columns sized to their content.

mod layout;
mod workbook;

pub use layout::{
    column_widths, is_numeric_column, COLUMN_PADDING, MAX_COLUMN_WIDTH, NUMERIC_COLUMNS, TABLE_STYLE,
};
pub use workbook::{render_workbook, XLSX_CONTENT_TYPE};
