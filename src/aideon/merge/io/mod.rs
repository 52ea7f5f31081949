pub mod excel_read;
pub mod excel_write;

/// Workbook-level defined name covering the header and every data row of an
/// exported table. Rows whose cells are all empty leave no trace in the sheet
/// data, so the reader uses this range to restore the row count.
pub const TABLE_EXTENT_NAME: &str = "merged_table";
