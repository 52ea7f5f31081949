use rust_xlsxwriter::{Format, Workbook, cell_range_absolute};

use super::TABLE_EXTENT_NAME;
use crate::aideon::merge::error::Result;
use crate::aideon::merge::model::{CellValue, Table};

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Serialises a table into a single-sheet workbook and returns its bytes.
///
/// The header row is written first, in bold, followed by one worksheet row
/// per table row. No index column is emitted.
pub fn write_table(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let sheet_col = col_idx as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(value) | CellValue::Error(value) => {
                    worksheet.write_string(sheet_row, sheet_col, value)?;
                }
                CellValue::Number(value) => {
                    worksheet.write_number(sheet_row, sheet_col, *value)?;
                }
                CellValue::Bool(value) => {
                    worksheet.write_boolean(sheet_row, sheet_col, *value)?;
                }
                CellValue::DateTime(value) => {
                    worksheet.write_number_with_format(sheet_row, sheet_col, *value, &date_format)?;
                }
            }
        }
    }

    workbook.define_name(TABLE_EXTENT_NAME, &extent_formula(table, sheet_name))?;

    Ok(workbook.save_to_buffer()?)
}

/// Absolute reference to the header plus all data rows, at least one column
/// wide so a table without columns still records its rows.
fn extent_formula(table: &Table, sheet_name: &str) -> String {
    let last_row = table.rows.len() as u32;
    let last_col = table.columns.len().saturating_sub(1) as u16;
    format!(
        "='{}'!{}",
        sheet_name.replace('\'', "''"),
        cell_range_absolute(0, 0, last_row, last_col)
    )
}
