use std::collections::HashSet;
use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};

use super::TABLE_EXTENT_NAME;
use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{CellValue, Table, UploadedFile};

/// Prefix given to header cells that are blank.
pub const UNNAMED_PREFIX: &str = "Unnamed: ";

/// An opened workbook backed by the bytes of an upload.
pub struct Workbook<'a> {
    name: &'a str,
    inner: Xlsx<Cursor<&'a [u8]>>,
}

impl<'a> Workbook<'a> {
    /// Parses the upload's container and workbook metadata.
    pub fn open(file: &'a UploadedFile) -> Result<Self> {
        let inner = Xlsx::new(Cursor::new(file.bytes.as_slice()))?;
        Ok(Self {
            name: &file.name,
            inner,
        })
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    /// Reads a sheet using its first row as the header.
    pub fn read_sheet(&mut self, sheet: &str) -> Result<Table> {
        let range = self
            .inner
            .worksheet_range(sheet)
            .ok_or_else(|| MergeError::MissingSheet {
                file: self.name.to_string(),
                sheet: sheet.to_string(),
            })??;
        Ok(range_to_table(&range, self.recorded_row_count(sheet)))
    }

    /// Data row count recorded by a previous export of `sheet`, if any.
    fn recorded_row_count(&self, sheet: &str) -> Option<usize> {
        self.inner
            .defined_names()
            .iter()
            .filter(|(name, _)| name == TABLE_EXTENT_NAME)
            .find_map(|(_, reference)| extent_row_count(reference, sheet))
    }
}

/// Lists the sheets contained in an upload.
pub fn list_sheets(file: &UploadedFile) -> Result<Vec<String>> {
    Ok(Workbook::open(file)?.sheet_names())
}

/// Reads a single sheet of an upload into a table.
pub fn read_sheet(file: &UploadedFile, sheet: &str) -> Result<Table> {
    Workbook::open(file)?.read_sheet(sheet)
}

/// Parses a reference such as `'Sheet1'!$A$1:$C$6` and returns the number of
/// rows below the header when it points at `sheet`.
fn extent_row_count(reference: &str, sheet: &str) -> Option<usize> {
    let (sheet_part, cells) = reference.trim_start_matches('=').rsplit_once('!')?;
    let sheet_name = match sheet_part
        .strip_prefix('\'')
        .and_then(|quoted| quoted.strip_suffix('\''))
    {
        Some(quoted) => quoted.replace("''", "'"),
        None => sheet_part.to_string(),
    };
    if sheet_name != sheet {
        return None;
    }

    let last_cell = cells.rsplit(':').next()?;
    let last_row: usize = last_cell
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .ok()?;
    last_row.checked_sub(1)
}

/// Builds a table from a sheet range.
///
/// Without a recorded row count, fully blank data rows are skipped. With
/// one, every row is kept and the table is padded to that many rows.
fn range_to_table(range: &Range<DataType>, recorded_rows: Option<usize>) -> Table {
    let first_col = range.start().map_or(0, |(_, col)| col as usize);
    let mut rows = range.rows();
    let columns = rows
        .next()
        .map(|header| header_names(header, first_col))
        .unwrap_or_default();

    let cells = rows.map(|row| {
        let mut cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        cells.resize(columns.len(), CellValue::Empty);
        cells
    });
    let rows = match recorded_rows {
        Some(count) => {
            let mut rows: Vec<Vec<CellValue>> = cells.collect();
            rows.resize(count, vec![CellValue::Empty; columns.len()]);
            rows
        }
        None => cells
            .filter(|row| row.iter().any(|cell| *cell != CellValue::Empty))
            .collect(),
    };

    Table::new(columns, rows)
}

/// Converts the header row into unique column names.
///
/// Blank headers become `Unnamed: <column>`, numbered by absolute sheet
/// column from zero; a repeated header `x` becomes `x.1`, `x.2`, ...
/// skipping any suffix already taken.
fn header_names(row: &[DataType], first_col: usize) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(row.len());

    for (offset, cell) in row.iter().enumerate() {
        let raw = cell_to_string(cell);
        let base = if raw.trim().is_empty() {
            format!("{UNNAMED_PREFIX}{}", first_col + offset)
        } else {
            raw
        };

        let mut name = base.clone();
        let mut counter = 1;
        while used.contains(&name) {
            name = format!("{base}.{counter}");
            counter += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) if value.is_empty() => CellValue::Empty,
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(value) => CellValue::DateTime(*value),
        DataType::Error(value) => CellValue::Error(value.to_string()),
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}
