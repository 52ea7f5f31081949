use std::fmt;
use std::ops::Deref;
use std::path::Path;

use serde::Serialize;

use crate::aideon::merge::error::{MergeError, Result};

/// Represents a single grid cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Blank cell, also used for cells introduced by the column union.
    #[default]
    Empty,
    /// Plain text.
    Text(String),
    /// Floating point number.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
    /// Excel serial date/time.
    DateTime(f64),
    /// Excel error value such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Interprets text typed into a grid cell.
    ///
    /// Empty input clears the cell, `true`/`false` become booleans, anything
    /// that parses as a finite number becomes a number, and everything else
    /// is kept as text.
    pub fn parse_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => CellValue::Number(number),
            _ => CellValue::Text(input.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => write!(f, "{value}"),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::DateTime(value) => write!(f, "{value}"),
            CellValue::Error(value) => write!(f, "{value}"),
        }
    }
}

/// An ordered list of named columns and the rows beneath them.
///
/// Every row has exactly `columns.len()` cells. The position of a row in
/// `rows` is its index; no other row identity is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the cell at `row` under the column called `column`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col_idx = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(col_idx))
    }
}

/// Result of concatenating every successfully read sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable(Table);

/// Column projection of a [`MergedTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangedTable(Table);

/// Grid contents after the user's cell edits.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedTable(Table);

macro_rules! stage_table {
    ($name:ident) => {
        impl $name {
            pub(crate) fn from_table(table: Table) -> Self {
                Self(table)
            }

            pub fn as_table(&self) -> &Table {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = Table;

            fn deref(&self) -> &Table {
                &self.0
            }
        }
    };
}

stage_table!(MergedTable);
stage_table!(ArrangedTable);
stage_table!(EditedTable);

impl From<ArrangedTable> for EditedTable {
    fn from(arranged: ArrangedTable) -> Self {
        EditedTable(arranged.0)
    }
}

impl From<&ArrangedTable> for EditedTable {
    fn from(arranged: &ArrangedTable) -> Self {
        EditedTable(arranged.0.clone())
    }
}

/// A spreadsheet upload held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, naming the upload after its final path
    /// component.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MergeError::MissingInput(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// How prominently a [`Notice`] should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
}

/// An inline message produced while handling a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Success => "ok",
        };
        write!(f, "{label}: {}", self.message)
    }
}
