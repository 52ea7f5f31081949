use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Error type covering the different failure cases that can occur while
/// files are ingested, merged, arranged, edited, or exported.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Wrapper for IO failures such as reading uploads or writing downloads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when an upload is not in the accepted spreadsheet format.
    #[error("unsupported file type for {0}: only .xlsx files are accepted")]
    UnsupportedFormat(String),

    /// Raised when two uploads in the same batch share a file name.
    #[error("duplicate upload name {0}")]
    DuplicateUpload(String),

    /// Raised when a file name does not match any uploaded file.
    #[error("no uploaded file named {0}")]
    UnknownFile(String),

    /// Raised when a requested sheet is absent from its workbook.
    #[error("sheet '{sheet}' not found in {file}")]
    MissingSheet { file: String, sheet: String },

    /// Raised when a column name does not exist in the merged table.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Raised when the same column is selected twice.
    #[error("column '{0}' selected more than once")]
    DuplicateColumn(String),

    /// Raised when an edit targets a row past the end of the grid.
    #[error("row {row} is out of range (table has {row_count} rows)")]
    RowOutOfRange { row: usize, row_count: usize },

    /// Raised when an action is issued before the stage it needs exists.
    #[error("{action} is not available while the session is {stage}")]
    ActionUnavailable { action: String, stage: String },

    /// Raised by non-interactive runs when no selected sheet could be read.
    #[error("no sheets could be merged")]
    EmptyMerge,

    /// Raised when an interactive command line cannot be understood.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
