use std::path::Path;

use tracing::{info, instrument};

use crate::aideon::merge::error::Result;
use crate::aideon::merge::io::excel_write;
use crate::aideon::merge::model::EditedTable;

/// File name offered before the user types one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "merged_data.xlsx";
/// Name of the only sheet in an exported workbook.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";
/// MIME type attached to the download.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A serialised workbook ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Writes the download into `directory` under its file name, verbatim.
    pub fn save_in(&self, directory: &Path) -> Result<()> {
        std::fs::write(directory.join(&self.file_name), &self.bytes)?;
        Ok(())
    }

    pub fn confirmation(&self) -> String {
        format!("File saved as {}", self.file_name)
    }
}

/// Serialises the grid into a single-sheet workbook named `file_name`.
#[instrument(level = "info", skip(edited), fields(rows = edited.row_count()))]
pub fn export(edited: &EditedTable, file_name: &str) -> Result<ExportedFile> {
    let bytes = excel_write::write_table(edited.as_table(), EXPORT_SHEET_NAME)?;
    info!(size = bytes.len(), "workbook serialised");
    Ok(ExportedFile {
        file_name: file_name.to_string(),
        mime_type: XLSX_MIME_TYPE,
        bytes,
    })
}
