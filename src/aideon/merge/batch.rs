//! Non-interactive drivers for scripted use. They issue the same actions the
//! interactive session does, in a fixed order.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{CellValue, Notice, UploadedFile};
use crate::aideon::merge::pipeline::{self, CellEdit, SheetListing};
use crate::aideon::merge::session::{Action, Session};

/// Sheet choice for one file, written `FILE=SHEET,SHEET` on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetChoice {
    pub file: String,
    pub sheets: Vec<String>,
}

/// Parses `FILE=SHEET[,SHEET...]`. `FILE=` selects no sheets.
pub fn parse_sheet_choice(raw: &str) -> Result<SheetChoice> {
    let (file, sheets) = raw
        .split_once('=')
        .ok_or_else(|| MergeError::InvalidCommand(format!("expected FILE=SHEET, got '{raw}'")))?;
    Ok(SheetChoice {
        file: file.to_string(),
        sheets: split_list(sheets),
    })
}

/// Parses `ROW:COLUMN=VALUE` into an edit; the value follows the grid's
/// input rules.
pub fn parse_cell_edit(raw: &str) -> Result<CellEdit> {
    let malformed = || MergeError::InvalidCommand(format!("expected ROW:COLUMN=VALUE, got '{raw}'"));
    let (row, rest) = raw.split_once(':').ok_or_else(malformed)?;
    let (column, value) = rest.split_once('=').ok_or_else(malformed)?;
    let row = row.trim().parse::<usize>().map_err(|_| malformed())?;
    Ok(CellEdit::new(row, column, CellValue::parse_input(value)))
}

/// Splits a comma separated list; an empty string is an empty list.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

/// Everything a scripted merge needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequest {
    pub inputs: Vec<PathBuf>,
    pub choices: Vec<SheetChoice>,
    /// `None` keeps every merged column in order.
    pub columns: Option<Vec<String>>,
    pub edits: Vec<CellEdit>,
    pub output: PathBuf,
}

/// Final session of a scripted merge and every notice raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub session: Session,
    pub notices: Vec<Notice>,
}

/// Reads uploads from disk, reporting unreadable paths as notices.
pub fn load_uploads(paths: &[PathBuf]) -> (Vec<UploadedFile>, Vec<Notice>) {
    let mut uploads = Vec::new();
    let mut notices = Vec::new();
    for path in paths {
        match UploadedFile::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(error) => {
                warn!(path = %path.display(), %error, "input skipped");
                notices.push(Notice::error(format!(
                    "Error reading {}: {error}",
                    path.display()
                )));
            }
        }
    }
    (uploads, notices)
}

/// Lists the sheets of each readable workbook.
#[instrument(level = "info", skip_all, fields(input_count = paths.len()))]
pub fn list_sheets(paths: &[PathBuf]) -> (Vec<SheetListing>, Vec<Notice>) {
    let (uploads, mut notices) = load_uploads(paths);
    let ingestion = pipeline::ingest(uploads);
    notices.extend(ingestion.notices);
    let listings = ingestion.files.iter().map(|file| file.listing()).collect();
    (listings, notices)
}

/// Uploads, selects, merges, arranges, edits, and exports in one go, then
/// writes the workbook to `request.output`.
///
/// Unreadable files and sheets are reported and skipped as in the
/// interactive session. Invalid selections, columns, or edits abort the run,
/// as does a merge that produced no table.
#[instrument(level = "info", skip_all, fields(output = %request.output.display()))]
pub fn run_merge(request: MergeRequest) -> Result<MergeReport> {
    let (uploads, mut notices) = load_uploads(&request.inputs);
    let mut session = Session::new();

    let mut step = |session: &Session, action: Action| -> Result<Session> {
        let transition = session.dispatch(action)?;
        notices.extend(transition.notices);
        Ok(transition.session)
    };

    session = step(&session, Action::Upload(uploads))?;
    for choice in request.choices {
        session = step(
            &session,
            Action::SelectSheets {
                file: choice.file,
                sheets: choice.sheets,
            },
        )?;
    }

    session = step(&session, Action::Merge)?;
    if session.merged().is_none() {
        return Err(MergeError::EmptyMerge);
    }

    if let Some(columns) = request.columns {
        session = step(&session, Action::ArrangeColumns(columns))?;
    }
    for edit in request.edits {
        session = step(&session, Action::EditCell(edit))?;
    }

    let file_name = request.output.display().to_string();
    session = step(&session, Action::Export { file_name })?;
    if let Some(exported) = session.exported() {
        std::fs::write(&request.output, &exported.bytes)?;
        info!(size = exported.bytes.len(), "merged workbook written");
    }

    Ok(MergeReport { session, notices })
}
