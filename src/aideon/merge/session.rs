//! Session state machine.
//!
//! A [`Session`] is an immutable value. Every user action is applied with
//! [`Session::apply`], which returns a new session together with the inline
//! notices the action produced; the previous value is left untouched. Any
//! change to an upstream stage clears every table derived from it.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{
    ArrangedTable, EditedTable, MergedTable, Notice, Table, UploadedFile,
};
use crate::aideon::merge::pipeline::{
    self, CellEdit, ExportedFile, IngestedFile, SheetSelection, default_column_selection,
};

/// Progress of a session through the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    FilesLoaded,
    Merged,
    Arranged,
    Edited,
    Exported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::FilesLoaded => "files loaded",
            Stage::Merged => "merged",
            Stage::Arranged => "arranged",
            Stage::Edited => "edited",
            Stage::Exported => "exported",
        };
        f.write_str(label)
    }
}

/// A discrete user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the upload set.
    Upload(Vec<UploadedFile>),
    /// Replace the sheet selection of one file.
    SelectSheets { file: String, sheets: Vec<String> },
    /// Read and concatenate the selected sheets.
    Merge,
    /// Choose and order the merged columns.
    ArrangeColumns(Vec<String>),
    /// Change one grid cell.
    EditCell(CellEdit),
    /// Serialise the grid under the given file name.
    Export { file_name: String },
    /// Discard everything.
    Reset,
}

/// Action discriminant, used to ask which controls are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Upload,
    SelectSheets,
    Merge,
    ArrangeColumns,
    EditCell,
    Export,
    Reset,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Upload,
        ActionKind::SelectSheets,
        ActionKind::Merge,
        ActionKind::ArrangeColumns,
        ActionKind::EditCell,
        ActionKind::Export,
        ActionKind::Reset,
    ];

    /// Earliest stage from which the action may be issued.
    fn required_stage(self) -> Stage {
        match self {
            ActionKind::Upload | ActionKind::Reset => Stage::Idle,
            ActionKind::SelectSheets | ActionKind::Merge => Stage::FilesLoaded,
            ActionKind::ArrangeColumns => Stage::Merged,
            ActionKind::EditCell | ActionKind::Export => Stage::Arranged,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Upload => "upload",
            ActionKind::SelectSheets => "sheet selection",
            ActionKind::Merge => "merge",
            ActionKind::ArrangeColumns => "column arrangement",
            ActionKind::EditCell => "cell edit",
            ActionKind::Export => "export",
            ActionKind::Reset => "reset",
        };
        f.write_str(label)
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Upload(_) => ActionKind::Upload,
            Action::SelectSheets { .. } => ActionKind::SelectSheets,
            Action::Merge => ActionKind::Merge,
            Action::ArrangeColumns(_) => ActionKind::ArrangeColumns,
            Action::EditCell(_) => ActionKind::EditCell,
            Action::Export { .. } => ActionKind::Export,
            Action::Reset => ActionKind::Reset,
        }
    }
}

/// Outcome of applying an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub notices: Vec<Notice>,
}

impl Transition {
    fn quiet(session: Session) -> Self {
        Self {
            session,
            notices: Vec::new(),
        }
    }
}

/// One user's workflow state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    files: Vec<IngestedFile>,
    selection: SheetSelection,
    merged: Option<MergedTable>,
    column_selection: Vec<String>,
    arranged: Option<ArrangedTable>,
    edited: Option<EditedTable>,
    exported: Option<ExportedFile>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        if self.exported.is_some() {
            Stage::Exported
        } else if self.edited.is_some() {
            Stage::Edited
        } else if self.arranged.is_some() {
            Stage::Arranged
        } else if self.merged.is_some() {
            Stage::Merged
        } else if !self.files.is_empty() {
            Stage::FilesLoaded
        } else {
            Stage::Idle
        }
    }

    pub fn is_available(&self, kind: ActionKind) -> bool {
        self.stage() >= kind.required_stage()
    }

    pub fn available_actions(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|kind| self.is_available(*kind))
            .collect()
    }

    pub fn files(&self) -> &[IngestedFile] {
        &self.files
    }

    pub fn selection(&self) -> &SheetSelection {
        &self.selection
    }

    pub fn merged(&self) -> Option<&MergedTable> {
        self.merged.as_ref()
    }

    pub fn column_selection(&self) -> &[String] {
        &self.column_selection
    }

    pub fn arranged(&self) -> Option<&ArrangedTable> {
        self.arranged.as_ref()
    }

    pub fn edited(&self) -> Option<&EditedTable> {
        self.edited.as_ref()
    }

    pub fn exported(&self) -> Option<&ExportedFile> {
        self.exported.as_ref()
    }

    /// Current grid contents: the edited table, or the arranged table when
    /// nothing has been edited yet.
    pub fn grid(&self) -> Option<&Table> {
        self.edited
            .as_deref()
            .or(self.arranged.as_deref())
    }

    /// Applies a single action.
    ///
    /// Returns [`MergeError::ActionUnavailable`] when the action needs a
    /// stage the session has not reached. Per-file and per-sheet failures
    /// are reported as notices instead of errors.
    #[instrument(level = "info", skip_all, fields(action = %action.kind(), stage = %self.stage()))]
    pub fn apply(&self, action: Action) -> Result<Transition> {
        let kind = action.kind();
        if !self.is_available(kind) {
            return Err(MergeError::ActionUnavailable {
                action: kind.to_string(),
                stage: self.stage().to_string(),
            });
        }

        let transition = match action {
            Action::Upload(uploads) => self.upload(uploads),
            Action::SelectSheets { file, sheets } => self.select_sheets(&file, &sheets)?,
            Action::Merge => self.merge(),
            Action::ArrangeColumns(columns) => self.arrange_columns(columns)?,
            Action::EditCell(edit) => self.edit_cell(&edit)?,
            Action::Export { file_name } => self.export(&file_name)?,
            Action::Reset => Transition::quiet(Session::new()),
        };
        debug!(next_stage = %transition.session.stage(), "transition applied");
        Ok(transition)
    }

    /// Applies an action the way the interactive front end does: a
    /// successful merge is immediately followed by the default column
    /// arrangement, so the grid appears without a separate step.
    pub fn dispatch(&self, action: Action) -> Result<Transition> {
        let mut transition = self.apply(action)?;
        if transition.session.stage() == Stage::Merged {
            if let Some(merged) = transition.session.merged() {
                let columns = default_column_selection(merged);
                let arranged = transition.session.apply(Action::ArrangeColumns(columns))?;
                transition.session = arranged.session;
                transition.notices.extend(arranged.notices);
            }
        }
        Ok(transition)
    }

    fn upload(&self, uploads: Vec<UploadedFile>) -> Transition {
        let ingestion = pipeline::ingest(uploads);
        let selection = SheetSelection::defaults(&ingestion.files);
        info!(file_count = ingestion.files.len(), "upload set replaced");
        Transition {
            session: Session {
                files: ingestion.files,
                selection,
                ..Session::default()
            },
            notices: ingestion.notices,
        }
    }

    fn select_sheets(&self, file: &str, sheets: &[String]) -> Result<Transition> {
        let selection = self.selection.with_sheets(&self.files, file, sheets)?;
        Ok(Transition::quiet(Session {
            files: self.files.clone(),
            selection,
            ..Session::default()
        }))
    }

    fn merge(&self) -> Transition {
        let outcome = pipeline::merge(&self.files, &self.selection);
        match outcome.table {
            Some(merged) => Transition {
                session: Session {
                    files: self.files.clone(),
                    selection: self.selection.clone(),
                    merged: Some(merged),
                    ..Session::default()
                },
                notices: outcome.notices,
            },
            None => Transition {
                session: self.clone(),
                notices: outcome.notices,
            },
        }
    }

    fn arrange_columns(&self, columns: Vec<String>) -> Result<Transition> {
        let merged = self.require_merged()?;
        let arranged = pipeline::arrange(merged, &columns)?;
        Ok(Transition::quiet(Session {
            files: self.files.clone(),
            selection: self.selection.clone(),
            merged: self.merged.clone(),
            column_selection: columns,
            arranged: Some(arranged),
            edited: None,
            exported: None,
        }))
    }

    fn edit_cell(&self, edit: &CellEdit) -> Result<Transition> {
        let base = self.current_grid()?;
        let edited = pipeline::apply_edit(&base, edit)?;
        Ok(Transition::quiet(Session {
            edited: Some(edited),
            exported: None,
            ..self.clone()
        }))
    }

    fn export(&self, file_name: &str) -> Result<Transition> {
        let grid = self.current_grid()?;
        let exported = pipeline::export(&grid, file_name)?;
        let notice = Notice::success(exported.confirmation());
        Ok(Transition {
            session: Session {
                edited: Some(grid),
                exported: Some(exported),
                ..self.clone()
            },
            notices: vec![notice],
        })
    }

    fn current_grid(&self) -> Result<EditedTable> {
        match (&self.edited, &self.arranged) {
            (Some(edited), _) => Ok(edited.clone()),
            (None, Some(arranged)) => Ok(EditedTable::from(arranged)),
            (None, None) => Err(self.unavailable(ActionKind::EditCell)),
        }
    }

    fn require_merged(&self) -> Result<&MergedTable> {
        self.merged
            .as_ref()
            .ok_or_else(|| self.unavailable(ActionKind::ArrangeColumns))
    }

    fn unavailable(&self, kind: ActionKind) -> MergeError {
        MergeError::ActionUnavailable {
            action: kind.to_string(),
            stage: self.stage().to_string(),
        }
    }
}
