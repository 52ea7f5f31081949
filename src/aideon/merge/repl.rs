//! Interactive, line-driven session.
//!
//! Each input line is one user interaction. The session value is replaced
//! after every successful action; failed actions print an error and leave it
//! unchanged. Serialisation failures while saving are not caught here and
//! end the session with an error.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::aideon::merge::batch;
use crate::aideon::merge::command::{self, Command, HELP};
use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{CellValue, Notice};
use crate::aideon::merge::pipeline::{CellEdit, DEFAULT_EXPORT_FILE_NAME};
use crate::aideon::merge::render;
use crate::aideon::merge::session::{Action, ActionKind, Session};

const PROMPT: &str = "> ";

/// Runs a session until `quit` or end of input and returns its final state.
///
/// Relative upload paths and saved files are resolved against `workdir`.
pub fn run<R: BufRead, W: Write>(input: R, output: &mut W, workdir: &Path) -> Result<Session> {
    let mut session = Session::new();
    writeln!(output, "Excel file merger. Type 'help' for commands.")?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match command::parse_line(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                debug!(?command, "command received");
                session = execute(session, command, output, workdir)?;
            }
            Ok(None) => {}
            Err(error) => writeln!(output, "error: {error}")?,
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    writeln!(output)?;
    info!(stage = %session.stage(), "session ended");
    Ok(session)
}

fn execute<W: Write>(
    session: Session,
    command: Command,
    output: &mut W,
    workdir: &Path,
) -> Result<Session> {
    match command {
        Command::Upload(paths) => {
            let paths: Vec<PathBuf> = paths.iter().map(|path| workdir.join(path)).collect();
            let (uploads, notices) = batch::load_uploads(&paths);
            print_notices(output, &notices)?;
            let next = step(session, Action::Upload(uploads), output)?;
            for file in next.files() {
                write!(output, "{}", render::render_listing(&file.listing()))?;
            }
            Ok(next)
        }
        Command::Select { file, sheets } => {
            step(session, Action::SelectSheets { file, sheets }, output)
        }
        Command::Merge => {
            let next = step(session, Action::Merge, output)?;
            print_grid(&next, output)?;
            Ok(next)
        }
        Command::Columns(columns) => {
            let next = step(session, Action::ArrangeColumns(columns), output)?;
            print_grid(&next, output)?;
            Ok(next)
        }
        Command::Set { row, column, value } => {
            let edit = CellEdit::new(row, column, CellValue::parse_input(&value));
            step(session, Action::EditCell(edit), output)
        }
        Command::Show { json } => {
            match session.grid() {
                Some(grid) if json => writeln!(output, "{}", serde_json::to_string_pretty(grid)?)?,
                Some(grid) => writeln!(output, "{}", render::render_table(grid))?,
                None => writeln!(output, "nothing to show yet; upload and merge files first")?,
            }
            Ok(session)
        }
        Command::Save { file_name } => save(session, file_name, output, workdir),
        Command::Status => {
            writeln!(output, "{}", render::render_status(&session))?;
            Ok(session)
        }
        Command::Reset => step(session, Action::Reset, output),
        Command::Help => {
            writeln!(output, "{HELP}")?;
            Ok(session)
        }
        Command::Quit => Ok(session),
    }
}

/// Applies an action, printing its notices. User errors are printed and the
/// previous session is kept.
fn step<W: Write>(session: Session, action: Action, output: &mut W) -> Result<Session> {
    match session.dispatch(action) {
        Ok(transition) => {
            print_notices(output, &transition.notices)?;
            Ok(transition.session)
        }
        Err(error) => {
            writeln!(output, "error: {error}")?;
            Ok(session)
        }
    }
}

fn save<W: Write>(
    session: Session,
    file_name: Option<String>,
    output: &mut W,
    workdir: &Path,
) -> Result<Session> {
    if !session.is_available(ActionKind::Export) {
        writeln!(
            output,
            "error: {}",
            MergeError::ActionUnavailable {
                action: ActionKind::Export.to_string(),
                stage: session.stage().to_string(),
            }
        )?;
        return Ok(session);
    }

    let file_name = file_name.unwrap_or_else(|| DEFAULT_EXPORT_FILE_NAME.to_string());
    let transition = session.dispatch(Action::Export { file_name })?;
    if let Some(exported) = transition.session.exported() {
        if let Err(error) = exported.save_in(workdir) {
            warn!(file = %exported.file_name, %error, "download not written");
            writeln!(output, "error: {error}")?;
            return Ok(session);
        }
        info!(file = %exported.file_name, mime = exported.mime_type, "download written");
    }
    print_notices(output, &transition.notices)?;
    Ok(transition.session)
}

fn print_grid<W: Write>(session: &Session, output: &mut W) -> Result<()> {
    if let Some(grid) = session.grid() {
        writeln!(output, "{}", render::render_table(grid))?;
    }
    Ok(())
}

fn print_notices<W: Write>(output: &mut W, notices: &[Notice]) -> Result<()> {
    for notice in notices {
        writeln!(output, "{notice}")?;
    }
    Ok(())
}
