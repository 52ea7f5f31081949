//! Line commands understood by the interactive session.

use std::path::PathBuf;

use crate::aideon::merge::error::{MergeError, Result};

/// Help text printed by the `help` command.
pub const HELP: &str = "\
commands:
  upload <path>...              replace the uploaded files
  select <file> [<sheet>...]    choose the sheets to merge from one file
  merge                         merge the selected sheets
  columns [<column>...]         choose and order the merged columns
  set <row> <column> <value>    edit one grid cell (empty value clears it)
  show [json]                   print the current grid
  save [<file name>]            save the grid to an .xlsx file
  status                        show the session stage and selections
  reset                         discard everything
  help                          show this text
  quit                          leave the session
Wrap names containing spaces in double quotes.";

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Vec<PathBuf>),
    Select { file: String, sheets: Vec<String> },
    Merge,
    Columns(Vec<String>),
    Set { row: usize, column: String, value: String },
    Show { json: bool },
    Save { file_name: Option<String> },
    Status,
    Reset,
    Help,
    Quit,
}

/// Parses one input line. Blank lines and lines starting with `#` yield
/// `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = tokenize(trimmed)?.into_iter();
    let Some(verb) = tokens.next() else {
        return Ok(None);
    };
    let args: Vec<String> = tokens.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "upload" => {
            if args.is_empty() {
                return Err(invalid("upload needs at least one path"));
            }
            Command::Upload(args.into_iter().map(PathBuf::from).collect())
        }
        "select" => {
            let mut args = args.into_iter();
            let file = args
                .next()
                .ok_or_else(|| invalid("select needs a file name"))?;
            Command::Select {
                file,
                sheets: args.collect(),
            }
        }
        "merge" => no_args(&verb, &args, Command::Merge)?,
        "columns" => Command::Columns(args),
        "set" => parse_set(args)?,
        "show" => match args.as_slice() {
            [] => Command::Show { json: false },
            [format] if format.eq_ignore_ascii_case("json") => Command::Show { json: true },
            _ => return Err(invalid("usage: show [json]")),
        },
        "save" => match args.len() {
            0 => Command::Save { file_name: None },
            1 => Command::Save {
                file_name: args.into_iter().next(),
            },
            _ => return Err(invalid("usage: save [<file name>]")),
        },
        "status" => no_args(&verb, &args, Command::Status)?,
        "reset" => no_args(&verb, &args, Command::Reset)?,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(invalid(format!("unknown command '{other}'"))),
    };
    Ok(Some(command))
}

fn parse_set(args: Vec<String>) -> Result<Command> {
    let mut args = args.into_iter();
    let (Some(row), Some(column)) = (args.next(), args.next()) else {
        return Err(invalid("usage: set <row> <column> <value>"));
    };
    let row = row
        .parse::<usize>()
        .map_err(|_| invalid(format!("row must be a non-negative integer, got '{row}'")))?;
    let value = args.collect::<Vec<_>>().join(" ");
    Ok(Command::Set { row, column, value })
}

fn no_args(verb: &str, args: &[String], command: Command) -> Result<Command> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(invalid(format!("{verb} takes no arguments")))
    }
}

fn invalid(message: impl Into<String>) -> MergeError {
    MergeError::InvalidCommand(message.into())
}

/// Splits a line on whitespace. Double quotes group words; inside quotes
/// `\"` and `\\` escape a quote and a backslash.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            '\\' if quoted => match chars.next() {
                Some(escaped @ ('"' | '\\')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            ch if ch.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(invalid("unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_groups_quoted_words() {
        assert_eq!(
            tokenize(r#"select "Q1 report.xlsx" "Sheet 1" Totals"#).expect("tokens"),
            vec!["select", "Q1 report.xlsx", "Sheet 1", "Totals"]
        );
        assert_eq!(
            tokenize(r#"set 0 note "say \"hi\"" """#).expect("tokens"),
            vec!["set", "0", "note", "say \"hi\"", ""]
        );
        assert!(tokenize(r#"select "open"#).is_err());
    }

    #[test]
    fn parses_each_command() {
        assert_eq!(parse_line("  ").expect("parsed"), None);
        assert_eq!(parse_line("# comment").expect("parsed"), None);
        assert_eq!(
            parse_line("upload a.xlsx b.xlsx").expect("parsed"),
            Some(Command::Upload(vec![
                PathBuf::from("a.xlsx"),
                PathBuf::from("b.xlsx")
            ]))
        );
        assert_eq!(
            parse_line("select a.xlsx").expect("parsed"),
            Some(Command::Select {
                file: "a.xlsx".to_string(),
                sheets: Vec::new()
            })
        );
        assert_eq!(parse_line("MERGE").expect("parsed"), Some(Command::Merge));
        assert_eq!(
            parse_line("columns name id").expect("parsed"),
            Some(Command::Columns(vec!["name".to_string(), "id".to_string()]))
        );
        assert_eq!(
            parse_line("set 3 name Alice Smith").expect("parsed"),
            Some(Command::Set {
                row: 3,
                column: "name".to_string(),
                value: "Alice Smith".to_string()
            })
        );
        assert_eq!(
            parse_line("show json").expect("parsed"),
            Some(Command::Show { json: true })
        );
        assert_eq!(
            parse_line("save").expect("parsed"),
            Some(Command::Save { file_name: None })
        );
        assert_eq!(parse_line("exit").expect("parsed"), Some(Command::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(parse_line("upload").is_err());
        assert!(parse_line("set x name 1").is_err());
        assert!(parse_line("set 1").is_err());
        assert!(parse_line("merge now").is_err());
        assert!(parse_line("save a.xlsx b.xlsx").is_err());
        assert!(parse_line("frobnicate").is_err());
    }
}
