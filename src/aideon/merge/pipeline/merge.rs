use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::aideon::merge::io::excel_read::Workbook;
use crate::aideon::merge::model::{CellValue, MergedTable, Notice, Table};
use crate::aideon::merge::pipeline::ingest::{IngestedFile, SheetSelection};

/// Message shown after a successful merge.
pub const MERGE_SUCCESS_MESSAGE: &str = "Files merged successfully!";
/// Message shown when no selected sheet could be read.
pub const EMPTY_MERGE_MESSAGE: &str = "No sheets were merged";

/// Result of a merge request.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// `None` when no sheet could be read.
    pub table: Option<MergedTable>,
    pub notices: Vec<Notice>,
}

/// Reads every selected sheet and concatenates the results.
///
/// Files are visited in upload order and sheets in selection order. A sheet
/// that fails to read is reported and skipped; the sheets read before and
/// after it are kept.
#[instrument(level = "info", skip_all, fields(file_count = files.len()))]
pub fn merge(files: &[IngestedFile], selection: &SheetSelection) -> MergeOutcome {
    let mut tables: Vec<Table> = Vec::new();
    let mut notices: Vec<Notice> = Vec::new();

    for ingested in files {
        let sheets = match selection.get(ingested.name()) {
            Some(sheets) if !sheets.is_empty() => sheets,
            _ => continue,
        };

        let mut workbook = match Workbook::open(&ingested.file) {
            Ok(workbook) => workbook,
            Err(error) => {
                warn!(file = %ingested.name(), %error, "workbook could not be reopened");
                for sheet in sheets {
                    notices.push(sheet_error(sheet, ingested.name(), &error));
                }
                continue;
            }
        };

        for sheet in sheets {
            match workbook.read_sheet(sheet) {
                Ok(table) => {
                    debug!(
                        file = %ingested.name(),
                        sheet = %sheet,
                        rows = table.row_count(),
                        columns = table.column_count(),
                        "sheet read"
                    );
                    tables.push(table);
                }
                Err(error) => {
                    warn!(file = %ingested.name(), sheet = %sheet, %error, "sheet skipped");
                    notices.push(sheet_error(sheet, ingested.name(), &error));
                }
            }
        }
    }

    if tables.is_empty() {
        warn!("no sheets were read; merge produced no table");
        notices.push(Notice::warning(EMPTY_MERGE_MESSAGE));
        return MergeOutcome {
            table: None,
            notices,
        };
    }

    let merged = concat(tables);
    info!(
        rows = merged.row_count(),
        columns = merged.column_count(),
        "sheets merged"
    );
    notices.push(Notice::success(MERGE_SUCCESS_MESSAGE));
    MergeOutcome {
        table: Some(merged),
        notices,
    }
}

fn sheet_error(sheet: &str, file: &str, error: &impl std::fmt::Display) -> Notice {
    Notice::error(format!("Error reading sheet {sheet} from {file}: {error}"))
}

/// Concatenates tables row-wise.
///
/// Columns are matched by exact name. The result's columns are the union of
/// all input columns in order of first appearance; a row gets `Empty` under
/// every column its source table did not have.
pub fn concat(tables: Vec<Table>) -> MergedTable {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for table in &tables {
        for column in &table.columns {
            if !positions.contains_key(column) {
                positions.insert(column.clone(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let width = columns.len();
    let mut rows: Vec<Vec<CellValue>> =
        Vec::with_capacity(tables.iter().map(Table::row_count).sum());

    for table in tables {
        let targets: Vec<usize> = table
            .columns
            .iter()
            .map(|column| positions[column])
            .collect();
        for row in table.rows {
            let mut merged_row = vec![CellValue::Empty; width];
            for (cell, &target) in row.into_iter().zip(&targets) {
                merged_row[target] = cell;
            }
            rows.push(merged_row);
        }
    }

    MergedTable::from_table(Table::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aideon::merge::model::UploadedFile;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn concat_unions_columns_by_name_in_first_appearance_order() {
        let s1 = table(
            &["id", "name"],
            vec![
                vec![CellValue::Number(1.0), text("a")],
                vec![CellValue::Number(2.0), text("b")],
            ],
        );
        let s2 = table(
            &["value", "id"],
            vec![vec![CellValue::Number(9.0), CellValue::Number(3.0)]],
        );

        let merged = concat(vec![s1, s2]);

        assert_eq!(merged.columns, vec!["id", "name", "value"]);
        assert_eq!(
            merged.rows,
            vec![
                vec![CellValue::Number(1.0), text("a"), CellValue::Empty],
                vec![CellValue::Number(2.0), text("b"), CellValue::Empty],
                vec![CellValue::Number(3.0), CellValue::Empty, CellValue::Number(9.0)],
            ]
        );
    }

    #[test]
    fn concat_keeps_zero_column_tables() {
        let merged = concat(vec![Table::default(), table(&["x"], vec![vec![text("1")]])]);
        assert_eq!(merged.columns, vec!["x"]);
        assert_eq!(merged.row_count(), 1);
    }

    #[test]
    fn files_without_selection_are_ignored_and_empty_merge_warns() {
        let files = vec![IngestedFile {
            file: UploadedFile::new("a.xlsx", Vec::new()),
            sheet_names: vec!["S1".to_string()],
        }];
        let selection = SheetSelection::default()
            .with_sheets(&files, "a.xlsx", &[])
            .expect("empty selection accepted");

        let outcome = merge(&files, &selection);

        assert!(outcome.table.is_none());
        assert_eq!(outcome.notices, vec![Notice::warning(EMPTY_MERGE_MESSAGE)]);
    }

    #[test]
    fn unreadable_workbook_reports_each_selected_sheet() {
        let files = vec![IngestedFile {
            file: UploadedFile::new("a.xlsx", b"garbage".to_vec()),
            sheet_names: vec!["S1".to_string(), "S2".to_string()],
        }];
        let selection = SheetSelection::default()
            .with_sheets(&files, "a.xlsx", &["S1".to_string(), "S2".to_string()])
            .expect("selection accepted");

        let outcome = merge(&files, &selection);

        assert!(outcome.table.is_none());
        assert_eq!(outcome.notices.len(), 3);
        assert!(outcome.notices[0].message.starts_with("Error reading sheet S1 from a.xlsx"));
        assert!(outcome.notices[1].message.starts_with("Error reading sheet S2 from a.xlsx"));
    }
}
