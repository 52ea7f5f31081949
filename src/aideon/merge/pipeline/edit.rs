use tracing::debug;

use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{CellValue, EditedTable};

/// A single grid cell change.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    /// Zero-based row index as shown in the grid.
    pub row: usize,
    pub column: String,
    pub value: CellValue,
}

impl CellEdit {
    pub fn new(row: usize, column: impl Into<String>, value: CellValue) -> Self {
        Self {
            row,
            column: column.into(),
            value,
        }
    }
}

/// Returns the grid with one cell replaced. The value is stored as given.
pub fn apply_edit(edited: &EditedTable, edit: &CellEdit) -> Result<EditedTable> {
    let col_idx = edited
        .column_index(&edit.column)
        .ok_or_else(|| MergeError::UnknownColumn(edit.column.clone()))?;
    if edit.row >= edited.row_count() {
        return Err(MergeError::RowOutOfRange {
            row: edit.row,
            row_count: edited.row_count(),
        });
    }

    let mut table = edited.as_table().clone();
    table.rows[edit.row][col_idx] = edit.value.clone();
    debug!(row = edit.row, column = %edit.column, "cell edited");
    Ok(EditedTable::from_table(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aideon::merge::model::Table;
    use crate::aideon::merge::pipeline::arrange::{arrange, default_column_selection};
    use crate::aideon::merge::pipeline::merge::concat;

    fn grid() -> EditedTable {
        let merged = concat(vec![Table::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![CellValue::Number(1.0), CellValue::Text("a".to_string())],
                vec![CellValue::Number(2.0), CellValue::Text("b".to_string())],
            ],
        )]);
        let arranged = arrange(&merged, &default_column_selection(&merged)).expect("arranged");
        EditedTable::from(arranged)
    }

    #[test]
    fn edit_changes_only_target_cell() {
        let before = grid();
        let after = apply_edit(&before, &CellEdit::new(1, "name", CellValue::Text("z".into())))
            .expect("edit applied");

        assert_eq!(after.columns, before.columns);
        assert_eq!(after.row_count(), before.row_count());
        assert_eq!(after.rows[0], before.rows[0]);
        assert_eq!(after.rows[1][0], before.rows[1][0]);
        assert_eq!(after.cell(1, "name"), Some(&CellValue::Text("z".to_string())));
        assert_eq!(before.cell(1, "name"), Some(&CellValue::Text("b".to_string())));
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let grid = grid();
        assert!(matches!(
            apply_edit(&grid, &CellEdit::new(2, "id", CellValue::Empty)),
            Err(MergeError::RowOutOfRange { row: 2, row_count: 2 })
        ));
        assert!(matches!(
            apply_edit(&grid, &CellEdit::new(0, "nope", CellValue::Empty)),
            Err(MergeError::UnknownColumn(_))
        ));
    }
}
