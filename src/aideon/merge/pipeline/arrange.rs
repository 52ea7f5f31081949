use tracing::{debug, instrument};

use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::model::{ArrangedTable, MergedTable, Table};

/// Columns pre-selected for a fresh merge: all of them, in merge order.
pub fn default_column_selection(merged: &MergedTable) -> Vec<String> {
    merged.columns.clone()
}

/// Projects the merged table onto `columns`, in the order given.
///
/// An empty selection is valid and yields a table without columns that
/// still has one (empty) row per merged row.
#[instrument(level = "debug", skip_all, fields(selected = columns.len()))]
pub fn arrange(merged: &MergedTable, columns: &[String]) -> Result<ArrangedTable> {
    let mut indices: Vec<usize> = Vec::with_capacity(columns.len());
    for (position, column) in columns.iter().enumerate() {
        if columns[..position].contains(column) {
            return Err(MergeError::DuplicateColumn(column.clone()));
        }
        let index = merged
            .column_index(column)
            .ok_or_else(|| MergeError::UnknownColumn(column.clone()))?;
        indices.push(index);
    }

    let rows = merged
        .rows
        .iter()
        .map(|row| indices.iter().map(|&index| row[index].clone()).collect())
        .collect();

    debug!(rows = merged.row_count(), "columns arranged");
    Ok(ArrangedTable::from_table(Table::new(columns.to_vec(), rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aideon::merge::model::CellValue;
    use crate::aideon::merge::pipeline::merge::concat;

    fn merged() -> MergedTable {
        concat(vec![Table::new(
            vec!["id".to_string(), "name".to_string(), "value".to_string()],
            vec![
                vec![
                    CellValue::Number(1.0),
                    CellValue::Text("a".to_string()),
                    CellValue::Empty,
                ],
                vec![
                    CellValue::Number(2.0),
                    CellValue::Empty,
                    CellValue::Number(7.0),
                ],
            ],
        )])
    }

    #[test]
    fn default_selection_is_identity() {
        let merged = merged();
        let arranged = arrange(&merged, &default_column_selection(&merged)).expect("arranged");
        assert_eq!(arranged.as_table(), merged.as_table());
    }

    #[test]
    fn subset_and_reorder_keep_rows() {
        let merged = merged();
        let arranged =
            arrange(&merged, &["value".to_string(), "id".to_string()]).expect("arranged");

        assert_eq!(arranged.columns, vec!["value", "id"]);
        assert_eq!(
            arranged.rows,
            vec![
                vec![CellValue::Empty, CellValue::Number(1.0)],
                vec![CellValue::Number(7.0), CellValue::Number(2.0)],
            ]
        );
    }

    #[test]
    fn empty_selection_keeps_row_count() {
        let arranged = arrange(&merged(), &[]).expect("arranged");
        assert_eq!(arranged.column_count(), 0);
        assert_eq!(arranged.row_count(), 2);
    }

    #[test]
    fn unknown_and_repeated_columns_are_rejected() {
        let merged = merged();
        assert!(matches!(
            arrange(&merged, &["missing".to_string()]),
            Err(MergeError::UnknownColumn(name)) if name == "missing"
        ));
        assert!(matches!(
            arrange(&merged, &["id".to_string(), "id".to_string()]),
            Err(MergeError::DuplicateColumn(name)) if name == "id"
        ));
    }
}
