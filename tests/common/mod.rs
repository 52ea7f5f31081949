#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use aideon_merge::model::{CellValue, Table};
use rust_xlsxwriter::Workbook;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

pub fn num(value: f64) -> CellValue {
    CellValue::Number(value)
}

pub fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
    Table::new(columns.iter().map(|column| column.to_string()).collect(), rows)
}

/// Builds an in-memory workbook with one worksheet per entry.
pub fn workbook_bytes(sheets: &[(&str, Table)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet named");
        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet
                .write_string(0, col_idx as u16, header)
                .expect("header written");
        }
        for (row_idx, row) in table.rows.iter().enumerate() {
            let sheet_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let sheet_col = col_idx as u16;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Number(value) | CellValue::DateTime(value) => {
                        worksheet
                            .write_number(sheet_row, sheet_col, *value)
                            .expect("number written");
                    }
                    CellValue::Bool(value) => {
                        worksheet
                            .write_boolean(sheet_row, sheet_col, *value)
                            .expect("boolean written");
                    }
                    CellValue::Text(value) | CellValue::Error(value) => {
                        worksheet
                            .write_string(sheet_row, sheet_col, value)
                            .expect("string written");
                    }
                }
            }
        }
    }
    workbook.save_to_buffer().expect("workbook saved")
}

/// `S1` has columns [id, name] and 2 rows; `S2` has [id, value] and 3 rows.
pub fn sample_workbook() -> Vec<u8> {
    workbook_bytes(&[
        (
            "S1",
            table(
                &["id", "name"],
                vec![vec![num(1.0), text("Alice")], vec![num(2.0), text("Bob")]],
            ),
        ),
        (
            "S2",
            table(
                &["id", "value"],
                vec![
                    vec![num(3.0), num(30.0)],
                    vec![num(4.0), num(40.0)],
                    vec![num(5.0), num(50.0)],
                ],
            ),
        ),
    ])
}

/// Rewrites one part of an xlsx container, copying every other part as is.
pub fn replace_part(xlsx: &[u8], part: &str, contents: &[u8]) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(xlsx)).expect("xlsx container");
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Stored);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("zip entry");
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).expect("zip entry read");
        writer.start_file(name.as_str(), options).expect("zip entry started");
        if name == part {
            writer.write_all(contents).expect("replacement written");
        } else {
            writer.write_all(&bytes).expect("zip entry copied");
        }
    }

    writer.finish().expect("zip finished").into_inner()
}
