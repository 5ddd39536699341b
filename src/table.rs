//! Turning raw table rows into named columns.

use std::cmp::Reverse;

use clap::ValueEnum;
use docdate_types::{CellValue, HitOrigin};
use serde::{Deserialize, Serialize};

use crate::document::{RawTable, WordDocument};
use crate::matcher::SourceRecord;

/// How the header row of a table is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderRow {
    /// The first row.
    #[default]
    First,
    /// The row with the most non-empty cells; ties go to the widest row,
    /// then the earliest. Rows above it are treated as a caption.
    Densest,
}

impl HeaderRow {
    /// Index of the header row. Tables with fewer than two rows have none.
    pub fn locate(self, rows: &[Vec<String>]) -> Option<usize> {
        if rows.len() < 2 {
            return None;
        }
        match self {
            HeaderRow::First => Some(0),
            HeaderRow::Densest => rows
                .iter()
                .enumerate()
                .max_by_key(|(i, row)| {
                    let filled = row.iter().filter(|c| !c.trim().is_empty()).count();
                    (filled, row.len(), Reverse(*i))
                })
                .map(|(i, _)| i),
        }
    }
}

/// One table with named columns. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based position of the table in the document.
    pub table_index: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn from_table(table_index: usize, table: &RawTable, header: HeaderRow) -> Self {
        let (mut columns, data) = match header.locate(&table.rows) {
            Some(h) => (table.rows[h].clone(), &table.rows[h + 1..]),
            None => (Vec::new(), &table.rows[..]),
        };
        // Headerless tables, and cells past the header's width, are named by position.
        let width = data.iter().map(Vec::len).max().unwrap_or(0).max(columns.len());
        for i in columns.len()..width {
            columns.push(i.to_string());
        }
        let rows = data
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, String::new());
                row
            })
            .collect();
        Frame {
            table_index,
            columns,
            rows,
        }
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cells of column `name` as searchable records. Empty when this
    /// table has no such column.
    pub fn column_records(&self, name: &str) -> Vec<SourceRecord<'_>> {
        let Some(col) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| SourceRecord {
                origin: HitOrigin::TableCell {
                    table: self.table_index,
                    column: self.columns[col].clone(),
                    row,
                },
                text: cells[col].as_str(),
            })
            .collect()
    }

    /// The full row as `(column, value)` pairs, in column order.
    pub fn row_values(&self, row: usize) -> Vec<CellValue> {
        let Some(cells) = self.rows.get(row) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .zip(cells)
            .map(|(column, value)| CellValue {
                column: column.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

/// Frame every table of the document.
pub fn frames(document: &WordDocument, header: HeaderRow) -> Vec<Frame> {
    document
        .tables
        .iter()
        .enumerate()
        .map(|(i, table)| Frame::from_table(i, table, header))
        .collect()
}

/// Distinct, non-blank column names across all frames, in order of first
/// appearance.
pub fn column_names(frames: &[Frame]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for name in frames.iter().flat_map(|f| f.columns.iter()) {
        let name = name.as_str();
        if !name.trim().is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> RawTable {
        RawTable {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_header_first_row() {
        let frame = Frame::from_table(
            0,
            &raw(&[&["品名", "交期"], &["螺絲", "2025/10/23"]]),
            HeaderRow::First,
        );
        assert_eq!(frame.columns, vec!["品名", "交期"]);
        assert_eq!(frame.rows, vec![vec!["螺絲", "2025/10/23"]]);
    }

    #[test]
    fn test_single_row_table_gets_positional_names() {
        let frame = Frame::from_table(3, &raw(&[&["2025/10/23", "備註"]]), HeaderRow::First);
        assert_eq!(frame.columns, vec!["0", "1"]);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.table_index, 3);
    }

    #[test]
    fn test_empty_table() {
        let frame = Frame::from_table(0, &RawTable::default(), HeaderRow::Densest);
        assert!(frame.columns.is_empty());
        assert!(frame.rows.is_empty());
    }

    #[test]
    fn test_ragged_rows_padded() {
        let frame = Frame::from_table(
            0,
            &raw(&[&["A", "B"], &["1"], &["1", "2", "3"]]),
            HeaderRow::First,
        );
        assert_eq!(frame.columns, vec!["A", "B", "2"]);
        assert_eq!(frame.rows[0], vec!["1", "", ""]);
        assert_eq!(frame.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_header_densest_skips_caption() {
        let rows = raw(&[
            &["出貨明細", "", ""],
            &["品名", "數量", "交期"],
            &["螺絲", "", "2025/10/23"],
        ]);
        assert_eq!(HeaderRow::Densest.locate(&rows.rows), Some(1));
        let frame = Frame::from_table(0, &rows, HeaderRow::Densest);
        assert_eq!(frame.columns, vec!["品名", "數量", "交期"]);
        assert_eq!(frame.rows, vec![vec!["螺絲", "", "2025/10/23"]]);
    }

    #[test]
    fn test_header_densest_ties() {
        // Equal fill: the wider row wins.
        let rows = raw(&[&["a", "b", ""], &["c", "d"], &["e", "f"]]);
        assert_eq!(HeaderRow::Densest.locate(&rows.rows), Some(0));
        // Equal fill and width: the earliest wins.
        let rows = raw(&[&["x", ""], &["a", "b"], &["c", "d"]]);
        assert_eq!(HeaderRow::Densest.locate(&rows.rows), Some(1));
    }

    #[test]
    fn test_column_records_and_row_values() {
        let frame = Frame::from_table(
            1,
            &raw(&[&["品名", "交期"], &["螺絲", "2025/10/23"], &["螺帽", "10月24日"]]),
            HeaderRow::First,
        );
        let records = frame.column_records("交期");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "10月24日");
        assert_eq!(
            records[1].origin,
            HitOrigin::TableCell {
                table: 1,
                column: "交期".to_string(),
                row: 1
            }
        );
        assert!(frame.column_records("不存在").is_empty());

        let values = frame.row_values(0);
        assert_eq!(values[0].column, "品名");
        assert_eq!(values[1].value, "2025/10/23");
        assert!(frame.row_values(9).is_empty());
    }

    #[test]
    fn test_column_names_distinct_in_order() {
        let doc = WordDocument {
            tables: vec![
                raw(&[&["品名", "", "交期"], &["a", "b", "c"]]),
                raw(&[&["交期", "備註"], &["d", "e"]]),
            ],
            paragraphs: Vec::new(),
        };
        let frames = frames(&doc, HeaderRow::First);
        assert_eq!(column_names(&frames), vec!["品名", "交期", "備註"]);
    }
}
