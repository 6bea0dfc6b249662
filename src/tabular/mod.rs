//! In-memory workbook: named sheets of header-addressed rows
//!
//! This is the boundary shape exchanged with spreadsheet readers and writers.
//! Sheets keep insertion order; rows keep their order within a sheet.

pub mod cell;

pub use cell::Cell;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One sheet: a header row plus data rows.
///
/// Rows may be shorter than the header; missing trailing cells read as empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Create a sheet from string headers
    pub fn with_headers(name: impl Into<String>, headers: &[&str]) -> Self {
        Self::new(name, headers.iter().map(|h| h.to_string()).collect())
    }

    pub fn with_row(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Index of a header, ignoring surrounding whitespace
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == header.trim())
    }

    /// Cell of a data row under a header
    pub fn cell(&self, row: usize, header: &str) -> Option<&Cell> {
        let column = self.column_index(header)?;
        self.rows.get(row)?.get(column)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows that hold at least one non-empty cell
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &Vec<Cell>)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| !cell.is_empty()))
    }
}

/// A set of named sheets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: IndexMap<String, Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any sheet with the same name
    pub fn insert(&mut self, sheet: Sheet) -> Option<Sheet> {
        self.sheets.insert(sheet.name.clone(), sheet)
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.insert(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.get_mut(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<Sheet> for Workbook {
    fn from_iter<I: IntoIterator<Item = Sheet>>(iter: I) -> Self {
        let mut workbook = Workbook::new();
        for sheet in iter {
            workbook.insert(sheet);
        }
        workbook
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_lookup_by_header() {
        let sheet = Sheet::with_headers("Roles", &["Role", " Access "])
            .with_row(vec![Cell::from("reader"), Cell::from("read")])
            .with_row(vec![Cell::from("writer")]);
        assert_eq!(sheet.cell(0, "Access"), Some(&Cell::from("read")));
        assert_eq!(sheet.cell(1, "Access"), None);
        assert_eq!(sheet.cell(0, "Missing"), None);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let sheet = Sheet::with_headers("Tags", &["Tag"])
            .with_row(vec![Cell::from("a")])
            .with_row(vec![Cell::from(" ")])
            .with_row(vec![])
            .with_row(vec![Cell::from("b")]);
        let indices: Vec<usize> = sheet.data_rows().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 3]);
    }

    #[test]
    fn test_workbook_keeps_sheet_order() {
        let workbook: Workbook = ["Zeta", "Alpha", "Mid"]
            .into_iter()
            .map(|name| Sheet::with_headers(name, &["A"]))
            .collect();
        assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
    }
}
