//! Spreadsheet-neutral export document model

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Spreadsheet sheet names are limited to 31 characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Name of the cross-instrument sheet
pub const SUMMARY_SHEET: &str = "Summary";

/// One cell. `Blank` marks an undefined value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Date(DateTime<Utc>),
    Number(f64),
    Text(String),
    Blank,
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form used by delimited sinks; blanks become empty fields.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Blank => String::new(),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Blank, Cell::Number)
    }
}

/// Named table with ordered columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cells of the named column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Ordered list of sheets handed to an export sink
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportDocument {
    sheets: Vec<Sheet>,
}

impl ExportDocument {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn summary(&self) -> Option<&Sheet> {
        self.sheet(SUMMARY_SHEET)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Sheet name for a symbol: first 31 characters, with characters that
/// spreadsheets or file systems reject replaced by `-`.
pub fn sheet_name(symbol: &str) -> String {
    symbol
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .map(|c| match c {
            '/' | '\\' | '?' | '*' | '[' | ']' | ':' => '-',
            c => c,
        })
        .collect()
}
