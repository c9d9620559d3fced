//! Export sinks: delimited files per sheet, one workbook, or JSON

use crate::export::{Cell, ExportDocument, Sheet, DATE_COLUMN};
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serial day number of 1970-01-01 in the 1900 date system.
const EXCEL_UNIX_EPOCH: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Write one sheet as CSV: a header row, then one line per row.
pub fn write_sheet_csv<W: Write>(sheet: &Sheet, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(sheet.columns())?;
    for row in sheet.rows() {
        wtr.write_record(row.iter().map(|cell| cell.to_field()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes every sheet of a document to `<dir>/<sheet name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the written paths in sheet order. An empty document writes
    /// nothing but still creates the directory.
    pub fn write(&self, document: &ExportDocument) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export directory: {}", self.dir.display()))?;

        let mut written = Vec::with_capacity(document.sheets().len());
        for sheet in document.sheets() {
            let path = self.dir.join(format!("{}.csv", sheet.name()));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_sheet_csv(sheet, file)?;
            written.push(path);
        }

        info!("Wrote {} sheets to {}", written.len(), self.dir.display());
        Ok(written)
    }
}

/// Writes a whole document as one `.xlsx` workbook, one worksheet per sheet.
///
/// Numbers stay numeric, dates become date-formatted serials and blank
/// cells are left empty.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, document: &ExportDocument) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create export directory: {}", parent.display()))?;
        }

        let header = Format::new().set_bold();
        let date = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        let mut workbook = Workbook::new();
        if document.is_empty() {
            workbook.add_worksheet();
        }
        for sheet in document.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(sheet.name())
                .with_context(|| format!("Invalid worksheet name: {}", sheet.name()))?;

            for (c, name) in sheet.columns().iter().enumerate() {
                worksheet.write_string_with_format(0, column_index(c)?, name, &header)?;
            }
            for (r, row) in sheet.rows().iter().enumerate() {
                let r = u32::try_from(r + 1).context("Too many rows for a worksheet")?;
                for (c, cell) in row.iter().enumerate() {
                    let c = column_index(c)?;
                    match cell {
                        Cell::Date(d) => {
                            worksheet.write_number_with_format(r, c, excel_serial(*d), &date)?;
                        }
                        Cell::Number(v) => {
                            worksheet.write_number(r, c, *v)?;
                        }
                        Cell::Text(text) => {
                            worksheet.write_string(r, c, text)?;
                        }
                        Cell::Blank => {}
                    }
                }
            }
            if sheet.columns().first().is_some_and(|c| c == DATE_COLUMN) {
                worksheet.set_column_width(0, 20.0)?;
            }
            worksheet.set_freeze_panes(1, 0)?;
        }

        workbook
            .save(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(
            "Wrote workbook with {} sheets to {}",
            document.sheets().len(),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

fn column_index(c: usize) -> Result<u16> {
    u16::try_from(c).context("Too many columns for a worksheet")
}

/// Spreadsheet serial date: days since 1899-12-30, with the time of day as
/// the fraction.
pub fn excel_serial(date: DateTime<Utc>) -> f64 {
    EXCEL_UNIX_EPOCH + date.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Serialize a document as pretty JSON; blank cells become `null`.
pub fn to_json(document: &ExportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
