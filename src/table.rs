//! In-memory table of franchise rows plus spreadsheet import/export.
//!
//! `.csv` is read and written with `csv`; `.xlsx`/`.xlsm`/`.xls`/`.xlsb`/`.ods` are read with
//! `calamine` (first worksheet only) and `.xlsx` is written with `rust_xlsxwriter`.

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EnrichError, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet error value such as `#N/A`, kept verbatim for pass-through columns
    Error(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // Whole numbers render without a trailing ".0" (zip codes, store numbers)
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Error(code) => f.write_str(code),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::text(s.clone()),
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

/// Header row plus data rows. Every row is kept as wide as the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len().max(row.len()), CellValue::Empty);
        // Cells beyond the header get anonymous columns so nothing is dropped
        while self.headers.len() < row.len() {
            let name = format!("Column{}", self.headers.len() + 1);
            self.headers.push(name);
            for existing in &mut self.rows {
                existing.push(CellValue::Empty);
            }
        }
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EnrichError::MissingColumn(name.to_string()))
    }

    /// Index of the named column, appending an empty one if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(CellValue::Empty);
        }
        self.headers.len() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Text of a cell, trimmed. Empty cells give an empty string.
    pub fn text(&self, row: usize, col: usize) -> String {
        self.get(row, col).to_string().trim().to_string()
    }

    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(col)) {
            *cell = value;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// Load the first sheet of a spreadsheet (or a CSV file) into a [`Table`].
pub fn read_table(path: &Path) -> Result<Table> {
    let table = match extension(path).as_str() {
        "csv" => read_csv(path)?,
        _ => read_workbook(path)?,
    };
    info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

/// Write a [`Table`] as `.csv` or `.xlsx` depending on the path's extension.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    match extension(path).as_str() {
        "csv" => write_csv(table, path)?,
        "xlsx" => write_xlsx(table, path)?,
        other => {
            return Err(EnrichError::Spreadsheet(format!(
                "unsupported output format '.{}' (expected .xlsx or .csv)",
                other
            )))
        }
    }
    info!("Wrote {} rows to {}", table.row_count(), path.display());
    Ok(())
}

fn read_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| EnrichError::Spreadsheet(format!("{} contains no sheets", path.display())))?;
    debug!("Reading sheet '{}'", sheet_name);
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| CellValue::from(cell).to_string().trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(CellValue::from).collect());
    }
    Ok(table)
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(CellValue::text).collect());
    }
    Ok(table)
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in table.headers().iter().enumerate() {
        worksheet.write_string(0, col as u16, header.as_str())?;
    }
    for (r, row) in table.rows().enumerate() {
        let row_num = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) | CellValue::Error(s) => {
                    worksheet.write_string(row_num, col, s.as_str())?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
