//! Spreadsheet ingestion into an untyped table
//!
//! CSV files go through the `csv` crate with delimiter detection; Excel and
//! OpenDocument workbooks go through `calamine`. Either way the file is opened,
//! read completely and closed inside [`load_table`]; nothing downstream holds
//! a handle.

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

use crate::error::{Error, Result};

/// Header row plus string cells, exactly as read from the file
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Where the table came from (file path or a caller-chosen label)
    pub source: String,
    pub headers: Vec<String>,
    /// Data rows; rows may be shorter or longer than `headers`
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows,
        }
    }

    /// Parse CSV text (header row first) with delimiter detection
    pub fn from_csv_str(source: impl Into<String>, content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = detect_delimiter(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(source, headers, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How a file is read, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Read a spreadsheet file into a [`RawTable`]
///
/// `sheet` selects a worksheet by name for workbooks; the first sheet is
/// used otherwise. It is ignored for CSV input.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let table = match SourceFormat::from_path(path)? {
        SourceFormat::Csv => {
            let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
            let content = String::from_utf8_lossy(&bytes);
            RawTable::from_csv_str(path.display().to_string(), &content)?
        }
        SourceFormat::Workbook => load_workbook(path, sheet)?,
    };

    tracing::info!(
        source = %table.source,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded table"
    );
    Ok(table)
}

fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(Error::MissingSheet(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::EmptySheet(path.to_path_buf()))??,
    };

    table_from_range(path, &range)
}

fn table_from_range(path: &Path, range: &Range<Data>) -> Result<RawTable> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| Error::EmptySheet(path.to_path_buf()))?
        .iter()
        .map(cell_to_string)
        .collect();

    let rows = rows
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    Ok(RawTable::new(path.display().to_string(), headers, rows))
}

/// Render a workbook cell the way the record parser expects it
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // Phone numbers are frequently stored as numbers
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Detect delimiter from content (comma, semicolon, tab, pipe)
///
/// Scores each candidate by how often and how consistently it appears over
/// the first lines; falls back to comma.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();
    if sample_lines.is_empty() {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &candidates {
        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
        let variance = field_counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / field_counts.len() as f32;

        // Consistent and frequent wins
        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}
