// =============================================================================
// Dataset — one loaded CSV source for the lifetime of a single run
// =============================================================================

use std::path::Path;

use anyhow::Context;
use csv::ReaderBuilder;

use crate::error::{EmaError, Result};

/// Conventional name of the timestamp column in provider CSV files.
pub const TIMESTAMP_COLUMN: &str = "Datetime";

/// An in-memory tabular dataset: a header row plus string cells.
///
/// Values stay as strings until a caller asks for a numeric column, so a file
/// with junk in columns nobody reads still loads.  Nothing here outlives one
/// comparison run.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Load a delimited text file with a header row.
    ///
    /// `separator` is the field delimiter (`,` for standard CSV).
    pub fn from_csv(path: &Path, separator: u8) -> anyhow::Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(separator)
            .from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("failed to read header row of {}", path.display()))?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.with_context(|| format!("failed to parse {}", path.display()))?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EmaError::Schema {
                column: name.to_string(),
            })
    }

    /// The named column as raw strings. Fails with `Schema` when absent.
    pub fn string_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect())
    }

    /// The named column parsed as `f64`.
    ///
    /// Fails with `Schema` when the column is absent and `NonNumeric` on the
    /// first cell that does not parse as a real number.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        let mut values = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            let parsed: f64 = cell.trim().parse().map_err(|_| EmaError::NonNumeric {
                column: name.to_string(),
                row: row_idx,
            })?;
            values.push(parsed);
        }
        Ok(values)
    }

    /// The timestamp column (`Datetime`) as strings.
    pub fn timestamps(&self) -> Result<Vec<String>> {
        self.string_column(TIMESTAMP_COLUMN)
    }
}

/// Derive the ticker label from a source filename: the stem substring before
/// the first `_` (the whole stem when there is no underscore).
///
/// `WMT_hourly_2023-01-17_to_2024-12-31.csv` → `WMT`.
pub fn ticker_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.split_once('_') {
        Some((ticker, _)) => ticker.to_string(),
        None => stem,
    }
}
