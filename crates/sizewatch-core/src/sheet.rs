//! Tabular-store contract: a workbook of named worksheets holding rows of
//! string cells, the first row being the header.
//!
//! Row and column indices are zero-based and count the header row, so data
//! starts at row `1`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on worksheet {sheet}: {source}")]
    Io {
        sheet: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worksheet {sheet} backend error: {source}")]
    Backend {
        sheet: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cell ({row}, {col}) is out of range in worksheet {sheet}")]
    OutOfRange {
        sheet: String,
        row: usize,
        col: usize,
    },
}

/// A single worksheet.
pub trait Worksheet {
    fn title(&self) -> &str;

    /// All rows, header included. Rows may be ragged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn rows(&self) -> Result<Vec<Vec<String>>, StoreError>;

    /// Append one row at the end of the sheet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn append_row(&mut self, row: &[String]) -> Result<(), StoreError>;

    /// Overwrite a single cell, padding the row with empty cells if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OutOfRange`] if `row` does not exist.
    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;
}

/// A collection of worksheets addressed by title.
pub trait Workbook {
    type Sheet: Worksheet;

    /// Open the worksheet `title`, creating it with `headers` as its first
    /// row when it does not exist. An existing but empty sheet gets the
    /// header row appended.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the sheet cannot be opened or created.
    fn worksheet(&self, title: &str, headers: &[&str]) -> Result<Self::Sheet, StoreError>;
}

type SharedRows = Arc<Mutex<Vec<Vec<String>>>>;

/// In-memory workbook. Worksheets opened twice share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Arc<Mutex<BTreeMap<String, SharedRows>>>,
}

impl MemoryWorkbook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a worksheet with rows (header first), replacing any existing one.
    pub fn insert_sheet(&self, title: &str, rows: Vec<Vec<String>>) {
        let mut sheets = self.sheets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        sheets.insert(title.to_string(), Arc::new(Mutex::new(rows)));
    }

    /// Snapshot of a worksheet's rows, or `None` if it was never opened.
    #[must_use]
    pub fn snapshot(&self, title: &str) -> Option<Vec<Vec<String>>> {
        let sheets = self.sheets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        sheets.get(title).map(|rows| {
            rows.lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        })
    }
}

impl Workbook for MemoryWorkbook {
    type Sheet = MemoryWorksheet;

    fn worksheet(&self, title: &str, headers: &[&str]) -> Result<MemoryWorksheet, StoreError> {
        let rows = {
            let mut sheets = self.sheets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(sheets.entry(title.to_string()).or_default())
        };
        {
            let mut guard = rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if guard.is_empty() {
                guard.push(headers.iter().map(|h| (*h).to_string()).collect());
            }
        }
        Ok(MemoryWorksheet {
            title: title.to_string(),
            rows,
        })
    }
}

/// Worksheet backed by shared in-memory rows.
#[derive(Debug, Clone)]
pub struct MemoryWorksheet {
    title: String,
    rows: SharedRows,
}

impl MemoryWorksheet {
    /// A standalone worksheet not attached to any workbook.
    #[must_use]
    pub fn from_rows(title: &str, rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.to_string(),
            rows: Arc::new(Mutex::new(rows)),
        }
    }
}

impl Worksheet for MemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn append_row(&mut self, row: &[String]) -> Result<(), StoreError> {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(row.to_vec());
        Ok(())
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cells = rows.get_mut(row).ok_or_else(|| StoreError::OutOfRange {
            sheet: self.title.clone(),
            row,
            col,
        })?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        Ok(())
    }
}
