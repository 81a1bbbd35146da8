//! CSV-directory backend for the sizewatch workbook: each worksheet is a
//! `<title>.csv` file inside the workbook directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use sizewatch_core::{StoreError, Workbook, Worksheet};

#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    /// Open the workbook at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            sheet: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Workbook for CsvWorkbook {
    type Sheet = CsvWorksheet;

    fn worksheet(&self, title: &str, headers: &[&str]) -> Result<CsvWorksheet, StoreError> {
        let mut sheet = CsvWorksheet {
            title: title.to_string(),
            path: self.dir.join(format!("{title}.csv")),
        };
        if sheet.rows()?.is_empty() {
            tracing::info!(sheet = %title, path = %sheet.path.display(), "creating worksheet");
            let header: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
            sheet.append_row(&header)?;
        }
        Ok(sheet)
    }
}

/// One worksheet stored as a CSV file. Rows may be ragged.
#[derive(Debug, Clone)]
pub struct CsvWorksheet {
    title: String,
    path: PathBuf,
}

impl CsvWorksheet {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            sheet: self.title.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Backend {
            sheet: self.title.clone(),
            source: Box::new(source),
        }
    }

    fn write_all(&self, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&tmp)
                .map_err(|e| self.csv_error(e))?;
            for row in rows {
                writer.write_record(row).map_err(|e| self.csv_error(e))?;
            }
            writer.flush().map_err(|e| self.io_error(e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl Worksheet for CsvWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| self.csv_error(e))
            })
            .collect()
    }

    fn append_row(&mut self, row: &[String]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        writer.write_record(row).map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))
    }

    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        let cells = rows.get_mut(row).ok_or_else(|| StoreError::OutOfRange {
            sheet: self.title.clone(),
            row,
            col,
        })?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        self.write_all(&rows)
    }
}
