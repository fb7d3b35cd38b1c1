//! Header-indexed reader for the benchmark's tab-separated tables.

use csv::{Reader, ReaderBuilder, StringRecord};
use medalign_core::RecordError;
use std::fs::File;
use std::path::{Path, PathBuf};

/// An open TSV table whose required columns have been located.
pub(crate) struct Table {
    path: PathBuf,
    reader: Reader<File>,
    positions: Vec<usize>,
}

/// One data row, with the required columns in the order they were requested.
pub(crate) struct Row {
    pub line: u64,
    fields: Vec<String>,
}

impl Row {
    pub fn get(&self, index: usize) -> &str {
        &self.fields[index]
    }

    pub fn take(&mut self, index: usize) -> String {
        std::mem::take(&mut self.fields[index])
    }

    /// Parse a required column as an integer id.
    pub fn parse_id(&self, index: usize, column: &str, path: &Path) -> Result<i64, RecordError> {
        let raw = self.get(index).trim();
        raw.parse::<i64>().map_err(|_| RecordError::Malformed {
            path: path.to_path_buf(),
            line: self.line,
            reason: format!("column '{column}' is not an integer: '{raw}'"),
        })
    }
}

impl Table {
    /// Open `path` and locate every column in `required`.
    ///
    /// `what` names the table in `NotFound` errors.
    pub fn open(path: &Path, what: &'static str, required: &[&str]) -> Result<Self, RecordError> {
        if !path.is_file() {
            return Err(RecordError::NotFound {
                what,
                path: path.to_path_buf(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| io_error(path, e))?;

        let headers = reader.headers().map_err(|e| io_error(path, e))?.clone();
        let mut positions = Vec::with_capacity(required.len());
        let mut missing = Vec::new();
        for column in required {
            match headers.iter().position(|h| h.trim() == *column) {
                Some(pos) => positions.push(pos),
                None => missing.push((*column).to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(RecordError::MissingColumns {
                path: path.to_path_buf(),
                missing,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            positions,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every data row, projecting to the required columns.
    pub fn rows(&mut self) -> Result<Vec<Row>, RecordError> {
        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(true) => rows.push(self.project(&record)?),
                Ok(false) => break,
                Err(e) => return Err(io_error(&self.path, e)),
            }
        }
        Ok(rows)
    }

    fn project(&self, record: &StringRecord) -> Result<Row, RecordError> {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let fields = self
            .positions
            .iter()
            .map(|&pos| {
                record
                    .get(pos)
                    .map(str::to_string)
                    .ok_or_else(|| RecordError::Malformed {
                        path: self.path.clone(),
                        line,
                        reason: format!(
                            "expected at least {} fields, found {}",
                            pos + 1,
                            record.len()
                        ),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Row { line, fields })
    }
}

fn io_error(path: &Path, err: csv::Error) -> RecordError {
    match err.position() {
        Some(pos) => RecordError::Malformed {
            path: path.to_path_buf(),
            line: pos.line(),
            reason: err.to_string(),
        },
        None => RecordError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}
