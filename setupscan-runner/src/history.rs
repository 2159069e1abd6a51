//! Sentiment history — append-only CSV persistence.
//!
//! One row per successful sentiment fetch: `{Date, Index, Previous Close}`.
//! The header is written once, when the file is empty or absent. Used only
//! by the reporting layer for trend charts.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A single history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Index")]
    pub index: i64,
    #[serde(rename = "Previous Close")]
    pub previous_close: i64,
}

/// Append-only CSV history file manager.
pub struct SentimentHistory {
    path: PathBuf,
}

impl SentimentHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the file is new.
    pub fn append(&self, row: &HistoryRow) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let write_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => return Err(e),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer
            .serialize(row)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.flush()?;

        Ok(())
    }

    /// Read all rows; an absent file is an empty history. Malformed rows
    /// are skipped.
    pub fn read_all(&self) -> io::Result<Vec<HistoryRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<HistoryRow>() {
            match row {
                Ok(row) => rows.push(row),
                Err(_) => continue,
            }
        }
        Ok(rows)
    }
}
