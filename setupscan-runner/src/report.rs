//! Report composition and the rendering seam.
//!
//! A `ScanReport` bundles everything a renderer needs: both resolution
//! passes, the sector grid, the sentiment reading, and the as-of stamp.
//! Renderers implement [`ReportSink`]; the scanner never depends on the
//! rendering format.

use crate::aggregate::SectorGrid;
use crate::scan::ScanResult;
use crate::sentiment::SentimentReading;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from publishing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One complete scan run, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// UTC date the scan ran.
    pub generated_on: NaiveDate,
    pub universe_size: usize,
    pub sentiment: SentimentReading,
    pub daily: ScanResult,
    pub weekly: ScanResult,
    pub sector_grid: SectorGrid,
}

/// Consumer of a finished report. Implementations render independently.
pub trait ReportSink {
    fn publish(&self, report: &ScanReport) -> Result<(), ReportError>;
}

/// Writes the report as a JSON artifact under an output directory.
pub struct JsonReportSink {
    output_dir: PathBuf,
}

impl JsonReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path the report will be written to.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("report.json")
    }
}

impl ReportSink for JsonReportSink {
    fn publish(&self, report: &ScanReport) -> Result<(), ReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| ReportError::Io {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let json = serde_json::to_string_pretty(report)?;
        let path = self.report_path();
        write_atomic(&path, json.as_bytes()).map_err(|e| ReportError::Io {
            path: path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

/// Write via a `.tmp` sibling and rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use setupscan_core::domain::Resolution;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn empty_result(label: &str, resolution: Resolution) -> ScanResult {
        ScanResult {
            label: label.into(),
            resolution,
            as_of: NaiveDate::from_ymd_opt(2024, 7, 16),
            tops: Vec::new(),
            bottoms: Vec::new(),
            top_sectors: BTreeMap::new(),
            bottom_sectors: BTreeMap::new(),
            scanned: 0,
            skipped: Vec::new(),
        }
    }

    fn sample_report() -> ScanReport {
        ScanReport {
            generated_on: NaiveDate::from_ymd_opt(2024, 7, 17).unwrap(),
            universe_size: 0,
            sentiment: SentimentReading::Unavailable,
            daily: empty_result("1D", Resolution::Daily),
            weekly: empty_result("1W", Resolution::Weekly),
            sector_grid: SectorGrid::default(),
        }
    }

    #[test]
    fn json_sink_writes_report_artifact() {
        let dir = TempDir::new().unwrap();
        let sink = JsonReportSink::new(dir.path().join("reports"));

        sink.publish(&sample_report()).unwrap();

        let content = std::fs::read_to_string(sink.report_path()).unwrap();
        let parsed: ScanReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.daily.label, "1D");
        assert_eq!(parsed.sentiment, SentimentReading::Unavailable);
    }

    #[test]
    fn publish_overwrites_previous_report() {
        let dir = TempDir::new().unwrap();
        let sink = JsonReportSink::new(dir.path());

        let mut report = sample_report();
        sink.publish(&report).unwrap();
        report.universe_size = 42;
        sink.publish(&report).unwrap();

        let content = std::fs::read_to_string(sink.report_path()).unwrap();
        let parsed: ScanReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.universe_size, 42);
    }
}
