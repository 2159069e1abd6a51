//! SetupScan Runner — scan orchestration and reporting.
//!
//! This crate builds on `setupscan-core` to provide:
//! - The scan orchestrator (batched fetch, per-ticker isolation, outcomes)
//! - Sector aggregation and the curated sector signal grid
//! - The sentiment index client with its append-only history log
//! - Report composition and the `ReportSink` seam
//! - TOML scan configuration

pub mod aggregate;
pub mod config;
pub mod history;
pub mod report;
pub mod scan;
pub mod sentiment;

pub use aggregate::{count_by_sector, GridSignal, SectorGrid, GRID_LABELS};
pub use config::{ConfigError, ScanConfig};
pub use history::{HistoryRow, SentimentHistory};
pub use report::{JsonReportSink, ReportError, ReportSink, ScanReport};
pub use scan::{scan, ScanError, ScanOptions, ScanResult, SkippedTicker};
pub use sentiment::{SentimentClient, SentimentReading};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn scan_result_is_send_sync() {
        assert_send::<ScanResult>();
        assert_sync::<ScanResult>();
    }

    #[test]
    fn scan_report_is_send_sync() {
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
    }

    #[test]
    fn sentiment_reading_is_send_sync() {
        assert_send::<SentimentReading>();
        assert_sync::<SentimentReading>();
    }
}
