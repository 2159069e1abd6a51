//! End-to-end scan pipeline: mock provider → store → orchestrator →
//! aggregation → report artifact.

use chrono::NaiveDate;
use setupscan_core::data::{
    BatchFetch, DataError, PriceDataProvider, PriceSeriesStore, SeriesMap, SilentProgress,
    TickerDirectory,
};
use setupscan_core::domain::{Bar, Resolution, SetupStrength};
use setupscan_runner::{
    scan, JsonReportSink, ReportSink, ScanOptions, ScanReport, SectorGrid, SentimentReading,
};
use std::io::Write;
use std::time::Duration;
use tempfile::TempDir;

struct FixtureProvider {
    data: SeriesMap,
}

impl PriceDataProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch_batch(
        &self,
        tickers: &[String],
        _resolution: Resolution,
    ) -> Result<BatchFetch, DataError> {
        let mut fetch = BatchFetch::default();
        for ticker in tickers {
            if let Some(bars) = self.data.get(ticker) {
                fetch.series.insert(ticker.clone(), bars.clone());
            } else {
                fetch.series.insert(ticker.clone(), Vec::new());
            }
        }
        Ok(fetch)
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars ending exactly `run` deep into a directional count.
fn ramp_bars(run: usize, rising: bool) -> Vec<Bar> {
    let base = ymd(2024, 1, 2);
    let mut closes = vec![100.0f64; 25];
    for i in 0..run {
        let step = (i as f64 + 1.0) * 2.0;
        closes.push(if rising { 100.0 + step } else { 100.0 - step });
    }
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(base + chrono::Duration::days(i as i64), close))
        .collect()
}

fn write_master_csv(dir: &TempDir, name: &str, rows: &[(&str, &str, &str)]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Ticker,Sector,Industry").unwrap();
    for (ticker, sector, industry) in rows {
        writeln!(file, "{ticker},{sector},{industry}").unwrap();
    }
    path
}

#[test]
fn full_pipeline_produces_report_artifact() {
    let workdir = TempDir::new().unwrap();
    let today = ymd(2024, 7, 17);

    let universe_csv = write_master_csv(
        &workdir,
        "universe.csv",
        &[
            ("AAPL", "Technology", "Consumer Electronics"),
            ("XOM", "Energy", "Oil & Gas"),
            ("JPM", "Financials", "Banks"),
        ],
    );
    let directory = TickerDirectory::load_csv(&universe_csv);

    let mut data = SeriesMap::new();
    data.insert("AAPL".into(), ramp_bars(9, true));
    data.insert("XOM".into(), ramp_bars(13, false));
    data.insert("JPM".into(), ramp_bars(3, true));
    let provider = FixtureProvider { data };

    let store = PriceSeriesStore::new(workdir.path().join("cache"));
    let options = ScanOptions {
        batch_size: 2,
        batch_delay: Duration::ZERO,
    };

    let daily = scan(
        &directory,
        "1D",
        Resolution::Daily,
        &store,
        &provider,
        &options,
        &SilentProgress,
        today,
    )
    .unwrap();
    let weekly = scan(
        &directory,
        "1W",
        Resolution::Weekly,
        &store,
        &provider,
        &options,
        &SilentProgress,
        today,
    )
    .unwrap();

    assert_eq!(daily.tops.len(), 1);
    assert_eq!(daily.tops[0].ticker, "AAPL");
    assert_eq!(daily.tops[0].strength, SetupStrength::Nine);
    assert_eq!(daily.bottoms.len(), 1);
    assert_eq!(daily.bottoms[0].ticker, "XOM");
    assert_eq!(daily.bottoms[0].strength, SetupStrength::Thirteen);
    assert_eq!(daily.scanned, 3);

    // Sector totals mirror the signal lists.
    assert_eq!(
        daily.top_sectors.values().sum::<u32>() as usize,
        daily.tops.len()
    );
    assert_eq!(
        daily.bottom_sectors.values().sum::<u32>() as usize,
        daily.bottoms.len()
    );
    assert_eq!(daily.top_sectors["Technology"], 1);
    assert_eq!(daily.bottom_sectors["Energy"], 1);

    let grid = SectorGrid::build(&daily.tops, &daily.bottoms);
    let report = ScanReport {
        generated_on: today,
        universe_size: directory.len(),
        sentiment: SentimentReading::Unavailable,
        daily,
        weekly,
        sector_grid: grid,
    };

    let sink = JsonReportSink::new(workdir.path().join("reports"));
    sink.publish(&report).unwrap();

    let parsed: ScanReport =
        serde_json::from_str(&std::fs::read_to_string(sink.report_path()).unwrap()).unwrap();
    assert_eq!(parsed.universe_size, 3);
    assert_eq!(parsed.daily.tops[0].ticker, "AAPL");
    assert!(parsed
        .sector_grid
        .cell("Consumer Electronics")
        .is_some());
}

#[test]
fn second_scan_same_day_is_served_from_the_snapshot() {
    let workdir = TempDir::new().unwrap();
    let today = ymd(2024, 7, 17);

    let universe_csv = write_master_csv(
        &workdir,
        "universe.csv",
        &[("AAPL", "Technology", "Consumer Electronics")],
    );
    let directory = TickerDirectory::load_csv(&universe_csv);

    let mut data = SeriesMap::new();
    data.insert("AAPL".into(), ramp_bars(9, true));
    let provider = FixtureProvider { data };

    let store = PriceSeriesStore::new(workdir.path().join("cache"));
    let options = ScanOptions {
        batch_size: 50,
        batch_delay: Duration::ZERO,
    };

    let first = scan(
        &directory,
        "1D",
        Resolution::Daily,
        &store,
        &provider,
        &options,
        &SilentProgress,
        today,
    )
    .unwrap();

    // Second pass hits the snapshot: identical output even with a
    // provider that now has nothing.
    let empty_provider = FixtureProvider {
        data: SeriesMap::new(),
    };
    let second = scan(
        &directory,
        "1D",
        Resolution::Daily,
        &store,
        &empty_provider,
        &options,
        &SilentProgress,
        today,
    )
    .unwrap();

    assert_eq!(first.tops.len(), second.tops.len());
    assert_eq!(first.as_of, second.as_of);
    assert_eq!(second.tops[0].ticker, "AAPL");
}
