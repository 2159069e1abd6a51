//! SetupScan CLI — scan and cache management commands.
//!
//! Commands:
//! - `scan` — run the full daily + weekly pass over a ticker universe and
//!   write the report artifact
//! - `cache status` — report stored snapshots, retrieval dates, sizes
//! - `cache clean` — remove snapshots older than a cutoff

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use setupscan_core::data::{
    PriceSeriesStore, StdoutProgress, TickerDirectory, YahooProvider,
};
use setupscan_core::domain::Resolution;
use setupscan_runner::{
    scan, JsonReportSink, ReportSink, ScanConfig, ScanOptions, ScanReport, ScanResult,
    SectorGrid, SentimentClient, SentimentHistory, SentimentReading,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "setupscan",
    about = "SetupScan CLI — sequential setup signal scanner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily + weekly scan over a ticker universe.
    Scan {
        /// Path to a TOML config file. Mutually exclusive with --universe.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Master-data CSV files (Ticker,Sector,Industry). Repeatable.
        #[arg(long)]
        universe: Vec<PathBuf>,

        /// Curated sector/industry ETF file for the grid scan.
        #[arg(long)]
        sectors: Option<PathBuf>,

        /// Snapshot store directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Report artifact directory.
        #[arg(long, default_value = "reports")]
        output_dir: PathBuf,

        /// Sentiment history CSV path.
        #[arg(long, default_value = "fear_and_greed_history.csv")]
        history_file: PathBuf,

        /// Skip the inter-batch delay (testing against a local provider).
        #[arg(long, default_value_t = false)]
        no_delay: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report stored snapshots and their retrieval dates.
    Status {
        /// Snapshot store directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// Remove snapshots retrieved more than the given number of days ago.
    Clean {
        /// Remove snapshots older than this many days.
        #[arg(long)]
        older_than_days: u64,

        /// Snapshot store directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            universe,
            sectors,
            cache_dir,
            output_dir,
            history_file,
            no_delay,
        } => run_scan(
            config, universe, sectors, cache_dir, output_dir, history_file, no_delay,
        ),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clean {
                older_than_days,
                cache_dir,
                confirm,
            } => run_cache_clean(&cache_dir, older_than_days, confirm),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    config_path: Option<PathBuf>,
    universe: Vec<PathBuf>,
    sectors: Option<PathBuf>,
    cache_dir: PathBuf,
    output_dir: PathBuf,
    history_file: PathBuf,
    no_delay: bool,
) -> Result<()> {
    if config_path.is_some() && !universe.is_empty() {
        bail!("--config and --universe are mutually exclusive");
    }

    let config = if let Some(path) = config_path {
        ScanConfig::from_file(&path).with_context(|| format!("loading {}", path.display()))?
    } else {
        if universe.is_empty() {
            bail!("one of --config or --universe is required");
        }
        ScanConfig {
            universe_files: universe,
            sector_file: sectors,
            cache_dir,
            output_dir,
            history_file,
            ..ScanConfig::default()
        }
    };

    let today = chrono::Utc::now().date_naive();

    // Master data: all universe files merged into one directory.
    let mut directory = TickerDirectory::default();
    for path in &config.universe_files {
        directory.merge(TickerDirectory::load_csv(path));
    }
    if directory.is_empty() {
        eprintln!("WARNING: scan universe is empty");
    }

    let store = PriceSeriesStore::new(&config.cache_dir);
    let provider = YahooProvider::new();
    let progress = StdoutProgress;
    let options = ScanOptions {
        batch_size: config.batch_size,
        batch_delay: if no_delay {
            Duration::ZERO
        } else {
            Duration::from_millis(config.batch_delay_ms)
        },
    };

    // Sentiment index first; a failure degrades to the sentinel.
    let history = SentimentHistory::new(&config.history_file);
    let sentiment =
        SentimentClient::new(config.sentiment_url.clone()).fetch_and_log(&history, today);

    let daily = scan(
        &directory,
        "1D",
        Resolution::Daily,
        &store,
        &provider,
        &options,
        &progress,
        today,
    )?;
    let weekly = scan(
        &directory,
        "1W",
        Resolution::Weekly,
        &store,
        &provider,
        &options,
        &progress,
        today,
    )?;

    // The grid comes from a separate daily pass over the curated
    // sector/industry ETF universe, when one is configured.
    let sector_grid = match &config.sector_file {
        Some(path) => {
            let sector_directory = TickerDirectory::load_csv(path);
            let sector_result = scan(
                &sector_directory,
                "Sector",
                Resolution::Daily,
                &store,
                &provider,
                &options,
                &progress,
                today,
            )?;
            SectorGrid::build(&sector_result.tops, &sector_result.bottoms)
        }
        None => SectorGrid::default(),
    };

    let report = ScanReport {
        generated_on: daily.as_of.or(weekly.as_of).unwrap_or(today),
        universe_size: directory.len(),
        sentiment,
        daily,
        weekly,
        sector_grid,
    };

    print_summary(&report);

    let sink = JsonReportSink::new(&config.output_dir);
    sink.publish(&report)?;
    println!("Report written to: {}", sink.report_path().display());

    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    let store = PriceSeriesStore::new(cache_dir);
    let snapshots = store.snapshots()?;

    if snapshots.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!(
        "{:<10} {:<8} {:<12} {:>8}",
        "Key", "Interval", "Retrieved", "Tickers"
    );
    println!("{}", "-".repeat(42));
    for snap in &snapshots {
        println!(
            "{:<10} {:<8} {:<12} {:>8}",
            snap.cache_key,
            snap.resolution.interval(),
            snap.retrieved_on.to_string(),
            snap.ticker_count
        );
    }

    Ok(())
}

fn run_cache_clean(cache_dir: &Path, older_than_days: u64, confirm: bool) -> Result<()> {
    let store = PriceSeriesStore::new(cache_dir);
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(older_than_days as i64);

    let stale: Vec<_> = store
        .snapshots()?
        .into_iter()
        .filter(|snap| snap.retrieved_on < cutoff)
        .collect();

    if stale.is_empty() {
        println!("No snapshots older than {older_than_days} days to remove.");
        return Ok(());
    }

    println!("Found {} snapshot(s) older than {older_than_days} days:", stale.len());
    for snap in &stale {
        println!(
            "  {} ({}, retrieved {})",
            snap.path.display(),
            snap.cache_key,
            snap.retrieved_on
        );
    }

    if !confirm {
        println!();
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    for snap in &stale {
        std::fs::remove_file(&snap.path)
            .with_context(|| format!("removing {}", snap.path.display()))?;
        println!("Removed: {}", snap.path.display());
    }

    println!("Done. Removed {} snapshot(s).", stale.len());
    Ok(())
}

fn print_summary(report: &ScanReport) {
    println!();
    println!("=== Setup Scan {} ===", report.generated_on);
    match &report.sentiment {
        SentimentReading::Available {
            score,
            previous_close,
            date,
        } => println!("Sentiment index: {score} (prev {previous_close}) on {date}"),
        SentimentReading::Unavailable => println!("Sentiment index: unavailable"),
    }
    println!("Universe: {} tickers", report.universe_size);
    println!();

    print_resolution(&report.daily);
    print_resolution(&report.weekly);

    if !report.sector_grid.is_empty() {
        println!("--- Sector Grid ---");
        for row in SectorGrid::rows() {
            for label in row {
                let mark = match report.sector_grid.cell(label) {
                    Some(cell) => format!("{} {}", cell.strength, cell.direction),
                    None => "-".to_string(),
                };
                println!("{label:<22} {mark}");
            }
        }
        println!();
    }
}

fn print_resolution(result: &ScanResult) {
    let as_of = result
        .as_of
        .map_or_else(|| "n/a".to_string(), |d| d.to_string());
    println!(
        "--- {} (as of {as_of}): {} tops, {} bottoms, {} scanned, {} skipped ---",
        result.label,
        result.tops.len(),
        result.bottoms.len(),
        result.scanned,
        result.skipped.len()
    );
    for (direction, signals) in [("Tops", &result.tops), ("Bottoms", &result.bottoms)] {
        if signals.is_empty() {
            continue;
        }
        println!("{direction}:");
        for signal in signals {
            println!(
                "  {:<8} Setup {:<3} {:.2}  {}",
                signal.ticker,
                signal.strength.to_string(),
                signal.last_close,
                signal.industry
            );
        }
    }
    println!();
}
