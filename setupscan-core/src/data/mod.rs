//! Data layer: provider abstraction, Yahoo implementation, snapshot store,
//! and master-data loading.

pub mod provider;
pub mod store;
pub mod universe;
pub mod yahoo;

pub use provider::{
    BatchFetch, DataError, PriceDataProvider, ScanProgress, SeriesMap, SilentProgress,
    StdoutProgress,
};
pub use store::{PriceSeriesStore, SnapshotRecord, SnapshotStatus, StoreError};
pub use universe::{TickerDirectory, UNKNOWN_LABEL};
pub use yahoo::YahooProvider;
