//! Domain types: bars, price series, resolutions, signal classification.

pub mod bar;
pub mod resolution;
pub mod signal;

pub use bar::{Bar, PriceSeries, SeriesError};
pub use resolution::Resolution;
pub use signal::{Direction, SetupStrength, TickerSignal};
