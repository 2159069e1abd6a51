//! The sequential counting engine and series normalization.

pub mod normalize;
pub mod sequential;

pub use normalize::{as_of, normalize, week_start};
pub use sequential::{evaluate, evaluate_closes, SetupFlags, MIN_BARS};

/// Create a series from close prices for testing, one bar per calendar day.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{Bar, PriceSeries};
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(base_date + chrono::Duration::days(i as i64), close))
        .collect();
    PriceSeries::new(bars).expect("test closes produce a valid series")
}
