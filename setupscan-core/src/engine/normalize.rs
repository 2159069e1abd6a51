//! Series normalization: in-progress-period trimming and as-of dates.
//!
//! Weekly bars for the still-running calendar week are provisional — the
//! provider emits them before the week closes. Evaluating one would count a
//! half-formed bar, so it is excluded, provided at least one bar remains.
//! Daily series pass through untouched.

use crate::domain::{PriceSeries, Resolution};
use chrono::{Datelike, Duration, NaiveDate};

/// Monday of the week containing `date` (UTC calendar).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Trim the in-progress period from a series.
///
/// `today` is the current UTC date, injected by the caller. Weekly: the
/// final bar is dropped when its date falls on or after the Monday of
/// `today`'s week and at least one bar would remain. Daily: identity.
pub fn normalize(mut series: PriceSeries, resolution: Resolution, today: NaiveDate) -> PriceSeries {
    if resolution != Resolution::Weekly || series.len() < 2 {
        return series;
    }
    if let Some(last) = series.last() {
        if last.date >= week_start(today) {
            series.pop_last();
        }
    }
    series
}

/// As-of date: the date of the latest retained bar, `None` for an empty
/// series.
pub fn as_of(series: &PriceSeries) -> Option<NaiveDate> {
    series.last().map(|bar| bar.date)
}
