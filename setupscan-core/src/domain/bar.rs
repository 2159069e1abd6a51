//! Bar and PriceSeries — the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Close-price bar for a single ticker on a single period.
///
/// Immutable once retrieved. The engine only consumes closes; intraday
/// fields are never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Validation errors raised when constructing a [`PriceSeries`].
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("dates not strictly increasing: {prev} followed by {next}")]
    NonMonotonicDates { prev: NaiveDate, next: NaiveDate },

    #[error("non-finite close {close} at {date}")]
    NonFiniteClose { date: NaiveDate, close: f64 },
}

/// Ordered close-price series for one ticker at one resolution.
///
/// Invariant: strictly increasing dates, finite closes. Construction
/// validates both; everything downstream relies on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a validated series. Rejects out-of-order or duplicate dates
    /// and non-finite closes.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for bar in &bars {
            if !bar.close.is_finite() {
                return Err(SeriesError::NonFiniteClose {
                    date: bar.date,
                    close: bar.close,
                });
            }
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NonMonotonicDates {
                    prev: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Drop the final bar. Removing from the tail preserves the invariant.
    pub(crate) fn pop_last(&mut self) {
        self.bars.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn accepts_strictly_increasing_dates() {
        let series =
            PriceSeries::new(vec![Bar::new(d(2), 100.0), Bar::new(d(3), 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, 101.0);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![Bar::new(d(2), 100.0), Bar::new(d(2), 101.0)])
            .unwrap_err();
        assert_eq!(
            err,
            SeriesError::NonMonotonicDates {
                prev: d(2),
                next: d(2)
            }
        );
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let result = PriceSeries::new(vec![Bar::new(d(3), 100.0), Bar::new(d(2), 101.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_nan_close() {
        let result = PriceSeries::new(vec![Bar::new(d(2), f64::NAN)]);
        assert!(matches!(result, Err(SeriesError::NonFiniteClose { .. })));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = Bar::new(d(2), 103.25);
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
