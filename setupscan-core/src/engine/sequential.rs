//! Sequential setup counter — the reversal-exhaustion pattern detector.
//!
//! Two independent momentum run counters track the last four-bar direction:
//!
//! ```text
//! up_run[i]   = up_run[i-1] + 1    if close[i] > close[i-4], else 0
//! down_run[i] = down_run[i-1] + 1  if close[i] < close[i-4], else 0
//! ```
//!
//! The reported value is the reset-relative count: the run counter minus the
//! value it held at its most recent restart. The final-bar counts are then
//! compared against 9 and 13 with exact equality, so a flag fires only on
//! the specific bar where the count reaches that threshold — the counter
//! keeps advancing past 13 without re-firing.

use crate::domain::{Direction, PriceSeries, SetupStrength};

/// Bars below this length evaluate to all-false, never an error.
pub const MIN_BARS: usize = 20;

/// The momentum comparison looks back this many bars.
const LOOKBACK: usize = 4;

const SETUP_COUNT: u32 = 9;
const EXHAUSTION_COUNT: u32 = 13;

/// The four independent threshold flags for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupFlags {
    pub nine_up: bool,
    pub thirteen_up: bool,
    pub nine_down: bool,
    pub thirteen_down: bool,
}

impl SetupFlags {
    pub fn any(&self) -> bool {
        self.nine_up || self.thirteen_up || self.nine_down || self.thirteen_down
    }

    /// Strongest flag for one direction; 13 subsumes 9 in the output.
    pub fn strongest(&self, direction: Direction) -> Option<SetupStrength> {
        let (nine, thirteen) = match direction {
            Direction::Top => (self.nine_up, self.thirteen_up),
            Direction::Bottom => (self.nine_down, self.thirteen_down),
        };
        if thirteen {
            Some(SetupStrength::Thirteen)
        } else if nine {
            Some(SetupStrength::Nine)
        } else {
            None
        }
    }
}

/// Momentum run counter over a close sequence.
///
/// `rising` selects the `>` comparison (up runs); `false` selects `<`
/// (down runs). Indices 0..4 stay 0.
pub fn momentum_runs(closes: &[f64], rising: bool) -> Vec<u32> {
    let mut runs = vec![0u32; closes.len()];
    for i in LOOKBACK..closes.len() {
        let advanced = if rising {
            closes[i] > closes[i - LOOKBACK]
        } else {
            closes[i] < closes[i - LOOKBACK]
        };
        runs[i] = if advanced { runs[i - 1] + 1 } else { 0 };
    }
    runs
}

/// The run counter's value at its most recent restart before `idx`.
///
/// Scans backward from `idx - 1` down to index 1 and returns the first
/// `runs[j]` where `runs[j] < runs[j-1]`; 0 when no restart exists.
fn last_reset_value(runs: &[u32], idx: usize) -> u32 {
    for j in (1..idx).rev() {
        if runs[j] < runs[j - 1] {
            return runs[j];
        }
    }
    0
}

/// Reset-relative counts for every index: `runs[i]` measured from the most
/// recent restart marker.
pub fn reset_relative_counts(runs: &[u32]) -> Vec<u32> {
    let mut counts = vec![0u32; runs.len()];
    for i in LOOKBACK..runs.len() {
        counts[i] = runs[i] - last_reset_value(runs, i);
    }
    counts
}

/// Evaluate the final bar of a close sequence against both thresholds.
///
/// Total over any length; sequences shorter than [`MIN_BARS`] yield
/// all-false flags.
pub fn evaluate_closes(closes: &[f64]) -> SetupFlags {
    if closes.len() < MIN_BARS {
        return SetupFlags::default();
    }

    let up_counts = reset_relative_counts(&momentum_runs(closes, true));
    let down_counts = reset_relative_counts(&momentum_runs(closes, false));

    let up = up_counts[closes.len() - 1];
    let down = down_counts[closes.len() - 1];

    SetupFlags {
        nine_up: up == SETUP_COUNT,
        thirteen_up: up == EXHAUSTION_COUNT,
        nine_down: down == SETUP_COUNT,
        thirteen_down: down == EXHAUSTION_COUNT,
    }
}

/// Evaluate a normalized price series.
pub fn evaluate(series: &PriceSeries) -> SetupFlags {
    evaluate_closes(&series.closes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::make_series;
    use proptest::prelude::*;

    /// Closes that put the final bar exactly `n` bars into an up run, with
    /// enough flat padding in front to clear the length minimum.
    fn up_run_closes(n: usize) -> Vec<f64> {
        let pad = MIN_BARS.max(n + LOOKBACK + 1);
        let mut closes = vec![100.0; pad];
        let last = *closes.last().unwrap();
        for i in 0..n {
            closes.push(last + (i as f64 + 1.0));
        }
        closes
    }

    #[test]
    fn short_series_yields_all_false() {
        for len in 0..MIN_BARS {
            let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
            assert_eq!(evaluate_closes(&closes), SetupFlags::default(), "len {len}");
        }
    }

    #[test]
    fn nine_up_fires_exactly_at_nine() {
        let flags = evaluate_closes(&up_run_closes(9));
        assert!(flags.nine_up);
        assert!(!flags.thirteen_up);
        assert!(!flags.nine_down);
        assert!(!flags.thirteen_down);
    }

    #[test]
    fn thirteen_up_fires_exactly_at_thirteen() {
        let flags = evaluate_closes(&up_run_closes(13));
        assert!(flags.thirteen_up);
        assert!(!flags.nine_up, "9 and 13 are mutually exclusive per direction");
    }

    #[test]
    fn counter_past_thirteen_does_not_refire() {
        let flags = evaluate_closes(&up_run_closes(14));
        assert_eq!(flags, SetupFlags::default());
    }

    #[test]
    fn nine_down_on_mirrored_series() {
        let closes: Vec<f64> = up_run_closes(9).iter().map(|c| 300.0 - c).collect();
        let flags = evaluate_closes(&closes);
        assert!(flags.nine_down);
        assert!(!flags.nine_up);
    }

    #[test]
    fn run_counter_resets_on_failed_comparison() {
        // Rise for 6 bars, then a close below its 4-back reference.
        let mut closes = up_run_closes(6);
        closes.push(closes[closes.len() - LOOKBACK] - 1.0);
        let runs = momentum_runs(&closes, true);
        assert_eq!(runs[closes.len() - 2], 6);
        assert_eq!(runs[closes.len() - 1], 0);
    }

    /// The concrete scenario: 15 bars, an unbroken up run from index 4.
    #[test]
    fn fifteen_bar_ramp_counts() {
        let closes = [
            10.0, 11.0, 9.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0, 20.0, 21.0,
            22.0, 23.0,
        ];
        let runs = momentum_runs(&closes, true);

        // close[i] > close[i-4] holds from index 4 onward: strictly increasing.
        for i in 4..closes.len() {
            assert_eq!(runs[i], (i - 3) as u32);
            assert!(i == 4 || runs[i] > runs[i - 1]);
        }

        // The reset-relative count first equals 9 at index 12, never
        // before or after.
        let counts = reset_relative_counts(&runs);
        for (i, &count) in counts.iter().enumerate() {
            assert_eq!(count == 9, i == 12, "index {i} count {count}");
        }
    }

    #[test]
    fn evaluate_matches_evaluate_closes() {
        let closes = up_run_closes(9);
        let series = make_series(&closes);
        assert_eq!(evaluate(&series), evaluate_closes(&closes));
    }

    #[test]
    fn strongest_prefers_thirteen() {
        let flags = SetupFlags {
            nine_up: true,
            thirteen_up: true,
            ..SetupFlags::default()
        };
        assert_eq!(
            flags.strongest(crate::domain::Direction::Top),
            Some(crate::domain::SetupStrength::Thirteen)
        );
        assert_eq!(flags.strongest(crate::domain::Direction::Bottom), None);
    }

    proptest! {
        /// Any series shorter than the minimum evaluates to all-false.
        #[test]
        fn prop_short_series_all_false(closes in proptest::collection::vec(1.0f64..1000.0, 0..MIN_BARS)) {
            prop_assert_eq!(evaluate_closes(&closes), SetupFlags::default());
        }

        /// Run counters reset to zero exactly when the inequality fails.
        #[test]
        fn prop_runs_reset_on_inequality(closes in proptest::collection::vec(1.0f64..1000.0, 5..80)) {
            for rising in [true, false] {
                let runs = momentum_runs(&closes, rising);
                for i in LOOKBACK..closes.len() {
                    let advanced = if rising {
                        closes[i] > closes[i - LOOKBACK]
                    } else {
                        closes[i] < closes[i - LOOKBACK]
                    };
                    if advanced {
                        prop_assert_eq!(runs[i], runs[i - 1] + 1);
                    } else {
                        prop_assert_eq!(runs[i], 0);
                    }
                }
            }
        }

        /// 9 and 13 are mutually exclusive on the same direction.
        #[test]
        fn prop_thresholds_mutually_exclusive(closes in proptest::collection::vec(1.0f64..1000.0, MIN_BARS..80)) {
            let flags = evaluate_closes(&closes);
            prop_assert!(!(flags.nine_up && flags.thirteen_up));
            prop_assert!(!(flags.nine_down && flags.thirteen_down));
        }

        /// Pure function: identical input, identical flags.
        #[test]
        fn prop_idempotent(closes in proptest::collection::vec(1.0f64..1000.0, 0..80)) {
            prop_assert_eq!(evaluate_closes(&closes), evaluate_closes(&closes));
        }
    }
}
