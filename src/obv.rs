use std::fmt::{self, Display};

use crate::{BarSample, Calculation, Indicator, Price};

/// State of an [`ObvCalc`]: the last committed close and the running total.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObvState {
    last_close: Option<Price>,
    total: f64,
}

/// Signed volume accumulation behind [`Obv`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ObvCalc;

impl Calculation for ObvCalc {
    type Input = BarSample;
    type State = ObvState;
    type Buffers = ();
    type Output = f64;

    fn init_state(&self) -> ObvState {
        ObvState::default()
    }

    fn init_buffers(&self) {}

    fn warmup(&self) -> usize {
        1
    }

    #[inline]
    fn step(&self, state: &mut ObvState, _: &mut (), input: &BarSample) -> f64 {
        let close = input.close();
        if let Some(prev) = state.last_close {
            if close > prev {
                state.total += input.volume();
            } else if close < prev {
                state.total -= input.volume();
            }
            // A flat close leaves the total unchanged.
        }
        state.last_close = Some(close);
        state.total
    }
}

/// On-Balance Volume (OBV).
///
/// Cumulative volume signed by the close-to-close direction: volume is added
/// on an up close, subtracted on a down close, and ignored on a flat close.
/// The first bar establishes the baseline of 0.
///
/// A revision re-signs the bar against the same previous close the
/// superseded bar used, so a close flipping direction mid-bar corrects the
/// total exactly.
///
/// # Example
///
/// ```
/// use pulse_ta::{BarSample, Obv};
///
/// let mut obv = Obv::new();
///
/// assert_eq!(obv.update(&BarSample::new(1, 0.0, 0.0, 0.0, 10.0, 100.0)), Some(0.0));
/// assert_eq!(obv.update(&BarSample::new(2, 0.0, 0.0, 0.0, 12.0, 50.0)), Some(50.0));
/// assert_eq!(obv.update(&BarSample::new(3, 0.0, 0.0, 0.0, 11.0, 20.0)), Some(30.0));
/// ```
pub type Obv = Indicator<ObvCalc>;

impl Indicator<ObvCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_calc(ObvCalc)
    }
}

impl Default for Obv {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Obv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OBV")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{bar_volume, bar_volume_revision};

    mod accumulation {
        use super::*;

        #[test]
        fn baseline_is_zero() {
            let mut obv = Obv::new();
            assert_eq!(obv.update(&bar_volume(10.0, 100.0, 1)), Some(0.0));
        }

        #[test]
        fn up_close_adds_volume() {
            let mut obv = Obv::new();
            obv.update(&bar_volume(10.0, 100.0, 1));
            assert_eq!(obv.update(&bar_volume(12.0, 50.0, 2)), Some(50.0));
        }

        #[test]
        fn down_close_subtracts_volume() {
            let mut obv = Obv::new();
            obv.update(&bar_volume(10.0, 100.0, 1));
            obv.update(&bar_volume(12.0, 50.0, 2));
            assert_eq!(obv.update(&bar_volume(11.0, 20.0, 3)), Some(30.0));
        }

        #[test]
        fn flat_close_leaves_total_unchanged() {
            let mut obv = Obv::new();
            obv.update(&bar_volume(10.0, 100.0, 1));
            obv.update(&bar_volume(12.0, 50.0, 2));
            assert_eq!(obv.update(&bar_volume(12.0, 500.0, 3)), Some(50.0));
        }
    }

    mod revisions {
        use super::*;

        #[test]
        fn close_flipping_direction_corrects_the_total() {
            let mut obv = Obv::new();
            obv.update(&bar_volume(10.0, 100.0, 1));
            obv.update(&bar_volume(12.0, 50.0, 2)); // +50
            // Bar 2 corrected to a down close with more volume.
            assert_eq!(obv.update(&bar_volume_revision(9.0, 60.0, 2)), Some(-60.0));
        }

        #[test]
        fn unchanged_revision_is_idempotent() {
            let mut obv = Obv::new();
            obv.update(&bar_volume(10.0, 100.0, 1));
            obv.update(&bar_volume(12.0, 50.0, 2));
            let before = obv.value();
            obv.update(&bar_volume_revision(12.0, 50.0, 2));
            assert_eq!(obv.value(), before);
        }

        #[test]
        fn advance_after_revision_builds_on_corrected_total() {
            let mut obv = Obv::new();
            obv.update(&bar_volume(10.0, 100.0, 1));
            obv.update(&bar_volume(12.0, 50.0, 2));
            obv.update(&bar_volume_revision(9.0, 60.0, 2)); // −60
            // Up close from 9: −60 + 30 = −30
            assert_eq!(obv.update(&bar_volume(10.0, 30.0, 3)), Some(-30.0));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_as_obv() {
            assert_eq!(Obv::new().to_string(), "OBV");
        }
    }
}
