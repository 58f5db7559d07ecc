// src/test_util.rs

use crate::{BarSample, Sample, Timestamp};

use std::num::NonZero;

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() < e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).expect("non zero value")
}

/// Scalar sample at a new position.
pub fn sample(value: f64, time: Timestamp) -> Sample {
    Sample::new(time, value)
}

/// Correction of the most recent scalar sample.
pub fn revision(value: f64, time: Timestamp) -> Sample {
    Sample::revision(time, value)
}

/// Bar with explicit OHLC, zero volume.
pub fn bar_ohlc(open: f64, high: f64, low: f64, close: f64, time: Timestamp) -> BarSample {
    BarSample::new(time, open, high, low, close, 0.0)
}

/// Correction of the most recent bar, explicit OHLC.
pub fn bar_ohlc_revision(open: f64, high: f64, low: f64, close: f64, time: Timestamp) -> BarSample {
    BarSample::revision(time, open, high, low, close, 0.0)
}

/// Bar with just a close price (OHLC all equal to close), zero volume.
pub fn bar_close(close: f64, time: Timestamp) -> BarSample {
    BarSample::new(time, close, close, close, close, 0.0)
}

/// Bar with a close price and volume.
pub fn bar_volume(close: f64, volume: f64, time: Timestamp) -> BarSample {
    BarSample::new(time, close, close, close, close, volume)
}

/// Correction of the most recent bar, close price and volume.
pub fn bar_volume_revision(close: f64, volume: f64, time: Timestamp) -> BarSample {
    BarSample::revision(time, close, close, close, close, volume)
}
