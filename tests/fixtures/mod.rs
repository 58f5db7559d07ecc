#![allow(dead_code)]

use pulse_ta::{BarSample, Sample, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// OHLCV bar parsed from the fixture CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl RefBar {
    /// Closed bar at its own position.
    pub fn bar(&self) -> BarSample {
        BarSample::new(
            self.open_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }

    /// Close price as a closed scalar sample.
    pub fn close_sample(&self) -> Sample {
        Sample::new(self.open_time, self.close)
    }
}

/// Reference value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub open_time: u64,
    pub expected: f64,
}

/// Reference BB value with timestamp.
#[derive(Debug, Deserialize)]
pub struct RefBbValue {
    pub open_time: u64,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

const OHLCV_PATH: &str = "tests/fixtures/data/solusdt-1h.csv";

/// Load the reference OHLCV bars.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load single-value reference data (SMA, EMA, RSI).
pub fn load_ref_values(path: &str) -> Vec<RefValue> {
    load_records(path, "invalid reference record")
}

/// Load BB reference data (upper, middle, lower).
pub fn load_bb_ref(path: &str) -> Vec<RefBbValue> {
    load_records(path, "invalid BB reference record")
}

fn load_records<T: DeserializeOwned>(path: &str, context: &str) -> Vec<T> {
    let mut reader = csv::Reader::from_path(path)
        .unwrap_or_else(|e| panic!("cannot open {path}: {e}"));
    reader
        .deserialize()
        .map(|record| record.expect(context))
        .collect()
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert two optional values agree: both absent, or both within tolerance.
pub fn assert_values_match(index: usize, closed: Option<f64>, revised: Option<f64>, tolerance: f64) {
    match (closed, revised) {
        (None, None) => {}
        (Some(c), Some(r)) => assert_near(r, c, tolerance, &format!("bar {index}")),
        _ => panic!("bar {index}: closed={closed:?}, revised={revised:?}"),
    }
}

/// Provisional ticks for one scalar position, settling on the final close.
///
/// Returns one opening sample followed by two revisions, simulating a live
/// sample corrected twice before the position is final. All three share the
/// position's timestamp.
pub fn revision_sequence(time: Timestamp, close: f64) -> [Sample; 3] {
    [
        Sample::new(time, close * 1.0005),
        Sample::revision(time, f64::midpoint(close * 1.0005, close)),
        Sample::revision(time, close),
    ]
}

/// Provisional ticks for one bar position, settling on the final bar.
///
/// Mirrors [`revision_sequence`] for OHLCV input: first tick knows only the
/// open, the second is mid-bar, the third carries the final values.
pub fn bar_revision_sequence(bar: &RefBar) -> [BarSample; 3] {
    let t = bar.open_time;
    [
        BarSample::new(
            t,
            bar.open,
            bar.open * 1.001,
            bar.open * 0.999,
            bar.open * 1.0005,
            bar.volume - 2.0,
        ),
        BarSample::revision(
            t,
            bar.open,
            f64::midpoint(bar.open, bar.high),
            f64::midpoint(bar.open, bar.low),
            f64::midpoint(bar.open, bar.close),
            bar.volume - 1.0,
        ),
        BarSample::revision(t, bar.open, bar.high, bar.low, bar.close, bar.volume),
    ]
}
