use std::fmt::{self, Display};
use std::num::NonZero;

use crate::{Calculation, Indicator, Price, RollingWindow, Sample, StreamSample};

/// Configuration for the Rate of Change ([`Roc`]) indicator.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RocConfig {
    length: NonZero<usize>,
}

impl RocConfig {
    /// Change measured against the value `length` samples ago.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self { length }
    }

    /// Lookback distance.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }
}

impl Display for RocConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RocConfig({})", self.length)
    }
}

/// Lookback-ratio calculation behind [`Roc`].
///
/// The window holds `length + 1` values so the oldest element is exactly the
/// comparison base once full. All state lives there; nothing to snapshot.
#[derive(Clone, Copy, Debug)]
pub struct RocCalc {
    config: RocConfig,
}

impl RocCalc {
    #[must_use]
    pub fn new(config: RocConfig) -> Self {
        Self { config }
    }

    fn window_length(&self) -> NonZero<usize> {
        self.config
            .length
            .checked_add(1)
            .expect("lookback length overflows the window size")
    }
}

impl Calculation for RocCalc {
    type Input = Sample;
    type State = ();
    type Buffers = RollingWindow;
    type Output = Price;

    fn init_state(&self) {}

    fn init_buffers(&self) -> RollingWindow {
        RollingWindow::new(self.window_length())
    }

    fn warmup(&self) -> usize {
        self.window_length().get()
    }

    #[inline]
    fn step(&self, _: &mut (), window: &mut RollingWindow, input: &Sample) -> Price {
        window.add(input.value(), input.is_new());
        if !window.is_full() {
            return 0.0;
        }

        let base = window[0];
        if base == 0.0 {
            // No meaningful ratio against a zero base.
            return f64::NAN;
        }
        (window.recent(0) - base) / base * 100.0
    }
}

/// Rate of Change (ROC).
///
/// Percentage change of the current value against the value `length` samples
/// ago:
///
/// ```text
/// ROC = (value − value_n_ago) / value_n_ago × 100
/// ```
///
/// A zero comparison base yields NaN — the in-band signal for "no meaningful
/// ratio" — which propagates through downstream consumers without failing.
///
/// # Example
///
/// ```
/// use pulse_ta::{Roc, RocConfig, Sample};
/// use std::num::NonZero;
///
/// let mut roc = Roc::new(RocConfig::new(NonZero::new(2).unwrap()));
///
/// assert_eq!(roc.update(&Sample::new(1, 50.0)), None);
/// assert_eq!(roc.update(&Sample::new(2, 55.0)), None);
/// // (60 − 50) / 50 × 100 = 20
/// assert_eq!(roc.update(&Sample::new(3, 60.0)), Some(20.0));
/// ```
pub type Roc = Indicator<RocCalc>;

impl Indicator<RocCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: RocConfig) -> Self {
        Self::from_calc(RocCalc::new(config))
    }
}

impl Display for Roc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ROC({})", self.calc().config.length)
    }
}
