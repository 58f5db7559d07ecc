use std::fmt::{self, Display};
use std::num::NonZero;

use crate::{BarSample, Calculation, Indicator, Price, PriceSource, RollingWindow, StreamSample};

/// Configuration for the Average True Range ([`Atr`]) indicator.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AtrConfig {
    length: NonZero<usize>,
}

impl AtrConfig {
    /// ATR over `length` bars.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self { length }
    }

    /// Smoothing length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }
}

impl Display for AtrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtrConfig({})", self.length)
    }
}

/// State of an [`AtrCalc`]: the last committed close and, once seeded, the
/// Wilder-smoothed range.
#[derive(Clone, Copy, Debug, Default)]
pub struct AtrState {
    last_close: Option<Price>,
    smoothed: Option<f64>,
}

/// True-range smoothing behind [`Atr`].
#[derive(Clone, Copy, Debug)]
pub struct AtrCalc {
    config: AtrConfig,
    length_reciprocal: f64,
    length_minus_one: f64,
}

impl AtrCalc {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(config: AtrConfig) -> Self {
        Self {
            config,
            length_reciprocal: 1.0 / config.length() as f64,
            length_minus_one: (config.length() - 1) as f64,
        }
    }
}

impl Calculation for AtrCalc {
    type Input = BarSample;
    type State = AtrState;
    type Buffers = RollingWindow;
    type Output = Price;

    fn init_state(&self) -> AtrState {
        AtrState::default()
    }

    fn init_buffers(&self) -> RollingWindow {
        RollingWindow::new(self.config.length)
    }

    fn warmup(&self) -> usize {
        self.config.length()
    }

    #[inline]
    fn step(&self, state: &mut AtrState, window: &mut RollingWindow, input: &BarSample) -> Price {
        let tr = PriceSource::TrueRange.extract(input, state.last_close);
        state.last_close = Some(input.close());

        match state.smoothed {
            Some(prev) => {
                let atr = prev.mul_add(self.length_minus_one, tr) * self.length_reciprocal;
                state.smoothed = Some(atr);
                atr
            }
            None => {
                // Seeding: SMA of the first `length` true ranges.
                window.add(tr, input.is_new());
                let mean = window
                    .mean()
                    .expect("window is non-empty after an add with is_new");
                if window.is_full() {
                    state.smoothed = Some(mean);
                }
                mean
            }
        }
    }
}

/// Average True Range (ATR).
///
/// Volatility measure: Wilder-smoothed true range, seeded with the SMA of
/// the first `length` true ranges. The first bar's true range falls back to
/// `high − low` (no previous close).
///
/// A revision re-measures the bar against the same previous close the
/// superseded bar used, so corrections of a still-open bar are exact.
///
/// # Example
///
/// ```
/// use pulse_ta::{Atr, AtrConfig, BarSample};
/// use std::num::NonZero;
///
/// let mut atr = Atr::new(AtrConfig::new(NonZero::new(2).unwrap()));
///
/// assert_eq!(atr.update(&BarSample::new(1, 10.0, 15.0, 5.0, 10.0, 0.0)), None);
/// // TR₁ = 10, TR₂ = 10 → seed = 10
/// assert_eq!(
///     atr.update(&BarSample::new(2, 10.0, 20.0, 10.0, 15.0, 0.0)),
///     Some(10.0)
/// );
/// ```
pub type Atr = Indicator<AtrCalc>;

impl Indicator<AtrCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: AtrConfig) -> Self {
        Self::from_calc(AtrCalc::new(config))
    }
}

impl Display for Atr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ATR({})", self.calc().config.length)
    }
}
