use crate::{BarSample, Calculation, Indicator, Price};

use std::fmt::{self, Debug, Display};

/// Price derived from a [`BarSample`] before feeding into an indicator.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Closing price.
    #[default]
    Close,
    /// Lowest price.
    Low,
    /// Median price: `(high + low) / 2`.
    HL2,
    /// Typical price: `(high + low + close) / 3`.
    HLC3,
    /// Average price: `(open + high + low + close) / 4`.
    OHLC4,
    /// Weighted close: `(high + low + close + close) / 4`.
    HLCC4,
    /// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
    ///
    /// On the first bar (no previous close), falls back to `high - low`.
    TrueRange,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    #[inline]
    pub(crate) fn extract(self, bar: &BarSample, prev_close: Option<Price>) -> Price {
        match self {
            Self::Open => bar.open(),
            Self::High => bar.high(),
            Self::Close => bar.close(),
            Self::Low => bar.low(),
            Self::HL2 => f64::midpoint(bar.high(), bar.low()),
            Self::HLC3 => (bar.high() + bar.low() + bar.close()) / 3.0,
            Self::OHLC4 => (bar.open() + bar.high() + bar.low() + bar.close()) / 4.0,
            Self::HLCC4 => (bar.high() + bar.low() + bar.close() + bar.close()) / 4.0,
            Self::TrueRange => {
                let hl = bar.high() - bar.low();

                match prev_close {
                    Some(prev_close) => {
                        let hc = (bar.high() - prev_close).abs();
                        let lc = (bar.low() - prev_close).abs();
                        hl.max(hc).max(lc)
                    }
                    None => hl,
                }
            }
        }
    }
}

/// State of an [`ExtractCalc`]: the close of the last committed bar,
/// needed by [`PriceSource::TrueRange`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractState {
    last_close: Option<Price>,
}

/// Price extraction as a calculation.
///
/// Turns a bar stream into a scalar stream by extracting the configured
/// [`PriceSource`] from each bar. Useful standalone, and as the root stage of
/// a [`Flow`](crate::Flow) that bridges bars into scalar indicator chains.
/// Revisions pass straight through: the previous close used by `TrueRange`
/// is committed state, so a revised bar re-extracts against the same
/// previous close the superseded one did.
#[derive(Clone, Copy, Debug)]
pub struct ExtractCalc {
    source: PriceSource,
}

impl ExtractCalc {
    #[must_use]
    pub fn new(source: PriceSource) -> Self {
        Self { source }
    }
}

impl Calculation for ExtractCalc {
    type Input = BarSample;
    type State = ExtractState;
    type Buffers = ();
    type Output = Price;

    fn init_state(&self) -> ExtractState {
        ExtractState::default()
    }

    fn init_buffers(&self) {}

    fn warmup(&self) -> usize {
        1
    }

    #[inline]
    fn step(&self, state: &mut ExtractState, _: &mut (), input: &BarSample) -> Price {
        let price = self.source.extract(input, state.last_close);
        state.last_close = Some(input.close());
        price
    }
}

/// Streaming [`PriceSource`] extraction stage.
///
/// # Example
///
/// ```
/// use pulse_ta::{BarSample, Extract, PriceSource};
///
/// let mut hl2 = Extract::new(PriceSource::HL2);
/// let bar = BarSample::new(1, 10.0, 30.0, 20.0, 25.0, 0.0);
/// assert_eq!(hl2.update(&bar), Some(25.0));
/// ```
pub type Extract = Indicator<ExtractCalc>;

impl Indicator<ExtractCalc> {
    /// Extraction stage for the given source.
    #[must_use]
    pub fn new(source: PriceSource) -> Self {
        Self::from_calc(ExtractCalc::new(source))
    }
}

impl Display for Extract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extract({})", self.calc().source)
    }
}
