use std::fmt::{self, Display};
use std::num::NonZero;

use crate::{Calculation, Indicator, Price, RollingWindow, Sample, StreamSample};

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```
/// use pulse_ta::SmaConfig;
/// use std::num::NonZero;
///
/// let config = SmaConfig::new(NonZero::new(20).unwrap());
/// assert_eq!(config.length(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaConfig {
    length: NonZero<usize>,
}

impl SmaConfig {
    /// SMA over the last `length` samples.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self { length }
    }

    /// Window length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SmaConfig({})", self.length)
    }
}

/// Rolling-mean calculation behind [`Sma`].
///
/// All state lives in the window; nothing to snapshot.
#[derive(Clone, Copy, Debug)]
pub struct SmaCalc {
    config: SmaConfig,
}

impl SmaCalc {
    #[must_use]
    pub fn new(config: SmaConfig) -> Self {
        Self { config }
    }
}

impl Calculation for SmaCalc {
    type Input = Sample;
    type State = ();
    type Buffers = RollingWindow;
    type Output = Price;

    fn init_state(&self) {}

    fn init_buffers(&self) -> RollingWindow {
        RollingWindow::new(self.config.length)
    }

    fn warmup(&self) -> usize {
        self.config.length()
    }

    #[inline]
    fn step(&self, _: &mut (), window: &mut RollingWindow, input: &Sample) -> Price {
        window.add(input.value(), input.is_new());
        window
            .mean()
            .expect("window is non-empty after an add with is_new")
    }
}

/// Simple Moving Average (SMA).
///
/// Unweighted mean of the last *n* samples. Output is `None` until the
/// window is full; a running sum keeps each update O(1).
///
/// A revision replaces the newest window element in place, so correcting a
/// still-open sample needs no history replay.
///
/// # Example
///
/// ```
/// use pulse_ta::{Sample, Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let mut sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
///
/// assert_eq!(sma.update(&Sample::new(1, 10.0)), None);
/// assert_eq!(sma.update(&Sample::new(2, 20.0)), None);
/// assert_eq!(sma.update(&Sample::new(3, 30.0)), Some(20.0));
/// ```
pub type Sma = Indicator<SmaCalc>;

impl Indicator<SmaCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: SmaConfig) -> Self {
        Self::from_calc(SmaCalc::new(config))
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA({})", self.calc().config.length)
    }
}
