use std::fmt::{self, Display};
use std::num::NonZero;

use crate::{BarSample, Calculation, Indicator, IndicatorOutput, Price, RollingWindow, StreamSample};

/// Configuration for the Donchian Channels ([`Donchian`]) indicator.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct DonchianConfig {
    length: NonZero<usize>,
}

impl DonchianConfig {
    /// Channels over the last `length` bars.
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

impl Display for DonchianConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DonchianConfig({})", self.length)
    }
}

/// Donchian Channels output: highest high, lowest low, and their midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonchianValue {
    upper: Price,
    middle: Price,
    lower: Price,
}

impl DonchianValue {
    /// Highest high over the window.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Midpoint of the channel.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lowest low over the window.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// Channel width: `upper − lower`. Zero when every bar in the window
    /// shares one price.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl IndicatorOutput for DonchianValue {
    const NAN: Self = Self {
        upper: f64::NAN,
        middle: f64::NAN,
        lower: f64::NAN,
    };
}

impl Display for DonchianValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Donchian(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// High/low windows behind [`Donchian`].
#[derive(Clone, Debug)]
pub struct DonchianWindows {
    highs: RollingWindow,
    lows: RollingWindow,
}

/// Channel extremes calculation behind [`Donchian`].
///
/// All state lives in the two windows; nothing to snapshot. The extreme
/// queries are O(length) scans over the windows, fine at channel lengths.
#[derive(Clone, Copy, Debug)]
pub struct DonchianCalc {
    config: DonchianConfig,
}

impl DonchianCalc {
    #[must_use]
    pub fn new(config: DonchianConfig) -> Self {
        Self { config }
    }
}

impl Calculation for DonchianCalc {
    type Input = BarSample;
    type State = ();
    type Buffers = DonchianWindows;
    type Output = DonchianValue;

    fn init_state(&self) {}

    fn init_buffers(&self) -> DonchianWindows {
        DonchianWindows {
            highs: RollingWindow::new(self.config.length),
            lows: RollingWindow::new(self.config.length),
        }
    }

    fn warmup(&self) -> usize {
        self.config.length()
    }

    #[inline]
    fn step(
        &self,
        _: &mut (),
        windows: &mut DonchianWindows,
        input: &BarSample,
    ) -> DonchianValue {
        windows.highs.add(input.high(), input.is_new());
        windows.lows.add(input.low(), input.is_new());

        let upper = windows
            .highs
            .max()
            .expect("window is non-empty after an add with is_new");
        let lower = windows
            .lows
            .min()
            .expect("window is non-empty after an add with is_new");

        DonchianValue {
            upper,
            middle: f64::midpoint(upper, lower),
            lower,
        }
    }
}

/// Donchian Channels.
///
/// The highest high and lowest low over the last `length` bars, with the
/// channel midpoint between them. Bars whose prices never leave one level
/// produce a zero-width channel.
///
/// # Example
///
/// ```
/// use pulse_ta::{BarSample, Donchian, DonchianConfig};
/// use std::num::NonZero;
///
/// let mut dc = Donchian::new(DonchianConfig::new(NonZero::new(2).unwrap()));
///
/// dc.update(&BarSample::new(1, 10.0, 15.0, 5.0, 12.0, 0.0));
/// let value = dc.update(&BarSample::new(2, 12.0, 20.0, 8.0, 18.0, 0.0)).unwrap();
///
/// assert_eq!(value.upper(), 20.0);
/// assert_eq!(value.lower(), 5.0);
/// assert_eq!(value.middle(), 12.5);
/// ```
pub type Donchian = Indicator<DonchianCalc>;

impl Indicator<DonchianCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: DonchianConfig) -> Self {
        Self::from_calc(DonchianCalc::new(config))
    }
}

impl Display for Donchian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Donchian({})", self.calc().config.length)
    }
}
