use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::NonZero;

use crate::{
    Calculation, ConfigError, Indicator, IndicatorOutput, Price, RollingWindow, Sample,
    StreamSample, WindowWithSquares,
};

/// Standard deviation multiplier for Bollinger Bands.
///
/// Wraps a positive, finite `f64`. Defaults to `2.0`, the standard setting.
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe
/// because NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct BandMultiplier(f64);

impl BandMultiplier {
    /// Validated band multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BandMultiplier`] unless `value` is positive
    /// and finite.
    pub fn try_new(value: f64) -> Result<Self, ConfigError> {
        if value > 0.0 && value.is_finite() {
            Ok(Self(value))
        } else {
            Err(ConfigError::BandMultiplier(value))
        }
    }

    /// Band multiplier, panicking variant of [`try_new`](Self::try_new).
    ///
    /// # Panics
    ///
    /// Panics unless `value` is positive and finite.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self::try_new(value).expect("band multiplier must be positive and finite")
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for BandMultiplier {
    fn default() -> Self {
        Self(2.0)
    }
}

impl PartialEq for BandMultiplier {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for BandMultiplier {}

impl Hash for BandMultiplier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Configuration for the Bollinger Bands ([`Bb`]) indicator.
///
/// # Example
///
/// ```
/// use pulse_ta::BbConfig;
/// use std::num::NonZero;
///
/// // Default: 2.0 standard deviations.
/// let config = BbConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .build();
///
/// assert_eq!(config.length(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BbConfig {
    length: NonZero<usize>,
    multiplier: BandMultiplier,
}

impl BbConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> BbConfigBuilder {
        BbConfigBuilder::new()
    }

    /// BB with the given length and the standard 2σ bands.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// Window length.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Standard deviation multiplier for the upper and lower bands.
    #[inline]
    #[must_use]
    pub fn multiplier(&self) -> BandMultiplier {
        self.multiplier
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BbConfig({}, {})", self.length, self.multiplier.value())
    }
}

/// Builder for [`BbConfig`].
///
/// Defaults: multiplier = `2.0`.
/// Length must be set before calling [`build`](Self::build).
pub struct BbConfigBuilder {
    length: Option<NonZero<usize>>,
    multiplier: BandMultiplier,
}

impl BbConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            multiplier: BandMultiplier::default(),
        }
    }

    /// Sets the window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the standard deviation multiplier.
    #[inline]
    #[must_use]
    pub fn multiplier(mut self, multiplier: BandMultiplier) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Builds the config. Panics if required fields are missing.
    #[must_use]
    pub fn build(self) -> BbConfig {
        BbConfig {
            length: self.length.expect("length is required"),
            multiplier: self.multiplier,
        }
    }
}

/// Bollinger Bands output: upper, middle, and lower bands.
///
/// ```text
/// upper  = SMA + k × σ
/// middle = SMA
/// lower  = SMA − k × σ
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BbValue {
    upper: Price,
    middle: Price,
    lower: Price,
}

impl BbValue {
    /// Upper band: `SMA + k × σ`.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Middle band: SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    /// Lower band: `SMA − k × σ`.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// Band width: `upper − lower`. Collapses to zero on constant input.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl IndicatorOutput for BbValue {
    const NAN: Self = Self {
        upper: f64::NAN,
        middle: f64::NAN,
        lower: f64::NAN,
    };
}

impl Display for BbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BB(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

/// Mean-and-dispersion calculation behind [`Bb`].
///
/// All state lives in the sum-of-squares window; nothing to snapshot.
#[derive(Clone, Copy, Debug)]
pub struct BbCalc {
    config: BbConfig,
}

impl BbCalc {
    #[must_use]
    pub fn new(config: BbConfig) -> Self {
        Self { config }
    }
}

impl Calculation for BbCalc {
    type Input = Sample;
    type State = ();
    type Buffers = WindowWithSquares;
    type Output = BbValue;

    fn init_state(&self) {}

    fn init_buffers(&self) -> WindowWithSquares {
        RollingWindow::with_sum_of_squares(self.config.length)
    }

    fn warmup(&self) -> usize {
        self.config.length()
    }

    #[inline]
    fn step(&self, _: &mut (), window: &mut WindowWithSquares, input: &Sample) -> BbValue {
        window.add(input.value(), input.is_new());

        let mean = window
            .mean()
            .expect("window is non-empty after an add with is_new");
        let variance = window
            .variance()
            .expect("window is non-empty after an add with is_new");
        let offset = variance.sqrt() * self.config.multiplier.value();

        BbValue {
            upper: mean + offset,
            middle: mean,
            lower: mean - offset,
        }
    }
}

/// Bollinger Bands (BB).
///
/// A volatility indicator: a simple moving average (middle) with bands
/// offset by a configurable number of population standard deviations.
/// Running sum and sum of squares keep each update O(1); the only
/// non-constant operation is the square root.
///
/// Zero variance (constant input) collapses the bands onto the middle
/// rather than failing.
///
/// # Example
///
/// ```
/// use pulse_ta::{Bb, BbConfig, Sample};
/// use std::num::NonZero;
///
/// let mut bb = Bb::new(BbConfig::new(NonZero::new(2).unwrap()));
///
/// assert!(bb.update(&Sample::new(1, 3.0)).is_none());
/// let value = bb.update(&Sample::new(2, 5.0)).unwrap();
///
/// // mean = 4, σ = 1, k = 2
/// assert_eq!(value.upper(), 6.0);
/// assert_eq!(value.middle(), 4.0);
/// assert_eq!(value.lower(), 2.0);
/// ```
pub type Bb = Indicator<BbCalc>;

impl Indicator<BbCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: BbConfig) -> Self {
        Self::from_calc(BbCalc::new(config))
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let calc = self.calc();
        write!(
            f,
            "BB({}, {})",
            calc.config.length,
            calc.config.multiplier.value()
        )
    }
}
