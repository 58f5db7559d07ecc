use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::NonZero;

use crate::{Calculation, ConfigError, Indicator, Price, RollingWindow, Sample, StreamSample};

/// Exponential smoothing factor in `(0, 1]`.
///
/// Overrides the default `α = 2 / (length + 1)`. Implements `Eq` and `Hash`
/// via bit-level comparison, which is safe because NaN is rejected at
/// construction.
#[derive(Clone, Copy, Debug)]
pub struct SmoothingFactor(f64);

impl SmoothingFactor {
    /// Validated smoothing factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SmoothingFactor`] unless `0 < value ≤ 1`.
    pub fn try_new(value: f64) -> Result<Self, ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::SmoothingFactor(value))
        }
    }

    /// Smoothing factor, panicking variant of [`try_new`](Self::try_new).
    ///
    /// # Panics
    ///
    /// Panics unless `0 < value ≤ 1`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self::try_new(value).expect("smoothing factor must be in (0, 1]")
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SmoothingFactor {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for SmoothingFactor {}

impl Hash for SmoothingFactor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Configuration for the Exponential Moving Average ([`Ema`]) indicator.
///
/// # Convergence
///
/// EMA has infinite memory: the initial seed value (SMA of the first
/// `length` samples) influences all subsequent values. With
/// `enforce_convergence` enabled, output stays suppressed until the seed's
/// contribution decays below 1% — `3 × (length + 1)` samples.
///
/// # Example
///
/// ```
/// use pulse_ta::EmaConfig;
/// use std::num::NonZero;
///
/// let config = EmaConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .enforce_convergence(true)
///     .build();
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.samples_to_converge(), 63);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    length: NonZero<usize>,
    smoothing: Option<SmoothingFactor>,
    convergence: bool,
    samples_to_converge: usize,
}

impl EmaConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> EmaConfigBuilder {
        EmaConfigBuilder::new()
    }

    /// EMA with the standard `α = 2 / (length + 1)`.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self::builder().length(length).build()
    }

    /// Window length used for the SMA seed.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// Explicit smoothing factor, if one was set.
    #[inline]
    #[must_use]
    pub fn smoothing(&self) -> Option<SmoothingFactor> {
        self.smoothing
    }

    /// When `true`, output is suppressed until
    /// [`samples_to_converge`](Self::samples_to_converge) samples have been
    /// committed. Default: `false`.
    #[inline]
    #[must_use]
    pub fn enforce_convergence(&self) -> bool {
        self.convergence
    }

    /// Number of samples before the output is considered converged.
    ///
    /// Equals the window length unless convergence is enforced, in which
    /// case it is `3 × (length + 1)` — the point where the SMA seed's
    /// influence drops below 1%.
    #[must_use]
    pub fn samples_to_converge(&self) -> usize {
        self.samples_to_converge
    }

    #[allow(clippy::cast_precision_loss)]
    fn alpha(&self) -> f64 {
        self.smoothing
            .map_or(2.0 / (self.length.get() + 1) as f64, SmoothingFactor::value)
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmaConfig({})", self.length)
    }
}

/// Builder for [`EmaConfig`].
///
/// Defaults: standard smoothing, convergence enforcement off.
/// Length must be set before calling [`build`](Self::build).
pub struct EmaConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: Option<SmoothingFactor>,
    convergence: bool,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            smoothing: None,
            convergence: false,
        }
    }

    /// Sets the seed window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length = Some(length);
        self
    }

    /// Overrides the smoothing factor.
    #[inline]
    #[must_use]
    pub fn smoothing(mut self, smoothing: SmoothingFactor) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Enables or disables convergence enforcement.
    #[inline]
    #[must_use]
    pub fn enforce_convergence(mut self, enforce: bool) -> Self {
        self.convergence = enforce;
        self
    }

    /// Builds the config. Panics if required fields are missing.
    #[must_use]
    pub fn build(self) -> EmaConfig {
        let length = self.length.expect("length is required");
        let samples_to_converge = if self.convergence {
            3 * (length.get() + 1)
        } else {
            length.get()
        };

        EmaConfig {
            length,
            smoothing: self.smoothing,
            convergence: self.convergence,
            samples_to_converge,
        }
    }
}

/// Seed-then-smooth state of an [`EmaCalc`].
///
/// `previous` is `None` until the SMA seed completes; afterwards it holds
/// the EMA of the last committed sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmaState {
    previous: Option<Price>,
}

/// Exponentially weighted mean behind [`Ema`].
#[derive(Clone, Copy, Debug)]
pub struct EmaCalc {
    config: EmaConfig,
    alpha: f64,
}

impl EmaCalc {
    #[must_use]
    pub fn new(config: EmaConfig) -> Self {
        Self {
            alpha: config.alpha(),
            config,
        }
    }
}

impl Calculation for EmaCalc {
    type Input = Sample;
    type State = EmaState;
    type Buffers = RollingWindow;
    type Output = Price;

    fn init_state(&self) -> EmaState {
        EmaState::default()
    }

    fn init_buffers(&self) -> RollingWindow {
        RollingWindow::new(self.config.length)
    }

    fn warmup(&self) -> usize {
        self.config.samples_to_converge
    }

    #[inline]
    fn step(&self, state: &mut EmaState, window: &mut RollingWindow, input: &Sample) -> Price {
        let value = input.value();

        if let Some(prev) = state.previous {
            let ema = self.alpha.mul_add(value - prev, prev);
            state.previous = Some(ema);
            ema
        } else {
            // Seeding: collect an SMA over the first `length` samples.
            window.add(value, input.is_new());
            let mean = window
                .mean()
                .expect("window is non-empty after an add with is_new");
            if window.is_full() {
                state.previous = Some(mean);
            }
            mean
        }
    }
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent samples:
///
/// ```text
/// EMA = α × value + (1 − α) × prev_EMA
/// ```
///
/// with `α = 2 / (length + 1)` by default, or an explicit
/// [`SmoothingFactor`]. The first `length` samples seed the EMA with their
/// SMA; after seeding each update is a single fused multiply-add.
///
/// A revision recomputes the newest position from the previous committed
/// EMA — repeated corrections of the same sample never compound.
///
/// # Example
///
/// ```
/// use pulse_ta::{Ema, EmaConfig, Sample};
/// use std::num::NonZero;
///
/// let mut ema = Ema::new(EmaConfig::new(NonZero::new(3).unwrap()));
///
/// assert_eq!(ema.update(&Sample::new(1, 2.0)), None);
/// assert_eq!(ema.update(&Sample::new(2, 4.0)), None);
/// // SMA seed = (2 + 4 + 6) / 3 = 4.0
/// assert_eq!(ema.update(&Sample::new(3, 6.0)), Some(4.0));
/// // EMA(3) α = 0.5: 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!(ema.update(&Sample::new(4, 8.0)), Some(6.0));
/// ```
pub type Ema = Indicator<EmaCalc>;

impl Indicator<EmaCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: EmaConfig) -> Self {
        Self::from_calc(EmaCalc::new(config))
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({})", self.calc().config.length)
    }
}
