use std::fmt::{self, Display};
use std::num::NonZero;

use crate::{Calculation, Indicator, Price, Sample};

/// Configuration for the Relative Strength Index ([`Rsi`]) indicator.
///
/// RSI uses Wilder's smoothing, which has infinite memory: the SMA seed
/// (first `length` changes) influences all subsequent values. Output begins
/// at sample `length + 1`.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    length: NonZero<usize>,
}

impl RsiConfig {
    /// RSI over `length` sample-to-sample changes.
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

impl Display for RsiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsiConfig({})", self.length)
    }
}

/// Gain/loss accumulation phase.
#[derive(Clone, Copy, Debug)]
pub enum RsiPhase {
    /// Collecting the first `length` changes for the SMA seed.
    Seeding { gains: f64, losses: f64, changes: usize },
    /// Wilder smoothing from the seeded averages.
    Smoothing { avg_gain: f64, avg_loss: f64 },
}

/// State of an [`RsiCalc`]: the last committed value and the current
/// smoothing phase.
#[derive(Clone, Copy, Debug)]
pub struct RsiState {
    last_value: Option<Price>,
    phase: RsiPhase,
}

/// Wilder-smoothed relative strength behind [`Rsi`].
#[derive(Clone, Copy, Debug)]
pub struct RsiCalc {
    config: RsiConfig,
    length_reciprocal: f64,
    length_minus_one: f64,
}

impl RsiCalc {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(config: RsiConfig) -> Self {
        Self {
            config,
            length_reciprocal: 1.0 / config.length() as f64,
            length_minus_one: (config.length() - 1) as f64,
        }
    }

    /// `100 × gain / (gain + loss)`, with a flat market resolving to 50.
    #[inline]
    fn ratio(avg_gain: f64, avg_loss: f64) -> f64 {
        let sum = avg_gain + avg_loss;
        if sum == 0.0 {
            50.0
        } else {
            100.0 * avg_gain / sum
        }
    }
}

impl Calculation for RsiCalc {
    type Input = Sample;
    type State = RsiState;
    type Buffers = ();
    type Output = Price;

    fn init_state(&self) -> RsiState {
        RsiState {
            last_value: None,
            phase: RsiPhase::Seeding {
                gains: 0.0,
                losses: 0.0,
                changes: 0,
            },
        }
    }

    fn init_buffers(&self) {}

    fn warmup(&self) -> usize {
        self.config.length() + 1
    }

    #[inline]
    fn step(&self, state: &mut RsiState, _: &mut (), input: &Sample) -> Price {
        let value = input.value();
        let Some(prev) = state.last_value else {
            // First sample: no change to measure yet.
            state.last_value = Some(value);
            return 50.0;
        };

        let change = value - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        state.last_value = Some(value);

        match state.phase {
            RsiPhase::Seeding {
                mut gains,
                mut losses,
                mut changes,
            } => {
                gains += gain;
                losses += loss;
                changes += 1;

                if changes >= self.config.length() {
                    let avg_gain = gains * self.length_reciprocal;
                    let avg_loss = losses * self.length_reciprocal;
                    state.phase = RsiPhase::Smoothing { avg_gain, avg_loss };
                    Self::ratio(avg_gain, avg_loss)
                } else {
                    state.phase = RsiPhase::Seeding {
                        gains,
                        losses,
                        changes,
                    };
                    Self::ratio(gains, losses)
                }
            }
            RsiPhase::Smoothing { avg_gain, avg_loss } => {
                let avg_gain = avg_gain.mul_add(self.length_minus_one, gain) * self.length_reciprocal;
                let avg_loss = avg_loss.mul_add(self.length_minus_one, loss) * self.length_reciprocal;
                state.phase = RsiPhase::Smoothing { avg_gain, avg_loss };
                Self::ratio(avg_gain, avg_loss)
            }
        }
    }
}

/// Relative Strength Index (RSI) with Wilder's smoothing.
///
/// Measures the speed and magnitude of recent changes on a 0–100 scale.
/// The first `length` changes are averaged with a simple mean (SMA seed);
/// afterwards gains and losses are smoothed with `α = 1 / length`:
///
/// ```text
/// avg_gain = (prev_avg_gain × (length − 1) + gain) / length
/// avg_loss = (prev_avg_loss × (length − 1) + loss) / length
/// RSI      = 100 × avg_gain / (avg_gain + avg_loss)
/// ```
///
/// A flat market (all changes zero) resolves to 50 rather than dividing by
/// zero.
///
/// # Example
///
/// ```
/// use pulse_ta::{Rsi, RsiConfig, Sample};
/// use std::num::NonZero;
///
/// let mut rsi = Rsi::new(RsiConfig::new(NonZero::new(3).unwrap()));
///
/// // Seeding: 3 changes need 4 samples.
/// assert_eq!(rsi.update(&Sample::new(1, 10.0)), None);
/// assert_eq!(rsi.update(&Sample::new(2, 12.0)), None);
/// assert_eq!(rsi.update(&Sample::new(3, 11.0)), None);
///
/// // Changes +2, −1, +2 → avg_gain = 4/3, avg_loss = 1/3 → RSI = 80
/// assert_eq!(rsi.update(&Sample::new(4, 13.0)), Some(80.0));
/// ```
pub type Rsi = Indicator<RsiCalc>;

impl Indicator<RsiCalc> {
    /// See [`Indicator::from_calc`].
    #[must_use]
    pub fn new(config: RsiConfig) -> Self {
        Self::from_calc(RsiCalc::new(config))
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RSI({})", self.calc().config.length)
    }
}
