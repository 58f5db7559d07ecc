use crate::{StreamSample, Timestamp};

use std::fmt::Debug;

/// Value type an indicator emits.
///
/// `NAN` is the sentinel emitted while an indicator is cold when the
/// [`nan_while_cold`](Indicator::nan_while_cold) policy is enabled. For
/// composite outputs it is the value with every component NaN.
pub trait IndicatorOutput: Copy + Debug {
    /// Fully-NaN sentinel of this output type.
    const NAN: Self;
}

impl IndicatorOutput for f64 {
    const NAN: Self = f64::NAN;
}

/// One indicator's pure incremental step.
///
/// A `Calculation` supplies the formula; [`Indicator`] supplies everything
/// else — warm-up gating, the committed-state snapshot that makes revisions
/// replay-free, and output caching. Implementations never see the revision
/// mechanics: by the time [`step`](Calculation::step) runs, [`State`] has
/// already been rewound to the value it had before the superseded sample, so
/// every call is written as if the sample were new.
///
/// The one exception is [`Buffers`]: rolling windows absorb revisions
/// natively through [`RollingWindow::add`](crate::RollingWindow::add), so a
/// step that pushes into a window must forward the input's `is_new` flag and
/// push exactly one value per call.
///
/// [`State`]: Calculation::State
/// [`Buffers`]: Calculation::Buffers
pub trait Calculation {
    /// Input carrier, scalar or bar.
    type Input: StreamSample;

    /// Mutable scalar state, snapshotted and restored as one unit.
    ///
    /// Keep it small and flat; it is cloned on every committed sample.
    type State: Clone + Debug;

    /// Rolling-window storage, revision-aware on its own and never
    /// snapshotted. `()` for windowless calculations.
    type Buffers: Clone + Debug;

    /// Emitted value type.
    type Output: IndicatorOutput;

    /// State at construction (and after a reset).
    fn init_state(&self) -> Self::State;

    /// Buffers at construction (and after a reset).
    fn init_buffers(&self) -> Self::Buffers;

    /// Minimum number of committed samples before output is valid.
    fn warmup(&self) -> usize;

    /// Applies one sample to the state and returns the raw output value.
    ///
    /// Must be a pure function of `(state, buffers, input)`; degenerate data
    /// resolves to a documented sentinel value, never a panic.
    fn step(
        &self,
        state: &mut Self::State,
        buffers: &mut Self::Buffers,
        input: &Self::Input,
    ) -> Self::Output;
}

/// Streaming engine wrapping a [`Calculation`].
///
/// Feeds samples to the calculation one at a time and keeps, alongside the
/// live state, a copy of the state as of the last *new* sample. That pair is
/// the whole revision mechanism:
///
/// * a new sample first commits (`committed ← live`), then advances
///   `sample_index`;
/// * a revision first rewinds (`live ← committed`) and leaves
///   `sample_index` untouched, so the step recomputes the same position from
///   the same starting point it originally had.
///
/// Re-submitting the latest value unchanged as a revision therefore leaves
/// output and state bit-identical to never having revised.
///
/// Output is `None` until [`warmup`](Calculation::warmup) samples have been
/// committed; construction-time [`nan_while_cold`](Indicator::nan_while_cold)
/// switches that to a NaN sentinel that propagates through downstream
/// consumers instead of suppressing the sample.
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
///
/// // Correct the last sample: no history replay, same warm state.
/// assert_eq!(sma.update(&Sample::revision(3, 60.0)), Some(30.0));
/// assert_eq!(sma.sample_index(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Indicator<C: Calculation> {
    calc: C,
    live: C::State,
    committed: C::State,
    buffers: C::Buffers,
    sample_index: u64,
    warmup: u64,
    nan_while_cold: bool,
    current: Option<C::Output>,
    last_time: Option<Timestamp>,
}

impl<C: Calculation> Indicator<C> {
    /// Engine around `calc`, output suppressed while cold.
    #[must_use]
    pub fn from_calc(calc: C) -> Self {
        let live = calc.init_state();
        let committed = calc.init_state();
        let buffers = calc.init_buffers();
        let warmup = calc.warmup() as u64;

        Self {
            calc,
            live,
            committed,
            buffers,
            sample_index: 0,
            warmup,
            nan_while_cold: false,
            current: None,
            last_time: None,
        }
    }

    /// Emit a NaN sentinel instead of suppressing output while cold.
    ///
    /// Construction-time policy; call before feeding the first sample.
    #[must_use]
    pub fn nan_while_cold(mut self) -> Self {
        self.nan_while_cold = true;
        self
    }

    /// Feeds one sample and returns the updated output, or `None` while the
    /// indicator is cold (see [`nan_while_cold`](Self::nan_while_cold)).
    ///
    /// A revision arriving before any new sample has ever been committed has
    /// nothing to revise; it is a no-op returning the cached output.
    #[inline]
    pub fn update(&mut self, input: &C::Input) -> Option<C::Output> {
        debug_assert!(
            self.last_time.is_none_or(|t| t <= input.time()),
            "time must be non-decreasing: last={}, got={}",
            self.last_time.unwrap_or(0),
            input.time(),
        );

        if input.is_new() {
            self.committed.clone_from(&self.live);
            self.sample_index += 1;
        } else {
            if self.sample_index == 0 {
                return self.current;
            }
            self.live.clone_from(&self.committed);
        }
        self.last_time = Some(input.time());

        let was_hot = self.is_hot();
        let out = self.calc.step(&mut self.live, &mut self.buffers, input);
        if !was_hot && self.is_hot() {
            tracing::trace!(sample_index = self.sample_index, "warmup complete");
        }

        self.current = if self.is_hot() {
            Some(out)
        } else if self.nan_while_cold {
            Some(<C::Output as IndicatorOutput>::NAN)
        } else {
            None
        };
        self.current
    }

    /// Last computed output without advancing state.
    ///
    /// This is a cached field read — O(1) with no computation.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<C::Output> {
        self.current
    }

    /// Whether enough samples have been committed for valid output.
    #[inline]
    #[must_use]
    pub fn is_hot(&self) -> bool {
        self.sample_index >= self.warmup
    }

    /// Count of committed *new* samples. Never advanced by a revision.
    #[inline]
    #[must_use]
    pub fn sample_index(&self) -> u64 {
        self.sample_index
    }

    /// Minimum committed samples before output is valid.
    #[inline]
    #[must_use]
    pub fn warmup_period(&self) -> u64 {
        self.warmup
    }

    /// Borrow of the wrapped calculation.
    #[inline]
    #[must_use]
    pub fn calc(&self) -> &C {
        &self.calc
    }

    /// Restores construction defaults, keeping the configuration.
    pub fn reset(&mut self) {
        self.live = self.calc.init_state();
        self.committed = self.calc.init_state();
        self.buffers = self.calc.init_buffers();
        self.sample_index = 0;
        self.current = None;
        self.last_time = None;
    }
}
