use std::fmt::{self, Display};

/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Sample timestamp or sequence number.
///
/// Must be non-decreasing between consecutive calls to
/// [`Indicator::update`](crate::Indicator::update).
pub type Timestamp = u64;

/// Minimal contract every stream input satisfies.
///
/// Implemented by [`Sample`] and [`BarSample`]. Indicators are generic over
/// their input type and read only the stream position (`time`) and the
/// revision flag (`is_new`) through this trait; everything else is up to the
/// concrete carrier.
pub trait StreamSample {
    /// Sample timestamp or sequence number.
    fn time(&self) -> Timestamp;

    /// `true` for a sample at a new logical position, `false` for a
    /// correction of the most recent one.
    fn is_new(&self) -> bool;
}

/// One time-stamped scalar observation.
///
/// Immutable once constructed. A sample built with [`Sample::revision`]
/// replaces the previous sample at the same logical position instead of
/// opening a new one; the stream producer is trusted to set the flag
/// correctly.
///
/// # Example
///
/// ```
/// use pulse_ta::{Sample, StreamSample};
///
/// let open = Sample::new(7, 101.5);
/// let corrected = Sample::revision(7, 101.8);
///
/// assert!(open.is_new());
/// assert!(!corrected.is_new());
/// assert_eq!(open.time(), corrected.time());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    time: Timestamp,
    value: Price,
    is_new: bool,
}

impl Sample {
    /// Sample at a new logical position.
    #[must_use]
    pub fn new(time: Timestamp, value: Price) -> Self {
        Self {
            time,
            value,
            is_new: true,
        }
    }

    /// Correction of the most recent sample.
    #[must_use]
    pub fn revision(time: Timestamp, value: Price) -> Self {
        Self {
            time,
            value,
            is_new: false,
        }
    }

    /// Observed value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Price {
        self.value
    }
}

impl StreamSample for Sample {
    #[inline]
    fn time(&self) -> Timestamp {
        self.time
    }

    #[inline]
    fn is_new(&self) -> bool {
        self.is_new
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sample(t: {}, {})", self.time, self.value)
    }
}

/// One time-stamped OHLCV observation.
///
/// Immutable once constructed. The same revision semantics as [`Sample`]
/// apply: a bar built with [`BarSample::revision`] corrects the most recent,
/// still-open bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarSample {
    time: Timestamp,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: f64,
    is_new: bool,
}

impl BarSample {
    /// Bar at a new logical position.
    #[must_use]
    pub fn new(
        time: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: f64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            is_new: true,
        }
    }

    /// Correction of the most recent bar.
    #[must_use]
    pub fn revision(
        time: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: f64,
    ) -> Self {
        Self {
            is_new: false,
            ..Self::new(time, open, high, low, close, volume)
        }
    }

    /// Opening price of the bar.
    #[inline]
    #[must_use]
    pub fn open(&self) -> Price {
        self.open
    }

    /// Highest price during the bar.
    #[inline]
    #[must_use]
    pub fn high(&self) -> Price {
        self.high
    }

    /// Lowest price during the bar.
    #[inline]
    #[must_use]
    pub fn low(&self) -> Price {
        self.low
    }

    /// Closing (or latest) price of the bar.
    #[inline]
    #[must_use]
    pub fn close(&self) -> Price {
        self.close
    }

    /// Trade volume during the bar.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl StreamSample for BarSample {
    #[inline]
    fn time(&self) -> Timestamp {
        self.time
    }

    #[inline]
    fn is_new(&self) -> bool {
        self.is_new
    }
}

impl Display for BarSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bar(t: {}, o: {}, h: {}, l: {}, c: {}, v: {})",
            self.time, self.open, self.high, self.low, self.close, self.volume
        )
    }
}
