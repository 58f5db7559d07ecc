//! Revision-safe streaming technical analysis for Rust.
//!
//! Indicators update incrementally, one [`Sample`] or [`BarSample`] at a
//! time, and accept *revisions*: a correction of the most recent,
//! still-open sample (`is_new = false`) is processed in place, without
//! replaying history, and leaves state exactly as if the corrected value
//! had arrived first.
//!
//! The machinery lives in three pieces:
//!
//! * [`RollingWindow`] — a bounded buffer whose running aggregates absorb
//!   both appends and revisions in O(1);
//! * [`Indicator`] — the engine wrapping a [`Calculation`], which snapshots
//!   the calculation's state on every committed sample and rewinds it when
//!   a revision arrives;
//! * [`Flow`] — a typed, acyclic graph wiring indicator outputs into
//!   downstream indicator inputs, revisions included.
//!
//! Output is `None` until an indicator has seen enough committed samples
//! ([`Indicator::is_hot`]); degenerate data (flat markets, zero ranges,
//! zero divisors) resolves to documented in-band sentinels, never a panic.
//!
//! # Example
//!
//! ```
//! use pulse_ta::{Sample, Sma, SmaConfig};
//! use std::num::NonZero;
//!
//! let mut sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
//!
//! sma.update(&Sample::new(1, 10.0));
//! sma.update(&Sample::new(2, 20.0));
//! assert_eq!(sma.update(&Sample::new(3, 30.0)), Some(20.0));
//!
//! // The last sample turns out to have been provisional:
//! assert_eq!(sma.update(&Sample::revision(3, 60.0)), Some(30.0));
//! ```

mod atr;
mod bb;
mod donchian;
mod ema;
mod error;
mod flow;
mod indicator;
mod obv;
mod price_source;
mod roc;
mod rsi;
mod sample;
mod sma;
mod window;

pub use crate::error::ConfigError;
pub use crate::flow::{Flow, NodeId, Stage};
pub use crate::indicator::{Calculation, Indicator, IndicatorOutput};
pub use crate::price_source::{Extract, ExtractCalc, ExtractState, PriceSource};
pub use crate::sample::{BarSample, Price, Sample, StreamSample, Timestamp};
pub use crate::window::{RollingWindow, WindowWithSquares};

pub use crate::atr::{Atr, AtrCalc, AtrConfig, AtrState};
pub use crate::bb::{BandMultiplier, Bb, BbCalc, BbConfig, BbConfigBuilder, BbValue};
pub use crate::donchian::{Donchian, DonchianCalc, DonchianConfig, DonchianValue, DonchianWindows};
pub use crate::ema::{Ema, EmaCalc, EmaConfig, EmaConfigBuilder, EmaState, SmoothingFactor};
pub use crate::obv::{Obv, ObvCalc, ObvState};
pub use crate::roc::{Roc, RocCalc, RocConfig};
pub use crate::rsi::{Rsi, RsiCalc, RsiConfig, RsiPhase, RsiState};
pub use crate::sma::{Sma, SmaCalc, SmaConfig};

#[cfg(test)]
mod test_util;
