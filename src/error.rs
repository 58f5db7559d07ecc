use thiserror::Error;

/// Invalid construction parameter.
///
/// Configuration errors are fatal and surface at construction, before any
/// sample is processed. Degenerate data conditions at runtime (zero range,
/// zero variance, zero divisor) are never errors; they resolve to in-band
/// sentinel values documented per indicator.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Band multiplier must be positive and finite.
    #[error("band multiplier must be positive and finite, got {0}")]
    BandMultiplier(f64),

    /// Smoothing factor must lie in `(0, 1]`.
    #[error("smoothing factor must be in (0, 1], got {0}")]
    SmoothingFactor(f64),
}
