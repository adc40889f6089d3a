//! Error types for series validation, kernel inputs and preprocessing.

/// Errors from series construction, distance computation and preprocessing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistanceError {
    /// Returned when an empty slice is provided as a time series.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when a time series contains NaN, infinity, or negative infinity.
    #[error("time series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned by lock-step families (Euclidean, WDTW) when the two series differ in length.
    #[error("series lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first series.
        left: usize,
        /// Length of the second series.
        right: usize,
    },

    /// Returned when a measure parameter is out of its admissible range.
    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter {
        /// Parameter name as used by the measure constructor.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a series is too short for the derivative transform.
    #[error("derivative requires at least 3 values, got {len}")]
    TooShort {
        /// Length of the rejected series.
        len: usize,
    },

    /// Returned when z-normalizing a series with zero variance.
    #[error("cannot z-normalize constant series of length {n} (value {value})")]
    ConstantSeries {
        /// Length of the series.
        n: usize,
        /// The repeated value.
        value: f64,
    },
}

/// Reject parameters that are NaN or infinite.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, DistanceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DistanceError::InvalidParameter { name, value })
    }
}

/// Reject parameters that are negative, NaN or infinite.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, DistanceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DistanceError::InvalidParameter { name, value })
    }
}
