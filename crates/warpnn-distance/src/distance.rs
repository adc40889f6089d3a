//! Distance value newtypes shared by every kernel.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative distance value in the units of the measure that produced it.
///
/// [`Distance::INFINITY`] means "at least the cutoff" when returned by an
/// early-abandoning call, or "no admissible alignment" when the band makes the
/// final cell unreachable.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    /// Infinite distance, used as a sentinel when early abandoning.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Zero distance.
    pub const ZERO: Self = Self(0.0);

    /// Create a new distance from a raw value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw distance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return true unless this is the abandon/unreachable sentinel.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A distance together with the narrowest band that reproduces it.
///
/// `validity_radius` is the widest `|i - j|` along the optimal alignment that
/// produced `distance`. Any band radius between it and the band used for the
/// computation yields the same value. `None` when the distance is infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendedDistance {
    /// The distance itself.
    pub distance: Distance,
    /// Smallest band radius at which `distance` is exact.
    pub validity_radius: Option<usize>,
}

impl ExtendedDistance {
    /// The result of an abandoned or unreachable computation.
    pub const ABANDONED: Self = Self {
        distance: Distance::INFINITY,
        validity_radius: None,
    };

    pub(crate) fn new(value: f64, reach: usize) -> Self {
        if value.is_finite() {
            Self {
                distance: Distance::new(value),
                validity_radius: Some(reach),
            }
        } else {
            Self::ABANDONED
        }
    }

    /// Return true if the distance is exact for a band of radius `radius`.
    #[must_use]
    pub fn is_valid_at(&self, radius: usize) -> bool {
        self.validity_radius.is_some_and(|r| r <= radius)
    }
}
