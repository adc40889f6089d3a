//! Owned and borrowed series of finite reals.
//!
//! Every kernel and bound assumes its inputs are non-empty and free of NaN
//! and infinity; these types make that a construction-time check so the hot
//! loops never have to repeat it.

use std::ops::Index;

use crate::error::DistanceError;

fn check_values(values: &[f64]) -> Result<(), DistanceError> {
    match values.iter().position(|v| !v.is_finite()) {
        _ if values.is_empty() => Err(DistanceError::EmptySeries),
        Some(index) => Err(DistanceError::NonFiniteValue { index }),
        None => Ok(()),
    }
}

/// A non-empty series of finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Take ownership of `values` after checking them.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::EmptySeries`] | `values` is empty |
    /// | [`DistanceError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, DistanceError> {
        check_values(&values)?;
        Ok(Self(values))
    }

    #[must_use]
    pub fn as_view(&self) -> TimeSeriesView<'_> {
        TimeSeriesView(&self.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `false` for every checked series; present for `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = DistanceError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl TryFrom<&[f64]> for TimeSeries {
    type Error = DistanceError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::new(values.to_vec())
    }
}

/// Borrowed counterpart of [`TimeSeries`], passed to every kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesView<'a>(&'a [f64]);

impl<'a> TimeSeriesView<'a> {
    /// Borrow `slice` after checking it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DistanceError::EmptySeries`] | `slice` is empty |
    /// | [`DistanceError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(slice: &'a [f64]) -> Result<Self, DistanceError> {
        check_values(slice)?;
        Ok(Self(slice))
    }

    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy the viewed values into an owned series.
    #[must_use]
    pub fn to_series(&self) -> TimeSeries {
        TimeSeries(self.0.to_vec())
    }
}

impl Index<usize> for TimeSeriesView<'_> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for TimeSeriesView<'_> {
    fn as_ref(&self) -> &[f64] {
        self.0
    }
}
