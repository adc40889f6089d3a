//! Series transforms applied before distances are computed.

use crate::error::DistanceError;
use crate::series::{TimeSeries, TimeSeriesView};

/// Z-normalize to zero mean and unit population variance.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DistanceError::ConstantSeries`] | All values are identical (zero variance) |
pub fn z_normalize(series: TimeSeriesView<'_>) -> Result<TimeSeries, DistanceError> {
    let data = series.as_slice();
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let std = (data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

    if std == 0.0 {
        return Err(DistanceError::ConstantSeries {
            n: data.len(),
            value: data[0],
        });
    }

    TimeSeries::new(data.iter().map(|&x| (x - mean) / std).collect())
}

/// Keogh-Pazzani derivative: `d[i] = ((x[i] - x[i-1]) + (x[i+1] - x[i-1]) / 2) / 2`
/// for interior points. The output is two values shorter than the input.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DistanceError::TooShort`] | Series has fewer than 3 values |
pub fn derivative(series: TimeSeriesView<'_>) -> Result<TimeSeries, DistanceError> {
    let data = series.as_slice();
    if data.len() < 3 {
        return Err(DistanceError::TooShort { len: data.len() });
    }

    TimeSeries::new(
        data.windows(3)
            .map(|w| ((w[1] - w[0]) + (w[2] - w[0]) / 2.0) / 2.0)
            .collect(),
    )
}

/// A named series transform, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// [`z_normalize`].
    ZNormalize,
    /// [`derivative`].
    Derivative,
}

impl Transform {
    /// Apply the transform to one series.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying function.
    pub fn apply(self, series: TimeSeriesView<'_>) -> Result<TimeSeries, DistanceError> {
        match self {
            Self::ZNormalize => z_normalize(series),
            Self::Derivative => derivative(series),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    #[test]
    fn z_normalize_moments() {
        let z = z_normalize(ts(&[1.0, 2.0, 3.0, 4.0, 5.0]).as_view()).unwrap();
        let data = z.as_ref();
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let var = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-10, "mean was {mean}");
        assert!((var - 1.0).abs() < 1e-10, "variance was {var}");
    }

    #[test]
    fn z_normalize_constant_series_error() {
        let result = z_normalize(ts(&[5.0, 5.0, 5.0]).as_view());
        assert_eq!(result, Err(DistanceError::ConstantSeries { n: 3, value: 5.0 }));
    }

    #[test]
    fn derivative_of_line_is_slope() {
        let d = derivative(ts(&[0.0, 2.0, 4.0, 6.0, 8.0]).as_view()).unwrap();
        assert_eq!(d.len(), 3);
        assert!(d.as_ref().iter().all(|&v| (v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn derivative_too_short() {
        let result = derivative(ts(&[1.0, 2.0]).as_view());
        assert_eq!(result, Err(DistanceError::TooShort { len: 2 }));
    }

    #[test]
    fn transform_dispatch() {
        let series = ts(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(
            Transform::Derivative.apply(series.as_view()),
            derivative(series.as_view())
        );
        assert_eq!(
            Transform::ZNormalize.apply(series.as_view()),
            z_normalize(series.as_view())
        );
    }
}
