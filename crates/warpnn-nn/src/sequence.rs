//! Labelled, possibly multi-channel sequences.

use warpnn_distance::{DistanceError, TimeSeries, TimeSeriesView};

use crate::error::SequenceError;
use crate::label::ClassLabel;

/// One labelled example: one or more equally long channels plus a class.
///
/// Channel 0 is the primary channel; every kernel and cache statistic reads
/// it. Further channels ride along for transforms and I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    channels: Vec<TimeSeries>,
    label: ClassLabel,
}

impl Sequence {
    /// Create a sequence from its channels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SequenceError::NoChannels`] | `channels` is empty |
    /// | [`SequenceError::ChannelLengthMismatch`] | A channel differs in length from channel 0 |
    pub fn new(channels: Vec<TimeSeries>, label: ClassLabel) -> Result<Self, SequenceError> {
        check_channels(&channels)?;
        Ok(Self { channels, label })
    }

    /// Create a single-channel sequence.
    #[must_use]
    pub fn univariate(series: TimeSeries, label: ClassLabel) -> Self {
        Self {
            channels: vec![series],
            label,
        }
    }

    /// The primary channel.
    #[must_use]
    pub fn primary(&self) -> &TimeSeries {
        &self.channels[0]
    }

    #[must_use]
    pub fn channels(&self) -> &[TimeSeries] {
        &self.channels
    }

    #[must_use]
    pub fn label(&self) -> ClassLabel {
        self.label
    }

    /// Number of time steps per channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primary().len()
    }

    /// Always false; channels are non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary().is_empty()
    }

    /// Replace every channel with `f(channel)`.
    ///
    /// The sequence is left untouched if any channel fails.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SequenceError::Transform`] | `f` fails on a channel |
    /// | [`SequenceError::ChannelLengthMismatch`] | `f` produced channels of different lengths |
    pub fn transform_in_place<F>(&mut self, mut f: F) -> Result<(), SequenceError>
    where
        F: FnMut(TimeSeriesView<'_>) -> Result<TimeSeries, DistanceError>,
    {
        let transformed = self
            .channels
            .iter()
            .map(|c| f(c.as_view()))
            .collect::<Result<Vec<_>, _>>()?;
        check_channels(&transformed)?;
        self.channels = transformed;
        Ok(())
    }
}

fn check_channels(channels: &[TimeSeries]) -> Result<(), SequenceError> {
    let Some(first) = channels.first() else {
        return Err(SequenceError::NoChannels);
    };
    let expected = first.len();
    match channels.iter().position(|c| c.len() != expected) {
        Some(channel) => Err(SequenceError::ChannelLengthMismatch {
            channel,
            expected,
            found: channels[channel].len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warpnn_distance::{derivative, z_normalize};

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    #[test]
    fn rejects_no_channels() {
        let err = Sequence::new(vec![], ClassLabel::new(0)).unwrap_err();
        assert_eq!(err, SequenceError::NoChannels);
    }

    #[test]
    fn rejects_ragged_channels() {
        let err = Sequence::new(vec![ts(&[1.0, 2.0]), ts(&[1.0])], ClassLabel::new(0)).unwrap_err();
        assert_eq!(
            err,
            SequenceError::ChannelLengthMismatch { channel: 1, expected: 2, found: 1 }
        );
    }

    #[test]
    fn derivative_shortens_every_channel() {
        let mut s = Sequence::new(
            vec![ts(&[0.0, 1.0, 2.0, 3.0]), ts(&[4.0, 2.0, 0.0, -2.0])],
            ClassLabel::new(1),
        )
        .unwrap();
        s.transform_in_place(derivative).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.channels()[1].as_ref(), &[-2.0, -2.0]);
        assert_eq!(s.label(), ClassLabel::new(1));
    }

    #[test]
    fn failed_transform_leaves_sequence_unchanged() {
        let mut s = Sequence::univariate(ts(&[3.0, 3.0, 3.0]), ClassLabel::new(0));
        let before = s.clone();
        let err = s.transform_in_place(z_normalize).unwrap_err();
        assert!(matches!(err, SequenceError::Transform(DistanceError::ConstantSeries { .. })));
        assert_eq!(s, before);
    }
}
