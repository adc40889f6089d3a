use warpnn_distance::{BandConstraint, DistanceError};

/// Errors from the sequence statistics cache.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    /// Returned when a sequence index was never added to the cache.
    #[error("sequence index {index} out of range for cache of {len} sequences")]
    UnknownSequence {
        /// The requested index.
        index: usize,
        /// Number of sequences in the cache.
        len: usize,
    },

    /// Returned by read-only access when the slot was built for another band.
    #[error("envelope of sequence {index} is not built for {requested:?}")]
    StaleEnvelope {
        /// The requested index.
        index: usize,
        /// The band the caller asked for.
        requested: BandConstraint,
    },

    /// Returned when the pairwise bound matrix is used without opting in.
    #[error("pairwise lower-bound matrix is not enabled for this cache")]
    PairwiseBoundsDisabled,
}

/// Errors from sequence construction and transforms.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequenceError {
    /// Returned when a sequence is built without any channel.
    #[error("sequence must have at least one channel")]
    NoChannels,

    /// Returned when channels of one sequence differ in length.
    #[error("channel {channel} has length {found}, expected {expected}")]
    ChannelLengthMismatch {
        /// Offending channel.
        channel: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        found: usize,
    },

    /// Wraps a failure of the transform applied to a channel.
    #[error("transform failed: {0}")]
    Transform(#[from] DistanceError),
}

/// Errors from nearest-neighbour search, window sweeps and classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SweepError {
    /// Returned when the training set is empty.
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// Returned when leave-one-out needs more sequences than were given.
    #[error("leave-one-out needs at least 2 sequences, got {n}")]
    TooFewSequences {
        /// Number of sequences provided.
        n: usize,
    },

    /// Returned when the smallest window exceeds the largest.
    #[error("min_window ({min}) must not exceed max_window ({max})")]
    InvalidWindowRange {
        /// The smallest window.
        min: usize,
        /// The largest window.
        max: usize,
    },

    /// Returned when the window step is zero.
    #[error("window step must be at least 1")]
    InvalidWindowStep,

    /// Returned when a cache does not describe the sequences passed alongside it.
    #[error("cache holds {cached} sequences but {sequences} were given")]
    CacheSizeMismatch {
        /// Number of sequences passed.
        sequences: usize,
        /// Number of sequences in the cache.
        cached: usize,
    },

    /// Wraps a kernel failure, such as a length mismatch for lock-step families.
    #[error("distance error: {0}")]
    Distance(#[from] DistanceError),

    /// Wraps a cache access failure.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = CacheError::UnknownSequence { index: 9, len: 3 };
        assert_eq!(err.to_string(), "sequence index 9 out of range for cache of 3 sequences");
        let err = SweepError::InvalidWindowRange { min: 5, max: 2 };
        assert_eq!(err.to_string(), "min_window (5) must not exceed max_window (2)");
    }

    #[test]
    fn wraps_lower_level_errors() {
        let err: SweepError = CacheError::PairwiseBoundsDisabled.into();
        assert!(matches!(err, SweepError::Cache(CacheError::PairwiseBoundsDisabled)));
        let err: SweepError = DistanceError::EmptySeries.into();
        assert!(matches!(err, SweepError::Distance(DistanceError::EmptySeries)));
    }
}
