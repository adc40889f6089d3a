//! Configuration builder for leave-one-out window sweeps.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warpnn_distance::Measure;

use crate::cache::SequenceCache;
use crate::error::SweepError;
use crate::result::SweepResult;
use crate::sequence::Sequence;

/// Configuration for a leave-one-out sweep over Sakoe-Chiba window radii.
///
/// Construct via [`SweepConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter     | Default |
/// |---------------|---------|
/// | `window_step` | 1       |
/// | `seed`        | 42      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub(crate) min_window: usize,
    pub(crate) max_window: usize,
    pub(crate) window_step: usize,
    pub(crate) seed: u64,
}

impl SweepConfig {
    /// Sweep every window radius in `[min_window, max_window]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SweepError::InvalidWindowRange`] | `min_window > max_window` |
    pub fn new(min_window: usize, max_window: usize) -> Result<Self, SweepError> {
        if min_window > max_window {
            return Err(SweepError::InvalidWindowRange {
                min: min_window,
                max: max_window,
            });
        }
        Ok(Self {
            min_window,
            max_window,
            window_step: 1,
            seed: 42,
        })
    }

    /// Visit every `step`-th window starting at `min_window`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SweepError::InvalidWindowStep`] | `step` is zero |
    pub fn with_window_step(mut self, step: usize) -> Result<Self, SweepError> {
        if step == 0 {
            return Err(SweepError::InvalidWindowStep);
        }
        self.window_step = step;
        Ok(self)
    }

    /// Set the seed of the generator that breaks ties between equally
    /// accurate windows.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn min_window(&self) -> usize {
        self.min_window
    }

    #[must_use]
    pub fn max_window(&self) -> usize {
        self.max_window
    }

    #[must_use]
    pub fn window_step(&self) -> usize {
        self.window_step
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Window radii visited, in increasing order.
    #[must_use]
    pub fn windows(&self) -> Vec<usize> {
        (self.min_window..=self.max_window)
            .step_by(self.window_step)
            .collect()
    }

    /// Run the leave-one-out sweep of `measure` over `sequences`.
    ///
    /// `cache` must have been built from `sequences`; its envelopes are
    /// rebuilt once per window.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SweepError::EmptyTrainingSet`] | `sequences` is empty |
    /// | [`SweepError::TooFewSequences`] | Only one sequence was given |
    /// | [`SweepError::CacheSizeMismatch`] | `cache` holds a different number of sequences |
    /// | [`SweepError::Distance`] | A kernel rejects a pair |
    pub fn run(
        &self,
        measure: Measure,
        sequences: &[Sequence],
        cache: &mut SequenceCache,
    ) -> Result<SweepResult, SweepError> {
        crate::sweep::window_sweep(&self.windows(), measure, sequences, cache)
    }

    /// Pick the best window of `result`, breaking ties with a generator
    /// seeded from this configuration.
    #[must_use]
    pub fn select_window(&self, result: &SweepResult) -> Option<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        result.best_window(&mut rng)
    }
}
