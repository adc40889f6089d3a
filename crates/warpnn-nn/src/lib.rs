//! Nearest-neighbour search over elastic distances.
//!
//! Holds labelled sequences, the per-dataset statistics cache, the candidate
//! tracking record, and the drivers built on them: pruned 1-NN search, the
//! leave-one-out window sweep, and test-set classification.

mod cache;
mod candidate;
mod classify;
mod config;
mod error;
mod label;
mod result;
mod search;
mod sequence;
mod sweep;

pub use cache::{EnvelopeSlot, SequenceCache};
pub use candidate::{Candidate, CandidateStatus};
pub use classify::classify;
pub use config::SweepConfig;
pub use error::{CacheError, SequenceError, SweepError};
pub use label::ClassLabel;
pub use result::{Classification, SweepResult, WindowScore};
pub use search::{NearestNeighbor, PruningStats};
pub use sequence::Sequence;
