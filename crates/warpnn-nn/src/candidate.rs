//! Per-query best-so-far record used across a window sweep.

use warpnn_distance::ExtendedDistance;

/// Whether a candidate may still be displaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateStatus {
    /// Best found so far; a wider window may still find a closer neighbour.
    #[default]
    BestCandidate,
    /// No window up to the sweep's maximum can change the winner.
    ConfirmedNearestNeighbor,
}

/// Best-so-far nearest neighbour of one query.
///
/// Starts empty with an infinite distance. The driver replaces it only on a
/// strictly smaller distance, so exact ties keep the earlier neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    index: Option<usize>,
    distance: f64,
    validity_radius: Option<usize>,
    status: CandidateStatus,
}

impl Default for Candidate {
    fn default() -> Self {
        Self::new()
    }
}

impl Candidate {
    /// An empty record: no neighbour, infinite distance, unconfirmed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: None,
            distance: f64::INFINITY,
            validity_radius: None,
            status: CandidateStatus::BestCandidate,
        }
    }

    /// Overwrite the whole record.
    pub fn update(
        &mut self,
        index: usize,
        validity_radius: Option<usize>,
        distance: f64,
        status: CandidateStatus,
    ) {
        self.index = Some(index);
        self.validity_radius = validity_radius;
        self.distance = distance;
        self.status = status;
    }

    /// Take `index` as the new best if `extended` is strictly closer.
    /// Returns true when the record changed.
    pub fn offer(&mut self, index: usize, extended: ExtendedDistance) -> bool {
        let distance = extended.distance.value();
        if distance < self.distance {
            self.update(
                index,
                extended.validity_radius,
                distance,
                CandidateStatus::BestCandidate,
            );
            true
        } else {
            false
        }
    }

    /// Promote to [`CandidateStatus::ConfirmedNearestNeighbor`]. No-op when empty.
    pub fn confirm(&mut self) {
        if self.index.is_some() {
            self.status = CandidateStatus::ConfirmedNearestNeighbor;
        }
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == CandidateStatus::ConfirmedNearestNeighbor
    }

    /// Index of the best neighbour, if any was found.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Distance to the best neighbour; infinite when empty.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Narrowest band at which [`distance`][Self::distance] is exact.
    #[must_use]
    pub fn validity_radius(&self) -> Option<usize> {
        self.validity_radius
    }

    #[must_use]
    pub fn status(&self) -> CandidateStatus {
        self.status
    }

    /// True when the stored distance is exact for a band of `radius`.
    #[must_use]
    pub fn is_exact_at(&self, radius: usize) -> bool {
        self.validity_radius.is_some_and(|r| r <= radius)
    }
}
