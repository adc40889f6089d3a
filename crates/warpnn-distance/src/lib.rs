//! Elastic distance kernels, envelopes and admissible lower bounds.
//!
//! Pure math library with zero I/O. Every family (Euclidean, DTW, WDTW, ERP,
//! LCSS, MSM, TWE) implements [`ElasticDistance`] in three call shapes: full,
//! early-abandoning, and extended with the narrowest band that reproduces the
//! result. [`Measure`] wraps the families and pairs each with its lower bound.

mod bounds;
mod constraint;
mod distance;
mod dtw;
mod envelope;
mod erp;
mod error;
mod euclidean;
mod grid;
mod lcss;
mod measure;
mod msm;
mod preprocess;
mod series;
mod stats;
mod twe;
mod wdtw;

pub use bounds::{BoundInput, lb_erp, lb_global, lb_lcss, lb_lcss_global, lb_msm, lb_twe};
pub use constraint::BandConstraint;
pub use distance::{Distance, ExtendedDistance};
pub use dtw::Dtw;
pub use envelope::{SeriesEnvelope, lb_keogh, lb_keogh_ranked};
pub use erp::Erp;
pub use error::DistanceError;
pub use euclidean::Euclidean;
pub use lcss::Lcss;
pub use measure::{ElasticDistance, Measure};
pub use msm::Msm;
pub use preprocess::{Transform, derivative, z_normalize};
pub use series::{TimeSeries, TimeSeriesView};
pub use stats::SeriesStats;
pub use twe::Twe;
pub use wdtw::Wdtw;
