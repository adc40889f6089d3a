//! Dataset loading and result artifacts for the warpnn pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{Dataset, ExperimentName, LabelMap};
pub use error::IoError;
pub use reader::UcrReader;
pub use writer::ResultWriter;
