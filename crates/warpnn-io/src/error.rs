//! I/O error types for warpnn-io.

use std::path::PathBuf;

/// Errors from dataset loading and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the data file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file holds no data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the data file.
        path: PathBuf,
    },

    /// Returned when a row's label column is blank.
    #[error("missing class label in {path}: row {row_index}")]
    MissingLabel {
        /// Path to the data file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when a row has a label but no values once padding is removed.
    #[error("row {row_index} in {path} has no values")]
    EmptyRow {
        /// Path to the data file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when a value is unparseable, infinite, or a NaN before the end of the row.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the data file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based column index (excluding the label column).
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be encoded.
    #[error("cannot serialize result for {path}")]
    Serialize {
        /// Path the artifact was destined for.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
