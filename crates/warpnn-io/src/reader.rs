//! UCR-style labelled time series reader.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use warpnn_distance::TimeSeries;
use warpnn_nn::Sequence;

use crate::IoError;
use crate::domain::{Dataset, LabelMap};

/// Reads labelled time series in the UCR archive layout.
///
/// Expected format:
/// - No header row
/// - `label<delim>v0<delim>v1<delim>...`, one series per row
/// - Rows may differ in length; trailing empty or `NaN` cells are padding and are dropped
///
/// # Defaults
///
/// | Parameter   | Default |
/// |-------------|---------|
/// | `delimiter` | `,`     |
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::MissingLabel`] | Label column is blank |
/// | [`IoError::EmptyRow`] | Row has no values after padding is removed |
/// | [`IoError::NonFiniteValue`] | Cell is unparseable, infinite, or NaN before the end of the row |
#[derive(Debug, Clone)]
pub struct UcrReader {
    path: PathBuf,
    delimiter: u8,
}

impl UcrReader {
    /// Create a new reader for the given file path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b',',
        }
    }

    /// Use `delimiter` between cells (the 2018 archive uses tabs).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and validate the file, assigning class labels through `labels`.
    #[instrument(skip(self, labels), fields(path = %self.path.display()))]
    pub fn read(&self, labels: &mut LabelMap) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true): variable-length rows are valid in this format.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(self.delimiter)
            .from_reader(file);

        let mut sequences = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let raw_label = record.get(0).unwrap_or("");
            if raw_label.is_empty() {
                return Err(IoError::MissingLabel {
                    path: self.path.clone(),
                    row_index,
                });
            }

            let values = self.parse_values(&record, row_index)?;
            let series = TimeSeries::new(values).map_err(|_| IoError::EmptyRow {
                path: self.path.clone(),
                row_index,
            })?;
            sequences.push(Sequence::univariate(series, labels.intern(raw_label)));
        }

        if sequences.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = Dataset { sequences };
        info!(
            n_sequences = dataset.len(),
            max_len = dataset.max_len(),
            n_classes = labels.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn parse_values(&self, record: &csv::StringRecord, row_index: usize) -> Result<Vec<f64>, IoError> {
        let cells: Vec<&str> = record.iter().skip(1).collect();
        let padding = cells
            .iter()
            .rev()
            .take_while(|c| c.is_empty() || c.eq_ignore_ascii_case("nan"))
            .count();
        if padding > 0 {
            debug!(row_index, padding, "dropped trailing padding");
        }

        let body = &cells[..cells.len() - padding];
        body.iter()
            .enumerate()
            .map(|(col_index, raw)| match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(IoError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    col_index,
                    raw: (*raw).to_string(),
                }),
            })
            .collect()
    }
}
