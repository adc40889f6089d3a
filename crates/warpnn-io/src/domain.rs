//! Domain types for warpnn-io.

use std::collections::HashMap;

use warpnn_nn::{ClassLabel, Sequence};

use crate::IoError;

/// Maps raw class labels from data files to dense [`ClassLabel`]s.
///
/// Labels are numbered in order of first appearance. Share one map between a
/// training and a test file so the same raw label gets the same index in both.
/// Numeric labels are compared by value, so `1`, `1.0` and `+1` are one class.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    names: Vec<String>,
    index: HashMap<String, ClassLabel>,
}

impl LabelMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the label for `raw`, assigning the next index if it is new.
    pub(crate) fn intern(&mut self, raw: &str) -> ClassLabel {
        let key = canonical(raw);
        if let Some(&label) = self.index.get(&key) {
            return label;
        }
        let label = ClassLabel::new(self.names.len());
        self.names.push(key.clone());
        self.index.insert(key, label);
        label
    }

    /// Raw label text for `label`, if it was assigned by this map.
    #[must_use]
    pub fn name(&self, label: ClassLabel) -> Option<&str> {
        self.names.get(label.index()).map(String::as_str)
    }

    /// Number of distinct labels seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn canonical(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Labelled sequences read from one file, in row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// One sequence per data row.
    pub sequences: Vec<Sequence>,
}

impl Dataset {
    /// Number of sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Length of the longest sequence.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.sequences.iter().map(Sequence::len).max().unwrap_or(0)
    }

    /// True when every sequence has the same length.
    #[must_use]
    pub fn is_equal_length(&self) -> bool {
        self.sequences.windows(2).all(|w| w[0].len() == w[1].len())
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
