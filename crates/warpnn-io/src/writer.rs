//! JSON result writer for window sweeps and test-set classification.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};
use warpnn_nn::{Classification, PruningStats, SweepResult};

use crate::IoError;
use crate::domain::{ExperimentName, LabelMap};

/// Writes sweep and classification results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_sweep.json` and
/// `{experiment}_classify.json`.
#[derive(Debug)]
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a window sweep to `{experiment}_sweep.json`.
    ///
    /// Infinite distances (no reachable neighbour) are written as `null`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_sweep(
        &self,
        measure: &str,
        result: &SweepResult,
        selected_window: Option<usize>,
    ) -> Result<PathBuf, IoError> {
        let windows = result
            .scores
            .iter()
            .map(|s| WindowEntry {
                window: s.window,
                correct: s.correct,
                accuracy: s.accuracy,
                confirmed: s.confirmed,
                neighbors: &s.neighbors,
                distances: s.distances.iter().map(|&d| finite(d)).collect(),
                pruning: s.stats.into(),
            })
            .collect();

        let artifact = SweepArtifact {
            experiment: self.experiment.as_str(),
            measure,
            n_sequences: result.n_sequences,
            selected_window,
            best_accuracy: result.best_accuracy(),
            tied_windows: result.tied_best_windows(),
            precompute: result.precompute.into(),
            windows,
        };
        self.write_json("sweep", &artifact)
    }

    /// Write test-set predictions to `{experiment}_classify.json`, using the
    /// raw label text from `labels`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_classification(
        &self,
        measure: &str,
        labels: &LabelMap,
        result: &Classification,
    ) -> Result<PathBuf, IoError> {
        let predictions = result
            .predictions
            .iter()
            .zip(&result.neighbors)
            .map(|(label, &neighbor)| PredictionEntry {
                label: label.and_then(|l| labels.name(l)),
                neighbor,
            })
            .collect();

        let artifact = ClassifyArtifact {
            experiment: self.experiment.as_str(),
            measure,
            n_test: result.predictions.len(),
            correct: result.correct,
            accuracy: result.accuracy,
            pruning: result.stats.into(),
            predictions,
        };
        self.write_json("classify", &artifact)
    }

    fn write_json<T: Serialize>(&self, kind: &str, artifact: &T) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()));
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "{kind} result written");
        Ok(path)
    }
}

fn finite(d: f64) -> Option<f64> {
    d.is_finite().then_some(d)
}

// --- Serialization shadow structs ---

#[derive(Serialize)]
struct PruningEntry {
    lower_bound_pruned: usize,
    early_abandoned: usize,
    computed: usize,
    reused: usize,
}

impl From<PruningStats> for PruningEntry {
    fn from(s: PruningStats) -> Self {
        Self {
            lower_bound_pruned: s.lower_bound_pruned,
            early_abandoned: s.early_abandoned,
            computed: s.computed,
            reused: s.reused,
        }
    }
}

#[derive(Serialize)]
struct WindowEntry<'a> {
    window: usize,
    correct: usize,
    accuracy: f64,
    confirmed: usize,
    neighbors: &'a [Option<usize>],
    distances: Vec<Option<f64>>,
    pruning: PruningEntry,
}

#[derive(Serialize)]
struct SweepArtifact<'a> {
    experiment: &'a str,
    measure: &'a str,
    n_sequences: usize,
    selected_window: Option<usize>,
    best_accuracy: Option<f64>,
    tied_windows: Vec<usize>,
    precompute: PruningEntry,
    windows: Vec<WindowEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    label: Option<&'a str>,
    neighbor: Option<usize>,
}

#[derive(Serialize)]
struct ClassifyArtifact<'a> {
    experiment: &'a str,
    measure: &'a str,
    n_test: usize,
    correct: usize,
    accuracy: f64,
    pruning: PruningEntry,
    predictions: Vec<PredictionEntry<'a>>,
}
