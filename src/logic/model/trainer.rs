//! Classifier Trainer - fits the random forest over the full dataset
//!
//! Every retrain refits from scratch on every row ever appended, then
//! replaces the published artifact via write-then-rename so a concurrent
//! reader sees either the old model or the new one, never a torn file.

use std::fs;
use std::path::Path;

use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::ModelArtifact;
use crate::error::AppError;
use crate::logic::dataset::DatasetStore;
use crate::logic::features::LABEL_COLUMN;

/// Fixed seed so a retrain over the same dataset yields the same forest.
const RANDOM_SEED: u64 = 42;

/// Refit the classifier from the full dataset and atomically replace the
/// model artifact at `model_path`. Returns the freshly trained artifact so
/// the caller can swap it into the serving handle without re-reading disk.
pub fn retrain(store: &DatasetStore, model_path: &Path) -> Result<ModelArtifact, AppError> {
    let dataset = store.load()?;

    if dataset.is_empty() {
        return Err(AppError::Training("dataset has no rows".to_string()));
    }

    let label_idx = dataset
        .columns
        .iter()
        .position(|c| c == LABEL_COLUMN)
        .ok_or_else(|| {
            AppError::SchemaMismatch(format!("dataset has no '{LABEL_COLUMN}' column"))
        })?;

    let labels: Vec<i32> = dataset
        .rows
        .iter()
        .map(|row| row[label_idx] as i32)
        .collect();
    if labels.iter().all(|&l| l == labels[0]) {
        return Err(AppError::Training(format!(
            "dataset holds a single class ({}); need at least two",
            labels[0]
        )));
    }

    let feature_names: Vec<String> = dataset
        .columns
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != label_idx)
        .map(|(_, c)| c.clone())
        .collect();
    let samples: Vec<Vec<f64>> = dataset
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(i, _)| i != label_idx)
                .map(|(_, &v)| v)
                .collect()
        })
        .collect();

    let x = DenseMatrix::from_2d_vec(&samples)
        .map_err(|e| AppError::Training(format!("failed to build matrix: {e}")))?;
    let params = RandomForestClassifierParameters::default().with_seed(RANDOM_SEED);
    let forest = RandomForestClassifier::fit(&x, &labels, params)
        .map_err(|e| AppError::Training(format!("fit failed: {e}")))?;

    let artifact = ModelArtifact {
        feature_names,
        forest,
    };
    persist(&artifact, model_path)?;

    tracing::info!(
        rows = dataset.len(),
        features = artifact.feature_names.len(),
        "classifier retrained"
    );
    Ok(artifact)
}

fn persist(artifact: &ModelArtifact, model_path: &Path) -> Result<(), AppError> {
    let bytes = bincode::serialize(artifact)
        .map_err(|e| AppError::Model(format!("failed to serialize model: {e}")))?;
    let tmp = model_path.with_extension("bin.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, model_path)?;
    Ok(())
}
