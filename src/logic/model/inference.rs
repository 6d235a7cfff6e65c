//! Inference - loads the serving model and scores feature vectors
//!
//! The handle wraps the current artifact in an `RwLock<Arc<..>>`: readers
//! clone the `Arc` and score outside the lock, a retrain swaps the `Arc`.
//! A prediction therefore always sees a fully-old or fully-new model.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::AppError;
use crate::logic::features::FeatureVector;

pub type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Serialized unit: the forest plus the exact feature columns (label
/// excluded, dataset order) it was trained on.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub forest: Forest,
}

impl ModelArtifact {
    /// Score one feature vector. Input columns are selected by name in the
    /// order this model was trained on; positional order of the vector is
    /// never trusted.
    pub fn predict(&self, features: &FeatureVector) -> Result<i32, AppError> {
        let row: Vec<f64> = self
            .feature_names
            .iter()
            .map(|name| {
                features.get(name).ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "model expects feature '{name}' the vector does not carry"
                    ))
                })
            })
            .collect::<Result<_, _>>()?;

        let x = DenseMatrix::from_2d_vec(&vec![row])
            .map_err(|e| AppError::Model(format!("failed to build input matrix: {e}")))?;
        let labels = self
            .forest
            .predict(&x)
            .map_err(|e| AppError::Model(format!("prediction failed: {e}")))?;
        labels
            .first()
            .copied()
            .ok_or_else(|| AppError::Model("empty prediction output".to_string()))
    }
}

/// Shared handle to the currently served model.
pub struct ModelHandle {
    current: RwLock<Arc<ModelArtifact>>,
}

impl ModelHandle {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            current: RwLock::new(Arc::new(artifact)),
        }
    }

    /// Load the artifact from disk.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = fs::read(path)?;
        let artifact: ModelArtifact = bincode::deserialize(&bytes)
            .map_err(|e| AppError::Model(format!("failed to deserialize model: {e}")))?;
        Ok(Self::new(artifact))
    }

    /// Atomically replace the served model.
    pub fn swap(&self, artifact: ModelArtifact) {
        *self.current.write() = Arc::new(artifact);
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<i32, AppError> {
        let artifact = Arc::clone(&self.current.read());
        artifact.predict(features)
    }

    pub fn feature_count(&self) -> usize {
        self.current.read().feature_names.len()
    }
}
