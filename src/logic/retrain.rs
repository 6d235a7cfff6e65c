//! Retraining trigger and the append → maybe-retrain pipeline
//!
//! The counter is an explicit field on the pipeline rather than process-wide
//! state, so tests can drive it deterministically and a future version can
//! persist it. It is monotonic for the life of the pipeline and is never
//! reset by a retrain.

use std::path::PathBuf;

use crate::error::AppError;
use crate::logic::dataset::DatasetStore;
use crate::logic::features::FeatureVector;
use crate::logic::model::{trainer, ModelHandle};

/// Counter-based trigger: fires on every `interval`-th accepted append.
#[derive(Debug)]
pub struct RetrainPolicy {
    interval: u64,
    count: u64,
}

impl RetrainPolicy {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            count: 0,
        }
    }

    /// Record one accepted append; true when a retrain should fire.
    pub fn on_accepted_append(&mut self) -> bool {
        self.count += 1;
        self.count % self.interval == 0
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Serializes "append + maybe retrain" behind one owner. Callers wrap this
/// in a mutex; concurrent appends without that serialization can lose rows.
pub struct FeedbackPipeline {
    store: DatasetStore,
    policy: RetrainPolicy,
    model_path: PathBuf,
}

impl FeedbackPipeline {
    pub fn new(store: DatasetStore, policy: RetrainPolicy, model_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            policy,
            model_path: model_path.into(),
        }
    }

    /// Append one labeled sample; on every trigger hit, refit synchronously
    /// and swap the served model before returning.
    ///
    /// Retraining failures keep the previous model in service and are logged
    /// rather than propagated, so the caller's request still succeeds.
    pub fn record(
        &mut self,
        features: &FeatureVector,
        label: i32,
        model: &ModelHandle,
    ) -> Result<(), AppError> {
        self.store.append(features, label)?;

        if self.policy.on_accepted_append() {
            tracing::info!(appends = self.policy.count(), "retrain triggered");
            match trainer::retrain(&self.store, &self.model_path) {
                Ok(artifact) => model.swap(artifact),
                Err(e) => {
                    tracing::error!("retraining failed, keeping previous model: {e}");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{extract, FEATURE_LAYOUT, LABEL_COLUMN};
    use crate::logic::model::ModelArtifact;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_trigger_fires_every_tenth_append() {
        let mut policy = RetrainPolicy::new(10);
        for call in 1..=30u64 {
            let fired = policy.on_accepted_append();
            assert_eq!(fired, call % 10 == 0, "wrong trigger at call {call}");
        }
        assert_eq!(policy.count(), 30);
    }

    #[test]
    fn test_trigger_interval_of_one_always_fires() {
        let mut policy = RetrainPolicy::new(1);
        assert!(policy.on_accepted_append());
        assert!(policy.on_accepted_append());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut policy = RetrainPolicy::new(0);
        assert!(policy.on_accepted_append());
    }

    fn full_schema_dataset(dir: &TempDir) -> DatasetStore {
        let path = dir.path().join("dataset.csv");
        let mut columns = vec![LABEL_COLUMN.to_string()];
        columns.extend(FEATURE_LAYOUT.iter().map(|s| s.to_string()));
        let mut body = format!("{}\n", columns.join(","));
        // Two seed rows, one per class, so a refit can succeed.
        for (url, label) in [
            ("http://example.com/home", 0),
            ("http://login-45.verify12.badsite3.ru/steal?acct=999", 1),
        ] {
            let v = extract(url).unwrap();
            let mut fields = vec![label.to_string()];
            fields.extend(v.as_slice().iter().map(|x| x.to_string()));
            body.push_str(&fields.join(","));
            body.push('\n');
        }
        fs::write(&path, body).unwrap();
        DatasetStore::new(path)
    }

    fn model_for(dir: &TempDir, store: &DatasetStore) -> ModelHandle {
        let artifact: ModelArtifact =
            trainer::retrain(store, &dir.path().join("model.bin")).unwrap();
        ModelHandle::new(artifact)
    }

    #[test]
    fn test_record_appends_exactly_one_row() {
        let dir = TempDir::new().unwrap();
        let store = full_schema_dataset(&dir);
        let model = model_for(&dir, &store);
        let mut pipeline = FeedbackPipeline::new(
            store.clone(),
            RetrainPolicy::new(10),
            dir.path().join("model.bin"),
        );

        let before = store.load().unwrap().len();
        let features = extract("http://phish-7.example88.biz/login123").unwrap();
        pipeline.record(&features, 1, &model).unwrap();

        let dataset = store.load().unwrap();
        assert_eq!(dataset.len(), before + 1);
        assert_eq!(dataset.rows.last().unwrap()[0], 1.0);
        assert_eq!(pipeline.policy.count(), 1);
    }

    #[test]
    fn test_retrain_fires_and_swaps_model() {
        let dir = TempDir::new().unwrap();
        let store = full_schema_dataset(&dir);
        let model = model_for(&dir, &store);
        let mut pipeline = FeedbackPipeline::new(
            store.clone(),
            RetrainPolicy::new(3),
            dir.path().join("model.bin"),
        );

        let features = extract("http://phish-7.example88.biz/login123").unwrap();
        for _ in 0..3 {
            pipeline.record(&features, 1, &model).unwrap();
        }
        // Third append triggered a refit over the grown dataset.
        assert_eq!(store.load().unwrap().len(), 5);
        assert!(dir.path().join("model.bin").exists());
    }

    #[test]
    fn test_failed_retrain_keeps_previous_model() {
        let dir = TempDir::new().unwrap();
        let store = full_schema_dataset(&dir);
        let model = model_for(&dir, &store);

        // Single-class dataset: every row labeled 1, so the refit must fail.
        let degenerate_path = dir.path().join("degenerate.csv");
        let mut columns = vec![LABEL_COLUMN.to_string()];
        columns.extend(FEATURE_LAYOUT.iter().map(|s| s.to_string()));
        fs::write(&degenerate_path, format!("{}\n", columns.join(","))).unwrap();
        let degenerate = DatasetStore::new(degenerate_path);

        let mut pipeline =
            FeedbackPipeline::new(degenerate.clone(), RetrainPolicy::new(1), dir.path().join("model.bin"));
        let features = extract("http://phish-7.example88.biz/login123").unwrap();

        // Append succeeds, the retrain inside is swallowed.
        pipeline.record(&features, 1, &model).unwrap();
        assert_eq!(degenerate.load().unwrap().len(), 1);
        assert_eq!(model.feature_count(), FEATURE_LAYOUT.len());
    }
}
