//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Path to the CSV dataset artifact
    pub dataset_path: PathBuf,

    /// Path to the serialized model artifact
    pub model_path: PathBuf,

    /// Retrain after this many accepted appends
    pub retrain_interval: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),

            dataset_path: env::var("DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/dataset.csv")),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/model.bin")),

            retrain_interval: env::var("RETRAIN_INTERVAL")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
        }
    }
}
