//! Classifier training and serving

pub mod inference;
pub mod trainer;

pub use inference::{ModelArtifact, ModelHandle};
