//! Domain logic: feature extraction, dataset persistence, model lifecycle

pub mod dataset;
pub mod features;
pub mod model;
pub mod retrain;
