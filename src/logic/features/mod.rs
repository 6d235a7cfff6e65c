//! Lexical URL feature extraction

pub mod entropy;
pub mod extractor;
pub mod layout;
pub mod vector;

pub use extractor::extract;
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, LABEL_COLUMN};
pub use vector::FeatureVector;
