//! Feature Vector - Core data structure for ML input
//!
//! Values live in the order defined by `layout::FEATURE_LAYOUT`; all lookups
//! are keyed by feature name, never by caller-supplied position.

use serde_json::{Map, Value};

use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::error::AppError;

/// A fixed-width feature vector in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build from `(name, value)` entries, which must enumerate the layout
    /// exactly and in order. Any drift between a producer and the layout is
    /// a schema error, not something to patch over.
    pub fn from_entries(entries: &[(&str, f64); FEATURE_COUNT]) -> Result<Self, AppError> {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, (name, value)) in entries.iter().enumerate() {
            if *name != FEATURE_LAYOUT[i] {
                return Err(AppError::SchemaMismatch(format!(
                    "expected feature '{}' at position {i}, got '{name}'",
                    FEATURE_LAYOUT[i]
                )));
            }
            values[i] = *value;
        }
        Ok(Self { values })
    }

    /// Get a feature value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    /// Values in layout order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// JSON object of named feature values for the wire response.
    ///
    /// Integral values are emitted as JSON integers so counts and booleans
    /// don't pick up a trailing `.0` on the wire.
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, &value) in FEATURE_LAYOUT.iter().zip(self.values.iter()) {
            let json_value = if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Value::from(value as i64)
            } else {
                Value::from(value)
            };
            map.insert(name.to_string(), json_value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_entries() -> [(&'static str, f64); FEATURE_COUNT] {
        let mut entries = [("", 0.0); FEATURE_COUNT];
        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            entries[i] = (name, i as f64);
        }
        entries
    }

    #[test]
    fn test_from_entries_in_layout_order() {
        let vector = FeatureVector::from_entries(&layout_entries()).unwrap();
        assert_eq!(vector.get("url_length"), Some(0.0));
        assert_eq!(vector.get("entropy_of_domain"), Some((FEATURE_COUNT - 1) as f64));
    }

    #[test]
    fn test_from_entries_rejects_out_of_order() {
        let mut entries = layout_entries();
        entries.swap(0, 1);
        assert!(matches!(
            FeatureVector::from_entries(&entries),
            Err(AppError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_get_unknown_name_is_none() {
        let vector = FeatureVector::from_entries(&layout_entries()).unwrap();
        assert_eq!(vector.get("not_a_feature"), None);
    }

    #[test]
    fn test_json_map_covers_layout() {
        let vector = FeatureVector::from_entries(&layout_entries()).unwrap();
        let map = vector.to_json_map();
        assert_eq!(map.len(), FEATURE_COUNT);
        assert_eq!(map["number_of_dots_in_url"], Value::from(1));
    }
}
