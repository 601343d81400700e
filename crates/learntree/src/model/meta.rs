//! Model metadata.

use serde::{Deserialize, Serialize};

use crate::predicate::PoolPreset;

/// Introspection data about a trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature values per example.
    pub n_features: usize,
    /// Preset the predicate pool was generated from, if any.
    pub pool_preset: Option<PoolPreset>,
    /// Exploration level the tree size was chosen at, if trained here.
    pub best_level: Option<u32>,
    /// Examples the final tree was grown on.
    pub n_training_examples: usize,
}

impl ModelMeta {
    /// Metadata for a model over `n_features` features with nothing else known.
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features,
            pool_preset: None,
            best_level: None,
            n_training_examples: 0,
        }
    }
}
