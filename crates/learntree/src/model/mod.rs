//! High-level model wrapper.
//!
//! [`TreeModel`] combines training, prediction, rendering and persistence.
//!
//! # Example
//!
//! ```no_run
//! use learntree::{CsvOptions, TreeConfig, TreeModel, read_csv};
//!
//! let examples = read_csv("mnist_train.csv", CsvOptions::default())?;
//! let config = TreeConfig::builder().max_level(12).build()?;
//! let (model, report) = TreeModel::fit(&config, examples)?;
//! println!("{report}");
//!
//! model.save("output_tree.tree")?;
//! let loaded = TreeModel::load("output_tree.tree")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod meta;

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub use config::{ConfigError, TreeConfig, TreeConfigBuilder};
pub use meta::ModelMeta;

use crate::data::{DataError, Examples};
use crate::explainability;
use crate::inference::Predictor;
use crate::persist::{self, ReadError, WriteError};
use crate::predicate::{PoolError, PredicateId, PredicatePool};
use crate::repr::{Tree, TreeValidationError, TreeView};
use crate::training::{LevelReport, PredicateUsage, TrainingError, TreeTrainer};

// =============================================================================
// ModelError
// =============================================================================

/// Errors from the high-level model API.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("training failed: {0}")]
    Training(#[from] TrainingError),

    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeValidationError),

    #[error("data has {actual} features, model expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },
}

// =============================================================================
// TrainReport
// =============================================================================

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Validation score of every exploration level.
    pub levels: Vec<LevelReport>,
    /// Chosen level.
    pub best_level: u32,
    /// Validation accuracy at the chosen level.
    pub best_accuracy: f64,
    /// Step calls made by the final retrain (`2^best_level`).
    pub final_steps: u64,
    /// Internal nodes of the final tree.
    pub internal_nodes: usize,
    /// Leaf weighted entropy of the final tree.
    pub total_weighted_entropy: f64,
    /// Predicate families used by the final tree.
    pub usage: PredicateUsage,
    /// Training examples used for exploration.
    pub n_training: usize,
    /// Validation examples used for exploration.
    pub n_validation: usize,
    /// Wall-clock training time.
    pub elapsed: Duration,
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "trained on {} examples, validated on {}",
            self.n_training, self.n_validation
        )?;
        for level in &self.levels {
            writeln!(
                f,
                "  level {:>2}: {:>6} internal nodes, validation accuracy {:.4}",
                level.level, level.internal_nodes, level.validation_accuracy
            )?;
        }
        writeln!(
            f,
            "best level {} (accuracy {:.4}); final tree: {} steps, {} internal nodes, weighted entropy {:.3}",
            self.best_level,
            self.best_accuracy,
            self.final_steps,
            self.internal_nodes,
            self.total_weighted_entropy
        )?;
        write!(f, "{}", self.usage)?;
        write!(f, "elapsed {:.2}s", self.elapsed.as_secs_f64())
    }
}

// =============================================================================
// TreeModel
// =============================================================================

/// A trained decision tree with the predicates it tests.
///
/// The pool holds only the predicates the tree uses, re-indexed densely, so
/// the model is self-contained.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeModel {
    tree: Tree,
    pool: PredicatePool,
    meta: ModelMeta,
}

impl TreeModel {
    /// Create a model from parts, validating that the tree only refers to
    /// predicates in `pool` and that those predicates fit the feature width.
    pub fn from_parts(tree: Tree, pool: PredicatePool, meta: ModelMeta) -> Result<Self, ModelError> {
        tree.validate_predicates(pool.len())?;
        pool.validate_for(meta.n_features)?;
        Ok(Self::from_validated(tree, pool, meta))
    }

    /// Assemble a model whose parts were already validated against each other.
    pub(crate) fn from_validated(tree: Tree, pool: PredicatePool, meta: ModelMeta) -> Self {
        Self { tree, pool, meta }
    }

    /// Create a model from a tree over a larger pool, keeping only the
    /// predicates the tree uses.
    pub fn compacted(tree: &Tree, pool: &PredicatePool, meta: ModelMeta) -> Result<Self, ModelError> {
        let (tree, pool) = compact(tree, pool)?;
        Self::from_parts(tree, pool, meta)
    }

    /// Split `examples` into training and validation sets and train.
    pub fn fit(config: &TreeConfig, examples: Examples) -> Result<(Self, TrainReport), ModelError> {
        config.validate()?;
        let (training, validation) =
            examples.split_validation(config.validation_percent, config.seed)?;
        Self::train(config, &training, &validation)
    }

    /// Train on an explicit training/validation split.
    ///
    /// The final tree is grown on both sets; validation rows only decide its
    /// size.
    pub fn train(
        config: &TreeConfig,
        training: &Examples,
        validation: &Examples,
    ) -> Result<(Self, TrainReport), ModelError> {
        config.validate()?;
        let start = Instant::now();

        let pool = config.pool.build_for(training.n_features())?;
        let trainer = TreeTrainer::new(config.to_trainer_params());
        let output = trainer.train(&pool, training, validation)?;

        let meta = ModelMeta {
            n_features: training.n_features(),
            pool_preset: Some(config.pool),
            best_level: Some(output.exploration.best_level),
            n_training_examples: training.n_examples() + validation.n_examples(),
        };
        let model = Self::compacted(&output.tree, &pool, meta)?;

        let report = TrainReport {
            levels: output.exploration.levels,
            best_level: output.exploration.best_level,
            best_accuracy: output.exploration.best_accuracy,
            final_steps: output.final_steps,
            internal_nodes: output.tree.n_internal(),
            total_weighted_entropy: output.total_weighted_entropy,
            usage: output.usage,
            n_training: training.n_examples(),
            n_validation: validation.n_examples(),
            elapsed: start.elapsed(),
        };
        Ok((model, report))
    }

    /// The decision tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Predicates referenced by the tree.
    pub fn pool(&self) -> &PredicatePool {
        &self.pool
    }

    /// Model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Predictor over this model.
    pub fn predictor(&self) -> Predictor<'_> {
        Predictor::new(&self.tree, &self.pool)
    }

    /// Predicted label for one feature vector.
    pub fn predict_row(&self, features: &[i32]) -> u8 {
        self.predictor().predict_row(features)
    }

    /// Predicted labels for every example.
    pub fn predict(&self, examples: &Examples) -> Vec<u8> {
        self.predictor().predict(examples)
    }

    /// Fraction of examples classified correctly (0.0 for an empty set).
    pub fn accuracy(&self, examples: &Examples) -> f64 {
        self.predictor().accuracy(examples)
    }

    /// Check that `examples` has the feature width the model expects.
    pub fn check_features(&self, examples: &Examples) -> Result<(), ModelError> {
        if !examples.is_empty() && examples.n_features() != self.meta.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.meta.n_features,
                actual: examples.n_features(),
            });
        }
        Ok(())
    }

    /// Render the tree as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        explainability::to_dot(&self.tree, &self.pool)
    }

    /// Save to a file; `.json` paths are written as JSON, anything else in
    /// the binary format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        persist::save_model(self, path)
    }

    /// Load from a file written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        persist::load_model(path)
    }
}

/// Keep only the predicates a tree tests and renumber them `0, 1, ...`.
///
/// A tree without splits keeps the first predicate so the pool stays
/// non-empty.
fn compact(tree: &Tree, pool: &PredicatePool) -> Result<(Tree, PredicatePool), PoolError> {
    let used = tree.used_predicates();
    if used.is_empty() {
        let first = pool.as_slice().iter().take(1).copied().collect();
        return Ok((tree.clone(), PredicatePool::new(first)?));
    }

    let predicates = used
        .iter()
        .filter_map(|&id| pool.get(id).copied())
        .collect();
    let pool = PredicatePool::new(predicates)?;
    let tree = tree.map_predicates(|id| {
        let dense = used.binary_search(&id).unwrap_or(0);
        PredicateId(dense as u32)
    });
    Ok((tree, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PoolPreset};
    use crate::testing::synthetic_digits;

    fn threshold(pixel: u32) -> Predicate {
        Predicate::PixelThreshold {
            pixel,
            threshold: 25,
        }
    }

    #[test]
    fn compact_renumbers_densely() {
        let pool = PredicatePool::new((0..6).map(threshold).collect()).unwrap();
        let tree = Tree::from_parts(
            vec![PredicateId(4), PredicateId(1), PredicateId(0), PredicateId(0), PredicateId(0)],
            vec![1, 3, 0, 0, 0],
            vec![2, 4, 0, 0, 0],
            vec![false, false, true, true, true],
            vec![0; 5],
            vec![0; 5],
        )
        .unwrap();

        let (compact_tree, compact_pool) = compact(&tree, &pool).unwrap();
        assert_eq!(compact_pool.as_slice(), &[threshold(1), threshold(4)]);
        assert_eq!(compact_tree.split_predicate(0), PredicateId(1));
        assert_eq!(compact_tree.split_predicate(1), PredicateId(0));

        let features = [0, 99, 0, 0, 99, 0];
        assert_eq!(
            tree.predict_label(&pool, &features),
            compact_tree.predict_label(&compact_pool, &features)
        );
    }

    #[test]
    fn compact_leaf_only_tree() {
        let pool = PredicatePool::new(vec![threshold(2), threshold(3)]).unwrap();
        let (tree, pool) = compact(&Tree::leaf(1, 3), &pool).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn fit_learns_synthetic_digits() {
        let examples = synthetic_digits(300, 11);
        let config = TreeConfig::builder()
            .max_level(6)
            .validation_percent(20)
            .pool(PoolPreset::Basic)
            .build()
            .unwrap();

        let (model, report) = TreeModel::fit(&config, examples.clone()).unwrap();
        assert_eq!(report.levels.len(), 7);
        assert_eq!(report.n_training + report.n_validation, 300);
        assert_eq!(report.final_steps, 1 << report.best_level);
        assert_eq!(report.internal_nodes, model.tree().n_internal());
        assert_eq!(model.meta().best_level, Some(report.best_level));
        assert_eq!(model.meta().n_training_examples, 300);
        assert!(model.pool().len() <= model.tree().n_internal().max(1));
        assert!(model.accuracy(&examples) > 0.8);
    }

    #[test]
    fn fit_rejects_bad_config() {
        let config = TreeConfig {
            max_level: 0,
            ..TreeConfig::default()
        };
        let result = TreeModel::fit(&config, synthetic_digits(50, 1));
        assert!(matches!(result, Err(ModelError::Config(ConfigError::InvalidMaxLevel(0)))));
    }

    #[test]
    fn feature_width_is_checked() {
        let examples = synthetic_digits(100, 2);
        let config = TreeConfig::builder()
            .max_level(2)
            .pool(PoolPreset::Basic)
            .build()
            .unwrap();
        let (model, _) = TreeModel::fit(&config, examples).unwrap();

        let narrow = Examples::from_rows(&[vec![1, 2, 3]]).unwrap();
        assert!(matches!(
            model.check_features(&narrow),
            Err(ModelError::FeatureMismatch { expected: 64, actual: 2 })
        ));
    }
}
