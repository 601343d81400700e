//! Two-phase tree trainer.
//!
//! 1. **Exploration**: grow a tree on the training examples following the
//!    doubling schedule, scoring validation accuracy after every level.
//! 2. **Final retrain**: grow a fresh tree on training and validation
//!    examples together for the number of steps the best level reached.
//!
//! Both phases share one [`AnswerCache`] built over training then validation
//! rows.

use crate::data::Examples;
use crate::predicate::PredicatePool;
use crate::repr::Tree;

use super::TrainingError;
use super::cache::AnswerCache;
use super::grower::TreeGrower;
use super::logger::{TrainingLogger, Verbosity};
use super::schedule::{Exploration, LevelReport, cumulative_steps, steps_at_level};
use super::usage::PredicateUsage;

/// Largest supported exploration level.
pub const MAX_LEVEL: u32 = 15;

// =============================================================================
// TrainerParams
// =============================================================================

/// Parameters for tree training.
#[derive(Clone, Debug)]
pub struct TrainerParams {
    /// Highest exploration level (inclusive), in `1..=15`.
    pub max_level: u32,
    /// Verbosity level for training output.
    pub verbosity: Verbosity,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            max_level: 10,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// TrainOutput
// =============================================================================

/// Everything produced by one training run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    /// Final tree, grown on training and validation examples.
    pub tree: Tree,
    /// Per-level validation scores and the chosen level.
    pub exploration: Exploration,
    /// Predicate families used by the final tree.
    pub usage: PredicateUsage,
    /// Step calls made by the final retrain.
    pub final_steps: u64,
    /// Splits actually performed by the final retrain.
    pub final_splits: u64,
    /// Leaf weighted entropy of the final tree over all examples.
    pub total_weighted_entropy: f64,
}

// =============================================================================
// TreeTrainer
// =============================================================================

/// Runs exploration, level selection and the final retrain.
#[derive(Debug, Clone, Default)]
pub struct TreeTrainer {
    params: TrainerParams,
}

impl TreeTrainer {
    pub fn new(params: TrainerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainerParams {
        &self.params
    }

    /// Train a tree.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::InvalidMaxLevel`] if `max_level` is outside `1..=15`
    /// - [`TrainingError::EmptyValidationSet`] if `validation` has no rows
    /// - anything [`AnswerCache::build`] rejects
    pub fn train(
        &self,
        pool: &PredicatePool,
        training: &Examples,
        validation: &Examples,
    ) -> Result<TrainOutput, TrainingError> {
        let max_level = self.params.max_level;
        if !(1..=MAX_LEVEL).contains(&max_level) {
            return Err(TrainingError::InvalidMaxLevel(max_level));
        }
        if validation.is_empty() {
            return Err(TrainingError::EmptyValidationSet);
        }

        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(training.n_examples(), validation.n_examples(), pool.len());

        let cache = AnswerCache::build(pool, training, validation)?;
        logger.log_cache_built(cache.n_examples(), cache.n_predicates(), cache.size_bytes());

        let exploration = self.explore(&cache, &logger)?;
        let final_steps = exploration.final_steps();
        logger.log_selection(exploration.best_level, exploration.best_accuracy, final_steps);

        let mut grower = TreeGrower::new(&cache, cache.all_indices().collect());
        let final_splits = grower.grow(final_steps);
        if final_splits < final_steps {
            logger.warn_exhausted("final retrain", final_splits, final_steps);
        }

        let tree = grower.freeze();
        let usage = PredicateUsage::from_tree(&tree, pool);
        logger.finish_training(grower.internal_nodes());

        Ok(TrainOutput {
            tree,
            exploration,
            usage,
            final_steps,
            final_splits,
            total_weighted_entropy: grower.total_weighted_entropy(),
        })
    }

    /// Grow on the training examples level by level, scoring each level on
    /// the validation examples.
    fn explore(
        &self,
        cache: &AnswerCache,
        logger: &TrainingLogger,
    ) -> Result<Exploration, TrainingError> {
        let mut grower = TreeGrower::new(cache, cache.training_indices().collect());
        let mut levels = Vec::with_capacity(self.params.max_level as usize + 1);
        let mut warned = false;

        for level in 0..=self.params.max_level {
            let before = grower.internal_nodes();
            let requested = steps_at_level(level);
            let splits = grower.grow(requested);
            if logger.verbosity() >= Verbosity::Debug {
                logger.log_step(
                    grower.steps(),
                    &format!("{splits} of {requested} steps split (from {before} internal nodes)"),
                    grower.total_weighted_entropy(),
                );
            }
            if splits < requested && !warned {
                logger.warn_exhausted("exploration", grower.internal_nodes() as u64, cumulative_steps(level));
                warned = true;
            }

            let report = LevelReport {
                level,
                cumulative_steps: grower.steps(),
                internal_nodes: grower.internal_nodes(),
                total_weighted_entropy: grower.total_weighted_entropy(),
                validation_accuracy: grower.cache_accuracy(cache.validation_indices()),
            };
            logger.log_level(&report);
            levels.push(report);
        }

        Exploration::from_reports(levels).ok_or(TrainingError::InvalidMaxLevel(self.params.max_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PredicateId};
    use crate::repr::TreeView;

    fn pool() -> PredicatePool {
        PredicatePool::new(vec![
            Predicate::PixelThreshold {
                pixel: 0,
                threshold: 5,
            },
            Predicate::PixelThreshold {
                pixel: 1,
                threshold: 5,
            },
        ])
        .unwrap()
    }

    /// Label is 2*(pixel0 bright) + (pixel1 bright).
    fn quadrant_rows(n: usize) -> Vec<Vec<i32>> {
        (0..n)
            .map(|i| {
                let a = (i % 2) as i32;
                let b = ((i / 2) % 2) as i32;
                vec![2 * a + b, a * 9, b * 9]
            })
            .collect()
    }

    #[test]
    fn learns_two_level_rule() {
        let training = Examples::from_rows(&quadrant_rows(40)).unwrap();
        let validation = Examples::from_rows(&quadrant_rows(12)).unwrap();
        let trainer = TreeTrainer::new(TrainerParams {
            max_level: 3,
            ..Default::default()
        });

        let out = trainer.train(&pool(), &training, &validation).unwrap();
        assert_eq!(out.exploration.levels.len(), 4);
        // Three splits separate the quadrants; level 2 is the first to have them.
        assert_eq!(out.exploration.best_level, 2);
        assert_eq!(out.exploration.best_accuracy, 1.0);
        assert_eq!(out.final_steps, 4);
        assert_eq!(out.final_splits, 3);
        assert_eq!(out.tree.n_internal(), 3);
        assert_eq!(out.usage.internal_nodes(), 3);
        assert_eq!(out.total_weighted_entropy, 0.0);
        assert_eq!(out.tree.split_predicate(0), PredicateId(0));
    }

    #[test]
    fn rejects_bad_params() {
        let training = Examples::from_rows(&quadrant_rows(8)).unwrap();
        let validation = Examples::from_rows(&quadrant_rows(4)).unwrap();
        let empty = Examples::from_rows::<Vec<i32>>(&[]).unwrap();

        for max_level in [0, 16] {
            let trainer = TreeTrainer::new(TrainerParams {
                max_level,
                ..Default::default()
            });
            assert!(matches!(
                trainer.train(&pool(), &training, &validation),
                Err(TrainingError::InvalidMaxLevel(l)) if l == max_level
            ));
        }

        let trainer = TreeTrainer::default();
        assert!(matches!(
            trainer.train(&pool(), &training, &empty),
            Err(TrainingError::EmptyValidationSet)
        ));
    }
}
