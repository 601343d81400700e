//! Tree training.
//!
//! - [`AnswerCache`]: every predicate's answer for every example, computed once
//! - [`find_best_split`]: entropy-minimizing predicate for a set of examples
//! - [`BuildingTree`]: arena tree with irrevocable leaf splits
//! - [`TreeGrower`]: best-first growth driven by a max-heap on gain
//! - [`schedule`]: doubling growth schedule and level selection
//! - [`TreeTrainer`]: exploration, selection and final retrain
//! - [`TrainingLogger`]: progress output gated by [`Verbosity`]

mod building;
mod cache;
mod grower;
mod logger;
pub mod schedule;
mod split;
mod trainer;
mod usage;

pub use building::{BuildingNode, BuildingTree, Split};
pub use cache::AnswerCache;
pub use grower::{LeafCandidate, StepOutcome, TreeGrower};
pub use logger::{TrainingLogger, Verbosity};
pub use schedule::{Exploration, LevelReport};
pub use split::{LabelHistogram, SplitCandidate, find_best_split};
pub use trainer::{MAX_LEVEL, TrainOutput, TrainerParams, TreeTrainer};
pub use usage::PredicateUsage;

use crate::data::DataError;
use crate::predicate::PoolError;

/// Errors that abort a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("invalid predicate pool: {0}")]
    Pool(#[from] PoolError),

    #[error("invalid training data: {0}")]
    Data(#[from] DataError),

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("validation set is empty")]
    EmptyValidationSet,

    #[error("max level {0} is outside [1, 15]")]
    InvalidMaxLevel(u32),
}
