//! learntree: greedy entropy-guided decision trees over integer feature vectors.
//!
//! Trees are grown best-first from a fixed pool of boolean predicates over
//! labeled images, sized on a held-out validation set, and then retrained once
//! on all data at the chosen size.
//!
//! # Key Types
//!
//! - [`TreeModel`] - High-level model with fit/predict/save/load
//! - [`TreeConfig`] - Configuration builder
//! - [`Examples`] - Labeled feature rows
//! - [`Predicate`] / [`PredicatePool`] - Candidate split tests
//! - [`Tree`] - Frozen decision tree
//!
//! # Training
//!
//! Use `TreeConfig::builder()` to configure, then `TreeModel::fit()`.
//! The lower-level pieces (answer cache, tree grower, size selection) live in
//! the [`training`] module.
//!
//! # Example
//!
//! ```
//! use learntree::testing::synthetic_digits;
//! use learntree::{PoolPreset, TreeConfig, TreeModel};
//!
//! let examples = synthetic_digits(200, 7);
//! let config = TreeConfig::builder()
//!     .max_level(4)
//!     .validation_percent(20)
//!     .pool(PoolPreset::Basic)
//!     .build()
//!     .unwrap();
//!
//! let (model, report) = TreeModel::fit(&config, examples.clone()).unwrap();
//! assert!(report.best_level <= 4);
//! assert!(model.accuracy(&examples) > 0.5);
//! ```

pub mod data;
pub mod explainability;
pub mod inference;
pub mod model;
pub mod persist;
pub mod predicate;
pub mod repr;
pub mod testing;
pub mod training;

/// Number of class labels (digits 0-9).
pub const NUM_CLASSES: usize = 10;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{ConfigError, ModelError, ModelMeta, TrainReport, TreeConfig, TreeModel};

// Data types
pub use data::{CsvOptions, DataError, Examples, read_csv};

// Predicates
pub use predicate::{ImageShape, PoolError, PoolPreset, Predicate, PredicateId, PredicateKind, PredicatePool};

// Trees and inference
pub use inference::Predictor;
pub use repr::{NodeId, Tree, TreeView};

// Training
pub use training::{TrainingError, TrainingLogger, Verbosity};
