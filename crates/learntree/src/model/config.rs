//! High-level tree configuration with builder pattern.
//!
//! # Example
//!
//! ```
//! use learntree::{PoolPreset, TreeConfig, Verbosity};
//!
//! // All defaults
//! let config = TreeConfig::builder().build().unwrap();
//! assert_eq!(config.max_level, 10);
//!
//! let config = TreeConfig::builder()
//!     .max_level(12)
//!     .validation_percent(10)
//!     .pool(PoolPreset::Extended)
//!     .verbosity(Verbosity::Info)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use crate::predicate::PoolPreset;
use crate::training::{MAX_LEVEL, TrainerParams, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Max level must be in `[1, 15]`.
    InvalidMaxLevel(u32),
    /// Validation percentage must be in `[1, 99]`.
    InvalidValidationPercent(u8),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMaxLevel(v) => {
                write!(f, "max_level must be in [1, {}], got {}", MAX_LEVEL, v)
            }
            Self::InvalidValidationPercent(v) => {
                write!(f, "validation_percent must be in [1, 99], got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// TreeConfig
// =============================================================================

/// Configuration for training a [`TreeModel`](super::TreeModel).
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct TreeConfig {
    /// Highest exploration level. The tree at level `L` has taken `2^L`
    /// growth steps. Default: 10.
    #[builder(default = 10)]
    pub max_level: u32,

    /// Percentage of examples held out to choose the tree size. Default: 15.
    #[builder(default = 15)]
    pub validation_percent: u8,

    /// Seed for the training/validation shuffle. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Candidate predicate families. Default: `Standard`.
    #[builder(default)]
    pub pool: PoolPreset,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: tree_config_builder::IsComplete> TreeConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_level` is outside `[1, 15]` or
    /// `validation_percent` is outside `[1, 99]`.
    pub fn build(self) -> Result<TreeConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl TreeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LEVEL).contains(&self.max_level) {
            return Err(ConfigError::InvalidMaxLevel(self.max_level));
        }
        if !(1..=99).contains(&self.validation_percent) {
            return Err(ConfigError::InvalidValidationPercent(self.validation_percent));
        }
        Ok(())
    }

    /// Lower-level trainer parameters.
    pub fn to_trainer_params(&self) -> TrainerParams {
        TrainerParams {
            max_level: self.max_level,
            verbosity: self.verbosity,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.max_level, 10);
        assert_eq!(config.validation_percent, 15);
        assert_eq!(config.seed, 42);
        assert_eq!(config.pool, PoolPreset::Standard);
        assert_eq!(config.verbosity, Verbosity::Silent);
    }

    #[rstest]
    #[case(0, 15, Some(ConfigError::InvalidMaxLevel(0)))]
    #[case(16, 15, Some(ConfigError::InvalidMaxLevel(16)))]
    #[case(1, 15, None)]
    #[case(15, 15, None)]
    #[case(5, 0, Some(ConfigError::InvalidValidationPercent(0)))]
    #[case(5, 100, Some(ConfigError::InvalidValidationPercent(100)))]
    #[case(5, 1, None)]
    #[case(5, 99, None)]
    fn validation(#[case] max_level: u32, #[case] percent: u8, #[case] expected: Option<ConfigError>) {
        let result = TreeConfig::builder()
            .max_level(max_level)
            .validation_percent(percent)
            .build();
        assert_eq!(result.err(), expected);
    }

    #[test]
    fn trainer_params_follow_config() {
        let config = TreeConfig::builder()
            .max_level(7)
            .verbosity(Verbosity::Debug)
            .build()
            .unwrap();
        let params = config.to_trainer_params();
        assert_eq!(params.max_level, 7);
        assert_eq!(params.verbosity, Verbosity::Debug);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::InvalidValidationPercent(0).to_string(),
            "validation_percent must be in [1, 99], got 0"
        );
    }
}
