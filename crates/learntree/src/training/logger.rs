//! Training progress logging gated by verbosity.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::schedule::LevelReport;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Warnings only.
    Warning,
    /// Per-level progress.
    Info,
    /// Per-step detail.
    Debug,
}

/// Emits training progress through the `log` facade.
///
/// Messages below the configured verbosity are dropped before they reach
/// the logger, so a silent trainer stays silent even with `RUST_LOG=debug`.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl TrainingLogger {
    /// Create a logger.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
        }
    }

    /// Configured verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[inline]
    fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    /// Mark the start of training.
    pub fn start_training(&mut self, n_training: usize, n_validation: usize, n_predicates: usize) {
        self.started = Some(Instant::now());
        if self.enabled(Verbosity::Info) {
            log::info!(
                "training on {n_training} examples ({n_validation} held out) with {n_predicates} predicates"
            );
        }
    }

    /// Answer cache construction finished.
    pub fn log_cache_built(&self, n_examples: usize, n_predicates: usize, bytes: usize) {
        if self.enabled(Verbosity::Debug) {
            log::debug!(
                "answer cache: {n_examples} examples x {n_predicates} predicates ({:.1} MiB)",
                bytes as f64 / (1024.0 * 1024.0)
            );
        }
    }

    /// One exploration level was scored.
    pub fn log_level(&self, report: &LevelReport) {
        if self.enabled(Verbosity::Info) {
            log::info!(
                "level {:>2}: {:>6} steps, {:>6} internal nodes, validation accuracy {:.4}",
                report.level,
                report.cumulative_steps,
                report.internal_nodes,
                report.validation_accuracy
            );
        }
    }

    /// One growth step.
    pub fn log_step(&self, step: u64, outcome: &str, total_weighted_entropy: f64) {
        if self.enabled(Verbosity::Debug) {
            log::debug!("step {step}: {outcome} (weighted entropy {total_weighted_entropy:.3})");
        }
    }

    /// The selected level.
    pub fn log_selection(&self, level: u32, accuracy: f64, steps: u64) {
        if self.enabled(Verbosity::Info) {
            log::info!("selected level {level} (validation accuracy {accuracy:.4}); retraining with {steps} steps");
        }
    }

    /// Growth stopped before reaching the requested step count.
    pub fn warn_exhausted(&self, phase: &str, performed: u64, requested: u64) {
        if self.enabled(Verbosity::Warning) {
            log::warn!(
                "{phase}: no splittable leaves left after {performed} of {requested} steps"
            );
        }
    }

    /// Mark the end of training.
    pub fn finish_training(&self, internal_nodes: usize) {
        if self.enabled(Verbosity::Info) {
            let elapsed = self.started.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0);
            log::info!("training finished: {internal_nodes} internal nodes in {elapsed:.2}s");
        }
    }
}
