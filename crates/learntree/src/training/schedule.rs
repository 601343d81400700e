//! Doubling growth schedule and validation-guided level selection.
//!
//! Exploration grows one tree in stages. Level 0 takes one step; level `L`
//! then adds `2^(L-1)` more, so the tree at level `L` has seen `2^L` steps in
//! total. Each level is scored on held-out data and the best one decides how
//! many steps the final tree gets.

use serde::{Deserialize, Serialize};

/// Steps added when moving to `level`.
#[inline]
pub fn steps_at_level(level: u32) -> u64 {
    if level == 0 { 1 } else { 1u64 << (level - 1) }
}

/// Total steps taken once `level` is reached.
#[inline]
pub fn cumulative_steps(level: u32) -> u64 {
    1u64 << level
}

/// Score of one exploration level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    /// Level index.
    pub level: u32,
    /// Step calls made so far.
    pub cumulative_steps: u64,
    /// Internal nodes of the exploration tree at this level.
    pub internal_nodes: usize,
    /// Sum of leaf weighted entropies over the training examples.
    pub total_weighted_entropy: f64,
    /// Fraction of validation examples classified correctly.
    pub validation_accuracy: f64,
}

/// Pick the level with the highest validation accuracy.
///
/// The first (lowest) level wins ties; NaN scores never win. Returns `None`
/// for an empty slice.
pub fn select_level(reports: &[LevelReport]) -> Option<&LevelReport> {
    let mut best: Option<&LevelReport> = None;
    for report in reports {
        let better = match best {
            None => !report.validation_accuracy.is_nan(),
            Some(b) => report.validation_accuracy > b.validation_accuracy,
        };
        if better {
            best = Some(report);
        }
    }
    best.or(reports.first())
}

/// All level scores of an exploration run plus the chosen level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    /// One report per level, in level order.
    pub levels: Vec<LevelReport>,
    /// Chosen level.
    pub best_level: u32,
    /// Validation accuracy at the chosen level.
    pub best_accuracy: f64,
}

impl Exploration {
    /// Select the best level from a non-empty set of reports.
    pub fn from_reports(levels: Vec<LevelReport>) -> Option<Self> {
        let best = *select_level(&levels)?;
        Some(Self {
            levels,
            best_level: best.level,
            best_accuracy: best.validation_accuracy,
        })
    }

    /// Steps the final retrain must take.
    pub fn final_steps(&self) -> u64 {
        cumulative_steps(self.best_level)
    }
}
