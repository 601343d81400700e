//! Stable serialization schema.
//!
//! Schema types mirror the runtime types but are versioned independently so
//! the on-disk layout does not change when runtime types do. The same types
//! back both the JSON and the binary (postcard) encodings, so they avoid
//! self-describing serde features such as internally tagged enums.

use serde::{Deserialize, Serialize};

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Top-level persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeModelSchema {
    /// Schema version the file was written with.
    pub schema_version: u32,
    /// Model metadata.
    pub meta: ModelMetaSchema,
    /// Predicates referenced by the tree, indexed by position.
    pub predicates: Vec<PredicateSchema>,
    /// Tree topology.
    pub tree: TreeSchema,
}

/// Model metadata schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    /// Number of features.
    pub num_features: usize,
    /// Pool preset name, if the pool came from one.
    #[serde(default)]
    pub pool_preset: Option<String>,
    /// Chosen exploration level.
    #[serde(default)]
    pub best_level: Option<u32>,
    /// Examples the final tree was grown on.
    #[serde(default)]
    pub num_training_examples: usize,
}

/// Predicate schema (stable serialization format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateSchema {
    PixelThreshold {
        pixel: u32,
        threshold: i32,
    },
    PixelBlock {
        region: RegionSchema,
        min_dark: u32,
        threshold: i32,
    },
    Rectangle {
        region: RegionSchema,
        min_dark: u32,
        threshold: i32,
    },
    LineColumn {
        axis: AxisSchema,
        line: u16,
        width: u16,
        min_dark: u32,
        threshold: i32,
    },
    DarkPixels {
        min_dark: u32,
        threshold: i32,
    },
}

/// Image region schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSchema {
    pub top: u16,
    pub left: u16,
    pub height: u16,
    pub width: u16,
    pub stride: u16,
}

/// Line orientation schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSchema {
    Row,
    Column,
}

/// Tree schema: one entry per node, root first.
///
/// For leaves, `split_predicates`, `children_left` and `children_right` hold 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSchema {
    /// Number of nodes (internal + leaves).
    pub num_nodes: u32,
    /// Predicate tested at each node.
    pub split_predicates: Vec<u32>,
    /// Child taken on "yes".
    pub children_left: Vec<u32>,
    /// Child taken on "no".
    pub children_right: Vec<u32>,
    /// Leaf flag per node.
    pub is_leaf: Vec<bool>,
    /// Majority label per node.
    pub labels: Vec<u8>,
    /// Training examples that reached each node.
    pub counts: Vec<u32>,
}
