//! Conversion between runtime types and schema types.
//!
//! Runtime to schema is infallible (`From`); schema to runtime validates
//! (`TryFrom`) since files may be hand-edited or corrupt.

use super::error::ReadError;
use super::schema::{
    AxisSchema, ModelMetaSchema, PredicateSchema, RegionSchema, SCHEMA_VERSION, TreeModelSchema,
    TreeSchema,
};
use crate::model::{ModelMeta, TreeModel};
use crate::predicate::{Axis, PoolPreset, Predicate, PredicateId, PredicatePool, Region};
use crate::repr::Tree;

// =============================================================================
// Predicates
// =============================================================================

impl From<Region> for RegionSchema {
    fn from(r: Region) -> Self {
        Self {
            top: r.top,
            left: r.left,
            height: r.height,
            width: r.width,
            stride: r.stride,
        }
    }
}

impl From<RegionSchema> for Region {
    fn from(r: RegionSchema) -> Self {
        Self {
            top: r.top,
            left: r.left,
            height: r.height,
            width: r.width,
            stride: r.stride,
        }
    }
}

impl From<Axis> for AxisSchema {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Row => Self::Row,
            Axis::Column => Self::Column,
        }
    }
}

impl From<AxisSchema> for Axis {
    fn from(axis: AxisSchema) -> Self {
        match axis {
            AxisSchema::Row => Self::Row,
            AxisSchema::Column => Self::Column,
        }
    }
}

impl From<&Predicate> for PredicateSchema {
    fn from(p: &Predicate) -> Self {
        match *p {
            Predicate::PixelThreshold { pixel, threshold } => Self::PixelThreshold { pixel, threshold },
            Predicate::PixelBlock {
                region,
                min_dark,
                threshold,
            } => Self::PixelBlock {
                region: region.into(),
                min_dark,
                threshold,
            },
            Predicate::Rectangle {
                region,
                min_dark,
                threshold,
            } => Self::Rectangle {
                region: region.into(),
                min_dark,
                threshold,
            },
            Predicate::LineColumn {
                axis,
                line,
                width,
                min_dark,
                threshold,
            } => Self::LineColumn {
                axis: axis.into(),
                line,
                width,
                min_dark,
                threshold,
            },
            Predicate::DarkPixels {
                min_dark,
                threshold,
            } => Self::DarkPixels {
                min_dark,
                threshold,
            },
        }
    }
}

impl From<PredicateSchema> for Predicate {
    fn from(p: PredicateSchema) -> Self {
        match p {
            PredicateSchema::PixelThreshold { pixel, threshold } => Self::PixelThreshold { pixel, threshold },
            PredicateSchema::PixelBlock {
                region,
                min_dark,
                threshold,
            } => Self::PixelBlock {
                region: region.into(),
                min_dark,
                threshold,
            },
            PredicateSchema::Rectangle {
                region,
                min_dark,
                threshold,
            } => Self::Rectangle {
                region: region.into(),
                min_dark,
                threshold,
            },
            PredicateSchema::LineColumn {
                axis,
                line,
                width,
                min_dark,
                threshold,
            } => Self::LineColumn {
                axis: axis.into(),
                line,
                width,
                min_dark,
                threshold,
            },
            PredicateSchema::DarkPixels {
                min_dark,
                threshold,
            } => Self::DarkPixels {
                min_dark,
                threshold,
            },
        }
    }
}

// =============================================================================
// Tree
// =============================================================================

impl From<&Tree> for TreeSchema {
    fn from(tree: &Tree) -> Self {
        Self {
            num_nodes: tree.labels().len() as u32,
            split_predicates: tree.split_predicates().iter().map(|p| p.0).collect(),
            children_left: tree.left_children().to_vec(),
            children_right: tree.right_children().to_vec(),
            is_leaf: tree.leaf_flags().to_vec(),
            labels: tree.labels().to_vec(),
            counts: tree.counts().to_vec(),
        }
    }
}

impl TryFrom<TreeSchema> for Tree {
    type Error = ReadError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        if schema.num_nodes as usize != schema.is_leaf.len() {
            return Err(ReadError::HeaderMismatch {
                field: "num_nodes",
                header: schema.num_nodes as usize,
                payload: schema.is_leaf.len(),
            });
        }
        let tree = Tree::from_parts(
            schema.split_predicates.into_iter().map(PredicateId).collect(),
            schema.children_left,
            schema.children_right,
            schema.is_leaf,
            schema.labels,
            schema.counts,
        )?;
        Ok(tree)
    }
}

// =============================================================================
// Model
// =============================================================================

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        Self {
            num_features: meta.n_features,
            pool_preset: meta.pool_preset.map(|p| p.name().to_string()),
            best_level: meta.best_level,
            num_training_examples: meta.n_training_examples,
        }
    }
}

impl From<ModelMetaSchema> for ModelMeta {
    fn from(schema: ModelMetaSchema) -> Self {
        Self {
            n_features: schema.num_features,
            // Unknown preset names only lose provenance, not behavior.
            pool_preset: schema
                .pool_preset
                .and_then(|name| name.parse::<PoolPreset>().ok()),
            best_level: schema.best_level,
            n_training_examples: schema.num_training_examples,
        }
    }
}

impl From<&TreeModel> for TreeModelSchema {
    fn from(model: &TreeModel) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            meta: model.meta().into(),
            predicates: model.pool().as_slice().iter().map(PredicateSchema::from).collect(),
            tree: model.tree().into(),
        }
    }
}

impl TryFrom<TreeModelSchema> for TreeModel {
    type Error = ReadError;

    fn try_from(schema: TreeModelSchema) -> Result<Self, Self::Error> {
        if schema.schema_version > SCHEMA_VERSION {
            return Err(ReadError::UnsupportedSchema {
                found: schema.schema_version,
                supported: SCHEMA_VERSION,
            });
        }

        let pool = PredicatePool::new(schema.predicates.into_iter().map(Predicate::from).collect())?;
        let tree = Tree::try_from(schema.tree)?;
        let meta = ModelMeta::from(schema.meta);

        tree.validate_predicates(pool.len())?;
        pool.validate_for(meta.n_features)?;

        Ok(TreeModel::from_validated(tree, pool, meta))
    }
}
