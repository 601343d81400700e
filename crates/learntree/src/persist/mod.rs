//! Model persistence.
//!
//! Two encodings of the same [`TreeModelSchema`]:
//!
//! - JSON, human-readable, chosen for paths ending in `.json`
//! - binary (`.tree`): a checksummed header followed by a postcard payload
//!
//! ```ignore
//! model.save("digits.tree")?;
//! let model = TreeModel::load("digits.tree")?;
//! let json = persist::to_json_string(&model)?;
//! ```

mod convert;
mod error;
pub mod native;
mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub use error::{ReadError, WriteError};
pub use native::{DeserializeError, FormatHeader, NativeCodec, SerializeError};
pub use schema::{
    AxisSchema, ModelMetaSchema, PredicateSchema, RegionSchema, SCHEMA_VERSION, TreeModelSchema,
    TreeSchema,
};

use crate::model::TreeModel;

/// On-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Binary,
}

impl Format {
    /// `.json` (any case) selects JSON; everything else is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Binary,
        }
    }
}

// =============================================================================
// JSON
// =============================================================================

/// Pretty-printed JSON document for `model`.
pub fn to_json_string(model: &TreeModel) -> Result<String, WriteError> {
    Ok(serde_json::to_string_pretty(&TreeModelSchema::from(model))?)
}

/// Parse and validate a JSON document.
pub fn from_json_str(json: &str) -> Result<TreeModel, ReadError> {
    let schema: TreeModelSchema = serde_json::from_str(json)?;
    TreeModel::try_from(schema)
}

// =============================================================================
// Binary
// =============================================================================

/// Binary encoding of `model`, header included.
pub fn to_bytes(model: &TreeModel) -> Result<Vec<u8>, WriteError> {
    let schema = TreeModelSchema::from(model);
    let header = FormatHeader::new(
        schema.meta.num_features as u32,
        schema.tree.num_nodes,
        schema.predicates.len() as u32,
    );
    Ok(NativeCodec::new().serialize(header, &schema)?)
}

/// Decode and validate a binary model.
pub fn from_bytes(bytes: &[u8]) -> Result<TreeModel, ReadError> {
    let (header, schema): (_, TreeModelSchema) = NativeCodec::new().deserialize(bytes)?;
    check_header(&header, &schema)?;
    TreeModel::try_from(schema)
}

fn check_header(header: &FormatHeader, schema: &TreeModelSchema) -> Result<(), ReadError> {
    let pairs = [
        ("num_features", header.num_features as usize, schema.meta.num_features),
        ("num_nodes", header.num_nodes as usize, schema.tree.num_nodes as usize),
        ("num_predicates", header.num_predicates as usize, schema.predicates.len()),
    ];
    for (field, header, payload) in pairs {
        if header != payload {
            return Err(ReadError::HeaderMismatch {
                field,
                header,
                payload,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Files
// =============================================================================

/// Write `model` to `path`, encoding chosen by [`Format::from_path`].
pub fn save_model<P: AsRef<Path>>(model: &TreeModel, path: P) -> Result<(), WriteError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    match Format::from_path(path) {
        Format::Json => serde_json::to_writer_pretty(&mut writer, &TreeModelSchema::from(model))?,
        Format::Binary => writer.write_all(&to_bytes(model)?)?,
    }
    writer.flush()?;
    Ok(())
}

/// Read a model written by [`save_model`].
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TreeModel, ReadError> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Format::Json => {
            let schema: TreeModelSchema = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            TreeModel::try_from(schema)
        }
        Format::Binary => from_bytes(&std::fs::read(path)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelMeta;
    use crate::predicate::{Predicate, PredicateId, PredicatePool};
    use crate::repr::Tree;

    fn stump() -> TreeModel {
        let pool = PredicatePool::new(vec![Predicate::PixelThreshold {
            pixel: 3,
            threshold: 25,
        }])
        .unwrap();
        let tree = Tree::from_parts(
            vec![PredicateId(0); 3],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![false, true, true],
            vec![7, 7, 1],
            vec![10, 6, 4],
        )
        .unwrap();
        TreeModel::from_parts(tree, pool, ModelMeta::new(4)).unwrap()
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("m.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("m.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("m.tree")), Format::Binary);
        assert_eq!(Format::from_path(Path::new("model")), Format::Binary);
    }

    #[test]
    fn json_roundtrip() {
        let model = stump();
        let json = to_json_string(&model).unwrap();
        assert!(json.contains("\"pixel_threshold\""));
        assert_eq!(from_json_str(&json).unwrap(), model);
    }

    #[test]
    fn binary_roundtrip() {
        let model = stump();
        let bytes = to_bytes(&model).unwrap();
        assert_eq!(&bytes[..4], b"LTRE");
        assert_eq!(from_bytes(&bytes).unwrap(), model);
    }

    #[test]
    fn binary_header_must_match_payload() {
        let model = stump();
        let schema = TreeModelSchema::from(&model);
        let bytes = NativeCodec::new()
            .serialize(FormatHeader::new(4, 5, 1), &schema)
            .unwrap();
        assert!(matches!(
            from_bytes(&bytes),
            Err(ReadError::HeaderMismatch {
                field: "num_nodes",
                header: 5,
                payload: 3
            })
        ));
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(from_json_str("{\"tree\": 1}"), Err(ReadError::Json(_))));
    }
}
