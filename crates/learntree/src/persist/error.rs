//! Persistence error types.

use thiserror::Error;

use super::native::{DeserializeError, SerializeError};
use crate::predicate::PoolError;
use crate::repr::TreeValidationError;

/// Errors raised while writing a model.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Native(#[from] SerializeError),
}

/// Errors raised while reading a model.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Native(#[from] DeserializeError),

    #[error("unsupported schema version {found} (this build reads up to {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeValidationError),

    #[error("invalid predicates: {0}")]
    InvalidPool(#[from] PoolError),

    #[error("header says {header}, payload says {payload} for {field}")]
    HeaderMismatch {
        field: &'static str,
        header: usize,
        payload: usize,
    },
}
