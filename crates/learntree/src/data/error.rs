//! Errors raised while loading or reshaping labeled examples.

use thiserror::Error;

/// Errors that can occur when building, loading, or splitting [`Examples`].
///
/// [`Examples`]: super::Examples
#[derive(Debug, Error)]
pub enum DataError {
    /// I/O error while reading a data file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited input.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// A field could not be parsed as an integer.
    #[error("line {line}, column {column}: cannot parse {value:?} as an integer")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },

    /// A row has no label column.
    #[error("row {row} is empty")]
    EmptyRow { row: usize },

    /// Rows have differing lengths.
    #[error("row {row} has {actual} features, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Label outside `0..NUM_CLASSES`.
    #[error("row {row} has label {label}, expected 0..{n_classes}")]
    LabelOutOfRange {
        row: usize,
        label: i64,
        n_classes: usize,
    },

    /// Labels and feature rows disagree in count.
    #[error("{labels} labels for {rows} feature rows")]
    LengthMismatch { labels: usize, rows: usize },

    /// Two example sets have different feature widths.
    #[error("feature width mismatch: expected {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Validation percentage outside `[1, 99]`.
    #[error("validation percentage must be in [1, 99], got {0}")]
    InvalidValidationPercent(u8),

    /// A split left one side without any rows.
    #[error("splitting {n_examples} examples at {percent}% leaves the {side} set empty")]
    EmptySplit {
        n_examples: usize,
        percent: u8,
        side: &'static str,
    },
}
