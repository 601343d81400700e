//! Labeled example storage and loading.
//!
//! - [`Examples`]: Immutable labeled rows (label + integer features)
//! - [`read_csv`]: Load `label,feature,...` rows from a delimited file
//! - [`DataError`]: Loading and validation errors

mod csv;
mod error;
mod examples;

pub use csv::{CsvOptions, read_csv, read_csv_from};
pub use error::DataError;
pub use examples::Examples;
