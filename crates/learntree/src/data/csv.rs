//! Delimited-text loading of `label,feature,...` rows.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Trim};

use super::{DataError, Examples};

/// Options for reading delimited example files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Whether the first line is a header to skip (MNIST CSV exports have one).
    pub has_header: bool,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
        }
    }
}

impl CsvOptions {
    /// Options for files without a header line.
    pub fn headerless() -> Self {
        Self {
            has_header: false,
            ..Self::default()
        }
    }
}

/// Read labeled examples from a delimited file.
///
/// Each record is `label, feature_0, feature_1, ...`.
pub fn read_csv<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Examples, DataError> {
    let file = File::open(path.as_ref())?;
    read_csv_from(file, options)
}

/// Read labeled examples from any reader.
pub fn read_csv_from<R: Read>(reader: R, options: CsvOptions) -> Result<Examples, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Vec<i32>> = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = record
            .iter()
            .enumerate()
            .map(|(column, field)| {
                field.parse::<i32>().map_err(|_| DataError::Parse {
                    line,
                    column,
                    value: field.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    Examples::from_rows(&rows)
}
