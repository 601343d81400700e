//! Immutable labeled example storage.

use ndarray::{Array2, ArrayView1, Axis, concatenate};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::DataError;
use crate::NUM_CLASSES;

// =============================================================================
// Examples
// =============================================================================

/// A set of labeled examples.
///
/// Each example is a class label in `0..NUM_CLASSES` plus a fixed-width row of
/// integer feature values (pixel intensities for image data). Features are
/// stored row-major as `[n_examples, n_features]`.
///
/// Examples are addressed by their row index. When a training and a validation
/// set are used together (see [`AnswerCache`]), the validation rows follow the
/// training rows in one global index space.
///
/// [`AnswerCache`]: crate::training::AnswerCache
#[derive(Debug, Clone, PartialEq)]
pub struct Examples {
    labels: Vec<u8>,
    features: Array2<i32>,
}

impl Examples {
    /// Create examples from labels and a `[n_examples, n_features]` matrix.
    ///
    /// # Errors
    ///
    /// - [`DataError::LengthMismatch`] if the label count differs from the row count
    /// - [`DataError::LabelOutOfRange`] if a label is not a valid class
    pub fn new(labels: Vec<u8>, features: Array2<i32>) -> Result<Self, DataError> {
        if labels.len() != features.nrows() {
            return Err(DataError::LengthMismatch {
                labels: labels.len(),
                rows: features.nrows(),
            });
        }
        if let Some((row, &label)) = labels
            .iter()
            .enumerate()
            .find(|&(_, &label)| label as usize >= NUM_CLASSES)
        {
            return Err(DataError::LabelOutOfRange {
                row,
                label: label as i64,
                n_classes: NUM_CLASSES,
            });
        }

        // Keep rows contiguous so `row_slice` is always available.
        let features = if features.is_standard_layout() {
            features
        } else {
            features.as_standard_layout().into_owned()
        };

        Ok(Self { labels, features })
    }

    /// Create examples from `[label, feature, ...]` rows.
    ///
    /// All rows must have the same length and at least a label column.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self, DataError> {
        let Some(first) = rows.first() else {
            return Self::new(Vec::new(), Array2::zeros((0, 0)));
        };
        let width = first.as_ref().len();
        if width == 0 {
            return Err(DataError::EmptyRow { row: 0 });
        }
        let n_features = width - 1;

        let mut labels = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len() * n_features);
        for (row, raw) in rows.iter().enumerate() {
            let raw = raw.as_ref();
            if raw.is_empty() {
                return Err(DataError::EmptyRow { row });
            }
            if raw.len() != width {
                return Err(DataError::Ragged {
                    row,
                    expected: n_features,
                    actual: raw.len().saturating_sub(1),
                });
            }
            let label = raw[0];
            if label < 0 || label as usize >= NUM_CLASSES {
                return Err(DataError::LabelOutOfRange {
                    row,
                    label: label as i64,
                    n_classes: NUM_CLASSES,
                });
            }
            labels.push(label as u8);
            values.extend_from_slice(&raw[1..]);
        }

        let features = Array2::from_shape_vec((rows.len(), n_features), values)
            .expect("row count and width were checked above");
        Self::new(labels, features)
    }

    /// Number of examples.
    #[inline]
    pub fn n_examples(&self) -> usize {
        self.labels.len()
    }

    /// Number of feature columns per example.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Returns true if there are no examples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels in row order.
    #[inline]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Label of one example.
    #[inline]
    pub fn label(&self, row: usize) -> u8 {
        self.labels[row]
    }

    /// Feature view of one example.
    #[inline]
    pub fn row(&self, row: usize) -> ArrayView1<'_, i32> {
        self.features.row(row)
    }

    /// Feature values of one example as a contiguous slice.
    #[inline]
    pub fn row_slice(&self, row: usize) -> &[i32] {
        let n_features = self.n_features();
        let start = row * n_features;
        &self
            .features
            .as_slice()
            .expect("features are kept in standard layout")[start..start + n_features]
    }

    /// Iterate over `(label, features)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[i32])> + '_ {
        (0..self.n_examples()).map(move |row| (self.labels[row], self.row_slice(row)))
    }

    /// The full feature matrix.
    pub fn features(&self) -> &Array2<i32> {
        &self.features
    }

    /// Select a subset of rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
            features: self.features.select(Axis(0), rows),
        }
    }

    /// Append `other` after `self`.
    ///
    /// Used to merge training and validation rows for the final retrain; the
    /// result keeps the training rows first so global indices stay aligned
    /// with the answer cache.
    pub fn concat(&self, other: &Examples) -> Result<Self, DataError> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.n_features() != other.n_features() {
            return Err(DataError::FeatureMismatch {
                expected: self.n_features(),
                actual: other.n_features(),
            });
        }

        let features = concatenate(Axis(0), &[self.features.view(), other.features.view()])
            .expect("feature widths were checked above");
        let mut labels = self.labels.clone();
        labels.extend_from_slice(&other.labels);
        Ok(Self { labels, features })
    }

    /// Shuffle and split into `(training, validation)`.
    ///
    /// The validation set receives `floor(percent * n / 100)` rows. The shuffle
    /// is seeded, so the same seed always yields the same split.
    ///
    /// # Errors
    ///
    /// - [`DataError::InvalidValidationPercent`] if `percent` is not in `[1, 99]`
    /// - [`DataError::EmptySplit`] if either side would be empty
    pub fn split_validation(&self, percent: u8, seed: u64) -> Result<(Self, Self), DataError> {
        if !(1..=99).contains(&percent) {
            return Err(DataError::InvalidValidationPercent(percent));
        }

        let n = self.n_examples();
        let n_validation = percent as usize * n / 100;
        let empty_side = if n_validation == 0 {
            Some("validation")
        } else if n_validation == n {
            Some("training")
        } else {
            None
        };
        if let Some(side) = empty_side {
            return Err(DataError::EmptySplit {
                n_examples: n,
                percent,
                side,
            });
        }

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let n_training = n - n_validation;
        let training = self.select(&order[..n_training]);
        let validation = self.select(&order[n_training..]);
        Ok((training, validation))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Examples {
        Examples::from_rows(&[
            vec![0, 1, 2, 3],
            vec![1, 4, 5, 6],
            vec![2, 7, 8, 9],
            vec![3, 10, 11, 12],
        ])
        .unwrap()
    }

    #[test]
    fn from_rows_splits_label_column() {
        let ex = small();
        assert_eq!(ex.n_examples(), 4);
        assert_eq!(ex.n_features(), 3);
        assert_eq!(ex.labels(), &[0, 1, 2, 3]);
        assert_eq!(ex.row_slice(2), &[7, 8, 9]);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = Examples::from_rows(&[vec![0, 1, 2], vec![1, 3]]).unwrap_err();
        assert!(matches!(
            err,
            DataError::Ragged {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn from_rows_rejects_bad_label() {
        let err = Examples::from_rows(&[vec![10, 1]]).unwrap_err();
        assert!(matches!(err, DataError::LabelOutOfRange { label: 10, .. }));

        let err = Examples::from_rows(&[vec![-1, 1]]).unwrap_err();
        assert!(matches!(err, DataError::LabelOutOfRange { label: -1, .. }));
    }

    #[test]
    fn concat_keeps_order() {
        let ex = small();
        let merged = ex.concat(&ex.select(&[3])).unwrap();
        assert_eq!(merged.n_examples(), 5);
        assert_eq!(merged.label(4), 3);
        assert_eq!(merged.row_slice(4), &[10, 11, 12]);
    }

    #[test]
    fn concat_rejects_width_mismatch() {
        let other = Examples::from_rows(&[vec![0, 1]]).unwrap();
        assert!(matches!(
            small().concat(&other),
            Err(DataError::FeatureMismatch {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn split_validation_is_seeded_partition() {
        let rows: Vec<Vec<i32>> = (0..100).map(|i| vec![i % 10, i]).collect();
        let ex = Examples::from_rows(&rows).unwrap();

        let (train, valid) = ex.split_validation(15, 3).unwrap();
        assert_eq!(train.n_examples(), 85);
        assert_eq!(valid.n_examples(), 15);

        let mut seen: Vec<i32> = train.iter().chain(valid.iter()).map(|(_, f)| f[0]).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());

        let (train_again, _) = ex.split_validation(15, 3).unwrap();
        assert_eq!(train, train_again);
    }

    #[test]
    fn split_validation_rejects_degenerate() {
        let ex = small();
        assert!(matches!(
            ex.split_validation(0, 1),
            Err(DataError::InvalidValidationPercent(0))
        ));
        assert!(matches!(
            ex.split_validation(10, 1),
            Err(DataError::EmptySplit {
                side: "validation",
                ..
            })
        ));
    }
}
