//! Precomputed predicate answers.
//!
//! Split selection asks every predicate about every example of a node, over
//! and over as the tree grows. Evaluating a predicate can touch dozens of
//! pixels, so every answer is computed once up front and stored as a bit.
//!
//! Examples are addressed by a global index: training rows first, then
//! validation rows.

use crate::data::Examples;
use crate::predicate::{PredicateId, PredicatePool};

use super::TrainingError;

const WORD_BITS: usize = 64;

/// Bit table of predicate answers over training and validation examples.
///
/// Storage is predicate-major: one packed bit column per predicate. The
/// logical layout is `[example][predicate]`, served by [`answer`](Self::answer).
#[derive(Debug, Clone)]
pub struct AnswerCache {
    n_examples: usize,
    n_training: usize,
    n_predicates: usize,
    words_per_column: usize,
    bits: Vec<u64>,
    labels: Vec<u8>,
}

impl AnswerCache {
    /// Evaluate every predicate on every example.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::EmptyTrainingSet`] if `training` has no rows
    /// - [`TrainingError::Data`] if the two sets differ in feature width
    /// - [`TrainingError::Pool`] if a predicate reads past the feature vector
    pub fn build(
        pool: &PredicatePool,
        training: &Examples,
        validation: &Examples,
    ) -> Result<Self, TrainingError> {
        if training.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        let all = training.concat(validation)?;
        pool.validate_for(all.n_features())?;

        let n_examples = all.n_examples();
        let n_predicates = pool.len();
        let words_per_column = n_examples.div_ceil(WORD_BITS);
        let mut bits = vec![0u64; words_per_column * n_predicates];

        for (example, (_, features)) in all.iter().enumerate() {
            let word = example / WORD_BITS;
            let mask = 1u64 << (example % WORD_BITS);
            for (id, predicate) in pool.iter() {
                if predicate.evaluate(features) {
                    bits[id.index() * words_per_column + word] |= mask;
                }
            }
        }

        Ok(Self {
            n_examples,
            n_training: training.n_examples(),
            n_predicates,
            words_per_column,
            bits,
            labels: all.labels().to_vec(),
        })
    }

    /// Answer of predicate `id` for the example at global index `example`.
    #[inline]
    pub fn answer(&self, example: u32, id: PredicateId) -> bool {
        let example = example as usize;
        let word = self.bits[id.index() * self.words_per_column + example / WORD_BITS];
        (word >> (example % WORD_BITS)) & 1 == 1
    }

    /// Packed answer column of one predicate.
    #[inline]
    pub fn column(&self, id: PredicateId) -> &[u64] {
        let start = id.index() * self.words_per_column;
        &self.bits[start..start + self.words_per_column]
    }

    /// Label of the example at global index `example`.
    #[inline]
    pub fn label(&self, example: u32) -> u8 {
        self.labels[example as usize]
    }

    /// Labels by global index.
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Total examples (training + validation).
    pub fn n_examples(&self) -> usize {
        self.n_examples
    }

    /// Number of training examples; they occupy indices `0..n_training`.
    pub fn n_training(&self) -> usize {
        self.n_training
    }

    /// Number of validation examples; they follow the training examples.
    pub fn n_validation(&self) -> usize {
        self.n_examples - self.n_training
    }

    /// Number of predicate columns.
    pub fn n_predicates(&self) -> usize {
        self.n_predicates
    }

    /// Global indices of the training examples.
    pub fn training_indices(&self) -> std::ops::Range<u32> {
        0..self.n_training as u32
    }

    /// Global indices of the validation examples.
    pub fn validation_indices(&self) -> std::ops::Range<u32> {
        self.n_training as u32..self.n_examples as u32
    }

    /// Global indices of all examples, training first.
    pub fn all_indices(&self) -> std::ops::Range<u32> {
        0..self.n_examples as u32
    }

    /// Approximate heap size of the table in bytes.
    pub fn size_bytes(&self) -> usize {
        self.bits.len() * std::mem::size_of::<u64>() + self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use crate::predicate::Predicate;

    fn pool() -> PredicatePool {
        PredicatePool::new(vec![
            Predicate::PixelThreshold {
                pixel: 0,
                threshold: 0,
            },
            Predicate::PixelThreshold {
                pixel: 1,
                threshold: 5,
            },
        ])
        .unwrap()
    }

    #[test]
    fn matches_live_evaluation() {
        let training = Examples::from_rows(&[vec![1, 0, 9], vec![2, 3, 1], vec![3, 7, 7]]).unwrap();
        let validation = Examples::from_rows(&[vec![4, 1, 6]]).unwrap();
        let pool = pool();
        let cache = AnswerCache::build(&pool, &training, &validation).unwrap();

        assert_eq!(cache.n_examples(), 4);
        assert_eq!(cache.n_training(), 3);
        assert_eq!(cache.n_validation(), 1);
        assert_eq!(cache.labels(), &[1, 2, 3, 4]);

        let all = training.concat(&validation).unwrap();
        for (example, (_, features)) in all.iter().enumerate() {
            for (id, predicate) in pool.iter() {
                assert_eq!(cache.answer(example as u32, id), predicate.evaluate(features));
            }
        }
    }

    #[test]
    fn spans_multiple_words() {
        let rows: Vec<Vec<i32>> = (0..150).map(|i| vec![i % 10, i % 3, 0]).collect();
        let training = Examples::from_rows(&rows).unwrap();
        let empty = Examples::from_rows::<Vec<i32>>(&[]).unwrap();
        let cache = AnswerCache::build(&pool(), &training, &empty).unwrap();

        assert_eq!(cache.column(PredicateId(0)).len(), 3);
        for i in 0..150u32 {
            assert_eq!(cache.answer(i, PredicateId(0)), i % 3 != 0);
            assert!(!cache.answer(i, PredicateId(1)));
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let training = Examples::from_rows(&[vec![1, 0, 9]]).unwrap();
        let narrow = Examples::from_rows(&[vec![1, 0]]).unwrap();
        let empty = Examples::from_rows::<Vec<i32>>(&[]).unwrap();

        assert!(matches!(
            AnswerCache::build(&pool(), &empty, &training),
            Err(TrainingError::EmptyTrainingSet)
        ));
        assert!(matches!(
            AnswerCache::build(&pool(), &training, &narrow),
            Err(TrainingError::Data(DataError::FeatureMismatch { .. }))
        ));
        assert!(matches!(
            AnswerCache::build(&pool(), &narrow, &empty),
            Err(TrainingError::Pool(_))
        ));
    }
}
