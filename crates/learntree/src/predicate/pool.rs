//! Ordered, validated predicate pools.

use super::{Predicate, PredicateId, PredicateKind};

/// Errors raised while assembling or checking a predicate pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("predicate pool is empty")]
    Empty,

    #[error("predicate index {found} at position {position} (indices must be 0, 1, 2, ...)")]
    NonSequential { position: usize, found: usize },

    #[error("predicate {id} ({predicate}) reads outside a {n_features}-feature vector")]
    OutOfBounds {
        id: PredicateId,
        predicate: String,
        n_features: usize,
    },

    #[error("pool has {len} predicates, more than the supported {max}")]
    TooLarge { len: usize, max: usize },

    #[error("{n_features} features do not form a square image")]
    NotSquare { n_features: usize },
}

/// An ordered, non-empty sequence of predicates.
///
/// Position in the pool is the predicate's identity: the answer cache stores
/// one column per predicate in pool order, and trees refer to predicates by
/// [`PredicateId`]. The pool is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicatePool {
    predicates: Vec<Predicate>,
}

impl PredicatePool {
    /// Build a pool, assigning ids `0, 1, 2, ...` in order.
    pub fn new(predicates: Vec<Predicate>) -> Result<Self, PoolError> {
        if predicates.is_empty() {
            return Err(PoolError::Empty);
        }
        if predicates.len() > u32::MAX as usize {
            return Err(PoolError::TooLarge {
                len: predicates.len(),
                max: u32::MAX as usize,
            });
        }
        Ok(Self { predicates })
    }

    /// Build a pool from predicates carrying externally assigned indices.
    ///
    /// Indices must be exactly `0, 1, 2, ...` in order; anything else
    /// (gaps, duplicates, reordering) is rejected.
    pub fn from_indexed<I>(indexed: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (usize, Predicate)>,
    {
        let mut predicates = Vec::new();
        for (position, (found, predicate)) in indexed.into_iter().enumerate() {
            if found != position {
                return Err(PoolError::NonSequential { position, found });
            }
            predicates.push(predicate);
        }
        Self::new(predicates)
    }

    /// Check every predicate against the feature width of the data.
    pub fn validate_for(&self, n_features: usize) -> Result<(), PoolError> {
        for (id, predicate) in self.iter() {
            if !predicate.fits(n_features) {
                return Err(PoolError::OutOfBounds {
                    id,
                    predicate: predicate.to_string(),
                    n_features,
                });
            }
        }
        Ok(())
    }

    /// Number of predicates.
    #[inline]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Always false; pools are non-empty by construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Predicate by id.
    #[inline]
    pub fn get(&self, id: PredicateId) -> Option<&Predicate> {
        self.predicates.get(id.index())
    }

    /// Predicates in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PredicateId, &Predicate)> + '_ {
        self.predicates
            .iter()
            .enumerate()
            .map(|(i, p)| (PredicateId(i as u32), p))
    }

    /// Predicates as a slice indexed by id.
    pub fn as_slice(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Number of predicates of each family, in family order.
    pub fn kind_counts(&self) -> Vec<(PredicateKind, usize)> {
        let mut counts: Vec<(PredicateKind, usize)> = Vec::new();
        for p in &self.predicates {
            match counts.iter_mut().find(|(k, _)| *k == p.kind()) {
                Some((_, n)) => *n += 1,
                None => counts.push((p.kind(), 1)),
            }
        }
        counts.sort_by_key(|&(k, _)| k);
        counts
    }
}
