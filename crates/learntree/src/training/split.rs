//! Label histograms, entropy and best-split search.

use crate::NUM_CLASSES;
use crate::predicate::PredicateId;

use super::cache::AnswerCache;

// =============================================================================
// LabelHistogram
// =============================================================================

/// Class counts over a set of examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelHistogram {
    counts: [u32; NUM_CLASSES],
    total: u32,
}

impl LabelHistogram {
    /// Histogram of the given global example indices.
    pub fn from_examples(cache: &AnswerCache, examples: &[u32]) -> Self {
        let mut hist = Self::default();
        for &e in examples {
            hist.add(cache.label(e));
        }
        hist
    }

    /// Histogram of raw labels.
    pub fn from_labels(labels: &[u8]) -> Self {
        let mut hist = Self::default();
        for &label in labels {
            hist.add(label);
        }
        hist
    }

    /// Count one example of `label`.
    #[inline]
    pub fn add(&mut self, label: u8) {
        self.counts[label as usize] += 1;
        self.total += 1;
    }

    /// Counts of the examples in `self` but not in `subset`.
    #[inline]
    pub fn minus(&self, subset: &Self) -> Self {
        let mut counts = self.counts;
        for (c, s) in counts.iter_mut().zip(subset.counts.iter()) {
            *c -= s;
        }
        Self {
            counts,
            total: self.total - subset.total,
        }
    }

    /// Per-class counts.
    pub fn counts(&self) -> &[u32; NUM_CLASSES] {
        &self.counts
    }

    /// Number of examples counted.
    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Most frequent label; the lowest label wins ties.
    pub fn majority(&self) -> u8 {
        let mut best = 0;
        for (label, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = label;
            }
        }
        best as u8
    }

    /// Shannon entropy of the label distribution, in bits.
    ///
    /// Empty classes contribute nothing; an empty histogram has entropy 0.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let h: f64 = self
            .counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum();
        // A pure node sums to -0.0.
        h.max(0.0)
    }

    /// Entropy times example count.
    #[inline]
    pub fn weighted_entropy(&self) -> f64 {
        self.entropy() * self.total as f64
    }

    /// Whether at most one class is present.
    pub fn is_pure(&self) -> bool {
        self.counts.iter().filter(|&&c| c > 0).count() <= 1
    }
}

// =============================================================================
// SplitCandidate
// =============================================================================

/// Best split found for a leaf, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    /// Predicate to split on.
    pub predicate: PredicateId,
    /// Parent weighted entropy minus children weighted entropy (never negative).
    pub weighted_gain: f64,
    /// Sum of the two children's weighted entropies.
    pub children_weighted_entropy: f64,
    /// Examples answering yes.
    pub n_yes: u32,
    /// Examples answering no.
    pub n_no: u32,
}

/// Find the predicate minimizing the children's total weighted entropy.
///
/// Predicates that answer the same for every example are skipped. On exact
/// ties the lowest predicate id wins. Returns `None` if no predicate splits
/// `examples` into two non-empty parts.
pub fn find_best_split(
    cache: &AnswerCache,
    examples: &[u32],
    parent: &LabelHistogram,
) -> Option<SplitCandidate> {
    let mut best: Option<SplitCandidate> = None;
    let parent_weighted = parent.weighted_entropy();

    for p in 0..cache.n_predicates() as u32 {
        let predicate = PredicateId(p);
        let column = cache.column(predicate);

        let mut yes = LabelHistogram::default();
        for &e in examples {
            let e = e as usize;
            if (column[e / 64] >> (e % 64)) & 1 == 1 {
                yes.add(cache.label(e as u32));
            }
        }
        if yes.total == 0 || yes.total == parent.total {
            continue;
        }
        let no = parent.minus(&yes);

        let children = yes.weighted_entropy() + no.weighted_entropy();
        if best.is_none_or(|b| children < b.children_weighted_entropy) {
            best = Some(SplitCandidate {
                predicate,
                weighted_gain: (parent_weighted - children).max(0.0),
                children_weighted_entropy: children,
                n_yes: yes.total,
                n_no: no.total,
            });
        }
    }

    best
}
