//! Candidate comparison and rank order.
//!
//! The population buffer is never reordered. Instead [`Ranking`] keeps a
//! permutation of buffer indices, fittest first, re-sorted every round.

use std::cmp::Ordering;

use super::fitness::ScoreTable;

/// Orders two candidates by buffer index. `Less` means `a` is fitter.
pub trait Comparator: Send {
    fn compare(&self, scores: &ScoreTable, a: usize, b: usize) -> Ordering;
}

/// Value comparison for one objective, weighted dominance tally for several.
///
/// With several objectives each one adds its weight to the tally of whichever
/// candidate scores strictly higher on it. The larger tally ranks first. This
/// relation is not transitive, so it must only be used with a sort that
/// tolerates inconsistent orders (see [`Ranking::sort`]).
#[derive(Debug, Clone)]
pub struct DominanceComparator {
    weights: Vec<f64>,
}

impl DominanceComparator {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Weighted tallies of `a` and `b` against each other.
    pub fn tally(&self, scores: &ScoreTable, a: usize, b: usize) -> (f64, f64) {
        let mut tally = (0.0, 0.0);
        for objective in 0..scores.n_objectives() {
            let weight = self.weights.get(objective).copied().unwrap_or(1.0);
            let (sa, sb) = (scores.get(objective, a), scores.get(objective, b));
            if sa > sb {
                tally.0 += weight;
            } else if sb > sa {
                tally.1 += weight;
            }
        }
        tally
    }
}

impl Comparator for DominanceComparator {
    fn compare(&self, scores: &ScoreTable, a: usize, b: usize) -> Ordering {
        if scores.n_objectives() == 1 {
            return scores.get(0, b).total_cmp(&scores.get(0, a));
        }
        let (ta, tb) = self.tally(scores, a, b);
        tb.total_cmp(&ta)
    }
}

/// Rank order: `idxs[rank]` is the buffer index of the candidate at `rank`.
#[derive(Debug, Clone)]
pub struct Ranking {
    idxs: Vec<usize>,
    scratch: Vec<usize>,
}

impl Ranking {
    /// Identity permutation over `pop_size` candidates.
    pub fn new(pop_size: usize) -> Self {
        Self {
            idxs: (0..pop_size).collect(),
            scratch: vec![0; pop_size],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }

    /// Buffer index of the candidate at `rank`.
    #[inline]
    pub fn get(&self, rank: usize) -> usize {
        self.idxs[rank]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.idxs
    }

    /// Stable bottom-up merge sort of the rank order.
    ///
    /// Always terminates with a permutation, even for comparators that are not
    /// a total order, where `slice::sort_by` is allowed to panic.
    pub fn sort(&mut self, comparator: &dyn Comparator, scores: &ScoreTable) {
        let n = self.idxs.len();
        let mut width = 1;
        while width < n {
            let mut start = 0;
            while start < n {
                let mid = (start + width).min(n);
                let end = (start + 2 * width).min(n);
                merge(
                    &self.idxs[start..mid],
                    &self.idxs[mid..end],
                    &mut self.scratch[start..end],
                    comparator,
                    scores,
                );
                start = end;
            }
            std::mem::swap(&mut self.idxs, &mut self.scratch);
            width *= 2;
        }
    }
}

fn merge(
    left: &[usize],
    right: &[usize],
    out: &mut [usize],
    comparator: &dyn Comparator,
    scores: &ScoreTable,
) {
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        // Right only wins when strictly fitter, which keeps ties stable.
        let take_right = j < right.len()
            && (i == left.len()
                || comparator.compare(scores, right[j], left[i]) == Ordering::Less);
        if take_right {
            *slot = right[j];
            j += 1;
        } else {
            *slot = left[i];
            i += 1;
        }
    }
}
