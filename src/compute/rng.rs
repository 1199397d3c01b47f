//! Seedable random source threaded through every stochastic operation.

use rand::prelude::*;

use crate::schema::Gene;

/// Random number generator wrapper for search operations.
pub struct GeneRng {
    rng: StdRng,
}

impl GeneRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.rng.r#gen()
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform index in `[0, n)`. `n` must be positive.
    #[inline]
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    /// `amount` distinct indices from `[0, n)`, sampled without replacement.
    pub fn distinct(&mut self, n: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, n, amount.min(n)).into_vec()
    }

    /// Uniform gene value in `[lower, upper]`.
    #[inline]
    pub fn gene<T: Gene>(&mut self, lower: f64, upper: f64) -> T {
        T::sample(&mut self.rng, lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = GeneRng::new(42);
        let mut b = GeneRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.unit(), b.unit());
            assert_eq!(a.index(1000), b.index(1000));
        }
    }

    #[test]
    fn test_distinct_indices() {
        let mut rng = GeneRng::new(3);
        let mut picked = rng.distinct(10, 7);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 7);
        assert!(picked.iter().all(|&i| i < 10));

        // Asking for more than available caps at n.
        assert_eq!(rng.distinct(4, 9).len(), 4);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = GeneRng::new(1);
        assert!((0..100).all(|_| !rng.chance(0.0)));
        assert!((0..100).all(|_| rng.chance(1.0)));
    }
}
