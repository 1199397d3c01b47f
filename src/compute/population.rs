//! Packed population storage.
//!
//! All candidates live in one flat buffer of `popSize * nGenes` genes. A
//! candidate's genome is the slice at offset `index * nGenes`; the buffer is
//! never resized or physically reordered.

use crate::schema::Gene;
use crate::schema::dtype::zeroed;

use super::rng::GeneRng;

/// Source of fresh gene values for initialization and mutation.
pub trait GeneSampler<T: Gene>: Send {
    /// Draw a value for gene `gene` within `bounds`. Values outside the
    /// element kind's bounds are clamped by the caller.
    fn sample(&mut self, gene: usize, bounds: (f64, f64), rng: &mut GeneRng) -> T;
}

/// Uniform draw over the configured random-value bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl<T: Gene> GeneSampler<T> for UniformSampler {
    fn sample(&mut self, _gene: usize, bounds: (f64, f64), rng: &mut GeneRng) -> T {
        rng.gene(bounds.0, bounds.1)
    }
}

/// Candidate genomes packed into one buffer.
#[derive(Debug, Clone)]
pub struct Population<T> {
    genes: Vec<T>,
    pop_size: usize,
    n_genes: usize,
}

impl<T: Gene> Population<T> {
    /// Zero-filled population.
    pub fn new(pop_size: usize, n_genes: usize) -> Self {
        Self {
            genes: zeroed(pop_size * n_genes),
            pop_size,
            n_genes,
        }
    }

    /// Population with every gene drawn from `sampler`.
    pub fn random(
        pop_size: usize,
        n_genes: usize,
        sampler: &mut dyn GeneSampler<T>,
        bounds: (f64, f64),
        rng: &mut GeneRng,
    ) -> Self {
        let mut population = Self::new(pop_size, n_genes);
        for genome in population.genes.chunks_exact_mut(n_genes) {
            for (gene, value) in genome.iter_mut().enumerate() {
                *value = sampler.sample(gene, bounds, rng).clamp_to_kind();
            }
        }
        population
    }

    #[inline]
    pub fn pop_size(&self) -> usize {
        self.pop_size
    }

    #[inline]
    pub fn n_genes(&self) -> usize {
        self.n_genes
    }

    /// Genome of candidate `index`.
    #[inline]
    pub fn candidate(&self, index: usize) -> &[T] {
        let offset = index * self.n_genes;
        &self.genes[offset..offset + self.n_genes]
    }

    #[inline]
    pub fn candidate_mut(&mut self, index: usize) -> &mut [T] {
        let offset = index * self.n_genes;
        &mut self.genes[offset..offset + self.n_genes]
    }

    /// Overwrite candidate `index`, clamping to the kind's bounds.
    pub fn set(&mut self, index: usize, values: &[T]) {
        for (slot, value) in self.candidate_mut(index).iter_mut().zip(values) {
            *slot = value.clamp_to_kind();
        }
    }

    /// Re-clamp candidate `index` to the kind's bounds.
    pub fn clamp_candidate(&mut self, index: usize) {
        for gene in self.candidate_mut(index) {
            *gene = gene.clamp_to_kind();
        }
    }

    /// Copy candidate `index` into `out`, reusing its allocation.
    pub fn copy_candidate(&self, index: usize, out: &mut Vec<T>) {
        out.clear();
        out.extend_from_slice(self.candidate(index));
    }

    /// The whole packed buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.genes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Dtype;

    /// Writes the gene index, ignoring bounds.
    struct IndexSampler;

    impl GeneSampler<i8> for IndexSampler {
        fn sample(&mut self, gene: usize, _bounds: (f64, f64), _rng: &mut GeneRng) -> i8 {
            if gene == 0 { i8::MIN } else { gene as i8 }
        }
    }

    #[test]
    fn test_random_population_within_bounds() {
        let mut rng = GeneRng::new(42);
        let population = Population::<u8>::random(
            20,
            16,
            &mut UniformSampler,
            Dtype::U8.bounds(),
            &mut rng,
        );

        assert_eq!(population.as_slice().len(), 20 * 16);
        let distinct: std::collections::HashSet<_> = population.as_slice().iter().collect();
        assert!(distinct.len() > 100);
    }

    #[test]
    fn test_custom_sampler_is_clamped() {
        let mut rng = GeneRng::new(1);
        let population = Population::<i8>::random(5, 4, &mut IndexSampler, (0.0, 0.0), &mut rng);

        // i8::MIN is outside the symmetric signed bounds.
        assert_eq!(population.candidate(3), &[-127, 1, 2, 3]);
    }

    #[test]
    fn test_candidate_views() {
        let mut population = Population::<f32>::new(6, 3);
        population.set(2, &[1.0, 2.0, 3.0]);

        assert_eq!(population.candidate(2), &[1.0, 2.0, 3.0]);
        assert_eq!(population.candidate(1), &[0.0, 0.0, 0.0]);
        assert_eq!(population.candidate(3), &[0.0, 0.0, 0.0]);

        let mut scratch = Vec::new();
        population.copy_candidate(2, &mut scratch);
        assert_eq!(scratch, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clamp_candidate() {
        let mut population = Population::<i16>::new(5, 2);
        population.candidate_mut(4).copy_from_slice(&[i16::MIN, 7]);
        population.clamp_candidate(4);
        assert_eq!(population.candidate(4), &[-32767, 7]);
    }
}
