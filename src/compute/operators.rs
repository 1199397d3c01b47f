//! Variation operators applied to non-elite candidates.

use crate::schema::Gene;

use super::population::GeneSampler;
use super::rng::GeneRng;

/// Rewrites part of a genome in place.
pub trait Mutator<T: Gene>: Send {
    fn mutate(
        &mut self,
        genome: &mut [T],
        n_mutations: usize,
        sampler: &mut dyn GeneSampler<T>,
        bounds: (f64, f64),
        rng: &mut GeneRng,
    );
}

/// Overwrites `n_mutations` distinct genes with fresh sampled values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctGeneMutator;

impl<T: Gene> Mutator<T> for DistinctGeneMutator {
    fn mutate(
        &mut self,
        genome: &mut [T],
        n_mutations: usize,
        sampler: &mut dyn GeneSampler<T>,
        bounds: (f64, f64),
        rng: &mut GeneRng,
    ) {
        for gene in rng.distinct(genome.len(), n_mutations) {
            genome[gene] = sampler.sample(gene, bounds, rng).clamp_to_kind();
        }
    }
}

/// Fills a child genome from two parents.
pub trait Crossover<T: Gene>: Send {
    fn crossover(&mut self, child: &mut [T], parents: [&[T]; 2], rng: &mut GeneRng);
}

/// Each gene comes from either parent with equal probability. There is no
/// cut point, so neighbouring genes are no more likely to travel together
/// than distant ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCrossover;

impl<T: Gene> Crossover<T> for UniformCrossover {
    fn crossover(&mut self, child: &mut [T], parents: [&[T]; 2], rng: &mut GeneRng) {
        for (gene, slot) in child.iter_mut().enumerate() {
            let parent = if rng.chance(0.5) { parents[0] } else { parents[1] };
            *slot = parent[gene];
        }
    }
}
