//! Crowding penalty for multimodal search.
//!
//! Candidates close to the current elites have their ranking scores pulled
//! down so the population keeps exploring other optima. Raw scores are left
//! untouched; only the table used for ranking is adjusted.

use crate::schema::Gene;

use super::fitness::ScoreTable;
use super::population::Population;
use super::ranking::Ranking;

/// Manhattan distance between two genomes, scaled by the kind's value range.
pub fn genome_distance<T: Gene>(a: &[T], b: &[T]) -> f64 {
    let scale = 2f64.powi(T::DTYPE.bits() as i32);
    a.iter()
        .zip(b)
        .map(|(x, y)| (x.to_f64() - y.to_f64()).abs())
        .sum::<f64>()
        / scale
}

/// Write crowding-adjusted scores into `adjusted`.
///
/// Each candidate's summed distance to the elite band becomes a factor in
/// `[0, 1]` (min-max over the population). A score `s` becomes
/// `s - (1 - factor) * |s|`, so the most crowded candidate loses its whole
/// magnitude and the most isolated keeps its score. Elites receive a bonus
/// of `max_distance / n_elite` so they are not penalized for matching
/// themselves.
pub fn apply_crowding<T: Gene>(
    population: &Population<T>,
    ranking: &Ranking,
    n_elite: usize,
    raw: &ScoreTable,
    adjusted: &mut ScoreTable,
) {
    let pop_size = population.pop_size();
    let n_elite = n_elite.min(pop_size);
    let elites = &ranking.as_slice()[..n_elite];

    let mut distances: Vec<f64> = (0..pop_size)
        .map(|c| {
            let genome = population.candidate(c);
            elites
                .iter()
                .map(|&e| genome_distance(genome, population.candidate(e)))
                .sum()
        })
        .collect();

    let max = distances.iter().copied().fold(0.0, f64::max);
    if n_elite > 0 {
        let bonus = max / n_elite as f64;
        for &e in elites {
            distances[e] += bonus;
        }
    }

    let (lo, hi) = distances
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
            (lo.min(d), hi.max(d))
        });
    let span = hi - lo;

    for objective in 0..raw.n_objectives() {
        let scores = raw.objective(objective);
        let out = adjusted.objective_mut(objective);
        for c in 0..pop_size {
            let s = scores[c];
            let factor = if span > 0.0 { (distances[c] - lo) / span } else { 1.0 };
            out[c] = if s.is_finite() {
                s - (1.0 - factor) * s.abs()
            } else {
                s
            };
        }
    }
}
