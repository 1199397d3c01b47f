//! Runs a built-in objective from a [`RunConfig`], one independent search
//! per worker.

use rayon::prelude::*;

use crate::schema::{
    ConfigError, Dtype, Gene, RankedCandidate, RunConfig, RunReport, SearchConfig, WorkerReport,
};

use super::fitness::ScoreTable;
use super::ranking::{DominanceComparator, Ranking};
use super::search::{GeneticSearch, SearchOutcome};

/// Validate `config` and run every worker to completion.
pub fn run(config: &RunConfig) -> Result<RunReport, ConfigError> {
    let dtype = config.validate()?;

    macro_rules! dispatch {
        ($($kind:ident => $ty:ty),* $(,)?) => {
            match dtype {
                $(Dtype::$kind => run_typed::<$ty>(config),)*
            }
        };
    }

    dispatch!(
        U8 => u8,
        U16 => u16,
        U32 => u32,
        I8 => i8,
        I16 => i16,
        I32 => i32,
        F32 => f32,
        F64 => f64,
    )
}

fn run_typed<T: Gene>(config: &RunConfig) -> Result<RunReport, ConfigError> {
    // Build every engine before any search starts so errors surface early.
    let mut engines = (0..config.workers)
        .map(|worker| {
            let search = SearchConfig {
                random_seed: config
                    .search
                    .random_seed
                    .map(|seed| seed.wrapping_add(worker as u64)),
                ..config.search.clone()
            };
            GeneticSearch::<T>::new(config.objective.objectives(), config.n_genes, &search)
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Running {} worker(s) on {} over {} {} genes",
        engines.len(),
        config.objective.as_str(),
        config.n_genes,
        T::DTYPE
    );

    let results: Vec<(WorkerReport, Vec<f64>)> = engines
        .par_iter_mut()
        .enumerate()
        .map(|(worker, engine)| {
            let outcome = engine.search();
            let report = WorkerReport {
                worker,
                seed: engine.seed(),
                top: top_candidates(&outcome, config.top),
                stats: outcome.stats().clone(),
            };
            (report, outcome.scores(0))
        })
        .collect();

    let n_objectives = results.first().map_or(1, |(_, best)| best.len());
    let weights = config
        .search
        .weights
        .clone()
        .unwrap_or_else(|| vec![1.0; n_objectives]);
    let best: Vec<&[f64]> = results.iter().map(|(_, best)| best.as_slice()).collect();

    Ok(RunReport {
        objective: config.objective,
        dtype: T::DTYPE,
        n_genes: config.n_genes,
        best_worker: rank_first(&best, weights),
        workers: results.into_iter().map(|(report, _)| report).collect(),
    })
}

/// Best `top` candidates of an outcome with their raw scores.
pub fn top_candidates<T: Gene>(outcome: &SearchOutcome<T>, top: usize) -> Vec<RankedCandidate> {
    outcome
        .candidates()
        .take(top)
        .enumerate()
        .map(|(rank, genome)| RankedCandidate {
            rank,
            genome: genome.iter().map(|gene| gene.to_f64()).collect(),
            scores: outcome.scores(rank),
        })
        .collect()
}

/// Index of the score vector that ranks first under weighted dominance.
fn rank_first(scores: &[&[f64]], weights: Vec<f64>) -> usize {
    if scores.is_empty() {
        return 0;
    }
    let mut table = ScoreTable::new(scores[0].len(), scores.len());
    for (candidate, row) in scores.iter().enumerate() {
        for (objective, &score) in row.iter().enumerate() {
            table.set(objective, candidate, score);
        }
    }
    let mut ranking = Ranking::new(scores.len());
    ranking.sort(&DominanceComparator::new(weights), &table);
    ranking.get(0)
}
