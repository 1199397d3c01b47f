//! The generation driver.
//!
//! [`GeneticSearch`] owns the resolved parameters and the pluggable
//! strategies. Each call to [`GeneticSearch::search`] builds a fresh
//! [`SearchState`], runs the loop to a terminal state and hands the final
//! population back as a [`SearchOutcome`].

use std::time::Instant;

use crate::schema::{ConfigError, Gene, LogLevel, Operation, SearchConfig, SearchStats, StopReason};

use super::convergence::{BestScoreHistory, ConvergenceDetector, RoundStatus, Terminator};
use super::fitness::{FitnessEvaluator, Objective, ScoreTable};
use super::listener::{FnListener, Listeners, LogListener, SearchEvent, SearchListener};
use super::niching::apply_crowding;
use super::operators::{Crossover, DistinctGeneMutator, Mutator, UniformCrossover};
use super::population::{GeneSampler, Population, UniformSampler};
use super::ranking::{Comparator, DominanceComparator, Ranking};
use super::rng::GeneRng;
use super::schedule::{ResolvedParams, progress};
use super::selection::{SelectionContext, Selector, TournamentSelector};

/// Everything that changes during one search. Owned by the driver and lent
/// to one component operation at a time.
#[derive(Debug, Clone)]
pub struct SearchState<T> {
    pub population: Population<T>,
    /// Raw scores by buffer index.
    pub scores: ScoreTable,
    /// Crowding-adjusted scores used for ranking when multimodal is on.
    pub adjusted: Option<ScoreTable>,
    pub ranking: Ranking,
    pub history: BestScoreHistory,
    /// Candidates changed since their last evaluation.
    pub stale: Vec<bool>,
    /// Completed reproduction rounds.
    pub round: u64,
    pub evaluations: u64,
    pub started: Instant,
}

impl<T: Gene> SearchState<T> {
    /// Budget fraction consumed so far.
    pub fn progress(&self, params: &ResolvedParams) -> f64 {
        progress(
            self.started.elapsed(),
            params.time_out(),
            self.round,
            params.n_rounds,
        )
    }
}

/// Genetic search engine over genomes of `T`.
pub struct GeneticSearch<T: Gene> {
    params: ResolvedParams,
    evaluator: FitnessEvaluator<T>,
    seed: u64,
    rng: GeneRng,
    sampler: Box<dyn GeneSampler<T>>,
    comparator: Box<dyn Comparator>,
    selector: Box<dyn Selector>,
    mutator: Box<dyn Mutator<T>>,
    crossover: Box<dyn Crossover<T>>,
    terminator: Box<dyn Terminator>,
    listeners: Listeners,
    parents: [Vec<T>; 2],
}

impl<T: Gene> GeneticSearch<T> {
    /// Create a search maximizing every objective over genomes of `n_genes`.
    pub fn new(
        objectives: Vec<Objective<T>>,
        n_genes: usize,
        config: &SearchConfig,
    ) -> Result<Self, ConfigError> {
        let params = ResolvedParams::resolve(config, n_genes, T::DTYPE, objectives.len())?;
        let seed = params.random_seed.unwrap_or_else(rand::random);

        let mut listeners = Listeners::default();
        if params.log_level > LogLevel::Silent {
            listeners.push(Box::new(LogListener::new(params.log_level)));
        }

        Ok(Self {
            comparator: Box::new(DominanceComparator::new(params.weights.clone())),
            terminator: Box::new(ConvergenceDetector {
                time_out: params.time_out(),
                n_rounds: params.n_rounds,
                min_improve: params.min_improve,
            }),
            evaluator: FitnessEvaluator::new(objectives),
            seed,
            rng: GeneRng::new(seed),
            sampler: Box::new(UniformSampler),
            selector: Box::new(TournamentSelector),
            mutator: Box::new(DistinctGeneMutator),
            crossover: Box::new(UniformCrossover),
            listeners,
            parents: [Vec::with_capacity(n_genes), Vec::with_capacity(n_genes)],
            params,
        })
    }

    /// Create a single-objective search.
    pub fn single<F>(objective: F, n_genes: usize, config: &SearchConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&[T]) -> f64 + Send + Sync + 'static,
    {
        Self::new(vec![Box::new(objective)], n_genes, config)
    }

    /// Replace the gene value generator used for initialization and mutation.
    pub fn with_sampler(mut self, sampler: impl GeneSampler<T> + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn with_comparator(mut self, comparator: impl Comparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    pub fn with_selector(mut self, selector: impl Selector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn with_mutator(mut self, mutator: impl Mutator<T> + 'static) -> Self {
        self.mutator = Box::new(mutator);
        self
    }

    pub fn with_crossover(mut self, crossover: impl Crossover<T> + 'static) -> Self {
        self.crossover = Box::new(crossover);
        self
    }

    pub fn with_terminator(mut self, terminator: impl Terminator + 'static) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    pub fn with_listener(mut self, listener: impl SearchListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Register a closure notified of every event.
    pub fn on_event<F>(self, f: F) -> Self
    where
        F: FnMut(&SearchEvent<'_>) + Send + 'static,
    {
        self.with_listener(FnListener(f))
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.params
    }

    /// Seed the random source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run a fresh search to completion.
    pub fn search(&mut self) -> SearchOutcome<T> {
        self.listeners.emit(SearchEvent::Start {
            params: &self.params,
        });

        let mut state = self.init_state();
        self.evaluate(&mut state);
        self.rank(&mut state);
        self.record(&mut state);

        let stop_reason = loop {
            self.listeners.emit(SearchEvent::Round {
                round: state.round,
                elapsed_ms: state.started.elapsed().as_millis() as u64,
            });

            let status = RoundStatus {
                round: state.round,
                elapsed: state.started.elapsed(),
                history: &state.history,
            };
            if let Some(reason) = self.terminator.check(&status) {
                break reason;
            }

            self.reproduce(&mut state);
            state.round += 1;

            self.evaluate(&mut state);
            self.rank(&mut state);
            self.record(&mut state);
        };

        self.listeners.emit(SearchEvent::Stop {
            reason: stop_reason,
        });

        let elapsed = state.started.elapsed();
        let elapsed_secs = elapsed.as_secs_f64();
        let stats = SearchStats {
            rounds: state.round,
            evaluations: state.evaluations,
            elapsed_ms: elapsed.as_millis() as u64,
            evaluations_per_second: if elapsed_secs > 0.0 {
                state.evaluations as f64 / elapsed_secs
            } else {
                0.0
            },
            best_scores: state.scores.best(),
            stop_reason,
        };
        self.listeners.emit(SearchEvent::End { stats: &stats });

        SearchOutcome {
            population: state.population,
            ranking: state.ranking,
            scores: state.scores,
            stats,
        }
    }

    fn init_state(&mut self) -> SearchState<T> {
        let params = &self.params;
        let population = Population::random(
            params.pop_size,
            params.n_genes,
            &mut *self.sampler,
            params.rand_bounds,
            &mut self.rng,
        );

        SearchState {
            population,
            scores: ScoreTable::new(params.n_objectives, params.pop_size),
            adjusted: None,
            ranking: Ranking::new(params.pop_size),
            history: BestScoreHistory::new(params.n_objectives, params.n_track),
            stale: vec![true; params.pop_size],
            round: 0,
            evaluations: 0,
            started: Instant::now(),
        }
    }

    /// Score stale candidates, or everyone when reuse is disabled.
    fn evaluate(&mut self, state: &mut SearchState<T>) {
        let summary = if self.params.reuse_elite_scores {
            self.evaluator.score_population(
                &state.population,
                &mut state.scores,
                Some(state.stale.as_mut_slice()),
            )
        } else {
            state.stale.fill(false);
            self.evaluator
                .score_population(&state.population, &mut state.scores, None)
        };
        state.evaluations += summary.evaluations;
    }

    fn rank(&mut self, state: &mut SearchState<T>) {
        state.ranking.sort(&*self.comparator, &state.scores);

        if self.params.multimodal {
            let n_elite = self.params.n_elite(state.progress(&self.params));
            let SearchState {
                population,
                scores,
                adjusted,
                ranking,
                ..
            } = state;
            let adjusted = adjusted.get_or_insert_with(|| scores.clone());
            apply_crowding(population, ranking, n_elite, scores, adjusted);
            ranking.sort(&*self.comparator, adjusted);
        }
    }

    fn record(&mut self, state: &mut SearchState<T>) {
        let best_scores = state.scores.best();
        state.history.record(&best_scores);

        if self.listeners.is_empty() {
            return;
        }
        let best: Vec<f64> = state
            .population
            .candidate(state.ranking.get(0))
            .iter()
            .map(|gene| gene.to_f64())
            .collect();
        let improvement = state.history.improvements();
        self.listeners.emit(SearchEvent::Score {
            round: state.round,
            best: &best,
            best_scores: &best_scores,
            improvement: &improvement,
        });
    }

    /// Vary every candidate outside the elite band.
    fn reproduce(&mut self, state: &mut SearchState<T>) {
        let params = &self.params;
        let progress = state.progress(params);
        let n_elite = params.n_elite(progress);
        let scores = state.adjusted.as_ref().unwrap_or(&state.scores);

        for rank in n_elite..params.pop_size {
            let candidate = state.ranking.get(rank);
            let p_mutate = params.p_mutate(progress, rank);

            let op = if self.rng.chance(p_mutate) {
                let genes = params.n_mutations(progress, rank);
                self.mutator.mutate(
                    state.population.candidate_mut(candidate),
                    genes,
                    &mut *self.sampler,
                    params.rand_bounds,
                    &mut self.rng,
                );
                Operation::Mutate { genes }
            } else {
                let ctx = SelectionContext {
                    ranking: &state.ranking,
                    scores,
                    n_elite,
                    p_elite: params.p_elite(progress, rank),
                    tournament_size: params.tournament_size(progress, rank),
                };
                let a = self.selector.select(&ctx, &mut self.rng);
                let b = self.selector.select(&ctx, &mut self.rng);

                // Parents may include the child itself, so copy them out first.
                let [first, second] = &mut self.parents;
                state.population.copy_candidate(a, first);
                state.population.copy_candidate(b, second);
                self.crossover.crossover(
                    state.population.candidate_mut(candidate),
                    [first.as_slice(), second.as_slice()],
                    &mut self.rng,
                );
                Operation::Crossover { parents: (a, b) }
            };

            state.population.clamp_candidate(candidate);
            state.stale[candidate] = true;

            self.listeners.emit(SearchEvent::Op {
                round: state.round,
                rank,
                candidate,
                p_mutate,
                op,
            });
        }
    }
}

/// Final population of a finished search, best first.
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    population: Population<T>,
    ranking: Ranking,
    scores: ScoreTable,
    stats: SearchStats,
}

impl<T: Gene> SearchOutcome<T> {
    /// Genomes in rank order.
    pub fn candidates(&self) -> Candidates<'_, T> {
        Candidates {
            population: &self.population,
            ranks: self.ranking.as_slice().iter(),
        }
    }

    /// Rank 0 genome.
    pub fn best(&self) -> &[T] {
        self.population.candidate(self.ranking.get(0))
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stats.stop_reason
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Raw score of the candidate at `rank` for `objective`.
    pub fn score(&self, objective: usize, rank: usize) -> f64 {
        self.scores.get(objective, self.ranking.get(rank))
    }

    /// Raw scores of the candidate at `rank`, one per objective.
    pub fn scores(&self, rank: usize) -> Vec<f64> {
        self.scores.candidate(self.ranking.get(rank))
    }

    /// Final rank order as buffer indices.
    pub fn ranking(&self) -> &[usize] {
        self.ranking.as_slice()
    }

    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }
}

impl<'a, T: Gene> IntoIterator for &'a SearchOutcome<T> {
    type Item = &'a [T];
    type IntoIter = Candidates<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates()
    }
}

/// Forward-only iterator over genomes, best first.
pub struct Candidates<'a, T> {
    population: &'a Population<T>,
    ranks: std::slice::Iter<'a, usize>,
}

impl<'a, T: Gene> Iterator for Candidates<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        self.ranks
            .next()
            .map(|&index| self.population.candidate(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ranks.size_hint()
    }
}

impl<T: Gene> ExactSizeIterator for Candidates<'_, T> {}
