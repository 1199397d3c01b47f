//! Adaptive parameter schedules.
//!
//! Each tunable parameter is resolved once, at construction, into a
//! [`Schedule`]: a pure function of search progress and candidate rank.

use std::time::Duration;

use serde::Serialize;

use crate::schema::{
    ConfigError, Dtype, LogLevel, MIN_N_ELITE, ParamOption, SearchConfig, Trend,
};

/// Fraction of the search budget consumed: the larger of the elapsed-time
/// fraction and the completed-rounds fraction, clamped to `[0, 1]`.
pub fn progress(elapsed: Duration, time_out: Duration, rounds: u64, n_rounds: u64) -> f64 {
    let by_time = if time_out.is_zero() {
        1.0
    } else {
        elapsed.as_secs_f64() / time_out.as_secs_f64()
    };
    let by_rounds = if n_rounds == 0 {
        1.0
    } else {
        rounds as f64 / n_rounds as f64
    };
    by_time.max(by_rounds).clamp(0.0, 1.0)
}

/// A resolved `{start, end, trend}` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Schedule {
    pub start: f64,
    pub end: f64,
    pub trend: Trend,
}

impl Schedule {
    /// Resolve a user option. When `percentage_of` is given, endpoints below
    /// 1.0 are fractions of it (e.g. of `popSize` or `nGenes`).
    pub fn resolve(option: &ParamOption, percentage_of: Option<f64>) -> Self {
        let (mut start, mut end, trend) = option.parts();
        if let Some(base) = percentage_of {
            if start < 1.0 {
                start *= base;
            }
            if end < 1.0 {
                end *= base;
            }
        }
        Self { start, end, trend }
    }

    pub fn constant(value: f64) -> Self {
        Self {
            start: value,
            end: value,
            trend: Trend::Constant,
        }
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.start == self.end
    }

    /// Value at `progress`, ignoring rank.
    pub fn at_progress(&self, progress: f64) -> f64 {
        if self.is_constant() {
            return self.start;
        }
        self.start + progress.clamp(0.0, 1.0) * (self.end - self.start)
    }

    /// Value at `progress` for the candidate at `rank` (0 = fittest).
    pub fn at(&self, progress: f64, rank: usize, pop_size: usize) -> f64 {
        if self.is_constant() {
            return self.start;
        }
        let range = progress.clamp(0.0, 1.0) * (self.end - self.start);
        let rank = rank as f64 / pop_size.max(1) as f64;
        match self.trend {
            Trend::Constant => self.start + range,
            Trend::IncreasesWithRank => self.start + range * rank,
            Trend::DecreasesWithRank => self.start + range * (1.0 - rank),
        }
    }
}

/// Search parameters after validation, defaulting and schedule resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedParams {
    pub dtype: Dtype,
    pub n_genes: usize,
    pub n_objectives: usize,
    pub pop_size: usize,
    pub n_elite: Schedule,
    pub p_elite: Schedule,
    pub p_mutate: Schedule,
    pub n_mutations: Schedule,
    pub tournament_size: Schedule,
    pub n_track: usize,
    pub min_improve: f64,
    pub n_rounds: u64,
    pub time_out_ms: u64,
    pub weights: Vec<f64>,
    /// Range of randomly drawn gene values.
    pub rand_bounds: (f64, f64),
    pub multimodal: bool,
    pub reuse_elite_scores: bool,
    pub log_level: LogLevel,
    pub random_seed: Option<u64>,
}

impl ResolvedParams {
    /// Validate `config` and resolve every schedule against the genome shape.
    pub fn resolve(
        config: &SearchConfig,
        n_genes: usize,
        dtype: Dtype,
        n_objectives: usize,
    ) -> Result<Self, ConfigError> {
        config.validate(n_genes, dtype, n_objectives)?;

        let pop_size = config.pop_size as f64;
        let n_mutations = config
            .n_mutations
            .unwrap_or_else(|| SearchConfig::default_n_mutations(n_genes));

        Ok(Self {
            dtype,
            n_genes,
            n_objectives,
            pop_size: config.pop_size,
            n_elite: Schedule::resolve(&config.n_elite, Some(pop_size)),
            p_elite: Schedule::resolve(&config.p_elite, None),
            p_mutate: Schedule::resolve(&config.p_mutate, None),
            n_mutations: Schedule::resolve(&n_mutations, Some(n_genes as f64)),
            tournament_size: Schedule::resolve(&config.tournament_size, Some(pop_size)),
            n_track: config.n_track,
            min_improve: config.min_improve,
            n_rounds: config.n_rounds,
            time_out_ms: config.time_out_ms,
            weights: config
                .weights
                .clone()
                .unwrap_or_else(|| vec![1.0; n_objectives]),
            rand_bounds: config.rand_bounds(dtype),
            multimodal: config.multimodal,
            reuse_elite_scores: config.reuse_elite_scores,
            log_level: config.log_level,
            random_seed: config.random_seed,
        })
    }

    #[inline]
    pub fn time_out(&self) -> Duration {
        Duration::from_millis(self.time_out_ms)
    }

    /// Elite band size for the current round. Rank does not apply.
    pub fn n_elite(&self, progress: f64) -> usize {
        let n = self.n_elite.at_progress(progress).floor() as usize;
        n.clamp(MIN_N_ELITE.min(self.pop_size), self.pop_size)
    }

    pub fn p_elite(&self, progress: f64, rank: usize) -> f64 {
        self.p_elite
            .at(progress, rank, self.pop_size)
            .clamp(0.0, 1.0)
    }

    pub fn p_mutate(&self, progress: f64, rank: usize) -> f64 {
        self.p_mutate
            .at(progress, rank, self.pop_size)
            .clamp(0.0, 1.0)
    }

    /// Genes to mutate, at least one and at most `nGenes`.
    pub fn n_mutations(&self, progress: f64, rank: usize) -> usize {
        let n = self.n_mutations.at(progress, rank, self.pop_size).round() as usize;
        n.clamp(1, self.n_genes)
    }

    /// Tournament size, at least one and at most `popSize`.
    pub fn tournament_size(&self, progress: f64, rank: usize) -> usize {
        let n = self
            .tournament_size
            .at(progress, rank, self.pop_size)
            .round() as usize;
        n.clamp(1, self.pop_size)
    }
}
