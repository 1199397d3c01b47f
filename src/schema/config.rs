//! Configuration types for a genetic search.
//!
//! Every option is optional and falls back to a default tuned for mid-sized
//! problems (a few hundred genes, a few seconds of search).

use serde::{Deserialize, Serialize};

use super::Dtype;

/// Smallest population a search accepts.
pub const MIN_POP_SIZE: usize = 5;
/// Smallest sliding window used for plateau detection.
pub const MIN_N_TRACK: usize = 2;
/// Smallest elite band.
pub const MIN_N_ELITE: usize = 2;

/// How a scheduled parameter reacts to a candidate's rank.
///
/// Rank 0 is the fittest candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    /// Depends on search progress only.
    #[default]
    Constant,
    /// Scaled by `rank / popSize`: weaker candidates move further toward `end`.
    IncreasesWithRank,
    /// Scaled by `1 - rank / popSize`: fitter candidates move further toward `end`.
    DecreasesWithRank,
}

/// A numeric option given as a constant, a `[start, end]` range or an
/// explicit schedule.
///
/// Ranges and schedules are interpolated from `start` to `end` as the search
/// consumes its time or round budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamOption {
    Constant(f64),
    Range([f64; 2]),
    Scheduled {
        start: f64,
        end: f64,
        #[serde(default)]
        trend: Trend,
    },
}

impl ParamOption {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    pub fn range(start: f64, end: f64) -> Self {
        Self::Range([start, end])
    }

    pub fn scheduled(start: f64, end: f64, trend: Trend) -> Self {
        Self::Scheduled { start, end, trend }
    }

    /// Split into `(start, end, trend)`.
    pub fn parts(&self) -> (f64, f64, Trend) {
        match *self {
            ParamOption::Constant(v) => (v, v, Trend::Constant),
            ParamOption::Range([start, end]) => (start, end, Trend::Constant),
            ParamOption::Scheduled { start, end, trend } => (start, end, trend),
        }
    }

    fn endpoints(&self) -> [f64; 2] {
        let (start, end, _) = self.parts();
        [start, end]
    }
}

impl From<f64> for ParamOption {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

/// Verbosity of the built-in log listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LogLevel {
    /// No log listener is registered.
    #[default]
    Silent = 0,
    /// Start, stop reason and end of the search.
    Quiet = 1,
    /// Also every round's best scores.
    Normal = 2,
    /// Also every mutation and crossover.
    Loud = 3,
}

impl TryFrom<u8> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LogLevel::Silent),
            1 => Ok(LogLevel::Quiet),
            2 => Ok(LogLevel::Normal),
            3 => Ok(LogLevel::Loud),
            other => Err(ConfigError::InvalidLogLevel(other)),
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

/// Top-level configuration for a genetic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SearchConfig {
    /// Number of candidates.
    pub pop_size: usize,
    /// Elite band size: a count, or a fraction (< 1) of `popSize`.
    pub n_elite: ParamOption,
    /// Probability that a tournament draw comes from the elite band.
    pub p_elite: ParamOption,
    /// Probability that a non-elite candidate is mutated rather than crossed over.
    pub p_mutate: ParamOption,
    /// Genes changed per mutation: a count, or a fraction (< 1) of `nGenes`.
    /// Derived from the genome length when absent.
    pub n_mutations: Option<ParamOption>,
    /// Candidates drawn per tournament: a count, or a fraction (< 1) of `popSize`.
    pub tournament_size: ParamOption,
    /// Length of the best-score window used for plateau detection.
    pub n_track: usize,
    /// Minimum improvement over the window that keeps the search running.
    pub min_improve: f64,
    /// Round budget.
    pub n_rounds: u64,
    /// Wall-clock budget in milliseconds.
    #[serde(rename = "timeOutMS")]
    pub time_out_ms: u64,
    /// Per-objective weights used to break dominance ties (default 1 each).
    pub weights: Option<Vec<f64>>,
    /// Lower bound for randomly drawn gene values (defaults to the kind's bound).
    pub rand_val_min: Option<f64>,
    /// Upper bound for randomly drawn gene values (defaults to the kind's bound).
    pub rand_val_max: Option<f64>,
    /// Penalize candidates crowding around the elites.
    pub multimodal: bool,
    /// Skip re-evaluating candidates that were not changed in a round.
    pub reuse_elite_scores: bool,
    /// Verbosity of the built-in log listener.
    pub log_level: LogLevel,
    /// Random seed for reproducibility.
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pop_size: 300,
            n_elite: ParamOption::range(0.1, 0.3),
            p_elite: ParamOption::scheduled(0.1, 0.2, Trend::IncreasesWithRank),
            p_mutate: ParamOption::scheduled(0.01, 0.8, Trend::DecreasesWithRank),
            n_mutations: None,
            tournament_size: ParamOption::scheduled(2.0, 10.0, Trend::IncreasesWithRank),
            n_track: 100,
            min_improve: 1E-6,
            n_rounds: 1_000_000,
            time_out_ms: 30_000,
            weights: None,
            rand_val_min: None,
            rand_val_max: None,
            multimodal: false,
            reuse_elite_scores: true,
            log_level: LogLevel::Silent,
            random_seed: None,
        }
    }
}

impl SearchConfig {
    /// Parse from JSON, rejecting unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Default `nMutations` schedule for a genome of `n_genes`: a handful of
    /// genes early on, narrowing to a single gene for fit candidates.
    pub fn default_n_mutations(n_genes: usize) -> ParamOption {
        let start = 1.0 + ((n_genes.max(1) as f64).log2() / 2.0).floor();
        ParamOption::scheduled(start, 1.0, Trend::DecreasesWithRank)
    }

    /// Random-value bounds for `dtype`, narrowed by `randValMin`/`randValMax`
    /// and never wider than the kind's own bounds.
    pub fn rand_bounds(&self, dtype: Dtype) -> (f64, f64) {
        let (lower, upper) = dtype.bounds();
        (
            self.rand_val_min.map_or(lower, |min| min.max(lower)),
            self.rand_val_max.map_or(upper, |max| max.min(upper)),
        )
    }

    /// Validate the configuration for a genome of `n_genes` elements of kind
    /// `dtype` scored by `n_objectives` objectives.
    pub fn validate(
        &self,
        n_genes: usize,
        dtype: Dtype,
        n_objectives: usize,
    ) -> Result<(), ConfigError> {
        if n_genes < 1 {
            return Err(ConfigError::NoGenes);
        }
        if n_objectives == 0 {
            return Err(ConfigError::NoObjectives);
        }
        if self.pop_size < MIN_POP_SIZE {
            return Err(ConfigError::PopulationTooSmall(self.pop_size));
        }
        if self.n_track < MIN_N_TRACK {
            return Err(ConfigError::TrackTooShort(self.n_track));
        }
        if !self.min_improve.is_finite() || self.min_improve < 0.0 {
            return Err(ConfigError::InvalidMinImprove(self.min_improve));
        }

        self.validate_elite()?;

        for (name, option) in [("pElite", &self.p_elite), ("pMutate", &self.p_mutate)] {
            for value in option.endpoints() {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidProbability { name, value });
                }
            }
        }

        for value in self.tournament_size.endpoints() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTournamentSize(value));
            }
        }

        if let Some(option) = &self.n_mutations {
            if let ParamOption::Range([lower, upper]) = option
                && lower > upper
            {
                return Err(ConfigError::InvalidMutationBounds(format!(
                    "lower ({}) > upper ({})",
                    lower, upper
                )));
            }
            for value in option.endpoints() {
                let count = if value < 1.0 {
                    value * n_genes as f64
                } else {
                    value
                };
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidMutationBounds(format!(
                        "{} must be positive",
                        value
                    )));
                }
                if count > n_genes as f64 {
                    return Err(ConfigError::InvalidMutationBounds(format!(
                        "{} exceeds nGenes ({})",
                        value, n_genes
                    )));
                }
            }
        }

        let (kind_lower, kind_upper) = dtype.bounds();
        let lower = self.rand_val_min.unwrap_or(kind_lower);
        let upper = self.rand_val_max.unwrap_or(kind_upper);
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ConfigError::InvalidRandomBounds { lower, upper });
        }
        if dtype.is_unsigned() && lower < 0.0 {
            return Err(ConfigError::NegativeUnsignedBound(lower));
        }
        // Both bounds outside the kind on the same side leave nothing to draw.
        let (lower, upper) = self.rand_bounds(dtype);
        if lower > upper {
            return Err(ConfigError::InvalidRandomBounds { lower, upper });
        }

        if let Some(weights) = &self.weights {
            if weights.len() != n_objectives {
                return Err(ConfigError::InvalidWeights(format!(
                    "expected {} weights, got {}",
                    n_objectives,
                    weights.len()
                )));
            }
            if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(ConfigError::InvalidWeights(format!(
                    "weight {} must be finite and non-negative",
                    w
                )));
            }
        }

        Ok(())
    }

    fn validate_elite(&self) -> Result<(), ConfigError> {
        for value in self.n_elite.endpoints() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidElite(value));
            }
            if value < 1.0 {
                continue;
            }
            if value.fract() != 0.0 {
                return Err(ConfigError::InvalidElite(value));
            }
            if (value as usize) < MIN_N_ELITE {
                return Err(ConfigError::EliteTooSmall(value as usize));
            }
            if value as usize > self.pop_size {
                return Err(ConfigError::EliteExceedsPopulation {
                    n_elite: value as usize,
                    pop_size: self.pop_size,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Construction-time configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("nGenes must be at least 1")]
    NoGenes,
    #[error("At least one objective function is required")]
    NoObjectives,
    #[error("Unrecognised dtype \"{0}\", choose from: u8, u16, u32, i8, i16, i32, f32, f64")]
    UnknownDtype(String),
    #[error("popSize must be at least 5, got {0}")]
    PopulationTooSmall(usize),
    #[error("nTrack must be at least 2, got {0}")]
    TrackTooShort(usize),
    #[error("nElite must be an integer count or a ratio in (0, 1), got {0}")]
    InvalidElite(f64),
    #[error("nElite must be at least 2, got {0}")]
    EliteTooSmall(usize),
    #[error("nElite ({n_elite}) cannot be greater than popSize ({pop_size})")]
    EliteExceedsPopulation { n_elite: usize, pop_size: usize },
    #[error("{name} is a probability so it must be between 0 and 1, got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Invalid nMutations: {0}")]
    InvalidMutationBounds(String),
    #[error("tournamentSize must be positive, got {0}")]
    InvalidTournamentSize(f64),
    #[error("Invalid random value bounds: min ({lower}) > max ({upper})")]
    InvalidRandomBounds { lower: f64, upper: f64 },
    #[error("randValMin cannot be negative for unsigned dtypes, got {0}")]
    NegativeUnsignedBound(f64),
    #[error("minImprove must be finite and non-negative, got {0}")]
    InvalidMinImprove(f64),
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),
    #[error("logLevel must be between 0 and 3, got {0}")]
    InvalidLogLevel(u8),
    #[error("workers must be at least 1")]
    NoWorkers,
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
