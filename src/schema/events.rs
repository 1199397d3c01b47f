//! Result and progress types reported by a search.

use serde::{Deserialize, Serialize};

/// Reason a search stopped. Every variant is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Best scores plateaued over the tracking window.
    Stuck,
    /// Round budget consumed.
    RoundsExhausted,
    /// Wall-clock budget consumed.
    TimedOut,
}

impl StopReason {
    /// Short event name (`stuck`, `rounds`, `timeout`).
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::Stuck => "stuck",
            StopReason::RoundsExhausted => "rounds",
            StopReason::TimedOut => "timeout",
        }
    }
}

/// Variation applied to one non-elite candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Distinct genes overwritten with fresh random values.
    Mutate { genes: usize },
    /// Genes inherited gene-wise from two selected parents.
    Crossover { parents: (usize, usize) },
}

/// Statistics from a finished search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Completed reproduction rounds.
    pub rounds: u64,
    /// Candidate evaluations performed (each covers every objective).
    pub evaluations: u64,
    /// Time taken in milliseconds.
    pub elapsed_ms: u64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
    /// Best raw score per objective in the final population.
    pub best_scores: Vec<f64>,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}
