//! Fitness evaluation.
//!
//! Objectives are maximized. Whatever an objective returns, the score table
//! only ever holds comparable values: NaN becomes negative infinity and
//! infinities are clamped to the largest finite magnitude.

use crate::schema::Gene;

use super::population::Population;

/// An objective function over a genome view.
pub type Objective<T> = Box<dyn Fn(&[T]) -> f64 + Send + Sync>;

/// Make a raw objective result safe to order. Returns the score and whether
/// the input was NaN.
#[inline]
pub fn sanitize_score(raw: f64) -> (f64, bool) {
    if raw.is_nan() {
        (f64::NEG_INFINITY, true)
    } else {
        (raw.clamp(-f64::MAX, f64::MAX), false)
    }
}

/// Last evaluated score of every candidate, per objective, indexed by buffer
/// index (not rank).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    scores: Vec<Vec<f64>>,
}

impl ScoreTable {
    pub fn new(n_objectives: usize, pop_size: usize) -> Self {
        Self {
            scores: vec![vec![f64::NEG_INFINITY; pop_size]; n_objectives],
        }
    }

    #[inline]
    pub fn n_objectives(&self) -> usize {
        self.scores.len()
    }

    #[inline]
    pub fn get(&self, objective: usize, candidate: usize) -> f64 {
        self.scores[objective][candidate]
    }

    #[inline]
    pub fn set(&mut self, objective: usize, candidate: usize, score: f64) {
        self.scores[objective][candidate] = score;
    }

    /// Scores of every candidate for one objective.
    #[inline]
    pub fn objective(&self, objective: usize) -> &[f64] {
        &self.scores[objective]
    }

    #[inline]
    pub fn objective_mut(&mut self, objective: usize) -> &mut [f64] {
        &mut self.scores[objective]
    }

    /// All scores of one candidate.
    pub fn candidate(&self, candidate: usize) -> Vec<f64> {
        self.scores.iter().map(|s| s[candidate]).collect()
    }

    /// Highest score for each objective.
    pub fn best(&self) -> Vec<f64> {
        self.scores
            .iter()
            .map(|s| s.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect()
    }
}

/// Summary of one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Candidates evaluated.
    pub evaluations: u64,
    /// Objective results that were NaN.
    pub nan_results: u64,
}

/// Evaluates candidates against every objective.
pub struct FitnessEvaluator<T> {
    objectives: Vec<Objective<T>>,
}

impl<T: Gene> FitnessEvaluator<T> {
    /// Create a new fitness evaluator.
    pub fn new(objectives: Vec<Objective<T>>) -> Self {
        Self { objectives }
    }

    #[inline]
    pub fn n_objectives(&self) -> usize {
        self.objectives.len()
    }

    /// Score one genome against one objective.
    pub fn evaluate(&self, objective: usize, genome: &[T]) -> f64 {
        sanitize_score((self.objectives[objective])(genome)).0
    }

    /// Evaluate candidates flagged in `stale` (all of them when `stale` is
    /// `None`) and clear their flags.
    pub fn score_population(
        &self,
        population: &Population<T>,
        table: &mut ScoreTable,
        stale: Option<&mut [bool]>,
    ) -> EvaluationSummary {
        let mut summary = EvaluationSummary::default();
        let mut stale = stale;

        for candidate in 0..population.pop_size() {
            if let Some(flags) = stale.as_deref_mut() {
                if !flags[candidate] {
                    continue;
                }
                flags[candidate] = false;
            }

            let genome = population.candidate(candidate);
            for (objective, f) in self.objectives.iter().enumerate() {
                let (score, was_nan) = sanitize_score(f(genome));
                summary.nan_results += was_nan as u64;
                table.set(objective, candidate, score);
            }
            summary.evaluations += 1;
        }

        if summary.nan_results > 0 {
            log::warn!(
                "Objective returned NaN {} time(s), scored as -inf",
                summary.nan_results
            );
        }

        summary
    }
}
