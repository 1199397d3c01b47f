//! Observability hook.
//!
//! The search notifies every registered [`SearchListener`] synchronously at
//! fixed points of the loop. Listeners cannot influence the search.

use crate::schema::{LogLevel, Operation, SearchStats, StopReason};

use super::schedule::ResolvedParams;

/// A point in the search loop.
#[derive(Debug, Clone, Copy)]
pub enum SearchEvent<'a> {
    /// Parameters resolved, before the first evaluation.
    Start { params: &'a ResolvedParams },
    /// Beginning of an iteration.
    Round { round: u64, elapsed_ms: u64 },
    /// Population evaluated and ranked.
    Score {
        round: u64,
        /// Genome of the rank 0 candidate.
        best: &'a [f64],
        /// Best raw score per objective.
        best_scores: &'a [f64],
        /// Improvement per objective over the tracking window.
        improvement: &'a [f64],
    },
    /// One candidate was varied.
    Op {
        round: u64,
        rank: usize,
        candidate: usize,
        p_mutate: f64,
        op: Operation,
    },
    /// The search reached a terminal state.
    Stop { reason: StopReason },
    /// Final statistics, after `Stop`.
    End { stats: &'a SearchStats },
}

impl SearchEvent<'_> {
    /// Event name: `start`, `round`, `score`, `op`, the stop reason or `end`.
    pub fn name(&self) -> &'static str {
        match self {
            SearchEvent::Start { .. } => "start",
            SearchEvent::Round { .. } => "round",
            SearchEvent::Score { .. } => "score",
            SearchEvent::Op { .. } => "op",
            SearchEvent::Stop { reason } => reason.as_str(),
            SearchEvent::End { .. } => "end",
        }
    }
}

/// Receives search events.
pub trait SearchListener: Send {
    fn on_event(&mut self, event: &SearchEvent<'_>);
}

/// Adapts a closure into a listener.
pub struct FnListener<F>(pub F);

impl<F> SearchListener for FnListener<F>
where
    F: FnMut(&SearchEvent<'_>) + Send,
{
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        (self.0)(event)
    }
}

/// Forwards events to the `log` facade according to a verbosity level.
#[derive(Debug, Clone, Copy)]
pub struct LogListener {
    level: LogLevel,
}

impl LogListener {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl SearchListener for LogListener {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        if self.level == LogLevel::Silent {
            return;
        }
        match *event {
            SearchEvent::Start { params } => {
                log::info!(
                    "Search started: {} x {} {} genes, {} objective(s)",
                    params.pop_size,
                    params.n_genes,
                    params.dtype,
                    params.n_objectives
                );
                log::debug!(
                    "Budget: {} rounds, {} ms, nTrack {}, minImprove {}",
                    params.n_rounds,
                    params.time_out_ms,
                    params.n_track,
                    params.min_improve
                );
            }
            SearchEvent::Score {
                round,
                best,
                best_scores,
                improvement,
            } if self.level >= LogLevel::Normal => {
                log::info!(
                    "Round {}: best scores {:?}, improvement {:?}",
                    round,
                    best_scores,
                    improvement
                );
                log::debug!("Round {}: best candidate {:?}", round, best);
            }
            SearchEvent::Op {
                round,
                rank,
                candidate,
                p_mutate,
                op,
            } if self.level >= LogLevel::Loud => {
                log::debug!(
                    "Round {}: rank {} (candidate {}, pMutate {:.3}) {:?}",
                    round,
                    rank,
                    candidate,
                    p_mutate,
                    op
                );
            }
            SearchEvent::Stop { reason } => {
                log::info!("Search stopped: {}", reason.as_str());
            }
            SearchEvent::End { stats } => {
                log::info!(
                    "Search finished: {} rounds, {} evaluations in {} ms ({:.0}/s), best {:?}",
                    stats.rounds,
                    stats.evaluations,
                    stats.elapsed_ms,
                    stats.evaluations_per_second,
                    stats.best_scores
                );
            }
            _ => {}
        }
    }
}

/// Ordered set of listeners notified by the search.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Box<dyn SearchListener>>,
}

impl Listeners {
    pub fn push(&mut self, listener: Box<dyn SearchListener>) {
        self.listeners.push(listener);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, event: SearchEvent<'_>) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}
