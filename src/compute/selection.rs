//! Parent selection.

use super::fitness::ScoreTable;
use super::ranking::Ranking;
use super::rng::GeneRng;

/// Everything a selector may consult for one draw.
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    /// Current rank order, fittest first.
    pub ranking: &'a Ranking,
    /// Scores the ranking was sorted by.
    pub scores: &'a ScoreTable,
    /// Size of the elite band `ranking[0..n_elite]`.
    pub n_elite: usize,
    /// Probability that a draw comes from the elite band.
    pub p_elite: f64,
    pub tournament_size: usize,
}

impl SelectionContext<'_> {
    #[inline]
    pub fn pop_size(&self) -> usize {
        self.ranking.len()
    }

    /// Rank of a random candidate: from the elite band with probability
    /// `p_elite`, otherwise from the rest.
    pub fn draw_rank(&self, rng: &mut GeneRng) -> usize {
        let n_rest = self.pop_size() - self.n_elite;
        if self.n_elite > 0 && (n_rest == 0 || rng.chance(self.p_elite)) {
            rng.index(self.n_elite)
        } else {
            self.n_elite + rng.index(n_rest)
        }
    }
}

/// Picks the buffer index of a parent.
pub trait Selector: Send {
    fn select(&mut self, ctx: &SelectionContext<'_>, rng: &mut GeneRng) -> usize;
}

/// Draws `tournament_size` candidates and keeps the best ranked.
#[derive(Debug, Clone, Copy, Default)]
pub struct TournamentSelector;

impl Selector for TournamentSelector {
    fn select(&mut self, ctx: &SelectionContext<'_>, rng: &mut GeneRng) -> usize {
        let mut best = ctx.draw_rank(rng);
        for _ in 1..ctx.tournament_size {
            best = best.min(ctx.draw_rank(rng));
        }
        ctx.ranking.get(best)
    }
}

/// Uniform draw from the elite band.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncationSelector;

impl Selector for TruncationSelector {
    fn select(&mut self, ctx: &SelectionContext<'_>, rng: &mut GeneRng) -> usize {
        let band = ctx.n_elite.clamp(1, ctx.pop_size());
        ctx.ranking.get(rng.index(band))
    }
}
