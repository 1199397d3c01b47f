//! Termination and plateau detection.

use std::time::Duration;

use crate::schema::StopReason;

/// Ring buffer of the best score per objective over the last `n_track`
/// rounds.
#[derive(Debug, Clone)]
pub struct BestScoreHistory {
    rings: Vec<Vec<f64>>,
    n_track: usize,
    recorded: usize,
}

impl BestScoreHistory {
    pub fn new(n_objectives: usize, n_track: usize) -> Self {
        Self {
            rings: vec![vec![f64::NEG_INFINITY; n_track]; n_objectives],
            n_track,
            recorded: 0,
        }
    }

    /// Append one sample per objective, overwriting the oldest.
    pub fn record(&mut self, best: &[f64]) {
        let slot = self.recorded % self.n_track;
        for (ring, &score) in self.rings.iter_mut().zip(best) {
            ring[slot] = score;
        }
        self.recorded += 1;
    }

    #[inline]
    pub fn n_objectives(&self) -> usize {
        self.rings.len()
    }

    /// Number of samples recorded so far, including overwritten ones.
    #[inline]
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// The window spans a full `n_track` rounds of change, so a plateau
    /// verdict is meaningful.
    #[inline]
    pub fn is_warm(&self) -> bool {
        self.recorded > self.n_track
    }

    /// Most recent sample for `objective`.
    pub fn latest(&self, objective: usize) -> f64 {
        match self.recorded {
            0 => f64::NEG_INFINITY,
            n => self.rings[objective][(n - 1) % self.n_track],
        }
    }

    /// Sum of consecutive differences across the window, oldest to newest.
    /// Steps between equal infinities count as zero.
    pub fn improvement(&self, objective: usize) -> f64 {
        let len = self.recorded.min(self.n_track);
        let first = self.recorded - len;
        let ring = &self.rings[objective];

        (first + 1..self.recorded)
            .map(|i| {
                let step = ring[i % self.n_track] - ring[(i - 1) % self.n_track];
                if step.is_nan() { 0.0 } else { step }
            })
            .sum()
    }

    /// Improvement of every objective.
    pub fn improvements(&self) -> Vec<f64> {
        (0..self.n_objectives()).map(|o| self.improvement(o)).collect()
    }
}

/// Where the search stands when termination is checked.
#[derive(Debug, Clone, Copy)]
pub struct RoundStatus<'a> {
    /// Completed reproduction rounds.
    pub round: u64,
    pub elapsed: Duration,
    pub history: &'a BestScoreHistory,
}

/// Decides, once per round, whether the search is finished.
pub trait Terminator: Send {
    fn check(&mut self, status: &RoundStatus<'_>) -> Option<StopReason>;
}

/// Time budget, then round budget, then plateau.
#[derive(Debug, Clone)]
pub struct ConvergenceDetector {
    pub time_out: Duration,
    pub n_rounds: u64,
    pub min_improve: f64,
}

impl Terminator for ConvergenceDetector {
    fn check(&mut self, status: &RoundStatus<'_>) -> Option<StopReason> {
        if status.elapsed >= self.time_out {
            return Some(StopReason::TimedOut);
        }
        if status.round >= self.n_rounds {
            return Some(StopReason::RoundsExhausted);
        }

        // Stuck only if no objective improved enough.
        let history = status.history;
        if history.is_warm()
            && (0..history.n_objectives()).all(|o| history.improvement(o) < self.min_improve)
        {
            return Some(StopReason::Stuck);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ConvergenceDetector {
        ConvergenceDetector {
            time_out: Duration::from_secs(60),
            n_rounds: 1000,
            min_improve: 0.5,
        }
    }

    fn status(round: u64, history: &BestScoreHistory) -> RoundStatus<'_> {
        RoundStatus {
            round,
            elapsed: Duration::ZERO,
            history,
        }
    }

    #[test]
    fn test_improvement_over_window() {
        let mut history = BestScoreHistory::new(1, 3);
        for best in [1.0, 2.0, 4.0, 4.5, 4.5] {
            history.record(&[best]);
        }
        // Window holds 4.0, 4.5, 4.5.
        assert_eq!(history.improvement(0), 0.5);
        assert_eq!(history.latest(0), 4.5);
        assert!(history.is_warm());
    }

    #[test]
    fn test_infinite_steps() {
        let mut history = BestScoreHistory::new(1, 4);
        history.record(&[f64::NEG_INFINITY]);
        history.record(&[f64::NEG_INFINITY]);
        assert_eq!(history.improvement(0), 0.0);
        history.record(&[3.0]);
        assert_eq!(history.improvement(0), f64::INFINITY);
    }

    #[test]
    fn test_no_plateau_before_warm() {
        let mut history = BestScoreHistory::new(1, 4);
        let mut detector = detector();
        for round in 0..4 {
            history.record(&[1.0]);
            assert_eq!(detector.check(&status(round, &history)), None);
        }
        history.record(&[1.0]);
        assert_eq!(
            detector.check(&status(4, &history)),
            Some(StopReason::Stuck)
        );
    }

    #[test]
    fn test_any_objective_improving_keeps_running() {
        let mut history = BestScoreHistory::new(2, 2);
        for i in 0..5 {
            history.record(&[1.0, i as f64]);
        }
        assert_eq!(detector().check(&status(5, &history)), None);
    }

    #[test]
    fn test_budget_order() {
        let history = BestScoreHistory::new(1, 2);
        let mut detector = ConvergenceDetector {
            time_out: Duration::ZERO,
            n_rounds: 0,
            min_improve: 1.0,
        };
        assert_eq!(
            detector.check(&status(0, &history)),
            Some(StopReason::TimedOut)
        );

        detector.time_out = Duration::from_secs(1);
        assert_eq!(
            detector.check(&status(0, &history)),
            Some(StopReason::RoundsExhausted)
        );
    }
}
