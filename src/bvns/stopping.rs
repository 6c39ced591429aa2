//! Pluggable stopping conditions.

use super::config::StoppingRule;

/// Snapshot of search progress handed to a [`StopCondition`] after each
/// iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchProgress {
    /// Iterations completed so far.
    pub iteration: usize,
    /// Whether this iteration replaced the incumbent.
    pub improved: bool,
    /// Neighborhood index for the next iteration.
    pub k: usize,
    /// Consecutive iterations without improvement.
    pub since_improvement: usize,
    /// Complete `k_min..=k_max` sweeps since the last improvement.
    pub sweeps_without_improvement: usize,
    /// Incumbent objective.
    pub best_cost: f64,
}

/// Decides whether the search loop should end.
///
/// Budgets (time, iteration cap, cancellation) are enforced by the
/// controller itself; implementors only add extra rules.
pub trait StopCondition {
    fn should_stop(&mut self, progress: &SearchProgress) -> bool;
}

impl StopCondition for StoppingRule {
    fn should_stop(&mut self, progress: &SearchProgress) -> bool {
        match *self {
            StoppingRule::Budget => false,
            StoppingRule::Stagnation { max_no_improve } => {
                progress.since_improvement >= max_no_improve
            }
            StoppingRule::Sweeps { max_sweeps } => {
                progress.sweeps_without_improvement >= max_sweeps
            }
        }
    }
}

impl<F> StopCondition for F
where
    F: FnMut(&SearchProgress) -> bool,
{
    fn should_stop(&mut self, progress: &SearchProgress) -> bool {
        self(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(since: usize, sweeps: usize) -> SearchProgress {
        SearchProgress {
            since_improvement: since,
            sweeps_without_improvement: sweeps,
            ..SearchProgress::default()
        }
    }

    #[test]
    fn test_budget_never_stops() {
        let mut rule = StoppingRule::Budget;
        assert!(!rule.should_stop(&progress(1_000_000, 1_000_000)));
    }

    #[test]
    fn test_stagnation() {
        let mut rule = StoppingRule::Stagnation { max_no_improve: 5 };
        assert!(!rule.should_stop(&progress(4, 0)));
        assert!(rule.should_stop(&progress(5, 0)));
    }

    #[test]
    fn test_sweeps() {
        let mut rule = StoppingRule::Sweeps { max_sweeps: 2 };
        assert!(!rule.should_stop(&progress(100, 1)));
        assert!(rule.should_stop(&progress(100, 2)));
    }

    #[test]
    fn test_closure_condition() {
        let mut calls = 0;
        let mut stop = |p: &SearchProgress| {
            calls += 1;
            p.best_cost < 10.0
        };
        let mut p = progress(0, 0);
        p.best_cost = 20.0;
        assert!(!stop.should_stop(&p));
        p.best_cost = 5.0;
        assert!(stop.should_stop(&p));
        assert_eq!(calls, 2);
    }
}
