//! BVNS configuration and strategy selection.

use crate::transport::TransportMode;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the starting open-set is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitMode {
    /// Random facility order, opened until capacity covers demand.
    Random,
    /// Cheapest opening cost first until capacity covers demand.
    CheapestFirst,
    /// Opening walk from the all-closed state, then reduced VNS
    /// (shake and accept-if-better, no local search).
    #[default]
    Rvns,
}

/// How the `k` facilities to flip are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShakingMode {
    /// Uniformly without replacement.
    #[default]
    Uniform,
    /// Close open facilities by opening cost; open closed ones by its
    /// inverse.
    CostBiased,
    /// Open closed facilities by capacity; close open ones by its inverse.
    CapacityBiased,
}

/// Single-flip descent policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LocalSearchMode {
    /// Scan all flips, take the best strictly improving one.
    #[default]
    BestImprovement,
    /// Take the first strictly improving flip in index order.
    FirstImprovement,
}

/// Additional stopping rule checked after every iteration.
///
/// The time budget, `max_iterations` and cancellation always apply on top
/// of the selected rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StoppingRule {
    /// Only the budgets stop the run.
    #[default]
    Budget,
    /// Stop after this many consecutive non-improving iterations.
    Stagnation { max_no_improve: usize },
    /// Stop after this many full `k_min..=k_max` sweeps without improvement.
    Sweeps { max_sweeps: usize },
}

/// Configuration for the Basic Variable Neighborhood Search.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_facility::bvns::{BvnsConfig, LocalSearchMode};
///
/// let config = BvnsConfig::default()
///     .with_neighborhoods(1, 4)
///     .with_max_iterations(200)
///     .with_time_budget(Duration::from_secs(30))
///     .with_local_search_mode(LocalSearchMode::FirstImprovement)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.k_max, 4);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BvnsConfig {
    /// Smallest neighborhood index (number of flipped facilities). At least 1.
    pub k_min: usize,

    /// Largest neighborhood index.
    pub k_max: usize,

    /// Outer iteration cap (`tMax`). 0 = no cap.
    pub max_iterations: usize,

    /// Wall-clock budget, polled once per iteration.
    pub time_budget: Option<Duration>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    pub init_mode: InitMode,

    pub shaking_mode: ShakingMode,

    pub local_search_mode: LocalSearchMode,

    pub transport_mode: TransportMode,

    pub stopping: StoppingRule,

    /// Re-draws allowed when a shake fails the capacity pre-check.
    pub shake_retries: usize,

    /// Construction attempts before the initializer gives up.
    pub init_attempts: usize,

    /// Reduced-VNS steps performed by [`InitMode::Rvns`] after the walk.
    pub rvns_steps: usize,

    /// A candidate must beat the incumbent by more than this to be accepted.
    pub improvement_epsilon: f64,

    /// Maximum entries kept in [`BvnsResult::cost_history`](super::BvnsResult);
    /// later iterations are not recorded. 0 disables the history.
    pub history_limit: usize,
}

impl Default for BvnsConfig {
    fn default() -> Self {
        Self {
            k_min: 1,
            k_max: 3,
            max_iterations: 40,
            time_budget: None,
            seed: None,
            init_mode: InitMode::default(),
            shaking_mode: ShakingMode::default(),
            local_search_mode: LocalSearchMode::default(),
            transport_mode: TransportMode::default(),
            stopping: StoppingRule::default(),
            shake_retries: 50,
            init_attempts: 1000,
            rvns_steps: 100,
            improvement_epsilon: 1e-9,
            history_limit: 10_000,
        }
    }
}

impl BvnsConfig {
    /// Sets `k_min` and `k_max`.
    pub fn with_neighborhoods(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_init_mode(mut self, mode: InitMode) -> Self {
        self.init_mode = mode;
        self
    }

    pub fn with_shaking_mode(mut self, mode: ShakingMode) -> Self {
        self.shaking_mode = mode;
        self
    }

    pub fn with_local_search_mode(mut self, mode: LocalSearchMode) -> Self {
        self.local_search_mode = mode;
        self
    }

    pub fn with_transport_mode(mut self, mode: TransportMode) -> Self {
        self.transport_mode = mode;
        self
    }

    pub fn with_stopping(mut self, rule: StoppingRule) -> Self {
        self.stopping = rule;
        self
    }

    pub fn with_shake_retries(mut self, n: usize) -> Self {
        self.shake_retries = n;
        self
    }

    pub fn with_init_attempts(mut self, n: usize) -> Self {
        self.init_attempts = n;
        self
    }

    pub fn with_rvns_steps(mut self, n: usize) -> Self {
        self.rvns_steps = n;
        self
    }

    pub fn with_improvement_epsilon(mut self, eps: f64) -> Self {
        self.improvement_epsilon = eps;
        self
    }

    pub fn with_history_limit(mut self, n: usize) -> Self {
        self.history_limit = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.k_min == 0 {
            return Err("k_min must be at least 1".into());
        }
        if self.k_max < self.k_min {
            return Err(format!(
                "k_max ({}) must be >= k_min ({})",
                self.k_max, self.k_min
            ));
        }
        if self.shake_retries == 0 {
            return Err("shake_retries must be positive".into());
        }
        if self.init_attempts == 0 {
            return Err("init_attempts must be positive".into());
        }
        if !(self.improvement_epsilon >= 0.0) {
            return Err(format!(
                "improvement_epsilon must be non-negative, got {}",
                self.improvement_epsilon
            ));
        }
        match self.stopping {
            StoppingRule::Stagnation { max_no_improve: 0 } => {
                return Err("stagnation limit must be positive".into());
            }
            StoppingRule::Sweeps { max_sweeps: 0 } => {
                return Err("sweep limit must be positive".into());
            }
            StoppingRule::Budget
                if self.time_budget.is_none() && self.max_iterations == 0 =>
            {
                return Err(
                    "no termination condition: set max_iterations, a time budget, or a stopping rule"
                        .into(),
                );
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BvnsConfig::default();
        assert_eq!(config.k_min, 1);
        assert_eq!(config.k_max, 3);
        assert_eq!(config.max_iterations, 40);
        assert_eq!(config.init_mode, InitMode::Rvns);
        assert_eq!(config.transport_mode, TransportMode::Vogel);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_k_min_zero() {
        assert!(BvnsConfig::default().with_neighborhoods(0, 3).validate().is_err());
    }

    #[test]
    fn test_validate_k_max_below_k_min() {
        assert!(BvnsConfig::default().with_neighborhoods(3, 2).validate().is_err());
    }

    #[test]
    fn test_validate_no_termination() {
        let config = BvnsConfig::default().with_max_iterations(0);
        assert!(config.validate().is_err());

        let config = config.clone().with_time_budget(Duration::from_millis(10));
        assert!(config.validate().is_ok());

        let config = BvnsConfig::default()
            .with_max_iterations(0)
            .with_stopping(StoppingRule::Stagnation { max_no_improve: 5 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_limits() {
        assert!(BvnsConfig::default().with_shake_retries(0).validate().is_err());
        assert!(BvnsConfig::default().with_init_attempts(0).validate().is_err());
        assert!(BvnsConfig::default()
            .with_stopping(StoppingRule::Sweeps { max_sweeps: 0 })
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_bad_epsilon() {
        assert!(BvnsConfig::default()
            .with_improvement_epsilon(-1.0)
            .validate()
            .is_err());
        assert!(BvnsConfig::default()
            .with_improvement_epsilon(f64::NAN)
            .validate()
            .is_err());
    }
}
