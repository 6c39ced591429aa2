//! BVNS execution engine.
//!
//! # Algorithm (Basic VNS over open-sets)
//!
//! 1. Build the incumbent with the configured initializer; set `k = k_min`
//! 2. While no budget is exhausted and the stopping rule holds off:
//!    a. **Shaking**: flip `k` facilities of the incumbent (re-drawn while
//!    the capacity pre-check fails, up to `shake_retries` times)
//!    b. **Evaluate**: solve the transportation subproblem
//!    c. **Local search**: single-flip descent from the candidate
//!    d. **Move or not**: if the refined candidate beats the incumbent by
//!    more than `improvement_epsilon`, replace it and set `k = k_min`;
//!    otherwise `k = k + 1`, wrapping to `k_min` after `k_max`
//! 3. Return the incumbent
//!
//! Rejected shakes and infeasible subproblems count as non-improving moves.

use super::config::BvnsConfig;
use super::init::initial_solution;
use super::local_search::local_search;
use super::shaking::shake_feasible;
use super::stopping::{SearchProgress, StopCondition};
use crate::error::CflpError;
use crate::evaluation::Evaluator;
use crate::models::{Instance, Solution};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};
use u_numflow::random::create_rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Why the search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Wall-clock budget exhausted.
    TimeBudget,
    /// `max_iterations` reached.
    IterationCap,
    /// The stopping rule fired.
    Stopped,
    /// Cancelled through the external flag.
    Cancelled,
}

/// Result of a BVNS run.
#[derive(Debug, Clone)]
pub struct BvnsResult {
    /// Best solution found; always feasible.
    pub best: Solution,
    /// Objective of the initializer's solution.
    pub initial_objective: f64,
    /// Shake/local-search iterations executed.
    pub iterations: usize,
    /// Iterations that replaced the incumbent.
    pub improvements: usize,
    /// Iteration at which the incumbent was last replaced (0 = initial).
    pub best_iteration: usize,
    /// Iterations whose shake or subproblem was rejected as infeasible.
    pub rejected_moves: usize,
    /// Wall-clock time including initialization.
    pub elapsed: Duration,
    pub termination: Termination,
    /// Incumbent objective after each iteration, up to
    /// [`BvnsConfig::history_limit`] entries.
    pub cost_history: Vec<f64>,
    /// Seed actually used.
    pub seed: u64,
}

impl BvnsResult {
    /// Objective of the best solution.
    pub fn best_cost(&self) -> f64 {
        self.best.objective()
    }
}

/// Basic Variable Neighborhood Search runner.
pub struct BvnsRunner;

impl BvnsRunner {
    /// Runs BVNS on `instance`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_facility::bvns::{BvnsConfig, BvnsRunner};
    /// use u_facility::models::Instance;
    ///
    /// let inst = Instance::from_rows(
    ///     vec![8.0, 8.0],
    ///     vec![10.0, 10.0],
    ///     vec![5.0, 5.0],
    ///     vec![vec![1.0, 1.0], vec![1.0, 1.0]],
    /// ).expect("valid");
    /// let config = BvnsConfig::default().with_max_iterations(20).with_seed(42);
    /// let result = BvnsRunner::run(&inst, &config).expect("feasible instance");
    /// assert!((result.best_cost() - 26.0).abs() < 1e-9);
    /// ```
    pub fn run(instance: &Instance, config: &BvnsConfig) -> Result<BvnsResult, CflpError> {
        Self::run_with_cancel(instance, config, None)
    }

    /// Runs BVNS with an optional cancellation flag, polled once per iteration.
    pub fn run_with_cancel(
        instance: &Instance,
        config: &BvnsConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BvnsResult, CflpError> {
        let mut rule = config.stopping;
        Self::run_with_stop(instance, config, cancel, &mut rule)
    }

    /// Runs BVNS with a caller-supplied stop condition in place of
    /// `config.stopping`.
    #[tracing::instrument(
        name = "bvns",
        skip_all,
        fields(
            facilities = instance.num_facilities(),
            customers = instance.num_customers(),
        )
    )]
    pub fn run_with_stop<S: StopCondition + ?Sized>(
        instance: &Instance,
        config: &BvnsConfig,
        cancel: Option<Arc<AtomicBool>>,
        stop: &mut S,
    ) -> Result<BvnsResult, CflpError> {
        config.validate().map_err(CflpError::InvalidConfig)?;

        let started = Instant::now();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = create_rng(seed);
        let evaluator = Evaluator::new(instance, config.transport_mode);
        let eps = config.improvement_epsilon;

        let mut incumbent = initial_solution(&evaluator, config, &mut rng)?;
        let initial_objective = incumbent.objective();
        info!(
            seed,
            objective = initial_objective,
            open = incumbent.open_set().open_count(),
            "search started"
        );

        let mut k = config.k_min;
        let mut iterations = 0usize;
        let mut improvements = 0usize;
        let mut best_iteration = 0usize;
        let mut rejected_moves = 0usize;
        let mut since_improvement = 0usize;
        let mut sweeps_without_improvement = 0usize;
        let mut cost_history = Vec::new();

        let termination = loop {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                break Termination::Cancelled;
            }
            if config
                .time_budget
                .is_some_and(|budget| started.elapsed() >= budget)
            {
                break Termination::TimeBudget;
            }
            if config.max_iterations > 0 && iterations >= config.max_iterations {
                break Termination::IterationCap;
            }

            iterations += 1;

            let shaken = shake_feasible(
                incumbent.open_set(),
                k,
                config.shaking_mode,
                &evaluator,
                config.shake_retries,
                &mut rng,
            );

            let candidate = match shaken.map(|open| evaluator.evaluate(open)) {
                Some(Ok(candidate)) => Some(candidate),
                Some(Err(err)) if err.is_recoverable() => {
                    trace!(iteration = iterations, k, %err, "subproblem rejected");
                    None
                }
                Some(Err(err)) => return Err(err),
                None => {
                    trace!(iteration = iterations, k, "shake retries exhausted");
                    None
                }
            };

            let improved = match candidate {
                Some(candidate) => {
                    let refined =
                        local_search(&evaluator, candidate, config.local_search_mode, eps);
                    if refined.objective() < incumbent.objective() - eps {
                        debug!(
                            iteration = iterations,
                            k,
                            from = incumbent.objective(),
                            to = refined.objective(),
                            "incumbent improved"
                        );
                        incumbent = refined;
                        true
                    } else {
                        false
                    }
                }
                None => {
                    rejected_moves += 1;
                    false
                }
            };

            if improved {
                k = config.k_min;
                improvements += 1;
                best_iteration = iterations;
                since_improvement = 0;
                sweeps_without_improvement = 0;
            } else {
                since_improvement += 1;
                k += 1;
                if k > config.k_max {
                    k = config.k_min;
                    sweeps_without_improvement += 1;
                }
            }

            if cost_history.len() < config.history_limit {
                cost_history.push(incumbent.objective());
            }

            let progress = SearchProgress {
                iteration: iterations,
                improved,
                k,
                since_improvement,
                sweeps_without_improvement,
                best_cost: incumbent.objective(),
            };
            if stop.should_stop(&progress) {
                break Termination::Stopped;
            }
        };

        let elapsed = started.elapsed();
        info!(
            ?termination,
            iterations,
            improvements,
            rejected_moves,
            objective = incumbent.objective(),
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );

        Ok(BvnsResult {
            best: incumbent,
            initial_objective,
            iterations,
            improvements,
            best_iteration,
            rejected_moves,
            elapsed,
            termination,
            cost_history,
            seed,
        })
    }

    /// Runs one isolated search per seed and returns the best result.
    ///
    /// With the `parallel` feature the runs execute on the rayon pool.
    /// Ties keep the earliest seed. If every run fails, the first error is
    /// returned.
    pub fn run_restarts(
        instance: &Instance,
        config: &BvnsConfig,
        seeds: &[u64],
    ) -> Result<BvnsResult, CflpError> {
        if seeds.is_empty() {
            return Err(CflpError::InvalidConfig(
                "run_restarts needs at least one seed".into(),
            ));
        }

        let run_one = |&seed: &u64| Self::run(instance, &config.clone().with_seed(seed));

        #[cfg(feature = "parallel")]
        let results: Vec<Result<BvnsResult, CflpError>> = seeds.par_iter().map(run_one).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<Result<BvnsResult, CflpError>> = seeds.iter().map(run_one).collect();

        let mut best: Option<BvnsResult> = None;
        let mut first_err: Option<CflpError> = None;
        for result in results {
            match result {
                Ok(run) => {
                    let better = match &best {
                        Some(b) => run.best_cost() < b.best_cost(),
                        None => true,
                    };
                    if better {
                        best = Some(run);
                    }
                }
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }

        best.ok_or_else(|| {
            first_err.unwrap_or_else(|| CflpError::InvalidConfig("no restart produced a result".into()))
        })
    }
}
