//! Starting-solution construction.

use super::config::{BvnsConfig, InitMode};
use super::shaking::{open_random, shake};
use crate::error::CflpError;
use crate::evaluation::{Evaluator, FEASIBILITY_EPS};
use crate::models::{OpenSet, Solution};
use rand::Rng;
use tracing::debug;

/// Builds the first incumbent with the configured [`InitMode`].
///
/// The returned solution is fully evaluated, so it already satisfies the
/// flow invariants. Fails with [`CflpError::NoFeasibleStart`] when even
/// opening every facility cannot cover demand, or when
/// `config.init_attempts` constructions were all rejected.
pub fn initial_solution<R: Rng>(
    evaluator: &Evaluator<'_>,
    config: &BvnsConfig,
    rng: &mut R,
) -> Result<Solution, CflpError> {
    let instance = evaluator.instance();
    if instance.total_capacity() + FEASIBILITY_EPS < instance.total_demand() {
        return Err(CflpError::NoFeasibleStart { attempts: 0 });
    }

    let solution = match config.init_mode {
        InitMode::Random => random_start(evaluator, config.init_attempts, rng)?,
        InitMode::CheapestFirst => cheapest_first(evaluator)?,
        InitMode::Rvns => {
            let walked = opening_walk(evaluator, config, rng)?;
            reduced_vns(evaluator, walked, config, rng)
        }
    };

    debug!(
        mode = ?config.init_mode,
        objective = solution.objective(),
        open = solution.open_set().open_count(),
        "initial solution built"
    );
    Ok(solution)
}

/// Opens facilities along a random permutation until capacity suffices.
fn random_start<R: Rng>(
    evaluator: &Evaluator<'_>,
    attempts: usize,
    rng: &mut R,
) -> Result<Solution, CflpError> {
    let n = evaluator.instance().num_facilities();
    for _ in 0..attempts {
        let mut order: Vec<usize> = (0..n).collect();
        u_numflow::random::shuffle(&mut order, rng);
        if let Some(solution) = open_in_order(evaluator, &order) {
            return Ok(solution);
        }
    }
    Err(CflpError::NoFeasibleStart { attempts })
}

/// Opens facilities by ascending opening cost (larger capacity, then lower
/// index on ties) until capacity suffices.
fn cheapest_first(evaluator: &Evaluator<'_>) -> Result<Solution, CflpError> {
    let instance = evaluator.instance();
    let mut order: Vec<usize> = (0..instance.num_facilities()).collect();
    order.sort_by(|&a, &b| {
        instance
            .opening_cost(a)
            .total_cmp(&instance.opening_cost(b))
            .then(instance.capacity(b).total_cmp(&instance.capacity(a)))
    });
    open_in_order(evaluator, &order).ok_or(CflpError::NoFeasibleStart { attempts: 1 })
}

/// Opens facilities in `order` until one evaluates successfully.
fn open_in_order(evaluator: &Evaluator<'_>, order: &[usize]) -> Option<Solution> {
    let mut open = OpenSet::closed(order.len());
    if evaluator.passes_precheck(&open) {
        if let Ok(solution) = evaluator.evaluate(open.clone()) {
            return Some(solution);
        }
    }
    for &i in order {
        open.flip(i);
        if evaluator.passes_precheck(&open) {
            if let Ok(solution) = evaluator.evaluate(open.clone()) {
                return Some(solution);
            }
        }
    }
    None
}

/// Walks from the all-closed state, opening `k` random facilities per
/// step (`k` cycling through `k_min..=k_max`) until the open-set evaluates.
fn opening_walk<R: Rng>(
    evaluator: &Evaluator<'_>,
    config: &BvnsConfig,
    rng: &mut R,
) -> Result<Solution, CflpError> {
    let n = evaluator.instance().num_facilities();
    let mut open = OpenSet::closed(n);
    let mut k = config.k_min;

    for attempt in 0..config.init_attempts {
        if evaluator.passes_precheck(&open) {
            if let Ok(solution) = evaluator.evaluate(open.clone()) {
                return Ok(solution);
            }
        }
        if open.open_count() == n {
            // Everything is open and still rejected; restart the walk.
            open = OpenSet::closed(n);
            debug!(attempt, "opening walk restarted");
        }
        open = open_random(&open, k, rng);
        k = if k >= config.k_max { config.k_min } else { k + 1 };
    }
    Err(CflpError::NoFeasibleStart {
        attempts: config.init_attempts,
    })
}

/// Shake and accept-if-better, without local search.
fn reduced_vns<R: Rng>(
    evaluator: &Evaluator<'_>,
    start: Solution,
    config: &BvnsConfig,
    rng: &mut R,
) -> Solution {
    let mut current = start;
    let mut k = config.k_min;

    for _ in 0..config.rvns_steps {
        let candidate = shake(
            current.open_set(),
            k,
            config.shaking_mode,
            evaluator.instance(),
            rng,
        );
        let improved = evaluator.passes_precheck(&candidate)
            && match evaluator.evaluate(candidate) {
                Ok(solution)
                    if solution.objective()
                        < current.objective() - config.improvement_epsilon =>
                {
                    current = solution;
                    true
                }
                _ => false,
            };

        k = if improved || k >= config.k_max {
            config.k_min
        } else {
            k + 1
        };
    }
    current
}
