//! Single-flip descent.

use super::config::LocalSearchMode;
use crate::evaluation::Evaluator;
use crate::models::Solution;

/// Descends to a local optimum of the one-flip neighborhood.
///
/// Neighbors failing the capacity pre-check are skipped without solving
/// their transportation subproblem; neighbors whose solve fails are
/// skipped as well. A move must improve by more than `epsilon`.
pub fn local_search(
    evaluator: &Evaluator<'_>,
    start: Solution,
    mode: LocalSearchMode,
    epsilon: f64,
) -> Solution {
    match mode {
        LocalSearchMode::BestImprovement => best_improvement(evaluator, start, epsilon),
        LocalSearchMode::FirstImprovement => first_improvement(evaluator, start, epsilon),
    }
}

fn best_improvement(evaluator: &Evaluator<'_>, start: Solution, epsilon: f64) -> Solution {
    let mut current = start;
    loop {
        let mut best: Option<Solution> = None;
        for i in 0..current.open_set().len() {
            let Some(neighbor) = evaluate_flip(evaluator, &current, i) else {
                continue;
            };
            let target = best.as_ref().unwrap_or(&current).objective();
            if neighbor.objective() < target - epsilon {
                best = Some(neighbor);
            }
        }
        match best {
            Some(next) => current = next,
            None => return current,
        }
    }
}

fn first_improvement(evaluator: &Evaluator<'_>, start: Solution, epsilon: f64) -> Solution {
    let mut current = start;
    'descent: loop {
        for i in 0..current.open_set().len() {
            let Some(neighbor) = evaluate_flip(evaluator, &current, i) else {
                continue;
            };
            if neighbor.objective() < current.objective() - epsilon {
                current = neighbor;
                continue 'descent;
            }
        }
        return current;
    }
}

fn evaluate_flip(evaluator: &Evaluator<'_>, current: &Solution, i: usize) -> Option<Solution> {
    let candidate = current.open_set().flipped(i);
    if !evaluator.passes_precheck(&candidate) {
        return None;
    }
    evaluator.evaluate(candidate).ok()
}
