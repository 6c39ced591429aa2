//! Greedy least-cost transportation heuristic.

use super::types::{ensure_capacity, finish, FlowPlan, FLOW_EPS};
use crate::error::CflpError;
use crate::matrix::Matrix;
use crate::models::{Instance, OpenSet};

/// Assigns flow cell by cell in ascending unit-cost order.
///
/// Each cell receives `min(remaining capacity, remaining demand)`. Ties
/// are broken by lower facility index, then lower customer index.
pub fn least_cost(instance: &Instance, open: &OpenSet) -> Result<FlowPlan, CflpError> {
    ensure_capacity(instance, open)?;

    let n_customers = instance.num_customers();
    let mut cells: Vec<(usize, usize)> = open
        .open_indices()
        .flat_map(|i| (0..n_customers).map(move |j| (i, j)))
        .collect();
    // Stable sort keeps (i, j) ascending among equal costs.
    cells.sort_by(|&(ai, aj), &(bi, bj)| instance.cost(ai, aj).total_cmp(&instance.cost(bi, bj)));

    let mut supply = instance.capacities().to_vec();
    let mut demand = instance.demands().to_vec();
    let mut flows = Matrix::new(instance.num_facilities(), n_customers);

    for (i, j) in cells {
        if supply[i] <= FLOW_EPS || demand[j] <= FLOW_EPS {
            continue;
        }
        let amount = supply[i].min(demand[j]);
        flows[(i, j)] += amount;
        supply[i] -= amount;
        demand[j] -= amount;
    }

    finish(instance, open, flows, &demand)
}
