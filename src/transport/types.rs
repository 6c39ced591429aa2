//! Shared transportation types and strategy dispatch.

use super::{least_cost, modi, vogel};
use crate::error::CflpError;
use crate::matrix::Matrix;
use crate::models::{Instance, OpenSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Remaining capacity or demand at or below this is treated as zero.
pub const FLOW_EPS: f64 = 1e-9;

/// Transportation subproblem strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportMode {
    /// Repeatedly fill the cheapest remaining (facility, customer) cell.
    LeastCost,
    /// Vogel's Approximation Method.
    ///
    /// Usually beats [`LeastCost`](Self::LeastCost) when open capacity is
    /// close to total demand. With a lot of spare capacity it can assign a
    /// customer to a facility that is not its cheapest and end up worse than
    /// greedy; prefer [`Modi`](Self::Modi) there.
    #[default]
    Vogel,
    /// Vogel start followed by MODI optimization. Never worse than either
    /// heuristic on the same open-set.
    Modi,
}

/// A complete flow assignment for one open-set.
#[derive(Debug, Clone)]
pub struct FlowPlan {
    /// `I × J` flows; rows of closed facilities are all zero.
    pub flows: Matrix<f64>,
    /// `Σ c_ij · x_ij`.
    pub cost: f64,
}

/// Solves the transportation subproblem with the selected strategy.
///
/// # Examples
///
/// ```
/// use u_facility::models::{Instance, OpenSet};
/// use u_facility::transport::{solve, TransportMode};
///
/// let inst = Instance::from_rows(
///     vec![4.0, 6.0],
///     vec![5.0, 10.0],
///     vec![1.0, 1.0],
///     vec![vec![1.0, 3.0], vec![2.0, 1.0]],
/// ).expect("valid");
/// let plan = solve(&inst, &OpenSet::all_open(2), TransportMode::Vogel).expect("feasible");
/// assert!((plan.cost - 10.0).abs() < 1e-9);
/// ```
pub fn solve(
    instance: &Instance,
    open: &OpenSet,
    mode: TransportMode,
) -> Result<FlowPlan, CflpError> {
    match mode {
        TransportMode::LeastCost => least_cost(instance, open),
        TransportMode::Vogel => vogel(instance, open),
        TransportMode::Modi => modi(instance, open),
    }
}

/// Rejects open-sets whose capacity cannot cover total demand.
pub(crate) fn ensure_capacity(instance: &Instance, open: &OpenSet) -> Result<(), CflpError> {
    if open.len() != instance.num_facilities() {
        return Err(CflpError::DimensionMismatch {
            what: "open-set length",
            expected: instance.num_facilities(),
            found: open.len(),
        });
    }
    let capacity = open.open_capacity(instance.capacities());
    let demand = instance.total_demand();
    if capacity + FLOW_EPS < demand {
        return Err(CflpError::InfeasibleOpenSet { capacity, demand });
    }
    Ok(())
}

/// Turns leftover demand into an error, or prices the flows.
pub(crate) fn finish(
    instance: &Instance,
    open: &OpenSet,
    flows: Matrix<f64>,
    remaining_demand: &[f64],
) -> Result<FlowPlan, CflpError> {
    let unserved: f64 = remaining_demand.iter().filter(|&&d| d > FLOW_EPS).sum();
    if unserved > 0.0 {
        return Err(CflpError::InfeasibleOpenSet {
            capacity: open.open_capacity(instance.capacities()),
            demand: unserved,
        });
    }
    let cost = instance.costs().inner_product(&flows)?;
    Ok(FlowPlan { flows, cost })
}
