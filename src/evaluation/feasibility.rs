//! Constraint checks and the objective function.

use crate::matrix::Matrix;
use crate::models::OpenSet;

/// Tolerance for demand coverage and capacity comparisons.
pub const FEASIBILITY_EPS: f64 = 1e-6;

/// Verifies a flow assignment against capacity and demand constraints.
///
/// Returns `true` iff
/// - every customer receives exactly its demand (within tolerance),
/// - no open facility ships more than its capacity,
/// - closed facilities ship nothing and no flow is negative.
///
/// # Examples
///
/// ```
/// use u_facility::evaluation::check_solution;
/// use u_facility::matrix::Matrix;
/// use u_facility::models::OpenSet;
///
/// let x = Matrix::from_rows(vec![vec![8.0, 2.0], vec![0.0, 6.0]]).expect("2x2");
/// let y = OpenSet::all_open(2);
/// assert!(check_solution(&y, &x, &[10.0, 10.0], &[8.0, 8.0]));
/// assert!(!check_solution(&y, &x, &[9.0, 10.0], &[8.0, 8.0]));
/// ```
pub fn check_solution(
    open: &OpenSet,
    flows: &Matrix<f64>,
    capacities: &[f64],
    demands: &[f64],
) -> bool {
    if flows.rows() != open.len()
        || flows.rows() != capacities.len()
        || flows.cols() != demands.len()
    {
        return false;
    }
    if flows.as_slice().iter().any(|&x| x < -FEASIBILITY_EPS || !x.is_finite()) {
        return false;
    }

    let shipped = flows.row_sums();
    for (i, (&out, &cap)) in shipped.iter().zip(capacities).enumerate() {
        if !open.is_open(i) {
            if flows.row(i).iter().any(|&x| x.abs() > FEASIBILITY_EPS) {
                return false;
            }
        } else if out > cap + FEASIBILITY_EPS {
            return false;
        }
    }

    flows
        .col_sums()
        .iter()
        .zip(demands)
        .all(|(&received, &d)| (received - d).abs() <= FEASIBILITY_EPS)
}

/// Global capacity pre-check: `Σ_{i: y_i} b_i ≥ Σ_j d_j`.
///
/// A `false` result means no flow assignment can exist for this open-set,
/// so the transportation solve can be skipped.
pub fn can_update_flows(capacities: &[f64], open: &OpenSet, total_demand: f64) -> bool {
    open.open_capacity(capacities) + FEASIBILITY_EPS >= total_demand
}

/// Objective: opening costs of open facilities plus transportation cost.
pub fn objective(open: &OpenSet, opening_costs: &[f64], transport_cost: f64) -> f64 {
    open.opening_cost(opening_costs) + transport_cost
}
