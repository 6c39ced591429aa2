//! Vogel's Approximation Method.

use super::types::{ensure_capacity, finish, FlowPlan, FLOW_EPS};
use crate::error::CflpError;
use crate::matrix::Matrix;
use crate::models::{Instance, OpenSet};

/// Penalty-driven allocation.
///
/// Rows are open facilities, columns are customers with positive demand.
/// Each round computes, for every active row and column, the difference
/// between its two cheapest active cells; the line with the largest
/// penalty receives as much flow as possible in its cheapest cell, and
/// whichever of row or column is exhausted leaves the table.
///
/// Supply may exceed demand, so a facility with a single active customer
/// left carries no urgency (penalty 0), while a customer with a single
/// active facility left is forced (penalty `+∞`).
///
/// # Examples
///
/// ```
/// use u_facility::models::{Instance, OpenSet};
/// use u_facility::transport::vogel;
///
/// let inst = Instance::from_rows(
///     vec![4.0, 6.0],
///     vec![5.0, 10.0],
///     vec![0.0, 0.0],
///     vec![vec![1.0, 3.0], vec![2.0, 1.0]],
/// ).expect("valid");
/// let plan = vogel(&inst, &OpenSet::all_open(2)).expect("feasible");
/// assert_eq!(plan.flows[(0, 0)], 4.0);
/// assert_eq!(plan.flows[(1, 1)], 6.0);
/// ```
pub fn vogel(instance: &Instance, open: &OpenSet) -> Result<FlowPlan, CflpError> {
    ensure_capacity(instance, open)?;

    let rows: Vec<usize> = open.open_indices().collect();
    let cols: Vec<usize> = (0..instance.num_customers())
        .filter(|&j| instance.demand(j) > FLOW_EPS)
        .collect();

    let mut supply: Vec<f64> = rows.iter().map(|&i| instance.capacity(i)).collect();
    let mut demand = instance.demands().to_vec();
    let mut flows = Matrix::new(instance.num_facilities(), instance.num_customers());

    let cost = |r: usize, c: usize| instance.cost(rows[r], cols[c]);

    // Each line keeps the opposite side sorted by cost; `heads` skip
    // entries that have left the table.
    let mut row_lines: Vec<Line> = (0..rows.len())
        .map(|r| Line::sorted(cols.len(), |c| cost(r, c)))
        .collect();
    let mut col_lines: Vec<Line> = (0..cols.len())
        .map(|c| Line::sorted(rows.len(), |r| cost(r, c)))
        .collect();

    let mut row_active: Vec<bool> = supply.iter().map(|&s| s > FLOW_EPS).collect();
    let mut col_active = vec![true; cols.len()];
    let mut cols_left = cols.len();

    while cols_left > 0 {
        let mut best: Option<Pick> = None;

        for (r, line) in row_lines.iter_mut().enumerate() {
            if !row_active[r] {
                continue;
            }
            if let Some((first, second)) = line.two_cheapest(&col_active) {
                let cheapest = cost(r, first);
                let penalty = second.map_or(0.0, |s| cost(r, s) - cheapest);
                consider(&mut best, Pick::new(penalty, cheapest, r, first));
            }
        }
        for (c, line) in col_lines.iter_mut().enumerate() {
            if !col_active[c] {
                continue;
            }
            if let Some((first, second)) = line.two_cheapest(&row_active) {
                let cheapest = cost(first, c);
                let penalty = second.map_or(f64::INFINITY, |s| cost(s, c) - cheapest);
                consider(&mut best, Pick::new(penalty, cheapest, first, c));
            }
        }

        // Active customers but no facility left with capacity.
        let Some(pick) = best else {
            break;
        };

        let (r, c) = (pick.row, pick.col);
        let j = cols[c];
        let amount = supply[r].min(demand[j]);
        flows[(rows[r], j)] += amount;
        supply[r] -= amount;
        demand[j] -= amount;

        if demand[j] <= FLOW_EPS {
            col_active[c] = false;
            cols_left -= 1;
        }
        if supply[r] <= FLOW_EPS {
            row_active[r] = false;
        }
    }

    finish(instance, open, flows, &demand)
}

/// Candidate allocation chosen by the largest penalty.
#[derive(Debug, Clone, Copy)]
struct Pick {
    penalty: f64,
    cheapest: f64,
    row: usize,
    col: usize,
}

impl Pick {
    fn new(penalty: f64, cheapest: f64, row: usize, col: usize) -> Self {
        Self {
            penalty,
            cheapest,
            row,
            col,
        }
    }
}

/// Keeps the larger penalty; on equal penalty the cheaper cell. Earlier
/// candidates (rows before columns, lower index first) win full ties.
fn consider(best: &mut Option<Pick>, candidate: Pick) {
    let better = match best {
        None => true,
        Some(current) => {
            candidate.penalty > current.penalty
                || (candidate.penalty == current.penalty && candidate.cheapest < current.cheapest)
        }
    };
    if better {
        *best = Some(candidate);
    }
}

/// Opposite-side indices of one row or column, sorted by cost.
struct Line {
    order: Vec<usize>,
    head: usize,
}

impl Line {
    fn sorted(len: usize, cost: impl Fn(usize) -> f64) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.sort_by(|&a, &b| cost(a).total_cmp(&cost(b)));
        Self { order, head: 0 }
    }

    /// Cheapest and second-cheapest active entries.
    fn two_cheapest(&mut self, active: &[bool]) -> Option<(usize, Option<usize>)> {
        while self.head < self.order.len() && !active[self.order[self.head]] {
            self.head += 1;
        }
        let first = *self.order.get(self.head)?;
        let second = self.order[self.head + 1..]
            .iter()
            .copied()
            .find(|&idx| active[idx]);
        Some((first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::least_cost;

    #[test]
    fn test_classic_balanced_table() {
        // 3 facilities × 4 customers, balanced.
        let inst = Instance::from_rows(
            vec![5.0, 8.0, 7.0, 14.0],
            vec![7.0, 9.0, 18.0],
            vec![0.0, 0.0, 0.0],
            vec![
                vec![19.0, 30.0, 50.0, 10.0],
                vec![70.0, 30.0, 40.0, 60.0],
                vec![40.0, 8.0, 70.0, 20.0],
            ],
        )
        .expect("valid");
        let plan = vogel(&inst, &OpenSet::all_open(3)).expect("feasible");
        assert!((plan.cost - 779.0).abs() < 1e-9, "got {}", plan.cost);
    }

    #[test]
    fn test_penalty_beats_greedy() {
        // Greedy grabs (0,0) and leaves customer 1 an expensive facility.
        let inst = Instance::from_rows(
            vec![10.0, 10.0],
            vec![10.0, 10.0],
            vec![0.0, 0.0],
            vec![vec![1.0, 2.0], vec![1.0, 100.0]],
        )
        .expect("valid");
        let y = OpenSet::all_open(2);
        let v = vogel(&inst, &y).expect("feasible");
        let g = least_cost(&inst, &y).expect("feasible");
        assert!((v.cost - 30.0).abs() < 1e-9, "vogel got {}", v.cost);
        assert!((g.cost - 1010.0).abs() < 1e-9, "greedy got {}", g.cost);
    }

    #[test]
    fn test_zero_demand_customers_skipped() {
        let inst = Instance::from_rows(
            vec![0.0, 5.0],
            vec![5.0],
            vec![1.0],
            vec![vec![3.0, 2.0]],
        )
        .expect("valid");
        let plan = vogel(&inst, &OpenSet::all_open(1)).expect("feasible");
        assert_eq!(plan.flows[(0, 0)], 0.0);
        assert_eq!(plan.flows[(0, 1)], 5.0);
    }

    #[test]
    fn test_excess_supply_left_unused() {
        let inst = Instance::from_rows(
            vec![3.0],
            vec![10.0, 10.0],
            vec![0.0, 0.0],
            vec![vec![2.0], vec![1.0]],
        )
        .expect("valid");
        let plan = vogel(&inst, &OpenSet::all_open(2)).expect("feasible");
        assert_eq!(plan.flows[(1, 0)], 3.0);
        assert!((plan.cost - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_demand() {
        let inst = Instance::from_rows(vec![], vec![5.0], vec![1.0], vec![vec![]]).expect("valid");
        let plan = vogel(&inst, &OpenSet::closed(1)).expect("nothing to serve");
        assert_eq!(plan.cost, 0.0);
    }
}
