//! MODI (modified distribution) refinement of a Vogel start.

use super::types::{FlowPlan, FLOW_EPS};
use super::{least_cost, vogel};
use crate::error::CflpError;
use crate::matrix::Matrix;
use crate::models::{Instance, OpenSet};
use std::collections::VecDeque;

/// Reduced costs above `-REDUCED_COST_EPS` count as non-improving.
const REDUCED_COST_EPS: f64 = 1e-9;

/// Optimal transportation flow for the given open-set.
///
/// Starts from [`vogel`], balances excess capacity with a zero-cost dummy
/// customer, completes a spanning-tree basis with zero-flow cells, and
/// pivots on the most negative reduced cost `c_ij - u_i - v_j` until none
/// remains. The pivot count is capped; if the cap is reached the cheaper of
/// the refined flow and [`least_cost`] is returned, so the result never
/// costs more than either heuristic.
///
/// # Examples
///
/// ```
/// use u_facility::models::{Instance, OpenSet};
/// use u_facility::transport::{modi, vogel};
///
/// let inst = Instance::from_rows(
///     vec![5.0, 8.0, 7.0, 14.0],
///     vec![7.0, 9.0, 18.0],
///     vec![0.0, 0.0, 0.0],
///     vec![
///         vec![19.0, 30.0, 50.0, 10.0],
///         vec![70.0, 30.0, 40.0, 60.0],
///         vec![40.0, 8.0, 70.0, 20.0],
///     ],
/// ).expect("valid");
/// let y = OpenSet::all_open(3);
/// let optimal = modi(&inst, &y).expect("feasible");
/// assert!((optimal.cost - 743.0).abs() < 1e-6);
/// assert!(optimal.cost <= vogel(&inst, &y).expect("feasible").cost);
/// ```
pub fn modi(instance: &Instance, open: &OpenSet) -> Result<FlowPlan, CflpError> {
    let start = vogel(instance, open)?;

    let rows: Vec<usize> = open.open_indices().collect();
    let cols: Vec<usize> = (0..instance.num_customers())
        .filter(|&j| instance.demand(j) > FLOW_EPS)
        .collect();
    if rows.is_empty() || cols.is_empty() {
        return Ok(start);
    }

    let Some(mut table) = Table::from_flows(instance, &rows, &cols, &start.flows) else {
        return Ok(start);
    };
    let max_pivots = (10 * (table.m + table.n)).max(100);
    let converged = table.optimize(max_pivots);

    let flows = table.to_flows(instance, &rows, &cols);
    let cost = instance.costs().inner_product(&flows)?;
    let mut best = if cost < start.cost {
        FlowPlan { flows, cost }
    } else {
        start
    };

    if !converged {
        let greedy = least_cost(instance, open)?;
        if greedy.cost < best.cost {
            best = greedy;
        }
    }
    Ok(best)
}

/// Balanced transportation table with a spanning-tree basis.
///
/// Nodes `0..m` are rows (facilities), `m..m + n` are columns (customers,
/// plus the dummy column when capacity exceeds demand).
struct Table {
    m: usize,
    n: usize,
    cost: Vec<f64>,
    flow: Vec<f64>,
    basic: Vec<bool>,
    basis: Vec<usize>,
}

impl Table {
    /// Builds the table from a basic feasible flow. Returns `None` if the
    /// positive cells contain a cycle.
    fn from_flows(
        instance: &Instance,
        rows: &[usize],
        cols: &[usize],
        flows: &Matrix<f64>,
    ) -> Option<Self> {
        let m = rows.len();
        let served: Vec<f64> = rows
            .iter()
            .map(|&i| cols.iter().map(|&j| flows.get(i, j)).sum())
            .collect();
        let slack: Vec<f64> = rows
            .iter()
            .zip(&served)
            .map(|(&i, &s)| (instance.capacity(i) - s).max(0.0))
            .collect();
        let has_dummy = slack.iter().sum::<f64>() > FLOW_EPS;
        let n = cols.len() + usize::from(has_dummy);

        let mut cost = vec![0.0; m * n];
        let mut flow = vec![0.0; m * n];
        for r in 0..m {
            for (c, &j) in cols.iter().enumerate() {
                cost[r * n + c] = instance.cost(rows[r], j);
                flow[r * n + c] = flows.get(rows[r], j);
            }
            if has_dummy {
                flow[r * n + n - 1] = slack[r];
            }
        }

        let mut sets = DisjointSets::new(m + n);
        let mut basic = vec![false; m * n];
        let mut basis = Vec::with_capacity(m + n - 1);
        for cell in 0..m * n {
            if flow[cell] > FLOW_EPS {
                let (r, c) = (cell / n, cell % n);
                if !sets.union(r, m + c) {
                    return None;
                }
                basic[cell] = true;
                basis.push(cell);
            } else {
                flow[cell] = 0.0;
            }
        }

        // Degenerate start: connect the forest with zero-flow cells.
        if basis.len() < m + n - 1 {
            let mut fillers: Vec<usize> = (0..m * n).filter(|&cell| !basic[cell]).collect();
            fillers.sort_by(|&a, &b| cost[a].total_cmp(&cost[b]));
            for cell in fillers {
                if basis.len() == m + n - 1 {
                    break;
                }
                let (r, c) = (cell / n, cell % n);
                if sets.union(r, m + c) {
                    basic[cell] = true;
                    basis.push(cell);
                }
            }
        }

        Some(Self {
            m,
            n,
            cost,
            flow,
            basic,
            basis,
        })
    }

    /// Pivots until optimal. Returns `false` if `max_pivots` ran out first.
    fn optimize(&mut self, max_pivots: usize) -> bool {
        for _ in 0..max_pivots {
            let (u, v) = self.potentials();

            let mut entering: Option<(usize, f64)> = None;
            for cell in 0..self.m * self.n {
                if self.basic[cell] {
                    continue;
                }
                let (r, c) = (cell / self.n, cell % self.n);
                let reduced = self.cost[cell] - u[r] - v[c];
                if reduced < -REDUCED_COST_EPS && entering.is_none_or(|(_, best)| reduced < best) {
                    entering = Some((cell, reduced));
                }
            }

            let Some((cell, _)) = entering else {
                return true;
            };
            self.pivot(cell);
        }
        false
    }

    /// Row potentials `u` and column potentials `v` with `u_0 = 0`.
    fn potentials(&self) -> (Vec<f64>, Vec<f64>) {
        let adjacency = self.adjacency();
        let mut u = vec![0.0; self.m];
        let mut v = vec![0.0; self.n];
        let mut seen = vec![false; self.m + self.n];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;

        while let Some(node) = queue.pop_front() {
            for &(next, cell) in &adjacency[node] {
                if seen[next] {
                    continue;
                }
                seen[next] = true;
                let (r, c) = (cell / self.n, cell % self.n);
                if node < self.m {
                    v[c] = self.cost[cell] - u[r];
                } else {
                    u[r] = self.cost[cell] - v[c];
                }
                queue.push_back(next);
            }
        }
        (u, v)
    }

    fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adjacency = vec![Vec::new(); self.m + self.n];
        for &cell in &self.basis {
            let (r, c) = (cell / self.n, cell % self.n);
            adjacency[r].push((self.m + c, cell));
            adjacency[self.m + c].push((r, cell));
        }
        adjacency
    }

    /// Moves flow around the stepping-stone cycle closed by `entering`.
    fn pivot(&mut self, entering: usize) {
        let (row, col) = (entering / self.n, entering % self.n);
        let path = self.tree_path(row, self.m + col);

        // path[0] sits in the entering column and loses flow; signs alternate.
        let mut theta = f64::INFINITY;
        let mut leaving = None;
        for &cell in path.iter().step_by(2) {
            if self.flow[cell] < theta {
                theta = self.flow[cell];
                leaving = Some(cell);
            }
        }
        let Some(leaving) = leaving else {
            return;
        };

        self.flow[entering] += theta;
        for (k, &cell) in path.iter().enumerate() {
            if k % 2 == 0 {
                self.flow[cell] = (self.flow[cell] - theta).max(0.0);
            } else {
                self.flow[cell] += theta;
            }
        }
        self.flow[leaving] = 0.0;

        self.basic[leaving] = false;
        self.basic[entering] = true;
        if let Some(slot) = self.basis.iter_mut().find(|slot| **slot == leaving) {
            *slot = entering;
        }
    }

    /// Basis cells on the tree path, listed from `to` back towards `from`.
    fn tree_path(&self, from: usize, to: usize) -> Vec<usize> {
        let adjacency = self.adjacency();
        let mut parent: Vec<Option<(usize, usize)>> = vec![None; self.m + self.n];
        let mut seen = vec![false; self.m + self.n];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;

        while let Some(node) = queue.pop_front() {
            if node == to {
                break;
            }
            for &(next, cell) in &adjacency[node] {
                if !seen[next] {
                    seen[next] = true;
                    parent[next] = Some((node, cell));
                    queue.push_back(next);
                }
            }
        }

        let mut path = Vec::new();
        let mut node = to;
        while let Some((prev, cell)) = parent[node] {
            path.push(cell);
            node = prev;
        }
        path
    }

    fn to_flows(&self, instance: &Instance, rows: &[usize], cols: &[usize]) -> Matrix<f64> {
        let mut flows = Matrix::new(instance.num_facilities(), instance.num_customers());
        for (r, &i) in rows.iter().enumerate() {
            for (c, &j) in cols.iter().enumerate() {
                flows[(i, j)] = self.flow[r * self.n + c];
            }
        }
        flows
    }
}

/// Union-find over table nodes.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Joins the sets of `a` and `b`; `false` if already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::least_cost;

    fn classic() -> Instance {
        Instance::from_rows(
            vec![5.0, 8.0, 7.0, 14.0],
            vec![7.0, 9.0, 18.0],
            vec![0.0, 0.0, 0.0],
            vec![
                vec![19.0, 30.0, 50.0, 10.0],
                vec![70.0, 30.0, 40.0, 60.0],
                vec![40.0, 8.0, 70.0, 20.0],
            ],
        )
        .expect("valid")
    }

    #[test]
    fn test_classic_optimum() {
        let plan = modi(&classic(), &OpenSet::all_open(3)).expect("feasible");
        assert!((plan.cost - 743.0).abs() < 1e-6, "got {}", plan.cost);
        assert_eq!(plan.flows.col_sums(), vec![5.0, 8.0, 7.0, 14.0]);
    }

    #[test]
    fn test_unbalanced_uses_cheapest_capacity() {
        // Three facilities, only one customer; the cheapest one serves it all.
        let inst = Instance::from_rows(
            vec![6.0],
            vec![10.0, 10.0, 10.0],
            vec![0.0, 0.0, 0.0],
            vec![vec![5.0], vec![1.0], vec![3.0]],
        )
        .expect("valid");
        let plan = modi(&inst, &OpenSet::all_open(3)).expect("feasible");
        assert_eq!(plan.flows[(1, 0)], 6.0);
        assert!((plan.cost - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_not_worse_than_heuristics() {
        let inst = Instance::from_rows(
            vec![7.0, 3.0, 9.0, 4.0, 6.0],
            vec![8.0, 12.0, 6.0, 10.0],
            vec![0.0; 4],
            vec![
                vec![4.0, 8.0, 1.0, 6.0, 3.0],
                vec![2.0, 5.0, 7.0, 3.0, 9.0],
                vec![6.0, 1.0, 4.0, 8.0, 2.0],
                vec![3.0, 7.0, 5.0, 2.0, 6.0],
            ],
        )
        .expect("valid");
        let y = OpenSet::all_open(4);
        let refined = modi(&inst, &y).expect("feasible");
        let v = vogel(&inst, &y).expect("feasible");
        let g = least_cost(&inst, &y).expect("feasible");
        assert!(refined.cost <= v.cost + 1e-9);
        assert!(refined.cost <= g.cost + 1e-9);
    }

    #[test]
    fn test_disjoint_sets() {
        let mut sets = DisjointSets::new(4);
        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(!sets.union(1, 0));
        assert!(sets.union(1, 3));
        assert_eq!(sets.find(0), sets.find(2));
    }
}
