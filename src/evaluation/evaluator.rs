//! Open-set evaluation pipeline.

use super::feasibility::{can_update_flows, check_solution, objective};
use crate::error::CflpError;
use crate::matrix::Matrix;
use crate::models::{Instance, OpenSet, Solution};
use crate::transport::{self, TransportMode};

/// Turns open-sets into evaluated [`Solution`]s for one instance.
///
/// Pipeline: capacity pre-check → transportation solve → constraint
/// check → objective. Any failure is reported as
/// [`CflpError::InfeasibleOpenSet`]; evaluation has no side effects, so
/// the same open-set always yields the same verdict and cost.
///
/// # Examples
///
/// ```
/// use u_facility::evaluation::Evaluator;
/// use u_facility::models::{Instance, OpenSet};
/// use u_facility::transport::TransportMode;
///
/// let inst = Instance::from_rows(
///     vec![8.0, 8.0],
///     vec![10.0, 10.0],
///     vec![5.0, 5.0],
///     vec![vec![1.0, 1.0], vec![1.0, 1.0]],
/// ).expect("valid");
/// let eval = Evaluator::new(&inst, TransportMode::Vogel);
/// let sol = eval.evaluate(OpenSet::all_open(2)).expect("feasible");
/// assert!((sol.objective() - 26.0).abs() < 1e-9);
/// assert!(eval.evaluate(OpenSet::from_vec(vec![true, false])).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    instance: &'a Instance,
    mode: TransportMode,
}

impl<'a> Evaluator<'a> {
    pub fn new(instance: &'a Instance, mode: TransportMode) -> Self {
        Self { instance, mode }
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Cheap global-capacity test for `open`.
    pub fn passes_precheck(&self, open: &OpenSet) -> bool {
        can_update_flows(self.instance.capacities(), open, self.instance.total_demand())
    }

    /// Builds and validates the full solution for `open`.
    pub fn evaluate(&self, open: OpenSet) -> Result<Solution, CflpError> {
        let capacity = open.open_capacity(self.instance.capacities());
        let demand = self.instance.total_demand();
        if !self.passes_precheck(&open) {
            return Err(CflpError::InfeasibleOpenSet { capacity, demand });
        }

        let plan = transport::solve(self.instance, &open, self.mode)?;
        if !self.is_feasible(&open, &plan.flows) {
            return Err(CflpError::InfeasibleOpenSet { capacity, demand });
        }

        let opening_cost = open.opening_cost(self.instance.opening_costs());
        let total = objective(&open, self.instance.opening_costs(), plan.cost);
        Ok(Solution::new(open, plan.flows, plan.cost, opening_cost, total))
    }

    /// Re-validates an existing solution against this instance.
    pub fn verify(&self, solution: &Solution) -> bool {
        self.is_feasible(solution.open_set(), solution.flows())
    }

    fn is_feasible(&self, open: &OpenSet, flows: &Matrix<f64>) -> bool {
        check_solution(
            open,
            flows,
            self.instance.capacities(),
            self.instance.demands(),
        )
    }
}
