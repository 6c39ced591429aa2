//! Evaluated solution.

use super::OpenSet;
use crate::matrix::Matrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An open-set together with its flow assignment and cached objective.
///
/// Solutions are produced by [`crate::evaluation::Evaluator`] and never
/// mutated afterwards: changing `y` means evaluating a new solution.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    open: OpenSet,
    flows: Matrix<f64>,
    transport_cost: f64,
    opening_cost: f64,
    objective: f64,
}

impl Solution {
    pub(crate) fn new(
        open: OpenSet,
        flows: Matrix<f64>,
        transport_cost: f64,
        opening_cost: f64,
        objective: f64,
    ) -> Self {
        Self {
            open,
            flows,
            transport_cost,
            opening_cost,
            objective,
        }
    }

    /// The open-set `y`.
    pub fn open_set(&self) -> &OpenSet {
        &self.open
    }

    /// The `I × J` flow matrix `x`.
    pub fn flows(&self) -> &Matrix<f64> {
        &self.flows
    }

    /// `Σ c_ij · x_ij`.
    pub fn transport_cost(&self) -> f64 {
        self.transport_cost
    }

    /// `Σ_{i: y_i} f_i`.
    pub fn opening_cost(&self) -> f64 {
        self.opening_cost
    }

    /// Total cost: opening plus transportation.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Non-zero flows as `(facility, customer, amount)`, row-major.
    pub fn assignments(&self) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::new();
        for i in 0..self.flows.rows() {
            for (j, &amount) in self.flows.row(i).iter().enumerate() {
                if amount > 0.0 {
                    out.push((i, j, amount));
                }
            }
        }
        out
    }
}
