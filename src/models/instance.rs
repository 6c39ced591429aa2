//! Problem instance.

use crate::error::CflpError;
use crate::matrix::Matrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable CFLP data: `I` candidate facilities and `J` customers.
///
/// The cost matrix is `I × J`: row `i` holds the unit transportation cost
/// from facility `i` to every customer.
///
/// # Examples
///
/// ```
/// use u_facility::models::Instance;
///
/// let inst = Instance::from_rows(
///     vec![8.0, 8.0],
///     vec![10.0, 10.0],
///     vec![5.0, 5.0],
///     vec![vec![1.0, 1.0], vec![1.0, 1.0]],
/// ).expect("consistent dimensions");
/// assert_eq!(inst.num_facilities(), 2);
/// assert_eq!(inst.total_demand(), 16.0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instance {
    demands: Vec<f64>,
    capacities: Vec<f64>,
    opening_costs: Vec<f64>,
    costs: Matrix<f64>,
    total_demand: f64,
    total_capacity: f64,
}

impl Instance {
    /// Validates and builds an instance.
    ///
    /// Fails with [`CflpError::DimensionMismatch`] when the array lengths
    /// disagree with the cost matrix extents, and with
    /// [`CflpError::InvalidValue`] on negative or non-finite data.
    pub fn new(
        demands: Vec<f64>,
        capacities: Vec<f64>,
        opening_costs: Vec<f64>,
        costs: Matrix<f64>,
    ) -> Result<Self, CflpError> {
        let n_facilities = capacities.len();
        if opening_costs.len() != n_facilities {
            return Err(CflpError::DimensionMismatch {
                what: "opening costs",
                expected: n_facilities,
                found: opening_costs.len(),
            });
        }
        if costs.rows() != n_facilities {
            return Err(CflpError::DimensionMismatch {
                what: "cost matrix rows",
                expected: n_facilities,
                found: costs.rows(),
            });
        }
        if costs.cols() != demands.len() {
            return Err(CflpError::DimensionMismatch {
                what: "cost matrix cols",
                expected: demands.len(),
                found: costs.cols(),
            });
        }

        check_values("demand", &demands)?;
        check_values("capacity", &capacities)?;
        check_values("opening cost", &opening_costs)?;
        check_values("transportation cost", costs.as_slice())?;

        let total_demand = demands.iter().sum();
        let total_capacity = capacities.iter().sum();

        Ok(Self {
            demands,
            capacities,
            opening_costs,
            costs,
            total_demand,
            total_capacity,
        })
    }

    /// Builds an instance from a nested cost table (one row per facility).
    pub fn from_rows(
        demands: Vec<f64>,
        capacities: Vec<f64>,
        opening_costs: Vec<f64>,
        costs: Vec<Vec<f64>>,
    ) -> Result<Self, CflpError> {
        let costs = if costs.is_empty() {
            Matrix::new(0, demands.len())
        } else {
            Matrix::from_rows(costs)?
        };
        Self::new(demands, capacities, opening_costs, costs)
    }

    /// Number of candidate facilities `I`.
    pub fn num_facilities(&self) -> usize {
        self.capacities.len()
    }

    /// Number of customers `J`.
    pub fn num_customers(&self) -> usize {
        self.demands.len()
    }

    pub fn demand(&self, j: usize) -> f64 {
        self.demands[j]
    }

    pub fn capacity(&self, i: usize) -> f64 {
        self.capacities[i]
    }

    pub fn opening_cost(&self, i: usize) -> f64 {
        self.opening_costs[i]
    }

    /// Unit transportation cost from facility `i` to customer `j`.
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        self.costs.get(i, j)
    }

    pub fn demands(&self) -> &[f64] {
        &self.demands
    }

    pub fn capacities(&self) -> &[f64] {
        &self.capacities
    }

    pub fn opening_costs(&self) -> &[f64] {
        &self.opening_costs
    }

    pub fn costs(&self) -> &Matrix<f64> {
        &self.costs
    }

    /// `Σ_j d_j`.
    pub fn total_demand(&self) -> f64 {
        self.total_demand
    }

    /// `Σ_i b_i` over all candidate facilities.
    pub fn total_capacity(&self) -> f64 {
        self.total_capacity
    }
}

fn check_values(what: &'static str, values: &[f64]) -> Result<(), CflpError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some((index, &value)) => Err(CflpError::InvalidValue { what, index, value }),
        None => Ok(()),
    }
}
