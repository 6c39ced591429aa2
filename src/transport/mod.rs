//! Transportation subproblem solvers.
//!
//! For a fixed open-set `y`, route every customer's demand to open
//! facilities without exceeding capacity, at (approximately) minimum
//! transportation cost. Three interchangeable strategies are provided:
//!
//! - [`TransportMode::LeastCost`]: greedy cheapest-cell allocation.
//! - [`TransportMode::Vogel`]: Vogel's Approximation Method (default).
//! - [`TransportMode::Modi`]: Vogel start refined to optimality by the
//!   MODI (u-v potentials) method of the transportation simplex.
//!
//! All strategies fail fast with [`crate::CflpError::InfeasibleOpenSet`]
//! instead of under-serving demand.
//!
//! # References
//!
//! - Reinfeld, N. V. & Vogel, W. R. (1958). *Mathematical Programming*.
//!   Prentice-Hall.
//! - Dantzig, G. B. (1951). "Application of the simplex method to a
//!   transportation problem", *Activity Analysis of Production and Allocation*.

mod least_cost;
mod modi;
mod types;
mod vogel;

pub use least_cost::least_cost;
pub use modi::modi;
pub use types::{solve, FlowPlan, TransportMode, FLOW_EPS};
pub use vogel::vogel;
