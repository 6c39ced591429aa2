//! Feasibility checks and objective evaluation.
//!
//! [`can_update_flows`] is the cheap global-capacity pre-check run before
//! paying for a transportation solve; [`check_solution`] validates a
//! materialized flow; [`objective`] prices it. [`Evaluator`] chains all
//! three into `open-set → Solution`.

mod evaluator;
mod feasibility;

pub use evaluator::Evaluator;
pub use feasibility::{can_update_flows, check_solution, objective, FEASIBILITY_EPS};
