//! Basic Variable Neighborhood Search (BVNS) over facility open-sets.
//!
//! The search walks the space of open-sets. Each iteration shakes the
//! incumbent by flipping `k` facilities, solves the transportation
//! subproblem for the result, descends with single-flip local search and
//! moves only on strict improvement. On improvement the neighborhood index
//! resets to `k_min`; otherwise it grows toward `k_max` and wraps.
//!
//! # References
//!
//! - Mladenović, N. & Hansen, P. (1997). "Variable neighborhood search",
//!   *Computers & Operations Research* 24(11), 1097-1100.
//! - Hansen, P. & Mladenović, N. (2001). "Variable neighborhood search:
//!   Principles and applications", *European Journal of Operational Research* 130(3), 449-467.
//! - Sridharan, R. (1995). "The capacitated plant location problem",
//!   *European Journal of Operational Research* 87(2), 203-213.

mod config;
mod init;
mod local_search;
mod runner;
mod shaking;
mod stopping;

pub use config::{BvnsConfig, InitMode, LocalSearchMode, ShakingMode, StoppingRule};
pub use init::initial_solution;
pub use local_search::local_search;
pub use runner::{BvnsResult, BvnsRunner, Termination};
pub use shaking::{shake, shake_feasible};
pub use stopping::{SearchProgress, StopCondition};
