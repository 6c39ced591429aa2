//! Capacitated facility location solved by Basic Variable Neighborhood Search.
//!
//! Given facilities with capacities and opening costs, customers with
//! demands, and per-unit transportation costs, the crate searches for the
//! set of facilities to open and the flows that serve every customer at
//! minimum total opening plus transportation cost.
//!
//! - **Models** ([`models`]): validated [`Instance`](models::Instance) data,
//!   the [`OpenSet`](models::OpenSet) decision vector and evaluated
//!   [`Solution`](models::Solution)s.
//! - **Transportation** ([`transport`]): flow assignment for a fixed
//!   open-set by least-cost greedy, Vogel's approximation, or the MODI
//!   transportation simplex.
//! - **Evaluation** ([`evaluation`]): capacity pre-check, flow feasibility
//!   and the objective.
//! - **BVNS** ([`bvns`]): initializers, shaking, single-flip local search
//!   and the search controller with pluggable stopping rules.
//! - **I/O** ([`io`]): OR-Library `capNN` instance loader.
//!
//! # Example
//!
//! ```
//! use u_facility::bvns::{BvnsConfig, BvnsRunner};
//! use u_facility::models::Instance;
//!
//! let instance = Instance::from_rows(
//!     vec![4.0, 6.0],
//!     vec![10.0, 10.0, 10.0],
//!     vec![20.0, 8.0, 30.0],
//!     vec![vec![1.0, 5.0], vec![2.0, 2.0], vec![4.0, 1.0]],
//! )
//! .expect("valid instance");
//!
//! let config = BvnsConfig::default().with_seed(7).with_max_iterations(30);
//! let result = BvnsRunner::run(&instance, &config).expect("feasible");
//! // Facility 1 alone serves both customers: 8 + 4*2 + 6*2.
//! assert!((result.best_cost() - 28.0).abs() < 1e-9);
//! ```

pub mod bvns;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod matrix;
pub mod models;
pub mod transport;

pub use error::CflpError;
