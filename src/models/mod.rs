//! Domain model types for capacitated facility location.
//!
//! Provides the immutable problem [`Instance`], the open/closed decision
//! vector [`OpenSet`], and the evaluated [`Solution`] pairing an open-set
//! with its flow assignment.

mod instance;
mod open_set;
mod solution;

pub use instance::Instance;
pub use open_set::OpenSet;
pub use solution::Solution;
