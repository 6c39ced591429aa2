//! Error taxonomy for facility location runs.

use std::fmt;

/// Errors produced while building instances or running the search.
///
/// Only [`CflpError::InfeasibleOpenSet`] is recoverable: the controller
/// treats it as a rejected move. Every other variant aborts the run before
/// (or instead of) producing a solution.
#[derive(Debug)]
pub enum CflpError {
    /// No open-set satisfying global capacity was found by the initializer.
    NoFeasibleStart {
        /// Number of construction attempts made before giving up.
        attempts: usize,
    },

    /// The open facilities cannot serve the total demand.
    InfeasibleOpenSet {
        /// Capacity of the open facilities.
        capacity: f64,
        /// Total customer demand (or the demand left unserved).
        demand: f64,
    },

    /// Array lengths or matrix extents disagree.
    DimensionMismatch {
        /// Which quantity was checked.
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A negative or non-finite input value.
    InvalidValue {
        what: &'static str,
        index: usize,
        value: f64,
    },

    /// The run configuration failed validation.
    InvalidConfig(String),

    /// Malformed instance text.
    Parse {
        /// Zero-based token position where parsing failed.
        position: usize,
        message: String,
    },

    /// Underlying I/O failure while reading an instance.
    Io(std::io::Error),
}

impl fmt::Display for CflpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CflpError::NoFeasibleStart { attempts } => {
                write!(f, "no feasible starting open-set after {attempts} attempts")
            }
            CflpError::InfeasibleOpenSet { capacity, demand } => write!(
                f,
                "open facilities provide capacity {capacity} for demand {demand}"
            ),
            CflpError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(f, "dimension mismatch in {what}: expected {expected}, found {found}"),
            CflpError::InvalidValue { what, index, value } => {
                write!(f, "invalid {what} at index {index}: {value}")
            }
            CflpError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            CflpError::Parse { position, message } => {
                write!(f, "parse error at token {position}: {message}")
            }
            CflpError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for CflpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CflpError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CflpError {
    fn from(err: std::io::Error) -> Self {
        CflpError::Io(err)
    }
}

impl CflpError {
    /// Returns `true` for errors the search loop absorbs as rejected moves.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CflpError::InfeasibleOpenSet { .. })
    }
}
