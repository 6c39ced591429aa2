//! OR-Library capacitated warehouse location format.
//!
//! ```text
//! I J
//! capacity_0 opening_cost_0
//! ...
//! capacity_{I-1} opening_cost_{I-1}
//! demand_0
//! alloc_0_0 alloc_1_0 ... alloc_{I-1}_0
//! ...
//! ```
//!
//! Allocation costs are the cost of serving the whole demand of a customer
//! from a warehouse. They are divided by the demand to obtain per-unit
//! costs. Line breaks are insignificant.

use crate::error::CflpError;
use crate::matrix::Matrix;
use crate::models::Instance;
use std::path::Path;

/// Parses an OR-Library instance from text.
///
/// # Examples
///
/// ```
/// use u_facility::io::parse_orlib;
///
/// let text = "2 1\n10 5\n10 7\n4\n8 12\n";
/// let inst = parse_orlib(text).expect("well-formed");
/// assert_eq!(inst.num_facilities(), 2);
/// assert_eq!(inst.cost(0, 0), 2.0);
/// assert_eq!(inst.cost(1, 0), 3.0);
/// ```
pub fn parse_orlib(text: &str) -> Result<Instance, CflpError> {
    let mut tokens = Tokens::new(text);

    let n_facilities = tokens.next_count("facility count")?;
    let n_customers = tokens.next_count("customer count")?;

    // 2 header tokens, 2 per facility, and 1 + I per customer.
    let declared = n_facilities
        .checked_mul(2)
        .and_then(|f| n_facilities.checked_add(1)?.checked_mul(n_customers)?.checked_add(f))
        .and_then(|n| n.checked_add(2));
    if declared.is_none() {
        return Err(CflpError::Parse {
            position: 0,
            message: format!(
                "header declares {n_facilities} facilities and {n_customers} customers, \
                 which overflows the token count"
            ),
        });
    }

    // Buffers grow with the tokens actually read, never with the header.
    let mut capacities = Vec::new();
    let mut opening_costs = Vec::new();
    for _ in 0..n_facilities {
        capacities.push(tokens.next_number("capacity")?);
        opening_costs.push(tokens.next_number("opening cost")?);
    }

    let mut demands = Vec::new();
    let mut by_customer = Vec::new();
    for _ in 0..n_customers {
        let demand = tokens.next_number("demand")?;
        demands.push(demand);
        for _ in 0..n_facilities {
            let total = tokens.next_number("allocation cost")?;
            by_customer.push(if demand > 0.0 { total / demand } else { 0.0 });
        }
    }
    let costs = Matrix::from_vec(n_customers, n_facilities, by_customer)?.transpose();

    if let Some((position, token)) = tokens.next_raw() {
        return Err(CflpError::Parse {
            position,
            message: format!("unexpected trailing token `{token}`"),
        });
    }

    Instance::new(demands, capacities, opening_costs, costs)
}

/// Reads and parses an OR-Library instance file.
pub fn read_orlib<P: AsRef<Path>>(path: P) -> Result<Instance, CflpError> {
    let text = std::fs::read_to_string(path)?;
    parse_orlib(&text)
}

struct Tokens<'a> {
    inner: std::iter::Enumerate<std::str::SplitWhitespace<'a>>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace().enumerate(),
            consumed: 0,
        }
    }

    fn next_raw(&mut self) -> Option<(usize, &'a str)> {
        let next = self.inner.next();
        if next.is_some() {
            self.consumed += 1;
        }
        next
    }

    fn next_token(&mut self, what: &str) -> Result<(usize, &'a str), CflpError> {
        let position = self.consumed;
        self.next_raw().ok_or_else(|| CflpError::Parse {
            position,
            message: format!("expected {what}, found end of input"),
        })
    }

    fn next_number(&mut self, what: &str) -> Result<f64, CflpError> {
        let (position, token) = self.next_token(what)?;
        token.parse::<f64>().map_err(|_| CflpError::Parse {
            position,
            message: format!("expected {what}, found `{token}`"),
        })
    }

    fn next_count(&mut self, what: &str) -> Result<usize, CflpError> {
        let (position, token) = self.next_token(what)?;
        token.parse::<usize>().map_err(|_| CflpError::Parse {
            position,
            message: format!("expected {what}, found `{token}`"),
        })
    }
}
