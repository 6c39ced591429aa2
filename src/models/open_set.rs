//! Open/closed facility decision vector.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The open-set `y`: `y[i] == true` means facility `i` is open.
///
/// Values are cheap to clone and every search step derives a fresh copy
/// instead of mutating a shared buffer.
///
/// # Examples
///
/// ```
/// use u_facility::models::OpenSet;
///
/// let y = OpenSet::closed(3).flipped(1);
/// assert!(y.is_open(1));
/// assert_eq!(y.open_count(), 1);
/// assert_eq!(y.open_capacity(&[5.0, 7.0, 9.0]), 7.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpenSet(Vec<bool>);

impl OpenSet {
    /// All `n` facilities closed.
    pub fn closed(n: usize) -> Self {
        Self(vec![false; n])
    }

    /// All `n` facilities open.
    pub fn all_open(n: usize) -> Self {
        Self(vec![true; n])
    }

    pub fn from_vec(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_open(&self, i: usize) -> bool {
        self.0[i]
    }

    /// Toggles facility `i` in place.
    pub fn flip(&mut self, i: usize) {
        self.0[i] = !self.0[i];
    }

    /// Returns a copy with facility `i` toggled.
    pub fn flipped(&self, i: usize) -> Self {
        let mut next = self.clone();
        next.flip(i);
        next
    }

    /// Indices of open facilities in ascending order.
    pub fn open_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &open)| open.then_some(i))
    }

    pub fn open_count(&self) -> usize {
        self.0.iter().filter(|&&open| open).count()
    }

    /// `Σ_{i: y_i} b_i`.
    pub fn open_capacity(&self, capacities: &[f64]) -> f64 {
        self.open_indices().map(|i| capacities[i]).sum()
    }

    /// `Σ_{i: y_i} f_i`.
    pub fn opening_cost(&self, opening_costs: &[f64]) -> f64 {
        self.open_indices().map(|i| opening_costs[i]).sum()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for OpenSet {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_and_all_open() {
        assert_eq!(OpenSet::closed(4).open_count(), 0);
        assert_eq!(OpenSet::all_open(4).open_count(), 4);
        assert!(OpenSet::closed(0).is_empty());
    }

    #[test]
    fn test_flipped_leaves_parent_untouched() {
        let parent = OpenSet::from_vec(vec![true, false, true]);
        let child = parent.flipped(0);
        assert!(parent.is_open(0));
        assert!(!child.is_open(0));
        assert_eq!(child.open_indices().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_capacity_and_cost_sums() {
        let y = OpenSet::from(vec![true, false, true]);
        assert_eq!(y.open_capacity(&[10.0, 20.0, 30.0]), 40.0);
        assert_eq!(y.opening_cost(&[1.0, 2.0, 3.0]), 4.0);
    }
}
