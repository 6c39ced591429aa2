//! Dense two-dimensional numeric container.

use crate::error::CflpError;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense `rows × cols` matrix stored in row-major order.
///
/// Used for the cost matrix `c_ij` (facilities × customers) and for flow
/// assignments `x_ij`. Shape-changing arithmetic reports
/// [`CflpError::DimensionMismatch`] instead of panicking.
///
/// # Examples
///
/// ```
/// use u_facility::matrix::Matrix;
///
/// let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).expect("rectangular");
/// assert_eq!(m.rows(), 2);
/// assert_eq!(m[(1, 0)], 3.0);
/// assert_eq!(m.transpose()[(0, 1)], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Matrix<T> {
    /// Creates a matrix filled with `T::default()` (zero for numbers).
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::default())
    }
}

impl<T: Copy> Matrix<T> {
    /// Creates a matrix with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Wraps row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, CflpError> {
        if data.len() != rows * cols {
            return Err(CflpError::DimensionMismatch {
                what: "matrix data",
                expected: rows * cols,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from nested rows. All rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, CflpError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(CflpError::DimensionMismatch {
                    what: "matrix row length",
                    expected: n_cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the entry at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Underlying row-major storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the `cols × rows` transpose.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.get(i, j));
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    fn check_same_shape(&self, other: &Self) -> Result<(), CflpError> {
        if self.rows != other.rows {
            return Err(CflpError::DimensionMismatch {
                what: "matrix rows",
                expected: self.rows,
                found: other.rows,
            });
        }
        if self.cols != other.cols {
            return Err(CflpError::DimensionMismatch {
                what: "matrix cols",
                expected: self.cols,
                found: other.cols,
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &Self, op: impl Fn(T, T) -> T) -> Result<Self, CflpError> {
        self.check_same_shape(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }
}

impl<T> Matrix<T>
where
    T: Copy + Default + Add<Output = T> + Sub<Output = T> + Mul<Output = T>,
{
    /// Elementwise sum.
    pub fn checked_add(&self, other: &Self) -> Result<Self, CflpError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, CflpError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Multiplies every entry by `factor`.
    pub fn scale(&self, factor: T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| v * factor).collect(),
        }
    }

    /// Matrix product `self · other`.
    pub fn matmul(&self, other: &Self) -> Result<Self, CflpError> {
        if self.cols != other.rows {
            return Err(CflpError::DimensionMismatch {
                what: "matrix product inner dimension",
                expected: self.cols,
                found: other.rows,
            });
        }
        let mut result = Self::new(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                for j in 0..other.cols {
                    let idx = i * other.cols + j;
                    result.data[idx] = result.data[idx] + a * other.get(k, j);
                }
            }
        }
        Ok(result)
    }

    /// Frobenius inner product `Σ a_ij · b_ij`.
    pub fn inner_product(&self, other: &Self) -> Result<T, CflpError> {
        self.check_same_shape(other)?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .fold(T::default(), |acc, (&a, &b)| acc + a * b))
    }

    /// Sum of each row (length `rows`).
    pub fn row_sums(&self) -> Vec<T> {
        (0..self.rows)
            .map(|i| self.row(i).iter().fold(T::default(), |acc, &v| acc + v))
            .collect()
    }

    /// Sum of each column (length `cols`).
    pub fn col_sums(&self) -> Vec<T> {
        let mut sums = vec![T::default(); self.cols];
        for i in 0..self.rows {
            for (sum, &v) in sums.iter_mut().zip(self.row(i)) {
                *sum = *sum + v;
            }
        }
        sums
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[i * self.cols + j]
    }
}
