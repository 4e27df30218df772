//! Dense Matrix Operations
//!
//! This module provides the minimal row-major matrix type the training engine
//! runs on. Every batch, weight, bias and gradient buffer is a [`Matrix`].
//!
//! ## Core Concepts
//!
//! - **Data**: Flat `Vec<f64>` storing all elements in row-major order
//! - **Shape**: `rows × cols`; a batch has one sample per row
//! - **Bias rows**: biases are `1 × cols` matrices broadcast over the batch
//!
//! ## Example
//!
//! ```rust
//! use learnact::Matrix;
//!
//! let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
//! let b = Matrix::new(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 3, 2);
//! let c = a.matmul(&b);
//! assert_eq!((c.rows, c.cols), (2, 2));
//! assert_eq!(c.data, vec![4.0, 5.0, 10.0, 11.0]);
//! ```
//!
//! ## Performance
//!
//! Large products use a parallel cache-blocked multiply via Rayon. Small
//! products (the common case for toy problems) stay sequential to avoid
//! scheduling overhead.
//!
//! Shape mismatches are contract violations and panic with a message naming
//! both operands.

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;

/// A dense row-major matrix of `f64`
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix from flat row-major data
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Data length ({}) doesn't match shape [{}, {}]",
            data.len(),
            rows,
            cols
        );
        Self { rows, cols, data }
    }

    /// Create a matrix filled with zeros
    ///
    /// ```rust
    /// # use learnact::Matrix;
    /// let m = Matrix::zeros(3, 4);
    /// assert_eq!(m.data.len(), 12);
    /// assert!(m.data.iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(vec![0.0; rows * cols], rows, cols)
    }

    /// Build a matrix from a slice of equally long rows
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "Row {} has {} columns, expected {}", i, row.len(), cols);
            data.extend_from_slice(row);
        }
        Self::new(data, rows.len(), cols)
    }

    /// Create a matrix with entries drawn uniformly from `[low, high]`
    ///
    /// # Panics
    ///
    /// Panics if `low > high` or either bound is not finite
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        let dist = Uniform::new_inclusive(low, high).expect("uniform bounds must be finite and ordered");
        let data = (0..rows * cols).map(|_| dist.sample(&mut *rng)).collect();
        Self::new(data, rows, cols)
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow row `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copy rows `start..end` into a new matrix
    pub fn slice_rows(&self, start: usize, end: usize) -> Matrix {
        assert!(
            start <= end && end <= self.rows,
            "Row range {}..{} out of bounds for {} rows",
            start,
            end,
            self.rows
        );
        Matrix::new(
            self.data[start * self.cols..end * self.cols].to_vec(),
            end - start,
            self.cols,
        )
    }

    /// Overwrite this matrix with a copy of `src`
    ///
    /// Reuses the existing allocation: storage grows when `src` is larger
    /// and is never released when it is smaller.
    pub fn assign(&mut self, src: &Matrix) {
        self.data.clear();
        self.data.extend_from_slice(&src.data);
        self.rows = src.rows;
        self.cols = src.cols;
    }

    /// SIMD-friendly inner loop: `result[j] += a_val * b[j]`
    #[inline(always)]
    fn matmul_inner(a_val: f64, b: &[f64], result: &mut [f64]) {
        for (r, &b_val) in result.iter_mut().zip(b.iter()) {
            *r += a_val * b_val;
        }
    }

    /// Matrix multiplication `self · other`
    ///
    /// # Panics
    ///
    /// Panics if `self.cols != other.rows`
    pub fn matmul(&self, other: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, other.rows,
            "Matrix dimensions incompatible: [{}, {}] @ [{}, {}]",
            self.rows, self.cols, other.rows, other.cols
        );

        let m = self.rows;
        let n = other.cols;
        let k = self.cols;

        if m * n * k >= 1_000 {
            return self.matmul_parallel_blocked(other, m, n, k);
        }

        let mut result = vec![0.0; m * n];
        for i in 0..m {
            for l in 0..k {
                let a_val = self.data[i * k + l];
                Self::matmul_inner(
                    a_val,
                    &other.data[l * n..(l + 1) * n],
                    &mut result[i * n..(i + 1) * n],
                );
            }
        }
        Matrix::new(result, m, n)
    }

    /// Parallel cache-blocked multiply over 8-row output blocks
    fn matmul_parallel_blocked(&self, other: &Matrix, m: usize, n: usize, k: usize) -> Matrix {
        const BLOCK_SIZE: usize = 8;

        let mut result = vec![0.0; m * n];

        result
            .par_chunks_mut(BLOCK_SIZE * n)
            .enumerate()
            .for_each(|(block_i, result_block)| {
                let i_start = block_i * BLOCK_SIZE;
                let i_end = (i_start + BLOCK_SIZE).min(m);

                for j_start in (0..n).step_by(BLOCK_SIZE) {
                    let j_end = (j_start + BLOCK_SIZE).min(n);

                    for k_start in (0..k).step_by(BLOCK_SIZE) {
                        let k_end = (k_start + BLOCK_SIZE).min(k);

                        for i in i_start..i_end {
                            let row_offset = (i - i_start) * n;
                            for k_idx in k_start..k_end {
                                Self::matmul_inner(
                                    self.data[i * k + k_idx],
                                    &other.data[k_idx * n + j_start..k_idx * n + j_end],
                                    &mut result_block[row_offset + j_start..row_offset + j_end],
                                );
                            }
                        }
                    }
                }
            });

        Matrix::new(result, m, n)
    }

    /// Transpose
    ///
    /// ```rust
    /// # use learnact::Matrix;
    /// let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
    /// let t = m.transpose();
    /// assert_eq!((t.rows, t.cols), (3, 2));
    /// assert_eq!(t.data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    /// ```
    pub fn transpose(&self) -> Matrix {
        let mut result = vec![0.0; self.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                result[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix::new(result, self.cols, self.rows)
    }

    /// Add a `1 × cols` row to every row of `self` in place
    ///
    /// # Panics
    ///
    /// Panics if `bias` is not a single row of matching width
    pub fn add_row_broadcast(&mut self, bias: &Matrix) {
        assert!(
            bias.rows == 1 && bias.cols == self.cols,
            "Unsupported broadcast for add: [{}, {}] + [{}, {}]",
            self.rows,
            self.cols,
            bias.rows,
            bias.cols
        );
        let cols = self.cols;
        self.data
            .par_chunks_mut(cols.max(1))
            .for_each(|row| Self::matmul_inner(1.0, &bias.data, row));
    }

    /// Element-wise `self += other`
    pub fn add_assign(&mut self, other: &Matrix) {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "Shapes must match for addition"
        );
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
    }

    /// Multiply every element by `s` in place
    pub fn scale(&mut self, s: f64) {
        self.data.iter_mut().for_each(|x| *x *= s);
    }

    /// Set every element to zero without releasing storage
    pub fn fill_zero(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Column means as a `1 × cols` row
    pub fn mean_rows(&self) -> Matrix {
        let mut sums = vec![0.0; self.cols];
        for row in self.data.chunks(self.cols.max(1)) {
            Self::matmul_inner(1.0, row, &mut sums);
        }
        let rows = self.rows.max(1) as f64;
        sums.iter_mut().for_each(|s| *s /= rows);
        Matrix::new(sums, 1, self.cols)
    }

    /// L2 (Frobenius) norm: √(Σ x²)
    pub fn l2_norm(&self) -> f64 {
        l2_norm(&self.data)
    }

    /// Rescale so the L2 norm is at most `max_norm`
    ///
    /// Returns the norm before clipping.
    pub fn clip_norm(&mut self, max_norm: f64) -> f64 {
        clip_norm(&mut self.data, max_norm)
    }

    /// Index of the largest element in row `i` (first one on ties)
    pub fn argmax_row(&self, i: usize) -> usize {
        let row = self.row(i);
        let mut best = 0;
        for (j, &v) in row.iter().enumerate().skip(1) {
            if v > row[best] {
                best = j;
            }
        }
        best
    }
}

/// L2 norm of a flat slice
pub fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Scale `values` down so its L2 norm does not exceed `max_norm`
///
/// All entries are scaled by the same factor, preserving direction. Returns
/// the norm before clipping.
///
/// ```rust
/// # use learnact::matrix::clip_norm;
/// let mut g = vec![3.0, 4.0];
/// let before = clip_norm(&mut g, 1.0);
/// assert_eq!(before, 5.0);
/// assert!((g[0] - 0.6).abs() < 1e-12 && (g[1] - 0.8).abs() < 1e-12);
/// ```
pub fn clip_norm(values: &mut [f64], max_norm: f64) -> f64 {
    let norm = l2_norm(values);
    if norm > max_norm {
        let scale = max_norm / norm;
        values.iter_mut().for_each(|v| *v *= scale);
    }
    norm
}
