//! Owned dense containers in column-major order.
//!
//! - [`Mat`]: heap-allocated matrix, element `(r, c)` at offset `r + c * n_rows`
//! - [`Cube`]: stack of `n_slices` matrices stored back to back
//! - [`MatFixed`]: stack-allocated matrix with compile-time dimensions
//!
//! These containers own their storage; every kernel in this crate writes into a
//! `Mat`/`Cube` that has already been sized by one of the methods below.

use std::ops::{Index, IndexMut};

use crate::{Element, ExprError, Result};

// ============================================================================
// Mat
// ============================================================================

/// Owned column-major matrix.
#[derive(Clone, PartialEq)]
pub struct Mat<T> {
    data: Vec<T>,
    n_rows: usize,
    n_cols: usize,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Mat<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mat")
            .field("n_rows", &self.n_rows)
            .field("n_cols", &self.n_cols)
            .field("data", &self.data)
            .finish()
    }
}

impl<T> Default for Mat<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mat<T> {
    /// Create an empty 0x0 matrix.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            n_rows: 0,
            n_cols: 0,
        }
    }

    /// Create from a column-major buffer.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `data.len() != n_rows * n_cols`.
    pub fn from_col_major(n_rows: usize, n_cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != n_rows * n_cols {
            return Err(ExprError::ShapeMismatch {
                op: "Mat::from_col_major()",
                expected: vec![n_rows * n_cols],
                found: vec![data.len()],
            });
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Create a matrix with values produced by `f(row, col)`.
    ///
    /// The function is called in column-major order.
    pub fn from_fn(n_rows: usize, n_cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for c in 0..n_cols {
            for r in 0..n_rows {
                data.push(f(r, c));
            }
        }
        Self {
            data,
            n_rows,
            n_cols,
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn n_elem(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for `1 x n` and `n x 1` shapes.
    #[inline]
    pub fn is_vec(&self) -> bool {
        self.n_rows == 1 || self.n_cols == 1
    }

    #[inline]
    pub fn is_rowvec(&self) -> bool {
        self.n_rows == 1
    }

    #[inline]
    pub fn is_colvec(&self) -> bool {
        self.n_cols == 1
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.n_rows == self.n_cols
    }

    /// Whether this matrix has the given shape.
    #[inline]
    pub fn is_size(&self, n_rows: usize, n_cols: usize) -> bool {
        self.n_rows == n_rows && self.n_cols == n_cols
    }

    /// Column-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Storage of column `c`.
    #[inline]
    pub fn col(&self, c: usize) -> &[T] {
        let start = c * self.n_rows;
        &self.data[start..start + self.n_rows]
    }

    #[inline]
    pub fn col_mut(&mut self, c: usize) -> &mut [T] {
        let start = c * self.n_rows;
        &mut self.data[start..start + self.n_rows]
    }

    /// Consume the matrix and return its column-major buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Reset to an empty 0x0 matrix, releasing the buffer.
    pub fn reset(&mut self) {
        self.data = Vec::new();
        self.n_rows = 0;
        self.n_cols = 0;
    }

    /// Take over the buffer of `other`, leaving `other` empty (0x0).
    ///
    /// This is a move of the buffer handle; no element is copied.
    pub fn steal_mem(&mut self, other: &mut Mat<T>) {
        self.data = std::mem::take(&mut other.data);
        self.n_rows = other.n_rows;
        self.n_cols = other.n_cols;
        other.n_rows = 0;
        other.n_cols = 0;
    }
}

impl<T: Element> Mat<T> {
    /// Create a matrix filled with zeros.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            data: vec![T::zero(); n_rows * n_cols],
            n_rows,
            n_cols,
        }
    }

    /// Create a matrix filled with ones.
    pub fn ones(n_rows: usize, n_cols: usize) -> Self {
        Self {
            data: vec![T::one(); n_rows * n_cols],
            n_rows,
            n_cols,
        }
    }

    /// Change the shape. Existing values are kept only when the element count
    /// is unchanged; new storage is zero-filled.
    pub fn set_size(&mut self, n_rows: usize, n_cols: usize) {
        let n_elem = n_rows * n_cols;
        if n_elem != self.data.len() {
            self.data.clear();
            self.data.resize(n_elem, T::zero());
        }
        self.n_rows = n_rows;
        self.n_cols = n_cols;
    }

    /// Resize to `n_rows x n_cols` and set every element to zero.
    pub fn set_zeros(&mut self, n_rows: usize, n_cols: usize) {
        self.set_size(n_rows, n_cols);
        self.fill(T::zero());
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Element at `(row, col)`.
    ///
    /// Only the storage bound is checked in release builds.
    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.n_rows && col < self.n_cols);
        self.data[row + col * self.n_rows]
    }

    /// Mutable element at `(row, col)`.
    #[inline(always)]
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut T {
        debug_assert!(row < self.n_rows && col < self.n_cols);
        &mut self.data[row + col * self.n_rows]
    }

    /// Bounds-checked element access.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `row >= n_rows` or `col >= n_cols`.
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        if row >= self.n_rows {
            return Err(ExprError::OutOfRange {
                op: "Mat::get()",
                index: row,
                len: self.n_rows,
            });
        }
        if col >= self.n_cols {
            return Err(ExprError::OutOfRange {
                op: "Mat::get()",
                index: col,
                len: self.n_cols,
            });
        }
        Ok(self.data[row + col * self.n_rows])
    }
}

impl<T> Index<(usize, usize)> for Mat<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.n_rows && col < self.n_cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.n_rows,
            self.n_cols
        );
        &self.data[row + col * self.n_rows]
    }
}

impl<T> IndexMut<(usize, usize)> for Mat<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(
            row < self.n_rows && col < self.n_cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.n_rows,
            self.n_cols
        );
        &mut self.data[row + col * self.n_rows]
    }
}

// ============================================================================
// Cube
// ============================================================================

/// Owned column-major rank-3 array.
///
/// Element `(r, c, s)` lives at `r + c * n_rows + s * n_rows * n_cols`.
#[derive(Clone, PartialEq)]
pub struct Cube<T> {
    data: Vec<T>,
    n_rows: usize,
    n_cols: usize,
    n_slices: usize,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Cube<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cube")
            .field("n_rows", &self.n_rows)
            .field("n_cols", &self.n_cols)
            .field("n_slices", &self.n_slices)
            .finish()
    }
}

impl<T> Default for Cube<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cube<T> {
    /// Create an empty 0x0x0 cube.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            n_rows: 0,
            n_cols: 0,
            n_slices: 0,
        }
    }

    /// Create a cube with values produced by `f(row, col, slice)`, in storage order.
    pub fn from_fn(
        n_rows: usize,
        n_cols: usize,
        n_slices: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut data = Vec::with_capacity(n_rows * n_cols * n_slices);
        for s in 0..n_slices {
            for c in 0..n_cols {
                for r in 0..n_rows {
                    data.push(f(r, c, s));
                }
            }
        }
        Self {
            data,
            n_rows,
            n_cols,
            n_slices,
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn n_slices(&self) -> usize {
        self.n_slices
    }

    #[inline]
    pub fn n_elem_slice(&self) -> usize {
        self.n_rows * self.n_cols
    }

    #[inline]
    pub fn n_elem(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_size(&self, n_rows: usize, n_cols: usize, n_slices: usize) -> bool {
        self.n_rows == n_rows && self.n_cols == n_cols && self.n_slices == n_slices
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Storage of slice `s` (a column-major `n_rows x n_cols` plane).
    pub fn slice(&self, s: usize) -> &[T] {
        let len = self.n_elem_slice();
        &self.data[s * len..(s + 1) * len]
    }
}

impl<T: Element> Cube<T> {
    pub fn zeros(n_rows: usize, n_cols: usize, n_slices: usize) -> Self {
        Self {
            data: vec![T::zero(); n_rows * n_cols * n_slices],
            n_rows,
            n_cols,
            n_slices,
        }
    }

    /// Change the shape; see [`Mat::set_size`].
    pub fn set_size(&mut self, n_rows: usize, n_cols: usize, n_slices: usize) {
        let n_elem = n_rows * n_cols * n_slices;
        if n_elem != self.data.len() {
            self.data.clear();
            self.data.resize(n_elem, T::zero());
        }
        self.n_rows = n_rows;
        self.n_cols = n_cols;
        self.n_slices = n_slices;
    }

    #[inline(always)]
    pub fn at(&self, row: usize, col: usize, slice: usize) -> T {
        debug_assert!(row < self.n_rows && col < self.n_cols && slice < self.n_slices);
        self.data[row + col * self.n_rows + slice * self.n_rows * self.n_cols]
    }
}

impl<T> Index<(usize, usize, usize)> for Cube<T> {
    type Output = T;

    fn index(&self, (row, col, slice): (usize, usize, usize)) -> &T {
        assert!(
            row < self.n_rows && col < self.n_cols && slice < self.n_slices,
            "index ({row}, {col}, {slice}) out of bounds"
        );
        &self.data[row + col * self.n_rows + slice * self.n_rows * self.n_cols]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Cube<T> {
    fn index_mut(&mut self, (row, col, slice): (usize, usize, usize)) -> &mut T {
        assert!(
            row < self.n_rows && col < self.n_cols && slice < self.n_slices,
            "index ({row}, {col}, {slice}) out of bounds"
        );
        &mut self.data[row + col * self.n_rows + slice * self.n_rows * self.n_cols]
    }
}

// ============================================================================
// MatFixed
// ============================================================================

/// Stack-allocated `R x C` matrix, stored column by column.
///
/// The element-wise evaluator treats operands of this type as "fixed": small
/// element counts are processed with a plain loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatFixed<T, const R: usize, const C: usize> {
    cols: [[T; R]; C],
}

impl<T: Element, const R: usize, const C: usize> MatFixed<T, R, C> {
    /// Create from an array of columns.
    pub fn from_cols(cols: [[T; R]; C]) -> Self {
        Self { cols }
    }

    pub fn zeros() -> Self {
        Self {
            cols: [[T::zero(); R]; C],
        }
    }

    /// Create with values produced by `f(row, col)`.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut out = Self::zeros();
        for c in 0..C {
            for r in 0..R {
                out.cols[c][r] = f(r, c);
            }
        }
        out
    }

    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> T {
        self.cols[col][row]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.cols[col][row]
    }

    /// Element `i` in column-major order.
    #[inline(always)]
    pub fn at_linear(&self, i: usize) -> T {
        self.cols[i / R][i % R]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat_col_major_layout() {
        let m = Mat::from_fn(2, 3, |r, c| (r * 10 + c) as f64);
        assert_eq!(m.as_slice(), &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]);
        assert_eq!(m.at(1, 2), 12.0);
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m.col(1), &[1.0, 11.0]);
    }

    #[test]
    fn test_mat_from_col_major_len_check() {
        assert!(Mat::from_col_major(2, 2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
        let err = Mat::from_col_major(2, 2, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ExprError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_mat_get_checked() {
        let m = Mat::<f64>::zeros(2, 3);
        assert_eq!(m.get(1, 2).unwrap(), 0.0);
        assert!(matches!(
            m.get(2, 0),
            Err(ExprError::OutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            m.get(0, 3),
            Err(ExprError::OutOfRange { index: 3, len: 3, .. })
        ));
    }

    #[test]
    fn test_mat_set_size_keeps_values_when_count_unchanged() {
        let mut m = Mat::from_fn(2, 3, |r, c| (r + 2 * c) as f64);
        let before = m.as_slice().to_vec();
        m.set_size(3, 2);
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.as_slice(), &before[..]);
        m.set_size(4, 4);
        assert_eq!(m.n_elem(), 16);
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_mat_steal_mem() {
        let mut a = Mat::<f64>::zeros(1, 1);
        let mut b = Mat::from_fn(2, 3, |r, c| (r + c) as f64);
        let ptr = b.as_slice().as_ptr();
        a.steal_mem(&mut b);
        assert!(a.is_size(2, 3));
        assert_eq!(a.as_slice().as_ptr(), ptr);
        assert!(b.is_empty());
        assert!(b.is_size(0, 0));
    }

    #[test]
    fn test_mat_reset_and_into_vec() {
        let mut m = Mat::from_fn(2, 2, |r, c| (r + 2 * c) as f64);
        assert_eq!(m.clone().into_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        m.reset();
        assert!(m.is_size(0, 0));
        assert!(m.into_vec().is_empty());
    }

    #[test]
    fn test_mat_shape_predicates() {
        assert!(Mat::<f64>::zeros(1, 4).is_rowvec());
        assert!(Mat::<f64>::zeros(4, 1).is_colvec());
        assert!(Mat::<f64>::zeros(1, 1).is_vec());
        assert!(!Mat::<f64>::zeros(2, 3).is_vec());
        assert!(Mat::<f64>::zeros(3, 3).is_square());
        assert!(!Mat::<f64>::new().is_vec());
    }

    #[test]
    #[should_panic]
    fn test_mat_index_out_of_bounds() {
        let m = Mat::<f64>::zeros(2, 2);
        let _ = m[(2, 0)];
    }

    #[test]
    fn test_cube_layout() {
        let q = Cube::from_fn(2, 3, 4, |r, c, s| (r * 100 + c * 10 + s) as f64);
        assert_eq!(q.n_elem(), 24);
        assert_eq!(q.at(1, 2, 3), 123.0);
        assert_eq!(q[(0, 1, 2)], 12.0);
        assert_eq!(q.slice(1)[0], 1.0);
        assert_eq!(q.as_slice()[q.n_elem_slice()], 1.0);
    }

    #[test]
    fn test_mat_fixed() {
        let m = MatFixed::<f64, 2, 3>::from_fn(|r, c| (r * 10 + c) as f64);
        assert_eq!(m.at(1, 2), 12.0);
        assert_eq!(m.at_linear(3), 11.0);
        let mut n = MatFixed::from_cols([[1, 2], [3, 4]]);
        assert_eq!(n.at(0, 1), 3);
        *n.at_mut(1, 0) = 9;
        assert_eq!(n.at_linear(1), 9);
    }
}
