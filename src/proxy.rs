//! Uniform read access to evaluable operands.
//!
//! Every operand of a lazy expression (containers, diagonal views, transposes,
//! nested element-wise nodes) implements [`Proxy`] (or [`ProxyCube`] for rank-3
//! operands). Kernels only ever read through these traits.
//!
//! Two access paths are offered:
//!
//! - `at_linear(i)`: element `i` in column-major order. Cheap for contiguous
//!   storage.
//! - `at(row, col)`: coordinate access. Required when the operand's storage is
//!   not contiguous in column-major order (e.g. a transpose).
//!
//! `PREFER_AT_ACCESSOR` tells kernels which path an operand wants. A combined
//! expression prefers coordinates when any of its operands does.

use crate::dense::{Cube, Mat, MatFixed};
use crate::kernel::{paired, Step};
use crate::Element;

/// Read-only rank-2 operand.
pub trait Proxy {
    type Elem: Element;

    /// True when this operand should be read with `at(row, col)`.
    const PREFER_AT_ACCESSOR: bool;

    /// True when the operand's dimensions are fixed at compile time.
    const IS_FIXED: bool = false;

    fn n_rows(&self) -> usize;

    fn n_cols(&self) -> usize;

    #[inline]
    fn n_elem(&self) -> usize {
        self.n_rows() * self.n_cols()
    }

    #[inline]
    fn is_vec(&self) -> bool {
        self.n_rows() == 1 || self.n_cols() == 1
    }

    /// Element `i` in column-major order.
    fn at_linear(&self, i: usize) -> Self::Elem;

    /// Element at `(row, col)`.
    fn at(&self, row: usize, col: usize) -> Self::Elem;

    /// The underlying matrix, when this operand is a plain [`Mat`].
    #[inline]
    fn as_mat(&self) -> Option<&Mat<Self::Elem>> {
        None
    }

    /// Materialize into `out`, which is resized to this operand's shape.
    fn eval_into(&self, out: &mut Mat<Self::Elem>) {
        copy_into(out, self);
    }
}

/// Read-only rank-3 operand.
pub trait ProxyCube {
    type Elem: Element;

    const PREFER_AT_ACCESSOR: bool;

    fn n_rows(&self) -> usize;

    fn n_cols(&self) -> usize;

    fn n_slices(&self) -> usize;

    #[inline]
    fn n_elem_slice(&self) -> usize {
        self.n_rows() * self.n_cols()
    }

    #[inline]
    fn n_elem(&self) -> usize {
        self.n_elem_slice() * self.n_slices()
    }

    fn at_linear(&self, i: usize) -> Self::Elem;

    fn at(&self, row: usize, col: usize, slice: usize) -> Self::Elem;

    fn eval_into(&self, out: &mut Cube<Self::Elem>);
}

/// Default materialization for any [`Proxy`].
pub(crate) fn copy_into<P: Proxy + ?Sized>(out: &mut Mat<P::Elem>, x: &P) {
    let n_rows = x.n_rows();
    let n_cols = x.n_cols();
    out.set_size(n_rows, n_cols);
    let out_mem = out.as_mut_slice();

    if !P::PREFER_AT_ACCESSOR {
        for step in paired(0, out_mem.len()) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = x.at_linear(i);
                    let tmp_j = x.at_linear(j);
                    out_mem[i] = tmp_i;
                    out_mem[j] = tmp_j;
                }
                Step::Single(i) => out_mem[i] = x.at_linear(i),
            }
        }
    } else {
        let mut count = 0;
        for col in 0..n_cols {
            for row in 0..n_rows {
                out_mem[count] = x.at(row, col);
                count += 1;
            }
        }
    }
}

// ============================================================================
// Forwarding impls
// ============================================================================

impl<P: Proxy + ?Sized> Proxy for &P {
    type Elem = P::Elem;
    const PREFER_AT_ACCESSOR: bool = P::PREFER_AT_ACCESSOR;
    const IS_FIXED: bool = P::IS_FIXED;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        (**self).n_rows()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        (**self).n_cols()
    }

    #[inline(always)]
    fn n_elem(&self) -> usize {
        (**self).n_elem()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        (**self).at_linear(i)
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> Self::Elem {
        (**self).at(row, col)
    }

    #[inline]
    fn as_mat(&self) -> Option<&Mat<Self::Elem>> {
        (**self).as_mat()
    }

    fn eval_into(&self, out: &mut Mat<Self::Elem>) {
        (**self).eval_into(out)
    }
}

impl<P: ProxyCube + ?Sized> ProxyCube for &P {
    type Elem = P::Elem;
    const PREFER_AT_ACCESSOR: bool = P::PREFER_AT_ACCESSOR;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        (**self).n_rows()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        (**self).n_cols()
    }

    #[inline(always)]
    fn n_slices(&self) -> usize {
        (**self).n_slices()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        (**self).at_linear(i)
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize, slice: usize) -> Self::Elem {
        (**self).at(row, col, slice)
    }

    fn eval_into(&self, out: &mut Cube<Self::Elem>) {
        (**self).eval_into(out)
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: Element> Proxy for Mat<T> {
    type Elem = T;
    const PREFER_AT_ACCESSOR: bool = false;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        Mat::n_rows(self)
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        Mat::n_cols(self)
    }

    #[inline(always)]
    fn n_elem(&self) -> usize {
        Mat::n_elem(self)
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> T {
        self.as_slice()[i]
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> T {
        Mat::at(self, row, col)
    }

    #[inline]
    fn as_mat(&self) -> Option<&Mat<T>> {
        Some(self)
    }

    fn eval_into(&self, out: &mut Mat<T>) {
        out.clone_from(self);
    }
}

impl<T: Element, const R: usize, const C: usize> Proxy for MatFixed<T, R, C> {
    type Elem = T;
    const PREFER_AT_ACCESSOR: bool = false;
    const IS_FIXED: bool = true;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        R
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        C
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> T {
        MatFixed::at_linear(self, i)
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> T {
        MatFixed::at(self, row, col)
    }
}

impl<T: Element> ProxyCube for Cube<T> {
    type Elem = T;
    const PREFER_AT_ACCESSOR: bool = false;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        Cube::n_rows(self)
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        Cube::n_cols(self)
    }

    #[inline(always)]
    fn n_slices(&self) -> usize {
        Cube::n_slices(self)
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> T {
        self.as_slice()[i]
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize, slice: usize) -> T {
        Cube::at(self, row, col, slice)
    }

    fn eval_into(&self, out: &mut Cube<T>) {
        out.clone_from(self);
    }
}

// ============================================================================
// PreferAt
// ============================================================================

/// Wrapper that forces coordinate access on its operand.
///
/// Values are unchanged; only the traversal chosen by the kernels differs.
#[derive(Debug, Clone, Copy)]
pub struct PreferAt<P>(pub P);

impl<P: Proxy> Proxy for PreferAt<P> {
    type Elem = P::Elem;
    const PREFER_AT_ACCESSOR: bool = true;
    const IS_FIXED: bool = P::IS_FIXED;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.0.n_rows()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        self.0.n_cols()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        self.0.at_linear(i)
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> Self::Elem {
        self.0.at(row, col)
    }
}

impl<P: ProxyCube> ProxyCube for PreferAt<P> {
    type Elem = P::Elem;
    const PREFER_AT_ACCESSOR: bool = true;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.0.n_rows()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        self.0.n_cols()
    }

    #[inline(always)]
    fn n_slices(&self) -> usize {
        self.0.n_slices()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        self.0.at_linear(i)
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize, slice: usize) -> Self::Elem {
        self.0.at(row, col, slice)
    }

    fn eval_into(&self, out: &mut Cube<Self::Elem>) {
        let (n_rows, n_cols, n_slices) = (self.n_rows(), self.n_cols(), self.n_slices());
        out.set_size(n_rows, n_cols, n_slices);
        let out_mem = out.as_mut_slice();
        let mut count = 0;
        for s in 0..n_slices {
            for c in 0..n_cols {
                for r in 0..n_rows {
                    out_mem[count] = self.at(r, c, s);
                    count += 1;
                }
            }
        }
    }
}

// ============================================================================
// Materialization entry points
// ============================================================================

impl<T: Element> Mat<T> {
    /// Evaluate any expression into a new matrix.
    pub fn from_expr<P: Proxy<Elem = T>>(x: &P) -> Self {
        let mut out = Mat::new();
        x.eval_into(&mut out);
        out
    }

    /// Overwrite this matrix with the value of `x`, adopting its shape.
    pub fn assign<P: Proxy<Elem = T>>(&mut self, x: &P) {
        x.eval_into(self);
    }
}

impl<T: Element> Cube<T> {
    /// Evaluate any rank-3 expression into a new cube.
    pub fn from_expr<P: ProxyCube<Elem = T>>(x: &P) -> Self {
        let mut out = Cube::new();
        x.eval_into(&mut out);
        out
    }

    pub fn assign<P: ProxyCube<Elem = T>>(&mut self, x: &P) {
        x.eval_into(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat_proxy_accessors_agree() {
        let m = Mat::from_fn(3, 4, |r, c| (r * 10 + c) as f64);
        for c in 0..4 {
            for r in 0..3 {
                assert_eq!(Proxy::at(&m, r, c), m.at_linear(r + c * 3));
            }
        }
        assert!(Proxy::as_mat(&m).is_some());
        assert!(!<Mat<f64> as Proxy>::PREFER_AT_ACCESSOR);
    }

    #[test]
    fn test_reference_forwards_flags() {
        assert!(<&MatFixed<f64, 2, 2> as Proxy>::IS_FIXED);
        assert!(!<&Mat<f64> as Proxy>::IS_FIXED);
        assert!(<&PreferAt<&Mat<f64>> as Proxy>::PREFER_AT_ACCESSOR);
    }

    #[test]
    fn test_prefer_at_copy_matches() {
        for (r, c) in [(0, 0), (1, 1), (1, 5), (5, 1), (3, 4), (4, 3)] {
            let m = Mat::from_fn(r, c, |i, j| (i * 7 + j * 3) as f64);
            let flat = Mat::from_expr(&m);
            let coord = Mat::from_expr(&PreferAt(&m));
            assert_eq!(flat, m);
            assert_eq!(coord, m);
        }
    }

    #[test]
    fn test_fixed_into_mat() {
        let f = MatFixed::<i32, 2, 3>::from_fn(|r, c| (r + 2 * c) as i32);
        let m = Mat::from_expr(&f);
        assert!(m.is_size(2, 3));
        assert_eq!(m.as_slice(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_cube_prefer_at_copy() {
        let q = Cube::from_fn(2, 3, 2, |r, c, s| (r + 3 * c + 7 * s) as f64);
        let copy = Cube::from_expr(&PreferAt(&q));
        assert_eq!(copy, q);
    }
}
