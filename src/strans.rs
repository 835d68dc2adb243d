//! Simple (non-conjugating) transpose.
//!
//! `out = A^T` for dense matrices, with dedicated paths for vectors, tiny
//! square matrices and in-place evaluation. [`Trans`] is the lazy form used
//! inside larger expressions.
//!
//! The scaled variant `out = val * A^T` lives in [`crate::strans2`] and shares
//! the kernels defined here.

use std::marker::PhantomData;

use dense_expr_traits::{Conj, ElementOp, Identity};

use crate::dense::Mat;
use crate::kernel::{paired, Step};
use crate::proxy::Proxy;
use crate::{Element, TINY_SQUARE_MAX};

/// Source of a transpose that may be the output matrix itself.
///
/// A borrowed matrix can never alias the `&mut` output, so in-place
/// evaluation is requested explicitly with `Output`.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a, T> {
    /// A matrix other than the output.
    Distinct(&'a Mat<T>),
    /// Transpose the output matrix in place.
    Output,
}

impl<'a, T> From<&'a Mat<T>> for Operand<'a, T> {
    fn from(m: &'a Mat<T>) -> Self {
        Operand::Distinct(m)
    }
}

/// `out = A^T`, where `out` and `a` are distinct.
///
/// `out` is resized to `a.n_cols() x a.n_rows()`.
pub fn apply_noalias<T: Element>(out: &mut Mat<T>, a: &Mat<T>) {
    let (n_rows, n_cols) = (a.n_rows(), a.n_cols());
    out.set_size(n_cols, n_rows);

    if n_rows == 1 || n_cols == 1 {
        log::trace!("strans: vector copy (n_elem={})", a.n_elem());
        out.as_mut_slice().copy_from_slice(a.as_slice());
        return;
    }

    transpose_kernel(out.as_mut_slice(), a, |x| x);
}

/// `out = A^T`, handling the case where `A` is `out` itself.
pub fn apply<T: Element>(out: &mut Mat<T>, input: Operand<'_, T>) {
    match input {
        Operand::Distinct(a) => apply_noalias(out, a),
        Operand::Output => apply_inplace(out),
    }
}

/// Transpose `out` in place.
///
/// Square matrices are transposed by swapping across the main diagonal.
/// Other shapes are transposed into a temporary whose buffer `out` then takes
/// over.
pub fn apply_inplace<T: Element>(out: &mut Mat<T>) {
    if out.is_square() {
        log::trace!("strans: in-place square swap (n={})", out.n_rows());
        swap_square(out);
    } else {
        log::trace!(
            "strans: in-place {}x{} via temporary",
            out.n_rows(),
            out.n_cols()
        );
        let mut tmp = Mat::new();
        apply_noalias(&mut tmp, out);
        out.steal_mem(&mut tmp);
    }
}

/// Matrix (non-vector) transpose of `a` into `out_mem`, applying `f` to each
/// element. `out_mem` is `a.n_cols() x a.n_rows()` in column-major order.
pub(crate) fn transpose_kernel<T: Element>(out_mem: &mut [T], a: &Mat<T>, f: impl Fn(T) -> T) {
    let (n_rows, n_cols) = (a.n_rows(), a.n_cols());

    if n_rows == n_cols && n_rows <= TINY_SQUARE_MAX {
        log::trace!("strans: tiny square kernel (n={n_rows})");
        let a_mem = a.as_slice();
        match n_rows {
            1 => tiny_square::<T, 1>(out_mem, a_mem, f),
            2 => tiny_square::<T, 2>(out_mem, a_mem, f),
            3 => tiny_square::<T, 3>(out_mem, a_mem, f),
            4 => tiny_square::<T, 4>(out_mem, a_mem, f),
            _ => {}
        }
        return;
    }

    log::trace!("strans: column kernel ({n_rows}x{n_cols})");
    // out(k, i) = f(a(i, k)); out has n_cols rows.
    for k in 0..n_cols {
        let col = a.col(k);
        for step in paired(0, n_rows) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = col[i];
                    let tmp_j = col[j];
                    out_mem[k + i * n_cols] = f(tmp_i);
                    out_mem[k + j * n_cols] = f(tmp_j);
                }
                Step::Single(i) => out_mem[k + i * n_cols] = f(col[i]),
            }
        }
    }
}

/// Fully unrolled `N x N` transpose.
#[inline(always)]
fn tiny_square<T: Element, const N: usize>(out: &mut [T], a: &[T], f: impl Fn(T) -> T) {
    let out = &mut out[..N * N];
    let a = &a[..N * N];
    for c in 0..N {
        for r in 0..N {
            out[c + r * N] = f(a[r + c * N]);
        }
    }
}

/// Swap `(k, i)` with `(i, k)` for every `i > k`.
pub(crate) fn swap_square<T>(out: &mut Mat<T>) {
    let n = out.n_rows();
    let mem = out.as_mut_slice();
    for k in 0..n {
        for step in paired(k + 1, n) {
            match step {
                Step::Pair(i, j) => {
                    mem.swap(k + i * n, i + k * n);
                    mem.swap(k + j * n, j + k * n);
                }
                Step::Single(i) => mem.swap(k + i * n, i + k * n),
            }
        }
    }
}

// ============================================================================
// Lazy transpose
// ============================================================================

/// Lazy transpose of `P`, with `Op` applied to each element read.
///
/// `Trans<P, Identity>` is the simple transpose; `Trans<P, Conj>` is the
/// conjugate (Hermitian) transpose.
#[derive(Debug, Clone, Copy)]
pub struct Trans<P, Op: ElementOp = Identity> {
    inner: P,
    _op: PhantomData<Op>,
}

impl<P: Proxy, Op: ElementOp> Trans<P, Op> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            _op: PhantomData,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Materialize into a new matrix.
    pub fn eval(&self) -> Mat<P::Elem> {
        Mat::from_expr(self)
    }
}

impl<P: Proxy, Op: ElementOp> Proxy for Trans<P, Op> {
    type Elem = P::Elem;
    const PREFER_AT_ACCESSOR: bool = true;
    const IS_FIXED: bool = P::IS_FIXED;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.inner.n_cols()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        self.inner.n_rows()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        let n_rows = self.n_rows();
        self.at(i % n_rows, i / n_rows)
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> Self::Elem {
        Op::apply(self.inner.at(col, row))
    }

    fn eval_into(&self, out: &mut Mat<Self::Elem>) {
        if let Some(a) = self.inner.as_mat() {
            if Op::IS_IDENTITY {
                apply_noalias(out, a);
            } else {
                crate::strans2::apply_noalias_with(out, a, |x| Op::apply(x));
            }
            return;
        }

        let (n_rows, n_cols) = (self.n_rows(), self.n_cols());
        out.set_size(n_rows, n_cols);
        let out_mem = out.as_mut_slice();
        let mut count = 0;
        for col in 0..n_cols {
            for row in 0..n_rows {
                out_mem[count] = self.at(row, col);
                count += 1;
            }
        }
    }
}

impl<T: Element> Mat<T> {
    /// Lazy transpose.
    pub fn t(&self) -> Trans<&Mat<T>> {
        Trans::new(self)
    }

    /// Lazy simple transpose (no conjugation, even for complex elements).
    pub fn st(&self) -> Trans<&Mat<T>> {
        Trans::new(self)
    }

    /// Lazy conjugate transpose.
    pub fn ht(&self) -> Trans<&Mat<T>, Conj> {
        Trans::new(self)
    }
}
