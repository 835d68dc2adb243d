//! Views onto a matrix diagonal.
//!
//! A diagonal of an `n_rows x n_cols` matrix is described by a [`DiagSpan`]:
//! its starting position `(row_offset, col_offset)` and its length. Element
//! `i` of the view is matrix element `(row_offset + i, col_offset + i)`.
//!
//! [`DiagView`] borrows the matrix immutably and behaves as an `n_elem x 1`
//! column operand in expressions. [`DiagViewMut`] borrows it mutably and adds
//! writes: element access, fills, scalar and element-wise compound
//! assignment, and copying from another diagonal (of the same matrix or of a
//! different one).

use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign};

use dense_expr_traits::Conj;

use crate::dense::Mat;
use crate::kernel::{paired, Accumulate, AddTo, Assign, DivBy, MulBy, Step, SubFrom};
use crate::proxy::Proxy;
use crate::strans::Trans;
use crate::{Element, ExprError, Result};

// ============================================================================
// DiagSpan
// ============================================================================

/// Position and length of a diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagSpan {
    pub row_offset: usize,
    pub col_offset: usize,
    pub n_elem: usize,
}

impl DiagSpan {
    pub fn new(row_offset: usize, col_offset: usize, n_elem: usize) -> Self {
        Self {
            row_offset,
            col_offset,
            n_elem,
        }
    }

    /// Span of diagonal `k` of an `n_rows x n_cols` matrix.
    ///
    /// `k = 0` is the main diagonal, `k > 0` lies above it and `k < 0` below.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `k >= n_cols` (for `k > 0`) or `-k >= n_rows`
    /// (for `k < 0`).
    pub fn of_diagonal(n_rows: usize, n_cols: usize, k: isize) -> Result<Self> {
        let (row_offset, col_offset) = if k < 0 {
            (k.unsigned_abs(), 0)
        } else {
            (0, k.unsigned_abs())
        };
        if (k < 0 && row_offset >= n_rows) || (k > 0 && col_offset >= n_cols) {
            return Err(ExprError::OutOfRange {
                op: "Mat::diag(): requested diagonal",
                index: k.unsigned_abs(),
                len: if k < 0 { n_rows } else { n_cols },
            });
        }
        let n_elem = (n_rows - row_offset).min(n_cols - col_offset);
        Ok(Self::new(row_offset, col_offset, n_elem))
    }

    /// Check that the span fits inside an `n_rows x n_cols` matrix.
    fn check_within(&self, n_rows: usize, n_cols: usize) -> Result<()> {
        if self.n_elem == 0 {
            return Ok(());
        }
        // compare remaining room, never `offset + n_elem`, which can overflow
        if self.row_offset >= n_rows || self.n_elem > n_rows - self.row_offset {
            return Err(ExprError::OutOfRange {
                op: "diagview: span exceeds matrix rows",
                index: self.row_offset.saturating_add(self.n_elem - 1),
                len: n_rows,
            });
        }
        if self.col_offset >= n_cols || self.n_elem > n_cols - self.col_offset {
            return Err(ExprError::OutOfRange {
                op: "diagview: span exceeds matrix columns",
                index: self.col_offset.saturating_add(self.n_elem - 1),
                len: n_cols,
            });
        }
        Ok(())
    }

    /// Storage offset of element `i` in a matrix with `n_rows` rows.
    #[inline(always)]
    fn offset(&self, i: usize, n_rows: usize) -> usize {
        (self.row_offset + i) + (self.col_offset + i) * n_rows
    }
}

fn check_index(i: usize, len: usize) -> Result<()> {
    if i >= len {
        return Err(ExprError::OutOfRange {
            op: "diagview: index",
            index: i,
            len,
        });
    }
    Ok(())
}

fn check_col(col: usize) -> Result<()> {
    if col != 0 {
        return Err(ExprError::OutOfRange {
            op: "diagview: column",
            index: col,
            len: 1,
        });
    }
    Ok(())
}

// ============================================================================
// DiagView
// ============================================================================

/// Read-only view of a diagonal, shaped `n_elem x 1`.
#[derive(Debug, Clone, Copy)]
pub struct DiagView<'a, T> {
    m: &'a Mat<T>,
    span: DiagSpan,
}

impl<'a, T: Element> DiagView<'a, T> {
    /// # Errors
    /// Returns `OutOfRange` if `span` does not fit inside `m`.
    pub fn new(m: &'a Mat<T>, span: DiagSpan) -> Result<Self> {
        span.check_within(m.n_rows(), m.n_cols())?;
        Ok(Self { m, span })
    }

    #[inline]
    pub fn span(&self) -> DiagSpan {
        self.span
    }

    #[inline]
    pub fn n_elem(&self) -> usize {
        self.span.n_elem
    }

    /// The matrix this view reads from.
    pub fn matrix(&self) -> &'a Mat<T> {
        self.m
    }

    /// Element `i`; only the storage bound is checked.
    #[inline(always)]
    pub fn at(&self, i: usize) -> T {
        debug_assert!(i < self.span.n_elem);
        self.m.as_slice()[self.span.offset(i, self.m.n_rows())]
    }

    /// # Errors
    /// Returns `OutOfRange` if `i >= n_elem`.
    pub fn get(&self, i: usize) -> Result<T> {
        check_index(i, self.span.n_elem)?;
        Ok(self.at(i))
    }

    /// Element `(row, col)` of the `n_elem x 1` view; `col` is ignored.
    #[inline(always)]
    pub fn at_rc(&self, row: usize, _col: usize) -> T {
        self.at(row)
    }

    /// # Errors
    /// Returns `OutOfRange` if `row >= n_elem` or `col != 0`.
    pub fn get_rc(&self, row: usize, col: usize) -> Result<T> {
        check_index(row, self.span.n_elem)?;
        check_col(col)?;
        Ok(self.at(row))
    }

    /// Copy into a new `n_elem x 1` matrix.
    pub fn to_mat(&self) -> Mat<T> {
        Mat::from_expr(self)
    }

    /// Lazy transpose (a `1 x n_elem` row).
    pub fn t(self) -> Trans<Self> {
        Trans::new(self)
    }

    pub fn st(self) -> Trans<Self> {
        Trans::new(self)
    }

    /// Lazy conjugate transpose.
    pub fn ht(self) -> Trans<Self, Conj> {
        Trans::new(self)
    }

    /// `out = in`, where `out` is already `n_elem x 1`.
    pub fn extract(out: &mut Mat<T>, input: &DiagView<'_, T>) {
        merge_into::<Assign, T>(out.as_mut_slice(), input);
    }

    /// `out += in`
    ///
    /// # Errors
    /// Returns `ShapeMismatch` labelled "addition" if `out` is not
    /// `n_elem x 1`.
    pub fn plus_inplace(out: &mut Mat<T>, input: &DiagView<'_, T>) -> Result<()> {
        merge_checked::<AddTo, T>(out, input)
    }

    /// `out -= in`
    pub fn minus_inplace(out: &mut Mat<T>, input: &DiagView<'_, T>) -> Result<()> {
        merge_checked::<SubFrom, T>(out, input)
    }

    /// `out %= in`
    pub fn schur_inplace(out: &mut Mat<T>, input: &DiagView<'_, T>) -> Result<()> {
        merge_checked::<MulBy, T>(out, input)
    }

    /// `out /= in`
    pub fn div_inplace(out: &mut Mat<T>, input: &DiagView<'_, T>) -> Result<()> {
        merge_checked::<DivBy, T>(out, input)
    }
}

fn merge_checked<A: Accumulate, T: Element>(out: &mut Mat<T>, input: &DiagView<'_, T>) -> Result<()> {
    if !out.is_size(input.n_elem(), 1) {
        return Err(ExprError::ShapeMismatch {
            op: A::TEXT,
            expected: vec![out.n_rows(), out.n_cols()],
            found: vec![input.n_elem(), 1],
        });
    }
    merge_into::<A, T>(out.as_mut_slice(), input);
    Ok(())
}

fn merge_into<A: Accumulate, T: Element>(out: &mut [T], input: &DiagView<'_, T>) {
    for step in paired(0, input.n_elem()) {
        match step {
            Step::Pair(i, j) => {
                let tmp_i = input.at(i);
                let tmp_j = input.at(j);
                A::merge(&mut out[i], tmp_i);
                A::merge(&mut out[j], tmp_j);
            }
            Step::Single(i) => A::merge(&mut out[i], input.at(i)),
        }
    }
}

impl<T: Element> Index<usize> for DiagView<'_, T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        assert!(i < self.span.n_elem, "diagview: index {i} out of bounds");
        &self.m.as_slice()[self.span.offset(i, self.m.n_rows())]
    }
}

impl<T: Element> Proxy for DiagView<'_, T> {
    type Elem = T;
    const PREFER_AT_ACCESSOR: bool = false;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.span.n_elem
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        1
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> T {
        DiagView::at(self, i)
    }

    #[inline(always)]
    fn at(&self, row: usize, _col: usize) -> T {
        DiagView::at(self, row)
    }

    fn eval_into(&self, out: &mut Mat<T>) {
        out.set_size(self.span.n_elem, 1);
        DiagView::extract(out, self);
    }
}

// ============================================================================
// DiagViewMut
// ============================================================================

/// Writable view of a diagonal, shaped `n_elem x 1`.
#[derive(Debug)]
pub struct DiagViewMut<'a, T> {
    m: &'a mut Mat<T>,
    span: DiagSpan,
}

/// Source of a diagonal-to-diagonal copy.
#[derive(Debug, Clone, Copy)]
pub enum DiagOperand<'a, T> {
    /// A diagonal of another matrix.
    Distinct(DiagView<'a, T>),
    /// Another diagonal of the matrix being written.
    Output(DiagSpan),
}

impl<'a, T: Element> DiagViewMut<'a, T> {
    /// # Errors
    /// Returns `OutOfRange` if `span` does not fit inside `m`.
    pub fn new(m: &'a mut Mat<T>, span: DiagSpan) -> Result<Self> {
        span.check_within(m.n_rows(), m.n_cols())?;
        Ok(Self { m, span })
    }

    #[inline]
    pub fn span(&self) -> DiagSpan {
        self.span
    }

    #[inline]
    pub fn n_elem(&self) -> usize {
        self.span.n_elem
    }

    /// Read-only view of the same diagonal.
    pub fn as_view(&self) -> DiagView<'_, T> {
        DiagView {
            m: &*self.m,
            span: self.span,
        }
    }

    #[inline(always)]
    fn offset(&self, i: usize) -> usize {
        self.span.offset(i, self.m.n_rows())
    }

    #[inline(always)]
    pub fn at(&self, i: usize) -> T {
        debug_assert!(i < self.span.n_elem);
        self.m.as_slice()[self.offset(i)]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, i: usize) -> &mut T {
        debug_assert!(i < self.span.n_elem);
        let k = self.offset(i);
        &mut self.m.as_mut_slice()[k]
    }

    pub fn get(&self, i: usize) -> Result<T> {
        check_index(i, self.span.n_elem)?;
        Ok(self.at(i))
    }

    /// # Errors
    /// Returns `OutOfRange` if `i >= n_elem`.
    pub fn get_mut(&mut self, i: usize) -> Result<&mut T> {
        check_index(i, self.span.n_elem)?;
        Ok(self.at_mut(i))
    }

    #[inline(always)]
    pub fn at_rc(&self, row: usize, _col: usize) -> T {
        self.at(row)
    }

    #[inline(always)]
    pub fn at_rc_mut(&mut self, row: usize, _col: usize) -> &mut T {
        self.at_mut(row)
    }

    pub fn get_rc(&self, row: usize, col: usize) -> Result<T> {
        check_index(row, self.span.n_elem)?;
        check_col(col)?;
        Ok(self.at(row))
    }

    pub fn get_rc_mut(&mut self, row: usize, col: usize) -> Result<&mut T> {
        check_index(row, self.span.n_elem)?;
        check_col(col)?;
        Ok(self.at_mut(row))
    }

    /// Set every diagonal element to `value`.
    pub fn fill(&mut self, value: T) {
        self.merge_scalar::<Assign>(value);
    }

    pub fn zeros(&mut self) {
        self.fill(T::zero());
    }

    pub fn ones(&mut self) {
        self.fill(T::one());
    }

    fn merge_scalar<A: Accumulate>(&mut self, value: T) {
        for step in paired(0, self.span.n_elem) {
            match step {
                Step::Pair(i, j) => {
                    A::merge(self.at_mut(i), value);
                    A::merge(self.at_mut(j), value);
                }
                Step::Single(i) => A::merge(self.at_mut(i), value),
            }
        }
    }

    /// Copy another diagonal into this one.
    ///
    /// With [`DiagOperand::Output`] the source is a diagonal of the matrix
    /// being written; it is copied to a temporary first, so overlapping spans
    /// produce the same result as copying from an unrelated matrix.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the lengths differ, or `OutOfRange` if an
    /// `Output` span does not fit the matrix. The view is unchanged on error.
    pub fn assign_diag(&mut self, input: DiagOperand<'_, T>) -> Result<()> {
        match input {
            DiagOperand::Distinct(src) => {
                self.check_diag_len(src.n_elem())?;
                self.copy_from(|i| src.at(i));
            }
            DiagOperand::Output(span) => {
                span.check_within(self.m.n_rows(), self.m.n_cols())?;
                self.check_diag_len(span.n_elem)?;
                log::debug!(
                    "diagview: source diagonal ({}, {}) is in the output matrix; copying through a temporary",
                    span.row_offset,
                    span.col_offset
                );
                let mut tmp = Mat::new();
                DiagView { m: &*self.m, span }.eval_into(&mut tmp);
                let tmp_mem = tmp.as_slice();
                self.copy_from(|i| tmp_mem[i]);
            }
        }
        Ok(())
    }

    fn check_diag_len(&self, found: usize) -> Result<()> {
        if found != self.span.n_elem {
            return Err(ExprError::ShapeMismatch {
                op: "diagview: diagonals have incompatible lengths",
                expected: vec![self.span.n_elem],
                found: vec![found],
            });
        }
        Ok(())
    }

    fn copy_from(&mut self, src: impl Fn(usize) -> T) {
        for step in paired(0, self.span.n_elem) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = src(i);
                    let tmp_j = src(j);
                    *self.at_mut(i) = tmp_i;
                    *self.at_mut(j) = tmp_j;
                }
                Step::Single(i) => *self.at_mut(i) = src(i),
            }
        }
    }

    /// `diag = x` for a vector operand with `n_elem` elements.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `x` is not a vector of the same length.
    pub fn assign<P: Proxy<Elem = T>>(&mut self, x: &P) -> Result<()> {
        self.merge_expr::<Assign, P>(x)
    }

    /// `diag += x`
    pub fn plus_assign<P: Proxy<Elem = T>>(&mut self, x: &P) -> Result<()> {
        self.merge_expr::<AddTo, P>(x)
    }

    /// `diag -= x`
    pub fn minus_assign<P: Proxy<Elem = T>>(&mut self, x: &P) -> Result<()> {
        self.merge_expr::<SubFrom, P>(x)
    }

    /// `diag %= x`
    pub fn schur_assign<P: Proxy<Elem = T>>(&mut self, x: &P) -> Result<()> {
        self.merge_expr::<MulBy, P>(x)
    }

    /// `diag /= x`
    pub fn div_assign<P: Proxy<Elem = T>>(&mut self, x: &P) -> Result<()> {
        self.merge_expr::<DivBy, P>(x)
    }

    fn merge_expr<A: Accumulate, P: Proxy<Elem = T>>(&mut self, x: &P) -> Result<()> {
        let n_elem = self.span.n_elem;
        if !x.is_vec() || x.n_elem() != n_elem {
            return Err(ExprError::ShapeMismatch {
                op: "diagview: given object has incompatible size",
                expected: vec![n_elem, 1],
                found: vec![x.n_rows(), x.n_cols()],
            });
        }

        if !P::PREFER_AT_ACCESSOR {
            for step in paired(0, n_elem) {
                match step {
                    Step::Pair(i, j) => {
                        let tmp_i = x.at_linear(i);
                        let tmp_j = x.at_linear(j);
                        A::merge(self.at_mut(i), tmp_i);
                        A::merge(self.at_mut(j), tmp_j);
                    }
                    Step::Single(i) => A::merge(self.at_mut(i), x.at_linear(i)),
                }
            }
        } else {
            let is_row = x.n_rows() == 1;
            let read = |i: usize| if is_row { x.at(0, i) } else { x.at(i, 0) };
            for step in paired(0, n_elem) {
                match step {
                    Step::Pair(i, j) => {
                        let tmp_i = read(i);
                        let tmp_j = read(j);
                        A::merge(self.at_mut(i), tmp_i);
                        A::merge(self.at_mut(j), tmp_j);
                    }
                    Step::Single(i) => A::merge(self.at_mut(i), read(i)),
                }
            }
        }
        Ok(())
    }

    pub fn t(&self) -> Trans<DiagView<'_, T>> {
        self.as_view().t()
    }

    pub fn st(&self) -> Trans<DiagView<'_, T>> {
        self.as_view().st()
    }

    pub fn ht(&self) -> Trans<DiagView<'_, T>, Conj> {
        self.as_view().ht()
    }
}

impl<T: Element> Index<usize> for DiagViewMut<'_, T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        assert!(i < self.span.n_elem, "diagview: index {i} out of bounds");
        &self.m.as_slice()[self.offset(i)]
    }
}

impl<T: Element> IndexMut<usize> for DiagViewMut<'_, T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        assert!(i < self.span.n_elem, "diagview: index {i} out of bounds");
        self.at_mut(i)
    }
}

impl<T: Element> Proxy for DiagViewMut<'_, T> {
    type Elem = T;
    const PREFER_AT_ACCESSOR: bool = false;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.span.n_elem
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        1
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> T {
        DiagViewMut::at(self, i)
    }

    #[inline(always)]
    fn at(&self, row: usize, _col: usize) -> T {
        DiagViewMut::at(self, row)
    }

    fn eval_into(&self, out: &mut Mat<T>) {
        self.as_view().eval_into(out);
    }
}

impl<T: Element> AddAssign<T> for DiagViewMut<'_, T> {
    fn add_assign(&mut self, value: T) {
        self.merge_scalar::<AddTo>(value);
    }
}

impl<T: Element> SubAssign<T> for DiagViewMut<'_, T> {
    fn sub_assign(&mut self, value: T) {
        self.merge_scalar::<SubFrom>(value);
    }
}

impl<T: Element> MulAssign<T> for DiagViewMut<'_, T> {
    fn mul_assign(&mut self, value: T) {
        self.merge_scalar::<MulBy>(value);
    }
}

impl<T: Element> DivAssign<T> for DiagViewMut<'_, T> {
    fn div_assign(&mut self, value: T) {
        self.merge_scalar::<DivBy>(value);
    }
}

// ============================================================================
// Mat accessors
// ============================================================================

impl<T: Element> Mat<T> {
    /// View of diagonal `k` (`0` = main, `> 0` above, `< 0` below).
    ///
    /// # Errors
    /// Returns `OutOfRange` if the diagonal lies outside the matrix.
    pub fn diag(&self, k: isize) -> Result<DiagView<'_, T>> {
        let span = DiagSpan::of_diagonal(self.n_rows(), self.n_cols(), k)?;
        Ok(DiagView { m: self, span })
    }

    /// Writable view of diagonal `k`.
    pub fn diag_mut(&mut self, k: isize) -> Result<DiagViewMut<'_, T>> {
        let span = DiagSpan::of_diagonal(self.n_rows(), self.n_cols(), k)?;
        Ok(DiagViewMut { m: self, span })
    }
}
