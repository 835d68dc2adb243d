//! Lazy element-wise binary expressions.
//!
//! [`Glue`] pairs two rank-2 operands with an operation marker; [`GlueCube`]
//! does the same for rank-3 operands. Construction validates that both
//! operands have identical dimensions, so the evaluator in [`crate::eglue`]
//! never sees a mismatched pair.

use std::marker::PhantomData;

use crate::dense::{Cube, Mat};
use crate::proxy::{Proxy, ProxyCube};
use crate::{Element, ExprError, Result};

/// Element-wise binary operation marker.
pub trait GlueOp: Copy + Default + 'static {
    /// Operation name used in shape-mismatch errors.
    const TEXT: &'static str;

    fn apply<T: Element>(a: T, b: T) -> T;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Plus;

#[derive(Debug, Clone, Copy, Default)]
pub struct Minus;

/// Element-wise (Hadamard) product.
#[derive(Debug, Clone, Copy, Default)]
pub struct Schur;

#[derive(Debug, Clone, Copy, Default)]
pub struct Div;

impl GlueOp for Plus {
    const TEXT: &'static str = "addition";

    #[inline(always)]
    fn apply<T: Element>(a: T, b: T) -> T {
        a + b
    }
}

impl GlueOp for Minus {
    const TEXT: &'static str = "subtraction";

    #[inline(always)]
    fn apply<T: Element>(a: T, b: T) -> T {
        a - b
    }
}

impl GlueOp for Schur {
    const TEXT: &'static str = "element-wise multiplication";

    #[inline(always)]
    fn apply<T: Element>(a: T, b: T) -> T {
        a * b
    }
}

impl GlueOp for Div {
    const TEXT: &'static str = "element-wise division";

    #[inline(always)]
    fn apply<T: Element>(a: T, b: T) -> T {
        a / b
    }
}

// ============================================================================
// Glue
// ============================================================================

/// Lazy `op(A, B)` over two rank-2 operands of equal shape.
#[derive(Debug, Clone, Copy)]
pub struct Glue<P1, P2, G> {
    p1: P1,
    p2: P2,
    _op: PhantomData<G>,
}

impl<P1, P2, G> Glue<P1, P2, G>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    /// Pair two operands.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` (labelled with the operation name) if the
    /// operand dimensions differ.
    pub fn new(p1: P1, p2: P2) -> Result<Self> {
        if p1.n_rows() != p2.n_rows() || p1.n_cols() != p2.n_cols() {
            return Err(ExprError::ShapeMismatch {
                op: G::TEXT,
                expected: vec![p1.n_rows(), p1.n_cols()],
                found: vec![p2.n_rows(), p2.n_cols()],
            });
        }
        Ok(Self {
            p1,
            p2,
            _op: PhantomData,
        })
    }

    #[inline(always)]
    pub fn p1(&self) -> &P1 {
        &self.p1
    }

    #[inline(always)]
    pub fn p2(&self) -> &P2 {
        &self.p2
    }
}

impl<P1, P2, G> Proxy for Glue<P1, P2, G>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    type Elem = P1::Elem;
    const PREFER_AT_ACCESSOR: bool = P1::PREFER_AT_ACCESSOR || P2::PREFER_AT_ACCESSOR;
    const IS_FIXED: bool = P1::IS_FIXED || P2::IS_FIXED;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.p1.n_rows()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        self.p1.n_cols()
    }

    #[inline(always)]
    fn n_elem(&self) -> usize {
        self.p1.n_elem()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        G::apply(self.p1.at_linear(i), self.p2.at_linear(i))
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> Self::Elem {
        G::apply(self.p1.at(row, col), self.p2.at(row, col))
    }

    fn eval_into(&self, out: &mut Mat<Self::Elem>) {
        out.set_size(self.n_rows(), self.n_cols());
        crate::eglue::apply(out, self);
    }
}

/// `a + b`
pub fn plus<P1, P2>(a: P1, b: P2) -> Result<Glue<P1, P2, Plus>>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
{
    Glue::new(a, b)
}

/// `a - b`
pub fn minus<P1, P2>(a: P1, b: P2) -> Result<Glue<P1, P2, Minus>>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
{
    Glue::new(a, b)
}

/// `a % b` (element-wise product)
pub fn schur<P1, P2>(a: P1, b: P2) -> Result<Glue<P1, P2, Schur>>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
{
    Glue::new(a, b)
}

/// `a / b` (element-wise)
pub fn div<P1, P2>(a: P1, b: P2) -> Result<Glue<P1, P2, Div>>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
{
    Glue::new(a, b)
}

// ============================================================================
// GlueCube
// ============================================================================

/// Lazy `op(A, B)` over two rank-3 operands of equal shape.
#[derive(Debug, Clone, Copy)]
pub struct GlueCube<P1, P2, G> {
    p1: P1,
    p2: P2,
    _op: PhantomData<G>,
}

impl<P1, P2, G> GlueCube<P1, P2, G>
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    /// # Errors
    /// Returns `ShapeMismatch` if rows, columns or slices differ.
    pub fn new(p1: P1, p2: P2) -> Result<Self> {
        if p1.n_rows() != p2.n_rows()
            || p1.n_cols() != p2.n_cols()
            || p1.n_slices() != p2.n_slices()
        {
            return Err(ExprError::ShapeMismatch {
                op: G::TEXT,
                expected: vec![p1.n_rows(), p1.n_cols(), p1.n_slices()],
                found: vec![p2.n_rows(), p2.n_cols(), p2.n_slices()],
            });
        }
        Ok(Self {
            p1,
            p2,
            _op: PhantomData,
        })
    }

    #[inline(always)]
    pub fn p1(&self) -> &P1 {
        &self.p1
    }

    #[inline(always)]
    pub fn p2(&self) -> &P2 {
        &self.p2
    }
}

impl<P1, P2, G> ProxyCube for GlueCube<P1, P2, G>
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    type Elem = P1::Elem;
    const PREFER_AT_ACCESSOR: bool = P1::PREFER_AT_ACCESSOR || P2::PREFER_AT_ACCESSOR;

    #[inline(always)]
    fn n_rows(&self) -> usize {
        self.p1.n_rows()
    }

    #[inline(always)]
    fn n_cols(&self) -> usize {
        self.p1.n_cols()
    }

    #[inline(always)]
    fn n_slices(&self) -> usize {
        self.p1.n_slices()
    }

    #[inline(always)]
    fn at_linear(&self, i: usize) -> Self::Elem {
        G::apply(self.p1.at_linear(i), self.p2.at_linear(i))
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize, slice: usize) -> Self::Elem {
        G::apply(self.p1.at(row, col, slice), self.p2.at(row, col, slice))
    }

    fn eval_into(&self, out: &mut Cube<Self::Elem>) {
        out.set_size(self.n_rows(), self.n_cols(), self.n_slices());
        crate::eglue::apply_cube(out, self);
    }
}
