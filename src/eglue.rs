//! Evaluator for element-wise binary expressions.
//!
//! One traversal serves all five write modes (assign, `+=`, `-=`, `*=`, `/=`);
//! the mode is a zero-sized [`Accumulate`] marker. The traversal is chosen per
//! expression type:
//!
//! - **Flat**: when neither operand prefers coordinate access, elements are
//!   visited in column-major order through `at_linear`. Fixed-size operands
//!   with at most [`SMALL_FIXED_N_ELEM`] elements use a plain loop; everything
//!   else is processed two elements per iteration.
//! - **Coordinate**: otherwise, elements are read with `at(row, col)` column
//!   by column. A single-row expression is walked along its columns instead.
//!
//! Every path writes the same values; only the order of reads differs.

use crate::dense::{Cube, Mat};
use crate::glue::{Glue, GlueCube, GlueOp};
use crate::kernel::{paired, Accumulate, AddTo, Assign, DivBy, MulBy, Step, SubFrom};
use crate::proxy::{Proxy, ProxyCube};
use crate::{ExprError, Result, SMALL_FIXED_N_ELEM};

// ============================================================================
// Rank 2
// ============================================================================

/// Evaluate `x` into `out`, which must already have `x`'s shape.
pub fn apply<P1, P2, G>(out: &mut Mat<P1::Elem>, x: &Glue<P1, P2, G>)
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    debug_assert!(out.is_size(x.n_rows(), x.n_cols()));
    eval_with::<Assign, _, _, _>(out.as_mut_slice(), x);
}

/// `out += x`
///
/// # Errors
/// Returns `ShapeMismatch` labelled "addition" if shapes differ; `out` is
/// left untouched.
pub fn apply_inplace_plus<P1, P2, G>(out: &mut Mat<P1::Elem>, x: &Glue<P1, P2, G>) -> Result<()>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_inplace::<AddTo, _, _, _>(out, x)
}

/// `out -= x`
pub fn apply_inplace_minus<P1, P2, G>(
    out: &mut Mat<P1::Elem>,
    x: &Glue<P1, P2, G>,
) -> Result<()>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_inplace::<SubFrom, _, _, _>(out, x)
}

/// `out %= x` (element-wise product)
pub fn apply_inplace_schur<P1, P2, G>(
    out: &mut Mat<P1::Elem>,
    x: &Glue<P1, P2, G>,
) -> Result<()>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_inplace::<MulBy, _, _, _>(out, x)
}

/// `out /= x` (element-wise)
pub fn apply_inplace_div<P1, P2, G>(out: &mut Mat<P1::Elem>, x: &Glue<P1, P2, G>) -> Result<()>
where
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_inplace::<DivBy, _, _, _>(out, x)
}

fn apply_inplace<A, P1, P2, G>(out: &mut Mat<P1::Elem>, x: &Glue<P1, P2, G>) -> Result<()>
where
    A: Accumulate,
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    if !out.is_size(x.n_rows(), x.n_cols()) {
        return Err(ExprError::ShapeMismatch {
            op: A::TEXT,
            expected: vec![out.n_rows(), out.n_cols()],
            found: vec![x.n_rows(), x.n_cols()],
        });
    }
    eval_with::<A, _, _, _>(out.as_mut_slice(), x);
    Ok(())
}

fn eval_with<A, P1, P2, G>(out: &mut [P1::Elem], x: &Glue<P1, P2, G>)
where
    A: Accumulate,
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    let prefer_at = <Glue<P1, P2, G> as Proxy>::PREFER_AT_ACCESSOR;
    log::trace!(
        "eglue: {} <- {} ({}x{}, {} path)",
        A::TEXT,
        G::TEXT,
        x.n_rows(),
        x.n_cols(),
        if prefer_at { "coordinate" } else { "flat" }
    );

    if prefer_at {
        eval_at::<A, _, _, _>(out, x);
    } else {
        eval_flat::<A, _, _, _>(out, x);
    }
}

fn eval_flat<A, P1, P2, G>(out: &mut [P1::Elem], x: &Glue<P1, P2, G>)
where
    A: Accumulate,
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    let n_elem = x.n_elem();
    let out = &mut out[..n_elem];
    let (p1, p2) = (x.p1(), x.p2());

    if <Glue<P1, P2, G> as Proxy>::IS_FIXED && n_elem <= SMALL_FIXED_N_ELEM {
        for (i, dst) in out.iter_mut().enumerate() {
            A::merge(dst, G::apply(p1.at_linear(i), p2.at_linear(i)));
        }
        return;
    }

    for step in paired(0, n_elem) {
        match step {
            Step::Pair(i, j) => {
                let tmp_i = G::apply(p1.at_linear(i), p2.at_linear(i));
                let tmp_j = G::apply(p1.at_linear(j), p2.at_linear(j));
                A::merge(&mut out[i], tmp_i);
                A::merge(&mut out[j], tmp_j);
            }
            Step::Single(i) => {
                A::merge(&mut out[i], G::apply(p1.at_linear(i), p2.at_linear(i)));
            }
        }
    }
}

fn eval_at<A, P1, P2, G>(out: &mut [P1::Elem], x: &Glue<P1, P2, G>)
where
    A: Accumulate,
    P1: Proxy,
    P2: Proxy<Elem = P1::Elem>,
    G: GlueOp,
{
    let n_rows = x.n_rows();
    let n_cols = x.n_cols();
    let (p1, p2) = (x.p1(), x.p2());

    if n_rows == 1 {
        for step in paired(0, n_cols) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = G::apply(p1.at(0, i), p2.at(0, i));
                    let tmp_j = G::apply(p1.at(0, j), p2.at(0, j));
                    A::merge(&mut out[i], tmp_i);
                    A::merge(&mut out[j], tmp_j);
                }
                Step::Single(i) => A::merge(&mut out[i], G::apply(p1.at(0, i), p2.at(0, i))),
            }
        }
        return;
    }

    let mut count = 0;
    for col in 0..n_cols {
        for step in paired(0, n_rows) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = G::apply(p1.at(i, col), p2.at(i, col));
                    let tmp_j = G::apply(p1.at(j, col), p2.at(j, col));
                    A::merge(&mut out[count], tmp_i);
                    A::merge(&mut out[count + 1], tmp_j);
                    count += 2;
                }
                Step::Single(i) => {
                    A::merge(&mut out[count], G::apply(p1.at(i, col), p2.at(i, col)));
                    count += 1;
                }
            }
        }
    }
}

// ============================================================================
// Rank 3
// ============================================================================

/// Evaluate `x` into `out`, which must already have `x`'s shape.
pub fn apply_cube<P1, P2, G>(out: &mut Cube<P1::Elem>, x: &GlueCube<P1, P2, G>)
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    debug_assert!(out.is_size(x.n_rows(), x.n_cols(), x.n_slices()));
    eval_cube_with::<Assign, _, _, _>(out.as_mut_slice(), x);
}

/// `out += x`
pub fn apply_cube_inplace_plus<P1, P2, G>(
    out: &mut Cube<P1::Elem>,
    x: &GlueCube<P1, P2, G>,
) -> Result<()>
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_cube_inplace::<AddTo, _, _, _>(out, x)
}

/// `out -= x`
pub fn apply_cube_inplace_minus<P1, P2, G>(
    out: &mut Cube<P1::Elem>,
    x: &GlueCube<P1, P2, G>,
) -> Result<()>
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_cube_inplace::<SubFrom, _, _, _>(out, x)
}

/// `out %= x`
pub fn apply_cube_inplace_schur<P1, P2, G>(
    out: &mut Cube<P1::Elem>,
    x: &GlueCube<P1, P2, G>,
) -> Result<()>
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_cube_inplace::<MulBy, _, _, _>(out, x)
}

/// `out /= x`
pub fn apply_cube_inplace_div<P1, P2, G>(
    out: &mut Cube<P1::Elem>,
    x: &GlueCube<P1, P2, G>,
) -> Result<()>
where
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    apply_cube_inplace::<DivBy, _, _, _>(out, x)
}

fn apply_cube_inplace<A, P1, P2, G>(
    out: &mut Cube<P1::Elem>,
    x: &GlueCube<P1, P2, G>,
) -> Result<()>
where
    A: Accumulate,
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    if !out.is_size(x.n_rows(), x.n_cols(), x.n_slices()) {
        return Err(ExprError::ShapeMismatch {
            op: A::TEXT,
            expected: vec![out.n_rows(), out.n_cols(), out.n_slices()],
            found: vec![x.n_rows(), x.n_cols(), x.n_slices()],
        });
    }
    eval_cube_with::<A, _, _, _>(out.as_mut_slice(), x);
    Ok(())
}

fn eval_cube_with<A, P1, P2, G>(out: &mut [P1::Elem], x: &GlueCube<P1, P2, G>)
where
    A: Accumulate,
    P1: ProxyCube,
    P2: ProxyCube<Elem = P1::Elem>,
    G: GlueOp,
{
    let (p1, p2) = (x.p1(), x.p2());
    let prefer_at = <GlueCube<P1, P2, G> as ProxyCube>::PREFER_AT_ACCESSOR;
    log::trace!(
        "eglue_cube: {} <- {} ({}x{}x{}, {} path)",
        A::TEXT,
        G::TEXT,
        x.n_rows(),
        x.n_cols(),
        x.n_slices(),
        if prefer_at { "coordinate" } else { "flat" }
    );

    if !prefer_at {
        let n_elem = x.n_elem();
        for step in paired(0, n_elem) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = G::apply(p1.at_linear(i), p2.at_linear(i));
                    let tmp_j = G::apply(p1.at_linear(j), p2.at_linear(j));
                    A::merge(&mut out[i], tmp_i);
                    A::merge(&mut out[j], tmp_j);
                }
                Step::Single(i) => {
                    A::merge(&mut out[i], G::apply(p1.at_linear(i), p2.at_linear(i)));
                }
            }
        }
        return;
    }

    let (n_rows, n_cols, n_slices) = (x.n_rows(), x.n_cols(), x.n_slices());
    let mut count = 0;
    for slice in 0..n_slices {
        for col in 0..n_cols {
            for step in paired(0, n_rows) {
                match step {
                    Step::Pair(i, j) => {
                        let tmp_i = G::apply(p1.at(i, col, slice), p2.at(i, col, slice));
                        let tmp_j = G::apply(p1.at(j, col, slice), p2.at(j, col, slice));
                        A::merge(&mut out[count], tmp_i);
                        A::merge(&mut out[count + 1], tmp_j);
                        count += 2;
                    }
                    Step::Single(i) => {
                        let tmp_i = G::apply(p1.at(i, col, slice), p2.at(i, col, slice));
                        A::merge(&mut out[count], tmp_i);
                        count += 1;
                    }
                }
            }
        }
    }
}
