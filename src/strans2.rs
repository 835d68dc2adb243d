//! Scaled simple transpose: `out = val * A^T`.

use crate::dense::Mat;
use crate::kernel::{paired, Step};
use crate::strans::{swap_square, transpose_kernel, Operand};
use crate::Element;

/// `out = val * A^T`, where `out` and `a` are distinct.
pub fn apply_noalias<T: Element>(out: &mut Mat<T>, a: &Mat<T>, val: T) {
    apply_noalias_with(out, a, |x| val * x);
}

/// `out = val * A^T`, handling the case where `A` is `out` itself.
pub fn apply<T: Element>(out: &mut Mat<T>, input: Operand<'_, T>, val: T) {
    match input {
        Operand::Distinct(a) => apply_noalias(out, a, val),
        Operand::Output => apply_inplace(out, val),
    }
}

/// Transpose and scale `out` in place.
///
/// Square matrices are swapped across the diagonal and then scaled in a
/// second pass over the buffer.
pub fn apply_inplace<T: Element>(out: &mut Mat<T>, val: T) {
    if out.is_square() {
        log::trace!("strans2: in-place square swap + scale (n={})", out.n_rows());
        swap_square(out);
        out.as_mut_slice().iter_mut().for_each(|x| *x *= val);
    } else {
        let mut tmp = Mat::new();
        apply_noalias(&mut tmp, out, val);
        out.steal_mem(&mut tmp);
    }
}

/// Transpose with an arbitrary per-element map.
pub(crate) fn apply_noalias_with<T: Element>(out: &mut Mat<T>, a: &Mat<T>, f: impl Fn(T) -> T) {
    let (n_rows, n_cols) = (a.n_rows(), a.n_cols());
    out.set_size(n_cols, n_rows);

    if n_rows == 1 || n_cols == 1 {
        let (out_mem, a_mem) = (out.as_mut_slice(), a.as_slice());
        for step in paired(0, a_mem.len()) {
            match step {
                Step::Pair(i, j) => {
                    let tmp_i = a_mem[i];
                    let tmp_j = a_mem[j];
                    out_mem[i] = f(tmp_i);
                    out_mem[j] = f(tmp_j);
                }
                Step::Single(i) => out_mem[i] = f(a_mem[i]),
            }
        }
        return;
    }

    transpose_kernel(out.as_mut_slice(), a, f);
}
