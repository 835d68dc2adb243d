//! Sorted distinct elements of a matrix operand.
//!
//! The result is a row vector when the input is a row vector and a column
//! vector otherwise. Inputs with zero or one element are returned unchanged
//! (keeping their shape). Complex elements have no natural order and are
//! rejected.
//!
//! Ordering uses [`Element::partial_order`]; values that are not comparable
//! with themselves (NaN) sort after every other value and are never merged.

use std::cmp::Ordering;

use crate::dense::Mat;
use crate::kernel::{paired, Step};
use crate::proxy::Proxy;
use crate::{Element, ExprError, Result};

/// `out = unique(x)`
///
/// # Errors
/// Returns `UnsupportedElementType` for complex elements; `out` is not
/// modified in that case.
pub fn apply<P: Proxy>(out: &mut Mat<P::Elem>, x: &P) -> Result<()> {
    if <P::Elem as Element>::IS_COMPLEX {
        return Err(ExprError::UnsupportedElementType(
            "unique(): complex elements are not supported",
        ));
    }

    let (n_rows, n_cols, n_elem) = (x.n_rows(), x.n_cols(), x.n_elem());

    if n_elem <= 1 {
        out.set_size(n_rows, n_cols);
        if n_elem == 1 {
            let v = if P::PREFER_AT_ACCESSOR {
                x.at(0, 0)
            } else {
                x.at_linear(0)
            };
            out.as_mut_slice()[0] = v;
        }
        return Ok(());
    }

    let mut values = collect(x);
    values.sort_by(total_order);
    values.dedup_by(|cur, prev| prev.diff_is_zero(*cur));

    log::trace!("unique: {} of {} elements are distinct", values.len(), n_elem);

    let n_unique = values.len();
    if n_rows == 1 {
        out.set_size(1, n_unique);
    } else {
        out.set_size(n_unique, 1);
    }
    out.as_mut_slice().copy_from_slice(&values);
    Ok(())
}

/// Elements of `x` in column-major order.
fn collect<P: Proxy>(x: &P) -> Vec<P::Elem> {
    let n_elem = x.n_elem();
    let mut values = Vec::with_capacity(n_elem);

    if !P::PREFER_AT_ACCESSOR {
        for step in paired(0, n_elem) {
            match step {
                Step::Pair(i, j) => {
                    values.push(x.at_linear(i));
                    values.push(x.at_linear(j));
                }
                Step::Single(i) => values.push(x.at_linear(i)),
            }
        }
    } else {
        for col in 0..x.n_cols() {
            for row in 0..x.n_rows() {
                values.push(x.at(row, col));
            }
        }
    }
    values
}

/// Total order over `partial_order`, placing incomparable values last.
fn total_order<T: Element>(a: &T, b: &T) -> Ordering {
    let a_nan = a.partial_order(a).is_none();
    let b_nan = b.partial_order(b).is_none();
    match (a_nan, b_nan) {
        (false, false) => a.partial_order(b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}
