//! Diagonal matrix construction.
//!
//! - vector input of length `n`: an `n x n` matrix with the vector on the
//!   main diagonal and zeros elsewhere
//! - square matrix input: the same matrix with every off-diagonal element
//!   set to zero
//! - any other shape is rejected

use crate::dense::Mat;
use crate::proxy::Proxy;
use crate::{Element, ExprError, Result};

/// `out = diagmat(x)`
///
/// # Errors
/// Returns `NotSquare` if `x` is neither a vector nor square. `out` is not
/// modified in that case.
pub fn apply<P: Proxy>(out: &mut Mat<P::Elem>, x: &P) -> Result<()> {
    let (n_rows, n_cols) = (x.n_rows(), x.n_cols());

    if n_rows == 1 || n_cols == 1 {
        let n = x.n_elem();
        log::trace!("diagmat: vector of length {n}");
        out.set_zeros(n, n);
        for i in 0..n {
            let v = if !P::PREFER_AT_ACCESSOR {
                x.at_linear(i)
            } else if n_rows == 1 {
                x.at(0, i)
            } else {
                x.at(i, 0)
            };
            *out.at_mut(i, i) = v;
        }
        return Ok(());
    }

    if n_rows != n_cols {
        return Err(ExprError::NotSquare {
            op: "diagmat()",
            rows: n_rows,
            cols: n_cols,
        });
    }

    log::trace!("diagmat: square {n_rows}x{n_cols}");
    out.set_zeros(n_rows, n_cols);
    for i in 0..n_rows {
        *out.at_mut(i, i) = x.at(i, i);
    }
    Ok(())
}

/// `out = diagmat(out)`
///
/// # Errors
/// Returns `NotSquare` if `out` is neither a vector nor square.
pub fn apply_inplace<T: Element>(out: &mut Mat<T>) -> Result<()> {
    if out.is_vec() {
        let tmp = out.as_slice().to_vec();
        let n = tmp.len();
        out.set_zeros(n, n);
        for (i, v) in tmp.into_iter().enumerate() {
            *out.at_mut(i, i) = v;
        }
        return Ok(());
    }

    if !out.is_square() {
        return Err(ExprError::NotSquare {
            op: "diagmat()",
            rows: out.n_rows(),
            cols: out.n_cols(),
        });
    }

    for c in 0..out.n_cols() {
        let col = out.col_mut(c);
        let (above, rest) = col.split_at_mut(c);
        above.fill(T::zero());
        rest[1..].fill(T::zero());
    }
    Ok(())
}
