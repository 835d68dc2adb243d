//! Lazy element-wise and structural expressions over dense column-major
//! matrices and cubes.
//!
//! Operands are combined into expression nodes that are evaluated in a single
//! pass when written into an output container. No intermediate matrices are
//! allocated for element-wise chains.
//!
//! # Core Types
//!
//! - [`Mat`], [`Cube`], [`MatFixed`]: owned column-major containers
//! - [`Proxy`] / [`ProxyCube`]: uniform read access used by every kernel
//! - [`Glue`] / [`GlueCube`]: lazy element-wise binary nodes
//!   ([`Plus`], [`Minus`], [`Schur`], [`Div`])
//! - [`Trans`]: lazy transpose, optionally conjugating ([`Conj`])
//! - [`DiagView`] / [`DiagViewMut`]: a matrix diagonal as a column vector
//!
//! # Operations
//!
//! - [`eglue`]: evaluate element-wise expressions, with `+=`, `-=`, `%=`,
//!   `/=` variants for matrices and cubes
//! - [`strans`] / [`strans2`]: transpose and scaled transpose, including
//!   in-place evaluation
//! - [`diagmat`]: diagonal matrix from a vector or square matrix
//! - [`unique`]: sorted distinct elements
//!
//! # Example
//!
//! ```rust
//! use dense_expr::{eglue, glue, Mat};
//!
//! let a = Mat::from_fn(2, 3, |r, c| (r + c) as f64);
//! let b = Mat::<f64>::ones(2, 3);
//!
//! // out = a + b, evaluated in one pass
//! let sum = glue::plus(&a, &b).unwrap();
//! let mut out = Mat::zeros(2, 3);
//! eglue::apply(&mut out, &sum);
//! assert_eq!(out.at(1, 2), 4.0);
//!
//! // out -= a + b
//! eglue::apply_inplace_minus(&mut out, &sum).unwrap();
//! assert!(out.as_slice().iter().all(|&x| x == 0.0));
//! ```
//!
//! # Diagonal Example
//!
//! ```rust
//! use dense_expr::Mat;
//!
//! let mut m = Mat::<f64>::zeros(3, 3);
//! let mut d = m.diag_mut(0).unwrap();
//! d.fill(2.0);
//! d += 1.0;
//! assert_eq!(m.at(1, 1), 3.0);
//! assert_eq!(m.at(0, 1), 0.0);
//! ```
//!
//! # Logging
//!
//! Kernel path selection is reported through the [`log`] facade at `trace`
//! level; self-aliased diagonal copies are reported at `debug` level.

mod dense;
pub mod diagmat;
pub mod diagview;
pub mod eglue;
pub mod glue;
mod kernel;
pub mod proxy;
pub mod strans;
pub mod strans2;
pub mod unique;

pub use dense_expr_traits::{Conj, Element, ElementOp, Identity};

// ============================================================================
// Containers and expression nodes
// ============================================================================
pub use dense::{Cube, Mat, MatFixed};
pub use diagview::{DiagOperand, DiagSpan, DiagView, DiagViewMut};
pub use glue::{Div, Glue, GlueCube, GlueOp, Minus, Plus, Schur};
pub use kernel::{Accumulate, AddTo, Assign, DivBy, MulBy, SubFrom};
pub use proxy::{PreferAt, Proxy, ProxyCube};
pub use strans::{Operand, Trans};

// ============================================================================
// Constants
// ============================================================================

/// Largest element count for which fixed-size operands are evaluated with a
/// plain (non-paired) loop.
pub const SMALL_FIXED_N_ELEM: usize = 16;

/// Largest square dimension handled by the unrolled transpose kernels.
pub const TINY_SQUARE_MAX: usize = 4;

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while building or evaluating expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// Operand dimensions are incompatible for the operation.
    #[error("{op}: incompatible shapes {expected:?} vs {found:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Matrix is neither square nor a vector where one of those was required.
    #[error("{op}: non-square matrix: rows={rows}, cols={cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    /// Index or diagonal lies outside the container.
    #[error("{op}: index {index} out of bounds for length {len}")]
    OutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },

    /// The element type does not support the operation.
    #[error("{0}")]
    UnsupportedElementType(&'static str),
}

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, ExprError>;
