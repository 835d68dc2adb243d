//! Shared traits for the dense-expr workspace.
//!
//! This crate holds the element-type bounds used by every kernel in
//! `dense-expr` (containers, element-wise evaluator, transpose, diagonal views,
//! reductions). Downstream crates can depend on `dense-expr-traits` alone to
//! implement [`Element`] for their own scalar types without orphan rule
//! violations.

pub mod element;
pub mod element_op;

pub use element::Element;
pub use element_op::{Conj, ElementOp, Identity};
