//! Element operations applied lazily on read.
//!
//! Lazy transpose nodes carry one of these markers at the type level so the
//! Hermitian transpose can conjugate on access without a runtime branch.

use crate::element::Element;

/// Trait for element-wise operations applied on read.
pub trait ElementOp: Copy + Default + 'static {
    /// Whether this operation is the identity (no-op).
    const IS_IDENTITY: bool = false;

    /// Apply the operation to a value.
    fn apply<T: Element>(value: T) -> T;
}

/// Identity operation: f(x) = x
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Complex conjugate operation: f(x) = conj(x)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conj;

impl ElementOp for Identity {
    const IS_IDENTITY: bool = true;

    #[inline(always)]
    fn apply<T: Element>(value: T) -> T {
        value
    }
}

impl ElementOp for Conj {
    #[inline(always)]
    fn apply<T: Element>(value: T) -> T {
        value.conj()
    }
}
