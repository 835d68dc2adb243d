//! Loop building blocks shared by the evaluators.
//!
//! Most kernels in this crate walk an index range two elements at a time and
//! then handle an odd trailing element. [`paired`] yields that schedule so each
//! kernel only spells out what happens to a pair and to a single element.
//!
//! The accumulate markers ([`Assign`], [`AddTo`], [`SubFrom`], [`MulBy`],
//! [`DivBy`]) select how a computed value is merged into a destination slot.
//! They are zero-sized, so the generic kernels compile to one specialised loop
//! per marker.

use crate::Element;

/// One step of a paired traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Pair(usize, usize),
    Single(usize),
}

/// Iterator over `start..end` in pairs `(i, i + 1)`, ending with a
/// `Single` when the range length is odd.
#[derive(Debug, Clone)]
pub(crate) struct Paired {
    next: usize,
    end: usize,
}

impl Iterator for Paired {
    type Item = Step;

    #[inline(always)]
    fn next(&mut self) -> Option<Step> {
        let i = self.next;
        if i + 1 < self.end {
            self.next = i + 2;
            Some(Step::Pair(i, i + 1))
        } else if i < self.end {
            self.next = self.end;
            Some(Step::Single(i))
        } else {
            None
        }
    }
}

#[inline(always)]
pub(crate) fn paired(start: usize, end: usize) -> Paired {
    Paired {
        next: start,
        end: end.max(start),
    }
}

/// How a computed value is merged into its destination.
pub trait Accumulate: Copy + Default + 'static {
    /// Operation name used in shape-mismatch errors.
    const TEXT: &'static str;

    fn merge<T: Element>(dst: &mut T, value: T);
}

/// `dst = value`
#[derive(Debug, Clone, Copy, Default)]
pub struct Assign;

/// `dst += value`
#[derive(Debug, Clone, Copy, Default)]
pub struct AddTo;

/// `dst -= value`
#[derive(Debug, Clone, Copy, Default)]
pub struct SubFrom;

/// `dst *= value`
#[derive(Debug, Clone, Copy, Default)]
pub struct MulBy;

/// `dst /= value`
#[derive(Debug, Clone, Copy, Default)]
pub struct DivBy;

impl Accumulate for Assign {
    const TEXT: &'static str = "copy into submatrix";

    #[inline(always)]
    fn merge<T: Element>(dst: &mut T, value: T) {
        *dst = value;
    }
}

impl Accumulate for AddTo {
    const TEXT: &'static str = "addition";

    #[inline(always)]
    fn merge<T: Element>(dst: &mut T, value: T) {
        *dst += value;
    }
}

impl Accumulate for SubFrom {
    const TEXT: &'static str = "subtraction";

    #[inline(always)]
    fn merge<T: Element>(dst: &mut T, value: T) {
        *dst -= value;
    }
}

impl Accumulate for MulBy {
    const TEXT: &'static str = "element-wise multiplication";

    #[inline(always)]
    fn merge<T: Element>(dst: &mut T, value: T) {
        *dst *= value;
    }
}

impl Accumulate for DivBy {
    const TEXT: &'static str = "element-wise division";

    #[inline(always)]
    fn merge<T: Element>(dst: &mut T, value: T) {
        *dst /= value;
    }
}
