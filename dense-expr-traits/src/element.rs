//! Scalar type bounds for dense expression kernels.

use num_complex::Complex;
use num_traits::{Float, NumAssign, One, Zero};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// Element types storable in a `Mat`/`Cube` and usable in expressions.
///
/// Every kernel only needs copyable values with the four arithmetic operators
/// and their compound forms. The remaining items are hooks for the few places
/// where real and complex elements behave differently:
///
/// - [`Element::conj`] backs the Hermitian transpose (`ht()`); identity for reals.
/// - [`Element::partial_order`] backs sorting in the unique reduction; complex
///   numbers have no natural order and return `None`.
/// - [`Element::IS_COMPLEX`] lets reductions reject complex input before doing
///   any work.
pub trait Element:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Zero
    + One
{
    /// Whether this is a complex number type.
    const IS_COMPLEX: bool = false;

    /// Complex conjugate.
    #[inline(always)]
    fn conj(self) -> Self {
        self
    }

    /// Ordering used for sorting.
    fn partial_order(&self, other: &Self) -> Option<Ordering>;

    /// Whether two neighbouring sorted values collapse into one.
    ///
    /// Floats use `a - b == 0`, so two infinities of the same sign stay
    /// distinct (`inf - inf` is NaN). Integers compare directly, since the
    /// subtraction can overflow.
    #[inline(always)]
    fn diff_is_zero(self, other: Self) -> bool {
        self == other
    }
}

macro_rules! impl_element_float {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                #[inline(always)]
                fn partial_order(&self, other: &Self) -> Option<Ordering> {
                    self.partial_cmp(other)
                }

                #[inline(always)]
                fn diff_is_zero(self, other: Self) -> bool {
                    (self - other) == 0.0
                }
            }
        )*
    };
}

macro_rules! impl_element_int {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                #[inline(always)]
                fn partial_order(&self, other: &Self) -> Option<Ordering> {
                    Some(self.cmp(other))
                }
            }
        )*
    };
}

impl_element_float!(f32, f64);
impl_element_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T> Element for Complex<T>
where
    T: Float + NumAssign + Debug,
{
    const IS_COMPLEX: bool = true;

    #[inline(always)]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline(always)]
    fn partial_order(&self, _other: &Self) -> Option<Ordering> {
        None
    }

    #[inline(always)]
    fn diff_is_zero(self, other: Self) -> bool {
        (self - other).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn assert_element<T: Element>() {}

    #[test]
    fn test_standard_types() {
        assert_element::<f32>();
        assert_element::<f64>();
        assert_element::<i32>();
        assert_element::<u64>();
        assert_element::<Complex64>();
    }

    #[test]
    fn test_complex_marker() {
        assert!(!<f64 as Element>::IS_COMPLEX);
        assert!(!<i32 as Element>::IS_COMPLEX);
        assert!(<Complex64 as Element>::IS_COMPLEX);
    }

    #[test]
    fn test_conj() {
        assert_eq!(Element::conj(2.5f64), 2.5);
        let z = Complex64::new(1.0, 2.0);
        assert_eq!(Element::conj(z), Complex64::new(1.0, -2.0));
    }

    #[test]
    fn test_partial_order() {
        assert_eq!(1.0f64.partial_order(&2.0), Some(Ordering::Less));
        assert_eq!(f64::NAN.partial_order(&1.0), None);
        assert_eq!(7u8.partial_order(&7), Some(Ordering::Equal));
        let z = Complex64::new(1.0, 0.0);
        assert_eq!(z.partial_order(&z), None);
    }

    #[test]
    fn test_diff_is_zero() {
        assert!(3.0f64.diff_is_zero(3.0));
        assert!(!3.0f64.diff_is_zero(3.5));
        // inf - inf is NaN, so equal infinities are not merged
        assert!(!f64::INFINITY.diff_is_zero(f64::INFINITY));
        assert!(u32::MAX.diff_is_zero(u32::MAX));
        assert!(!0u32.diff_is_zero(1));
        assert!(!i32::MIN.diff_is_zero(i32::MAX));
    }
}
