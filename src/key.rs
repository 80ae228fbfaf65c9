//! Ordering and distance for the scalar types which can be used as sorting
//! keys.

use core::cmp::Ordering;

/// Types which can be used as sorting keys.
///
/// Implemented for all scalar types: Booleans, characters, integers, and
/// floating-point numbers. Implement it for your own type to sort it directly
/// with [`sort`], or use [`sort_by_key`] with a key extraction function.
///
/// A key needs two things: a total order, and a way to measure how far apart
/// two keys are. The distance drives the classification of elements into
/// classes, the order drives the final pass. They should agree (a larger key
/// should not be closer to the minimum than a smaller one), otherwise the
/// sort stays correct but degrades towards insertion sort.
///
/// # Examples
///
/// ```rust
/// use core::cmp::Ordering;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Celsius(i16);
///
/// impl flashsort::Key for Celsius {
///     fn compare(&self, other: &Self) -> Ordering {
///         self.0.cmp(&other.0)
///     }
///
///     fn distance(self, origin: Self) -> f64 {
///         f64::from(self.0) - f64::from(origin.0)
///     }
/// }
///
/// let mut temps = [Celsius(21), Celsius(-4), Celsius(9)];
/// flashsort::sort(&mut temps);
/// assert_eq!(temps, [Celsius(-4), Celsius(9), Celsius(21)]);
/// ```
///
/// [`sort`]: fn.sort.html
/// [`sort_by_key`]: fn.sort_by_key.html
pub trait Key: Copy {
    /// Total order of the keys.
    fn compare(&self, other: &Self) -> Ordering;

    /// Distance from `origin` to `self`.
    ///
    /// Called only with `origin` being the smallest key of the slice, so the
    /// result should be non-negative. Negative, infinite and NaN results are
    /// tolerated and clamped to the first or the last class.
    fn distance(self, origin: Self) -> f64;
}

/// Implements `Key` for integer types.
///
/// # Distance
///
/// The difference is computed in `u128` with wrapping arithmetic. Signed
/// integers are sign-extended by the cast, so for `origin <= self` the wrapped
/// difference is the exact distance, even for `i128::MIN` and `i128::MAX`.
///
/// ```plaintext
///   i8: -128 .. 127
///  u128: 0xFF..FF80 .. 0x7F   (sign-extended)
///  127 - (-128) = 0x7F - 0xFF..FF80 = 0xFF   (mod 2^128)
/// ```
///
/// The conversion to `f64` rounds for distances above 2^53, monotonically, so
/// the order of the classes is preserved.
macro_rules! key_impl_integer {
    ($($t:ty)*) => ($(
        impl Key for $t {
            #[inline(always)]
            fn compare(&self, other: &Self) -> Ordering {
                Ord::cmp(self, other)
            }

            #[inline(always)]
            fn distance(self, origin: Self) -> f64 {
                (self as u128).wrapping_sub(origin as u128) as f64
            }
        }
    )*)
}

key_impl_integer! {
    u8 u16 u32 u64 u128 usize
    i8 i16 i32 i64 i128 isize
}

impl Key for bool {
    #[inline(always)]
    fn compare(&self, other: &Self) -> Ordering {
        Ord::cmp(self, other)
    }

    #[inline(always)]
    fn distance(self, origin: Self) -> f64 {
        (self as u8).wrapping_sub(origin as u8) as f64
    }
}

impl Key for char {
    #[inline(always)]
    fn compare(&self, other: &Self) -> Ordering {
        Ord::cmp(self, other)
    }

    #[inline(always)]
    fn distance(self, origin: Self) -> f64 {
        (self as u32).wrapping_sub(origin as u32) as f64
    }
}

/// Implements `Key` for floating-point number types.
///
/// # Order
///
/// Floats are ordered by `total_cmp`, the IEEE 754 total order:
///
/// ```plaintext
/// negative NaN < NEG_INFINITY < MIN < -1.0 < -0.0 < 0.0 < 1.0 < MAX < INFINITY < positive NaN
/// ```
///
/// # Distance
///
/// The distance is the numeric difference, computed in `f64`. With infinities
/// or NaNs in the slice the distances stop being finite numbers. The
/// classifier clamps those into the first or the last class, so such slices
/// are still sorted, just with less help from the classification.
macro_rules! key_impl_float {
    ($($t:ty)*) => ($(
        impl Key for $t {
            #[inline(always)]
            fn compare(&self, other: &Self) -> Ordering {
                self.total_cmp(other)
            }

            #[inline(always)]
            fn distance(self, origin: Self) -> f64 {
                f64::from(self) - f64::from(origin)
            }
        }
    )*)
}

key_impl_float! { f32 f64 }
