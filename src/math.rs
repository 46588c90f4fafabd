//! Simple math utilities.


/// Simple two-dimensional vector of any numerical type.
/// Used for bitmap sizes `(width, height)` and pixel positions `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2<T> (pub T, pub T);

impl<T> Vec2<T> {

    /// The first component of this 2D vector.
    pub fn x(self) -> T { self.0 }

    /// The second component of this 2D vector.
    pub fn y(self) -> T { self.1 }

    /// The first component of this 2D vector.
    pub fn width(self) -> T { self.0 }

    /// The second component of this 2D vector.
    pub fn height(self) -> T { self.1 }
}


/// The number of whole bytes that `width` pixels of `bits_per_pixel` occupy.
/// Computes `ceil(width * bits_per_pixel / 8)`, or `None` if that does not fit into `usize`.
#[inline]
pub fn byte_width(width: usize, bits_per_pixel: usize) -> Option<usize> {
    width.checked_mul(bits_per_pixel).map(|bits| divide_rounding_up(bits, 8))
}

/// Round `value` up to the next multiple of `multiple`, or `None` on overflow.
#[inline]
pub(crate) fn align_up(value: usize, multiple: usize) -> Option<usize> {
    divide_rounding_up(value, multiple).checked_mul(multiple)
}

#[inline]
pub(crate) fn divide_rounding_up(dividend: usize, divisor: usize) -> usize {
    dividend / divisor + usize::from(dividend % divisor != 0)
}
