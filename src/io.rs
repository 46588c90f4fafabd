
//! Specialized binary input and output.
//! Defines the plain values that bitmap rows are made of,
//! and how they are laid out as little-endian bytes.

pub use ::std::io::{Read, Write};
use half::slice::HalfFloatSliceExt;
use lebe::prelude::*;
use ::half::f16;
use crate::error::IoResult;


/// A plain, fixed-size value that a bitmap buffer can consist of,
/// and that can be read from or written to a row at any byte offset.
///
/// Implemented for all primitive integers and floats, for `f16`,
/// and for arrays of those (for example `[u8; 3]` as a 24-bit pixel).
/// The byte representation is always little-endian,
/// independent of the current platform.
pub trait Element: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {

    /// Number of bytes this value occupies.
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// The alignment this value would have in memory.
    /// Raw access in buffers of foreign element types must respect this.
    const ALIGNMENT: usize = ::std::mem::align_of::<Self>();

    /// A value with all bytes set to zero.
    const ZERO: Self;

    /// Decode a value from the first `BYTE_SIZE` bytes of the slice.
    /// Panics if the slice is too short.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode this value into the first `BYTE_SIZE` bytes of the slice.
    /// Panics if the slice is too short.
    fn write_le(self, bytes: &mut [u8]);

    /// Read as many values of type `Self` as fit into the specified slice.
    fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> IoResult<()>;

    /// Write all values of that slice to the writer.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> IoResult<()>;
}


macro_rules! implement_element_for_primitive {
    ($kind: ident) => {
        impl Element for $kind {
            const ZERO: Self = 0 as $kind;

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut array = [0_u8; ::std::mem::size_of::<$kind>()];
                array.copy_from_slice(&bytes[.. ::std::mem::size_of::<$kind>()]);
                <$kind>::from_le_bytes(array)
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                bytes[.. ::std::mem::size_of::<$kind>()].copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> IoResult<()> {
                read.read_from_little_endian_into(slice)?;
                Ok(())
            }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> IoResult<()> {
                write.write_as_little_endian(slice)?;
                Ok(())
            }
        }
    };
}

implement_element_for_primitive!(u8);
implement_element_for_primitive!(i8);
implement_element_for_primitive!(i16);
implement_element_for_primitive!(u16);
implement_element_for_primitive!(u32);
implement_element_for_primitive!(i32);
implement_element_for_primitive!(i64);
implement_element_for_primitive!(u64);
implement_element_for_primitive!(f32);
implement_element_for_primitive!(f64);


impl Element for f16 {
    const ZERO: Self = f16::ZERO;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        f16::from_bits(u16::read_le(bytes))
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        self.to_bits().write_le(bytes)
    }

    #[inline]
    fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> IoResult<()> {
        let bits = slice.reinterpret_cast_mut();
        u16::read_slice(read, bits)
    }

    #[inline]
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> IoResult<()> {
        let bits = slice.reinterpret_cast();
        u16::write_slice(write, bits)
    }
}


/// Multi-channel pixels, for example `[u8; 3]` for 24-bit colors
/// or `[f32; 4]` for 128-bit float colors. The first item has the lowest address.
impl<T: Element, const N: usize> Element for [T; N] {
    const ZERO: Self = [T::ZERO; N];

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        let mut value = Self::ZERO;

        for (index, item) in value.iter_mut().enumerate() {
            *item = T::read_le(&bytes[index * T::BYTE_SIZE ..]);
        }

        value
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        for (index, item) in self.iter().enumerate() {
            item.write_le(&mut bytes[index * T::BYTE_SIZE ..]);
        }
    }

    fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> IoResult<()> {
        for value in slice {
            T::read_slice(read, value)?;
        }

        Ok(())
    }

    fn write_slice(write: &mut impl Write, slice: &[Self]) -> IoResult<()> {
        for value in slice {
            T::write_slice(write, value)?;
        }

        Ok(())
    }
}
