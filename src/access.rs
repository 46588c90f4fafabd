
//! The contract between rows and pixel formats.
//!
//! A pixel format reads and writes single pixels of a raw row
//! in the representations it supports natively. Everything else,
//! like converting between representations, blending with the background,
//! or looking up palette entries, happens in the row on top of this.

use std::fmt;
use bit_field::BitField;
use half::f16;
use crate::color::*;
use crate::custom::CustomPixelFormat;
use crate::error::{Error, Result, UnitResult, check_index};
use crate::format::{KnownPixelFormat, PixelFormatInfo, Representations};
use crate::io::Element;
use crate::storage::{RawRow, RawRowMut};


/// Reads and writes single pixels of raw rows, one method per color representation.
///
/// Methods of representations that are not contained in `readable()` or `writable()`
/// fail with `Error::NotSupported`. Pixel coordinates are validated by the caller.
pub trait PixelAccess<E: Element>: Send + Sync {

    /// The layout this access operates on.
    fn format_info(&self) -> PixelFormatInfo;

    /// The representations that can be read without conversion.
    fn readable(&self) -> Representations;

    /// The representations that can be written without conversion.
    fn writable(&self) -> Representations;

    fn get_color32(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<Color32> {
        Err(unsupported(self.format_info(), "read", Representation::Color32))
    }

    fn get_pcolor32(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<PColor32> {
        Err(unsupported(self.format_info(), "read", Representation::PColor32))
    }

    fn get_color64(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<Color64> {
        Err(unsupported(self.format_info(), "read", Representation::Color64))
    }

    fn get_pcolor64(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<PColor64> {
        Err(unsupported(self.format_info(), "read", Representation::PColor64))
    }

    fn get_color_f(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<ColorF> {
        Err(unsupported(self.format_info(), "read", Representation::ColorF))
    }

    fn get_pcolor_f(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<PColorF> {
        Err(unsupported(self.format_info(), "read", Representation::PColorF))
    }

    fn set_color32(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _color: Color32) -> UnitResult {
        Err(unsupported(self.format_info(), "write", Representation::Color32))
    }

    fn set_pcolor32(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _color: PColor32) -> UnitResult {
        Err(unsupported(self.format_info(), "write", Representation::PColor32))
    }

    fn set_color64(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _color: Color64) -> UnitResult {
        Err(unsupported(self.format_info(), "write", Representation::Color64))
    }

    fn set_pcolor64(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _color: PColor64) -> UnitResult {
        Err(unsupported(self.format_info(), "write", Representation::PColor64))
    }

    fn set_color_f(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _color: ColorF) -> UnitResult {
        Err(unsupported(self.format_info(), "write", Representation::ColorF))
    }

    fn set_pcolor_f(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _color: PColorF) -> UnitResult {
        Err(unsupported(self.format_info(), "write", Representation::PColorF))
    }

    /// The palette index of an indexed pixel.
    fn get_index(&self, _row: &RawRow<'_, E>, _x: usize) -> Result<usize> {
        Err(Error::unsupported("pixel format has no readable palette indices"))
    }

    /// Store a palette index. Indices that do not fit the pixel must be rejected.
    fn set_index(&self, _row: &mut RawRowMut<'_, E>, _x: usize, _index: usize) -> UnitResult {
        Err(Error::unsupported("pixel format has no writable palette indices"))
    }

    /// Read the pixel in the specified representation, without any conversion.
    fn get_value(&self, row: &RawRow<'_, E>, x: usize, representation: Representation) -> Result<ColorValue> {
        Ok(match representation {
            Representation::Color32 => ColorValue::Color32(self.get_color32(row, x)?),
            Representation::PColor32 => ColorValue::PColor32(self.get_pcolor32(row, x)?),
            Representation::Color64 => ColorValue::Color64(self.get_color64(row, x)?),
            Representation::PColor64 => ColorValue::PColor64(self.get_pcolor64(row, x)?),
            Representation::ColorF => ColorValue::ColorF(self.get_color_f(row, x)?),
            Representation::PColorF => ColorValue::PColorF(self.get_pcolor_f(row, x)?),
        })
    }

    /// Write the pixel in the representation of the value, without any conversion.
    fn set_value(&self, row: &mut RawRowMut<'_, E>, x: usize, value: ColorValue) -> UnitResult {
        match value {
            ColorValue::Color32(color) => self.set_color32(row, x, color),
            ColorValue::PColor32(color) => self.set_pcolor32(row, x, color),
            ColorValue::Color64(color) => self.set_color64(row, x, color),
            ColorValue::PColor64(color) => self.set_pcolor64(row, x, color),
            ColorValue::ColorF(color) => self.set_color_f(row, x, color),
            ColorValue::PColorF(color) => self.set_pcolor_f(row, x, color),
        }
    }
}

pub(crate) fn unsupported(info: PixelFormatInfo, direction: &str, representation: Representation) -> Error {
    Error::unsupported(format!(
        "{}-bit{} pixel format cannot {} {} values",
        info.bits_per_pixel, if info.custom { " custom" } else { "" },
        direction, representation.name()
    ))
}


/// Either one of the built-in layouts, or a layout defined by callbacks.
#[derive(Clone)]
pub enum PixelFormat<E: Element> {

    /// A built-in layout.
    Known(KnownPixelFormat),

    /// A layout defined by callbacks.
    Custom(CustomPixelFormat<E>),
}

impl<E: Element> PixelFormat<E> {

    /// The descriptor of the layout.
    pub fn info(&self) -> PixelFormatInfo {
        self.access().format_info()
    }

    /// The built-in layout, if this is not a custom format.
    pub fn known(&self) -> Option<KnownPixelFormat> {
        match self {
            PixelFormat::Known(format) => Some(*format),
            PixelFormat::Custom(_) => None,
        }
    }

    /// Whether any natively supported representation has more than 8 bits per channel.
    pub fn is_wide(&self) -> bool {
        let access = self.access();

        Representation::ALL.iter().any(|&representation| {
            representation.bits_per_channel() > 8 && (
                access.readable().contains(representation)
                    || access.writable().contains(representation)
            )
        })
    }

    /// The pixel accessor of this format.
    pub fn access(&self) -> &dyn PixelAccess<E> {
        match self {
            PixelFormat::Known(format) => format,
            PixelFormat::Custom(format) => format,
        }
    }
}

impl<E: Element> From<KnownPixelFormat> for PixelFormat<E> {
    fn from(format: KnownPixelFormat) -> Self { PixelFormat::Known(format) }
}

impl<E: Element> From<CustomPixelFormat<E>> for PixelFormat<E> {
    fn from(format: CustomPixelFormat<E>) -> Self { PixelFormat::Custom(format) }
}

impl<E: Element> fmt::Debug for PixelFormat<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Known(format) => fmt::Debug::fmt(format, formatter),
            PixelFormat::Custom(format) => fmt::Debug::fmt(format, formatter),
        }
    }
}


#[inline]
fn expand_5(value: u16) -> u8 {
    let value = value as u8;
    (value << 3) | (value >> 2)
}

#[inline]
fn expand_6(value: u16) -> u8 {
    let value = value as u8;
    (value << 2) | (value >> 4)
}

fn decode_555(bits: u16) -> Color32 {
    Color32::from_rgb(expand_5(bits.get_bits(10..15)), expand_5(bits.get_bits(5..10)), expand_5(bits.get_bits(0..5)))
}

fn encode_555(color: Color32) -> u16 {
    let mut bits = 0_u16;
    bits.set_bits(10..15, (color.r >> 3) as u16);
    bits.set_bits(5..10, (color.g >> 3) as u16);
    bits.set_bits(0..5, (color.b >> 3) as u16);
    bits
}

fn decode_565(bits: u16) -> Color32 {
    Color32::from_rgb(expand_5(bits.get_bits(11..16)), expand_6(bits.get_bits(5..11)), expand_5(bits.get_bits(0..5)))
}

fn encode_565(color: Color32) -> u16 {
    let mut bits = 0_u16;
    bits.set_bits(11..16, (color.r >> 3) as u16);
    bits.set_bits(5..11, (color.g >> 2) as u16);
    bits.set_bits(0..5, (color.b >> 3) as u16);
    bits
}

fn decode_1555(bits: u16) -> Color32 {
    let alpha = if bits.get_bit(15) { 255 } else { 0 };
    decode_555(bits).with_alpha(alpha)
}

fn encode_1555(color: Color32) -> u16 {
    let mut bits = encode_555(color);
    bits.set_bit(15, color.a >= 128);
    bits
}

/// The bit range of a 4-bit index inside its byte. The first pixel is the high nibble.
fn nibble(x: usize) -> std::ops::Range<usize> {
    if x % 2 == 0 { 4..8 } else { 0..4 }
}


impl KnownPixelFormat {

    /// Saturates, so that huge coordinates fail the bounds check of the row.
    #[inline]
    fn byte_offset(self, x: usize) -> usize {
        x.saturating_mul(self.info().bits_per_pixel / 8)
    }

    fn native_representations(self) -> Representations {
        if self.info().indexed { Representations::NONE }
        else { Representations::only(self.native_representation()) }
    }
}

impl<E: Element> PixelAccess<E> for KnownPixelFormat {
    fn format_info(&self) -> PixelFormatInfo { KnownPixelFormat::info(*self) }
    fn readable(&self) -> Representations { self.native_representations() }
    fn writable(&self) -> Representations { self.native_representations() }

    fn get_color32(&self, row: &RawRow<'_, E>, x: usize) -> Result<Color32> {
        use KnownPixelFormat::*;
        let offset = self.byte_offset(x);

        match *self {
            Gray8 => {
                let value: u8 = row.read_pixel(offset)?;
                Ok(Color32::from_rgb(value, value, value))
            },

            Rgb555 => Ok(decode_555(row.read_pixel(offset)?)),
            Rgb565 => Ok(decode_565(row.read_pixel(offset)?)),
            Argb1555 => Ok(decode_1555(row.read_pixel(offset)?)),

            Rgb24 => {
                let [b, g, r]: [u8; 3] = row.read_pixel(offset)?;
                Ok(Color32::from_rgb(r, g, b))
            },

            Rgb32 => Ok(Color32::from_argb(row.read_pixel(offset)?).with_alpha(255)),
            Argb32 => Ok(Color32::from_argb(row.read_pixel(offset)?)),
            _ => Err(unsupported(KnownPixelFormat::info(*self), "read", Representation::Color32)),
        }
    }

    fn get_pcolor32(&self, row: &RawRow<'_, E>, x: usize) -> Result<PColor32> {
        match *self {
            KnownPixelFormat::PArgb32 => Ok(PColor32::from_argb(row.read_pixel(self.byte_offset(x))?)),
            _ => Err(unsupported(KnownPixelFormat::info(*self), "read", Representation::PColor32)),
        }
    }

    fn get_color64(&self, row: &RawRow<'_, E>, x: usize) -> Result<Color64> {
        use KnownPixelFormat::*;
        let offset = self.byte_offset(x);

        match *self {
            Gray16 => {
                let value: u16 = row.read_pixel(offset)?;
                Ok(Color64::from_rgb(value, value, value))
            },

            Rgb48 => {
                let [b, g, r]: [u16; 3] = row.read_pixel(offset)?;
                Ok(Color64::from_rgb(r, g, b))
            },

            Argb64 => {
                let [b, g, r, a]: [u16; 4] = row.read_pixel(offset)?;
                Ok(Color64::new(r, g, b, a))
            },

            _ => Err(unsupported(KnownPixelFormat::info(*self), "read", Representation::Color64)),
        }
    }

    fn get_pcolor64(&self, row: &RawRow<'_, E>, x: usize) -> Result<PColor64> {
        match *self {
            KnownPixelFormat::PArgb64 => {
                let [b, g, r, a]: [u16; 4] = row.read_pixel(self.byte_offset(x))?;
                Ok(PColor64::new(r, g, b, a))
            },

            _ => Err(unsupported(KnownPixelFormat::info(*self), "read", Representation::PColor64)),
        }
    }

    fn get_color_f(&self, row: &RawRow<'_, E>, x: usize) -> Result<ColorF> {
        use KnownPixelFormat::*;
        let offset = self.byte_offset(x);

        match *self {
            Gray32Float => {
                let value: f32 = row.read_pixel(offset)?;
                Ok(ColorF::from_rgb(value, value, value))
            },

            Rgba64Half => {
                let [r, g, b, a]: [f16; 4] = row.read_pixel(offset)?;
                Ok(ColorF::new(r.to_f32(), g.to_f32(), b.to_f32(), a.to_f32()))
            },

            Rgb96Float => {
                let [r, g, b]: [f32; 3] = row.read_pixel(offset)?;
                Ok(ColorF::from_rgb(r, g, b))
            },

            Rgba128Float => {
                let [r, g, b, a]: [f32; 4] = row.read_pixel(offset)?;
                Ok(ColorF::new(r, g, b, a))
            },

            _ => Err(unsupported(KnownPixelFormat::info(*self), "read", Representation::ColorF)),
        }
    }

    fn get_pcolor_f(&self, row: &RawRow<'_, E>, x: usize) -> Result<PColorF> {
        match *self {
            KnownPixelFormat::PRgba128Float => {
                let [r, g, b, a]: [f32; 4] = row.read_pixel(self.byte_offset(x))?;
                Ok(PColorF::new(r, g, b, a))
            },

            _ => Err(unsupported(KnownPixelFormat::info(*self), "read", Representation::PColorF)),
        }
    }

    fn set_color32(&self, row: &mut RawRowMut<'_, E>, x: usize, color: Color32) -> UnitResult {
        use KnownPixelFormat::*;
        let offset = self.byte_offset(x);

        match *self {
            Gray8 => row.write_pixel(offset, color.luminance(row.working_color_space()))?,
            Rgb555 => row.write_pixel(offset, encode_555(color))?,
            Rgb565 => row.write_pixel(offset, encode_565(color))?,
            Argb1555 => row.write_pixel(offset, encode_1555(color))?,
            Rgb24 => row.write_pixel(offset, [color.b, color.g, color.r])?,
            Rgb32 => row.write_pixel(offset, color.with_alpha(255).to_argb())?,
            Argb32 => row.write_pixel(offset, color.to_argb())?,
            _ => return Err(unsupported(KnownPixelFormat::info(*self), "write", Representation::Color32)),
        }

        Ok(())
    }

    fn set_pcolor32(&self, row: &mut RawRowMut<'_, E>, x: usize, color: PColor32) -> UnitResult {
        match *self {
            KnownPixelFormat::PArgb32 => row.write_pixel(self.byte_offset(x), color.to_argb())?,
            _ => return Err(unsupported(KnownPixelFormat::info(*self), "write", Representation::PColor32)),
        }

        Ok(())
    }

    fn set_color64(&self, row: &mut RawRowMut<'_, E>, x: usize, color: Color64) -> UnitResult {
        use KnownPixelFormat::*;
        let offset = self.byte_offset(x);

        match *self {
            Gray16 => row.write_pixel(offset, color.luminance(row.working_color_space()))?,
            Rgb48 => row.write_pixel(offset, [color.b, color.g, color.r])?,
            Argb64 => row.write_pixel(offset, [color.b, color.g, color.r, color.a])?,
            _ => return Err(unsupported(KnownPixelFormat::info(*self), "write", Representation::Color64)),
        }

        Ok(())
    }

    fn set_pcolor64(&self, row: &mut RawRowMut<'_, E>, x: usize, color: PColor64) -> UnitResult {
        match *self {
            KnownPixelFormat::PArgb64 => row.write_pixel(self.byte_offset(x), [color.b, color.g, color.r, color.a])?,
            _ => return Err(unsupported(KnownPixelFormat::info(*self), "write", Representation::PColor64)),
        }

        Ok(())
    }

    fn set_color_f(&self, row: &mut RawRowMut<'_, E>, x: usize, color: ColorF) -> UnitResult {
        use KnownPixelFormat::*;
        let offset = self.byte_offset(x);

        match *self {
            Gray32Float => row.write_pixel(offset, color.luminance(row.working_color_space()))?,

            Rgba64Half => row.write_pixel(offset, [
                f16::from_f32(color.r), f16::from_f32(color.g),
                f16::from_f32(color.b), f16::from_f32(color.a),
            ])?,

            Rgb96Float => row.write_pixel(offset, [color.r, color.g, color.b])?,
            Rgba128Float => row.write_pixel(offset, [color.r, color.g, color.b, color.a])?,
            _ => return Err(unsupported(KnownPixelFormat::info(*self), "write", Representation::ColorF)),
        }

        Ok(())
    }

    fn set_pcolor_f(&self, row: &mut RawRowMut<'_, E>, x: usize, color: PColorF) -> UnitResult {
        match *self {
            KnownPixelFormat::PRgba128Float => row.write_pixel(self.byte_offset(x), [color.r, color.g, color.b, color.a])?,
            _ => return Err(unsupported(KnownPixelFormat::info(*self), "write", Representation::PColorF)),
        }

        Ok(())
    }

    fn get_index(&self, row: &RawRow<'_, E>, x: usize) -> Result<usize> {
        match *self {
            KnownPixelFormat::Indexed1 => {
                let byte: u8 = row.read_pixel(x / 8)?;
                Ok(byte.get_bit(7 - x % 8) as usize)
            },

            KnownPixelFormat::Indexed4 => {
                let byte: u8 = row.read_pixel(x / 2)?;
                Ok(byte.get_bits(nibble(x)) as usize)
            },

            KnownPixelFormat::Indexed8 => Ok(row.read_pixel::<u8>(x)? as usize),
            _ => Err(Error::unsupported("pixel format is not indexed")),
        }
    }

    fn set_index(&self, row: &mut RawRowMut<'_, E>, x: usize, index: usize) -> UnitResult {
        let count = KnownPixelFormat::info(*self).max_palette_size()
            .ok_or_else(|| Error::unsupported("pixel format is not indexed"))?;

        check_index(index, count, "palette index")?;

        match *self {
            KnownPixelFormat::Indexed1 => {
                let mut byte: u8 = row.read_pixel(x / 8)?;
                byte.set_bit(7 - x % 8, index == 1);
                row.write_pixel(x / 8, byte)?;
            },

            KnownPixelFormat::Indexed4 => {
                let mut byte: u8 = row.read_pixel(x / 2)?;
                byte.set_bits(nibble(x), index as u8);
                row.write_pixel(x / 2, byte)?;
            },

            _ => row.write_pixel(x, index as u8)?,
        }

        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::color::WorkingColorSpace;
    use crate::storage::StorageKind;

    fn with_row<E: Element>(elements: &mut [E], action: impl FnOnce(&mut RawRowMut<'_, E>)) {
        let mut row = RawRowMut::new(elements, 0, StorageKind::ByteCast, WorkingColorSpace::Srgb);
        action(&mut row);
    }

    #[test]
    fn rgb24_is_stored_blue_first() {
        let mut bytes = [0_u8; 6];

        with_row(&mut bytes, |row| {
            KnownPixelFormat::Rgb24.set_color32(row, 1, Color32::from_rgb(1, 2, 3)).unwrap();
            assert_eq!(KnownPixelFormat::Rgb24.get_color32(&row.as_raw_row(), 1).unwrap(), Color32::from_rgb(1, 2, 3));
        });

        assert_eq!(bytes, [0, 0, 0, 3, 2, 1]);
    }

    #[test]
    fn argb32_is_a_little_endian_integer() {
        let mut bytes = [0_u8; 4];
        with_row(&mut bytes, |row| {
            KnownPixelFormat::Argb32.set_color32(row, 0, Color32::new(1, 2, 3, 4)).unwrap();
        });

        assert_eq!(bytes, [3, 2, 1, 4]);
    }

    #[test]
    fn rgb32_ignores_stored_alpha() {
        let mut bytes = [3_u8, 2, 1, 0];
        with_row(&mut bytes, |row| {
            let color = KnownPixelFormat::Rgb32.get_color32(&row.as_raw_row(), 0).unwrap();
            assert_eq!(color, Color32::from_rgb(1, 2, 3));
        });
    }

    #[test]
    fn rgb565_expands_reduced_channels() {
        let mut bytes = [0_u8; 2];

        with_row(&mut bytes, |row| {
            KnownPixelFormat::Rgb565.set_color32(row, 0, Color32::from_rgb(255, 130, 17)).unwrap();
            let read = KnownPixelFormat::Rgb565.get_color32(&row.as_raw_row(), 0).unwrap();
            assert_eq!(read, Color32::from_rgb(255, 130, 16));
        });

        assert_eq!(u16::from_le_bytes(bytes), 0b11111_100000_00010);
    }

    #[test]
    fn rgb555_drops_three_bits_per_channel() {
        let mut bytes = [0_u8; 2];

        with_row(&mut bytes, |row| {
            KnownPixelFormat::Rgb555.set_color32(row, 0, Color32::from_rgb(255, 130, 17)).unwrap();
            let read = KnownPixelFormat::Rgb555.get_color32(&row.as_raw_row(), 0).unwrap();
            assert_eq!(read, Color32::from_rgb(255, 132, 16), "five bits are expanded by repeating the high bits");
        });

        assert_eq!(u16::from_le_bytes(bytes), 0b0_11111_10000_00010);
    }

    #[test]
    fn gray32_float_stores_luminance() {
        let mut elements = [0_f32; 2];

        with_row(&mut elements, |row| {
            KnownPixelFormat::Gray32Float.set_color_f(row, 1, ColorF::new(0.25, 0.25, 0.25, 0.5)).unwrap();
            let read = KnownPixelFormat::Gray32Float.get_color_f(&row.as_raw_row(), 1).unwrap();
            assert!((read.r - 0.25).abs() < 1e-6);
            assert_eq!(read.r, read.b);
            assert_eq!(read.a, 1.0);
        });

        assert_eq!(elements[0], 0.0);
        assert!((elements[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn access_beyond_the_row_is_an_error() {
        let mut bytes = [0_u8; 8];

        with_row(&mut bytes, |row| {
            let format = KnownPixelFormat::Argb32;
            assert!(matches!(format.set_color32(row, 2, Color32::WHITE), Err(Error::OutOfBounds(_))));
            assert!(matches!(format.set_color32(row, usize::MAX, Color32::WHITE), Err(Error::OutOfBounds(_))));
            assert!(matches!(PixelAccess::<u8>::get_color32(&format, &row.as_raw_row(), 10), Err(Error::OutOfBounds(_))));
            assert!(matches!(KnownPixelFormat::Rgba128Float.get_color_f(&row.as_raw_row(), 0), Err(Error::OutOfBounds(_))));
            assert!(matches!(KnownPixelFormat::Indexed1.get_index(&row.as_raw_row(), 64), Err(Error::OutOfBounds(_))));
            assert!(matches!(KnownPixelFormat::Indexed4.set_index(row, 16, 1), Err(Error::OutOfBounds(_))));
            assert!(format.set_color32(row, 1, Color32::WHITE).is_ok());
        });

        assert_eq!(bytes, [0, 0, 0, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn argb1555_keeps_a_single_alpha_bit() {
        let mut elements = [0_u16; 2];

        with_row(&mut elements, |row| {
            KnownPixelFormat::Argb1555.set_color32(row, 0, Color32::new(255, 255, 255, 255)).unwrap();
            KnownPixelFormat::Argb1555.set_color32(row, 1, Color32::TRANSPARENT).unwrap();

            let raw = row.as_raw_row();
            assert_eq!(KnownPixelFormat::Argb1555.get_color32(&raw, 0).unwrap(), Color32::WHITE);
            assert_eq!(KnownPixelFormat::Argb1555.get_color32(&raw, 1).unwrap(), Color32::TRANSPARENT);
        });

        assert_eq!(elements, [0xFFFF, 0]);
    }

    #[test]
    fn gray_formats_store_luminance() {
        let mut bytes = [0_u8; 2];

        with_row(&mut bytes, |row| {
            KnownPixelFormat::Gray16.set_color64(row, 0, Color64::from_rgb(65535, 65535, 65535)).unwrap();
            let read = KnownPixelFormat::Gray16.get_color64(&row.as_raw_row(), 0).unwrap();
            assert_eq!(read, Color64::from_rgb(65535, 65535, 65535));
        });

        assert_eq!(bytes, [255, 255]);
    }

    #[test]
    fn half_float_channels() {
        let mut elements = [f16::ZERO; 8];

        with_row(&mut elements, |row| {
            KnownPixelFormat::Rgba64Half.set_color_f(row, 1, ColorF::new(0.5, 1.0, 0.0, 1.0)).unwrap();
            let read = KnownPixelFormat::Rgba64Half.get_color_f(&row.as_raw_row(), 1).unwrap();
            assert_eq!(read, ColorF::new(0.5, 1.0, 0.0, 1.0));
        });

        assert_eq!(elements[4], f16::from_f32(0.5));
        assert_eq!(elements[7], f16::ONE);
    }

    #[test]
    fn sub_byte_indices_are_most_significant_first() {
        let mut bytes = [0_u8; 2];

        with_row(&mut bytes, |row| {
            KnownPixelFormat::Indexed1.set_index(row, 0, 1).unwrap();
            KnownPixelFormat::Indexed1.set_index(row, 9, 1).unwrap();
            assert_eq!(KnownPixelFormat::Indexed1.get_index(&row.as_raw_row(), 9).unwrap(), 1);
            assert_eq!(KnownPixelFormat::Indexed1.get_index(&row.as_raw_row(), 8).unwrap(), 0);
        });

        assert_eq!(bytes, [0b1000_0000, 0b0100_0000]);

        let mut bytes = [0_u8; 1];
        with_row(&mut bytes, |row| {
            KnownPixelFormat::Indexed4.set_index(row, 0, 0xA).unwrap();
            KnownPixelFormat::Indexed4.set_index(row, 1, 0x3).unwrap();
        });

        assert_eq!(bytes, [0xA3]);
    }

    #[test]
    fn indices_are_never_masked() {
        let mut bytes = [0_u8; 1];

        with_row(&mut bytes, |row| {
            assert!(matches!(KnownPixelFormat::Indexed1.set_index(row, 0, 2), Err(Error::OutOfBounds(_))));
            assert!(matches!(KnownPixelFormat::Indexed4.set_index(row, 0, 16), Err(Error::OutOfBounds(_))));
            assert!(matches!(KnownPixelFormat::Rgb24.set_index(row, 0, 0), Err(Error::NotSupported(_))));
        });

        assert_eq!(bytes, [0]);
    }

    #[test]
    fn only_the_native_representation_is_accessible() {
        let format = KnownPixelFormat::PArgb64;
        assert_eq!(PixelAccess::<u8>::readable(&format), Representations::only(Representation::PColor64));

        let bytes = [0_u8; 8];
        let row = RawRow::new(&bytes, 0, StorageKind::ByteCast, WorkingColorSpace::Srgb);
        assert!(matches!(format.get_color64(&row, 0), Err(Error::NotSupported(_))));
        assert!(matches!(format.get_value(&row, 0, Representation::PColor64), Ok(ColorValue::PColor64(_))));
    }
}
