
//! Views of single rows of bitmap data.
//!
//! A row reads and writes pixels in any color representation.
//! If the format does not support the requested representation natively,
//! the first supported representation of its preference order is used
//! and the color is converted. Colors that the format cannot store,
//! because it lacks alpha, are blended with the background first.

use std::fmt;
use std::sync::Arc;
use crate::access::{PixelAccess, PixelFormat, unsupported};
use crate::color::*;
use crate::error::{Error, Result, UnitResult, check_index};
use crate::format::PixelFormatInfo;
use crate::io::Element;
use crate::math::Vec2;
use crate::palette::{Ditherer, Palette, Quantizer};
use crate::storage::{RawRow, RawRowMut, StorageKind};


/// Everything a row needs to know about its bitmap, except the pixels.
pub(crate) struct RowContext<E: Element> {
    pub(crate) format: PixelFormat<E>,
    pub(crate) info: PixelFormatInfo,
    pub(crate) width: usize,
    pub(crate) kind: StorageKind,
    pub(crate) background: Color32,
    pub(crate) alpha_threshold: u8,
    pub(crate) working_color_space: WorkingColorSpace,
    pub(crate) palette: Option<Palette>,
    pub(crate) quantizer: Option<Arc<dyn Quantizer>>,
}

impl<E: Element> RowContext<E> {

    fn check_x(&self, x: usize) -> UnitResult {
        check_index(x, self.width, "x coordinate")
    }

    pub(crate) fn palette(&self) -> Result<&Palette> {
        self.palette.as_ref().ok_or_else(|| Error::invalid("indexed bitmap data has no palette"))
    }

    fn get_value(&self, raw: &RawRow<'_, E>, x: usize, representation: Representation) -> Result<ColorValue> {
        let access = self.format.access();

        if self.info.indexed {
            let color = self.palette()?.color(access.get_index(raw, x)?)?;
            return Ok(ColorValue::Color32(color).convert_to(representation));
        }

        let source = access.readable().resolve(representation)
            .ok_or_else(|| unsupported(self.info, "read", representation))?;

        Ok(access.get_value(raw, x, source)?.convert_to(representation))
    }

    fn set_value(&self, raw: &mut RawRowMut<'_, E>, x: usize, value: ColorValue) -> UnitResult {
        let access = self.format.access();

        if self.info.indexed {
            let index = self.palette()?.index_of(value.to_color32(), self.quantizer.as_deref())?;
            return access.set_index(raw, x, index);
        }

        let target = access.writable().resolve(value.representation())
            .ok_or_else(|| unsupported(self.info, "write", value.representation()))?;

        let mut value = value.convert_to(target);

        if self.info.requires_blending() && !value.is_opaque() {
            value = if self.info.has_single_bit_alpha && value.alpha_u8() < self.alpha_threshold {
                value.transparent()
            }
            else {
                value.blend_with_background(self.background, self.working_color_space)
            };
        }

        access.set_value(raw, x, value)
    }

    fn get_index(&self, raw: &RawRow<'_, E>, x: usize) -> Result<usize> {
        if !self.info.indexed {
            return Err(Error::unsupported("palette indices of a non-indexed pixel format"));
        }

        self.format.access().get_index(raw, x)
    }

    fn set_index(&self, raw: &mut RawRowMut<'_, E>, x: usize, index: usize) -> UnitResult {
        if !self.info.indexed {
            return Err(Error::unsupported("palette indices of a non-indexed pixel format"));
        }

        check_index(index, self.palette()?.len(), "palette index")?;
        self.format.access().set_index(raw, x, index)
    }
}


/// A single row of bitmap data.
/// The elements are either borrowed immutably (`RowRef`) or mutably (`RowRefMut`).
pub struct Row<'r, E: Element, S> {
    elements: S,
    index: usize,
    context: &'r RowContext<E>,
}

/// An immutable view of a single row.
pub type RowRef<'r, E = u8> = Row<'r, E, &'r [E]>;

/// A mutable view of a single row.
pub type RowRefMut<'r, E = u8> = Row<'r, E, &'r mut [E]>;


macro_rules! color_getters {
    ( $( $method: ident : $color: ty ),* ) => {
        $(
            #[doc = concat!("Read the pixel at `x` as `", stringify!($color), "`.")]
            #[inline]
            pub fn $method(&self, x: usize) -> Result<$color> {
                self.get(x)
            }
        )*
    };
}

macro_rules! color_setters {
    ( $( $method: ident : $color: ty ),* ) => {
        $(
            #[doc = concat!("Write the pixel at `x` from a `", stringify!($color), "`.")]
            #[inline]
            pub fn $method(&mut self, x: usize, color: $color) -> UnitResult {
                self.set(x, color)
            }
        )*
    };
}


impl<'r, E: Element, S: AsRef<[E]>> Row<'r, E, S> {

    pub(crate) fn new(elements: S, index: usize, context: &'r RowContext<E>) -> Self {
        Row { elements, index, context }
    }

    /// The y coordinate of this row.
    pub fn index(&self) -> usize { self.index }

    /// The number of pixels in this row.
    pub fn width(&self) -> usize { self.context.width }

    /// The raw elements of this row, including padding.
    pub fn elements(&self) -> &[E] { self.elements.as_ref() }

    /// Bit-exact access to the elements of this row.
    pub fn raw(&self) -> RawRow<'_, E> {
        RawRow::new(self.elements.as_ref(), self.index, self.context.kind, self.context.working_color_space)
    }

    /// Read the pixel at `x` in any representation,
    /// converting from the closest representation the format supports.
    pub fn get<C: Color>(&self, x: usize) -> Result<C> {
        self.context.check_x(x)?;
        let value = self.context.get_value(&self.raw(), x, C::REPRESENTATION)?;
        Ok(C::from_value(value))
    }

    color_getters! {
        get_color32: Color32, get_pcolor32: PColor32,
        get_color64: Color64, get_pcolor64: PColor64,
        get_color_f: ColorF, get_pcolor_f: PColorF
    }

    /// The palette index of the pixel at `x`. Fails if the format is not indexed.
    pub fn get_index(&self, x: usize) -> Result<usize> {
        self.context.check_x(x)?;
        self.context.get_index(&self.raw(), x)
    }

    /// Read a little-endian value at the specified byte offset of this row.
    pub fn read_raw<T: Element>(&self, byte_offset: usize) -> Result<T> {
        self.raw().read(byte_offset)
    }
}

impl<'r, E: Element> Row<'r, E, &'r mut [E]> {

    /// The raw elements of this row, including padding.
    pub fn elements_mut(&mut self) -> &mut [E] { &mut *self.elements }

    /// Bit-exact mutable access to the elements of this row.
    pub fn raw_mut(&mut self) -> RawRowMut<'_, E> {
        RawRowMut::new(&mut *self.elements, self.index, self.context.kind, self.context.working_color_space)
    }

    /// Write the pixel at `x` from any representation,
    /// converting to the closest representation the format supports.
    /// Translucent colors are blended with the background
    /// if the format cannot store them.
    pub fn set<C: Color>(&mut self, x: usize, color: C) -> UnitResult {
        let context = self.context;
        context.check_x(x)?;
        context.set_value(&mut self.raw_mut(), x, color.into())
    }

    color_setters! {
        set_color32: Color32, set_pcolor32: PColor32,
        set_color64: Color64, set_pcolor64: PColor64,
        set_color_f: ColorF, set_pcolor_f: PColorF
    }

    /// Write a `Color32` after letting the ditherer adjust it for this position.
    pub fn set_color32_dithered(&mut self, x: usize, color: Color32, ditherer: &mut dyn Ditherer) -> UnitResult {
        self.context.check_x(x)?;
        let color = ditherer.dither(color, Vec2(x, self.index));
        self.set(x, color)
    }

    /// Store a palette index at `x`. Fails if the format is not indexed,
    /// or if the index does not fit the pixel or the palette.
    pub fn set_index(&mut self, x: usize, index: usize) -> UnitResult {
        let context = self.context;
        context.check_x(x)?;
        context.set_index(&mut self.raw_mut(), x, index)
    }

    /// Write a little-endian value at the specified byte offset of this row.
    pub fn write_raw<T: Element>(&mut self, byte_offset: usize, value: T) -> UnitResult {
        self.raw_mut().write(byte_offset, value)
    }
}

impl<'r, E: Element, S: AsRef<[E]>> fmt::Debug for Row<'r, E, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Row")
            .field("index", &self.index)
            .field("width", &self.context.width)
            .field("format", &self.context.format)
            .finish()
    }
}
