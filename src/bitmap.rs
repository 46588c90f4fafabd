
//! Bitmap data: a rectangle of pixels in a specific layout,
//! stored in memory that is either owned or borrowed from the caller.

use std::fmt;
use std::sync::Arc;
use smallvec::SmallVec;
use crate::access::PixelFormat;
use crate::color::*;
use crate::error::{Error, Result, UnitResult, check_index};
use crate::format::PixelFormatInfo;
use crate::io::{Element, Read, Write};
use crate::math::{Vec2, align_up, divide_rounding_up};
use crate::palette::{Ditherer, Palette, Quantizer};
use crate::row::{Row, RowContext, RowRef, RowRefMut};
use crate::storage::{Allocation, Backing, StorageKind};

#[cfg(feature = "rayon")]
use rayon::prelude::*;


/// How colors are written to bitmap data that cannot store them exactly.
#[derive(Clone)]
pub struct BitmapDataConfig {

    /// Translucent colors are blended with this color
    /// if the format has no alpha channel. Its alpha is ignored.
    pub background: Color32,

    /// In formats with a single bit of alpha, colors with a smaller alpha
    /// become transparent, and other colors are blended with the background.
    /// Also used to find the transparent entry of a palette.
    pub alpha_threshold: u8,

    /// Where blending and luminance arithmetic happens.
    pub working_color_space: WorkingColorSpace,

    /// The palette of indexed formats. A default palette is used if not specified.
    /// Ignored for formats that are not indexed.
    pub palette: Option<Palette>,

    /// Maps colors that are not in the palette to palette entries.
    /// Requires a palette to be specified.
    pub quantizer: Option<Arc<dyn Quantizer>>,
}

impl Default for BitmapDataConfig {
    fn default() -> Self {
        BitmapDataConfig {
            background: Color32::BLACK,
            alpha_threshold: 128,
            working_color_space: WorkingColorSpace::Srgb,
            palette: None,
            quantizer: None,
        }
    }
}

impl BitmapDataConfig {

    /// Blend translucent colors with this color.
    pub fn with_background(self, background: Color32) -> Self {
        BitmapDataConfig { background, ..self }
    }

    /// Use another alpha threshold.
    pub fn with_alpha_threshold(self, alpha_threshold: u8) -> Self {
        BitmapDataConfig { alpha_threshold, ..self }
    }

    /// Blend and compute luminance in another color space.
    pub fn with_working_color_space(self, working_color_space: WorkingColorSpace) -> Self {
        BitmapDataConfig { working_color_space, ..self }
    }

    /// Use this palette for indexed formats.
    pub fn with_palette(self, palette: Palette) -> Self {
        BitmapDataConfig { palette: Some(palette), ..self }
    }

    /// Map colors that are not in the palette with this quantizer.
    pub fn with_quantizer(self, quantizer: impl Quantizer + 'static) -> Self {
        BitmapDataConfig { quantizer: Some(Arc::new(quantizer)), ..self }
    }
}

impl fmt::Debug for BitmapDataConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("BitmapDataConfig")
            .field("background", &self.background)
            .field("alpha_threshold", &self.alpha_threshold)
            .field("working_color_space", &self.working_color_space)
            .field("palette", &self.palette.as_ref().map(Palette::len))
            .field("quantizer", &self.quantizer.is_some())
            .finish()
    }
}


/// A rectangle of pixels in a specific layout.
///
/// The pixels are stored row by row. Each row starts at a multiple of the stride,
/// and may be followed by padding. Access pixels through `row` and `row_mut`,
/// or through the `get_*` and `set_*` shortcuts that take a position.
///
/// Self-allocated memory is released when the bitmap data is disposed or dropped.
/// Wrapped memory stays owned by the caller.
pub struct BitmapData<'a, E: Element = u8> {
    context: RowContext<E>,
    size: Vec2<usize>,
    stride: usize,
    backing: Backing<'a, E>,
    on_dispose: Option<Box<dyn FnOnce() + Send + Sync + 'a>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CopyMode { Index, Wide, Narrow }


/// Returns the number of bytes of a row without padding.
fn validate_size(size: Vec2<usize>, info: PixelFormatInfo) -> Result<usize> {
    if size.width() == 0 || size.height() == 0 {
        return Err(Error::invalid(format!("bitmap size {}x{} has no pixels", size.width(), size.height())));
    }

    size.width().checked_mul(size.height())
        .ok_or_else(|| Error::invalid("bitmap size is too large"))?;

    info.byte_width(size.width()).ok_or_else(|| Error::invalid(format!(
        "a row of {} pixels with {} bits each is too large", size.width(), info.bits_per_pixel
    )))
}

/// The bytes of a row without padding, of a bitmap that has been validated.
fn row_byte_width(info: PixelFormatInfo, width: usize) -> Result<usize> {
    info.byte_width(width).ok_or_else(|| Error::invalid("bitmap row is too large"))
}

fn create_context<E: Element>(
    format: PixelFormat<E>, width: usize, kind: StorageKind, config: BitmapDataConfig
) -> Result<RowContext<E>>
{
    let info = format.info();
    let BitmapDataConfig { background, alpha_threshold, working_color_space, palette, quantizer } = config;
    let background = background.with_alpha(255);

    let palette = if info.indexed {
        if palette.is_none() && quantizer.is_some() {
            return Err(Error::invalid("a quantizer was specified without a palette"));
        }

        let palette = palette
            .unwrap_or_else(|| Palette::default_for_bits(info.bits_per_pixel))
            .with_background(background)
            .with_alpha_threshold(alpha_threshold)
            .with_working_color_space(working_color_space);

        if let Some(max) = info.max_palette_size() {
            if palette.len() > max {
                return Err(Error::invalid(format!(
                    "palette has {} entries, but {}-bit indices can only address {}",
                    palette.len(), info.bits_per_pixel, max
                )));
            }
        }

        Some(palette)
    }
    else { None };

    Ok(RowContext {
        format, info, width, kind,
        background, alpha_threshold, working_color_space,
        palette, quantizer,
    })
}


impl<E: Element> BitmapData<'static, E> {

    /// Allocate blank bitmap data. All bytes are zero initially.
    ///
    /// Rows of known formats are as short as possible, rounded up to whole elements.
    /// Rows of custom formats are padded to a multiple of 8 bytes,
    /// or of the element size if that is larger.
    pub fn new(
        size: Vec2<usize>, format: impl Into<PixelFormat<E>>,
        config: BitmapDataConfig, allocation: Allocation<E>
    ) -> Result<Self>
    {
        let format = format.into();
        let info = format.info();
        let byte_width = validate_size(size, info)?;

        let row_bytes = if info.custom { align_up(byte_width, E::BYTE_SIZE.max(8)) } else { Some(byte_width) };
        let row_bytes = row_bytes.ok_or_else(|| Error::invalid("bitmap row is too large"))?;
        let stride = divide_rounding_up(row_bytes, E::BYTE_SIZE);

        let length = stride.checked_mul(size.height())
            .ok_or_else(|| Error::invalid("bitmap data is too large"))?;

        let context = create_context(format, size.width(), StorageKind::ByteCast, config)?;

        log::debug!(
            "allocating {}x{} bitmap data of {:?} with {} elements per row ({:?})",
            size.width(), size.height(), context.format, stride, allocation
        );

        Ok(BitmapData {
            context, size, stride,
            backing: Backing::allocate(length, &allocation)?,
            on_dispose: None,
        })
    }
}

impl<'a, E: Element> BitmapData<'a, E> {

    /// Wrap a caller buffer of arbitrary elements.
    /// Pixel values are recomposed from the little-endian bytes of the elements they overlap.
    ///
    /// The stride is the distance of two rows in bytes. It must be a multiple
    /// of the element size, and at least as large as the pixels of a row.
    pub fn from_buffer(
        buffer: &'a mut [E], size: Vec2<usize>, stride_bytes: usize,
        format: impl Into<PixelFormat<E>>, config: BitmapDataConfig
    ) -> Result<Self>
    {
        Self::wrap(buffer, size, stride_bytes, format.into(), config, StorageKind::GenericElement)
    }

    /// Wrap a caller buffer where each element is exactly one pixel,
    /// for example `u32` for `Argb32` or `[f32; 4]` for `Rgba128Float`.
    /// The stride is the distance of two rows in bytes.
    pub fn from_pixels(
        buffer: &'a mut [E], size: Vec2<usize>, stride_bytes: usize,
        format: impl Into<PixelFormat<E>>, config: BitmapDataConfig
    ) -> Result<Self>
    {
        let format = format.into();
        let bits_per_pixel = format.info().bits_per_pixel;

        if E::BYTE_SIZE * 8 != bits_per_pixel {
            return Err(Error::invalid(format!(
                "pixel elements have {} bits, but the format has {} bits per pixel",
                E::BYTE_SIZE * 8, bits_per_pixel
            )));
        }

        Self::wrap(buffer, size, stride_bytes, format, config, StorageKind::SpecificElement)
    }

    fn wrap(
        buffer: &'a mut [E], size: Vec2<usize>, stride_bytes: usize,
        format: PixelFormat<E>, config: BitmapDataConfig, kind: StorageKind
    ) -> Result<Self>
    {
        let byte_width = validate_size(size, format.info())?;

        if stride_bytes % E::BYTE_SIZE != 0 {
            return Err(Error::invalid(format!(
                "stride of {} bytes is not a multiple of the element size {}", stride_bytes, E::BYTE_SIZE
            )));
        }

        if stride_bytes < byte_width {
            return Err(Error::invalid(format!(
                "stride of {} bytes is smaller than a row of {} bytes", stride_bytes, byte_width
            )));
        }

        let stride = stride_bytes / E::BYTE_SIZE;
        let required = stride.checked_mul(size.height())
            .ok_or_else(|| Error::invalid("bitmap data is too large"))?;

        if buffer.len() < required {
            return Err(Error::invalid(format!(
                "buffer has {} elements, but {} are required", buffer.len(), required
            )));
        }

        let context = create_context(format, size.width(), kind, config)?;

        log::debug!(
            "wrapping {}x{} bitmap data of {:?} in a buffer of {} elements ({:?})",
            size.width(), size.height(), context.format, buffer.len(), kind
        );

        Ok(BitmapData { context, size, stride, backing: Backing::Wrapped(buffer), on_dispose: None })
    }

    /// Call this function once when the bitmap data is disposed or dropped.
    pub fn on_dispose(&mut self, callback: impl FnOnce() + Send + Sync + 'a) {
        if self.on_dispose.replace(Box::new(callback)).is_some() {
            log::warn!("replacing the dispose callback of bitmap data");
        }
    }

    /// Width and height in pixels.
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// Number of pixels per row.
    pub fn width(&self) -> usize { self.size.width() }

    /// Number of rows.
    pub fn height(&self) -> usize { self.size.height() }

    /// The pixel layout.
    pub fn format(&self) -> &PixelFormat<E> { &self.context.format }

    /// The descriptor of the pixel layout.
    pub fn info(&self) -> PixelFormatInfo { self.context.info }

    /// How the buffer relates to pixel values.
    pub fn storage_kind(&self) -> StorageKind { self.context.kind }

    /// The distance of two rows, in elements.
    pub fn stride(&self) -> usize { self.stride }

    /// The distance of two rows, in bytes.
    pub fn stride_bytes(&self) -> usize { self.stride * E::BYTE_SIZE }

    /// The palette, if the format is indexed.
    pub fn palette(&self) -> Option<&Palette> { self.context.palette.as_ref() }

    /// The opaque color that translucent colors are blended with.
    pub fn background(&self) -> Color32 { self.context.background }

    /// The alpha below which colors become transparent in single-bit alpha formats.
    pub fn alpha_threshold(&self) -> u8 { self.context.alpha_threshold }

    /// Where blending and luminance arithmetic happens.
    pub fn working_color_space(&self) -> WorkingColorSpace { self.context.working_color_space }

    /// The configuration this bitmap data uses, including its palette.
    pub fn config(&self) -> BitmapDataConfig {
        BitmapDataConfig {
            background: self.context.background,
            alpha_threshold: self.context.alpha_threshold,
            working_color_space: self.context.working_color_space,
            palette: self.context.palette.clone(),
            quantizer: self.context.quantizer.clone(),
        }
    }

    /// Whether the memory has already been released.
    pub fn is_disposed(&self) -> bool { self.backing.is_disposed() }

    /// All elements of the buffer, including row padding.
    pub fn elements(&self) -> Result<&[E]> { self.backing.elements() }

    /// All elements of the buffer, including row padding.
    pub fn elements_mut(&mut self) -> Result<&mut [E]> { self.backing.elements_mut() }

    /// The row at the specified y coordinate.
    pub fn row(&self, y: usize) -> Result<RowRef<'_, E>> {
        let elements = self.backing.elements()?;
        check_index(y, self.size.height(), "y coordinate")?;

        let start = y * self.stride;
        Ok(Row::new(&elements[start .. start + self.stride], y, &self.context))
    }

    /// The row at the specified y coordinate, for writing.
    pub fn row_mut(&mut self, y: usize) -> Result<RowRefMut<'_, E>> {
        let stride = self.stride;
        let elements = self.backing.elements_mut()?;
        check_index(y, self.size.height(), "y coordinate")?;

        let start = y * stride;
        Ok(Row::new(&mut elements[start .. start + stride], y, &self.context))
    }

    /// All rows, from top to bottom.
    pub fn rows(&self) -> Result<impl Iterator<Item = RowRef<'_, E>>> {
        let context = &self.context;
        let elements = self.backing.elements()?;

        Ok(elements.chunks_exact(self.stride).take(self.size.height()).enumerate()
            .map(move |(y, elements)| Row::new(elements, y, context)))
    }

    /// All rows, from top to bottom, for writing.
    pub fn rows_mut(&mut self) -> Result<impl Iterator<Item = RowRefMut<'_, E>>> {
        let (stride, height) = (self.stride, self.size.height());
        let context = &self.context;
        let elements = self.backing.elements_mut()?;

        Ok(elements.chunks_exact_mut(stride).take(height).enumerate()
            .map(move |(y, elements)| Row::new(elements, y, context)))
    }

    /// All rows, for writing in parallel.
    #[cfg(feature = "rayon")]
    pub fn par_rows_mut(&mut self) -> Result<impl IndexedParallelIterator<Item = RowRefMut<'_, E>>> {
        let (stride, height) = (self.stride, self.size.height());
        let context = &self.context;
        let elements = self.backing.elements_mut()?;

        Ok(elements.par_chunks_exact_mut(stride).take(height).enumerate()
            .map(move |(y, elements)| Row::new(elements, y, context)))
    }

    /// Read the pixel at the position in any representation.
    pub fn get<C: Color>(&self, position: Vec2<usize>) -> Result<C> {
        self.row(position.y())?.get(position.x())
    }

    /// Write the pixel at the position from any representation.
    pub fn set<C: Color>(&mut self, position: Vec2<usize>, color: C) -> UnitResult {
        self.row_mut(position.y())?.set(position.x(), color)
    }

    /// The palette index of the pixel at the position.
    pub fn get_index(&self, position: Vec2<usize>) -> Result<usize> {
        self.row(position.y())?.get_index(position.x())
    }

    /// Store a palette index at the position.
    pub fn set_index(&mut self, position: Vec2<usize>, index: usize) -> UnitResult {
        self.row_mut(position.y())?.set_index(position.x(), index)
    }

    /// Write a `Color32` after letting the ditherer adjust it for this position.
    pub fn set_color32_dithered(&mut self, position: Vec2<usize>, color: Color32, ditherer: &mut dyn Ditherer) -> UnitResult {
        self.row_mut(position.y())?.set_color32_dithered(position.x(), color, ditherer)
    }

    /// Read a `Color32`.
    pub fn get_color32(&self, position: Vec2<usize>) -> Result<Color32> { self.get(position) }

    /// Read a `PColor32`.
    pub fn get_pcolor32(&self, position: Vec2<usize>) -> Result<PColor32> { self.get(position) }

    /// Read a `Color64`.
    pub fn get_color64(&self, position: Vec2<usize>) -> Result<Color64> { self.get(position) }

    /// Read a `PColor64`.
    pub fn get_pcolor64(&self, position: Vec2<usize>) -> Result<PColor64> { self.get(position) }

    /// Read a `ColorF`.
    pub fn get_color_f(&self, position: Vec2<usize>) -> Result<ColorF> { self.get(position) }

    /// Read a `PColorF`.
    pub fn get_pcolor_f(&self, position: Vec2<usize>) -> Result<PColorF> { self.get(position) }

    /// Write a `Color32`.
    pub fn set_color32(&mut self, position: Vec2<usize>, color: Color32) -> UnitResult { self.set(position, color) }

    /// Write a `PColor32`.
    pub fn set_pcolor32(&mut self, position: Vec2<usize>, color: PColor32) -> UnitResult { self.set(position, color) }

    /// Write a `Color64`.
    pub fn set_color64(&mut self, position: Vec2<usize>, color: Color64) -> UnitResult { self.set(position, color) }

    /// Write a `PColor64`.
    pub fn set_pcolor64(&mut self, position: Vec2<usize>, color: PColor64) -> UnitResult { self.set(position, color) }

    /// Write a `ColorF`.
    pub fn set_color_f(&mut self, position: Vec2<usize>, color: ColorF) -> UnitResult { self.set(position, color) }

    /// Write a `PColorF`.
    pub fn set_pcolor_f(&mut self, position: Vec2<usize>, color: PColorF) -> UnitResult { self.set(position, color) }


    /// Allocate new bitmap data of the same size in another format,
    /// and convert all pixels into it.
    pub fn clone_with_format(
        &self, format: impl Into<PixelFormat<E>>, config: BitmapDataConfig
    ) -> Result<BitmapData<'static, E>>
    {
        let mut clone = BitmapData::new(self.size, format, config, Allocation::Heap)?;
        self.copy_to(&mut clone)?;
        Ok(clone)
    }

    /// Allocate blank bitmap data with the same format, palette and configuration,
    /// but another size. Pooled bitmap data rents from the same pool.
    pub fn create_compatible(&self, size: Vec2<usize>) -> Result<BitmapData<'static, E>> {
        if self.is_disposed() { return Err(Error::Disposed); }
        BitmapData::new(size, self.context.format.clone(), self.config(), self.backing.allocation())
    }

    /// Convert all pixels into existing bitmap data of the same size.
    ///
    /// Colors are transferred as `Color64` if either side has more than 8 bits
    /// per channel, and as `Color32` otherwise. Palette indices are copied directly
    /// if both sides are indexed with the same palette entries.
    pub fn copy_to<T: Element>(&self, target: &mut BitmapData<'_, T>) -> UnitResult {
        if self.size != target.size {
            return Err(Error::invalid(format!(
                "cannot copy {:?} pixels to bitmap data of size {:?}", self.size, target.size
            )));
        }

        let same_palette = match (self.palette(), target.palette()) {
            (Some(source), Some(target)) => source.entries() == target.entries(),
            _ => false,
        };

        let mode = if same_palette { CopyMode::Index }
            else if self.format().is_wide() || target.format().is_wide() { CopyMode::Wide }
            else { CopyMode::Narrow };

        #[cfg(feature = "rayon")]
        let result = target.par_rows_mut()?.try_for_each(|mut row| self.copy_row_to(&mut row, mode));

        #[cfg(not(feature = "rayon"))]
        let result = target.rows_mut()?.try_for_each(|mut row| self.copy_row_to(&mut row, mode));

        result
    }

    fn copy_row_to<T: Element>(&self, target: &mut RowRefMut<'_, T>, mode: CopyMode) -> UnitResult {
        let source = self.row(target.index())?;

        for x in 0 .. self.width() {
            match mode {
                CopyMode::Index => target.set_index(x, source.get_index(x)?)?,
                CopyMode::Wide => target.set(x, source.get::<Color64>(x)?)?,
                CopyMode::Narrow => target.set(x, source.get::<Color32>(x)?)?,
            }
        }

        Ok(())
    }


    /// Write the pixels of all rows, without padding, as little-endian bytes.
    /// The bytes of each row are exactly `info().byte_width(width)`.
    pub fn write_raw_rows(&self, write: &mut impl Write) -> UnitResult {
        let byte_width = row_byte_width(self.info(), self.width())?;
        let (whole, rest) = (byte_width / E::BYTE_SIZE, byte_width % E::BYTE_SIZE);

        for row in self.elements()?.chunks_exact(self.stride).take(self.height()) {
            E::write_slice(write, &row[.. whole])?;

            if rest != 0 {
                let mut bytes: SmallVec<[u8; 16]> = smallvec![0; E::BYTE_SIZE];
                row[whole].write_le(&mut bytes);
                write.write_all(&bytes[.. rest])?;
            }
        }

        Ok(())
    }

    /// Read the pixels of all rows, as written by `write_raw_rows`.
    /// Row padding is left untouched.
    pub fn read_raw_rows(&mut self, read: &mut impl Read) -> UnitResult {
        let byte_width = row_byte_width(self.info(), self.width())?;
        let (whole, rest) = (byte_width / E::BYTE_SIZE, byte_width % E::BYTE_SIZE);
        let (stride, height) = (self.stride, self.height());

        for row in self.elements_mut()?.chunks_exact_mut(stride).take(height) {
            E::read_slice(read, &mut row[.. whole])?;

            if rest != 0 {
                let mut bytes: SmallVec<[u8; 16]> = smallvec![0; E::BYTE_SIZE];
                row[whole].write_le(&mut bytes);
                read.read_exact(&mut bytes[.. rest])?;
                row[whole] = E::read_le(&bytes);
            }
        }

        Ok(())
    }


    /// Release the memory and call the dispose callback, if any.
    /// Pooled memory is returned to its pool. Does nothing if already disposed.
    /// Any further access fails with `Error::Disposed`.
    pub fn dispose(&mut self) {
        if self.backing.release() {
            log::debug!("disposed {}x{} bitmap data of {:?}", self.size.width(), self.size.height(), self.context.format);

            if let Some(callback) = self.on_dispose.take() {
                callback();
            }
        }
    }
}

impl<'a, E: Element> Drop for BitmapData<'a, E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<'a, E: Element> fmt::Debug for BitmapData<'a, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("BitmapData")
            .field("size", &self.size)
            .field("format", &self.context.format)
            .field("storage_kind", &self.context.kind)
            .field("stride", &self.stride)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
