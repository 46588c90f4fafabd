
//! Describes how pixels are laid out in memory,
//! and which color representations a layout supports natively.

use bit_field::BitField;
use crate::color::Representation;
use crate::math::byte_width;


/// Immutable description of a pixel layout.
/// Known formats have a fixed descriptor, custom formats
/// declare theirs when they are created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormatInfo {

    /// Number of bits each pixel occupies, for example `1`, `24`, or `128`.
    pub bits_per_pixel: usize,

    /// Pixels store a palette index instead of a color.
    pub indexed: bool,

    /// The layout is defined by callbacks instead of being one of the known formats.
    pub custom: bool,

    /// Pixels can store translucent colors.
    pub has_alpha: bool,

    /// The color channels are premultiplied with alpha.
    pub has_premultiplied_alpha: bool,

    /// Alpha is a single bit: a pixel is either fully transparent or fully opaque.
    pub has_single_bit_alpha: bool,

    /// Pixels store a single luminance value.
    pub grayscale: bool,
}

impl PixelFormatInfo {

    /// A non-indexed format without alpha and the specified number of bits per pixel.
    /// Use the `with_*` methods to add properties.
    pub const fn new(bits_per_pixel: usize) -> Self {
        Self {
            bits_per_pixel,
            indexed: false,
            custom: false,
            has_alpha: false,
            has_premultiplied_alpha: false,
            has_single_bit_alpha: false,
            grayscale: false,
        }
    }

    /// A custom format with the specified number of bits per pixel.
    pub const fn custom(bits_per_pixel: usize) -> Self {
        Self { custom: true, ..Self::new(bits_per_pixel) }
    }

    /// Mark the pixels as palette indices.
    pub const fn with_indexed(self) -> Self { Self { indexed: true, ..self } }

    /// Mark the format as having straight alpha.
    pub const fn with_alpha(self) -> Self { Self { has_alpha: true, ..self } }

    /// Mark the format as having premultiplied alpha.
    pub const fn with_premultiplied_alpha(self) -> Self {
        Self { has_alpha: true, has_premultiplied_alpha: true, ..self }
    }

    /// Mark the format as having a single bit of alpha.
    pub const fn with_single_bit_alpha(self) -> Self {
        Self { has_alpha: true, has_single_bit_alpha: true, ..self }
    }

    /// Mark the format as storing luminance only.
    pub const fn with_grayscale(self) -> Self { Self { grayscale: true, ..self } }

    /// The number of bytes a row of `width` pixels occupies, without padding.
    /// Returns `None` if the row would not fit into the address space.
    #[inline]
    pub fn byte_width(&self, width: usize) -> Option<usize> {
        byte_width(width, self.bits_per_pixel)
    }

    /// The number of distinct palette indices a pixel can store, if indexed.
    pub fn max_palette_size(&self) -> Option<usize> {
        if self.indexed && self.bits_per_pixel < usize::BITS as usize {
            Some(1_usize << self.bits_per_pixel)
        }
        else { None }
    }

    /// Whether writing a color with the specified alpha
    /// requires blending it with the background first.
    pub(crate) fn requires_blending(&self) -> bool {
        !self.indexed && (!self.has_alpha || self.has_single_bit_alpha)
    }
}


/// The closed set of built-in pixel layouts.
/// All multi-byte values are stored little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnownPixelFormat {

    /// 1-bit palette indices, most significant bit first.
    Indexed1,

    /// 4-bit palette indices, high nibble first.
    Indexed4,

    /// 8-bit palette indices.
    Indexed8,

    /// 8-bit luminance.
    Gray8,

    /// 16-bit luminance.
    Gray16,

    /// 16 bits, `0RRRRRGGGGGBBBBB`.
    Rgb555,

    /// 16 bits, `RRRRRGGGGGGBBBBB`.
    Rgb565,

    /// 16 bits, `ARRRRRGGGGGBBBBB`.
    Argb1555,

    /// 24 bits, bytes in order blue, green, red.
    Rgb24,

    /// 32 bits, `0xFFRRGGBB`. The alpha byte is ignored when reading.
    Rgb32,

    /// 32 bits, `0xAARRGGBB`.
    Argb32,

    /// 32 bits, `0xAARRGGBB` with premultiplied color channels.
    PArgb32,

    /// 32-bit float luminance.
    Gray32Float,

    /// 48 bits, 16-bit channels in order blue, green, red.
    Rgb48,

    /// 64 bits, 16-bit channels in order blue, green, red, alpha.
    Argb64,

    /// 64 bits, 16-bit premultiplied channels in order blue, green, red, alpha.
    PArgb64,

    /// 64 bits, half-float channels in order red, green, blue, alpha.
    Rgba64Half,

    /// 96 bits, float channels in order red, green, blue.
    Rgb96Float,

    /// 128 bits, float channels in order red, green, blue, alpha.
    Rgba128Float,

    /// 128 bits, premultiplied float channels in order red, green, blue, alpha.
    PRgba128Float,
}

impl KnownPixelFormat {

    /// All known formats.
    pub const ALL: [KnownPixelFormat; 20] = {
        use KnownPixelFormat::*;
        [
            Indexed1, Indexed4, Indexed8, Gray8, Gray16, Rgb555, Rgb565, Argb1555,
            Rgb24, Rgb32, Argb32, PArgb32, Gray32Float, Rgb48, Argb64, PArgb64,
            Rgba64Half, Rgb96Float, Rgba128Float, PRgba128Float,
        ]
    };

    /// The descriptor of this format.
    pub const fn info(self) -> PixelFormatInfo {
        use KnownPixelFormat::*;

        match self {
            Indexed1 => PixelFormatInfo::new(1).with_indexed(),
            Indexed4 => PixelFormatInfo::new(4).with_indexed(),
            Indexed8 => PixelFormatInfo::new(8).with_indexed(),
            Gray8 => PixelFormatInfo::new(8).with_grayscale(),
            Gray16 => PixelFormatInfo::new(16).with_grayscale(),
            Rgb555 | Rgb565 => PixelFormatInfo::new(16),
            Argb1555 => PixelFormatInfo::new(16).with_single_bit_alpha(),
            Rgb24 => PixelFormatInfo::new(24),
            Rgb32 => PixelFormatInfo::new(32),
            Argb32 => PixelFormatInfo::new(32).with_alpha(),
            PArgb32 => PixelFormatInfo::new(32).with_premultiplied_alpha(),
            Gray32Float => PixelFormatInfo::new(32).with_grayscale(),
            Rgb48 => PixelFormatInfo::new(48),
            Argb64 => PixelFormatInfo::new(64).with_alpha(),
            PArgb64 => PixelFormatInfo::new(64).with_premultiplied_alpha(),
            Rgba64Half => PixelFormatInfo::new(64).with_alpha(),
            Rgb96Float => PixelFormatInfo::new(96),
            Rgba128Float => PixelFormatInfo::new(128).with_alpha(),
            PRgba128Float => PixelFormatInfo::new(128).with_premultiplied_alpha(),
        }
    }

    /// The single representation this format stores natively, for reading and writing.
    /// Indexed formats read and write `Color32` through their palette.
    pub fn native_representation(self) -> Representation {
        use KnownPixelFormat::*;

        match self {
            Indexed1 | Indexed4 | Indexed8 | Gray8 | Rgb555 | Rgb565 | Argb1555 | Rgb24 | Rgb32 | Argb32
                => Representation::Color32,

            PArgb32 => Representation::PColor32,
            Gray16 | Rgb48 | Argb64 => Representation::Color64,
            PArgb64 => Representation::PColor64,
            Gray32Float | Rgba64Half | Rgb96Float | Rgba128Float => Representation::ColorF,
            PRgba128Float => Representation::PColorF,
        }
    }

    /// The number of bytes of one pixel, for formats with at least 8 bits per pixel.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        let bits = self.info().bits_per_pixel;
        if bits % 8 == 0 { Some(bits / 8) } else { None }
    }
}


/// A set of color representations, used as capability table of a pixel format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Representations(u8);

impl Representations {

    /// The empty set.
    pub const NONE: Self = Representations(0);

    fn bit(representation: Representation) -> usize {
        match representation {
            Representation::Color32 => 0,
            Representation::PColor32 => 1,
            Representation::Color64 => 2,
            Representation::PColor64 => 3,
            Representation::ColorF => 4,
            Representation::PColorF => 5,
        }
    }

    /// A set with only the specified representation.
    pub fn only(representation: Representation) -> Self {
        Self::NONE.with(representation)
    }

    /// This set, including the specified representation.
    pub fn with(mut self, representation: Representation) -> Self {
        self.0.set_bit(Self::bit(representation), true);
        self
    }

    /// Whether the set includes the specified representation.
    pub fn contains(self, representation: Representation) -> bool {
        self.0.get_bit(Self::bit(representation))
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool { self.0 == 0 }

    /// The first representation of the preference order of `requested`
    /// that is in this set, if any.
    pub fn resolve(self, requested: Representation) -> Option<Representation> {
        requested.preference_order().iter().copied()
            .find(|&candidate| self.contains(candidate))
    }
}
