
//! The six interchangeable color value types.
//!
//! Colors come in three channel widths (8 bit, 16 bit, 32 bit float)
//! and two alpha conventions (straight and premultiplied).
//! Every type can be converted into every other type,
//! using `to_*` methods, `From` implementations, or the `Color` trait.

pub mod transfer;
pub mod blend;
mod convert;

pub use blend::WorkingColorSpace;


/// A color with 8-bit channels and straight alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color32 {

    /// Red channel, `0` to `255`.
    pub r: u8,

    /// Green channel, `0` to `255`.
    pub g: u8,

    /// Blue channel, `0` to `255`.
    pub b: u8,

    /// Alpha channel, `0` is fully transparent and `255` is fully opaque.
    pub a: u8,
}

/// A color with 8-bit channels, where the color channels are premultiplied with alpha.
/// A valid value never has a color channel larger than its alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PColor32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A color with 16-bit channels and straight alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

/// A color with 16-bit channels, where the color channels are premultiplied with alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PColor64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

/// A color with floating point channels and straight alpha.
/// The nominal range of each channel is `0.0` to `1.0`;
/// values outside of that range are kept as they are
/// and are only clamped when converting to integer channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// A color with floating point channels, where the color channels are premultiplied with alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}


macro_rules! implement_constructors {
    ($color: ident, $channel: ty, $max: expr) => {
        impl $color {

            /// The largest value of a channel, representing full intensity or full opacity.
            pub const MAX: $channel = $max;

            /// Fully transparent black.
            pub const TRANSPARENT: Self = Self { r: 0 as $channel, g: 0 as $channel, b: 0 as $channel, a: 0 as $channel };

            /// Create a color from red, green, blue and alpha.
            #[inline]
            pub const fn new(r: $channel, g: $channel, b: $channel, a: $channel) -> Self {
                Self { r, g, b, a }
            }

            /// Create a fully opaque color from red, green and blue.
            #[inline]
            pub const fn from_rgb(r: $channel, g: $channel, b: $channel) -> Self {
                Self { r, g, b, a: $max }
            }

            /// Whether the alpha channel is at least the maximum value.
            #[inline]
            pub fn is_opaque(self) -> bool { self.a >= $max }

            /// Whether the alpha channel is zero (or less).
            #[inline]
            pub fn is_transparent(self) -> bool { self.a <= 0 as $channel }
        }
    };
}

implement_constructors!(Color32, u8, u8::MAX);
implement_constructors!(PColor32, u8, u8::MAX);
implement_constructors!(Color64, u16, u16::MAX);
implement_constructors!(PColor64, u16, u16::MAX);
implement_constructors!(ColorF, f32, 1.0);
implement_constructors!(PColorF, f32, 1.0);


impl Color32 {

    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Create a color from its `0xAARRGGBB` representation.
    #[inline]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// The `0xAARRGGBB` representation of this color.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// The same color with a different alpha value.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl PColor32 {

    /// Create a premultiplied color from its `0xAARRGGBB` representation.
    #[inline]
    pub const fn from_argb(argb: u32) -> Self {
        let color = Color32::from_argb(argb);
        Self { r: color.r, g: color.g, b: color.b, a: color.a }
    }

    /// The `0xAARRGGBB` representation of this premultiplied color.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Whether no color channel exceeds alpha.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.r <= self.a && self.g <= self.a && self.b <= self.a
    }
}

impl PColor64 {

    /// Whether no color channel exceeds alpha.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.r <= self.a && self.g <= self.a && self.b <= self.a
    }
}


/// Names one of the six color value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Representation {

    /// `Color32`, 8-bit channels, straight alpha.
    Color32,

    /// `PColor32`, 8-bit channels, premultiplied alpha.
    PColor32,

    /// `Color64`, 16-bit channels, straight alpha.
    Color64,

    /// `PColor64`, 16-bit channels, premultiplied alpha.
    PColor64,

    /// `ColorF`, float channels, straight alpha.
    ColorF,

    /// `PColorF`, float channels, premultiplied alpha.
    PColorF,
}

impl Representation {

    /// All representations, in declaration order.
    pub const ALL: [Representation; 6] = [
        Representation::Color32, Representation::PColor32,
        Representation::Color64, Representation::PColor64,
        Representation::ColorF, Representation::PColorF,
    ];

    /// The order in which representations are tried
    /// when a format does not support this representation natively.
    /// The first entry is always the representation itself.
    /// Every other representation appears exactly once.
    pub fn preference_order(self) -> [Representation; 6] {
        use Representation::*;

        match self {
            Color32 => [Color32, Color64, ColorF, PColor32, PColor64, PColorF],
            PColor32 => [PColor32, PColor64, PColorF, Color32, Color64, ColorF],
            Color64 => [Color64, ColorF, Color32, PColor64, PColorF, PColor32],
            PColor64 => [PColor64, PColorF, PColor32, Color64, ColorF, Color32],
            ColorF => [ColorF, Color64, Color32, PColorF, PColor64, PColor32],
            PColorF => [PColorF, PColor64, PColor32, ColorF, Color64, Color32],
        }
    }

    /// Whether the color channels of this representation are premultiplied with alpha.
    pub fn is_premultiplied(self) -> bool {
        matches!(self, Representation::PColor32 | Representation::PColor64 | Representation::PColorF)
    }

    /// The number of bits per channel.
    pub fn bits_per_channel(self) -> usize {
        match self {
            Representation::Color32 | Representation::PColor32 => 8,
            Representation::Color64 | Representation::PColor64 => 16,
            Representation::ColorF | Representation::PColorF => 32,
        }
    }

    /// Short human readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Representation::Color32 => "Color32",
            Representation::PColor32 => "PColor32",
            Representation::Color64 => "Color64",
            Representation::PColor64 => "PColor64",
            Representation::ColorF => "ColorF",
            Representation::PColorF => "PColorF",
        }
    }
}


/// A color in any of the six representations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorValue {
    Color32(Color32),
    PColor32(PColor32),
    Color64(Color64),
    PColor64(PColor64),
    ColorF(ColorF),
    PColorF(PColorF),
}

impl ColorValue {

    /// Which representation this value currently has.
    pub fn representation(&self) -> Representation {
        match self {
            ColorValue::Color32(_) => Representation::Color32,
            ColorValue::PColor32(_) => Representation::PColor32,
            ColorValue::Color64(_) => Representation::Color64,
            ColorValue::PColor64(_) => Representation::PColor64,
            ColorValue::ColorF(_) => Representation::ColorF,
            ColorValue::PColorF(_) => Representation::PColorF,
        }
    }

    /// Convert this value into the specified representation.
    /// Returns the value unchanged if it already has that representation.
    pub fn convert_to(self, representation: Representation) -> ColorValue {
        match representation {
            Representation::Color32 => ColorValue::Color32(self.to_color32()),
            Representation::PColor32 => ColorValue::PColor32(self.to_pcolor32()),
            Representation::Color64 => ColorValue::Color64(self.to_color64()),
            Representation::PColor64 => ColorValue::PColor64(self.to_pcolor64()),
            Representation::ColorF => ColorValue::ColorF(self.to_color_f()),
            Representation::PColorF => ColorValue::PColorF(self.to_pcolor_f()),
        }
    }
}

macro_rules! implement_value_conversion {
    ($method: ident, $target: ident) => {
        impl ColorValue {

            /// Convert the contained color, whatever its representation.
            #[inline]
            pub fn $method(self) -> $target {
                match self {
                    ColorValue::Color32(color) => color.$method(),
                    ColorValue::PColor32(color) => color.$method(),
                    ColorValue::Color64(color) => color.$method(),
                    ColorValue::PColor64(color) => color.$method(),
                    ColorValue::ColorF(color) => color.$method(),
                    ColorValue::PColorF(color) => color.$method(),
                }
            }
        }
    };
}

implement_value_conversion!(to_color32, Color32);
implement_value_conversion!(to_pcolor32, PColor32);
implement_value_conversion!(to_color64, Color64);
implement_value_conversion!(to_pcolor64, PColor64);
implement_value_conversion!(to_color_f, ColorF);
implement_value_conversion!(to_pcolor_f, PColorF);


/// Implemented by all six color value types.
/// Allows reading and writing pixels generically over the representation.
pub trait Color: Copy + std::fmt::Debug + PartialEq + Into<ColorValue> + Send + Sync + 'static {

    /// The representation this type implements.
    const REPRESENTATION: Representation;

    /// Convert any color value into this type.
    fn from_value(value: ColorValue) -> Self;
}

macro_rules! implement_color {
    ($color: ident, $method: ident) => {
        impl Color for $color {
            const REPRESENTATION: Representation = Representation::$color;

            #[inline]
            fn from_value(value: ColorValue) -> Self { value.$method() }
        }

        impl From<$color> for ColorValue {
            #[inline]
            fn from(color: $color) -> Self { ColorValue::$color(color) }
        }
    };
}

implement_color!(Color32, to_color32);
implement_color!(PColor32, to_pcolor32);
implement_color!(Color64, to_color64);
implement_color!(PColor64, to_pcolor64);
implement_color!(ColorF, to_color_f);
implement_color!(PColorF, to_pcolor_f);


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn preference_orders_visit_every_representation_once() {
        for &representation in &Representation::ALL {
            let order = representation.preference_order();
            assert_eq!(order[0], representation);

            for &other in &Representation::ALL {
                assert_eq!(order.iter().filter(|&&entry| entry == other).count(), 1);
            }
        }
    }

    #[test]
    fn color32_prefers_straight_wider_types_before_premultiplied() {
        use Representation::*;
        assert_eq!(
            Color32.preference_order(),
            [Color32, Color64, ColorF, PColor32, PColor64, PColorF]
        );
    }

    #[test]
    fn argb_packing() {
        let color = Color32::from_argb(0x80FF4020);
        assert_eq!(color, Color32::new(0xFF, 0x40, 0x20, 0x80));
        assert_eq!(color.to_argb(), 0x80FF4020);
        assert_eq!(PColor32::from_argb(0x80402010).to_argb(), 0x80402010);
    }

    #[test]
    fn value_converts_to_own_representation_unchanged() {
        let value = ColorValue::from(Color64::new(1, 2, 3, 4));
        assert_eq!(value.convert_to(Representation::Color64), value);
        assert_eq!(value.representation(), Representation::Color64);
    }
}
