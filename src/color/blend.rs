
//! Compositing colors over an opaque background, and luminance.
//!
//! Formats without alpha cannot store translucent colors.
//! Such colors are blended with the background color of the bitmap
//! before they are written. The math happens either directly on the
//! gamma encoded values, or on linearized values, depending on the
//! working color space of the bitmap.

use super::*;
use super::convert::{f32_to_u8, f32_to_u16, u8_to_f32, u16_to_f32, u16_to_u8};
use super::transfer::{linear_to_srgb, srgb_to_linear};


/// Where blending and luminance arithmetic happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkingColorSpace {

    /// Operate directly on the gamma encoded sRGB values.
    /// Fast, and the behavior most legacy software expects.
    Srgb,

    /// Decode to linear light, operate, and encode again.
    /// Physically correct, but more expensive.
    Linear,
}

impl Default for WorkingColorSpace {
    fn default() -> Self { WorkingColorSpace::Srgb }
}


#[inline]
fn blend_linear(foreground: f32, background: f32, alpha: f32) -> f32 {
    let linear = srgb_to_linear(foreground) * alpha + srgb_to_linear(background) * (1.0 - alpha);
    linear_to_srgb(linear)
}

impl Color32 {

    /// Composite this color over an opaque background.
    /// The result is always opaque. An opaque color is returned as is,
    /// and a fully transparent color results in the (opaque) background.
    pub fn blend_with_background(self, background: Color32, space: WorkingColorSpace) -> Color32 {
        match self.a {
            255 => self,
            0 => background.with_alpha(255),

            alpha => match space {
                WorkingColorSpace::Srgb => {
                    let alpha = alpha as u32;
                    let inverse = 255 - alpha;
                    let blend = |foreground: u8, background: u8| {
                        ((foreground as u32 * alpha + background as u32 * inverse) / 255) as u8
                    };

                    Color32::from_rgb(blend(self.r, background.r), blend(self.g, background.g), blend(self.b, background.b))
                },

                WorkingColorSpace::Linear => {
                    let alpha = u8_to_f32(alpha);
                    let blend = |foreground: u8, background: u8| {
                        f32_to_u8(blend_linear(u8_to_f32(foreground), u8_to_f32(background), alpha))
                    };

                    Color32::from_rgb(blend(self.r, background.r), blend(self.g, background.g), blend(self.b, background.b))
                },
            }
        }
    }

    /// The gray value of this color, ignoring alpha.
    pub fn luminance(self, space: WorkingColorSpace) -> u8 {
        if self.r == self.g && self.g == self.b { return self.r; }

        match space {
            WorkingColorSpace::Srgb => (
                (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114 + 500) / 1000
            ) as u8,

            WorkingColorSpace::Linear => f32_to_u8(
                linear_luminance(u8_to_f32(self.r), u8_to_f32(self.g), u8_to_f32(self.b))
            ),
        }
    }
}

impl Color64 {

    /// Composite this color over an opaque background.
    /// The result is always opaque.
    pub fn blend_with_background(self, background: Color64, space: WorkingColorSpace) -> Color64 {
        match self.a {
            65535 => self,
            0 => Color64 { a: 65535, ..background },

            alpha => match space {
                WorkingColorSpace::Srgb => {
                    let alpha = alpha as u64;
                    let inverse = 65535 - alpha;
                    let blend = |foreground: u16, background: u16| {
                        ((foreground as u64 * alpha + background as u64 * inverse) / 65535) as u16
                    };

                    Color64::from_rgb(blend(self.r, background.r), blend(self.g, background.g), blend(self.b, background.b))
                },

                WorkingColorSpace::Linear => {
                    let alpha = u16_to_f32(alpha);
                    let blend = |foreground: u16, background: u16| {
                        f32_to_u16(blend_linear(u16_to_f32(foreground), u16_to_f32(background), alpha))
                    };

                    Color64::from_rgb(blend(self.r, background.r), blend(self.g, background.g), blend(self.b, background.b))
                },
            }
        }
    }

    /// The gray value of this color, ignoring alpha.
    pub fn luminance(self, space: WorkingColorSpace) -> u16 {
        if self.r == self.g && self.g == self.b { return self.r; }

        match space {
            WorkingColorSpace::Srgb => (
                (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114 + 500) / 1000
            ) as u16,

            WorkingColorSpace::Linear => f32_to_u16(
                linear_luminance(u16_to_f32(self.r), u16_to_f32(self.g), u16_to_f32(self.b))
            ),
        }
    }
}

impl ColorF {

    /// Composite this color over an opaque background.
    /// The result has an alpha of exactly `1.0`.
    pub fn blend_with_background(self, background: ColorF, space: WorkingColorSpace) -> ColorF {
        if self.a >= 1.0 { return self; }
        if !(self.a > 0.0) { return ColorF { a: 1.0, ..background }; }

        let alpha = self.a;
        let blend = |foreground: f32, background: f32| match space {
            WorkingColorSpace::Srgb => foreground * alpha + background * (1.0 - alpha),
            WorkingColorSpace::Linear => blend_linear(foreground, background, alpha),
        };

        ColorF::from_rgb(blend(self.r, background.r), blend(self.g, background.g), blend(self.b, background.b))
    }

    /// The gray value of this color, ignoring alpha.
    pub fn luminance(self, space: WorkingColorSpace) -> f32 {
        match space {
            WorkingColorSpace::Srgb => self.r * 0.299 + self.g * 0.587 + self.b * 0.114,
            WorkingColorSpace::Linear => linear_luminance(self.r, self.g, self.b),
        }
    }
}

/// Rec. 709 luminance of encoded channels, computed in linear light and encoded again.
#[inline]
fn linear_luminance(r: f32, g: f32, b: f32) -> f32 {
    linear_to_srgb(srgb_to_linear(r) * 0.2126 + srgb_to_linear(g) * 0.7152 + srgb_to_linear(b) * 0.0722)
}


impl ColorValue {

    /// Composite the color over an opaque background, keeping the representation.
    /// Premultiplied values are straightened, blended and premultiplied again,
    /// which is lossless because the blended result is opaque.
    pub fn blend_with_background(self, background: Color32, space: WorkingColorSpace) -> ColorValue {
        match self {
            ColorValue::Color32(color) => ColorValue::Color32(color.blend_with_background(background, space)),
            ColorValue::PColor32(color) => ColorValue::PColor32(color.to_color32().blend_with_background(background, space).to_pcolor32()),
            ColorValue::Color64(color) => ColorValue::Color64(color.blend_with_background(background.to_color64(), space)),
            ColorValue::PColor64(color) => ColorValue::PColor64(color.to_color64().blend_with_background(background.to_color64(), space).to_pcolor64()),
            ColorValue::ColorF(color) => ColorValue::ColorF(color.blend_with_background(background.to_color_f(), space)),
            ColorValue::PColorF(color) => ColorValue::PColorF(color.to_color_f().blend_with_background(background.to_color_f(), space).to_pcolor_f()),
        }
    }

    /// Whether alpha is at its maximum.
    pub fn is_opaque(self) -> bool {
        match self {
            ColorValue::Color32(color) => color.is_opaque(),
            ColorValue::PColor32(color) => color.is_opaque(),
            ColorValue::Color64(color) => color.is_opaque(),
            ColorValue::PColor64(color) => color.is_opaque(),
            ColorValue::ColorF(color) => color.is_opaque(),
            ColorValue::PColorF(color) => color.is_opaque(),
        }
    }

    /// The alpha channel scaled to `0..=255`.
    pub fn alpha_u8(self) -> u8 {
        match self {
            ColorValue::Color32(color) => color.a,
            ColorValue::PColor32(color) => color.a,
            ColorValue::Color64(color) => u16_to_u8(color.a),
            ColorValue::PColor64(color) => u16_to_u8(color.a),
            ColorValue::ColorF(color) => f32_to_u8(color.a),
            ColorValue::PColorF(color) => f32_to_u8(color.a),
        }
    }

    /// Fully transparent black in the same representation.
    pub fn transparent(self) -> ColorValue {
        ColorValue::Color32(Color32::TRANSPARENT).convert_to(self.representation())
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn half_transparent_red_over_blue_in_srgb() {
        let red = Color32::new(255, 0, 0, 128);
        let blue = Color32::from_rgb(0, 0, 255);
        assert_eq!(red.blend_with_background(blue, WorkingColorSpace::Srgb), Color32::new(128, 0, 127, 255));
    }

    #[test]
    fn linear_blend_is_brighter_than_srgb_blend() {
        let white = Color32::new(255, 255, 255, 128);
        let srgb = white.blend_with_background(Color32::BLACK, WorkingColorSpace::Srgb);
        let linear = white.blend_with_background(Color32::BLACK, WorkingColorSpace::Linear);

        assert_eq!(srgb, Color32::from_rgb(128, 128, 128));
        assert!(linear.r > 180 && linear.r < 190, "{:?}", linear);
        assert!(linear.is_opaque());
    }

    #[test]
    fn extreme_alpha_values_skip_blending() {
        let background = Color32::new(1, 2, 3, 4);

        for &space in &[WorkingColorSpace::Srgb, WorkingColorSpace::Linear] {
            assert_eq!(Color32::new(9, 8, 7, 255).blend_with_background(background, space), Color32::new(9, 8, 7, 255));
            assert_eq!(Color32::new(9, 8, 7, 0).blend_with_background(background, space), Color32::new(1, 2, 3, 255));
            assert_eq!(ColorF::new(0.5, 0.5, 0.5, 0.0).blend_with_background(background.to_color_f(), space).a, 1.0);
            assert_eq!(Color64::new(9, 8, 7, 0).blend_with_background(background.to_color64(), space), Color64::new(257, 514, 771, 65535));
        }
    }

    #[test]
    fn blending_keeps_the_representation() {
        let value = ColorValue::from(PColor64::new(1000, 0, 0, 30000));
        let blended = value.blend_with_background(Color32::WHITE, WorkingColorSpace::Srgb);

        assert_eq!(blended.representation(), Representation::PColor64);
        assert!(blended.is_opaque());
    }

    #[test]
    fn luminance() {
        assert_eq!(Color32::from_rgb(255, 0, 0).luminance(WorkingColorSpace::Srgb), 76);
        assert_eq!(Color32::from_rgb(0, 255, 0).luminance(WorkingColorSpace::Srgb), 150);
        assert_eq!(Color32::from_rgb(90, 90, 90).luminance(WorkingColorSpace::Linear), 90);
        assert_eq!(Color64::from_rgb(65535, 65535, 65535).luminance(WorkingColorSpace::Srgb), 65535);
    }
}
