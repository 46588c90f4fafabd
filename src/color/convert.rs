
//! Conversions between all pairs of color value types.
//!
//! Channel widths are changed by scaling with 257 (8 ⇄ 16 bit)
//! or by the channel maximum (integer ⇄ float), rounding to the nearest value.
//! Conversions that change both width and alpha convention
//! (un)premultiply at the wider of the two precisions.

use super::*;


#[inline]
pub(crate) fn u8_to_u16(value: u8) -> u16 {
    value as u16 * 257
}

#[inline]
pub(crate) fn u16_to_u8(value: u16) -> u8 {
    ((value as u32 + 128) / 257) as u8
}

#[inline]
pub(crate) fn u8_to_f32(value: u8) -> f32 {
    value as f32 / 255.0
}

#[inline]
pub(crate) fn u16_to_f32(value: u16) -> f32 {
    value as f32 / 65535.0
}

/// Clamps to `[0, 1]` first. NaN becomes zero.
#[inline]
pub(crate) fn f32_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Clamps to `[0, 1]` first. NaN becomes zero.
#[inline]
pub(crate) fn f32_to_u16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
}

#[inline]
fn premultiply_u8(channel: u8, alpha: u8) -> u8 {
    ((channel as u32 * alpha as u32 + 127) / 255) as u8
}

#[inline]
fn straighten_u8(channel: u8, alpha: u8) -> u8 {
    let alpha = alpha as u32;
    ((channel as u32 * 255 + alpha / 2) / alpha).min(255) as u8
}

#[inline]
fn premultiply_u16(channel: u16, alpha: u16) -> u16 {
    ((channel as u64 * alpha as u64 + 32767) / 65535) as u16
}

#[inline]
fn straighten_u16(channel: u16, alpha: u16) -> u16 {
    let alpha = alpha as u64;
    ((channel as u64 * 65535 + alpha / 2) / alpha).min(65535) as u16
}


impl Color32 {
    #[inline] pub fn to_color32(self) -> Color32 { self }

    #[inline]
    pub fn to_pcolor32(self) -> PColor32 {
        match self.a {
            255 => PColor32::new(self.r, self.g, self.b, 255),
            0 => PColor32::TRANSPARENT,
            a => PColor32::new(premultiply_u8(self.r, a), premultiply_u8(self.g, a), premultiply_u8(self.b, a), a),
        }
    }

    #[inline]
    pub fn to_color64(self) -> Color64 {
        Color64::new(u8_to_u16(self.r), u8_to_u16(self.g), u8_to_u16(self.b), u8_to_u16(self.a))
    }

    #[inline] pub fn to_pcolor64(self) -> PColor64 { self.to_color64().to_pcolor64() }

    #[inline]
    pub fn to_color_f(self) -> ColorF {
        ColorF::new(u8_to_f32(self.r), u8_to_f32(self.g), u8_to_f32(self.b), u8_to_f32(self.a))
    }

    #[inline] pub fn to_pcolor_f(self) -> PColorF { self.to_color_f().to_pcolor_f() }
}

impl PColor32 {
    #[inline] pub fn to_pcolor32(self) -> PColor32 { self }

    /// Zero alpha results in transparent black.
    #[inline]
    pub fn to_color32(self) -> Color32 {
        match self.a {
            255 => Color32::new(self.r, self.g, self.b, 255),
            0 => Color32::TRANSPARENT,
            a => Color32::new(straighten_u8(self.r, a), straighten_u8(self.g, a), straighten_u8(self.b, a), a),
        }
    }

    #[inline]
    pub fn to_pcolor64(self) -> PColor64 {
        PColor64::new(u8_to_u16(self.r), u8_to_u16(self.g), u8_to_u16(self.b), u8_to_u16(self.a))
    }

    #[inline] pub fn to_color64(self) -> Color64 { self.to_pcolor64().to_color64() }

    #[inline]
    pub fn to_pcolor_f(self) -> PColorF {
        PColorF::new(u8_to_f32(self.r), u8_to_f32(self.g), u8_to_f32(self.b), u8_to_f32(self.a))
    }

    #[inline] pub fn to_color_f(self) -> ColorF { self.to_pcolor_f().to_color_f() }
}

impl Color64 {
    #[inline] pub fn to_color64(self) -> Color64 { self }

    #[inline]
    pub fn to_pcolor64(self) -> PColor64 {
        match self.a {
            65535 => PColor64::new(self.r, self.g, self.b, 65535),
            0 => PColor64::TRANSPARENT,
            a => PColor64::new(premultiply_u16(self.r, a), premultiply_u16(self.g, a), premultiply_u16(self.b, a), a),
        }
    }

    #[inline]
    pub fn to_color32(self) -> Color32 {
        Color32::new(u16_to_u8(self.r), u16_to_u8(self.g), u16_to_u8(self.b), u16_to_u8(self.a))
    }

    #[inline] pub fn to_pcolor32(self) -> PColor32 { self.to_pcolor64().to_pcolor32() }

    #[inline]
    pub fn to_color_f(self) -> ColorF {
        ColorF::new(u16_to_f32(self.r), u16_to_f32(self.g), u16_to_f32(self.b), u16_to_f32(self.a))
    }

    #[inline] pub fn to_pcolor_f(self) -> PColorF { self.to_color_f().to_pcolor_f() }
}

impl PColor64 {
    #[inline] pub fn to_pcolor64(self) -> PColor64 { self }

    /// Zero alpha results in transparent black.
    #[inline]
    pub fn to_color64(self) -> Color64 {
        match self.a {
            65535 => Color64::new(self.r, self.g, self.b, 65535),
            0 => Color64::TRANSPARENT,
            a => Color64::new(straighten_u16(self.r, a), straighten_u16(self.g, a), straighten_u16(self.b, a), a),
        }
    }

    #[inline]
    pub fn to_pcolor32(self) -> PColor32 {
        PColor32::new(u16_to_u8(self.r), u16_to_u8(self.g), u16_to_u8(self.b), u16_to_u8(self.a))
    }

    #[inline] pub fn to_color32(self) -> Color32 { self.to_color64().to_color32() }

    #[inline]
    pub fn to_pcolor_f(self) -> PColorF {
        PColorF::new(u16_to_f32(self.r), u16_to_f32(self.g), u16_to_f32(self.b), u16_to_f32(self.a))
    }

    #[inline] pub fn to_color_f(self) -> ColorF { self.to_pcolor_f().to_color_f() }
}

impl ColorF {
    #[inline] pub fn to_color_f(self) -> ColorF { self }

    #[inline]
    pub fn to_pcolor_f(self) -> PColorF {
        if self.a >= 1.0 { PColorF::new(self.r, self.g, self.b, self.a) }
        else { PColorF::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a) }
    }

    #[inline]
    pub fn to_color32(self) -> Color32 {
        Color32::new(f32_to_u8(self.r), f32_to_u8(self.g), f32_to_u8(self.b), f32_to_u8(self.a))
    }

    #[inline] pub fn to_pcolor32(self) -> PColor32 { self.to_pcolor_f().to_pcolor32() }

    #[inline]
    pub fn to_color64(self) -> Color64 {
        Color64::new(f32_to_u16(self.r), f32_to_u16(self.g), f32_to_u16(self.b), f32_to_u16(self.a))
    }

    #[inline] pub fn to_pcolor64(self) -> PColor64 { self.to_pcolor_f().to_pcolor64() }
}

impl PColorF {
    #[inline] pub fn to_pcolor_f(self) -> PColorF { self }

    /// Zero, negative or NaN alpha results in transparent black.
    #[inline]
    pub fn to_color_f(self) -> ColorF {
        if self.a >= 1.0 { ColorF::new(self.r, self.g, self.b, self.a) }
        else if self.a > 0.0 { ColorF::new(self.r / self.a, self.g / self.a, self.b / self.a, self.a) }
        else { ColorF::TRANSPARENT }
    }

    #[inline]
    pub fn to_pcolor32(self) -> PColor32 {
        PColor32::new(f32_to_u8(self.r), f32_to_u8(self.g), f32_to_u8(self.b), f32_to_u8(self.a))
    }

    #[inline] pub fn to_color32(self) -> Color32 { self.to_color_f().to_color32() }

    #[inline]
    pub fn to_pcolor64(self) -> PColor64 {
        PColor64::new(f32_to_u16(self.r), f32_to_u16(self.g), f32_to_u16(self.b), f32_to_u16(self.a))
    }

    #[inline] pub fn to_color64(self) -> Color64 { self.to_color_f().to_color64() }
}


macro_rules! implement_from {
    ($source: ident => $($target: ident: $method: ident),*) => {
        $(
            impl From<$source> for $target {
                #[inline] fn from(color: $source) -> Self { color.$method() }
            }
        )*
    };
}

implement_from!(Color32 => PColor32: to_pcolor32, Color64: to_color64, PColor64: to_pcolor64, ColorF: to_color_f, PColorF: to_pcolor_f);
implement_from!(PColor32 => Color32: to_color32, Color64: to_color64, PColor64: to_pcolor64, ColorF: to_color_f, PColorF: to_pcolor_f);
implement_from!(Color64 => Color32: to_color32, PColor32: to_pcolor32, PColor64: to_pcolor64, ColorF: to_color_f, PColorF: to_pcolor_f);
implement_from!(PColor64 => Color32: to_color32, PColor32: to_pcolor32, Color64: to_color64, ColorF: to_color_f, PColorF: to_pcolor_f);
implement_from!(ColorF => Color32: to_color32, PColor32: to_pcolor32, Color64: to_color64, PColor64: to_pcolor64, PColorF: to_pcolor_f);
implement_from!(PColorF => Color32: to_color32, PColor32: to_pcolor32, Color64: to_color64, PColor64: to_pcolor64, ColorF: to_color_f);
