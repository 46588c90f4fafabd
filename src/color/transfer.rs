
//! The sRGB transfer function (IEC 61966-2-1).
//!
//! Color values are stored gamma encoded. Blending and luminance
//! in the linear working color space decode them first and encode the result.

#![allow(clippy::excessive_precision)]


/// sRGB encoded `[0,1]` → linear `[0,1]`.
#[inline]
pub fn srgb_to_linear(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear `[0,1]` → sRGB encoded `[0,1]`.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 0.001);
        assert!((linear_to_srgb(0.214) - 0.5).abs() < 0.001);
    }

    #[test]
    fn round_trip() {
        for index in 0 ..= 1000 {
            let value = index as f32 / 1000.0;
            assert!((linear_to_srgb(srgb_to_linear(value)) - value).abs() < 1e-5, "{}", value);
        }
    }
}
