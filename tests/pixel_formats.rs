
// tests reading and writing pixels through the public interface

extern crate pixel_access;
use pixel_access::prelude::*;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};


fn blank(size: Vec2<usize>, format: KnownPixelFormat) -> BitmapData<'static> {
    BitmapData::<u8>::new(size, format, BitmapDataConfig::default(), Allocation::Heap).unwrap()
}

#[test]
fn opaque_colors_survive_lossless_formats() {
    let color = Color32::new(12, 200, 99, 255);

    for &format in &[
        KnownPixelFormat::Rgb24, KnownPixelFormat::Rgb32, KnownPixelFormat::Argb32, KnownPixelFormat::PArgb32,
        KnownPixelFormat::Rgb48, KnownPixelFormat::Argb64, KnownPixelFormat::PArgb64,
        KnownPixelFormat::Rgb96Float, KnownPixelFormat::Rgba128Float, KnownPixelFormat::PRgba128Float,
    ] {
        let mut bitmap = blank(Vec2(3, 2), format);
        bitmap.set_color32(Vec2(2, 1), color).unwrap();
        assert_eq!(bitmap.get_color32(Vec2(2, 1)).unwrap(), color, "{:?}", format);

        let blank_alpha = if format.info().has_alpha { 0 } else { 255 };
        assert_eq!(bitmap.get_color32(Vec2(1, 1)).unwrap().a, blank_alpha, "{:?}", format);
    }
}

#[test]
fn rgb565_loses_low_bits() {
    let mut bitmap = blank(Vec2(2, 1), KnownPixelFormat::Rgb565);
    bitmap.set_color32(Vec2(1, 0), Color32::from_rgb(255, 130, 17)).unwrap();

    assert_eq!(bitmap.get_color32(Vec2(1, 0)).unwrap(), Color32::from_rgb(255, 130, 16));
    assert_eq!(bitmap.row(0).unwrap().read_raw::<u16>(2).unwrap(), 0b11111_100000_00010);
}

#[test]
fn rgb555_loses_low_bits() {
    let mut bitmap = blank(Vec2(2, 1), KnownPixelFormat::Rgb555);
    bitmap.set_color32(Vec2(1, 0), Color32::from_rgb(255, 130, 17)).unwrap();

    assert_eq!(bitmap.get_color32(Vec2(1, 0)).unwrap(), Color32::from_rgb(255, 132, 16));
    assert_eq!(bitmap.get_color32(Vec2(0, 0)).unwrap(), Color32::BLACK);
    assert_eq!(bitmap.row(0).unwrap().read_raw::<u16>(2).unwrap(), 0b0_11111_10000_00010);
}

#[test]
fn gray32_float_pixels() {
    let mut bitmap = blank(Vec2(2, 1), KnownPixelFormat::Gray32Float);
    bitmap.set_color32(Vec2(1, 0), Color32::from_rgb(77, 77, 77)).unwrap();
    bitmap.set_color32(Vec2(0, 0), Color32::new(255, 255, 255, 0)).unwrap();

    assert_eq!(bitmap.get_color32(Vec2(1, 0)).unwrap(), Color32::from_rgb(77, 77, 77));
    assert_eq!(bitmap.get_color32(Vec2(0, 0)).unwrap(), Color32::BLACK, "transparent white is blended with black");

    let stored = bitmap.row(0).unwrap().read_raw::<f32>(4).unwrap();
    assert!((stored - 77.0 / 255.0).abs() < 1e-5, "{}", stored);
}

#[test]
fn raw_rows_of_known_formats_are_bounds_checked() {
    let mut bitmap = blank(Vec2(2, 1), KnownPixelFormat::Argb32);
    let format = KnownPixelFormat::Argb32;

    let row = bitmap.row(0).unwrap();
    assert!(matches!(PixelAccess::<u8>::get_color32(&format, &row.raw(), 10), Err(Error::OutOfBounds(_))));
    assert!(PixelAccess::<u8>::get_color32(&format, &row.raw(), 1).is_ok());

    let mut row = bitmap.row_mut(0).unwrap();
    assert!(matches!(format.set_color32(&mut row.raw_mut(), 2, Color32::WHITE), Err(Error::OutOfBounds(_))));
}

#[test]
fn translucent_colors_are_blended_without_alpha() {
    let config = BitmapDataConfig::default().with_background(Color32::from_rgb(0, 0, 255));
    let mut bitmap = BitmapData::<u8>::new(Vec2(1, 1), KnownPixelFormat::Rgb24, config, Allocation::Heap).unwrap();

    bitmap.set_color32(Vec2(0, 0), Color32::new(255, 0, 0, 128)).unwrap();
    assert_eq!(bitmap.get_color32(Vec2(0, 0)).unwrap(), Color32::new(128, 0, 127, 255));
    assert_eq!(bitmap.elements().unwrap(), &[127, 0, 128]);
}

#[test]
fn linear_blending_is_brighter_than_srgb_blending() {
    let config = BitmapDataConfig::default().with_working_color_space(WorkingColorSpace::Linear);
    let mut linear = BitmapData::<u8>::new(Vec2(1, 1), KnownPixelFormat::Rgb24, config, Allocation::Heap).unwrap();
    let mut srgb = blank(Vec2(1, 1), KnownPixelFormat::Rgb24);

    let half_white = Color32::new(255, 255, 255, 128);
    linear.set_color32(Vec2(0, 0), half_white).unwrap();
    srgb.set_color32(Vec2(0, 0), half_white).unwrap();

    assert_eq!(srgb.get_color32(Vec2(0, 0)).unwrap(), Color32::from_rgb(128, 128, 128));
    assert!(linear.get_color32(Vec2(0, 0)).unwrap().r > 180);
}

#[test]
fn gray_formats_store_luminance() {
    let mut bitmap = blank(Vec2(2, 1), KnownPixelFormat::Gray8);
    bitmap.set_color32(Vec2(0, 0), Color32::from_rgb(77, 77, 77)).unwrap();
    bitmap.set_color32(Vec2(1, 0), Color32::from_rgb(255, 0, 0)).unwrap();

    assert_eq!(bitmap.get_color32(Vec2(0, 0)).unwrap(), Color32::from_rgb(77, 77, 77));
    assert_eq!(bitmap.elements().unwrap()[1], 76);
}

#[test]
fn indices_must_fit_the_palette() {
    let mut bitmap = blank(Vec2(9, 1), KnownPixelFormat::Indexed1);
    assert_eq!(bitmap.palette().unwrap().len(), 2);

    bitmap.set_index(Vec2(8, 0), 1).unwrap();
    assert!(matches!(bitmap.set_index(Vec2(0, 0), 2), Err(Error::OutOfBounds(_))));
    assert!(matches!(bitmap.set_index(Vec2(9, 0), 0), Err(Error::OutOfBounds(_))));

    assert_eq!(bitmap.get_color32(Vec2(8, 0)).unwrap(), Color32::WHITE);
    assert_eq!(bitmap.elements().unwrap(), &[0, 0b1000_0000]);
}

#[test]
fn colors_outside_the_palette_are_quantized_if_possible() {
    let palette = Palette::new(vec![Color32::BLACK, Color32::from_rgb(200, 0, 0), Color32::WHITE]).unwrap();

    let mut exact = BitmapData::<u8>::new(
        Vec2(1, 1), KnownPixelFormat::Indexed8,
        BitmapDataConfig::default().with_palette(palette.clone()), Allocation::Heap
    ).unwrap();

    assert!(matches!(exact.set_color32(Vec2(0, 0), Color32::from_rgb(190, 10, 0)), Err(Error::NotSupported(_))));

    let config = BitmapDataConfig::default().with_palette(palette).with_quantizer(NearestColorQuantizer);
    let mut quantized = BitmapData::<u8>::new(Vec2(1, 1), KnownPixelFormat::Indexed8, config, Allocation::Heap).unwrap();

    quantized.set_color32(Vec2(0, 0), Color32::from_rgb(190, 10, 0)).unwrap();
    assert_eq!(quantized.get_index(Vec2(0, 0)).unwrap(), 1);
}

#[test]
fn premultiplied_colors_survive_straight_storage() {
    let mut random = StdRng::seed_from_u64(7);
    let mut bitmap = blank(Vec2(1, 1), KnownPixelFormat::Argb32);

    for _ in 0 .. 2000 {
        let alpha: u8 = random.random_range(1 ..= 255);
        let mut channel = || random.random_range(0 ..= alpha);
        let color = PColor32::new(channel(), channel(), channel(), alpha);

        bitmap.set_pcolor32(Vec2(0, 0), color).unwrap();
        assert_eq!(bitmap.get_pcolor32(Vec2(0, 0)).unwrap(), color);
    }
}

#[test]
fn eight_bit_colors_survive_wide_formats() {
    let mut random = StdRng::seed_from_u64(42);
    let mut wide = blank(Vec2(1, 1), KnownPixelFormat::Argb64);
    let mut float = blank(Vec2(1, 1), KnownPixelFormat::Rgba128Float);

    for _ in 0 .. 2000 {
        let color = Color32::from_argb(random.random());

        wide.set_color32(Vec2(0, 0), color).unwrap();
        float.set_color32(Vec2(0, 0), color).unwrap();

        assert_eq!(wide.get_color32(Vec2(0, 0)).unwrap(), color);
        assert_eq!(float.get_color32(Vec2(0, 0)).unwrap(), color);
    }
}

#[test]
fn half_float_pixels() {
    let mut bitmap = blank(Vec2(1, 1), KnownPixelFormat::Rgba64Half);
    bitmap.set_color_f(Vec2(0, 0), ColorF::new(0.5, 0.25, 1.0, 0.75)).unwrap();

    assert_eq!(bitmap.get_color_f(Vec2(0, 0)).unwrap(), ColorF::new(0.5, 0.25, 1.0, 0.75));
    assert_eq!(bitmap.row(0).unwrap().read_raw::<f16>(0).unwrap(), f16::from_f32(0.5));
}


fn counting_format(reads: Arc<AtomicUsize>) -> CustomPixelFormat<u8> {
    CustomPixelFormat::builder(PixelFormatInfo::new(8).with_alpha())
        .read_color64(move |row, x| {
            reads.fetch_add(1, Ordering::SeqCst);
            let value = row.read::<u8>(x)? as u16 * 257;
            Ok(Color64::new(value, value, value, 65535))
        })
        .read_pcolor_f(|row, x| {
            let value = row.read::<u8>(x)? as f32 / 255.0;
            Ok(PColorF::new(value, value, value, 1.0))
        })
        .write_color32(|row, x, color| row.write(x, color.r))
        .build().unwrap()
}

#[test]
fn custom_formats_read_through_the_closest_callback() {
    let reads = Arc::new(AtomicUsize::new(0));
    let mut bitmap = BitmapData::<u8>::new(
        Vec2(2, 1), counting_format(reads.clone()),
        BitmapDataConfig::default(), Allocation::Heap
    ).unwrap();

    bitmap.set_color32(Vec2(1, 0), Color32::from_rgb(51, 0, 0)).unwrap();

    assert_eq!(bitmap.get_color32(Vec2(1, 0)).unwrap(), Color32::from_rgb(51, 51, 51));
    assert_eq!(reads.load(Ordering::SeqCst), 1);

    assert_eq!(bitmap.get_pcolor32(Vec2(1, 0)).unwrap(), PColor32::new(51, 51, 51, 255));
    assert_eq!(reads.load(Ordering::SeqCst), 1, "premultiplied colors are read as PColorF");
}

#[test]
fn write_only_custom_formats_cannot_be_read() {
    let format = CustomPixelFormat::<u8>::builder(PixelFormatInfo::new(8))
        .write_color32(|row, x, color| row.write(x, color.g))
        .build().unwrap();

    assert!(format.readable().is_empty());

    let mut bitmap = BitmapData::<u8>::new(Vec2(2, 2), format, BitmapDataConfig::default(), Allocation::Heap).unwrap();
    bitmap.set_color64(Vec2(1, 1), Color64::from_rgb(0, 65535, 0)).unwrap();

    assert_eq!(bitmap.row(1).unwrap().elements()[1], 255);
    assert!(matches!(bitmap.get_color32(Vec2(1, 1)), Err(Error::NotSupported(_))));
    assert!(matches!(bitmap.get_pcolor_f(Vec2(1, 1)), Err(Error::NotSupported(_))));
}

#[test]
fn custom_formats_without_alpha_are_blended() {
    let format = CustomPixelFormat::<u8>::builder(PixelFormatInfo::new(8).with_grayscale())
        .read_color32(|row, x| { let gray = row.read::<u8>(x)?; Ok(Color32::from_rgb(gray, gray, gray)) })
        .write_color32(|row, x, color| row.write(x, color.luminance(row.working_color_space())))
        .build().unwrap();

    let config = BitmapDataConfig::default().with_background(Color32::WHITE);
    let mut bitmap = BitmapData::<u8>::new(Vec2(1, 1), format, config, Allocation::Heap).unwrap();

    bitmap.set_color32(Vec2(0, 0), Color32::TRANSPARENT).unwrap();
    assert_eq!(bitmap.get_color32(Vec2(0, 0)).unwrap(), Color32::WHITE);
}

#[test]
fn compatible_custom_bitmaps_keep_their_callbacks() {
    let format = CustomPixelFormat::<u8>::builder(PixelFormatInfo::new(12))
        .read_color32(|row, x| {
            let bits = row.read::<u16>(x * 3 / 2)? >> ((x % 2) * 4);
            let value = (bits & 0xF) as u8 * 17;
            Ok(Color32::from_rgb(value, value, value))
        })
        .build().unwrap();

    let bitmap = BitmapData::<u8>::new(Vec2(3, 1), format, BitmapDataConfig::default(), Allocation::Heap).unwrap();
    assert_eq!(bitmap.stride_bytes(), 8);

    let mut compatible = bitmap.create_compatible(Vec2(20, 2)).unwrap();
    assert_eq!(compatible.stride_bytes(), 32);
    assert!(compatible.info().custom);

    compatible.row_mut(1).unwrap().elements_mut()[0] = 0x0F;
    assert_eq!(compatible.get_color32(Vec2(0, 1)).unwrap(), Color32::WHITE);
    assert!(matches!(compatible.set_color32(Vec2(0, 0), Color32::WHITE), Err(Error::NotSupported(_))));
}

#[test]
fn copy_between_element_types() {
    let mut source = blank(Vec2(3, 3), KnownPixelFormat::Argb32);
    for y in 0 .. 3 {
        for x in 0 .. 3 {
            source.set_color32(Vec2(x, y), Color32::new(x as u8 * 80, y as u8 * 80, 7, 255)).unwrap();
        }
    }

    let mut pixels = vec![[0.0_f32; 4]; 9];
    let mut target = BitmapData::from_pixels(&mut pixels, Vec2(3, 3), 48, KnownPixelFormat::Rgba128Float, BitmapDataConfig::default()).unwrap();
    source.copy_to(&mut target).unwrap();

    assert_eq!(target.get_color32(Vec2(2, 1)).unwrap(), Color32::new(160, 80, 7, 255));
    drop(target);

    assert_eq!(pixels[3 + 2], [160.0 / 255.0, 80.0 / 255.0, 7.0 / 255.0, 1.0]);

    let mut smaller = blank(Vec2(2, 3), KnownPixelFormat::Argb32);
    assert!(matches!(source.copy_to(&mut smaller), Err(Error::Invalid(_))));
}

#[test]
fn indexed_copies_keep_indices() {
    let palette = Palette::new(vec![Color32::from_rgb(10, 10, 10), Color32::from_rgb(10, 10, 10), Color32::WHITE]).unwrap();
    let config = BitmapDataConfig::default().with_palette(palette);

    let mut source = BitmapData::<u8>::new(Vec2(4, 1), KnownPixelFormat::Indexed4, config.clone(), Allocation::Heap).unwrap();
    source.set_index(Vec2(3, 0), 1).unwrap();

    let clone = source.clone_with_format(KnownPixelFormat::Indexed8, config).unwrap();
    assert_eq!(clone.get_index(Vec2(3, 0)).unwrap(), 1);
    assert_eq!(clone.get_index(Vec2(2, 0)).unwrap(), 0);
}
