#[macro_use]
extern crate bencher;

extern crate pixel_access;
use pixel_access::prelude::*;

use bencher::Bencher;

const SIZE: Vec2<usize> = Vec2(256, 256);

fn gradient(format: KnownPixelFormat) -> BitmapData<'static> {
    let mut bitmap = BitmapData::<u8>::new(SIZE, format, BitmapDataConfig::default(), Allocation::Heap).unwrap();

    for y in 0 .. SIZE.height() {
        for x in 0 .. SIZE.width() {
            bitmap.set_color32(Vec2(x, y), Color32::new(x as u8, y as u8, 128, (x ^ y) as u8)).unwrap();
        }
    }

    bitmap
}

fn write_color32(bench: &mut Bencher, format: KnownPixelFormat) {
    let mut bitmap = gradient(format);

    bench.iter(||{
        for mut row in bitmap.rows_mut().unwrap() {
            for x in 0 .. row.width() {
                row.set_color32(x, Color32::new(x as u8, 7, 99, 200)).unwrap();
            }
        }

        bencher::black_box(&bitmap);
    })
}

fn read_color32(bench: &mut Bencher, format: KnownPixelFormat) {
    let bitmap = gradient(format);

    bench.iter(||{
        for row in bitmap.rows().unwrap() {
            for x in 0 .. row.width() {
                bencher::black_box(row.get_color32(x).unwrap());
            }
        }
    })
}

/// Straight 32 bit storage, no conversion necessary
fn write_argb32(bench: &mut Bencher) { write_color32(bench, KnownPixelFormat::Argb32) }

/// Requires blending with the background
fn write_rgb24(bench: &mut Bencher) { write_color32(bench, KnownPixelFormat::Rgb24) }

/// Requires blending and reducing to 16 bits
fn write_rgb565(bench: &mut Bencher) { write_color32(bench, KnownPixelFormat::Rgb565) }

/// Requires premultiplying
fn write_pargb32(bench: &mut Bencher) { write_color32(bench, KnownPixelFormat::PArgb32) }

/// Requires converting to floats
fn write_rgba128_float(bench: &mut Bencher) { write_color32(bench, KnownPixelFormat::Rgba128Float) }

fn read_argb32(bench: &mut Bencher) { read_color32(bench, KnownPixelFormat::Argb32) }
fn read_pargb32(bench: &mut Bencher) { read_color32(bench, KnownPixelFormat::PArgb32) }
fn read_rgba64_half(bench: &mut Bencher) { read_color32(bench, KnownPixelFormat::Rgba64Half) }

/// Palette lookup of colors that are all contained in the palette
fn write_indexed8(bench: &mut Bencher) {
    let palette = Palette::system_256();
    let colors: Vec<Color32> = palette.entries().to_vec();
    let config = BitmapDataConfig::default().with_palette(palette);
    let mut bitmap = BitmapData::<u8>::new(SIZE, KnownPixelFormat::Indexed8, config, Allocation::Heap).unwrap();

    bench.iter(||{
        for mut row in bitmap.rows_mut().unwrap() {
            for x in 0 .. row.width() {
                row.set_color32(x, colors[x % colors.len()]).unwrap();
            }
        }

        bencher::black_box(&bitmap);
    })
}

/// Convert a whole bitmap into a wider format
fn clone_argb32_to_argb64(bench: &mut Bencher) {
    let bitmap = gradient(KnownPixelFormat::Argb32);

    bench.iter(||{
        let clone = bitmap.clone_with_format(KnownPixelFormat::Argb64, BitmapDataConfig::default()).unwrap();
        bencher::black_box(clone);
    })
}

/// Convert a whole bitmap into a format without alpha
fn clone_pargb32_to_rgb565(bench: &mut Bencher) {
    let bitmap = gradient(KnownPixelFormat::PArgb32);

    bench.iter(||{
        let clone = bitmap.clone_with_format(KnownPixelFormat::Rgb565, BitmapDataConfig::default()).unwrap();
        bencher::black_box(clone);
    })
}

benchmark_group!(pixel_format_conversion,
    write_argb32,
    write_rgb24,
    write_rgb565,
    write_pargb32,
    write_rgba128_float,
    read_argb32,
    read_pargb32,
    read_rgba64_half,
    write_indexed8,
    clone_argb32_to_argb64,
    clone_pargb32_to_rgb565,
);

benchmark_main!(pixel_format_conversion);
