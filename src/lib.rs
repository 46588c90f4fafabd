
//! Read and write pixels of bitmaps in many binary layouts through one interface.
//!
//! Bitmap data consists of rows of pixels in a specific format, for example
//! 1-bit palette indices, 16-bit `RGB565`, 32-bit `ARGB` with premultiplied alpha,
//! or 128-bit float channels. Each row can read and write any pixel
//! in any of six color representations. Colors are converted from or to
//! the closest representation the format supports, and translucent colors
//! are blended with a background color if the format cannot store them.
//!
//! ```
//! use pixel_access::prelude::*;
//!
//! let mut bitmap = BitmapData::<u8>::new(
//!     Vec2(4, 4), KnownPixelFormat::Rgb565,
//!     BitmapDataConfig::default(), Allocation::Heap
//! ).unwrap();
//!
//! bitmap.set_color32(Vec2(1, 2), Color32::from_rgb(255, 130, 17)).unwrap();
//! assert_eq!(bitmap.get_color32(Vec2(1, 2)).unwrap(), Color32::from_rgb(255, 130, 16));
//! ```

#![forbid(unsafe_code)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused_qualifications,
    clippy::all,
)]

#[macro_use]
extern crate smallvec;


pub mod io;
pub mod math;
pub mod error;
pub mod color;
pub mod format;
pub mod palette;
pub mod storage;
pub mod custom;
pub mod access;
pub mod row;
pub mod bitmap;


pub mod prelude {
    // main exports
    pub use crate::bitmap::{BitmapData, BitmapDataConfig};
    pub use crate::row::{RowRef, RowRefMut};

    // color values
    pub use crate::color::{
        Color, ColorValue, Representation, WorkingColorSpace,
        Color32, PColor32, Color64, PColor64, ColorF, PColorF,
    };

    // formats
    pub use crate::format::{KnownPixelFormat, PixelFormatInfo, Representations};
    pub use crate::access::{PixelAccess, PixelFormat};
    pub use crate::custom::CustomPixelFormat;
    pub use crate::palette::{Palette, Quantizer, Ditherer, NearestColorQuantizer};
    pub use crate::storage::{Allocation, BufferPool, SharedBufferPool, StorageKind, RawRow, RawRowMut};

    // secondary data types
    pub use crate::math::Vec2;
    pub use crate::io::Element;
    pub use crate::error::{self, Error, Result, UnitResult};

    // re-export external stuff
    pub use half::f16;
}
