
//! Palettes of indexed formats, and the collaborators
//! that map arbitrary colors to palette entries.

use smallvec::SmallVec;
use crate::color::{Color32, WorkingColorSpace};
use crate::error::{Error, Result, check_index};
use crate::math::Vec2;


/// The largest number of entries a palette can have.
pub const MAX_PALETTE_SIZE: usize = 256;

/// An ordered list of colors that indexed pixels refer to.
///
/// Also knows how translucent colors are mapped to entries:
/// colors with an alpha below the threshold map to the transparent entry,
/// if any, and other translucent colors are blended with the background first.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    entries: SmallVec<[Color32; 16]>,
    background: Color32,
    alpha_threshold: u8,
    working_color_space: WorkingColorSpace,
    transparent_index: Option<usize>,
}

impl Palette {

    /// Create a palette from 1 to 256 colors.
    /// Uses black as background and an alpha threshold of 128.
    pub fn new(entries: impl IntoIterator<Item = Color32>) -> Result<Self> {
        let entries: SmallVec<[Color32; 16]> = entries.into_iter().collect();

        if entries.is_empty() || entries.len() > MAX_PALETTE_SIZE {
            return Err(Error::invalid(format!(
                "palette must have 1 to {} entries, but has {}", MAX_PALETTE_SIZE, entries.len()
            )));
        }

        let transparent_index = entries.iter().position(|entry| entry.a == 0);

        Ok(Palette {
            entries, transparent_index,
            background: Color32::BLACK,
            alpha_threshold: 128,
            working_color_space: WorkingColorSpace::Srgb,
        })
    }

    /// Black and white, the default palette of 1-bit formats.
    pub fn black_and_white() -> Self {
        Self::from_argb(&[0xFF000000, 0xFFFFFFFF])
    }

    /// The 16 standard system colors, the default palette of 4-bit formats.
    pub fn system_16() -> Self {
        Self::from_argb(&SYSTEM_COLORS)
    }

    /// The 16 system colors, followed by the 216 web-safe colors and 24 grays.
    /// The default palette of 8-bit indexed formats.
    pub fn system_256() -> Self {
        let levels: &'static [u8] = &[0x00, 0x33, 0x66, 0x99, 0xCC, 0xFF];

        let system = SYSTEM_COLORS.iter().map(|&argb| Color32::from_argb(argb));

        let web_safe = levels.iter().flat_map(move |&r| levels.iter().flat_map(move |&g| {
            levels.iter().map(move |&b| Color32::from_rgb(r, g, b))
        }));

        let grays = (0 .. 24_u8).map(|index| {
            let value = 8 + index * 10;
            Color32::from_rgb(value, value, value)
        });

        let entries: SmallVec<[Color32; 16]> = system.chain(web_safe).chain(grays).collect();
        debug_assert_eq!(entries.len(), MAX_PALETTE_SIZE);

        Palette {
            entries, transparent_index: None, background: Color32::BLACK,
            alpha_threshold: 128, working_color_space: WorkingColorSpace::Srgb,
        }
    }

    /// The default palette of an indexed format with the specified bits per pixel.
    /// Formats with fewer bits than the default palette has entries use its first entries.
    pub fn default_for_bits(bits_per_pixel: usize) -> Self {
        let palette = match bits_per_pixel {
            0 ..= 1 => Self::black_and_white(),
            2 ..= 4 => Self::system_16(),
            _ => Self::system_256(),
        };

        if bits_per_pixel < 8 {
            palette.truncated(1 << bits_per_pixel.max(1))
        }
        else { palette }
    }

    fn truncated(mut self, length: usize) -> Self {
        self.entries.truncate(length);
        self.transparent_index = self.entries.iter().position(|entry| entry.a == 0);
        self
    }

    fn from_argb(colors: &[u32]) -> Self {
        Palette {
            entries: colors.iter().map(|&argb| Color32::from_argb(argb)).collect(),
            transparent_index: None, background: Color32::BLACK,
            alpha_threshold: 128, working_color_space: WorkingColorSpace::Srgb,
        }
    }

    /// The same palette with another background color. Alpha of the background is ignored.
    pub fn with_background(self, background: Color32) -> Self {
        Palette { background: background.with_alpha(255), ..self }
    }

    /// The same palette with another alpha threshold.
    pub fn with_alpha_threshold(self, alpha_threshold: u8) -> Self {
        Palette { alpha_threshold, ..self }
    }

    /// The same palette, blending in another working color space.
    pub fn with_working_color_space(self, working_color_space: WorkingColorSpace) -> Self {
        Palette { working_color_space, ..self }
    }

    /// Number of entries.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Always false, as palettes have at least one entry.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// All entries in order.
    pub fn entries(&self) -> &[Color32] { &self.entries }

    /// The color translucent colors are blended with.
    pub fn background(&self) -> Color32 { self.background }

    /// Colors with an alpha below this value map to the transparent entry, if there is one.
    pub fn alpha_threshold(&self) -> u8 { self.alpha_threshold }

    /// Where blending arithmetic happens.
    pub fn working_color_space(&self) -> WorkingColorSpace { self.working_color_space }

    /// The index of the first fully transparent entry, if any.
    pub fn transparent_index(&self) -> Option<usize> { self.transparent_index }

    /// Whether any entry is not fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.entries.iter().any(|entry| entry.a != 255)
    }

    /// The color of the entry at the specified index.
    pub fn color(&self, index: usize) -> Result<Color32> {
        check_index(index, self.entries.len(), "palette index")
            .map_err(|_| Error::invalid(format!(
                "palette index {} refers to no entry of a palette with {} colors", index, self.entries.len()
            )))?;

        Ok(self.entries[index])
    }

    /// The index of an entry that equals the color exactly, if any.
    pub fn exact_index_of(&self, color: Color32) -> Option<usize> {
        self.entries.iter().position(|&entry| entry == color)
    }

    /// Find the entry a color should be stored as.
    /// Tries an exact match, then the alpha threshold and background blending rules,
    /// then asks the quantizer. Fails if no entry could be found.
    pub fn index_of(&self, color: Color32, quantizer: Option<&dyn Quantizer>) -> Result<usize> {
        if let Some(index) = self.exact_index_of(color) {
            return Ok(index);
        }

        if color.a < self.alpha_threshold {
            if let Some(index) = self.transparent_index { return Ok(index); }
        }

        let color = if color.a == 255 { color }
        else {
            let blended = color.blend_with_background(self.background, self.working_color_space);
            if let Some(index) = self.exact_index_of(blended) { return Ok(index); }
            blended
        };

        match quantizer.and_then(|quantizer| quantizer.palette_index(self, color)) {
            Some(index) => {
                check_index(index, self.entries.len(), "quantized palette index")?;
                Ok(index)
            },

            None => Err(Error::unsupported(format!(
                "color {:?} is not in the palette, and no quantizer was specified", color
            ))),
        }
    }
}


const SYSTEM_COLORS: [u32; 16] = [
    0xFF000000, 0xFF800000, 0xFF008000, 0xFF808000,
    0xFF000080, 0xFF800080, 0xFF008080, 0xFFC0C0C0,
    0xFF808080, 0xFFFF0000, 0xFF00FF00, 0xFFFFFF00,
    0xFF0000FF, 0xFFFF00FF, 0xFF00FFFF, 0xFFFFFFFF,
];


/// Maps a color that is not in a palette to a palette index.
/// Palette construction itself is not part of this crate,
/// only the lookup for an existing palette.
pub trait Quantizer: Send + Sync {

    /// The index the color should be stored as, or `None` if no entry is acceptable.
    fn palette_index(&self, palette: &Palette, color: Color32) -> Option<usize>;
}

impl<F> Quantizer for F where F: Send + Sync + Fn(&Palette, Color32) -> Option<usize> {
    fn palette_index(&self, palette: &Palette, color: Color32) -> Option<usize> {
        self(palette, color)
    }
}

/// Chooses the entry with the smallest squared distance in RGB,
/// preferring opaque entries for opaque colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NearestColorQuantizer;

impl Quantizer for NearestColorQuantizer {
    fn palette_index(&self, palette: &Palette, color: Color32) -> Option<usize> {
        let distance = |entry: &Color32| -> u32 {
            let difference = |a: u8, b: u8| (a as i32 - b as i32).pow(2) as u32;
            difference(entry.r, color.r) + difference(entry.g, color.g)
                + difference(entry.b, color.b) + difference(entry.a, color.a)
        };

        palette.entries().iter().enumerate()
            .min_by_key(|(_, entry)| distance(entry))
            .map(|(index, _)| index)
    }
}


/// Perturbs colors before they are mapped to a palette, based on their position.
pub trait Ditherer {

    /// The color that should actually be stored at the specified pixel position.
    fn dither(&mut self, color: Color32, position: Vec2<usize>) -> Color32;
}

impl<F> Ditherer for F where F: FnMut(Color32, Vec2<usize>) -> Color32 {
    fn dither(&mut self, color: Color32, position: Vec2<usize>) -> Color32 {
        self(color, position)
    }
}
