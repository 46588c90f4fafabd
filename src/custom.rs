
//! Pixel formats defined by callbacks.
//!
//! A custom format declares its descriptor and any subset of getters and setters,
//! one per color representation, plus palette index callbacks for indexed layouts.
//! The supplied callbacks are the capability table of the format:
//! colors are read and written through the callback of the closest
//! representation, and converted from there.

use std::fmt;
use std::sync::Arc;
use crate::access::{PixelAccess, unsupported};
use crate::color::*;
use crate::error::{Error, Result, UnitResult, check_index};
use crate::format::{PixelFormatInfo, Representations};
use crate::io::Element;
use crate::storage::{RawRow, RawRowMut};


/// Reads a single pixel of a raw row.
pub type Getter<E, C> = Arc<dyn Fn(&RawRow<'_, E>, usize) -> Result<C> + Send + Sync>;

/// Writes a single pixel of a raw row.
pub type Setter<E, C> = Arc<dyn Fn(&mut RawRowMut<'_, E>, usize, C) -> UnitResult + Send + Sync>;


struct Callbacks<E: Element, C> {
    get: Option<Getter<E, C>>,
    set: Option<Setter<E, C>>,
}

impl<E: Element, C> Clone for Callbacks<E, C> {
    fn clone(&self) -> Self {
        Callbacks { get: self.get.clone(), set: self.set.clone() }
    }
}

impl<E: Element, C> Default for Callbacks<E, C> {
    fn default() -> Self { Callbacks { get: None, set: None } }
}


/// A pixel layout that is defined by callbacks.
/// Create one using `CustomPixelFormat::builder`.
#[derive(Clone)]
pub struct CustomPixelFormat<E: Element> {
    info: PixelFormatInfo,
    color32: Callbacks<E, Color32>,
    pcolor32: Callbacks<E, PColor32>,
    color64: Callbacks<E, Color64>,
    pcolor64: Callbacks<E, PColor64>,
    color_f: Callbacks<E, ColorF>,
    pcolor_f: Callbacks<E, PColorF>,
    index: Callbacks<E, usize>,
}

/// Collects the callbacks of a custom pixel format.
pub struct CustomPixelFormatBuilder<E: Element> {
    format: CustomPixelFormat<E>,
}

impl<E: Element> CustomPixelFormat<E> {

    /// Start defining a custom format with the specified descriptor.
    /// The descriptor is marked as custom automatically.
    pub fn builder(info: PixelFormatInfo) -> CustomPixelFormatBuilder<E> {
        CustomPixelFormatBuilder {
            format: CustomPixelFormat {
                info: PixelFormatInfo { custom: true, ..info },
                color32: Callbacks::default(),
                pcolor32: Callbacks::default(),
                color64: Callbacks::default(),
                pcolor64: Callbacks::default(),
                color_f: Callbacks::default(),
                pcolor_f: Callbacks::default(),
                index: Callbacks::default(),
            }
        }
    }

    /// The descriptor of this format.
    pub fn info(&self) -> PixelFormatInfo { self.info }

    fn color_getters(&self) -> Representations {
        let mut representations = Representations::NONE;
        if self.color32.get.is_some() { representations = representations.with(Representation::Color32); }
        if self.pcolor32.get.is_some() { representations = representations.with(Representation::PColor32); }
        if self.color64.get.is_some() { representations = representations.with(Representation::Color64); }
        if self.pcolor64.get.is_some() { representations = representations.with(Representation::PColor64); }
        if self.color_f.get.is_some() { representations = representations.with(Representation::ColorF); }
        if self.pcolor_f.get.is_some() { representations = representations.with(Representation::PColorF); }
        representations
    }

    fn color_setters(&self) -> Representations {
        let mut representations = Representations::NONE;
        if self.color32.set.is_some() { representations = representations.with(Representation::Color32); }
        if self.pcolor32.set.is_some() { representations = representations.with(Representation::PColor32); }
        if self.color64.set.is_some() { representations = representations.with(Representation::Color64); }
        if self.pcolor64.set.is_some() { representations = representations.with(Representation::PColor64); }
        if self.color_f.set.is_some() { representations = representations.with(Representation::ColorF); }
        if self.pcolor_f.set.is_some() { representations = representations.with(Representation::PColorF); }
        representations
    }
}


macro_rules! callback_setters {
    ($field: ident, $color: ty, $read: ident, $write: ident) => {
        #[doc = concat!("Read pixels as `", stringify!($color), "` using the specified callback.")]
        pub fn $read(mut self, getter: impl Fn(&RawRow<'_, E>, usize) -> Result<$color> + Send + Sync + 'static) -> Self {
            self.format.$field.get = Some(Arc::new(getter));
            self
        }

        #[doc = concat!("Write pixels as `", stringify!($color), "` using the specified callback.")]
        pub fn $write(mut self, setter: impl Fn(&mut RawRowMut<'_, E>, usize, $color) -> UnitResult + Send + Sync + 'static) -> Self {
            self.format.$field.set = Some(Arc::new(setter));
            self
        }
    };
}

impl<E: Element> CustomPixelFormatBuilder<E> {
    callback_setters!(color32, Color32, read_color32, write_color32);
    callback_setters!(pcolor32, PColor32, read_pcolor32, write_pcolor32);
    callback_setters!(color64, Color64, read_color64, write_color64);
    callback_setters!(pcolor64, PColor64, read_pcolor64, write_pcolor64);
    callback_setters!(color_f, ColorF, read_color_f, write_color_f);
    callback_setters!(pcolor_f, PColorF, read_pcolor_f, write_pcolor_f);
    callback_setters!(index, usize, read_index, write_index);

    /// Validate the callbacks against the descriptor.
    ///
    /// Fails if there are no callbacks at all, if an indexed format
    /// has no index callbacks, or if a non-indexed format has no color callbacks.
    pub fn build(self) -> Result<CustomPixelFormat<E>> {
        let format = self.format;
        let info = format.info;

        if info.bits_per_pixel == 0 {
            return Err(Error::invalid("custom pixel format must have at least one bit per pixel"));
        }

        let has_colors = !format.color_getters().is_empty() || !format.color_setters().is_empty();
        let has_indices = format.index.get.is_some() || format.index.set.is_some();

        if !has_colors && !has_indices {
            return Err(Error::invalid("custom pixel format needs at least one getter or setter"));
        }

        if info.indexed && !has_indices {
            return Err(Error::invalid("indexed custom pixel format needs palette index callbacks"));
        }

        if !info.indexed && !has_colors {
            return Err(Error::invalid("non-indexed custom pixel format needs color callbacks"));
        }

        Ok(format)
    }
}


macro_rules! delegate_to_callbacks {
    ($field: ident, $color: ty, $representation: ident, $get: ident, $set: ident) => {
        fn $get(&self, row: &RawRow<'_, E>, x: usize) -> Result<$color> {
            match &self.$field.get {
                Some(getter) => getter(row, x),
                None => Err(unsupported(self.info, "read", Representation::$representation)),
            }
        }

        fn $set(&self, row: &mut RawRowMut<'_, E>, x: usize, color: $color) -> UnitResult {
            match &self.$field.set {
                Some(setter) => setter(row, x, color),
                None => Err(unsupported(self.info, "write", Representation::$representation)),
            }
        }
    };
}

impl<E: Element> PixelAccess<E> for CustomPixelFormat<E> {
    fn format_info(&self) -> PixelFormatInfo { self.info }
    fn readable(&self) -> Representations { self.color_getters() }
    fn writable(&self) -> Representations { self.color_setters() }

    delegate_to_callbacks!(color32, Color32, Color32, get_color32, set_color32);
    delegate_to_callbacks!(pcolor32, PColor32, PColor32, get_pcolor32, set_pcolor32);
    delegate_to_callbacks!(color64, Color64, Color64, get_color64, set_color64);
    delegate_to_callbacks!(pcolor64, PColor64, PColor64, get_pcolor64, set_pcolor64);
    delegate_to_callbacks!(color_f, ColorF, ColorF, get_color_f, set_color_f);
    delegate_to_callbacks!(pcolor_f, PColorF, PColorF, get_pcolor_f, set_pcolor_f);

    fn get_index(&self, row: &RawRow<'_, E>, x: usize) -> Result<usize> {
        match &self.index.get {
            Some(getter) => getter(row, x),
            None => Err(Error::unsupported("custom pixel format cannot read palette indices")),
        }
    }

    fn set_index(&self, row: &mut RawRowMut<'_, E>, x: usize, index: usize) -> UnitResult {
        let setter = self.index.set.as_ref()
            .ok_or_else(|| Error::unsupported("custom pixel format cannot write palette indices"))?;

        if let Some(count) = self.info.max_palette_size() {
            check_index(index, count, "palette index")?;
        }

        setter(row, x, index)
    }
}

impl<E: Element> fmt::Debug for CustomPixelFormat<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("CustomPixelFormat")
            .field("info", &self.info)
            .field("readable", &self.color_getters())
            .field("writable", &self.color_setters())
            .field("index", &(self.index.get.is_some(), self.index.set.is_some()))
            .finish()
    }
}
