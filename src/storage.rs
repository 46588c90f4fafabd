
//! Backing memory of bitmap data.
//!
//! Bitmap rows are slices of plain elements. Pixel values of any
//! element type can be read from and written to any byte offset
//! of a row, using the little-endian byte representation of the elements.
//! Where the element type equals the accessed value type,
//! the element is accessed directly instead.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use smallvec::SmallVec;
use crate::color::WorkingColorSpace;
use crate::error::{Error, Result, UnitResult};
use crate::io::Element;


/// How the buffer of a bitmap relates to its pixel values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {

    /// The buffer was allocated by this crate, as small units (usually bytes),
    /// and pixel values are decoded from the units at a fixed stride.
    ByteCast,

    /// The buffer was provided by the caller and consists of elements
    /// of an arbitrary type. Pixel values are recomposed from the
    /// bytes of the elements they overlap. Raw access must be aligned.
    GenericElement,

    /// The buffer was provided by the caller, and each element is exactly one pixel value.
    SpecificElement,
}


/// Read a value starting at the specified byte offset of the elements.
/// Panics if the value exceeds the slice, so callers check the bounds first.
#[inline]
pub(crate) fn read_value<E: Element, T: Element>(elements: &[E], byte_offset: usize) -> T {
    if byte_offset % E::BYTE_SIZE == 0 {
        let element: &dyn Any = &elements[byte_offset / E::BYTE_SIZE];
        if let Some(&value) = element.downcast_ref::<T>() {
            return value;
        }
    }

    let first = byte_offset / E::BYTE_SIZE;
    let end = (byte_offset + T::BYTE_SIZE + E::BYTE_SIZE - 1) / E::BYTE_SIZE;
    let bytes = element_bytes(&elements[first .. end]);

    T::read_le(&bytes[byte_offset - first * E::BYTE_SIZE ..])
}

/// Write a value starting at the specified byte offset of the elements,
/// leaving all other bytes of the overlapped elements untouched.
/// Panics if the value exceeds the slice, so callers check the bounds first.
#[inline]
pub(crate) fn write_value<E: Element, T: Element>(elements: &mut [E], byte_offset: usize, value: T) {
    if byte_offset % E::BYTE_SIZE == 0 {
        let element: &mut dyn Any = &mut elements[byte_offset / E::BYTE_SIZE];
        if let Some(target) = element.downcast_mut::<T>() {
            *target = value;
            return;
        }
    }

    let first = byte_offset / E::BYTE_SIZE;
    let end = (byte_offset + T::BYTE_SIZE + E::BYTE_SIZE - 1) / E::BYTE_SIZE;
    let elements = &mut elements[first .. end];

    let mut bytes = element_bytes(elements);
    value.write_le(&mut bytes[byte_offset - first * E::BYTE_SIZE ..]);

    for (index, element) in elements.iter_mut().enumerate() {
        *element = E::read_le(&bytes[index * E::BYTE_SIZE ..]);
    }
}

fn element_bytes<E: Element>(elements: &[E]) -> SmallVec<[u8; 64]> {
    let mut bytes: SmallVec<[u8; 64]> = smallvec![0_u8; elements.len() * E::BYTE_SIZE];

    for (index, element) in elements.iter().enumerate() {
        element.write_le(&mut bytes[index * E::BYTE_SIZE ..]);
    }

    bytes
}


/// Check that a value of `T` at `byte_offset` lies within a row of `row_bytes` bytes.
fn check_bounds<T: Element>(byte_offset: usize, row_bytes: usize) -> UnitResult {
    if byte_offset.checked_add(T::BYTE_SIZE).map_or(true, |end| end > row_bytes) {
        return Err(Error::out_of_bounds(format!(
            "access of {} bytes at byte offset {} exceeds the row size of {} bytes",
            T::BYTE_SIZE, byte_offset, row_bytes
        )));
    }

    Ok(())
}

/// Check a raw access of `T` at `byte_offset` in a row of `row_bytes` bytes.
fn check_raw_access<T: Element>(kind: StorageKind, byte_offset: usize, row_bytes: usize) -> UnitResult {
    check_bounds::<T>(byte_offset, row_bytes)?;

    if kind == StorageKind::GenericElement && byte_offset % T::ALIGNMENT != 0 {
        return Err(Error::Misaligned { offset: byte_offset, alignment: T::ALIGNMENT });
    }

    Ok(())
}


/// The raw elements of a single row, for reading bit-exact values.
/// This is what custom format getters operate on.
#[derive(Clone, Copy, Debug)]
pub struct RawRow<'r, E: Element> {
    elements: &'r [E],
    index: usize,
    kind: StorageKind,
    working_color_space: WorkingColorSpace,
}

/// The raw elements of a single row, for reading and writing bit-exact values.
/// This is what custom format setters operate on.
#[derive(Debug)]
pub struct RawRowMut<'r, E: Element> {
    elements: &'r mut [E],
    index: usize,
    kind: StorageKind,
    working_color_space: WorkingColorSpace,
}

impl<'r, E: Element> RawRow<'r, E> {
    pub(crate) fn new(elements: &'r [E], index: usize, kind: StorageKind, working_color_space: WorkingColorSpace) -> Self {
        Self { elements, index, kind, working_color_space }
    }

    /// The y coordinate of this row.
    pub fn index(&self) -> usize { self.index }

    /// The color space that grayscale conversion and blending should use.
    pub fn working_color_space(&self) -> WorkingColorSpace { self.working_color_space }

    /// The elements of this row, including padding.
    pub fn elements(&self) -> &'r [E] { self.elements }

    /// The size of this row in bytes, including padding.
    pub fn byte_size(&self) -> usize { self.elements.len() * E::BYTE_SIZE }

    /// Read a little-endian value at the specified byte offset of this row.
    pub fn read<T: Element>(&self, byte_offset: usize) -> Result<T> {
        check_raw_access::<T>(self.kind, byte_offset, self.byte_size())?;
        Ok(read_value(self.elements, byte_offset))
    }

    /// Read a pixel value of a known format. Needs no alignment, only the bounds are checked.
    #[inline]
    pub(crate) fn read_pixel<T: Element>(&self, byte_offset: usize) -> Result<T> {
        check_bounds::<T>(byte_offset, self.byte_size())?;
        Ok(read_value(self.elements, byte_offset))
    }
}

impl<'r, E: Element> RawRowMut<'r, E> {
    pub(crate) fn new(elements: &'r mut [E], index: usize, kind: StorageKind, working_color_space: WorkingColorSpace) -> Self {
        Self { elements, index, kind, working_color_space }
    }

    /// A read-only view of this row.
    pub fn as_raw_row(&self) -> RawRow<'_, E> {
        RawRow::new(&*self.elements, self.index, self.kind, self.working_color_space)
    }

    /// The y coordinate of this row.
    pub fn index(&self) -> usize { self.index }

    /// The color space that grayscale conversion and blending should use.
    pub fn working_color_space(&self) -> WorkingColorSpace { self.working_color_space }

    /// The elements of this row, including padding.
    pub fn elements_mut(&mut self) -> &mut [E] { &mut *self.elements }

    /// The size of this row in bytes, including padding.
    pub fn byte_size(&self) -> usize { self.elements.len() * E::BYTE_SIZE }

    /// Read a little-endian value at the specified byte offset of this row.
    pub fn read<T: Element>(&self, byte_offset: usize) -> Result<T> {
        self.as_raw_row().read(byte_offset)
    }

    /// Write a little-endian value at the specified byte offset of this row.
    pub fn write<T: Element>(&mut self, byte_offset: usize, value: T) -> UnitResult {
        check_raw_access::<T>(self.kind, byte_offset, self.byte_size())?;
        write_value(&mut *self.elements, byte_offset, value);
        Ok(())
    }

    #[inline]
    pub(crate) fn read_pixel<T: Element>(&self, byte_offset: usize) -> Result<T> {
        check_bounds::<T>(byte_offset, self.byte_size())?;
        Ok(read_value(&*self.elements, byte_offset))
    }

    /// Write a pixel value of a known format. Needs no alignment, only the bounds are checked.
    #[inline]
    pub(crate) fn write_pixel<T: Element>(&mut self, byte_offset: usize, value: T) -> UnitResult {
        check_bounds::<T>(byte_offset, self.byte_size())?;
        write_value(&mut *self.elements, byte_offset, value);
        Ok(())
    }
}


/// Provides buffers for self-allocated bitmap data,
/// and takes them back when the bitmap data is disposed.
pub trait BufferPool<E: Element>: Send + Sync {

    /// A buffer of exactly `length` zeroed elements.
    /// Bitmap creation fails if the buffer is shorter.
    fn rent(&self, length: usize) -> Vec<E>;

    /// Take back a buffer previously rented from this pool.
    /// Called exactly once per rented buffer.
    fn give_back(&self, buffer: Vec<E>);
}

/// A thread-safe buffer pool that keeps a bounded number of returned buffers for reuse.
pub struct SharedBufferPool<E: Element> {
    free: Mutex<Vec<Vec<E>>>,
    max_retained: usize,
    rented: AtomicUsize,
    returned: AtomicUsize,
}

impl<E: Element> SharedBufferPool<E> {

    /// A pool that keeps at most `max_retained` returned buffers.
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_retained,
            rented: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
        }
    }

    /// A pool wrapped in an `Arc`, ready to be used as `Allocation::Pooled`.
    pub fn shared(max_retained: usize) -> Arc<Self> {
        Arc::new(Self::new(max_retained))
    }

    /// How many buffers were rented so far.
    pub fn rented(&self) -> usize { self.rented.load(Ordering::Relaxed) }

    /// How many buffers were given back so far.
    pub fn returned(&self) -> usize { self.returned.load(Ordering::Relaxed) }

    /// How many buffers are currently kept for reuse.
    pub fn retained(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<E: Element> BufferPool<E> for SharedBufferPool<E> {
    fn rent(&self, length: usize) -> Vec<E> {
        self.rented.fetch_add(1, Ordering::Relaxed);

        let reused = {
            let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
            let position = free.iter().position(|buffer| buffer.capacity() >= length);
            position.map(|position| free.swap_remove(position))
        };

        match reused {
            Some(mut buffer) => {
                log::trace!("reusing pooled buffer of capacity {} for {} elements", buffer.capacity(), length);
                buffer.clear();
                buffer.resize(length, E::ZERO);
                buffer
            },

            None => {
                log::debug!("allocating pooled buffer of {} elements", length);
                vec![E::ZERO; length]
            },
        }
    }

    fn give_back(&self, buffer: Vec<E>) {
        self.returned.fetch_add(1, Ordering::Relaxed);

        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_retained {
            log::debug!("returned buffer of {} elements to the pool", buffer.len());
            free.push(buffer);
        }
        else {
            log::warn!("buffer pool is full, dropping returned buffer of {} elements", buffer.len());
        }
    }
}

impl<E: Element> fmt::Debug for SharedBufferPool<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("SharedBufferPool")
            .field("max_retained", &self.max_retained)
            .field("rented", &self.rented())
            .field("returned", &self.returned())
            .finish()
    }
}


/// Where self-allocated bitmap data gets its buffer from.
#[derive(Clone)]
pub enum Allocation<E: Element> {

    /// A new vector, dropped on dispose.
    Heap,

    /// A buffer rented from the pool, given back on dispose.
    Pooled(Arc<dyn BufferPool<E>>),
}

impl<E: Element> Default for Allocation<E> {
    fn default() -> Self { Allocation::Heap }
}

impl<E: Element> fmt::Debug for Allocation<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allocation::Heap => formatter.write_str("Heap"),
            Allocation::Pooled(_) => formatter.write_str("Pooled"),
        }
    }
}


/// The memory of a bitmap and who owns it.
pub(crate) enum Backing<'a, E: Element> {
    Heap(Vec<E>),
    Pooled { buffer: Vec<E>, pool: Arc<dyn BufferPool<E>> },
    Wrapped(&'a mut [E]),
    Disposed,
}

impl<'a, E: Element> Backing<'a, E> {
    pub(crate) fn allocate(length: usize, allocation: &Allocation<E>) -> Result<Self> {
        match allocation {
            Allocation::Heap => Ok(Backing::Heap(vec![E::ZERO; length])),

            Allocation::Pooled(pool) => {
                let buffer = pool.rent(length);

                if buffer.len() < length {
                    let rented = buffer.len();
                    pool.give_back(buffer);

                    return Err(Error::invalid(format!(
                        "buffer pool returned {} elements, but {} were requested", rented, length
                    )));
                }

                Ok(Backing::Pooled { buffer, pool: pool.clone() })
            },
        }
    }

    pub(crate) fn elements(&self) -> Result<&[E]> {
        match self {
            Backing::Heap(buffer) | Backing::Pooled { buffer, .. } => Ok(buffer),
            Backing::Wrapped(buffer) => Ok(buffer),
            Backing::Disposed => Err(Error::Disposed),
        }
    }

    pub(crate) fn elements_mut(&mut self) -> Result<&mut [E]> {
        match self {
            Backing::Heap(buffer) | Backing::Pooled { buffer, .. } => Ok(buffer),
            Backing::Wrapped(buffer) => Ok(buffer),
            Backing::Disposed => Err(Error::Disposed),
        }
    }

    /// How a buffer of a compatible bitmap should be allocated.
    pub(crate) fn allocation(&self) -> Allocation<E> {
        match self {
            Backing::Pooled { pool, .. } => Allocation::Pooled(pool.clone()),
            _ => Allocation::Heap,
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        matches!(self, Backing::Disposed)
    }

    /// Give the memory back, if it came from a pool. Returns whether anything was released.
    pub(crate) fn release(&mut self) -> bool {
        match std::mem::replace(self, Backing::Disposed) {
            Backing::Pooled { buffer, pool } => {
                log::debug!("returning buffer of {} elements to pool", buffer.len());
                pool.give_back(buffer);
                true
            },

            Backing::Heap(_) | Backing::Wrapped(_) => true,
            Backing::Disposed => false,
        }
    }
}
