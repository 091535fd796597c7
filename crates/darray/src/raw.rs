//! Header-prefixed blocks: the memory layout and growth engine.
//!
//! A [`DArray`] owns exactly one allocation laid out as
//!
//! ```text
//! +---------+--------+---------+---------+-----+------------------+
//! | padding | header | elem[0] | elem[1] | ... | elem[capacity-1] |
//! +---------+--------+---------+---------+-----+------------------+
//!                    ^
//!                    the array's only field points here
//! ```
//!
//! The header sits at the fixed negative offset `size_of::<Header<A>>()` from
//! element 0 and records the element size, the length, the capacity and the
//! allocation strategy the block was created with. Padding in front of the
//! header is only present when `T` needs stricter alignment than the header.
//!
//! # Growth
//!
//! Default growth picks `max(BASELINE_CAPACITY, ceil(n * 1.3))` for a
//! requested length `n`. The `_exact` variants use `n` itself.
//!
//! # Failure
//!
//! The only recoverable failure is the strategy refusing a block. Every
//! operation here computes and obtains the new block before it touches the
//! header, so a failed call leaves content, length and capacity exactly as
//! they were.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use bytemuck::Pod;
use darray_log::{debug, trace};

use crate::alloc::{Global, RawAlloc};
use crate::error::{Error, Result};

/// Smallest capacity chosen by default growth.
pub const BASELINE_CAPACITY: usize = 10;

/// Numerator of the 1.3 growth factor.
pub const GROWTH_NUMERATOR: usize = 13;

/// Denominator of the 1.3 growth factor.
pub const GROWTH_DENOMINATOR: usize = 10;

/// Capacity chosen by default growth for a block that must hold `len`
/// elements: `max(BASELINE_CAPACITY, ceil(len * 1.3))`.
///
/// Returns `None` if the computation overflows.
///
/// ```
/// use darray::raw::grown_capacity;
///
/// assert_eq!(grown_capacity(0), Some(10));
/// assert_eq!(grown_capacity(10), Some(13));
/// assert_eq!(grown_capacity(11), Some(15));
/// ```
#[must_use]
pub const fn grown_capacity(len: usize) -> Option<usize> {
    let Some(scaled) = len.checked_mul(GROWTH_NUMERATOR) else {
        return None;
    };
    let grown = scaled.div_ceil(GROWTH_DENOMINATOR);
    Some(if grown < BASELINE_CAPACITY {
        BASELINE_CAPACITY
    } else {
        grown
    })
}

/// Metadata stored immediately before element 0.
#[repr(C)]
pub(crate) struct Header<A> {
    /// Size of one element in bytes. Never changes.
    elem_size: usize,
    /// Number of valid elements.
    len: usize,
    /// Number of elements the block can hold.
    cap: usize,
    /// Strategy the block was allocated with.
    alloc: A,
}

/// A growable array of `T` stored after a header in a single block.
///
/// `DArray` is one pointer wide. Operations that may move the block take
/// `&mut self`, so no reference into the old block can outlive a relocation.
///
/// Elements are plain data ([`Pod`]): they are moved and copied bytewise, and
/// slots that become valid without being written (by [`DArray::create`] or a
/// growing [`DArray::resize`]) read as zero.
///
/// # Examples
///
/// ```
/// use darray::DArray;
///
/// let mut values = DArray::<u32>::create(0)?;
/// for i in 0..16 {
///     values.push(i)?;
/// }
/// assert_eq!(values.len(), 16);
/// assert!(values.capacity() >= 16);
/// assert_eq!(values[7], 7);
/// # Ok::<(), darray::Error>(())
/// ```
pub struct DArray<T: Pod, A: RawAlloc = Global> {
    data: NonNull<T>,
    _marker: PhantomData<(T, A)>,
}

// SAFETY: a `DArray` exclusively owns its block, header and strategy
// included, so moving it to another thread moves all of them.
unsafe impl<T: Pod + Send, A: RawAlloc + Send> Send for DArray<T, A> {}

// SAFETY: shared references only read elements and metadata.
unsafe impl<T: Pod + Sync, A: RawAlloc + Sync> Sync for DArray<T, A> {}

impl<T: Pod> DArray<T, Global> {
    /// Creates an array of `count` zeroed elements with default growth
    /// slack, using the platform allocator.
    ///
    /// `count == 0` yields a valid empty array.
    pub fn create(count: usize) -> Result<Self> {
        Self::create_in(count, Global)
    }

    /// Creates an array of `count` zeroed elements whose capacity is exactly
    /// `count`.
    pub fn create_exact(count: usize) -> Result<Self> {
        Self::create_exact_in(count, Global)
    }

    /// Creates an empty array with baseline capacity.
    pub fn new() -> Result<Self> {
        Self::create(0)
    }

    /// Creates an array holding a copy of `src`.
    pub fn from_slice(src: &[T]) -> Result<Self> {
        Self::from_slice_in(src, Global)
    }
}

impl<T: Pod, A: RawAlloc> DArray<T, A> {
    const HEADER_SIZE: usize = mem::size_of::<Header<A>>();

    const BLOCK_ALIGN: usize = if mem::align_of::<T>() > mem::align_of::<Header<A>>() {
        mem::align_of::<T>()
    } else {
        mem::align_of::<Header<A>>()
    };

    /// Distance from the block start to element 0.
    const DATA_OFFSET: usize =
        (Self::HEADER_SIZE + Self::BLOCK_ALIGN - 1) & !(Self::BLOCK_ALIGN - 1);

    /// Creates an array of `count` zeroed elements bound to `alloc`.
    ///
    /// Capacity follows default growth. Every later resize and the final
    /// release go through `alloc`.
    pub fn create_in(count: usize, alloc: A) -> Result<Self> {
        let cap = grown_capacity(count).ok_or(Error::CapacityOverflow { elements: count })?;
        Self::allocate_in(count, cap, alloc)
    }

    /// Creates an array of `count` zeroed elements with capacity exactly
    /// `count`, bound to `alloc`.
    pub fn create_exact_in(count: usize, alloc: A) -> Result<Self> {
        Self::allocate_in(count, count, alloc)
    }

    /// Creates an array holding a copy of `src`, bound to `alloc`.
    pub fn from_slice_in(src: &[T], alloc: A) -> Result<Self> {
        let mut array = Self::create_in(0, alloc)?;
        array.concat(src)?;
        Ok(array)
    }

    fn allocate_in(len: usize, cap: usize, alloc: A) -> Result<Self> {
        debug_assert!(len <= cap);
        let layout = Self::layout_for(cap)?;
        let Some(base) = alloc.allocate(layout) else {
            debug!("allocation of {} bytes refused", layout.size());
            return Err(Error::AllocFailed {
                requested: layout.size(),
            });
        };

        // SAFETY: `base` is valid for `layout`, which holds the header at
        // DATA_OFFSET - HEADER_SIZE and `cap` elements at DATA_OFFSET.
        unsafe {
            let header = base
                .as_ptr()
                .add(Self::DATA_OFFSET - Self::HEADER_SIZE)
                .cast::<Header<A>>();
            header.write(Header {
                elem_size: mem::size_of::<T>(),
                len,
                cap,
                alloc,
            });
            let data = base.as_ptr().add(Self::DATA_OFFSET).cast::<T>();
            data.write_bytes(0, len);

            trace!("allocated block: len {len}, cap {cap}, {} bytes", layout.size());
            Ok(DArray {
                data: NonNull::new_unchecked(data),
                _marker: PhantomData,
            })
        }
    }

    fn layout_for(cap: usize) -> Result<Layout> {
        mem::size_of::<T>()
            .checked_mul(cap)
            .and_then(|bytes| bytes.checked_add(Self::DATA_OFFSET))
            .and_then(|size| Layout::from_size_align(size, Self::BLOCK_ALIGN).ok())
            .ok_or(Error::CapacityOverflow { elements: cap })
    }

    /// Layout of the live block. Valid because it was checked when the block
    /// was obtained.
    fn current_layout(&self) -> Layout {
        let size = Self::DATA_OFFSET + mem::size_of::<T>() * self.capacity();
        // SAFETY: the same size and alignment passed `layout_for` when the
        // block was allocated or last relocated.
        unsafe { Layout::from_size_align_unchecked(size, Self::BLOCK_ALIGN) }
    }

    #[inline]
    fn header_ptr(&self) -> *mut Header<A> {
        // SAFETY: the header lives HEADER_SIZE bytes before element 0 inside
        // the same block.
        unsafe {
            self.data
                .as_ptr()
                .cast::<u8>()
                .sub(Self::HEADER_SIZE)
                .cast::<Header<A>>()
        }
    }

    #[inline]
    fn header(&self) -> &Header<A> {
        // SAFETY: the header is initialised for the whole life of the block.
        unsafe { &*self.header_ptr() }
    }

    #[inline]
    fn block_ptr(&self) -> NonNull<u8> {
        // SAFETY: element 0 is DATA_OFFSET bytes after the block start.
        unsafe { NonNull::new_unchecked(self.data.as_ptr().cast::<u8>().sub(Self::DATA_OFFSET)) }
    }

    /// Number of valid elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.header().len
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the block holds without relocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.header().cap
    }

    /// Size of one element in bytes, as recorded at creation.
    #[inline]
    #[must_use]
    pub fn elem_size(&self) -> usize {
        self.header().elem_size
    }

    /// The strategy this array was created with.
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.header().alloc
    }

    /// Pointer to element 0. Invalidated by any call that relocates.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Mutable pointer to element 0. Invalidated by any call that relocates.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    /// The valid elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: elements `[0, len)` are initialised.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len()) }
    }

    /// The valid elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: elements `[0, len)` are initialised and exclusively borrowed.
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len()) }
    }

    /// Sets the length without touching the elements.
    ///
    /// # Safety
    ///
    /// `new_len` must not exceed the capacity, and elements `[0, new_len)`
    /// must be initialised.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        // SAFETY: exclusive access through `&mut self`.
        unsafe { (*self.header_ptr()).len = new_len }
    }

    /// Moves the block so it holds exactly `new_cap` elements.
    ///
    /// The length is not changed; the caller shrinks it first if needed.
    fn relocate(&mut self, new_cap: usize) -> Result<()> {
        let old_cap = self.capacity();
        let old_layout = self.current_layout();
        let new_layout = Self::layout_for(new_cap)?;
        let old_base = self.block_ptr();
        let header = self.header_ptr();

        // The strategy travels outside the block while the block moves, and
        // is written back into whichever header is live afterwards.
        // SAFETY: the header is initialised; the bytes left behind are
        // overwritten below without being dropped.
        let alloc = ManuallyDrop::new(unsafe { ptr::read(&raw const (*header).alloc) });

        // SAFETY: the block came from this strategy with `old_layout`.
        let moved = unsafe { alloc.reallocate(old_base, old_layout, new_layout.size()) };

        let Some(base) = moved else {
            // SAFETY: the old block is untouched and still ours.
            unsafe { ptr::write(&raw mut (*header).alloc, ManuallyDrop::into_inner(alloc)) };
            debug!(
                "reallocation from {} to {} bytes refused; block left in place",
                old_layout.size(),
                new_layout.size()
            );
            return Err(Error::AllocFailed {
                requested: new_layout.size(),
            });
        };

        // SAFETY: `base` is valid for `new_layout` and carries the old
        // header bytes at the same offset.
        unsafe {
            let data = base.as_ptr().add(Self::DATA_OFFSET).cast::<T>();
            self.data = NonNull::new_unchecked(data);
            let header = self.header_ptr();
            ptr::write(&raw mut (*header).alloc, ManuallyDrop::into_inner(alloc));
            (*header).cap = new_cap;
        }

        trace!(
            "resized block: cap {old_cap} -> {new_cap}, moved: {}",
            base != old_base
        );
        Ok(())
    }

    /// Zeroes elements `[from, to)`, which must lie within capacity.
    fn zero_range(&mut self, from: usize, to: usize) {
        debug_assert!(from <= to && to <= self.capacity());
        // SAFETY: the range is inside the block.
        unsafe { self.data.as_ptr().add(from).write_bytes(0, to - from) }
    }

    /// Sets the length to `new_len`.
    ///
    /// Grows the block with default growth if `new_len` exceeds the capacity;
    /// never shrinks it. New elements read as zero. On failure the array is
    /// unchanged.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len > self.capacity() {
            let new_cap =
                grown_capacity(new_len).ok_or(Error::CapacityOverflow { elements: new_len })?;
            self.relocate(new_cap)?;
        }
        self.set_len_zeroing(new_len);
        Ok(())
    }

    /// Sets the length to `new_len` and the capacity to exactly `new_len`.
    ///
    /// Relocates unless the capacity already equals `new_len`. On failure the
    /// array is unchanged.
    pub fn resize_exact(&mut self, new_len: usize) -> Result<()> {
        if new_len != self.capacity() {
            self.relocate(new_len)?;
        }
        self.set_len_zeroing(new_len);
        Ok(())
    }

    fn set_len_zeroing(&mut self, new_len: usize) {
        let len = self.len();
        if new_len > len {
            self.zero_range(len, new_len);
        }
        // SAFETY: `new_len <= capacity` and `[len, new_len)` was just zeroed.
        unsafe { self.set_len(new_len) }
    }

    /// Ensures room for `additional` more elements without changing the
    /// length.
    ///
    /// Does nothing if the capacity already suffices. Otherwise grows with
    /// default growth computed from `len + additional`. On failure the array
    /// is unchanged.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let len = self.len();
        let needed = len.checked_add(additional).ok_or(Error::CapacityOverflow {
            elements: usize::MAX,
        })?;
        if needed <= self.capacity() {
            return Ok(());
        }
        let new_cap = grown_capacity(needed).ok_or(Error::CapacityOverflow { elements: needed })?;
        self.relocate(new_cap)
    }

    /// Shrinks the capacity to the length.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        let len = self.len();
        if len == self.capacity() {
            return Ok(());
        }
        self.relocate(len)
    }
}

impl<T: Pod, A: RawAlloc> Drop for DArray<T, A> {
    fn drop(&mut self) {
        let layout = self.current_layout();
        let block = self.block_ptr();
        // SAFETY: the strategy is moved out of the header before the block it
        // lives in is released, and dropped afterwards.
        unsafe {
            let alloc = ptr::read(&raw const (*self.header_ptr()).alloc);
            alloc.release(block, layout);
            drop(alloc);
        }
    }
}
