//! Allocation strategies.
//!
//! Every array records the strategy it was created with in its own header and
//! replays it for every later grow, shrink and release. A strategy is the
//! classic allocate / reallocate / release triple, expressed as the
//! [`RawAlloc`] trait.
//!
//! - [`Global`]: the platform allocator (`std::alloc`). This is the default.
//! - [`MemFuncs`]: three plain function pointers, for callers that want to
//!   plug in an allocator without writing a type.
//! - `&S` and `Rc<S>` forward to `S`, so several arrays can share one
//!   stateful strategy (a counting allocator, an allocator that injects
//!   failures) while each still owns its copy of the handle.
//!
//! # Examples
//!
//! ```
//! use std::alloc::Layout;
//! use darray::alloc::{MemFuncs, RawAlloc};
//!
//! let funcs = MemFuncs::SYSTEM;
//! let layout = Layout::from_size_align(64, 8).unwrap();
//! let block = funcs.allocate(layout).unwrap();
//! unsafe { funcs.release(block, layout) };
//! ```

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::rc::Rc;

/// An allocate / reallocate / release triple.
///
/// # Safety
///
/// Implementors must behave like a conforming allocator:
///
/// - `allocate` returns a block valid for `layout`, or `None` with no side
///   effects on any existing block.
/// - `reallocate` returns a block valid for `new_size` bytes at
///   `old.align()` whose first `min(old.size(), new_size)` bytes equal those
///   of the old block, or `None` leaving the old block untouched and still
///   owned by the caller.
/// - `release` accepts any block previously returned by this strategy (or a
///   clone of it) together with the layout it currently has.
///
/// The engine never passes a zero-sized layout.
pub unsafe trait RawAlloc {
    /// Allocates a block for `layout`.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Resizes `ptr`, which currently has layout `old`, to `new_size` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated by this strategy with layout `old`, and
    /// `new_size` must be non-zero and not overflow `isize` when rounded up to
    /// `old.align()`.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>>;

    /// Returns `ptr` to the strategy.
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated by this strategy with `layout`, and must
    /// not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The platform allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() != 0);
        // SAFETY: the engine never requests zero-sized blocks.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded from the caller's contract.
        NonNull::new(unsafe { alloc::realloc(ptr.as_ptr(), old, new_size) })
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// A strategy made of three function pointers.
///
/// A null return from `alloc` or `realloc` means failure.
#[derive(Debug, Clone, Copy)]
pub struct MemFuncs {
    /// Allocates a block for a layout.
    pub alloc: fn(Layout) -> *mut u8,
    /// Resizes a block; arguments are the block, its current layout and the
    /// new size in bytes.
    pub realloc: unsafe fn(*mut u8, Layout, usize) -> *mut u8,
    /// Releases a block with its current layout.
    pub free: unsafe fn(*mut u8, Layout),
}

impl MemFuncs {
    /// The triple backed by `std::alloc`.
    pub const SYSTEM: MemFuncs = MemFuncs {
        alloc: system_alloc,
        realloc: system_realloc,
        free: system_free,
    };
}

impl Default for MemFuncs {
    fn default() -> Self {
        MemFuncs::SYSTEM
    }
}

fn system_alloc(layout: Layout) -> *mut u8 {
    // SAFETY: `MemFuncs` is only driven by the engine, which never asks
    // for zero-sized blocks.
    unsafe { alloc::alloc(layout) }
}

unsafe fn system_realloc(ptr: *mut u8, old: Layout, new_size: usize) -> *mut u8 {
    unsafe { alloc::realloc(ptr, old, new_size) }
}

unsafe fn system_free(ptr: *mut u8, layout: Layout) {
    unsafe { alloc::dealloc(ptr, layout) }
}

unsafe impl RawAlloc for MemFuncs {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        NonNull::new((self.alloc)(layout))
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        NonNull::new(unsafe { (self.realloc)(ptr.as_ptr(), old, new_size) })
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (self.free)(ptr.as_ptr(), layout) }
    }
}

unsafe impl<S: RawAlloc + ?Sized> RawAlloc for &S {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        unsafe { (**self).reallocate(ptr, old, new_size) }
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).release(ptr, layout) }
    }
}

unsafe impl<S: RawAlloc + ?Sized> RawAlloc for Rc<S> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        unsafe { (**self).reallocate(ptr, old, new_size) }
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).release(ptr, layout) }
    }
}
