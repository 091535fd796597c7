//! Sequence operations on [`DArray`].
//!
//! Everything here is built on the length, capacity and reserve primitives of
//! the block engine in [`crate::raw`]. Operations that add elements reserve
//! first and write afterwards, so when they fail nothing has been written and
//! the array is exactly as it was. Operations that remove elements never
//! relocate.
//!
//! Indices are checked: an out-of-range index is a caller bug and panics, the
//! same way slice indexing does.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr;

use bytemuck::Pod;

use crate::alloc::RawAlloc;
use crate::error::Result;
use crate::raw::DArray;

impl<T: Pod, A: RawAlloc> DArray<T, A> {
    /// Appends `value`.
    ///
    /// Grows the block when it is full. On failure `value` is not stored and
    /// the array is unchanged.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<()> {
        let len = self.len();
        if len == self.capacity() {
            self.reserve(1)?;
        }
        // SAFETY: `len < capacity` after the reserve.
        unsafe {
            self.as_mut_ptr().add(len).write(value);
            self.set_len(len + 1);
        }
        Ok(())
    }

    /// Removes and returns the last element, or `None` if the array is
    /// empty. Never relocates.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let len = self.len().checked_sub(1)?;
        // SAFETY: element `len` was valid before the length shrinks past it.
        unsafe {
            self.set_len(len);
            Some(self.as_ptr().add(len).read())
        }
    }

    /// Inserts `value` at `index`, shifting `[index, len)` one slot right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.len();
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        self.reserve(1)?;
        // SAFETY: capacity covers `len + 1` elements and the tail move stays
        // inside it.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            ptr::copy(slot, slot.add(1), len - index);
            slot.write(value);
            self.set_len(len + 1);
        }
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting `(index, len)`
    /// one slot left. Never relocates.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len();
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );
        // SAFETY: `index < len`, and the tail move stays inside `[0, len)`.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.set_len(len - 1);
            value
        }
    }

    /// Inserts a copy of `src` at `index` with one tail move and one bulk
    /// copy. An empty `src` is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_slice(&mut self, index: usize, src: &[T]) -> Result<()> {
        let len = self.len();
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        let count = src.len();
        if count == 0 {
            return Ok(());
        }
        self.reserve(count)?;
        // SAFETY: capacity covers `len + count`; `src` cannot alias the
        // array because `self` is borrowed mutably.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            ptr::copy(slot, slot.add(count), len - index);
            ptr::copy_nonoverlapping(src.as_ptr(), slot, count);
            self.set_len(len + count);
        }
        Ok(())
    }

    /// Removes `count` elements starting at `index` with one tail move.
    /// `count == 0` is a no-op. Never relocates.
    ///
    /// # Panics
    ///
    /// Panics if `index + count > len`.
    pub fn remove_range(&mut self, index: usize, count: usize) {
        let len = self.len();
        let end = index.checked_add(count);
        assert!(
            end.is_some_and(|end| end <= len),
            "removal range {index}+{count} out of bounds for len {len}"
        );
        if count == 0 {
            return;
        }
        // SAFETY: `[index, index + count)` lies inside `[0, len)`.
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            ptr::copy(slot.add(count), slot, len - index - count);
            self.set_len(len - count);
        }
    }

    /// Appends a copy of `src`.
    pub fn concat(&mut self, src: &[T]) -> Result<()> {
        let len = self.len();
        self.reserve(src.len())?;
        // SAFETY: capacity covers `len + src.len()`; no aliasing, as above.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.as_mut_ptr().add(len), src.len());
            self.set_len(len + src.len());
        }
        Ok(())
    }

    /// Exchanges the elements at `a` and `b`. `a == b` is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b);
    }

    /// Assigns `value` to every element in `[0, len)`.
    #[inline]
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    /// Shortens the array to `len` elements. Does nothing if it is already
    /// shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            // SAFETY: shrinking the length keeps `[0, len)` initialised.
            unsafe { self.set_len(len) }
        }
    }

    /// Removes every element, keeping the capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }
}

impl<T: Pod, A: RawAlloc + Clone> DArray<T, A> {
    /// Copies the array into a new block bound to a clone of its strategy.
    pub fn try_clone(&self) -> Result<Self> {
        Self::from_slice_in(self.as_slice(), self.allocator().clone())
    }
}

impl<T: Pod, A: RawAlloc + Clone> Clone for DArray<T, A> {
    /// # Panics
    ///
    /// Panics if the strategy cannot provide the new block. Use
    /// [`DArray::try_clone`] to handle that case.
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("failed to clone array: {err}"))
    }
}

impl<T: Pod, A: RawAlloc> Deref for DArray<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Pod, A: RawAlloc> DerefMut for DArray<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Pod, A: RawAlloc> AsRef<[T]> for DArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

/// Forward traversal over `[0, len)`. The bound is fixed when the iterator is
/// created, and the borrow keeps the array from changing underneath it.
impl<'a, T: Pod, A: RawAlloc> IntoIterator for &'a DArray<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T: Pod, A: RawAlloc> IntoIterator for &'a mut DArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Pod + fmt::Debug, A: RawAlloc> fmt::Debug for DArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Pod + PartialEq, A: RawAlloc, B: RawAlloc> PartialEq<DArray<T, B>> for DArray<T, A> {
    fn eq(&self, other: &DArray<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Pod + Eq, A: RawAlloc> Eq for DArray<T, A> {}

impl<T: Pod + PartialEq, A: RawAlloc> PartialEq<[T]> for DArray<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Pod + PartialEq, A: RawAlloc, const N: usize> PartialEq<[T; N]> for DArray<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}
