// Common test utilities for integration tests
//
// Strategies shared by the integration tests: one that counts every call and
// one that can be told to refuse blocks.

#![allow(dead_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use darray::{Global, RawAlloc};

/// Counts calls and live blocks, forwarding to the platform allocator.
#[derive(Debug, Default)]
pub struct Counting {
    pub allocs: Cell<usize>,
    pub reallocs: Cell<usize>,
    pub releases: Cell<usize>,
}

impl Counting {
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn live(&self) -> usize {
        self.allocs.get() - self.releases.get()
    }
}

unsafe impl RawAlloc for Counting {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.allocs.set(self.allocs.get() + 1);
        Global.allocate(layout)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        self.reallocs.set(self.reallocs.get() + 1);
        unsafe { Global.reallocate(ptr, old, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.releases.set(self.releases.get() + 1);
        unsafe { Global.release(ptr, layout) }
    }
}

/// Refuses allocations and reallocations while `failing` is set.
#[derive(Debug, Default)]
pub struct Failing {
    pub failing: Cell<bool>,
    pub refused: Cell<usize>,
}

impl Failing {
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn arm(&self) {
        self.failing.set(true);
    }

    pub fn disarm(&self) {
        self.failing.set(false);
    }

    fn refuse(&self) -> bool {
        if self.failing.get() {
            self.refused.set(self.refused.get() + 1);
        }
        self.failing.get()
    }
}

unsafe impl RawAlloc for Failing {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.refuse() {
            return None;
        }
        Global.allocate(layout)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if self.refuse() {
            return None;
        }
        unsafe { Global.reallocate(ptr, old, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { Global.release(ptr, layout) }
    }
}
