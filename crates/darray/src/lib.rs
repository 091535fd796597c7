//! Growable arrays and strings over a single header-prefixed allocation.
//!
//! This crate provides:
//!
//! - **[`DArray`]**: a growable array of plain-data elements. Length,
//!   capacity, element size and the allocation strategy live in a header
//!   right before element 0, and the array itself is one pointer wide.
//! - **Allocation strategies**: every array carries the [`RawAlloc`] it was
//!   created with and uses it for every later resize and for its release.
//! - **[`DString`]**: a zero-terminated byte string built on `DArray<u8>`
//!   with formatted construction, search, replace, trimming and delimiter
//!   reads (requires the `text` feature, on by default).
//!
//! Operations that can fail return [`Result`]. The only failures are the
//! strategy refusing a block, a size that does not fit the address space,
//! and, for strings, stream and formatting errors. A failed call leaves the
//! instance as it was.
//!
//! Block relocations are logged at trace level and refused allocations at
//! debug level through `darray_log`; set `DARRAY_LOG=trace` and call
//! [`darray_log::init_from_env`] to see them.

pub mod alloc;
mod array;
pub mod error;
pub mod factory;
pub mod raw;

#[cfg(feature = "text")]
pub mod source;
#[cfg(feature = "text")]
pub mod string;

pub use alloc::{Global, MemFuncs, RawAlloc};
pub use error::{Error, Result};
pub use factory::{ArrayFactory, CapacityPolicy};
pub use raw::DArray;

#[cfg(feature = "text")]
pub use source::{ByteSource, Delimiter};
#[cfg(feature = "text")]
pub use string::DString;
