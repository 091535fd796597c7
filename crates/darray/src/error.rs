//! Error types for `darray`.
//!
//! Every fallible operation reports through [`Error`]. Whenever one of these
//! is returned, the instance the operation was called on is exactly as it was
//! before the call, unless the operation's documentation says otherwise.
//!
//! Caller contract violations, such as an index past the end, are not errors:
//! they panic.

use std::fmt;
use std::io;

/// Errors that can occur in `darray` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The allocation strategy could not provide a block.
    AllocFailed {
        /// Size in bytes of the block that was requested.
        requested: usize,
    },

    /// The byte size of a block holding the requested number of elements
    /// does not fit in the address space.
    CapacityOverflow {
        /// The element count that was requested.
        elements: usize,
    },

    /// The byte source ended before the delimiter was read.
    StreamExhausted,

    /// The byte source reported an I/O error.
    Io(io::ErrorKind),

    /// Formatted rendering failed, or produced a different number of bytes
    /// than it measured.
    Format,
}

impl Error {
    /// Returns `true` for [`Error::AllocFailed`] and
    /// [`Error::CapacityOverflow`], the two ways a block can fail to grow.
    #[must_use]
    pub fn is_alloc_failure(&self) -> bool {
        matches!(self, Error::AllocFailed { .. } | Error::CapacityOverflow { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocFailed { requested } => {
                write!(f, "Allocation of {requested} bytes failed")
            }
            Error::CapacityOverflow { elements } => {
                write!(f, "Capacity overflow: {elements} elements do not fit in a block")
            }
            Error::StreamExhausted => {
                write!(f, "Stream ended before the delimiter was read")
            }
            Error::Io(kind) => write!(f, "I/O error: {kind}"),
            Error::Format => write!(f, "Formatted rendering failed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.kind())
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::Format
    }
}

/// Result type for `darray` operations.
pub type Result<T> = std::result::Result<T, Error>;
