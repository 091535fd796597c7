//! Pull-based byte sources for delimiter reads.
//!
//! [`DString::getdelim`](crate::DString::getdelim) reads one byte at a time
//! from a [`ByteSource`]. Every [`BufRead`] is one, so slices, cursors,
//! buffered files and locked stdin all work directly.

use std::io::{self, BufRead};

/// A stream that yields one byte per call.
pub trait ByteSource {
    /// Returns the next byte, or `None` at end of stream.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<R: BufRead + ?Sized> ByteSource for R {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let byte = match self.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if byte.is_some() {
                self.consume(1);
            }
            return Ok(byte);
        }
    }
}

/// Where a delimiter read stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// Stop after consuming this byte. It is not stored.
    Byte(u8),
    /// Read until the stream ends.
    EndOfStream,
}

impl From<u8> for Delimiter {
    fn from(byte: u8) -> Self {
        Delimiter::Byte(byte)
    }
}
