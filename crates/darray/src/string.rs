//! Growable byte strings on top of [`DArray<u8>`].
//!
//! A [`DString`] is a byte array whose length always counts exactly one
//! trailing zero byte. That byte is present and last after every operation,
//! including failed ones, so [`DString::as_bytes_with_nul`] can be handed to
//! anything that expects a zero-terminated buffer.
//!
//! Inputs described as "zero-terminated" accept any `AsRef<[u8]>` and end at
//! their first zero byte, or at the end of the slice if there is none. That
//! covers `&str`, `&[u8]`, `CStr::to_bytes_with_nul()` and other strings.
//!
//! # Examples
//!
//! ```
//! use darray::{dformat, DString};
//!
//! let mut s = DString::from_cstr("Hello, World!")?;
//! s.replace_all_case("world", "darray")?;
//! s.concat_fmt(format_args!(" x{}", 3))?;
//! assert_eq!(s, "Hello, darray! x3");
//! assert_eq!(s.text_len() + 1, s.length());
//!
//! let t = dformat!("{}-{}", 1, 2)?;
//! assert_eq!(t.as_bytes_with_nul(), b"1-2\0");
//! # Ok::<(), darray::Error>(())
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::Utf8Error;

use darray_log::debug;

use crate::alloc::{Global, RawAlloc};
use crate::error::{Error, Result};
use crate::raw::DArray;
use crate::source::{ByteSource, Delimiter};

/// A growable, zero-terminated byte string.
pub struct DString<A: RawAlloc = Global> {
    buf: DArray<u8, A>,
}

impl DString<Global> {
    /// Creates an empty string: length 1, just the terminator.
    pub fn new() -> Result<Self> {
        Self::new_in(Global)
    }

    /// Creates a string holding `src` up to its first zero byte.
    pub fn from_cstr(src: impl AsRef<[u8]>) -> Result<Self> {
        Self::from_cstr_in(src, Global)
    }

    /// Creates a copy of `src`.
    pub fn from_dstr<B: RawAlloc>(src: &DString<B>) -> Result<Self> {
        Self::from_dstr_in(src, Global)
    }

    /// Renders `args` into a new string. See [`DString::from_fmt_in`].
    pub fn from_fmt(args: fmt::Arguments<'_>) -> Result<Self> {
        Self::from_fmt_in(args, Global)
    }
}

impl<A: RawAlloc> DString<A> {
    /// Creates an empty string bound to `alloc`.
    pub fn new_in(alloc: A) -> Result<Self> {
        // A freshly created array reads as zero, which is the terminator.
        Ok(DString {
            buf: DArray::create_in(1, alloc)?,
        })
    }

    /// Creates a string holding `src` up to its first zero byte, bound to
    /// `alloc`.
    pub fn from_cstr_in(src: impl AsRef<[u8]>, alloc: A) -> Result<Self> {
        Self::from_bytes_in(until_nul(src.as_ref()), alloc)
    }

    /// Creates a copy of `src` bound to `alloc`.
    ///
    /// The byte count comes from `src`'s length, so interior zero bytes are
    /// copied too.
    pub fn from_dstr_in<B: RawAlloc>(src: &DString<B>, alloc: A) -> Result<Self> {
        Self::from_bytes_in(src.as_bytes(), alloc)
    }

    /// Renders `args` into a new string bound to `alloc`.
    ///
    /// Rendering runs twice: once to measure, once into a block sized for
    /// the measured text. A `Display` impl that fails, or that renders a
    /// different number of bytes the second time, yields [`Error::Format`].
    pub fn from_fmt_in(args: fmt::Arguments<'_>, alloc: A) -> Result<Self> {
        let size = measure(args)?;
        let count = size.checked_add(1).ok_or(Error::CapacityOverflow { elements: size })?;
        let mut buf = DArray::<u8, A>::create_in(count, alloc)?;
        render_into(&mut buf[..size], args)?;
        Ok(DString { buf })
    }

    fn from_bytes_in(bytes: &[u8], alloc: A) -> Result<Self> {
        let mut buf = DArray::<u8, A>::create_in(bytes.len() + 1, alloc)?;
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(DString { buf })
    }

    /// Empties the string, keeping its block.
    pub fn reassign_empty(&mut self) {
        self.buf.truncate(1);
        self.buf[0] = 0;
    }

    /// Replaces the contents with `src` up to its first zero byte, reusing
    /// the block when it is large enough. On failure the string is unchanged.
    pub fn reassign_cstr(&mut self, src: impl AsRef<[u8]>) -> Result<()> {
        self.assign_bytes(until_nul(src.as_ref()))
    }

    /// Replaces the contents with a copy of `src`. On failure the string is
    /// unchanged.
    pub fn reassign_dstr<B: RawAlloc>(&mut self, src: &DString<B>) -> Result<()> {
        self.assign_bytes(src.as_bytes())
    }

    /// Replaces the contents with the rendering of `args`.
    ///
    /// If the measuring pass fails or the block cannot grow, the string is
    /// unchanged. If the second pass fails or renders a different number of
    /// bytes than were measured, the string is left empty.
    pub fn reassign_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let size = measure(args)?;
        self.reserve_total(size)?;
        self.reassign_empty();
        self.append_rendered(args, size)
    }

    fn assign_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve_total(bytes.len())?;
        self.reassign_empty();
        self.buf.insert_slice(0, bytes)
    }

    /// Makes room for `text_len` content bytes plus the terminator without
    /// touching the contents.
    fn reserve_total(&mut self, text_len: usize) -> Result<()> {
        let total = text_len
            .checked_add(1)
            .ok_or(Error::CapacityOverflow { elements: text_len })?;
        self.buf.reserve(total.saturating_sub(self.buf.len()))
    }

    /// Number of content bytes, excluding the terminator. O(1).
    #[inline]
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.buf.len() - 1
    }

    /// Number of bytes including the terminator.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if the string has no content bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_len() == 0
    }

    /// Number of bytes the block holds without relocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The strategy this string was created with.
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Content bytes, without the terminator.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.text_len()]
    }

    /// Content bytes followed by the terminator.
    #[inline]
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf
    }

    /// Pointer to the first byte of a zero-terminated buffer. Invalidated by
    /// any call that may grow the string.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.buf.as_ptr()
    }

    /// The content as UTF-8.
    pub fn to_str(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Appends one byte.
    pub fn concat_char(&mut self, byte: u8) -> Result<()> {
        let at = self.text_len();
        self.buf.insert(at, byte)
    }

    /// Appends `src` up to its first zero byte.
    pub fn concat_cstr(&mut self, src: impl AsRef<[u8]>) -> Result<()> {
        self.append_bytes(until_nul(src.as_ref()))
    }

    /// Appends every content byte of `src`.
    pub fn concat_dstr<B: RawAlloc>(&mut self, src: &DString<B>) -> Result<()> {
        self.append_bytes(src.as_bytes())
    }

    /// Appends the rendering of `args`.
    ///
    /// The text is measured first and room for it reserved, then rendered in
    /// place. On any failure the string is unchanged.
    pub fn concat_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let size = measure(args)?;
        self.buf.reserve(size)?;
        self.append_rendered(args, size)
    }

    /// The old terminator slot becomes the first new byte and a new
    /// terminator follows the last one.
    fn append_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let at = self.text_len();
        self.buf.insert_slice(at, bytes)
    }

    /// Renders `args`, already measured at `size` bytes, after the current
    /// content. The block must already have room for it.
    fn append_rendered(&mut self, args: fmt::Arguments<'_>, size: usize) -> Result<()> {
        let start = self.text_len();
        let old_len = self.buf.len();
        self.buf.resize(old_len + size)?;

        if let Err(err) = render_into(&mut self.buf[start..start + size], args) {
            debug!("rendering of {size} measured bytes failed; rolling back");
            self.buf.truncate(old_len);
            self.buf[start] = 0;
            return Err(err);
        }
        // `resize` zeroed the new tail, so the last byte is the terminator.
        debug_assert_eq!(self.buf.last(), Some(&0));
        Ok(())
    }

    /// Lexicographic comparison with `other` up to its first zero byte.
    ///
    /// Returns a negative, zero or positive value like `strcmp`: the
    /// difference of the first differing bytes, compared unsigned.
    #[must_use]
    pub fn compare(&self, other: impl AsRef<[u8]>) -> i32 {
        compare_bytes(self.as_bytes(), other.as_ref(), |b| b)
    }

    /// As [`DString::compare`], after folding ASCII letters to lower case on
    /// both sides.
    #[must_use]
    pub fn compare_case(&self, other: impl AsRef<[u8]>) -> i32 {
        compare_bytes(self.as_bytes(), other.as_ref(), |b| b.to_ascii_lowercase())
    }

    /// Byte offset of the first occurrence of `needle`. An empty needle is
    /// found at offset 0.
    ///
    /// Like [`DString::compare`], both sides end at their first zero byte,
    /// so content after an interior zero is not searched.
    #[must_use]
    pub fn find(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        find_bytes(until_nul(self.as_bytes()), until_nul(needle.as_ref()), false)
    }

    /// As [`DString::find`], ignoring ASCII case.
    #[must_use]
    pub fn find_case(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        find_bytes(until_nul(self.as_bytes()), until_nul(needle.as_ref()), true)
    }

    /// Replaces every non-overlapping occurrence of `from` with `to`, left
    /// to right.
    ///
    /// Occurrences are located in the original text, so a replacement that
    /// contains `from` is never matched again. The whole growth is reserved
    /// before the first splice; on failure the string is unchanged. An empty
    /// `from` does nothing.
    pub fn replace_all(&mut self, from: impl AsRef<[u8]>, to: impl AsRef<[u8]>) -> Result<()> {
        self.replace_matches(until_nul(from.as_ref()), until_nul(to.as_ref()), false)
    }

    /// As [`DString::replace_all`], matching `from` without regard to ASCII
    /// case.
    pub fn replace_all_case(
        &mut self,
        from: impl AsRef<[u8]>,
        to: impl AsRef<[u8]>,
    ) -> Result<()> {
        self.replace_matches(until_nul(from.as_ref()), until_nul(to.as_ref()), true)
    }

    fn replace_matches(&mut self, needle: &[u8], replacement: &[u8], fold: bool) -> Result<()> {
        if needle.is_empty() {
            return Ok(());
        }

        let mut matches = Vec::new();
        let mut pos = 0;
        while let Some(offset) = find_bytes(&self.as_bytes()[pos..], needle, fold) {
            matches.push(pos + offset);
            pos += offset + needle.len();
        }
        if matches.is_empty() {
            return Ok(());
        }

        if replacement.len() > needle.len() {
            let growth = (replacement.len() - needle.len())
                .checked_mul(matches.len())
                .ok_or(Error::CapacityOverflow {
                    elements: usize::MAX,
                })?;
            self.buf.reserve(growth)?;
        }

        // Right to left, so earlier offsets stay valid. Each splice fits in
        // the reserved block and cannot fail.
        for &at in matches.iter().rev() {
            self.buf.remove_range(at, needle.len());
            self.buf.insert_slice(at, replacement)?;
        }
        Ok(())
    }

    /// Lower-cases ASCII letters in place.
    pub fn transform_lower(&mut self) {
        let len = self.text_len();
        self.buf[..len].make_ascii_lowercase();
    }

    /// Upper-cases ASCII letters in place.
    pub fn transform_upper(&mut self) {
        let len = self.text_len();
        self.buf[..len].make_ascii_uppercase();
    }

    /// Replaces the contents with bytes read from `src` up to `delim`.
    ///
    /// The string is emptied first, then filled one byte at a time. A
    /// [`Delimiter::Byte`] is consumed but not stored; if the stream ends
    /// before it is seen the read fails with [`Error::StreamExhausted`] and
    /// the bytes read so far stay in the string. [`Delimiter::EndOfStream`]
    /// reads the whole stream.
    pub fn getdelim<S>(&mut self, delim: Delimiter, src: &mut S) -> Result<()>
    where
        S: ByteSource + ?Sized,
    {
        self.reassign_empty();
        loop {
            match src.next_byte()? {
                Some(byte) if delim == Delimiter::Byte(byte) => return Ok(()),
                Some(byte) => self.concat_char(byte)?,
                None if delim == Delimiter::EndOfStream => return Ok(()),
                None => return Err(Error::StreamExhausted),
            }
        }
    }

    /// Reads one line from `src`; the `'\n'` is consumed but not stored.
    pub fn getline<S>(&mut self, src: &mut S) -> Result<()>
    where
        S: ByteSource + ?Sized,
    {
        self.getdelim(Delimiter::Byte(b'\n'), src)
    }

    /// Removes leading and trailing whitespace: space, `\t`, `\n`, `\v`,
    /// `\f` and `\r`.
    pub fn trim(&mut self) {
        let text = self.as_bytes();
        let leading = text.iter().take_while(|&&b| is_space(b)).count();
        let trailing = text[leading..]
            .iter()
            .rev()
            .take_while(|&&b| is_space(b))
            .count();

        let len = self.text_len();
        self.buf.remove_range(len - trailing, trailing);
        self.buf.remove_range(0, leading);
    }
}

impl<A: RawAlloc + Clone> DString<A> {
    /// Copies the string into a new block bound to a clone of its strategy.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(DString {
            buf: self.buf.try_clone()?,
        })
    }
}

impl<A: RawAlloc + Clone> Clone for DString<A> {
    fn clone(&self) -> Self {
        DString {
            buf: self.buf.clone(),
        }
    }
}

impl<A: RawAlloc> AsRef<[u8]> for DString<A> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: RawAlloc> fmt::Write for DString<A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl<A: RawAlloc> fmt::Display for DString<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<A: RawAlloc> fmt::Debug for DString<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}

impl<A: RawAlloc, B: RawAlloc> PartialEq<DString<B>> for DString<A> {
    fn eq(&self, other: &DString<B>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: RawAlloc> Eq for DString<A> {}

impl<A: RawAlloc> PartialEq<str> for DString<A> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: RawAlloc> PartialEq<&str> for DString<A> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: RawAlloc> PartialOrd for DString<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: RawAlloc> Ord for DString<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl<A: RawAlloc> Hash for DString<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

/// Renders format arguments into a new [`DString`].
///
/// ```
/// let s = darray::dformat!("{} {}", 5, "foo")?;
/// assert_eq!(s, "5 foo");
/// # Ok::<(), darray::Error>(())
/// ```
#[macro_export]
macro_rules! dformat {
    ($($arg:tt)*) => {
        $crate::DString::from_fmt(::std::format_args!($($arg)*))
    };
}

/// `bytes` up to, not including, its first zero byte.
fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

fn compare_bytes(lhs: &[u8], rhs: &[u8], fold: impl Fn(u8) -> u8) -> i32 {
    let lhs = until_nul(lhs).iter().chain(&[0]);
    let rhs = until_nul(rhs).iter().chain(&[0]);
    for (&a, &b) in lhs.zip(rhs) {
        let (a, b) = (fold(a), fold(b));
        if a != b || a == 0 {
            return i32::from(a) - i32::from(b);
        }
    }
    0
}

fn find_bytes(haystack: &[u8], needle: &[u8], fold: bool) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|window| {
        if fold {
            window.eq_ignore_ascii_case(needle)
        } else {
            window == needle
        }
    })
}

/// Byte-counting sink for the measuring pass.
struct Counter(usize);

impl fmt::Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 = self.0.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

fn measure(args: fmt::Arguments<'_>) -> Result<usize> {
    let mut counter = Counter(0);
    fmt::write(&mut counter, args)?;
    Ok(counter.0)
}

/// Sink that refuses to write past the end of its slice.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        let dest = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

/// Renders `args` into `buf`, which must end up exactly full.
fn render_into(buf: &mut [u8], args: fmt::Arguments<'_>) -> Result<()> {
    let mut writer = SliceWriter { buf, pos: 0 };
    fmt::write(&mut writer, args)?;
    if writer.pos != writer.buf.len() {
        return Err(Error::Format);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fmt::Write as _;

    fn assert_terminated<A: RawAlloc>(s: &DString<A>) {
        assert_eq!(s.text_len() + 1, s.length());
        assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
        assert!(s.capacity() >= s.length());
    }

    #[test]
    fn test_new_is_just_terminator() {
        let s = DString::new().unwrap();
        assert_eq!(s.length(), 1);
        assert_eq!(s.text_len(), 0);
        assert!(s.is_empty());
        assert_eq!(s.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn test_from_cstr_stops_at_nul() {
        let s = DString::from_cstr(b"abc\0def").unwrap();
        assert_eq!(s, "abc");
        assert_terminated(&s);

        let whole = DString::from_cstr("plain").unwrap();
        assert_eq!(whole.text_len(), 5);
    }

    #[test]
    fn test_from_dstr_keeps_interior_nul() {
        let mut src = DString::from_cstr("ab").unwrap();
        src.concat_char(0).unwrap();
        src.concat_char(b'c').unwrap();

        let copy = DString::from_dstr(&src).unwrap();
        assert_eq!(copy.as_bytes(), b"ab\0c");
        assert_eq!(copy.length(), src.length());
    }

    #[test]
    fn test_from_fmt() {
        let s = DString::from_fmt(format_args!("{} {}", 5, "foo")).unwrap();
        assert_eq!(s, "5 foo");
        assert_eq!(s.length(), 6);
        assert_terminated(&s);

        let empty = dformat!("").unwrap();
        assert!(empty.is_empty());
    }

    /// Renders differently every time it is formatted.
    struct Shifty(Cell<usize>);

    impl fmt::Display for Shifty {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let n = self.0.get();
            self.0.set(n + 1);
            for _ in 0..=n {
                f.write_str("x")?;
            }
            Ok(())
        }
    }

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_inconsistent_rendering_is_format_error() {
        let shifty = Shifty(Cell::new(0));
        let err = DString::from_fmt(format_args!("{shifty}")).unwrap_err();
        assert_eq!(err, Error::Format);

        assert_eq!(dformat!("{}", Broken).unwrap_err(), Error::Format);
    }

    #[test]
    fn test_concat_fmt_rolls_back() {
        let mut s = DString::from_cstr("keep").unwrap();
        let shifty = Shifty(Cell::new(0));
        assert_eq!(s.concat_fmt(format_args!("{shifty}")), Err(Error::Format));
        assert_eq!(s, "keep");
        assert_terminated(&s);

        s.concat_fmt(format_args!("-{}", 42)).unwrap();
        assert_eq!(s, "keep-42");
    }

    #[test]
    fn test_reassign_variants_reuse_block() {
        let mut s = DString::from_cstr("a fairly long initial string").unwrap();
        let ptr = s.as_ptr();

        s.reassign_cstr("short").unwrap();
        assert_eq!(s, "short");
        assert_eq!(s.as_ptr(), ptr);

        let other = DString::from_cstr("other").unwrap();
        s.reassign_dstr(&other).unwrap();
        assert_eq!(s, "other");

        s.reassign_fmt(format_args!("{} {}", 5, "foo")).unwrap();
        assert_eq!(s, "5 foo");
        assert_eq!(s.as_ptr(), ptr);

        s.reassign_empty();
        assert!(s.is_empty());
        assert_terminated(&s);
    }

    #[test]
    fn test_reassign_fmt_measure_failure_leaves_text() {
        let mut s = DString::from_cstr("before").unwrap();
        assert_eq!(s.reassign_fmt(format_args!("{}", Broken)), Err(Error::Format));
        assert_eq!(s, "before");
        assert_terminated(&s);
    }

    #[test]
    fn test_find_stops_at_interior_nul() {
        let mut s = DString::from_cstr("ab").unwrap();
        s.concat_char(0).unwrap();
        s.concat_cstr("cd").unwrap();
        assert_eq!(s.text_len(), 5);

        assert_eq!(s.find("b"), Some(1));
        assert_eq!(s.find("cd"), None);
        assert_eq!(s.find_case("CD"), None);
        assert_eq!(s.compare("ab"), 0);
    }

    #[test]
    fn test_reassign_fmt_failure_leaves_empty() {
        let mut s = DString::from_cstr("before").unwrap();
        let shifty = Shifty(Cell::new(0));
        assert_eq!(s.reassign_fmt(format_args!("{shifty}")), Err(Error::Format));
        assert!(s.is_empty());
        assert_terminated(&s);
    }

    #[test]
    fn test_concat_family() {
        let mut s = DString::new().unwrap();
        s.concat_char(b'a').unwrap();
        s.concat_cstr("bc\0ignored").unwrap();
        let tail = DString::from_cstr("de").unwrap();
        s.concat_dstr(&tail).unwrap();
        write!(s, "{}", 'f').unwrap();
        assert_eq!(s, "abcdef");
        assert_eq!(s.length(), 7);
        assert_terminated(&s);
    }

    #[test]
    fn test_compare_signs() {
        let s = DString::from_cstr("abc").unwrap();
        assert_eq!(s.compare("abc"), 0);
        assert!(s.compare("abd") < 0);
        assert!(s.compare("abb") > 0);
        assert!(s.compare("ab") > 0);
        assert!(s.compare("abcd") < 0);
        assert_eq!(s.compare("abc\0zzz"), 0);
        assert_eq!(s.compare("abd"), i32::from(b'c') - i32::from(b'd'));
    }

    #[test]
    fn test_compare_is_unsigned() {
        let s = DString::from_cstr([0xFFu8]).unwrap();
        assert!(s.compare("a") > 0);
    }

    #[test]
    fn test_compare_case() {
        let s = DString::from_cstr("Hello").unwrap();
        assert_eq!(s.compare_case("hELLO"), 0);
        assert!(s.compare_case("help") < 0);
        assert_ne!(s.compare("hello"), 0);
    }

    #[test]
    fn test_find() {
        let s = DString::from_cstr("Hello, World!").unwrap();
        assert_eq!(s.find("World"), Some(7));
        assert_eq!(s.find("world"), None);
        assert_eq!(s.find_case("world"), Some(7));
        assert_eq!(s.find("Hello, World!!"), None);
        assert_eq!(s.find(""), Some(0));
        assert_eq!(s.find("o"), Some(4));
    }

    #[test]
    fn test_replace_all_case_scenario() {
        let mut s = DString::from_cstr("Hello, World! Hello again.").unwrap();
        s.replace_all_case("world", "foo").unwrap();
        assert_eq!(s, "Hello, foo! Hello again.");
        s.replace_all_case("Hello", "foo").unwrap();
        assert_eq!(s, "foo, foo! foo again.");
        assert_terminated(&s);
    }

    #[test]
    fn test_replace_all_does_not_rescan_replacement() {
        let mut s = DString::from_cstr("aXa").unwrap();
        s.replace_all("a", "aa").unwrap();
        assert_eq!(s, "aaXaa");

        let mut s = DString::from_cstr("aaaa").unwrap();
        s.replace_all("aa", "b").unwrap();
        assert_eq!(s, "bb");
    }

    #[test]
    fn test_replace_all_edges() {
        let mut s = DString::from_cstr("abc").unwrap();
        s.replace_all("", "zzz").unwrap();
        assert_eq!(s, "abc");
        s.replace_all("q", "zzz").unwrap();
        assert_eq!(s, "abc");
        s.replace_all("b", "").unwrap();
        assert_eq!(s, "ac");
        s.replace_all("ac", "").unwrap();
        assert!(s.is_empty());
        assert_terminated(&s);
    }

    #[test]
    fn test_transforms_leave_terminator() {
        let mut s = DString::from_cstr("MiXeD 123").unwrap();
        s.transform_lower();
        assert_eq!(s, "mixed 123");
        s.transform_upper();
        assert_eq!(s, "MIXED 123");
        assert_terminated(&s);
    }

    #[test]
    fn test_getline_reads_lines() {
        let mut input: &[u8] = b"first\nsecond\nlast";
        let mut s = DString::from_cstr("stale").unwrap();

        s.getline(&mut input).unwrap();
        assert_eq!(s, "first");
        s.getline(&mut input).unwrap();
        assert_eq!(s, "second");

        assert_eq!(s.getline(&mut input), Err(Error::StreamExhausted));
        assert_eq!(s, "last");
        assert_terminated(&s);
    }

    #[test]
    fn test_getdelim_end_of_stream() {
        let mut input: &[u8] = b"a,b\nc";
        let mut s = DString::new().unwrap();
        s.getdelim(Delimiter::Byte(b','), &mut input).unwrap();
        assert_eq!(s, "a");
        s.getdelim(Delimiter::EndOfStream, &mut input).unwrap();
        assert_eq!(s, "b\nc");
    }

    #[test]
    fn test_trim() {
        let mut s = DString::from_cstr(" \t\nfoo \t\n").unwrap();
        s.trim();
        assert_eq!(s, "foo");
        assert_eq!(s.length(), 4);

        let mut blank = DString::from_cstr("\x0b\x0c \r").unwrap();
        blank.trim();
        assert!(blank.is_empty());

        let mut inner = DString::from_cstr("a b").unwrap();
        inner.trim();
        assert_eq!(inner, "a b");
        assert_terminated(&inner);
    }

    #[test]
    fn test_display_and_debug() {
        let s = DString::from_cstr("say \"hi\"").unwrap();
        assert_eq!(s.to_string(), "say \"hi\"");
        assert_eq!(format!("{s:?}"), "\"say \\\"hi\\\"\"");
        assert_eq!(format!("{:>4}", DString::from_cstr("ab").unwrap()), "  ab");
        assert_eq!(s.to_str().unwrap(), "say \"hi\"");
    }

    #[test]
    fn test_ordering() {
        let a = DString::from_cstr("apple").unwrap();
        let b = DString::from_cstr("banana").unwrap();
        assert!(a < b);
        assert_eq!(a.clone(), a);
    }
}
