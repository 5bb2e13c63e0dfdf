//! Parcel byte codec.
//!
//! Outgoing payloads are built append-only with a [`ParcelBuilder`]. Incoming frames are
//! wrapped in a [`Parcel`], a read cursor over shared [`Bytes`] consumed front to back.
//!
//! # Layout
//!
//! - Integers are 32-bit signed, little-endian.
//! - Strings are a 32-bit unit count `n` followed by `n` UTF-16LE code units and a null
//!   terminator unit. When content plus terminator would be an odd number of units, one
//!   extra null unit pads it to an even count. A length of `-1` encodes "no string".
//!
//! Reads never truncate silently: a read that needs more bytes than remain fails with
//! [`ParcelError::Truncated`] and leaves the cursor where it was.
//!
//! # Example
//! ```rust
//! use rilctl::parcel::{Parcel, ParcelBuilder};
//!
//! let mut out = ParcelBuilder::new();
//! out.write_i32(7);
//! out.write_string("Carrier");
//!
//! let mut parcel = Parcel::from(out.into_bytes());
//! assert_eq!(parcel.read_i32().unwrap(), 7);
//! assert_eq!(parcel.read_string().unwrap().as_deref(), Some("Carrier"));
//! ```
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

const INT_SIZE: usize = size_of::<i32>();
const UNIT_SIZE: usize = size_of::<u16>();
const NULL_STRING_LENGTH: i32 = -1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParcelError {
    #[error("truncated frame: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("invalid string length {0}")]
    InvalidLength(i32),

    #[error("string is not valid UTF-16")]
    InvalidText,
}

/// How the cursor advances past a string's terminator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StringLayout {
    /// Skip exactly one terminator unit after the content.
    #[default]
    Unpadded,
    /// Skip the terminator and the padding unit that keeps the total unit count even.
    Aligned,
}

/// Append-only writer for outgoing payloads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParcelBuilder {
    buf: BytesMut,
}

impl ParcelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn write_string(&mut self, value: &str) {
        let units: Vec<u16> = value.encode_utf16().collect();
        let stored = (units.len() + 1).next_multiple_of(2);

        self.buf.reserve(INT_SIZE + stored * UNIT_SIZE);
        self.write_i32(units.len() as i32);
        for unit in &units {
            self.buf.put_u16_le(*unit);
        }
        self.buf.put_bytes(0, (stored - units.len()) * UNIT_SIZE);
    }

    pub fn write_null_string(&mut self) {
        self.write_i32(NULL_STRING_LENGTH);
    }

    /// Writes a count followed by each string.
    pub fn write_string_list(&mut self, values: &[&str]) {
        self.write_i32(values.len() as i32);
        for value in values {
            self.write_string(value);
        }
    }
}

/// Read cursor over a received frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Parcel {
    buf: Bytes,
    pos: usize,
}

impl From<Bytes> for Parcel {
    fn from(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }
}

impl From<Vec<u8>> for Parcel {
    fn from(buf: Vec<u8>) -> Self {
        Self::from(Bytes::from(buf))
    }
}

impl Parcel {
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the frame.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn read_i32(&mut self) -> Result<i32, ParcelError> {
        Ok(self.take(INT_SIZE)?.get_i32_le())
    }

    /// The next `size` bytes, sharing the frame's storage.
    pub fn read_raw(&mut self, size: usize) -> Result<Bytes, ParcelError> {
        self.take(size)
    }

    pub fn skip(&mut self, size: usize) -> Result<(), ParcelError> {
        self.take(size).map(|_| ())
    }

    /// Reads a string, advancing past its content and a single terminator unit.
    ///
    /// Padding written after an even-length string is *not* skipped; see
    /// [`Parcel::read_string_aligned`] for the padded variant.
    pub fn read_string(&mut self) -> Result<Option<String>, ParcelError> {
        self.read_string_as(StringLayout::Unpadded)
    }

    /// Reads a string, advancing past its terminator and any even-count padding.
    pub fn read_string_aligned(&mut self) -> Result<Option<String>, ParcelError> {
        self.read_string_as(StringLayout::Aligned)
    }

    pub fn read_string_as(&mut self, layout: StringLayout) -> Result<Option<String>, ParcelError> {
        let start = self.pos;
        let result = self.decode_string(layout);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn decode_string(&mut self, layout: StringLayout) -> Result<Option<String>, ParcelError> {
        let length = self.read_i32()?;
        if length == NULL_STRING_LENGTH {
            return Ok(None);
        }
        if length < 0 {
            return Err(ParcelError::InvalidLength(length));
        }

        let units = length as usize;
        let stored = match layout {
            StringLayout::Unpadded => units + 1,
            StringLayout::Aligned => (units + 1).next_multiple_of(2),
        };

        let mut bytes = self.take(stored * UNIT_SIZE)?;
        let content = (0..units)
            .map(|_| bytes.get_u16_le())
            .collect::<Vec<u16>>();

        String::from_utf16(&content)
            .map(Some)
            .map_err(|_| ParcelError::InvalidText)
    }

    fn take(&mut self, size: usize) -> Result<Bytes, ParcelError> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(ParcelError::Truncated {
                needed: size,
                remaining,
            });
        }

        let start = self.pos;
        self.pos += size;
        Ok(self.buf.slice(start..self.pos))
    }
}
