/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Whole-message builder for FIX tag=value messages.
//!
//! Fields are appended to a body buffer in call order; [`MessageBuilder::finish`]
//! prepends BeginString (8) and BodyLength (9) and appends the CheckSum (10)
//! trailer, so callers never compute lengths or checksums by hand.

use crate::read;
use crate::{EQUALS, SOH};
use bytes::{BufMut, BytesMut};
use fixwire_core::tags;
use fixwire_core::types::{DecimalValue, Timestamp};

/// Incremental FIX message builder.
///
/// Only the body fields are supplied by the caller; the standard envelope
/// (tags 8, 9 and 10) is derived at [`finish`](Self::finish) time.
#[derive(Debug)]
pub struct MessageBuilder {
    /// Message body, everything between BodyLength and CheckSum.
    body: BytesMut,
    /// BeginString value for tag 8, e.g. "FIX.4.4".
    begin_string: &'static str,
}

impl MessageBuilder {
    /// Creates a builder for the given BeginString.
    #[must_use]
    pub fn new(begin_string: &'static str) -> Self {
        Self::with_capacity(begin_string, 256)
    }

    /// Creates a builder with a pre-sized body buffer.
    #[must_use]
    pub fn with_capacity(begin_string: &'static str, capacity: usize) -> Self {
        Self {
            body: BytesMut::with_capacity(capacity),
            begin_string,
        }
    }

    /// Appends a string-valued field.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a signed integer field.
    #[inline]
    pub fn put_int(&mut self, tag: u32, value: i64) {
        let mut buf = itoa::Buffer::new();
        let rendered = buf.format(value);
        self.put_raw(tag, rendered.as_bytes());
    }

    /// Appends an unsigned integer field.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        let rendered = buf.format(value);
        self.put_raw(tag, rendered.as_bytes());
    }

    /// Appends a boolean field as `Y` or `N`.
    #[inline]
    pub fn put_bool(&mut self, tag: u32, value: bool) {
        self.put_raw(tag, if value { b"Y" } else { b"N" });
    }

    /// Appends a single-character field.
    #[inline]
    pub fn put_char(&mut self, tag: u32, value: char) {
        let mut buf = [0u8; 4];
        let rendered = value.encode_utf8(&mut buf);
        self.put_raw(tag, rendered.as_bytes());
    }

    /// Appends a scaled decimal field in its shortest ASCII form.
    pub fn put_decimal(&mut self, tag: u32, value: DecimalValue) {
        // Sign, 20 mantissa digits, point, and one padding zero per unit of
        // scale covers every rendering, so the write cannot overflow.
        let needed = 23 + value.scale().unsigned_abs() as usize;
        let mut buf = vec![0u8; needed];
        let len = crate::write::put_decimal(
            buf.as_mut_slice(),
            0,
            value.mantissa(),
            value.scale(),
        )
        .unwrap_or(0);
        self.put_raw(tag, &buf[..len]);
    }

    /// Appends a UTC timestamp field with millisecond precision.
    #[inline]
    pub fn put_timestamp(&mut self, tag: u32, value: Timestamp) {
        let rendered = value.format_millis();
        self.put_raw(tag, rendered.as_bytes());
    }

    /// Appends a field with an arbitrary byte value.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        let tag_str = tag_buf.format(tag);

        self.body.put_slice(tag_str.as_bytes());
        self.body.put_u8(EQUALS);
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Finalizes the message: prepends tags 8 and 9, appends tag 10.
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let body_len = self.body.len();

        let mut message = BytesMut::with_capacity(body_len + 32);
        message.put_slice(b"8=");
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(SOH);
        message.put_slice(b"9=");

        let mut len_buf = itoa::Buffer::new();
        message.put_slice(len_buf.format(body_len).as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum = read::checksum(&message, 0, message.len());
        let mut trailer = [0u8; 3];
        // Width 3 always holds a u8, the error arm is unreachable.
        let _ = crate::write::put_checksum(trailer.as_mut_slice(), 0, checksum);

        let mut tag_buf = itoa::Buffer::new();
        message.put_slice(tag_buf.format(tags::CHECK_SUM).as_bytes());
        message.put_u8(EQUALS);
        message.put_slice(&trailer);
        message.put_u8(SOH);

        message
    }

    /// Returns the current body length in bytes.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Clears accumulated fields so the builder can be reused.
    #[inline]
    pub fn clear(&mut self) {
        self.body.clear();
    }
}
