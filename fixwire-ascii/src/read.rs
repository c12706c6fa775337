/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Decode routines for FIX primitive types.
//!
//! All functions operate on explicit byte ranges of an [`AsciiBuffer`] and
//! allocate nothing, with the documented exception of [`ascii_string`].
//! Parse failures surface immediately as [`CodecError::NumberFormat`] carrying
//! the offending byte and its index.

use crate::view::AsciiBuffer;
use crate::{DOT, MINUS, SPACE, ZERO};
use fixwire_core::error::CodecError;
use fixwire_core::types::{DecimalValue, Timestamp};
use memchr::{memchr, memrchr};

/// Returns the numeric value of the ASCII digit at `index`.
///
/// # Errors
/// `NumberFormat` if the byte is not `'0'..='9'`.
#[inline]
pub fn digit<B: AsciiBuffer + ?Sized>(buf: &B, index: usize) -> Result<u8, CodecError> {
    digit_value(buf.read_byte(index), index)
}

/// Returns true if the byte at `index` is an ASCII digit.
#[inline]
#[must_use]
pub fn is_digit<B: AsciiBuffer + ?Sized>(buf: &B, index: usize) -> bool {
    buf.read_byte(index).is_ascii_digit()
}

#[inline]
fn digit_value(value: u8, index: usize) -> Result<u8, CodecError> {
    if value.is_ascii_digit() {
        Ok(value - ZERO)
    } else {
        Err(CodecError::NumberFormat { value, index })
    }
}

/// Parses an unsigned decimal integer from `[start, end_exclusive)`.
///
/// # Errors
/// `NumberFormat` on an empty range, a non-digit byte, or overflow.
pub fn natural_u64<B: AsciiBuffer + ?Sized>(
    buf: &B,
    start: usize,
    end_exclusive: usize,
) -> Result<u64, CodecError> {
    if start >= end_exclusive {
        return Err(CodecError::NumberFormat {
            value: 0,
            index: start,
        });
    }

    let mut total: u64 = 0;
    for index in start..end_exclusive {
        let value = buf.read_byte(index);
        let d = digit_value(value, index)?;
        total = total
            .checked_mul(10)
            .and_then(|t| t.checked_add(u64::from(d)))
            .ok_or(CodecError::NumberFormat { value, index })?;
    }
    Ok(total)
}

/// Parses an unsigned decimal integer from `[start, end_exclusive)` into a `u32`.
///
/// # Errors
/// `NumberFormat` on an empty range, a non-digit byte, or overflow.
pub fn natural_u32<B: AsciiBuffer + ?Sized>(
    buf: &B,
    start: usize,
    end_exclusive: usize,
) -> Result<u32, CodecError> {
    let value = natural_u64(buf, start, end_exclusive)?;
    u32::try_from(value).map_err(|_| CodecError::NumberFormat {
        value: buf.read_byte(start),
        index: start,
    })
}

/// Parses a signed decimal integer (optional leading `-`) from
/// `[start, end_exclusive)`.
///
/// # Errors
/// `NumberFormat` on an empty range or a non-digit byte after the sign.
pub fn signed_i64<B: AsciiBuffer + ?Sized>(
    buf: &B,
    start: usize,
    end_exclusive: usize,
) -> Result<i64, CodecError> {
    if start >= end_exclusive {
        return Err(CodecError::NumberFormat {
            value: 0,
            index: start,
        });
    }

    let negative = buf.read_byte(start) == MINUS;
    let digits_start = if negative { start + 1 } else { start };
    let magnitude = natural_u64(buf, digits_start, end_exclusive)?;
    let magnitude = i64::try_from(magnitude).map_err(|_| CodecError::NumberFormat {
        value: buf.read_byte(digits_start),
        index: digits_start,
    })?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Reads a FIX boolean (`Y`) at `index`.
#[inline]
#[must_use]
pub fn boolean<B: AsciiBuffer + ?Sized>(buf: &B, index: usize) -> bool {
    buf.read_byte(index) == b'Y'
}

/// Parses a signed, optionally-fractional ASCII number from
/// `[offset, offset + length)` into a [`DecimalValue`].
///
/// The trim rules reproduce standard FIX `Price`/`Qty` decoding:
/// - trailing spaces are dropped;
/// - trailing zero digits are dropped only when a decimal point precedes
///   them within the remaining span, so `"100.00"` decodes to `(100, 0)`
///   while `"100"` keeps its integer zeros as `(100, 0)` and `"1000.100"`
///   decodes to `(10001, 1)`;
/// - leading spaces, an optional `-`, and leading zero digits are dropped;
/// - the scale is the count of digits remaining right of the point.
///
/// # Errors
/// `NumberFormat` on an empty range or a byte outside `0-9`, `-`, `.`,
/// space.
pub fn decimal<B: AsciiBuffer + ?Sized>(
    buf: &B,
    offset: usize,
    length: usize,
) -> Result<DecimalValue, CodecError> {
    if length == 0 {
        return Err(CodecError::NumberFormat {
            value: 0,
            index: offset,
        });
    }

    let mut offset = offset;
    let mut end = offset + length;

    // Throw away trailing spaces.
    while end - 1 > offset && buf.read_byte(end - 1) == SPACE {
        end -= 1;
    }

    // Count the trailing zero run, then drop it only if a decimal point
    // precedes it within the remaining span.
    let mut end_diff = 0;
    {
        let mut index = end - 1;
        while index > offset && buf.read_byte(index) == ZERO {
            end_diff += 1;
            index -= 1;
        }
    }

    let mut is_floating_point = false;
    for index in (offset + 1..end - end_diff).rev() {
        if buf.read_byte(index) == DOT {
            is_floating_point = true;
            break;
        }
    }

    if is_floating_point {
        end -= end_diff;
    }

    // Throw away leading spaces.
    while offset < end && buf.read_byte(offset) == SPACE {
        offset += 1;
    }

    let negative = offset < end && buf.read_byte(offset) == MINUS;
    if negative {
        offset += 1;
    }

    // Throw away leading zeros.
    while offset < end && buf.read_byte(offset) == ZERO {
        offset += 1;
    }

    let mut scale = 0i32;
    let mut value = 0i64;
    for index in offset..end {
        let byte_value = buf.read_byte(index);
        if byte_value == DOT {
            // Number of digits after the dot.
            scale = (end - (index + 1)) as i32;
        } else {
            let d = digit_value(byte_value, index)?;
            value = value * 10 + i64::from(d);
        }
    }

    Ok(DecimalValue::new(if negative { -value } else { value }, scale))
}

/// Parses a FIX UTC timestamp (`YYYYMMDD-HH:MM:SS` or
/// `YYYYMMDD-HH:MM:SS.sss`) from `[offset, offset + length)`.
///
/// # Errors
/// `MalformedTimestamp` if the layout or calendar components are invalid.
pub fn timestamp<B: AsciiBuffer + ?Sized>(
    buf: &B,
    offset: usize,
    length: usize,
) -> Result<Timestamp, CodecError> {
    const SECONDS_LENGTH: usize = 17;
    const MILLIS_LENGTH: usize = 21;

    let malformed = CodecError::MalformedTimestamp { offset };

    if length != SECONDS_LENGTH && length != MILLIS_LENGTH {
        return Err(malformed);
    }
    if buf.read_byte(offset + 8) != b'-'
        || buf.read_byte(offset + 11) != b':'
        || buf.read_byte(offset + 14) != b':'
    {
        return Err(malformed);
    }

    let number =
        |start: usize, end: usize| natural_u32(buf, offset + start, offset + end).map_err(|_| malformed);

    let year = number(0, 4)?;
    let month = number(4, 6)?;
    let day = number(6, 8)?;
    let hour = number(9, 11)?;
    let minute = number(12, 14)?;
    let second = number(15, 17)?;

    let millis = if length == MILLIS_LENGTH {
        if buf.read_byte(offset + 17) != b'.' {
            return Err(malformed);
        }
        number(18, 21)?
    } else {
        0
    };

    Timestamp::from_parts(year as i32, month, day, hour, minute, second, millis).ok_or(malformed)
}

/// Computes the FIX checksum of `[offset, end_exclusive)`: the byte sum
/// modulo 256.
#[must_use]
pub fn checksum<B: AsciiBuffer + ?Sized>(buf: &B, offset: usize, end_exclusive: usize) -> u8 {
    let mut total: u32 = 0;
    for index in offset..end_exclusive {
        total = total.wrapping_add(u32::from(buf.read_byte(index)));
    }
    (total % 256) as u8
}

/// Linear forward search for `terminator` in `[start, end_exclusive)`.
///
/// Returns the index of the first match, or `None` when absent - the
/// not-found case is ordinary control flow for framing, never an error.
#[must_use]
pub fn scan<B: AsciiBuffer + ?Sized>(
    buf: &B,
    start: usize,
    end_exclusive: usize,
    terminator: u8,
) -> Option<usize> {
    (start..end_exclusive).find(|&index| buf.read_byte(index) == terminator)
}

/// Linear backward search for `terminator` in `[start, end_exclusive)`.
///
/// Returns the index of the last match, or `None` when absent.
#[must_use]
pub fn scan_back<B: AsciiBuffer + ?Sized>(
    buf: &B,
    start: usize,
    end_exclusive: usize,
    terminator: u8,
) -> Option<usize> {
    (start..end_exclusive)
        .rev()
        .find(|&index| buf.read_byte(index) == terminator)
}

/// Forward search over a byte slice using `memchr`.
///
/// Fast path for slice-backed buffers; returns an absolute index into the
/// slice.
#[inline]
#[must_use]
pub fn scan_bytes(bytes: &[u8], start: usize, end_exclusive: usize, terminator: u8) -> Option<usize> {
    memchr(terminator, &bytes[start..end_exclusive]).map(|pos| start + pos)
}

/// Backward search over a byte slice using `memrchr`.
#[inline]
#[must_use]
pub fn scan_back_bytes(
    bytes: &[u8],
    start: usize,
    end_exclusive: usize,
    terminator: u8,
) -> Option<usize> {
    memrchr(terminator, &bytes[start..end_exclusive]).map(|pos| start + pos)
}

/// Copies `[offset, offset + length)` into an owned `String`.
///
/// Not at all a performant conversion: don't use this on a critical
/// application path.
#[must_use]
pub fn ascii_string<B: AsciiBuffer + ?Sized>(buf: &B, offset: usize, length: usize) -> String {
    let mut out = String::with_capacity(length);
    for index in offset..offset + length {
        out.push(char::from(buf.read_byte(index)));
    }
    out
}
