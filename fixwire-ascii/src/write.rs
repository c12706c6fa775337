/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Encode routines for FIX primitive types.
//!
//! Each function writes at an explicit offset and returns the byte count
//! written. Digit generation that cannot know its width in advance runs
//! right-to-left in a stack scratch array and is emitted left-aligned at the
//! caller's offset, so the buffer never holds a transient misaligned form.
//! All writes are bounds-checked up front against the buffer length and fail
//! with [`CodecError::BufferOverflow`] rather than writing partially.

use crate::view::AsciiBuffer;
use crate::{DOT, MINUS, SOH, ZERO};
use fixwire_core::error::CodecError;
use fixwire_core::types::Timestamp;

/// Longest decimal rendering of a u64 magnitude.
const MAX_DIGITS: usize = 20;

#[inline]
fn check_capacity<B: AsciiBuffer + ?Sized>(
    buf: &B,
    offset: usize,
    needed: usize,
) -> Result<(), CodecError> {
    let available = buf.length().saturating_sub(offset);
    if needed > available {
        Err(CodecError::BufferOverflow { needed, available })
    } else {
        Ok(())
    }
}

#[inline]
fn put_slice<B: AsciiBuffer + ?Sized>(buf: &mut B, offset: usize, bytes: &[u8]) {
    for (i, &b) in bytes.iter().enumerate() {
        buf.write_byte(offset + i, b);
    }
}

/// Fills `scratch` right-to-left with the decimal digits of `magnitude` and
/// returns the occupied suffix.
fn format_magnitude(scratch: &mut [u8; MAX_DIGITS], magnitude: u64) -> std::ops::Range<usize> {
    let mut pos = MAX_DIGITS;
    let mut remainder = magnitude;
    loop {
        pos -= 1;
        scratch[pos] = ZERO + (remainder % 10) as u8;
        remainder /= 10;
        if remainder == 0 {
            break;
        }
    }
    pos..MAX_DIGITS
}

/// Writes an unsigned integer at `offset`.
///
/// # Errors
/// `BufferOverflow` if the rendering does not fit.
pub fn put_natural_u64<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    value: u64,
) -> Result<usize, CodecError> {
    let mut itoa_buf = itoa::Buffer::new();
    let rendered = itoa_buf.format(value);
    check_capacity(buf, offset, rendered.len())?;
    put_slice(buf, offset, rendered.as_bytes());
    Ok(rendered.len())
}

/// Writes a signed integer at `offset`.
///
/// # Errors
/// `BufferOverflow` if the rendering does not fit.
pub fn put_int_i64<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    value: i64,
) -> Result<usize, CodecError> {
    let mut itoa_buf = itoa::Buffer::new();
    let rendered = itoa_buf.format(value);
    check_capacity(buf, offset, rendered.len())?;
    put_slice(buf, offset, rendered.as_bytes());
    Ok(rendered.len())
}

/// Writes an unsigned integer zero-padded to exactly `width` digits.
///
/// # Errors
/// `ValueOutOfRange` if `value` needs more than `width` digits,
/// `BufferOverflow` if `width` bytes do not fit at `offset`.
pub fn put_natural_padded<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    width: usize,
    value: u64,
) -> Result<usize, CodecError> {
    check_capacity(buf, offset, width)?;

    let mut remainder = value;
    for i in (0..width).rev() {
        buf.write_byte(offset + i, ZERO + (remainder % 10) as u8);
        remainder /= 10;
    }
    if remainder != 0 {
        return Err(CodecError::ValueOutOfRange { value, width });
    }
    Ok(width)
}

/// Writes a checksum field value: exactly 3 zero-padded digits.
///
/// # Errors
/// `BufferOverflow` if 3 bytes do not fit at `offset`.
#[inline]
pub fn put_checksum<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    value: u8,
) -> Result<usize, CodecError> {
    put_natural_padded(buf, offset, 3, u64::from(value))
}

/// Writes a FIX boolean (`Y`/`N`) at `offset`.
///
/// # Errors
/// `BufferOverflow` if the byte does not fit.
pub fn put_boolean<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    value: bool,
) -> Result<usize, CodecError> {
    check_capacity(buf, offset, 1)?;
    buf.write_byte(offset, if value { b'Y' } else { b'N' });
    Ok(1)
}

/// Writes a single ASCII character at `offset`.
///
/// # Errors
/// `BufferOverflow` if the byte does not fit.
pub fn put_char<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    value: u8,
) -> Result<usize, CodecError> {
    check_capacity(buf, offset, 1)?;
    buf.write_byte(offset, value);
    Ok(1)
}

/// Writes a string's bytes at `offset`.
///
/// # Errors
/// `BufferOverflow` if the bytes do not fit.
pub fn put_ascii<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    value: &str,
) -> Result<usize, CodecError> {
    check_capacity(buf, offset, value.len())?;
    put_slice(buf, offset, value.as_bytes());
    Ok(value.len())
}

/// Writes the SOH field separator at `offset`.
///
/// # Errors
/// `BufferOverflow` if the byte does not fit.
#[inline]
pub fn put_separator<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
) -> Result<usize, CodecError> {
    put_char(buf, offset, SOH)
}

/// Writes a scaled decimal in its shortest correct ASCII form.
///
/// - `scale <= 0`: the mantissa digits followed by `|scale|` trailing zeros.
/// - `scale > 0`: the decimal point sits `scale` digits from the right,
///   left-padded with `0.` and zeros when the digit count is below the
///   scale.
///
/// Satisfies `decimal(put_decimal(m, s)) == (m, s)` for every canonical
/// pair (`s == 0`, or `s > 0` with `m` not divisible by 10).
///
/// # Errors
/// `BufferOverflow` if the rendering does not fit.
pub fn put_decimal<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    mantissa: i64,
    scale: i32,
) -> Result<usize, CodecError> {
    let mut scratch = [0u8; MAX_DIGITS];
    let digits = format_magnitude(&mut scratch, mantissa.unsigned_abs());
    let num_digits = digits.len();
    let digits = &scratch[digits];

    let negative = mantissa < 0;
    let sign_len = usize::from(negative);

    let total = if scale <= 0 {
        sign_len + num_digits + scale.unsigned_abs() as usize
    } else {
        let insertion_point = num_digits as i64 - i64::from(scale);
        if insertion_point > 0 {
            sign_len + num_digits + 1
        } else {
            // "0." plus zero padding between the point and the digits.
            sign_len + 2 + insertion_point.unsigned_abs() as usize + num_digits
        }
    };
    check_capacity(buf, offset, total)?;

    let mut pos = offset;
    if negative {
        buf.write_byte(pos, MINUS);
        pos += 1;
    }

    if scale <= 0 {
        put_slice(buf, pos, digits);
        pos += num_digits;
        for _ in 0..scale.unsigned_abs() {
            buf.write_byte(pos, ZERO);
            pos += 1;
        }
    } else {
        let insertion_point = num_digits as i64 - i64::from(scale);
        if insertion_point > 0 {
            // Point goes inside the digits.
            let split = insertion_point as usize;
            put_slice(buf, pos, &digits[..split]);
            buf.write_byte(pos + split, DOT);
            put_slice(buf, pos + split + 1, &digits[split..]);
            pos += num_digits + 1;
        } else {
            // Zeros between the point and the digits (none when the point
            // goes right before them).
            buf.write_byte(pos, ZERO);
            buf.write_byte(pos + 1, DOT);
            pos += 2;
            for _ in 0..insertion_point.unsigned_abs() {
                buf.write_byte(pos, ZERO);
                pos += 1;
            }
            put_slice(buf, pos, digits);
            pos += num_digits;
        }
    }

    Ok(pos - offset)
}

/// Writes a FIX UTC timestamp with millisecond precision (21 bytes).
///
/// # Errors
/// `BufferOverflow` if 21 bytes do not fit at `offset`.
pub fn put_timestamp_millis<B: AsciiBuffer + ?Sized>(
    buf: &mut B,
    offset: usize,
    timestamp: Timestamp,
) -> Result<usize, CodecError> {
    let rendered = timestamp.format_millis();
    check_capacity(buf, offset, rendered.len())?;
    put_slice(buf, offset, rendered.as_bytes());
    Ok(rendered.len())
}
