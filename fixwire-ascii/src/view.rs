/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Minimal byte-buffer capability trait.
//!
//! The codec operates on an explicit `(buffer, offset, length)` view through
//! [`AsciiBuffer`], so any concrete buffer implementation can be decorated
//! with ASCII-aware accessors without inheritance or wrapper types. The
//! decode and encode routines in [`crate::read`] and [`crate::write`] are
//! generic over this trait.

use bytes::BytesMut;

/// Capability trait for raw byte access.
///
/// Implementors only provide byte-level reads and writes; all FIX-aware
/// parsing and formatting is layered on top by the free functions in this
/// crate. Indexing past `length()` follows the semantics of the underlying
/// buffer (a panic for the provided slice-backed implementations); the
/// codec routines bounds-check before writing.
pub trait AsciiBuffer {
    /// Returns the byte at `index`.
    fn read_byte(&self, index: usize) -> u8;

    /// Writes `value` at `index`.
    fn write_byte(&mut self, index: usize, value: u8);

    /// Returns the addressable length of the buffer in bytes.
    fn length(&self) -> usize;
}

impl AsciiBuffer for [u8] {
    #[inline]
    fn read_byte(&self, index: usize) -> u8 {
        self[index]
    }

    #[inline]
    fn write_byte(&mut self, index: usize, value: u8) {
        self[index] = value;
    }

    #[inline]
    fn length(&self) -> usize {
        self.len()
    }
}

impl AsciiBuffer for Vec<u8> {
    #[inline]
    fn read_byte(&self, index: usize) -> u8 {
        self[index]
    }

    #[inline]
    fn write_byte(&mut self, index: usize, value: u8) {
        self[index] = value;
    }

    #[inline]
    fn length(&self) -> usize {
        self.len()
    }
}

impl AsciiBuffer for BytesMut {
    #[inline]
    fn read_byte(&self, index: usize) -> u8 {
        self[index]
    }

    #[inline]
    fn write_byte(&mut self, index: usize, value: u8) {
        self[index] = value;
    }

    #[inline]
    fn length(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> AsciiBuffer for [u8; N] {
    #[inline]
    fn read_byte(&self, index: usize) -> u8 {
        self[index]
    }

    #[inline]
    fn write_byte(&mut self, index: usize, value: u8) {
        self[index] = value;
    }

    #[inline]
    fn length(&self) -> usize {
        N
    }
}
