/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! # FixWire ASCII
//!
//! Allocation-free ASCII field codec for FIX tag=value wire data.
//!
//! This crate provides decode and encode routines for the primitive value
//! types FIX carries on the wire: naturals, signed integers, scaled decimals,
//! booleans, UTC timestamps, and checksums.
//!
//! ## Features
//!
//! - **Buffer-generic**: All routines operate on any [`AsciiBuffer`] view
//! - **SIMD-accelerated**: Uses `memchr` for fast delimiter search
//! - **Exact decimals**: `(mantissa, scale)` pairs, no floating point
//!
//! ## Layout
//!
//! - [`view`]: the byte-access capability trait
//! - [`read`]: decode routines, explicit `(offset, length)` addressing
//! - [`write`]: encode routines returning the byte count written
//! - [`builder`]: whole-message assembly with automatic envelope fields

pub mod builder;
pub mod read;
pub mod view;
pub mod write;

pub use builder::MessageBuilder;
pub use view::AsciiBuffer;

/// SOH (Start of Header) field delimiter.
pub const SOH: u8 = 0x01;

/// The `=` separator between a tag and its value.
pub const EQUALS: u8 = b'=';

/// ASCII decimal point.
pub const DOT: u8 = b'.';

/// ASCII minus sign.
pub const MINUS: u8 = b'-';

/// ASCII space, trimmed around numeric values.
pub const SPACE: u8 = b' ';

/// ASCII zero digit.
pub const ZERO: u8 = b'0';
