/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Error types for the FixWire gateway wire engine.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all FixWire operations.

use thiserror::Error;

/// Result type alias using [`WireError`] as the error type.
pub type Result<T> = std::result::Result<T, WireError>;

/// Top-level error type for all FixWire operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// Error in a field-level codec operation.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Error while framing an inbound byte stream.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Error while replaying logged messages.
    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),

    /// I/O error from underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from ASCII field encoding and decoding.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// A byte outside the expected alphabet was found while parsing a number.
    #[error("'{}' is not a valid digit at index {index}", *value as char)]
    NumberFormat {
        /// The offending byte.
        value: u8,
        /// Buffer index of the offending byte.
        index: usize,
    },

    /// Buffer capacity exceeded during encoding.
    #[error("buffer overflow: need {needed} bytes, have {available}")]
    BufferOverflow {
        /// Bytes needed to complete encoding.
        needed: usize,
        /// Bytes available in buffer.
        available: usize,
    },

    /// A value does not fit in the fixed-width field requested by the caller.
    #[error("value {value} does not fit in {width} ascii digits")]
    ValueOutOfRange {
        /// The value that was being encoded.
        value: u64,
        /// The requested fixed digit width.
        width: usize,
    },

    /// A timestamp field did not match the FIX UTC timestamp layout.
    #[error("malformed utc timestamp at offset {offset}")]
    MalformedTimestamp {
        /// Buffer offset where the timestamp starts.
        offset: usize,
    },
}

/// Errors raised while framing an inbound FIX byte stream.
///
/// Every variant here is fatal for the connection: the framer performs no
/// resynchronization heuristics, because restarting mid-stream risks silent
/// misparsing. Partial-data conditions are not errors and never surface.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Incoming data would exceed the configured buffer capacity before a
    /// message boundary was found.
    #[error("frame buffer exhausted: need {needed} bytes, capacity {capacity}")]
    BufferExhausted {
        /// Bytes the buffer would need to hold.
        needed: usize,
        /// Configured buffer capacity.
        capacity: usize,
    },

    /// The byte at the expected body-length tag position is not `9=`.
    ///
    /// The stream is desynchronized and the connection must be treated as
    /// corrupted.
    #[error("expected body length tag 9= at index {index}")]
    InvalidBodyLengthTag {
        /// Buffer index where the tag was expected.
        index: usize,
    },

    /// The trailer checksum did not match the message content.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Checksum computed over the message bytes.
        calculated: u8,
        /// Checksum declared in the tag 10 trailer.
        declared: u8,
    },

    /// A field inside the message prefix failed to parse.
    #[error("malformed field: {0}")]
    Codec(#[from] CodecError),
}

/// Errors raised by the replay engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// Publication claim attempts were exhausted under sustained
    /// back-pressure; the replay request is abandoned.
    #[error("publication back-pressured after {attempts} claim attempts")]
    BackPressureExhausted {
        /// Number of claim attempts made.
        attempts: usize,
    },

    /// The requested sequence range cannot be replayed.
    #[error("invalid replay range: begin {begin_seq_no}, end {end_seq_no:?}")]
    InvalidRange {
        /// Requested begin sequence number.
        begin_seq_no: u64,
        /// Requested end sequence number, `None` meaning most-recent.
        end_seq_no: Option<u64>,
    },

    /// A logged entry or the resend request itself failed header parsing.
    #[error("malformed message: {0}")]
    Codec(#[from] CodecError),

    /// A required header field was missing from a message.
    #[error("missing header field: tag {tag}")]
    MissingHeaderField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// The durable log query failed.
    #[error("log query failed: {0}")]
    Query(String),
}
