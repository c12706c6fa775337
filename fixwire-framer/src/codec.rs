/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! [`WireCodec`] adapts the same BodyLength-driven boundary rules as
//! [`crate::framer::StreamFramer`] to the `tokio_util` [`Decoder`]/[`Encoder`]
//! interface, for callers that consume messages through `FramedRead` instead
//! of push-driven dispatch. Checksum verification is optional and off the
//! framing path: a mismatch rejects the message after it is fully delimited.

use crate::framer::{COMMON_PREFIX_LENGTH, MIN_CHECKSUM_SIZE, START_OF_BODY_LENGTH};
use bytes::{BufMut, BytesMut};
use fixwire_ascii::read;
use fixwire_ascii::{EQUALS, SOH};
use fixwire_core::error::{FrameError, WireError};
use tokio_util::codec::{Decoder, Encoder};

/// Stream codec delimiting FIX messages by BodyLength.
#[derive(Debug, Clone)]
pub struct WireCodec {
    /// Maximum accepted message size in bytes.
    max_message_size: usize,
    /// Whether to verify the tag 10 trailer against message content.
    validate_checksum: bool,
}

impl WireCodec {
    /// Creates a codec with a 1 MiB size limit and checksum validation on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: 1024 * 1024,
            validate_checksum: true,
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets whether to verify checksums.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for WireCodec {
    type Item = BytesMut;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < START_OF_BODY_LENGTH + 1 {
            return Ok(None);
        }

        if src[COMMON_PREFIX_LENGTH] != b'9' {
            return Err(FrameError::InvalidBodyLengthTag {
                index: COMMON_PREFIX_LENGTH,
            }
            .into());
        }
        if src[COMMON_PREFIX_LENGTH + 1] != EQUALS {
            return Err(FrameError::InvalidBodyLengthTag {
                index: COMMON_PREFIX_LENGTH + 1,
            }
            .into());
        }

        let Some(end_of_body_length) =
            read::scan_bytes(src, START_OF_BODY_LENGTH + 1, src.len(), SOH)
        else {
            return Ok(None);
        };
        let body_length =
            read::natural_u32(&src[..], START_OF_BODY_LENGTH, end_of_body_length)? as usize;

        let end_of_body_length_field = end_of_body_length + 1;
        let earliest_checksum_end = end_of_body_length_field + body_length + MIN_CHECKSUM_SIZE;

        if earliest_checksum_end > self.max_message_size {
            return Err(FrameError::BufferExhausted {
                needed: earliest_checksum_end,
                capacity: self.max_message_size,
            }
            .into());
        }
        if earliest_checksum_end > src.len() {
            src.reserve(earliest_checksum_end - src.len());
            return Ok(None);
        }

        let Some(last_byte) = read::scan_bytes(src, earliest_checksum_end - 1, src.len(), SOH)
        else {
            return Ok(None);
        };
        let total_length = last_byte + 1;

        if self.validate_checksum {
            let checksum_field_start = end_of_body_length_field + body_length;
            let declared =
                read::natural_u32(&src[..], checksum_field_start + 3, last_byte)? as u8;
            let calculated = read::checksum(&src[..], 0, checksum_field_start);
            if calculated != declared {
                return Err(FrameError::ChecksumMismatch {
                    calculated,
                    declared,
                }
                .into());
            }
        }

        Ok(Some(src.split_to(total_length)))
    }
}

impl Encoder<&[u8]> for WireCodec {
    type Error = WireError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(item);
        Ok(())
    }
}

impl Encoder<BytesMut> for WireCodec {
    type Error = WireError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixwire_ascii::MessageBuilder;

    fn heartbeat(seq: u64) -> BytesMut {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "0");
        builder.put_uint(34, seq);
        builder.finish()
    }

    #[test]
    fn test_decode_complete_message() {
        let mut codec = WireCodec::new();
        let message = heartbeat(1);
        let mut buf = message.clone();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, message);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete() {
        let mut codec = WireCodec::new();
        let message = heartbeat(1);
        let mut buf = BytesMut::from(&message[..message.len() - 5]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), message.len() - 5);
    }

    #[test]
    fn test_decode_back_to_back() {
        let mut codec = WireCodec::new();
        let first = heartbeat(1);
        let second = heartbeat(2);
        let mut buf = first.clone();
        buf.extend_from_slice(&second);

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), first);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), second);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_invalid_body_length_tag() {
        let mut codec = WireCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.4\x017=5\x0135=0\x0110=000\x01"[..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            WireError::Frame(FrameError::InvalidBodyLengthTag { .. })
        ));
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut codec = WireCodec::new();
        let mut message = heartbeat(1);
        let len = message.len();
        // Corrupt one checksum digit.
        message[len - 2] = if message[len - 2] == b'0' { b'1' } else { b'0' };

        let err = codec.decode(&mut message).unwrap_err();
        assert!(matches!(
            err,
            WireError::Frame(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_skips_checksum_when_disabled() {
        let mut codec = WireCodec::new().with_checksum_validation(false);
        let mut message = heartbeat(1);
        let len = message.len();
        message[len - 2] = if message[len - 2] == b'0' { b'1' } else { b'0' };

        assert!(codec.decode(&mut message).unwrap().is_some());
    }

    #[test]
    fn test_decode_message_too_large() {
        let mut codec = WireCodec::new().with_max_message_size(32);
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "D");
        builder.put_str(58, &"x".repeat(64));
        let mut buf = builder.finish();

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            WireError::Frame(FrameError::BufferExhausted { .. })
        ));
    }

    #[test]
    fn test_encode_is_passthrough() {
        let mut codec = WireCodec::new();
        let message = heartbeat(3);
        let mut dst = BytesMut::new();

        codec.encode(&message[..], &mut dst).unwrap();
        assert_eq!(dst, message);
    }
}
