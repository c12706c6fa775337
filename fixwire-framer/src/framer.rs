/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Push-driven framer for an inbound FIX byte stream.
//!
//! [`StreamFramer`] accumulates arbitrarily-chunked bytes and dispatches each
//! complete message to a [`MessageHandler`] exactly once. Message boundaries
//! come from the BodyLength field alone; the checksum trailer is located but
//! never verified here, so a stream is framed identically regardless of how
//! the transport split it.

use fixwire_ascii::read;
use fixwire_ascii::{EQUALS, SOH};
use fixwire_core::error::FrameError;
use fixwire_core::types::ConnectionId;
use tracing::{trace, warn};

/// Length of the fixed message prefix through the BeginString separator,
/// `8=FIX.4.x` plus its SOH.
pub const COMMON_PREFIX_LENGTH: usize = "8=FIX.4.2 ".len();

/// Offset of the first BodyLength digit from the message start.
pub const START_OF_BODY_LENGTH: usize = COMMON_PREFIX_LENGTH + 2;

/// Smallest possible checksum trailer: separator, `10=`, one digit.
pub const MIN_CHECKSUM_SIZE: usize = " 10=".len() + 1;

/// Receives framed messages from a [`StreamFramer`].
pub trait MessageHandler {
    /// Called once per complete message, with the full bytes from the
    /// leading `8=` through the trailing SOH.
    fn on_message(&mut self, message: &[u8], connection_id: ConnectionId);
}

impl<F: FnMut(&[u8], ConnectionId)> MessageHandler for F {
    fn on_message(&mut self, message: &[u8], connection_id: ConnectionId) {
        self(message, connection_id);
    }
}

/// Reassembles FIX messages from a chunked byte stream.
///
/// The framer owns a fixed-capacity buffer. Bytes of an incomplete message
/// are retained between [`on_data`](Self::on_data) calls and compacted to
/// the front of the buffer, so steady-state framing never allocates.
#[derive(Debug)]
pub struct StreamFramer {
    buffer: Box<[u8]>,
    used: usize,
    connection_id: ConnectionId,
}

impl StreamFramer {
    /// Creates a framer with the given buffer capacity.
    ///
    /// The capacity bounds the largest single message the framer can
    /// reassemble.
    #[must_use]
    pub fn new(capacity: usize, connection_id: ConnectionId) -> Self {
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
            connection_id,
        }
    }

    /// Returns the connection this framer belongs to.
    #[inline]
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the buffer capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of buffered bytes awaiting a message boundary.
    #[inline]
    #[must_use]
    pub const fn buffered(&self) -> usize {
        self.used
    }

    /// Feeds a chunk of stream data and dispatches every message it
    /// completes. Returns the number of messages dispatched.
    ///
    /// Chunk boundaries are invisible to the handler: any split of the same
    /// stream produces the same dispatch sequence.
    ///
    /// # Errors
    /// [`FrameError::BufferExhausted`] when a message cannot fit in the
    /// buffer even with nothing else buffered, and
    /// [`FrameError::InvalidBodyLengthTag`] or a codec error when the stream
    /// is corrupted at a message prefix. All errors are fatal for the
    /// stream; no resynchronization is attempted.
    pub fn on_data<H: MessageHandler + ?Sized>(
        &mut self,
        mut data: &[u8],
        handler: &mut H,
    ) -> Result<usize, FrameError> {
        let mut dispatched = 0;
        loop {
            let take = (self.buffer.len() - self.used).min(data.len());
            self.buffer[self.used..self.used + take].copy_from_slice(&data[..take]);
            self.used += take;
            data = &data[take..];

            dispatched += self.frame_buffered(handler)?;

            if data.is_empty() {
                return Ok(dispatched);
            }
            if self.used == self.buffer.len() {
                // A full buffer with no boundary cannot make progress.
                let err = FrameError::BufferExhausted {
                    needed: self.used + data.len(),
                    capacity: self.buffer.len(),
                };
                warn!(?err, connection_id = ?self.connection_id, "frame buffer exhausted");
                return Err(err);
            }
        }
    }

    /// Dispatches every complete message currently buffered, then compacts
    /// the remainder to the front of the buffer.
    fn frame_buffered<H: MessageHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> Result<usize, FrameError> {
        let mut offset = 0;
        let mut dispatched = 0;
        let result = loop {
            match self.frame_at(offset) {
                Ok(Some(length)) => {
                    trace!(length, connection_id = ?self.connection_id, "framed message");
                    handler.on_message(&self.buffer[offset..offset + length], self.connection_id);
                    offset += length;
                    dispatched += 1;
                }
                Ok(None) => break Ok(dispatched),
                Err(err) => {
                    warn!(?err, connection_id = ?self.connection_id, "stream corrupted");
                    break Err(err);
                }
            }
        };
        // Unframed bytes move to the front; on error they stay put so a
        // caller can still inspect the offending prefix.
        self.buffer.copy_within(offset..self.used, 0);
        self.used -= offset;
        result
    }

    /// Attempts to frame one message starting at `offset`.
    ///
    /// Returns `Ok(Some(length))` for a complete message, `Ok(None)` when
    /// more data is required.
    fn frame_at(&self, offset: usize) -> Result<Option<usize>, FrameError> {
        let used = self.used;
        let start_of_body_length = offset + START_OF_BODY_LENGTH;
        if used < start_of_body_length + 1 {
            return Ok(None);
        }

        let tag_index = offset + COMMON_PREFIX_LENGTH;
        if self.buffer[tag_index] != b'9' {
            return Err(FrameError::InvalidBodyLengthTag { index: tag_index });
        }
        if self.buffer[tag_index + 1] != EQUALS {
            return Err(FrameError::InvalidBodyLengthTag {
                index: tag_index + 1,
            });
        }

        let Some(end_of_body_length) =
            read::scan_bytes(&self.buffer, start_of_body_length + 1, used, SOH)
        else {
            return Ok(None);
        };
        let body_length =
            read::natural_u32(self.buffer.as_ref(), start_of_body_length, end_of_body_length)?
                as usize;

        let end_of_body_length_field = end_of_body_length + 1;
        let earliest_checksum_end = end_of_body_length_field + body_length + MIN_CHECKSUM_SIZE;

        let needed = earliest_checksum_end - offset;
        if needed > self.buffer.len() {
            return Err(FrameError::BufferExhausted {
                needed,
                capacity: self.buffer.len(),
            });
        }
        if earliest_checksum_end > used {
            return Ok(None);
        }

        let Some(last_byte) = read::scan_bytes(&self.buffer, earliest_checksum_end - 1, used, SOH)
        else {
            return Ok(None);
        };
        Ok(Some(last_byte + 1 - offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixwire_ascii::MessageBuilder;

    #[derive(Default)]
    struct Collector {
        messages: Vec<Vec<u8>>,
        connections: Vec<ConnectionId>,
    }

    impl MessageHandler for Collector {
        fn on_message(&mut self, message: &[u8], connection_id: ConnectionId) {
            self.messages.push(message.to_vec());
            self.connections.push(connection_id);
        }
    }

    fn sample_message(seq: u64) -> Vec<u8> {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "0");
        builder.put_uint(34, seq);
        builder.put_str(49, "SENDER");
        builder.put_str(56, "TARGET");
        builder.finish().to_vec()
    }

    #[test]
    fn test_single_message_single_chunk() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
        let mut collector = Collector::default();
        let message = sample_message(1);

        let dispatched = framer.on_data(&message, &mut collector).unwrap();

        assert_eq!(dispatched, 1);
        assert_eq!(collector.messages, vec![message]);
        assert_eq!(collector.connections, vec![ConnectionId::new(1)]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_two_messages_one_chunk() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(7));
        let mut collector = Collector::default();
        let first = sample_message(1);
        let second = sample_message(2);
        let mut chunk = first.clone();
        chunk.extend_from_slice(&second);

        let dispatched = framer.on_data(&chunk, &mut collector).unwrap();

        assert_eq!(dispatched, 2);
        assert_eq!(collector.messages, vec![first, second]);
    }

    #[test]
    fn test_every_split_point_gives_identical_dispatch() {
        let first = sample_message(10);
        let second = sample_message(11);
        let mut stream = first.clone();
        stream.extend_from_slice(&second);

        for split in 0..=stream.len() {
            let mut framer = StreamFramer::new(4096, ConnectionId::new(3));
            let mut collector = Collector::default();

            framer.on_data(&stream[..split], &mut collector).unwrap();
            framer.on_data(&stream[split..], &mut collector).unwrap();

            assert_eq!(
                collector.messages,
                vec![first.clone(), second.clone()],
                "split at byte {split}"
            );
        }
    }

    #[test]
    fn test_partial_message_is_retained() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
        let mut collector = Collector::default();
        let message = sample_message(5);
        let cut = message.len() - 3;

        let dispatched = framer.on_data(&message[..cut], &mut collector).unwrap();
        assert_eq!(dispatched, 0);
        assert_eq!(framer.buffered(), cut);

        let dispatched = framer.on_data(&message[cut..], &mut collector).unwrap();
        assert_eq!(dispatched, 1);
        assert_eq!(collector.messages, vec![message]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_byte_at_a_time_feed() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
        let mut collector = Collector::default();
        let message = sample_message(42);

        for byte in &message {
            framer
                .on_data(std::slice::from_ref(byte), &mut collector)
                .unwrap();
        }

        assert_eq!(collector.messages, vec![message]);
    }

    #[test]
    fn test_invalid_body_length_tag_is_fatal() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
        let mut collector = Collector::default();
        // Tag 7 where BodyLength belongs.
        let stream = b"8=FIX.4.4\x017=12\x0135=0\x0110=000\x01";

        let err = framer.on_data(stream, &mut collector).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidBodyLengthTag {
                index: COMMON_PREFIX_LENGTH
            }
        );
        assert!(collector.messages.is_empty());
    }

    #[test]
    fn test_corruption_after_valid_message_dispatches_then_fails() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
        let mut collector = Collector::default();
        let good = sample_message(1);
        let mut stream = good.clone();
        stream.extend_from_slice(b"8=FIX.4.4\x01X=12\x0135=0\x0110=000\x01");

        let err = framer.on_data(&stream, &mut collector).unwrap_err();
        assert!(matches!(err, FrameError::InvalidBodyLengthTag { .. }));
        assert_eq!(collector.messages, vec![good]);
    }

    #[test]
    fn test_garbage_body_length_value() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
        let mut collector = Collector::default();
        let stream = b"8=FIX.4.4\x019=1x\x0135=0\x0110=000\x01";

        let err = framer.on_data(stream, &mut collector).unwrap_err();
        assert!(matches!(err, FrameError::Codec(_)));
    }

    #[test]
    fn test_message_larger_than_buffer() {
        let mut framer = StreamFramer::new(64, ConnectionId::new(1));
        let mut collector = Collector::default();
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "D");
        builder.put_str(58, &"x".repeat(100));
        let message = builder.finish().to_vec();

        let err = framer.on_data(&message, &mut collector).unwrap_err();
        assert!(matches!(err, FrameError::BufferExhausted { .. }));
        assert!(collector.messages.is_empty());
    }

    #[test]
    fn test_large_chunk_through_small_buffer() {
        // Many messages in one chunk, each small enough for the buffer.
        let mut framer = StreamFramer::new(64, ConnectionId::new(1));
        let mut collector = Collector::default();
        let mut stream = Vec::new();
        let mut expected = Vec::new();
        for seq in 1..=20 {
            let message = sample_message(seq);
            assert!(message.len() <= 64);
            stream.extend_from_slice(&message);
            expected.push(message);
        }

        let dispatched = framer.on_data(&stream, &mut collector).unwrap();
        assert_eq!(dispatched, 20);
        assert_eq!(collector.messages, expected);
    }

    #[test]
    fn test_closure_handler() {
        let mut framer = StreamFramer::new(4096, ConnectionId::new(9));
        let message = sample_message(1);
        let mut seen = 0usize;
        let mut handler = |bytes: &[u8], connection_id: ConnectionId| {
            assert_eq!(bytes, &message[..]);
            assert_eq!(connection_id, ConnectionId::new(9));
            seen += 1;
        };

        framer.on_data(&message, &mut handler).unwrap();
        assert_eq!(seen, 1);
    }
}
