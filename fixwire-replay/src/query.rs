/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Durable-log query interface.
//!
//! The replay engine retrieves historical messages through [`ReplayQuery`],
//! an abstraction over whatever log the surrounding gateway maintains. The
//! in-memory implementation here backs tests and single-process deployments;
//! durable backends live outside this crate.

use bytes::Bytes;
use fixwire_core::error::ReplayError;
use fixwire_core::types::SessionId;
use std::collections::BTreeMap;

/// One logged message handed to the query consumer.
///
/// The message bytes are only valid for the duration of the consumer
/// callback.
#[derive(Debug, Clone, Copy)]
pub struct ReplayEntry<'a> {
    /// Sequence number the message was sent with.
    pub sequence_number: u64,
    /// Complete raw message bytes.
    pub message: &'a [u8],
}

/// Query service over a session's outbound message log.
pub trait ReplayQuery {
    /// Invokes `consumer` once per logged entry in
    /// `[begin_seq_no, end_seq_no]`, ascending. `end_seq_no` of `None`
    /// means through the most recent logged message. Returns the number of
    /// entries consumed.
    ///
    /// The sequence indices select the sequence-number epoch when the log
    /// spans sequence resets.
    ///
    /// # Errors
    /// `ReplayError::Query` when the underlying log cannot be read.
    fn query(
        &mut self,
        consumer: &mut dyn FnMut(ReplayEntry<'_>),
        session_id: SessionId,
        begin_seq_no: u64,
        begin_seq_index: u32,
        end_seq_no: Option<u64>,
        end_seq_index: u32,
    ) -> Result<usize, ReplayError>;
}

/// In-memory replay log.
///
/// Messages are indexed by `(session, sequence number)` in a `BTreeMap` for
/// efficient range queries. Not persistent; sequence indices are ignored
/// because a process-local log never spans a sequence reset.
#[derive(Debug, Default)]
pub struct MemoryReplayQuery {
    messages: BTreeMap<(SessionId, u64), Bytes>,
}

impl MemoryReplayQuery {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outbound message under its sequence number.
    pub fn log(&mut self, session_id: SessionId, sequence_number: u64, message: &[u8]) {
        self.messages
            .insert((session_id, sequence_number), Bytes::copy_from_slice(message));
    }

    /// Returns the highest logged sequence number for a session.
    #[must_use]
    pub fn highest(&self, session_id: SessionId) -> Option<u64> {
        self.messages
            .range((session_id, 0)..=(session_id, u64::MAX))
            .next_back()
            .map(|((_, sequence_number), _)| *sequence_number)
    }

    /// Returns the number of logged messages across all sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl ReplayQuery for MemoryReplayQuery {
    fn query(
        &mut self,
        consumer: &mut dyn FnMut(ReplayEntry<'_>),
        session_id: SessionId,
        begin_seq_no: u64,
        _begin_seq_index: u32,
        end_seq_no: Option<u64>,
        _end_seq_index: u32,
    ) -> Result<usize, ReplayError> {
        let end = end_seq_no.unwrap_or(u64::MAX);
        let mut count = 0;
        for ((_, sequence_number), message) in
            self.messages.range((session_id, begin_seq_no)..=(session_id, end))
        {
            consumer(ReplayEntry {
                sequence_number: *sequence_number,
                message,
            });
            count += 1;
        }
        Ok(count)
    }
}
