/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Synthetic Sequence Reset gap-fill messages.
//!
//! Administrative messages are never retransmitted. The replay engine
//! substitutes each run of them with one Sequence Reset carrying
//! `123=Y` (gap fill) and `36=NewSeqNo`, addressed back to the requester:
//! the sender and target CompIDs are the resend request's, swapped.

use crate::header::ResendRequest;
use bytes::BytesMut;
use fixwire_ascii::MessageBuilder;
use fixwire_core::tags;
use fixwire_core::types::Timestamp;

/// Builds gap-fill Sequence Reset messages for one session.
#[derive(Debug)]
pub struct GapFillEncoder {
    begin_string: &'static str,
}

impl GapFillEncoder {
    /// Creates an encoder stamping messages with the given BeginString.
    #[must_use]
    pub const fn new(begin_string: &'static str) -> Self {
        Self { begin_string }
    }

    /// Encodes a gap fill covering the run starting at `gap_begin`.
    ///
    /// `new_seq_no` is the next sequence number the peer should expect,
    /// the first one after the gap.
    #[must_use]
    pub fn encode(
        &self,
        request: &ResendRequest<'_>,
        gap_begin: u64,
        new_seq_no: u64,
    ) -> BytesMut {
        let mut builder = MessageBuilder::new(self.begin_string);
        builder.put_str(tags::MSG_TYPE, "4");
        builder.put_uint(tags::MSG_SEQ_NUM, gap_begin);
        builder.put_bool(tags::POSS_DUP_FLAG, true);
        // Response direction: our sender is the requester's target.
        builder.put_raw(tags::SENDER_COMP_ID, request.target_comp_id);
        builder.put_timestamp(tags::SENDING_TIME, Timestamp::now());
        builder.put_raw(tags::TARGET_COMP_ID, request.sender_comp_id);
        builder.put_bool(tags::GAP_FILL_FLAG, true);
        builder.put_uint(tags::NEW_SEQ_NO, new_seq_no);
        builder.finish()
    }
}
