/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Message classification and standard header tags.
//!
//! The replay engine only needs to distinguish session-level administrative
//! messages from business traffic, so the classification here is a closed
//! enum over the known session message types plus a `Business` catch-all.
//! This keeps the gap-fill gating exhaustive and compiler-checked.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard header and trailer tag numbers used by the wire engine.
pub mod tags {
    /// BeginString (8) - first field of every message.
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength (9).
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum (10) - trailing field.
    pub const CHECK_SUM: u32 = 10;
    /// MsgSeqNum (34).
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType (35) - first field of the body.
    pub const MSG_TYPE: u32 = 35;
    /// NewSeqNo (36) - Sequence Reset body field.
    pub const NEW_SEQ_NO: u32 = 36;
    /// PossDupFlag (43).
    pub const POSS_DUP_FLAG: u32 = 43;
    /// SenderCompID (49).
    pub const SENDER_COMP_ID: u32 = 49;
    /// SendingTime (52).
    pub const SENDING_TIME: u32 = 52;
    /// TargetCompID (56).
    pub const TARGET_COMP_ID: u32 = 56;
    /// BeginSeqNo (7) - Resend Request body field.
    pub const BEGIN_SEQ_NO: u32 = 7;
    /// EndSeqNo (16) - Resend Request body field.
    pub const END_SEQ_NO: u32 = 16;
    /// GapFillFlag (123) - Sequence Reset body field.
    pub const GAP_FILL_FLAG: u32 = 123;
}

/// Classification of a FIX message for replay gating.
///
/// Session-level message types are enumerated explicitly; everything else
/// is `Business` and gets retransmitted with the poss-dup flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MsgClass {
    /// Heartbeat (0).
    Heartbeat,
    /// Test Request (1).
    TestRequest,
    /// Resend Request (2).
    ResendRequest,
    /// Reject (3).
    Reject,
    /// Sequence Reset (4).
    SequenceReset,
    /// Logout (5).
    Logout,
    /// Logon (A).
    Logon,
    /// Any application-level message.
    Business,
}

impl MsgClass {
    /// Classifies a message from its raw MsgType (tag 35) value.
    #[must_use]
    pub fn from_msg_type(msg_type: &[u8]) -> Self {
        match msg_type {
            b"0" => Self::Heartbeat,
            b"1" => Self::TestRequest,
            b"2" => Self::ResendRequest,
            b"3" => Self::Reject,
            b"4" => Self::SequenceReset,
            b"5" => Self::Logout,
            b"A" => Self::Logon,
            _ => Self::Business,
        }
    }

    /// Returns true if a logged message of this class is replaced by a
    /// gap-fill during replay instead of being retransmitted.
    #[must_use]
    pub const fn is_gap_fill(self) -> bool {
        matches!(
            self,
            Self::Logon
                | Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::SequenceReset
        )
    }
}

impl fmt::Display for MsgClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heartbeat => "Heartbeat",
            Self::TestRequest => "TestRequest",
            Self::ResendRequest => "ResendRequest",
            Self::Reject => "Reject",
            Self::SequenceReset => "SequenceReset",
            Self::Logout => "Logout",
            Self::Logon => "Logon",
            Self::Business => "Business",
        };
        write!(f, "{}", name)
    }
}
