/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Header extraction for logged and inbound messages.
//!
//! The replay engine only needs a handful of standard header fields plus the
//! byte positions required for in-place rewriting. Parsing stays zero-copy:
//! values are slices of the input message and positions are absolute indices
//! into it.

use fixwire_ascii::read;
use fixwire_ascii::{EQUALS, SOH};
use fixwire_core::error::{CodecError, ReplayError};
use fixwire_core::tags;
use smallvec::SmallVec;

/// One `tag=value` field located inside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    /// Numeric tag.
    pub tag: u32,
    /// Value bytes, excluding the separator.
    pub value: &'a [u8],
    /// Absolute index of the first value byte.
    pub value_start: usize,
    /// Absolute index one past the field's SOH separator.
    pub end: usize,
}

/// Iterator over the `tag=value` fields of a raw message.
#[derive(Debug)]
pub struct Fields<'a> {
    message: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    /// Creates a field iterator over a complete raw message.
    #[must_use]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message, pos: 0 }
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<Field<'a>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.message.len() {
            return None;
        }
        let equals = read::scan_bytes(self.message, self.pos, self.message.len(), EQUALS)?;
        let tag = match read::natural_u32(self.message, self.pos, equals) {
            Ok(tag) => tag,
            Err(err) => return Some(Err(err)),
        };
        let value_start = equals + 1;
        let soh = read::scan_bytes(self.message, value_start, self.message.len(), SOH)?;

        self.pos = soh + 1;
        Some(Ok(Field {
            tag,
            value: &self.message[value_start..soh],
            value_start,
            end: soh + 1,
        }))
    }
}

/// Standard-header fields the replay engine cares about, plus rewrite
/// positions.
#[derive(Debug, Clone, Copy)]
pub struct MessageHeader<'a> {
    /// MsgType (tag 35) value bytes.
    pub msg_type: &'a [u8],
    /// MsgSeqNum (tag 34).
    pub msg_seq_num: u64,
    /// SenderCompID (tag 49) value bytes.
    pub sender_comp_id: &'a [u8],
    /// TargetCompID (tag 56) value bytes.
    pub target_comp_id: &'a [u8],
    /// Absolute index of the PossDupFlag (tag 43) value byte, when present.
    pub poss_dup_value_index: Option<usize>,
    /// Absolute index one past the MsgSeqNum field's separator, the
    /// canonical insertion point for a new PossDupFlag field.
    pub seq_num_field_end: usize,
}

/// Parses the standard header of a complete raw message.
///
/// # Errors
/// `ReplayError::Codec` on a malformed field, `MissingHeaderField` when any
/// of tags 35, 34, 49, 56 is absent.
pub fn parse_header(message: &[u8]) -> Result<MessageHeader<'_>, ReplayError> {
    let fields: SmallVec<[Field<'_>; 32]> =
        Fields::new(message).collect::<Result<_, CodecError>>()?;

    let find = |tag: u32| fields.iter().find(|field| field.tag == tag);
    let require = |tag: u32| find(tag).ok_or(ReplayError::MissingHeaderField { tag });

    let msg_type = require(tags::MSG_TYPE)?;
    let seq_num_field = require(tags::MSG_SEQ_NUM)?;
    let sender = require(tags::SENDER_COMP_ID)?;
    let target = require(tags::TARGET_COMP_ID)?;

    let msg_seq_num = read::natural_u64(
        message,
        seq_num_field.value_start,
        seq_num_field.value_start + seq_num_field.value.len(),
    )?;

    Ok(MessageHeader {
        msg_type: msg_type.value,
        msg_seq_num,
        sender_comp_id: sender.value,
        target_comp_id: target.value,
        poss_dup_value_index: find(tags::POSS_DUP_FLAG).map(|field| field.value_start),
        seq_num_field_end: seq_num_field.end,
    })
}

/// A parsed Resend Request (MsgType `2`).
#[derive(Debug, Clone, Copy)]
pub struct ResendRequest<'a> {
    /// BeginSeqNo (tag 7).
    pub begin_seq_no: u64,
    /// EndSeqNo (tag 16); `None` means replay through the most recent
    /// logged message (wire value `0`).
    pub end_seq_no: Option<u64>,
    /// SenderCompID of the requester.
    pub sender_comp_id: &'a [u8],
    /// TargetCompID of the requester.
    pub target_comp_id: &'a [u8],
}

/// Parses a Resend Request message.
///
/// # Errors
/// `ReplayError::Codec` on a malformed field, `MissingHeaderField` when tag
/// 7, 16, 49 or 56 is absent.
pub fn parse_resend_request(message: &[u8]) -> Result<ResendRequest<'_>, ReplayError> {
    let header = parse_header(message)?;

    let mut begin_seq_no = None;
    let mut end_seq_no = None;
    for field in Fields::new(message) {
        let field = field?;
        match field.tag {
            tags::BEGIN_SEQ_NO => {
                begin_seq_no = Some(read::natural_u64(
                    message,
                    field.value_start,
                    field.value_start + field.value.len(),
                )?);
            }
            tags::END_SEQ_NO => {
                end_seq_no = Some(read::natural_u64(
                    message,
                    field.value_start,
                    field.value_start + field.value.len(),
                )?);
            }
            _ => {}
        }
    }

    let begin_seq_no = begin_seq_no.ok_or(ReplayError::MissingHeaderField {
        tag: tags::BEGIN_SEQ_NO,
    })?;
    let end_seq_no = end_seq_no.ok_or(ReplayError::MissingHeaderField {
        tag: tags::END_SEQ_NO,
    })?;

    Ok(ResendRequest {
        begin_seq_no,
        // EndSeqNo 0 is the wire sentinel for "all remaining messages".
        end_seq_no: (end_seq_no != 0).then_some(end_seq_no),
        sender_comp_id: header.sender_comp_id,
        target_comp_id: header.target_comp_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixwire_ascii::MessageBuilder;

    fn example_message(poss_dup: Option<bool>) -> Vec<u8> {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "D");
        builder.put_uint(34, 12);
        builder.put_str(49, "SENDER");
        if let Some(flag) = poss_dup {
            builder.put_bool(43, flag);
        }
        builder.put_str(56, "TARGET");
        builder.finish().to_vec()
    }

    #[test]
    fn test_fields_iterate_whole_message() {
        let message = example_message(None);
        let fields: Vec<Field<'_>> = Fields::new(&message).map(|f| f.unwrap()).collect();

        assert_eq!(fields[0].tag, 8);
        assert_eq!(fields[0].value, b"FIX.4.4");
        assert_eq!(fields.last().unwrap().tag, 10);
        assert_eq!(fields.last().unwrap().end, message.len());
    }

    #[test]
    fn test_parse_header() {
        let message = example_message(None);
        let header = parse_header(&message).unwrap();

        assert_eq!(header.msg_type, b"D");
        assert_eq!(header.msg_seq_num, 12);
        assert_eq!(header.sender_comp_id, b"SENDER");
        assert_eq!(header.target_comp_id, b"TARGET");
        assert!(header.poss_dup_value_index.is_none());
        // The insertion point sits right after "34=12<SOH>".
        assert_eq!(message[header.seq_num_field_end - 1], 0x01);
        assert_eq!(&message[header.seq_num_field_end - 6..header.seq_num_field_end - 1], b"34=12");
    }

    #[test]
    fn test_parse_header_finds_poss_dup() {
        let message = example_message(Some(true));
        let header = parse_header(&message).unwrap();

        let index = header.poss_dup_value_index.unwrap();
        assert_eq!(message[index], b'Y');
        assert_eq!(&message[index - 3..index], b"43=");
    }

    #[test]
    fn test_parse_header_missing_seq_num() {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "D");
        builder.put_str(49, "SENDER");
        builder.put_str(56, "TARGET");
        let message = builder.finish();

        let err = parse_header(&message).unwrap_err();
        assert_eq!(err, ReplayError::MissingHeaderField { tag: 34 });
    }

    #[test]
    fn test_parse_resend_request() {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "2");
        builder.put_uint(34, 5);
        builder.put_str(49, "INITIATOR");
        builder.put_str(56, "ACCEPTOR");
        builder.put_uint(7, 10);
        builder.put_uint(16, 15);
        let message = builder.finish();

        let request = parse_resend_request(&message).unwrap();
        assert_eq!(request.begin_seq_no, 10);
        assert_eq!(request.end_seq_no, Some(15));
        assert_eq!(request.sender_comp_id, b"INITIATOR");
        assert_eq!(request.target_comp_id, b"ACCEPTOR");
    }

    #[test]
    fn test_parse_resend_request_most_recent_sentinel() {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "2");
        builder.put_uint(34, 5);
        builder.put_str(49, "A");
        builder.put_str(56, "B");
        builder.put_uint(7, 3);
        builder.put_uint(16, 0);
        let message = builder.finish();

        let request = parse_resend_request(&message).unwrap();
        assert_eq!(request.begin_seq_no, 3);
        assert_eq!(request.end_seq_no, None);
    }

    #[test]
    fn test_parse_resend_request_missing_begin() {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "2");
        builder.put_uint(34, 5);
        builder.put_str(49, "A");
        builder.put_str(56, "B");
        builder.put_uint(16, 0);
        let message = builder.finish();

        let err = parse_resend_request(&message).unwrap_err();
        assert_eq!(err, ReplayError::MissingHeaderField { tag: 7 });
    }
}
