/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! PossDupFlag rewriting for replayed messages.
//!
//! Every replayed business message must carry `43=Y`. When the logged
//! message already has the field, only the value byte and the checksum
//! change. When it does not, the field is inserted after MsgSeqNum, which
//! grows the body: the body-length field is rewritten (possibly gaining a
//! digit) and the checksum recomputed. The rewrite is one deterministic
//! pass. The new body length depends only on the old content plus the
//! fixed-size insertion; the length field's own digit width is excluded
//! from the count, so there is no fixed point to iterate towards.

use crate::header::{parse_header, Field, Fields};
use fixwire_ascii::{read, write, SOH};
use fixwire_core::error::ReplayError;
use fixwire_core::tags;

/// The field inserted into messages logged without a PossDupFlag.
pub const POSS_DUP_FIELD: &[u8] = b"43=Y\x01";

/// Length of the fixed checksum trailer `10=DDD<SOH>`.
const TRAILER_LENGTH: usize = 7;

/// Rewrites `message` with `43=Y` into `out`, recomputing the body length
/// and checksum as needed. `out` is cleared first and holds the complete
/// outbound message on success.
///
/// # Errors
/// `ReplayError::Codec` on malformed fields, `MissingHeaderField` when the
/// message lacks a standard header or trailer field.
pub fn enable_poss_dup(message: &[u8], out: &mut Vec<u8>) -> Result<(), ReplayError> {
    let header = parse_header(message)?;

    let mut body_length_field: Option<Field<'_>> = None;
    let mut checksum_field: Option<Field<'_>> = None;
    for field in Fields::new(message) {
        let field = field?;
        match field.tag {
            tags::BODY_LENGTH => body_length_field = Some(field),
            tags::CHECK_SUM => checksum_field = Some(field),
            _ => {}
        }
    }
    let body_length_field = body_length_field.ok_or(ReplayError::MissingHeaderField {
        tag: tags::BODY_LENGTH,
    })?;
    let checksum_field = checksum_field.ok_or(ReplayError::MissingHeaderField {
        tag: tags::CHECK_SUM,
    })?;
    // Start of the "10=" trailer, which the checksum does not cover.
    let trailer_start = checksum_field.end - TRAILER_LENGTH;

    out.clear();

    if let Some(flag_index) = header.poss_dup_value_index {
        // Field already present: flip the value in place and fix the
        // checksum, the length is unchanged.
        out.extend_from_slice(message);
        out[flag_index] = b'Y';
        let checksum = read::checksum(out.as_slice(), 0, trailer_start);
        write::put_checksum(out, checksum_field.value_start, checksum)?;
        return Ok(());
    }

    let old_body_length = read::natural_u64(
        message,
        body_length_field.value_start,
        body_length_field.value_start + body_length_field.value.len(),
    )? as usize;
    let new_body_length = old_body_length + POSS_DUP_FIELD.len();

    out.extend_from_slice(&message[..body_length_field.value_start]);
    let mut length_buf = itoa::Buffer::new();
    out.extend_from_slice(length_buf.format(new_body_length).as_bytes());

    let body_length_soh = body_length_field.value_start + body_length_field.value.len();
    out.extend_from_slice(&message[body_length_soh..header.seq_num_field_end]);
    out.extend_from_slice(POSS_DUP_FIELD);
    out.extend_from_slice(&message[header.seq_num_field_end..trailer_start]);

    let checksum = read::checksum(out.as_slice(), 0, out.len());
    out.extend_from_slice(b"10=");
    let mut digits = [0u8; 3];
    write::put_checksum(digits.as_mut_slice(), 0, checksum)?;
    out.extend_from_slice(&digits);
    out.push(SOH);

    Ok(())
}
