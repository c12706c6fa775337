/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! Resend-request driven replay engine.
//!
//! On a Resend Request the engine queries the durable log for the requested
//! range and republishes each entry. Business messages go out with
//! PossDupFlag forced on. Administrative entries are withheld and coalesced:
//! each run becomes one gap-fill Sequence Reset. Publication uses bounded
//! claim/commit retries with an injected idle strategy; every failure mode
//! is reported to the error handler and abandons the request.

use crate::gapfill::GapFillEncoder;
use crate::header::{parse_header, parse_resend_request, ResendRequest};
use crate::idle::IdleStrategy;
use crate::possdup::enable_poss_dup;
use crate::publication::{BackPressure, Publication};
use crate::query::{ReplayEntry, ReplayQuery};
use fixwire_core::error::ReplayError;
use fixwire_core::message::MsgClass;
use fixwire_core::types::SessionId;
use tracing::{debug, error, trace};

/// Receives failures that abandon a replay request.
pub trait ErrorHandler {
    /// Called once per abandoned request with the terminal error.
    fn on_error(&mut self, error: &ReplayError);
}

/// Reports replay failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn on_error(&mut self, error: &ReplayError) {
        error!(%error, "replay request abandoned");
    }
}

/// Replay engine for one session's resend requests.
///
/// Requests run to completion sequentially on the calling thread. The
/// outbound scratch buffer is reused across entries, so steady-state
/// replay performs no per-message allocation.
pub struct Replayer<Q, P> {
    query: Q,
    publication: P,
    idle: Box<dyn IdleStrategy>,
    error_handler: Box<dyn ErrorHandler>,
    max_claim_attempts: usize,
    name_prefix: String,
    gap_fill: GapFillEncoder,
    scratch: Vec<u8>,
}

impl<Q: ReplayQuery, P: Publication> Replayer<Q, P> {
    /// Creates a replay engine.
    ///
    /// `max_claim_attempts` bounds publication retries per message;
    /// `name_prefix` labels this engine's log output.
    pub fn new(
        query: Q,
        publication: P,
        idle: Box<dyn IdleStrategy>,
        error_handler: Box<dyn ErrorHandler>,
        max_claim_attempts: usize,
        begin_string: &'static str,
        name_prefix: impl Into<String>,
    ) -> Self {
        Self {
            query,
            publication,
            idle,
            error_handler,
            max_claim_attempts,
            name_prefix: name_prefix.into(),
            gap_fill: GapFillEncoder::new(begin_string),
            scratch: Vec::with_capacity(1024),
        }
    }

    /// Returns the publication for inspection.
    pub fn publication(&self) -> &P {
        &self.publication
    }

    /// Returns the query service for inspection.
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Handles one inbound session message.
    ///
    /// Messages other than Resend Request are ignored. Returns the number
    /// of messages published; failures are reported to the error handler
    /// and yield zero further publications.
    pub fn on_message(
        &mut self,
        message: &[u8],
        session_id: SessionId,
        sequence_index: u32,
    ) -> usize {
        let msg_type = match parse_header(message) {
            Ok(header) => header.msg_type,
            Err(err) => {
                self.error_handler.on_error(&err);
                return 0;
            }
        };
        if MsgClass::from_msg_type(msg_type) != MsgClass::ResendRequest {
            return 0;
        }

        match self.replay(message, session_id, sequence_index) {
            Ok(published) => published,
            Err(err) => {
                self.error_handler.on_error(&err);
                0
            }
        }
    }

    fn replay(
        &mut self,
        message: &[u8],
        session_id: SessionId,
        sequence_index: u32,
    ) -> Result<usize, ReplayError> {
        let request = parse_resend_request(message)?;
        if request.begin_seq_no == 0
            || request
                .end_seq_no
                .is_some_and(|end| end < request.begin_seq_no)
        {
            return Err(ReplayError::InvalidRange {
                begin_seq_no: request.begin_seq_no,
                end_seq_no: request.end_seq_no,
            });
        }

        debug!(
            name = %self.name_prefix,
            session = %session_id,
            begin = request.begin_seq_no,
            end = ?request.end_seq_no,
            "replaying range"
        );

        let Self {
            query,
            publication,
            idle,
            gap_fill,
            scratch,
            max_claim_attempts,
            ..
        } = self;
        let mut pass = ReplayPass {
            publication,
            idle: idle.as_mut(),
            gap_fill: &*gap_fill,
            scratch,
            max_claim_attempts: *max_claim_attempts,
            request,
            gap: None,
            first: true,
            published: 0,
            failure: None,
        };

        let count = query.query(
            &mut |entry: ReplayEntry<'_>| pass.on_entry(entry),
            session_id,
            request.begin_seq_no,
            sequence_index,
            request.end_seq_no,
            sequence_index,
        )?;

        if let Some(failure) = pass.failure.take() {
            return Err(failure);
        }
        if count == 0 {
            return Err(ReplayError::InvalidRange {
                begin_seq_no: request.begin_seq_no,
                end_seq_no: request.end_seq_no,
            });
        }
        pass.close_trailing_gap()?;
        Ok(pass.published)
    }
}

/// Per-request state shared between the query consumer and publication.
struct ReplayPass<'a, P: Publication + ?Sized> {
    publication: &'a mut P,
    idle: &'a mut dyn IdleStrategy,
    gap_fill: &'a GapFillEncoder,
    scratch: &'a mut Vec<u8>,
    max_claim_attempts: usize,
    request: ResendRequest<'a>,
    /// Open run of withheld administrative entries, begin and end sequence.
    gap: Option<(u64, u64)>,
    first: bool,
    published: usize,
    failure: Option<ReplayError>,
}

impl<P: Publication + ?Sized> ReplayPass<'_, P> {
    fn on_entry(&mut self, entry: ReplayEntry<'_>) {
        if self.failure.is_some() {
            return;
        }
        if self.first {
            self.first = false;
            if entry.sequence_number != self.request.begin_seq_no {
                // The log cannot satisfy the range from its begin point.
                self.failure = Some(ReplayError::InvalidRange {
                    begin_seq_no: self.request.begin_seq_no,
                    end_seq_no: self.request.end_seq_no,
                });
                return;
            }
        }
        if let Err(err) = self.replay_entry(entry) {
            self.failure = Some(err);
        }
    }

    fn replay_entry(&mut self, entry: ReplayEntry<'_>) -> Result<(), ReplayError> {
        let header = parse_header(entry.message)?;
        let class = MsgClass::from_msg_type(header.msg_type);

        if class.is_gap_fill() {
            trace!(sequence = entry.sequence_number, %class, "withholding admin entry");
            self.gap = Some(match self.gap {
                Some((begin, _)) => (begin, entry.sequence_number),
                None => (entry.sequence_number, entry.sequence_number),
            });
            return Ok(());
        }

        if let Some((gap_begin, _)) = self.gap.take() {
            self.publish_gap_fill(gap_begin, entry.sequence_number)?;
        }
        enable_poss_dup(entry.message, self.scratch)?;
        self.publish_scratch()?;
        trace!(sequence = entry.sequence_number, "republished with poss dup");
        Ok(())
    }

    /// Emits the gap fill for a trailing admin run, covering through the
    /// end of the requested range.
    fn close_trailing_gap(&mut self) -> Result<(), ReplayError> {
        if let Some((gap_begin, gap_end)) = self.gap.take() {
            let new_seq_no = match self.request.end_seq_no {
                Some(end) => end + 1,
                None => gap_end + 1,
            };
            self.publish_gap_fill(gap_begin, new_seq_no)?;
        }
        Ok(())
    }

    fn publish_gap_fill(&mut self, gap_begin: u64, new_seq_no: u64) -> Result<(), ReplayError> {
        let message = self.gap_fill.encode(&self.request, gap_begin, new_seq_no);
        self.scratch.clear();
        self.scratch.extend_from_slice(&message);
        self.publish_scratch()?;
        trace!(gap_begin, new_seq_no, "published gap fill");
        Ok(())
    }

    fn publish_scratch(&mut self) -> Result<(), ReplayError> {
        let mut attempts = 0;
        loop {
            match self.publication.try_claim(self.scratch.len()) {
                Ok(region) => {
                    region.copy_from_slice(self.scratch);
                    self.publication.commit();
                    self.idle.reset();
                    self.published += 1;
                    return Ok(());
                }
                Err(BackPressure) => {
                    attempts += 1;
                    if attempts >= self.max_claim_attempts {
                        return Err(ReplayError::BackPressureExhausted { attempts });
                    }
                    self.idle.idle();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idle::NoOpIdleStrategy;
    use crate::publication::MemoryPublication;
    use crate::query::MemoryReplayQuery;
    use fixwire_ascii::MessageBuilder;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SESSION: SessionId = SessionId::new(1);
    const MAX_CLAIM_ATTEMPTS: usize = 3;

    #[derive(Debug, Default, Clone)]
    struct CollectingErrors(Rc<RefCell<Vec<ReplayError>>>);

    impl ErrorHandler for CollectingErrors {
        fn on_error(&mut self, error: &ReplayError) {
            self.0.borrow_mut().push(error.clone());
        }
    }

    fn business_message(seq: u64) -> Vec<u8> {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "D");
        builder.put_uint(34, seq);
        builder.put_str(49, "ACCEPTOR");
        builder.put_str(56, "INITIATOR");
        builder.put_str(55, "EURUSD");
        builder.finish().to_vec()
    }

    fn admin_message(seq: u64) -> Vec<u8> {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "0");
        builder.put_uint(34, seq);
        builder.put_str(49, "ACCEPTOR");
        builder.put_str(56, "INITIATOR");
        builder.finish().to_vec()
    }

    fn resend_request(begin: u64, end: u64) -> Vec<u8> {
        let mut builder = MessageBuilder::new("FIX.4.4");
        builder.put_str(35, "2");
        builder.put_uint(34, 8);
        builder.put_str(49, "INITIATOR");
        builder.put_str(56, "ACCEPTOR");
        builder.put_uint(7, begin);
        builder.put_uint(16, end);
        builder.finish().to_vec()
    }

    fn replayer(
        log: MemoryReplayQuery,
        publication: MemoryPublication,
        errors: CollectingErrors,
    ) -> Replayer<MemoryReplayQuery, MemoryPublication> {
        Replayer::new(
            log,
            publication,
            Box::new(NoOpIdleStrategy),
            Box::new(errors),
            MAX_CLAIM_ATTEMPTS,
            "FIX.4.4",
            "test",
        )
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_replays_business_messages_with_poss_dup() {
        let mut log = MemoryReplayQuery::new();
        for seq in 1..=3 {
            log.log(SESSION, seq, &business_message(seq));
        }
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, MemoryPublication::new(), errors.clone());

        let published = replayer.on_message(&resend_request(1, 3), SESSION, 0);

        assert_eq!(published, 3);
        assert!(errors.0.borrow().is_empty());
        let committed = replayer.publication().committed();
        assert_eq!(committed.len(), 3);
        for (index, message) in committed.iter().enumerate() {
            let rendered = text(message);
            assert!(rendered.contains("43=Y\x01"), "{rendered}");
            assert!(rendered.contains(&format!("34={}\x01", index + 1)));
        }
    }

    #[test]
    fn test_gap_fills_admin_only_range() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 10, &admin_message(10));
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, MemoryPublication::new(), errors.clone());

        let published = replayer.on_message(&resend_request(10, 10), SESSION, 0);

        assert_eq!(published, 1);
        let committed = replayer.publication().committed();
        let rendered = text(&committed[0]);
        assert!(rendered.contains("35=4\x01"), "{rendered}");
        assert!(rendered.contains("34=10\x01"));
        assert!(rendered.contains("36=11\x01"));
        assert!(rendered.contains("123=Y\x01"));
        assert!(rendered.contains("43=Y\x01"));
        assert!(errors.0.borrow().is_empty());
    }

    #[test]
    fn test_admin_run_coalesces_before_business() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 1, &admin_message(1));
        log.log(SESSION, 2, &admin_message(2));
        log.log(SESSION, 3, &business_message(3));
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, MemoryPublication::new(), errors.clone());

        let published = replayer.on_message(&resend_request(1, 3), SESSION, 0);

        assert_eq!(published, 2);
        let committed = replayer.publication().committed();
        let gap_fill = text(&committed[0]);
        assert!(gap_fill.contains("35=4\x01"));
        assert!(gap_fill.contains("34=1\x01"));
        assert!(gap_fill.contains("36=3\x01"));
        let business = text(&committed[1]);
        assert!(business.contains("34=3\x01"));
        assert!(business.contains("43=Y\x01"));
    }

    #[test]
    fn test_gap_fill_addresses_the_requester() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 10, &admin_message(10));
        let mut replayer = replayer(
            log,
            MemoryPublication::new(),
            CollectingErrors::default(),
        );

        replayer.on_message(&resend_request(10, 10), SESSION, 0);

        let rendered = text(&replayer.publication().committed()[0]);
        assert!(rendered.contains("49=ACCEPTOR\x01"), "{rendered}");
        assert!(rendered.contains("56=INITIATOR\x01"));
    }

    #[test]
    fn test_most_recent_sentinel_replays_through_log_end() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 5, &business_message(5));
        log.log(SESSION, 6, &admin_message(6));
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, MemoryPublication::new(), errors.clone());

        let published = replayer.on_message(&resend_request(5, 0), SESSION, 0);

        assert_eq!(published, 2);
        let committed = replayer.publication().committed();
        assert!(text(&committed[0]).contains("34=5\x01"));
        let gap_fill = text(&committed[1]);
        assert!(gap_fill.contains("34=6\x01"));
        assert!(gap_fill.contains("36=7\x01"));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 1, &business_message(1));
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, MemoryPublication::new(), errors.clone());

        let published = replayer.on_message(&resend_request(5, 2), SESSION, 0);

        assert_eq!(published, 0);
        assert!(replayer.publication().committed().is_empty());
        assert!(matches!(
            errors.0.borrow()[0],
            ReplayError::InvalidRange {
                begin_seq_no: 5,
                end_seq_no: Some(2)
            }
        ));
    }

    #[test]
    fn test_rejects_begin_below_lowest_logged() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 2, &business_message(2));
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, MemoryPublication::new(), errors.clone());

        let published = replayer.on_message(&resend_request(1, 2), SESSION, 0);

        assert_eq!(published, 0);
        assert!(replayer.publication().committed().is_empty());
        assert!(matches!(
            errors.0.borrow()[0],
            ReplayError::InvalidRange { begin_seq_no: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_empty_range() {
        let errors = CollectingErrors::default();
        let mut replayer = replayer(
            MemoryReplayQuery::new(),
            MemoryPublication::new(),
            errors.clone(),
        );

        let published = replayer.on_message(&resend_request(1, 1), SESSION, 0);

        assert_eq!(published, 0);
        assert_eq!(errors.0.borrow().len(), 1);
    }

    #[test]
    fn test_back_pressure_exhaustion_abandons_request() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 1, &business_message(1));
        log.log(SESSION, 2, &business_message(2));
        let mut publication = MemoryPublication::new();
        publication.fail_next_claims(10);
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, publication, errors.clone());

        let published = replayer.on_message(&resend_request(1, 2), SESSION, 0);

        assert_eq!(published, 0);
        assert!(replayer.publication().committed().is_empty());
        assert!(matches!(
            errors.0.borrow()[0],
            ReplayError::BackPressureExhausted {
                attempts: MAX_CLAIM_ATTEMPTS
            }
        ));
    }

    #[test]
    fn test_back_pressure_retry_recovers() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 1, &business_message(1));
        let mut publication = MemoryPublication::new();
        publication.fail_next_claims(MAX_CLAIM_ATTEMPTS - 1);
        let errors = CollectingErrors::default();
        let mut replayer = replayer(log, publication, errors.clone());

        let published = replayer.on_message(&resend_request(1, 1), SESSION, 0);

        assert_eq!(published, 1);
        assert!(errors.0.borrow().is_empty());
    }

    #[test]
    fn test_ignores_other_message_types() {
        let errors = CollectingErrors::default();
        let mut replayer = replayer(
            MemoryReplayQuery::new(),
            MemoryPublication::new(),
            errors.clone(),
        );

        let published = replayer.on_message(&admin_message(1), SESSION, 0);

        assert_eq!(published, 0);
        assert!(errors.0.borrow().is_empty());
    }

    #[test]
    fn test_replayed_messages_keep_valid_framing() {
        let mut log = MemoryReplayQuery::new();
        log.log(SESSION, 1, &business_message(1));
        let mut replayer = replayer(
            log,
            MemoryPublication::new(),
            CollectingErrors::default(),
        );

        replayer.on_message(&resend_request(1, 1), SESSION, 0);

        let committed = &replayer.publication().committed()[0];
        let trailer_start = committed.len() - 7;
        let declared = fixwire_ascii::read::natural_u32(
            committed.as_slice(),
            trailer_start + 3,
            committed.len() - 1,
        )
        .unwrap() as u8;
        let calculated = fixwire_ascii::read::checksum(committed.as_slice(), 0, trailer_start);
        assert_eq!(calculated, declared);
    }
}
