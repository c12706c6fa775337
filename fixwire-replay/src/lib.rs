/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! # FixWire Replay
//!
//! Retransmission engine for FIX resend requests.
//!
//! This crate provides:
//! - **Replayer**: drives a resend request from log query to publication
//! - **PossDup rewriting**: in-place duplicate-flag mutation with body
//!   length and checksum reflow
//! - **Gap fill**: synthetic Sequence Reset messages covering withheld
//!   administrative entries
//! - **Seams**: durable-log query, claim/commit publication, idle strategy
//!   and error handler traits, with in-memory implementations for tests

pub mod gapfill;
pub mod header;
pub mod idle;
pub mod possdup;
pub mod publication;
pub mod query;
pub mod replayer;

pub use gapfill::GapFillEncoder;
pub use header::{parse_header, parse_resend_request, MessageHeader, ResendRequest};
pub use idle::{BackoffIdleStrategy, IdleStrategy, NoOpIdleStrategy};
pub use possdup::{enable_poss_dup, POSS_DUP_FIELD};
pub use publication::{BackPressure, MemoryPublication, Publication};
pub use query::{MemoryReplayQuery, ReplayEntry, ReplayQuery};
pub use replayer::{ErrorHandler, LoggingErrorHandler, Replayer};
