/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! # FixWire Framer
//!
//! Message-boundary detection for inbound FIX byte streams.
//!
//! This crate provides:
//! - **Stream framer**: push-driven reassembly with a fixed buffer
//! - **Codec**: Tokio codec for `FramedRead`/`FramedWrite` pipelines
//!
//! Both use BodyLength (tag 9) as the single source of message boundaries,
//! so any chunking of the same stream yields the same message sequence.

pub mod codec;
pub mod framer;

pub use codec::WireCodec;
pub use framer::{MessageHandler, StreamFramer};
