/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! # FixWire Core
//!
//! Core types, traits, and error definitions for the FixWire gateway wire engine.
//!
//! This crate provides the fundamental building blocks used across all FixWire crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Identifier types**: `SessionId`, `ConnectionId`, `CompId`
//! - **Wire value types**: `DecimalValue`, `Timestamp`
//! - **Classification**: `MsgClass` for the replay engine's gap-fill gating
//!
//! ## Design
//!
//! All latency-critical types are plain `Copy` data; allocation and locking
//! live outside this core by construction.

pub mod error;
pub mod message;
pub mod types;

pub use error::{CodecError, FrameError, ReplayError, Result, WireError};
pub use message::{MsgClass, tags};
pub use types::{CompId, ConnectionId, DecimalValue, SessionId, Timestamp};
