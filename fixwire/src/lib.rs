/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/2/26
******************************************************************************/

//! # FixWire
//!
//! The wire-level engine of a FIX session gateway: stream framing, ASCII
//! field codec, and resend-request replay.
//!
//! ## Features
//!
//! - **Allocation-free hot path**: framing and field codecs operate in
//!   place on caller buffers
//! - **Byte-exact**: body length and checksum are preserved through every
//!   in-place rewrite
//! - **SIMD-accelerated**: uses `memchr` for delimiter search
//!
//! ## Crate Organization
//!
//! - [`core`]: identifiers, wire value types, and error definitions
//! - [`ascii`]: decode/encode routines for FIX primitive types
//! - [`framer`]: message-boundary detection over a byte stream
//! - [`replay`]: resend-request replay with poss-dup rewriting and gap fill
//!
//! ## Quick Start
//!
//! ```rust
//! use fixwire::prelude::*;
//!
//! let mut builder = MessageBuilder::new("FIX.4.4");
//! builder.put_str(35, "0");
//! builder.put_uint(34, 1);
//! let message = builder.finish();
//!
//! let mut framer = StreamFramer::new(4096, ConnectionId::new(1));
//! let mut count = 0;
//! let mut handler = |_bytes: &[u8], _connection: ConnectionId| count += 1;
//! framer.on_data(&message, &mut handler).unwrap();
//! assert_eq!(count, 1);
//! ```

pub mod core {
    //! Identifiers, wire value types, and error definitions.
    pub use fixwire_core::*;
}

pub mod ascii {
    //! Decode/encode routines for FIX primitive types.
    pub use fixwire_ascii::*;
}

pub mod framer {
    //! Message-boundary detection over a byte stream.
    pub use fixwire_framer::*;
}

pub mod replay {
    //! Resend-request replay with poss-dup rewriting and gap fill.
    pub use fixwire_replay::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixwire_core::{
        CodecError, CompId, ConnectionId, DecimalValue, FrameError, MsgClass, ReplayError,
        Result, SessionId, Timestamp, WireError,
    };

    // Ascii codec
    pub use fixwire_ascii::{AsciiBuffer, MessageBuilder};

    // Framing
    pub use fixwire_framer::{MessageHandler, StreamFramer, WireCodec};

    // Replay
    pub use fixwire_replay::{
        BackoffIdleStrategy, ErrorHandler, GapFillEncoder, IdleStrategy, LoggingErrorHandler,
        MemoryPublication, MemoryReplayQuery, Publication, Replayer, ReplayQuery,
    };
}
