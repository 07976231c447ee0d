//! Text framing for chunked file transfers.
//!
//! A file travels as a sequence of short text messages that survive
//! chat-style channels:
//!
//! ```text
//! [FILE START]
//! id=<id>
//! path=<relative/destination.ext>
//! total_parts=<N>
//! encoding=base64
//! compression=<none|gzip>
//! sha256=<hex digest>            (optional)
//!
//! [FILE CHUNK <i>/<N> id=<id>]
//! <base64 text>
//!
//! [FILE END id=<id>]
//! [FILE CANCEL id=<id>]
//! ```
//!
//! This crate only maps between text and [`Frame`] values; it keeps no
//! state and performs no I/O.

pub mod format;
pub mod frame;
pub mod parse;
pub mod text;

pub use format::{format_cancel, format_chunk, format_end, format_start};
pub use frame::{
    CANCEL_PREFIX, CHUNK_PREFIX, ChunkFrame, Compression, END_PREFIX, Encoding, Frame,
    FrameError, START_HEADER, StartFrame,
};
pub use parse::parse_frame;
pub use text::{normalize_newlines, split_messages, strip_code_fences};
