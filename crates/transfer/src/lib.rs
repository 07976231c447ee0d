//! Reassembly of files sent as text-framed chunks.
//!
//! The [`Assembler`] consumes raw messages, tracks one session per
//! `(channel, transfer id)` and, once a transfer ends, verifies the payload
//! and writes it below a trusted root directory. [`encode_transfer`] is the
//! sender side that splits bytes into frames.

mod ack;
mod assembler;
mod chunked;
mod config;
mod payload;
mod store;
mod types;
mod validation;
mod writer;

pub use ack::{Ack, Reply};
pub use assembler::{AssembleError, Assembler};
pub use chunked::{
    EncodeOptions, EncodedTransfer, calculate_file_checksum, checksum_bytes, encode_transfer,
    new_transfer_id,
};
pub use config::{AssemblerConfig, DEFAULT_MAX_PARTS, DEFAULT_SESSION_TTL};
pub use payload::{decode_payload, encode_payload, gunzip, gzip};
pub use store::{SessionKey, SessionStore};
pub use types::TransferSession;
pub use validation::normalize_relative_path;
pub use writer::write_file_safe;

/// Default chunk size in encoded (base64) characters.
///
/// Small enough to fit comfortably under common chat message limits.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Errors produced while encoding, decoding or storing transfer payloads.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("base64 decode failed: {0}")]
    Decode(String),

    #[error("gzip decompress failed: {0}")]
    Decompress(String),

    #[error("sha256 mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    #[error("too many parts: {0}")]
    TooManyParts(usize),
}
