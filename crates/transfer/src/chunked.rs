use std::io::Read;
use std::path::Path;

use chunkwire_protocol::{
    ChunkFrame, Compression, StartFrame, format_chunk, format_end, format_start,
};
use sha2::{Digest, Sha256};

use crate::payload::encode_payload;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

// ---------------------------------------------------------------------------
// Checksum helpers
// ---------------------------------------------------------------------------

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes SHA-256 of an entire file and returns the hex-encoded digest.
pub fn calculate_file_checksum(path: &Path) -> Result<String, TransferError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Generates a fresh transfer id (UUID v4).
pub fn new_transfer_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// How [`encode_transfer`] splits a file into frames.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Destination path announced to the receiver.
    pub path: String,
    /// Maximum encoded characters per chunk frame.
    pub chunk_size: usize,
    pub compression: Compression,
    /// Transfer id; a UUID is generated when `None`.
    pub id: Option<String>,
    /// Announce the SHA-256 of the original bytes in the start frame.
    pub with_checksum: bool,
}

impl EncodeOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            compression: Compression::Gzip,
            id: None,
            with_checksum: true,
        }
    }
}

/// Frames produced for one file, in sending order (start, chunks, end).
#[derive(Debug, Clone)]
pub struct EncodedTransfer {
    pub id: String,
    pub total_parts: u32,
    pub sha256: Option<String>,
    pub frames: Vec<String>,
}

impl EncodedTransfer {
    /// Joins the frames with blank lines, as they would appear in a chat log.
    pub fn to_transcript(&self) -> String {
        self.frames.join("\n\n")
    }
}

/// Splits `data` into a start frame, `total_parts` chunk frames and an end frame.
///
/// The encoded text is cut every `chunk_size` characters. Empty input still
/// yields one (empty) chunk so `total_parts` is never zero.
pub fn encode_transfer(
    data: &[u8],
    options: &EncodeOptions,
) -> Result<EncodedTransfer, TransferError> {
    if options.chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize(options.chunk_size));
    }

    let encoded = encode_payload(data, options.compression)?;
    let parts = encoded.len().div_ceil(options.chunk_size).max(1);
    let total_parts = u32::try_from(parts).map_err(|_| TransferError::TooManyParts(parts))?;

    let id = options.id.clone().unwrap_or_else(new_transfer_id);
    let sha256 = options.with_checksum.then(|| checksum_bytes(data));

    let mut start = StartFrame::new(&id, &options.path, total_parts, options.compression);
    start.sha256 = sha256.clone();

    let mut frames = Vec::with_capacity(parts + 2);
    frames.push(format_start(&start));
    // Base64 output is ASCII, so byte offsets are character offsets.
    for (i, index) in (1..=total_parts).enumerate() {
        let begin = (i * options.chunk_size).min(encoded.len());
        let end = (begin + options.chunk_size).min(encoded.len());
        frames.push(format_chunk(&ChunkFrame {
            id: id.clone(),
            index,
            total: total_parts,
            payload: encoded[begin..end].to_string(),
        }));
    }
    frames.push(format_end(&id));

    tracing::debug!(
        id = %id,
        bytes = data.len(),
        encoded = encoded.len(),
        total_parts,
        "transfer encoded"
    );

    Ok(EncodedTransfer {
        id,
        total_parts,
        sha256,
        frames,
    })
}
