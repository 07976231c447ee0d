//! Payload encoding: optional gzip, then base64 text.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chunkwire_protocol::{Compression, Encoding};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::TransferError;

/// Gzip-compresses `data`.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>, TransferError> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompresses a gzip stream. Corrupt or truncated input is an error.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>, TransferError> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| TransferError::Decompress(e.to_string()))?;
    Ok(out)
}

/// Turns file bytes into the text carried by chunk frames.
pub fn encode_payload(data: &[u8], compression: Compression) -> Result<String, TransferError> {
    let bytes = match compression {
        Compression::None => return Ok(STANDARD.encode(data)),
        Compression::Gzip => gzip(data)?,
    };
    Ok(STANDARD.encode(bytes))
}

/// Inverse of [`encode_payload`]. ASCII whitespace in `text` is ignored.
pub fn decode_payload(
    text: &str,
    encoding: Encoding,
    compression: Compression,
) -> Result<Vec<u8>, TransferError> {
    let decoded = match encoding {
        Encoding::Base64 => {
            let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            STANDARD
                .decode(compact)
                .map_err(|e| TransferError::Decode(e.to_string()))?
        }
    };
    match compression {
        Compression::None => Ok(decoded),
        Compression::Gzip => gunzip(&decoded),
    }
}
