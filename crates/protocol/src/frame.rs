use std::fmt;

/// Header line that opens a start frame.
pub const START_HEADER: &str = "[FILE START]";

/// Prefix of a chunk frame header.
pub const CHUNK_PREFIX: &str = "[FILE CHUNK";

/// Prefix of an end frame.
pub const END_PREFIX: &str = "[FILE END";

/// Prefix of a cancel frame.
pub const CANCEL_PREFIX: &str = "[FILE CANCEL";

/// Every header prefix, in parse precedence order.
pub const FRAME_PREFIXES: [&str; 4] = [START_HEADER, CHUNK_PREFIX, END_PREFIX, CANCEL_PREFIX];

/// Payload encoding declared by a start frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Base64,
}

impl Encoding {
    /// Parses the wire name (case-insensitive). Returns `None` for unknown encodings.
    pub fn from_wire(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("base64") {
            Some(Self::Base64)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression applied to the file bytes before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// Parses the wire name (case-insensitive). Returns `None` for unknown schemes.
    pub fn from_wire(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("none") {
            Some(Self::None)
        } else if value.eq_ignore_ascii_case("gzip") {
            Some(Self::Gzip)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens a transfer and declares its metadata.
///
/// `encoding` and `compression` are kept as the lowercased wire strings so
/// the receiver can report unsupported values instead of the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartFrame {
    pub id: String,
    /// Destination path relative to the receiver's root.
    pub path: Option<String>,
    pub total_parts: u32,
    pub encoding: String,
    pub compression: String,
    /// Hex SHA-256 of the original (uncompressed) file bytes.
    pub sha256: Option<String>,
}

impl StartFrame {
    /// Creates a start frame with the default encoding and no checksum.
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        total_parts: u32,
        compression: Compression,
    ) -> Self {
        Self {
            id: id.into(),
            path: Some(path.into()),
            total_parts,
            encoding: Encoding::Base64.as_str().to_string(),
            compression: compression.as_str().to_string(),
            sha256: None,
        }
    }

    /// Attaches the expected digest of the reassembled file.
    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }
}

/// One part of the encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFrame {
    pub id: String,
    /// 1-based part index.
    pub index: u32,
    pub total: u32,
    /// Encoded payload text (base64).
    pub payload: String,
}

/// A parsed protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Start(StartFrame),
    Chunk(ChunkFrame),
    End { id: String },
    Cancel { id: String },
}

impl Frame {
    /// Transfer id carried by the frame.
    pub fn id(&self) -> &str {
        match self {
            Frame::Start(start) => &start.id,
            Frame::Chunk(chunk) => &chunk.id,
            Frame::End { id } | Frame::Cancel { id } => id,
        }
    }

    /// Short lowercase name of the frame kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Start(_) => "start",
            Frame::Chunk(_) => "chunk",
            Frame::End { .. } => "end",
            Frame::Cancel { .. } => "cancel",
        }
    }
}

/// Text that carried a known frame prefix but failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("missing id")]
    MissingId,

    #[error("invalid total_parts")]
    InvalidTotalParts,

    #[error("invalid CHUNK header")]
    InvalidChunkHeader,

    #[error("invalid END header")]
    InvalidEndHeader,

    #[error("invalid CANCEL header")]
    InvalidCancelHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_from_wire_is_case_insensitive() {
        assert_eq!(Encoding::from_wire("BASE64"), Some(Encoding::Base64));
        assert_eq!(Encoding::from_wire("hex"), None);
    }

    #[test]
    fn compression_from_wire() {
        assert_eq!(Compression::from_wire("none"), Some(Compression::None));
        assert_eq!(Compression::from_wire("Gzip"), Some(Compression::Gzip));
        assert_eq!(Compression::from_wire("zstd"), None);
        assert_eq!(Compression::Gzip.to_string(), "gzip");
    }

    #[test]
    fn start_frame_builder_defaults() {
        let start = StartFrame::new("t1", "docs/a.txt", 3, Compression::Gzip).with_sha256("abc");
        assert_eq!(start.encoding, "base64");
        assert_eq!(start.compression, "gzip");
        assert_eq!(start.path.as_deref(), Some("docs/a.txt"));
        assert_eq!(start.sha256.as_deref(), Some("abc"));
    }

    #[test]
    fn frame_id_and_kind() {
        let end = Frame::End { id: "x".into() };
        assert_eq!(end.id(), "x");
        assert_eq!(end.kind(), "end");

        let chunk = Frame::Chunk(ChunkFrame {
            id: "y".into(),
            index: 1,
            total: 1,
            payload: String::new(),
        });
        assert_eq!(chunk.id(), "y");
        assert_eq!(chunk.kind(), "chunk");
    }

    #[test]
    fn frame_error_messages() {
        assert_eq!(FrameError::MissingId.to_string(), "missing id");
        assert_eq!(
            FrameError::InvalidChunkHeader.to_string(),
            "invalid CHUNK header"
        );
    }
}
