use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use chunkwire_protocol::{
    ChunkFrame, Compression, Encoding, Frame, FrameError, StartFrame, parse_frame,
};
use tracing::{debug, info, warn};

use crate::TransferError;
use crate::ack::Ack;
use crate::chunked::checksum_bytes;
use crate::config::AssemblerConfig;
use crate::payload::decode_payload;
use crate::store::{SessionKey, SessionStore};
use crate::types::TransferSession;
use crate::writer::write_file_safe;

/// Why a message was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// Text carried a frame prefix but not a valid frame.
    #[error(transparent)]
    Malformed(#[from] FrameError),

    #[error("missing path")]
    MissingPath,

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unsupported compression: {0}")]
    UnsupportedCompression(String),

    #[error("no active session for id {0}")]
    NoActiveSession(String),

    #[error("total mismatch: session expects {expected}, frame says {got}")]
    TotalMismatch { expected: u32, got: u32 },

    #[error("index out of range: {index} not in 1..={total}")]
    IndexOutOfRange { index: u32, total: u32 },

    #[error("too many parts: {total} exceeds the limit of {max}")]
    TooManyParts { total: u32, max: u32 },

    #[error("missing chunks: {missing:?}")]
    MissingChunks { missing: Vec<u32> },

    /// Decoding, integrity or storage failure while completing a transfer.
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl AssembleError {
    /// Short, stable reason string (`"missing chunks"`, `"sha256 mismatch"`, ...).
    pub fn reason(&self) -> String {
        match self {
            AssembleError::Malformed(e) => e.to_string(),
            AssembleError::MissingPath => "missing path".into(),
            AssembleError::UnsupportedEncoding(_) => "unsupported encoding".into(),
            AssembleError::UnsupportedCompression(_) => "unsupported compression".into(),
            AssembleError::NoActiveSession(_) => "no active session for id".into(),
            AssembleError::TotalMismatch { .. } => "total mismatch".into(),
            AssembleError::IndexOutOfRange { .. } => "index out of range".into(),
            AssembleError::TooManyParts { .. } => "too many parts".into(),
            AssembleError::MissingChunks { .. } => "missing chunks".into(),
            AssembleError::Transfer(e) => match e {
                TransferError::Io(_) => "write failed",
                TransferError::InvalidPath(_) => "invalid path",
                TransferError::Decode(_) => "base64 decode failed",
                TransferError::Decompress(_) => "gzip decompress failed",
                TransferError::ChecksumMismatch { .. } => "sha256 mismatch",
                TransferError::InvalidChunkSize(_) => "invalid chunk size",
                TransferError::TooManyParts(_) => "too many parts",
            }
            .into(),
        }
    }
}

/// Reassembles transfers from a stream of raw messages.
///
/// One exclusive lock covers the expiry sweep and the session update of each
/// call, so an `Assembler` can be shared across threads. Frames of the same
/// transfer must still be fed in the order they were sent.
#[derive(Debug)]
pub struct Assembler {
    root_dir: PathBuf,
    max_parts: u32,
    store: Mutex<SessionStore>,
}

impl Assembler {
    /// Creates an assembler writing below `config.root_dir` (created if missing).
    pub fn new(config: AssemblerConfig) -> Result<Self, TransferError> {
        if config.root_dir.as_os_str().is_empty() {
            return Err(TransferError::InvalidPath(
                "root directory is required".into(),
            ));
        }
        std::fs::create_dir_all(&config.root_dir)?;
        let ttl = config.session_ttl();
        Ok(Self {
            root_dir: config.root_dir,
            max_parts: config.max_parts,
            store: Mutex::new(SessionStore::new(ttl)),
        })
    }

    /// Processes one raw message received on `channel`.
    ///
    /// Returns `Ok(None)` for text that is not a protocol frame. Expired
    /// sessions are evicted before the message is looked at.
    pub fn on_message(&self, raw: &str, channel: &str) -> Result<Option<Ack>, AssembleError> {
        self.on_message_at(raw, channel, Instant::now())
    }

    pub(crate) fn on_message_at(
        &self,
        raw: &str,
        channel: &str,
        now: Instant,
    ) -> Result<Option<Ack>, AssembleError> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);

        for key in store.sweep(now) {
            warn!(
                channel = %key.channel,
                id = %key.id,
                ttl = ?store.ttl(),
                "transfer session expired"
            );
        }

        let frame = match parse_frame(raw) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(channel = %channel, error = %e, "malformed frame");
                return Err(e.into());
            }
        };

        let kind = frame.kind();
        let id = frame.id().to_string();
        let result = match frame {
            Frame::Start(start) => self.handle_start(&mut store, channel, start, now),
            Frame::Chunk(chunk) => self.handle_chunk(&mut store, channel, chunk),
            Frame::End { id } => self.handle_end(&mut store, channel, id),
            Frame::Cancel { id } => Ok(self.handle_cancel(&mut store, channel, id)),
        };
        if let Err(e) = &result {
            warn!(channel = %channel, kind, id = %id, error = %e, "frame rejected");
        }
        result.map(Some)
    }

    /// Number of sessions currently held (expired ones included until the next message).
    pub fn active_sessions(&self) -> usize {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn handle_start(
        &self,
        store: &mut SessionStore,
        channel: &str,
        start: StartFrame,
        now: Instant,
    ) -> Result<Ack, AssembleError> {
        let path = start
            .path
            .filter(|p| !p.is_empty())
            .ok_or(AssembleError::MissingPath)?;
        let encoding = Encoding::from_wire(&start.encoding)
            .ok_or_else(|| AssembleError::UnsupportedEncoding(start.encoding.clone()))?;
        let compression = Compression::from_wire(&start.compression)
            .ok_or_else(|| AssembleError::UnsupportedCompression(start.compression.clone()))?;
        if start.total_parts > self.max_parts {
            return Err(AssembleError::TooManyParts {
                total: start.total_parts,
                max: self.max_parts,
            });
        }

        let key = SessionKey::new(channel, &start.id);
        let session = TransferSession::new(
            start.id.clone(),
            path,
            start.total_parts,
            encoding,
            compression,
            start.sha256,
            now,
        );
        if let Some(previous) = store.insert(key, session) {
            // At most one transfer per id: a repeated start discards the old parts.
            warn!(
                channel = %channel,
                id = %previous.id(),
                dropped = previous.received_count(),
                "transfer restarted, previous parts dropped"
            );
        }

        info!(
            channel = %channel,
            id = %start.id,
            total = start.total_parts,
            compression = %compression,
            "transfer started"
        );
        Ok(Ack::Start {
            id: start.id,
            total: start.total_parts,
        })
    }

    fn handle_chunk(
        &self,
        store: &mut SessionStore,
        channel: &str,
        chunk: ChunkFrame,
    ) -> Result<Ack, AssembleError> {
        let key = SessionKey::new(channel, &chunk.id);
        let session = store
            .get_mut(&key)
            .ok_or_else(|| AssembleError::NoActiveSession(chunk.id.clone()))?;

        let total = session.total();
        if chunk.total != total {
            return Err(AssembleError::TotalMismatch {
                expected: total,
                got: chunk.total,
            });
        }
        if chunk.index < 1 || chunk.index > total {
            return Err(AssembleError::IndexOutOfRange {
                index: chunk.index,
                total,
            });
        }

        let received_count = session.insert_part(chunk.index, chunk.payload);
        debug!(
            channel = %channel,
            id = %chunk.id,
            index = chunk.index,
            received = received_count,
            total,
            "chunk stored"
        );
        Ok(Ack::Chunk {
            id: chunk.id,
            index: chunk.index,
            received_count,
            total,
        })
    }

    fn handle_end(
        &self,
        store: &mut SessionStore,
        channel: &str,
        id: String,
    ) -> Result<Ack, AssembleError> {
        let key = SessionKey::new(channel, &id);
        let session = store
            .get(&key)
            .ok_or_else(|| AssembleError::NoActiveSession(id.clone()))?;

        if !session.is_complete() {
            return Err(AssembleError::MissingChunks {
                missing: session.missing_parts(),
            });
        }

        let data = decode_payload(
            &session.joined_payload(),
            session.encoding(),
            session.compression(),
        )?;

        if let Some(expected) = session.sha256() {
            let actual = checksum_bytes(&data);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(TransferError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual,
                }
                .into());
            }
        }

        let saved = write_file_safe(&self.root_dir, session.path(), &data)?;
        store.remove(&key);

        info!(
            channel = %channel,
            id = %id,
            path = %saved.display(),
            bytes = data.len(),
            "transfer completed"
        );
        Ok(Ack::End {
            id,
            path: saved,
            bytes: data.len(),
        })
    }

    fn handle_cancel(&self, store: &mut SessionStore, channel: &str, id: String) -> Ack {
        let existed = store.remove(&SessionKey::new(channel, &id)).is_some();
        info!(channel = %channel, id = %id, existed, "transfer cancelled");
        Ack::Cancel { id, existed }
    }
}
