use std::collections::HashMap;
use std::time::{Duration, Instant};

use chunkwire_protocol::{Compression, Encoding};

/// In-progress state of one transfer.
///
/// Parts are keyed by their 1-based index; arrival order is irrelevant and a
/// repeated index replaces the earlier payload.
#[derive(Debug, Clone)]
pub struct TransferSession {
    id: String,
    path: String,
    total: u32,
    encoding: Encoding,
    compression: Compression,
    sha256: Option<String>,
    created_at: Instant,
    received: HashMap<u32, String>,
}

impl TransferSession {
    /// Creates an empty session opened at `created_at`.
    pub fn new(
        id: String,
        path: String,
        total: u32,
        encoding: Encoding,
        compression: Compression,
        sha256: Option<String>,
        created_at: Instant,
    ) -> Self {
        Self {
            id,
            path,
            total,
            encoding,
            compression,
            sha256,
            created_at,
            received: HashMap::new(),
        }
    }

    /// Stores a part, replacing any payload already held for `index`.
    ///
    /// Returns the number of distinct parts received so far.
    pub fn insert_part(&mut self, index: u32, payload: String) -> usize {
        self.received.insert(index, payload);
        self.received.len()
    }

    /// Returns `true` once every index in `1..=total` has arrived.
    pub fn is_complete(&self) -> bool {
        self.received.len() == self.total as usize
    }

    /// Indices not yet received, ascending.
    pub fn missing_parts(&self) -> Vec<u32> {
        (1..=self.total)
            .filter(|i| !self.received.contains_key(i))
            .collect()
    }

    /// Concatenates the received payloads in index order.
    ///
    /// Absent indices contribute nothing; callers check [`is_complete`](Self::is_complete) first.
    pub fn joined_payload(&self) -> String {
        (1..=self.total)
            .filter_map(|i| self.received.get(&i))
            .map(String::as_str)
            .collect()
    }

    /// Returns `true` if the session is older than `ttl` at `now`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Destination path as announced by the sender.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Expected SHA-256 of the reassembled file, if the sender declared one.
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    pub fn received_count(&self) -> usize {
        self.received.len()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}
